use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{CommandFactory, Parser};
use colored::Colorize;

use scour::catalog::{self, Catalog, OperationEntry};
use scour::cli::args::{Cli, Commands, ConfigAction};
use scour::cli::output::{self, ConsoleSink, RunSummary};
use scour::common::config::Settings;
use scour::confirm::{AssumeYes, ConfirmationGate, StdioGate};
use scour::engine::FsEngine;
use scour::runner::{self, RunRequest, Worker};
use scour::selection::{FileStore, SelectionStore, SelectionTree};

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("scour=debug")
            .init();
    }

    let settings = Settings::load()?;

    match &cli.command {
        Commands::List { all } => cmd_list(&cli, &settings, *all),
        Commands::Select { operation, option } => {
            cmd_toggle(&cli, &settings, operation, option.as_deref(), true)
        }
        Commands::Deselect { operation, option } => {
            cmd_toggle(&cli, &settings, operation, option.as_deref(), false)
        }
        Commands::Preview => cmd_run(&cli, &settings, false, false, false),
        Commands::Clean {
            yes,
            allow_outside_home,
        } => cmd_run(&cli, &settings, true, *yes, *allow_outside_home),
        Commands::Config { action } => cmd_config(action),
        Commands::Completions { shell } => {
            clap_complete::generate(*shell, &mut Cli::command(), "scour", &mut std::io::stdout());
            Ok(())
        }
    }
}

fn catalog_path(cli: &Cli) -> PathBuf {
    cli.catalog
        .clone()
        .unwrap_or_else(|| Settings::data_dir().join("catalog.toml"))
}

fn load_catalog(cli: &Cli) -> Result<Catalog> {
    let path = catalog_path(cli);
    if !path.exists() {
        bail!(
            "no catalog at {}; pass --catalog or create one (see README)",
            path.display()
        );
    }
    catalog::load_catalog(&path)
}

fn load_store() -> Result<FileStore> {
    FileStore::load(&Settings::selections_path()).context("Failed to load selection store")
}

/// Auto-hide predicate: hide operations that would do nothing here,
/// unless the user already has them checked
fn hide_predicate<'a>(
    settings: &'a Settings,
    store: &'a dyn SelectionStore,
) -> impl Fn(&OperationEntry) -> bool + 'a {
    move |entry: &OperationEntry| {
        settings.auto_hide
            && store.get(&entry.id, None) != Some(true)
            && entry.would_do_nothing()
    }
}

fn cmd_list(cli: &Cli, settings: &Settings, all: bool) -> Result<()> {
    let catalog = load_catalog(cli)?;
    let store = load_store()?;

    let tree = if all {
        SelectionTree::build(&catalog, &store, |_| false)
    } else {
        SelectionTree::build(&catalog, &store, hide_predicate(settings, &store))
    };

    output::print_tree(&tree);
    Ok(())
}

fn cmd_toggle(
    cli: &Cli,
    settings: &Settings,
    operation: &str,
    option: Option<&str>,
    checked: bool,
) -> Result<()> {
    use scour::selection::ToggleOutcome;

    let catalog = load_catalog(cli)?;
    let mut store = load_store()?;
    let mut tree = SelectionTree::build(&catalog, &store, hide_predicate(settings, &store));

    let gate = StdioGate {
        delete_confirmation: settings.delete_confirmation,
    };

    let outcome = match option {
        Some(opt) => tree.toggle_option(operation, opt, checked, &mut store, &gate),
        None => tree.toggle_operation(operation, checked, &mut store),
    };

    match outcome {
        ToggleOutcome::Applied => {
            let label = match option {
                Some(opt) => format!("{} / {}", operation, opt),
                None => operation.to_string(),
            };
            let state = if checked { "selected" } else { "deselected" };
            println!("{} {}", label.bold(), state);
        }
        ToggleOutcome::Declined => {
            println!("{}", "Not enabled.".yellow());
        }
        ToggleOutcome::NotFound => {
            bail!(
                "no such {} in the catalog",
                if option.is_some() { "option" } else { "operation" }
            );
        }
    }
    Ok(())
}

fn cmd_run(
    cli: &Cli,
    settings: &Settings,
    really_delete: bool,
    yes: bool,
    allow_outside_home: bool,
) -> Result<()> {
    let catalog = load_catalog(cli)?;
    let store = load_store()?;
    let tree = SelectionTree::build(&catalog, &store, hide_predicate(settings, &store));
    let request = RunRequest::from_tree(&tree);

    if really_delete {
        let confirmed = if yes {
            AssumeYes.confirm_run(true)
        } else {
            StdioGate {
                delete_confirmation: settings.delete_confirmation,
            }
            .confirm_run(true)
        };
        if !confirmed {
            println!("{}", "Cancelled.".yellow());
            return Ok(());
        }
    }

    let mut engine = FsEngine::new(&catalog).allow_outside_home(allow_outside_home);
    let mut worker = match Worker::new(&request, really_delete, &mut engine) {
        Ok(worker) => worker,
        Err(scour::common::ScourError::NoOperationsSelected) => {
            bail!("you must select an operation first; see 'scour list'");
        }
        Err(e) => return Err(e.into()),
    };

    // Ctrl-C flips a flag checked between units; the unit in flight
    // finishes before the run winds down.
    let abort_flag = Arc::new(AtomicBool::new(false));
    {
        let abort_flag = Arc::clone(&abort_flag);
        if let Err(e) = ctrlc::set_handler(move || abort_flag.store(true, Ordering::SeqCst)) {
            tracing::warn!(error = %e, "could not install Ctrl-C handler; abort unavailable");
        }
    }

    let mut sink = ConsoleSink::new(cli.json);
    runner::drive(&mut worker, &mut sink, || {
        abort_flag.load(Ordering::SeqCst)
    });

    let summary = RunSummary {
        really_deleted: sink.really_deleted,
        units: worker.unit_count(),
        failed_units: worker.error_count(),
        total_bytes: sink.total_bytes,
        elapsed_secs: sink.elapsed_secs,
        aborted: worker.is_aborted(),
        finished_at: chrono::Local::now(),
        operation_bytes: sink.operation_bytes.clone(),
    };

    if cli.json {
        output::print_summary_json(&summary);
    } else {
        output::print_summary_human(&summary);
    }
    Ok(())
}

fn cmd_config(action: &ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let settings = Settings::load()?;
            println!("delete_confirmation = {}", settings.delete_confirmation);
            println!("auto_hide = {}", settings.auto_hide);
        }
        ConfigAction::Set { key, value } => {
            let mut settings = Settings::load()?;
            let parsed: bool = value
                .parse()
                .with_context(|| format!("expected true/false, got '{}'", value))?;
            match key.as_str() {
                "delete_confirmation" => settings.delete_confirmation = parsed,
                "auto_hide" => settings.auto_hide = parsed,
                other => bail!("unknown setting '{}'", other),
            }
            settings.save()?;
            println!("{} = {}", key, parsed);
        }
    }
    Ok(())
}
