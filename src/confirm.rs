use std::io::Write;

/// Synchronous yes/no decision points that gate state transitions.
///
/// `confirm_run` asks before a destructive (non-preview) run and is
/// skipped entirely when the `delete_confirmation` setting is off.
/// `confirm_warning` asks before enabling an option that declares a
/// warning and is never skipped.
pub trait ConfirmationGate {
    fn confirm_run(&self, mention_preview: bool) -> bool;
    fn confirm_warning(&self, operation: &str, description: &str, warning: &str) -> bool;
}

/// Terminal gate prompting on stdin
pub struct StdioGate {
    /// Mirrors the persisted `delete_confirmation` setting
    pub delete_confirmation: bool,
}

impl StdioGate {
    fn ask(&self, prompt: &str, default_yes: bool) -> bool {
        let hint = if default_yes { "[Y/n]" } else { "[y/N]" };
        print!("{} {} ", prompt, hint);
        let _ = std::io::stdout().flush();

        let mut line = String::new();
        if std::io::stdin().read_line(&mut line).is_err() {
            return false;
        }
        match line.trim().to_lowercase().as_str() {
            "" => default_yes,
            "y" | "yes" => true,
            _ => false,
        }
    }
}

impl ConfirmationGate for StdioGate {
    fn confirm_run(&self, mention_preview: bool) -> bool {
        if !self.delete_confirmation {
            return true;
        }
        let prompt = if mention_preview {
            "Permanently delete the selected items? You may want to run a preview first."
        } else {
            "Permanently delete the selected items?"
        };
        self.ask(prompt, false)
    }

    fn confirm_warning(&self, operation: &str, description: &str, warning: &str) -> bool {
        self.ask(
            &format!(
                "Warning regarding {} - {}:\n\n{}\n\nEnable anyway?",
                operation, description, warning
            ),
            false,
        )
    }
}

/// Gate that accepts everything, used for `--yes` and scripted runs
pub struct AssumeYes;

impl ConfirmationGate for AssumeYes {
    fn confirm_run(&self, _mention_preview: bool) -> bool {
        true
    }

    fn confirm_warning(&self, _operation: &str, _description: &str, _warning: &str) -> bool {
        true
    }
}
