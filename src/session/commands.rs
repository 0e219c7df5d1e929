use crate::segmentation::ActionMode;

/// One operator command. Commands that carry a value hold the raw text the
/// operator typed; parsing it is part of applying the command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Commit,
    Abort,
    ToggleSplit,
    ToggleThresholdUnit,
    SetThresholdValue(String),
    SetNameTemplate(String),
    SetFirstGroupNumber(String),
    ToggleCategorySplit,
    SetActionMode(ActionMode),
    ToggleExport,
    /// Input outside the vocabulary. Ends the session like `Abort`.
    Unrecognized(String),
}

/// The key pressed at the menu prompt, before any follow-up value is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKey {
    Commit,
    Abort,
    ToggleSplit,
    ToggleThresholdUnit,
    ThresholdValue,
    NameTemplate,
    FirstGroupNumber,
    ToggleCategorySplit,
    Move,
    Copy,
    ToggleExport,
    Unrecognized,
}

impl CommandKey {
    pub fn parse(input: &str) -> Self {
        match input.trim().to_ascii_lowercase().as_str() {
            "y" => CommandKey::Commit,
            "n" => CommandKey::Abort,
            "d" => CommandKey::ToggleSplit,
            "u" => CommandKey::ToggleThresholdUnit,
            "v" => CommandKey::ThresholdValue,
            "t" => CommandKey::NameTemplate,
            "f" => CommandKey::FirstGroupNumber,
            "k" => CommandKey::ToggleCategorySplit,
            "m" => CommandKey::Move,
            "c" => CommandKey::Copy,
            "s" => CommandKey::ToggleExport,
            _ => CommandKey::Unrecognized,
        }
    }

    /// Keys that need a follow-up value from the operator.
    pub fn needs_value(&self) -> bool {
        matches!(
            self,
            CommandKey::ThresholdValue | CommandKey::NameTemplate | CommandKey::FirstGroupNumber
        )
    }

    /// Build the command. `value` is only consulted for keys that need one;
    /// `raw` is the original menu input, kept for unrecognized commands.
    pub fn into_command(self, raw: &str, value: Option<String>) -> Command {
        let value = value.unwrap_or_default();
        match self {
            CommandKey::Commit => Command::Commit,
            CommandKey::Abort => Command::Abort,
            CommandKey::ToggleSplit => Command::ToggleSplit,
            CommandKey::ToggleThresholdUnit => Command::ToggleThresholdUnit,
            CommandKey::ThresholdValue => Command::SetThresholdValue(value),
            CommandKey::NameTemplate => Command::SetNameTemplate(value),
            CommandKey::FirstGroupNumber => Command::SetFirstGroupNumber(value),
            CommandKey::ToggleCategorySplit => Command::ToggleCategorySplit,
            CommandKey::Move => Command::SetActionMode(ActionMode::Move),
            CommandKey::Copy => Command::SetActionMode(ActionMode::Copy),
            CommandKey::ToggleExport => Command::ToggleExport,
            CommandKey::Unrecognized => Command::Unrecognized(raw.trim().to_string()),
        }
    }
}

/// Prompt line listing the keys that make sense for the current policy.
pub fn prompt(split_enabled: bool) -> &'static str {
    if split_enabled {
        "Continue [y/n or d/u/v/t/f/k/m/c/s]"
    } else {
        "Continue [y/n or d/s]"
    }
}
