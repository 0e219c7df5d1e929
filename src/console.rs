//! Terminal front end for the editing loop and commit prompts.

use std::path::Path;

use anyhow::Result;
use dialoguer::Input;

use crate::commit::{CommitReport, OverwriteAnswer, OverwritePrompt};
use crate::segmentation::{naming::PLACEHOLDERS, PolicyError};
use crate::session::{commands::prompt, Command, CommandKey, Console, SessionView};

/// Reads commands from stdin and prints the menu to stdout.
#[derive(Debug, Default)]
pub struct TerminalConsole;

impl TerminalConsole {
    pub fn new() -> Self {
        Self
    }

    fn ask(&self, prompt: &str) -> Result<String> {
        let answer = Input::<String>::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()?;
        Ok(answer)
    }
}

impl Console for TerminalConsole {
    fn render(&mut self, view: &SessionView) -> Result<()> {
        println!("\n{}", format_view(view));
        Ok(())
    }

    fn read_command(&mut self, view: &SessionView) -> Result<Command> {
        let raw = self.ask(prompt(view.policy.split_enabled))?;
        let key = CommandKey::parse(&raw);

        let value = match key {
            CommandKey::ThresholdValue => Some(self.ask("Threshold value")?),
            CommandKey::FirstGroupNumber => Some(self.ask("First flight number")?),
            CommandKey::NameTemplate => {
                println!("The following pieces of the subdirectory name template will be replaced with actual values:");
                println!("{}", PLACEHOLDERS.join(", "));
                Some(self.ask("New subdirectory name template")?)
            }
            _ => None,
        };

        Ok(key.into_command(&raw, value))
    }

    fn reject(&mut self, error: &PolicyError) -> Result<()> {
        println!("Not applied: {error}");
        Ok(())
    }
}

impl OverwritePrompt for TerminalConsole {
    fn confirm_overwrite(&mut self, group: &str, _directory: &Path) -> Result<OverwriteAnswer> {
        println!(
            "Sub-directory {group} already exists. Any files in it with the same name will be overwritten."
        );
        let answer = self.ask("Continue [y/n/a]")?;
        Ok(match answer.trim().to_ascii_lowercase().as_str() {
            "y" => OverwriteAnswer::Yes,
            "a" => OverwriteAnswer::All,
            _ => OverwriteAnswer::Stop,
        })
    }
}

fn opt<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| v.to_string())
}

/// Menu text for one session view.
pub fn format_view(view: &SessionView) -> String {
    let policy = &view.policy;
    let stats = &view.gap_stats;

    let mut found = format!("Num images found: {}", view.capture_count);
    if view.skipped_count > 0 {
        found.push_str(&format!(" ({} skipped)", view.skipped_count));
    }

    let mut lines = vec![
        found,
        format!(
            "Min, Median, and Max sampling interval (seconds): {}, {}, {}",
            opt(stats.min),
            opt(stats.median),
            opt(stats.max)
        ),
        format!("Move files into sub-(D)irectories by flight: {}", policy.split_enabled),
    ];

    if policy.split_enabled {
        lines.push("Flight Parsing Options:".to_string());
        lines.push(format!("  Threshold (U)nits: {}", policy.threshold_unit.as_str()));
        lines.push(format!("  Threshold (V)al: {}", policy.threshold_value));
        if let Some(threshold) = view.threshold_secs {
            lines.push(format!(
                "    --> will create a new flight every time a gap is found of at least {threshold} seconds"
            ));
        }
        lines.push(format!("  Subdirectory name (T)emplate: {}", policy.name_template));
        lines.push(format!("  (F)irst flight number: {}", policy.first_group_number));
        lines.push(format!("  Split by file (K)ind: {}", policy.category_split));
        lines.push("  Flight directory(s):".to_string());
        for group in &view.groups {
            let span = match (group.start, group.end) {
                (Some(start), Some(end)) => {
                    format!(", {} to {}", start.format("%H:%M:%S"), end.format("%H:%M:%S"))
                }
                _ => String::new(),
            };
            lines.push(format!("   - {} ({} images{})", group.name, group.count, span));
        }
        lines.push(format!("  (M)ove or (c)opy: {}", policy.action_mode.as_str()));
    }

    lines.push(format!("Create point (S)hapefiles: {}", policy.export_enabled));
    lines.join("\n")
}

/// Summary printed after a commit.
pub fn format_report(report: &CommitReport) -> String {
    let mut lines = vec![format!("Relocated {} file(s)", report.relocated)];
    lines.extend(report.exported.iter().map(|path| format!("Created {}", path.display())));
    if let Some(group) = &report.stopped_at {
        lines.push(format!("Stopped before {group}; later groups were left untouched"));
    }
    lines.extend(report.faults.iter().map(|fault| format!("FAILED {fault}")));
    lines.push(if report.is_clean() { "Done" } else { "Done with problems" }.to_string());
    lines.join("\n")
}
