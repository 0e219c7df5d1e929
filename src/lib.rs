pub mod capture;
pub mod commit;
pub mod console;
pub mod metadata;
pub mod models;
pub mod segmentation;
pub mod session;
pub mod settings;
pub mod utils;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::Parser;

use commit::{build_plan, execute, CommitReport, FsRelocator, GeoJsonExporter, OverwritePrompt};
use console::{format_report, TerminalConsole};
use metadata::{ExifTool, MetadataSource};
use session::{Console, SessionController, SessionStatus};
use settings::SettingsStore;

/// Sort geotagged captures into per-flight directories and export their
/// locations as points.
#[derive(Debug, Parser)]
#[command(name = "flightsort", version, about)]
pub struct Cli {
    /// Directory holding the geotagged images
    pub input_dir: String,
}

/// How a run ended.
#[derive(Debug)]
pub enum RunOutcome {
    /// Operator left without committing; nothing was touched.
    Aborted,
    Committed(CommitReport),
}

/// Strip the quotes a shell or file manager may leave around a pasted path.
pub fn clean_input_dir(raw: &str) -> PathBuf {
    PathBuf::from(raw.trim().trim_matches(|c| c == '\'' || c == '"'))
}

/// Load captures from `input_dir`, run the editing loop and, on commit,
/// carry out the resulting plan.
pub fn process_directory<O>(
    input_dir: &Path,
    settings: &SettingsStore,
    source: &dyn MetadataSource,
    operator: &mut O,
) -> Result<RunOutcome>
where
    O: Console + OverwritePrompt,
{
    let rows = source.read_rows(input_dir)?;
    let store = capture::CaptureStore::load(&rows)?;

    let mut controller =
        SessionController::new(store, settings.policy(), Box::new(settings.categories()))?;

    match controller.run(&mut *operator)? {
        SessionStatus::Committed => {}
        SessionStatus::Aborted | SessionStatus::Editing => {
            log::info!("Session ended without committing; no files were changed");
            return Ok(RunOutcome::Aborted);
        }
    }

    let policy = controller.policy().clone();
    let partition = controller.partition()?.clone();
    let plan = build_plan(input_dir, controller.records(), &partition, &policy);
    log::info!(
        "Committing {} group(s): {} relocation(s), {} export(s)",
        plan.groups.len(),
        plan.relocation_count(),
        plan.export_count()
    );

    let report = execute(&plan, &FsRelocator, &GeoJsonExporter, &mut *operator)?;
    Ok(RunOutcome::Committed(report))
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    utils::logging::init();

    match run_cli(&cli) {
        Ok(RunOutcome::Aborted) => ExitCode::SUCCESS,
        Ok(RunOutcome::Committed(report)) => {
            println!("{}", format_report(&report));
            if report.faults.is_empty() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(err) => {
            log::error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run_cli(cli: &Cli) -> Result<RunOutcome> {
    let input_dir = clean_input_dir(&cli.input_dir);
    if !input_dir.is_dir() {
        bail!("{} is not a directory", input_dir.display());
    }

    let settings = SettingsStore::for_input_dir(&input_dir)
        .context("Failed to load flightsort settings")?;

    process_directory(&input_dir, &settings, &ExifTool::default(), &mut TerminalConsole::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_surrounding_quotes() {
        assert_eq!(clean_input_dir("'C:\\Pix4D\\Flight01'"), PathBuf::from("C:\\Pix4D\\Flight01"));
        assert_eq!(clean_input_dir("  \"/data/survey\" "), PathBuf::from("/data/survey"));
        assert_eq!(clean_input_dir("/data/survey"), PathBuf::from("/data/survey"));
    }

    #[test]
    fn cli_takes_one_positional_directory() {
        let cli = Cli::try_parse_from(["flightsort", "/data/survey"]).unwrap();
        assert_eq!(cli.input_dir, "/data/survey");
        assert!(Cli::try_parse_from(["flightsort"]).is_err());
        assert!(Cli::try_parse_from(["flightsort", "a", "b"]).is_err());
    }
}
