use std::path::Path;
use std::process::Command;

use crate::capture::CaptureError;

use super::{
    parse_rows, MetadataRow, MetadataSource, TAG_DATE_TIME_ORIGINAL, TAG_FILE_NAME, TAG_LATITUDE,
    TAG_LONGITUDE,
};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info};

/// Runs the `exiftool` executable and reads its JSON output.
#[derive(Debug, Clone)]
pub struct ExifTool {
    program: String,
}

impl Default for ExifTool {
    fn default() -> Self {
        Self {
            program: "exiftool".into(),
        }
    }
}

impl ExifTool {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Returns the tool version, or `ToolNotFound` when it can't be spawned.
    pub fn version(&self) -> Result<String, CaptureError> {
        let output = Command::new(&self.program)
            .arg("-ver")
            .output()
            .map_err(|_| CaptureError::ToolNotFound)?;

        if !output.status.success() {
            return Err(CaptureError::ToolNotFound);
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    fn args(dir: &Path) -> Vec<String> {
        vec![
            "-json".into(),
            "-n".into(),
            format!("-{TAG_FILE_NAME}"),
            format!("-{TAG_DATE_TIME_ORIGINAL}"),
            format!("-{TAG_LATITUDE}"),
            format!("-{TAG_LONGITUDE}"),
            dir.to_string_lossy().into_owned(),
        ]
    }
}

impl MetadataSource for ExifTool {
    fn read_rows(&self, dir: &Path) -> Result<Vec<MetadataRow>, CaptureError> {
        let version = self.version()?;
        log_info!("Running exiftool {} on images in {}...", version, dir.display());

        let args = Self::args(dir);
        log_debug!("{} {}", self.program, args.join(" "));

        let output = Command::new(&self.program).args(&args).output()?;

        // exiftool exits 1 when some files had no readable metadata but still
        // prints rows for the rest, so only give up when stdout is empty too
        let stdout = String::from_utf8_lossy(&output.stdout);
        if !output.status.success() && stdout.trim().is_empty() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CaptureError::Extraction(format!(
                "exiftool exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        parse_rows(&stdout)
    }
}
