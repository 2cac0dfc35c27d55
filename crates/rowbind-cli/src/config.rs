//! Decoder settings loaded from a JSON file and command-line flags.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use rowbind_core::{CsvSourceOptions, DecoderConfig};
use serde::{Deserialize, Serialize};

use crate::cli::DecodeArgs;

/// Settings accepted by `--config`.
///
/// ```json
/// {
///   "decoder": { "header_mode": true, "time_layout": "%Y-%m-%d" },
///   "csv": { "delimiter": 59, "flexible": true }
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub decoder: DecoderConfig,
    pub csv: CsvSourceOptions,
}

impl FileConfig {
    /// Reads a JSON config file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parse config {}", path.display()))
    }

    /// Loads `--config` when given, then applies flag overrides.
    pub fn from_args(args: &DecodeArgs) -> Result<Self> {
        let mut config = match &args.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.apply_overrides(args)?;
        Ok(config)
    }

    fn apply_overrides(&mut self, args: &DecodeArgs) -> Result<()> {
        if args.no_header {
            self.decoder.header_mode = false;
        }
        if let Some(layout) = &args.time_layout {
            self.decoder.time_layout.clone_from(layout);
        }
        if !args.true_literals.is_empty() {
            self.decoder.boolean_literals = args.true_literals.iter().cloned().collect();
        }
        if !args.null_literals.is_empty() {
            self.decoder.null_literals = args.null_literals.iter().cloned().collect();
        }
        if let Some(delimiter) = args.delimiter {
            let Some(byte) = u8::try_from(delimiter).ok().filter(u8::is_ascii) else {
                bail!("delimiter {delimiter:?} is not an ASCII character");
            };
            self.csv.delimiter = byte;
        }
        if args.flexible {
            self.csv.flexible = true;
        }
        Ok(())
    }
}
