//! Configuration for the terminal engine

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::{DEFAULT_TAB_WIDTH, DEFAULT_WORD_DELIMITERS};
use crate::error::Result;

/// Terminal configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Initial width in columns
    pub cols: usize,
    /// Initial height in rows
    pub rows: usize,
    /// Maximum scrollback lines; 0 disables history
    pub scrollback_lines: usize,
    pub shell: ShellConfig,
    /// Characters that end a word for double-click selection, in addition
    /// to whitespace
    pub word_delimiters: String,
    pub palette: PaletteConfig,
    pub tab_width: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cols: 80,
            rows: 24,
            scrollback_lines: 10_000,
            shell: ShellConfig::default(),
            word_delimiters: DEFAULT_WORD_DELIMITERS.to_string(),
            palette: PaletteConfig::default(),
            tab_width: DEFAULT_TAB_WIDTH,
        }
    }
}

impl Config {
    /// Parse a JSON configuration; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Columns and rows, at least 1x1
    pub fn geometry(&self) -> (usize, usize) {
        (self.cols.max(1), self.rows.max(1))
    }
}

/// Child process configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    /// Program to run; `$SHELL`, then `/bin/sh` when unset
    pub program: Option<String>,
    pub args: Vec<String>,
    /// Extra environment variables for the child
    pub env: Vec<(String, String)>,
    /// Working directory for the child; inherited when unset
    pub working_dir: Option<PathBuf>,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            program: None,
            args: vec!["-l".to_string()],
            env: Vec::new(),
            working_dir: None,
        }
    }
}

impl ShellConfig {
    /// Run `program` with `args` instead of a login shell
    pub fn command(program: impl Into<String>, args: &[&str]) -> Self {
        Self {
            program: Some(program.into()),
            args: args.iter().map(|arg| arg.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn resolve_program(&self) -> String {
        self.program
            .clone()
            .or_else(|| std::env::var("SHELL").ok().filter(|shell| !shell.is_empty()))
            .unwrap_or_else(|| "/bin/sh".to_string())
    }
}

/// Palette overrides as color specs (`#rrggbb`, `rgb:rr/gg/bb`); unset or
/// unparsable entries keep the xterm defaults
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaletteConfig {
    pub foreground: Option<String>,
    pub background: Option<String>,
    pub cursor: Option<String>,
    /// The 16 ANSI colors (0-15)
    pub ansi: [Option<String>; 16],
}
