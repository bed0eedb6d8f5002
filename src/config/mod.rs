use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::expand::{ExpandOptions, DEFAULT_SEPARATOR};
use column::{ColumnEntry, NO_COLUMN};

pub mod column;
pub mod paths;

/// Default location of the config file, `<config dir>/slashsplit/config.json`.
pub static DEFAULT_CONFIG_PATH: Lazy<Option<PathBuf>> =
    Lazy::new(|| dirs::config_dir().map(|path| path.join("slashsplit").join("config.json")));

/// On-disk configuration. Column entries accept numbers (`2`) or letter labels
/// (`"C"`); `-1` does nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub bring_down_columns: Vec<ColumnEntry>,
    pub explode_columns: Vec<ColumnEntry>,
    /// One output file is written per entry. An empty entry means the input's directory.
    pub output_directories: Vec<String>,
    pub preserve_original_row: bool,
    pub separator: String,
    pub delimiter: String,
    pub has_header: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bring_down_columns: vec![ColumnEntry::from(NO_COLUMN)],
            explode_columns: vec![ColumnEntry::from(NO_COLUMN)],
            output_directories: vec![String::new()],
            preserve_original_row: false,
            separator: DEFAULT_SEPARATOR.to_string(),
            delimiter: ",".to_string(),
            has_header: false,
        }
    }
}

impl Config {
    pub fn parse_str(input: &str, path: &Path) -> Result<Self> {
        serde_json::from_str(input).map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads the config at `path`, writing the default config there first if
    /// the file does not exist yet.
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("New config at {:?}", path);
            Config::default().save(path)?;
        }

        let input = std::fs::read_to_string(path).map_err(|err| Error::io(path, err))?;
        let config = Config::parse_str(&input, path)?;
        debug!("Loaded config {:?}: {:?}", path, config);
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                std::fs::create_dir_all(dir).map_err(|err| Error::io(dir, err))?;
            }
        }

        let mut json = serde_json::to_string_pretty(self).map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        })?;
        json.push('\n');
        std::fs::write(path, json).map_err(|err| Error::io(path, err))
    }
}

/// Values given on the command line. `None` keeps the config file's value.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub explode_columns: Option<Vec<ColumnEntry>>,
    pub bring_down_columns: Option<Vec<ColumnEntry>>,
    pub preserve_original_row: Option<bool>,
    pub separator: Option<String>,
    pub delimiter: Option<String>,
    pub has_header: Option<bool>,
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub expand: ExpandOptions,
    pub delimiter: u8,
    pub output_directories: Vec<String>,
}

impl Settings {
    pub fn resolve(config: Config, overrides: Overrides) -> Result<Self> {
        let explode = overrides
            .explode_columns
            .unwrap_or(config.explode_columns);
        let bring_down = overrides
            .bring_down_columns
            .unwrap_or(config.bring_down_columns);
        let separator = overrides.separator.unwrap_or(config.separator);
        let delimiter = overrides.delimiter.unwrap_or(config.delimiter);

        let expand = ExpandOptions {
            explode: column::resolve_all(&explode)?,
            bring_down: column::resolve_all(&bring_down)?,
            preserve_original_row: overrides
                .preserve_original_row
                .unwrap_or(config.preserve_original_row),
            separator: parse_separator(&separator)?,
            skip_header: overrides.has_header.unwrap_or(config.has_header),
        };

        Ok(Settings {
            expand,
            delimiter: parse_delimiter(&delimiter)?,
            output_directories: config.output_directories,
        })
    }

    /// Lists the configured columns as spreadsheet labels, e.g. `C (2), AA (26)`.
    pub fn describe_columns(columns: &std::collections::BTreeSet<usize>) -> String {
        if columns.is_empty() {
            return "none".to_string();
        }
        columns
            .iter()
            .map(|&idx| column::ColumnSelector::Index(idx).to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn single_char(value: &str) -> Option<char> {
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

pub fn parse_separator(value: &str) -> Result<char> {
    single_char(value).ok_or_else(|| Error::InvalidSeparator {
        value: value.to_string(),
    })
}

pub fn parse_delimiter(value: &str) -> Result<u8> {
    single_char(value)
        .filter(char::is_ascii)
        .map(|c| c as u8)
        .ok_or_else(|| Error::InvalidDelimiter {
            value: value.to_string(),
        })
}
