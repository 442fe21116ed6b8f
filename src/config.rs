//! Configuration management for pep8check.
//!
//! This module provides the [`Config`] struct which controls which codes are
//! reported, how files are selected and whether fixes are written.
//! Configuration can be loaded from:
//! - TOML files (`pep8check.toml`)
//! - CLI arguments (which override file settings)
//!
//! Config files are auto-discovered by searching parent directories from the
//! checked path up to the filesystem root, plus the user's home directory.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Config file names to search for (in order of priority, later overrides earlier)
const CONFIG_FILE_NAMES: &[&str] = &["pep8check.toml"];

/// Codes left out unless asked for
pub const DEFAULT_IGNORE: &[&str] = &["E24"];
pub const DEFAULT_EXCLUDE: &[&str] = &[".svn", "CVS", ".bzr", ".hg", ".git"];
pub const DEFAULT_FILENAME: &[&str] = &["*.py"];
pub const DEFAULT_MAX_LINE_LENGTH: usize = 120;
pub const DEFAULT_TAB_SIZE: usize = 8;

/// Get the user's home directory
fn dirs_home() -> Option<PathBuf> {
    if let Ok(home) = std::env::var("HOME") {
        return Some(PathBuf::from(home));
    }
    if let Ok(userprofile) = std::env::var("USERPROFILE") {
        return Some(PathBuf::from(userprofile));
    }
    None
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

// Serde default functions
fn default_ignore() -> Vec<String> {
    to_strings(DEFAULT_IGNORE)
}
fn default_exclude() -> Vec<String> {
    to_strings(DEFAULT_EXCLUDE)
}
fn default_filename() -> Vec<String> {
    to_strings(DEFAULT_FILENAME)
}
fn default_max_line_length() -> usize {
    DEFAULT_MAX_LINE_LENGTH
}
fn default_tab_size() -> usize {
    DEFAULT_TAB_SIZE
}

/// Split a comma separated option value, dropping empty items.
#[must_use]
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Resolved run configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// Code prefixes to report; when non-empty, everything else is suppressed
    #[serde(default)]
    pub select: Vec<String>,

    /// Code prefixes to suppress (default: E24)
    #[serde(default = "default_ignore")]
    pub ignore: Vec<String>,

    /// Longest allowed physical line (default: 120)
    #[serde(default = "default_max_line_length")]
    pub max_line_length: usize,

    /// Tab width used to measure indentation levels (default: 8)
    #[serde(default = "default_tab_size")]
    pub tab_size: usize,

    /// Report every occurrence of a code instead of only the first
    #[serde(default)]
    pub repeat: bool,

    /// Produce fixed output
    #[serde(default)]
    pub fix: bool,

    /// Write fixed output over the original file instead of a `fixed_` sibling
    #[serde(default)]
    pub in_place: bool,

    /// Print the offending source line under each violation
    #[serde(default)]
    pub show_source: bool,

    /// Print the rule documentation under each violation
    #[serde(default)]
    pub show_pep8: bool,

    /// Basename patterns of files and directories to skip
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,

    /// Basename patterns of files to check when walking directories
    #[serde(default = "default_filename")]
    pub filename: Vec<String>,
}

/// Partial configuration for TOML parsing
///
/// All fields are `Option<T>` so we can distinguish between
/// "explicitly set" and "not specified" when merging configs.
#[derive(Debug, Clone, Default, Deserialize)]
struct PartialConfig {
    pub select: Option<Vec<String>>,
    pub ignore: Option<Vec<String>>,
    pub max_line_length: Option<usize>,
    pub tab_size: Option<usize>,
    pub repeat: Option<bool>,
    pub fix: Option<bool>,
    pub in_place: Option<bool>,
    pub show_source: Option<bool>,
    pub show_pep8: Option<bool>,
    pub exclude: Option<Vec<String>>,
    pub filename: Option<Vec<String>>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            select: Vec::new(),
            ignore: default_ignore(),
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
            tab_size: DEFAULT_TAB_SIZE,
            repeat: false,
            fix: false,
            in_place: false,
            show_source: false,
            show_pep8: false,
            exclude: default_exclude(),
            filename: default_filename(),
        }
    }
}

impl Config {
    /// Maximum reasonable line length
    const MAX_LINE_LENGTH: usize = 1000;
    /// Maximum reasonable tab width
    const MAX_TAB_SIZE: usize = 16;

    /// Validate configuration values are within reasonable bounds
    ///
    /// Returns an error message if validation fails, None if valid.
    #[must_use]
    pub fn validate(&self) -> Option<String> {
        if self.max_line_length == 0 {
            return Some("max_line_length must be at least 1".to_string());
        }
        if self.max_line_length > Self::MAX_LINE_LENGTH {
            return Some(format!(
                "max_line_length {} exceeds maximum of {}",
                self.max_line_length,
                Self::MAX_LINE_LENGTH
            ));
        }
        if self.tab_size == 0 {
            return Some("tab_size must be at least 1".to_string());
        }
        if self.tab_size > Self::MAX_TAB_SIZE {
            return Some(format!(
                "tab_size {} exceeds maximum of {}",
                self.tab_size,
                Self::MAX_TAB_SIZE
            ));
        }
        if self.in_place && !self.fix {
            return Some("in_place requires fix".to_string());
        }
        None
    }

    /// Load configuration from a TOML file
    pub fn from_toml_file(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let partial: PartialConfig = toml::from_str(&contents)?;
        let mut config = Self::default();
        config.apply_partial(&partial);
        Ok(config)
    }

    /// Apply a partial config, only overriding fields that are explicitly set
    fn apply_partial(&mut self, partial: &PartialConfig) {
        if let Some(v) = &partial.select {
            self.select.clone_from(v);
        }
        if let Some(v) = &partial.ignore {
            self.ignore.clone_from(v);
        }
        if let Some(v) = partial.max_line_length {
            self.max_line_length = v;
        }
        if let Some(v) = partial.tab_size {
            self.tab_size = v;
        }
        if let Some(v) = partial.repeat {
            self.repeat = v;
        }
        if let Some(v) = partial.fix {
            self.fix = v;
        }
        if let Some(v) = partial.in_place {
            self.in_place = v;
        }
        if let Some(v) = partial.show_source {
            self.show_source = v;
        }
        if let Some(v) = partial.show_pep8 {
            self.show_pep8 = v;
        }
        if let Some(v) = &partial.exclude {
            self.exclude = v.iter().map(|p| p.trim_end_matches('/').to_string()).collect();
        }
        if let Some(v) = &partial.filename {
            self.filename.clone_from(v);
        }
    }

    /// Discover config files from parent directories of a given path
    ///
    /// Searches from the path's directory up to the root, then adds home directory config.
    /// Returns list of config file paths in order of priority (least specific first).
    #[must_use]
    pub fn discover_config_files(start_path: &Path) -> Vec<PathBuf> {
        let mut config_files = Vec::new();

        // Home directory config first (lowest priority)
        if let Some(home) = dirs_home() {
            for config_name in CONFIG_FILE_NAMES {
                let home_config = home.join(config_name);
                if home_config.is_file() {
                    config_files.push(home_config);
                }
            }
        }

        let start_dir = if start_path.is_file() {
            start_path.parent().map(Path::to_path_buf)
        } else if start_path.is_dir() {
            Some(start_path.to_path_buf())
        } else {
            std::env::current_dir().ok()
        };

        if let Some(dir) = start_dir {
            let mut ancestors: Vec<PathBuf> = dir.ancestors().map(Path::to_path_buf).collect();
            // Root first, so closer files override
            ancestors.reverse();

            for ancestor in ancestors {
                for config_name in CONFIG_FILE_NAMES {
                    let config_path = ancestor.join(config_name);
                    if config_path.is_file() && !config_files.contains(&config_path) {
                        config_files.push(config_path);
                    }
                }
            }
        }

        config_files
    }

    /// Load and merge configuration from discovered config files
    ///
    /// Later files override earlier ones (only explicitly set values).
    /// Returns default config if no files found.
    #[must_use]
    pub fn from_discovered_files(start_path: &Path) -> Self {
        let mut config = Self::default();
        for path in &Self::discover_config_files(start_path) {
            match std::fs::read_to_string(path) {
                Ok(contents) => match toml::from_str::<PartialConfig>(&contents) {
                    Ok(partial) => config.apply_partial(&partial),
                    Err(e) => warn!("failed to parse {}: {e}", path.display()),
                },
                Err(e) => warn!("failed to read {}: {e}", path.display()),
            }
        }
        config
    }

    /// Select/ignore policy derived from this configuration
    #[must_use]
    pub fn code_filter(&self) -> CodeFilter {
        CodeFilter::new(self.select.clone(), self.ignore.clone())
    }
}

/// Prefix-based inclusion/exclusion of violation codes
///
/// A selected code is always reported. Once any prefix is selected, every
/// code that is not selected is suppressed; otherwise the ignore prefixes
/// decide.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeFilter {
    select: Vec<String>,
    ignore: Vec<String>,
}

impl CodeFilter {
    #[must_use]
    pub fn new(select: Vec<String>, ignore: Vec<String>) -> Self {
        Self { select, ignore }
    }

    /// A filter that suppresses nothing
    #[must_use]
    pub fn allow_all() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_suppressed(&self, code: &str) -> bool {
        if self.select.iter().any(|prefix| code.starts_with(prefix.as_str())) {
            return false;
        }
        if !self.select.is_empty() {
            return true;
        }
        self.ignore.iter().any(|prefix| code.starts_with(prefix.as_str()))
    }

    /// True when every code in `codes` is suppressed (and there is at least one)
    #[must_use]
    pub fn suppresses_all(&self, codes: &[&str]) -> bool {
        !codes.is_empty() && codes.iter().all(|code| self.is_suppressed(code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter(select: &[&str], ignore: &[&str]) -> CodeFilter {
        CodeFilter::new(to_strings(select), to_strings(ignore))
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.max_line_length, 120);
        assert_eq!(config.tab_size, 8);
        assert_eq!(config.ignore, vec!["E24"]);
        assert!(config.select.is_empty());
        assert_eq!(config.filename, vec!["*.py"]);
        assert!(config.exclude.contains(&".git".to_string()));
        assert!(!config.fix);
    }

    #[test]
    fn test_split_list() {
        assert_eq!(split_list("E4, W6,,E225"), vec!["E4", "W6", "E225"]);
        assert!(split_list("").is_empty());
    }

    #[test]
    fn test_default_filter_ignores_e24() {
        let f = Config::default().code_filter();
        assert!(f.is_suppressed("E241"));
        assert!(f.is_suppressed("E242"));
        assert!(!f.is_suppressed("E225"));
    }

    #[test]
    fn test_select_wins_over_ignore() {
        let f = filter(&["E241"], &["E24"]);
        assert!(!f.is_suppressed("E241"));
        assert!(f.is_suppressed("E242"));
    }

    #[test]
    fn test_select_suppresses_everything_else() {
        let f = filter(&["E2"], &[]);
        assert!(!f.is_suppressed("E225"));
        assert!(f.is_suppressed("E501"));
        assert!(f.is_suppressed("W191"));
    }

    #[test]
    fn test_suppression_matches_reporting_policy() {
        let cases: &[(&[&str], &[&str])] = &[
            (&[], &[]),
            (&[], &["E2", "W"]),
            (&["E3"], &[]),
            (&["W6", "E1"], &["E"]),
        ];
        let codes = ["E101", "E225", "E241", "E302", "E501", "W191", "W601"];
        for (select, ignore) in cases {
            let f = filter(select, ignore);
            for code in codes {
                let reported = select.iter().any(|p| code.starts_with(p))
                    || (select.is_empty() && !ignore.iter().any(|p| code.starts_with(p)));
                assert_eq!(!f.is_suppressed(code), reported, "{code} {select:?} {ignore:?}");
            }
        }
    }

    #[test]
    fn test_suppresses_all() {
        let f = filter(&[], &["E24"]);
        assert!(f.suppresses_all(&["E241", "E242"]));
        assert!(!f.suppresses_all(&["E221", "E241"]));
        assert!(!f.suppresses_all(&[]));
    }

    #[test]
    fn test_config_apply_partial() {
        let mut base = Config::default();
        let partial = PartialConfig {
            max_line_length: Some(79),
            select: Some(vec!["E".to_string()]),
            ..Default::default()
        };
        base.apply_partial(&partial);
        assert_eq!(base.max_line_length, 79);
        assert_eq!(base.select, vec!["E"]);
        // Untouched fields keep their values
        assert_eq!(base.ignore, vec!["E24"]);
        assert_eq!(base.tab_size, 8);
    }

    #[test]
    fn test_config_apply_partial_trims_exclude_slashes() {
        let mut base = Config::default();
        let partial = PartialConfig {
            exclude: Some(vec!["build/".to_string(), "*.pyc".to_string()]),
            ..Default::default()
        };
        base.apply_partial(&partial);
        assert_eq!(base.exclude, vec!["build", "*.pyc"]);
    }

    #[test]
    fn test_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pep8check.toml");
        std::fs::write(&path, "max_line_length = 79\nignore = [\"E501\", \"W\"]\nrepeat = true\n")
            .unwrap();
        let config = Config::from_toml_file(&path).unwrap();
        assert_eq!(config.max_line_length, 79);
        assert_eq!(config.ignore, vec!["E501", "W"]);
        assert!(config.repeat);
    }

    #[test]
    fn test_discovered_files_closest_wins() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("pkg");
        std::fs::create_dir(&nested).unwrap();
        std::fs::write(dir.path().join("pep8check.toml"), "max_line_length = 100\ntab_size = 4\n")
            .unwrap();
        std::fs::write(nested.join("pep8check.toml"), "max_line_length = 90\n").unwrap();
        let config = Config::from_discovered_files(&nested);
        assert_eq!(config.max_line_length, 90);
        assert_eq!(config.tab_size, 4);
    }

    #[test]
    fn test_validate_default_config() {
        assert!(Config::default().validate().is_none());
    }

    #[test]
    fn test_validate_bounds() {
        let config = Config {
            max_line_length: 0,
            ..Default::default()
        };
        assert!(config.validate().unwrap().contains("max_line_length"));

        let config = Config {
            tab_size: 40,
            ..Default::default()
        };
        assert!(config.validate().unwrap().contains("tab_size"));
    }

    #[test]
    fn test_validate_in_place_requires_fix() {
        let config = Config {
            in_place: true,
            ..Default::default()
        };
        assert!(config.validate().is_some());
    }
}
