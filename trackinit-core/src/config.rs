//! Gating parameters and configuration file management.
//!
//! Reads/writes `~/.trackinit/config.yaml` with gating thresholds and
//! report preferences. Command-line flags override file values; the
//! resulting `GatingParams` is validated once before processing starts.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Serialize;

use crate::types::{Result, TrackError};

// ---------------------------------------------------------------------------
// Gating parameters
// ---------------------------------------------------------------------------

/// Process-wide gating thresholds, fixed for the duration of a run.
///
/// Only constructible through `new()` or `Default`, so the firm threshold
/// is always at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GatingParams {
    doppler_threshold: f64,
    range_threshold: f64,
    firm_threshold: u32,
    time_threshold: f64,
}

impl GatingParams {
    /// Build validated parameters.
    ///
    /// Float thresholds are taken as given, even when non-positive. A firm
    /// threshold below 1 would promote tracks on their first hit and is
    /// rejected.
    pub fn new(
        doppler_threshold: f64,
        range_threshold: f64,
        firm_threshold: i64,
        time_threshold: f64,
    ) -> Result<Self> {
        let firm_threshold = validate_firm_threshold(firm_threshold)?;
        Ok(GatingParams {
            doppler_threshold,
            range_threshold,
            firm_threshold,
            time_threshold,
        })
    }

    pub fn doppler_threshold(&self) -> f64 {
        self.doppler_threshold
    }

    pub fn range_threshold(&self) -> f64 {
        self.range_threshold
    }

    pub fn firm_threshold(&self) -> u32 {
        self.firm_threshold
    }

    pub fn time_threshold(&self) -> f64 {
        self.time_threshold
    }
}

impl Default for GatingParams {
    fn default() -> Self {
        GatingParams {
            doppler_threshold: 2.0,
            range_threshold: 10.0,
            firm_threshold: InitiationMode::ThreeState.firm_threshold(),
            time_threshold: 2.0,
        }
    }
}

fn validate_firm_threshold(value: i64) -> Result<u32> {
    if value < 1 {
        return Err(TrackError::InvalidFirmThreshold(value));
    }
    u32::try_from(value).map_err(|_| TrackError::InvalidFirmThreshold(value))
}

// ---------------------------------------------------------------------------
// Initiation modes
// ---------------------------------------------------------------------------

/// Named presets for the number of consecutive hits needed to confirm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitiationMode {
    ThreeState,
    FiveState,
    SevenState,
}

impl InitiationMode {
    pub const ALL: [InitiationMode; 3] = [
        InitiationMode::ThreeState,
        InitiationMode::FiveState,
        InitiationMode::SevenState,
    ];

    pub fn firm_threshold(self) -> u32 {
        match self {
            InitiationMode::ThreeState => 3,
            InitiationMode::FiveState => 5,
            InitiationMode::SevenState => 7,
        }
    }
}

impl FromStr for InitiationMode {
    type Err = TrackError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "3-state" => Ok(InitiationMode::ThreeState),
            "5-state" => Ok(InitiationMode::FiveState),
            "7-state" => Ok(InitiationMode::SevenState),
            other => Err(TrackError::UnknownMode(other.to_string())),
        }
    }
}

impl std::fmt::Display for InitiationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-state", self.firm_threshold())
    }
}

// ---------------------------------------------------------------------------
// Config file
// ---------------------------------------------------------------------------

/// Full configuration structure.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub gating: GatingParams,
    pub report: ReportConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportConfig {
    /// Include deleted tracks in reports.
    pub keep_deleted: bool,
    /// Emit JSON instead of tables.
    pub json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            gating: GatingParams::default(),
            report: ReportConfig {
                keep_deleted: false,
                json: false,
            },
        }
    }
}

/// Get the config directory path (`~/.trackinit/`).
pub fn config_dir() -> PathBuf {
    dirs_home().join(".trackinit")
}

/// Get the config file path.
pub fn config_file() -> PathBuf {
    config_dir().join("config.yaml")
}

fn dirs_home() -> PathBuf {
    std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}

/// Load config from `~/.trackinit/config.yaml`.
///
/// Returns default config if the file doesn't exist or can't be parsed.
pub fn load_config() -> Config {
    let path = config_file();
    if !path.exists() {
        return Config::default();
    }

    match load_config_from(&path) {
        Ok(config) => config,
        Err(e) => {
            log::warn!("ignoring {}: {e}", path.display());
            Config::default()
        }
    }
}

/// Load config from an explicit path, surfacing parse errors.
pub fn load_config_from(path: &Path) -> Result<Config> {
    let text = std::fs::read_to_string(path)?;
    parse_config(&text)
}

/// Save config to `~/.trackinit/config.yaml`.
pub fn save_config(config: &Config) -> Result<PathBuf> {
    let path = config_file();
    save_config_to(config, &path)?;
    Ok(path)
}

/// Save config to an explicit path, creating parent directories.
pub fn save_config_to(config: &Config, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| TrackError::Config(e.to_string()))?;
    }
    std::fs::write(path, serialize_config(config)).map_err(|e| TrackError::Config(e.to_string()))
}

/// Parse simple YAML-like config text.
fn parse_config(text: &str) -> Result<Config> {
    let mut config = Config::default();
    let mut current_section: Option<String> = None;

    for (lineno, line) in text.lines().enumerate() {
        let stripped = strip_comment(line).trim();
        if stripped.is_empty() {
            continue;
        }

        let is_indented = line.starts_with("  ") || line.starts_with('\t');
        let Some((key, val)) = stripped.split_once(':') else {
            return Err(TrackError::Config(format!(
                "line {}: expected `key: value`",
                lineno + 1
            )));
        };
        let key = key.trim();
        let val = val.trim();

        if !is_indented {
            current_section = val.is_empty().then(|| key.to_string());
            continue;
        }

        let bad = |what: &str| {
            TrackError::Config(format!("line {}: invalid {what}: {val}", lineno + 1))
        };

        match (current_section.as_deref(), key) {
            (Some("gating"), "doppler_threshold") => {
                if let Some(v) = parse_float_value(val).map_err(|_| bad(key))? {
                    config.gating.doppler_threshold = v;
                }
            }
            (Some("gating"), "range_threshold") => {
                if let Some(v) = parse_float_value(val).map_err(|_| bad(key))? {
                    config.gating.range_threshold = v;
                }
            }
            (Some("gating"), "time_threshold") => {
                if let Some(v) = parse_float_value(val).map_err(|_| bad(key))? {
                    config.gating.time_threshold = v;
                }
            }
            (Some("gating"), "firm_threshold") => {
                if let Some(v) = parse_string_value(val) {
                    let n: i64 = v.parse().map_err(|_| bad(key))?;
                    config.gating.firm_threshold = validate_firm_threshold(n)
                        .map_err(|e| TrackError::Config(format!("line {}: {e}", lineno + 1)))?;
                }
            }
            (Some("gating"), "mode") => {
                if let Some(v) = parse_string_value(val) {
                    let mode: InitiationMode = v
                        .parse()
                        .map_err(|e| TrackError::Config(format!("line {}: {e}", lineno + 1)))?;
                    config.gating.firm_threshold = mode.firm_threshold();
                }
            }
            (Some("report"), "keep_deleted") => {
                if let Some(v) = parse_bool_value(val).map_err(|_| bad(key))? {
                    config.report.keep_deleted = v;
                }
            }
            (Some("report"), "json") => {
                if let Some(v) = parse_bool_value(val).map_err(|_| bad(key))? {
                    config.report.json = v;
                }
            }
            (section, key) => {
                log::debug!("config: ignoring unknown key {key} in {section:?}");
            }
        }
    }

    Ok(config)
}

/// Cut a trailing `# comment`. A `#` only starts a comment at the start of
/// the line or after whitespace, and never inside quotes.
fn strip_comment(line: &str) -> &str {
    let mut quote: Option<char> = None;
    let mut after_space = true;

    for (idx, c) in line.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '"' || c == '\'' => quote = Some(c),
            None if c == '#' && after_space => return &line[..idx],
            None => {}
        }
        after_space = c.is_whitespace();
    }
    line
}

fn parse_string_value(val: &str) -> Option<String> {
    if val == "null" || val == "~" || val.is_empty() {
        return None;
    }
    // Strip quotes
    if val.len() >= 2
        && ((val.starts_with('"') && val.ends_with('"'))
            || (val.starts_with('\'') && val.ends_with('\'')))
    {
        return Some(val[1..val.len() - 1].to_string());
    }
    Some(val.to_string())
}

fn parse_float_value(val: &str) -> std::result::Result<Option<f64>, std::num::ParseFloatError> {
    match parse_string_value(val) {
        Some(v) => v.parse().map(Some),
        None => Ok(None),
    }
}

fn parse_bool_value(val: &str) -> std::result::Result<Option<bool>, std::str::ParseBoolError> {
    match parse_string_value(val) {
        Some(v) => v.parse().map(Some),
        None => Ok(None),
    }
}

/// Serialize config to YAML-like text.
fn serialize_config(config: &Config) -> String {
    let g = &config.gating;
    let mut lines = vec!["# trackinit configuration".to_string(), String::new()];

    lines.push("gating:".into());
    lines.push(format!("  doppler_threshold: {:?}", g.doppler_threshold));
    lines.push(format!("  range_threshold: {:?}", g.range_threshold));
    lines.push(format!("  time_threshold: {:?}", g.time_threshold));
    lines.push(format!("  firm_threshold: {}", g.firm_threshold));
    lines.push(String::new());

    lines.push("report:".into());
    lines.push(format!("  keep_deleted: {}", config.report.keep_deleted));
    lines.push(format!("  json: {}", config.report.json));

    lines.join("\n") + "\n"
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
