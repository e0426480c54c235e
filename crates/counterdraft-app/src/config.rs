// Configuration loading and parsing (config/draft.toml).

use std::path::{Path, PathBuf};

use counterdraft_core::draft::MAX_PICKS_LIMIT;
use counterdraft_core::estimate::WinModel;
use serde::Deserialize;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Config structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub data_paths: DataPaths,
    pub draft: DraftConfig,
    pub win_model: WinModel,
    /// Room synchronization settings; `None` disables sync.
    pub sync: Option<SyncConfig>,
}

/// Raw deserialization target for the entire draft.toml file.
#[derive(Debug, Clone, Deserialize)]
struct DraftFile {
    data: DataPaths,
    draft: DraftConfig,
    #[serde(default)]
    win_model: WinModel,
    #[serde(default)]
    sync: Option<SyncConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataPaths {
    pub counters: String,
    pub lanes: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DraftConfig {
    #[serde(default = "default_room")]
    pub room: String,
    #[serde(default = "default_max_picks")]
    pub max_picks: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    /// Snapshots buffered per room before slow subscribers start lagging.
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

fn default_room() -> String {
    counterdraft_core::draft::DEFAULT_ROOM.to_string()
}

fn default_max_picks() -> usize {
    MAX_PICKS_LIMIT
}

fn default_capacity() -> usize {
    64
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate `config/draft.toml` relative to `base_dir`.
///
/// Does not copy defaults; prefer `load_config()`.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join("draft.toml");
    let text = read_file(&path)?;
    parse_config(&text, &path)
}

/// Parse and validate config text. `path` is only used for error messages.
pub fn parse_config(text: &str, path: &Path) -> Result<Config, ConfigError> {
    let file: DraftFile = toml::from_str(text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })?;

    let config = Config {
        data_paths: file.data,
        draft: file.draft,
        win_model: file.win_model,
        sync: file.sync,
    };

    validate(&config)?;

    Ok(config)
}

/// Ensure all config files exist by copying missing ones from `defaults/`.
/// Returns the list of files that were copied. Skips `.example` files.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.exists() {
        // Without defaults/ an existing config/ is used as is; with neither
        // there is nothing to load.
        if !config_dir.exists() {
            return Err(ConfigError::DefaultsCopyError {
                message: format!(
                    "neither defaults/ nor config/ directory found in {}; \
                     run from the app directory or ensure defaults/ is present",
                    base_dir.display()
                ),
            });
        }
        return Ok(vec![]);
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create config directory: {e}"),
    })?;

    let mut copied = Vec::new();

    let entries = std::fs::read_dir(&defaults_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to read defaults directory: {e}"),
    })?;

    for entry in entries {
        let entry = entry.map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to read defaults entry: {e}"),
        })?;
        let path = entry.path();

        // Skip non-files and entries without a file name
        if !path.is_file() {
            continue;
        }
        let Some(file_name) = path.file_name() else {
            continue;
        };

        // Skip .example template files
        if file_name.to_str().is_some_and(|n| n.ends_with(".example")) {
            continue;
        }
        let target = config_dir.join(file_name);

        match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
        {
            Ok(mut dest) => {
                let content = std::fs::read(&path).map_err(|e| ConfigError::DefaultsCopyError {
                    message: format!("failed to read {}: {e}", path.display()),
                })?;
                std::io::Write::write_all(&mut dest, &content).map_err(|e| {
                    ConfigError::DefaultsCopyError {
                        message: format!("failed to write {}: {e}", target.display()),
                    }
                })?;
                copied.push(target);
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                // Local edits in config/ are never overwritten
            }
            Err(e) => {
                return Err(ConfigError::DefaultsCopyError {
                    message: format!("failed to create {}: {e}", target.display()),
                });
            }
        }
    }

    Ok(copied)
}

/// Load config relative to the current working directory, copying default
/// files first.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

fn invalid(field: &str, message: String) -> ConfigError {
    ConfigError::ValidationError {
        field: field.into(),
        message,
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.draft.room.trim().is_empty() {
        return Err(invalid("draft.room", "must not be empty".into()));
    }

    let k = config.draft.max_picks;
    if !(1..=MAX_PICKS_LIMIT).contains(&k) {
        return Err(invalid(
            "draft.max_picks",
            format!("must be between 1 and {MAX_PICKS_LIMIT}, got {k}"),
        ));
    }

    let m = &config.win_model;
    if !(m.slope.is_finite() && m.slope > 0.0) {
        return Err(invalid("win_model.slope", format!("must be > 0, got {}", m.slope)));
    }
    if !m.midpoint.is_finite() {
        return Err(invalid("win_model.midpoint", "must be finite".into()));
    }
    if !(0.0..=1.0).contains(&m.floor) {
        return Err(invalid(
            "win_model.floor",
            format!("must be between 0.0 and 1.0 inclusive, got {}", m.floor),
        ));
    }
    if !(0.0..=1.0).contains(&m.ceiling) || m.ceiling <= m.floor {
        return Err(invalid(
            "win_model.ceiling",
            format!(
                "must be in (floor, 1.0], got {} with floor {}",
                m.ceiling, m.floor
            ),
        ));
    }

    if let Some(sync) = &config.sync {
        if sync.capacity == 0 {
            return Err(invalid("sync.capacity", "must be > 0".into()));
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    /// Helper: returns the app crate root (works whether `cargo test` runs
    /// from the crate directory or the workspace root).
    fn project_root() -> PathBuf {
        let cwd = std::env::current_dir().unwrap();
        if cwd.join("defaults").exists() {
            cwd
        } else if cwd.join("crates/counterdraft-app/defaults").exists() {
            cwd.join("crates/counterdraft-app")
        } else {
            panic!("Cannot locate defaults/ directory from CWD {:?}", cwd);
        }
    }

    fn defaults_text() -> String {
        fs::read_to_string(project_root().join("defaults/draft.toml")).unwrap()
    }

    fn parse(text: &str) -> Result<Config, ConfigError> {
        parse_config(text, Path::new("draft.toml"))
    }

    fn expect_invalid(text: &str, expected_field: &str) {
        match parse(text).unwrap_err() {
            ConfigError::ValidationError { field, .. } => assert_eq!(field, expected_field),
            other => panic!("expected ValidationError, got: {other}"),
        }
    }

    #[test]
    fn defaults_parse_and_validate() {
        let config = parse(&defaults_text()).expect("defaults should be valid");
        assert_eq!(config.data_paths.counters, "data/counters.csv");
        assert_eq!(config.data_paths.lanes, "data/lanes.csv");
        assert_eq!(config.draft.room, "public");
        assert_eq!(config.draft.max_picks, 5);
        assert_eq!(config.win_model, WinModel::default());
        assert_eq!(config.sync.as_ref().map(|s| s.capacity), Some(64));
    }

    #[test]
    fn optional_sections_fall_back_to_defaults() {
        let text = r#"
[data]
counters = "c.csv"
lanes = "l.csv"

[draft]
"#;
        let config = parse(text).unwrap();
        assert_eq!(config.draft.room, "public");
        assert_eq!(config.draft.max_picks, 5);
        assert_eq!(config.win_model, WinModel::default());
        assert!(config.sync.is_none());
    }

    #[test]
    fn partial_win_model_keeps_other_defaults() {
        let text = defaults_text().replace("slope = 0.35", "slope = 0.22");
        let config = parse(&text).unwrap();
        assert!((config.win_model.slope - 0.22).abs() < f64::EPSILON);
        assert!((config.win_model.midpoint - 6.0).abs() < f64::EPSILON);
    }

    #[test]
    fn rejects_max_picks_out_of_range() {
        for bad in ["max_picks = 0", "max_picks = 6"] {
            expect_invalid(&defaults_text().replace("max_picks = 5", bad), "draft.max_picks");
        }
    }

    #[test]
    fn rejects_empty_room() {
        expect_invalid(&defaults_text().replace("room = \"public\"", "room = \" \""), "draft.room");
    }

    #[test]
    fn rejects_non_positive_slope() {
        expect_invalid(&defaults_text().replace("slope = 0.35", "slope = 0.0"), "win_model.slope");
    }

    #[test]
    fn rejects_inverted_clamp() {
        let text = defaults_text()
            .replace("floor = 0.05", "floor = 0.9")
            .replace("ceiling = 0.95", "ceiling = 0.5");
        expect_invalid(&text, "win_model.ceiling");
        expect_invalid(&defaults_text().replace("floor = 0.05", "floor = -0.1"), "win_model.floor");
    }

    #[test]
    fn rejects_zero_sync_capacity() {
        expect_invalid(&defaults_text().replace("capacity = 64", "capacity = 0"), "sync.capacity");
    }

    #[test]
    fn parse_error_for_invalid_toml() {
        match parse("this is not valid [[[ toml").unwrap_err() {
            ConfigError::ParseError { path, .. } => assert!(path.ends_with("draft.toml")),
            other => panic!("expected ParseError, got: {other}"),
        }
    }

    #[test]
    fn file_not_found_for_missing_draft_toml() {
        let tmp = std::env::temp_dir().join("counterdraft_config_missing");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(tmp.join("config")).unwrap();

        match load_config_from(&tmp).unwrap_err() {
            ConfigError::FileNotFound { path } => assert!(path.ends_with("draft.toml")),
            other => panic!("expected FileNotFound, got: {other}"),
        }

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_files_copies_missing_files() {
        let tmp = std::env::temp_dir().join("counterdraft_config_ensure_copies");
        let _ = fs::remove_dir_all(&tmp);

        let defaults_dir = tmp.join("defaults");
        fs::create_dir_all(&defaults_dir).unwrap();
        fs::copy(
            project_root().join("defaults/draft.toml"),
            defaults_dir.join("draft.toml"),
        )
        .unwrap();
        fs::write(defaults_dir.join("draft.toml.example"), "# template\n").unwrap();

        assert!(!tmp.join("config").exists());

        let copied = ensure_config_files(&tmp).expect("should succeed");
        assert_eq!(copied.len(), 1);
        assert!(tmp.join("config/draft.toml").exists());
        assert!(!tmp.join("config/draft.toml.example").exists());

        let config = load_config_from(&tmp).expect("copied defaults should load");
        assert_eq!(config.draft.room, "public");

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_files_skips_existing() {
        let tmp = std::env::temp_dir().join("counterdraft_config_ensure_skips");
        let _ = fs::remove_dir_all(&tmp);

        let defaults_dir = tmp.join("defaults");
        let config_dir = tmp.join("config");
        fs::create_dir_all(&defaults_dir).unwrap();
        fs::create_dir_all(&config_dir).unwrap();
        fs::copy(
            project_root().join("defaults/draft.toml"),
            defaults_dir.join("draft.toml"),
        )
        .unwrap();
        fs::write(config_dir.join("draft.toml"), "# custom\n").unwrap();

        let copied = ensure_config_files(&tmp).expect("should succeed");
        assert!(copied.is_empty());
        let content = fs::read_to_string(config_dir.join("draft.toml")).unwrap();
        assert_eq!(content, "# custom\n");

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_files_errors_when_both_dirs_missing() {
        let tmp = std::env::temp_dir().join("counterdraft_config_both_missing");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(&tmp).unwrap();

        match ensure_config_files(&tmp).unwrap_err() {
            ConfigError::DefaultsCopyError { message } => {
                assert!(message.contains("neither defaults/ nor config/"));
            }
            other => panic!("expected DefaultsCopyError, got: {other}"),
        }

        let _ = fs::remove_dir_all(&tmp);
    }
}
