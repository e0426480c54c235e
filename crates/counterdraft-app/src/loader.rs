// Counter and lane table loading from disk.
//
// The path-based loaders wrap the core parsers. Read failures are reported as
// `LoadError` by the `read_*` functions; the `load_*` wrappers log them and
// fall back to an empty table so the assistant can still start.

use std::fs::File;
use std::path::Path;

use counterdraft_core::dataset::{parse_counter_table, CounterDataset};
use counterdraft_core::roles::{parse_lane_table, RoleMap};
use tracing::{info, warn};

use crate::config::DataPaths;

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

/// Everything read from the data files, ready for the engine.
#[derive(Debug, Clone, Default)]
pub struct Tables {
    pub dataset: CounterDataset,
    pub roles: RoleMap,
}

fn open(path: &Path) -> Result<File, LoadError> {
    File::open(path).map_err(|e| LoadError::Io {
        path: path.display().to_string(),
        source: e,
    })
}

/// Read a counter table. Malformed rows are skipped by the parser.
pub fn read_counters(path: &Path) -> Result<CounterDataset, LoadError> {
    Ok(parse_counter_table(open(path)?))
}

/// Read a lane table. A table without a usable header yields an empty map.
pub fn read_lanes(path: &Path) -> Result<RoleMap, LoadError> {
    Ok(parse_lane_table(open(path)?))
}

/// Like `read_counters`, but an unreadable file gives an empty dataset.
pub fn load_counters(path: &Path) -> CounterDataset {
    match read_counters(path) {
        Ok(dataset) => {
            if dataset.is_empty() {
                warn!("counter table {} has no usable rows", path.display());
            }
            dataset
        }
        Err(e) => {
            warn!("{}; continuing without counter data", e);
            CounterDataset::default()
        }
    }
}

/// Like `read_lanes`, but an unreadable file gives an empty role map.
pub fn load_lanes(path: &Path) -> RoleMap {
    match read_lanes(path) {
        Ok(roles) => roles,
        Err(e) => {
            warn!("{}; suggestions will not be lane-constrained", e);
            RoleMap::default()
        }
    }
}

pub fn load_tables(paths: &DataPaths) -> Tables {
    let dataset = load_counters(Path::new(&paths.counters));
    let roles = load_lanes(Path::new(&paths.lanes));
    info!(
        "loaded {} matchup records and {} hero lanes",
        dataset.len(),
        roles.len()
    );
    Tables { dataset, roles }
}

#[cfg(test)]
mod tests {
    use super::*;
    use counterdraft_core::roles::Role;
    use std::fs;
    use std::path::PathBuf;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(name);
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn read_counters_reports_missing_file() {
        let err = read_counters(Path::new("/nonexistent/counters.csv")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/counters.csv"));
    }

    #[test]
    fn missing_files_degrade_to_empty_tables() {
        let tables = load_tables(&DataPaths {
            counters: "/nonexistent/counters.csv".into(),
            lanes: "/nonexistent/lanes.csv".into(),
        });
        assert!(tables.dataset.is_empty());
        assert!(tables.roles.is_empty());
    }

    #[test]
    fn loads_both_tables_from_disk() {
        let dir = temp_dir("counterdraft_loader_both");
        let counters = dir.join("counters.csv");
        let lanes = dir.join("lanes.csv");
        fs::write(&counters, "my_hero;enemy_hero;score\nAamon;Fanny;4,5\n").unwrap();
        fs::write(&lanes, "hero,lane\nAamon,Jungle\n").unwrap();

        let tables = load_tables(&DataPaths {
            counters: counters.display().to_string(),
            lanes: lanes.display().to_string(),
        });
        assert_eq!(tables.dataset.len(), 1);
        assert_eq!(tables.dataset.score_table().lookup("aamon", "FANNY"), Some(4.5));
        assert_eq!(tables.roles.role_of("AAMON"), Some(Role::Jungle));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn headerless_lane_file_loads_as_empty() {
        let dir = temp_dir("counterdraft_loader_headerless");
        let lanes = dir.join("lanes.csv");
        fs::write(&lanes, "Aamon,Jungle\nFanny,Jungle\n").unwrap();

        assert!(load_lanes(&lanes).is_empty());

        let _ = fs::remove_dir_all(&dir);
    }
}
