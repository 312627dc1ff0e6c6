//! Runtime configuration. Everything has a default under the user's home
//! directory; the command line may override individual paths.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use directories::BaseDirs;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".song-catalog";
/// SQLite file name stored inside the application data directory.
const DB_FILE_NAME: &str = "catalog.sqlite";
/// Log file written next to the database.
const LOG_FILE_NAME: &str = "song-catalog.log";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub database_path: PathBuf,
    pub log_path: PathBuf,
    /// Raise the default log level from `info` to `debug`.
    pub verbose: bool,
}

impl AppConfig {
    /// Resolve the configuration, only touching the home directory when one
    /// of the paths was not given explicitly.
    pub fn resolve(
        database: Option<PathBuf>,
        log_file: Option<PathBuf>,
        verbose: bool,
    ) -> Result<Self> {
        let mut config = match (database, log_file) {
            (Some(database_path), Some(log_path)) => Self {
                database_path,
                log_path,
                verbose: false,
            },
            (database, log_file) => {
                let mut config = Self::in_dir(&default_data_dir()?);
                if let Some(database_path) = database {
                    config.database_path = database_path;
                }
                if let Some(log_path) = log_file {
                    config.log_path = log_path;
                }
                config
            }
        };
        config.verbose = verbose;
        Ok(config)
    }

    /// Configuration rooted at an explicit directory instead of the home.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            database_path: dir.join(DB_FILE_NAME),
            log_path: dir.join(LOG_FILE_NAME),
            verbose: false,
        }
    }

    /// Default log directive when `RUST_LOG` is not set.
    pub fn log_directive(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else {
            "info"
        }
    }
}

/// Resolve `~/.song-catalog`.
fn default_data_dir() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME))
}

/// Create the directory that will hold `path`, if it has one.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_paths_win() {
        let config = AppConfig::resolve(
            Some(PathBuf::from("/tmp/a.sqlite")),
            Some(PathBuf::from("/tmp/a.log")),
            true,
        )
        .unwrap();
        assert_eq!(config.database_path, PathBuf::from("/tmp/a.sqlite"));
        assert_eq!(config.log_path, PathBuf::from("/tmp/a.log"));
        assert_eq!(config.log_directive(), "debug");
    }

    #[test]
    fn in_dir_places_both_files_together() {
        let config = AppConfig::in_dir(Path::new("/data"));
        assert_eq!(config.database_path, Path::new("/data").join(DB_FILE_NAME));
        assert_eq!(config.log_path, Path::new("/data").join(LOG_FILE_NAME));
        assert_eq!(config.log_directive(), "info");
    }

    #[test]
    fn ensure_parent_dir_creates_nested_directories() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested").join("deeper").join("catalog.sqlite");
        ensure_parent_dir(&target).unwrap();
        assert!(target.parent().unwrap().is_dir());

        ensure_parent_dir(Path::new("relative.sqlite")).unwrap();
    }
}
