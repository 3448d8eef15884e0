//! Platform-specific directory paths.
//!
//! Uses XDG on Linux, standard locations on macOS/Windows.

use std::path::PathBuf;

use directories::ProjectDirs;

const QUALIFIER: &str = "dev";
const ORGANIZATION: &str = "sortable-table";
const APPLICATION: &str = "sortable-table";

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
}

/// Default table configuration file.
///
/// - Linux: `$XDG_CONFIG_HOME/sortable-table/table.json`
/// - macOS: `~/Library/Application Support/dev.sortable-table.sortable-table/table.json`
pub fn config_file() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join("table.json"))
}

/// Default log file, `latest.log` in the cache directory.
pub fn log_file() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.cache_dir().join("latest.log"))
}
