//! Path handling for synq-monitors
//!
//! Config directory resolution, `~`/env expansion and YAML discovery.
//!
//! # Environment Variables
//!
//! - `SYNQ_MONITORS_CONFIG_DIR` - Override config directory
//!
//! # Path Resolution Priority
//!
//! For config_dir():
//! 1. `SYNQ_MONITORS_CONFIG_DIR` environment variable
//! 2. `XDG_CONFIG_HOME/synq-monitors` (if set)
//! 3. Platform default:
//!    - Windows: `%APPDATA%\synq-monitors`
//!    - macOS/Linux: `~/.config/synq-monitors`

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Environment variable for config directory override
pub const ENV_CONFIG_DIR: &str = "SYNQ_MONITORS_CONFIG_DIR";

const APP_DIR: &str = "synq-monitors";

/// Get the config directory path
pub fn config_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(ENV_CONFIG_DIR) {
        let path = expand(&dir);
        log::debug!(
            "Using config dir from {}: {}",
            ENV_CONFIG_DIR,
            path.display()
        );
        return Ok(path);
    }

    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        let path = PathBuf::from(xdg_config).join(APP_DIR);
        log::debug!("Using XDG_CONFIG_HOME: {}", path.display());
        return Ok(path);
    }

    #[cfg(windows)]
    {
        if let Some(app_data) = dirs::config_dir() {
            let path = app_data.join(APP_DIR);
            log::debug!("Using Windows config dir: {}", path.display());
            return Ok(path);
        }
    }

    let home = dirs::home_dir().context("Could not determine home directory")?;
    let path = home.join(".config").join(APP_DIR);
    log::debug!("Using default config dir: {}", path.display());
    Ok(path)
}

/// Default location of the config file
pub fn config_file() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

/// Expand ~ and environment variables in a path string.
///
/// Unknown variables are left as written.
///
/// ```
/// let home_path = paths::expand("~/monitors");
/// let var_path = paths::expand("$HOME/monitors");
/// ```
pub fn expand(path: &str) -> PathBuf {
    let expanded = shellexpand::full(path).unwrap_or(std::borrow::Cow::Borrowed(path));
    PathBuf::from(expanded.as_ref())
}

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"))
}

fn is_hidden(entry: &walkdir::DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with('.'))
}

/// Find every `.yaml`/`.yml` file under `root`, sorted.
///
/// Hidden files and directories (`.git`, `.github`, ...) are skipped.
pub fn find_yaml_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_entry(|e| !is_hidden(e))
    {
        let entry = entry.with_context(|| format!("Failed to walk {}", root.display()))?;
        if entry.file_type().is_file() && is_yaml(entry.path()) {
            files.push(entry.into_path());
        }
    }
    files.sort();
    log::debug!("Found {} YAML files under {}", files.len(), root.display());
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_expand_with_tilde() {
        let result = expand("~/test/path");
        let home = dirs::home_dir().unwrap();
        assert_eq!(result, home.join("test").join("path"));
    }

    #[test]
    fn test_expand_absolute() {
        assert_eq!(expand("/absolute/path"), PathBuf::from("/absolute/path"));
    }

    #[test]
    fn test_expand_unknown_env_var_unchanged() {
        let result = expand("/path/$NONEXISTENT_VAR_12345/file");
        assert_eq!(result, PathBuf::from("/path/$NONEXISTENT_VAR_12345/file"));
    }

    #[test]
    fn test_config_file_name() {
        let file = config_file().unwrap();
        assert_eq!(file.file_name().unwrap(), "config.toml");
    }

    #[test]
    fn test_find_yaml_files() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("nested/deeper")).unwrap();
        fs::create_dir_all(dir.path().join(".github")).unwrap();
        fs::write(dir.path().join("a.yaml"), "").unwrap();
        fs::write(dir.path().join("nested/b.yml"), "").unwrap();
        fs::write(dir.path().join("nested/deeper/c.YAML"), "").unwrap();
        fs::write(dir.path().join("nested/notes.txt"), "").unwrap();
        fs::write(dir.path().join(".github/ci.yaml"), "").unwrap();

        let files = find_yaml_files(dir.path()).unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|f| f.strip_prefix(dir.path()).unwrap().display().to_string())
            .collect();
        assert_eq!(names, vec!["a.yaml", "nested/b.yml", "nested/deeper/c.YAML"]);
    }

    #[test]
    fn test_find_yaml_files_missing_root() {
        let dir = TempDir::new().unwrap();
        assert!(find_yaml_files(&dir.path().join("missing")).is_err());
    }
}
