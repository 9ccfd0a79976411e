//! Directory lookup following the XDG Base Directory specification
//!
//! - Config: `~/.config/fwflat/` - flattening options (`options.json`)

use directories::ProjectDirs;
use std::path::PathBuf;

/// Environment variable that overrides the config directory
pub const CONFIG_DIR_ENV: &str = "FWFLAT_CONFIG_DIR";

pub fn get_config_dir() -> Option<PathBuf> {
    if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV).filter(|d| !d.is_empty()) {
        return Some(PathBuf::from(dir));
    }
    ProjectDirs::from("com", "fwflat", "fwflat").map(|pd| pd.config_dir().to_path_buf())
}
