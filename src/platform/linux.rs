// Smartmark platform paths for Linux
// Config: ~/.config/smartmark
// Data:   ~/.local/share/smartmark

use std::env;
use std::path::PathBuf;

fn home_dir() -> PathBuf {
    PathBuf::from(env::var("HOME").unwrap_or_else(|_| String::from("/tmp")))
}

/// `$XDG_CONFIG_HOME/smartmark` if set, otherwise `~/.config/smartmark`.
pub fn get_config_dir() -> PathBuf {
    match env::var("XDG_CONFIG_HOME") {
        Ok(xdg) => PathBuf::from(xdg).join("smartmark"),
        Err(_) => home_dir().join(".config").join("smartmark"),
    }
}

/// `$XDG_DATA_HOME/smartmark` if set, otherwise `~/.local/share/smartmark`.
pub fn get_data_dir() -> PathBuf {
    match env::var("XDG_DATA_HOME") {
        Ok(xdg) => PathBuf::from(xdg).join("smartmark"),
        Err(_) => home_dir().join(".local").join("share").join("smartmark"),
    }
}
