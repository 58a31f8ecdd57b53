// Smartmark platform abstraction
// Provides platform-specific config and data paths for Windows, macOS, and Linux.
//
// Uses `cfg(target_os)` for conditional compilation to select the correct
// platform-specific implementation at compile time.

use std::path::PathBuf;

#[cfg(target_os = "linux")]
mod linux;

#[cfg(target_os = "macos")]
mod macos;

#[cfg(target_os = "windows")]
mod windows;

/// Overrides the data directory on every platform.
pub const DATA_DIR_ENV: &str = "SMARTMARK_DATA_DIR";

/// Returns the platform-specific configuration directory for Smartmark.
///
/// - **Linux**: `~/.config/smartmark` (or `$XDG_CONFIG_HOME/smartmark`)
/// - **macOS**: `~/Library/Application Support/Smartmark`
/// - **Windows**: `%APPDATA%/Smartmark`
pub fn get_config_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        linux::get_config_dir()
    }
    #[cfg(target_os = "macos")]
    {
        macos::get_config_dir()
    }
    #[cfg(target_os = "windows")]
    {
        windows::get_config_dir()
    }
}

/// Returns the data directory holding the bookmark database.
///
/// `$SMARTMARK_DATA_DIR` wins when set; otherwise:
/// - **Linux**: `~/.local/share/smartmark` (or `$XDG_DATA_HOME/smartmark`)
/// - **macOS**: `~/Library/Application Support/Smartmark`
/// - **Windows**: `%LOCALAPPDATA%/Smartmark`
pub fn get_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        return PathBuf::from(dir);
    }
    #[cfg(target_os = "linux")]
    {
        linux::get_data_dir()
    }
    #[cfg(target_os = "macos")]
    {
        macos::get_data_dir()
    }
    #[cfg(target_os = "windows")]
    {
        windows::get_data_dir()
    }
}
