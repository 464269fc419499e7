//! Centralized path resolution for gravity-pulse
//!
//! All file paths are resolved through this module so terminal runs and
//! tests agree on where data lives. Platform application-data locations:
//! - **macOS**: `~/Library/Application Support/GravityPulse/`
//! - **Windows**: `%LOCALAPPDATA%\GravityPulse\`
//! - **Linux**: `$XDG_DATA_HOME/GravityPulse/` (fallback `~/.local/share/GravityPulse/`)

use once_cell::sync::Lazy;
use std::path::PathBuf;

const APP_DIR: &str = "GravityPulse";

/// Lazy-initialized base directory (thread-safe)
static BASE_DIRECTORY: Lazy<PathBuf> = Lazy::new(resolve_base_directory);

fn resolve_base_directory() -> PathBuf {
    if let Some(dir) = dirs::data_local_dir() {
        return dir.join(APP_DIR);
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(format!(".{}", APP_DIR.to_lowercase()));
    }
    // Last resort: current working directory
    PathBuf::from(".").join(APP_DIR)
}

/// Base data directory for all gravity-pulse files
pub fn base_dir() -> PathBuf {
    BASE_DIRECTORY.clone()
}

/// Price history database (append-only collector output)
pub fn prices_db_path() -> PathBuf {
    base_dir().join("prices.db")
}

/// Ledger database (wallet, trade history, open positions)
pub fn ledger_db_path() -> PathBuf {
    base_dir().join("ledger.db")
}

/// Operator config file
pub fn config_path() -> PathBuf {
    base_dir().join("config.toml")
}

/// Create the base directory tree if missing. Must run before any store is
/// opened.
pub fn ensure_directories() -> std::io::Result<()> {
    std::fs::create_dir_all(base_dir())
}
