use std::path::PathBuf;

#[cfg(unix)]
const REGISTRY_FILE: &str = "/tmp/pids";
#[cfg(unix)]
const SENTINEL_FILE: &str = "/tmp/stop_signal";

#[cfg(windows)]
const REGISTRY_FILE: &str = r"C:\Temp\pids.txt";
#[cfg(windows)]
const SENTINEL_FILE: &str = r"C:\Temp\stop_signal.txt";

/// Pid registry location when none is configured
pub fn default_registry_path() -> PathBuf {
    PathBuf::from(REGISTRY_FILE)
}

/// Stop signal file location when none is configured
pub fn default_sentinel_path() -> PathBuf {
    PathBuf::from(SENTINEL_FILE)
}
