/// Application paths
pub mod paths {
    /// Directory under the platform data dir holding SiteCraft state
    pub const APP_DIR: &str = "sitecraft";
    /// Configuration file name inside the app directory
    pub const CONFIG_FILE: &str = "config.json";
}

/// Default values for configuration
pub mod defaults {
    /// Interval between rotating progress messages (ms)
    pub const PROGRESS_INTERVAL_MS: u64 = 2000;
    /// Deadline for a single generation call (s)
    pub const REQUEST_TIMEOUT_SECS: u64 = inference::constants::timeouts::GENERATION_SECS;
}
