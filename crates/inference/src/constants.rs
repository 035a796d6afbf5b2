//! Library-wide constants
//!
//! Single source of truth for endpoints and generation defaults.

/// Default values for generation configuration
pub mod defaults {
    /// Default Gemini model
    pub const GEMINI_MODEL: &str = "gemini-3-pro-preview";
    /// Default model for OpenAI-compatible servers
    pub const OPENAI_COMPAT_MODEL: &str = "gpt-4o";
    /// Sampling temperature; kept low for precise code
    pub const TEMPERATURE: f32 = 0.4;
    /// Reasoning token budget for thinking models
    pub const THINKING_BUDGET: u32 = 4096;
    /// Name of the backend used when none is configured
    pub const BACKEND: &str = "gemini";
}

/// Timeout configuration (in seconds)
pub mod timeouts {
    /// Maximum time to wait for one generation call
    pub const GENERATION_SECS: u64 = 180;
    /// Connection establishment timeout for the HTTP client
    pub const CONNECT_SECS: u64 = 15;
}

/// Base URLs of hosted APIs
pub mod endpoints {
    /// Google Generative Language API
    pub const GEMINI: &str = "https://generativelanguage.googleapis.com";
    /// OpenAI API
    pub const OPENAI: &str = "https://api.openai.com";
}
