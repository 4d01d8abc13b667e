use livecheck_binding::BindingConfig;
use livecheck_core::{AnalysisKind, CoreError};
use livecheck_executor::ReconnectConfig;

/// Configuration of the `livecheck-watch` binary.
#[derive(Debug, Clone)]
pub struct WatchConfig {
    /// Base URL of the executor's HTTP API.
    pub api_url: String,
    /// Base URL of the executor's event stream.
    pub ws_url: String,
    /// Analysis kind the watched binding runs.
    pub analysis: AnalysisKind,
    /// Emit logs as JSON instead of human-readable lines.
    pub log_json: bool,
    pub binding: BindingConfig,
    pub reconnect: ReconnectConfig,
}

impl WatchConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var              | Default                 |
    /// |----------------------|-------------------------|
    /// | `LIVECHECK_API_URL`  | `http://localhost:3000` |
    /// | `LIVECHECK_WS_URL`   | `ws://localhost:3000`   |
    /// | `LIVECHECK_ANALYSIS` | `Interpreter`           |
    /// | `LIVECHECK_LOG_JSON` | unset                   |
    ///
    /// Timing variables are read by [`BindingConfig::from_env`].
    pub fn from_env() -> Result<Self, CoreError> {
        let api_url =
            std::env::var("LIVECHECK_API_URL").unwrap_or_else(|_| "http://localhost:3000".into());
        let ws_url =
            std::env::var("LIVECHECK_WS_URL").unwrap_or_else(|_| "ws://localhost:3000".into());
        let analysis = match std::env::var("LIVECHECK_ANALYSIS") {
            Ok(name) => name.parse()?,
            Err(_) => AnalysisKind::Interpreter,
        };
        let log_json = std::env::var("LIVECHECK_LOG_JSON")
            .map(|v| matches!(v.trim(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(Self {
            api_url,
            ws_url,
            analysis,
            log_json,
            binding: BindingConfig::from_env()?,
            reconnect: ReconnectConfig::default(),
        })
    }
}
