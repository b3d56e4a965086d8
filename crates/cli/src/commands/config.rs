use secrecy::ExposeSecret;

use hrflow_core::config::{AppConfig, LogFormat};

/// Render the effective configuration with the token redacted. Plain text,
/// not JSON, since this is for eyeballing precedence problems.
pub fn run(config: &AppConfig) -> String {
    let mut lines =
        vec!["effective config (source precedence: env > file > default):".to_string()];

    lines.push(format!(
        "  backend.base_url = {} (override: HRFLOW_BACKEND_BASE_URL)",
        config.backend.base_url
    ));
    lines.push(format!(
        "  backend.timeout_secs = {} (override: HRFLOW_BACKEND_TIMEOUT_SECS)",
        config.backend.timeout_secs
    ));
    lines.push(format!(
        "  backend.token = {} (override: HRFLOW_TOKEN)",
        redact_token(config.backend.token.expose_secret())
    ));
    lines.push(format!(
        "  logging.level = {} (override: HRFLOW_LOG_LEVEL)",
        config.logging.level
    ));
    lines.push(format!(
        "  logging.format = {} (override: HRFLOW_LOG_FORMAT)",
        match config.logging.format {
            LogFormat::Compact => "compact",
            LogFormat::Pretty => "pretty",
        }
    ));

    lines.join("\n")
}

fn redact_token(token: &str) -> String {
    if token.is_empty() {
        return "(unset)".to_string();
    }
    let visible: String = token.chars().take(4).collect();
    format!("{visible}… ({} chars)", token.chars().count())
}
