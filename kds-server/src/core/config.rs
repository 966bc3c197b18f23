//! Server configuration
//!
//! All settings come from environment variables with sensible defaults:
//!
//! | Variable                  | Default        | Meaning                         |
//! |---------------------------|----------------|---------------------------------|
//! | HTTP_PORT                 | 3000           | HTTP API port                   |
//! | BIND_ADDR                 | 0.0.0.0        | Listen address                  |
//! | CATALOG_PATH              | (builtin demo) | JSON catalog file               |
//! | LOG_DIR                   | (stdout only)  | Daily-rotated log directory     |
//! | ESCALATION_ELEVATED_MIN   | 15             | Elevated tier boundary, minutes |
//! | ESCALATION_URGENT_MIN     | 20             | Urgent tier boundary, minutes   |
//!
//! ```ignore
//! HTTP_PORT=8080 ESCALATION_URGENT_MIN=25 cargo run
//! ```

use shared::escalation::EscalationThresholds;

#[derive(Debug, Clone)]
pub struct Config {
    /// Listen address
    pub bind_addr: String,
    /// HTTP API port
    pub http_port: u16,
    /// Path to the catalog JSON; None uses the built-in demo catalog
    pub catalog_path: Option<String>,
    /// Directory for daily-rotated file logs; None logs to stdout only
    pub log_dir: Option<String>,
    /// Urgency tier boundaries
    pub escalation: EscalationThresholds,
}

impl Config {
    /// Load from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = EscalationThresholds::default();
        Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            catalog_path: std::env::var("CATALOG_PATH").ok(),
            log_dir: std::env::var("LOG_DIR").ok(),
            escalation: EscalationThresholds {
                elevated_after_minutes: std::env::var("ESCALATION_ELEVATED_MIN")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.elevated_after_minutes),
                urgent_after_minutes: std::env::var("ESCALATION_URGENT_MIN")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.urgent_after_minutes),
            },
        }
    }

    /// Socket address string for the listener
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.http_port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        // Environment-free construction keeps the documented defaults
        let config = Config {
            bind_addr: "0.0.0.0".into(),
            http_port: 3000,
            catalog_path: None,
            log_dir: None,
            escalation: EscalationThresholds::default(),
        };
        assert_eq!(config.listen_addr(), "0.0.0.0:3000");
        assert_eq!(config.escalation.elevated_after_minutes, 15);
        assert_eq!(config.escalation.urgent_after_minutes, 20);
    }
}
