use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Log output of the client. Logs go to stderr; stdout is reserved for command output.
#[derive(Deserialize, Serialize, Debug, JsonSchema, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String, // trace, debug, info, warn or error
    #[serde(default = "default_format")]
    pub format: String, // "json" or "console"
}

fn default_level() -> String {
    "warn".to_string()
}

fn default_format() -> String {
    "console".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: default_format(),
        }
    }
}
