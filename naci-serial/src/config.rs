use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields, default)]
pub struct SerialConfig {
    pub port: String,
    pub baud_rate: u32,
    /// Read/write timeout of the port.
    pub timeout_ms: u64,
    /// Time to wait after opening while the controller resets.
    pub settle_ms: u64,
    /// When false the sink never touches the port and only logs commands.
    pub enabled: bool,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: "/dev/ttyUSB0".to_owned(),
            baud_rate: 9600,
            timeout_ms: 1000,
            settle_ms: 2000,
            enabled: true,
        }
    }
}

impl SerialConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize() {
        let config: SerialConfig = toml::from_str("port = \"COM5\"\nsettle_ms = 0\n").unwrap();
        assert_eq!(config.port, "COM5");
        assert_eq!(config.baud_rate, 9600);
        assert_eq!(config.settle(), Duration::ZERO);
        assert_eq!(config.timeout(), Duration::from_secs(1));
        assert!(config.enabled);

        assert!(toml::from_str::<SerialConfig>("baud = 9600\n").is_err());
    }
}
