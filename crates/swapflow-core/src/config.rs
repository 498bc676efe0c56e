use serde::{Deserialize, Serialize};

use crate::session::SessionMetadata;

/// Station-level configuration stamped onto every session.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct StationConfig {
    pub station_id: String,
    pub attendant_id: String,
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_currency() -> String {
    "XOF".to_string()
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            station_id: "STN-LOME-001".to_string(),
            attendant_id: "ATT-001".to_string(),
            currency: default_currency(),
        }
    }
}

impl StationConfig {
    /// Session metadata derived from this configuration.
    pub fn metadata(&self) -> SessionMetadata {
        SessionMetadata {
            attendant_id: self.attendant_id.clone(),
            station_id: self.station_id.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_station() {
        let config = StationConfig::default();
        assert_eq!(config.station_id, "STN-LOME-001");
        assert_eq!(config.currency, "XOF");
    }

    #[test]
    fn test_currency_defaults_when_absent() {
        let config: StationConfig = toml::from_str(
            "station_id = \"STN-ACCRA-004\"\nattendant_id = \"ATT-017\"\n",
        )
        .unwrap();
        assert_eq!(config.station_id, "STN-ACCRA-004");
        assert_eq!(config.currency, "XOF");
    }
}
