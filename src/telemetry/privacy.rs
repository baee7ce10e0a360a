//! On-device masking of node text before it leaves the engine as telemetry.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrivacyLevel {
    /// Text is recorded verbatim
    #[default]
    Standard,
    /// Addresses are replaced, other text keeps a short prefix
    High,
    /// Only a digest is recorded
    Paranoid,
}

impl std::str::FromStr for PrivacyLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "standard" => Ok(PrivacyLevel::Standard),
            "high" => Ok(PrivacyLevel::High),
            "paranoid" => Ok(PrivacyLevel::Paranoid),
            other => Err(format!("unknown privacy level: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PrivacyShield {
    level: PrivacyLevel,
}

impl PrivacyShield {
    pub fn new(level: PrivacyLevel) -> Self {
        Self { level }
    }

    pub fn level(&self) -> PrivacyLevel {
        self.level
    }

    pub fn mask(&self, data: &str) -> String {
        match self.level {
            PrivacyLevel::Standard => data.to_string(),
            PrivacyLevel::High => {
                if data.contains('@') {
                    "***@masked.ch".to_string()
                } else {
                    let prefix: String = data.chars().take(4).collect();
                    format!("SECURE-{}", prefix)
                }
            }
            PrivacyLevel::Paranoid => {
                let digest = format!("{:x}", Sha256::digest(data.as_bytes()));
                format!("HASH-{}", &digest[..16])
            }
        }
    }
}
