use airdrop_merkle::{CampaignKind, LeafEncoding};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{CliError, CliResult};

/// Campaign configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CampaignConfig {
    /// Human-readable campaign name (for organization)
    pub campaign_name: String,

    /// Leaf layout the deployed distributor hashes with
    #[serde(default)]
    pub leaf_encoding: LeafEncoding,

    /// Distributor variant and its unlock schedule
    #[serde(default)]
    pub campaign: CampaignKind,
}

impl CampaignConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> CliResult<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    pub fn from_yaml(contents: &str) -> CliResult<Self> {
        let config: CampaignConfig = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> CliResult<()> {
        if self.campaign_name.trim().is_empty() {
            return Err(CliError::InvalidConfig(
                "campaign_name must not be empty".to_string(),
            ));
        }
        self.campaign
            .validate()
            .map_err(|e| CliError::InvalidConfig(e.to_string()))
    }
}

/// Leaf encoding from the config file or the `--encoding` flag. Giving both
/// with different values is an error rather than a silent override.
pub fn resolve_encoding(
    config: Option<&CampaignConfig>,
    flag: Option<LeafEncoding>,
) -> CliResult<LeafEncoding> {
    match (config, flag) {
        (Some(config), Some(flag)) if config.leaf_encoding != flag => {
            Err(CliError::InvalidConfig(format!(
                "--encoding {} conflicts with leaf_encoding {} in campaign '{}'",
                flag, config.leaf_encoding, config.campaign_name
            )))
        }
        (Some(config), _) => Ok(config.leaf_encoding),
        (None, Some(flag)) => Ok(flag),
        (None, None) => Ok(LeafEncoding::default()),
    }
}

pub fn load_optional<P: AsRef<Path>>(path: Option<P>) -> CliResult<Option<CampaignConfig>> {
    path.map(CampaignConfig::load).transpose()
}
