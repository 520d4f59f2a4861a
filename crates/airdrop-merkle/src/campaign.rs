use serde::{Deserialize, Serialize};

use crate::errors::{MerkleError, MerkleResult};

pub const BPS_DENOMINATOR: u32 = 10_000;

/// One step of a tranched unlock schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tranche {
    /// Share of the allocation released when this tranche ends, in basis points
    pub unlock_bps: u32,
    pub duration_seconds: u64,
}

/// Which distributor the campaign was deployed as.
///
/// Decided once at campaign setup and carried in configuration; the claim
/// arguments are identical across variants, only what the recipient receives
/// after claiming differs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum CampaignKind {
    /// Tokens are transferred in full at claim time
    #[default]
    Instant,
    /// Claim opens a linear stream with an optional cliff
    LockupLinear {
        cliff_seconds: u64,
        total_seconds: u64,
    },
    /// Claim opens a stream that unlocks in discrete tranches
    LockupTranched { tranches: Vec<Tranche> },
}

impl CampaignKind {
    pub fn validate(&self) -> MerkleResult<()> {
        match self {
            CampaignKind::Instant => Ok(()),
            CampaignKind::LockupLinear {
                cliff_seconds,
                total_seconds,
            } => {
                if *total_seconds == 0 {
                    return Err(MerkleError::InvalidCampaign(
                        "linear lockup total duration must be positive".to_string(),
                    ));
                }
                if cliff_seconds > total_seconds {
                    return Err(MerkleError::InvalidCampaign(format!(
                        "cliff ({}s) exceeds total duration ({}s)",
                        cliff_seconds, total_seconds
                    )));
                }
                Ok(())
            }
            CampaignKind::LockupTranched { tranches } => {
                if tranches.is_empty() {
                    return Err(MerkleError::InvalidCampaign(
                        "tranched lockup needs at least one tranche".to_string(),
                    ));
                }
                let total_bps: u64 = tranches.iter().map(|t| t.unlock_bps as u64).sum();
                if total_bps != BPS_DENOMINATOR as u64 {
                    return Err(MerkleError::InvalidCampaign(format!(
                        "tranche percentages sum to {} bps, expected {}",
                        total_bps, BPS_DENOMINATOR
                    )));
                }
                Ok(())
            }
        }
    }

    /// Portion of `amount` unlocked `elapsed_seconds` after the claim.
    pub fn unlocked_amount(&self, amount: u128, elapsed_seconds: u64) -> u128 {
        match self {
            CampaignKind::Instant => amount,
            CampaignKind::LockupLinear {
                cliff_seconds,
                total_seconds,
            } => {
                if elapsed_seconds < *cliff_seconds {
                    0
                } else if elapsed_seconds >= *total_seconds {
                    amount
                } else {
                    mul_div(amount, elapsed_seconds as u128, *total_seconds as u128)
                }
            }
            CampaignKind::LockupTranched { tranches } => {
                let mut unlocked_bps: u128 = 0;
                let mut tranche_end: u64 = 0;
                for tranche in tranches {
                    tranche_end = tranche_end.saturating_add(tranche.duration_seconds);
                    if elapsed_seconds < tranche_end {
                        break;
                    }
                    unlocked_bps += tranche.unlock_bps as u128;
                }
                if unlocked_bps >= BPS_DENOMINATOR as u128 {
                    amount
                } else {
                    mul_div(amount, unlocked_bps, BPS_DENOMINATOR as u128)
                }
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CampaignKind::Instant => "instant",
            CampaignKind::LockupLinear { .. } => "lockup-linear",
            CampaignKind::LockupTranched { .. } => "lockup-tranched",
        }
    }
}

/// `amount * numerator / denominator` without overflowing for `numerator <= denominator`.
fn mul_div(amount: u128, numerator: u128, denominator: u128) -> u128 {
    let whole = amount / denominator;
    let rest = amount % denominator;
    whole * numerator + rest * numerator / denominator
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instant_unlocks_everything() {
        assert_eq!(CampaignKind::Instant.unlocked_amount(500, 0), 500);
    }

    #[test]
    fn test_linear_schedule() {
        let kind = CampaignKind::LockupLinear {
            cliff_seconds: 100,
            total_seconds: 1000,
        };
        kind.validate().unwrap();
        assert_eq!(kind.unlocked_amount(1000, 99), 0);
        assert_eq!(kind.unlocked_amount(1000, 100), 100);
        assert_eq!(kind.unlocked_amount(1000, 500), 500);
        assert_eq!(kind.unlocked_amount(1000, 5000), 1000);
        assert_eq!(kind.unlocked_amount(u128::MAX, 1000), u128::MAX);
    }

    #[test]
    fn test_tranched_schedule() {
        let kind = CampaignKind::LockupTranched {
            tranches: vec![
                Tranche {
                    unlock_bps: 2_500,
                    duration_seconds: 10,
                },
                Tranche {
                    unlock_bps: 7_500,
                    duration_seconds: 20,
                },
            ],
        };
        kind.validate().unwrap();
        assert_eq!(kind.unlocked_amount(1000, 9), 0);
        assert_eq!(kind.unlocked_amount(1000, 10), 250);
        assert_eq!(kind.unlocked_amount(1000, 29), 250);
        assert_eq!(kind.unlocked_amount(1000, 30), 1000);
    }

    #[test]
    fn test_validation_errors() {
        let bad_linear = CampaignKind::LockupLinear {
            cliff_seconds: 10,
            total_seconds: 5,
        };
        assert!(bad_linear.validate().is_err());

        let bad_tranches = CampaignKind::LockupTranched {
            tranches: vec![Tranche {
                unlock_bps: 9_000,
                duration_seconds: 1,
            }],
        };
        assert!(bad_tranches.validate().is_err());
        assert!(CampaignKind::LockupTranched { tranches: vec![] }
            .validate()
            .is_err());
    }

    #[test]
    fn test_serde_tagging() {
        let kind: CampaignKind =
            serde_json::from_str(r#"{"kind":"lockup-linear","cliff_seconds":0,"total_seconds":60}"#)
                .unwrap();
        assert_eq!(
            kind,
            CampaignKind::LockupLinear {
                cliff_seconds: 0,
                total_seconds: 60
            }
        );
        assert_eq!(kind.name(), "lockup-linear");
    }
}
