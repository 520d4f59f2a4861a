use crate::error::{CliError, CliResult};
use airdrop_merkle::{Address, AllocationRecord};
use airdrop_tree_data::write_recipients_csv;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::debug;

/// Upper bound on generated recipients
pub const MAX_FIXTURE_COUNT: u64 = u32::MAX as u64;

/// Generate a deterministic recipients CSV for testing and benchmarking
pub fn execute(
    count: u64,
    seed: u64,
    output: PathBuf,
    min_amount: u128,
    max_amount: u128,
) -> CliResult<()> {
    println!("Generating {} recipients with seed {}", count, seed);
    println!("Amount range: {} - {}", min_amount, max_amount);

    println!("\n📋 Generating recipients...");
    let records = generate_records(count, seed, min_amount, max_amount)?;
    write_recipients_csv(&output, &records)?;
    println!("✅ Generated recipients: {}", output.display());

    let total: u128 = records.iter().map(|r| r.amount).sum();
    println!("\n🎉 Fixture generation completed!");
    println!("📊 Summary:");
    println!("  - {} recipients", records.len());
    println!("  - Total allocation: {}", total);

    Ok(())
}

/// Same seed, same records. Indices run `0..count`; recipients are distinct
/// and never the zero address.
pub fn generate_records(
    count: u64,
    seed: u64,
    min_amount: u128,
    max_amount: u128,
) -> CliResult<Vec<AllocationRecord>> {
    if count == 0 || count > MAX_FIXTURE_COUNT {
        return Err(CliError::InvalidArgument(format!(
            "count must be between 1 and {}, got {}",
            MAX_FIXTURE_COUNT, count
        )));
    }
    if min_amount == 0 || min_amount > max_amount {
        return Err(CliError::InvalidArgument(format!(
            "amount range {} - {} must be non-empty and start above zero",
            min_amount, max_amount
        )));
    }
    // keeps the CSV total representable
    if max_amount.checked_mul(count as u128).is_none() {
        return Err(CliError::InvalidArgument(format!(
            "{} recipients of up to {} overflow a uint128 total",
            count, max_amount
        )));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut seen = HashSet::new();
    let mut records = Vec::with_capacity(count as usize);

    for index in 0..count {
        let recipient = loop {
            let candidate = Address(rng.gen());
            if candidate.0 != [0u8; 20] && seen.insert(candidate) {
                break candidate;
            }
            debug!("Regenerating colliding address {}", candidate);
        };
        let amount = rng.gen_range(min_amount..=max_amount);
        records.push(AllocationRecord::new(index, recipient, amount));
    }

    Ok(records)
}
