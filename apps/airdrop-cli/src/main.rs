use airdrop_merkle::LeafEncoding;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod config;
mod error;
mod logging;

use error::CliResult;

#[derive(Parser)]
#[command(name = "airdrop")]
#[command(about = "Airdrop CLI - Merkle allocation trees for token distribution")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a deterministic recipients CSV for testing
    GenerateFixtures {
        /// Number of recipients to generate
        #[arg(short, long)]
        count: u64,

        /// Seed for deterministic generation
        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// Output CSV path
        #[arg(short, long, default_value = "recipients.csv")]
        output: PathBuf,

        /// Minimum amount per recipient (base units)
        #[arg(long, default_value = "1000")]
        min_amount: u128,

        /// Maximum amount per recipient (base units)
        #[arg(long, default_value = "1000000")]
        max_amount: u128,
    },

    /// Build the allocation tree from a recipients CSV and write the tree document
    BuildTree {
        /// Recipients CSV (index,recipient,amount)
        #[arg(short, long)]
        recipients: PathBuf,

        /// Campaign configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Leaf encoding, when no configuration file is given
        #[arg(short, long)]
        encoding: Option<LeafEncoding>,

        /// Output tree document
        #[arg(short, long, default_value = "tree.json")]
        output: PathBuf,

        /// Embed every recipient's proof in the document
        #[arg(long)]
        with_proofs: bool,
    },

    /// Look up an address and print its claim payload
    CheckEligibility {
        /// Tree document
        #[arg(short, long)]
        tree: PathBuf,

        /// Address to look up
        #[arg(short, long)]
        address: String,

        /// Indices already claimed on-chain
        #[arg(long, value_delimiter = ',')]
        claimed: Vec<u64>,

        /// Campaign configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Leaf encoding, when no configuration file is given
        #[arg(short, long)]
        encoding: Option<LeafEncoding>,

        /// Seconds since the stream started, to show the unlocked amount
        #[arg(long)]
        elapsed: Option<u64>,
    },

    /// Run the full integrity scan over a tree document
    ValidateTree {
        /// Tree document
        #[arg(short, long)]
        tree: PathBuf,

        /// Campaign configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Leaf encoding, when no configuration file is given
        #[arg(short, long)]
        encoding: Option<LeafEncoding>,
    },

    /// Verify a single proof against a root
    VerifyProof {
        /// Claim index
        #[arg(long)]
        index: String,

        /// Recipient address
        #[arg(long)]
        recipient: String,

        /// Amount (base units)
        #[arg(long)]
        amount: String,

        /// Sibling hashes, comma separated
        #[arg(long, value_delimiter = ',')]
        proof: Vec<String>,

        /// Expected Merkle root
        #[arg(long)]
        root: String,

        /// Leaf encoding
        #[arg(short, long, default_value = "packed")]
        encoding: LeafEncoding,
    },
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    logging::init(logging::LogLevel::from_verbosity(cli.verbose))?;

    match cli.command {
        Commands::GenerateFixtures {
            count,
            seed,
            output,
            min_amount,
            max_amount,
        } => commands::generate_fixtures::execute(count, seed, output, min_amount, max_amount),

        Commands::BuildTree {
            recipients,
            config,
            encoding,
            output,
            with_proofs,
        } => commands::build_tree::execute(recipients, config, encoding, output, with_proofs),

        Commands::CheckEligibility {
            tree,
            address,
            claimed,
            config,
            encoding,
            elapsed,
        } => commands::check_eligibility::execute(tree, address, claimed, config, encoding, elapsed),

        Commands::ValidateTree {
            tree,
            config,
            encoding,
        } => commands::validate_tree::execute(tree, config, encoding),

        Commands::VerifyProof {
            index,
            recipient,
            amount,
            proof,
            root,
            encoding,
        } => commands::verify_proof::execute(index, recipient, amount, proof, root, encoding),
    }
}
