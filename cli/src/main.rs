//! Credi CLI.

mod config;
mod snapshot;

use {
    clap::{Parser, Subcommand},
    config::ConfigFile,
    credi_ledger::Ledger,
    credi_program::{
        address::{derive_address, AddressResolution, SeedScope, DEFAULT_SEED},
        instruction, ProgramConfig,
    },
    snapshot::Snapshot,
    trezoa_pubkey::Pubkey,
    std::{collections::HashSet, str::FromStr},
};

#[derive(Subcommand)]
enum SubCommand {
    /// Initialize the credential mint against a ledger snapshot.
    Initialize {
        /// Path to the JSON ledger snapshot.
        #[arg(required = true)]
        ledger: String,
        /// The payer and authority. Must hold a system account in the
        /// snapshot.
        #[arg(long, value_parser = Pubkey::from_str)]
        payer: Pubkey,
        /// A caller-supplied target account, which co-signs. When omitted,
        /// the target is derived from the seed.
        #[arg(long, value_parser = Pubkey::from_str)]
        target: Option<Pubkey>,
        /// The ID to use for the program.
        #[arg(long, value_parser = Pubkey::from_str, default_value_t = credi_program::ID)]
        program_id: Pubkey,
        /// Seed for the derived target address.
        #[arg(long, conflicts_with = "target")]
        seed: Option<String>,
        /// Derive one target per payer instead of one for the program.
        #[arg(long, conflicts_with = "target")]
        per_signer: bool,
        /// Slot to record as the initialization slot.
        #[arg(long)]
        slot: Option<u64>,
        /// Path to a YAML file of checks to run on the result.
        #[arg(short, long)]
        config: Option<String>,
        /// Write the resulting accounts back to the snapshot.
        #[arg(short, long)]
        write: bool,
        /// Enable emission of program logs to stdout. Disabled by default.
        #[arg(long)]
        program_logs: bool,
        /// Print the result and report every failed check. Does not enable
        /// program logs. Disabled by default.
        #[arg(short, long)]
        verbose: bool,
    },
    /// Print the derived target address for a payer.
    Address {
        /// The payer, for per-signer addresses.
        #[arg(long, value_parser = Pubkey::from_str)]
        payer: Pubkey,
        /// The ID to use for the program.
        #[arg(long, value_parser = Pubkey::from_str, default_value_t = credi_program::ID)]
        program_id: Pubkey,
        /// Seed for the derived target address.
        #[arg(long)]
        seed: Option<String>,
        /// Derive one target per payer instead of one for the program.
        #[arg(long)]
        per_signer: bool,
    },
}

#[derive(Parser)]
struct Cli {
    #[clap(subcommand)]
    pub command: SubCommand,
}

fn seed_and_scope(seed: Option<String>, per_signer: bool) -> (Vec<u8>, SeedScope) {
    let seed = seed.map_or_else(|| DEFAULT_SEED.to_vec(), String::into_bytes);
    let scope = if per_signer {
        SeedScope::PerSigner
    } else {
        SeedScope::Global
    };
    (seed, scope)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    match Cli::parse().command {
        SubCommand::Initialize {
            ledger: ledger_path,
            payer,
            target,
            program_id,
            seed,
            per_signer,
            slot,
            config,
            write,
            program_logs,
            verbose,
        } => {
            let (seed, scope) = seed_and_scope(seed, per_signer);
            let program_config = ProgramConfig {
                resolution: match target {
                    Some(_) => AddressResolution::Supplied,
                    None => AddressResolution::Derived { seed, scope },
                },
                ..Default::default()
            };

            let instruction = match target {
                Some(target) => instruction::initialize_signed_target(&program_id, &payer, &target),
                None => instruction::initialize_derived(&program_id, &payer, &program_config)
                    .ok_or("The seed does not derive a valid program address")?,
            };

            let mut ledger = Ledger::new(&program_id, program_config);
            if !program_logs {
                trezoa_logger::setup_with("");
            }
            ledger.config.panic = false;
            ledger.config.verbose = verbose;
            if let Some(slot) = slot {
                ledger.warp_to_slot(slot);
            }

            let store = Snapshot::try_load(&ledger_path)?.into_store()?;
            let loaded: HashSet<Pubkey> = store.keys().copied().collect();
            let context = ledger.with_context(store);

            let result = context.process_instruction(&instruction);

            if verbose {
                println!("Program logs:");
                for line in &result.logs {
                    println!("  {line}");
                }
                println!();
                println!("{:?}", &result);
                println!();
            }

            let resolved_checks = match config {
                Some(path) => ConfigFile::try_load(&path)?.resolve()?,
                None => vec![],
            };
            let checks: Vec<_> = resolved_checks.iter().map(|c| c.to_check()).collect();
            let checks_passed = result.run_checks(&checks, &context.ledger.config, &context.ledger);

            let Some(transaction_id) = result.transaction_id else {
                return Err(format!("Transaction failed: {}", result.program_result).into());
            };
            println!("Your transaction signature {transaction_id}");

            if write {
                let store = context
                    .account_store
                    .read()
                    .map_err(|_| "Account store lock poisoned")?;
                Snapshot::from_store(&store, &loaded).save(&ledger_path)?;
            }

            if !checks_passed {
                return Err("One or more checks failed".into());
            }
        }
        SubCommand::Address {
            payer,
            program_id,
            seed,
            per_signer,
        } => {
            let (seed, scope) = seed_and_scope(seed, per_signer);
            let (address, bump) = derive_address(&program_id, &seed, scope, &payer)
                .ok_or("The seed does not derive a valid program address")?;
            println!("{address} (bump {bump})");
        }
    }
    Ok(())
}
