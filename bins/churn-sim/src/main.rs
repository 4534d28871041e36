//! churn-sim: batch decomposition simulator.
//!
//! Runs repeated mixing rounds over randomly sampled wallets: sample
//! amounts, group them into participants, run a warm-up mix, blend a
//! share of its outputs back in as remixes, mix again, and report
//! anonymity and efficiency metrics per round.

use anyhow::{bail, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

use churn_core::constants::STD_DENOMS;
use churn_core::fee::FeeParams;
use churn_core::traits::Mixer;
use churn_mixer::DecomposeMixer;

mod report;
mod sample;

use report::RoundReport;

/// CLI arguments for the simulator.
#[derive(Debug, Parser)]
#[command(name = "churn-sim")]
#[command(about = "CoinJoin denomination-decomposition simulator", long_about = None)]
struct Args {
    /// Participants per round.
    #[arg(long, default_value = "100")]
    users: usize,

    /// Input coins per round.
    #[arg(long, default_value = "300")]
    inputs: usize,

    /// Share of inputs replaced by remixed outputs of a warm-up round.
    #[arg(long, default_value = "0.3")]
    remix_ratio: f64,

    /// Number of rounds to simulate.
    #[arg(long, default_value = "25")]
    rounds: usize,

    /// Fee rate in sats per weight unit.
    #[arg(long, default_value = "10")]
    fee_rate: u32,

    /// Weight units per input.
    #[arg(long, default_value = "69")]
    input_size: u32,

    /// Weight units per output.
    #[arg(long, default_value = "33")]
    output_size: u32,

    /// RNG seed; random when omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// Emit per-round reports as JSON lines instead of the table.
    #[arg(long)]
    json: bool,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn run_round(rng: &mut StdRng, args: &Args, fees: FeeParams, round: usize) -> Result<RoundReport> {
    // Warm-up mix seeds the remix pool with already-decomposed coins.
    let pre_amounts = sample::sample_amounts(rng, args.inputs);
    let pre_groups = sample::random_groups(rng, &pre_amounts, args.users);
    let pre_mix = DecomposeMixer::new(fees).complete_mix(&pre_groups)?;

    let remix_count = (args.inputs as f64 * args.remix_ratio) as usize;
    let pool: Vec<u64> = pre_mix.into_iter().flatten().collect();
    let mut amounts = sample::sample_amounts(rng, args.inputs - remix_count);
    amounts.extend(sample::random_elements(rng, &pool, remix_count));

    let input_groups = sample::random_groups(rng, &amounts, args.users);
    let output_groups = DecomposeMixer::new(fees).complete_mix(&input_groups)?;

    let input_amount: u64 = input_groups.iter().flatten().sum();
    let output_amount: u64 = output_groups.iter().flatten().sum();
    // The engine already checks this; the simulator refuses to trust it.
    if input_amount <= output_amount {
        bail!("round {round} does not pay its fees: {input_amount} in, {output_amount} out");
    }

    let output_count: usize = output_groups.iter().map(Vec::len).sum();
    let fee = input_amount - output_amount;
    let size = args.inputs as u64 * fees.input_size as u64
        + output_count as u64 * fees.output_size as u64;

    Ok(RoundReport {
        round,
        input_amount,
        output_amount,
        output_count,
        fee,
        size,
        anonymity_gain: churn_analysis::anonymity_gain(&input_groups, &output_groups),
        input_anonymity: churn_analysis::average_anonymity_set(&input_groups),
        output_anonymity: churn_analysis::average_anonymity_set(&output_groups),
        blockspace_efficiency: churn_analysis::blockspace_efficiency(
            &input_groups,
            &output_groups,
            size,
        ),
        privacy_efficiency: churn_analysis::privacy_efficiency(&input_groups, &output_groups, fee),
        non_standard_outputs: churn_analysis::non_standard_outputs(&output_groups, &STD_DENOMS),
    })
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&args.log_level)),
        )
        .init();

    info!("churn-sim v{}", env!("CARGO_PKG_VERSION"));

    if args.users == 0 || args.inputs == 0 {
        bail!("--users and --inputs must be positive");
    }
    if !(0.0..=1.0).contains(&args.remix_ratio) {
        bail!("--remix-ratio must be within [0, 1]");
    }

    let fees = FeeParams::new(args.fee_rate, args.input_size, args.output_size);
    let seed = args.seed.unwrap_or_else(rand::random);
    info!(
        seed,
        users = args.users,
        inputs = args.inputs,
        rounds = args.rounds,
        remix_ratio = args.remix_ratio,
        "starting simulation"
    );
    let mut rng = StdRng::seed_from_u64(seed);

    let mut reports = Vec::with_capacity(args.rounds);
    for round in 0..args.rounds {
        let report = run_round(&mut rng, &args, fees, round)?;
        debug!(
            round,
            fee = report.fee,
            outputs = report.output_count,
            gain = report.anonymity_gain,
            "round finished"
        );
        if args.json {
            println!("{}", serde_json::to_string(&report)?);
        } else {
            reports.push(report);
        }
    }

    if !args.json {
        report::print_table(&reports);
    }
    Ok(())
}
