//! Accumulator module statistics and an end-to-end demo batch.
//!
//! Usage:
//!   cargo run --release --bin accumulator-stats                      # default settings
//!   cargo run --release --bin accumulator-stats -- config.json       # settings from a file
//!   cargo run --release --bin accumulator-stats -- --snark           # also time a Groth16 read proof
//!
//! Log verbosity follows `RUST_LOG`.

use std::error::Error;
use std::path::Path;
use std::time::Instant;

use accumulator_prover::{
    prove_read_non_zero, setup_read_non_zero, verify_read_non_zero, Operation, ProverConfig,
    StateManager,
};
use ark_bn254::Fr;
use ark_relations::r1cs::{ConstraintSynthesizer, ConstraintSystem};
use ark_std::rand::{rngs::StdRng, SeedableRng};
use sparse_accumulator::Trace;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

use accumulator_circuits::ReadNonZeroCircuit;

fn count_constraints<C: ConstraintSynthesizer<Fr>>(circuit: C) -> Result<usize, Box<dyn Error>> {
    let cs = ConstraintSystem::<Fr>::new_ref();
    circuit.generate_constraints(cs.clone())?;
    Ok(cs.num_constraints())
}

fn demo_batch(count: u64) -> Vec<Operation<u64, u64>> {
    let mut ops = Vec::new();
    for key in 0..count {
        ops.push(Operation::Insert { key, value: key * 7 });
    }
    ops.push(Operation::ReadNonZero { key: 0 });
    ops.push(Operation::ReadZero { key: count });
    ops.push(Operation::Update { key: 0, value: 1 });
    ops.push(Operation::Delete { key: count - 1 });
    ops
}

fn init_logger() {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    Registry::default()
        .with(env_filter)
        .with(fmt::layer())
        .init();
}

fn main() -> Result<(), Box<dyn Error>> {
    init_logger();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let snark = args.iter().any(|a| a == "--snark");
    let config = match args.iter().find(|a| !a.starts_with("--")) {
        Some(path) => ProverConfig::load(Path::new(path))?,
        None => ProverConfig::default(),
    };
    let settings = &config.accumulator;

    println!("ACCUMULATOR MODULE STATS");
    println!("────────────────────────────────────────");
    println!("Name:              {}", settings.name);
    println!("Tree depth:        {}", settings.merkle_tree_depth);
    println!("Row budget:        {}", settings.max_num_proofs);
    println!("Rows per column:   {}", settings.num_rows());
    println!("Proof column rows: {}", settings.num_proof_rows());

    let start = Instant::now();
    let mut state = StateManager::<u64, u64>::new(config.clone())?;
    let stats = state.composition().stats();
    println!("Define time:       {:?}\n", start.elapsed());

    println!("Columns:           {:>8}", stats.columns);
    println!("Cells:             {:>8}", stats.cells);
    println!("Global queries:    {:>8}", stats.globals);
    println!("Local queries:     {:>8}", stats.locals);
    println!("Compressions:      {:>8}", stats.compressions);
    println!("Projections:       {:>8}", stats.projections);
    println!("Less-than queries: {:>8}", stats.less_thans);

    let rows_left = settings.max_num_proofs.saturating_sub(12);
    let capacity = (1u64 << settings.merkle_tree_depth.min(20)).saturating_sub(2);
    let inserts = (rows_left / 6).min(capacity as usize).max(1) as u64;
    let ops = demo_batch(inserts);

    println!("\nDEMO BATCH");
    println!("────────────────────────────────────────");
    let start = Instant::now();
    match state.prove_batch(&ops) {
        Ok(outcome) => {
            println!("Operations:        {}", outcome.traces.len());
            println!("Rows used:         {}", outcome.assignments.num_rows());
            println!("Top root:          {}", outcome.new_top_root);
            println!("Prove + check:     {:?}", start.elapsed());
        }
        Err(e) => println!("Batch rejected: {e}"),
    }

    let depth = settings.merkle_tree_depth;
    println!("\nREAD-NON-ZERO CIRCUIT (depth {depth})");
    println!("────────────────────────────────────────");
    println!("Constraints:       {}", count_constraints(ReadNonZeroCircuit::empty(depth))?);

    if snark {
        let mut rng = StdRng::seed_from_u64(42);
        let start = Instant::now();
        let keys = setup_read_non_zero(&mut rng, depth)?;
        println!("Setup:             {:?}", start.elapsed());

        if let Trace::ReadNonZero(trace) = state.accumulator().read_non_zero(&0)? {
            let start = Instant::now();
            let proof = prove_read_non_zero(&keys.proving_key, &trace)?;
            println!("Prove:             {:?}", start.elapsed());

            let start = Instant::now();
            let valid = verify_read_non_zero(&keys.verifying_key, &proof.proof, &proof.public_inputs)?;
            println!("Verify:            {:?} ({})", start.elapsed(), if valid { "valid" } else { "INVALID" });
            println!("Proof:             {}", proof.proof_hex()?);
        }
    }

    Ok(())
}
