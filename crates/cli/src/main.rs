mod io;
mod provenance;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use nalgebra::DMatrix;
use polyvol::api;
use polyvol::prelude::{FullDimProjection, HPolytope, LowDimHPolytope, MmcsOutcome};
use polyvol::walks::seed_or_clock;
use serde_json::json;
use tracing_subscriber::fmt::SubscriberBuilder;

use crate::provenance::{write_sidecar, Payload};

#[derive(Parser)]
#[command(name = "polyvol")]
#[command(about = "Volume, sampling, rounding and MMCS for H-polytopes")]
struct Cmd {
    #[command(subcommand)]
    action: Action,
}

/// Polytope input shared by every subcommand.
#[derive(Args, Clone)]
struct PolyArgs {
    /// CSV with coefficient columns and a `b` column, one row per inequality
    #[arg(long)]
    input: PathBuf,
    /// Optional CSV of equalities `Aeq x = beq` in the same layout
    #[arg(long)]
    equalities: Option<PathBuf>,
    /// RNG seed; the wall clock is used (and recorded) when omitted
    #[arg(long)]
    seed: Option<u64>,
    /// Use the pure-geometry inner ball instead of the LP
    #[arg(long)]
    slow: bool,
}

#[derive(Subcommand)]
enum Action {
    /// Estimate the volume (relative volume on the equality subspace)
    Volume {
        #[command(flatten)]
        poly: PolyArgs,
        #[arg(long, default_value = "cooling_balls")]
        method: String,
        #[arg(long, default_value = "CDHR")]
        walk: String,
        #[arg(long, default_value_t = 1)]
        walk_len: usize,
        #[arg(long, default_value_t = 0.1)]
        epsilon: f64,
        /// Optional JSON result file (a provenance sidecar is written next to it)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Draw uniform samples and write them as CSV rows
    Sample {
        #[command(flatten)]
        poly: PolyArgs,
        #[arg(long, default_value = "billiard_walk")]
        method: String,
        #[arg(long, default_value_t = 1000)]
        points: usize,
        #[arg(long, default_value_t = 0)]
        burn: usize,
        #[arg(long, default_value_t = 1)]
        walk_len: usize,
        #[arg(long)]
        out: PathBuf,
    },
    /// Round the polytope and write (A, b, T, shift, round_value) as JSON
    Round {
        #[command(flatten)]
        poly: PolyArgs,
        #[arg(long, default_value = "isotropic_position")]
        method: String,
        #[arg(long)]
        out: PathBuf,
    },
    /// Multiphase Monte Carlo sampling; samples go to CSV, the summary to the sidecar
    Mmcs {
        #[command(flatten)]
        poly: PolyArgs,
        #[arg(long, default_value_t = 1000)]
        ess: usize,
        /// Skip the PSRF convergence check
        #[arg(long)]
        no_psrf: bool,
        #[arg(long)]
        parallel: bool,
        #[arg(long, default_value_t = 1)]
        threads: usize,
        #[arg(long)]
        out: PathBuf,
    },
    /// Print version and code revision
    Report,
}

fn main() -> Result<()> {
    SubscriberBuilder::default().with_target(false).init();
    let cmd = Cmd::parse();
    match cmd.action {
        Action::Volume {
            poly,
            method,
            walk,
            walk_len,
            epsilon,
            out,
        } => volume(poly, method, walk, walk_len, epsilon, out),
        Action::Sample {
            poly,
            method,
            points,
            burn,
            walk_len,
            out,
        } => sample(poly, method, points, burn, walk_len, out),
        Action::Round { poly, method, out } => round(poly, method, out),
        Action::Mmcs {
            poly,
            ess,
            no_psrf,
            parallel,
            threads,
            out,
        } => mmcs(poly, ess, !no_psrf, parallel, threads, out),
        Action::Report => report(),
    }
}

/// Full-dimensional polytope to work on, plus the lift back when equalities were given.
struct Loaded {
    poly: HPolytope,
    lift: Option<FullDimProjection>,
}

impl Loaded {
    fn lift_columns(&self, ys: DMatrix<f64>) -> DMatrix<f64> {
        match &self.lift {
            Some(p) => p.lift_columns(&ys),
            None => ys,
        }
    }
}

fn load(args: &PolyArgs) -> Result<Loaded> {
    let (a, b) = io::read_system(&args.input)?;
    let Some(eq_path) = &args.equalities else {
        let poly = HPolytope::new(a, b).context("building polytope")?;
        return Ok(Loaded { poly, lift: None });
    };
    let (aeq, beq) = io::read_system(eq_path)?;
    let proj = LowDimHPolytope::new(a, b, aeq, beq)
        .and_then(|p| p.full_dimensional_polytope())
        .context("projecting onto the equality subspace")?;
    tracing::info!(
        ambient = proj.n_extra_trans.nrows(),
        reduced = proj.n_extra_trans.ncols(),
        "equality subspace"
    );
    Ok(Loaded {
        poly: proj.polytope.clone(),
        lift: Some(proj),
    })
}

fn base_params(args: &PolyArgs, seed: u64) -> serde_json::Value {
    json!({
        "input": args.input,
        "equalities": args.equalities,
        "seed": seed,
        "inner_ball": if args.slow { "slow" } else { "fast" },
    })
}

fn volume(
    args: PolyArgs,
    method: String,
    walk: String,
    walk_len: usize,
    epsilon: f64,
    out: Option<PathBuf>,
) -> Result<()> {
    let seed = seed_or_clock(args.seed);
    tracing::info!(method, walk, walk_len, epsilon, seed, "volume");
    let loaded = load(&args)?;
    let vol = api::compute_volume(&loaded.poly, &method, &walk, walk_len, epsilon, Some(seed), !args.slow)?;
    let result = json!({ "volume": vol, "dimension": loaded.poly.dimension() });
    println!("{result}");
    if let Some(out) = out {
        io::write_json(&out, &result)?;
        let mut params = base_params(&args, seed);
        params["method"] = json!(method);
        params["walk"] = json!(walk);
        params["walk_len"] = json!(walk_len);
        params["epsilon"] = json!(epsilon);
        write_sidecar(&out, Payload::new("volume", params).with_results(result))?;
    }
    Ok(())
}

fn sample(args: PolyArgs, method: String, points: usize, burn: usize, walk_len: usize, out: PathBuf) -> Result<()> {
    let seed = seed_or_clock(args.seed);
    tracing::info!(method, points, burn, walk_len, seed, "sample");
    let loaded = load(&args)?;
    let ys = api::generate_samples(&loaded.poly, &method, points, burn, walk_len, !args.slow, Some(seed))?;
    let xs = loaded.lift_columns(ys);
    io::write_points(&out, &xs)?;
    let mut params = base_params(&args, seed);
    params["method"] = json!(method);
    params["points"] = json!(points);
    params["burn"] = json!(burn);
    params["walk_len"] = json!(walk_len);
    write_sidecar(&out, Payload::new("sample", params).with_results(json!({ "points": xs.ncols() })))?;
    Ok(())
}

fn round(args: PolyArgs, method: String, out: PathBuf) -> Result<()> {
    let seed = seed_or_clock(args.seed);
    tracing::info!(method, seed, "round");
    let loaded = load(&args)?;
    let r = api::rounding(&loaded.poly, &method, !args.slow, Some(seed))?;
    let result = json!({
        "a": io::rows(r.polytope.a()),
        "b": r.polytope.b().as_slice(),
        "transform": io::rows(&r.transform),
        "shift": r.shift.as_slice(),
        "round_value": r.round_value,
    });
    io::write_json(&out, &result)?;
    let mut params = base_params(&args, seed);
    params["method"] = json!(method);
    write_sidecar(
        &out,
        Payload::new("round", params).with_results(json!({ "round_value": r.round_value })),
    )?;
    tracing::info!(round_value = r.round_value, out = %out.display(), "rounded");
    Ok(())
}

fn mmcs(args: PolyArgs, ess: usize, psrf_check: bool, parallel: bool, threads: usize, out: PathBuf) -> Result<()> {
    let seed = seed_or_clock(args.seed);
    tracing::info!(ess, psrf_check, parallel, threads, seed, "mmcs");
    let loaded = load(&args)?;
    let run = if args.slow { api::slow_mmcs } else { api::fast_mmcs };
    let res = run(&loaded.poly, ess, psrf_check, parallel, threads, Some(seed))?;
    let xs = loaded.lift_columns(res.samples.clone());
    io::write_points(&out, &xs)?;
    let outcome = match &res.outcome {
        MmcsOutcome::Converged => "converged".to_string(),
        MmcsOutcome::PhaseCap => "phase_cap".to_string(),
        MmcsOutcome::Failed(err) => format!("failed: {err}"),
    };
    let mut params = base_params(&args, seed);
    params["ess"] = json!(ess);
    params["psrf_check"] = json!(psrf_check);
    params["parallel"] = json!(parallel);
    params["threads"] = json!(threads);
    let results = json!({
        "outcome": outcome,
        "phases": res.phases,
        "samples": xs.ncols(),
        "ess": res.ess,
        "psrf": res.psrf,
    });
    write_sidecar(&out, Payload::new("mmcs", params).with_results(results))?;
    tracing::info!(outcome, phases = res.phases, samples = xs.ncols(), "mmcs done");
    if let MmcsOutcome::Failed(err) = res.outcome {
        return Err(err).context("mmcs stopped early; samples of completed phases were written");
    }
    Ok(())
}

fn report() -> Result<()> {
    let doc = json!({
        "polyvol_version": polyvol::VERSION,
        "code_rev": provenance::current_git_rev(),
    });
    println!("{}", serde_json::to_string_pretty(&doc)?);
    Ok(())
}
