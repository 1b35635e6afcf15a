//! Runs the Metropolis sampler on a 2D Gaussian, logging every tick and a final summary.

use clap::Parser;
use log::info;

use mini_metropolis::config::{parse_covariance, RunConfig};
use mini_metropolis::core::{run_chain_with, run_progress, StepOutcome};
use mini_metropolis::distributions::Covariance2;
use mini_metropolis::stats::ChainSummary;

#[cfg(feature = "csv")]
use mini_metropolis::io::csv::save_trace_csv;

#[derive(Parser, Debug)]
#[command(version, about, long_about)]
struct Cli {
    /// Number of sampler ticks
    #[arg(short, long, default_value_t = 25)]
    ticks: usize,

    /// Seed for the random source (random if omitted)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Target covariance as a,b,c,d (row-major)
    #[arg(long, value_parser = parse_covariance, default_value = "0.5,0.2,0.2,0.5")]
    target: Covariance2,

    /// Proposal covariance as a,b,c,d (row-major)
    #[arg(long, value_parser = parse_covariance, default_value = "0.25,0,0,0.25")]
    proposal: Covariance2,

    /// Confidence ellipse half-width in standard deviations
    #[arg(long, default_value_t = 2.0)]
    n_std: f64,

    /// Show a progress bar instead of logging every tick
    #[arg(long)]
    progress: bool,

    /// Directory to write accepted.csv and rejected.csv into
    #[cfg(feature = "csv")]
    #[arg(long)]
    out_dir: Option<std::path::PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    let config = RunConfig {
        target: cli.target,
        proposal: cli.proposal,
        ticks: cli.ticks,
        seed: cli.seed,
        n_std: cli.n_std,
    };
    let mut mh = config.build()?;
    info!("seed = {}", mh.seed());

    let ellipse = config.ellipse()?;
    info!(
        "target ellipse: width {:.4}, height {:.4}, angle {:.2} deg",
        ellipse.width, ellipse.height, ellipse.angle_deg
    );

    if cli.progress {
        run_progress(&mut mh, config.ticks)?;
    } else {
        run_chain_with(&mut mh, config.ticks, |i, outcome, _| match outcome {
            StepOutcome::Seeded(p) => info!("tick {i}: start at ({:.4}, {:.4})", p.x, p.y),
            StepOutcome::Accepted { to, ratio, .. } => {
                info!("tick {i}: accept ({:.4}, {:.4}), a = {ratio:.4}", to.x, to.y)
            }
            StepOutcome::Rejected {
                proposed, ratio, ..
            } => info!(
                "tick {i}: reject ({:.4}, {:.4}), a = {ratio:.4}",
                proposed.x, proposed.y
            ),
        })?;
    }

    let summary = ChainSummary::from_trace(mh.accepted(), mh.rejected());
    println!(
        "{} ticks: {} accepted, {} rejected (acceptance rate {:.3})",
        summary.ticks, summary.n_accepted, summary.n_rejected, summary.acceptance_rate
    );
    if let Some(mean) = summary.mean {
        println!("Accepted mean: ({:.3}, {:.3})", mean.x, mean.y);
    }
    if let Some(cov) = summary.covariance {
        let t = config.target;
        println!(
            "Accepted covariance: [[{:.3}, {:.3}], [{:.3}, {:.3}]] (target [[{}, {}], [{}, {}]])",
            cov.a, cov.b, cov.c, cov.d, t.a, t.b, t.c, t.d
        );
    }

    #[cfg(feature = "csv")]
    {
        if let Some(dir) = &cli.out_dir {
            save_trace_csv(mh.accepted(), mh.rejected(), dir)
                .map_err(|e| anyhow::anyhow!("saving trace to {}: {e}", dir.display()))?;
            info!("saved trace to {}", dir.display());
        }
    }

    Ok(())
}
