//! PairLab CLI: pairs-trading research commands.
//!
//! Commands:
//! - `run`: full pipeline and backtest from a TOML config, with artifacts
//! - `coint`: Engle-Granger test and hedge ratio for a pair
//! - `regimes`: fit the regime model on a pair and print per-state diagnostics

mod obs;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};

use pairlab_core::indicators::IndicatorBank;
use pairlab_core::pairs::{compute_spread, CointegrationGate, HedgeRatioEstimator};
use pairlab_core::regime::{FeatureInputs, RegimeDetector};
use pairlab_runner::{load_pair, run_pair, ArtifactWriter, ReportSink, RunConfig, StdoutSummary};

#[derive(Parser)]
#[command(
    name = "pairlab",
    about = "PairLab CLI: cointegration, regime detection and pairs backtesting"
)]
struct Cli {
    /// Log filter (overridden by PAIRLAB_LOG), e.g. "info" or "pairlab_core=debug".
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Log output format: text or json.
    #[arg(long, global = true, default_value = "text")]
    log_format: String,

    #[command(subcommand)]
    command: Commands,
}

/// Where the pair comes from. Flags override the config file.
#[derive(Args, Debug, Clone)]
struct PairArgs {
    /// Path to a TOML run config.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Dependent (traded) leg.
    #[arg(long)]
    symbol_a: Option<String>,

    /// Independent leg.
    #[arg(long)]
    symbol_b: Option<String>,

    /// Directory holding <SYMBOL>.csv files.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Regime model seed.
    #[arg(long)]
    seed: Option<u64>,
}

impl PairArgs {
    fn resolve(&self) -> Result<RunConfig> {
        let mut config = match &self.config {
            Some(path) => RunConfig::from_file(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => RunConfig::default(),
        };
        if let Some(a) = &self.symbol_a {
            config.pair.symbol_a = a.clone();
        }
        if let Some(b) = &self.symbol_b {
            config.pair.symbol_b = b.clone();
        }
        if let Some(dir) = &self.data_dir {
            config.pair.data_dir = dir.clone();
        }
        if let Some(seed) = self.seed {
            config.pipeline.regime.seed = seed;
        }
        config.validate().context("invalid run configuration")?;
        Ok(config)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline and backtest, print a summary and write artifacts.
    Run {
        #[command(flatten)]
        pair: PairArgs,

        /// Artifact root directory.
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Print the summary only; write no artifacts.
        #[arg(long, default_value_t = false)]
        no_artifacts: bool,
    },
    /// Test a pair for cointegration and estimate its hedge ratio.
    Coint {
        #[command(flatten)]
        pair: PairArgs,

        /// Override the p-value threshold.
        #[arg(long)]
        significance: Option<f64>,
    },
    /// Fit the regime model and print per-state diagnostics.
    Regimes {
        #[command(flatten)]
        pair: PairArgs,

        /// Override the number of hidden states.
        #[arg(long)]
        states: Option<usize>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    if let Err(err) = obs::init_tracing(&cli.log_level, &cli.log_format) {
        bail!(err);
    }

    match cli.command {
        Commands::Run {
            pair,
            output_dir,
            no_artifacts,
        } => run_cmd(&pair, output_dir, no_artifacts),
        Commands::Coint { pair, significance } => coint_cmd(&pair, significance),
        Commands::Regimes { pair, states } => regimes_cmd(&pair, states),
    }
}

fn run_cmd(args: &PairArgs, output_dir: Option<PathBuf>, no_artifacts: bool) -> Result<()> {
    let mut config = args.resolve()?;
    if let Some(dir) = output_dir {
        config.output.dir = dir;
    }
    if no_artifacts {
        config.output.artifacts = false;
    }

    let report = run_pair(&config).context("pair run failed")?;

    StdoutSummary::stdout().emit(&report)?;
    tracing::debug!(run_id = %report.run_id, "summary emitted");
    if config.output.artifacts {
        let mut writer = ArtifactWriter::new(&config.output.dir);
        writer.emit(&report)?;
        if let Some(paths) = writer.last_paths() {
            println!("Artifacts saved to: {}", paths.run_dir.display());
        }
    }
    Ok(())
}

fn coint_cmd(args: &PairArgs, significance: Option<f64>) -> Result<()> {
    let mut config = args.resolve()?;
    if let Some(s) = significance {
        config.pipeline.significance = s;
        config.validate()?;
    }
    let pair = load_pair(&config)?;

    let result = CointegrationGate::new(config.pipeline.significance).test(&pair)?;
    let hedge = HedgeRatioEstimator.estimate(&pair)?;
    let cv = result.critical_values;

    println!("Pair:            {} / {}", pair.symbol_a(), pair.symbol_b());
    println!("Bars:            {}", pair.len());
    println!("Test statistic:  {:.4}", result.test_statistic);
    println!("p-value:         {:.4}", result.p_value);
    println!(
        "Critical values: 1%={:.4}  5%={:.4}  10%={:.4}",
        cv.one, cv.five, cv.ten
    );
    println!("ADF lag:         {}", result.used_lag);
    println!(
        "Hedge ratio:     {:.4} (intercept {:.4})",
        hedge.slope, hedge.intercept
    );
    println!(
        "Cointegrated:    {}",
        if result.is_cointegrated { "yes" } else { "no" }
    );
    Ok(())
}

fn regimes_cmd(args: &PairArgs, states: Option<usize>) -> Result<()> {
    let mut config = args.resolve()?;
    if let Some(k) = states {
        config.pipeline.regime.n_states = k;
        config.validate()?;
    }
    let pair = load_pair(&config)?;

    let hedge = HedgeRatioEstimator.estimate(&pair)?;
    let closes_a = pair.closes_a();
    let spread = compute_spread(&closes_a, &pair.closes_b(), &hedge);
    let frame = IndicatorBank::new(config.pipeline.indicators.clone()).compute(pair.a());
    let assignment = RegimeDetector::new(config.pipeline.regime.clone()).detect(&FeatureInputs {
        frame: &frame,
        spread: &spread,
        closes: &closes_a,
    })?;

    println!("Pair:           {} / {}", pair.symbol_a(), pair.symbol_b());
    println!(
        "Converged:      {} after {} iterations (log-likelihood {:.3})",
        assignment.converged, assignment.iterations, assignment.log_likelihood
    );
    println!();
    println!(
        "{:<6} {:>8} {:>14} {:>14}",
        "State", "Bars", "Mean return", "Volatility"
    );
    println!("{}", "-".repeat(45));
    for d in &assignment.diagnostics {
        println!(
            "{:<6} {:>8} {:>14.6} {:>14.6}",
            d.state, d.count, d.mean_return, d.return_volatility
        );
    }
    let unlabeled = assignment.labels.iter().filter(|l| l.is_none()).count();
    println!();
    println!("Unlabeled bars: {unlabeled}");
    Ok(())
}
