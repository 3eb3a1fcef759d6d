//! Estimates accuracy figures on synthetic sessions and writes them to the
//! metrics cache the server reads at startup.

use anyhow::{Context, Result, bail};
use clap::Parser;
use indexcast::application::accuracy_estimator::{
    DEFAULT_BASE_PRICE, EstimationReport, SyntheticSessionGenerator, estimate,
};
use indexcast::application::ml::model_loader::load_model;
use indexcast::application::ml::predictor::Regressor;
use indexcast::config::ModelEnvConfig;
use indexcast::domain::ml::features::FeatureBuilder;
use indexcast::infrastructure::accuracy_persistence::AccuracyPersistence;
use indexcast::infrastructure::observability::logging;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::{Path, PathBuf};
use tracing::{Level, info};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Number of synthetic sessions
    #[arg(long, default_value_t = 200)]
    samples: usize,

    /// Metrics cache to write (defaults to ACCURACY_METRICS_PATH)
    #[arg(long)]
    output: Option<PathBuf>,

    /// RNG seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Optional CSV dump of actual/predicted pairs
    #[arg(long)]
    csv: Option<PathBuf>,

    #[arg(long, default_value_t = DEFAULT_BASE_PRICE)]
    base_price: f64,

    /// Evaluate the stub model when no artifact loads
    #[arg(long)]
    allow_stub: bool,
}

fn write_csv(path: &Path, report: &EstimationReport) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("Failed to create CSV file")?;
    for sample in &report.samples {
        writer.serialize(sample)?;
    }
    writer.flush()?;
    Ok(())
}

fn print_report(report: &EstimationReport) {
    let m = &report.metrics;

    println!("\n══════════════════════════════════════════════════════");
    println!("  SYNTHETIC ACCURACY REPORT");
    println!("══════════════════════════════════════════════════════");
    println!("\n  Overall:");
    println!("    Samples:          {}", m.test_samples.unwrap_or(0));
    println!("    Confidence Level: {}", m.confidence_level);
    println!("    Within 50 points: {}%", m.accuracy_percentage);
    if let Some(within_100) = m.within_100_points {
        println!("    Within 100 points: {}%", within_100);
    }

    println!("\n  Statistical Metrics:");
    println!("    R2 Score: {:.3} ({:.1}%)", m.r2_score, m.r2_score * 100.0);
    println!("    MAE:      +/-{:.2} points", m.mae);
    println!("    RMSE:     {:.2} points", m.rmse);
    println!("    MAPE:     {:.2}%", m.mape);

    println!("\n  Sample Predictions (first 5):");
    println!("     Actual    Predicted    Error");
    for s in report.samples.iter().take(5) {
        println!(
            "    {:8.2}  {:9.2}  {:+7.2}",
            s.actual,
            s.predicted,
            s.actual - s.predicted
        );
    }
    println!();
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    logging::init(Level::INFO);

    let args = Args::parse();
    if args.samples == 0 {
        bail!("--samples must be at least 1");
    }
    let mut config = ModelEnvConfig::from_env()?;
    config.allow_stub = args.allow_stub;

    let Some(predictor) = load_model(&config)? else {
        bail!("Cannot estimate accuracy without a model (pass --allow-stub to use the stub)");
    };
    info!("Estimating {} on {} synthetic sessions", predictor.name(), args.samples);

    let generator = SyntheticSessionGenerator {
        base_price: args.base_price,
        ..SyntheticSessionGenerator::default()
    };
    let builder = FeatureBuilder::new(config.price_change_scale);
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let report = estimate(&predictor, &builder, &generator, args.samples, &mut rng)
        .context("Prediction failed on a synthetic session")?;
    print_report(&report);

    if let Some(path) = &args.csv {
        write_csv(path, &report)?;
        info!("Wrote {} samples to {:?}", report.samples.len(), path);
    }

    let output = args
        .output
        .unwrap_or_else(|| config.accuracy_metrics_path.clone());
    AccuracyPersistence::new(output).save(&report.metrics)?;

    Ok(())
}
