//! Prints the active model's coefficients and walks one prediction through
//! them feature by feature.

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use clap::Parser;
use indexcast::application::ml::model_loader::load_model;
use indexcast::application::ml::predictor::Regressor;
use indexcast::application::prediction_service::PredictionService;
use indexcast::config::ModelEnvConfig;
use indexcast::domain::ml::features::{DerivedPrices, FeatureBuilder, MarketInput};
use indexcast::infrastructure::observability::logging;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::Level;

/// Range a next-day close is expected to fall in for the reference session
const PLAUSIBLE_RANGE: std::ops::Range<f64> = 4000.0..5000.0;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Model artifact (defaults to MODEL_PATH)
    #[arg(long)]
    model: Option<PathBuf>,

    /// Legacy artifact (defaults to the model path)
    #[arg(long)]
    legacy_model: Option<PathBuf>,

    #[arg(long, default_value_t = 4500.0)]
    open: f64,

    #[arg(long, default_value_t = 4520.0)]
    high: f64,

    #[arg(long, default_value_t = 4480.0)]
    low: f64,

    /// Reference date, YYYY-MM-DD (defaults to today)
    #[arg(long)]
    date: Option<NaiveDate>,

    /// Override PRICE_CHANGE_SCALE
    #[arg(long)]
    price_change_scale: Option<f64>,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    logging::init(Level::WARN);

    let args = Args::parse();

    let mut config = ModelEnvConfig::from_env()?;
    if let Some(path) = args.model {
        config.legacy_model_path = args.legacy_model.clone().unwrap_or_else(|| path.clone());
        config.model_path = path;
    } else if let Some(path) = args.legacy_model {
        config.legacy_model_path = path;
    }
    if let Some(scale) = args.price_change_scale {
        config.price_change_scale = scale;
    }
    config.allow_stub = false;

    let Some(predictor) = load_model(&config)? else {
        bail!(
            "No model could be loaded from {:?} or {:?}",
            config.model_path,
            config.legacy_model_path
        );
    };

    let summary = predictor.summary();
    println!("\n══════════════════════════════════════════════════════");
    println!("  MODEL ANALYSIS");
    println!("══════════════════════════════════════════════════════");
    println!("  Model Type:   {}", summary.name);
    println!("  Source:       {}", summary.source);
    println!("  Features:     {}", summary.n_features.unwrap_or(0));
    println!("  Intercept:    {:.4}", summary.intercept.unwrap_or(0.0));
    println!("  Named fields: {}", if summary.has_feature_names { "yes" } else { "no (positional)" });
    println!("\n  Coefficients:");
    for c in &summary.coefficients {
        println!("    {:<18} {:>14.6}", c.name, c.coefficient);
    }

    let input = MarketInput::new(args.open, args.high, args.low);
    let today = args.date.unwrap_or_else(|| chrono::Local::now().date_naive());
    let builder = FeatureBuilder::new(config.price_change_scale);
    let service = PredictionService::new(Some(Arc::new(predictor) as Arc<dyn Regressor>), builder);
    let explanation = service
        .explain(&input, today)
        .context("Failed to evaluate reference session")?;

    let derived = DerivedPrices::from_input(&input);
    println!("\n  Input: open={:.2} high={:.2} low={:.2}", input.open, input.high, input.low);
    println!(
        "  Derived: current={:.2} change={:.2} range={:.2} (change scale {})",
        derived.current_price,
        derived.price_change,
        derived.price_range,
        builder.price_change_scale()
    );

    println!("\n  Prediction Calculation:");
    let mut running = explanation.intercept;
    println!("    Starting with intercept: {:.2}", running);
    for c in &explanation.contributions {
        running += c.contribution;
        println!(
            "    {:<18} {:>10.2} x {:>12.6} = {:>10.2}   (total {:.2})",
            c.name, c.value, c.coefficient, c.contribution, running
        );
    }

    println!("\n  Predicted close for {}: {:.2}", explanation.prediction_date, explanation.predicted_close);
    println!(
        "  Plausible ({:.0}-{:.0}): {}",
        PLAUSIBLE_RANGE.start,
        PLAUSIBLE_RANGE.end,
        if PLAUSIBLE_RANGE.contains(&explanation.predicted_close) { "yes" } else { "NO" }
    );
    println!("  Difference from typical price: {:+.2}", explanation.predicted_close - derived.current_price);

    println!("\n  Biggest Contributors:");
    for (i, c) in explanation.top_contributors.iter().enumerate() {
        println!("    {}. {:<18} {:>10.2}", i + 1, c.name, c.contribution);
    }
    println!();

    Ok(())
}
