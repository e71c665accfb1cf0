//! Command-line interface
//!
//! `calprice` with no arguments opens an interactive session mirroring the
//! estimator page: enter features, get a price, optionally open the
//! retraining laboratory. Subcommands expose the same actions one-shot.

use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;
use std::time::Instant;

use crate::dataset::Dataset;
use crate::experiment::{self, ExperimentConfig, DEPTH_RANGE, TREES_RANGE};
use crate::predictor::{self, PredictorConfig, Predictor, PriceModel, DEFAULT_MODEL_PATH};
use crate::report;
use crate::schema::HousingFeatures;

// ─── Styling helpers ───────────────────────────────────────────────────────────

fn dim(s: &str) -> ColoredString {
    s.truecolor(100, 100, 100)
}
fn accent(s: &str) -> ColoredString {
    s.truecolor(120, 170, 255)
}
fn muted(s: &str) -> ColoredString {
    s.truecolor(140, 140, 140)
}
fn ok(s: &str) -> ColoredString {
    s.truecolor(100, 210, 120)
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "calprice")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "California housing price estimator")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Estimate a price for one set of housing features
    Estimate {
        /// Median neighborhood income, in $10k
        #[arg(long, default_value = "5.0")]
        med_inc: f64,

        /// House age in years
        #[arg(long, default_value = "20")]
        house_age: f64,

        /// Average rooms per household
        #[arg(long, default_value = "6.0")]
        ave_rooms: f64,

        /// Average bedrooms per household
        #[arg(long, default_value = "1.0")]
        ave_bedrms: f64,

        /// Block population
        #[arg(long, default_value = "1000")]
        population: f64,

        /// Average occupants per household
        #[arg(long, default_value = "3.0")]
        ave_occup: f64,

        /// Latitude
        #[arg(long, default_value = "37.7")]
        latitude: f64,

        /// Longitude
        #[arg(long, default_value = "-122.4")]
        longitude: f64,

        /// Model artifact path
        #[arg(short, long, default_value = DEFAULT_MODEL_PATH)]
        model: PathBuf,
    },

    /// Run one laboratory experiment (retrain and score)
    Lab {
        /// Number of trees [10, 100]
        #[arg(short, long, default_value = "30")]
        trees: usize,

        /// Maximum tree depth [1, 20]
        #[arg(short, long, default_value = "5")]
        depth: usize,
    },

    /// Train the serving model artifact from the reference dataset
    Train {
        /// Output artifact path
        #[arg(short, long, default_value = DEFAULT_MODEL_PATH)]
        out: PathBuf,

        /// Number of trees
        #[arg(long, default_value = "60")]
        trees: usize,

        /// Maximum tree depth
        #[arg(long, default_value = "12")]
        depth: usize,

        /// Random seed
        #[arg(long, default_value = "42")]
        seed: u64,
    },

    /// Show dataset information
    Info {
        /// Dataset file (defaults to the bundled reference data)
        #[arg(short, long)]
        data: Option<PathBuf>,
    },
}

// ─── Commands ──────────────────────────────────────────────────────────────────

pub fn cmd_estimate(features: &HousingFeatures, model_path: &PathBuf) -> anyhow::Result<()> {
    let config = PredictorConfig::default().with_model_path(model_path.clone());
    let predictor = Predictor::load(config)?;
    render_estimate(&predictor, features)?;
    Ok(())
}

fn render_estimate(predictor: &Predictor, features: &HousingFeatures) -> anyhow::Result<()> {
    let estimate = predictor.estimate(features)?;

    section("Estimate");
    println!(
        "  {:<20} {}",
        muted("Estimated price"),
        report::format_currency(estimate.price).white().bold()
    );
    let delta_str = report::format_currency(estimate.delta);
    let delta_colored = if estimate.delta >= 0.0 {
        format!("+{}", delta_str).green()
    } else {
        delta_str.red()
    };
    println!(
        "  {:<20} {} {}",
        muted("vs. CA reference"),
        delta_colored,
        dim(&format!(
            "(ref {})",
            report::format_currency(predictor.config().reference_price)
        ))
    );

    section("Location");
    print!("{}", report::california_map(features.latitude, features.longitude));

    section("Feature importance");
    print!("{}", report::importance_chart(&predictor.ranked_importances()?));
    println!();

    Ok(())
}

pub fn cmd_lab(trees: usize, depth: usize) -> anyhow::Result<()> {
    let config = ExperimentConfig::default()
        .with_trees(trees)
        .with_max_depth(depth);

    section("Laboratory");

    step_run("Loading reference data");
    let data = Dataset::reference()?;
    step_done(&format!("{} rows", data.n_rows()));

    step_run(&format!(
        "Training forest ({} trees, depth {})",
        trees, depth
    ));
    let start = Instant::now();
    let result = experiment::run(&data, &config)?;
    step_done(&format!("{:.2?}", start.elapsed()));

    println!();
    println!(
        "  {:<16} {}",
        muted("R² (held out)"),
        format!("{:.4}", result.r2).white().bold()
    );
    println!(
        "  {:<16} {}",
        muted("Split"),
        format!("{} train / {} test", result.n_train, result.n_test)
    );

    section("Actual vs predicted");
    print!("{}", report::scatter_plot(&result.pairs));
    println!();

    Ok(())
}

pub fn cmd_train(out: &PathBuf, trees: usize, depth: usize, seed: u64) -> anyhow::Result<()> {
    section("Train");

    step_run("Loading reference data");
    let data = Dataset::reference()?;
    step_done(&format!("{} rows", data.n_rows()));

    step_run(&format!("Fitting forest ({} trees, depth {})", trees, depth));
    let start = Instant::now();
    let model = PriceModel::train(&data, trees, depth, seed)?;
    step_done(&format!("{:.2?}", start.elapsed()));

    step_run(&format!("Saving → {}", out.display()));
    model.save(out)?;
    step_done("");

    println!();
    println!(
        "  {:<16} {}",
        muted("Holdout R²"),
        format!("{:.4}", model.provenance.holdout_r2).white().bold()
    );
    println!();

    Ok(())
}

pub fn cmd_info(data_path: Option<&PathBuf>) -> anyhow::Result<()> {
    section("Data Info");

    let data = match data_path {
        Some(path) => Dataset::from_csv(path)?,
        None => Dataset::reference()?,
    };
    let df = data.frame();

    let source = data_path
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "bundled reference data".to_string());
    println!("  {:<12} {}", muted("Source"), source);
    println!("  {:<12} {}", muted("Rows"), df.height());
    println!("  {:<12} {}", muted("Columns"), df.width());
    println!();

    println!(
        "  {:<16} {:<12} {:>6} {:>8}",
        muted("Column"),
        muted("Type"),
        muted("Nulls"),
        muted("Unique")
    );
    println!("  {}", dim(&"─".repeat(46)));

    for col in df.get_columns() {
        println!(
            "  {:<16} {:<12} {:>6} {:>8}",
            col.name(),
            format!("{:?}", col.dtype()).truecolor(140, 140, 140),
            col.null_count(),
            col.n_unique().unwrap_or(0)
        );
    }

    println!();
    Ok(())
}

// ─── Interactive mode ──────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("  {}", "calprice".truecolor(120, 170, 255).bold());
    println!(
        "  {}",
        dim(&format!(
            "California housing price estimator  ·  v{}",
            env!("CARGO_PKG_VERSION")
        ))
    );
}

fn prompt_f64(theme: &dialoguer::theme::ColorfulTheme, label: &str, default: f64) -> anyhow::Result<f64> {
    let value = dialoguer::Input::<f64>::with_theme(theme)
        .with_prompt(format!("  {}", label))
        .default(default)
        .interact_text()?;
    Ok(value)
}

fn prompt_bounded(
    theme: &dialoguer::theme::ColorfulTheme,
    label: &str,
    default: usize,
    range: (usize, usize),
) -> anyhow::Result<usize> {
    let value = dialoguer::Input::<usize>::with_theme(theme)
        .with_prompt(format!("  {} [{}-{}]", label, range.0, range.1))
        .default(default)
        .validate_with(move |v: &usize| {
            if (range.0..=range.1).contains(v) {
                Ok(())
            } else {
                Err(format!("must be in [{}, {}]", range.0, range.1))
            }
        })
        .interact_text()?;
    Ok(value)
}

fn prompt_features(theme: &dialoguer::theme::ColorfulTheme) -> anyhow::Result<HousingFeatures> {
    let defaults = HousingFeatures::default();

    section("Housing features");
    let med_inc = prompt_f64(theme, "Median income ($10k)", defaults.med_inc)?;
    let house_age = dialoguer::Input::<f64>::with_theme(theme)
        .with_prompt("  House age (years) [1-50]")
        .default(defaults.house_age)
        .validate_with(|v: &f64| {
            if (1.0..=50.0).contains(v) {
                Ok(())
            } else {
                Err("must be in [1, 50]")
            }
        })
        .interact_text()?;
    let ave_rooms = prompt_f64(theme, "Average rooms", defaults.ave_rooms)?;
    let ave_bedrms = prompt_f64(theme, "Average bedrooms", defaults.ave_bedrms)?;
    let population = prompt_f64(theme, "Block population", defaults.population)?;
    let ave_occup = prompt_f64(theme, "Average occupants", defaults.ave_occup)?;
    let latitude = prompt_f64(theme, "Latitude", defaults.latitude)?;
    let longitude = prompt_f64(theme, "Longitude", defaults.longitude)?;

    Ok(HousingFeatures {
        med_inc,
        house_age,
        ave_rooms,
        ave_bedrms,
        population,
        ave_occup,
        latitude,
        longitude,
    })
}

fn run_laboratory(theme: &dialoguer::theme::ColorfulTheme) -> anyhow::Result<()> {
    loop {
        let trees = prompt_bounded(theme, "Number of trees", 30, TREES_RANGE)?;
        let depth = prompt_bounded(theme, "Maximum depth", 5, DEPTH_RANGE)?;

        // A failed run aborts only this action; the estimator stays usable
        if let Err(e) = cmd_lab(trees, depth) {
            println!("  {} {}", "experiment failed:".red(), e);
        }

        let again = dialoguer::Confirm::with_theme(theme)
            .with_prompt("  Run another experiment?")
            .default(false)
            .interact()?;
        if !again {
            return Ok(());
        }
    }
}

pub fn cmd_interactive() -> anyhow::Result<()> {
    use dialoguer::{theme::ColorfulTheme, Select};

    print_banner();

    // Load once; reused for every estimate in this session. Missing artifact
    // is fatal here, matching the serving contract.
    let predictor = predictor::shared()?;

    let theme = ColorfulTheme::default();

    loop {
        println!();
        let items = &[
            "Estimate a price       enter features, get an estimate",
            "Laboratory             retrain with your own hyperparameters",
            "Quit",
        ];

        let sel = Select::with_theme(&theme)
            .with_prompt("What would you like to do")
            .items(items)
            .default(0)
            .interact_opt()?;

        match sel {
            Some(0) => {
                let features = prompt_features(&theme)?;
                render_estimate(predictor, &features)?;
            }
            Some(1) => {
                run_laboratory(&theme)?;
            }
            Some(2) | None => {
                println!();
                println!("  {}", dim("goodbye"));
                println!();
                return Ok(());
            }
            _ => {}
        }
    }
}
