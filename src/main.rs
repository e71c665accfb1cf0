//! calprice - Main entry point

use calprice::cli::{cmd_estimate, cmd_info, cmd_lab, cmd_interactive, cmd_train, Cli, Commands};
use calprice::schema::HousingFeatures;
use clap::Parser;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "calprice=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Estimate {
            med_inc,
            house_age,
            ave_rooms,
            ave_bedrms,
            population,
            ave_occup,
            latitude,
            longitude,
            model,
        }) => {
            let features = HousingFeatures {
                med_inc,
                house_age,
                ave_rooms,
                ave_bedrms,
                population,
                ave_occup,
                latitude,
                longitude,
            };
            cmd_estimate(&features, &model)?;
        }
        Some(Commands::Lab { trees, depth }) => {
            cmd_lab(trees, depth)?;
        }
        Some(Commands::Train {
            out,
            trees,
            depth,
            seed,
        }) => {
            cmd_train(&out, trees, depth, seed)?;
        }
        Some(Commands::Info { data }) => {
            cmd_info(data.as_ref())?;
        }
        None => {
            cmd_interactive()?;
        }
    }

    Ok(())
}
