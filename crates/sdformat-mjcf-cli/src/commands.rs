//! Subcommand implementations.

use std::path::Path;

use anyhow::{Context, Result};
use sdformat_mjcf_core::{ConversionConfig, Mujoco, SdfRoot, mjcf_to_sdf, sdf_to_mjcf};

use crate::cli::{Cli, Commands, ToMjcfArgs, ToSdfArgs};

/// Run the selected subcommand
pub fn run(cli: &Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;
    match &cli.command {
        Commands::ToMjcf(args) => to_mjcf(args, &config),
        Commands::ToSdf(args) => to_sdf(args, config),
    }
}

fn load_config(path: Option<&Path>) -> Result<ConversionConfig> {
    match path {
        Some(path) => ConversionConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(ConversionConfig::default()),
    }
}

fn to_mjcf(args: &ToMjcfArgs, config: &ConversionConfig) -> Result<()> {
    let root = SdfRoot::load_file(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    let mujoco = sdf_to_mjcf::convert(&root, config)
        .with_context(|| format!("Failed to convert {} to MJCF", args.input.display()))?;
    mujoco
        .save(&args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    tracing::info!("Wrote {}", args.output.display());
    Ok(())
}

fn to_sdf(args: &ToSdfArgs, mut config: ConversionConfig) -> Result<()> {
    config.export_world_plugins |= args.export_world_plugins;

    let mujoco = Mujoco::load_file(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    let root = mjcf_to_sdf::convert(&mujoco, &config)
        .with_context(|| format!("Failed to convert {} to SDFormat", args.input.display()))?;
    root.save(&args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    tracing::info!("Wrote {}", args.output.display());
    Ok(())
}
