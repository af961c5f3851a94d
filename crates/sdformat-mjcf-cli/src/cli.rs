//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Convert robot descriptions between SDFormat and MuJoCo MJCF.
#[derive(Debug, Parser)]
#[command(name = "sdformat-mjcf")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Conversion settings file (RON)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Convert an SDFormat or URDF file to MJCF
    ToMjcf(ToMjcfArgs),

    /// Convert an MJCF file to an SDFormat world
    ToSdf(ToSdfArgs),
}

#[derive(Debug, Args)]
pub struct ToMjcfArgs {
    /// SDFormat or URDF input file
    pub input: PathBuf,

    /// MJCF output file
    pub output: PathBuf,
}

#[derive(Debug, Args)]
pub struct ToSdfArgs {
    /// MJCF input file
    pub input: PathBuf,

    /// SDFormat output file
    pub output: PathBuf,

    /// Add the Gazebo physics, sensors, user commands and scene broadcaster
    /// systems to the world
    #[arg(long)]
    pub export_world_plugins: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "sdformat-mjcf",
            "to-sdf",
            "in.xml",
            "out.sdf",
            "--export-world-plugins",
            "--config",
            "convert.ron",
            "--debug",
        ]);
        assert!(cli.debug);
        assert_eq!(cli.config, Some(PathBuf::from("convert.ron")));
        match cli.command {
            Commands::ToSdf(args) => {
                assert!(args.export_world_plugins);
                assert_eq!(args.input, PathBuf::from("in.xml"));
            }
            Commands::ToMjcf(_) => panic!("expected to-sdf"),
        }
    }
}
