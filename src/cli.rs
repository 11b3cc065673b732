use std::path::PathBuf;

use clap::Parser;

/// Penguin Lens - interactive Palmer penguins explorer
#[derive(Debug, Parser)]
#[command(name = "penguin-lens")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Dataset file (.csv, .json, .parquet); overrides `data.path` from the config
    #[arg(short, long)]
    pub data: Option<PathBuf>,

    /// TOML configuration file (default: ./penguin-lens.toml if present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

pub fn init_logging(verbosity: u8) {
    let log_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_paths_and_verbosity() {
        let cli = Cli::parse_from(["penguin-lens", "--data", "p.parquet", "-vv"]);
        assert_eq!(cli.data, Some(PathBuf::from("p.parquet")));
        assert_eq!(cli.config, None);
        assert_eq!(cli.verbose, 2);
    }
}
