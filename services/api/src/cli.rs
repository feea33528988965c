use crate::creators::{run_creators, run_profile, run_shortlist, CreatorsCommand, ShortlistCommand};
use crate::demo::{run_demo, DemoArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use matchly::config::AppConfig;
use matchly::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Matchly",
    about = "Run the creator directory service or manage its records from the command line",
    version
)]
struct Cli {
    /// Override the configured data directory (APP_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Onboard, inspect, and export creator profiles
    Creators {
        #[command(subcommand)]
        command: CreatorsCommand,
    },
    /// Manage the brand shortlist
    Shortlist {
        #[command(subcommand)]
        command: ShortlistCommand,
    },
    /// Show the current creator's dashboard
    Profile,
    /// Walk through onboarding and discovery against an in-memory directory
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    #[arg(skip)]
    pub(crate) data_dir: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let data_dir = cli.data_dir;
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(mut args) => {
            args.data_dir = data_dir;
            server::run(args).await
        }
        Command::Creators { command } => run_creators(command, &load_config(data_dir)?),
        Command::Shortlist { command } => run_shortlist(command, &load_config(data_dir)?),
        Command::Profile => run_profile(&load_config(data_dir)?),
        Command::Demo(args) => run_demo(args),
    }
}

fn load_config(data_dir: Option<PathBuf>) -> Result<AppConfig, AppError> {
    let mut config = AppConfig::load()?;
    if let Some(data_dir) = data_dir {
        config.storage.data_dir = data_dir;
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_subcommand_defaults_to_serve() {
        let cli = Cli::try_parse_from(["matchly"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn data_dir_is_accepted_after_subcommand() {
        let cli = Cli::try_parse_from(["matchly", "profile", "--data-dir", "/tmp/matchly"])
            .expect("parses");
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/matchly")));
        assert!(matches!(cli.command, Some(Command::Profile)));
    }
}
