use clap::{Parser, Subcommand};
use innkeep_config::Config;
use innkeep_server::commands;

/// Property listing backend.
#[derive(Parser, Debug)]
#[command(name = "innkeep", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP API
    Serve {
        /// Port to listen on (overrides INNKEEP_PORT)
        #[arg(long)]
        port: Option<u16>,

        /// Do not apply pending migrations before starting
        #[arg(long)]
        no_migrate: bool,
    },
    /// Apply pending migrations
    Migrate,
    /// Show migration status
    Status,
    /// Create a demo host and walk one property through onboarding
    Seed {
        /// Name of the demo property
        #[arg(long, default_value = "Sea View Villa")]
        name: String,
    },
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    innkeep_server::init_tracing();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> commands::Result<()> {
    let mut config = Config::load()?;
    match cli.command {
        Command::Serve { port, no_migrate } => {
            if let Some(port) = port {
                config.port = port;
            }
            commands::serve(&config, !no_migrate).await
        }
        Command::Migrate => commands::migrate(&config).await,
        Command::Status => commands::status(&config).await,
        Command::Seed { name } => {
            let property_id = commands::seed(&config, &name).await?;
            println!("Seeded {name:?} as property {property_id}.");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses() {
        let cli = Cli::try_parse_from(["innkeep", "serve", "--port", "8088", "--no-migrate"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Serve {
                port: Some(8088),
                no_migrate: true
            }
        ));

        let cli = Cli::try_parse_from(["innkeep", "seed"]).unwrap();
        assert!(matches!(cli.command, Command::Seed { ref name } if name == "Sea View Villa"));

        assert!(Cli::try_parse_from(["innkeep"]).is_err());
    }
}
