use clap::Parser;
use pricefeed::cli::{describe_config, Cli, Commands};
use pricefeed::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(&cli.config).unwrap_or_else(|e| {
        eprintln!("Warning: Could not load config from {}: {}", cli.config, e);
        eprintln!("Using default configuration");
        Config::default()
    });

    // Initialize telemetry
    pricefeed::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Run(args) => {
            tracing::info!("Starting price feed");
            args.execute(&config.feed).await?;
        }
        Commands::Check(args) => {
            args.execute(&config.feed).await?;
        }
        Commands::Config => {
            print!("{}", describe_config(&config));
        }
    }

    Ok(())
}
