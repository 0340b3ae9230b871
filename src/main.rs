use anyhow::Result;
use clap::{Parser, Subcommand};
use oblique_strategies::app::App;
use oblique_strategies::client::StrategyClient;
use oblique_strategies::models::{Config, GenerationRequest, Verbosity};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "oblique-strategies")]
#[command(about = "Serve or request AI-generated oblique strategies")]
struct CliArgs {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP service (default).
    Serve {
        /// Address to bind, overriding BIND_ADDR.
        #[arg(long)]
        addr: Option<std::net::SocketAddr>,
    },
    /// Ask a running service for strategies and print them.
    Request {
        /// Base URL of the service.
        #[arg(long, default_value = "http://127.0.0.1:3000")]
        url: String,
        /// Number of strategies to generate.
        #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
        count: i64,
        /// concise, medium or verbose.
        #[arg(long, default_value = "concise", value_parser = parse_length_arg)]
        length: Verbosity,
        /// Mood tag; repeat for several.
        #[arg(long = "mood")]
        moods: Vec<String>,
    },
}

fn parse_length_arg(input: &str) -> std::result::Result<Verbosity, String> {
    input.parse()
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "oblique_strategies=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = CliArgs::parse();

    match args.command.unwrap_or(Command::Serve { addr: None }) {
        Command::Serve { addr } => serve(addr).await,
        Command::Request {
            url,
            count,
            length,
            moods,
        } => request(url, GenerationRequest::new(count, length, moods)).await,
    }
}

async fn serve(addr: Option<std::net::SocketAddr>) -> Result<()> {
    info!("Starting oblique-strategies v{}", env!("CARGO_PKG_VERSION"));

    let mut config = Config::from_env()?;
    if let Some(addr) = addr {
        config.bind_addr = addr;
    }

    let app = App::from_config(&config)?;
    if let Err(e) = app.serve().await {
        error!("Server stopped: {}", e);
        std::process::exit(1);
    }
    Ok(())
}

async fn request(url: String, options: GenerationRequest) -> Result<()> {
    let client = StrategyClient::new(url);

    match client.request_strategies(&options).await {
        Ok(strategies) => {
            for strategy in strategies {
                match strategy.source_label() {
                    Some(label) => println!(
                        "{}  {}  ({})",
                        strategy.timestamp.format("%H:%M:%S"),
                        strategy.text,
                        label
                    ),
                    None => println!("{}  {}", strategy.timestamp.format("%H:%M:%S"), strategy.text),
                }
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            if let Some(hint) = e.configuration_hint() {
                eprintln!("{}", hint);
            }
            std::process::exit(1);
        }
    }
}
