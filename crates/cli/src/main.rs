use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "line-relay")]
#[command(about = "Relay between an HTTP push endpoint and the LINE Messaging API", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version
    Version,

    /// Run the relay (/push_message and /callback). This is also what runs when no command is given.
    Serve {
        /// Config file path (default: RELAY_CONFIG_PATH or ~/.line-relay/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,

        /// HTTP port (default from PORT, then config, then 8080)
        #[arg(long, short)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Version) => {
            println!("line-relay {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Serve { config, port }) => {
            if let Err(e) = run_serve(config, port).await {
                log::error!("relay failed: {:#}", e);
                std::process::exit(1);
            }
        }
        None => {
            if let Err(e) = run_serve(None, None).await {
                log::error!("relay failed: {:#}", e);
                std::process::exit(1);
            }
        }
    }
}

async fn run_serve(
    config_path: Option<std::path::PathBuf>,
    port: Option<u16>,
) -> anyhow::Result<()> {
    let (mut config, path) = relay::config::load_config(config_path)?;
    if let Some(p) = port {
        config.server.port = p;
    }
    log::info!(
        "starting relay on {}:{} (config {})",
        config.server.bind,
        config.server.port,
        path.display()
    );
    relay::gateway::run_gateway(config).await
}
