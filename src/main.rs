use clap::{Parser, Subcommand};
use std::process::ExitCode;
use std::time::Duration;

use sat_globe::client::{self, WatchOptions};
use sat_globe::{web, Config};

#[derive(Parser)]
#[command(name = "sat-globe")]
#[command(about = "Satellite position proxy and globe viewer")]
struct Cli {
    /// YAML config file; PORT and N2YO_API_KEY from the environment override it
    #[arg(short, long, global = true)]
    config: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the positions service
    Serve,
    /// Print the tracked satellites
    Satellites,
    /// Poll a running service and print globe marker positions
    Watch {
        #[arg(long, default_value = "http://localhost:3000")]
        url: String,
        #[arg(long, default_value = "2s", value_parser = humantime::parse_duration)]
        interval: Duration,
        #[arg(long, default_value_t = 30)]
        fps: u32,
        #[arg(long, default_value = "10s", value_parser = humantime::parse_duration)]
        timeout: Duration,
        /// Ask the service for raw upstream payloads
        #[arg(long)]
        debug: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Commands::Serve => serve(config).await,
        Commands::Satellites => satellites(&config),
        Commands::Watch {
            url,
            interval,
            fps,
            timeout,
            debug,
        } => {
            watch(WatchOptions {
                base_url: url,
                poll_interval: interval,
                frame_interval: Duration::from_secs_f64(1.0 / f64::from(fps.max(1))),
                request_timeout: timeout,
                debug,
            })
            .await
        }
    }
}

async fn serve(config: Config) -> ExitCode {
    match web::run_server(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("Server error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn satellites(config: &Config) -> ExitCode {
    let roster = config.roster();
    println!("{} satellites", roster.len());
    for sat in roster.satellites() {
        println!("  {:>6}  {}", sat.id, sat.display_name);
    }
    ExitCode::SUCCESS
}

async fn watch(options: WatchOptions) -> ExitCode {
    match client::watch(options).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Watch failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
