use clap::Parser;
use dotenv::dotenv;

use siabsensi::config::AppConfig;
use siabsensi::tools::{self, Cli};

#[tokio::main]
async fn main() {
    dotenv().ok();
    let cli = Cli::parse();

    if let Err(e) = AppConfig::init() {
        eprintln!("Failed to initialize configuration: {e}");
        std::process::exit(1);
    }

    let filter = if cli.verbose {
        tracing_subscriber::EnvFilter::new("debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = tools::run(cli).await {
        #[cfg(debug_assertions)]
        eprintln!("{}", e.format_colored());
        #[cfg(not(debug_assertions))]
        eprintln!("{}", e.format_simple());
        std::process::exit(1);
    }
}
