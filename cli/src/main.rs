//! tins - temporary OpenStack instances with throwaway SSH keys

use clap::Parser;
use tracing_subscriber::EnvFilter;

use tins_cli::cli::Cli;
use tins_cli::output::json;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let as_json = cli.json;
    if let Err(e) = cli.run().await {
        if as_json {
            let message = format!("{e:#}");
            match json::format_error(&message, json::error_code(&e)) {
                Ok(out) => println!("{out}"),
                Err(_) => eprintln!("Error: {message}"),
            }
        } else {
            eprintln!("Error: {e:#}");
        }
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("tins_cli=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
