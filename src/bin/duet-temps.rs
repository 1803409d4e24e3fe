use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use clap_derive::Parser;
use tracing_subscriber::EnvFilter;

use duet_temps::{
    Config, DEFAULT_HOST, DuetPrinter, Error, PollSession, TemperatureSource, shutdown_channel,
};

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Name of the CSV file to write; `.csv` is appended if missing
    file_name: String,

    /// Name or IP address of the Duet printer. Use `localhost` on the SBC of a Duet 3.
    #[clap(short, long, default_value = DEFAULT_HOST)]
    duet: String,

    /// Log more detail to stderr (-v info, -vv debug). RUST_LOG overrides.
    #[clap(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Accept the single-dash `-duet HOST` and `-duet=HOST` spellings as
/// `--duet`, so clap does not read them as `-d uet...`.
fn rewrite_legacy_flag(arg: String) -> String {
    match arg.strip_prefix("-duet") {
        Some("") => String::from("--duet"),
        Some(value) if value.starts_with('=') => format!("--duet{}", value),
        _ => arg,
    }
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Args {
    Args::parse_from(args.into_iter().map(rewrite_legacy_flag))
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = parse_args(std::env::args());
    init_logging(args.verbose);

    let config = Config::new(&args.file_name, args.duet);

    println!("Attempting to connect to printer at {}", config.host);
    let printer = match DuetPrinter::connect(&config.host).await {
        Ok(printer) => printer,
        Err(e @ Error::UnreachableOrUnsupportedDevice { .. }) => {
            eprintln!("{}", e);
            return Ok(ExitCode::from(2));
        }
        Err(e) => return Err(e.into()),
    };
    println!(
        "Connected to a Duet V{} printer at {}",
        printer.printer_type(),
        printer.base_url()
    );

    let mut session = PollSession::create(&config, printer).await?;

    println!();
    println!("{}", config.banner());
    println!();
    println!("Now writing temperatures, press Ctrl-C to exit.");

    let (shutdown_tx, shutdown_rx) = shutdown_channel();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("received Ctrl-C");
                let _ = shutdown_tx.send(true);
            }
            Err(e) => tracing::error!(error = %e, "failed to set up Ctrl-C handler"),
        }
    });

    session.run(shutdown_rx).await?;
    Ok(ExitCode::SUCCESS)
}
