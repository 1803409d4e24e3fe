use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use tokio::sync::watch;

use crate::error::{Error, Result};
use crate::printer::TemperatureSource;
use crate::reading::SensorSnapshot;
use crate::utils::{local_timestamp, normalize_file_name};

pub const POLL_INTERVAL: Duration = Duration::from_secs(2);
pub const DEFAULT_HOST: &str = "localhost";

/// Settings for one logging run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub file_name: PathBuf,
    pub host: String,
}

impl Config {
    pub fn new(file_name: &str, host: impl Into<String>) -> Self {
        Self {
            file_name: PathBuf::from(normalize_file_name(file_name)),
            host: host.into(),
        }
    }

    /// Summary of the options in force, framed in `#`.
    pub fn banner(&self) -> String {
        let rule = "#".repeat(65);
        [
            rule.clone(),
            format!("# {:<62}#", "Options in force for this run:"),
            format!("#   printer = {:<50}#", self.host),
            format!("# file name = {:<50}#", self.file_name.display()),
            rule,
        ]
        .join("\n")
    }
}

pub fn shutdown_channel() -> (watch::Sender<bool>, watch::Receiver<bool>) {
    watch::channel(false)
}

async fn shutdown_requested(shutdown: &mut watch::Receiver<bool>) {
    // A dropped sender can never request shutdown.
    if shutdown.wait_for(|stop| *stop).await.is_err() {
        std::future::pending::<()>().await;
    }
}

/// Owns the printer client and the output for the lifetime of a run.
///
/// The output is a blocking [`Write`]: one short row every
/// [`POLL_INTERVAL`] on the single polling task, and a `Vec<u8>` in tests.
pub struct PollSession<P, W> {
    printer: P,
    output: W,
    columns: Vec<String>,
}

impl<P: TemperatureSource> PollSession<P, File> {
    /// Create (or truncate) the configured CSV file and write its header.
    pub async fn create(config: &Config, printer: P) -> Result<Self> {
        let file = File::create(&config.file_name).map_err(|source| Error::FileOpen {
            path: config.file_name.clone(),
            source,
        })?;
        Self::start(printer, file).await
    }
}

impl<P: TemperatureSource, W: Write> PollSession<P, W> {
    /// Query the printer once to learn its sensors and write the header row.
    pub async fn start(mut printer: P, mut output: W) -> Result<Self> {
        let snapshot = printer.temperatures().await?;
        output.write_all(snapshot.header_row().as_bytes())?;

        let columns: Vec<String> = snapshot.names().map(str::to_owned).collect();
        tracing::info!(sensors = columns.len(), "wrote csv header");

        Ok(Self {
            printer,
            output,
            columns,
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn printer(&self) -> &P {
        &self.printer
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Append one row for `snapshot`. The whole line goes out in one write.
    pub fn write_row(&mut self, snapshot: &SensorSnapshot, timestamp: &str) -> Result<()> {
        if !snapshot.names().eq(self.columns.iter().map(String::as_str)) {
            return Err(Error::SensorSetChanged {
                expected: self.columns.clone(),
                found: snapshot.names().map(str::to_owned).collect(),
            });
        }

        self.output.write_all(snapshot.data_row(timestamp).as_bytes())?;
        Ok(())
    }

    /// Poll forever, one row every [`POLL_INTERVAL`], until `shutdown` flips
    /// to `true`. Any query or write failure ends the run.
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        loop {
            let snapshot = tokio::select! {
                biased;
                _ = shutdown_requested(&mut shutdown) => break,
                snapshot = self.printer.temperatures() => snapshot?,
            };

            let timestamp = local_timestamp();
            self.write_row(&snapshot, &timestamp)?;
            tracing::debug!(timestamp, "wrote row");

            tokio::select! {
                biased;
                _ = shutdown_requested(&mut shutdown) => break,
                _ = tokio::time::sleep(POLL_INTERVAL) => {}
            }
        }

        tracing::info!("polling stopped");
        Ok(())
    }
}
