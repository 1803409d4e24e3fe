use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Device at {host} either did not respond or is not a Duet V2 or V3 printer.")]
    UnreachableOrUnsupportedDevice { host: String },

    #[error("Failed to open '{}' for writing: {source}", .path.display())]
    FileOpen {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Printer query failed: {0}")]
    Query(#[from] reqwest::Error),

    #[error(
        "Sensor set changed mid-run: expected [{}], found [{}]",
        .expected.join(","),
        .found.join(",")
    )]
    SensorSetChanged {
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
