//! Poll a Duet 3D printer for its temperature sensors and log every poll as
//! a row of a CSV file.

mod error;
mod printer;
mod reading;
mod session;
pub mod utils;

pub use error::{Error, Result};
pub use printer::{DuetPrinter, PrinterType, TemperatureSource};
pub use reading::{SensorReading, SensorSnapshot, format_reading};
pub use session::{Config, DEFAULT_HOST, POLL_INTERVAL, PollSession, shutdown_channel};
