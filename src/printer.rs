use std::future::Future;
use std::time::Duration;

use parse_display::Display;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::reading::{SensorReading, SensorSnapshot};

/// Firmware family of a Duet board.
#[derive(Copy, Clone, Debug, Display, PartialEq, Eq)]
pub enum PrinterType {
    /// RepRapFirmware 2, or a standalone board answering the `rr_` API.
    #[display("2")]
    V2,
    /// RepRapFirmware 3 behind Duet Software Framework on an SBC.
    #[display("3")]
    V3,
}

/// Anything that can be asked for the current temperatures of a printer.
pub trait TemperatureSource {
    fn printer_type(&self) -> PrinterType;

    fn base_url(&self) -> &str;

    /// Query every temperature sensor, in the order the printer reports them.
    fn temperatures(&mut self) -> impl Future<Output = Result<SensorSnapshot>>;
}

/// HTTP client for the Duet web interface.
pub struct DuetPrinter {
    host: String,
    base_url: String,
    printer_type: PrinterType,
    client: reqwest::Client,
}

impl DuetPrinter {
    const CONNECT_TIMEOUT: Duration = Duration::from_secs(2);
    const PROBE_TIMEOUT: Duration = Duration::from_secs(60);

    /// Connect to the Duet at `host` and detect its firmware family.
    pub async fn connect(host: &str) -> Result<Self> {
        let base_url = format!("http://{}", host);
        let client = reqwest::Client::builder()
            .connect_timeout(Self::CONNECT_TIMEOUT)
            .build()?;

        let printer_type = Self::detect(&client, &base_url)
            .await
            .ok_or_else(|| Error::UnreachableOrUnsupportedDevice {
                host: host.to_owned(),
            })?;
        tracing::info!(base = base_url, %printer_type, "detected duet printer");

        Ok(Self {
            host: host.to_owned(),
            base_url,
            printer_type,
            client,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    async fn detect(client: &reqwest::Client, base_url: &str) -> Option<PrinterType> {
        let probes = [
            (PrinterType::V2, "rr_status?type=1", "coords"),
            (PrinterType::V3, "machine/status", "result"),
        ];

        for (printer_type, path, key) in probes {
            let url = format!("{}/{}", base_url, path);
            match Self::probe(client, &url, key).await {
                Ok(true) => return Some(printer_type),
                Ok(false) => tracing::debug!(url, key, "response is missing key"),
                Err(e) => tracing::debug!(url, error = %e, "probe failed"),
            }
        }

        None
    }

    async fn probe(client: &reqwest::Client, url: &str, key: &str) -> Result<bool> {
        let body: serde_json::Value = client
            .get(url)
            .timeout(Self::PROBE_TIMEOUT)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(body.get(key).is_some())
    }
}

impl TemperatureSource for DuetPrinter {
    fn printer_type(&self) -> PrinterType {
        self.printer_type
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn temperatures(&mut self) -> Result<SensorSnapshot> {
        tracing::debug!(base = self.base_url, "requesting temperatures");

        let snapshot = match self.printer_type {
            PrinterType::V2 => {
                let status: RrStatus = self
                    .client
                    .get(format!("{}/rr_status?type=2", self.base_url))
                    .send()
                    .await?
                    .error_for_status()?
                    .json()
                    .await?;
                status.into()
            }
            PrinterType::V3 => {
                let status: MachineStatus = self
                    .client
                    .get(format!("{}/machine/status", self.base_url))
                    .send()
                    .await?
                    .error_for_status()?
                    .json()
                    .await?;
                status.into()
            }
        };

        Ok(snapshot)
    }
}

/// `rr_status?type=2` response of the RepRapFirmware 2 web API.
#[derive(Clone, Debug, Deserialize)]
struct RrStatus {
    temps: RrTemps,
}

#[derive(Clone, Debug, Deserialize)]
struct RrTemps {
    current: Vec<f64>,
    #[serde(default)]
    names: Vec<String>,
}

impl From<RrStatus> for SensorSnapshot {
    fn from(status: RrStatus) -> Self {
        let RrTemps { current, names } = status.temps;
        current
            .into_iter()
            .enumerate()
            .map(|(index, value)| {
                let name = match names.get(index) {
                    Some(name) if !name.is_empty() => name.clone(),
                    _ => format!("heater{}", index),
                };
                SensorReading::new(name, value)
            })
            .collect()
    }
}

/// `/machine/status` response of Duet Software Framework.
#[derive(Clone, Debug, Deserialize)]
struct MachineStatus {
    result: ObjectModel,
}

#[derive(Clone, Debug, Deserialize)]
struct ObjectModel {
    sensors: Sensors,
}

#[derive(Clone, Debug, Deserialize)]
struct Sensors {
    #[serde(default)]
    analog: Vec<Option<AnalogSensor>>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalogSensor {
    #[serde(default)]
    name: String,
    last_reading: Option<f64>,
}

impl From<MachineStatus> for SensorSnapshot {
    fn from(status: MachineStatus) -> Self {
        status
            .result
            .sensors
            .analog
            .into_iter()
            .enumerate()
            // Empty sensor slots come back as null.
            .filter_map(|(index, sensor)| sensor.map(|sensor| (index, sensor)))
            .map(|(index, sensor)| {
                let name = if sensor.name.is_empty() {
                    format!("sensor{}", index)
                } else {
                    sensor.name
                };
                SensorReading::new(name, sensor.last_reading.unwrap_or(f64::NAN))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_printer_type_display() {
        assert_eq!(PrinterType::V2.to_string(), "2");
        assert_eq!(PrinterType::V3.to_string(), "3");
    }

    #[test]
    fn test_machine_status_snapshot() -> anyhow::Result<()> {
        let body = r#"{
            "result": {
                "sensors": {
                    "analog": [
                        {"name": "bed", "lastReading": 60.0, "type": "thermistor"},
                        null,
                        {"name": "e0", "lastReading": 210.25, "type": "pt1000"},
                        {"name": "", "lastReading": 24.333, "type": "mcutemp"},
                        {"name": "chamber", "lastReading": null, "type": "thermistor"}
                    ]
                },
                "state": {"status": "idle"}
            }
        }"#;

        let snapshot: SensorSnapshot = serde_json::from_str::<MachineStatus>(body)?.into();

        assert_eq!(
            snapshot.names().collect::<Vec<_>>(),
            vec!["bed", "e0", "sensor3", "chamber"]
        );
        assert_eq!(snapshot.readings[0].last_reading, 60.0);
        assert_eq!(snapshot.readings[1].last_reading, 210.25);
        assert_eq!(snapshot.readings[2].last_reading, 24.333);
        assert!(snapshot.readings[3].last_reading.is_nan());

        Ok(())
    }

    #[test]
    fn test_machine_status_without_sensors() {
        let body = r#"{"result": {"state": {"status": "idle"}}}"#;
        assert!(serde_json::from_str::<MachineStatus>(body).is_err());
    }

    #[test]
    fn test_rr_status_snapshot() -> anyhow::Result<()> {
        let body = r#"{
            "status": "I",
            "temps": {
                "current": [60.0, 210.25, 24.333],
                "state": [2, 2, 0],
                "names": ["bed", "", "chamber"]
            }
        }"#;

        let snapshot: SensorSnapshot = serde_json::from_str::<RrStatus>(body)?.into();

        assert_eq!(
            snapshot.names().collect::<Vec<_>>(),
            vec!["bed", "heater1", "chamber"]
        );
        assert_eq!(snapshot.readings[1].last_reading, 210.25);

        Ok(())
    }

    #[test]
    fn test_rr_status_without_names() -> anyhow::Result<()> {
        let body = r#"{"temps": {"current": [20.5, 21.0]}}"#;
        let snapshot: SensorSnapshot = serde_json::from_str::<RrStatus>(body)?.into();
        assert_eq!(
            snapshot.names().collect::<Vec<_>>(),
            vec!["heater0", "heater1"]
        );
        Ok(())
    }
}
