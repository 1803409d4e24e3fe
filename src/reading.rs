/// One temperature channel as reported by the printer.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorReading {
    pub name: String,
    pub last_reading: f64,
}

impl SensorReading {
    pub fn new(name: impl Into<String>, last_reading: f64) -> Self {
        Self {
            name: name.into(),
            last_reading,
        }
    }
}

/// All sensor readings returned by a single query, in printer order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SensorSnapshot {
    pub readings: Vec<SensorReading>,
}

impl SensorSnapshot {
    pub const TIMESTAMP_COLUMN: &'static str = "timestamp";
    pub const SEPARATOR: char = ',';

    pub fn new(readings: Vec<SensorReading>) -> Self {
        Self { readings }
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.readings.iter().map(|reading| reading.name.as_str())
    }

    /// `timestamp` followed by every sensor name, newline terminated.
    /// Names are written as-is; they are assumed to contain no commas.
    pub fn header_row(&self) -> String {
        let mut row = String::from(Self::TIMESTAMP_COLUMN);
        for name in self.names() {
            row.push(Self::SEPARATOR);
            row.push_str(name);
        }
        row.push('\n');
        row
    }

    pub fn data_row(&self, timestamp: &str) -> String {
        let mut row = String::from(timestamp);
        for reading in &self.readings {
            row.push(Self::SEPARATOR);
            row.push_str(&format_reading(reading.last_reading));
        }
        row.push('\n');
        row
    }
}

impl FromIterator<SensorReading> for SensorSnapshot {
    fn from_iter<I: IntoIterator<Item = SensorReading>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Fixed point, two decimals, minimum width 4. A missing reading is `NaN`,
/// unpadded.
pub fn format_reading(value: f64) -> String {
    if value.is_nan() {
        return String::from("NaN");
    }
    format!("{:4.2}", value)
}
