use std::fmt::Display;

use chrono::{DateTime, Local, TimeZone};

pub const CSV_EXTENSION: &str = ".csv";
pub const TIMESTAMP_FORMAT: &str = "%m-%d-%y %H:%M:%S";

pub fn normalize_file_name(file_name: &str) -> String {
    if file_name.ends_with(CSV_EXTENSION) {
        file_name.to_owned()
    } else {
        format!("{}{}", file_name, CSV_EXTENSION)
    }
}

pub fn format_timestamp<Tz>(time: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    time.format(TIMESTAMP_FORMAT).to_string()
}

pub fn local_timestamp() -> String {
    format_timestamp(&Local::now())
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_normalize_file_name() {
        assert_eq!(normalize_file_name("log"), "log.csv");
        assert_eq!(normalize_file_name("log.csv"), "log.csv");
        assert_eq!(normalize_file_name("runs/bed.txt"), "runs/bed.txt.csv");
        assert_eq!(normalize_file_name("LOG.CSV"), "LOG.CSV.csv");
    }

    #[test]
    fn test_format_timestamp() {
        let time = Utc.with_ymd_and_hms(2020, 7, 4, 13, 5, 9).unwrap();
        assert_eq!(format_timestamp(&time), "07-04-20 13:05:09");
    }

    #[test]
    fn test_local_timestamp_shape() {
        let stamp = local_timestamp();
        assert_eq!(stamp.len(), "MM-DD-YY HH:MM:SS".len());
        assert!(!stamp.contains(','));
    }
}
