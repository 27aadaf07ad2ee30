use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::Error;

// Date and time formats the UDK stats collector prints in the header line.
const HEADER_DATE_FORMAT: &str = "%Y/%m/%d";
const HEADER_TIME_FORMAT: &str = "%H:%M:%S";

/// Session header from the first line of a stats log.
///
/// `start_datetime` is the epoch every event timestamp is computed against:
/// the server's naive wall-clock time, no timezone attached or converted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Header {
    /// Server uptime in seconds when the header was written.
    pub world_time_start_seconds: f64,
    pub start_datetime: NaiveDateTime,
    /// External system timestamp (`Utils.GetSystemTimeStamp()`); metadata only.
    pub start_timestamp: f64,
    /// Free-form session/map tag, the remainder of the line taken as-is.
    pub tag: String,
}

impl Header {
    /// Parses the header line. Layout, by position: world-time-start, date,
    /// an ignored literal, time-of-day, start-timestamp, tag.
    pub fn parse(line: &str) -> Result<Header, Error> {
        let parts: Vec<&str> = line.trim().splitn(6, ' ').collect();
        if parts.len() < 6 {
            return Err(malformed(format!(
                "expected 6 fields, found {}",
                parts.len()
            )));
        }

        let world_time_start_seconds: f64 = parts[0]
            .parse()
            .map_err(|_| malformed(format!("bad world time {:?}", parts[0])))?;

        let date = NaiveDate::parse_from_str(parts[1], HEADER_DATE_FORMAT)
            .map_err(|_| malformed(format!("bad date {:?}", parts[1])))?;
        let time = NaiveTime::parse_from_str(parts[3], HEADER_TIME_FORMAT)
            .map_err(|_| malformed(format!("bad time {:?}", parts[3])))?;

        let start_timestamp: f64 = parts[4]
            .parse()
            .map_err(|_| malformed(format!("bad system timestamp {:?}", parts[4])))?;

        Ok(Header {
            world_time_start_seconds,
            start_datetime: date.and_time(time),
            start_timestamp,
            tag: parts[5].to_string(),
        })
    }

    /// The wall-clock instant relative event timestamps are added to.
    pub fn epoch(&self) -> NaiveDateTime {
        self.start_datetime
    }
}

fn malformed(reason: String) -> Error {
    Error::MalformedHeader { reason }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_full_header() {
        let header = Header::parse("120.5 2023/04/29 X 14:30:00 999999.0 Compound").unwrap();
        assert_eq!(header.world_time_start_seconds, 120.5);
        assert_eq!(
            header.epoch(),
            NaiveDate::from_ymd_opt(2023, 4, 29)
                .unwrap()
                .and_hms_opt(14, 30, 0)
                .unwrap()
        );
        assert_eq!(header.start_timestamp, 999999.0);
        assert_eq!(header.tag, "Compound");
    }

    #[test]
    fn tag_keeps_the_rest_of_the_line() {
        let header = Header::parse("0.0 2023/04/29 X 14:30:00 1.0 Hue City Night").unwrap();
        assert_eq!(header.tag, "Hue City Night");
    }

    #[test]
    fn too_few_fields_is_fatal() {
        assert!(matches!(
            Header::parse("120.5 2023/04/29 X 14:30:00"),
            Err(Error::MalformedHeader { .. })
        ));
    }

    #[test]
    fn bad_date_is_fatal() {
        assert!(matches!(
            Header::parse("120.5 29-04-2023 X 14:30:00 999999.0 Compound"),
            Err(Error::MalformedHeader { .. })
        ));
    }
}
