use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

// e.g. 2024-03-01T23:59:59.000+00:00, the format the circulation backend writes
pub const DATE_FMT: &str = "%Y-%m-%dT%H:%M:%S%.3f%:z";

pub fn format_date(time: &DateTime<Utc>) -> String {
    time.format(DATE_FMT).to_string()
}

// Accepts full RFC 3339 stamps as well as the shorter forms a date/time picker produces.
// Anything else (including an empty placeholder) is not a date.
pub fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(date) = DateTime::parse_from_rfc3339(value) {
        return Some(date.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S") {
        return Some(Utc.from_utc_datetime(&date));
    }
    if let Ok(date) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M") {
        return Some(Utc.from_utc_datetime(&date));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
        .and_then(|d| d.and_hms_opt(23, 59, 59))
        .map(|d| Utc.from_utc_datetime(&d))
}

pub mod serializer {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use serde::de::Error;
    use crate::utils::date::{format_date, parse_date};

    pub fn serialize<S: Serializer>(time: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        format_date(time).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let str_time: String = Deserialize::deserialize(deserializer)?;
        parse_date(&str_time).ok_or_else(|| D::Error::custom(format!("invalid date {}", str_time)))
    }
}

pub mod opt_serializer {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};
    use serde::de::Error;
    use crate::utils::date::{format_date, parse_date};

    pub fn serialize<S: Serializer>(time: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error> {
        match time {
            Some(time) => serializer.serialize_some(&format_date(time)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error> {
        let str_time: Option<String> = Deserialize::deserialize(deserializer)?;
        match str_time {
            Some(s) if !s.trim().is_empty() => parse_date(&s)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("invalid date {}", s))),
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, TimeZone, Timelike, Utc};
    use crate::utils::date::{format_date, parse_date};

    #[tokio::test]
    async fn test_should_round_trip_backend_format() {
        let time = Utc.with_ymd_and_hms(2024, 3, 1, 10, 30, 0).unwrap();
        let str = format_date(&time);
        assert_eq!("2024-03-01T10:30:00.000+00:00", str.as_str());
        assert_eq!(Some(time), parse_date(&str));
    }

    #[tokio::test]
    async fn test_should_parse_picker_values() {
        let date = parse_date("2024-03-01T17:45").expect("should parse");
        assert_eq!(17, date.hour());
        let date = parse_date("2024-03-01").expect("should parse");
        assert_eq!(1, date.day());
        assert_eq!(23, date.hour());
        assert_eq!(None, parse_date(""));
        assert_eq!(None, parse_date("mm/dd/yyyy"));
    }
}
