//! Result, bind and literal processors for each [`SqlType`].
//!
//! The engine hands dates, timestamps, decimals and arrays back as text.
//! Result processors parse that text; bind processors for the same types
//! refuse to write, since there is no write path for them.
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

use super::sql_type::SqlType;
use super::value::Value;
use crate::error::{DialectError, Result};

pub type ResultProcessor = Box<dyn Fn(Value) -> Result<Value> + Send + Sync>;
pub type BindProcessor = Box<dyn Fn(Value) -> Result<Value> + Send + Sync>;
pub type LiteralProcessor = Box<dyn Fn(&Value) -> Result<String> + Send + Sync>;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S%.f",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y%m%d"];

impl SqlType {
    /// Converter from engine result values, or `None` when values pass through.
    pub fn result_processor(&self) -> Option<ResultProcessor> {
        match self {
            SqlType::Date => Some(Box::new(process_date_result)),
            SqlType::Timestamp => Some(Box::new(process_timestamp_result)),
            SqlType::Decimal { .. } => Some(Box::new(process_decimal_result)),
            SqlType::Array(array) => Some(array.result_processor()),
            _ => None,
        }
    }

    /// Converter for bound parameters, or `None` when values pass through.
    pub fn bind_processor(&self) -> Option<BindProcessor> {
        match self {
            SqlType::Date | SqlType::Timestamp | SqlType::Decimal { .. } => {
                let name = self.name();
                Some(Box::new(move |_: Value| Err(write_unsupported(name))))
            }
            SqlType::Array(array) => Some(array.bind_processor()),
            _ => None,
        }
    }

    /// Renderer for inline literals, or `None` when the type has no literal form.
    pub fn literal_processor(&self) -> Option<LiteralProcessor> {
        match self {
            SqlType::Null | SqlType::Time | SqlType::DateTime => None,
            SqlType::Boolean => Some(Box::new(render_bool_literal)),
            t if t.is_integer() => Some(Box::new(render_integer_literal)),
            SqlType::Float => Some(Box::new(render_float_literal)),
            t if t.is_string_like() => Some(Box::new(render_string_literal)),
            SqlType::Date | SqlType::Timestamp | SqlType::Decimal { .. } => {
                let name = self.name();
                Some(Box::new(move |_: &Value| Err(write_unsupported(name))))
            }
            SqlType::Array(array) => array.literal_processor(),
            _ => None,
        }
    }

    pub fn process_result(&self, value: Value) -> Result<Value> {
        match self.result_processor() {
            Some(process) => process(value),
            None => Ok(value),
        }
    }

    pub fn process_bind(&self, value: Value) -> Result<Value> {
        match self.bind_processor() {
            Some(process) => process(value),
            None => Ok(value),
        }
    }

    pub fn render_literal(&self, value: &Value) -> Result<String> {
        match self.literal_processor() {
            Some(render) => render(value),
            None => Err(DialectError::UnsupportedOperation(format!(
                "no literal form for {} values",
                self.name()
            ))),
        }
    }
}

fn write_unsupported(type_name: &str) -> DialectError {
    DialectError::UnsupportedOperation(format!("Writing to Hive not supported ({})", type_name))
}

pub(crate) fn parse_datetime_text(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    for format in DATETIME_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(text, format) {
            return Some(ts);
        }
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Some(ts.naive_utc());
    }
    parse_date_text(text).map(|d| d.and_time(NaiveTime::MIN))
}

pub(crate) fn parse_date_text(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
}

fn process_date_result(value: Value) -> Result<Value> {
    match value {
        Value::Null => Ok(Value::Null),
        Value::Date(d) => Ok(Value::Date(d)),
        Value::Timestamp(ts) => Ok(Value::Date(ts.date())),
        Value::String(s) => parse_date_text(&s)
            .or_else(|| parse_datetime_text(&s).map(|ts| ts.date()))
            .map(Value::Date)
            .ok_or_else(|| DialectError::format("date", s)),
        other => Err(DialectError::format("date", other.display())),
    }
}

fn process_timestamp_result(value: Value) -> Result<Value> {
    match value {
        Value::Null => Ok(Value::Null),
        Value::Timestamp(ts) => Ok(Value::Timestamp(ts)),
        Value::Date(d) => Ok(Value::Timestamp(d.and_time(NaiveTime::MIN))),
        Value::String(s) => parse_datetime_text(&s)
            .map(Value::Timestamp)
            .ok_or_else(|| DialectError::format("timestamp", s)),
        other => Err(DialectError::format("timestamp", other.display())),
    }
}

fn process_decimal_result(value: Value) -> Result<Value> {
    match value {
        Value::Null => Ok(Value::Null),
        Value::Decimal(d) => Ok(Value::Decimal(d)),
        Value::Int(i) => Ok(Value::Decimal(BigDecimal::from(i))),
        // shortest round-trip text, so no binary noise digits
        Value::Float(f) => BigDecimal::from_str(&f.to_string())
            .map(Value::Decimal)
            .map_err(|_| DialectError::format("decimal", f.to_string())),
        Value::String(s) => BigDecimal::from_str(s.trim())
            .map(Value::Decimal)
            .map_err(|_| DialectError::format("decimal", s.clone())),
        other => Err(DialectError::format("decimal", other.display())),
    }
}

fn render_bool_literal(value: &Value) -> Result<String> {
    match value {
        Value::Null => Ok("NULL".to_string()),
        Value::Bool(b) => Ok(if *b { "true" } else { "false" }.to_string()),
        other => Err(DialectError::format("boolean", other.display())),
    }
}

fn render_integer_literal(value: &Value) -> Result<String> {
    match value {
        Value::Null => Ok("NULL".to_string()),
        Value::Int(i) => Ok(i.to_string()),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map(|i| i.to_string())
            .map_err(|_| DialectError::format("integer", s.clone())),
        other => Err(DialectError::format("integer", other.display())),
    }
}

fn render_float_literal(value: &Value) -> Result<String> {
    match value {
        Value::Null => Ok("NULL".to_string()),
        Value::Float(f) if f.is_finite() => Ok(format!("{:?}", f)),
        Value::Int(i) => Ok(i.to_string()),
        other => Err(DialectError::format("float", other.display())),
    }
}

fn render_string_literal(value: &Value) -> Result<String> {
    match value {
        Value::Null => Ok("NULL".to_string()),
        Value::String(s) => Ok(quote_string(s)),
        other => Ok(quote_string(&other.display())),
    }
}

/// Single-quote `text`, backslash-escaping `\` and `'`.
pub fn quote_string(text: &str) -> String {
    let escaped = text.replace('\\', "\\\\").replace('\'', "\\'");
    format!("'{}'", escaped)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decimal(text: &str) -> BigDecimal {
        BigDecimal::from_str(text).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_date_from_text() {
        let v = SqlType::Date.process_result(Value::from("2023-04-05")).unwrap();
        assert_eq!(v, Value::Date(date(2023, 4, 5)));
    }

    #[test]
    fn test_date_from_timestamp_text_and_value() {
        let v = SqlType::Date
            .process_result(Value::from("2023-04-05 12:30:00"))
            .unwrap();
        assert_eq!(v, Value::Date(date(2023, 4, 5)));

        let ts = date(2023, 4, 5).and_hms_opt(1, 2, 3).unwrap();
        let v = SqlType::Date.process_result(Value::Timestamp(ts)).unwrap();
        assert_eq!(v, Value::Date(date(2023, 4, 5)));
    }

    #[test]
    fn test_null_stays_null() {
        for ty in [
            SqlType::Date,
            SqlType::Timestamp,
            SqlType::Decimal {
                precision: None,
                scale: None,
            },
        ] {
            assert_eq!(ty.process_result(Value::Null).unwrap(), Value::Null);
        }
    }

    #[test]
    fn test_bad_date_is_format_error() {
        let err = SqlType::Date
            .process_result(Value::from("not a date"))
            .unwrap_err();
        assert!(matches!(err, DialectError::Format { target: "date", .. }));
    }

    #[test]
    fn test_timestamp_with_fraction() {
        let v = SqlType::Timestamp
            .process_result(Value::from("2021-01-02 03:04:05.123"))
            .unwrap();
        let expected = date(2021, 1, 2).and_hms_milli_opt(3, 4, 5, 123).unwrap();
        assert_eq!(v, Value::Timestamp(expected));
    }

    #[test]
    fn test_timestamp_round_trips_through_display() {
        let ts = date(2021, 1, 2).and_hms_micro_opt(3, 4, 5, 678).unwrap();
        let text = Value::Timestamp(ts).display();
        assert_eq!(
            SqlType::Timestamp.process_result(Value::from(text)).unwrap(),
            Value::Timestamp(ts)
        );
    }

    #[test]
    fn test_date_round_trips_through_display() {
        let d = date(1999, 12, 31);
        let text = Value::Date(d).display();
        assert_eq!(
            SqlType::Date.process_result(Value::from(text)).unwrap(),
            Value::Date(d)
        );
    }

    #[test]
    fn test_decimal_from_text() {
        let ty = SqlType::Decimal {
            precision: Some(10),
            scale: Some(1),
        };
        let v = ty.process_result(Value::from("12.5")).unwrap();
        assert_eq!(v, Value::Decimal(decimal("12.5")));

        let passthrough = ty.process_result(Value::Decimal(decimal("7"))).unwrap();
        assert_eq!(passthrough, Value::Decimal(decimal("7")));
    }

    #[test]
    fn test_decimal_keeps_full_hive_precision() {
        let ty = SqlType::Decimal {
            precision: Some(38),
            scale: Some(0),
        };
        let widest = "12345678901234567890123456789012345678";
        assert_eq!(
            ty.process_result(Value::from(widest)).unwrap().display(),
            widest
        );

        let ty = SqlType::Decimal {
            precision: Some(38),
            scale: Some(32),
        };
        let fine = "0.12345678901234567890123456789012";
        let v = ty.process_result(Value::from(fine)).unwrap();
        assert_eq!(v, Value::Decimal(decimal(fine)));
        assert_eq!(v.display(), fine);
    }

    #[test]
    fn test_decimal_round_trips_through_display() {
        let ty = SqlType::Decimal {
            precision: None,
            scale: None,
        };
        for text in ["0", "-1.50", "123.4500", "99999999999999999999999999999999.999999"] {
            let original = Value::Decimal(decimal(text));
            let rendered = original.display();
            assert_eq!(ty.process_result(Value::from(rendered)).unwrap(), original);
        }
    }

    #[test]
    fn test_decimal_from_numbers_and_exponent() {
        let ty = SqlType::Decimal {
            precision: None,
            scale: None,
        };
        assert_eq!(
            ty.process_result(Value::Int(42)).unwrap(),
            Value::Decimal(decimal("42"))
        );
        assert_eq!(
            ty.process_result(Value::Float(0.1)).unwrap(),
            Value::Decimal(decimal("0.1"))
        );
        assert_eq!(
            ty.process_result(Value::from("1.5E3")).unwrap(),
            Value::Decimal(decimal("1500"))
        );
        assert!(ty.process_result(Value::Float(f64::NAN)).is_err());
    }

    #[test]
    fn test_bad_decimal_is_format_error() {
        let ty = SqlType::Decimal {
            precision: None,
            scale: None,
        };
        assert!(matches!(
            ty.process_result(Value::from("12,5")),
            Err(DialectError::Format { .. })
        ));
    }

    #[test]
    fn test_write_unsupported_for_read_only_types() {
        for ty in [
            SqlType::Date,
            SqlType::Timestamp,
            SqlType::Decimal {
                precision: None,
                scale: None,
            },
        ] {
            assert!(matches!(
                ty.process_bind(Value::from("2020-01-01")),
                Err(DialectError::UnsupportedOperation(_))
            ));
            assert!(matches!(
                ty.render_literal(&Value::from("2020-01-01")),
                Err(DialectError::UnsupportedOperation(_))
            ));
        }
    }

    #[test]
    fn test_plain_types_pass_through() {
        assert!(SqlType::Integer.result_processor().is_none());
        assert_eq!(
            SqlType::String.process_result(Value::from("x")).unwrap(),
            Value::from("x")
        );
    }

    #[test]
    fn test_literals() {
        assert_eq!(SqlType::Integer.render_literal(&Value::Int(4)).unwrap(), "4");
        assert_eq!(
            SqlType::Boolean.render_literal(&Value::Bool(true)).unwrap(),
            "true"
        );
        assert_eq!(SqlType::Float.render_literal(&Value::Float(1.0)).unwrap(), "1.0");
        assert_eq!(
            SqlType::String.render_literal(&Value::from("it's")).unwrap(),
            "'it\\'s'"
        );
        assert_eq!(SqlType::String.render_literal(&Value::Null).unwrap(), "NULL");
        assert!(SqlType::Null.literal_processor().is_none());
    }
}
