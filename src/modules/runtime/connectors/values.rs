//! Conversion between JSON values and PostgreSQL wire values
//!
//! Parameters are coerced to the types the server described for the prepared
//! statement, so callers can pass `"2024-05-01T10:00:00"` for a `TIMESTAMP`
//! column or `null` for an `INTEGER` one without casting in SQL.

use authgate_core::AuthgateError;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde_json::Value;
use sqlx::encode::IsNull;
use sqlx::postgres::types::{Oid, PgInterval};
use sqlx::postgres::{PgArgumentBuffer, PgArguments, PgColumn, PgRow, PgTypeInfo, PgTypeKind};
use sqlx::query::Query;
use sqlx::types::ipnetwork::IpNetwork;
use sqlx::types::BigDecimal;
use sqlx::{Column, Decode, Encode, Postgres, Row as _, Type, TypeInfo, ValueRef};
use std::borrow::Cow;
use std::str::FromStr;
use uuid::Uuid;

/// Largest digit count a NUMERIC may have and still be rendered as a JSON number
const MAX_EXACT_DIGITS: usize = 15;

/// A NULL carrying the type the server expects for its parameter slot
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TypedNull(PgTypeInfo);

impl Type<Postgres> for TypedNull {
    fn type_info() -> PgTypeInfo {
        <String as Type<Postgres>>::type_info()
    }
}

impl Encode<'_, Postgres> for TypedNull {
    fn encode_by_ref(&self, _buf: &mut PgArgumentBuffer) -> IsNull {
        IsNull::Yes
    }

    fn produces(&self) -> Option<PgTypeInfo> {
        Some(self.0.clone())
    }
}

/// A parameter converted to the Rust type matching its slot
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Bound<'q> {
    Null(TypedNull),
    Bool(bool),
    Int2(i16),
    Int4(i32),
    Int8(i64),
    Oid(u32),
    Float4(f32),
    Float8(f64),
    Numeric(BigDecimal),
    Uuid(Uuid),
    Timestamp(NaiveDateTime),
    TimestampTz(DateTime<Utc>),
    Date(NaiveDate),
    Time(NaiveTime),
    Inet(IpNetwork),
    Json(&'q Value),
    Text(Cow<'q, str>),
}

impl<'q> Bound<'q> {
    fn bind(self, query: Query<'q, Postgres, PgArguments>) -> Query<'q, Postgres, PgArguments> {
        match self {
            Bound::Null(null) => query.bind(null),
            Bound::Bool(v) => query.bind(v),
            Bound::Int2(v) => query.bind(v),
            Bound::Int4(v) => query.bind(v),
            Bound::Int8(v) => query.bind(v),
            Bound::Oid(v) => query.bind(Oid(v)),
            Bound::Float4(v) => query.bind(v),
            Bound::Float8(v) => query.bind(v),
            Bound::Numeric(v) => query.bind(v),
            Bound::Uuid(v) => query.bind(v),
            Bound::Timestamp(v) => query.bind(v),
            Bound::TimestampTz(v) => query.bind(v),
            Bound::Date(v) => query.bind(v),
            Bound::Time(v) => query.bind(v),
            Bound::Inet(v) => query.bind(v),
            Bound::Json(v) => query.bind(sqlx::types::Json(v)),
            Bound::Text(Cow::Borrowed(s)) => query.bind(s),
            Bound::Text(Cow::Owned(s)) => query.bind(s),
        }
    }
}

/// Bind parameters positionally, coercing each to its described type.
///
/// `targets` may be shorter than `params`; the extra values are bound by their
/// JSON shape and the server reports the count mismatch.
pub(crate) fn bind_params<'q>(
    mut query: Query<'q, Postgres, PgArguments>,
    params: &'q [Value],
    targets: &[PgTypeInfo],
) -> Result<Query<'q, Postgres, PgArguments>, AuthgateError> {
    for (idx, value) in params.iter().enumerate() {
        let bound = match targets.get(idx) {
            Some(target) => coerce(value, target).map_err(|reason| {
                AuthgateError::Unclassified(format!(
                    "parameter ${} ({}): {}",
                    idx + 1,
                    target.name(),
                    reason
                ))
            })?,
            None => by_shape(value),
        };
        query = bound.bind(query);
    }
    Ok(query)
}

/// Convert a JSON value for a parameter slot of type `target`
pub(crate) fn coerce<'q>(value: &'q Value, target: &PgTypeInfo) -> Result<Bound<'q>, String> {
    if value.is_null() {
        return Ok(Bound::Null(TypedNull(target.clone())));
    }

    let bound = match target.name() {
        "BOOL" => Bound::Bool(as_bool(value)?),
        "INT2" => Bound::Int2(narrow(as_i64(value)?)?),
        "INT4" => Bound::Int4(narrow(as_i64(value)?)?),
        "INT8" => Bound::Int8(as_i64(value)?),
        "OID" => Bound::Oid(narrow(as_i64(value)?)?),
        "FLOAT4" => Bound::Float4(as_f64(value)? as f32),
        "FLOAT8" => Bound::Float8(as_f64(value)?),
        "NUMERIC" => Bound::Numeric(
            BigDecimal::from_str(&as_text(value)).map_err(|e| format!("not a decimal: {}", e))?,
        ),
        "UUID" => Bound::Uuid(Uuid::parse_str(as_str(value)?).map_err(|e| e.to_string())?),
        "TIMESTAMP" => Bound::Timestamp(parse_timestamp(as_str(value)?)?),
        "TIMESTAMPTZ" => Bound::TimestampTz(parse_timestamptz(as_str(value)?)?),
        "DATE" => Bound::Date(
            NaiveDate::parse_from_str(as_str(value)?, "%Y-%m-%d").map_err(|e| e.to_string())?,
        ),
        "TIME" => Bound::Time(parse_time(as_str(value)?)?),
        "INET" | "CIDR" => Bound::Inet(
            IpNetwork::from_str(as_str(value)?).map_err(|e| e.to_string())?,
        ),
        "JSON" | "JSONB" => Bound::Json(value),
        _ => Bound::Text(match value {
            Value::String(s) => Cow::Borrowed(s.as_str()),
            other => Cow::Owned(other.to_string()),
        }),
    };
    Ok(bound)
}

/// Binding used when the statement did not describe a slot
fn by_shape(value: &Value) -> Bound<'_> {
    match value {
        Value::Null => Bound::Null(TypedNull(<String as Type<Postgres>>::type_info())),
        Value::Bool(b) => Bound::Bool(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Bound::Int8(i),
            None => Bound::Float8(n.as_f64().unwrap_or_default()),
        },
        Value::String(s) => Bound::Text(Cow::Borrowed(s.as_str())),
        other => Bound::Json(other),
    }
}

fn as_bool(value: &Value) -> Result<bool, String> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::String(s) => match s.to_ascii_lowercase().as_str() {
            "true" | "t" => Ok(true),
            "false" | "f" => Ok(false),
            _ => Err(format!("'{}' is not a boolean", s)),
        },
        other => Err(format!("expected a boolean, got {}", other)),
    }
}

fn as_i64(value: &Value) -> Result<i64, String> {
    match value {
        Value::Number(n) => n.as_i64().ok_or_else(|| format!("{} is not an integer", n)),
        Value::String(s) => s.trim().parse().map_err(|_| format!("'{}' is not an integer", s)),
        other => Err(format!("expected an integer, got {}", other)),
    }
}

fn narrow<T: TryFrom<i64>>(value: i64) -> Result<T, String> {
    T::try_from(value).map_err(|_| format!("{} is out of range", value))
}

fn as_f64(value: &Value) -> Result<f64, String> {
    match value {
        Value::Number(n) => n.as_f64().ok_or_else(|| format!("{} is not a number", n)),
        Value::String(s) => s.trim().parse().map_err(|_| format!("'{}' is not a number", s)),
        other => Err(format!("expected a number, got {}", other)),
    }
}

fn as_str(value: &Value) -> Result<&str, String> {
    value
        .as_str()
        .ok_or_else(|| format!("expected a string, got {}", value))
}

fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn parse_timestamp(s: &str) -> Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f"))
        .map_err(|_| format!("'{}' is not a timestamp (YYYY-MM-DDTHH:MM:SS)", s))
}

/// RFC 3339, or a naive timestamp taken as UTC
fn parse_timestamptz(s: &str) -> Result<DateTime<Utc>, String> {
    match DateTime::parse_from_rfc3339(s) {
        Ok(dt) => Ok(dt.with_timezone(&Utc)),
        Err(_) => parse_timestamp(s).map(|naive| Utc.from_utc_datetime(&naive)),
    }
}

fn parse_time(s: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(s, "%H:%M:%S%.f")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .map_err(|_| format!("'{}' is not a time (HH:MM[:SS])", s))
}

/// Get a column value as JSON; SQL NULL becomes `null`, undecodable values are errors
pub(crate) fn column_value(row: &PgRow, column: &PgColumn) -> Result<Value, AuthgateError> {
    let raw = row
        .try_get_raw(column.ordinal())
        .map_err(|e| decode_error(column, e))?;
    if raw.is_null() {
        return Ok(Value::Null);
    }

    let value = match column.type_info().name() {
        "BOOL" => Value::Bool(decode(row, column)?),
        "INT2" => Value::from(decode::<i16>(row, column)?),
        "INT4" => Value::from(decode::<i32>(row, column)?),
        "INT8" => Value::from(decode::<i64>(row, column)?),
        "OID" => Value::from(decode::<Oid>(row, column)?.0),
        "FLOAT4" => float_value(decode::<f32>(row, column)? as f64),
        "FLOAT8" => float_value(decode(row, column)?),
        "NUMERIC" => numeric_value(decode::<BigDecimal>(row, column)?.to_string()),
        "UUID" => Value::String(decode::<Uuid>(row, column)?.to_string()),
        "TIMESTAMPTZ" => Value::String(decode::<DateTime<Utc>>(row, column)?.to_rfc3339()),
        "TIMESTAMP" => Value::String(
            decode::<NaiveDateTime>(row, column)?
                .format("%Y-%m-%dT%H:%M:%S%.f")
                .to_string(),
        ),
        "DATE" => Value::String(decode::<NaiveDate>(row, column)?.to_string()),
        "TIME" => Value::String(
            decode::<NaiveTime>(row, column)?
                .format("%H:%M:%S%.f")
                .to_string(),
        ),
        "INTERVAL" => Value::String(interval_text(&decode::<PgInterval>(row, column)?)),
        "INET" => Value::String(inet_text(&decode::<IpNetwork>(row, column)?, false)),
        "CIDR" => Value::String(inet_text(&decode::<IpNetwork>(row, column)?, true)),
        "BYTEA" => Value::String(bytea_text(&decode::<Vec<u8>>(row, column)?)),
        "JSON" | "JSONB" => decode(row, column)?,
        // Enum labels and citext travel as UTF-8 text
        "citext" => Value::String(decode_text_unchecked(row, column)?),
        _ if matches!(column.type_info().kind(), PgTypeKind::Enum(_)) => {
            Value::String(decode_text_unchecked(row, column)?)
        }
        _ => Value::String(decode(row, column)?),
    };
    Ok(value)
}

fn decode<'r, T>(row: &'r PgRow, column: &PgColumn) -> Result<T, AuthgateError>
where
    T: Decode<'r, Postgres> + Type<Postgres>,
{
    row.try_get::<T, _>(column.ordinal())
        .map_err(|e| decode_error(column, e))
}

fn decode_text_unchecked(row: &PgRow, column: &PgColumn) -> Result<String, AuthgateError> {
    row.try_get_unchecked::<String, _>(column.ordinal())
        .map_err(|e| decode_error(column, e))
}

fn decode_error(column: &PgColumn, err: sqlx::Error) -> AuthgateError {
    AuthgateError::Unclassified(format!(
        "cannot decode column '{}' of type {}: {}",
        column.name(),
        column.type_info().name(),
        err
    ))
}

/// NaN and infinities have no JSON number form
fn float_value(v: f64) -> Value {
    match serde_json::Number::from_f64(v) {
        Some(n) => Value::Number(n),
        None => Value::String(v.to_string()),
    }
}

/// Integers and short decimals become numbers; long ones stay text to keep every digit
pub(crate) fn numeric_value(text: String) -> Value {
    let digits = text.chars().filter(char::is_ascii_digit).count();
    if digits > MAX_EXACT_DIGITS {
        return Value::String(text);
    }
    if let Ok(i) = text.parse::<i64>() {
        return Value::from(i);
    }
    match text.parse::<f64>().ok().and_then(serde_json::Number::from_f64) {
        Some(n) => Value::Number(n),
        None => Value::String(text),
    }
}

/// PostgreSQL's default interval output, e.g. `1 year 2 mons 3 days 04:05:06.5`
pub(crate) fn interval_text(interval: &PgInterval) -> String {
    fn unit(n: i32, name: &str) -> String {
        if n.abs() == 1 {
            format!("{} {}", n, name)
        } else {
            format!("{} {}s", n, name)
        }
    }

    let mut parts = Vec::new();
    let (years, months) = (interval.months / 12, interval.months % 12);
    if years != 0 {
        parts.push(unit(years, "year"));
    }
    if months != 0 {
        parts.push(unit(months, "mon"));
    }
    if interval.days != 0 {
        parts.push(unit(interval.days, "day"));
    }

    if interval.microseconds != 0 || parts.is_empty() {
        let sign = if interval.microseconds < 0 { "-" } else { "" };
        let micros = interval.microseconds.unsigned_abs();
        let secs = micros / 1_000_000;
        let mut time = format!(
            "{}{:02}:{:02}:{:02}",
            sign,
            secs / 3600,
            (secs % 3600) / 60,
            secs % 60
        );
        let fraction = micros % 1_000_000;
        if fraction != 0 {
            let digits = format!("{:06}", fraction);
            time.push('.');
            time.push_str(digits.trim_end_matches('0'));
        }
        parts.push(time);
    }

    parts.join(" ")
}

/// `inet` hides a full-length prefix; `cidr` always shows it
pub(crate) fn inet_text(network: &IpNetwork, always_prefix: bool) -> String {
    let full = match network {
        IpNetwork::V4(_) => 32,
        IpNetwork::V6(_) => 128,
    };
    if !always_prefix && network.prefix() == full {
        network.ip().to_string()
    } else {
        format!("{}/{}", network.ip(), network.prefix())
    }
}

/// `bytea` hex output format
pub(crate) fn bytea_text(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(2 + bytes.len() * 2);
    out.push_str("\\x");
    for b in bytes {
        out.push_str(&format!("{:02x}", b));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ty(name: &'static str) -> PgTypeInfo {
        PgTypeInfo::with_name(name)
    }

    #[test]
    fn test_null_keeps_slot_type() {
        let null = Value::Null;
        match coerce(&null, &ty("INT4")).unwrap() {
            Bound::Null(typed) => assert_eq!(typed.produces().unwrap().name(), "INT4"),
            other => panic!("unexpected binding: {:?}", other),
        }
    }

    #[test]
    fn test_strings_coerce_to_temporal_types() {
        let at = json!("2024-05-01T10:00:00");
        assert_eq!(
            coerce(&at, &ty("TIMESTAMP")).unwrap(),
            Bound::Timestamp(
                NaiveDate::from_ymd_opt(2024, 5, 1)
                    .unwrap()
                    .and_hms_opt(10, 0, 0)
                    .unwrap()
            )
        );

        let spaced = json!("2024-05-01 10:00:00.250");
        assert!(matches!(coerce(&spaced, &ty("TIMESTAMP")), Ok(Bound::Timestamp(_))));

        let zoned = json!("2024-05-01T12:00:00+02:00");
        match coerce(&zoned, &ty("TIMESTAMPTZ")).unwrap() {
            Bound::TimestampTz(dt) => assert_eq!(dt.to_rfc3339(), "2024-05-01T10:00:00+00:00"),
            other => panic!("unexpected binding: {:?}", other),
        }

        let day = json!("2024-05-01");
        assert_eq!(
            coerce(&day, &ty("DATE")).unwrap(),
            Bound::Date(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap())
        );

        let time = json!("12:30");
        assert_eq!(
            coerce(&time, &ty("TIME")).unwrap(),
            Bound::Time(NaiveTime::from_hms_opt(12, 30, 0).unwrap())
        );
    }

    #[test]
    fn test_integer_slots() {
        assert_eq!(coerce(&json!(7), &ty("INT4")).unwrap(), Bound::Int4(7));
        assert_eq!(coerce(&json!("42"), &ty("INT8")).unwrap(), Bound::Int8(42));
        assert_eq!(coerce(&json!(3), &ty("INT2")).unwrap(), Bound::Int2(3));
        assert!(coerce(&json!(70000), &ty("INT2")).is_err());
        assert!(coerce(&json!(1.5), &ty("INT4")).is_err());
        assert!(coerce(&json!("seven"), &ty("INT4")).is_err());
    }

    #[test]
    fn test_other_slots() {
        assert_eq!(coerce(&json!("t"), &ty("BOOL")).unwrap(), Bound::Bool(true));
        assert_eq!(coerce(&json!(2), &ty("FLOAT8")).unwrap(), Bound::Float8(2.0));
        assert_eq!(
            coerce(&json!("1.50"), &ty("NUMERIC")).unwrap(),
            Bound::Numeric(BigDecimal::from_str("1.50").unwrap())
        );
        assert!(matches!(
            coerce(&json!("67e55044-10b1-426f-9247-bb680e5fe0c8"), &ty("UUID")),
            Ok(Bound::Uuid(_))
        ));
        assert!(coerce(&json!("not-a-uuid"), &ty("UUID")).is_err());
        assert!(matches!(coerce(&json!("10.0.0.1"), &ty("INET")), Ok(Bound::Inet(_))));

        let doc = json!({"a": 1});
        assert_eq!(coerce(&doc, &ty("JSONB")).unwrap(), Bound::Json(&doc));
    }

    #[test]
    fn test_text_slots_accept_any_scalar() {
        let name = json!("ana");
        assert_eq!(
            coerce(&name, &ty("VARCHAR")).unwrap(),
            Bound::Text(Cow::Borrowed("ana"))
        );
        assert_eq!(
            coerce(&json!(42), &ty("TEXT")).unwrap(),
            Bound::Text(Cow::Owned("42".to_string()))
        );
    }

    #[test]
    fn test_undescribed_slots_bind_by_shape() {
        assert_eq!(by_shape(&json!(5)), Bound::Int8(5));
        assert_eq!(by_shape(&json!("x")), Bound::Text(Cow::Borrowed("x")));
        assert!(matches!(by_shape(&Value::Null), Bound::Null(_)));
    }

    #[test]
    fn test_numeric_rendering() {
        assert_eq!(numeric_value("1.5".to_string()), json!(1.5));
        assert_eq!(numeric_value("42".to_string()), json!(42));
        assert_eq!(numeric_value("-0.25".to_string()), json!(-0.25));
        assert_eq!(
            numeric_value("12345678901234567890.5".to_string()),
            json!("12345678901234567890.5")
        );
    }

    #[test]
    fn test_interval_rendering() {
        let day = PgInterval { months: 0, days: 1, microseconds: 0 };
        assert_eq!(interval_text(&day), "1 day");

        let mixed = PgInterval { months: 14, days: 3, microseconds: 14_706_500_000 };
        assert_eq!(interval_text(&mixed), "1 year 2 mons 3 days 04:05:06.5");

        let zero = PgInterval { months: 0, days: 0, microseconds: 0 };
        assert_eq!(interval_text(&zero), "00:00:00");

        let negative = PgInterval { months: 0, days: 0, microseconds: -90_000_000 };
        assert_eq!(interval_text(&negative), "-00:01:30");
    }

    #[test]
    fn test_inet_rendering() {
        let host: IpNetwork = "10.0.0.1".parse().unwrap();
        assert_eq!(inet_text(&host, false), "10.0.0.1");
        assert_eq!(inet_text(&host, true), "10.0.0.1/32");

        let net: IpNetwork = "10.0.0.0/8".parse().unwrap();
        assert_eq!(inet_text(&net, false), "10.0.0.0/8");
    }

    #[test]
    fn test_bytea_rendering() {
        assert_eq!(bytea_text(b"ab"), "\\x6162");
        assert_eq!(bytea_text(&[]), "\\x");
    }

    #[test]
    fn test_non_finite_floats() {
        assert_eq!(float_value(f64::NAN), json!("NaN"));
        assert_eq!(float_value(2.5), json!(2.5));
    }
}
