//! Mapping detail records to table rows
//!
//! Every mapped source key must be present in the record. Present values
//! that are falsy (null, "", 0, false, empty array/object) are stored as
//! NULL.

use crate::source::{Kind, Record};
use crate::{IngestError, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

/// A column value, independent of the store it ends up in
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

/// Column name/value pairs in insertion order
pub type Row = Vec<(&'static str, SqlValue)>;

/// Columns copied straight from gallery and movie detail records
const GALLERY_COLUMNS: &[(&str, &str)] = &[
    ("cover_clean_image_path", "coverCleanImagePath"),
    ("cover_image_path", "coverImagePath"),
    ("description", "description"),
    ("meta_description", "metaDescription"),
    ("name", "name"),
    ("path", "path"),
    ("site_uuid", "siteUUID"),
    ("thumbnail_cover_path", "thumbnailCoverPath"),
    ("type", "type"),
];

const MODEL_COLUMNS: &[(&str, &str)] = &[
    ("biography", "biography"),
    ("breasts", "breasts"),
    ("global_uuid", "globalUUID"),
    ("hair", "hair"),
    ("headshot_image_path", "headshotImagePath"),
    ("height", "height"),
    ("name", "name"),
    ("path", "path"),
    ("site_uuid", "siteUUID"),
    ("top_rank", "topRank"),
    ("weight", "weight"),
    ("pubic_hair", "pubicHair"),
    ("publish_age", "publishAge"),
    ("ethnicity", "ethnicity"),
    ("eyes", "eyes"),
    ("gender", "gender"),
];

/// Converts a JSON value to a column value, nulling falsy values
pub fn column_value(value: &Value) -> SqlValue {
    match value {
        Value::Null | Value::Bool(false) => SqlValue::Null,
        Value::Bool(true) => SqlValue::Integer(1),
        Value::String(s) if s.is_empty() => SqlValue::Null,
        Value::String(s) => SqlValue::Text(s.clone()),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                if i == 0 {
                    SqlValue::Null
                } else {
                    SqlValue::Integer(i)
                }
            } else {
                match n.as_f64() {
                    Some(f) if f != 0.0 => SqlValue::Real(f),
                    _ => SqlValue::Null,
                }
            }
        }
        Value::Array(items) if items.is_empty() => SqlValue::Null,
        Value::Object(fields) if fields.is_empty() => SqlValue::Null,
        other => SqlValue::Text(other.to_string()),
    }
}

fn text_or_null(value: Option<String>) -> SqlValue {
    match value {
        Some(s) if !s.is_empty() => SqlValue::Text(s),
        _ => SqlValue::Null,
    }
}

fn map_columns(record: &Record, columns: &[(&'static str, &str)], row: &mut Row) -> Result<()> {
    for (column, key) in columns {
        row.push((*column, column_value(record.field(key)?)));
    }
    Ok(())
}

/// Row for the gallery/movie table
pub fn gallery_row(kind: Kind, record: &Record) -> Result<Row> {
    let mut row: Row = vec![("uuid", SqlValue::Text(record.require_str("UUID")?.to_string()))];
    map_columns(record, GALLERY_COLUMNS, &mut row)?;

    let published = published_date(record.field("publishedAt")?)?;
    row.push(("published_at", SqlValue::Text(published.format("%Y-%m-%d").to_string())));

    match kind {
        Kind::Gallery => {
            row.push(("original_uuid", column_value(record.field("originalUUID")?)));
        }
        Kind::Movie => {
            row.push((
                "splash_image_path",
                column_value(record.field("thumbnailCoverPath")?),
            ));
        }
        Kind::Model => {
            return Err(IngestError::invalid(
                "type",
                "model records cannot be written to the gallery table",
            ))
        }
    }

    Ok(row)
}

/// One relation row per model listed on a gallery or movie
pub fn relation_rows(record: &Record) -> Result<Vec<Row>> {
    let gallery_uuid = record.require_str("UUID")?.to_string();

    record
        .records("models")?
        .iter()
        .map(|model| {
            Ok(vec![
                ("model_uuid", SqlValue::Text(model.require_str("UUID")?.to_string())),
                ("gallery_uuid", SqlValue::Text(gallery_uuid.clone())),
            ])
        })
        .collect()
}

/// Row for the model table
pub fn model_row(record: &Record) -> Result<Row> {
    let mut row: Row = vec![("uuid", SqlValue::Text(record.require_str("UUID")?.to_string()))];
    map_columns(record, MODEL_COLUMNS, &mut row)?;

    let debut = debut_date(record.field("debutYear")?, record.field("debutMonth")?)?;
    row.push(("debut_month", SqlValue::Text(debut.format("%Y-%m-%d").to_string())));

    let [chest, waist, hip] = split_measurements(record.field("size")?)?;
    row.push(("chest_size", text_or_null(chest)));
    row.push(("waist_size", text_or_null(waist)));
    row.push(("hip_size", text_or_null(hip)));

    Ok(row)
}

/// Splits a "chest/waist/hip" string into three parts, padding with `None`
///
/// A null or empty value yields three `None`s; extra parts are ignored.
pub fn split_measurements(size: &Value) -> Result<[Option<String>; 3]> {
    let text = match size {
        Value::Null => return Ok([None, None, None]),
        Value::String(s) if s.is_empty() => return Ok([None, None, None]),
        Value::String(s) => s,
        other => {
            return Err(IngestError::invalid(
                "size",
                format!("expected a chest/waist/hip string, got {}", other),
            ))
        }
    };

    let mut parts = text
        .split('/')
        .map(|part| Some(part.to_string()).filter(|p| !p.is_empty()));

    Ok([
        parts.next().flatten(),
        parts.next().flatten(),
        parts.next().flatten(),
    ])
}

/// Normalizes a debut year and English month name to the first of that month
pub fn debut_date(year: &Value, month: &Value) -> Result<NaiveDate> {
    let year = match year {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        other => {
            return Err(IngestError::invalid(
                "debutYear",
                format!("expected a year, got {}", other),
            ))
        }
    };

    let month = match month {
        Value::String(s) => s.trim(),
        other => {
            return Err(IngestError::invalid(
                "debutMonth",
                format!("expected a month name, got {}", other),
            ))
        }
    };

    NaiveDate::parse_from_str(&format!("{}-{}-01", year, month), "%Y-%B-%d").map_err(|e| {
        IngestError::invalid(
            "debutMonth",
            format!("cannot parse '{} {}' as a date: {}", year, month, e),
        )
    })
}

/// Calendar date of a publish timestamp
///
/// Accepts RFC 3339 (the date is taken in the timestamp's own offset), naive
/// date-times, plain dates, or integer Unix timestamps.
pub fn published_date(value: &Value) -> Result<NaiveDate> {
    let invalid = |detail: String| IngestError::invalid("publishedAt", detail);

    match value {
        Value::String(s) => {
            let s = s.trim();
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Ok(dt.date_naive());
            }
            for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
                if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
                    return Ok(dt.date());
                }
            }
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .map_err(|_| invalid(format!("unrecognized timestamp '{}'", s)))
        }
        Value::Number(n) => n
            .as_i64()
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
            .map(|dt| dt.date_naive())
            .ok_or_else(|| invalid(format!("timestamp out of range: {}", n))),
        other => Err(invalid(format!("expected a timestamp, got {}", other))),
    }
}
