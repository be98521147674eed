use chrono::{prelude::*, Duration};
use chrono_tz::Tz;
use serde::{de::Visitor, Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};
use thiserror::Error;

/// How far `next_occurrence` will walk forward before giving up on
/// a pattern. Four years covers every satisfiable field combination,
/// including Feb 29.
const MAX_SEARCH_DAYS: i64 = 366 * 4;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecurrenceError {
    #[error("Invalid recurrence pattern: {0}")]
    InvalidPattern(String),
    #[error("Recurrence pattern yields no future occurrence")]
    NoFutureOccurrence,
}

/// A single field of a cron-like recurrence pattern: either a wildcard,
/// a fixed value or a set of values (from a comma list or a range).
#[derive(Debug, Clone, PartialEq)]
pub enum PatternField {
    Any,
    Value(u32),
    Set(Vec<u32>),
}

impl PatternField {
    pub fn matches(&self, value: u32) -> bool {
        match self {
            Self::Any => true,
            Self::Value(v) => *v == value,
            Self::Set(values) => values.contains(&value),
        }
    }

    fn parse(field: &str, position: FieldPosition) -> Result<Self, RecurrenceError> {
        if field == "*" {
            return Ok(Self::Any);
        }
        if field.contains(',') {
            let mut values = Vec::new();
            for part in field.split(',') {
                values.push(parse_field_value(part, position)?);
            }
            values.sort_unstable();
            values.dedup();
            return Ok(Self::Set(values));
        }
        if let Some(idx) = field.find('-') {
            let start = parse_field_value(&field[..idx], position)?;
            let end = parse_field_value(&field[idx + 1..], position)?;
            if start > end {
                return Err(RecurrenceError::InvalidPattern(format!(
                    "Range start is after range end: {}",
                    field
                )));
            }
            return Ok(Self::Set((start..=end).collect()));
        }
        parse_field_value(field, position).map(Self::Value)
    }
}

impl Display for PatternField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Any => write!(f, "*"),
            Self::Value(v) => write!(f, "{}", v),
            Self::Set(values) => {
                let parts: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                write!(f, "{}", parts.join(","))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum FieldPosition {
    Minute,
    Hour,
    DayOfMonth,
    Month,
    DayOfWeek,
}

impl FieldPosition {
    fn bounds(&self) -> (u32, u32) {
        match self {
            Self::Minute => (0, 59),
            Self::Hour => (0, 23),
            Self::DayOfMonth => (1, 31),
            Self::Month => (1, 12),
            Self::DayOfWeek => (0, 6),
        }
    }
}

fn parse_field_value(part: &str, position: FieldPosition) -> Result<u32, RecurrenceError> {
    let value = match part.parse::<u32>() {
        Ok(v) => v,
        Err(_) => match position {
            FieldPosition::Month => str_to_month(part)?,
            FieldPosition::DayOfWeek => str_to_weekday(part)?,
            _ => {
                return Err(RecurrenceError::InvalidPattern(format!(
                    "Unrecognized field value: {}",
                    part
                )))
            }
        },
    };
    let (min, max) = position.bounds();
    if value < min || value > max {
        return Err(RecurrenceError::InvalidPattern(format!(
            "Field value out of range: {}",
            part
        )));
    }
    Ok(value)
}

fn str_to_month(m: &str) -> Result<u32, RecurrenceError> {
    match m.to_lowercase().as_str() {
        "jan" => Ok(1),
        "feb" => Ok(2),
        "mar" => Ok(3),
        "apr" => Ok(4),
        "may" => Ok(5),
        "jun" => Ok(6),
        "jul" => Ok(7),
        "aug" => Ok(8),
        "sep" => Ok(9),
        "oct" => Ok(10),
        "nov" => Ok(11),
        "dec" => Ok(12),
        _ => Err(RecurrenceError::InvalidPattern(format!(
            "Unrecognized month name: {}",
            m
        ))),
    }
}

// Cron convention: 0 is Sunday
fn str_to_weekday(d: &str) -> Result<u32, RecurrenceError> {
    match d.to_lowercase().as_str() {
        "sun" => Ok(0),
        "mon" => Ok(1),
        "tue" => Ok(2),
        "wed" => Ok(3),
        "thu" => Ok(4),
        "fri" => Ok(5),
        "sat" => Ok(6),
        _ => Err(RecurrenceError::InvalidPattern(format!(
            "Unrecognized weekday name: {}",
            d
        ))),
    }
}

/// A cron-like schedule description with five fields: minute, hour,
/// day of month, month and day of week.
///
/// The timezone is not part of the pattern; it is resolved by
/// [`RecurrencePattern::next_occurrence`] on every evaluation, so the
/// same pattern shifts across daylight saving transitions.
#[derive(Debug, Clone, PartialEq)]
pub struct RecurrencePattern {
    pub minute: PatternField,
    pub hour: PatternField,
    pub day_of_month: PatternField,
    pub month: PatternField,
    pub day_of_week: PatternField,
}

impl RecurrencePattern {
    /// Computes the next timestamp in millis strictly after `after_ms`
    /// that satisfies all five fields, evaluated in `timezone`.
    pub fn next_occurrence(&self, after_ms: i64, timezone: Tz) -> Result<i64, RecurrenceError> {
        let after = Utc
            .timestamp_millis_opt(after_ms)
            .single()
            .ok_or(RecurrenceError::NoFutureOccurrence)?;
        let local_after = after.with_timezone(&timezone).naive_local();
        let truncated = local_after
            .with_second(0)
            .and_then(|t| t.with_nanosecond(0))
            .unwrap_or(local_after);

        let mut cursor = truncated + Duration::minutes(1);
        let limit = cursor + Duration::days(MAX_SEARCH_DAYS);

        while cursor < limit {
            if !self.month.matches(cursor.month()) {
                cursor = first_minute_of_next_month(cursor);
                continue;
            }
            if !self.day_of_month.matches(cursor.day())
                || !self.day_of_week.matches(cursor.weekday().num_days_from_sunday())
            {
                cursor = first_minute_of_next_day(cursor);
                continue;
            }
            if !self.hour.matches(cursor.hour()) {
                cursor = first_minute_of_next_hour(cursor);
                continue;
            }
            if !self.minute.matches(cursor.minute()) {
                cursor = cursor + Duration::minutes(1);
                continue;
            }
            match timezone.from_local_datetime(&cursor) {
                chrono::LocalResult::Single(instant) => return Ok(instant.timestamp_millis()),
                chrono::LocalResult::Ambiguous(earliest, _) => {
                    return Ok(earliest.timestamp_millis())
                }
                // The local time does not exist because of a daylight
                // saving gap, keep walking
                chrono::LocalResult::None => {
                    cursor = cursor + Duration::minutes(1);
                    continue;
                }
            }
        }

        Err(RecurrenceError::NoFutureOccurrence)
    }
}

fn first_minute_of_next_day(t: NaiveDateTime) -> NaiveDateTime {
    (t.date() + Duration::days(1)).and_hms(0, 0, 0)
}

fn first_minute_of_next_hour(t: NaiveDateTime) -> NaiveDateTime {
    t.date().and_hms(t.hour(), 0, 0) + Duration::hours(1)
}

fn first_minute_of_next_month(t: NaiveDateTime) -> NaiveDateTime {
    let (year, month) = if t.month() == 12 {
        (t.year() + 1, 1)
    } else {
        (t.year(), t.month() + 1)
    };
    // The first day of a month always exists
    NaiveDate::from_ymd(year, month, 1).and_hms(0, 0, 0)
}

impl Display for RecurrencePattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} {} {} {}",
            self.minute, self.hour, self.day_of_month, self.month, self.day_of_week
        )
    }
}

impl FromStr for RecurrencePattern {
    type Err = RecurrenceError;

    fn from_str(pattern: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = pattern.split_whitespace().collect();
        if fields.len() != 5 {
            return Err(RecurrenceError::InvalidPattern(format!(
                "Expected 5 fields but got {}: {}",
                fields.len(),
                pattern
            )));
        }
        Ok(Self {
            minute: PatternField::parse(fields[0], FieldPosition::Minute)?,
            hour: PatternField::parse(fields[1], FieldPosition::Hour)?,
            day_of_month: PatternField::parse(fields[2], FieldPosition::DayOfMonth)?,
            month: PatternField::parse(fields[3], FieldPosition::Month)?,
            day_of_week: PatternField::parse(fields[4], FieldPosition::DayOfWeek)?,
        })
    }
}

impl Serialize for RecurrencePattern {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for RecurrencePattern {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct PatternVisitor;

        impl<'de> Visitor<'de> for PatternVisitor {
            type Value = RecurrencePattern;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("A valid cron-like recurrence pattern")
            }

            fn visit_str<E>(self, value: &str) -> Result<RecurrencePattern, E>
            where
                E: serde::de::Error,
            {
                value
                    .parse::<RecurrencePattern>()
                    .map_err(|e| E::custom(format!("{}", e)))
            }
        }

        deserializer.deserialize_str(PatternVisitor)
    }
}
