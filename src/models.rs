use crate::stats::resolve_local;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{fmt, str::FromStr};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Emotional,
    Background,
}

impl EventKind {
    pub const ALL: [EventKind; 2] = [EventKind::Emotional, EventKind::Background];

    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Emotional => "emotional",
            EventKind::Background => "background",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "emotional" => Ok(EventKind::Emotional),
            "background" => Ok(EventKind::Background),
            other => Err(format!("unknown event type '{other}'")),
        }
    }
}

/// A freshly logged event. Only the store creates these.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub timestamp: DateTime<Utc>,
}

impl Event {
    pub fn new(kind: EventKind, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            timestamp,
        }
    }
}

/// An event as it sits in storage. Every field is optional and untyped so that
/// hand-edited or older entries still load; the aggregator decides what is usable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<Value>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl RawEvent {
    pub fn new(kind: &str, timestamp: &str) -> Self {
        Self {
            kind: Some(Value::from(kind)),
            timestamp: Some(Value::from(timestamp)),
            ..Self::default()
        }
    }

    /// Kind and instant, reading offset-less timestamps as UTC.
    pub fn parsed(&self) -> Option<(EventKind, DateTime<Utc>)> {
        self.parsed_in(&Utc)
    }

    /// Kind and instant when both are present and valid. Timestamps without
    /// an offset are wall-clock times in `zone`.
    pub fn parsed_in<Tz: TimeZone>(&self, zone: &Tz) -> Option<(EventKind, DateTime<Utc>)> {
        let kind = self.kind.as_ref()?.as_str()?.parse().ok()?;
        let timestamp = parse_timestamp(self.timestamp.as_ref()?.as_str()?, zone)?;
        Some((kind, timestamp))
    }
}

impl From<&Event> for RawEvent {
    fn from(event: &Event) -> Self {
        Self {
            id: Some(Value::from(event.id.to_string())),
            kind: Some(Value::from(event.kind.as_str())),
            timestamp: Some(Value::from(
                event.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            )),
            extra: serde_json::Map::new(),
        }
    }
}

const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f%#z", "%Y-%m-%dT%H:%M%#z"];
const LOCAL_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Parses the ISO-8601 shapes a browser `Date` accepts.
///
/// A bare date is midnight UTC; a date-time without offset is read in `zone`.
pub fn parse_timestamp<Tz: TimeZone>(value: &str, zone: &Tz) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Some(parsed) = OFFSET_FORMATS
        .iter()
        .find_map(|format| DateTime::parse_from_str(value, format).ok())
    {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Some(local) = LOCAL_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
    {
        return Some(resolve_local(zone, local));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .map(|date| Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)))
}

#[derive(Debug, Deserialize)]
pub struct LogRequest {
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    pub range: Option<String>,
}
