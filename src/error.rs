use chrono::{NaiveDate, Weekday};
use thiserror::Error;

/// Données amont incohérentes : remontées, jamais remplacées par un défaut.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IntegrityError {
    #[error("unknown group: {0}")]
    UnknownGroup(String),
    #[error("unknown area {area} for group {group}")]
    UnknownArea { group: String, area: String },
    #[error("unknown employee: {0}")]
    UnknownEmployee(String),
    #[error("unknown rotation rule {rule} (pattern {pattern})")]
    UnknownRotation { rule: String, pattern: String },
    #[error("rotation rule {rule} has an empty cycle")]
    EmptyCycle { rule: String },
    #[error("no rotation entry for rule {rule}, index {index}, {weekday}")]
    MissingRotationEntry {
        rule: String,
        index: u32,
        weekday: Weekday,
    },
    #[error("{date} precedes rotation anchor {anchor} of employee {employee}")]
    BeforeAnchor {
        employee: String,
        date: NaiveDate,
        anchor: NaiveDate,
    },
}
