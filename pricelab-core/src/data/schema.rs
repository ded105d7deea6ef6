//! CSV schema contract: the columns every uploaded price file must carry.
//!
//! Column names are matched case-insensitively after trimming whitespace.
//! Order is free and extra columns are ignored.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Expected cell types for the required columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SchemaType {
    Date,
    Float64,
    UInt64,
}

/// A single required column.
#[derive(Debug, Clone, Serialize)]
pub struct SchemaField {
    pub name: &'static str,
    pub dtype: SchemaType,
}

/// The required columns, in canonical output order.
pub const REQUIRED_COLUMNS: &[SchemaField] = &[
    SchemaField {
        name: "date",
        dtype: SchemaType::Date,
    },
    SchemaField {
        name: "open",
        dtype: SchemaType::Float64,
    },
    SchemaField {
        name: "high",
        dtype: SchemaType::Float64,
    },
    SchemaField {
        name: "low",
        dtype: SchemaType::Float64,
    },
    SchemaField {
        name: "close",
        dtype: SchemaType::Float64,
    },
    SchemaField {
        name: "volume",
        dtype: SchemaType::UInt64,
    },
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("input has no header row")]
    NoHeader,

    #[error("missing required columns: {missing:?} (available columns: {available:?})")]
    MissingColumns {
        missing: Vec<String>,
        available: Vec<String>,
    },

    #[error("required column '{column}' appears more than once")]
    DuplicateColumn { column: String },
}

/// Position of each required column within a header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    pub date: usize,
    pub open: usize,
    pub high: usize,
    pub low: usize,
    pub close: usize,
    pub volume: usize,
}

impl ColumnMap {
    /// Resolve required columns against a header row.
    ///
    /// Every missing column is reported at once, together with the header
    /// that was actually found.
    pub fn resolve<S: AsRef<str>>(headers: &[S]) -> Result<Self, SchemaError> {
        if headers.is_empty() || headers.iter().all(|h| h.as_ref().trim().is_empty()) {
            return Err(SchemaError::NoHeader);
        }

        let normalized: Vec<String> = headers
            .iter()
            .map(|h| normalize(h.as_ref()))
            .collect();

        let mut found = [0usize; 6];
        let mut missing = Vec::new();
        for (slot, field) in REQUIRED_COLUMNS.iter().enumerate() {
            let mut positions = normalized
                .iter()
                .enumerate()
                .filter(|(_, name)| name.as_str() == field.name)
                .map(|(i, _)| i);
            match (positions.next(), positions.next()) {
                (Some(i), None) => found[slot] = i,
                (Some(_), Some(_)) => {
                    return Err(SchemaError::DuplicateColumn {
                        column: field.name.to_string(),
                    })
                }
                (None, _) => missing.push(field.name.to_string()),
            }
        }

        if !missing.is_empty() {
            return Err(SchemaError::MissingColumns {
                missing,
                available: headers.iter().map(|h| h.as_ref().trim().to_string()).collect(),
            });
        }

        Ok(Self {
            date: found[0],
            open: found[1],
            high: found[2],
            low: found[3],
            close: found[4],
            volume: found[5],
        })
    }
}

/// Canonical form of a header cell: trimmed, lower-case, BOM stripped.
pub fn normalize(header: &str) -> String {
    header.trim_start_matches('\u{feff}').trim().to_lowercase()
}
