//! Sales-column schema extraction from the `Stocks / CR` header line.
//!
//! The header is free text and drifts between report exports, so the
//! extracted tokens go through a ranked list of [`SchemaRepair`] strategies.
//! The first strategy that applies produces the schema; the last one always
//! applies, which makes extraction infallible.

use crate::schema::{ColumnSchema, SALES_COLUMN_COUNT};
use crate::utils::{is_month_label, report_lines};
use log::debug;

/// Literal phrase that introduces the stock/CR/sales header.
pub const SCHEMA_MARKER: &str = "Stocks / CR";

/// Leading tokens of the schema line that are not sales labels (`Stocks`, `/`, `CR`).
const MARKER_TOKEN_COUNT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaRepair {
    /// Seven labels with the current month already first.
    AsIs,
    /// Seven labels with a month label out of place; it is moved to the front.
    MonthToFront,
    /// Wrong label count but a month label is present: `[month, M-1..M-6]`.
    RebuildFromMonth,
    /// Nothing usable: `[MOIS, M-1..M-6]`.
    CanonicalDefault,
}

impl SchemaRepair {
    pub const RANKED: [SchemaRepair; 4] = [
        SchemaRepair::AsIs,
        SchemaRepair::MonthToFront,
        SchemaRepair::RebuildFromMonth,
        SchemaRepair::CanonicalDefault,
    ];

    /// Returns the repaired schema, or `None` when this strategy does not apply.
    pub fn apply(self, candidate: &[String]) -> Option<ColumnSchema> {
        let month_idx = candidate.iter().position(|t| is_month_label(t));

        match self {
            SchemaRepair::AsIs => {
                if month_idx != Some(0) {
                    return None;
                }
                to_array(candidate.to_vec()).map(ColumnSchema::new)
            }
            SchemaRepair::MonthToFront => {
                let idx = month_idx.filter(|&i| i > 0)?;
                let mut labels = candidate.to_vec();
                let month = labels.remove(idx);
                labels.insert(0, month);
                to_array(labels).map(ColumnSchema::new)
            }
            SchemaRepair::RebuildFromMonth => {
                if candidate.len() == SALES_COLUMN_COUNT {
                    return None;
                }
                month_idx.map(|i| ColumnSchema::from_current_month(&candidate[i]))
            }
            SchemaRepair::CanonicalDefault => Some(ColumnSchema::canonical()),
        }
    }
}

fn to_array(labels: Vec<String>) -> Option<[String; SALES_COLUMN_COUNT]> {
    labels.try_into().ok()
}

/// Runs the ranked repair strategies over `candidate` and returns the first result.
pub fn resolve_schema(candidate: &[String]) -> (ColumnSchema, SchemaRepair) {
    for repair in SchemaRepair::RANKED {
        if let Some(schema) = repair.apply(candidate) {
            return (schema, repair);
        }
    }

    (ColumnSchema::canonical(), SchemaRepair::CanonicalDefault)
}

pub fn find_schema_line(text: &str) -> Option<&str> {
    report_lines(text).find(|line| line.contains(SCHEMA_MARKER))
}

/// Tokens of the schema line after the marker tokens, stray `/` removed.
pub fn candidate_labels(line: &str) -> Vec<String> {
    line.split_whitespace()
        .skip(MARKER_TOKEN_COUNT)
        .filter(|t| *t != "/")
        .map(str::to_string)
        .collect()
}

pub fn extract_schema(text: &str) -> ColumnSchema {
    let Some(line) = find_schema_line(text) else {
        debug!("No '{}' header line found, using canonical schema", SCHEMA_MARKER);
        return ColumnSchema::canonical();
    };

    let candidate = candidate_labels(line);
    let (schema, repair) = resolve_schema(&candidate);

    if repair != SchemaRepair::AsIs {
        debug!(
            "Schema header {:?} repaired with {:?} -> {:?}",
            candidate,
            repair,
            schema.labels()
        );
    }

    schema
}
