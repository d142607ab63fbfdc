use crate::communes::RegionCommuneMap;
use crate::error::{RepartitionError, Result};
use crate::schema::ParsedTable;
use log::{debug, warn};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub enum AllocationShape {
    #[default]
    #[schemars(description = "One row per (region, product, commune)")]
    Long,

    #[schemars(description = "One row per (region, product), one column per commune")]
    Wide,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CommuneRow {
    pub region: String,
    pub product: String,
    pub commune: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommuneValue {
    pub commune: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WideRow {
    pub region: String,
    pub product: String,
    /// One entry per commune, in the order the region lists them.
    pub communes: Vec<CommuneValue>,
}

impl WideRow {
    pub fn get(&self, commune: &str) -> Option<f64> {
        self.communes
            .iter()
            .find(|c| c.commune == commune)
            .map(|c| c.value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", content = "rows")]
pub enum RepartitionRows {
    Long(Vec<CommuneRow>),
    Wide(Vec<WideRow>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepartitionResult {
    /// Sales column that was distributed.
    pub column: String,
    pub rows: RepartitionRows,
}

impl RepartitionResult {
    pub fn shape(&self) -> AllocationShape {
        match self.rows {
            RepartitionRows::Long(_) => AllocationShape::Long,
            RepartitionRows::Wide(_) => AllocationShape::Wide,
        }
    }

    pub fn len(&self) -> usize {
        match &self.rows {
            RepartitionRows::Long(rows) => rows.len(),
            RepartitionRows::Wide(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Long-shape rows; wide rows are unpivoted commune by commune.
    pub fn to_long(&self) -> Vec<CommuneRow> {
        match &self.rows {
            RepartitionRows::Long(rows) => rows.clone(),
            RepartitionRows::Wide(rows) => rows
                .iter()
                .flat_map(|row| {
                    row.communes.iter().map(move |c| CommuneRow {
                        region: row.region.clone(),
                        product: row.product.clone(),
                        commune: c.commune.clone(),
                        value: c.value,
                    })
                })
                .collect(),
        }
    }

    /// Commune names across all rows, in first-seen order.
    pub fn commune_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for row in self.to_long() {
            if !names.contains(&row.commune) {
                names.push(row.commune);
            }
        }
        names
    }
}

/// Distributes one sales column of a parsed table across communes.
///
/// Weights are applied as given: no normalisation and no rounding happen here.
pub struct CommuneAllocator<'a> {
    weights: &'a RegionCommuneMap,
}

impl<'a> CommuneAllocator<'a> {
    pub fn new(weights: &'a RegionCommuneMap) -> Self {
        Self { weights }
    }

    pub fn allocate(
        &self,
        table: &ParsedTable,
        column: &str,
        shape: AllocationShape,
    ) -> Result<RepartitionResult> {
        if !table.schema.contains(column) {
            return Err(RepartitionError::UnknownColumn {
                column: column.to_string(),
                available: table.schema.labels().join(", "),
            });
        }

        let mut unconfigured: BTreeSet<&str> = BTreeSet::new();
        let mut wide_rows = Vec::new();

        for record in &table.records {
            let Some(shares) = self.weights.get(&record.region) else {
                unconfigured.insert(&record.region);
                continue;
            };

            let amount = record.sales.get(column).unwrap_or(0) as f64;

            wide_rows.push(WideRow {
                region: record.region.clone(),
                product: record.product_name.clone(),
                communes: shares
                    .iter()
                    .map(|share| CommuneValue {
                        commune: share.commune.clone(),
                        value: amount * share.weight,
                    })
                    .collect(),
            });
        }

        for region in &unconfigured {
            warn!("Region '{}' has no configured communes; its records are excluded", region);
        }

        debug!(
            "Allocated column '{}' for {} of {} record(s)",
            column,
            wide_rows.len(),
            table.len()
        );

        let rows = match shape {
            AllocationShape::Wide => RepartitionRows::Wide(wide_rows),
            AllocationShape::Long => {
                let wide = RepartitionResult {
                    column: column.to_string(),
                    rows: RepartitionRows::Wide(wide_rows),
                };
                RepartitionRows::Long(wide.to_long())
            }
        };

        Ok(RepartitionResult {
            column: column.to_string(),
            rows,
        })
    }
}

pub fn allocate(
    table: &ParsedTable,
    weights: &RegionCommuneMap,
    column: &str,
    shape: AllocationShape,
) -> Result<RepartitionResult> {
    CommuneAllocator::new(weights).allocate(table, column, shape)
}
