use crate::utils::{is_month_label, months_before, offset_label_months, parse_month_label};
use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Number of sales columns in a report: the current month followed by six preceding months.
pub const SALES_COLUMN_COUNT: usize = 7;

pub const CANONICAL_LABELS: [&str; SALES_COLUMN_COUNT] =
    ["MOIS", "M-1", "M-2", "M-3", "M-4", "M-5", "M-6"];

/// Ordered sales-column labels for one report. Slot 0 is the current month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct ColumnSchema {
    #[schemars(
        description = "Exactly seven labels: the current month (NN/NN) followed by M-1 to M-6"
    )]
    labels: [String; SALES_COLUMN_COUNT],
}

impl ColumnSchema {
    pub fn new(labels: [String; SALES_COLUMN_COUNT]) -> Self {
        Self { labels }
    }

    /// `[MOIS, M-1, ..., M-6]`, used when the report header cannot be trusted.
    pub fn canonical() -> Self {
        Self::new(CANONICAL_LABELS.map(String::from))
    }

    /// `[month, M-1, ..., M-6]`.
    pub fn from_current_month(month: &str) -> Self {
        let mut labels = CANONICAL_LABELS.map(String::from);
        labels[0] = month.to_string();
        Self::new(labels)
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn current_month(&self) -> &str {
        &self.labels[0]
    }

    pub fn has_month_label(&self) -> bool {
        is_month_label(self.current_month())
    }

    pub fn contains(&self, label: &str) -> bool {
        self.position(label).is_some()
    }

    pub fn position(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|l| l == label)
    }

    /// Maps every label to the first day of the month it stands for.
    ///
    /// Only possible when slot 0 is a real `MM/YY` label; `M-k` resolves to
    /// `k` months before it. Returns `None` for the canonical `MOIS` schema
    /// or when any label is neither an offset nor a month.
    pub fn resolve_months(&self) -> Option<Vec<NaiveDate>> {
        let current = parse_month_label(self.current_month())?;

        self.labels
            .iter()
            .map(|label| {
                if let Some(offset) = offset_label_months(label) {
                    months_before(current, offset)
                } else {
                    parse_month_label(label)
                }
            })
            .collect()
    }
}

impl Default for ColumnSchema {
    fn default() -> Self {
        Self::canonical()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SalesEntry {
    pub label: String,
    pub value: u64,
}

/// Sales values keyed by schema label, kept in schema order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct SalesByColumn(Vec<SalesEntry>);

impl SalesByColumn {
    /// Binds `values[i]` to `schema.labels()[i]`.
    pub fn bind(schema: &ColumnSchema, values: [u64; SALES_COLUMN_COUNT]) -> Self {
        Self(
            schema
                .labels()
                .iter()
                .zip(values)
                .map(|(label, value)| SalesEntry {
                    label: label.clone(),
                    value,
                })
                .collect(),
        )
    }

    pub fn get(&self, label: &str) -> Option<u64> {
        self.0.iter().find(|e| e.label == label).map(|e| e.value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SalesEntry> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum over the given labels; labels not present count as zero.
    pub fn total(&self, labels: &[String]) -> u64 {
        labels.iter().filter_map(|l| self.get(l)).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ParsedRecord {
    #[schemars(description = "Region active when the product row was read")]
    pub region: String,

    pub product_code: String,

    pub product_name: String,

    #[schemars(description = "Stock on hand; absent when the report leaves the column blank")]
    pub stock: Option<u64>,

    #[schemars(description = "Credit reserve (CR) figure")]
    pub credit_reserve: u64,

    pub sales: SalesByColumn,
}

/// Records in document order together with the schema their sales are keyed by.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ParsedTable {
    pub schema: ColumnSchema,
    pub records: Vec<ParsedRecord>,
}

impl ParsedTable {
    pub fn new(schema: ColumnSchema) -> Self {
        Self {
            schema,
            records: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParsedRecord> {
        self.records.iter()
    }

    pub fn sales_columns(&self) -> Vec<String> {
        self.schema.labels().to_vec()
    }

    /// Distinct region names in first-seen order.
    pub fn regions(&self) -> Vec<String> {
        let mut regions: Vec<String> = Vec::new();
        for record in &self.records {
            if !regions.contains(&record.region) {
                regions.push(record.region.clone());
            }
        }
        regions
    }

    /// Distinct product names, sorted.
    pub fn product_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.records.iter().map(|r| r.product_name.clone()).collect();
        names.sort();
        names.dedup();
        names
    }

    pub fn exclude_products(&self, products: &[String]) -> Self {
        self.retain(|r| !products.contains(&r.product_name))
    }

    pub fn filter_regions(&self, regions: &[String]) -> Self {
        self.retain(|r| regions.contains(&r.region))
    }

    /// Case-insensitive substring match on the product name.
    pub fn search_products(&self, needle: &str) -> Self {
        let needle = needle.to_lowercase();
        self.retain(|r| r.product_name.to_lowercase().contains(&needle))
    }

    fn retain(&self, keep: impl Fn(&ParsedRecord) -> bool) -> Self {
        Self {
            schema: self.schema.clone(),
            records: self.records.iter().filter(|r| keep(r)).cloned().collect(),
        }
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(ParsedTable)
    }
}
