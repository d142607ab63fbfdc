use crate::allocator::AllocationShape;
use crate::communes::WeightConvention;
use crate::decoding::TextEncoding;
use crate::error::{RepartitionError, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ReportConfig {
    #[schemars(description = "Encodings tried in order when decoding the raw report")]
    pub encodings: Vec<TextEncoding>,

    #[schemars(
        description = "Sales column to distribute across communes. Defaults to the report's current month (first schema label)."
    )]
    pub sales_column: Option<String>,

    #[schemars(description = "Output shape of the commune repartition")]
    pub shape: AllocationShape,

    #[schemars(description = "Product names removed before repartition")]
    pub excluded_products: Vec<String>,

    #[schemars(description = "How the commune weights are expressed")]
    pub weight_convention: WeightConvention,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            encodings: TextEncoding::DEFAULT_CANDIDATES.to_vec(),
            sales_column: None,
            shape: AllocationShape::Long,
            excluded_products: Vec::new(),
            weight_convention: WeightConvention::Fraction,
        }
    }
}

impl ReportConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<()> {
        if self.encodings.is_empty() {
            return Err(RepartitionError::InvalidConfig(
                "at least one candidate encoding is required".to_string(),
            ));
        }
        if let Some(column) = &self.sales_column {
            if column.trim().is_empty() {
                return Err(RepartitionError::InvalidConfig(
                    "sales_column must not be blank".to_string(),
                ));
            }
        }
        Ok(())
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(ReportConfig)
    }
}
