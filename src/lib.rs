//! # Sales Repartition Builder
//!
//! A library for turning a wholesaler's plain-text distribution report into a
//! normalized record set, then redistributing each region's sales across its
//! communes.
//!
//! ## Core Concepts
//!
//! - **Schema line**: the `Stocks / CR` header naming the seven sales columns
//!   (current month `NN/NN`, then `M-1` to `M-6`). Extraction never fails; a
//!   drifting header is repaired or replaced with `MOIS, M-1..M-6`.
//! - **Records**: one per indented product row under a `Pays ... Région` header,
//!   with stock, credit reserve (CR) and the seven sales figures bound to the schema.
//! - **Repartition**: one sales column multiplied by each commune's weight for the
//!   record's region, in long (one row per commune) or wide (one column per
//!   commune) shape. Regions without configured communes are left out.
//!
//! ## Example
//!
//! ```rust,ignore
//! use sales_repartition_builder::*;
//!
//! let weights = RegionCommuneMap::new().with_region(
//!     "BAMAKO",
//!     vec![CommuneShare::new("A", 0.6), CommuneShare::new("B", 0.4)],
//! );
//!
//! let bytes = std::fs::read("ventes.txt")?;
//! let report = process_report(&bytes, &ReportConfig::default(), &weights)?;
//! println!("{} records, {} commune rows", report.table.len(), report.repartition.len());
//! ```

pub mod allocator;
pub mod analysis;
pub mod communes;
pub mod config;
pub mod decoding;
pub mod error;
pub mod export;
pub mod header;
pub mod parser;
pub mod schema;
pub mod utils;

pub use allocator::{
    allocate, AllocationShape, CommuneAllocator, CommuneRow, CommuneValue, RepartitionResult,
    RepartitionRows, WideRow,
};
pub use analysis::*;
pub use communes::{CommuneShare, RegionCommuneMap, WeightConvention};
pub use config::ReportConfig;
pub use decoding::{decode_report, TextEncoding};
pub use error::{RepartitionError, Result};
pub use export::{
    sheet_names, split_by_region, write_repartition_csv, write_table_csv, RegionSheet,
};
pub use header::{extract_schema, resolve_schema, SchemaRepair};
pub use parser::{parse_report, ReportParser};
pub use schema::*;

use log::{debug, info};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedReport {
    /// Parsed records after product exclusion.
    pub table: ParsedTable,
    pub repartition: RepartitionResult,
}

pub struct ReportProcessor {
    parser: ReportParser,
}

impl Default for ReportProcessor {
    fn default() -> Self {
        Self::new(ReportParser::new())
    }
}

impl ReportProcessor {
    pub fn new(parser: ReportParser) -> Self {
        Self { parser }
    }

    /// Decode, parse, drop excluded products, then distribute the configured
    /// sales column across communes.
    ///
    /// An empty parse is reported as [`RepartitionError::NoData`] so callers
    /// stop before any step that assumes rows exist.
    pub fn process(
        &self,
        bytes: &[u8],
        config: &ReportConfig,
        weights: &RegionCommuneMap,
    ) -> Result<ProcessedReport> {
        config.validate()?;

        let text = decode_report(bytes, &config.encodings)?;
        let parsed = self.parser.parse(&text);

        info!(
            "Parsed {} record(s) across {} region(s), schema {:?}",
            parsed.len(),
            parsed.regions().len(),
            parsed.schema.labels()
        );

        if parsed.is_empty() {
            return Err(RepartitionError::NoData);
        }

        let table = if config.excluded_products.is_empty() {
            parsed
        } else {
            let filtered = parsed.exclude_products(&config.excluded_products);
            debug!(
                "Excluded {} record(s) for {} product(s)",
                parsed.len() - filtered.len(),
                config.excluded_products.len()
            );
            filtered
        };

        let column = config
            .sales_column
            .clone()
            .unwrap_or_else(|| table.schema.current_month().to_string());

        let weights = weights.to_fractions(config.weight_convention);
        let repartition = allocate(&table, &weights, &column, config.shape)?;

        info!(
            "Distributed column '{}' into {} {:?} row(s)",
            column,
            repartition.len(),
            repartition.shape()
        );

        Ok(ProcessedReport { table, repartition })
    }
}

pub fn process_report(
    bytes: &[u8],
    config: &ReportConfig,
    weights: &RegionCommuneMap,
) -> Result<ProcessedReport> {
    ReportProcessor::default().process(bytes, config, weights)
}
