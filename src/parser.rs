use crate::error::Result;
use crate::header::extract_schema;
use crate::schema::{ColumnSchema, ParsedRecord, ParsedTable, SalesByColumn, SALES_COLUMN_COUNT};
use crate::utils::report_lines;
use log::{debug, warn};
use regex::{Captures, Regex};

/// `Pays ... Région <n>/<code> <NAME>`; the accented letter is matched loosely.
pub const REGION_PATTERN: &str = r"Pays.*R.gion\s+\d+/\w+\s+(.*)";

/// Indented product row: code, name, optional stock, `/`, CR, then seven sales figures.
pub const PRODUCT_PATTERN: &str = concat!(
    r"^\s+([A-Z0-9]+)\s+(.+?)\s+(\d+)?\s*/\s*(\d+)\s+",
    r"(\d+)\s+(\d+)\s+(\d+)\s+(\d+)\s+(\d+)\s+(\d+)\s+(\d+)"
);

const FIRST_SALES_GROUP: usize = 5;

/// Line-oriented parser for distribution reports.
///
/// Both patterns are compiled once and reused for every line.
#[derive(Debug, Clone)]
pub struct ReportParser {
    region_re: Regex,
    product_re: Regex,
}

impl Default for ReportParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportParser {
    pub fn new() -> Self {
        Self {
            region_re: Regex::new(REGION_PATTERN).expect("region pattern compiles"),
            product_re: Regex::new(PRODUCT_PATTERN).expect("product pattern compiles"),
        }
    }

    /// Builds a parser for a report variant with different line layouts.
    ///
    /// The region pattern must capture the region name in group 1. The product
    /// pattern must capture code, name, optional stock, CR and the seven sales
    /// figures in groups 1 to 11.
    pub fn with_patterns(region_pattern: &str, product_pattern: &str) -> Result<Self> {
        Ok(Self {
            region_re: Regex::new(region_pattern)?,
            product_re: Regex::new(product_pattern)?,
        })
    }

    /// Extracts the schema from `text`, then parses every product row against it.
    pub fn parse(&self, text: &str) -> ParsedTable {
        let schema = extract_schema(text);
        self.parse_with_schema(text, schema)
    }

    pub fn parse_with_schema(&self, text: &str, schema: ColumnSchema) -> ParsedTable {
        let mut table = ParsedTable::new(schema);
        let mut region: Option<String> = None;
        let mut orphan_rows = 0usize;

        for (line_no, line) in report_lines(text).enumerate() {
            if let Some(name) = self.match_region(line) {
                if name.is_empty() {
                    debug!("Line {}: region header without a name", line_no + 1);
                    region = None;
                } else {
                    debug!("Line {}: entering region '{}'", line_no + 1, name);
                    region = Some(name);
                }
                continue;
            }

            let Some(caps) = self.product_re.captures(line) else {
                continue;
            };

            let Some(current_region) = region.as_deref() else {
                orphan_rows += 1;
                continue;
            };

            match build_record(&caps, current_region, &table.schema) {
                Some(record) => table.records.push(record),
                None => warn!(
                    "Line {}: product row dropped, sales figures do not fit the schema",
                    line_no + 1
                ),
            }
        }

        if orphan_rows > 0 {
            debug!(
                "{} product row(s) appeared before any region header and were skipped",
                orphan_rows
            );
        }

        table
    }

    fn match_region(&self, line: &str) -> Option<String> {
        self.region_re
            .captures(line)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
    }
}

fn build_record(caps: &Captures<'_>, region: &str, schema: &ColumnSchema) -> Option<ParsedRecord> {
    let number = |idx: usize| caps.get(idx).and_then(|m| m.as_str().parse::<u64>().ok());

    let sales: Vec<u64> = (FIRST_SALES_GROUP..FIRST_SALES_GROUP + SALES_COLUMN_COUNT)
        .map(number)
        .collect::<Option<Vec<_>>>()?;
    // Missing or unparsable sales groups drop the row rather than misaligning labels
    let sales: [u64; SALES_COLUMN_COUNT] = sales.try_into().ok()?;

    let stock = match caps.get(3) {
        Some(m) => Some(m.as_str().parse::<u64>().ok()?),
        None => None,
    };

    Some(ParsedRecord {
        region: region.to_string(),
        product_code: caps.get(1)?.as_str().trim().to_string(),
        product_name: caps.get(2)?.as_str().trim().to_string(),
        stock,
        credit_reserve: number(4)?,
        sales: SalesByColumn::bind(schema, sales),
    })
}

/// Parses a decoded report with the built-in patterns.
///
/// Never fails: an empty table means no data was recognised.
pub fn parse_report(text: &str) -> ParsedTable {
    ReportParser::new().parse(text)
}
