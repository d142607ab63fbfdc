use crate::allocator::RepartitionResult;
use crate::schema::ParsedTable;
use crate::utils::is_month_label;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesSummary {
    pub total_sales: u64,
    pub product_count: usize,
    pub region_count: usize,
    pub stock_total: u64,
    pub credit_reserve_total: u64,
}

impl SalesSummary {
    pub fn compute(table: &ParsedTable, columns: &[String]) -> Self {
        let products: BTreeSet<&str> = table.iter().map(|r| r.product_name.as_str()).collect();
        let regions: BTreeSet<&str> = table.iter().map(|r| r.region.as_str()).collect();

        Self {
            total_sales: table.iter().map(|r| r.sales.total(columns)).sum(),
            product_count: products.len(),
            region_count: regions.len(),
            stock_total: table.iter().filter_map(|r| r.stock).sum(),
            credit_reserve_total: table.iter().map(|r| r.credit_reserve).sum(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedTotal {
    pub name: String,
    pub total: u64,
}

/// Sorts descending by total; equal totals keep name order.
fn ranked(totals: BTreeMap<String, u64>) -> Vec<RankedTotal> {
    let mut ranked: Vec<RankedTotal> = totals
        .into_iter()
        .map(|(name, total)| RankedTotal { name, total })
        .collect();
    ranked.sort_by(|a, b| b.total.cmp(&a.total));
    ranked
}

fn product_totals(table: &ParsedTable, columns: &[String]) -> BTreeMap<String, u64> {
    let mut totals = BTreeMap::new();
    for record in table.iter() {
        *totals.entry(record.product_name.clone()).or_insert(0) += record.sales.total(columns);
    }
    totals
}

pub fn region_ranking(table: &ParsedTable, columns: &[String]) -> Vec<RankedTotal> {
    let mut totals = BTreeMap::new();
    for record in table.iter() {
        *totals.entry(record.region.clone()).or_insert(0) += record.sales.total(columns);
    }
    ranked(totals)
}

pub fn top_products(table: &ParsedTable, columns: &[String], n: usize) -> Vec<RankedTotal> {
    let mut ranked = ranked(product_totals(table, columns));
    ranked.truncate(n);
    ranked
}

/// Products whose total over `columns` is at most `threshold`, in name order.
pub fn low_consumption_products(
    table: &ParsedTable,
    columns: &[String],
    threshold: u64,
) -> Vec<RankedTotal> {
    product_totals(table, columns)
        .into_iter()
        .filter(|(_, total)| *total <= threshold)
        .map(|(name, total)| RankedTotal { name, total })
        .collect()
}

/// Sum of values per commune, in first-seen order.
pub fn commune_totals(result: &RepartitionResult) -> Vec<(String, f64)> {
    let mut totals: Vec<(String, f64)> = Vec::new();
    for row in result.to_long() {
        match totals.iter().position(|(commune, _)| *commune == row.commune) {
            Some(idx) => totals[idx].1 += row.value,
            None => totals.push((row.commune, row.value)),
        }
    }
    totals
}

/// First header that is a current-month label (`NN/NN`).
pub fn detect_month_column<S: AsRef<str>>(headers: &[S]) -> Option<&str> {
    headers
        .iter()
        .map(|h| h.as_ref().trim())
        .find(|h| is_month_label(h))
}

/// Headers of the form `<month> <commune>` produced by a wide repartition export.
pub fn detect_commune_columns<'h, S: AsRef<str>>(headers: &'h [S], month: &str) -> Vec<&'h str> {
    headers
        .iter()
        .map(|h| h.as_ref())
        .filter(|h| {
            h.strip_prefix(month)
                .is_some_and(|rest| rest.starts_with(char::is_whitespace) && !rest.trim().is_empty())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocator::{allocate, AllocationShape};
    use crate::communes::{CommuneShare, RegionCommuneMap};
    use crate::schema::{ColumnSchema, ParsedRecord, SalesByColumn};

    fn table() -> ParsedTable {
        let schema = ColumnSchema::from_current_month("11/25");
        let mut table = ParsedTable::new(schema.clone());
        let rows = [
            ("BAMAKO", "PARACETAMOL", Some(100), 5, 10),
            ("KAYES", "PARACETAMOL", None, 1, 40),
            ("BAMAKO", "IBUPROFENE", Some(7), 2, 3),
            ("SEGOU", "ZINC", Some(3), 0, 8),
        ];
        for (region, name, stock, cr, first) in rows {
            table.records.push(ParsedRecord {
                region: region.to_string(),
                product_code: "P".to_string(),
                product_name: name.to_string(),
                stock,
                credit_reserve: cr,
                sales: SalesByColumn::bind(&schema, [first, 1, 1, 1, 1, 1, 1]),
            });
        }
        table
    }

    fn current() -> Vec<String> {
        vec!["11/25".to_string()]
    }

    #[test]
    fn test_summary() {
        let summary = SalesSummary::compute(&table(), &current());
        assert_eq!(summary.total_sales, 61);
        assert_eq!(summary.product_count, 3);
        assert_eq!(summary.region_count, 3);
        assert_eq!(summary.stock_total, 110);
        assert_eq!(summary.credit_reserve_total, 8);

        let all = table().sales_columns();
        assert_eq!(SalesSummary::compute(&table(), &all).total_sales, 61 + 4 * 6);
    }

    #[test]
    fn test_region_ranking() {
        let ranking = region_ranking(&table(), &current());
        let names: Vec<&str> = ranking.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["KAYES", "BAMAKO", "SEGOU"]);
        assert_eq!(ranking[1].total, 13);
    }

    #[test]
    fn test_top_and_low_products() {
        let top = top_products(&table(), &current(), 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].name, "PARACETAMOL");
        assert_eq!(top[0].total, 50);
        assert_eq!(top[1].name, "ZINC");

        let low = low_consumption_products(&table(), &current(), 8);
        let names: Vec<&str> = low.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["IBUPROFENE", "ZINC"]);
    }

    #[test]
    fn test_commune_totals() {
        let weights = RegionCommuneMap::new().with_region(
            "BAMAKO",
            vec![CommuneShare::new("A", 0.5), CommuneShare::new("B", 0.5)],
        );
        let result = allocate(&table(), &weights, "11/25", AllocationShape::Wide).unwrap();
        let totals = commune_totals(&result);
        assert_eq!(totals.len(), 2);
        assert_eq!(totals[0].0, "A");
        assert!((totals[0].1 - 6.5).abs() < 1e-9);
    }

    #[test]
    fn test_detect_export_columns() {
        let headers = [
            "Region",
            "Product",
            " 11/25 ",
            "11/25 Commune 1",
            "11/25 Commune 2",
            "11/25",
            "M-1",
        ];
        let month = detect_month_column(&headers).unwrap();
        assert_eq!(month, "11/25");
        assert_eq!(
            detect_commune_columns(&headers, month),
            vec!["11/25 Commune 1", "11/25 Commune 2"]
        );

        assert!(detect_month_column(&["Region", "MOIS"]).is_none());
    }
}
