use crate::allocator::{RepartitionResult, RepartitionRows};
use crate::error::Result;
use crate::schema::ParsedTable;
use log::debug;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::io::Write;

/// Spreadsheet applications reject longer sheet names.
pub const SHEET_NAME_LIMIT: usize = 31;

pub const TABLE_FIXED_HEADERS: [&str; 5] = ["Région", "Code Produit", "Nom Produit", "Stock", "CR"];

/// Writes the parsed table as CSV: fixed identity columns, then `columns` in the given order.
pub fn write_table_csv<W: Write>(table: &ParsedTable, columns: &[String], writer: W) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);

    let mut header: Vec<&str> = TABLE_FIXED_HEADERS.to_vec();
    header.extend(columns.iter().map(String::as_str));
    csv.write_record(&header)?;

    for record in table.iter() {
        let mut row = vec![
            record.region.clone(),
            record.product_code.clone(),
            record.product_name.clone(),
            record.stock.map(|s| s.to_string()).unwrap_or_default(),
            record.credit_reserve.to_string(),
        ];
        row.extend(columns.iter().map(|c| {
            record
                .sales
                .get(c)
                .map(|v| v.to_string())
                .unwrap_or_default()
        }));
        csv.write_record(&row)?;
    }

    csv.flush()?;
    Ok(())
}

/// Long results get `Region, Product, Commune, Value`; wide results get
/// `Region, Product` followed by one `<column> <commune>` column per commune.
pub fn write_repartition_csv<W: Write>(result: &RepartitionResult, writer: W) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);

    match &result.rows {
        RepartitionRows::Long(rows) => {
            if rows.is_empty() {
                csv.write_record(["Region", "Product", "Commune", "Value"])?;
            }
            for row in rows {
                csv.serialize(row)?;
            }
        }
        RepartitionRows::Wide(rows) => {
            let communes = result.commune_names();

            let mut header = vec!["Region".to_string(), "Product".to_string()];
            header.extend(communes.iter().map(|c| format!("{} {}", result.column, c)));
            csv.write_record(&header)?;

            for row in rows {
                let mut cells = vec![row.region.clone(), row.product.clone()];
                cells.extend(
                    communes
                        .iter()
                        .map(|c| row.get(c).map(|v| v.to_string()).unwrap_or_default()),
                );
                csv.write_record(&cells)?;
            }
        }
    }

    csv.flush()?;
    Ok(())
}

fn truncate_chars(name: &str, limit: usize) -> String {
    name.chars().take(limit).collect()
}

/// One sheet name per region, in order.
///
/// Names are cut to [`SHEET_NAME_LIMIT`] characters. When a cut name was
/// already used, `_n` is appended (n being how many times it has been seen)
/// and the stem is shortened so the result still fits.
pub fn sheet_names<'a, I>(regions: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut names = Vec::new();

    for region in regions {
        let base = truncate_chars(region, SHEET_NAME_LIMIT);
        let count = seen.entry(base.clone()).or_insert(0);
        *count += 1;

        if *count == 1 {
            names.push(base);
        } else {
            let suffix = format!("_{}", count);
            let stem = truncate_chars(&base, SHEET_NAME_LIMIT - suffix.chars().count());
            names.push(format!("{}{}", stem, suffix));
        }
    }

    names
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegionSheet {
    pub name: String,
    pub region: String,
    pub csv: Vec<u8>,
}

/// Splits the table into one CSV sheet per region, regions in name order.
pub fn split_by_region(table: &ParsedTable, columns: &[String]) -> Result<Vec<RegionSheet>> {
    let regions: BTreeSet<&str> = table.iter().map(|r| r.region.as_str()).collect();
    let names = sheet_names(regions.iter().copied());

    let mut sheets = Vec::with_capacity(regions.len());
    for (region, name) in regions.into_iter().zip(names) {
        let subset = table.filter_regions(&[region.to_string()]);
        let mut buffer = Vec::new();
        write_table_csv(&subset, columns, &mut buffer)?;

        debug!(
            "Sheet '{}' holds {} record(s) for region '{}'",
            name,
            subset.len(),
            region
        );

        sheets.push(RegionSheet {
            name,
            region: region.to_string(),
            csv: buffer,
        });
    }

    Ok(sheets)
}

pub fn to_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}
