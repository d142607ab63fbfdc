use sales_repartition_builder::{
    process_report, write_repartition_csv, CommuneShare, RegionCommuneMap, ReportConfig,
    SalesSummary,
};
use std::io::stdout;

const SAMPLE_REPORT: &str = "\
Code    Designation          Stocks / CR 11/25 M-1 M-2 M-3 M-4 M-5 M-6
Pays : MALI      Région 1/B  BAMAKO
   P001 PARACETAMOL 500MG    120 / 4   10   20   30   40   50   60   70
   P002 AMOXICILLINE 1G          / 2    5    6    7    8    9   10   11
Pays : MALI      Région 2/K  KAYES
   P001 PARACETAMOL 500MG     40 / 1    8    8    8    8    8    8    8
";

fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);

    let bytes = match args.next() {
        Some(path) => std::fs::read(path)?,
        None => SAMPLE_REPORT.as_bytes().to_vec(),
    };

    let weights = match args.next() {
        Some(path) => RegionCommuneMap::from_reader(std::fs::File::open(path)?)?,
        None => RegionCommuneMap::new()
            .with_region(
                "BAMAKO",
                vec![
                    CommuneShare::new("Commune 1", 0.4),
                    CommuneShare::new("Commune 2", 0.35),
                    CommuneShare::new("Commune 3", 0.25),
                ],
            )
            .with_region(
                "KAYES",
                vec![
                    CommuneShare::new("Kayes Ville", 0.7),
                    CommuneShare::new("Kita", 0.3),
                ],
            ),
    };
    weights.validate()?;

    let report = process_report(&bytes, &ReportConfig::default(), &weights)?;

    let summary = SalesSummary::compute(&report.table, &report.table.sales_columns());
    eprintln!(
        "{} product(s) across {} region(s), {} units sold over seven months",
        summary.product_count, summary.region_count, summary.total_sales
    );

    write_repartition_csv(&report.repartition, stdout().lock())?;

    Ok(())
}
