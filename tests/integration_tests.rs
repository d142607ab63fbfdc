use sales_repartition_builder::*;

const UBIPHARM_REPORT: &str = "\
UBIPHARM MALI                                     Edition du 02/12/25
ETAT DES VENTES PAR REGION
------------------------------------------------------------------------
Code    Désignation                 Stocks / CR 11/25 M-1 M-2 M-3 M-4 M-5 M-6
------------------------------------------------------------------------
Pays : MALI           Région 1/B  BAMAKO
   P001 PARACETAMOL 500MG CP B/100   120 / 4   10   20   30   40   50   60   70
   P002 AMOXICILLINE 1G SACHET        / 2    5    6    7    8    9   10   11
   A17  SRO ZINC PEDIATRIQUE   35 / 0    0    1    0    2    0    3    0
        Sous-total                          15   27   37   50   59   73   81
Pays : MALI           Région 2/K  KAYES
   P001 PARACETAMOL 500MG CP B/100    40 / 1    8    8    8    8    8    8    8
Pays : MALI           Région 5/M  MOPTI
   P002 AMOXICILLINE 1G SACHET        12 / 3    2    4    6    8   10   12   14
------------------------------------------------------------------------
";

fn weights() -> RegionCommuneMap {
    RegionCommuneMap::from_json_str(
        r#"{
            "BAMAKO": [
                {"commune": "Commune 1", "weight": 0.10},
                {"commune": "Commune 2", "weight": 0.25},
                {"commune": "Commune 3", "weight": 0.15},
                {"commune": "Commune 4", "weight": 0.20},
                {"commune": "Commune 5", "weight": 0.18},
                {"commune": "Commune 6", "weight": 0.12}
            ],
            "KAYES": [
                {"commune": "Kayes Ville", "weight": 0.7},
                {"commune": "Kita", "weight": 0.3}
            ]
        }"#,
    )
    .unwrap()
}

fn labels(schema: &ColumnSchema) -> Vec<&str> {
    schema.labels().iter().map(String::as_str).collect()
}

#[test]
fn test_parse_full_report() {
    let table = parse_report(UBIPHARM_REPORT);

    // Two extra leading tokens on the header line force the month-based rebuild
    assert_eq!(
        labels(&table.schema),
        vec!["11/25", "M-1", "M-2", "M-3", "M-4", "M-5", "M-6"]
    );

    assert_eq!(table.len(), 5);
    assert_eq!(table.regions(), vec!["BAMAKO", "KAYES", "MOPTI"]);

    let first = &table.records[0];
    assert_eq!(first.product_code, "P001");
    assert_eq!(first.product_name, "PARACETAMOL 500MG CP B/100");
    assert_eq!(first.stock, Some(120));
    assert_eq!(first.credit_reserve, 4);
    assert_eq!(first.sales.get("11/25"), Some(10));
    assert_eq!(first.sales.get("M-6"), Some(70));

    let amox = &table.records[1];
    assert_eq!(amox.product_name, "AMOXICILLINE 1G SACHET");
    assert_eq!(amox.stock, None);
    assert_eq!(amox.credit_reserve, 2);

    assert_eq!(table.records[2].product_code, "A17");

    for record in table.iter() {
        assert_eq!(record.sales.len(), SALES_COLUMN_COUNT);
        let bound: Vec<&str> = record.sales.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(bound, labels(&table.schema));
    }
}

#[test]
fn test_document_without_region_yields_nothing() {
    let text: String = UBIPHARM_REPORT
        .lines()
        .filter(|l| !l.contains("Pays"))
        .collect::<Vec<_>>()
        .join("\n");
    assert!(parse_report(&text).is_empty());
}

#[test]
fn test_exact_header_tokens_returned_unchanged() {
    let text = "Stocks / CR 03/26 FEV JAN DEC NOV OCT SEP";
    let schema = extract_schema(text);
    assert_eq!(
        labels(&schema),
        vec!["03/26", "FEV", "JAN", "DEC", "NOV", "OCT", "SEP"]
    );
}

#[test]
fn test_malformed_header_falls_back_to_canonical() {
    for line in ["Stocks / CR", "Stocks / CR ventes", "Stocks / CR a b c d e f g h"] {
        assert_eq!(extract_schema(line), ColumnSchema::canonical());
    }
}

#[test]
fn test_long_sums_match_weighted_totals() {
    let table = parse_report(UBIPHARM_REPORT);
    let weights = weights();
    let result = allocate(&table, &weights, "11/25", AllocationShape::Long).unwrap();

    for record in table.iter() {
        let commune_sum: f64 = result
            .to_long()
            .iter()
            .filter(|r| r.region == record.region && r.product == record.product_name)
            .map(|r| r.value)
            .sum();

        match weights.weight_total(&record.region) {
            Some(total) => {
                let expected = record.sales.get("11/25").unwrap() as f64 * total;
                assert!(
                    (commune_sum - expected).abs() < 1e-9,
                    "{} / {}: {} != {}",
                    record.region,
                    record.product_name,
                    commune_sum,
                    expected
                );
            }
            None => assert_eq!(commune_sum, 0.0),
        }
    }
}

#[test]
fn test_unconfigured_region_absent_from_both_shapes() {
    let table = parse_report(UBIPHARM_REPORT);
    for shape in [AllocationShape::Long, AllocationShape::Wide] {
        let result = allocate(&table, &weights(), "M-1", shape).unwrap();
        assert!(result.to_long().iter().all(|r| r.region != "MOPTI"));
    }

    let wide = allocate(&table, &weights(), "M-1", AllocationShape::Wide).unwrap();
    assert_eq!(wide.len(), 4);
}

#[test]
fn test_wide_and_long_agree() {
    let table = parse_report(UBIPHARM_REPORT);
    let long = allocate(&table, &weights(), "M-3", AllocationShape::Long).unwrap();
    let wide = allocate(&table, &weights(), "M-3", AllocationShape::Wide).unwrap();

    let RepartitionRows::Wide(wide_rows) = &wide.rows else {
        panic!("expected wide rows");
    };
    let long_rows = long.to_long();

    let mut idx = 0;
    for row in wide_rows {
        for cell in &row.communes {
            let long_row = &long_rows[idx];
            assert_eq!(long_row.region, row.region);
            assert_eq!(long_row.product, row.product);
            assert_eq!(long_row.commune, cell.commune);
            assert_eq!(long_row.value, cell.value);
            idx += 1;
        }
    }
    assert_eq!(idx, long_rows.len());
}

#[test]
fn test_pipeline_exports() {
    let config = ReportConfig {
        shape: AllocationShape::Wide,
        excluded_products: vec!["SRO ZINC PEDIATRIQUE".to_string()],
        ..ReportConfig::default()
    };
    let report = process_report(UBIPHARM_REPORT.as_bytes(), &config, &weights()).unwrap();
    assert_eq!(report.table.len(), 4);

    let mut out = Vec::new();
    write_repartition_csv(&report.repartition, &mut out).unwrap();
    let csv = String::from_utf8(out).unwrap();
    let header: Vec<&str> = csv.lines().next().unwrap().split(',').collect();

    let parsed_headers = ["Région", "Nom Produit", "11/25", "M-1"];
    let month = detect_month_column(&parsed_headers).unwrap();
    let communes = detect_commune_columns(&header, month);
    assert_eq!(communes.len(), 8);
    assert_eq!(communes[0], "11/25 Commune 1");

    let sheets = split_by_region(&report.table, &report.table.sales_columns()).unwrap();
    let names: Vec<&str> = sheets.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["BAMAKO", "KAYES", "MOPTI"]);
}

#[test]
fn test_summary_over_parsed_report() {
    let table = parse_report(UBIPHARM_REPORT);
    let current = vec![table.schema.current_month().to_string()];

    let summary = SalesSummary::compute(&table, &current);
    assert_eq!(summary.total_sales, 10 + 5 + 8 + 2);
    assert_eq!(summary.product_count, 3);
    assert_eq!(summary.region_count, 3);
    assert_eq!(summary.stock_total, 120 + 35 + 40 + 12);
    assert_eq!(summary.credit_reserve_total, 4 + 2 + 1 + 3);

    let ranking = region_ranking(&table, &current);
    assert_eq!(ranking[0].name, "BAMAKO");
    assert_eq!(ranking[0].total, 15);

    let top = top_products(&table, &current, 1);
    assert_eq!(top[0].name, "PARACETAMOL 500MG CP B/100");
    assert_eq!(top[0].total, 18);
}

#[test]
fn test_resolved_months() {
    let table = parse_report(UBIPHARM_REPORT);
    let months = table.schema.resolve_months().unwrap();
    assert_eq!(utils::format_month_label(months[0]), "11/25");
    assert_eq!(utils::format_month_label(months[6]), "05/25");
}
