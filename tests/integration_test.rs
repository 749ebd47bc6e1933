//! 集成測試

use rust_decimal::Decimal;
use shipopt::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const COSTS: &str = "\
product,plant,DC_1,DC_2
nail_1,plant_1,2,5
nail_1,plant_2,4,3
screw_2,plant_1,1,1
screw_2,plant_2,1,1
bolt_3,plant_1,2,2
bolt_3,plant_2,2,2
bolt_3,plant_3,2,2
";

// bolt_3 有 plant_3 的路線成本但沒有 plant_3 的供應
const SUPPLY: &str = "\
product,plant_1,plant_2,plant_3
nail_1,10,10,
screw_2,2,3,
bolt_3,10,10,
";

// nail_1 的 7.5 向上取整為 8；screw_2 供應 5 < 需求 8
const DEMAND: &str = "\
product,DC_1,DC_2
nail_1,7.5,8
screw_2,4,4
bolt_3,1,1
";

fn write_catalog(root: &Path, config: &RunConfig, costs: &str, supply: &str, demand: &str) {
    let dir = root.join(&config.catalog_name).join(&config.db_name);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(format!("{}.csv", config.tables.transport_cost)), costs).unwrap();
    fs::write(dir.join(format!("{}.csv", config.tables.plant_supply)), supply).unwrap();
    fs::write(dir.join(format!("{}.csv", config.tables.product_demand)), demand).unwrap();
}

fn setup() -> (TempDir, RunConfig, CsvCatalog) {
    logging::init_test();
    let dir = tempfile::tempdir().unwrap();
    let config = RunConfig::default();
    write_catalog(dir.path(), &config, COSTS, SUPPLY, DEMAND);
    let catalog = CsvCatalog::new(dir.path());
    (dir, config, catalog)
}

#[test]
fn test_mixed_batch_end_to_end() {
    let (_dir, config, catalog) = setup();

    let summary = run_pipeline(&config, &catalog).unwrap();

    assert_eq!(summary.product_count, 3);
    assert_eq!(summary.optimal_count, 1);
    assert_eq!(summary.failed_count, 2);
    assert_eq!(summary.infeasible_count, 1);
    assert_eq!(summary.rows_written, 4);
    assert_eq!(summary.total_cost, Decimal::from(40));

    let rows = catalog.sink(&config).unwrap().read_all().unwrap();
    assert_eq!(
        rows,
        vec![
            ShipmentAllocation::sentinel("bolt_3"),
            ShipmentAllocation::shipped("nail_1", "plant_1", "DC_1", 8),
            ShipmentAllocation::shipped("nail_1", "plant_2", "DC_2", 8),
            ShipmentAllocation::sentinel("screw_2"),
        ]
    );
}

#[test]
fn test_every_product_has_rows() {
    let (_dir, config, catalog) = setup();
    run_pipeline(&config, &catalog).unwrap();

    let rows = catalog.sink(&config).unwrap().read_all().unwrap();
    for product in ["nail_1", "screw_2", "bolt_3"] {
        let product_rows: Vec<_> = rows.iter().filter(|r| r.product == product).collect();
        assert!(!product_rows.is_empty(), "{product} 沒有輸出列");

        // 佔位列只會單獨出現
        if product_rows.iter().any(|r| r.is_sentinel()) {
            assert_eq!(product_rows.len(), 1);
        }
    }
}

#[test]
fn test_rerun_produces_identical_table() {
    let (_dir, config, catalog) = setup();
    let path = catalog.sink(&config).unwrap().path().to_path_buf();

    let first_summary = run_pipeline(&config, &catalog).unwrap();
    let first = fs::read(&path).unwrap();

    let second_summary = run_pipeline(&config, &catalog).unwrap();
    let second = fs::read(&path).unwrap();

    assert_eq!(first, second);
    assert_ne!(first_summary.run_id, second_summary.run_id);
}

#[test]
fn test_cancelled_run_writes_nothing() {
    let (_dir, config, catalog) = setup();
    let cancel = CancelFlag::new();
    cancel.cancel();

    let result = run_pipeline_with_cancel(&config, &catalog, cancel);

    assert_eq!(result.unwrap_err(), ShipError::Cancelled);
    assert!(!catalog.sink(&config).unwrap().path().exists());
}

#[test]
fn test_custom_tables_from_json_config() {
    logging::init_test();
    let dir = tempfile::tempdir().unwrap();
    let config = RunConfig::from_json_str(
        r#"{
            "catalog_name": "staging",
            "db_name": "forecast_v2",
            "tables": {
                "transport_cost": "costs",
                "plant_supply": "supply",
                "product_demand": "demand",
                "shipment_recommendations": "plan"
            },
            "schedule": { "max_workers": 2, "solve_timeout_ms": 30000 }
        }"#,
    )
    .unwrap();
    write_catalog(dir.path(), &config, COSTS, SUPPLY, DEMAND);
    let catalog = CsvCatalog::new(dir.path());

    let summary = run_pipeline(&config, &catalog).unwrap();

    assert_eq!(summary.rows_written, 4);
    assert!(dir.path().join("staging/forecast_v2/plan.csv").exists());
}

#[test]
fn test_missing_input_table_fails_before_writing() {
    logging::init_test();
    let dir = tempfile::tempdir().unwrap();
    let config = RunConfig::default();
    let db_dir = dir.path().join("main/supply_chain_db");
    fs::create_dir_all(&db_dir).unwrap();
    fs::write(db_dir.join("transport_cost.csv"), COSTS).unwrap();
    let catalog = CsvCatalog::new(dir.path());

    let err = run_pipeline(&config, &catalog).unwrap_err();

    assert!(matches!(err, ShipError::Io(_)));
    assert!(!db_dir.join("shipment_recommendations.csv").exists());
}

#[test]
fn test_run_with_memory_sink() {
    logging::init_test();
    let config = RunConfig::default();
    let inputs = InputTables {
        costs: vec![
            CostEntry::new("widget", "plant_a", "dc_x", Decimal::new(15, 1)),
            CostEntry::new("widget", "plant_b", "dc_x", Decimal::from(1)),
        ],
        supplies: vec![
            SupplyEntry::new("widget", "plant_a", 10),
            SupplyEntry::new("widget", "plant_b", 4),
        ],
        demands: vec![DemandEntry::new("widget", "dc_x", Decimal::from(6))],
    };
    let sink = MemorySink::new();

    let summary = run_with_sink(&config, inputs, &sink, CancelFlag::new()).unwrap();

    // plant_b 較便宜，先用滿 4，其餘 2 由 plant_a 補
    assert_eq!(summary.total_cost, Decimal::from(7));
    assert_eq!(
        sink.rows(),
        vec![
            ShipmentAllocation::shipped("widget", "plant_a", "dc_x", 2),
            ShipmentAllocation::shipped("widget", "plant_b", "dc_x", 4),
        ]
    );
    assert_eq!(sink.write_count(), 1);
}

#[test]
fn test_product_missing_from_demand_is_isolated() {
    logging::init_test();
    let dir = tempfile::tempdir().unwrap();
    let config = RunConfig::default();
    let costs = "product,plant,DC_1\nnail_1,plant_1,1\norphan,plant_1,1\n";
    let supply = "product,plant_1\nnail_1,5\norphan,5\n";
    let demand = "product,DC_1\nnail_1,5\n";
    write_catalog(dir.path(), &config, costs, supply, demand);
    let catalog = CsvCatalog::new(dir.path());

    let summary = run_pipeline(&config, &catalog).unwrap();

    assert_eq!(summary.optimal_count, 1);
    assert_eq!(summary.failed_count, 1);
    let rows = catalog.sink(&config).unwrap().read_all().unwrap();
    assert_eq!(
        rows,
        vec![
            ShipmentAllocation::shipped("nail_1", "plant_1", "DC_1", 5),
            ShipmentAllocation::sentinel("orphan"),
        ]
    );
}
