//! 資料目錄
//!
//! 以 `<root>/<catalog>/<db>/<table>.csv` 定位資料表。

use ship_core::{CostEntry, DemandEntry, RunConfig, ShipError, SupplyEntry};
use std::path::{Path, PathBuf};

use crate::sink::CsvTableSink;
use crate::table::WideTableReader;

/// 一次執行讀入的三張輸入表
#[derive(Debug, Clone, Default)]
pub struct InputTables {
    pub costs: Vec<CostEntry>,
    pub supplies: Vec<SupplyEntry>,
    pub demands: Vec<DemandEntry>,
}

/// 檔案系統上的 CSV 資料目錄
#[derive(Debug, Clone)]
pub struct CsvCatalog {
    root: PathBuf,
}

impl CsvCatalog {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// 資料表路徑
    pub fn table_path(&self, config: &RunConfig, table: &str) -> ship_core::Result<PathBuf> {
        for locator in [config.catalog_name.as_str(), config.db_name.as_str(), table] {
            validate_locator(locator)?;
        }
        Ok(self
            .root
            .join(&config.catalog_name)
            .join(&config.db_name)
            .join(format!("{table}.csv")))
    }

    /// 讀取三張輸入表
    pub fn read_inputs(&self, config: &RunConfig) -> ship_core::Result<InputTables> {
        let tables = &config.tables;

        let cost_path = self.table_path(config, &tables.transport_cost)?;
        let supply_path = self.table_path(config, &tables.plant_supply)?;
        let demand_path = self.table_path(config, &tables.product_demand)?;

        tracing::info!(
            "讀取輸入表: {}.{} ({}, {}, {})",
            config.catalog_name,
            config.db_name,
            tables.transport_cost,
            tables.plant_supply,
            tables.product_demand
        );

        Ok(InputTables {
            costs: WideTableReader::read_costs_from_path(cost_path)?,
            supplies: WideTableReader::read_supply_from_path(supply_path)?,
            demands: WideTableReader::read_demand_from_path(demand_path)?,
        })
    }

    /// 輸出表
    pub fn sink(&self, config: &RunConfig) -> ship_core::Result<CsvTableSink> {
        let path = self.table_path(config, &config.tables.shipment_recommendations)?;
        Ok(CsvTableSink::new(path))
    }
}

/// 識別字只能是單一路徑段
fn validate_locator(locator: &str) -> ship_core::Result<()> {
    let invalid = locator.trim().is_empty()
        || locator == "."
        || locator == ".."
        || locator.contains(['/', '\\'])
        || locator.contains('\0');
    if invalid {
        return Err(ShipError::Config(format!("無效的資料表識別字: {locator:?}")));
    }
    Ok(())
}
