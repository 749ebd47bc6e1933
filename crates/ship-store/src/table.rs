//! 寬表讀取
//!
//! 上游產出的三張表都是寬格式：
//! - 運輸成本：`product, plant, <配送中心>...`
//! - 工廠供應：`product, <工廠>...`
//! - 預測需求：`product, <配送中心>...`
//!
//! 這裡依表頭位置一次轉成正規化的逐列資料，核心計算不再解析欄位名稱。
//! 空白儲存格代表沒有該項。

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use ship_core::{CostEntry, DemandEntry, ShipError, SupplyEntry};
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

/// 寬表讀取器
pub struct WideTableReader;

impl WideTableReader {
    /// 讀取運輸成本表
    pub fn read_costs<R: Read>(reader: R) -> ship_core::Result<Vec<CostEntry>> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);
        let headers = csv_reader.headers().map_err(csv_err)?.clone();
        expect_key_columns(&headers, &["product", "plant"], "transport_cost")?;

        let mut entries = Vec::new();
        for (row_idx, result) in csv_reader.records().enumerate() {
            let record = result.map_err(csv_err)?;
            let row_number = row_idx + 2; // 表頭為第 1 列
            let product = key_field(&record, 0, row_number, "transport_cost")?;
            let plant = key_field(&record, 1, row_number, "transport_cost")?;

            for (col, distribution_center) in headers.iter().enumerate().skip(2) {
                if let Some(cell) = value_field(&record, col) {
                    let unit_cost = parse_decimal(cell, row_number, distribution_center)?;
                    entries.push(CostEntry::new(
                        product.clone(),
                        plant.clone(),
                        distribution_center,
                        unit_cost,
                    ));
                }
            }
        }

        tracing::debug!("讀取運輸成本 {} 項", entries.len());
        Ok(entries)
    }

    /// 讀取工廠供應表
    pub fn read_supply<R: Read>(reader: R) -> ship_core::Result<Vec<SupplyEntry>> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);
        let headers = csv_reader.headers().map_err(csv_err)?.clone();
        expect_key_columns(&headers, &["product"], "plant_supply")?;

        let mut entries = Vec::new();
        for (row_idx, result) in csv_reader.records().enumerate() {
            let record = result.map_err(csv_err)?;
            let row_number = row_idx + 2;
            let product = key_field(&record, 0, row_number, "plant_supply")?;

            for (col, plant) in headers.iter().enumerate().skip(1) {
                if let Some(cell) = value_field(&record, col) {
                    let quantity = parse_units(cell, row_number, plant)?;
                    entries.push(SupplyEntry::new(product.clone(), plant, quantity));
                }
            }
        }

        tracing::debug!("讀取工廠供應 {} 項", entries.len());
        Ok(entries)
    }

    /// 讀取預測需求表
    pub fn read_demand<R: Read>(reader: R) -> ship_core::Result<Vec<DemandEntry>> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);
        let headers = csv_reader.headers().map_err(csv_err)?.clone();
        expect_key_columns(&headers, &["product"], "product_demand")?;

        let mut entries = Vec::new();
        for (row_idx, result) in csv_reader.records().enumerate() {
            let record = result.map_err(csv_err)?;
            let row_number = row_idx + 2;
            let product = key_field(&record, 0, row_number, "product_demand")?;

            for (col, distribution_center) in headers.iter().enumerate().skip(1) {
                if let Some(cell) = value_field(&record, col) {
                    let forecast = parse_decimal(cell, row_number, distribution_center)?;
                    entries.push(DemandEntry::new(product.clone(), distribution_center, forecast));
                }
            }
        }

        tracing::debug!("讀取預測需求 {} 項", entries.len());
        Ok(entries)
    }

    /// 從檔案讀取運輸成本表
    pub fn read_costs_from_path(path: impl AsRef<Path>) -> ship_core::Result<Vec<CostEntry>> {
        Self::read_costs(open(path.as_ref())?)
    }

    /// 從檔案讀取工廠供應表
    pub fn read_supply_from_path(path: impl AsRef<Path>) -> ship_core::Result<Vec<SupplyEntry>> {
        Self::read_supply(open(path.as_ref())?)
    }

    /// 從檔案讀取預測需求表
    pub fn read_demand_from_path(path: impl AsRef<Path>) -> ship_core::Result<Vec<DemandEntry>> {
        Self::read_demand(open(path.as_ref())?)
    }
}

fn open(path: &Path) -> ship_core::Result<std::fs::File> {
    std::fs::File::open(path)
        .map_err(|e| ShipError::Io(format!("無法開啟 {}: {}", path.display(), e)))
}

pub(crate) fn csv_err(err: csv::Error) -> ShipError {
    ShipError::Csv(err.to_string())
}

fn expect_key_columns(headers: &csv::StringRecord, keys: &[&str], table: &str) -> ship_core::Result<()> {
    for (idx, key) in keys.iter().enumerate() {
        match headers.get(idx) {
            Some(name) if name.eq_ignore_ascii_case(key) => {}
            other => {
                return Err(ShipError::Csv(format!(
                    "{table} 第 {} 欄應為 {key}，實際為 {:?}",
                    idx + 1,
                    other
                )))
            }
        }
    }
    if headers.len() <= keys.len() {
        return Err(ShipError::Csv(format!("{table} 沒有任何數值欄位")));
    }
    Ok(())
}

fn key_field(record: &csv::StringRecord, idx: usize, row: usize, table: &str) -> ship_core::Result<String> {
    match record.get(idx) {
        Some(value) if !value.is_empty() => Ok(value.to_string()),
        _ => Err(ShipError::Csv(format!("{table} 第 {row} 列缺少鍵欄位"))),
    }
}

fn value_field(record: &csv::StringRecord, idx: usize) -> Option<&str> {
    record.get(idx).filter(|value| !value.is_empty())
}

fn parse_decimal(cell: &str, row: usize, column: &str) -> ship_core::Result<Decimal> {
    Decimal::from_str(cell)
        .or_else(|_| Decimal::from_scientific(cell))
        .map_err(|_| ShipError::Csv(format!("第 {row} 列 {column} 無法解析數值: {cell}")))
}

/// 供應量必須是非負整數（允許 `10.0` 這類寫法）
fn parse_units(cell: &str, row: usize, column: &str) -> ship_core::Result<u64> {
    let value = parse_decimal(cell, row, column)?;
    if value < Decimal::ZERO || !value.fract().is_zero() {
        return Err(ShipError::Csv(format!(
            "第 {row} 列 {column} 供應量必須為非負整數: {cell}"
        )));
    }
    value
        .to_u64()
        .ok_or_else(|| ShipError::Csv(format!("第 {row} 列 {column} 供應量超出範圍: {cell}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_costs() {
        let data = "\
product,plant,Distribution_Center_1,Distribution_Center_2
nail_1,plant_1,2,5.5
nail_1,plant_2,4,
";
        let entries = WideTableReader::read_costs(data.as_bytes()).unwrap();

        assert_eq!(
            entries,
            vec![
                CostEntry::new("nail_1", "plant_1", "Distribution_Center_1", Decimal::from(2)),
                CostEntry::new("nail_1", "plant_1", "Distribution_Center_2", Decimal::new(55, 1)),
                CostEntry::new("nail_1", "plant_2", "Distribution_Center_1", Decimal::from(4)),
            ]
        );
    }

    #[test]
    fn test_read_supply() {
        let data = "product,plant_1,plant_2\nnail_1,10,10.0\nscrew_2,3,\n";
        let entries = WideTableReader::read_supply(data.as_bytes()).unwrap();

        assert_eq!(
            entries,
            vec![
                SupplyEntry::new("nail_1", "plant_1", 10),
                SupplyEntry::new("nail_1", "plant_2", 10),
                SupplyEntry::new("screw_2", "plant_1", 3),
            ]
        );
    }

    #[test]
    fn test_read_demand_keeps_fractions() {
        let data = "product,Distribution_Center_1\nnail_1,7.25\n";
        let entries = WideTableReader::read_demand(data.as_bytes()).unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].forecast, Decimal::new(725, 2));
        assert_eq!(entries[0].units(), Some(8));
    }

    #[test]
    fn test_wrong_key_column_rejected() {
        let data = "sku,plant_1\nnail_1,10\n";
        assert!(matches!(
            WideTableReader::read_supply(data.as_bytes()),
            Err(ShipError::Csv(_))
        ));
    }

    #[test]
    fn test_fractional_supply_rejected() {
        let data = "product,plant_1\nnail_1,2.5\n";
        assert!(WideTableReader::read_supply(data.as_bytes()).is_err());
    }

    #[test]
    fn test_unparseable_cost_rejected() {
        let data = "product,plant,DC_1\nnail_1,plant_1,cheap\n";
        let err = WideTableReader::read_costs(data.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("cheap"));
    }

    #[test]
    fn test_missing_product_key_rejected() {
        let data = "product,DC_1\n,5\n";
        assert!(WideTableReader::read_demand(data.as_bytes()).is_err());
    }
}
