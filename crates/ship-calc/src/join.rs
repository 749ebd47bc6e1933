//! 依產品合併成本、供應、需求

use ship_core::{CostEntry, DemandEntry, ShipError, SupplyEntry};
use std::collections::BTreeMap;

/// 單一產品的合併後輸入
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductRecord {
    /// 產品ID
    pub product: String,
    /// 成本項
    pub costs: Vec<CostEntry>,
    /// 供應項
    pub supplies: Vec<SupplyEntry>,
    /// 需求項
    pub demands: Vec<DemandEntry>,
}

impl ProductRecord {
    /// 創建空記錄
    pub fn new(product: impl Into<String>) -> Self {
        Self {
            product: product.into(),
            ..Self::default()
        }
    }

    /// 建構器模式：加入成本項
    pub fn with_cost(mut self, entry: CostEntry) -> Self {
        self.costs.push(entry);
        self
    }

    /// 建構器模式：加入供應項
    pub fn with_supply(mut self, entry: SupplyEntry) -> Self {
        self.supplies.push(entry);
        self
    }

    /// 建構器模式：加入需求項
    pub fn with_demand(mut self, entry: DemandEntry) -> Self {
        self.demands.push(entry);
        self
    }

    /// 輸入項總數（用於估計工作量）
    pub fn entry_count(&self) -> usize {
        self.costs.len() + self.supplies.len() + self.demands.len()
    }
}

/// 依產品分組後的完整輸入
///
/// 產品鍵必須完全相符；任一表缺少某產品時仍保留該產品，交由建構器回報為輸入不一致，
/// 不會在合併階段默默消失。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JoinedInput {
    records: BTreeMap<String, ProductRecord>,
}

impl JoinedInput {
    /// 合併三張表
    pub fn join(
        costs: Vec<CostEntry>,
        supplies: Vec<SupplyEntry>,
        demands: Vec<DemandEntry>,
    ) -> ship_core::Result<Self> {
        let mut records: BTreeMap<String, ProductRecord> = BTreeMap::new();

        for entry in costs {
            Self::check_key(&entry.product, "transport_cost")?;
            records
                .entry(entry.product.clone())
                .or_insert_with(|| ProductRecord::new(entry.product.clone()))
                .costs
                .push(entry);
        }

        for entry in supplies {
            Self::check_key(&entry.product, "plant_supply")?;
            records
                .entry(entry.product.clone())
                .or_insert_with(|| ProductRecord::new(entry.product.clone()))
                .supplies
                .push(entry);
        }

        for entry in demands {
            Self::check_key(&entry.product, "product_demand")?;
            records
                .entry(entry.product.clone())
                .or_insert_with(|| ProductRecord::new(entry.product.clone()))
                .demands
                .push(entry);
        }

        tracing::debug!("合併完成，產品數: {}", records.len());

        Ok(Self { records })
    }

    fn check_key(product: &str, table: &str) -> ship_core::Result<()> {
        if product.trim().is_empty() {
            return Err(ShipError::Join(format!("{table} 中有空白產品鍵")));
        }
        Ok(())
    }

    /// 由已分組的記錄建立
    pub fn from_records(records: impl IntoIterator<Item = ProductRecord>) -> ship_core::Result<Self> {
        let mut map = BTreeMap::new();
        for record in records {
            if map.contains_key(&record.product) {
                return Err(ShipError::Join(format!("重複的產品記錄: {}", record.product)));
            }
            map.insert(record.product.clone(), record);
        }
        Ok(Self { records: map })
    }

    /// 產品數
    pub fn product_count(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// 取得單一產品記錄
    pub fn get(&self, product: &str) -> Option<&ProductRecord> {
        self.records.get(product)
    }

    /// 依產品順序列舉記錄
    pub fn records(&self) -> impl Iterator<Item = &ProductRecord> {
        self.records.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_join_groups_by_product() {
        let joined = JoinedInput::join(
            vec![
                CostEntry::new("screw_2", "plant_1", "DC_1", Decimal::ONE),
                CostEntry::new("nail_1", "plant_1", "DC_1", Decimal::TWO),
                CostEntry::new("nail_1", "plant_2", "DC_1", Decimal::TEN),
            ],
            vec![
                SupplyEntry::new("nail_1", "plant_1", 5),
                SupplyEntry::new("nail_1", "plant_2", 5),
                SupplyEntry::new("screw_2", "plant_1", 5),
            ],
            vec![
                DemandEntry::new("nail_1", "DC_1", Decimal::from(3)),
                DemandEntry::new("screw_2", "DC_1", Decimal::from(3)),
            ],
        )
        .unwrap();

        assert_eq!(joined.product_count(), 2);
        let products: Vec<_> = joined.records().map(|r| r.product.as_str()).collect();
        assert_eq!(products, vec!["nail_1", "screw_2"]);

        let nail = joined.get("nail_1").unwrap();
        assert_eq!(nail.costs.len(), 2);
        assert_eq!(nail.supplies.len(), 2);
        assert_eq!(nail.demands.len(), 1);
        assert_eq!(nail.entry_count(), 5);
    }

    #[test]
    fn test_product_missing_from_a_table_is_kept() {
        let joined = JoinedInput::join(
            vec![CostEntry::new("nail_1", "plant_1", "DC_1", Decimal::ONE)],
            vec![],
            vec![DemandEntry::new("nail_1", "DC_1", Decimal::ONE)],
        )
        .unwrap();

        let record = joined.get("nail_1").unwrap();
        assert!(record.supplies.is_empty());
    }

    #[test]
    fn test_blank_product_key_rejected() {
        let err = JoinedInput::join(
            vec![CostEntry::new("  ", "plant_1", "DC_1", Decimal::ONE)],
            vec![],
            vec![],
        )
        .unwrap_err();
        assert!(matches!(err, ShipError::Join(_)));
    }

    #[test]
    fn test_duplicate_records_rejected() {
        let err = JoinedInput::from_records(vec![
            ProductRecord::new("nail_1"),
            ProductRecord::new("nail_1"),
        ])
        .unwrap_err();
        assert!(matches!(err, ShipError::Join(_)));
    }
}
