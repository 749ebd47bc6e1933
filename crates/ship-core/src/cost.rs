//! 運輸成本模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 單一路線的運輸成本（正規化後的一列）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostEntry {
    /// 產品ID
    pub product: String,

    /// 工廠ID
    pub plant: String,

    /// 配送中心ID
    pub distribution_center: String,

    /// 單位運輸成本
    pub unit_cost: Decimal,
}

impl CostEntry {
    /// 創建新的成本項
    pub fn new(
        product: impl Into<String>,
        plant: impl Into<String>,
        distribution_center: impl Into<String>,
        unit_cost: Decimal,
    ) -> Self {
        Self {
            product: product.into(),
            plant: plant.into(),
            distribution_center: distribution_center.into(),
            unit_cost,
        }
    }

    /// 路線鍵（工廠, 配送中心）
    pub fn route(&self) -> (&str, &str) {
        (&self.plant, &self.distribution_center)
    }
}
