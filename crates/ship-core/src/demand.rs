//! 配送中心需求模型

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 配送中心對某產品的預測需求
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandEntry {
    /// 產品ID
    pub product: String,

    /// 配送中心ID
    pub distribution_center: String,

    /// 預測需求（可含小數）
    pub forecast: Decimal,
}

impl DemandEntry {
    /// 創建新的需求項
    pub fn new(
        product: impl Into<String>,
        distribution_center: impl Into<String>,
        forecast: Decimal,
    ) -> Self {
        Self {
            product: product.into(),
            distribution_center: distribution_center.into(),
            forecast,
        }
    }

    /// 求解用的整數需求量
    ///
    /// 決策變數為整數，`Σ x >= 8.3` 與 `Σ x >= 9` 等價，因此向上取整。
    /// 負值回傳 `None`。
    pub fn units(&self) -> Option<u64> {
        if self.forecast < Decimal::ZERO {
            return None;
        }
        self.forecast.ceil().to_u64()
    }
}
