//! 出貨分配結果模型

use serde::{Deserialize, Serialize};

/// 求解結果分類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SolveStatus {
    /// 最優解
    Optimal,
    /// 不可行（供應不足以覆蓋需求）
    Infeasible,
    /// 無界（成本非負時不應出現，視為內部一致性錯誤）
    Unbounded,
    /// 未定義（求解器錯誤、逾時、輸入不一致）
    Undefined,
}

impl SolveStatus {
    /// 狀態名稱
    pub fn as_str(&self) -> &'static str {
        match self {
            SolveStatus::Optimal => "Optimal",
            SolveStatus::Infeasible => "Infeasible",
            SolveStatus::Unbounded => "Unbounded",
            SolveStatus::Undefined => "Undefined",
        }
    }

    /// 是否為最優解
    pub fn is_optimal(&self) -> bool {
        *self == SolveStatus::Optimal
    }
}

impl std::fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 出貨分配（輸出表的一列）
///
/// `quantity` 為 `None` 表示該產品沒有最優解，絕不等同於 0。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShipmentAllocation {
    /// 產品ID
    pub product: String,

    /// 工廠ID
    pub plant: Option<String>,

    /// 配送中心ID
    pub distribution_center: Option<String>,

    /// 出貨數量
    #[serde(rename = "qty_shipped")]
    pub quantity: Option<u64>,
}

impl ShipmentAllocation {
    /// 創建一列出貨分配
    pub fn shipped(
        product: impl Into<String>,
        plant: impl Into<String>,
        distribution_center: impl Into<String>,
        quantity: u64,
    ) -> Self {
        Self {
            product: product.into(),
            plant: Some(plant.into()),
            distribution_center: Some(distribution_center.into()),
            quantity: Some(quantity),
        }
    }

    /// 創建無解的佔位列
    pub fn sentinel(product: impl Into<String>) -> Self {
        Self {
            product: product.into(),
            plant: None,
            distribution_center: None,
            quantity: None,
        }
    }

    /// 是否為無解佔位列
    pub fn is_sentinel(&self) -> bool {
        self.quantity.is_none()
    }
}
