//! 單一產品的運輸問題

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 單一產品的完整求解輸入
///
/// `plants` 與 `distribution_centers` 的順序決定 `costs`、`supply`、`demand`
/// 的位置對應，下游一律以索引存取，不再比對名稱。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductProblem {
    /// 產品ID
    pub product: String,

    /// 工廠列表（已排序）
    pub plants: Vec<String>,

    /// 配送中心列表（已排序）
    pub distribution_centers: Vec<String>,

    /// 成本矩陣，`costs[plant][dc]`
    pub costs: Vec<Vec<Decimal>>,

    /// 各工廠供應量
    pub supply: Vec<u64>,

    /// 各配送中心需求量（已取整）
    pub demand: Vec<u64>,
}

impl ProductProblem {
    /// 工廠數
    pub fn plant_count(&self) -> usize {
        self.plants.len()
    }

    /// 配送中心數
    pub fn distribution_center_count(&self) -> usize {
        self.distribution_centers.len()
    }

    /// 路線數（每個工廠 × 配送中心組合一條）
    pub fn route_count(&self) -> usize {
        self.plant_count() * self.distribution_center_count()
    }

    /// 查詢路線成本
    pub fn cost(&self, plant: usize, distribution_center: usize) -> Option<Decimal> {
        self.costs
            .get(plant)
            .and_then(|row| row.get(distribution_center))
            .copied()
    }

    /// 總供應量
    pub fn total_supply(&self) -> u64 {
        self.supply.iter().sum()
    }

    /// 總需求量
    pub fn total_demand(&self) -> u64 {
        self.demand.iter().sum()
    }

    /// 供應是否足以覆蓋需求（所有路線成本皆有限時即為可行條件）
    pub fn is_supply_sufficient(&self) -> bool {
        self.total_supply() >= self.total_demand()
    }

    /// 檢查向量與矩陣維度是否一致
    pub fn is_aligned(&self) -> bool {
        let n_dc = self.distribution_center_count();
        self.supply.len() == self.plant_count()
            && self.demand.len() == n_dc
            && self.costs.len() == self.plant_count()
            && self.costs.iter().all(|row| row.len() == n_dc)
    }
}
