//! # Shipment Optimizer
//!
//! 運輸問題建模與線性規劃求解

pub mod formulation;
pub mod solver;
pub mod validation;

// Re-export 主要類型
pub use formulation::{Formulation, RouteIndex, RouteVariable, TransportationFormulator};
pub use solver::{ProductSolver, SolverAdapter};
pub use validation::{AllocationCheck, AllocationViolation};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ship_core::{ProductProblem, ShipmentAllocation, SolveStatus};

/// 單一路線的運量（以索引對應 `ProductProblem` 的工廠與配送中心）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteQuantity {
    pub plant: usize,
    pub distribution_center: usize,
    pub quantity: u64,
}

/// 求解結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolveReport {
    /// 產品ID
    pub product: String,

    /// 結果分類
    pub status: SolveStatus,

    /// 每條路線的運量（僅在最優時有值）
    pub quantities: Vec<RouteQuantity>,

    /// 總運輸成本（僅在最優時有值）
    pub total_cost: Option<Decimal>,

    /// 附加訊息
    pub message: Option<String>,
}

impl SolveReport {
    /// 創建最優結果
    pub fn optimal(product: &str, quantities: Vec<RouteQuantity>, total_cost: Decimal) -> Self {
        Self {
            product: product.to_string(),
            status: SolveStatus::Optimal,
            quantities,
            total_cost: Some(total_cost),
            message: None,
        }
    }

    /// 創建非最優結果
    pub fn failed(product: &str, status: SolveStatus, message: impl Into<String>) -> Self {
        Self {
            product: product.to_string(),
            status,
            quantities: Vec::new(),
            total_cost: None,
            message: Some(message.into()),
        }
    }

    /// 轉為輸出列
    ///
    /// 最優時輸出每條正運量路線一列；其他情況只輸出一列空值佔位列。
    pub fn to_allocations(&self, problem: &ProductProblem) -> Vec<ShipmentAllocation> {
        if !self.status.is_optimal() {
            return vec![ShipmentAllocation::sentinel(&self.product)];
        }

        self.quantities
            .iter()
            .filter(|q| q.quantity > 0)
            .map(|q| {
                ShipmentAllocation::shipped(
                    &self.product,
                    &problem.plants[q.plant],
                    &problem.distribution_centers[q.distribution_center],
                    q.quantity,
                )
            })
            .collect()
    }
}
