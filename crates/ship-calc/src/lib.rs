//! # Shipment Calculation Engine
//!
//! 逐產品建構、求解並彙整運輸分配

pub mod builder;
pub mod engine;
pub mod join;

// Re-export 主要類型
pub use builder::{natural_cmp, ProblemBuilder};
pub use engine::{CancelFlag, PartitionedEngine};
pub use join::{JoinedInput, ProductRecord};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ship_core::{ProductProblem, ShipError, ShipmentAllocation, SolveStatus};
use ship_optimizer::SolveReport;
use std::time::Instant;

/// 批次計算結果
#[derive(Debug, Clone)]
pub struct BatchResult {
    /// 所有產品的輸出列
    pub allocations: Vec<ShipmentAllocation>,

    /// 每個產品的結果（依產品順序）
    pub outcomes: Vec<ProductOutcome>,

    /// 警告信息
    pub warnings: Vec<ShipWarning>,

    /// 計算耗時（毫秒）
    pub calculation_time_ms: Option<u128>,
}

impl BatchResult {
    /// 創建空的計算結果
    pub fn empty() -> Self {
        Self {
            allocations: Vec::new(),
            outcomes: Vec::new(),
            warnings: Vec::new(),
            calculation_time_ms: None,
        }
    }

    /// 添加警告
    pub fn add_warning(&mut self, warning: ShipWarning) {
        self.warnings.push(warning);
    }

    /// 查詢單一產品結果
    pub fn outcome(&self, product: &str) -> Option<&ProductOutcome> {
        self.outcomes.iter().find(|o| o.product == product)
    }

    /// 最優產品數
    pub fn optimal_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.status.is_optimal())
            .count()
    }

    /// 失敗產品數
    pub fn failed_count(&self) -> usize {
        self.outcomes.len() - self.optimal_count()
    }

    /// 某類失敗的產品數
    pub fn count_failures(&self, kind: FailureKind) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.failure == Some(kind))
            .count()
    }

    /// 所有最優產品的總運輸成本
    pub fn total_cost(&self) -> Decimal {
        self.outcomes.iter().filter_map(|o| o.total_cost).sum()
    }

    /// 依（產品, 工廠, 配送中心）排序後的輸出列
    pub fn sorted_allocations(&self) -> Vec<ShipmentAllocation> {
        let mut rows = self.allocations.clone();
        rows.sort();
        rows
    }
}

/// 失敗分類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureKind {
    /// 輸入不一致
    MalformedInput,
    /// 不可行
    Infeasible,
    /// 無界（內部一致性錯誤）
    Unbounded,
    /// 求解器錯誤
    SolverError,
    /// 逾時
    Timeout,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::MalformedInput => "MalformedInput",
            FailureKind::Infeasible => "Infeasible",
            FailureKind::Unbounded => "Unbounded",
            FailureKind::SolverError => "SolverError",
            FailureKind::Timeout => "Timeout",
        }
    }

    /// 由錯誤分類
    pub fn from_error(err: &ShipError) -> Self {
        match err {
            ShipError::MalformedInput { .. }
            | ShipError::MissingRoute { .. }
            | ShipError::DuplicateEntry { .. }
            | ShipError::NegativeValue { .. } => FailureKind::MalformedInput,
            ShipError::Timeout { .. } => FailureKind::Timeout,
            _ => FailureKind::SolverError,
        }
    }

    /// 由非最優的求解狀態分類
    pub fn from_status(status: SolveStatus) -> Option<Self> {
        match status {
            SolveStatus::Optimal => None,
            SolveStatus::Infeasible => Some(FailureKind::Infeasible),
            SolveStatus::Unbounded => Some(FailureKind::Unbounded),
            SolveStatus::Undefined => Some(FailureKind::SolverError),
        }
    }
}

/// 單一產品的結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductOutcome {
    /// 產品ID
    pub product: String,

    /// 求解狀態
    pub status: SolveStatus,

    /// 失敗分類（最優時為 `None`）
    pub failure: Option<FailureKind>,

    /// 訊息
    pub message: Option<String>,

    /// 總運輸成本
    pub total_cost: Option<Decimal>,

    /// 輸出列：最優時為正運量路線，否則為一列佔位列
    pub allocations: Vec<ShipmentAllocation>,

    /// 處理耗時（毫秒）
    pub elapsed_ms: u128,
}

impl ProductOutcome {
    /// 由求解結果建立
    pub fn from_report(problem: &ProductProblem, report: &SolveReport, start: Instant) -> Self {
        Self {
            product: problem.product.clone(),
            status: report.status,
            failure: FailureKind::from_status(report.status),
            message: report.message.clone(),
            total_cost: report.total_cost,
            allocations: report.to_allocations(problem),
            elapsed_ms: start.elapsed().as_millis(),
        }
    }

    /// 建立失敗結果（輸出一列佔位列）
    pub fn failed(product: &str, kind: FailureKind, message: String, start: Instant) -> Self {
        let status = match kind {
            FailureKind::Infeasible => SolveStatus::Infeasible,
            FailureKind::Unbounded => SolveStatus::Unbounded,
            _ => SolveStatus::Undefined,
        };
        Self {
            product: product.to_string(),
            status,
            failure: Some(kind),
            message: Some(message),
            total_cost: None,
            allocations: vec![ShipmentAllocation::sentinel(product)],
            elapsed_ms: start.elapsed().as_millis(),
        }
    }
}

/// 計算警告
#[derive(Debug, Clone)]
pub struct ShipWarning {
    pub product: String,
    pub message: String,
    pub severity: WarningSeverity,
}

impl ShipWarning {
    pub fn new(product: String, message: String, severity: WarningSeverity) -> Self {
        Self {
            product,
            message,
            severity,
        }
    }

    pub fn info(product: String, message: String) -> Self {
        Self::new(product, message, WarningSeverity::Info)
    }

    pub fn warning(product: String, message: String) -> Self {
        Self::new(product, message, WarningSeverity::Warning)
    }

    pub fn error(product: String, message: String) -> Self {
        Self::new(product, message, WarningSeverity::Error)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningSeverity {
    Info,
    Warning,
    Error,
}
