//! # Shipment Core
//!
//! 核心資料模型與類型定義

pub mod allocation;
pub mod config;
pub mod cost;
pub mod demand;
pub mod problem;
pub mod supply;

// Re-export 主要類型
pub use allocation::{ShipmentAllocation, SolveStatus};
pub use config::{LpSolverKind, RunConfig, SchedulePolicy, TableNames};
pub use cost::CostEntry;
pub use demand::DemandEntry;
pub use problem::ProductProblem;
pub use supply::SupplyEntry;

/// 運輸優化錯誤類型
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ShipError {
    #[error("產品 {product} 輸入資料不一致: {detail}")]
    MalformedInput { product: String, detail: String },

    #[error("產品 {product} 缺少路線成本: {plant} → {distribution_center}")]
    MissingRoute {
        product: String,
        plant: String,
        distribution_center: String,
    },

    #[error("產品 {product} 重複的輸入項: {detail}")]
    DuplicateEntry { product: String, detail: String },

    #[error("產品 {product} 出現負值: {detail}")]
    NegativeValue { product: String, detail: String },

    #[error("求解器錯誤: {0}")]
    Solver(String),

    #[error("產品 {product} 求解逾時（{limit_ms} ms）")]
    Timeout { product: String, limit_ms: u64 },

    #[error("資料表合併錯誤: {0}")]
    Join(String),

    #[error("檔案讀寫錯誤: {0}")]
    Io(String),

    #[error("CSV 解析錯誤: {0}")]
    Csv(String),

    #[error("配置錯誤: {0}")]
    Config(String),

    #[error("執行緒池建立失敗: {0}")]
    ThreadPool(String),

    #[error("批次已取消")]
    Cancelled,

    #[error("其他錯誤: {0}")]
    Other(String),
}

impl ShipError {
    /// 建立輸入不一致錯誤
    pub fn malformed(product: &str, detail: impl Into<String>) -> Self {
        ShipError::MalformedInput {
            product: product.to_string(),
            detail: detail.into(),
        }
    }

    /// 是否為單一產品範圍的錯誤（不應中止整個批次）
    pub fn is_product_scoped(&self) -> bool {
        matches!(
            self,
            ShipError::MalformedInput { .. }
                | ShipError::MissingRoute { .. }
                | ShipError::DuplicateEntry { .. }
                | ShipError::NegativeValue { .. }
                | ShipError::Solver(_)
                | ShipError::Timeout { .. }
        )
    }
}

impl From<std::io::Error> for ShipError {
    fn from(err: std::io::Error) -> Self {
        ShipError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for ShipError {
    fn from(err: serde_json::Error) -> Self {
        ShipError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ShipError>;
