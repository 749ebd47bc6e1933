//! 執行配置模型

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::{Result, ShipError};

/// 一次運輸優化執行的配置
///
/// 只包含定位輸入/輸出資料表所需的不透明識別字，以及排程策略。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// 目錄名稱
    pub catalog_name: String,

    /// 資料庫名稱
    pub db_name: String,

    /// 資料表名稱
    pub tables: TableNames,

    /// 排程策略
    pub schedule: SchedulePolicy,

    /// 線性規劃求解器
    pub solver: LpSolverKind,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            catalog_name: "main".to_string(),
            db_name: "supply_chain_db".to_string(),
            tables: TableNames::default(),
            schedule: SchedulePolicy::default(),
            solver: LpSolverKind::default(),
        }
    }
}

impl RunConfig {
    /// 創建新的執行配置
    pub fn new(catalog_name: impl Into<String>, db_name: impl Into<String>) -> Self {
        Self {
            catalog_name: catalog_name.into(),
            db_name: db_name.into(),
            ..Self::default()
        }
    }

    /// 建構器模式：設置排程策略
    pub fn with_schedule(mut self, schedule: SchedulePolicy) -> Self {
        self.schedule = schedule;
        self
    }

    /// 建構器模式：設置資料表名稱
    pub fn with_tables(mut self, tables: TableNames) -> Self {
        self.tables = tables;
        self
    }

    /// 建構器模式：設置求解器
    pub fn with_solver(mut self, solver: LpSolverKind) -> Self {
        self.solver = solver;
        self
    }

    /// 從 JSON 字串載入
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// 從 JSON 檔案載入
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// 檢查配置是否可用
    pub fn validate(&self) -> Result<()> {
        if self.catalog_name.trim().is_empty() {
            return Err(ShipError::Config("catalog_name 不可為空".to_string()));
        }
        if self.db_name.trim().is_empty() {
            return Err(ShipError::Config("db_name 不可為空".to_string()));
        }
        self.tables.validate()?;
        self.schedule.validate()
    }
}

/// 輸入/輸出資料表名稱
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableNames {
    /// 運輸成本表
    pub transport_cost: String,

    /// 工廠供應表
    pub plant_supply: String,

    /// 預測需求表
    pub product_demand: String,

    /// 出貨建議（輸出）表
    pub shipment_recommendations: String,
}

impl Default for TableNames {
    fn default() -> Self {
        Self {
            transport_cost: "transport_cost".to_string(),
            plant_supply: "plant_supply".to_string(),
            product_demand: "product_demand_forecasted".to_string(),
            shipment_recommendations: "shipment_recommendations".to_string(),
        }
    }
}

impl TableNames {
    fn validate(&self) -> Result<()> {
        let names = [
            &self.transport_cost,
            &self.plant_supply,
            &self.product_demand,
            &self.shipment_recommendations,
        ];
        if names.iter().any(|name| name.trim().is_empty()) {
            return Err(ShipError::Config("資料表名稱不可為空".to_string()));
        }
        Ok(())
    }
}

/// 分區執行的排程策略
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulePolicy {
    /// 工作執行緒上限，`None` 表示使用偵測到的 CPU 數
    pub max_workers: Option<usize>,

    /// 單一產品求解時限（毫秒），`None` 表示不限時
    pub solve_timeout_ms: Option<u64>,
}

impl Default for SchedulePolicy {
    fn default() -> Self {
        Self {
            max_workers: None,
            solve_timeout_ms: Some(60_000),
        }
    }
}

impl SchedulePolicy {
    /// 建構器模式：設置工作執行緒上限
    pub fn with_max_workers(mut self, workers: usize) -> Self {
        self.max_workers = Some(workers);
        self
    }

    /// 建構器模式：設置求解時限
    pub fn with_solve_timeout(mut self, timeout: Duration) -> Self {
        self.solve_timeout_ms = Some(timeout.as_millis().min(u64::MAX as u128) as u64);
        self
    }

    /// 建構器模式：取消求解時限
    pub fn without_solve_timeout(mut self) -> Self {
        self.solve_timeout_ms = None;
        self
    }

    /// 求解時限
    pub fn solve_timeout(&self) -> Option<Duration> {
        self.solve_timeout_ms.map(Duration::from_millis)
    }

    /// 計算實際工作執行緒數
    ///
    /// 目標是每個產品一個排程單位，再以配置上限與可用容量封頂，至少為 1。
    pub fn worker_count(&self, product_count: usize, available: usize) -> usize {
        let cap = self.max_workers.unwrap_or(available).min(available.max(1));
        product_count.min(cap).max(1)
    }

    fn validate(&self) -> Result<()> {
        if self.max_workers == Some(0) {
            return Err(ShipError::Config("max_workers 必須大於 0".to_string()));
        }
        if self.solve_timeout_ms == Some(0) {
            return Err(ShipError::Config("solve_timeout_ms 必須大於 0".to_string()));
        }
        Ok(())
    }
}

/// 線性規劃求解器種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LpSolverKind {
    /// 純 Rust 的 microlp（分支定界支援整數變數）
    #[default]
    Microlp,
    /// HiGHS（需啟用 `solver-highs` 特性）
    Highs,
}

impl LpSolverKind {
    /// 求解器名稱
    pub fn as_str(&self) -> &'static str {
        match self {
            LpSolverKind::Microlp => "microlp",
            LpSolverKind::Highs => "highs",
        }
    }
}
