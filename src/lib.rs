//! # shipopt
//!
//! 逐產品運輸成本優化：讀入成本、供應與需求三張表，每個產品獨立求解
//! 整數運輸問題，最後一次覆寫出貨建議表。
//!
//! ```no_run
//! use shipopt::{run_pipeline, CsvCatalog, RunConfig};
//!
//! let config = RunConfig::default();
//! let catalog = CsvCatalog::new("/var/lib/shipopt");
//! let summary = run_pipeline(&config, &catalog).unwrap();
//! println!("寫入 {} 列", summary.rows_written);
//! ```

pub mod logging;

pub use ship_calc::{
    BatchResult, CancelFlag, FailureKind, JoinedInput, PartitionedEngine, ProductOutcome,
    ProductRecord, ProblemBuilder, ShipWarning, WarningSeverity,
};
pub use ship_core::{
    CostEntry, DemandEntry, LpSolverKind, ProductProblem, Result, RunConfig, SchedulePolicy,
    ShipError, ShipmentAllocation, SolveStatus, SupplyEntry, TableNames,
};
pub use ship_optimizer::{ProductSolver, SolveReport, SolverAdapter, TransportationFormulator};
pub use ship_store::{CsvCatalog, CsvTableSink, InputTables, MemorySink, ResultSink};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::time::Instant;
use uuid::Uuid;

/// 一次執行的摘要
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// 執行ID
    pub run_id: Uuid,

    /// 開始時間
    pub started_at: DateTime<Utc>,

    /// 產品數
    pub product_count: usize,

    /// 最優產品數
    pub optimal_count: usize,

    /// 失敗產品數（含不可行）
    pub failed_count: usize,

    /// 不可行產品數
    pub infeasible_count: usize,

    /// 寫入輸出表的列數
    pub rows_written: usize,

    /// 最優產品的總運輸成本
    pub total_cost: Decimal,

    /// 總耗時（毫秒）
    pub elapsed_ms: u128,
}

impl RunSummary {
    fn from_batch(
        run_id: Uuid,
        started_at: DateTime<Utc>,
        batch: &BatchResult,
        rows_written: usize,
        start: Instant,
    ) -> Self {
        Self {
            run_id,
            started_at,
            product_count: batch.outcomes.len(),
            optimal_count: batch.optimal_count(),
            failed_count: batch.failed_count(),
            infeasible_count: batch.count_failures(FailureKind::Infeasible),
            rows_written,
            total_cost: batch.total_cost(),
            elapsed_ms: start.elapsed().as_millis(),
        }
    }
}

/// 以資料目錄執行完整流程
pub fn run_pipeline(config: &RunConfig, catalog: &CsvCatalog) -> Result<RunSummary> {
    run_pipeline_with_cancel(config, catalog, CancelFlag::new())
}

/// 以資料目錄執行完整流程，可由外部取消
pub fn run_pipeline_with_cancel(
    config: &RunConfig,
    catalog: &CsvCatalog,
    cancel: CancelFlag,
) -> Result<RunSummary> {
    config.validate()?;
    let inputs = catalog.read_inputs(config)?;
    let sink = catalog.sink(config)?;
    run_with_sink(config, inputs, &sink, cancel)
}

/// 對已讀入的輸入表執行求解並覆寫輸出表
///
/// 批次失敗或取消時不會呼叫 `sink`。
pub fn run_with_sink<S: ResultSink + ?Sized>(
    config: &RunConfig,
    inputs: InputTables,
    sink: &S,
    cancel: CancelFlag,
) -> Result<RunSummary> {
    let start = Instant::now();
    let run_id = Uuid::new_v4();
    let started_at = Utc::now();
    tracing::info!("執行 {} 開始 ({}.{})", run_id, config.catalog_name, config.db_name);

    let joined = JoinedInput::join(inputs.costs, inputs.supplies, inputs.demands)?;
    let engine = PartitionedEngine::from_config(config).with_cancel_flag(cancel);
    let batch = engine.run(&joined)?;

    for warning in &batch.warnings {
        match warning.severity {
            WarningSeverity::Info => tracing::info!("[{}] {}", warning.product, warning.message),
            _ => tracing::warn!("[{}] {}", warning.product, warning.message),
        }
    }

    let rows_written = sink.overwrite(&batch.allocations)?;
    let summary = RunSummary::from_batch(run_id, started_at, &batch, rows_written, start);

    tracing::info!(
        "執行 {} 完成：產品 {} 個，最優 {} 個，失敗 {} 個，寫入 {} 列，總成本 {}",
        run_id,
        summary.product_count,
        summary.optimal_count,
        summary.failed_count,
        summary.rows_written,
        summary.total_cost
    );

    Ok(summary)
}
