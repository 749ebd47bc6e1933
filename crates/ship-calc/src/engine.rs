//! 分區執行引擎

use parking_lot::{Condvar, Mutex};
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use ship_core::{ProductProblem, RunConfig, SchedulePolicy, ShipError, SolveStatus};
use ship_optimizer::{ProductSolver, SolveReport, SolverAdapter};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::time::{Duration, Instant};

use crate::builder::ProblemBuilder;
use crate::join::{JoinedInput, ProductRecord};
use crate::{BatchResult, FailureKind, ProductOutcome, ShipWarning};

/// 等待求解名額時檢查取消旗標的間隔
const SLOT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// 批次取消旗標
///
/// 只在產品單位之間檢查；已開始的產品會跑完，但批次最後回傳 `Cancelled`，
/// 結果不會交給輸出端。
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// 要求取消
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// 是否已要求取消
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// 求解執行緒名額
///
/// 有時限的求解在獨立執行緒上進行。逾時的執行緒無法中斷，會持續佔用名額直到
/// 真正結束，因此同時存活的求解執行緒數不超過工作執行緒上限，跨批次亦然。
#[derive(Debug)]
struct SolveSlots {
    in_use: Mutex<usize>,
    freed: Condvar,
    capacity: usize,
}

impl SolveSlots {
    fn new(capacity: usize) -> Arc<Self> {
        Arc::new(Self {
            in_use: Mutex::new(0),
            freed: Condvar::new(),
            capacity: capacity.max(1),
        })
    }

    /// 取得名額；名額用盡時等待，期間取消則放棄
    fn acquire(self: &Arc<Self>, cancel: &CancelFlag) -> ship_core::Result<SlotGuard> {
        let mut in_use = self.in_use.lock();
        while *in_use >= self.capacity {
            if cancel.is_cancelled() {
                return Err(ShipError::Cancelled);
            }
            self.freed.wait_for(&mut in_use, SLOT_POLL_INTERVAL);
        }
        *in_use += 1;
        Ok(SlotGuard(Arc::clone(self)))
    }

    fn in_use(&self) -> usize {
        *self.in_use.lock()
    }
}

/// 求解名額，隨求解執行緒結束而歸還
struct SlotGuard(Arc<SolveSlots>);

impl Drop for SlotGuard {
    fn drop(&mut self) {
        {
            let mut in_use = self.0.in_use.lock();
            *in_use = in_use.saturating_sub(1);
        }
        self.0.freed.notify_one();
    }
}

/// 分區執行引擎
///
/// 每個產品是一個獨立的排程單位：建構 → 建模 → 求解，單位之間不共享任何可變狀態。
pub struct PartitionedEngine {
    /// 排程策略
    policy: SchedulePolicy,

    /// 求解器
    solver: Arc<dyn ProductSolver>,

    /// 取消旗標
    cancel: CancelFlag,

    /// 有時限求解的執行緒名額
    slots: Arc<SolveSlots>,
}

impl PartitionedEngine {
    /// 創建新的引擎
    pub fn new(policy: SchedulePolicy, adapter: SolverAdapter) -> Self {
        let capacity = policy.worker_count(usize::MAX, num_cpus::get());
        Self {
            policy,
            solver: Arc::new(adapter),
            cancel: CancelFlag::new(),
            slots: SolveSlots::new(capacity),
        }
    }

    /// 由執行配置創建引擎
    pub fn from_config(config: &RunConfig) -> Self {
        Self::new(config.schedule.clone(), SolverAdapter::new(config.solver))
    }

    /// 建構器模式：設置取消旗標
    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// 建構器模式：替換求解器
    pub fn with_solver(mut self, solver: Arc<dyn ProductSolver>) -> Self {
        self.solver = solver;
        self
    }

    /// 取消旗標
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    /// 目前仍在執行的有時限求解數（含已逾時但尚未結束者）
    pub fn active_solves(&self) -> usize {
        self.slots.in_use()
    }

    /// 對合併後的輸入逐產品求解
    pub fn run(&self, input: &JoinedInput) -> ship_core::Result<BatchResult> {
        let records: Vec<&ProductRecord> = input.records().collect();
        tracing::info!("開始運輸優化：產品 {} 個", records.len());

        self.fan_out(&records, |record| self.process_record(record))
    }

    /// 對已建構好的產品問題逐一求解
    pub fn run_problems(&self, problems: &[ProductProblem]) -> ship_core::Result<BatchResult> {
        let mut seen = HashSet::with_capacity(problems.len());
        for problem in problems {
            if !seen.insert(problem.product.as_str()) {
                return Err(ShipError::Join(format!("重複的產品: {}", problem.product)));
            }
        }
        tracing::info!("開始運輸優化：產品 {} 個", problems.len());

        self.fan_out(problems, |problem| {
            let start = Instant::now();
            self.process_problem(problem, start)
        })
    }

/// 依產品展開至執行緒池並收集結果
    fn fan_out<T, F>(&self, units: &[T], process: F) -> ship_core::Result<BatchResult>
    where
        T: Sync,
        F: Fn(&T) -> ProductOutcome + Sync,
    {
        let start_time = Instant::now();
        let workers = self.policy.worker_count(units.len(), num_cpus::get());
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("ship-worker-{i}"))
            .build()
            .map_err(|e| ShipError::ThreadPool(e.to_string()))?;
        tracing::debug!("工作執行緒數: {}", workers);

        // 每個產品一個單位，成本不均時由 work stealing 平衡
        let collected: Vec<Option<ProductOutcome>> = pool.install(|| {
            units
                .par_iter()
                .with_max_len(1)
                .map(|unit| {
                    if self.cancel.is_cancelled() {
                        return None;
                    }
                    Some(process(unit))
                })
                .collect()
        });

        if self.cancel.is_cancelled() {
            tracing::warn!("批次已取消，捨棄 {} 個已完成產品", collected.iter().flatten().count());
            return Err(ShipError::Cancelled);
        }

        let outcomes: Vec<ProductOutcome> = collected.into_iter().flatten().collect();
        let result = assemble(outcomes, start_time.elapsed());

        tracing::info!("運輸優化完成，耗時 {:?}", start_time.elapsed());
        tracing::info!(
            "最優 {} 個，失敗 {} 個，輸出 {} 列",
            result.optimal_count(),
            result.failed_count(),
            result.allocations.len()
        );

        Ok(result)
    }

    /// 單一產品：建構 → 建模 → 求解
    fn process_record(&self, record: &ProductRecord) -> ProductOutcome {
        let start = Instant::now();
        tracing::debug!("處理產品 {}（輸入 {} 項）", record.product, record.entry_count());

        match ProblemBuilder::build(record) {
            Ok(problem) => self.process_problem(&problem, start),
            Err(err) => {
                tracing::warn!("產品 {} 輸入不一致: {}", record.product, err);
                ProductOutcome::failed(&record.product, FailureKind::from_error(&err), err.to_string(), start)
            }
        }
    }

    fn process_problem(&self, problem: &ProductProblem, start: Instant) -> ProductOutcome {
        match self.solve_bounded(problem) {
            Ok(report) => ProductOutcome::from_report(problem, &report, start),
            Err(err) => {
                tracing::warn!("產品 {} 求解失敗: {}", problem.product, err);
                ProductOutcome::failed(&problem.product, FailureKind::from_error(&err), err.to_string(), start)
            }
        }
    }

    /// 在時限內求解
    ///
    /// 無時限時直接在工作執行緒上求解。有時限時先取得求解名額，再於獨立執行緒上
    /// 求解並等待結果，時限同時交給求解器；逾時後該產品記為失敗，執行緒跑完後
    /// 才歸還名額。
    fn solve_bounded(&self, problem: &ProductProblem) -> ship_core::Result<SolveReport> {
        let Some(limit) = self.policy.solve_timeout() else {
            return self.solver.optimize_within(problem, None);
        };

        let slot = self.slots.acquire(&self.cancel)?;
        let (tx, rx) = mpsc::channel();
        let solver = Arc::clone(&self.solver);
        let owned = problem.clone();
        std::thread::Builder::new()
            .name(format!("ship-solve-{}", problem.product))
            .spawn(move || {
                let result = solver.optimize_within(&owned, Some(limit));
                drop(slot);
                let _ = tx.send(result);
            })
            .map_err(|e| ShipError::Solver(format!("無法啟動求解執行緒: {e}")))?;

        match rx.recv_timeout(limit) {
            Ok(result) => result,
            Err(mpsc::RecvTimeoutError::Timeout) => {
                tracing::warn!(
                    "產品 {} 求解逾時（{:?}），執行中的求解數 {}",
                    problem.product,
                    limit,
                    self.slots.in_use()
                );
                Err(ShipError::Timeout {
                    product: problem.product.clone(),
                    limit_ms: duration_ms(limit),
                })
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                Err(ShipError::Solver("求解執行緒異常結束".to_string()))
            }
        }
    }
}

fn duration_ms(duration: Duration) -> u64 {
    duration.as_millis().min(u64::MAX as u128) as u64
}

/// 合併各產品結果
fn assemble(outcomes: Vec<ProductOutcome>, elapsed: Duration) -> BatchResult {
    let mut result = BatchResult::empty();

    for outcome in &outcomes {
        if let Some(kind) = outcome.failure {
            let message = format!(
                "{}: {}",
                kind.as_str(),
                outcome.message.as_deref().unwrap_or_default()
            );
            let warning = match kind {
                FailureKind::Infeasible => ShipWarning::warning(outcome.product.clone(), message),
                _ => ShipWarning::error(outcome.product.clone(), message),
            };
            result.add_warning(warning);
        } else if outcome.allocations.is_empty() {
            result.add_warning(ShipWarning::info(
                outcome.product.clone(),
                "需求為零，最優解沒有出貨列".to_string(),
            ));
        }
        debug_assert!(
            outcome.status == SolveStatus::Optimal
                || (outcome.allocations.len() == 1 && outcome.allocations[0].is_sentinel())
        );
        result.allocations.extend(outcome.allocations.iter().cloned());
    }

    result.outcomes = outcomes;
    result.calculation_time_ms = Some(elapsed.as_millis());
    result
}
