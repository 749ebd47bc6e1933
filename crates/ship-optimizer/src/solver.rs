//! 線性規劃求解器轉接層

use good_lp::{ResolutionError, Solution, SolverModel};
use ship_core::{LpSolverKind, ProductProblem, SolveStatus};
use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;

use crate::formulation::{Formulation, RouteIndex, TransportationFormulator};
use crate::validation::AllocationCheck;
use crate::{RouteQuantity, SolveReport};

/// 整數判定容差
const INTEGRALITY_TOLERANCE: f64 = 1e-6;

/// 單一產品求解介面
///
/// 分區引擎只透過此介面求解，每次呼叫都必須是自給自足的。
pub trait ProductSolver: Send + Sync {
    /// 建模並求解；`time_limit` 為求解器可自行遵守的時限
    fn optimize_within(
        &self,
        problem: &ProductProblem,
        time_limit: Option<Duration>,
    ) -> ship_core::Result<SolveReport>;
}

/// 求解器轉接器
///
/// 每次求解都在呼叫端的執行緒上建立全新的模型，不保留任何跨產品狀態。
#[derive(Debug, Clone, Copy, Default)]
pub struct SolverAdapter {
    kind: LpSolverKind,
}

impl SolverAdapter {
    /// 創建新的轉接器
    pub fn new(kind: LpSolverKind) -> Self {
        Self { kind }
    }

    /// 求解器種類
    pub fn kind(&self) -> LpSolverKind {
        self.kind
    }

    /// 建模並求解單一產品
    ///
    /// 建模錯誤（輸入不一致）以 `Err` 回傳；求解結果不論是否最優都以
    /// `SolveReport` 回傳，不會中止呼叫端的批次。
    pub fn optimize(&self, problem: &ProductProblem) -> ship_core::Result<SolveReport> {
        self.optimize_within(problem, None)
    }

    /// 求解已建立的模型
    pub fn solve(&self, problem: &ProductProblem, formulation: Formulation) -> SolveReport {
        self.solve_within(problem, formulation, None)
    }

    /// 在時限內求解已建立的模型
    ///
    /// HiGHS 會在時限到達時自行停止；microlp 無法中斷，時限由呼叫端負責。
    #[cfg_attr(not(feature = "solver-highs"), allow(unused_variables))]
    pub fn solve_within(
        &self,
        problem: &ProductProblem,
        formulation: Formulation,
        time_limit: Option<Duration>,
    ) -> SolveReport {
        let product = formulation.product.clone();
        let (variables, objective, constraints, routes) = formulation.into_parts();

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| match self.kind {
            LpSolverKind::Microlp => {
                let model = variables
                    .minimise(objective)
                    .using(good_lp::solvers::microlp::microlp);
                run_model(model, constraints, &routes)
            }
            #[cfg(feature = "solver-highs")]
            LpSolverKind::Highs => {
                let mut model = variables
                    .minimise(objective)
                    .using(good_lp::solvers::highs::highs);
                if let Some(limit) = time_limit {
                    model = model.set_time_limit(limit.as_secs_f64());
                }
                run_model(model, constraints, &routes)
            }
            #[cfg(not(feature = "solver-highs"))]
            LpSolverKind::Highs => Err(ResolutionError::Str(
                "未啟用 solver-highs 特性".to_string(),
            )),
        }));

        match outcome {
            Ok(Ok(values)) => extract_allocation(problem, &routes, &values),
            Ok(Err(err)) => classify_error(&product, err),
            Err(_) => {
                tracing::warn!("產品 {} 求解器發生 panic", product);
                SolveReport::failed(&product, SolveStatus::Undefined, "求解器發生 panic")
            }
        }
    }
}

impl ProductSolver for SolverAdapter {
    fn optimize_within(
        &self,
        problem: &ProductProblem,
        time_limit: Option<Duration>,
    ) -> ship_core::Result<SolveReport> {
        let formulation = TransportationFormulator::formulate(problem)?;
        Ok(self.solve_within(problem, formulation, time_limit))
    }
}

/// 加入約束並求解，依路線索引順序回傳每個變數的值
fn run_model<M>(
    mut model: M,
    constraints: Vec<good_lp::Constraint>,
    routes: &RouteIndex,
) -> Result<Vec<f64>, ResolutionError>
where
    M: SolverModel<Error = ResolutionError>,
{
    for constraint in constraints {
        model = model.with(constraint);
    }
    let solution = model.solve()?;
    Ok(routes.iter().map(|route| solution.value(route.variable)).collect())
}

fn classify_error(product: &str, err: ResolutionError) -> SolveReport {
    match err {
        ResolutionError::Infeasible => {
            tracing::debug!("產品 {} 不可行", product);
            SolveReport::failed(product, SolveStatus::Infeasible, "供應不足以覆蓋需求")
        }
        ResolutionError::Unbounded => {
            // 成本非負且供應有限時不應無界
            tracing::warn!("產品 {} 無界，模型內部不一致", product);
            SolveReport::failed(product, SolveStatus::Unbounded, "模型無界")
        }
        other => {
            tracing::warn!("產品 {} 求解器錯誤: {}", product, other);
            SolveReport::failed(product, SolveStatus::Undefined, other.to_string())
        }
    }
}

/// 將變數值取整並轉回路線運量
fn extract_allocation(problem: &ProductProblem, routes: &RouteIndex, values: &[f64]) -> SolveReport {
    let product = problem.product.as_str();
    let mut quantities = Vec::with_capacity(routes.len());

    for (route, &value) in routes.iter().zip(values) {
        let rounded = value.round();
        if !value.is_finite()
            || rounded < 0.0
            || (value - rounded).abs() > INTEGRALITY_TOLERANCE * rounded.abs().max(1.0)
        {
            return SolveReport::failed(
                product,
                SolveStatus::Undefined,
                format!("變數值 {value} 不是非負整數"),
            );
        }
        quantities.push(RouteQuantity {
            plant: route.plant,
            distribution_center: route.distribution_center,
            quantity: rounded as u64,
        });
    }

    match AllocationCheck::verify(problem, &quantities) {
        Ok(total_cost) => SolveReport::optimal(product, quantities, total_cost),
        Err(violation) => {
            tracing::warn!("產品 {} 取整後違反約束: {}", product, violation);
            SolveReport::failed(product, SolveStatus::Undefined, violation.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal::Decimal;

    fn problem(costs: Vec<Vec<i64>>, supply: Vec<u64>, demand: Vec<u64>) -> ProductProblem {
        ProductProblem {
            product: "nail_1".to_string(),
            plants: (1..=supply.len()).map(|i| format!("P{i}")).collect(),
            distribution_centers: (1..=demand.len()).map(|i| format!("D{i}")).collect(),
            costs: costs
                .into_iter()
                .map(|row| row.into_iter().map(Decimal::from).collect())
                .collect(),
            supply,
            demand,
        }
    }

    fn quantity(report: &SolveReport, plant: usize, dc: usize) -> u64 {
        report
            .quantities
            .iter()
            .find(|q| q.plant == plant && q.distribution_center == dc)
            .map(|q| q.quantity)
            .unwrap()
    }

    #[test]
    fn test_two_by_two_unique_optimum() {
        // P1→D1:2, P1→D2:5, P2→D1:4, P2→D2:3
        let problem = problem(vec![vec![2, 5], vec![4, 3]], vec![10, 10], vec![8, 8]);
        let report = SolverAdapter::default().optimize(&problem).unwrap();

        assert_eq!(report.status, SolveStatus::Optimal);
        assert_eq!(quantity(&report, 0, 0), 8);
        assert_eq!(quantity(&report, 0, 1), 0);
        assert_eq!(quantity(&report, 1, 0), 0);
        assert_eq!(quantity(&report, 1, 1), 8);
        assert_eq!(report.total_cost, Some(Decimal::from(40)));
    }

    #[test]
    fn test_capacity_forces_split() {
        // 最便宜的工廠供應不足，必須由第二個工廠補足
        let problem = problem(vec![vec![1, 1], vec![10, 10]], vec![5, 20], vec![4, 4]);
        let report = SolverAdapter::default().optimize(&problem).unwrap();

        assert_eq!(report.status, SolveStatus::Optimal);
        let from_p1: u64 = quantity(&report, 0, 0) + quantity(&report, 0, 1);
        let from_p2: u64 = quantity(&report, 1, 0) + quantity(&report, 1, 1);
        assert_eq!(from_p1, 5);
        assert_eq!(from_p2, 3);
        assert_eq!(report.total_cost, Some(Decimal::from(35)));
    }

    #[rstest]
    #[case::balanced(vec![vec![2, 5], vec![4, 3]], vec![8, 8], vec![8, 8], SolveStatus::Optimal, Some(40))]
    #[case::surplus_supply(vec![vec![2, 5], vec![4, 3]], vec![10, 10], vec![8, 8], SolveStatus::Optimal, Some(40))]
    #[case::zero_demand(vec![vec![2, 5], vec![4, 3]], vec![10, 10], vec![0, 0], SolveStatus::Optimal, Some(0))]
    #[case::single_route(vec![vec![7]], vec![3], vec![3], SolveStatus::Optimal, Some(21))]
    #[case::short_by_one(vec![vec![2, 5], vec![4, 3]], vec![8, 7], vec![8, 8], SolveStatus::Infeasible, None)]
    #[case::short_overall(vec![vec![2, 5], vec![4, 3]], vec![5, 5], vec![8, 8], SolveStatus::Infeasible, None)]
    fn test_status_and_cost(
        #[case] costs: Vec<Vec<i64>>,
        #[case] supply: Vec<u64>,
        #[case] demand: Vec<u64>,
        #[case] status: SolveStatus,
        #[case] cost: Option<i64>,
    ) {
        let problem = problem(costs, supply, demand);
        let report = SolverAdapter::default().optimize(&problem).unwrap();

        assert_eq!(report.status, status);
        assert_eq!(report.total_cost, cost.map(Decimal::from));
        if status == SolveStatus::Infeasible {
            assert!(report.quantities.is_empty());
        }
    }

    #[test]
    fn test_time_limit_does_not_change_small_result() {
        let problem = problem(vec![vec![2, 5], vec![4, 3]], vec![10, 10], vec![8, 8]);
        let report = SolverAdapter::default()
            .optimize_within(&problem, Some(Duration::from_secs(5)))
            .unwrap();

        assert_eq!(report.status, SolveStatus::Optimal);
        assert_eq!(report.total_cost, Some(Decimal::from(40)));
    }

    #[cfg(not(feature = "solver-highs"))]
    #[test]
    fn test_unavailable_solver_is_undefined() {
        let problem = problem(vec![vec![1]], vec![1], vec![1]);
        let report = SolverAdapter::new(LpSolverKind::Highs)
            .optimize(&problem)
            .unwrap();

        assert_eq!(report.status, SolveStatus::Undefined);
        assert!(report.message.is_some());
    }
}
