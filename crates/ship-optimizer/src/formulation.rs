//! 運輸問題建模

use good_lp::{constraint, variable, Constraint, Expression, ProblemVariables, Variable};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use ship_core::{ProductProblem, ShipError};
use std::collections::HashMap;

/// 決策變數與路線的對應
#[derive(Debug, Clone, Copy)]
pub struct RouteVariable {
    /// 工廠索引
    pub plant: usize,
    /// 配送中心索引
    pub distribution_center: usize,
    /// 決策變數
    pub variable: Variable,
    /// 單位成本
    pub unit_cost: Decimal,
}

/// 路線 ↔ 變數雙向索引
///
/// 建模時一次建立，求解後直接用來還原每個變數所屬的路線。
#[derive(Debug, Clone, Default)]
pub struct RouteIndex {
    routes: Vec<RouteVariable>,
    by_variable: HashMap<Variable, usize>,
    distribution_center_count: usize,
}

impl RouteIndex {
    fn with_capacity(route_count: usize, distribution_center_count: usize) -> Self {
        Self {
            routes: Vec::with_capacity(route_count),
            by_variable: HashMap::with_capacity(route_count),
            distribution_center_count,
        }
    }

    fn push(&mut self, route: RouteVariable) {
        self.by_variable.insert(route.variable, self.routes.len());
        self.routes.push(route);
    }

    /// 由路線查詢變數
    pub fn variable(&self, plant: usize, distribution_center: usize) -> Option<Variable> {
        if distribution_center >= self.distribution_center_count {
            return None;
        }
        self.routes
            .get(plant * self.distribution_center_count + distribution_center)
            .map(|route| route.variable)
    }

    /// 由變數查詢路線
    pub fn route(&self, variable: Variable) -> Option<&RouteVariable> {
        self.by_variable
            .get(&variable)
            .and_then(|&index| self.routes.get(index))
    }

    /// 依（工廠, 配送中心）順序列舉所有路線
    pub fn iter(&self) -> impl Iterator<Item = &RouteVariable> {
        self.routes.iter()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// 單一產品的線性規劃模型
pub struct Formulation {
    /// 產品ID
    pub product: String,

    variables: ProblemVariables,
    objective: Expression,
    constraints: Vec<Constraint>,
    routes: RouteIndex,
    supply_constraint_count: usize,
    demand_constraint_count: usize,
}

impl std::fmt::Debug for Formulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Formulation")
            .field("product", &self.product)
            .field("routes", &self.routes.len())
            .field("supply_constraints", &self.supply_constraint_count)
            .field("demand_constraints", &self.demand_constraint_count)
            .finish()
    }
}

impl Formulation {
    /// 路線索引
    pub fn routes(&self) -> &RouteIndex {
        &self.routes
    }

    /// 供應約束數
    pub fn supply_constraint_count(&self) -> usize {
        self.supply_constraint_count
    }

    /// 需求約束數
    pub fn demand_constraint_count(&self) -> usize {
        self.demand_constraint_count
    }

    /// 拆解為求解器所需的各部分
    pub(crate) fn into_parts(self) -> (ProblemVariables, Expression, Vec<Constraint>, RouteIndex) {
        (self.variables, self.objective, self.constraints, self.routes)
    }
}

/// 運輸問題建模器
pub struct TransportationFormulator;

impl TransportationFormulator {
    /// 由產品問題建立線性規劃
    ///
    /// - 每條（工廠, 配送中心）路線一個非負整數變數
    /// - 目標：最小化 Σ 成本 × 運量
    /// - 每個工廠：Σ 運出 <= 供應
    /// - 每個配送中心：Σ 運入 >= 需求
    pub fn formulate(problem: &ProductProblem) -> ship_core::Result<Formulation> {
        let product = problem.product.as_str();

        if problem.plants.is_empty() || problem.distribution_centers.is_empty() {
            return Err(ShipError::malformed(product, "沒有工廠或配送中心"));
        }
        if !problem.is_aligned() {
            return Err(ShipError::malformed(product, "成本矩陣與供需向量維度不一致"));
        }

        let n_plants = problem.plant_count();
        let n_dcs = problem.distribution_center_count();

        let mut variables = ProblemVariables::new();
        let mut routes = RouteIndex::with_capacity(problem.route_count(), n_dcs);
        let mut objective = Expression::with_capacity(problem.route_count());

        for (p, plant) in problem.plants.iter().enumerate() {
            for (d, distribution_center) in problem.distribution_centers.iter().enumerate() {
                let unit_cost = problem.cost(p, d).ok_or_else(|| ShipError::MissingRoute {
                    product: product.to_string(),
                    plant: plant.clone(),
                    distribution_center: distribution_center.clone(),
                })?;
                if unit_cost < Decimal::ZERO {
                    return Err(ShipError::NegativeValue {
                        product: product.to_string(),
                        detail: format!("{plant} → {distribution_center} 成本 {unit_cost}"),
                    });
                }
                let coefficient = unit_cost.to_f64().ok_or_else(|| {
                    ShipError::Solver(format!("{product}: 成本 {unit_cost} 無法轉為浮點數"))
                })?;

                // 上界為該工廠供應
                let variable = variables.add(
                    variable()
                        .integer()
                        .min(0.0)
                        .max(problem.supply[p] as f64),
                );
                objective.add_mul(coefficient, variable);

                routes.push(RouteVariable {
                    plant: p,
                    distribution_center: d,
                    variable,
                    unit_cost,
                });
            }
        }

        let mut constraints = Vec::with_capacity(n_plants + n_dcs);

        for (p, &supply) in problem.supply.iter().enumerate() {
            let mut shipped = Expression::with_capacity(n_dcs);
            for d in 0..n_dcs {
                if let Some(variable) = routes.variable(p, d) {
                    shipped.add_mul(1.0, variable);
                }
            }
            constraints.push(constraint!(shipped <= supply as f64));
        }

        for (d, &demand) in problem.demand.iter().enumerate() {
            let mut received = Expression::with_capacity(n_plants);
            for p in 0..n_plants {
                if let Some(variable) = routes.variable(p, d) {
                    received.add_mul(1.0, variable);
                }
            }
            constraints.push(constraint!(received >= demand as f64));
        }

        tracing::debug!(
            "產品 {} 建模完成：變數 {} 個，約束 {} 條",
            product,
            routes.len(),
            constraints.len()
        );

        Ok(Formulation {
            product: product.to_string(),
            variables,
            objective,
            constraints,
            routes,
            supply_constraint_count: n_plants,
            demand_constraint_count: n_dcs,
        })
    }
}
