//! 分配結果檢核

use rust_decimal::Decimal;
use ship_core::ProductProblem;

use crate::RouteQuantity;

/// 分配違反約束
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AllocationViolation {
    #[error("工廠 {plant} 運出 {shipped} 超過供應 {supply}")]
    SupplyExceeded {
        plant: String,
        shipped: u64,
        supply: u64,
    },

    #[error("配送中心 {distribution_center} 收到 {received} 低於需求 {demand}")]
    DemandUnmet {
        distribution_center: String,
        received: u64,
        demand: u64,
    },

    #[error("路線索引 ({plant}, {distribution_center}) 超出範圍")]
    UnknownRoute {
        plant: usize,
        distribution_center: usize,
    },
}

/// 分配檢核器
pub struct AllocationCheck;

impl AllocationCheck {
    /// 檢查供應上限與需求下限，通過時回傳總成本
    pub fn verify(
        problem: &ProductProblem,
        quantities: &[RouteQuantity],
    ) -> Result<Decimal, AllocationViolation> {
        let mut shipped = vec![0u64; problem.plant_count()];
        let mut received = vec![0u64; problem.distribution_center_count()];
        let mut total_cost = Decimal::ZERO;

        for q in quantities {
            let unit_cost = problem.cost(q.plant, q.distribution_center).ok_or(
                AllocationViolation::UnknownRoute {
                    plant: q.plant,
                    distribution_center: q.distribution_center,
                },
            )?;
            shipped[q.plant] += q.quantity;
            received[q.distribution_center] += q.quantity;
            total_cost += unit_cost * Decimal::from(q.quantity);
        }

        for (p, (&out, &supply)) in shipped.iter().zip(&problem.supply).enumerate() {
            if out > supply {
                return Err(AllocationViolation::SupplyExceeded {
                    plant: problem.plants[p].clone(),
                    shipped: out,
                    supply,
                });
            }
        }

        for (d, (&inbound, &demand)) in received.iter().zip(&problem.demand).enumerate() {
            if inbound < demand {
                return Err(AllocationViolation::DemandUnmet {
                    distribution_center: problem.distribution_centers[d].clone(),
                    received: inbound,
                    demand,
                });
            }
        }

        Ok(total_cost)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn problem() -> ProductProblem {
        ProductProblem {
            product: "nail_1".to_string(),
            plants: vec!["P1".to_string(), "P2".to_string()],
            distribution_centers: vec!["D1".to_string(), "D2".to_string()],
            costs: vec![
                vec![Decimal::from(2), Decimal::from(5)],
                vec![Decimal::from(4), Decimal::from(3)],
            ],
            supply: vec![10, 10],
            demand: vec![8, 8],
        }
    }

    fn rq(plant: usize, distribution_center: usize, quantity: u64) -> RouteQuantity {
        RouteQuantity {
            plant,
            distribution_center,
            quantity,
        }
    }

    #[test]
    fn test_hand_built_allocations_cost_at_least_optimum() {
        let problem = problem();

        let optimal = AllocationCheck::verify(&problem, &[rq(0, 0, 8), rq(1, 1, 8)]).unwrap();
        assert_eq!(optimal, Decimal::from(40));

        // 其他可行分配
        let alternatives = [
            vec![rq(0, 0, 8), rq(0, 1, 2), rq(1, 1, 6)],
            vec![rq(0, 1, 8), rq(1, 0, 8)],
            vec![rq(0, 0, 2), rq(0, 1, 8), rq(1, 0, 6)],
        ];
        for allocation in &alternatives {
            let cost = AllocationCheck::verify(&problem, allocation).unwrap();
            assert!(optimal <= cost);
        }
    }

    #[test]
    fn test_supply_exceeded() {
        let err = AllocationCheck::verify(&problem(), &[rq(0, 0, 8), rq(0, 1, 8)]).unwrap_err();
        assert!(matches!(err, AllocationViolation::SupplyExceeded { shipped: 16, .. }));
    }

    #[test]
    fn test_demand_unmet() {
        let err = AllocationCheck::verify(&problem(), &[rq(0, 0, 8), rq(1, 1, 7)]).unwrap_err();
        assert_eq!(
            err,
            AllocationViolation::DemandUnmet {
                distribution_center: "D2".to_string(),
                received: 7,
                demand: 8,
            }
        );
    }

    #[test]
    fn test_unknown_route() {
        let err = AllocationCheck::verify(&problem(), &[rq(2, 0, 1)]).unwrap_err();
        assert!(matches!(err, AllocationViolation::UnknownRoute { plant: 2, .. }));
    }
}
