//! 產品問題建構

use rust_decimal::Decimal;
use ship_core::{ProductProblem, ShipError};
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

use crate::join::ProductRecord;

/// 產品問題建構器
pub struct ProblemBuilder;

impl ProblemBuilder {
    /// 由合併後的記錄建立 `ProductProblem`
    ///
    /// 工廠與配送中心清單取自成本項並以自然排序決定順序，成本、供應、需求
    /// 都投影到同一組順序上。成本表與供需表的工廠/配送中心集合不一致時回報錯誤。
    pub fn build(record: &ProductRecord) -> ship_core::Result<ProductProblem> {
        let product = record.product.as_str();

        if record.costs.is_empty() {
            return Err(ShipError::malformed(product, "運輸成本表中沒有此產品"));
        }
        if record.supplies.is_empty() {
            return Err(ShipError::malformed(product, "工廠供應表中沒有此產品"));
        }
        if record.demands.is_empty() {
            return Err(ShipError::malformed(product, "需求表中沒有此產品"));
        }

        // 成本
        let mut cost_map: HashMap<(&str, &str), Decimal> = HashMap::with_capacity(record.costs.len());
        for entry in &record.costs {
            if entry.unit_cost < Decimal::ZERO {
                return Err(ShipError::NegativeValue {
                    product: product.to_string(),
                    detail: format!(
                        "{} → {} 成本 {}",
                        entry.plant, entry.distribution_center, entry.unit_cost
                    ),
                });
            }
            if cost_map.insert(entry.route(), entry.unit_cost).is_some() {
                return Err(ShipError::DuplicateEntry {
                    product: product.to_string(),
                    detail: format!("路線 {} → {}", entry.plant, entry.distribution_center),
                });
            }
        }

        let plants = sorted_ids(record.costs.iter().map(|c| c.plant.as_str()));
        let distribution_centers =
            sorted_ids(record.costs.iter().map(|c| c.distribution_center.as_str()));

        // 供應
        let mut supply_map: HashMap<&str, u64> = HashMap::with_capacity(record.supplies.len());
        for entry in &record.supplies {
            if supply_map.insert(entry.plant.as_str(), entry.quantity).is_some() {
                return Err(ShipError::DuplicateEntry {
                    product: product.to_string(),
                    detail: format!("工廠 {} 的供應", entry.plant),
                });
            }
        }

        // 需求
        let mut demand_map: HashMap<&str, u64> = HashMap::with_capacity(record.demands.len());
        for entry in &record.demands {
            let units = entry.units().ok_or_else(|| ShipError::NegativeValue {
                product: product.to_string(),
                detail: format!("配送中心 {} 需求 {}", entry.distribution_center, entry.forecast),
            })?;
            if demand_map.insert(entry.distribution_center.as_str(), units).is_some() {
                return Err(ShipError::DuplicateEntry {
                    product: product.to_string(),
                    detail: format!("配送中心 {} 的需求", entry.distribution_center),
                });
            }
        }

        check_same_ids(product, "工廠", &plants, supply_map.keys().copied(), "成本", "供應")?;
        check_same_ids(
            product,
            "配送中心",
            &distribution_centers,
            demand_map.keys().copied(),
            "成本",
            "需求",
        )?;

        let mut costs = Vec::with_capacity(plants.len());
        for plant in &plants {
            let mut row = Vec::with_capacity(distribution_centers.len());
            for distribution_center in &distribution_centers {
                let cost = cost_map
                    .get(&(plant.as_str(), distribution_center.as_str()))
                    .copied()
                    .ok_or_else(|| ShipError::MissingRoute {
                        product: product.to_string(),
                        plant: plant.clone(),
                        distribution_center: distribution_center.clone(),
                    })?;
                row.push(cost);
            }
            costs.push(row);
        }

        let supply = plants
            .iter()
            .map(|p| {
                supply_map
                    .get(p.as_str())
                    .copied()
                    .ok_or_else(|| ShipError::malformed(product, format!("工廠 {p} 無供應")))
            })
            .collect::<ship_core::Result<Vec<u64>>>()?;
        let demand = distribution_centers
            .iter()
            .map(|d| {
                demand_map
                    .get(d.as_str())
                    .copied()
                    .ok_or_else(|| ShipError::malformed(product, format!("配送中心 {d} 無需求")))
            })
            .collect::<ship_core::Result<Vec<u64>>>()?;

        Ok(ProductProblem {
            product: product.to_string(),
            plants,
            distribution_centers,
            costs,
            supply,
            demand,
        })
    }
}

/// 去重並以自然排序排列識別字
fn sorted_ids<'a>(ids: impl Iterator<Item = &'a str>) -> Vec<String> {
    let unique: BTreeSet<&str> = ids.collect();
    let mut sorted: Vec<String> = unique.into_iter().map(str::to_string).collect();
    sorted.sort_by(|a, b| natural_cmp(a, b));
    sorted
}

/// 比對成本表與供需表的識別字集合
fn check_same_ids<'a>(
    product: &str,
    kind: &str,
    expected: &[String],
    actual: impl Iterator<Item = &'a str>,
    expected_source: &str,
    actual_source: &str,
) -> ship_core::Result<()> {
    let expected_set: BTreeSet<&str> = expected.iter().map(String::as_str).collect();
    let actual_set: BTreeSet<&str> = actual.collect();

    let missing: Vec<&str> = expected_set.difference(&actual_set).copied().collect();
    if !missing.is_empty() {
        return Err(ShipError::malformed(
            product,
            format!("{kind} {} 出現在{expected_source}表但{actual_source}表中沒有", missing.join(", ")),
        ));
    }

    let extra: Vec<&str> = actual_set.difference(&expected_set).copied().collect();
    if !extra.is_empty() {
        return Err(ShipError::malformed(
            product,
            format!("{kind} {} 出現在{actual_source}表但{expected_source}表中沒有", extra.join(", ")),
        ));
    }

    Ok(())
}

/// 自然排序：數字片段依數值比較（`plant_2` < `plant_10`）
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = Chunks::new(a);
    let mut right = Chunks::new(b);

    loop {
        match (left.next(), right.next()) {
            (None, None) => return a.cmp(b),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => {
                let ord = match (is_digits(x), is_digits(y)) {
                    (true, true) => {
                        let x = x.trim_start_matches('0');
                        let y = y.trim_start_matches('0');
                        x.len().cmp(&y.len()).then_with(|| x.cmp(y))
                    }
                    _ => x.cmp(y),
                };
                if ord != Ordering::Equal {
                    return ord;
                }
            }
        }
    }
}

fn is_digits(chunk: &str) -> bool {
    chunk.bytes().all(|b| b.is_ascii_digit())
}

/// 依數字/非數字切分字串
struct Chunks<'a> {
    rest: &'a str,
}

impl<'a> Chunks<'a> {
    fn new(s: &'a str) -> Self {
        Self { rest: s }
    }
}

impl<'a> Iterator for Chunks<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let first = self.rest.chars().next()?;
        let digit = first.is_ascii_digit();
        let end = self
            .rest
            .char_indices()
            .find(|(_, c)| c.is_ascii_digit() != digit)
            .map(|(i, _)| i)
            .unwrap_or(self.rest.len());
        let (chunk, rest) = self.rest.split_at(end);
        self.rest = rest;
        Some(chunk)
    }
}
