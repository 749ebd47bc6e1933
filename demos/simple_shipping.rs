//! 簡單運輸優化示例

use rust_decimal::Decimal;
use shipopt::{
    CostEntry, DemandEntry, JoinedInput, PartitionedEngine, RunConfig, SupplyEntry,
};

fn main() -> anyhow::Result<()> {
    shipopt::logging::init();
    println!("=== 簡單運輸優化示例 ===\n");

    let costs = vec![
        CostEntry::new("nail_1", "plant_1", "DC_1", Decimal::from(2)),
        CostEntry::new("nail_1", "plant_1", "DC_2", Decimal::from(5)),
        CostEntry::new("nail_1", "plant_2", "DC_1", Decimal::from(4)),
        CostEntry::new("nail_1", "plant_2", "DC_2", Decimal::from(3)),
        CostEntry::new("screw_2", "plant_1", "DC_1", Decimal::from(1)),
    ];
    let supplies = vec![
        SupplyEntry::new("nail_1", "plant_1", 10),
        SupplyEntry::new("nail_1", "plant_2", 10),
        SupplyEntry::new("screw_2", "plant_1", 3),
    ];
    let demands = vec![
        DemandEntry::new("nail_1", "DC_1", Decimal::from(8)),
        DemandEntry::new("nail_1", "DC_2", Decimal::new(75, 1)),
        DemandEntry::new("screw_2", "DC_1", Decimal::from(5)),
    ];

    let input = JoinedInput::join(costs, supplies, demands)?;
    let engine = PartitionedEngine::from_config(&RunConfig::default());
    let result = engine.run(&input)?;

    println!("出貨建議:");
    for row in result.sorted_allocations() {
        match (&row.plant, &row.distribution_center, row.quantity) {
            (Some(plant), Some(dc), Some(qty)) => {
                println!("  - {}: {} → {} 數量 {}", row.product, plant, dc, qty)
            }
            _ => println!("  - {}: 無可行方案", row.product),
        }
    }

    println!("\n總運輸成本: {}", result.total_cost());
    for warning in &result.warnings {
        println!("警告 [{}]: {}", warning.product, warning.message);
    }

    Ok(())
}
