//! 分區引擎基準測試

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rust_decimal::Decimal;
use shipopt::{
    CostEntry, DemandEntry, JoinedInput, PartitionedEngine, RunConfig, SchedulePolicy, SupplyEntry,
};

/// 產生 `products` 個產品，每個產品 `plants` × `dcs` 條路線
fn synthetic_input(products: usize, plants: usize, dcs: usize) -> JoinedInput {
    let mut costs = Vec::new();
    let mut supplies = Vec::new();
    let mut demands = Vec::new();

    for p in 0..products {
        let product = format!("product_{p}");
        for i in 0..plants {
            let plant = format!("plant_{i}");
            supplies.push(SupplyEntry::new(&product, &plant, (dcs * 20) as u64));
            for j in 0..dcs {
                let cost = Decimal::from(((p + 3 * i + 7 * j) % 11 + 1) as u64);
                costs.push(CostEntry::new(&product, &plant, format!("dc_{j}"), cost));
            }
        }
        for j in 0..dcs {
            let forecast = Decimal::new(((p + j) % 15 + 5) as i64 * 10 + 5, 1);
            demands.push(DemandEntry::new(&product, format!("dc_{j}"), forecast));
        }
    }

    JoinedInput::join(costs, supplies, demands).expect("合成輸入應可合併")
}

fn bench_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("partitioned_engine");
    group.sample_size(10);

    for &products in &[8usize, 32] {
        let input = synthetic_input(products, 4, 6);

        for &workers in &[1usize, 4] {
            let config = RunConfig::default()
                .with_schedule(SchedulePolicy::default().with_max_workers(workers));
            let engine = PartitionedEngine::from_config(&config);

            group.bench_with_input(
                BenchmarkId::new(format!("workers_{workers}"), products),
                &input,
                |b, input| b.iter(|| engine.run(black_box(input)).expect("批次應完成")),
            );
        }
    }

    group.finish();
}

criterion_group!(benches, bench_engine);
criterion_main!(benches);
