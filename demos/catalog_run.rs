//! 資料目錄執行示例
//!
//! 用法：`cargo run --example catalog_run -- <資料根目錄> [配置.json]`

use shipopt::{run_pipeline, CsvCatalog, RunConfig};

fn main() -> anyhow::Result<()> {
    shipopt::logging::init();

    let mut args = std::env::args().skip(1);
    let root = args
        .next()
        .ok_or_else(|| anyhow::anyhow!("需要資料根目錄"))?;
    let config = match args.next() {
        Some(path) => RunConfig::from_json_file(path)?,
        None => RunConfig::default(),
    };

    let catalog = CsvCatalog::new(root);
    let summary = run_pipeline(&config, &catalog)?;

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
