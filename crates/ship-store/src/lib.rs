//! # Shipment Store
//!
//! 輸入寬表讀取、資料目錄定位與出貨建議輸出表

pub mod catalog;
pub mod sink;
pub mod table;

// Re-export 主要類型
pub use catalog::{CsvCatalog, InputTables};
pub use sink::{CsvTableSink, MemorySink, ResultSink, OUTPUT_COLUMNS};
pub use table::WideTableReader;
