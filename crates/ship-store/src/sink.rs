//! 結果寫入
//!
//! 每次執行以整表覆寫的方式寫入出貨建議，重跑同一批輸入會得到相同的表。

use parking_lot::Mutex;
use ship_core::{ShipError, ShipmentAllocation};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::table::csv_err;

/// 輸出表欄位
pub const OUTPUT_COLUMNS: [&str; 4] = ["product", "plant", "distribution_center", "qty_shipped"];

/// 結果寫入介面
pub trait ResultSink: Send + Sync {
    /// 以 `rows` 取代整張輸出表，回傳寫入列數
    fn overwrite(&self, rows: &[ShipmentAllocation]) -> ship_core::Result<usize>;
}

/// CSV 檔案輸出表
///
/// 先寫入同目錄下的暫存檔再原子替換，寫入中途失敗不會留下半張表。
#[derive(Debug, Clone)]
pub struct CsvTableSink {
    path: PathBuf,
}

impl CsvTableSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 讀回整張輸出表
    pub fn read_all(&self) -> ship_core::Result<Vec<ShipmentAllocation>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(&self.path)
            .map_err(csv_err)?;

        reader
            .deserialize()
            .map(|row| row.map_err(csv_err))
            .collect()
    }
}

impl ResultSink for CsvTableSink {
    fn overwrite(&self, rows: &[ShipmentAllocation]) -> ship_core::Result<usize> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir)?;

        let mut sorted = rows.to_vec();
        sorted.sort();

        let mut temp = NamedTempFile::new_in(&dir)?;
        {
            let mut writer = csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(temp.as_file_mut());
            // 空表也要有表頭
            writer.write_record(OUTPUT_COLUMNS).map_err(csv_err)?;
            for row in &sorted {
                writer.serialize(row).map_err(csv_err)?;
            }
            writer
                .flush()
                .map_err(|e| ShipError::Io(format!("寫入輸出表失敗: {}", e)))?;
        }
        temp.as_file().sync_all()?;
        temp.persist(&self.path)
            .map_err(|e| ShipError::Io(format!("替換 {} 失敗: {}", self.path.display(), e.error)))?;

        tracing::info!("輸出表已覆寫: {} ({} 列)", self.path.display(), sorted.len());
        Ok(sorted.len())
    }
}

/// 記憶體輸出表
#[derive(Debug, Default)]
pub struct MemorySink {
    table: Mutex<MemoryTable>,
}

#[derive(Debug, Default)]
struct MemoryTable {
    rows: Vec<ShipmentAllocation>,
    writes: usize,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// 目前的表內容
    pub fn rows(&self) -> Vec<ShipmentAllocation> {
        self.table.lock().rows.clone()
    }

    /// 已覆寫次數
    pub fn write_count(&self) -> usize {
        self.table.lock().writes
    }
}

impl ResultSink for MemorySink {
    fn overwrite(&self, rows: &[ShipmentAllocation]) -> ship_core::Result<usize> {
        let mut sorted = rows.to_vec();
        sorted.sort();
        let written = sorted.len();

        let mut table = self.table.lock();
        table.rows = sorted;
        table.writes += 1;

        Ok(written)
    }
}
