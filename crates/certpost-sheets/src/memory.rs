//! In-memory sheet — the test double for the source table gateway.

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use certpost_core::error::Result;
use certpost_core::traits::SheetStore;
use certpost_core::types::RawRow;

/// A grid of cells behind the `SheetStore` trait. Row 0 is the header.
pub struct MemorySheetStore {
    grid: Mutex<Vec<Vec<Value>>>,
}

impl MemorySheetStore {
    pub fn new(grid: Vec<Vec<Value>>) -> Self {
        Self {
            grid: Mutex::new(grid),
        }
    }

    /// Read one cell at 1-based (row, column); `Null` when out of range.
    pub fn cell(&self, row: usize, col: usize) -> Value {
        let grid = self.grid.lock().unwrap();
        grid.get(row - 1)
            .and_then(|r| r.get(col - 1))
            .cloned()
            .unwrap_or(Value::Null)
    }
}

#[async_trait]
impl SheetStore for MemorySheetStore {
    async fn read_header(&self) -> Result<Vec<String>> {
        let grid = self.grid.lock().unwrap();
        Ok(grid
            .first()
            .map(|row| {
                row.iter()
                    .map(|v| v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string()))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn read_all_rows(&self) -> Result<Vec<RawRow>> {
        let grid = self.grid.lock().unwrap();
        Ok(grid
            .iter()
            .enumerate()
            .skip(1)
            .map(|(i, cells)| RawRow {
                row: i + 1,
                cells: cells.clone(),
            })
            .collect())
    }

    async fn write_cell(&self, row: usize, col: usize, value: &str) -> Result<()> {
        let mut grid = self.grid.lock().unwrap();
        if grid.len() < row {
            grid.resize(row, Vec::new());
        }
        let cells = &mut grid[row - 1];
        if cells.len() < col {
            cells.resize(col, Value::Null);
        }
        cells[col - 1] = Value::from(value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store() -> MemorySheetStore {
        MemorySheetStore::new(vec![
            vec![json!("Name"), json!("Email"), json!("Certificate Sent")],
            vec![json!("Asha"), json!("a@x.com"), json!("No")],
        ])
    }

    #[tokio::test]
    async fn test_header_and_rows() {
        let store = store();
        assert_eq!(store.read_header().await.unwrap(), vec!["Name", "Email", "Certificate Sent"]);
        let rows = store.read_all_rows().await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].row, 2);
        assert_eq!(rows[0].cells[0], json!("Asha"));
    }

    #[tokio::test]
    async fn test_write_cell() {
        let store = store();
        store.write_cell(2, 3, "Yes").await.unwrap();
        assert_eq!(store.cell(2, 3), json!("Yes"));
        // Writes past the current grid extend it.
        store.write_cell(4, 5, "No").await.unwrap();
        assert_eq!(store.cell(4, 5), json!("No"));
        assert_eq!(store.cell(4, 1), Value::Null);
    }
}
