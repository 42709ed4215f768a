//! In-memory `SheetsApi` used by tests to observe exactly which cells were touched.
//! Clones share the same worksheets and call log.

use crate::sheets::range::A1Range;
use crate::sheets::{CellValue, SheetsApi, WorksheetRef};
use anyhow::{Context, Result};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
struct MemWorksheet {
    title: String,
    grid: Vec<Vec<Option<CellValue>>>,
}

#[derive(Debug, Clone, Default)]
pub struct MemorySheets {
    sheets: Arc<Mutex<Vec<MemWorksheet>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MemorySheets {
    pub fn with_worksheet(self, title: &str, grid: Vec<Vec<Option<CellValue>>>) -> Self {
        if let Ok(mut sheets) = self.sheets.lock() {
            sheets.push(MemWorksheet {
                title: title.to_string(),
                grid,
            });
        }
        self
    }

    /// Grid of `title` with trailing empty rows and cells dropped.
    pub fn grid(&self, title: &str) -> Vec<Vec<Option<CellValue>>> {
        let sheets = self.sheets.lock().unwrap();
        let Some(ws) = sheets.iter().find(|ws| ws.title == title) else {
            return Vec::new();
        };
        let mut grid: Vec<Vec<Option<CellValue>>> = ws
            .grid
            .iter()
            .map(|row| {
                let mut row = row.clone();
                while row.last().is_some_and(|c| c.is_none()) {
                    row.pop();
                }
                row
            })
            .collect();
        while grid.last().is_some_and(|r| r.is_empty()) {
            grid.pop();
        }
        grid
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }

    fn with_sheet<T>(&self, title: &str, f: impl FnOnce(&mut MemWorksheet) -> T) -> Result<T> {
        let mut sheets = self
            .sheets
            .lock()
            .map_err(|_| anyhow::anyhow!("memory sheets poisoned"))?;
        let ws = sheets
            .iter_mut()
            .find(|ws| ws.title == title)
            .with_context(|| format!("no worksheet named {title}"))?;
        Ok(f(ws))
    }
}

fn set_cell(grid: &mut Vec<Vec<Option<CellValue>>>, row: usize, col: usize, v: Option<CellValue>) {
    if grid.len() <= row {
        grid.resize(row + 1, Vec::new());
    }
    let r = &mut grid[row];
    if r.len() <= col {
        r.resize(col + 1, None);
    }
    r[col] = v;
}

fn cell(grid: &[Vec<Option<CellValue>>], row: usize, col: usize) -> Option<&CellValue> {
    grid.get(row).and_then(|r| r.get(col)).and_then(|c| c.as_ref())
}

fn write_rows(grid: &mut Vec<Vec<Option<CellValue>>>, top: usize, left: usize, rows: &[Vec<CellValue>]) {
    for (i, row) in rows.iter().enumerate() {
        for (j, v) in row.iter().enumerate() {
            set_cell(grid, top + i, left + j, Some(v.clone()));
        }
    }
}

#[async_trait::async_trait]
impl SheetsApi for MemorySheets {
    async fn find_worksheet(&self, title: &str) -> Result<Option<WorksheetRef>> {
        self.record(format!("find {title}"));
        let sheets = self.sheets.lock().map_err(|_| anyhow::anyhow!("poisoned"))?;
        Ok(sheets.iter().find(|ws| ws.title == title).map(|ws| WorksheetRef {
            title: ws.title.clone(),
        }))
    }

    async fn add_worksheet(&self, title: &str, rows: u32, cols: u32) -> Result<WorksheetRef> {
        self.record(format!("add {title} {rows}x{cols}"));
        let mut sheets = self.sheets.lock().map_err(|_| anyhow::anyhow!("poisoned"))?;
        anyhow::ensure!(
            sheets.iter().all(|ws| ws.title != title),
            "worksheet {title} already exists"
        );
        sheets.push(MemWorksheet {
            title: title.to_string(),
            grid: Vec::new(),
        });
        Ok(WorksheetRef {
            title: title.to_string(),
        })
    }

    async fn column_values(&self, range: &A1Range) -> Result<Vec<String>> {
        self.record(format!("read {range}"));
        anyhow::ensure!(range.start_col == range.end_col, "expected a single column");
        let col = range.start_col as usize;
        self.with_sheet(&range.sheet, |ws| {
            let mut out: Vec<String> = (0..ws.grid.len())
                .map(|row| match cell(&ws.grid, row, col) {
                    Some(CellValue::Text(s)) => s.clone(),
                    Some(CellValue::Number(n)) => n.to_string(),
                    None => String::new(),
                })
                .collect();
            while out.last().is_some_and(|s| s.is_empty()) {
                out.pop();
            }
            out
        })
    }

    async fn update(&self, range: &A1Range, rows: &[Vec<CellValue>]) -> Result<()> {
        self.record(format!("update {range} ({} rows)", rows.len()));
        let top = range.rows.map(|(r0, _)| r0.saturating_sub(1)).unwrap_or(0) as usize;
        let left = range.start_col as usize;
        self.with_sheet(&range.sheet, |ws| write_rows(&mut ws.grid, top, left, rows))
    }

    async fn clear(&self, range: &A1Range) -> Result<()> {
        self.record(format!("clear {range}"));
        self.with_sheet(&range.sheet, |ws| {
            let (first, last) = match range.rows {
                Some((r0, r1)) => (r0.saturating_sub(1) as usize, r1 as usize),
                None => (0, ws.grid.len()),
            };
            for row in first..last.min(ws.grid.len()) {
                for col in range.start_col..=range.end_col {
                    if let Some(c) = ws.grid[row].get_mut(col as usize) {
                        *c = None;
                    }
                }
            }
        })
    }

    async fn append(&self, range: &A1Range, rows: &[Vec<CellValue>]) -> Result<()> {
        self.record(format!("append {range} ({} rows)", rows.len()));
        self.with_sheet(&range.sheet, |ws| {
            let cols = range.start_col as usize..=range.end_col as usize;
            let next = (0..ws.grid.len())
                .rev()
                .find(|&row| cols.clone().any(|c| cell(&ws.grid, row, c).is_some()))
                .map(|row| row + 1)
                .unwrap_or(0);
            write_rows(&mut ws.grid, next, range.start_col as usize, rows);
        })
    }
}
