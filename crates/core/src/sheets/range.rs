use std::fmt;

/// A rectangular range on one worksheet, rendered in A1 notation.
///
/// Columns are 0-based (`0` is `A`), rows are 1-based like the sheet UI. A range without rows
/// spans whole columns (`A:B`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct A1Range {
    pub sheet: String,
    pub start_col: u32,
    pub end_col: u32,
    pub rows: Option<(u32, u32)>,
}

impl A1Range {
    pub fn columns(sheet: &str, start_col: u32, end_col: u32) -> Self {
        Self {
            sheet: sheet.to_string(),
            start_col,
            end_col,
            rows: None,
        }
    }

    pub fn cells(sheet: &str, start_col: u32, start_row: u32, end_col: u32, end_row: u32) -> Self {
        Self {
            sheet: sheet.to_string(),
            start_col,
            end_col,
            rows: Some((start_row, end_row)),
        }
    }
}

impl fmt::Display for A1Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}'!", self.sheet.replace('\'', "''"))?;
        let start = column_letters(self.start_col);
        let end = column_letters(self.end_col);
        match self.rows {
            Some((r0, r1)) => write!(f, "{start}{r0}:{end}{r1}"),
            None => write!(f, "{start}:{end}"),
        }
    }
}

pub fn column_letters(col: u32) -> String {
    let mut n = col + 1;
    let mut out = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        out.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}
