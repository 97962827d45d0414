// src/storage/range.rs

//! A1 range notation (`Posts!D2:D`, `Errors!A1`, `'My Sheet'!A:B`).

use std::sync::OnceLock;

use regex::Regex;

use crate::error::{AppError, Result};

/// Longest column label a spreadsheet accepts (`ZZZ`, 18278 columns).
pub const MAX_COLUMN_LETTERS: usize = 3;

fn cell_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^([A-Za-z]*)(\d*)$").expect("static pattern"))
}

/// One corner of a range; either part may be open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CellRef {
    /// Zero-based column
    pub col: Option<usize>,
    /// One-based row
    pub row: Option<usize>,
}

impl CellRef {
    fn parse(raw: &str) -> Result<Self> {
        let caps = cell_pattern()
            .captures(raw.trim())
            .ok_or_else(|| AppError::store(format!("invalid cell reference '{raw}'")))?;

        let letters = &caps[1];
        let digits = &caps[2];
        let col = if letters.is_empty() {
            None
        } else {
            Some(column_index(letters).ok_or_else(|| {
                AppError::store(format!("column in '{raw}' is out of range"))
            })?)
        };
        let row = if digits.is_empty() {
            None
        } else {
            match digits.parse::<usize>() {
                Ok(0) | Err(_) => {
                    return Err(AppError::store(format!("invalid row in '{raw}'")));
                }
                Ok(n) => Some(n),
            }
        };
        Ok(Self { col, row })
    }
}

/// Zero-based index of a column label (`A` → 0, `Z` → 25, `AA` → 26).
///
/// `None` for an empty label, a non-letter, or more than
/// [`MAX_COLUMN_LETTERS`] letters.
pub fn column_index(letters: &str) -> Option<usize> {
    if letters.is_empty() || letters.len() > MAX_COLUMN_LETTERS {
        return None;
    }
    letters
        .chars()
        .try_fold(0usize, |acc, c| {
            if !c.is_ascii_alphabetic() {
                return None;
            }
            let digit = c.to_ascii_uppercase() as usize - 'A' as usize + 1;
            acc.checked_mul(26)?.checked_add(digit)
        })
        .map(|n| n - 1)
}

/// A parsed A1 range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct A1Range {
    pub sheet: String,
    pub start: CellRef,
    pub end: CellRef,
}

impl A1Range {
    /// Parse `Sheet`, `Sheet!A1`, `Sheet!A2:D` and friends.
    ///
    /// A lone cell (`Sheet!A1`) is both start and end; a bare sheet name
    /// covers the whole sheet.
    pub fn parse(raw: &str) -> Result<Self> {
        let (sheet, cells) = match raw.rsplit_once('!') {
            Some((sheet, cells)) => (sheet, Some(cells)),
            None => (raw, None),
        };

        let sheet = sheet.trim();
        let sheet = sheet
            .strip_prefix('\'')
            .and_then(|s| s.strip_suffix('\''))
            .unwrap_or(sheet);
        if sheet.is_empty() {
            return Err(AppError::store(format!("range '{raw}' has no sheet name")));
        }

        let (start, end) = match cells {
            None => (CellRef::default(), CellRef::default()),
            Some(cells) => match cells.split_once(':') {
                Some((a, b)) => (CellRef::parse(a)?, CellRef::parse(b)?),
                None => {
                    let cell = CellRef::parse(cells)?;
                    (cell, cell)
                }
            },
        };

        Ok(Self {
            sheet: sheet.to_string(),
            start,
            end,
        })
    }

    /// Cut this range out of a full sheet grid.
    ///
    /// Trailing blank cells and trailing blank rows are dropped, the way
    /// spreadsheet APIs report values.
    pub fn slice(&self, grid: &[Vec<String>]) -> Vec<Vec<String>> {
        let first_row = self.start.row.unwrap_or(1) - 1;
        let last_row = self.end.row.map_or(grid.len(), |r| r.min(grid.len()));
        let first_col = self.start.col.unwrap_or(0);
        let last_col = self.end.col.map(|c| c + 1);

        let mut rows: Vec<Vec<String>> = grid
            .get(first_row..last_row.max(first_row))
            .unwrap_or_default()
            .iter()
            .map(|row| {
                let end = last_col.map_or(row.len(), |c| c.min(row.len()));
                let mut cells: Vec<String> =
                    row.get(first_col..end.max(first_col)).unwrap_or_default().to_vec();
                while cells.last().is_some_and(|c| c.is_empty()) {
                    cells.pop();
                }
                cells
            })
            .collect();

        while rows.last().is_some_and(|r| r.is_empty()) {
            rows.pop();
        }
        rows
    }

    /// Zero-based column where appended rows start.
    pub fn append_column(&self) -> usize {
        self.start.col.unwrap_or(0)
    }
}
