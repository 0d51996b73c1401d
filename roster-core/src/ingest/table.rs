//! Tabular input: one table, or several keyed by sheet name.

use crate::record::Cell;
use indexmap::IndexMap;

/// Row-oriented grid whose header row names the columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Rows are padded with empty cells or truncated to the header width.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, Cell::Empty);
                row
            })
            .collect();
        Self { headers, rows }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }
}

/// What a workbook holds under one sheet name.
#[derive(Debug, Clone, PartialEq)]
pub enum SheetContent {
    Table(Table),
    /// Not tabular; carries a short description of what was found.
    Other(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum TabularSource {
    Single(Table),
    Sheeted(IndexMap<String, SheetContent>),
}
