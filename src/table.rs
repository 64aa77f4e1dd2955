//! Header + rows, the output shape shared by every table-producing pipeline.

use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    #[error("row has {found} cells, header has {expected}")]
    Arity { expected: usize, found: usize },
}

/// A record type that knows its column names and how to flatten itself.
pub trait TableRow {
    const HEADER: &'static [&'static str];

    fn into_cells(self) -> Vec<String>;
}

/// Rows keep insertion order and always have the header's arity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultTable {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl ResultTable {
    pub fn new<I, S>(header: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            header: header.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Empty table with the column names of `R`.
    pub fn for_rows<R: TableRow>() -> Self {
        Self::new(R::HEADER.iter().copied())
    }

    pub fn from_records<R: TableRow>(
        records: impl IntoIterator<Item = R>,
    ) -> Result<Self, TableError> {
        let mut table = Self::for_rows::<R>();
        for record in records {
            table.push_record(record)?;
        }
        Ok(table)
    }

    pub fn push_row<I, S>(&mut self, row: I) -> Result<(), TableError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let row: Vec<String> = row.into_iter().map(Into::into).collect();
        if row.len() != self.header.len() {
            return Err(TableError::Arity {
                expected: self.header.len(),
                found: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn push_record<R: TableRow>(&mut self, record: R) -> Result<(), TableError> {
        self.push_row(record.into_cells())
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn arity(&self) -> usize {
        self.header.len()
    }

    /// Number of data rows (the header is not counted).
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Header first, then every data row.
    pub fn all_rows(&self) -> impl Iterator<Item = &[String]> {
        std::iter::once(self.header.as_slice()).chain(self.rows.iter().map(Vec::as_slice))
    }
}
