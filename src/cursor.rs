//! Row cursors handed to callers that iterate a result instead of collecting it.
//!
//! A cursor always lives inside a closure passed to the accessor
//! (`select_with`, `manual_select_with`), so the underlying statement is
//! released on every exit path.

use crate::{
    result::{AccessError, Result},
    value::Row,
};
use serde::{Deserialize, Serialize};

/// How a driver delivers rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchMode {
    /// Every row is read before the caller sees the first one
    Materialized,
    /// Rows are read one at a time as the caller asks for them
    Streaming,
}

/// Traversal allowed on a streaming cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CursorKind {
    #[default]
    ForwardOnly,
    /// Rows already read are retained so the caller can move back
    Scrollable,
}

/// A lazy, single-pass sequence of rows produced by a driver
pub trait RowSource {
    fn next_row(&mut self) -> Result<Option<Row>>;
}

impl RowSource for std::vec::IntoIter<Row> {
    fn next_row(&mut self) -> Result<Option<Row>> {
        Ok(self.next())
    }
}

pub struct RowCursor<'a> {
    source: Option<&'a mut dyn RowSource>,
    // Rows kept for scrollable traversal; None for forward-only streaming
    retained: Option<Vec<Row>>,
    position: usize,
    rows_read: usize,
}

impl<'a> RowCursor<'a> {
    /// Cursor pulling rows from `source` as they are requested
    pub fn streaming(source: &'a mut dyn RowSource, kind: CursorKind) -> Self {
        RowCursor {
            source: Some(source),
            retained: match kind {
                CursorKind::ForwardOnly => None,
                CursorKind::Scrollable => Some(Vec::new()),
            },
            position: 0,
            rows_read: 0,
        }
    }

    /// Cursor over rows that were all fetched up front; always scrollable
    pub fn materialized(rows: Vec<Row>) -> RowCursor<'static> {
        let rows_read = rows.len();
        RowCursor {
            source: None,
            retained: Some(rows),
            position: 0,
            rows_read,
        }
    }

    pub fn is_scrollable(&self) -> bool {
        self.retained.is_some()
    }

    /// Number of rows pulled from the driver so far
    pub fn rows_read(&self) -> usize {
        self.rows_read
    }

    /// Index of the row the next call to [`RowCursor::next_row`] returns
    pub fn position(&self) -> usize {
        self.position
    }

    fn pull(&mut self) -> Result<Option<Row>> {
        let Some(source) = self.source.as_mut() else {
            return Ok(None);
        };
        match source.next_row()? {
            Some(row) => {
                self.rows_read += 1;
                Ok(Some(row))
            }
            None => {
                self.source = None;
                Ok(None)
            }
        }
    }

    pub fn next_row(&mut self) -> Result<Option<Row>> {
        if self.retained.is_none() {
            let row = self.pull()?;
            if row.is_some() {
                self.position += 1;
            }
            return Ok(row);
        }

        let buffered = self.retained.as_ref().map_or(0, Vec::len);
        if self.position >= buffered {
            match self.pull()? {
                Some(row) => {
                    if let Some(retained) = self.retained.as_mut() {
                        retained.push(row);
                    }
                }
                None => return Ok(None),
            }
        }
        let row = self
            .retained
            .as_ref()
            .and_then(|rows| rows.get(self.position))
            .cloned();
        if row.is_some() {
            self.position += 1;
        }
        Ok(row)
    }

    /// Step back one row and return it
    pub fn previous(&mut self) -> Result<Option<Row>> {
        let rows = self
            .retained
            .as_ref()
            .ok_or(AccessError::CursorNotScrollable("previous"))?;
        if self.position <= 1 {
            self.position = 0;
            return Ok(None);
        }
        self.position -= 1;
        Ok(rows.get(self.position - 1).cloned())
    }

    /// Move back to the first row
    pub fn rewind(&mut self) -> Result<()> {
        if self.retained.is_none() {
            return Err(AccessError::CursorNotScrollable("rewind"));
        }
        self.position = 0;
        Ok(())
    }

    /// Position the cursor so the next row returned is the one at `index`.
    /// Returns false when the result has fewer rows.
    pub fn seek(&mut self, index: usize) -> Result<bool> {
        if self.retained.is_none() {
            return Err(AccessError::CursorNotScrollable("seek"));
        }
        while self.retained.as_ref().map_or(0, Vec::len) <= index {
            match self.pull()? {
                Some(row) => {
                    if let Some(retained) = self.retained.as_mut() {
                        retained.push(row);
                    }
                }
                None => {
                    self.position = self.retained.as_ref().map_or(0, Vec::len);
                    return Ok(false);
                }
            }
        }
        self.position = index;
        Ok(true)
    }

    /// Read the remaining rows
    pub fn collect_remaining(&mut self) -> Result<Vec<Row>> {
        let mut rows = Vec::new();
        while let Some(row) = self.next_row()? {
            rows.push(row);
        }
        Ok(rows)
    }
}

impl Iterator for RowCursor<'_> {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_row().transpose()
    }
}
