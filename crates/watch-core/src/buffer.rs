//! Bounded scroll buffer of display rows

use std::collections::VecDeque;

/// One line of the change table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayRow {
    /// Opens the batch of one object change
    Header { time: String, key: String },
    /// One surviving field change
    Change {
        path: String,
        from: String,
        to: String,
        op: String,
    },
}

impl DisplayRow {
    /// Cells in table column order: time, key, from, to, op.
    ///
    /// Change rows leave the time column blank and carry the path in the
    /// key column.
    pub fn cells(&self) -> [&str; 5] {
        match self {
            DisplayRow::Header { time, key } => [time.as_str(), key.as_str(), "", "", ""],
            DisplayRow::Change { path, from, to, op } => {
                ["", path.as_str(), from.as_str(), to.as_str(), op.as_str()]
            }
        }
    }

    /// True for the per-object header row
    pub fn is_header(&self) -> bool {
        matches!(self, DisplayRow::Header { .. })
    }
}

/// Append-only FIFO window of the most recent rows.
#[derive(Debug, Clone)]
pub struct ScrollBuffer {
    rows: VecDeque<DisplayRow>,
    max_rows: usize,
}

impl ScrollBuffer {
    /// Empty buffer holding at most `max_rows` rows between batches
    pub fn new(max_rows: usize) -> Self {
        Self {
            rows: VecDeque::with_capacity(max_rows),
            max_rows,
        }
    }

    /// Appends a batch and evicts the oldest rows over the cap.
    ///
    /// The cap for one append is never below the batch size, so a batch
    /// larger than the configured maximum is kept whole.
    pub fn append<I: IntoIterator<Item = DisplayRow>>(&mut self, batch: I) {
        let before = self.rows.len();
        self.rows.extend(batch);
        let cap = self.max_rows.max(self.rows.len() - before);
        while self.rows.len() > cap {
            self.rows.pop_front();
        }
    }

    pub fn rows(&self) -> impl Iterator<Item = &DisplayRow> {
        self.rows.iter()
    }

    /// Number of rows currently held
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn max_rows(&self) -> usize {
        self.max_rows
    }
}
