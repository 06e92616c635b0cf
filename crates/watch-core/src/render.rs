//! Table rendering and the screen
//!
//! The whole scroll buffer is redrawn on every batch: the terminal is reset
//! and the table is written again from the top.

use crate::buffer::{DisplayRow, ScrollBuffer};
use colored::Colorize;
use std::io::Write;

/// Full terminal reset
pub const CLEAR_SCREEN: &str = "\x1bc";

/// Column titles
pub const HEADER: [&str; 5] = ["time", "key", "from", "to", "op"];

const TRUNCATION_MARK: char = '~';

/// Renders display rows as a boxed text table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableRenderer {
    column_width_max: usize,
    row_width_max: usize,
    color: bool,
}

impl TableRenderer {
    /// A zero cap disables the corresponding limit.
    pub fn new(column_width_max: usize, row_width_max: usize, color: bool) -> Self {
        Self {
            column_width_max,
            row_width_max,
            color,
        }
    }

    /// Renders `rows` under the fixed header.
    pub fn render<'a, I>(&self, rows: I) -> String
    where
        I: IntoIterator<Item = &'a DisplayRow>,
    {
        let header: Vec<Vec<String>> = HEADER
            .iter()
            .map(|h| self.wrap(&h.to_uppercase()))
            .collect();
        let body: Vec<(bool, Vec<Vec<String>>)> = rows
            .into_iter()
            .map(|row| {
                let cells = row.cells().iter().map(|c| self.wrap(c)).collect();
                (row.is_header(), cells)
            })
            .collect();

        let mut widths = [0usize; 5];
        for cells in std::iter::once(&header).chain(body.iter().map(|(_, c)| c)) {
            for (width, cell) in widths.iter_mut().zip(cells) {
                let longest = cell.iter().map(|l| l.chars().count()).max().unwrap_or(0);
                *width = (*width).max(longest);
            }
        }

        let separator = self.limit(
            &widths
                .iter()
                .map(|w| "-".repeat(w + 2))
                .fold(String::from("+"), |line, dashes| line + &dashes + "+"),
        );

        let mut out = String::new();
        out.push_str(&separator);
        out.push('\n');
        for line in self.lines(&header, &widths) {
            out.push_str(&line);
            out.push('\n');
        }
        out.push_str(&separator);
        out.push('\n');
        if !body.is_empty() {
            for (is_header, cells) in &body {
                for line in self.lines(cells, &widths) {
                    if *is_header && self.color {
                        out.push_str(&paint_key_cells(&line));
                    } else {
                        out.push_str(&line);
                    }
                    out.push('\n');
                }
            }
            out.push_str(&separator);
            out.push('\n');
        }
        out
    }

    fn wrap(&self, text: &str) -> Vec<String> {
        let mut lines = Vec::new();
        for raw in text.split('\n') {
            let chars: Vec<char> = raw.chars().collect();
            if self.column_width_max == 0 || chars.len() <= self.column_width_max {
                lines.push(raw.to_string());
                continue;
            }
            lines.extend(
                chars
                    .chunks(self.column_width_max)
                    .map(|chunk| chunk.iter().collect::<String>()),
            );
        }
        lines
    }

    fn lines(&self, cells: &[Vec<String>], widths: &[usize; 5]) -> Vec<String> {
        let height = cells.iter().map(Vec::len).max().unwrap_or(1);
        (0..height)
            .map(|i| {
                let mut line = String::from("|");
                for (cell, width) in cells.iter().zip(widths) {
                    let text = cell.get(i).map(String::as_str).unwrap_or("");
                    let width = *width;
                    line.push_str(&format!(" {text:<width$} |"));
                }
                self.limit(&line)
            })
            .collect()
    }

    fn limit(&self, line: &str) -> String {
        if self.row_width_max == 0 || line.chars().count() <= self.row_width_max {
            return line.to_string();
        }
        let mut cut: String = line.chars().take(self.row_width_max.saturating_sub(1)).collect();
        cut.push(TRUNCATION_MARK);
        cut
    }
}

/// Colours the text of the time and key cells of a rendered line.
fn paint_key_cells(line: &str) -> String {
    let mut cells: Vec<String> = line.split('|').map(str::to_string).collect();
    for cell in cells.iter_mut().skip(1).take(2) {
        let text = cell.trim();
        if !text.is_empty() {
            *cell = cell.replacen(text, &text.blue().to_string(), 1);
        }
    }
    cells.join("|")
}

/// Scroll buffer bound to an output, redrawn on every push.
pub struct Screen<W: Write> {
    buffer: ScrollBuffer,
    renderer: TableRenderer,
    writer: W,
}

impl<W: Write> Screen<W> {
    /// Empty screen writing to `writer`
    pub fn new(max_rows: usize, renderer: TableRenderer, writer: W) -> Self {
        Self {
            buffer: ScrollBuffer::new(max_rows),
            renderer,
            writer,
        }
    }

    /// Appends a batch, clears the terminal and writes the whole window.
    pub fn push(&mut self, rows: Vec<DisplayRow>) -> std::io::Result<()> {
        self.buffer.append(rows);
        let table = self.renderer.render(self.buffer.rows());
        write!(self.writer, "{CLEAR_SCREEN}{table}")?;
        self.writer.flush()
    }

    pub fn buffer(&self) -> &ScrollBuffer {
        &self.buffer
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }
}

impl<W: Write> std::fmt::Debug for Screen<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Screen")
            .field("buffer", &self.buffer)
            .field("renderer", &self.renderer)
            .finish()
    }
}
