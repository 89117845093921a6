//! Line-oriented primitives over the backing document text.
//!
//! The document is the sole source of truth for a tier list: every
//! interaction is translated into one of the operations below and applied
//! through a single read-modify-write cycle against the current content.
//! Out-of-range indices are silent no-ops: an instruction computed against
//! bookkeeping that the document has since drifted away from must never
//! corrupt unrelated lines.

/// An ordered sequence of lines, 0-indexed.
///
/// Splitting on `\n` and re-joining round-trips the text byte-for-byte,
/// including a trailing newline (which shows up as a final empty line).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Document {
    lines: Vec<String>,
}

impl Document {
    pub fn new(content: &str) -> Self {
        Self {
            lines: content.split('\n').map(str::to_string).collect(),
        }
    }

    pub fn from_lines(lines: Vec<String>) -> Self {
        Self { lines }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn line(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(String::as_str)
    }

    /// Replace a single line. No-op if `index` is out of range.
    pub fn replace_line(&mut self, index: usize, text: impl Into<String>) {
        match self.lines.get_mut(index) {
            Some(line) => *line = text.into(),
            None => log::debug!("replace_line: index {index} out of range"),
        }
    }

    /// Replace `count` lines starting at `start` with `replacement`.
    /// No-op if the source range does not lie within the document.
    pub fn replace_range(&mut self, start: usize, count: usize, replacement: Vec<String>) {
        if start > self.lines.len() || start + count > self.lines.len() {
            log::debug!("replace_range: range {start}+{count} out of range");
            return;
        }
        self.lines.splice(start..start + count, replacement);
    }

    /// Insert a line at `index`, clamped into the valid insertion range.
    pub fn insert_line(&mut self, index: usize, text: impl Into<String>) {
        let index = index.min(self.lines.len());
        self.lines.insert(index, text.into());
    }

    /// Delete a single line. No-op if `index` is out of range.
    pub fn delete_line(&mut self, index: usize) {
        if index < self.lines.len() {
            self.lines.remove(index);
        } else {
            log::debug!("delete_line: index {index} out of range");
        }
    }

    /// Move `count` contiguous lines from `start` so they land at `dest`,
    /// as one splice rather than a delete+insert pair.
    ///
    /// When `correction` is set and the destination lies below the source,
    /// `dest` is interpreted against pre-removal coordinates and shifted
    /// back by `count`. Row-level moves computed from neighbor occupancy
    /// pass `correction = false`.
    pub fn move_lines(&mut self, start: usize, count: usize, dest: usize, correction: bool) {
        if start == dest {
            return;
        }
        if count == 0 || start >= self.lines.len() || start + count > self.lines.len() || dest > self.lines.len() {
            log::debug!("move_lines: {start}+{count} -> {dest} out of range, ignored");
            return;
        }

        let moved: Vec<String> = self.lines.splice(start..start + count, std::iter::empty()).collect();

        let mut dest = dest;
        if dest > start && correction {
            dest -= count;
        }
        let dest = dest.min(self.lines.len());
        self.lines.splice(dest..dest, moved);
    }

    pub fn to_text(&self) -> String {
        self.lines.join("\n")
    }
}

/// The host's read-modify-write boundary around the active document.
///
/// Every mutation issued by one interaction runs inside a single `process`
/// call against the content as it exists at call time, so a drop computed
/// from stale bookkeeping degrades to a no-op inside the closure instead of
/// splicing the wrong lines.
pub trait DocumentStore {
    fn read(&self) -> Document;
    fn process(&mut self, edit: &mut dyn FnMut(&mut Document));
}

/// In-memory store, used by tests and embedding hosts without a vault.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    doc: Document,
}

impl MemoryStore {
    pub fn new(content: &str) -> Self {
        Self {
            doc: Document::new(content),
        }
    }

    pub fn text(&self) -> String {
        self.doc.to_text()
    }
}

impl DocumentStore for MemoryStore {
    fn read(&self) -> Document {
        self.doc.clone()
    }

    fn process(&mut self, edit: &mut dyn FnMut(&mut Document)) {
        edit(&mut self.doc);
    }
}
