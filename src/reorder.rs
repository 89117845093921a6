//! Translates end-of-drag events and editor results into line-based edits.
//!
//! Two independent drag domains share the same shape: intra-row item
//! reordering and whole-row reordering. A drop is resolved against the line
//! origins recorded at projection time and becomes exactly one contiguous
//! line-range move, never a delete+insert pair, so a reorder stays a
//! single undo step and touches no unrelated text. Every mutation runs
//! inside one read-modify-write cycle; an instruction that no longer fits
//! the document is a silent no-op and the next render pass shows the truth.

use crate::document::{Document, DocumentStore};
use crate::project::TierListView;
use crate::settings::TierListSettings;
use crate::slot::{Slot, link_target};

/// One contiguous line-range move instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineMove {
    pub from: usize,
    pub count: usize,
    pub to: usize,
    /// Whether the destination is expressed in pre-removal coordinates and
    /// needs the downstream shift applied (item moves: yes; row moves: no,
    /// they are computed from neighbor occupancy).
    pub correction: bool,
}

/// End-of-drag report for an item within the item drag domain. Offsets are
/// row label offsets relative to the block start; indices are the visual
/// slot indices reported by the drag library.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemDrop {
    pub block_line: usize,
    pub parent_offset: usize,
    pub old_parent_offset: usize,
    pub new_index: usize,
    pub old_index: usize,
}

/// End-of-drag report for a whole tier row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowDrop {
    pub old_index: usize,
    pub new_index: usize,
}

/// Resolve an item drop to its line move. Returns `None` when the drop
/// lands where it started.
pub fn item_move(drop: &ItemDrop) -> Option<LineMove> {
    let old_line = drop.block_line + drop.old_parent_offset + drop.old_index + 1;
    let mut new_line = drop.block_line + drop.parent_offset + drop.new_index + 1;
    // same-list downward moves are reported in post-move indices
    if old_line < new_line && drop.old_parent_offset == drop.parent_offset {
        new_line += 1;
    }
    if old_line == new_line {
        return None;
    }
    Some(LineMove {
        from: old_line,
        count: 1,
        to: new_line,
        correction: true,
    })
}

/// Resolve a row drop to its line move: the moved row's whole span (label
/// plus items) relocated as one unit, destination derived from the row that
/// occupied the target index.
pub fn row_move(drop: &RowDrop, view: &TierListView) -> Option<LineMove> {
    if drop.old_index == drop.new_index {
        return None;
    }
    let moved = view.rows.get(drop.old_index)?;
    let occupant = view.rows.get(drop.new_index)?;

    let old_line = view.line_start + moved.offset;
    let mut new_line = (view.line_start + occupant.offset) as isize;
    if drop.new_index >= drop.old_index {
        new_line += occupant.length as isize - moved.length as isize;
    }
    if new_line < 0 {
        return None;
    }
    Some(LineMove {
        from: old_line,
        count: moved.length,
        to: new_line as usize,
        correction: false,
    })
}

/// Drop-target validation for the row drag domain: nothing may land at or
/// below the unranked row, and the unranked row itself never moves.
pub fn row_drop_allowed(view: &TierListView, drop: &RowDrop) -> bool {
    match view.unranked_index() {
        Some(unranked) => drop.old_index != unranked && drop.new_index < unranked,
        None => true,
    }
}

/// Apply a resolved move through the store in one read-modify-write cycle.
pub fn apply_move(store: &mut dyn DocumentStore, mv: LineMove) {
    store.process(&mut |doc| doc.move_lines(mv.from, mv.count, mv.to, mv.correction));
}

/// Result of the slot editor modal: a replacement line, or the explicit
/// delete sentinel (an empty submission).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    Replace(String),
    Delete,
}

impl EditOutcome {
    pub fn from_submission(result: String) -> Self {
        if result.is_empty() {
            Self::Delete
        } else {
            Self::Replace(result)
        }
    }
}

/// Decode the slot at an absolute line, for pre-populating the editor.
pub fn slot_at(doc: &Document, line: usize) -> Option<Slot> {
    doc.line(line).map(Slot::decode)
}

/// Apply an editor result at the clicked node's resolved origin.
pub fn apply_edit(store: &mut dyn DocumentStore, line: usize, outcome: &EditOutcome) {
    store.process(&mut |doc| match outcome {
        EditOutcome::Replace(text) => doc.replace_line(line, text.clone()),
        EditOutcome::Delete => doc.delete_line(line),
    });
}

/// Append a blank item template at the end of a row's list.
pub fn add_slot(store: &mut dyn DocumentStore, view: &TierListView, row_index: usize) {
    let Some(row) = view.rows.get(row_index) else {
        return;
    };
    let at = view.line_start + row.offset + row.length;
    store.process(&mut |doc| doc.insert_line(at, "\t- "));
}

/// Re-insert the line's raw text immediately above itself.
pub fn duplicate_slot(store: &mut dyn DocumentStore, line: usize) {
    store.process(&mut |doc| {
        if let Some(text) = doc.line(line).map(str::to_string) {
            doc.insert_line(line, text);
        }
    });
}

pub fn delete_slot(store: &mut dyn DocumentStore, line: usize) {
    store.process(&mut |doc| doc.delete_line(line));
}

/// Insert one internal-link item per candidate name not already referenced
/// anywhere in the block, directly below the clicked row's list. Returns
/// the number of lines inserted.
pub fn insert_missing(
    store: &mut dyn DocumentStore,
    view: &TierListView,
    row_index: usize,
    names: &[String],
) -> usize {
    let Some(row) = view.rows.get(row_index) else {
        return 0;
    };
    let mut at = view.line_start + row.offset + row.length;
    let mut inserted = 0;

    store.process(&mut |doc| {
        let existing: Vec<String> = (view.line_start..=view.line_end.min(doc.len().saturating_sub(1)))
            .filter_map(|i| doc.line(i).and_then(link_target))
            .collect();

        for name in names {
            if existing.iter().any(|t| t == name) {
                continue;
            }
            doc.insert_line(at, format!("\t- [[{name}]]"));
            at += 1;
            inserted += 1;
        }
    });
    inserted
}

/// Markdown scaffold for a fresh block: one row per named default tier, the
/// unranked row, and a single empty item template.
pub fn new_block_text(settings: &TierListSettings) -> String {
    let mut text = String::new();
    for tier in &settings.tiers {
        text.push_str(&format!("- {}\n", tier.name));
    }
    text.push_str(&format!("- {}\n", settings.unranked));
    text.push_str("\t- ");
    text
}
