//! Core translation and synchronization logic for markdown-backed tier
//! list boards.
//!
//! A tagged nested markdown list is projected into an interactive board of
//! draggable rows (tiers) holding draggable slots (items), and every
//! interactive change is translated back into an exact, minimal, line-based
//! edit of the source text. The document is the sole source of truth; the
//! projection is disposable and rebuilt from scratch on every render pass.
//!
//! Block grammar:
//!
//! ```text
//! - <tier label or unranked marker>
//! \t- <slot line>
//! \t- <slot line>
//! - Settings
//! \t- Key: value
//! ```
//!
//! where a slot line is plain text, an internal link/embed
//! (`[[target|alias]]`, `![[target|alias]]`), an external link/embed
//! (`[alias](url)`, `![alias](url)`), optionally wrapped in a style span
//! carrying a background color and/or a 2D transform.
//!
//! The host supplies markdown rendering, drag-and-drop, modal UI and file
//! I/O through the seams in [`host`] and [`document`]; everything in this
//! crate is pure data transformation over lines.

pub mod document;
pub mod host;
pub mod overlay;
pub mod project;
pub mod reorder;
pub mod settings;
pub mod slot;

pub use document::{Document, DocumentStore, MemoryStore};
pub use host::{BoardError, MetadataSource, NameQuery, NoMetadata, run_query};
pub use overlay::{parse_overlay, serialize_overlay};
pub use project::{ProjectedSlot, TierListView, TierRow, project_block, use_dark_text};
pub use reorder::{
    EditOutcome, ItemDrop, LineMove, RowDrop, add_slot, apply_edit, apply_move, delete_slot, duplicate_slot,
    insert_missing, item_move, new_block_text, row_drop_allowed, row_move, slot_at,
};
pub use settings::{SettingsStore, StyleParams, TierDefault, TierListSettings};
pub use slot::{Slot, SlotKind, SlotTransform};
