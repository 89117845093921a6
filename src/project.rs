//! Projects one tagged block's lines into the interactive tier-list
//! structure.
//!
//! The projection is a disposable view: it is rebuilt from scratch on every
//! render pass and never patched incrementally. Classification runs in two
//! passes (outer entries are first classified immutably as settings
//! pseudo-row, unranked row or tier row, then the view is built) so no tree
//! is ever mutated while being walked. Every draggable node carries its
//! resolved line origin, computed here once per pass rather than re-derived
//! from ancestor bookkeeping on each lookup.

use crate::host::MetadataSource;
use crate::overlay::{collect_pairs, parse_overlay};
use crate::settings::TierListSettings;
use crate::slot::{Slot, SlotKind};

/// Perceptual brightness threshold above which a badge gets dark text.
const DARK_TEXT_THRESHOLD: f64 = 150.0;

/// One projected slot: the decoded item plus its absolute document line and
/// the image source resolved for it, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedSlot {
    pub slot: Slot,
    /// Absolute line number in the document. Recomputed every render pass,
    /// never cached across edits.
    pub origin: usize,
    pub image: Option<String>,
}

/// One outer-list entry: a ranking bucket with its badge and items.
#[derive(Debug, Clone, PartialEq)]
pub struct TierRow {
    /// The row's own label line, run through the same codec as its items.
    pub label: Slot,
    /// Resolved badge background, from an inline override or a named
    /// default tier.
    pub color: Option<String>,
    /// Whether the badge background is bright enough to need dark text.
    pub fg_dark: bool,
    pub unranked: bool,
    /// Line offset of this row's label relative to the block start.
    pub offset: usize,
    /// Lines spanned by the row: its label plus its items.
    pub length: usize,
    pub slots: Vec<ProjectedSlot>,
}

/// The rebuilt visual structure for one block.
#[derive(Debug, Clone, PartialEq)]
pub struct TierListView {
    pub line_start: usize,
    pub line_end: usize,
    pub rows: Vec<TierRow>,
    /// Block-local settings: the global record with any inline settings
    /// pseudo-row layered on top.
    pub overlay: TierListSettings,
}

impl TierListView {
    /// First row flagged unranked, if any. Authoritative even for
    /// hand-edited documents where the row is not last or not unique.
    pub fn unranked_index(&self) -> Option<usize> {
        self.rows.iter().position(|r| r.unranked)
    }

    /// Absolute line of a row's label.
    pub fn row_origin(&self, index: usize) -> Option<usize> {
        self.rows.get(index).map(|r| self.line_start + r.offset)
    }
}

#[derive(Debug)]
struct RawRow {
    offset: usize,
    child_offsets: Vec<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum RowClass {
    Settings,
    Unranked,
    Tier,
}

/// Scan the block's lines into outer entries with their child item lines.
/// Lines that are neither `- ` entries nor `\t- ` items are skipped.
fn scan_rows(lines: &[String]) -> Vec<RawRow> {
    let mut rows: Vec<RawRow> = Vec::new();
    for (offset, line) in lines.iter().enumerate() {
        if line.starts_with("- ") {
            rows.push(RawRow {
                offset,
                child_offsets: Vec::new(),
            });
        } else if line.starts_with("\t- ")
            && let Some(row) = rows.last_mut()
        {
            row.child_offsets.push(offset);
        }
    }
    rows
}

/// Row label text used for marker comparison and badge lookup: the decoded
/// value with the identifying tag stripped (the tag is render noise, not
/// part of the label).
fn label_text(slot: &Slot, tag: &str) -> String {
    if tag.is_empty() {
        return slot.value.clone();
    }
    slot.value.replace(tag, "").trim().to_string()
}

fn parse_hex_color(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.trim().strip_prefix('#')?;
    match hex.len() {
        3 => {
            let digit = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|d| d * 17);
            Some((digit(0)?, digit(1)?, digit(2)?))
        }
        6 => {
            let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
            Some((byte(0)?, byte(2)?, byte(4)?))
        }
        _ => None,
    }
}

/// Whether a badge with this background needs dark text to stay readable,
/// by relative luminance of the hex color. Unparsable colors keep light
/// text.
pub fn use_dark_text(color: &str) -> bool {
    match parse_hex_color(color) {
        Some((r, g, b)) => {
            let brightness = 0.299 * f64::from(r) + 0.587 * f64::from(g) + 0.114 * f64::from(b);
            brightness > DARK_TEXT_THRESHOLD
        }
        None => false,
    }
}

fn resolve_image(slot: &Slot, settings: &TierListSettings, meta: &dyn MetadataSource) -> Option<String> {
    match slot.kind {
        SlotKind::ExternalEmbed => Some(slot.value.clone()),
        SlotKind::InternalEmbed => meta.resolve_link(&slot.value),
        SlotKind::InternalLink => {
            let file = meta.resolve_link(&slot.value)?;
            meta.frontmatter_value(&file, &settings.property)
        }
        SlotKind::PlainText | SlotKind::ExternalLink => None,
    }
}

/// Build the tier-list view for one block.
///
/// `lines` covers the whole block; `line_start` is its absolute starting
/// line in the document. The settings pseudo-row (if present) is routed to
/// the resolver and removed from the visual tree; the remaining rows are
/// badged and their slots decoded and image-resolved.
pub fn project_block(
    lines: &[String],
    line_start: usize,
    base: &TierListSettings,
    meta: &dyn MetadataSource,
) -> TierListView {
    let raw_rows = scan_rows(lines);

    // First pass: pick out settings pseudo-rows and resolve the overlay.
    // The marker itself is not overlayable, so base settings decide.
    let mut pairs = indexmap::IndexMap::new();
    let mut is_settings = vec![false; raw_rows.len()];
    for (i, row) in raw_rows.iter().enumerate() {
        let slot = Slot::decode(&lines[row.offset]);
        if label_text(&slot, &base.tag) == base.settings_marker {
            is_settings[i] = true;
            for &child in &row.child_offsets {
                pairs.extend(collect_pairs([lines[child].as_str()]));
            }
        }
    }
    let overlay = parse_overlay(&pairs, base);

    // Second pass: build the visual rows under the overlaid settings.
    let mut rows = Vec::new();
    for (i, raw) in raw_rows.iter().enumerate() {
        if is_settings[i] {
            continue;
        }
        let label = Slot::decode(&lines[raw.offset]);
        let text = label_text(&label, &overlay.tag);
        let unranked = text == overlay.unranked;

        let color = if unranked {
            None
        } else {
            label
                .color
                .clone()
                .or_else(|| overlay.tier_color(&text).map(str::to_string))
        };
        let fg_dark = color.as_deref().map(use_dark_text).unwrap_or(false);

        let slots = raw
            .child_offsets
            .iter()
            .map(|&child| {
                let slot = Slot::decode(&lines[child]);
                let image = resolve_image(&slot, &overlay, meta);
                ProjectedSlot {
                    slot,
                    origin: line_start + child,
                    image,
                }
            })
            .collect();

        rows.push(TierRow {
            label,
            color,
            fg_dark,
            unranked,
            offset: raw.offset,
            length: 1 + raw.child_offsets.len(),
            slots,
        });
    }

    TierListView {
        line_start,
        line_end: line_start + lines.len().saturating_sub(1),
        rows,
        overlay,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::NoMetadata;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn block(lines: &[&str]) -> Vec<String> {
        lines.iter().map(|s| s.to_string()).collect()
    }

    struct FakeVault {
        frontmatter: HashMap<String, String>,
    }

    impl MetadataSource for FakeVault {
        fn resolve_link(&self, path: &str) -> Option<String> {
            self.frontmatter.contains_key(path).then(|| path.to_string())
        }

        fn frontmatter_value(&self, file: &str, property: &str) -> Option<String> {
            (property == "Image").then(|| self.frontmatter.get(file).cloned()).flatten()
        }
    }

    #[test]
    fn test_basic_projection() {
        let lines = block(&[
            "- S Tier",
            "\t- [[Alpha]]",
            "\t- [[Beta|B]]",
            "- A Tier",
            "\t- Plain entry",
            "- To Rank",
            "\t- [[Gamma]]",
        ]);
        let view = project_block(&lines, 10, &TierListSettings::default(), &NoMetadata);

        assert_eq!(view.rows.len(), 3);
        assert_eq!(view.line_start, 10);
        assert_eq!(view.line_end, 16);

        let s = &view.rows[0];
        assert_eq!(s.label.value, "S Tier");
        assert_eq!(s.offset, 0);
        assert_eq!(s.length, 3);
        assert_eq!(s.color.as_deref(), Some("#FFD700"));
        assert!(s.fg_dark, "gold badge should take dark text");
        assert_eq!(s.slots[0].origin, 11);
        assert_eq!(s.slots[1].origin, 12);
        assert_eq!(s.slots[1].slot.alias.as_deref(), Some("B"));

        let unranked = &view.rows[2];
        assert!(unranked.unranked);
        assert_eq!(unranked.color, None);
        assert_eq!(view.unranked_index(), Some(2));
    }

    #[test]
    fn test_settings_row_removed_and_overlaid() {
        let lines = block(&[
            "- S Tier",
            "\t- [[Alpha]]",
            "- Settings",
            "\t- Width: 40",
            "\t- Title: false",
        ]);
        let view = project_block(&lines, 0, &TierListSettings::default(), &NoMetadata);

        assert_eq!(view.rows.len(), 1, "settings pseudo-row must not render");
        assert_eq!(view.overlay.width, 40);
        assert!(!view.overlay.show_title);
        // global-equivalent fields untouched
        assert_eq!(view.overlay.slots, 10);
    }

    #[test]
    fn test_overlay_can_rename_unranked_marker() {
        let lines = block(&[
            "- Settings",
            "\t- Unranked: Backlog",
            "- Backlog",
            "\t- [[Alpha]]",
        ]);
        let view = project_block(&lines, 0, &TierListSettings::default(), &NoMetadata);
        assert_eq!(view.rows.len(), 1);
        assert!(view.rows[0].unranked);
    }

    #[test]
    fn test_first_unranked_match_is_authoritative() {
        let lines = block(&["- To Rank", "\t- [[A]]", "- To Rank", "\t- [[B]]"]);
        let view = project_block(&lines, 0, &TierListSettings::default(), &NoMetadata);
        assert_eq!(view.unranked_index(), Some(0));
        assert!(view.rows[1].unranked, "later duplicates still carry the flag");
    }

    #[test]
    fn test_inline_color_overrides_named_default() {
        let lines = block(&[
            r#"- <span style="background-color:#000000;">S Tier</span>"#,
            "\t- [[Alpha]]",
        ]);
        let view = project_block(&lines, 0, &TierListSettings::default(), &NoMetadata);
        assert_eq!(view.rows[0].color.as_deref(), Some("#000000"));
        assert!(!view.rows[0].fg_dark);
    }

    #[test]
    fn test_tag_stripped_from_label() {
        let lines = block(&["- S Tier #tier-list", "\t- [[Alpha]]"]);
        let view = project_block(&lines, 0, &TierListSettings::default(), &NoMetadata);
        assert_eq!(view.rows[0].color.as_deref(), Some("#FFD700"));
    }

    #[test]
    fn test_image_resolution_paths() {
        let vault = FakeVault {
            frontmatter: HashMap::from([("Alpha".to_string(), "covers/alpha.png".to_string())]),
        };
        let lines = block(&[
            "- S Tier",
            "\t- [[Alpha]]",
            "\t- [[Missing]]",
            "\t- ![[poster.png]]",
            "\t- ![art](https://e.com/a.jpg)",
        ]);
        let view = project_block(&lines, 0, &TierListSettings::default(), &vault);
        let slots = &view.rows[0].slots;
        assert_eq!(slots[0].image.as_deref(), Some("covers/alpha.png"));
        assert_eq!(slots[1].image, None, "missing metadata falls back to raw content");
        assert_eq!(slots[2].image, None, "embed target not in vault");
        assert_eq!(slots[3].image.as_deref(), Some("https://e.com/a.jpg"));
    }

    #[test]
    fn test_use_dark_text_threshold() {
        assert!(use_dark_text("#ffffff"));
        assert!(use_dark_text("#FFD700"));
        assert!(!use_dark_text("#000000"));
        assert!(!use_dark_text("#3333aa"));
        assert!(use_dark_text("#fff"));
        assert!(!use_dark_text("rebeccapurple"));
    }

    #[test]
    fn test_blank_and_stray_lines_skipped() {
        let lines = block(&["- S Tier", "", "\t- [[Alpha]]", "  stray"]);
        let view = project_block(&lines, 0, &TierListSettings::default(), &NoMetadata);
        assert_eq!(view.rows.len(), 1);
        assert_eq!(view.rows[0].slots.len(), 1);
        assert_eq!(view.rows[0].slots[0].origin, 2);
    }
}
