//! Global configuration record, per-block overlay storage, and the redraw
//! styling surface.
//!
//! The global record is persisted by the host as a JSON blob; every field
//! carries a serde default so blobs saved by older versions still load. The
//! core never mutates the global record; per-block overlays are always
//! applied to a clone (see [`crate::overlay`]).

use crate::slot::SlotKind;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One named default tier (label + badge color).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierDefault {
    pub name: String,
    pub color: String,
}

impl TierDefault {
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: color.into(),
        }
    }
}

/// The global tier-list configuration record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TierListSettings {
    /// Ordered named default tiers; badge colors resolve against these by
    /// first case-sensitive full-label match.
    pub tiers: Vec<TierDefault>,
    pub use_colors: bool,
    /// Frontmatter property consulted when resolving a slot's image.
    pub property: String,
    /// Label marking the catch-all last row.
    pub unranked: String,
    /// Tag identifying a nested list as a tier-list block.
    pub tag: String,
    /// Label marking the inline settings pseudo-row.
    pub settings_marker: String,
    /// Board width as a percentage of the screen.
    pub width: u32,
    /// Slots displayed per row before wrapping.
    pub slots: u32,
    /// Slot aspect ratio.
    pub ratio: f64,
    pub font_size: u32,
    /// Drag animation duration in milliseconds.
    pub animation: u32,
    /// Sticky default content type for the slot editor.
    pub last_slot_type: SlotKind,
    /// Saved query strings for the search-insert workflow.
    pub from: String,
    #[serde(rename = "where")]
    pub where_expr: String,
    pub show_title: bool,
}

impl Default for TierListSettings {
    fn default() -> Self {
        Self {
            tiers: vec![
                TierDefault::new("S Tier", "#FFD700"),
                TierDefault::new("A Tier", "#C0C0C0"),
                TierDefault::new("B Tier", "#CD7F32"),
            ],
            use_colors: true,
            property: "Image".to_string(),
            unranked: "To Rank".to_string(),
            tag: "#tier-list".to_string(),
            settings_marker: "Settings".to_string(),
            width: 70,
            slots: 10,
            ratio: 1.0,
            font_size: 16,
            animation: 150,
            last_slot_type: SlotKind::PlainText,
            from: String::new(),
            where_expr: String::new(),
            show_title: true,
        }
    }
}

impl TierListSettings {
    /// Badge color for a tier label, if a named default matches and colors
    /// are enabled.
    pub fn tier_color(&self, label: &str) -> Option<&str> {
        if !self.use_colors {
            return None;
        }
        self.tiers
            .iter()
            .find(|t| t.name == label)
            .map(|t| t.color.as_str())
    }
}

/// Holds the global record plus per-open-block overlay records, keyed by the
/// block's starting line at render time. Overlays are discarded whenever the
/// host tears the projection down; the global record outlives them.
#[derive(Debug, Clone, Default)]
pub struct SettingsStore {
    global: TierListSettings,
    overlays: HashMap<usize, TierListSettings>,
}

impl SettingsStore {
    pub fn new(global: TierListSettings) -> Self {
        Self {
            global,
            overlays: HashMap::new(),
        }
    }

    pub fn global(&self) -> &TierListSettings {
        &self.global
    }

    pub fn set_global(&mut self, settings: TierListSettings) {
        self.global = settings;
    }

    /// Effective settings for a block: its overlay if one was parsed this
    /// render pass, else the global record.
    pub fn for_block(&self, block_line: usize) -> &TierListSettings {
        self.overlays.get(&block_line).unwrap_or(&self.global)
    }

    pub fn set_overlay(&mut self, block_line: usize, settings: TierListSettings) {
        self.overlays.insert(block_line, settings);
    }

    pub fn clear_overlays(&mut self) {
        self.overlays.clear();
    }

    pub fn reset_defaults(&mut self) {
        self.global = TierListSettings::default();
    }
}

/// Styling parameters pushed onto a rendered board as CSS custom properties,
/// both at global resize time and after a per-block settings change.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleParams {
    pub width_ratio: f64,
    pub slot_count: u32,
    pub aspect_ratio: f64,
    pub font_size: u32,
}

impl StyleParams {
    pub fn from_settings(settings: &TierListSettings) -> Self {
        Self {
            width_ratio: f64::from(settings.width) / 100.0,
            slot_count: settings.slots,
            aspect_ratio: settings.ratio,
            font_size: settings.font_size,
        }
    }

    /// Name/value pairs ready to be set on the target node.
    pub fn css_variables(&self) -> Vec<(&'static str, String)> {
        vec![
            ("--tier-list-width-ratio", format!("{}", self.width_ratio)),
            ("--tier-list-slot-count", format!("{}", self.slot_count)),
            ("--tier-list-aspect-ratio", format!("{}", self.aspect_ratio)),
            ("--tier-list-font-size", format!("{}px", self.font_size)),
        ]
    }
}
