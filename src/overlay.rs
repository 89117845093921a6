//! Inline settings resolver.
//!
//! A block may embed a pseudo-row whose label matches the configured
//! settings marker; its child items are `Key: value` pairs that overlay the
//! global configuration for that block only. Parsing coerces each value by
//! the runtime type of the matching field in the base record; serialization
//! emits one indented line per field that differs from the base.
//!
//! Contract: `parse_overlay(serialize_overlay(x, base), base)` equals
//! applying `x` directly onto a clone of `base`.

use crate::settings::TierListSettings;
use indexmap::IndexMap;

/// Lower-case a key and drop separators so `Font Size`, `fontSize` and
/// `font-size` all resolve to the same field.
fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Split one settings pseudo-item line into its key/value pair.
/// Returns `None` for lines that do not look like `- Key: value`.
pub fn split_pair(line: &str) -> Option<(String, String)> {
    let text = line.trim_start().strip_prefix("- ")?;
    let (key, value) = text.split_once(':')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    Some((key.to_string(), value.trim().to_string()))
}

/// Collect pseudo-item lines into an ordered key→value map. Later
/// occurrences of the same key win.
pub fn collect_pairs<'a>(lines: impl IntoIterator<Item = &'a str>) -> IndexMap<String, String> {
    let mut pairs = IndexMap::new();
    for line in lines {
        if let Some((key, value)) = split_pair(line) {
            pairs.insert(key, value);
        }
    }
    pairs
}

fn parse_bool(key: &str, value: &str) -> Option<bool> {
    match value {
        "true" => Some(true),
        "false" => Some(false),
        _ => {
            log::warn!("settings overlay: expected true/false for '{key}', got '{value}'");
            None
        }
    }
}

fn parse_u32(key: &str, value: &str) -> Option<u32> {
    // integer-or-float text is accepted; fractional input truncates
    match value.parse::<f64>() {
        Ok(n) if n >= 0.0 => Some(n as u32),
        _ => {
            log::warn!("settings overlay: expected a number for '{key}', got '{value}'");
            None
        }
    }
}

fn parse_f64(key: &str, value: &str) -> Option<f64> {
    match value.parse::<f64>() {
        Ok(n) => Some(n),
        Err(_) => {
            log::warn!("settings overlay: expected a number for '{key}', got '{value}'");
            None
        }
    }
}

/// Layer parsed `Key: value` pairs onto a clone of `base`. Unknown keys and
/// uncoercible values are skipped with a diagnostic, never fatal.
pub fn parse_overlay(pairs: &IndexMap<String, String>, base: &TierListSettings) -> TierListSettings {
    let mut settings = base.clone();
    for (key, value) in pairs {
        match normalize_key(key).as_str() {
            "width" => {
                if let Some(n) = parse_u32(key, value) {
                    settings.width = n;
                }
            }
            "slots" => {
                if let Some(n) = parse_u32(key, value) {
                    settings.slots = n;
                }
            }
            "ratio" => {
                if let Some(n) = parse_f64(key, value) {
                    settings.ratio = n;
                }
            }
            "fontsize" => {
                if let Some(n) = parse_u32(key, value) {
                    settings.font_size = n;
                }
            }
            "animation" => {
                if let Some(n) = parse_u32(key, value) {
                    settings.animation = n;
                }
            }
            "image" => settings.property = value.clone(),
            "from" => settings.from = value.clone(),
            "where" => settings.where_expr = value.clone(),
            "unranked" => settings.unranked = value.clone(),
            "title" => {
                if let Some(b) = parse_bool(key, value) {
                    settings.show_title = b;
                }
            }
            "usecolors" => {
                if let Some(b) = parse_bool(key, value) {
                    settings.use_colors = b;
                }
            }
            other => log::warn!("settings overlay: unknown key '{other}' ignored"),
        }
    }
    settings
}

/// Emit one indented `Key: value` pseudo-item line per field of `changed`
/// that differs from `base`, in a fixed human-readable order.
pub fn serialize_overlay(changed: &TierListSettings, base: &TierListSettings) -> Vec<String> {
    let mut lines = Vec::new();
    let mut push = |key: &str, value: String| lines.push(format!("\t- {key}: {value}"));

    if changed.width != base.width {
        push("Width", changed.width.to_string());
    }
    if changed.slots != base.slots {
        push("Slots", changed.slots.to_string());
    }
    if changed.ratio != base.ratio {
        push("Ratio", changed.ratio.to_string());
    }
    if changed.font_size != base.font_size {
        push("FontSize", changed.font_size.to_string());
    }
    if changed.animation != base.animation {
        push("Animation", changed.animation.to_string());
    }
    if changed.property != base.property {
        push("Image", changed.property.clone());
    }
    if changed.from != base.from {
        push("From", changed.from.clone());
    }
    if changed.where_expr != base.where_expr {
        push("Where", changed.where_expr.clone());
    }
    if changed.unranked != base.unranked {
        push("Unranked", changed.unranked.clone());
    }
    if changed.show_title != base.show_title {
        push("Title", changed.show_title.to_string());
    }
    if changed.use_colors != base.use_colors {
        push("UseColors", changed.use_colors.to_string());
    }
    lines
}
