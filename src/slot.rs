//! Two-way codec between a raw list-item line and its structured form.
//!
//! One line of the block grammar (see the crate docs) decodes into a [`Slot`]:
//! the content classification, the referenced value, an optional display
//! alias, and optional inline color/transform annotations carried in a style
//! span wrapper. Encoding is the exact inverse up to whitespace and
//! attribute-order normalization. Decoding never fails: markup that matches
//! no bracket/paren form degrades to plain text.
//!
//! The same codec handles ranked items (tab-indented) and tier-row labels
//! (not indented); the two are distinguished purely by leading whitespace.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static STYLE_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<span style="([^">]+);">(.+?)</span>"#).unwrap());

static TRANSLATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"translate\(\s*(-?[\d.]+)px\s*,\s*(-?[\d.]+)px\s*\)").unwrap());
static ROTATE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"rotate\(\s*(-?[\d.]+)deg\s*\)").unwrap());
static SCALE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"scale\(\s*(-?[\d.]+)\s*(?:,\s*(-?[\d.]+)\s*)?\)").unwrap());

static INTERNAL_EMBED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"!\[\[(.*?)(?:\|(.*?))?\]\]").unwrap());
static INTERNAL_LINK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[\[(.*?)(?:\|(.*?))?\]\]").unwrap());
static EXTERNAL_EMBED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"!\[(.*?)\]\((.*?)\)").unwrap());
static EXTERNAL_LINK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[(.*?)\]\((.*?)\)").unwrap());

/// Content classification for one slot line.
///
/// Classification priority is a documented contract: embed before link,
/// internal before external, first match wins. `![[x]]` must never be read
/// as an internal link with a stray `!`, and `![a](u)` must never be read as
/// an external link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SlotKind {
    #[default]
    PlainText,
    InternalEmbed,
    InternalLink,
    ExternalEmbed,
    ExternalLink,
}

/// 2D placement override for a slot, serialized into a CSS-transform-like
/// declaration only when it differs from identity. Mirroring is encoded as
/// negative scale components; a single negative scalar mirrors both axes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlotTransform {
    pub x: f64,
    pub y: f64,
    pub rotation: f64,
    pub scale: f64,
    pub mirror_x: bool,
    pub mirror_y: bool,
}

impl Default for SlotTransform {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            rotation: 0.0,
            scale: 1.0,
            mirror_x: false,
            mirror_y: false,
        }
    }
}

impl SlotTransform {
    pub fn is_identity(&self) -> bool {
        *self == Self::default()
    }

    fn parse(decl: &str) -> Self {
        let mut t = Self::default();
        if let Some(cap) = TRANSLATE.captures(decl) {
            t.x = cap[1].parse().unwrap_or(0.0);
            t.y = cap[2].parse().unwrap_or(0.0);
        }
        if let Some(cap) = ROTATE.captures(decl) {
            t.rotation = cap[1].parse().unwrap_or(0.0);
        }
        if let Some(cap) = SCALE.captures(decl) {
            let sx: f64 = cap[1].parse().unwrap_or(1.0);
            match cap.get(2) {
                Some(sy) => {
                    let sy: f64 = sy.as_str().parse().unwrap_or(1.0);
                    // the uniform factor is taken from the x component
                    t.scale = sx.abs();
                    t.mirror_x = sx < 0.0;
                    t.mirror_y = sy < 0.0;
                }
                None => {
                    t.scale = sx.abs();
                    t.mirror_x = sx < 0.0;
                    t.mirror_y = sx < 0.0;
                }
            }
        }
        t
    }

    /// Render as a `transform: ...;` declaration, omitting any component
    /// that is itself identity. Returns `None` for the full identity.
    fn to_declaration(&self) -> Option<String> {
        if self.is_identity() {
            return None;
        }
        let mut parts = Vec::new();
        if self.x != 0.0 || self.y != 0.0 {
            parts.push(format!("translate({}px, {}px)", fmt_num(self.x), fmt_num(self.y)));
        }
        if self.rotation != 0.0 {
            parts.push(format!("rotate({}deg)", fmt_num(self.rotation)));
        }
        let sx = if self.mirror_x { -self.scale } else { self.scale };
        let sy = if self.mirror_y { -self.scale } else { self.scale };
        if self.scale != 1.0 || self.mirror_x || self.mirror_y {
            if sx == sy {
                parts.push(format!("scale({})", fmt_num(sx)));
            } else {
                parts.push(format!("scale({}, {})", fmt_num(sx), fmt_num(sy)));
            }
        }
        Some(format!("transform: {};", parts.join(" ")))
    }
}

fn fmt_num(v: f64) -> String {
    if v.fract() == 0.0 { format!("{}", v as i64) } else { format!("{v}") }
}

/// A single rankable entry, or a tier row's own label line.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Slot {
    pub kind: SlotKind,
    pub value: String,
    pub alias: Option<String>,
    /// Tab-prefixed lines are ranked items; bare lines are tier labels.
    pub indented: bool,
    /// Inline background override. `None` means the ambient UI default.
    pub color: Option<String>,
    pub transform: SlotTransform,
}

impl Slot {
    /// Parse one raw list-item line. Never fails.
    pub fn decode(raw: &str) -> Self {
        let mut slot = Self {
            indented: raw.starts_with('\t'),
            ..Self::default()
        };

        let mut text = raw.trim_start();
        text = text.strip_prefix("- ").unwrap_or(text);

        let mut inner = text.to_string();
        if let Some(cap) = STYLE_SPAN.captures(text) {
            let decls = cap.get(1).map_or("", |m| m.as_str());
            inner = cap.get(2).map_or("", |m| m.as_str()).to_string();
            for decl in decls.split(';').map(str::trim).filter(|s| !s.is_empty()) {
                if let Some((key, val)) = decl.split_once(':') {
                    match key.trim() {
                        "background-color" | "background" => slot.color = Some(val.trim().to_string()),
                        "transform" => slot.transform = SlotTransform::parse(val),
                        _ => {}
                    }
                }
            }
        }

        if let Some(cap) = INTERNAL_EMBED.captures(&inner) {
            slot.kind = SlotKind::InternalEmbed;
            slot.value = cap.get(1).map_or("", |m| m.as_str()).to_string();
            slot.alias = cap.get(2).map(|m| m.as_str().to_string());
        } else if let Some(cap) = INTERNAL_LINK.captures(&inner) {
            slot.kind = SlotKind::InternalLink;
            slot.value = cap.get(1).map_or("", |m| m.as_str()).to_string();
            slot.alias = cap.get(2).map(|m| m.as_str().to_string());
        } else if let Some(cap) = EXTERNAL_EMBED.captures(&inner) {
            slot.kind = SlotKind::ExternalEmbed;
            slot.alias = cap.get(1).map(|m| m.as_str().to_string());
            slot.value = cap.get(2).map_or("", |m| m.as_str()).to_string();
        } else if let Some(cap) = EXTERNAL_LINK.captures(&inner) {
            slot.kind = SlotKind::ExternalLink;
            slot.alias = cap.get(1).map(|m| m.as_str().to_string());
            slot.value = cap.get(2).map_or("", |m| m.as_str()).to_string();
        } else {
            slot.kind = SlotKind::PlainText;
            slot.value = inner;
        }

        slot.value = slot.value.trim().to_string();
        slot.alias = slot
            .alias
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .map(str::to_string);
        slot
    }

    /// Rebuild the raw line. Exact inverse of [`Slot::decode`] up to
    /// whitespace and attribute-order normalization.
    pub fn encode(&self) -> String {
        let inner = match self.kind {
            SlotKind::InternalEmbed => match &self.alias {
                Some(alias) => format!("![[{} | {}]]", self.value, alias),
                None => format!("![[{}]]", self.value),
            },
            SlotKind::InternalLink => match &self.alias {
                Some(alias) => format!("[[{} | {}]]", self.value, alias),
                None => format!("[[{}]]", self.value),
            },
            SlotKind::ExternalEmbed => format!("![{}]({})", self.alias.as_deref().unwrap_or(""), self.value),
            SlotKind::ExternalLink => format!("[{}]({})", self.alias.as_deref().unwrap_or(""), self.value),
            SlotKind::PlainText => self.value.clone(),
        };

        let mut styles = Vec::new();
        if let Some(color) = &self.color {
            styles.push(format!("background-color:{color};"));
        }
        if let Some(decl) = self.transform.to_declaration() {
            styles.push(decl);
        }

        let body = if styles.is_empty() {
            inner
        } else {
            format!(r#"<span style="{}">{}</span>"#, styles.join(" "), inner)
        };

        format!("{}- {}", if self.indented { "\t" } else { "" }, body)
    }
}

/// Extract the referenced target from a line using the same bracket/paren
/// grammar as the full codec, without decoding styles or indentation. Used
/// by the bulk-insert de-duplication scan.
pub(crate) fn link_target(line: &str) -> Option<String> {
    if let Some(cap) = INTERNAL_EMBED.captures(line).or_else(|| INTERNAL_LINK.captures(line)) {
        return cap.get(1).map(|m| m.as_str().trim().to_string());
    }
    if let Some(cap) = EXTERNAL_EMBED.captures(line).or_else(|| EXTERNAL_LINK.captures(line)) {
        return cap.get(2).map(|m| m.as_str().trim().to_string());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_decode_internal_link_with_alias() {
        let slot = Slot::decode("\t- [[Cover Art|Art]]");
        assert_eq!(slot.kind, SlotKind::InternalLink);
        assert_eq!(slot.value, "Cover Art");
        assert_eq!(slot.alias.as_deref(), Some("Art"));
        assert!(slot.indented);
        assert_eq!(slot.color, None);
        assert!(slot.transform.is_identity());
        // normalized alias spacing on re-encode
        assert_eq!(slot.encode(), "\t- [[Cover Art | Art]]");
    }

    #[test]
    fn test_decode_internal_embed_before_link() {
        let slot = Slot::decode("\t- ![[poster.png]]");
        assert_eq!(slot.kind, SlotKind::InternalEmbed);
        assert_eq!(slot.value, "poster.png");
        assert_eq!(slot.encode(), "\t- ![[poster.png]]");
    }

    #[test]
    fn test_decode_external_forms() {
        let embed = Slot::decode("\t- ![cover](https://example.com/a.png)");
        assert_eq!(embed.kind, SlotKind::ExternalEmbed);
        assert_eq!(embed.value, "https://example.com/a.png");
        assert_eq!(embed.alias.as_deref(), Some("cover"));

        let link = Slot::decode("\t- [site](https://example.com)");
        assert_eq!(link.kind, SlotKind::ExternalLink);
        assert_eq!(link.value, "https://example.com");
        assert_eq!(link.encode(), "\t- [site](https://example.com)");
    }

    #[test]
    fn test_decode_plain_text_fallback() {
        let slot = Slot::decode("- S Tier");
        assert_eq!(slot.kind, SlotKind::PlainText);
        assert_eq!(slot.value, "S Tier");
        assert!(!slot.indented);
        assert_eq!(slot.encode(), "- S Tier");
    }

    #[test]
    fn test_malformed_markup_degrades_to_plain_text() {
        let slot = Slot::decode("\t- [[unterminated");
        assert_eq!(slot.kind, SlotKind::PlainText);
        assert_eq!(slot.value, "[[unterminated");

        let slot = Slot::decode("\t- [alias](no close");
        assert_eq!(slot.kind, SlotKind::PlainText);
    }

    #[test]
    fn test_color_span_round_trip() {
        let raw = r#"- <span style="background-color:#ff0000;">S Tier</span>"#;
        let slot = Slot::decode(raw);
        assert_eq!(slot.value, "S Tier");
        assert_eq!(slot.color.as_deref(), Some("#ff0000"));
        assert_eq!(slot.encode(), raw);
    }

    #[test]
    fn test_background_shorthand_accepted() {
        let slot = Slot::decode(r#"- <span style="background:#00ff00;">x</span>"#);
        assert_eq!(slot.color.as_deref(), Some("#00ff00"));
    }

    #[test]
    fn test_transform_parse_components() {
        let raw = "\t- <span style=\"transform: translate(10px, -4px) rotate(15deg) scale(2);\">[[A]]</span>";
        let slot = Slot::decode(raw);
        assert_eq!(slot.transform.x, 10.0);
        assert_eq!(slot.transform.y, -4.0);
        assert_eq!(slot.transform.rotation, 15.0);
        assert_eq!(slot.transform.scale, 2.0);
        assert!(!slot.transform.mirror_x);
        assert!(!slot.transform.mirror_y);
    }

    #[test]
    fn test_transform_single_negative_scalar_mirrors_both_axes() {
        let t = SlotTransform::parse("scale(-1.5)");
        assert_eq!(t.scale, 1.5);
        assert!(t.mirror_x);
        assert!(t.mirror_y);
    }

    #[test]
    fn test_transform_two_components_mirror_per_axis() {
        let t = SlotTransform::parse("scale(-2, 2)");
        assert_eq!(t.scale, 2.0);
        assert!(t.mirror_x);
        assert!(!t.mirror_y);
    }

    #[test]
    fn test_transform_identity_never_emitted() {
        let slot = Slot {
            kind: SlotKind::PlainText,
            value: "x".into(),
            color: Some("#123456".into()),
            ..Slot::default()
        };
        let line = slot.encode();
        assert!(!line.contains("transform"), "identity transform leaked: {line}");
    }

    #[test]
    fn test_transform_component_omission() {
        // zero translation and unit scale are omitted, rotation kept
        let slot = Slot {
            kind: SlotKind::PlainText,
            value: "x".into(),
            transform: SlotTransform {
                rotation: 90.0,
                ..SlotTransform::default()
            },
            ..Slot::default()
        };
        assert_eq!(slot.encode(), r#"- <span style="transform: rotate(90deg);">x</span>"#);
    }

    #[test]
    fn test_transform_round_trip() {
        let raw = r#"- <span style="background-color:#aabbcc; transform: translate(3px, 7px) scale(-1, 1);">[[Note | N]]</span>"#;
        let slot = Slot::decode(raw);
        assert_eq!(slot.color.as_deref(), Some("#aabbcc"));
        assert!(slot.transform.mirror_x);
        assert!(!slot.transform.mirror_y);
        assert_eq!(slot.encode(), raw);
    }

    #[test]
    fn test_tier_label_and_item_share_codec() {
        let tier = Slot::decode("- [[S Tier Notes]]");
        let item = Slot::decode("\t- [[S Tier Notes]]");
        assert!(!tier.indented);
        assert!(item.indented);
        assert_eq!(tier.kind, item.kind);
        assert_eq!(tier.value, item.value);
    }

    #[test]
    fn test_value_and_alias_trimmed() {
        let slot = Slot::decode("\t- [[ Cover Art | Art ]]");
        assert_eq!(slot.value, "Cover Art");
        assert_eq!(slot.alias.as_deref(), Some("Art"));
    }

    #[test]
    fn test_empty_alias_dropped() {
        let slot = Slot::decode("\t- [[Note|]]");
        assert_eq!(slot.alias, None);
        assert_eq!(slot.encode(), "\t- [[Note]]");
    }

    #[test]
    fn test_link_target_extraction() {
        assert_eq!(link_target("\t- [[Alpha]]").as_deref(), Some("Alpha"));
        assert_eq!(link_target("\t- [[Beta|B]]").as_deref(), Some("Beta"));
        assert_eq!(link_target("\t- ![x](http://e.com/i.png)").as_deref(), Some("http://e.com/i.png"));
        assert_eq!(link_target("\t- plain"), None);
    }
}
