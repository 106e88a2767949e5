use std::collections::BTreeMap;
use std::str::FromStr;

use eframe::egui::Color32;
use palette::Srgb;

use ionic_trends::config::{DashboardConfig, DEFAULT_TOPIC_COLORS};
use ionic_trends::data::model::TopicId;

// ---------------------------------------------------------------------------
// Hex colour parsing
// ---------------------------------------------------------------------------

/// Parse `#rrggbb` / `#rgb` (leading `#` optional).
pub fn parse_hex(s: &str) -> Option<Color32> {
    let rgb = Srgb::<u8>::from_str(s.trim()).ok()?;
    Some(Color32::from_rgb(rgb.red, rgb.green, rgb.blue))
}

// ---------------------------------------------------------------------------
// Color mapping: topic → Color32
// ---------------------------------------------------------------------------

/// One fixed colour per research topic.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<TopicId, Color32>,
    default_color: Color32,
}

impl ColorMap {
    /// Configured colours first, then the default palette.
    pub fn from_config(config: &DashboardConfig) -> Self {
        let mapping = TopicId::all()
            .map(|topic| {
                let configured = config.topic_color(topic).and_then(|hex| {
                    let color = parse_hex(hex);
                    if color.is_none() {
                        log::warn!("Ignoring invalid colour '{hex}' for topic {topic}");
                    }
                    color
                });
                let fallback = DEFAULT_TOPIC_COLORS
                    .get(usize::from(topic.get()))
                    .and_then(|hex| parse_hex(hex));
                (topic, configured.or(fallback).unwrap_or(Color32::GRAY))
            })
            .collect();

        ColorMap {
            mapping,
            default_color: Color32::from_rgb(0x33, 0x33, 0x33),
        }
    }

    pub fn color_for(&self, topic: TopicId) -> Color32 {
        self.mapping
            .get(&topic)
            .copied()
            .unwrap_or(self.default_color)
    }
}
