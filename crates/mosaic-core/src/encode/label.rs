use serde::{Deserialize, Serialize};

/// Monetary value → `"2.50T"`, `"3.00B"`, `"4.10M"`, or `"N/A"`.
///
/// Values under one million and non-finite values have no bucket.
pub fn format_magnitude(value: f64) -> String {
    const BUCKETS: [(f64, &str); 3] = [(1e12, "T"), (1e9, "B"), (1e6, "M")];

    if !value.is_finite() {
        return "N/A".to_string();
    }
    BUCKETS
        .iter()
        .find(|&&(threshold, _)| value >= threshold)
        .map(|&(threshold, suffix)| format!("{:.2}{suffix}", value / threshold))
        .unwrap_or_else(|| "N/A".to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelRole {
    Name,
    Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextLabel {
    pub role: LabelRole,
    pub text: String,
    pub font_px: f64,
    pub anchor: [f64; 2],
}

/// Area gates and font sizing for shape labels. Areas are in px².
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelPolicy {
    /// Name label drawn only above this area.
    pub name_min_area: f64,
    /// Magnitude label drawn only above this (larger) area.
    pub value_min_area: f64,
    pub min_font_px: f64,
    /// Font px per unit of `sqrt(area)`.
    pub font_scale: f64,
    /// Magnitude label size relative to the name label.
    pub value_font_ratio: f64,
}

impl Default for LabelPolicy {
    fn default() -> Self {
        Self {
            name_min_area: 1_500.0,
            value_min_area: 5_000.0,
            min_font_px: 9.0,
            font_scale: 0.12,
            value_font_ratio: 0.8,
        }
    }
}

impl LabelPolicy {
    pub fn font_size(&self, area: f64) -> f64 {
        (area.max(0.0).sqrt() * self.font_scale).max(self.min_font_px)
    }

    /// Labels for a shape of `area` centred on `anchor`: name first, value
    /// stacked below it.
    pub fn plan(&self, area: f64, anchor: [f64; 2], name: &str, value: f64) -> Vec<TextLabel> {
        let mut labels = Vec::new();
        if area.is_nan() || area <= self.name_min_area {
            return labels;
        }

        let font_px = self.font_size(area);
        labels.push(TextLabel {
            role: LabelRole::Name,
            text: name.to_string(),
            font_px,
            anchor,
        });

        if area > self.value_min_area {
            let value_px = (font_px * self.value_font_ratio).max(self.min_font_px);
            labels.push(TextLabel {
                role: LabelRole::Value,
                text: format_magnitude(value),
                font_px: value_px,
                anchor: [anchor[0], anchor[1] + font_px],
            });
        }
        labels
    }
}
