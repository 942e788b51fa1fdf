use serde::{Deserialize, Serialize};

/// Unemployment rate (%) → fill opacity.
///
/// Rates are clamped to `[base_rate, max_rate]` and mapped linearly onto
/// `[base_opacity, max_opacity]`. Missing or NaN rates map to `fallback`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpacityScale {
    pub base_rate: f64,
    pub max_rate: f64,
    pub base_opacity: f64,
    pub max_opacity: f64,
    pub fallback: f64,
}

impl Default for OpacityScale {
    fn default() -> Self {
        Self {
            base_rate: 4.0,
            max_rate: 15.0,
            base_opacity: 1.0,
            max_opacity: 0.3,
            fallback: 1.0,
        }
    }
}

impl OpacityScale {
    pub fn opacity(&self, rate: Option<f64>) -> f64 {
        let rate = match rate {
            Some(r) if !r.is_nan() => r,
            _ => return self.fallback.clamp(0.0, 1.0),
        };

        let span = self.max_rate - self.base_rate;
        let t = if span > 0.0 {
            (rate.clamp(self.base_rate, self.max_rate) - self.base_rate) / span
        } else if rate > self.base_rate {
            1.0
        } else {
            0.0
        };
        (self.base_opacity + t * (self.max_opacity - self.base_opacity)).clamp(0.0, 1.0)
    }
}
