//! Inflation rate (%) → border color.
//!
//! Deflation tints red, inflation tints green. Saturation grows by
//! [`SATURATION_PER_POINT`] per percentage point and caps at 255.

use super::palette::Rgb;

pub const SATURATION_PER_POINT: f64 = 20.0;

fn saturation(rate: f64) -> u8 {
    (rate.abs() * SATURATION_PER_POINT).min(255.0).round() as u8
}

/// White for missing/NaN, red-leaning below zero, green-leaning otherwise.
pub fn inflation_color(rate: Option<f64>) -> Rgb {
    let rate = match rate {
        Some(r) if !r.is_nan() => r,
        _ => return Rgb::WHITE,
    };
    let s = saturation(rate);
    if rate < 0.0 {
        Rgb::new(255, 255 - s, 255 - s)
    } else {
        Rgb::new(255 - s, 255, 255 - s)
    }
}

/// `stops` evenly spaced `(rate, color)` samples over `[-span, span]`.
pub fn legend(stops: usize, span: f64) -> Vec<(f64, Rgb)> {
    if stops < 2 {
        return vec![(0.0, inflation_color(Some(0.0)))];
    }
    (0..stops)
        .map(|i| {
            let rate = -span + 2.0 * span * i as f64 / (stops - 1) as f64;
            (rate, inflation_color(Some(rate)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_and_missing_are_neutral() {
        assert_eq!(inflation_color(Some(0.0)), Rgb::WHITE);
        assert_eq!(inflation_color(None), Rgb::WHITE);
        assert_eq!(inflation_color(Some(f64::NAN)), Rgb::WHITE);
    }

    #[test]
    fn sign_selects_hue_family() {
        let deflation = inflation_color(Some(-50.0));
        let inflation = inflation_color(Some(50.0));
        assert_eq!(deflation, Rgb::new(255, 0, 0));
        assert_eq!(inflation, Rgb::new(0, 255, 0));
        assert!(deflation.r > deflation.g);
        assert!(inflation.g > inflation.r);
    }

    #[test]
    fn saturation_is_symmetric_and_bounded() {
        for rate in [0.5, 3.0, 7.2, 12.75, 1e9, f64::INFINITY] {
            let neg = inflation_color(Some(-rate));
            let pos = inflation_color(Some(rate));
            assert_eq!(neg.g, pos.r);
            assert_eq!(neg.b, pos.b);
        }
        assert_eq!(inflation_color(Some(-2.0)), Rgb::new(255, 215, 215));
    }

    #[test]
    fn legend_spans_both_signs() {
        let l = legend(5, 10.0);
        assert_eq!(l.len(), 5);
        assert_eq!(l[0].0, -10.0);
        assert_eq!(l[2], (0.0, Rgb::WHITE));
        assert_eq!(l[4].1, Rgb::new(55, 255, 55));
    }
}
