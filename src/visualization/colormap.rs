//! Color maps for score heatmaps

/// Sequential or diverging palette, sampled by piecewise-linear
/// interpolation between anchor colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMap {
    /// Light yellow to dark red, for non-negative importances
    YlOrRd,
    /// Blue through grey to red, for signed coefficients
    CoolWarm,
}

const YL_OR_RD: [(u8, u8, u8); 9] = [
    (255, 255, 204),
    (255, 237, 160),
    (254, 217, 118),
    (254, 178, 76),
    (253, 141, 60),
    (252, 78, 42),
    (227, 26, 28),
    (189, 0, 38),
    (128, 0, 38),
];

const COOL_WARM: [(u8, u8, u8); 5] = [
    (59, 76, 192),
    (141, 176, 254),
    (221, 221, 221),
    (244, 154, 123),
    (180, 4, 38),
];

impl ColorMap {
    fn anchors(&self) -> &'static [(u8, u8, u8)] {
        match self {
            ColorMap::YlOrRd => &YL_OR_RD,
            ColorMap::CoolWarm => &COOL_WARM,
        }
    }

    /// Color at position `t`, clamped to [0, 1]
    pub fn rgb(&self, t: f64) -> (u8, u8, u8) {
        let anchors = self.anchors();
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let scaled = t * (anchors.len() - 1) as f64;
        let lo = (scaled.floor() as usize).min(anchors.len() - 2);
        let frac = scaled - lo as f64;

        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * frac).round() as u8;
        let (a, b) = (anchors[lo], anchors[lo + 1]);
        (mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
    }
}

/// Maps scores onto [0, 1] before color lookup
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColorScale {
    /// Data minimum to data maximum
    Linear { min: f64, max: f64 },
    /// Symmetric around zero, so zero sits at the palette midpoint
    Centered { limit: f64 },
}

impl ColorScale {
    pub fn linear_over<'a, I: IntoIterator<Item = &'a f64>>(values: I) -> Self {
        let (min, max) = values
            .into_iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        if min.is_finite() {
            ColorScale::Linear { min, max }
        } else {
            ColorScale::Linear { min: 0.0, max: 0.0 }
        }
    }

    pub fn centered_over<'a, I: IntoIterator<Item = &'a f64>>(values: I) -> Self {
        let limit = values.into_iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
        ColorScale::Centered { limit }
    }

    /// Values mapped to the two ends of the palette
    pub fn range(&self) -> (f64, f64) {
        match *self {
            ColorScale::Linear { min, max } => (min, max),
            ColorScale::Centered { limit } => (-limit, limit),
        }
    }

    pub fn position(&self, value: f64) -> f64 {
        match *self {
            ColorScale::Linear { min, max } => {
                if max > min {
                    (value - min) / (max - min)
                } else {
                    0.0
                }
            }
            ColorScale::Centered { limit } => {
                if limit > 0.0 {
                    0.5 + 0.5 * value / limit
                } else {
                    0.5
                }
            }
        }
    }
}

/// Relative luminance above which dark text reads better
pub fn prefers_dark_text((r, g, b): (u8, u8, u8)) -> bool {
    0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64 > 150.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints() {
        assert_eq!(ColorMap::YlOrRd.rgb(0.0), (255, 255, 204));
        assert_eq!(ColorMap::YlOrRd.rgb(1.0), (128, 0, 38));
        assert_eq!(ColorMap::CoolWarm.rgb(0.5), (221, 221, 221));
        assert_eq!(ColorMap::CoolWarm.rgb(-3.0), (59, 76, 192));
        assert_eq!(ColorMap::CoolWarm.rgb(f64::NAN), (59, 76, 192));
    }

    #[test]
    fn test_scales() {
        let values = [0.1, 0.5, 0.9];
        let linear = ColorScale::linear_over(&values);
        assert_eq!(linear.position(0.1), 0.0);
        assert_eq!(linear.position(0.9), 1.0);

        let signed = [-0.5, 0.25];
        let centered = ColorScale::centered_over(&signed);
        assert_eq!(centered.position(0.0), 0.5);
        assert_eq!(centered.position(-0.5), 0.0);
        assert_eq!(centered.position(0.25), 0.75);

        assert_eq!(linear.range(), (0.1, 0.9));
        assert_eq!(centered.range(), (-0.5, 0.5));

        assert_eq!(ColorScale::centered_over(&[0.0]).position(0.0), 0.5);
        assert_eq!(ColorScale::linear_over(&[0.3, 0.3]).position(0.3), 0.0);
    }

    #[test]
    fn test_text_contrast() {
        assert!(prefers_dark_text((255, 255, 204)));
        assert!(!prefers_dark_text((128, 0, 38)));
    }
}
