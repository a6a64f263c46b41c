//! Sequential colour scales.

/// A piecewise-linear colour scale over `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorScale {
    stops: Vec<[u8; 3]>,
}

impl ColorScale {
    /// The 9-step ColorBrewer `Greens` scale, light to dark.
    pub fn greens() -> Self {
        Self {
            stops: vec![
                [247, 252, 245],
                [229, 245, 224],
                [199, 233, 192],
                [161, 217, 155],
                [116, 196, 118],
                [65, 171, 93],
                [35, 139, 69],
                [0, 109, 44],
                [0, 68, 27],
            ],
        }
    }

    /// Colour for `value`, clamped to `[0, 1]`. NaN maps to the low end.
    pub fn color(&self, value: f64) -> [u8; 3] {
        let v = if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) };
        let last = self.stops.len() - 1;
        let pos = v * last as f64;
        let lo = (pos.floor() as usize).min(last);
        let hi = (lo + 1).min(last);
        let t = pos - lo as f64;

        let mut out = [0u8; 3];
        for (i, channel) in out.iter_mut().enumerate() {
            let a = self.stops[lo][i] as f64;
            let b = self.stops[hi][i] as f64;
            *channel = (a + (b - a) * t).round() as u8;
        }
        out
    }

    /// `#rrggbb` hex colour for `value`.
    pub fn hex(&self, value: f64) -> String {
        let [r, g, b] = self.color(value);
        format!("#{r:02x}{g:02x}{b:02x}")
    }
}

impl Default for ColorScale {
    fn default() -> Self {
        Self::greens()
    }
}
