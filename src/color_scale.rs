use std::fmt;

/// Blue ramp used by the interaction and association heatmaps.
pub const DEFAULT_PALETTE: [&str; 10] = [
    "#e8edf1", "#d2dce4", "#bbcbd6", "#a5b9c9", "#8fa8bc", "#7897ae", "#6285a1", "#4b7493", "#356386",
    "#1f5279",
];
pub const NO_DATA_COLOR: &str = "#ffffff";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Parses `#rrggbb` (the leading `#` is optional).
    pub fn from_hex(hex: &str) -> Option<Rgb> {
        let hex = hex.trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        Some(Rgb(r, g, b))
    }

    pub fn to_u32(self) -> u32 {
        ((self.0 as u32) << 16) | ((self.1 as u32) << 8) | self.2 as u32
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

/// Maps a score to a color.
pub trait ColorScale {
    fn color(&self, score: Option<f64>) -> Rgb;
}

/// Splits a numeric domain into equal-width buckets, one per palette entry.
///
/// Scores outside the domain, NaN and missing scores all map to the no-data color.
#[derive(Debug, Clone)]
pub struct QuantizeScale {
    domain: (f64, f64),
    palette: Vec<Rgb>,
    no_data: Rgb,
}

impl QuantizeScale {
    /// Returns `None` for an empty palette or an empty/inverted domain.
    pub fn new(domain: (f64, f64), palette: Vec<Rgb>, no_data: Rgb) -> Option<Self> {
        if palette.is_empty() || !(domain.0 < domain.1) {
            return None;
        }
        Some(QuantizeScale {
            domain,
            palette,
            no_data,
        })
    }

    pub fn no_data(&self) -> Rgb {
        self.no_data
    }

    pub fn buckets(&self) -> usize {
        self.palette.len()
    }

    /// Palette index for an in-domain score.
    pub fn bucket(&self, score: f64) -> Option<usize> {
        let (lo, hi) = self.domain;
        if score.is_nan() || score < lo || score > hi {
            return None;
        }
        let n = self.palette.len();
        let idx = ((score - lo) / (hi - lo) * n as f64).floor() as usize;
        Some(idx.min(n - 1))
    }
}

impl Default for QuantizeScale {
    fn default() -> Self {
        QuantizeScale {
            domain: (0.0, 1.0),
            palette: DEFAULT_PALETTE.iter().filter_map(|c| Rgb::from_hex(c)).collect(),
            no_data: Rgb::from_hex(NO_DATA_COLOR).unwrap_or(Rgb(255, 255, 255)),
        }
    }
}

impl ColorScale for QuantizeScale {
    fn color(&self, score: Option<f64>) -> Rgb {
        score
            .and_then(|s| self.bucket(s))
            .map(|idx| self.palette[idx])
            .unwrap_or(self.no_data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_round_trips_through_display() {
        let c = Rgb::from_hex("#1f5279").unwrap();
        assert_eq!(c, Rgb(0x1f, 0x52, 0x79));
        assert_eq!(c.to_string(), "#1f5279");
        assert_eq!(c.to_u32(), 0x1f5279);
        assert!(Rgb::from_hex("#12345").is_none());
    }

    #[test]
    fn default_scale_spans_palette() {
        let scale = QuantizeScale::default();
        assert_eq!(scale.buckets(), 10);
        assert_eq!(scale.color(Some(0.0)), Rgb::from_hex(DEFAULT_PALETTE[0]).unwrap());
        assert_eq!(scale.color(Some(0.55)), Rgb::from_hex(DEFAULT_PALETTE[5]).unwrap());
        assert_eq!(scale.color(Some(1.0)), Rgb::from_hex(DEFAULT_PALETTE[9]).unwrap());
    }

    #[test]
    fn missing_and_out_of_range_scores_are_no_data() {
        let scale = QuantizeScale::default();
        assert_eq!(scale.color(None), scale.no_data());
        assert_eq!(scale.color(Some(-0.1)), scale.no_data());
        assert_eq!(scale.color(Some(1.5)), scale.no_data());
        assert_eq!(scale.color(Some(f64::NAN)), scale.no_data());
    }

    #[test]
    fn no_data_is_independent_of_bucket_count() {
        let no_data = Rgb(1, 2, 3);
        for n in 1..6 {
            let palette = (0..n).map(|i| Rgb(i as u8, 0, 0)).collect();
            let scale = QuantizeScale::new((0.0, 1.0), palette, no_data).unwrap();
            assert_eq!(scale.color(None), no_data);
        }
    }

    #[test]
    fn rejects_degenerate_configuration() {
        assert!(QuantizeScale::new((0.0, 1.0), Vec::new(), Rgb(0, 0, 0)).is_none());
        assert!(QuantizeScale::new((1.0, 1.0), vec![Rgb(0, 0, 0)], Rgb(0, 0, 0)).is_none());
    }
}
