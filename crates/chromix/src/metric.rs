use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use crate::color::{Lab, Rgb};
use crate::diag::SolveError;

/// `25^7`, which appears in both chroma compensation terms of CIEDE2000.
const POW25_7: f64 = 6_103_515_625.0;

/// How the distance between a candidate and the target is measured.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Metric {
    /// Euclidean distance of the 0-255 scaled RGB channels.
    #[default]
    Rgb,
    /// CIEDE2000 perceptual difference in CIE L*a*b*.
    Lab,
}

impl Metric {
    /// The name used on the command line.
    pub fn name(self) -> &'static str {
        match self {
            Self::Rgb => "rgb",
            Self::Lab => "lab",
        }
    }
}

impl FromStr for Metric {
    type Err = SolveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rgb" => Ok(Self::Rgb),
            "lab" => Ok(Self::Lab),
            _ => Err(SolveError::UnsupportedMetric(s.into())),
        }
    }
}

impl Display for Metric {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.pad(self.name())
    }
}

/// The color being approximated, prepared for repeated gap computations.
#[derive(Debug, Copy, Clone)]
pub struct Target {
    rgb: Rgb,
    lab: Option<Lab>,
}

impl Target {
    /// Prepares a target for the given metric.
    pub fn new(rgb: Rgb, metric: Metric) -> Self {
        let lab = match metric {
            Metric::Rgb => None,
            Metric::Lab => Some(rgb.to_lab()),
        };
        Self { rgb, lab }
    }

    /// The distance between a simulated candidate color and the target.
    pub fn gap(&self, rgb: Rgb) -> f64 {
        match self.lab {
            Some(lab) => ciede2000(rgb.to_lab(), lab),
            None => euclidean(rgb, self.rgb),
        }
    }
}

/// Euclidean distance between two colors on the 0-255 scale per channel.
pub fn euclidean(a: Rgb, b: Rgb) -> f64 {
    let [r1, g1, b1] = a.to_bytes_f64();
    let [r2, g2, b2] = b.to_bytes_f64();
    ((r1 - r2).powi(2) + (g1 - g2).powi(2) + (b1 - b2).powi(2)).sqrt()
}

/// The CIEDE2000 color difference between two Lab colors.
///
/// The parametric factors `kL`, `kC` and `kH` are all one.
pub fn ciede2000(lab1: Lab, lab2: Lab) -> f64 {
    let Lab { l: l1, a: a1, b: b1 } = lab1;
    let Lab { l: l2, a: a2, b: b2 } = lab2;

    // Compensate the a* axis for low chroma colors.
    let c_mean = (a1.hypot(b1) + a2.hypot(b2)) / 2.0;
    let c_mean_pow7 = c_mean.powi(7);
    let g = 0.5 * (1.0 - (c_mean_pow7 / (c_mean_pow7 + POW25_7)).sqrt());
    let a1p = (1.0 + g) * a1;
    let a2p = (1.0 + g) * a2;

    let c1p = a1p.hypot(b1);
    let c2p = a2p.hypot(b2);
    let h1p = hue_angle(a1p, b1);
    let h2p = hue_angle(a2p, b2);
    let achromatic = c1p * c2p == 0.0;

    let dl = l2 - l1;
    let dc = c2p - c1p;
    let dh = if achromatic {
        0.0
    } else if (h2p - h1p).abs() <= 180.0 {
        h2p - h1p
    } else if h2p <= h1p {
        h2p - h1p + 360.0
    } else {
        h2p - h1p - 360.0
    };
    let dh_big = 2.0 * (c1p * c2p).sqrt() * (dh.to_radians() / 2.0).sin();

    let lp_mean = (l1 + l2) / 2.0;
    let cp_mean = (c1p + c2p) / 2.0;
    let hp_mean = if achromatic {
        h1p + h2p
    } else if (h1p - h2p).abs() <= 180.0 {
        (h1p + h2p) / 2.0
    } else if h1p + h2p < 360.0 {
        (h1p + h2p + 360.0) / 2.0
    } else {
        (h1p + h2p - 360.0) / 2.0
    };

    let t = 1.0 - 0.17 * (hp_mean - 30.0).to_radians().cos()
        + 0.24 * (2.0 * hp_mean).to_radians().cos()
        + 0.32 * (3.0 * hp_mean + 6.0).to_radians().cos()
        - 0.20 * (4.0 * hp_mean - 63.0).to_radians().cos();

    let lp_offset = (lp_mean - 50.0).powi(2);
    let sl = 1.0 + (0.015 * lp_offset) / (20.0 + lp_offset).sqrt();
    let sc = 1.0 + 0.045 * cp_mean;
    let sh = 1.0 + 0.015 * cp_mean * t;

    // Rotate the chroma and hue differences in the blue region.
    let d_theta = 30.0 * (-((hp_mean - 275.0) / 25.0).powi(2)).exp();
    let cp_mean_pow7 = cp_mean.powi(7);
    let rc = 2.0 * (cp_mean_pow7 / (cp_mean_pow7 + POW25_7)).sqrt();
    let rt = -(2.0 * d_theta).to_radians().sin() * rc;

    let (tl, tc, th) = (dl / sl, dc / sc, dh_big / sh);
    (tl * tl + tc * tc + th * th + rt * tc * th).sqrt()
}

/// The hue angle in degrees, in `[0, 360)`.
fn hue_angle(a: f64, b: f64) -> f64 {
    if a == 0.0 && b == 0.0 {
        return 0.0;
    }
    b.atan2(a).to_degrees().rem_euclid(360.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_metric() {
        assert_eq!("rgb".parse::<Metric>(), Ok(Metric::Rgb));
        assert_eq!("lab".parse::<Metric>(), Ok(Metric::Lab));
        assert_eq!(
            "LAB".parse::<Metric>(),
            Err(SolveError::UnsupportedMetric("LAB".into()))
        );
        assert_eq!(
            "hsv".parse::<Metric>(),
            Err(SolveError::UnsupportedMetric("hsv".into()))
        );
        assert_eq!(Metric::Lab.to_string(), "lab");
    }

    #[test]
    fn test_euclidean() {
        let red = Rgb::new(1.0, 0.0, 0.0);
        let teal = Rgb::new(0.0, 0.5, 0.5);
        assert_eq!(euclidean(red, red), 0.0);
        assert_eq!(euclidean(red, teal), euclidean(teal, red));
        assert_eq!(euclidean(Rgb::BLACK, Rgb::new(1.0, 0.0, 0.0)), 255.0);

        let diagonal = euclidean(Rgb::BLACK, Rgb::WHITE);
        assert!((diagonal - 255.0 * 3f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn test_ciede2000_identity() {
        for rgb in [
            Rgb::BLACK,
            Rgb::WHITE,
            Rgb::new(1.0, 0.0, 0.0),
            Rgb::new(0.2, 0.31, 0.63),
            Rgb::new(0.5, 0.5, 0.5),
        ] {
            let lab = rgb.to_lab();
            assert_eq!(ciede2000(lab, lab), 0.0);
        }
    }

    #[test]
    fn test_ciede2000_reference_pairs() {
        // Sharma, Wu and Dalal: "The CIEDE2000 Color-Difference Formula:
        // Implementation Notes, Supplementary Test Data, and Mathematical
        // Observations".
        #[track_caller]
        fn test(lab1: (f64, f64, f64), lab2: (f64, f64, f64), expected: f64) {
            let lab1 = Lab::new(lab1.0, lab1.1, lab1.2);
            let lab2 = Lab::new(lab2.0, lab2.1, lab2.2);
            let forward = ciede2000(lab1, lab2);
            let backward = ciede2000(lab2, lab1);
            assert!((forward - expected).abs() < 1e-4, "{forward} != {expected}");
            assert!((forward - backward).abs() < 1e-9);
        }

        test((50.0, 2.6772, -79.7751), (50.0, 0.0, -82.7485), 2.0425);
        test((50.0, 3.1571, -77.2803), (50.0, 0.0, -82.7485), 2.8615);
        test((50.0, -1.3802, -84.2814), (50.0, 0.0, -82.7485), 1.0000);
        test((50.0, 0.0, 0.0), (50.0, -1.0, 2.0), 2.3669);
        test((50.0, 2.49, -0.001), (50.0, -2.49, 0.0009), 7.1792);
        test((50.0, 2.49, -0.001), (50.0, -2.49, 0.0011), 7.2195);
        test((50.0, -0.001, 2.49), (50.0, 0.0011, -2.49), 4.7461);
        test((50.0, 2.5, 0.0), (73.0, 25.0, -18.0), 27.1492);
        test((50.0, 2.5, 0.0), (56.0, -27.0, -3.0), 31.9030);
        test((60.2574, -34.0099, 36.2677), (60.4626, -34.1751, 39.4387), 1.2644);
        test((22.7233, 20.0904, -46.6940), (23.0331, 14.9730, -42.5619), 2.0373);
        test((90.9257, -0.5406, -0.9208), (88.6381, -0.8985, -0.7239), 1.5381);
        test((2.0776, 0.0795, -1.1350), (0.9033, -0.0636, -0.5514), 0.9082);
    }

    #[test]
    fn test_target_gap() {
        let white = Rgb::WHITE;
        let rgb = Target::new(white, Metric::Rgb);
        let lab = Target::new(white, Metric::Lab);
        assert_eq!(rgb.gap(white), 0.0);
        assert_eq!(lab.gap(white), 0.0);
        assert_eq!(rgb.gap(Rgb::BLACK), euclidean(Rgb::BLACK, white));
        assert!(lab.gap(Rgb::BLACK) > 99.0);
    }
}
