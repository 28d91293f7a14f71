use std::fmt::{self, Debug, Display, Formatter};
use std::str::FromStr;

use ecow::{EcoString, eco_format};

use crate::diag::SolveError;

/// Reference white of the D65 illuminant.
const WHITE_POINT: [f64; 3] = [0.95047, 1.0, 1.08883];

/// A color with floating point red, green and blue channels in `[0, 1]`.
#[derive(Copy, Clone, PartialEq)]
pub struct Rgb {
    /// Red channel.
    pub r: f64,
    /// Green channel.
    pub g: f64,
    /// Blue channel.
    pub b: f64,
}

impl Rgb {
    /// Black color.
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0);

    /// White color.
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0);

    /// Construct a new RGB color.
    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    /// Convert to the naive device CMYK model.
    ///
    /// The key is `1 - max(r, g, b)`. Pure black maps to `(0, 0, 0, 1)`.
    pub fn to_cmyk(self) -> Cmyk {
        let k = 1.0 - self.r.max(self.g).max(self.b);
        if k == 1.0 {
            return Cmyk::BLACK;
        }

        let f = |c: f64| (1.0 - c - k) / (1.0 - k);
        Cmyk::new(f(self.r), f(self.g), f(self.b), k)
    }

    /// Convert to CIE L*a*b* through sRGB companding and D65 XYZ.
    pub fn to_lab(self) -> Lab {
        let linear = |c: f64| {
            if c <= 0.04045 { c / 12.92 } else { ((c + 0.055) / 1.055).powf(2.4) }
        };

        let (r, g, b) = (linear(self.r), linear(self.g), linear(self.b));
        let x = r * 0.4124 + g * 0.3576 + b * 0.1805;
        let y = r * 0.2126 + g * 0.7152 + b * 0.0722;
        let z = r * 0.0193 + g * 0.1192 + b * 0.9505;

        let f = |t: f64| {
            if t > 0.008856 { t.cbrt() } else { 7.787 * t + 16.0 / 116.0 }
        };

        let [xn, yn, zn] = WHITE_POINT;
        let (fx, fy, fz) = (f(x / xn), f(y / yn), f(z / zn));
        Lab::new(116.0 * fy - 16.0, 500.0 * (fx - fy), 200.0 * (fy - fz))
    }

    /// The channels scaled to `0..=255`, without rounding.
    pub fn to_bytes_f64(self) -> [f64; 3] {
        [self.r * 255.0, self.g * 255.0, self.b * 255.0]
    }

    /// Converts this color to a lowercase `#rrggbb` hex code.
    pub fn to_hex(self) -> EcoString {
        let [r, g, b] = self.to_bytes_f64().map(round_u8);
        eco_format!("#{r:02x}{g:02x}{b:02x}")
    }
}

impl FromStr for Rgb {
    type Err = SolveError;

    /// Parses a color from hex strings like `#3450a0` or `3450A0`.
    ///
    /// The hashtag is optional and both lower and upper case are fine, but
    /// exactly six digits are required.
    fn from_str(hex_str: &str) -> Result<Self, Self::Err> {
        let invalid = || SolveError::InvalidHexFormat(hex_str.into());
        let digits = hex_str.strip_prefix('#').unwrap_or(hex_str);
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let channel = |pos: usize| {
            u8::from_str_radix(&digits[pos..pos + 2], 16)
                .map(|v| f64::from(v) / 255.0)
                .map_err(|_| invalid())
        };

        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl Display for Rgb {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let [r, g, b] = self.to_bytes_f64();
        write!(f, "({r:.1}, {g:.1}, {b:.1})")
    }
}

impl Debug for Rgb {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "rgb({:.4}, {:.4}, {:.4})", self.r, self.g, self.b)
    }
}

/// A color in the naive device CMYK model, with components in `[0, 1]`.
///
/// This is not a measured print color. It only serves as the space in which
/// xcolor interpolates mixes.
#[derive(Copy, Clone, PartialEq)]
pub struct Cmyk {
    /// The cyan component.
    pub c: f64,
    /// The magenta component.
    pub m: f64,
    /// The yellow component.
    pub y: f64,
    /// The key (black) component.
    pub k: f64,
}

impl Cmyk {
    /// Pure black.
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0, 1.0);

    /// Paper white.
    pub const WHITE: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    /// Construct a new CMYK color.
    pub const fn new(c: f64, m: f64, y: f64, k: f64) -> Self {
        Self { c, m, y, k }
    }

    /// Simulate this color the way a generic PDF viewer displays it.
    pub fn to_rgb(self) -> Rgb {
        let k = 1.0 - self.k;
        Rgb::new((1.0 - self.c) * k, (1.0 - self.m) * k, (1.0 - self.y) * k)
    }

    /// Mix `percent`% of this color with `100 - percent`% of `other`.
    ///
    /// This is what xcolor does for `self!percent!other`.
    pub fn mix(self, other: Self, percent: u8) -> Self {
        let ratio = f64::from(percent) / 100.0;
        let lerp = |a: f64, b: f64| ratio * a + (1.0 - ratio) * b;
        Self::new(
            lerp(self.c, other.c),
            lerp(self.m, other.m),
            lerp(self.y, other.y),
            lerp(self.k, other.k),
        )
    }

    /// The components as an array of C, M, Y, K.
    pub fn to_array(self) -> [f64; 4] {
        [self.c, self.m, self.y, self.k]
    }
}

impl Debug for Cmyk {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let g = |c: f64| 100.0 * c;
        write!(
            f,
            "cmyk({:.1}%, {:.1}%, {:.1}%, {:.1}%)",
            g(self.c),
            g(self.m),
            g(self.y),
            g(self.k),
        )
    }
}

/// A CIE L*a*b* color relative to D65.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Lab {
    /// Lightness in `[0, 100]`.
    pub l: f64,
    /// Green-red axis.
    pub a: f64,
    /// Blue-yellow axis.
    pub b: f64,
}

impl Lab {
    /// Construct a new Lab color.
    pub const fn new(l: f64, a: f64, b: f64) -> Self {
        Self { l, a, b }
    }
}

/// Convert to the closest u8.
fn round_u8(value: f64) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}
