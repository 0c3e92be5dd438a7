//! 8-bit RGBA colors.
//!
//! Colors are what most stylable properties of an actor end up being, so this
//! module carries the string forms accepted in stylesheets (`#rrggbb`,
//! `rgb()`, named colors) and the HLS-based transforms used by theme
//! functions such as `lighter()` or `shade()`.

use std::fmt;
use std::str::FromStr;

/// An RGBA color with 8 bits per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    /// Red channel.
    pub red: u8,
    /// Green channel.
    pub green: u8,
    /// Blue channel.
    pub blue: u8,
    /// Alpha channel (255 = opaque).
    pub alpha: u8,
}

/// Factor used by [`Color::lighten`].
pub const LIGHTEN_FACTOR: f64 = 1.3;
/// Factor used by [`Color::darken`].
pub const DARKEN_FACTOR: f64 = 0.7;

const NAMED_COLORS: &[(&str, Color)] = &[
    ("transparent", Color::TRANSPARENT),
    ("black", Color::BLACK),
    ("white", Color::WHITE),
    ("red", Color::rgb(255, 0, 0)),
    ("green", Color::rgb(0, 128, 0)),
    ("lime", Color::rgb(0, 255, 0)),
    ("blue", Color::rgb(0, 0, 255)),
    ("yellow", Color::rgb(255, 255, 0)),
    ("cyan", Color::rgb(0, 255, 255)),
    ("aqua", Color::rgb(0, 255, 255)),
    ("magenta", Color::rgb(255, 0, 255)),
    ("fuchsia", Color::rgb(255, 0, 255)),
    ("gray", Color::rgb(128, 128, 128)),
    ("grey", Color::rgb(128, 128, 128)),
    ("silver", Color::rgb(192, 192, 192)),
    ("maroon", Color::rgb(128, 0, 0)),
    ("olive", Color::rgb(128, 128, 0)),
    ("navy", Color::rgb(0, 0, 128)),
    ("purple", Color::rgb(128, 0, 128)),
    ("teal", Color::rgb(0, 128, 128)),
    ("orange", Color::rgb(255, 165, 0)),
];

impl Color {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);
    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Opaque white.
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    /// Create a color from all four channels.
    pub const fn new(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Create an opaque color.
    pub const fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self::new(red, green, blue, 255)
    }

    /// Parse `#rgb`, `#rgba`, `#rrggbb` or `#rrggbbaa`.
    pub fn from_hex(text: &str) -> Option<Self> {
        let hex = text.strip_prefix('#')?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }

        let short = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|v| v * 17);
        let long = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();

        match hex.len() {
            3 => Some(Self::rgb(short(0)?, short(1)?, short(2)?)),
            4 => Some(Self::new(short(0)?, short(1)?, short(2)?, short(3)?)),
            6 => Some(Self::rgb(long(0)?, long(2)?, long(4)?)),
            8 => Some(Self::new(long(0)?, long(2)?, long(4)?, long(6)?)),
            _ => None,
        }
    }

    /// Look up a named color (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        NAMED_COLORS
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, c)| *c)
    }

    /// Parse any of the textual color forms accepted in stylesheets.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.starts_with('#') {
            return Self::from_hex(text);
        }

        if let Some((function, args)) = split_function(text) {
            let args: Vec<&str> = args.split(',').map(str::trim).collect();
            return match (function.to_ascii_lowercase().as_str(), args.as_slice()) {
                ("rgb", [r, g, b]) => Some(Self::rgb(
                    parse_channel(r)?,
                    parse_channel(g)?,
                    parse_channel(b)?,
                )),
                ("rgba", [r, g, b, a]) => Some(Self::new(
                    parse_channel(r)?,
                    parse_channel(g)?,
                    parse_channel(b)?,
                    parse_alpha(a)?,
                )),
                _ => None,
            };
        }

        Self::from_name(text)
    }

    /// Format as `#rrggbbaa`.
    pub fn to_hex_string(&self) -> String {
        format!(
            "#{:02x}{:02x}{:02x}{:02x}",
            self.red, self.green, self.blue, self.alpha
        )
    }

    /// Scale lightness and saturation in HLS space by `factor`.
    ///
    /// Both are clamped to `[0, 1]`; alpha is kept.
    pub fn shade(self, factor: f64) -> Self {
        let (hue, lightness, saturation) = self.to_hls();
        let lightness = (lightness * factor).clamp(0.0, 1.0);
        let saturation = (saturation * factor).clamp(0.0, 1.0);
        Self::from_hls(hue, lightness, saturation, self.alpha)
    }

    /// A lighter variant of this color.
    pub fn lighten(self) -> Self {
        self.shade(LIGHTEN_FACTOR)
    }

    /// A darker variant of this color.
    pub fn darken(self) -> Self {
        self.shade(DARKEN_FACTOR)
    }

    /// Multiply the alpha channel by `factor`, clamped to `[0, 255]`.
    pub fn with_alpha_factor(self, factor: f64) -> Self {
        let alpha = (f64::from(self.alpha) * factor).clamp(0.0, 255.0);
        Self {
            alpha: alpha.round() as u8,
            ..self
        }
    }

    /// Linear interpolation towards `other`; `0.0` is `self`, `1.0` is `other`.
    pub fn mix(self, other: Self, factor: f64) -> Self {
        let lerp = |a: u8, b: u8| {
            let a = f64::from(a);
            let b = f64::from(b);
            (a + (b - a) * factor).round().clamp(0.0, 255.0) as u8
        };
        Self::new(
            lerp(self.red, other.red),
            lerp(self.green, other.green),
            lerp(self.blue, other.blue),
            lerp(self.alpha, other.alpha),
        )
    }

    /// Convert to (hue in degrees, lightness, saturation).
    pub fn to_hls(self) -> (f64, f64, f64) {
        let red = f64::from(self.red) / 255.0;
        let green = f64::from(self.green) / 255.0;
        let blue = f64::from(self.blue) / 255.0;

        let max = red.max(green).max(blue);
        let min = red.min(green).min(blue);
        let lightness = (max + min) / 2.0;

        if max == min {
            return (0.0, lightness, 0.0);
        }

        let delta = max - min;
        let saturation = if lightness <= 0.5 {
            delta / (max + min)
        } else {
            delta / (2.0 - max - min)
        };

        let mut hue = if red == max {
            (green - blue) / delta
        } else if green == max {
            2.0 + (blue - red) / delta
        } else {
            4.0 + (red - green) / delta
        };
        hue *= 60.0;
        if hue < 0.0 {
            hue += 360.0;
        }

        (hue, lightness, saturation)
    }

    /// Build a color from HLS components and an alpha channel.
    pub fn from_hls(hue: f64, lightness: f64, saturation: f64, alpha: u8) -> Self {
        let to_byte = |v: f64| (v * 255.0).round().clamp(0.0, 255.0) as u8;

        if saturation == 0.0 {
            let v = to_byte(lightness);
            return Self::new(v, v, v, alpha);
        }

        let m2 = if lightness <= 0.5 {
            lightness * (1.0 + saturation)
        } else {
            lightness + saturation - lightness * saturation
        };
        let m1 = 2.0 * lightness - m2;

        let channel = |hue: f64| {
            let hue = hue.rem_euclid(360.0);
            if hue < 60.0 {
                m1 + (m2 - m1) * hue / 60.0
            } else if hue < 180.0 {
                m2
            } else if hue < 240.0 {
                m1 + (m2 - m1) * (240.0 - hue) / 60.0
            } else {
                m1
            }
        };

        Self::new(
            to_byte(channel(hue + 120.0)),
            to_byte(channel(hue)),
            to_byte(channel(hue - 120.0)),
            alpha,
        )
    }
}

/// Parse one color channel: `0`-`255` or `0%`-`100%`.
///
/// Percentages map to `floor(256 * p / 100)` capped at 255, so `50%` is 128.
pub fn parse_channel(text: &str) -> Option<u8> {
    let text = text.trim();
    if let Some(percent) = text.strip_suffix('%') {
        let percent: f64 = percent.trim().parse().ok()?;
        if !(0.0..=100.0).contains(&percent) {
            return None;
        }
        return Some((256.0 * percent / 100.0).floor().min(255.0) as u8);
    }

    let value: f64 = text.parse().ok()?;
    if !(0.0..=255.0).contains(&value) {
        return None;
    }
    Some(value.round() as u8)
}

/// Parse an alpha value: `0.0`-`1.0` or `0%`-`100%`.
pub fn parse_alpha(text: &str) -> Option<u8> {
    let text = text.trim();
    let fraction = match text.strip_suffix('%') {
        Some(percent) => percent.trim().parse::<f64>().ok()? / 100.0,
        None => text.parse::<f64>().ok()?,
    };
    if !(0.0..=1.0).contains(&fraction) {
        return None;
    }
    Some((fraction * 255.0).round() as u8)
}

fn split_function(text: &str) -> Option<(&str, &str)> {
    let open = text.find('(')?;
    let inner = text[open + 1..].strip_suffix(')')?;
    Some((text[..open].trim(), inner))
}

impl FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("'{s}' is not a color"))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_forms() {
        assert_eq!(Color::from_hex("#f00"), Some(Color::rgb(255, 0, 0)));
        assert_eq!(Color::from_hex("#ff000080"), Some(Color::new(255, 0, 0, 128)));
        assert_eq!(Color::from_hex("#00ff00"), Some(Color::rgb(0, 255, 0)));
        assert_eq!(Color::from_hex("#12345"), None);
        assert_eq!(Color::from_hex("#ggg"), None);
    }

    #[test]
    fn functional_and_named_forms() {
        assert_eq!(Color::parse("rgb(255, 0, 0)"), Some(Color::rgb(255, 0, 0)));
        assert_eq!(
            Color::parse("rgba(0, 0, 255, 0.5)"),
            Some(Color::new(0, 0, 255, 128))
        );
        assert_eq!(Color::parse("White"), Some(Color::WHITE));
        assert_eq!(Color::parse("rgb(300, 0, 0)"), None);
        assert_eq!(Color::parse("no-such-color"), None);
    }

    #[test]
    fn channel_percentages() {
        assert_eq!(parse_channel("50%"), Some(128));
        assert_eq!(parse_channel("100%"), Some(255));
        assert_eq!(parse_channel("0%"), Some(0));
        assert_eq!(parse_channel("101%"), None);
        assert_eq!(parse_channel("256"), None);
    }

    #[test]
    fn hex_string_round_trip() {
        let color = Color::new(0x12, 0x34, 0x56, 0x78);
        assert_eq!(color.to_hex_string(), "#12345678");
        assert_eq!(Color::parse(&color.to_hex_string()), Some(color));
    }

    #[test]
    fn shading() {
        let gray = Color::rgb(100, 100, 100);
        let lighter = gray.lighten();
        let darker = gray.darken();
        assert!(lighter.red > gray.red);
        assert!(darker.red < gray.red);
        assert_eq!(lighter.alpha, 255);

        // Hue is kept while saturation drops.
        let red = Color::rgb(200, 0, 0).darken();
        assert!(red.red < 200);
        assert!(red.red > red.green);
        assert_eq!(red.green, red.blue);
    }

    #[test]
    fn hls_round_trip() {
        let color = Color::rgb(30, 144, 255);
        let (h, l, s) = color.to_hls();
        assert_eq!(Color::from_hls(h, l, s, 255), color);
    }

    #[test]
    fn alpha_and_mix() {
        let color = Color::new(10, 20, 30, 200);
        assert_eq!(color.with_alpha_factor(0.5).alpha, 100);
        assert_eq!(color.with_alpha_factor(4.0).alpha, 255);

        let a = Color::BLACK;
        let b = Color::WHITE;
        assert_eq!(a.mix(b, 0.0), a);
        assert_eq!(a.mix(b, 1.0), b);
        assert_eq!(a.mix(b, 0.5), Color::rgb(128, 128, 128));
    }
}
