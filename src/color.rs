//! Loosely-typed color specifications and their normalization to RGB

use image::{Rgb, Rgba};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Color returned for any specification that cannot be resolved.
pub const FALLBACK: Rgb<u8> = Rgb([0, 0, 0]);

const NAMED_COLORS: &[(&str, [u8; 3])] = &[
    ("black", [0, 0, 0]),
    ("white", [255, 255, 255]),
    ("red", [255, 0, 0]),
    ("green", [0, 255, 0]),
    ("blue", [0, 0, 255]),
    ("yellow", [255, 255, 0]),
    ("cyan", [0, 255, 255]),
    ("magenta", [255, 0, 255]),
    ("gray", [128, 128, 128]),
    ("grey", [128, 128, 128]),
];

/// A color as supplied by configuration or the command line.
///
/// Every variant resolves to an RGB triple through [`normalize`]; resolution
/// never fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawColor", into = "RawColor")]
pub enum ColorSpec {
    /// Case-insensitive palette name such as `"Blue"`
    Named(String),
    /// `#RRGGBB` (or `#RGB`) hex string
    Hex(String),
    /// Opaque channel triple
    Rgb(u8, u8, u8),
    /// Channel quadruple; alpha is ignored on normalization
    Rgba(u8, u8, u8, u8),
}

impl ColorSpec {
    /// Shorthand for a named color.
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    /// Resolve to RGB, see [`normalize`].
    pub fn to_rgb(&self) -> Rgb<u8> {
        normalize(self)
    }

    /// Resolve to an opaque RGBA pixel.
    pub fn to_rgba(&self) -> Rgba<u8> {
        let Rgb([r, g, b]) = normalize(self);
        Rgba([r, g, b, 255])
    }
}

impl From<[u8; 3]> for ColorSpec {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self::Rgb(r, g, b)
    }
}

impl From<Rgb<u8>> for ColorSpec {
    fn from(Rgb([r, g, b]): Rgb<u8>) -> Self {
        Self::Rgb(r, g, b)
    }
}

impl fmt::Display for ColorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => f.write_str(name),
            Self::Hex(hex) => f.write_str(hex),
            Self::Rgb(r, g, b) => write!(f, "{r},{g},{b}"),
            Self::Rgba(r, g, b, a) => write!(f, "{r},{g},{b},{a}"),
        }
    }
}

/// Parses CLI-style input: `#hex`, `r,g,b[,a]`, or a color name.
///
/// Parsing never fails; unrecognized text becomes [`ColorSpec::Named`] and
/// falls back on normalization.
impl FromStr for ColorSpec {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.starts_with('#') {
            return Ok(Self::Hex(trimmed.to_string()));
        }

        if trimmed.contains(',') {
            let channels: Option<Vec<u8>> = trimmed
                .split(',')
                .map(|part| part.trim().parse::<u8>().ok())
                .collect();
            match channels.as_deref() {
                Some(&[r, g, b]) => return Ok(Self::Rgb(r, g, b)),
                Some(&[r, g, b, a]) => return Ok(Self::Rgba(r, g, b, a)),
                _ => {}
            }
        }

        Ok(Self::Named(trimmed.to_string()))
    }
}

/// Map any color specification to a canonical RGB triple.
///
/// Tuples pass through with alpha dropped, `#RRGGBB` strings are parsed per
/// channel, and palette names are matched case-insensitively. Anything else
/// resolves to black with a warning.
pub fn normalize(color: &ColorSpec) -> Rgb<u8> {
    let resolved = match color {
        ColorSpec::Rgb(r, g, b) | ColorSpec::Rgba(r, g, b, _) => Some(Rgb([*r, *g, *b])),
        ColorSpec::Hex(hex) => parse_hex(hex).or_else(|| lookup_name(hex)),
        ColorSpec::Named(name) => {
            if name.trim_start().starts_with('#') {
                parse_hex(name)
            } else {
                lookup_name(name)
            }
        }
    };

    resolved.unwrap_or_else(|| {
        tracing::warn!(color = %color, "Unrecognized color, using black");
        FALLBACK
    })
}

fn parse_hex(value: &str) -> Option<Rgb<u8>> {
    let hex = value.trim().strip_prefix('#')?;
    if !hex.is_ascii() {
        return None;
    }

    match hex.len() {
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some(Rgb([r, g, b]))
        }
        3 => {
            let mut channels = [0u8; 3];
            for (slot, digit) in channels.iter_mut().zip(hex.chars()) {
                let v = digit.to_digit(16)? as u8;
                *slot = v << 4 | v;
            }
            Some(Rgb(channels))
        }
        _ => None,
    }
}

fn lookup_name(name: &str) -> Option<Rgb<u8>> {
    let lower = name.trim().to_ascii_lowercase();
    NAMED_COLORS
        .iter()
        .find(|(candidate, _)| *candidate == lower)
        .map(|(_, rgb)| Rgb(*rgb))
}

/// Serialized shape: a string or a list of 3/4 channel values.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawColor {
    Text(String),
    Channels(Vec<u8>),
}

impl TryFrom<RawColor> for ColorSpec {
    type Error = String;

    fn try_from(raw: RawColor) -> Result<Self, Self::Error> {
        match raw {
            RawColor::Text(text) if text.trim_start().starts_with('#') => Ok(Self::Hex(text)),
            RawColor::Text(text) => Ok(Self::Named(text)),
            RawColor::Channels(channels) => match channels.as_slice() {
                &[r, g, b] => Ok(Self::Rgb(r, g, b)),
                &[r, g, b, a] => Ok(Self::Rgba(r, g, b, a)),
                other => Err(format!(
                    "color tuple must have 3 or 4 channels, got {}",
                    other.len()
                )),
            },
        }
    }
}

impl From<ColorSpec> for RawColor {
    fn from(color: ColorSpec) -> Self {
        match color {
            ColorSpec::Named(text) | ColorSpec::Hex(text) => RawColor::Text(text),
            ColorSpec::Rgb(r, g, b) => RawColor::Channels(vec![r, g, b]),
            ColorSpec::Rgba(r, g, b, a) => RawColor::Channels(vec![r, g, b, a]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tuples_pass_through() {
        assert_eq!(normalize(&ColorSpec::Rgb(1, 2, 3)), Rgb([1, 2, 3]));
        assert_eq!(normalize(&ColorSpec::Rgba(10, 20, 30, 0)), Rgb([10, 20, 30]));
    }

    #[test]
    fn test_hex_strings() {
        assert_eq!(
            normalize(&ColorSpec::Hex("#FF8000".into())),
            Rgb([255, 128, 0])
        );
        assert_eq!(
            normalize(&ColorSpec::Hex("#0a0B0c".into())),
            Rgb([10, 11, 12])
        );
        assert_eq!(normalize(&ColorSpec::Hex("#fff".into())), Rgb([255, 255, 255]));
    }

    #[test]
    fn test_palette_names_are_case_insensitive() {
        let expected = [
            ("black", [0, 0, 0]),
            ("WHITE", [255, 255, 255]),
            ("Red", [255, 0, 0]),
            ("green", [0, 255, 0]),
            ("Blue", [0, 0, 255]),
            ("yellow", [255, 255, 0]),
            ("cyan", [0, 255, 255]),
            ("MAGENTA", [255, 0, 255]),
            ("gray", [128, 128, 128]),
        ];
        for (name, rgb) in expected {
            assert_eq!(normalize(&ColorSpec::named(name)), Rgb(rgb), "{name}");
        }
    }

    #[test]
    fn test_unknown_input_falls_back_to_black() {
        for bad in ["chartreuse", "", "#12345", "#GGHHII", "#ÿÿÿÿ"] {
            assert_eq!(normalize(&ColorSpec::named(bad)), FALLBACK, "{bad:?}");
            assert_eq!(normalize(&ColorSpec::Hex(bad.into())), FALLBACK, "{bad:?}");
        }
    }

    #[test]
    fn test_from_str() {
        assert_eq!(
            "#112233".parse::<ColorSpec>().unwrap(),
            ColorSpec::Hex("#112233".into())
        );
        assert_eq!(
            "1, 2, 3".parse::<ColorSpec>().unwrap(),
            ColorSpec::Rgb(1, 2, 3)
        );
        assert_eq!(
            "1,2,3,4".parse::<ColorSpec>().unwrap(),
            ColorSpec::Rgba(1, 2, 3, 4)
        );
        assert_eq!(
            "navy".parse::<ColorSpec>().unwrap(),
            ColorSpec::Named("navy".into())
        );
    }

    #[test]
    fn test_deserialize_from_config_values() {
        #[derive(Deserialize)]
        struct Holder {
            a: ColorSpec,
            b: ColorSpec,
            c: ColorSpec,
        }

        let holder: Holder =
            toml::from_str("a = \"blue\"\nb = \"#00ff00\"\nc = [1, 2, 3, 255]\n").unwrap();
        assert_eq!(holder.a, ColorSpec::Named("blue".into()));
        assert_eq!(holder.b, ColorSpec::Hex("#00ff00".into()));
        assert_eq!(holder.c, ColorSpec::Rgba(1, 2, 3, 255));

        let bad: std::result::Result<Holder, _> =
            toml::from_str("a = \"blue\"\nb = \"red\"\nc = [1, 2]\n");
        assert!(bad.is_err());
    }
}
