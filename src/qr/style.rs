//! Module shapes and color masks for styled rendering

use crate::color::ColorSpec;
use image::{Rgb, RgbImage};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Share of the cell kept by gapped squares and bars.
const SHRINK_RATIO: f64 = 0.8;

/// Shape drawn for each dark module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModuleShape {
    /// Full square cell
    #[default]
    Square,
    /// Square with corners rounded where no neighbor touches them
    Rounded,
    /// Circle inscribed in the cell
    Circle,
    /// Square shrunk to leave a gap around it
    GappedSquare,
    /// Narrow bars joining vertically adjacent modules
    VerticalBars,
    /// Narrow bars joining horizontally adjacent modules
    HorizontalBars,
}

/// How dark modules are colored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FillMode {
    /// Single color
    #[default]
    Solid,
    /// `color` at the center fading to `gradient_color` at the corners
    RadialGradient,
    /// Like radial, but with square contours
    SquareGradient,
    /// `color` on the left to `gradient_color` on the right
    HorizontalGradient,
    /// `color` on top to `gradient_color` at the bottom
    VerticalGradient,
    /// Colors sampled from `mask_image`
    ImageMask,
}

macro_rules! kebab_enum_str {
    ($ty:ty { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl $ty {
            /// Accepted spellings, in declaration order.
            pub const NAMES: &'static [&'static str] = &[$($name),+];

            /// Kebab-case identifier.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $name),+
                }
            }
        }

        impl FromStr for $ty {
            type Err = String;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                let normalized = value.trim().to_ascii_lowercase().replace('_', "-");
                match normalized.as_str() {
                    $($name => Ok(Self::$variant),)+
                    _ => Err(format!(
                        "Unknown value '{value}', expected one of: {}",
                        Self::NAMES.join(", ")
                    )),
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

kebab_enum_str!(ModuleShape {
    Square => "square",
    Rounded => "rounded",
    Circle => "circle",
    GappedSquare => "gapped-square",
    VerticalBars => "vertical-bars",
    HorizontalBars => "horizontal-bars",
});

kebab_enum_str!(FillMode {
    Solid => "solid",
    RadialGradient => "radial-gradient",
    SquareGradient => "square-gradient",
    HorizontalGradient => "horizontal-gradient",
    VerticalGradient => "vertical-gradient",
    ImageMask => "image-mask",
});

/// Rendering options for [`QrRasterBuilder`](super::QrRasterBuilder)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleOptions {
    /// Module shape
    pub shape: ModuleShape,
    /// Module coloring
    pub fill: FillMode,
    /// Primary module color
    pub color: ColorSpec,
    /// Second gradient stop; falls back to `color`
    pub gradient_color: Option<ColorSpec>,
    /// Light module and quiet zone color
    pub background: ColorSpec,
    /// Side of one module in pixels
    pub module_size: u32,
    /// Quiet zone width in modules
    pub quiet_zone: u32,
    /// Smallest symbol version to use (1-40)
    pub min_version: Option<i16>,
    /// Image sampled by [`FillMode::ImageMask`]
    pub mask_image: Option<PathBuf>,
    /// Logo pasted at 30% of the raster side
    pub logo: Option<PathBuf>,
}

impl Default for StyleOptions {
    fn default() -> Self {
        Self {
            shape: ModuleShape::Square,
            fill: FillMode::Solid,
            color: ColorSpec::named("blue"),
            gradient_color: None,
            background: ColorSpec::named("white"),
            module_size: 10,
            quiet_zone: 4,
            min_version: None,
            mask_image: None,
            logo: None,
        }
    }
}

impl StyleOptions {
    /// Plain black-on-white squares.
    pub fn plain() -> Self {
        Self {
            color: ColorSpec::named("black"),
            ..Self::default()
        }
    }
}

/// Which of the four orthogonal neighbors are dark
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Neighbors {
    /// Module above
    pub north: bool,
    /// Module to the right
    pub east: bool,
    /// Module below
    pub south: bool,
    /// Module to the left
    pub west: bool,
}

impl Neighbors {
    /// Collect the neighbors of `(x, y)` in a square module grid.
    pub fn of(dark: &[bool], width: usize, x: usize, y: usize) -> Self {
        let at = |mx: usize, my: usize| dark[my * width + mx];
        Self {
            north: y > 0 && at(x, y - 1),
            east: x + 1 < width && at(x + 1, y),
            south: y + 1 < width && at(x, y + 1),
            west: x > 0 && at(x - 1, y),
        }
    }
}

impl ModuleShape {
    /// Whether the point `(fx, fy)`, measured from the top-left corner of a
    /// `size`-pixel cell, is painted.
    pub fn covers(&self, neighbors: Neighbors, fx: f64, fy: f64, size: f64) -> bool {
        let half = size / 2.0;
        match self {
            ModuleShape::Square => true,
            ModuleShape::GappedSquare => {
                let gap = size * (1.0 - SHRINK_RATIO) / 2.0;
                (gap..size - gap).contains(&fx) && (gap..size - gap).contains(&fy)
            }
            ModuleShape::Circle => within(fx, fy, half, half, half),
            ModuleShape::Rounded => {
                let r = half;
                let left = fx < r;
                let top = fy < r;
                let (cx, cy) = (if left { r } else { size - r }, if top { r } else { size - r });
                let free = match (left, top) {
                    (true, true) => !neighbors.north && !neighbors.west,
                    (false, true) => !neighbors.north && !neighbors.east,
                    (true, false) => !neighbors.south && !neighbors.west,
                    (false, false) => !neighbors.south && !neighbors.east,
                };
                !free || within(fx, fy, cx, cy, r)
            }
            ModuleShape::VerticalBars => {
                let width = size * SHRINK_RATIO;
                let left = (size - width) / 2.0;
                if !(left..left + width).contains(&fx) {
                    return false;
                }
                let r = width / 2.0;
                if fy < r && !neighbors.north {
                    within(fx, fy, half, r, r)
                } else if fy > size - r && !neighbors.south {
                    within(fx, fy, half, size - r, r)
                } else {
                    true
                }
            }
            ModuleShape::HorizontalBars => {
                let height = size * SHRINK_RATIO;
                let top = (size - height) / 2.0;
                if !(top..top + height).contains(&fy) {
                    return false;
                }
                let r = height / 2.0;
                if fx < r && !neighbors.west {
                    within(fx, fy, r, half, r)
                } else if fx > size - r && !neighbors.east {
                    within(fx, fy, size - r, half, r)
                } else {
                    true
                }
            }
        }
    }
}

fn within(x: f64, y: f64, cx: f64, cy: f64, r: f64) -> bool {
    let (dx, dy) = (x - cx, y - cy);
    dx * dx + dy * dy <= r * r
}

/// Resolved per-pixel color source for dark modules
#[derive(Debug, Clone)]
pub enum ColorMask {
    /// Single color
    Solid(Rgb<u8>),
    /// Euclidean distance from the center
    Radial {
        /// Color at the center
        center: Rgb<u8>,
        /// Color at the corners
        edge: Rgb<u8>,
    },
    /// Chebyshev distance from the center
    Square {
        /// Color at the center
        center: Rgb<u8>,
        /// Color at the border
        edge: Rgb<u8>,
    },
    /// Left to right
    Horizontal {
        /// Left color
        left: Rgb<u8>,
        /// Right color
        right: Rgb<u8>,
    },
    /// Top to bottom
    Vertical {
        /// Top color
        top: Rgb<u8>,
        /// Bottom color
        bottom: Rgb<u8>,
    },
    /// Image already resized to the raster
    Image(RgbImage),
}

impl ColorMask {
    /// Color of a dark pixel at `(x, y)` on a `width` x `height` raster.
    pub fn sample(&self, x: u32, y: u32, width: u32, height: u32) -> Rgb<u8> {
        let (w, h) = (f64::from(width.max(1)), f64::from(height.max(1)));
        let (px, py) = (f64::from(x) + 0.5, f64::from(y) + 0.5);
        match self {
            ColorMask::Solid(color) => *color,
            ColorMask::Radial { center, edge } => {
                let (dx, dy) = (px - w / 2.0, py - h / 2.0);
                let max = (w * w + h * h).sqrt() / 2.0;
                lerp(*center, *edge, (dx * dx + dy * dy).sqrt() / max)
            }
            ColorMask::Square { center, edge } => {
                let t = ((px - w / 2.0).abs() / (w / 2.0)).max((py - h / 2.0).abs() / (h / 2.0));
                lerp(*center, *edge, t)
            }
            ColorMask::Horizontal { left, right } => lerp(*left, *right, px / w),
            ColorMask::Vertical { top, bottom } => lerp(*top, *bottom, py / h),
            ColorMask::Image(image) => image
                .get_pixel_checked(x, y)
                .copied()
                .unwrap_or(Rgb([0, 0, 0])),
        }
    }
}

/// Linear interpolation between two colors, `t` clamped to `[0, 1]`.
pub fn lerp(from: Rgb<u8>, to: Rgb<u8>, t: f64) -> Rgb<u8> {
    let t = t.clamp(0.0, 1.0);
    let mix = |a: u8, b: u8| (f64::from(a) + (f64::from(b) - f64::from(a)) * t).round() as u8;
    Rgb([mix(from[0], to[0]), mix(from[1], to[1]), mix(from[2], to[2])])
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALONE: Neighbors = Neighbors {
        north: false,
        east: false,
        south: false,
        west: false,
    };

    #[test]
    fn test_parse_names() {
        assert_eq!("gapped-square".parse::<ModuleShape>(), Ok(ModuleShape::GappedSquare));
        assert_eq!("Vertical_Bars".parse::<ModuleShape>(), Ok(ModuleShape::VerticalBars));
        assert_eq!("radial-gradient".parse::<FillMode>(), Ok(FillMode::RadialGradient));
        assert!("hexagon".parse::<ModuleShape>().is_err());
        assert_eq!(FillMode::ImageMask.to_string(), "image-mask");
    }

    #[test]
    fn test_shapes_cover_center_but_not_always_corners() {
        let size = 10.0;
        for shape in [
            ModuleShape::Square,
            ModuleShape::Rounded,
            ModuleShape::Circle,
            ModuleShape::GappedSquare,
            ModuleShape::VerticalBars,
            ModuleShape::HorizontalBars,
        ] {
            assert!(shape.covers(ALONE, 5.0, 5.0, size), "{shape}");
        }

        assert!(ModuleShape::Square.covers(ALONE, 0.5, 0.5, size));
        assert!(!ModuleShape::Circle.covers(ALONE, 0.5, 0.5, size));
        assert!(!ModuleShape::GappedSquare.covers(ALONE, 0.5, 5.0, size));
        assert!(!ModuleShape::Rounded.covers(ALONE, 0.5, 0.5, size));
    }

    #[test]
    fn test_rounded_keeps_corners_shared_with_neighbors() {
        let joined = Neighbors {
            north: true,
            west: true,
            ..ALONE
        };
        assert!(ModuleShape::Rounded.covers(joined, 0.5, 0.5, 10.0));
        assert!(!ModuleShape::Rounded.covers(joined, 9.5, 9.5, 10.0));
    }

    #[test]
    fn test_bars_join_in_their_direction() {
        let stacked = Neighbors {
            north: true,
            south: true,
            ..ALONE
        };
        assert!(ModuleShape::VerticalBars.covers(stacked, 1.5, 0.2, 10.0));
        assert!(!ModuleShape::VerticalBars.covers(ALONE, 1.5, 0.2, 10.0));
        assert!(!ModuleShape::VerticalBars.covers(stacked, 0.2, 5.0, 10.0));

        let row = Neighbors {
            east: true,
            west: true,
            ..ALONE
        };
        assert!(ModuleShape::HorizontalBars.covers(row, 0.2, 1.5, 10.0));
        assert!(!ModuleShape::HorizontalBars.covers(ALONE, 0.2, 1.5, 10.0));
    }

    #[test]
    fn test_neighbors_of() {
        // 3x3 plus sign
        let grid = [
            false, true, false, //
            true, true, true, //
            false, true, false,
        ];
        let center = Neighbors::of(&grid, 3, 1, 1);
        assert_eq!(
            center,
            Neighbors {
                north: true,
                east: true,
                south: true,
                west: true
            }
        );
        assert_eq!(Neighbors::of(&grid, 3, 0, 0), Neighbors { east: true, south: true, ..ALONE });
    }

    #[test]
    fn test_gradients() {
        let black = Rgb([0, 0, 0]);
        let white = Rgb([255, 255, 255]);

        let horizontal = ColorMask::Horizontal {
            left: black,
            right: white,
        };
        assert!(horizontal.sample(0, 5, 100, 100)[0] < 5);
        assert!(horizontal.sample(99, 5, 100, 100)[0] > 250);

        let vertical = ColorMask::Vertical {
            top: black,
            bottom: white,
        };
        assert!(vertical.sample(50, 0, 100, 100)[0] < 5);
        assert!(vertical.sample(50, 99, 100, 100)[0] > 250);

        let radial = ColorMask::Radial {
            center: black,
            edge: white,
        };
        assert!(radial.sample(50, 50, 100, 100)[0] < 5);
        assert!(radial.sample(0, 0, 100, 100)[0] > 245);

        let square = ColorMask::Square {
            center: black,
            edge: white,
        };
        assert!(square.sample(50, 50, 100, 100)[0] < 5);
        assert!(square.sample(0, 50, 100, 100)[0] > 245);
    }

    #[test]
    fn test_lerp_clamps() {
        let a = Rgb([0, 100, 200]);
        let b = Rgb([200, 100, 0]);
        assert_eq!(lerp(a, b, -1.0), a);
        assert_eq!(lerp(a, b, 2.0), b);
        assert_eq!(lerp(a, b, 0.5), Rgb([100, 100, 100]));
    }
}
