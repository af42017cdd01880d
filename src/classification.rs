use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// Colour of one magnitude bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ColorName {
    Red,
    Orange,
    SandyBrown,
    Khaki,
    GreenYellow,
    Chartreuse,
}

/// Lower bounds of the buckets, checked from the top. A magnitude must be
/// strictly greater than the bound to land in the bucket.
const THRESHOLDS: [(f64, ColorName); 5] = [(5.0, ColorName::Red),
                                           (4.0, ColorName::Orange),
                                           (3.0, ColorName::SandyBrown),
                                           (2.0, ColorName::Khaki),
                                           (1.0, ColorName::GreenYellow)];

impl ColorName {
    /// Buckets from the weakest to the strongest magnitude.
    pub const ALL: [ColorName; 6] = [ColorName::Chartreuse,
                                     ColorName::GreenYellow,
                                     ColorName::Khaki,
                                     ColorName::SandyBrown,
                                     ColorName::Orange,
                                     ColorName::Red];

    pub fn css(&self) -> &'static str {
        match *self {
            ColorName::Red => "red",
            ColorName::Orange => "orange",
            ColorName::SandyBrown => "sandybrown",
            ColorName::Khaki => "khaki",
            ColorName::GreenYellow => "greenyellow",
            ColorName::Chartreuse => "chartreuse",
        }
    }
}

impl fmt::Display for ColorName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match *self {
            ColorName::Red => "Red",
            ColorName::Orange => "Orange",
            ColorName::SandyBrown => "SandyBrown",
            ColorName::Khaki => "Khaki",
            ColorName::GreenYellow => "GreenYellow",
            ColorName::Chartreuse => "Chartreuse",
        };
        f.write_str(name)
    }
}

impl FromStr for ColorName {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "red" => Ok(ColorName::Red),
            "orange" => Ok(ColorName::Orange),
            "sandybrown" | "sandy brown" | "sandy_brown" => Ok(ColorName::SandyBrown),
            "khaki" => Ok(ColorName::Khaki),
            "greenyellow" | "green yellow" | "green_yellow" => Ok(ColorName::GreenYellow),
            "chartreuse" => Ok(ColorName::Chartreuse),
            _ => Err("Invalid color name"),
        }
    }
}

/// Colour of the bucket a magnitude falls in. NaN and anything at or below 1
/// end up in the last bucket.
pub fn color_for(magnitude: f64) -> ColorName {
    for &(bound, color) in THRESHOLDS.iter() {
        if magnitude > bound {
            return color;
        }
    }
    ColorName::Chartreuse
}
