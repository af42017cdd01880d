use serde::Serialize;

use crate::classification::{color_for, ColorName};

/// Lower bound of each legend row.
pub const GRADES: [u32; 6] = [0, 1, 2, 3, 4, 5];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Corner {
    TopRight,
    BottomRight,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendEntry {
    pub color: ColorName,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Legend {
    pub position: Corner,
    pub entries: Vec<LegendEntry>,
}

impl Legend {
    pub fn magnitudes() -> Self {
        let entries = GRADES
            .iter()
            .enumerate()
            .map(|(i, &grade)| {
                let label = match GRADES.get(i + 1) {
                    Some(next) => format!("{}\u{2013}{}", grade, next),
                    None => format!("{}+", grade),
                };
                // Sample inside the range: the bounds themselves belong to the lower bucket.
                LegendEntry {
                    color: color_for(grade as f64 + 1.0),
                    label: label,
                }
            })
            .collect();
        Legend {
            position: Corner::BottomRight,
            entries: entries,
        }
    }
}
