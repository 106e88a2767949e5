use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::model::{SeriesPoint, SeriesTable};

/// Y-axis scale used for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleMode {
    #[default]
    Linear,
    Log,
}

impl fmt::Display for ScaleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScaleMode::Linear => f.write_str("Linear"),
            ScaleMode::Log => f.write_str("Log"),
        }
    }
}

/// Return a display copy of `table` under `mode`.
///
/// `Log` maps every value to its base-10 logarithm and drops points that
/// have no logarithm (value ≤ 0); a series left without points is dropped.
pub fn transform(table: &SeriesTable, mode: ScaleMode) -> SeriesTable {
    match mode {
        ScaleMode::Linear => table.clone(),
        ScaleMode::Log => {
            let series: BTreeMap<_, Vec<SeriesPoint>> = table
                .iter()
                .filter_map(|(key, points)| {
                    let logged: Vec<SeriesPoint> = points
                        .iter()
                        .filter(|p| p.value > 0.0 && p.value.is_finite())
                        .map(|p| SeriesPoint {
                            year: p.year,
                            value: p.value.log10(),
                        })
                        .collect();
                    (!logged.is_empty()).then_some((*key, logged))
                })
                .collect();
            SeriesTable::from_map(series)
        }
    }
}
