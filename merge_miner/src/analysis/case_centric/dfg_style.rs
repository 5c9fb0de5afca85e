//! Rendering Preparation for Directly-Follows Graphs
//!
//! Computes relative scaling values (arc pen widths, palette colors) for the relations of a
//! [`DirectlyFollowsGraph`]. No layout or image output is produced here.

use std::collections::HashMap;

use itertools::{Itertools, MinMaxResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;

use crate::core::process_models::case_centric::dfg::{DirectlyFollowsGraph, Edge};

/// Default edge palette, from fast/frequent (green) over median (yellow) to slow/rare (red)
pub const EDGE_COLORS: [&str; 11] = [
    "#004733", "#004733", "#006B55", "#227F67", "#E1B364", "#DBAD49", "#D4A92F", "#C4383F",
    "#BA1B1B", "#9D0B0E", "#7A0106",
];

/// Scaling parameters for [`style_dfg`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct DfgStyleConfig {
    /// Pen width of the least frequent relation
    pub min_pen_width: f64,
    /// Pen width approached by the most frequent relation
    pub max_pen_width: f64,
    /// Added to the value range, so that equal values never divide by zero
    pub epsilon: f64,
    /// Colors, ordered from low to high values
    pub palette: Vec<String>,
}

impl Default for DfgStyleConfig {
    fn default() -> Self {
        Self {
            min_pen_width: 0.0,
            max_pen_width: 5.0,
            epsilon: 1e-5,
            palette: EDGE_COLORS.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl DfgStyleConfig {
    /// Pen width of `value` relative to the range `[min, max]`
    pub fn pen_width(&self, value: f64, min: f64, max: f64) -> f64 {
        self.min_pen_width
            + (self.max_pen_width - self.min_pen_width) * (value - min) / (max - min + self.epsilon)
    }

    ///
    /// Palette entry for a normalized value in `[0, 1]`
    ///
    /// The index is `floor(normalized · len) − 1`, clamped to the palette. Returns `None`
    /// for an empty palette.
    ///
    pub fn palette_color(&self, normalized: f64) -> Option<&str> {
        let last = self.palette.len().checked_sub(1)?;
        let index = (normalized * self.palette.len() as f64).floor() as i64 - 1;
        let index = (index.max(0) as usize).min(last);
        Some(self.palette[index].as_str())
    }
}

/// Pen width and color of every relation of a [`DirectlyFollowsGraph`]
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DfgStyle {
    /// Pen width per relation
    #[serde_as(as = "Vec<(_, _)>")]
    pub pen_widths: HashMap<Edge, f64>,
    /// Palette color per relation
    #[serde_as(as = "Vec<(_, _)>")]
    pub colors: HashMap<Edge, String>,
}

fn value_range(values: impl Iterator<Item = u64>) -> Option<(f64, f64)> {
    match values.minmax() {
        MinMaxResult::NoElements => None,
        MinMaxResult::OneElement(v) => Some((v as f64, v as f64)),
        MinMaxResult::MinMax(min, max) => Some((min as f64, max as f64)),
    }
}

/// Pen width of every relation, scaled linearly between the smallest and largest weight
pub fn edge_pen_widths(
    dfg: &DirectlyFollowsGraph,
    config: &DfgStyleConfig,
) -> HashMap<Edge, f64> {
    let Some((min, max)) = value_range(dfg.directly_follows_relations.values().copied()) else {
        return HashMap::new();
    };
    dfg.directly_follows_relations
        .iter()
        .map(|(edge, &w)| (edge.clone(), config.pen_width(w as f64, min, max)))
        .collect()
}

///
/// Palette color of every relation
///
/// Weights are normalized logarithmically, `log10(9 · (w − min) / (max − min) + 1)`, so
/// that differences among the lower weights stay visible. If all weights are equal, every
/// relation gets the first color.
///
pub fn edge_colors(dfg: &DirectlyFollowsGraph, config: &DfgStyleConfig) -> HashMap<Edge, String> {
    let Some((min, max)) = value_range(dfg.directly_follows_relations.values().copied()) else {
        return HashMap::new();
    };
    let range = if max > min { max - min } else { 1.0 };
    dfg.directly_follows_relations
        .iter()
        .filter_map(|(edge, &w)| {
            let normalized = ((w as f64 - min) / range * 9.0 + 1.0).log10();
            config
                .palette_color(normalized)
                .map(|color| (edge.clone(), color.to_string()))
        })
        .collect()
}

/// Compute the [`DfgStyle`] of a [`DirectlyFollowsGraph`]
pub fn style_dfg(dfg: &DirectlyFollowsGraph, config: &DfgStyleConfig) -> DfgStyle {
    DfgStyle {
        pen_widths: edge_pen_widths(dfg, config),
        colors: edge_colors(dfg, config),
    }
}
