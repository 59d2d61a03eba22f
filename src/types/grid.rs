//! The 3×3 tone grid and the pick emitted by the gesture collaborator.

use super::axes::{Formality, ToneAxes, Verbosity};
use serde::{Deserialize, Serialize};

/// One selectable cell. Rows are formality, columns are verbosity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToneCell {
    pub id: &'static str,
    pub axes: ToneAxes,
    pub x: u8,
    pub y: u8,
    pub label: &'static str,
}

const fn cell(
    id: &'static str,
    formality: Formality,
    verbosity: Verbosity,
    x: u8,
    y: u8,
    label: &'static str,
) -> ToneCell {
    ToneCell {
        id,
        axes: ToneAxes {
            formality,
            verbosity,
        },
        x,
        y,
        label,
    }
}

pub const GRID: [ToneCell; 9] = [
    cell("formal-concise", Formality::Formal, Verbosity::Concise, 0, 0, "Formal Concise"),
    cell("formal-balanced", Formality::Formal, Verbosity::Balanced, 1, 0, "Formal Balanced"),
    cell("formal-elaborate", Formality::Formal, Verbosity::Elaborate, 2, 0, "Formal Elaborate"),
    cell("neutral-concise", Formality::Neutral, Verbosity::Concise, 0, 1, "Neutral Concise"),
    cell("neutral-balanced", Formality::Neutral, Verbosity::Balanced, 1, 1, "Neutral Balanced"),
    cell("neutral-elaborate", Formality::Neutral, Verbosity::Elaborate, 2, 1, "Neutral Elaborate"),
    cell("casual-concise", Formality::Casual, Verbosity::Concise, 0, 2, "Casual Concise"),
    cell("casual-balanced", Formality::Casual, Verbosity::Balanced, 1, 2, "Casual Balanced"),
    cell("casual-elaborate", Formality::Casual, Verbosity::Elaborate, 2, 2, "Casual Elaborate"),
];

pub fn cell_by_id(id: &str) -> Option<&'static ToneCell> {
    GRID.iter().find(|c| c.id == id)
}

pub fn cell_for(axes: ToneAxes) -> &'static ToneCell {
    // GRID covers every combination
    let x = Verbosity::ALL.iter().position(|v| *v == axes.verbosity).unwrap_or(1);
    let y = Formality::ALL.iter().position(|f| *f == axes.formality).unwrap_or(1);
    &GRID[y * 3 + x]
}

/// A user pick: validated axes plus the id of the chosen cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TonePick {
    pub id: String,
    #[serde(flatten)]
    pub axes: ToneAxes,
}

impl TonePick {
    pub fn new(axes: ToneAxes) -> Self {
        Self {
            id: axes.id(),
            axes,
        }
    }
}

impl From<&ToneCell> for TonePick {
    fn from(cell: &ToneCell) -> Self {
        Self {
            id: cell.id.to_string(),
            axes: cell.axes,
        }
    }
}

/// Static description of the active grid, returned by the liveness check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridDescriptor {
    pub status: String,
    pub grid: String,
    pub formality: Vec<String>,
    pub verbosity: Vec<String>,
    pub cells: usize,
}

impl GridDescriptor {
    pub fn current() -> Self {
        Self {
            status: "ok".to_string(),
            grid: format!("{}x{}", Formality::ALL.len(), Verbosity::ALL.len()),
            formality: Formality::ALL.iter().map(|f| f.to_string()).collect(),
            verbosity: Verbosity::ALL.iter().map(|v| v.to_string()).collect(),
            cells: GRID.len(),
        }
    }
}
