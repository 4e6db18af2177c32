//! Casing and crown dimension derivation.
//!
//! Every casing and crown hangs off a door. Their dimensions follow from the
//! door's width/height and two shop constants: `casing_size` (the casing
//! profile width) and `crown_size` (the crown overhang). A casing can instead
//! take its height from a configured [`CasingRange`].

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::numeric::{total_add, total_mul};
use crate::order::{Casing, Crown, Door};

/// Which side of the opening a casing covers.
///
/// The wire labels are the backend's own values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CasingType {
    /// Vertical casing, runs along the door height.
    #[serde(rename = "боковой")]
    Side,
    /// Horizontal casing, spans the door width plus both side profiles.
    #[serde(rename = "прямой")]
    Straight,
}

impl fmt::Display for CasingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CasingType::Side => write!(f, "side"),
            CasingType::Straight => write!(f, "straight"),
        }
    }
}

impl FromStr for CasingType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "side" | "боковой" => Ok(CasingType::Side),
            "straight" | "прямой" => Ok(CasingType::Straight),
            other => Err(format!(
                "unknown casing type '{other}' (expected 'side' or 'straight')"
            )),
        }
    }
}

/// How a casing's height is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CasingFormula {
    /// Derived from the parent door's dimensions.
    #[default]
    #[serde(rename = "formula1")]
    FromDoor,
    /// Taken from the selected casing range.
    #[serde(rename = "formula2")]
    FromRange,
}

impl fmt::Display for CasingFormula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CasingFormula::FromDoor => write!(f, "formula1"),
            CasingFormula::FromRange => write!(f, "formula2"),
        }
    }
}

impl FromStr for CasingFormula {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "formula1" | "1" | "door" => Ok(CasingFormula::FromDoor),
            "formula2" | "2" | "range" => Ok(CasingFormula::FromRange),
            other => Err(format!(
                "unknown casing formula '{other}' (expected 'formula1' or 'formula2')"
            )),
        }
    }
}

/// Shop constants driving the derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionSettings {
    pub casing_size: Decimal,
    pub crown_size: Decimal,
}

/// Maps a size interval to a fixed casing height.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CasingRange {
    #[serde(default)]
    pub id: u64,
    pub min_size: Decimal,
    pub max_size: Decimal,
    pub casing_size: Decimal,
}

impl CasingRange {
    /// Inclusive on both ends.
    pub fn covers(&self, size: Decimal) -> bool {
        self.min_size <= size && size <= self.max_size
    }
}

/// Crown width for a door of the given width.
pub fn crown_width(door_width: Decimal, settings: &DimensionSettings) -> Decimal {
    total_add(door_width, settings.crown_size)
}

/// Casing height under formula1.
pub fn casing_height_from_door(
    casing_type: CasingType,
    door_width: Decimal,
    door_height: Decimal,
    settings: &DimensionSettings,
) -> Decimal {
    match casing_type {
        CasingType::Side => total_add(door_height, settings.casing_size),
        CasingType::Straight => total_add(
            door_width,
            total_mul(Decimal::TWO, settings.casing_size),
        ),
    }
}

/// Picks the first range covering the door dimension a casing runs along.
pub fn suggest_range<'a>(
    ranges: &'a [CasingRange],
    casing_type: CasingType,
    door_width: Decimal,
    door_height: Decimal,
) -> Option<&'a CasingRange> {
    let size = match casing_type {
        CasingType::Side => door_height,
        CasingType::Straight => door_width,
    };
    ranges.iter().find(|range| range.covers(size))
}

/// Applies the derivation rules to door accessories.
#[derive(Debug, Clone, Copy)]
pub struct Deriver<'a> {
    settings: &'a DimensionSettings,
    ranges: &'a [CasingRange],
}

impl<'a> Deriver<'a> {
    pub fn new(settings: &'a DimensionSettings, ranges: &'a [CasingRange]) -> Self {
        Self { settings, ranges }
    }

    pub fn range(&self, id: u64) -> Option<&'a CasingRange> {
        self.ranges.iter().find(|range| range.id == id)
    }

    pub fn ranges(&self) -> &'a [CasingRange] {
        self.ranges
    }

    /// Recomputes a casing against its door.
    ///
    /// Under formula2 with no usable range the height is left as it was.
    pub fn derive_casing(&self, casing: &mut Casing, door_width: Decimal, door_height: Decimal) {
        casing.width = self.settings.casing_size;
        match casing.casing_formula {
            CasingFormula::FromDoor => {
                casing.height = casing_height_from_door(
                    casing.casing_type,
                    door_width,
                    door_height,
                    self.settings,
                );
            }
            CasingFormula::FromRange => {
                if let Some(range) = casing.casing_range.and_then(|id| self.range(id)) {
                    casing.height = range.casing_size;
                } else {
                    tracing::debug!(
                        range = ?casing.casing_range,
                        "formula2 casing without a known range keeps its height"
                    );
                }
            }
        }
    }

    pub fn derive_crown(&self, crown: &mut Crown, door_width: Decimal) {
        crown.width = crown_width(door_width, self.settings);
    }

    /// Recomputes every casing and crown of a door. Called after any change
    /// to the door's width or height.
    pub fn rederive_door(&self, door: &mut Door) {
        let (width, height) = (door.width, door.height);
        for casing in &mut door.casings {
            self.derive_casing(casing, width, height);
        }
        for crown in &mut door.crowns {
            self.derive_crown(crown, width);
        }
    }

    /// Switches a casing between formulas.
    ///
    /// Moving to formula1 always drops the selected range. Moving to
    /// formula2 selects `range` when given, otherwise keeps the current one.
    pub fn switch_formula(
        &self,
        casing: &mut Casing,
        formula: CasingFormula,
        range: Option<u64>,
        door_width: Decimal,
        door_height: Decimal,
    ) {
        casing.casing_formula = formula;
        match formula {
            CasingFormula::FromDoor => casing.casing_range = None,
            CasingFormula::FromRange => {
                if range.is_some() {
                    casing.casing_range = range;
                }
            }
        }
        self.derive_casing(casing, door_width, door_height);
    }
}
