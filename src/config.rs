use serde::{Deserialize, Serialize};

use crate::error::{OptimizerError, Result};
use crate::types::{Rect, deserialize_u32_from_number};

pub const DEFAULT_STOCK_WIDTH: u32 = 3000;
pub const DEFAULT_STOCK_LENGTH: u32 = 10000;

/// Ordering heuristic applied before packing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OptimizationPriority {
    /// Largest area first, ties broken by longest side, then input order.
    #[default]
    #[serde(alias = "area", alias = "default")]
    LargestAreaFirst,
}

impl std::str::FromStr for OptimizationPriority {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "largest-area-first" | "area" | "default" => Ok(OptimizationPriority::LargestAreaFirst),
            _ => Err(format!(
                "invalid optimization priority '{}', expected: largest-area-first",
                s
            )),
        }
    }
}

impl std::fmt::Display for OptimizationPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OptimizationPriority::LargestAreaFirst => f.write_str("largest-area-first"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OptimizerConfig {
    #[serde(deserialize_with = "deserialize_u32_from_number")]
    pub stock_width: u32,
    #[serde(deserialize_with = "deserialize_u32_from_number")]
    pub stock_length: u32,
    #[serde(deserialize_with = "deserialize_u32_from_number")]
    pub kerf_thickness: u32,
    pub optimization_priority: OptimizationPriority,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            stock_width: DEFAULT_STOCK_WIDTH,
            stock_length: DEFAULT_STOCK_LENGTH,
            kerf_thickness: 0,
            optimization_priority: OptimizationPriority::default(),
        }
    }
}

impl OptimizerConfig {
    pub fn stock(&self) -> Rect {
        Rect::new(self.stock_width, self.stock_length)
    }

    pub fn validate(&self) -> Result<()> {
        if self.stock_width == 0 || self.stock_length == 0 {
            return Err(OptimizerError::InvalidConfig(format!(
                "stock dimensions must be non-zero, got {}",
                self.stock()
            )));
        }
        Ok(())
    }
}
