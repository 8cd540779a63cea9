pub mod config;
pub mod cutlist;
pub mod error;
pub mod guillotine;
pub mod optimizer;
pub mod render;
pub mod stats;
pub mod types;

pub use config::{OptimizationPriority, OptimizerConfig};
pub use error::{OptimizerError, Result};
pub use optimizer::Optimizer;
pub use types::{OptimizationResult, OptimizeRequest, PanelRequest};
