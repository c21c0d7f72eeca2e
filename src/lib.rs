//! Retail sales dashboard core: loading, filtering, aggregation and
//! model predictions over a sales table.

pub mod config;
pub mod context;
pub mod data;
pub mod error;
pub mod predict;

pub use config::DashboardConfig;
pub use context::DashboardContext;
