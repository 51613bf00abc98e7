//! Dashboard comparisons and rankings.
//!
//! The database layer supplies raw sums and counts; this module turns them into
//! the percentages and orderings the dashboard shows.

pub mod service;
pub mod types;

#[cfg(test)]
mod tests;

pub use service::{DashboardError, DashboardService};
pub use types::*;
