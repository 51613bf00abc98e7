//! Core business logic for BrokerDesk.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//!
//! # Modules
//!
//! - `auth` - Password hashing
//! - `permission` - Per-domain access levels
//! - `validation` - Input rules for names, passwords, vehicles and dates
//! - `period` - Calendar months
//! - `invoice` - Member payroll and company invoice engine
//! - `dashboard` - Period-over-period comparisons

pub mod auth;
pub mod dashboard;
pub mod invoice;
pub mod period;
pub mod permission;
pub mod validation;

pub use period::Period;
