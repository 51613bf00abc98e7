//! Shared configuration, errors, tokens, mail and wire types for BrokerDesk.
//!
//! This crate provides common pieces used across all other crates:
//! - Configuration management
//! - Application-wide error types
//! - JWT access/refresh tokens
//! - SMTP mail delivery
//! - The response envelope and pagination types

pub mod auth;
pub mod config;
pub mod email;
pub mod error;
pub mod jwt;
pub mod types;

pub use auth::{AccessToken, Claims, LoginRequest, TokenPair, TokenScope};
pub use config::{AppConfig, DatabaseConfig, EmailConfig, ServerConfig, SuperuserConfig};
pub use email::{EmailError, EmailService};
pub use error::{AppError, AppResult};
pub use jwt::{JwtConfig, JwtError, JwtService};
pub use types::{ApiResponse, ObjectRef, PageRequest};
