//! # stride-client: Storefront Backend Client
//!
//! The POS owns no catalog, orders or vouchers: the storefront backend does.
//! This crate is the only place that talks to it.
//!
//! ```text
//! stride-pos commands
//!      │  &dyn Backend / B: Backend
//!      ▼
//! ┌───────────────────────────────┐      ┌──────────────────────────┐
//! │ Backend (trait, async-trait)  │◄─────│ FakeBackend (app tests)  │
//! └──────────────┬────────────────┘      └──────────────────────────┘
//!                │
//!                ▼
//! ┌───────────────────────────────┐
//! │ RestBackend (reqwest + JSON)  │ ──► GET products, POST orders, ...
//! │   envelope { success, data }  │
//! │   wire::RawProduct ──► Product│  (normalized once, here)
//! └───────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`backend`] - The `Backend` trait and query types
//! - [`rest`] - reqwest implementation
//! - [`wire`] - Raw payload shapes and their normalization
//! - [`config`] - Base URL, token, timeout
//! - [`error`] - Client error types

pub mod backend;
pub mod config;
pub mod error;
pub mod rest;
pub mod wire;

pub use backend::{Backend, ProductFilter};
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use rest::RestBackend;
