//! Managed Certificate Controller Library
//!
//! Reconciles `ManagedCertificate` resources into Google-managed
//! SslCertificates and mirrors their provisioning status back.
//!
//! ## Quick Start
//!
//! ```rust
//! use managed_certificate_controller::prelude::*;
//! ```
//!
//! This brings commonly used types and traits into scope. For more specific imports,
//! use the individual modules.

pub mod config;
pub mod constants;
pub mod controller;
pub mod crd;
pub mod observability;
pub mod prelude;
pub mod provider;
pub mod runtime;
