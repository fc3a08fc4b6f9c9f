//! Routes Module
//!
//! HTTP route configuration. All routes are assembled in `router`.

/// Main router assembly
pub mod router;

pub use router::create_router;
