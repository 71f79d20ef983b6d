//! REST API module for the rota service.
//!
//! Provides the HTTP surface consumed by the scheduling front end:
//! authentication, lecture and user CRUD, enrollment, and the laid-out
//! week view.

mod handlers;
mod rest;

pub use handlers::*;
pub use rest::*;
