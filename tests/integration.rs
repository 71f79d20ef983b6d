//! Integration tests for the rota service.
//!
//! These tests drive the complete stack: the REST router with its session
//! middleware, and the managers underneath it.

#[path = "integration/test_api.rs"]
mod test_api;

#[path = "integration/test_schedule.rs"]
mod test_schedule;
