//! Tripcast HTTP server
//!
//! Exposes the library components behind a handful of JSON endpoints and
//! two rendered pages. See [`server::build_router`] for the route table.

pub mod pages;
pub mod server;

pub use server::{build_router, AppState};
