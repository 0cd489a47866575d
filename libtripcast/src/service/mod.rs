//! Request-level orchestration on top of the platform clients

pub mod posting;
