//! Host collaborator contracts and the in-memory recording host.

pub mod memory;
pub mod service;
