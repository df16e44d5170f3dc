//! Core types & traits: domain-agnostic contracts for operations and dispatch.

pub mod dispatch;
pub mod error;
pub mod mcp;
pub mod operation;
pub mod registry;
