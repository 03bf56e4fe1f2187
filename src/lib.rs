//! Admin backend for masters (service providers) and the applications
//! (work orders) assigned to them.
//!
//! Layers, bottom-up: [`db`] owns the SQLite store and read queries,
//! [`workload`] decides whether an assignment fits a master's capacity,
//! [`actions`] validates and applies mutations, and [`api`] and [`mcp`] expose
//! them over HTTP and MCP.

pub mod actions;
pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod mcp;
pub mod models;
pub mod validation;
pub mod workload;
