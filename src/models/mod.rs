//! Domain models for masterdesk.
//!
//! # Core Concepts
//!
//! - [`Master`]: A service provider. Stored in the `customers` table.
//! - [`Application`]: A work order assigned to a master, carrying an amount and
//!   a complexity score. Stored in the `invoices` table.
//!
//! A master's *workload* is the sum of complexity over its pending
//! applications. It is always computed from the current rows, never stored.
//!
//! Each entity has a raw `*FormInput` type mirroring the submitted form fields
//! and a validated `*Input` type produced by [`crate::validation`].

mod application;
mod dashboard;
mod master;

pub use application::*;
pub use dashboard::*;
pub use master::*;
