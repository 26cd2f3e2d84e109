//! GearGuard: maintenance request tracking
//!
//! Tracks maintenance work against equipment and work centers, routes it to
//! teams and technicians, and reports operational health. Every operation
//! takes an explicit [`core::Session`] and is checked against a single
//! authorization table before it touches the directory.

pub mod cli;
pub mod core;
pub mod entities;
