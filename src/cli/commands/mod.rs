//! Command implementations

pub mod access;
pub mod auth;
pub mod cat;
pub mod completions;
pub mod equip;
pub mod init;
pub mod req;
pub mod stats;
pub mod team;
pub mod user;
pub mod wc;
