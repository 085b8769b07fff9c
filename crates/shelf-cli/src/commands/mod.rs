//! Command handlers

pub mod category;
pub mod config;
pub mod record;
pub mod shell;
pub mod status;
