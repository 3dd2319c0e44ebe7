//! Command handlers

pub mod config;
pub mod pet;
pub mod status;
