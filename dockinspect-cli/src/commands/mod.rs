//! Command handlers -- one module per top-level action

pub mod config;
pub mod engine;
pub mod inspect;
pub mod properties;
