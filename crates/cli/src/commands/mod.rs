//! CLI Commands

pub mod config;
pub mod create_project;
pub mod policy;
