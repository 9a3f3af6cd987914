//! CLI module for eplus_stubs

pub mod build;
pub mod error;
