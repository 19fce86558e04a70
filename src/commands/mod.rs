//! Command implementations for the installer CLI

pub mod run;
