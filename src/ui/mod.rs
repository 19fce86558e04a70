//! Terminal presentation of run results

pub mod display;
