//! Parser and baseline verifier for simulation statistics reports.

pub mod baseline;
pub mod domain;
pub mod generator;
pub mod grammar;
pub mod runner;
pub mod verifier;
