//! File formats the command-line front end reads and writes.

pub mod csv;
pub mod json;
