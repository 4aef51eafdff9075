//! Types shared by the hostmon collector and agent crates.

pub mod types;
pub mod value;
