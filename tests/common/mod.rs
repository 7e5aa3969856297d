#![allow(dead_code)] // Each integration suite uses a different subset of the fixtures

pub mod builders;
pub mod strategies;

#[allow(unused_imports)]
pub use builders::*;
