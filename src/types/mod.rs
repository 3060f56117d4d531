//! Core value types shared by the registry, resolver, cursor and pipeline.

mod cell;
mod column;
mod selection;

pub use cell::*;
pub use column::*;
pub use selection::*;
