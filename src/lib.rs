pub mod config;
pub mod constraints;
pub mod context;
pub mod core_types;
pub mod error;
pub mod loader;
pub mod optimizer;
pub mod random;
pub mod registry;
pub mod rules;
pub mod schedule;
pub mod util;
// cmd and reports belong to the binary crate (main.rs).

pub use error::{RotaError, RotaResult};
