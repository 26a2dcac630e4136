//! Engine configuration loading and validation.
//!
//! Configuration is structured data validated against JSON Schema and then
//! checked for invariants the schema cannot express (ascending cutoffs,
//! compilable patterns).

mod parser;
mod schema;

pub use parser::{ConfigError, EngineConfig};
