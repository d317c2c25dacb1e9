//! bo-testability
//!
//! Test-support toolkit for business object models: build valid and saved
//! objects without hand-writing fixture values, and assert that class
//! definitions and accessor mappings are wired the way a test expects.
//!
//! # Crates
//!
//! - `bo_core` - class definitions, property values and the object runtime
//! - `bo_generator` - constraint-aware valid value generators and their registry
//! - `bo_factory` - test factories, the default value registry and `TestContext`
//! - `bo_tester` - definition and mapping assertions
//!
//! # CLI Usage
//!
//! ```bash
//! # Print five valid Invoice objects as JSON lines
//! bo-testability generate --class-defs model.yaml --class Invoice --count 5
//!
//! # Save them (and everything they reference) before printing
//! bo-testability generate --class-defs model.yaml --class Invoice --saved --seed 7
//!
//! # Report problems in a class definition file
//! bo-testability check --class-defs model.yaml
//! ```

pub mod config;
pub mod testing;

pub use bo_core;
pub use bo_factory;
pub use bo_generator;
pub use bo_tester;

pub use config::TestabilityConfig;
