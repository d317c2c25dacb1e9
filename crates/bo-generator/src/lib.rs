//! Rule-aware valid value generators.
//!
//! Each generator produces values for one property that satisfy every rule
//! attached to it, optionally bounded strictly above or below an external
//! value. [`ValidValueGeneratorRegistry`] decides which generator handles a
//! property.
//!
//! # Example
//!
//! ```rust
//! use bo_core::{PropDef, PropRule, PropType};
//! use bo_generator::ValidValueGeneratorRegistry;
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! let prop = PropDef::new("Code", PropType::String).with_rule(PropRule::String {
//!     min_length: Some(3),
//!     max_length: Some(7),
//!     pattern: None,
//! });
//! let registry = ValidValueGeneratorRegistry::new();
//! let mut generator = registry.resolve(&prop).unwrap();
//! let mut rng = StdRng::seed_from_u64(7);
//!
//! let value = generator.generate_valid_value(&mut rng).unwrap();
//! let len = value.as_str().unwrap().len();
//! assert!((3..=7).contains(&len));
//! ```

pub mod error;
pub mod generators;
pub mod random;
pub mod registry;

pub use error::GeneratorError;
pub use generators::bo_list::BusinessObjectListGenerator;
pub use generators::boolean::BoolGenerator;
pub use generators::date_time::DateTimeGenerator;
pub use generators::enumeration::EnumGenerator;
pub use generators::guid::GuidGenerator;
pub use generators::lookup_list::LookupListGenerator;
pub use generators::name_list::{NameListGenerator, DEFAULT_NAMES};
pub use generators::numeric::{DecimalGenerator, DoubleGenerator, IntegerGenerator};
pub use generators::regex_pattern::RegexPatternGenerator;
pub use generators::string::StringGenerator;
pub use generators::text_file::{clear_sample_cache, load_samples, TextFileGenerator};
pub use generators::{
    compare_to_bound, Cycle, ValidValueGenerator, ValidValueGeneratorType, ValueBound,
};
pub use registry::{builtin_generator, GeneratorConstructor, ValidValueGeneratorRegistry};
