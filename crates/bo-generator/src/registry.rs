//! Resolution of the generator that handles a property.
//!
//! Registrations are keyed by [`PropTypeKind`]; the last registration for a
//! kind wins. Generator types are also known by name so that configuration
//! files can pick them.

use crate::error::GeneratorError;
use crate::generators::boolean::BoolGenerator;
use crate::generators::date_time::DateTimeGenerator;
use crate::generators::enumeration::EnumGenerator;
use crate::generators::guid::GuidGenerator;
use crate::generators::lookup_list::LookupListGenerator;
use crate::generators::name_list::NameListGenerator;
use crate::generators::numeric::{DecimalGenerator, DoubleGenerator, IntegerGenerator};
use crate::generators::regex_pattern::RegexPatternGenerator;
use crate::generators::string::StringGenerator;
use crate::generators::{ValidValueGenerator, ValidValueGeneratorType};
use bo_core::{LookupList, PropDef, PropTypeKind};
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

/// Builds a generator for a property definition.
pub type GeneratorConstructor =
    fn(&PropDef) -> Result<Box<dyn ValidValueGenerator>, GeneratorError>;

fn construct<G: ValidValueGeneratorType>(
    prop_def: &PropDef,
) -> Result<Box<dyn ValidValueGenerator>, GeneratorError> {
    Ok(Box::new(G::for_prop(prop_def)?))
}

/// The built-in generator for the property's type, ignoring lookup lists
/// and registrations.
pub fn builtin_generator(
    prop_def: &PropDef,
) -> Result<Box<dyn ValidValueGenerator>, GeneratorError> {
    builtin_constructor(prop_def.prop_type.kind())(prop_def)
}

fn builtin_constructor(kind: PropTypeKind) -> GeneratorConstructor {
    match kind {
        PropTypeKind::Bool => construct::<BoolGenerator>,
        PropTypeKind::Short | PropTypeKind::Int | PropTypeKind::Long => {
            construct::<IntegerGenerator>
        }
        PropTypeKind::Double => construct::<DoubleGenerator>,
        PropTypeKind::Decimal => construct::<DecimalGenerator>,
        PropTypeKind::DateTime => construct::<DateTimeGenerator>,
        PropTypeKind::Guid => construct::<GuidGenerator>,
        PropTypeKind::String => construct::<StringGenerator>,
        PropTypeKind::Enum => construct::<EnumGenerator>,
    }
}

fn builtin_names() -> HashMap<String, GeneratorConstructor> {
    let mut named: HashMap<String, GeneratorConstructor> = HashMap::new();
    named.insert(BoolGenerator::NAME.into(), construct::<BoolGenerator>);
    named.insert(IntegerGenerator::NAME.into(), construct::<IntegerGenerator>);
    for alias in ["short", "int", "long"] {
        named.insert(alias.into(), construct::<IntegerGenerator>);
    }
    named.insert(DoubleGenerator::NAME.into(), construct::<DoubleGenerator>);
    named.insert(DecimalGenerator::NAME.into(), construct::<DecimalGenerator>);
    named.insert(DateTimeGenerator::NAME.into(), construct::<DateTimeGenerator>);
    named.insert(GuidGenerator::NAME.into(), construct::<GuidGenerator>);
    named.insert(EnumGenerator::NAME.into(), construct::<EnumGenerator>);
    named.insert(StringGenerator::NAME.into(), construct::<StringGenerator>);
    named.insert(
        RegexPatternGenerator::NAME.into(),
        construct::<RegexPatternGenerator>,
    );
    named.insert(
        LookupListGenerator::NAME.into(),
        construct::<LookupListGenerator>,
    );
    named.insert(NameListGenerator::NAME.into(), construct::<NameListGenerator>);
    named
}

/// Maps property types to the generator that handles them.
#[derive(Clone)]
pub struct ValidValueGeneratorRegistry {
    by_kind: HashMap<PropTypeKind, GeneratorConstructor>,
    named: HashMap<String, GeneratorConstructor>,
}

impl fmt::Debug for ValidValueGeneratorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<_> = self.by_kind.keys().collect();
        kinds.sort();
        f.debug_struct("ValidValueGeneratorRegistry")
            .field("registered", &kinds)
            .field("names", &self.generator_names())
            .finish()
    }
}

impl Default for ValidValueGeneratorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidValueGeneratorRegistry {
    pub fn new() -> Self {
        Self {
            by_kind: HashMap::new(),
            named: builtin_names(),
        }
    }

    /// Use generator type `G` for every property of the given kind.
    pub fn register<G: ValidValueGeneratorType>(&mut self, kind: PropTypeKind) {
        debug!("Registering generator '{}' for {}", G::NAME, kind);
        self.named.insert(G::NAME.to_string(), construct::<G>);
        self.by_kind.insert(kind, construct::<G>);
    }

    /// Use a constructor function for every property of the given kind.
    pub fn register_with(&mut self, kind: PropTypeKind, constructor: GeneratorConstructor) {
        debug!("Registering generator constructor for {}", kind);
        self.by_kind.insert(kind, constructor);
    }

    /// Make a constructor available to [`register_named`](Self::register_named).
    pub fn define_named(&mut self, name: impl Into<String>, constructor: GeneratorConstructor) {
        self.named.insert(name.into(), constructor);
    }

    /// Use the generator known by `name` for every property of the given kind.
    pub fn register_named(&mut self, kind: PropTypeKind, name: &str) -> Result<(), GeneratorError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(GeneratorError::Config(format!(
                "no generator type given for {kind}"
            )));
        }
        let constructor = *self.named.get(name).ok_or_else(|| {
            GeneratorError::Config(format!("'{name}' is not a valid value generator"))
        })?;
        debug!("Registering generator '{}' for {}", name, kind);
        self.by_kind.insert(kind, constructor);
        Ok(())
    }

    pub fn is_registered(&self, kind: PropTypeKind) -> bool {
        self.by_kind.contains_key(&kind)
    }

    /// Names usable with [`register_named`](Self::register_named), sorted.
    pub fn generator_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.named.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Build the generator for a property.
    ///
    /// An explicit registration for the kind wins. Otherwise a simple lookup
    /// list, then a pattern rule, then the built-in generator for the kind.
    pub fn resolve(
        &self,
        prop_def: &PropDef,
    ) -> Result<Box<dyn ValidValueGenerator>, GeneratorError> {
        let kind = prop_def.prop_type.kind();
        if let Some(constructor) = self.by_kind.get(&kind) {
            return constructor(prop_def);
        }
        if matches!(prop_def.lookup_list, Some(LookupList::Simple { .. })) {
            return construct::<LookupListGenerator>(prop_def);
        }
        if kind == PropTypeKind::String
            && prop_def
                .rule_bounds()
                .pattern
                .is_some_and(|p| !p.is_empty())
        {
            return construct::<RegexPatternGenerator>(prop_def);
        }
        builtin_constructor(kind)(prop_def)
    }

    /// Forget every registration made on this registry.
    pub fn reset(&mut self) {
        self.by_kind.clear();
        self.named = builtin_names();
    }
}
