//! Registered function definitions.

use crate::error::{FunctionError, Result};
use crate::eval::{eval_function, FunctionName};
use crate::value::Value;

/// Package holding the engine-side function classes.
pub const DEFAULT_PACKAGE: &str = "phoenix.geo.function";

/// One function as deployed to the engine: its name and implementing class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDef {
    pub name: FunctionName,
    pub class_name: String,
}

impl FunctionDef {
    pub fn new(name: FunctionName, class_name: impl Into<String>) -> Self {
        Self {
            name,
            class_name: class_name.into(),
        }
    }
}

/// Lookup of deployable functions by SQL name.
#[derive(Debug, Clone)]
pub struct FunctionRegistry {
    defs: Vec<FunctionDef>,
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::with_package(DEFAULT_PACKAGE)
    }
}

impl FunctionRegistry {
    /// Every function, implemented by `<package>.<Stem>Function` classes.
    ///
    /// `ST_GEOFROMTEXT` is built into the engine and is not registered.
    pub fn with_package(package: &str) -> Self {
        let defs = FunctionName::ALL
            .into_iter()
            .filter_map(|name| {
                class_stem(name).map(|stem| FunctionDef::new(name, format!("{}.{}Function", package, stem)))
            })
            .collect();
        Self { defs }
    }

    pub fn defs(&self) -> &[FunctionDef] {
        &self.defs
    }

    /// Definition by SQL name, ignoring case.
    pub fn get(&self, name: &str) -> Option<&FunctionDef> {
        let name = FunctionName::from_name(name)?;
        self.defs.iter().find(|def| def.name == name)
    }

    /// Evaluate a registered function by SQL name.
    pub fn eval(&self, name: &str, args: &[Option<&str>]) -> Result<Value> {
        let def = self
            .get(name)
            .ok_or_else(|| FunctionError::UnknownFunction(name.to_string()))?;
        eval_function(def.name, args)
    }
}

fn class_stem(name: FunctionName) -> Option<&'static str> {
    match name {
        FunctionName::StDistance => Some("Distance"),
        FunctionName::StMbrIntersects => Some("Mbrintersects"),
        FunctionName::StEquals => Some("Equals"),
        FunctionName::StWithin => Some("Within"),
        FunctionName::StContains => Some("Contains"),
        FunctionName::StIntersects => Some("Intersects"),
        FunctionName::StDisjoint => Some("Disjoint"),
        FunctionName::StCrosses => Some("Crosses"),
        FunctionName::StTouches => Some("Touches"),
        FunctionName::StOverlaps => Some("Overlaps"),
        FunctionName::Reverse => Some("Reverse"),
        FunctionName::StGeoFromText => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry() {
        let registry = FunctionRegistry::default();
        assert_eq!(registry.defs().len(), 11);
        assert_eq!(
            registry.get("st_distance").unwrap().class_name,
            "phoenix.geo.function.DistanceFunction"
        );
        assert!(registry.get("ST_GEOFROMTEXT").is_none());
    }

    #[test]
    fn test_eval_by_name() {
        let registry = FunctionRegistry::with_package("com.example.udf");
        assert_eq!(
            registry.eval("reverse", &[Some("gis")]).unwrap(),
            Value::Text("sig".to_string())
        );
        assert!(matches!(
            registry.eval("ST_AREA", &[Some("POINT (0 0)")]),
            Err(FunctionError::UnknownFunction(_))
        ));
    }
}
