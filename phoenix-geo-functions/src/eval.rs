//! Spatial function implementations
//!
//! Geometry arguments are WKT text, as stored in `VARCHAR` columns and as
//! produced by `ST_GEOFROMTEXT`.

use crate::error::{FunctionError, Result};
use crate::value::{SqlKind, Value};
use geo::{Distance, Euclidean, Relate};
use geo_types::Geometry;
use phoenix_geo_core::{normalize, parse_wkt, to_wkt, Envelope};
use std::fmt;
use std::str::FromStr;

/// Functions evaluated inside the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionName {
    StDistance,
    StMbrIntersects,
    StEquals,
    StWithin,
    StContains,
    StIntersects,
    StDisjoint,
    StCrosses,
    StTouches,
    StOverlaps,
    StGeoFromText,
    Reverse,
}

impl FunctionName {
    pub const ALL: [FunctionName; 12] = [
        FunctionName::StDistance,
        FunctionName::StMbrIntersects,
        FunctionName::StEquals,
        FunctionName::StWithin,
        FunctionName::StContains,
        FunctionName::StIntersects,
        FunctionName::StDisjoint,
        FunctionName::StCrosses,
        FunctionName::StTouches,
        FunctionName::StOverlaps,
        FunctionName::StGeoFromText,
        FunctionName::Reverse,
    ];

    /// SQL name.
    pub fn name(&self) -> &'static str {
        match self {
            FunctionName::StDistance => "ST_DISTANCE",
            FunctionName::StMbrIntersects => "ST_MBRINTERSECTS",
            FunctionName::StEquals => "ST_EQUALS",
            FunctionName::StWithin => "ST_WITHIN",
            FunctionName::StContains => "ST_CONTAINS",
            FunctionName::StIntersects => "ST_INTERSECTS",
            FunctionName::StDisjoint => "ST_DISJOINT",
            FunctionName::StCrosses => "ST_CROSSES",
            FunctionName::StTouches => "ST_TOUCHES",
            FunctionName::StOverlaps => "ST_OVERLAPS",
            FunctionName::StGeoFromText => "ST_GEOFROMTEXT",
            FunctionName::Reverse => "REVERSE",
        }
    }

    /// Look up by SQL name, ignoring case.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|f| f.name().eq_ignore_ascii_case(name))
    }

    pub fn arg_types(&self) -> &'static [SqlKind] {
        match self {
            FunctionName::StGeoFromText => &[SqlKind::Varchar, SqlKind::Integer],
            FunctionName::Reverse => &[SqlKind::Varchar],
            _ => &[SqlKind::Varchar, SqlKind::Varchar],
        }
    }

    pub fn arity(&self) -> usize {
        self.arg_types().len()
    }

    pub fn return_type(&self) -> SqlKind {
        match self {
            FunctionName::StDistance => SqlKind::Double,
            FunctionName::StGeoFromText | FunctionName::Reverse => SqlKind::Varchar,
            _ => SqlKind::Integer,
        }
    }

    /// Whether the function is a 1/0 spatial predicate.
    pub fn is_predicate(&self) -> bool {
        self.return_type() == SqlKind::Integer
    }
}

impl fmt::Display for FunctionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FunctionName {
    type Err = FunctionError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s).ok_or_else(|| FunctionError::UnknownFunction(s.to_string()))
    }
}

fn check_arity(name: FunctionName, args: &[Option<&str>]) -> Result<()> {
    if args.len() != name.arity() {
        return Err(FunctionError::Arity {
            function: name.name(),
            expected: name.arity(),
            actual: args.len(),
        });
    }
    Ok(())
}

/// Evaluate a function over its SQL arguments. `None` is SQL NULL.
pub fn eval_function(name: FunctionName, args: &[Option<&str>]) -> Result<Value> {
    check_arity(name, args)?;
    let Some(args) = args.iter().copied().collect::<Option<Vec<&str>>>() else {
        return Ok(Value::Null);
    };

    match name {
        FunctionName::Reverse => Ok(Value::Text(args[0].chars().rev().collect())),
        FunctionName::StGeoFromText => {
            args[1].trim().parse::<i32>().map_err(|_| {
                FunctionError::argument(name.name(), format!("SRID {:?} is not an integer", args[1]))
            })?;
            Ok(match parse_wkt(args[0])? {
                Some(geom) => Value::Text(to_wkt(&normalize(geom))),
                None => Value::Null,
            })
        }
        _ => {
            let a = geometry_arg(name, args[0])?;
            let b = geometry_arg(name, args[1])?;
            eval_binary(name, &a, &b)
        }
    }
}

fn geometry_arg(name: FunctionName, text: &str) -> Result<Geometry<f64>> {
    parse_wkt(text)?
        .ok_or_else(|| FunctionError::argument(name.name(), "empty geometry"))
}

fn eval_binary(name: FunctionName, a: &Geometry<f64>, b: &Geometry<f64>) -> Result<Value> {
    if name == FunctionName::StDistance {
        return Ok(Value::Double(Euclidean.distance(a, b)));
    }
    if name == FunctionName::StMbrIntersects {
        return match (Envelope::from_geometry(a), Envelope::from_geometry(b)) {
            (Some(ea), Some(eb)) => Ok(ea.intersects(&eb).into()),
            _ => Err(FunctionError::argument(name.name(), "geometry has no envelope")),
        };
    }

    let matrix = a.relate(b);
    let result = match name {
        FunctionName::StEquals => matrix.is_equal_topo(),
        FunctionName::StWithin => matrix.is_within(),
        FunctionName::StContains => matrix.is_contains(),
        FunctionName::StIntersects => matrix.is_intersects(),
        FunctionName::StDisjoint => matrix.is_disjoint(),
        FunctionName::StCrosses => matrix.is_crosses(),
        FunctionName::StTouches => matrix.is_touches(),
        FunctionName::StOverlaps => matrix.is_overlaps(),
        other => {
            return Err(FunctionError::argument(
                other.name(),
                "not a binary geometry function",
            ))
        }
    };
    tracing::trace!(function = name.name(), result, "evaluated spatial predicate");
    Ok(result.into())
}
