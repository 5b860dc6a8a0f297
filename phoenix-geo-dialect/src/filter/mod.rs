//! Spatial filter trees and their compilation to SQL.

mod compiler;

pub use compiler::{SpatialPredicateCompiler, SUPPORTED_OPERATORS};

use geo_types::Geometry;
use std::fmt;

/// Operand of a spatial predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// A column of the queried table.
    Property(String),
    /// A constant geometry.
    Literal(Geometry<f64>),
}

impl Expression {
    pub fn property(name: impl Into<String>) -> Self {
        Expression::Property(name.into())
    }

    pub fn literal(geometry: impl Into<Geometry<f64>>) -> Self {
        Expression::Literal(geometry.into())
    }

    pub fn is_property(&self) -> bool {
        matches!(self, Expression::Property(_))
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Expression::Literal(_))
    }
}

/// Binary spatial operators.
#[derive(Debug, Clone, PartialEq)]
pub enum SpatialOperator {
    /// Bounding boxes intersect.
    BBox,
    Contains,
    Crosses,
    Disjoint,
    Equals,
    Intersects,
    Overlaps,
    Touches,
    Within,
    /// Closer than the distance.
    DWithin(f64),
    /// Farther than the distance.
    Beyond(f64),
    /// DE-9IM pattern match.
    Relate(String),
}

impl SpatialOperator {
    pub fn name(&self) -> &'static str {
        match self {
            SpatialOperator::BBox => "BBOX",
            SpatialOperator::Contains => "Contains",
            SpatialOperator::Crosses => "Crosses",
            SpatialOperator::Disjoint => "Disjoint",
            SpatialOperator::Equals => "Equals",
            SpatialOperator::Intersects => "Intersects",
            SpatialOperator::Overlaps => "Overlaps",
            SpatialOperator::Touches => "Touches",
            SpatialOperator::Within => "Within",
            SpatialOperator::DWithin(_) => "DWithin",
            SpatialOperator::Beyond(_) => "Beyond",
            SpatialOperator::Relate(_) => "Relate",
        }
    }

    /// SQL function evaluating a topological operator.
    pub fn sql_function(&self) -> Option<&'static str> {
        match self {
            SpatialOperator::Contains => Some("ST_CONTAINS"),
            SpatialOperator::Crosses => Some("ST_CROSSES"),
            SpatialOperator::Disjoint => Some("ST_DISJOINT"),
            SpatialOperator::Equals => Some("ST_EQUALS"),
            SpatialOperator::Intersects => Some("ST_INTERSECTS"),
            SpatialOperator::Overlaps => Some("ST_OVERLAPS"),
            SpatialOperator::Touches => Some("ST_TOUCHES"),
            SpatialOperator::Within => Some("ST_WITHIN"),
            _ => None,
        }
    }
}

impl fmt::Display for SpatialOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpatialOperator::DWithin(d) | SpatialOperator::Beyond(d) => {
                write!(f, "{}({})", self.name(), d)
            }
            SpatialOperator::Relate(pattern) => write!(f, "Relate({})", pattern),
            _ => f.write_str(self.name()),
        }
    }
}

/// A binary spatial predicate.
#[derive(Debug, Clone, PartialEq)]
pub struct SpatialFilter {
    pub operator: SpatialOperator,
    pub left: Expression,
    pub right: Expression,
}

impl SpatialFilter {
    pub fn new(operator: SpatialOperator, left: Expression, right: Expression) -> Self {
        Self {
            operator,
            left,
            right,
        }
    }
}

/// A filter tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Matches every row.
    Include,
    /// Matches no row.
    Exclude,
    And(Vec<Filter>),
    Or(Vec<Filter>),
    Not(Box<Filter>),
    Spatial(SpatialFilter),
}

impl Filter {
    pub fn spatial(operator: SpatialOperator, left: Expression, right: Expression) -> Self {
        Filter::Spatial(SpatialFilter::new(operator, left, right))
    }

    /// `property <operator> geometry`
    pub fn on_property(
        operator: SpatialOperator,
        property: impl Into<String>,
        geometry: impl Into<Geometry<f64>>,
    ) -> Self {
        Self::spatial(
            operator,
            Expression::property(property),
            Expression::literal(geometry),
        )
    }

    pub fn negate(self) -> Self {
        Filter::Not(Box::new(self))
    }
}
