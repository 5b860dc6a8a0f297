use super::{Expression, Filter, SpatialFilter, SpatialOperator};
use crate::error::{DialectError, Result};
use crate::schema::UNKNOWN_SRID;
use phoenix_geo_core::{normalize, to_wkt};

/// Operators the compiler can translate.
pub const SUPPORTED_OPERATORS: [&str; 11] = [
    "BBOX",
    "Contains",
    "Crosses",
    "Disjoint",
    "Equals",
    "Intersects",
    "Overlaps",
    "Touches",
    "Within",
    "DWithin",
    "Beyond",
];

/// Compiles spatial filter trees into SQL predicates over the engine's
/// `ST_*` functions.
///
/// Every operator except `Disjoint` is preceded by an
/// `ST_MBRINTERSECTS(a,b)` bounding-box test; `BBOX` is that test alone.
/// Literal geometries are inlined as `ST_GEOFROMTEXT('<wkt>', <srid>)`
/// using the SRID of the queried column.
///
/// ```text
/// Intersects(GEOM, POINT (1 1))
///   => ST_MBRINTERSECTS(GEOM,ST_GEOFROMTEXT('POINT (1 1)', 4326)) AND
///      ST_INTERSECTS(GEOM, ST_GEOFROMTEXT('POINT (1 1)', 4326))
/// ```
#[derive(Debug, Clone)]
pub struct SpatialPredicateCompiler {
    srid: i32,
    escape: String,
}

impl Default for SpatialPredicateCompiler {
    fn default() -> Self {
        Self {
            srid: UNKNOWN_SRID,
            escape: String::new(),
        }
    }
}

impl SpatialPredicateCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// SRID written into literal geometries.
    pub fn with_srid(mut self, srid: i32) -> Self {
        self.srid = srid;
        self
    }

    pub fn with_name_escape(mut self, escape: impl Into<String>) -> Self {
        self.escape = escape.into();
        self
    }

    pub fn srid(&self) -> i32 {
        self.srid
    }

    /// Operator names this compiler can lower.
    pub fn capabilities(&self) -> &'static [&'static str] {
        &SUPPORTED_OPERATORS
    }

    pub fn supports(&self, operator: &SpatialOperator) -> bool {
        SUPPORTED_OPERATORS.contains(&operator.name())
    }

    /// Compile a filter tree to a SQL predicate.
    pub fn compile(&self, filter: &Filter) -> Result<String> {
        let mut out = String::new();
        self.write_filter(filter, &mut out)?;
        tracing::trace!(sql = %out, "compiled spatial filter");
        Ok(out)
    }

    fn write_filter(&self, filter: &Filter, out: &mut String) -> Result<()> {
        match filter {
            Filter::Include => out.push_str("1 = 1"),
            Filter::Exclude => out.push_str("0 = 1"),
            Filter::And(children) => self.write_junction(children, " AND ", "1 = 1", out)?,
            Filter::Or(children) => self.write_junction(children, " OR ", "0 = 1", out)?,
            Filter::Not(inner) => {
                out.push_str("NOT (");
                self.write_filter(inner, out)?;
                out.push(')');
            }
            Filter::Spatial(spatial) => self.write_spatial(spatial, out)?,
        }
        Ok(())
    }

    fn write_junction(
        &self,
        children: &[Filter],
        separator: &str,
        identity: &str,
        out: &mut String,
    ) -> Result<()> {
        match children {
            [] => out.push_str(identity),
            [only] => self.write_filter(only, out)?,
            _ => {
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        out.push_str(separator);
                    }
                    out.push('(');
                    self.write_filter(child, out)?;
                    out.push(')');
                }
            }
        }
        Ok(())
    }

    fn write_spatial(&self, filter: &SpatialFilter, out: &mut String) -> Result<()> {
        let operator = &filter.operator;
        if !self.supports(operator) {
            return Err(DialectError::unsupported_operator(operator.to_string()));
        }
        if let SpatialOperator::DWithin(distance) | SpatialOperator::Beyond(distance) = operator {
            if !distance.is_finite() || *distance < 0.0 {
                return Err(DialectError::invalid_distance(operator.name(), *distance));
            }
        }

        // Canonical operand order is (property, literal).
        let (e1, e2, swapped) = match (&filter.left, &filter.right) {
            (left @ Expression::Literal(_), right @ Expression::Property(_)) => (right, left, true),
            (left, right) => (left, right, false),
        };

        if *operator != SpatialOperator::Disjoint {
            out.push_str("ST_MBRINTERSECTS(");
            self.write_expression(e1, out);
            out.push(',');
            self.write_expression(e2, out);
            out.push(')');

            if *operator == SpatialOperator::BBox {
                return Ok(());
            }
            out.push_str(" AND ");
        }

        match operator {
            SpatialOperator::DWithin(distance) | SpatialOperator::Beyond(distance) => {
                out.push_str("ST_DISTANCE(");
                self.write_expression(e1, out);
                out.push_str(", ");
                self.write_expression(e2, out);
                out.push(')');
                out.push(if matches!(operator, SpatialOperator::DWithin(_)) {
                    '<'
                } else {
                    '>'
                });
                out.push_str(&format!("{:?}", distance));
            }
            _ => {
                let function = operator
                    .sql_function()
                    .ok_or_else(|| DialectError::unsupported_operator(operator.to_string()))?;
                out.push_str(function);
                out.push('(');
                // Topological operators are not symmetric: keep the caller's order.
                let (first, second) = if swapped { (e2, e1) } else { (e1, e2) };
                self.write_expression(first, out);
                out.push_str(", ");
                self.write_expression(second, out);
                out.push(')');
            }
        }
        Ok(())
    }

    fn write_expression(&self, expression: &Expression, out: &mut String) {
        match expression {
            Expression::Property(name) => {
                out.push_str(&self.escape);
                out.push_str(name);
                out.push_str(&self.escape);
            }
            Expression::Literal(geometry) => {
                let wkt = to_wkt(&normalize(geometry.clone()));
                out.push_str(&format!("ST_GEOFROMTEXT('{}', {})", wkt, self.srid));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::{coord, point, Line, Polygon, Rect};
    use pretty_assertions::assert_eq;

    fn square() -> Polygon<f64> {
        Rect::new(coord! { x: 0.0, y: 0.0 }, coord! { x: 1.0, y: 1.0 }).to_polygon()
    }

    #[test]
    fn test_intersects_has_prefilter() {
        let sql = SpatialPredicateCompiler::new()
            .with_srid(4326)
            .compile(&Filter::on_property(
                SpatialOperator::Intersects,
                "GEOM",
                point! { x: 1.0, y: 1.0 },
            ))
            .unwrap();
        assert_eq!(
            sql,
            "ST_MBRINTERSECTS(GEOM,ST_GEOFROMTEXT('POINT (1 1)', 4326)) AND \
             ST_INTERSECTS(GEOM, ST_GEOFROMTEXT('POINT (1 1)', 4326))"
        );
    }

    #[test]
    fn test_disjoint_has_no_prefilter() {
        let sql = SpatialPredicateCompiler::new()
            .compile(&Filter::on_property(SpatialOperator::Disjoint, "GEOM", square()))
            .unwrap();
        assert!(sql.starts_with("ST_DISJOINT(GEOM, ST_GEOFROMTEXT('POLYGON (("));
        assert!(!sql.contains("MBRINTERSECTS"));
        assert!(sql.ends_with(", -1))"));
    }

    #[test]
    fn test_bbox_stops_after_prefilter() {
        let sql = SpatialPredicateCompiler::new()
            .compile(&Filter::on_property(SpatialOperator::BBox, "GEOM", point! { x: 2.0, y: 3.0 }))
            .unwrap();
        assert_eq!(sql, "ST_MBRINTERSECTS(GEOM,ST_GEOFROMTEXT('POINT (2 3)', -1))");
    }

    #[test]
    fn test_distance_operators() {
        let compiler = SpatialPredicateCompiler::new();
        let within = compiler
            .compile(&Filter::on_property(
                SpatialOperator::DWithin(10.0),
                "GEOM",
                point! { x: 0.0, y: 0.0 },
            ))
            .unwrap();
        assert_eq!(
            within,
            "ST_MBRINTERSECTS(GEOM,ST_GEOFROMTEXT('POINT (0 0)', -1)) AND \
             ST_DISTANCE(GEOM, ST_GEOFROMTEXT('POINT (0 0)', -1))<10.0"
        );

        let beyond = compiler
            .compile(&Filter::on_property(
                SpatialOperator::Beyond(2.5),
                "GEOM",
                point! { x: 0.0, y: 0.0 },
            ))
            .unwrap();
        assert!(beyond.ends_with("ST_DISTANCE(GEOM, ST_GEOFROMTEXT('POINT (0 0)', -1))>2.5"));
    }

    #[test]
    fn test_distance_must_be_finite_and_non_negative() {
        let compiler = SpatialPredicateCompiler::new();
        for operator in [
            SpatialOperator::DWithin(f64::INFINITY),
            SpatialOperator::DWithin(f64::NAN),
            SpatialOperator::Beyond(f64::NEG_INFINITY),
            SpatialOperator::Beyond(-1.0),
        ] {
            let err = compiler
                .compile(&Filter::on_property(operator, "GEOM", point! { x: 0.0, y: 0.0 }))
                .unwrap_err();
            assert!(matches!(err, DialectError::InvalidDistance { .. }), "{err}");
        }
        assert!(compiler
            .compile(&Filter::on_property(
                SpatialOperator::DWithin(0.0),
                "GEOM",
                point! { x: 0.0, y: 0.0 },
            ))
            .unwrap()
            .ends_with("<0.0"));
    }

    #[test]
    fn test_swapped_operands_keep_caller_order() {
        let filter = Filter::spatial(
            SpatialOperator::Contains,
            Expression::literal(square()),
            Expression::property("GEOM"),
        );
        let sql = SpatialPredicateCompiler::new().compile(&filter).unwrap();
        let (prefilter, predicate) = sql.split_once(" AND ").unwrap();
        assert!(prefilter.starts_with("ST_MBRINTERSECTS(GEOM,ST_GEOFROMTEXT("));
        assert!(predicate.starts_with("ST_CONTAINS(ST_GEOFROMTEXT('POLYGON"));
        assert!(predicate.ends_with(", GEOM)"));
    }

    #[test]
    fn test_line_literal_is_normalized() {
        let line = Line::new(coord! { x: 0.0, y: 0.0 }, coord! { x: 3.0, y: 4.0 });
        let sql = SpatialPredicateCompiler::new()
            .compile(&Filter::on_property(SpatialOperator::Crosses, "ROUTE", line))
            .unwrap();
        assert!(sql.contains("ST_GEOFROMTEXT('LINESTRING (0 0, 3 4)', -1)"));
        assert!(sql.contains("ST_CROSSES(ROUTE, "));
    }

    #[test]
    fn test_relate_is_unsupported() {
        let err = SpatialPredicateCompiler::new()
            .compile(&Filter::on_property(
                SpatialOperator::Relate("T*F**F***".to_string()),
                "GEOM",
                square(),
            ))
            .unwrap_err();
        match err {
            DialectError::UnsupportedOperator { operator } => {
                assert_eq!(operator, "Relate(T*F**F***)")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_boolean_combinators() {
        let compiler = SpatialPredicateCompiler::new().with_name_escape("\"");
        let filter = Filter::And(vec![
            Filter::on_property(SpatialOperator::BBox, "geom", point! { x: 1.0, y: 1.0 }),
            Filter::Or(vec![
                Filter::on_property(SpatialOperator::Disjoint, "geom", point! { x: 2.0, y: 2.0 }),
                Filter::Exclude,
            ])
            .negate(),
        ]);
        assert_eq!(
            compiler.compile(&filter).unwrap(),
            "(ST_MBRINTERSECTS(\"geom\",ST_GEOFROMTEXT('POINT (1 1)', -1))) AND \
             (NOT ((ST_DISJOINT(\"geom\", ST_GEOFROMTEXT('POINT (2 2)', -1))) OR (0 = 1)))"
        );
        assert_eq!(compiler.compile(&Filter::And(vec![])).unwrap(), "1 = 1");
        assert_eq!(compiler.compile(&Filter::Or(vec![])).unwrap(), "0 = 1");
    }
}
