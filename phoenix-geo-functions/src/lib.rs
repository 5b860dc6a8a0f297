//! # Phoenix Geo Functions
//!
//! Scalar spatial functions evaluated by the engine over WKT `VARCHAR`
//! values, and the DDL that deploys them.
//!
//! Predicates (`ST_CONTAINS`, `ST_WITHIN`, ...) return `1` or `0` as
//! `INTEGER`, `ST_DISTANCE` returns the planar distance as `DOUBLE`, and any
//! NULL argument yields NULL.
//!
//! ```
//! use phoenix_geo_functions::{eval_function, FunctionName, Value};
//!
//! let hit = eval_function(
//!     FunctionName::StWithin,
//!     &[Some("POINT (1 1)"), Some("POLYGON ((0 0, 2 0, 2 2, 0 2, 0 0))")],
//! )
//! .unwrap();
//! assert_eq!(hit, Value::Integer(1));
//! ```

pub mod ddl;
pub mod error;
pub mod eval;
pub mod registry;
pub mod value;

pub use ddl::{create_function_sql, drop_function_sql};
pub use error::{FunctionError, Result};
pub use eval::{eval_function, FunctionName};
pub use registry::{FunctionDef, FunctionRegistry, DEFAULT_PACKAGE};
pub use value::{SqlKind, Value};
