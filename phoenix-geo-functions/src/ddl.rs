//! DDL deploying functions to the engine.

use crate::eval::FunctionName;
use crate::registry::FunctionDef;

/// `CREATE FUNCTION` statement for a function whose class lives in the jar
/// at `jar_location`.
pub fn create_function_sql(def: &FunctionDef, jar_location: &str) -> String {
    let args: Vec<&str> = def.name.arg_types().iter().map(|t| t.name()).collect();
    format!(
        "CREATE FUNCTION {}({}) RETURNS {} AS '{}' USING JAR '{}'",
        def.name,
        args.join(", "),
        def.name.return_type(),
        def.class_name,
        jar_location
    )
}

pub fn drop_function_sql(name: FunctionName) -> String {
    format!("DROP FUNCTION IF EXISTS {}", name)
}
