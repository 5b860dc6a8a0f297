//! Type code and type name mappings for geometry and scalar columns.

use crate::catalog::MetadataCatalog;
use crate::connection::Connection;
use crate::error::Result;
use crate::schema::{ColumnMetadata, SqlType};
use phoenix_geo_core::{GeometryEncoding, GeometryKind};
use rustc_hash::FxHashMap;

/// First dialect type code assigned to geometry kinds.
const GEOMETRY_CODE_BASE: i32 = 3001;

/// Immutable lookup tables between geometry kinds, dialect type codes and
/// type names.
///
/// Geometry codes run from 3001 in [`GeometryKind::ALL`] order: POINT 3001,
/// MULTIPOINT 3002, LINESTRING 3003, MULTILINESTRING 3004, POLYGON 3005,
/// MULTIPOLYGON 3006, GEOMETRY 3007, GEOMETRYCOLLECTION 3008. Scalar codes
/// are the JDBC ones.
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    kind_to_code: FxHashMap<GeometryKind, i32>,
    code_to_kind: FxHashMap<i32, GeometryKind>,
    code_to_name: FxHashMap<i32, &'static str>,
    storage_type: SqlType,
}

impl TypeRegistry {
    pub fn new(encoding: GeometryEncoding) -> Self {
        let mut kind_to_code = FxHashMap::default();
        let mut code_to_kind = FxHashMap::default();
        let mut code_to_name = FxHashMap::default();

        for (kind, code) in GeometryKind::ALL.into_iter().zip(GEOMETRY_CODE_BASE..) {
            kind_to_code.insert(kind, code);
            code_to_kind.insert(code, kind);
            code_to_name.insert(code, kind.name());
        }
        for ty in SqlType::ALL {
            code_to_name.insert(ty.code(), ty.name());
        }

        let storage_type = match encoding {
            GeometryEncoding::Wkt => SqlType::Varchar,
            GeometryEncoding::Wkb => SqlType::Varbinary,
        };

        Self {
            kind_to_code,
            code_to_kind,
            code_to_name,
            storage_type,
        }
    }

    /// Native column type geometries are stored in.
    pub fn storage_type(&self) -> SqlType {
        self.storage_type
    }

    pub fn code_of(&self, kind: GeometryKind) -> Option<i32> {
        self.kind_to_code.get(&kind).copied()
    }

    pub fn kind_of_code(&self, code: i32) -> Option<GeometryKind> {
        self.code_to_kind.get(&code).copied()
    }

    /// Look up a geometry kind by type name, ignoring case. Older catalogs
    /// spell the collection kind `GEOMETRYCOLLETION`; that name resolves too.
    pub fn kind_of_name(&self, name: &str) -> Option<GeometryKind> {
        GeometryKind::from_name(name)
    }

    /// Canonical type name of a geometry or scalar type code.
    pub fn type_name(&self, code: i32) -> Option<&'static str> {
        self.code_to_name.get(&code).copied()
    }

    /// Geometry kind of an introspected column.
    ///
    /// Only columns declared with the storage type are looked up in the
    /// catalog; every other column yields `None` and is classified as a
    /// plain scalar by the caller.
    pub fn classify(
        &self,
        conn: &dyn Connection,
        catalog: &MetadataCatalog,
        column: &ColumnMetadata,
    ) -> Result<Option<GeometryKind>> {
        if !column
            .type_name
            .trim()
            .eq_ignore_ascii_case(self.storage_type.name())
        {
            return Ok(None);
        }
        let type_name = catalog.lookup_type_name(
            conn,
            column.schema.as_deref(),
            &column.table,
            &column.column,
        )?;
        Ok(type_name.and_then(|name| self.kind_of_name(&name)))
    }
}
