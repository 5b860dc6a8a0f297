//! Table, attribute and index descriptors handed to the dialect.

use phoenix_geo_core::GeometryKind;
use std::fmt;

/// Native scalar column types of the engine, with their JDBC type codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SqlType {
    Integer,
    BigInt,
    Double,
    Varchar,
    Binary,
    Varbinary,
    Char,
    Date,
    Time,
    Boolean,
    Float,
    Decimal,
    Timestamp,
}

impl SqlType {
    pub const ALL: [SqlType; 13] = [
        SqlType::Integer,
        SqlType::BigInt,
        SqlType::Double,
        SqlType::Varchar,
        SqlType::Binary,
        SqlType::Varbinary,
        SqlType::Char,
        SqlType::Date,
        SqlType::Time,
        SqlType::Boolean,
        SqlType::Float,
        SqlType::Decimal,
        SqlType::Timestamp,
    ];

    /// JDBC type code (`java.sql.Types`).
    pub fn code(&self) -> i32 {
        match self {
            SqlType::Integer => 4,
            SqlType::BigInt => -5,
            SqlType::Double => 8,
            SqlType::Varchar => 12,
            SqlType::Binary => -2,
            SqlType::Varbinary => -3,
            SqlType::Char => 1,
            SqlType::Date => 91,
            SqlType::Time => 92,
            SqlType::Boolean => 16,
            SqlType::Float => 6,
            SqlType::Decimal => 3,
            SqlType::Timestamp => 93,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SqlType::Integer => "INTEGER",
            SqlType::BigInt => "BIGINT",
            SqlType::Double => "DOUBLE",
            SqlType::Varchar => "VARCHAR",
            SqlType::Binary => "BINARY",
            SqlType::Varbinary => "VARBINARY",
            SqlType::Char => "CHAR",
            SqlType::Date => "DATE",
            SqlType::Time => "TIME",
            SqlType::Boolean => "BOOLEAN",
            SqlType::Float => "FLOAT",
            SqlType::Decimal => "DECIMAL",
            SqlType::Timestamp => "TIMESTAMP",
        }
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A coordinate reference system identifier, e.g. `EPSG:4326`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Crs {
    identifier: String,
}

impl Crs {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
        }
    }

    pub fn epsg(code: i32) -> Self {
        Self::new(format!("EPSG:{}", code))
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// EPSG code named by the identifier, if one can be recognised.
    ///
    /// Accepts `EPSG:n`, `urn:ogc:def:crs:EPSG::n`,
    /// `http://www.opengis.net/def/crs/EPSG/0/n` and the `CRS:84` alias.
    pub fn epsg_code(&self) -> Option<i32> {
        let id = self.identifier.trim();
        if id.eq_ignore_ascii_case("CRS:84") || id.to_ascii_uppercase().ends_with("CRS84") {
            return Some(4326);
        }
        let upper = id.to_ascii_uppercase();
        if !upper.contains("EPSG") {
            return None;
        }
        let tail = id.rsplit([':', '/']).next()?;
        tail.parse::<i32>().ok().filter(|code| *code > 0)
    }
}

/// Binding of an attribute: a scalar column or a geometry column.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeType {
    Scalar(SqlType),
    Geometry {
        kind: GeometryKind,
        crs: Option<Crs>,
    },
}

/// One attribute (column) of a feature type.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeDescriptor {
    pub name: String,
    pub binding: AttributeType,
    pub nullable: bool,
}

impl AttributeDescriptor {
    /// Nullable scalar attribute.
    pub fn scalar(name: impl Into<String>, ty: SqlType) -> Self {
        Self {
            name: name.into(),
            binding: AttributeType::Scalar(ty),
            nullable: true,
        }
    }

    /// Nullable geometry attribute with no CRS.
    pub fn geometry(name: impl Into<String>, kind: GeometryKind) -> Self {
        Self {
            name: name.into(),
            binding: AttributeType::Geometry { kind, crs: None },
            nullable: true,
        }
    }

    pub fn with_crs(mut self, crs: Crs) -> Self {
        if let AttributeType::Geometry { crs: slot, .. } = &mut self.binding {
            *slot = Some(crs);
        }
        self
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn is_geometry(&self) -> bool {
        matches!(self.binding, AttributeType::Geometry { .. })
    }

    pub fn geometry_kind(&self) -> Option<GeometryKind> {
        match &self.binding {
            AttributeType::Geometry { kind, .. } => Some(*kind),
            AttributeType::Scalar(_) => None,
        }
    }

    pub fn crs(&self) -> Option<&Crs> {
        match &self.binding {
            AttributeType::Geometry { crs, .. } => crs.as_ref(),
            AttributeType::Scalar(_) => None,
        }
    }
}

/// Default primary key column name.
pub const DEFAULT_PRIMARY_KEY: &str = "FID";

/// Schema of a feature table.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureType {
    pub name: String,
    pub primary_key: String,
    pub attributes: Vec<AttributeDescriptor>,
}

impl FeatureType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            primary_key: DEFAULT_PRIMARY_KEY.to_string(),
            attributes: Vec::new(),
        }
    }

    pub fn with_primary_key(mut self, column: impl Into<String>) -> Self {
        self.primary_key = column.into();
        self
    }

    pub fn with_attribute(mut self, attribute: AttributeDescriptor) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn geometry_attributes(&self) -> impl Iterator<Item = &AttributeDescriptor> {
        self.attributes.iter().filter(|a| a.is_geometry())
    }
}

/// Request to create an index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexDescriptor {
    /// Indexed table (feature type name).
    pub table: String,
    pub name: String,
    pub unique: bool,
    pub attributes: Vec<String>,
}

impl IndexDescriptor {
    pub fn new<I, S>(table: impl Into<String>, name: impl Into<String>, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            table: table.into(),
            name: name.into(),
            unique: false,
            attributes: attributes.into_iter().map(Into::into).collect(),
        }
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }
}

/// Default coordinate dimension of a spatial column.
pub const DEFAULT_DIMENSION: u32 = 2;

/// SRID recorded when the reference system is unknown.
pub const UNKNOWN_SRID: i32 = -1;

/// Metadata of one spatial column, as recorded in the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpatialColumnDescriptor {
    pub schema: Option<String>,
    pub table: String,
    pub column: String,
    pub kind: GeometryKind,
    pub dimension: u32,
    pub srid: i32,
    pub nullable: bool,
}

impl SpatialColumnDescriptor {
    pub fn new(table: impl Into<String>, column: impl Into<String>, kind: GeometryKind) -> Self {
        Self {
            schema: None,
            table: table.into(),
            column: column.into(),
            kind,
            dimension: DEFAULT_DIMENSION,
            srid: UNKNOWN_SRID,
            nullable: true,
        }
    }

    pub fn with_schema(mut self, schema: Option<&str>) -> Self {
        self.schema = schema.map(str::to_string);
        self
    }

    pub fn with_srid(mut self, srid: i32) -> Self {
        self.srid = srid;
        self
    }

    pub fn with_dimension(mut self, dimension: u32) -> Self {
        self.dimension = dimension;
        self
    }

    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }
}

/// Column metadata reported by schema introspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMetadata {
    pub schema: Option<String>,
    pub table: String,
    pub column: String,
    /// Declared native type name, e.g. `VARCHAR`.
    pub type_name: String,
}

impl ColumnMetadata {
    pub fn new(
        schema: Option<&str>,
        table: impl Into<String>,
        column: impl Into<String>,
        type_name: impl Into<String>,
    ) -> Self {
        Self {
            schema: schema.map(str::to_string),
            table: table.into(),
            column: column.into(),
            type_name: type_name.into(),
        }
    }
}
