//! Configuration types for the Phoenix dialect

use crate::error::{DialectError, Result};
use phoenix_geo_core::{GeometryEncoding, WkbByteOrder};
use serde::{Deserialize, Serialize};

/// A configuration leaf that may be indirected through an environment
/// variable, falling back to a default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfigValue {
    pub env_var: Option<String>,
    pub default_val: Option<String>,
}

impl ConfigValue {
    /// A fixed value.
    pub fn literal(value: impl Into<String>) -> Self {
        Self {
            env_var: None,
            default_val: Some(value.into()),
        }
    }

    /// Read from `var`, falling back to `default`.
    pub fn env(var: impl Into<String>, default: Option<&str>) -> Self {
        Self {
            env_var: Some(var.into()),
            default_val: default.map(str::to_string),
        }
    }

    pub fn resolve_string(&self) -> Option<String> {
        if let Some(var) = &self.env_var {
            if let Ok(val) = std::env::var(var) {
                if !val.is_empty() {
                    return Some(val);
                }
            }
        }
        self.default_val.clone()
    }
}

/// Order in which `INSERT` is rewritten to `UPSERT` relative to appending
/// the encoded table name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UpsertRewriteOrder {
    /// Rewrite the statement prefix, then append the table name. Table names
    /// containing `INSERT` are never touched.
    #[default]
    BeforeEncode,
    /// Append the table name, then rewrite the first `INSERT` in the buffer.
    AfterEncode,
}

/// Handling of index requests flagged unique. The engine has no unique
/// index DDL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UniqueIndexPolicy {
    /// Create a plain index and log a warning.
    #[default]
    Downgrade,
    /// Fail with [`DialectError::UniqueIndexUnsupported`].
    Reject,
}

/// Dialect configuration.
///
/// Fixed once a translator is built from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DialectConfig {
    /// Wire form of geometry columns.
    pub encoding: GeometryEncoding,

    /// Create tables with `IMMUTABLE_ROWS = true`.
    /// Default: true
    pub immutable_rows: bool,

    /// Quote wrapped around identifiers. Default: empty
    pub name_escape: String,

    /// Suffix appended to a geometry column name to name its index.
    /// Default: "_idx"
    pub index_suffix: String,

    pub upsert_rewrite: UpsertRewriteOrder,

    /// Byte order of written WKB.
    pub wkb_byte_order: WkbByteOrder,

    /// Append a `/* KIND */` comment to geometry column DDL.
    pub geometry_type_hints: bool,

    pub unique_index_policy: UniqueIndexPolicy,
}

impl Default for DialectConfig {
    fn default() -> Self {
        Self {
            encoding: GeometryEncoding::Wkt,
            immutable_rows: true,
            name_escape: String::new(),
            index_suffix: "_idx".to_string(),
            upsert_rewrite: UpsertRewriteOrder::default(),
            wkb_byte_order: WkbByteOrder::default(),
            geometry_type_hints: false,
            unique_index_policy: UniqueIndexPolicy::default(),
        }
    }
}

impl DialectConfig {
    /// WKT text in `VARCHAR` columns.
    pub fn text() -> Self {
        Self::default()
    }

    /// WKB bytes in `VARBINARY` columns.
    pub fn binary() -> Self {
        Self {
            encoding: GeometryEncoding::Wkb,
            ..Self::default()
        }
    }

    /// Parse from JSON; missing keys take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: DialectConfig = serde_json::from_str(json)
            .map_err(|e| DialectError::invalid_config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.index_suffix.is_empty() {
            return Err(DialectError::invalid_config("indexSuffix must not be empty"));
        }
        if self.name_escape.chars().any(|c| c.is_alphanumeric() || c.is_whitespace()) {
            return Err(DialectError::invalid_config(format!(
                "nameEscape must be a quote character, got {:?}",
                self.name_escape
            )));
        }
        Ok(())
    }

    pub fn with_encoding(mut self, encoding: GeometryEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn with_immutable_rows(mut self, immutable_rows: bool) -> Self {
        self.immutable_rows = immutable_rows;
        self
    }

    pub fn with_name_escape(mut self, escape: impl Into<String>) -> Self {
        self.name_escape = escape.into();
        self
    }

    pub fn with_index_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.index_suffix = suffix.into();
        self
    }

    pub fn with_upsert_rewrite(mut self, order: UpsertRewriteOrder) -> Self {
        self.upsert_rewrite = order;
        self
    }

    pub fn with_wkb_byte_order(mut self, order: WkbByteOrder) -> Self {
        self.wkb_byte_order = order;
        self
    }

    pub fn with_geometry_type_hints(mut self, hints: bool) -> Self {
        self.geometry_type_hints = hints;
        self
    }

    pub fn with_unique_index_policy(mut self, policy: UniqueIndexPolicy) -> Self {
        self.unique_index_policy = policy;
        self
    }
}

/// Database type identifier of the data store.
pub const DB_TYPE: &str = "phoenix";

/// Default ZooKeeper quorum port.
pub const DEFAULT_PORT: u16 = 2181;

/// JDBC driver class of the engine.
pub const DRIVER_CLASS: &str = "org.apache.phoenix.jdbc.PhoenixDriver";

/// Connection parameters of a Phoenix data store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DataStoreParams {
    pub dbtype: String,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub database: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
}

impl Default for DataStoreParams {
    fn default() -> Self {
        Self {
            dbtype: DB_TYPE.to_string(),
            host: Some("localhost".to_string()),
            port: Some(DEFAULT_PORT),
            database: None,
            user: None,
            password: None,
        }
    }
}

impl DataStoreParams {
    /// Resolve parameters whose values may come from the environment.
    pub fn resolve(sources: &DataStoreParamSources) -> Result<Self> {
        let port = sources
            .port
            .resolve_string()
            .map(|p| {
                p.trim()
                    .parse::<u16>()
                    .map_err(|_| DialectError::invalid_config(format!("invalid port: {:?}", p)))
            })
            .transpose()?;

        Ok(Self {
            dbtype: DB_TYPE.to_string(),
            host: sources.host.resolve_string(),
            port,
            database: sources.database.resolve_string(),
            user: sources.user.resolve_string(),
            password: sources.password.resolve_string(),
        })
    }

    /// JDBC URL of the data store.
    ///
    /// `jdbc:phoenix:<host>:<port>:/<db>`, or `jdbc:phoenix:<host>/<db>`
    /// without a port. With no host the loopback address is used.
    pub fn jdbc_url(&self) -> String {
        let database = self.database.as_deref().unwrap_or_default();
        match self.host.as_deref().filter(|h| !h.is_empty()) {
            Some(host) => match self.port {
                Some(port) => format!("jdbc:phoenix:{}:{}:/{}", host, port, database),
                None => format!("jdbc:phoenix:{}/{}", host, database),
            },
            None => format!("jdbc:phoenix:127.0.0.1:/{}", database),
        }
    }
}

/// Sources for each [`DataStoreParams`] field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DataStoreParamSources {
    pub host: ConfigValue,
    pub port: ConfigValue,
    pub database: ConfigValue,
    pub user: ConfigValue,
    pub password: ConfigValue,
}
