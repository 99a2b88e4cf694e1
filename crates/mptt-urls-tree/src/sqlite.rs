//! `SQLite` tree store using `rusqlite`.
//!
//! Each model maps to one table with at least `id`, `slug` and `parent_id`
//! columns. Any other column is returned in [`TreeNode::fields`]. Queries are
//! synchronous; the connection sits behind a `Mutex`.

use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use rusqlite::types::ValueRef;

use mptt_urls_core::{MpttError, MpttResult};

use crate::model::{is_identifier, ModelDescriptor};
use crate::node::TreeNode;
use crate::store::TreeStore;

/// A `SQLite`-backed tree store.
pub struct SqliteTreeStore {
    /// The path to the database file (or ":memory:").
    path: PathBuf,
    conn: Mutex<rusqlite::Connection>,
}

impl std::fmt::Debug for SqliteTreeStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteTreeStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl SqliteTreeStore {
    /// Opens a database at the given path; `:memory:` opens an in-memory one.
    pub fn open(path: impl Into<PathBuf>) -> MpttResult<Self> {
        let path = path.into();
        let conn = if path.to_str() == Some(":memory:") {
            rusqlite::Connection::open_in_memory()
        } else {
            rusqlite::Connection::open(&path)
        }
        .map_err(|e| MpttError::OperationalError(format!("SQLite open failed: {e}")))?;

        conn.execute_batch("PRAGMA foreign_keys=ON;")
            .map_err(|e| MpttError::OperationalError(format!("Failed to set pragmas: {e}")))?;

        Ok(Self {
            path,
            conn: Mutex::new(conn),
        })
    }

    /// Opens an existing database file for reading only.
    ///
    /// A missing file is an [`MpttError::OperationalError`]; nothing is
    /// created on disk.
    pub fn open_read_only(path: impl Into<PathBuf>) -> MpttResult<Self> {
        let path = path.into();
        if !path.is_file() {
            return Err(MpttError::OperationalError(format!(
                "database '{}' does not exist",
                path.display()
            )));
        }
        let conn = rusqlite::Connection::open_with_flags(
            &path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| MpttError::OperationalError(format!("SQLite open failed: {e}")))?;

        Ok(Self {
            path,
            conn: Mutex::new(conn),
        })
    }

    /// Opens an in-memory database.
    pub fn memory() -> MpttResult<Self> {
        Self::open(":memory:")
    }

    /// Returns the database file path.
    pub const fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Creates the table for `model` if it does not exist.
    ///
    /// `extra_columns` are added as nullable `TEXT` columns. Slugs are unique
    /// per parent.
    pub fn create_table(&self, model: &ModelDescriptor, extra_columns: &[&str]) -> MpttResult<()> {
        let mut columns = vec![
            "id INTEGER PRIMARY KEY AUTOINCREMENT".to_string(),
            "slug TEXT NOT NULL".to_string(),
            "parent_id INTEGER".to_string(),
        ];
        for column in extra_columns {
            columns.push(format!("{} TEXT", checked_identifier(column)?));
        }
        columns.push("UNIQUE (parent_id, slug)".to_string());

        let sql = format!(
            "CREATE TABLE IF NOT EXISTS {} ({})",
            model.db_table,
            columns.join(", ")
        );
        self.execute_batch(&sql)
    }

    /// Runs raw SQL (schema setup, fixtures).
    pub fn execute_batch(&self, sql: &str) -> MpttResult<()> {
        self.conn
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .execute_batch(sql)
            .map_err(|e| MpttError::DatabaseError(e.to_string()))
    }

    /// Inserts a row and returns it with its assigned primary key.
    pub fn insert(
        &self,
        model: &ModelDescriptor,
        slug: &str,
        parent: Option<&TreeNode>,
        fields: &serde_json::Map<String, serde_json::Value>,
    ) -> MpttResult<TreeNode> {
        let mut columns = vec!["slug".to_string(), "parent_id".to_string()];
        let mut values: Vec<rusqlite::types::Value> = vec![
            slug.to_string().into(),
            parent.map_or(rusqlite::types::Value::Null, |p| p.id.into()),
        ];
        for (name, value) in fields {
            columns.push(checked_identifier(name)?.to_string());
            values.push(json_to_sql(value));
        }

        let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{i}")).collect();
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            model.db_table,
            columns.join(", "),
            placeholders.join(", ")
        );

        let conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        conn.execute(&sql, rusqlite::params_from_iter(values))
            .map_err(|e| MpttError::DatabaseError(e.to_string()))?;

        Ok(TreeNode {
            id: conn.last_insert_rowid(),
            slug: slug.to_string(),
            parent_id: parent.map(|p| p.id),
            model: model.path.clone(),
            fields: fields.clone(),
        })
    }

    fn query(
        &self,
        model: &ModelDescriptor,
        filter: &str,
        params: &[&dyn rusqlite::ToSql],
    ) -> MpttResult<Vec<TreeNode>> {
        let sql = format!("SELECT * FROM {} WHERE {filter} ORDER BY id", model.db_table);
        tracing::trace!(%sql, "tree query");

        let conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| MpttError::DatabaseError(e.to_string()))?;
        let column_names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

        let mut rows = stmt
            .query(params)
            .map_err(|e| MpttError::DatabaseError(e.to_string()))?;

        let mut nodes = Vec::new();
        while let Some(row) = rows
            .next()
            .map_err(|e| MpttError::DatabaseError(e.to_string()))?
        {
            nodes.push(convert_row(row, &column_names, model)?);
        }
        Ok(nodes)
    }
}

impl TreeStore for SqliteTreeStore {
    fn roots(&self, model: &ModelDescriptor, slug: &str) -> MpttResult<Vec<TreeNode>> {
        self.query(model, "slug = ?1 AND parent_id IS NULL", &[&slug])
    }

    fn children(
        &self,
        model: &ModelDescriptor,
        parent: &TreeNode,
        slug: &str,
    ) -> MpttResult<Vec<TreeNode>> {
        self.query(model, "slug = ?1 AND parent_id = ?2", &[&slug, &parent.id])
    }

    fn get(&self, model: &ModelDescriptor, id: i64) -> MpttResult<Option<TreeNode>> {
        Ok(self.query(model, "id = ?1", &[&id])?.into_iter().next())
    }
}

fn checked_identifier(name: &str) -> MpttResult<&str> {
    if is_identifier(name) {
        Ok(name)
    } else {
        Err(MpttError::DatabaseError(format!("invalid column name '{name}'")))
    }
}

fn json_to_sql(value: &serde_json::Value) -> rusqlite::types::Value {
    use rusqlite::types::Value;

    match value {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Integer(i64::from(*b)),
        serde_json::Value::Number(n) => n
            .as_i64()
            .map(Value::Integer)
            .or_else(|| n.as_f64().map(Value::Real))
            .unwrap_or(Value::Null),
        serde_json::Value::String(s) => Value::Text(s.clone()),
        other => Value::Text(other.to_string()),
    }
}

/// Converts a `rusqlite::Row` into a [`TreeNode`].
fn convert_row(
    row: &rusqlite::Row<'_>,
    column_names: &[String],
    model: &ModelDescriptor,
) -> MpttResult<TreeNode> {
    let mut id = None;
    let mut slug = None;
    let mut parent_id = None;
    let mut fields = serde_json::Map::new();

    for (i, name) in column_names.iter().enumerate() {
        let value = row
            .get_ref(i)
            .map_err(|e| MpttError::DatabaseError(e.to_string()))?;
        match (name.as_str(), value) {
            ("id", ValueRef::Integer(v)) => id = Some(v),
            ("slug", ValueRef::Text(b)) => slug = Some(String::from_utf8_lossy(b).into_owned()),
            ("parent_id", ValueRef::Integer(v)) => parent_id = Some(v),
            ("parent_id", ValueRef::Null) => {}
            (_, ValueRef::Null) => {
                fields.insert(name.clone(), serde_json::Value::Null);
            }
            (_, ValueRef::Integer(v)) => {
                fields.insert(name.clone(), v.into());
            }
            (_, ValueRef::Real(v)) => {
                fields.insert(name.clone(), v.into());
            }
            (_, ValueRef::Text(b)) => {
                fields.insert(name.clone(), String::from_utf8_lossy(b).into_owned().into());
            }
            (_, ValueRef::Blob(_)) => {}
        }
    }

    match (id, slug) {
        (Some(id), Some(slug)) => Ok(TreeNode {
            id,
            slug,
            parent_id,
            model: model.path.clone(),
            fields,
        }),
        _ => Err(MpttError::DatabaseError(format!(
            "table {} lacks an integer id or text slug column",
            model.db_table
        ))),
    }
}
