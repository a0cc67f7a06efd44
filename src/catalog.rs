//! Per-table schema metadata and the key-naming convention that maps
//! tables, rows, and columns onto the flat key space.

use crate::codec;
use crate::error::DbError;
use crate::storage::Store;
use crate::value::DataType;

#[derive(Debug, Clone, PartialEq)]
pub struct TableMeta {
    pub name: String,
    /// Definition order, which is also the positional mapping for an
    /// INSERT without an explicit column list.
    pub columns: Vec<ColumnMeta>,
    /// Highest row id handed out so far; 0 means no rows.
    pub last_insert_id: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnMeta {
    pub name: String,
    pub ty: DataType,
    pub ordinal: usize,
}

/// Schema key: `/tables/<table_name>`.
pub fn table_key(table: &str) -> Vec<u8> {
    format!("/tables/{}", table).into_bytes()
}

/// Cell key: `/tables/<table_name>/<row_id>/<column_name>`.
pub fn cell_key(table: &str, row_id: u64, column: &str) -> Vec<u8> {
    format!("/tables/{}/{}/{}", table, row_id, column).into_bytes()
}

/// Builds a fresh schema and writes it. An existing table under the
/// same name is silently overwritten.
pub fn create_table(
    store: &impl Store,
    name: &str,
    columns: Vec<(Box<str>, DataType)>,
) -> Result<TableMeta, DbError> {
    let columns = columns
        .into_iter()
        .enumerate()
        .map(|(ordinal, (name, ty))| ColumnMeta {
            name: name.into(),
            ty,
            ordinal,
        })
        .collect();
    let meta = TableMeta {
        name: name.to_owned(),
        columns,
        last_insert_id: 0,
    };
    store
        .set(&table_key(name), &codec::encode_table(&meta))
        .map_err(|_| DbError::FailedToCreateTable(name.to_owned()))?;
    tracing::debug!(table = name, "created table");
    Ok(meta)
}

pub fn load_table(store: &impl Store, name: &str) -> Result<TableMeta, DbError> {
    let bytes = store
        .get(&table_key(name))
        .map_err(|e| DbError::Internal(e.to_string()))?
        .ok_or_else(|| DbError::TableNotFound(name.to_owned()))?;
    codec::decode_table(&bytes)
}

/// Persists schema metadata, typically after a row-id allocation.
pub fn store_table(store: &impl Store, meta: &TableMeta) -> Result<(), DbError> {
    store
        .set(&table_key(&meta.name), &codec::encode_table(meta))
        .map_err(|e| DbError::Internal(e.to_string()))
}

/// Maps an optional explicit column-name list onto the schema. A given
/// list must match the table's column count and each name must exist;
/// the result preserves the caller's order. No list means definition
/// order.
pub fn resolve_columns<'a>(
    meta: &'a TableMeta,
    names: Option<&[Box<str>]>,
) -> Result<Vec<&'a ColumnMeta>, DbError> {
    let Some(names) = names else {
        return Ok(meta.columns.iter().collect());
    };
    if names.len() != meta.columns.len() {
        return Err(DbError::WrongNumberOfColumns {
            expected: meta.columns.len(),
            found: names.len(),
        });
    }
    names
        .iter()
        .map(|name| {
            meta.columns
                .iter()
                .find(|col| col.name == **name)
                .ok_or_else(|| DbError::ColumnNotFound(name.to_string()))
        })
        .collect()
}

/// Hands out the next row id. The caller persists the updated metadata.
pub fn allocate_row_id(meta: &mut TableMeta) -> u64 {
    meta.last_insert_id += 1;
    meta.last_insert_id
}
