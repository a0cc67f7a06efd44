//! Statement execution: interprets a parsed statement against the
//! catalog and the key-value store.

use crate::catalog::{self, ColumnMeta, TableMeta};
use crate::codec;
use crate::error::DbError;
use crate::query::{Atom, Cmp, Op, Parser, Stmt};
use crate::storage::Store;
use crate::value::{DataType, Value};

/// One materialized row of a SELECT result. Rows have no persisted
/// representation as a unit; this is assembled from one point read per
/// projected column.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub id: u64,
    /// Decoded value plus the raw encoded bytes it came from, in
    /// projection order.
    pub cells: Vec<(Value, Vec<u8>)>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum QueryResult {
    Rows(Vec<Row>),
    Success,
}

pub struct Executor<S: Store> {
    store: S,
}

impl<S: Store> Executor<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Parses and runs one statement. Each call is a pure function of
    /// the statement plus the store's current contents; no state is
    /// carried between calls.
    pub fn run(&self, sql: &str) -> Result<QueryResult, DbError> {
        let stmt = Parser::new(sql).parse()?;
        match stmt {
            Stmt::Create { table, columns } => self.run_create(&table, columns),
            Stmt::Insert {
                table,
                columns,
                values,
            } => self.run_insert(&table, columns.as_deref(), values),
            Stmt::Select {
                table,
                columns,
                filter,
            } => self.run_select(&table, columns.as_deref(), filter.as_ref()),
        }
    }

    fn run_create(
        &self,
        table: &str,
        columns: Vec<(Box<str>, DataType)>,
    ) -> Result<QueryResult, DbError> {
        catalog::create_table(&self.store, table, columns)?;
        Ok(QueryResult::Success)
    }

    fn run_insert(
        &self,
        table: &str,
        columns: Option<&[Box<str>]>,
        values: Vec<Value>,
    ) -> Result<QueryResult, DbError> {
        let mut meta = catalog::load_table(&self.store, table)?;
        let row_id = catalog::allocate_row_id(&mut meta);
        // The id counter is persisted before any cell write. A failure
        // past this point leaves the counter advanced with cells
        // missing; a later SELECT surfaces that as a read error.
        catalog::store_table(&self.store, &meta)?;

        let target = catalog::resolve_columns(&meta, columns)?;
        if values.len() != target.len() {
            return Err(DbError::WrongNumberOfColumns {
                expected: target.len(),
                found: values.len(),
            });
        }
        for (column, value) in target.iter().zip(&values) {
            if !value.verify(column.ty) {
                return Err(DbError::BadType {
                    column: column.name.clone(),
                    expected: column.ty,
                    found: value.data_type(),
                });
            }
            self.store
                .set(
                    &catalog::cell_key(table, row_id, &column.name),
                    &codec::encode_value(value),
                )
                .map_err(|e| DbError::Internal(e.to_string()))?;
        }
        tracing::debug!(table, row_id, "inserted row");
        Ok(QueryResult::Success)
    }

    fn run_select(
        &self,
        table: &str,
        columns: Option<&[Box<str>]>,
        filter: Option<&Cmp>,
    ) -> Result<QueryResult, DbError> {
        let meta = catalog::load_table(&self.store, table)?;
        let projection = catalog::resolve_columns(&meta, columns)?;
        let mut rows = Vec::new();
        // Full sequential scan; row ids are dense from 1 because cells
        // are never deleted.
        for row_id in 1..=meta.last_insert_id {
            if let Some(cmp) = filter
                && !self.eval(&meta, row_id, cmp)?
            {
                continue;
            }
            rows.push(self.fetch_row(&meta, row_id, &projection)?);
        }
        tracing::debug!(table, rows = rows.len(), "select done");
        Ok(QueryResult::Rows(rows))
    }

    fn fetch_row(
        &self,
        meta: &TableMeta,
        row_id: u64,
        projection: &[&ColumnMeta],
    ) -> Result<Row, DbError> {
        let mut cells = Vec::with_capacity(projection.len());
        for column in projection {
            let raw = self.read_cell(&meta.name, row_id, &column.name)?;
            let value = codec::decode_value(&raw)?;
            cells.push((value, raw));
        }
        Ok(Row { id: row_id, cells })
    }

    fn eval(&self, meta: &TableMeta, row_id: u64, cmp: &Cmp) -> Result<bool, DbError> {
        let lhs = self.resolve_atom(meta, row_id, &cmp.lhs)?;
        let rhs = self.resolve_atom(meta, row_id, &cmp.rhs)?;
        Ok(match cmp.op {
            Op::Eq => lhs == rhs,
            Op::Lt => lhs.lt(&rhs),
            Op::Gt => lhs.gt(&rhs),
        })
    }

    /// A literal is itself; an identifier reads that column's entry for
    /// the current row.
    fn resolve_atom(&self, meta: &TableMeta, row_id: u64, atom: &Atom) -> Result<Value, DbError> {
        match atom {
            Atom::Lit(value) => Ok(value.clone()),
            Atom::Ident(column) => {
                let raw = self.read_cell(&meta.name, row_id, column)?;
                codec::decode_value(&raw)
            }
        }
    }

    /// There is no NULL: a missing cell is a fault, not a sparse row.
    fn read_cell(&self, table: &str, row_id: u64, column: &str) -> Result<Vec<u8>, DbError> {
        match self.store.get(&catalog::cell_key(table, row_id, column)) {
            Ok(Some(raw)) => Ok(raw),
            Ok(None) => Err(DbError::Internal(format!(
                "missing entry for row {} column `{}` of table `{}`",
                row_id, column, table
            ))),
            Err(e) => Err(DbError::Internal(e.to_string())),
        }
    }

    /// Diagnostic only: prints every entry under the `/tables` prefix.
    /// Not part of the query surface, no stability contract.
    pub fn dump(&self) -> Result<(), DbError> {
        for entry in self.store.scan(b"/tables") {
            let (key, value) = entry.map_err(|e| DbError::Internal(e.to_string()))?;
            println!("{} = {:02x?}", String::from_utf8_lossy(&key), value);
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::storage::MemStore;
    use crate::value::DataType;

    fn db() -> Executor<MemStore> {
        let exec = Executor::new(MemStore::new());
        exec.run("CREATE TABLE users (age INT, name TEXT);").unwrap();
        exec
    }

    fn rows(result: QueryResult) -> Vec<Row> {
        match result {
            QueryResult::Rows(rows) => rows,
            other => panic!("expected rows, got {:?}", other),
        }
    }

    fn values(row: &Row) -> Vec<Value> {
        row.cells.iter().map(|(v, _)| v.clone()).collect()
    }

    #[test]
    fn test_select_on_fresh_table_is_empty() {
        let exec = db();
        assert_eq!(rows(exec.run("SELECT * FROM users;").unwrap()), vec![]);
    }

    #[test]
    fn test_insert_writes_cells_under_row_keys() {
        let exec = db();
        exec.run("INSERT INTO users (name, age) VALUES ('marco', 28);")
            .unwrap();
        // The explicit list is reordered against the schema; the key
        // layout only depends on column names.
        let raw = exec.store().get(b"/tables/users/1/age").unwrap().unwrap();
        assert_eq!(codec::decode_value(&raw).unwrap(), Value::Int(28));
        let raw = exec.store().get(b"/tables/users/1/name").unwrap().unwrap();
        assert_eq!(codec::decode_value(&raw).unwrap(), Value::Text("marco".into()));
    }

    #[test]
    fn test_insert_positional_follows_definition_order() {
        let exec = db();
        exec.run("INSERT INTO users VALUES (28, 'marco');").unwrap();
        let raw = exec.store().get(b"/tables/users/1/age").unwrap().unwrap();
        assert_eq!(codec::decode_value(&raw).unwrap(), Value::Int(28));
    }

    #[test]
    fn test_sequential_inserts_get_sequential_ids() {
        let exec = db();
        exec.run("INSERT INTO users VALUES (28, 'marco');").unwrap();
        exec.run("INSERT INTO users VALUES (30, 'anna');").unwrap();
        let meta = catalog::load_table(exec.store(), "users").unwrap();
        assert_eq!(meta.last_insert_id, 2);
        assert!(exec.store().get(b"/tables/users/2/name").unwrap().is_some());
    }

    #[test]
    fn test_select_where_eq_matches_one_row() {
        let exec = db();
        exec.run("INSERT INTO users VALUES (28, 'marco');").unwrap();
        exec.run("INSERT INTO users VALUES (30, 'anna');").unwrap();
        let rows = rows(exec.run("SELECT * FROM users WHERE age = 28;").unwrap());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, 1);
        assert_eq!(
            values(&rows[0]),
            vec![Value::Int(28), Value::Text("marco".into())]
        );
    }

    #[test]
    fn test_select_without_where_returns_all_in_id_order() {
        let exec = db();
        exec.run("INSERT INTO users VALUES (28, 'marco');").unwrap();
        exec.run("INSERT INTO users VALUES (30, 'anna');").unwrap();
        exec.run("INSERT INTO users VALUES (19, 'zoe');").unwrap();
        let rows = rows(exec.run("SELECT * FROM users;").unwrap());
        assert_eq!(rows.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn test_select_where_lt_gt() {
        let exec = db();
        exec.run("INSERT INTO users VALUES (28, 'marco');").unwrap();
        exec.run("INSERT INTO users VALUES (30, 'anna');").unwrap();
        let young = rows(exec.run("SELECT * FROM users WHERE age < 30;").unwrap());
        assert_eq!(young.len(), 1);
        assert_eq!(young[0].id, 1);
        let after_b = rows(
            exec.run("SELECT * FROM users WHERE name > 'b';").unwrap(),
        );
        assert_eq!(after_b.len(), 1);
        assert_eq!(values(&after_b[0])[1], Value::Text("marco".into()));
    }

    #[test]
    fn test_where_mixed_types_never_match() {
        let exec = db();
        exec.run("INSERT INTO users VALUES (28, 'marco');").unwrap();
        for sql in [
            "SELECT * FROM users WHERE age = 'marco';",
            "SELECT * FROM users WHERE age < 'marco';",
            "SELECT * FROM users WHERE name > 28;",
        ] {
            assert_eq!(rows(exec.run(sql).unwrap()), vec![], "{}", sql);
        }
    }

    #[test]
    fn test_select_projection_reorders() {
        let exec = db();
        exec.run("INSERT INTO users VALUES (28, 'marco');").unwrap();
        let rows = rows(exec.run("SELECT name, age FROM users;").unwrap());
        assert_eq!(
            values(&rows[0]),
            vec![Value::Text("marco".into()), Value::Int(28)]
        );
    }

    #[test]
    fn test_select_partial_projection_rejected() {
        // Column resolution demands a full-length list for SELECT too;
        // a projection may reorder but not subset.
        let exec = db();
        assert!(matches!(
            exec.run("SELECT age FROM users;"),
            Err(DbError::WrongNumberOfColumns {
                expected: 2,
                found: 1
            })
        ));
    }

    #[test]
    fn test_insert_wrong_column_count() {
        let exec = db();
        assert!(matches!(
            exec.run("INSERT INTO users (age) VALUES (28);"),
            Err(DbError::WrongNumberOfColumns {
                expected: 2,
                found: 1
            })
        ));
        assert!(matches!(
            exec.run("INSERT INTO users VALUES (28);"),
            Err(DbError::WrongNumberOfColumns {
                expected: 2,
                found: 1
            })
        ));
    }

    #[test]
    fn test_insert_unknown_column() {
        let exec = db();
        assert!(matches!(
            exec.run("INSERT INTO users (age, height) VALUES (28, 170);"),
            Err(DbError::ColumnNotFound(name)) if name == "height"
        ));
    }

    #[test]
    fn test_insert_bad_type() {
        let exec = db();
        assert!(matches!(
            exec.run("INSERT INTO users VALUES ('marco', 28);"),
            Err(DbError::BadType {
                expected: DataType::Int,
                found: DataType::Text,
                ..
            })
        ));
    }

    #[test]
    fn test_insert_into_missing_table() {
        let exec = Executor::new(MemStore::new());
        assert!(matches!(
            exec.run("INSERT INTO ghosts VALUES (1);"),
            Err(DbError::TableNotFound(name)) if name == "ghosts"
        ));
    }

    #[test]
    fn test_failed_insert_still_advances_id_counter() {
        // The counter is persisted before type checking; the gap is by
        // contract, not accident.
        let exec = db();
        let _ = exec.run("INSERT INTO users VALUES ('marco', 28);");
        let meta = catalog::load_table(exec.store(), "users").unwrap();
        assert_eq!(meta.last_insert_id, 1);
        // The orphaned id now fails row assembly.
        assert!(matches!(
            exec.run("SELECT * FROM users;"),
            Err(DbError::Internal(_))
        ));
    }

    #[test]
    fn test_create_overwrites_and_resets_counter() {
        let exec = db();
        exec.run("INSERT INTO users VALUES (28, 'marco');").unwrap();
        exec.run("CREATE TABLE users (age INT, name TEXT);").unwrap();
        let meta = catalog::load_table(exec.store(), "users").unwrap();
        assert_eq!(meta.last_insert_id, 0);
        assert_eq!(rows(exec.run("SELECT * FROM users;").unwrap()), vec![]);
    }

    #[test]
    fn test_where_on_unknown_column_is_a_read_fault() {
        let exec = db();
        exec.run("INSERT INTO users VALUES (28, 'marco');").unwrap();
        assert!(matches!(
            exec.run("SELECT * FROM users WHERE height = 170;"),
            Err(DbError::Internal(_))
        ));
    }

    #[test]
    fn test_row_carries_raw_encoded_bytes() {
        let exec = db();
        exec.run("INSERT INTO users VALUES (28, 'marco');").unwrap();
        let rows = rows(exec.run("SELECT * FROM users WHERE age = 28;").unwrap());
        let (value, raw) = &rows[0].cells[0];
        assert_eq!(value, &Value::Int(28));
        assert_eq!(raw, &codec::encode_value(value));
    }
}
