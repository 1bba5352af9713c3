//! # Tables over an in-memory entity collection
//!
//! A [`Database`] owns a collection of host entities and a set of named
//! [`Table`]s over them. The base table, [`BASE_TABLE`], holds one record per
//! entity. Further tables are derived from an existing one with
//! [`Database::add_table`] and only ever narrow it.
//!
//! Where-clauses never look inside entities directly. Each table carries a
//! map of getters, registered with [`Table::define`], and `n.field` in a
//! query resolves to the getter named `field`.
//!
//! ## Example
//!
//! ```
//! use ql_lang::{Database, Value, BASE_TABLE};
//!
//! let numbers: Vec<String> = (0..50).map(|i| i.to_string()).collect();
//! let mut db = Database::new(numbers);
//! db.base_table_mut()
//!     .define("num", |s: &String| Value::Int(s.parse().unwrap_or(0)));
//!
//! db.add_table(BASE_TABLE, "EvenNumber", &[], |s: &String| {
//!     let n: i64 = s.parse().unwrap_or(0);
//!     (n % 2 == 0).then(Vec::new)
//! })
//! .unwrap();
//!
//! let hits = db.query("select EvenNumber n where n.num > 40").unwrap();
//! assert_eq!(hits, ["42", "44", "46", "48"]);
//! ```
mod pool;
mod record;
mod table;

pub use pool::StringPool;
pub use record::Record;
pub use table::{Getter, Table};

use std::collections::HashMap;

use thiserror::Error;
use tracing::{debug, info};

use crate::{
    ast::{Select, query::Statement},
    evaluator::{EvaluationFault, evaluate},
    parser::ExpressionError,
};

/// Name of the table created with every database.
pub const BASE_TABLE: &str = "Entity";

/// Errors returned by table derivation and queries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// The statement is not `select <table> <var> [where <expr>]`
    #[error("invalid query statement: {0}")]
    Syntax(String),

    #[error("table {0} not found")]
    TableNotFound(String),

    #[error("table {0} already exists")]
    TableExists(String),

    /// The where-clause failed to tokenize or parse
    #[error(transparent)]
    Expression(#[from] ExpressionError),

    /// The where-clause was well formed but could not be evaluated
    #[error("evaluation failed: {0}")]
    Evaluation(#[from] EvaluationFault),
}

/// Entity collection, string pool and the tables defined over them.
///
/// Tables are built and getters defined through `&mut self`; queries take
/// `&self`. A database that is done being built can be shared freely.
#[derive(Debug)]
pub struct Database<T> {
    entities: Vec<T>,
    strings: StringPool,
    tables: Vec<Table<T>>,
    table_index: HashMap<String, usize>,
}

impl<T> Database<T> {
    /// Builds the base table with one record per entity, in order.
    pub fn new(entities: impl IntoIterator<Item = T>) -> Self {
        let entities: Vec<T> = entities.into_iter().collect();

        let mut base = Table::new(BASE_TABLE, Vec::new());
        for id in 0..entities.len() {
            base.push_record(Record::new(id, Vec::new()));
        }

        let mut table_index = HashMap::new();
        table_index.insert(BASE_TABLE.to_string(), 0);

        Database {
            entities,
            strings: StringPool::new(),
            tables: vec![base],
            table_index,
        }
    }

    pub fn entities(&self) -> &[T] {
        &self.entities
    }

    /// Entity behind a record identity.
    pub fn entity(&self, id: usize) -> Option<&T> {
        self.entities.get(id)
    }

    pub fn intern(&mut self, s: &str) -> usize {
        self.strings.intern(s)
    }

    pub fn string(&self, idx: usize) -> Option<&str> {
        self.strings.get(idx)
    }

    pub fn strings(&self) -> &StringPool {
        &self.strings
    }

    /// Inline attribute values of a record, resolved through the pool.
    pub fn record_values(&self, record: &Record) -> Vec<&str> {
        record
            .values()
            .iter()
            .filter_map(|&idx| self.strings.get(idx))
            .collect()
    }

    pub fn get_table(&self, name: &str) -> Option<&Table<T>> {
        self.table_index.get(name).map(|&idx| &self.tables[idx])
    }

    pub fn get_table_mut(&mut self, name: &str) -> Option<&mut Table<T>> {
        self.table_index.get(name).map(|&idx| &mut self.tables[idx])
    }

    pub fn base_table(&self) -> &Table<T> {
        &self.tables[0]
    }

    pub fn base_table_mut(&mut self) -> &mut Table<T> {
        &mut self.tables[0]
    }

    /// All tables in creation order, base table first.
    pub fn tables(&self) -> &[Table<T>] {
        &self.tables
    }

    /// Derives table `name` from table `base`.
    ///
    /// `map` is called once per base record, in order. `None` leaves the
    /// entity out; `Some(values)` keeps it and stores `values` as the new
    /// record's inline attributes. The new table starts with a copy of the
    /// base table's getters.
    pub fn add_table<F>(
        &mut self,
        base: &str,
        name: &str,
        fields: &[&str],
        mut map: F,
    ) -> Result<&mut Table<T>, QueryError>
    where
        F: FnMut(&T) -> Option<Vec<String>>,
    {
        let base_idx = *self
            .table_index
            .get(base)
            .ok_or_else(|| QueryError::TableNotFound(base.to_string()))?;
        if self.table_index.contains_key(name) {
            return Err(QueryError::TableExists(name.to_string()));
        }

        let base_table = &self.tables[base_idx];
        let fields = fields.iter().map(|f| f.to_string()).collect();
        let mut table = base_table.derive(name, fields);

        for record in base_table.records() {
            let entity = &self.entities[record.id()];
            if let Some(values) = map(entity) {
                let values = values.iter().map(|v| self.strings.intern(v)).collect();
                table.push_record(Record::new(record.id(), values));
            }
        }

        info!(
            base,
            table = name,
            records = table.len(),
            base_records = base_table.len(),
            "derived table"
        );

        let idx = self.tables.len();
        self.tables.push(table);
        self.table_index.insert(name.to_string(), idx);
        Ok(&mut self.tables[idx])
    }

    /// Runs a `select` statement and returns the matching entities in table
    /// order.
    pub fn query(&self, query: &str) -> Result<Vec<&T>, QueryError> {
        let records = self.query_records(query)?;
        Ok(records
            .into_iter()
            .map(|record| &self.entities[record.id()])
            .collect())
    }

    /// Like [`query`](Self::query) but returns the matching records.
    pub fn query_records(&self, query: &str) -> Result<Vec<&Record>, QueryError> {
        // The table is resolved before the where-clause is parsed.
        let statement = Statement::split(query)?;
        if self.get_table(statement.table).is_none() {
            return Err(QueryError::TableNotFound(statement.table.to_string()));
        }
        let select = statement.into_select()?;
        debug!(
            table = %select.table,
            var = %select.var,
            filtered = select.filter.is_some(),
            "parsed select"
        );
        self.select(&select)
    }

    /// Evaluates an already parsed statement.
    pub fn select(&self, select: &Select) -> Result<Vec<&Record>, QueryError> {
        let table = self
            .get_table(&select.table)
            .ok_or_else(|| QueryError::TableNotFound(select.table.clone()))?;

        let rows = evaluate(table, &self.entities, &select.var, select.filter.as_ref())?;
        info!(table = %select.table, rows = rows.len(), of = table.len(), "query finished");
        Ok(rows)
    }
}
