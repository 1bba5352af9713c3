use std::{collections::HashMap, fmt, sync::Arc};

use crate::{database::Record, value::Value};

/// Capability that exposes one named attribute of an entity to where-clauses.
pub type Getter<T> = Arc<dyn Fn(&T) -> Value + Send + Sync>;

/// A named, ordered set of records with its own attribute getters.
pub struct Table<T> {
    name: String,
    fields: Vec<String>,
    records: Vec<Record>,
    record_index: HashMap<usize, usize>,
    getters: HashMap<String, Getter<T>>,
}

impl<T> Table<T> {
    pub(crate) fn new(name: impl Into<String>, fields: Vec<String>) -> Self {
        Table {
            name: name.into(),
            fields,
            records: Vec::new(),
            record_index: HashMap::new(),
            getters: HashMap::new(),
        }
    }

    /// Empty table that starts with a snapshot of this table's getters.
    ///
    /// The map is copied, so getters defined on `self` afterwards are not
    /// seen by the derived table.
    pub(crate) fn derive(&self, name: impl Into<String>, fields: Vec<String>) -> Self {
        let mut table = Table::new(name, fields);
        table.getters = self.getters.clone();
        table
    }

    pub(crate) fn push_record(&mut self, record: Record) {
        self.record_index.insert(record.id(), self.records.len());
        self.records.push(record);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Names of the inline attribute values, in record value order.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Position of `field` within each record's inline values.
    pub fn field_index(&self, field: &str) -> Option<usize> {
        self.fields.iter().position(|f| f == field)
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Record for an entity identity, if the entity is in this table.
    pub fn record(&self, id: usize) -> Option<&Record> {
        self.record_index.get(&id).map(|&pos| &self.records[pos])
    }

    pub fn contains(&self, id: usize) -> bool {
        self.record_index.contains_key(&id)
    }

    /// Installs or replaces the getter for `name`. Records are untouched.
    ///
    /// # Examples
    ///
    /// ```
    /// use ql_lang::{Database, Value};
    ///
    /// let mut db = Database::new(vec!["7".to_string(), "8".to_string()]);
    /// db.base_table_mut()
    ///     .define("num", |s: &String| Value::Int(s.parse().unwrap_or(0)));
    ///
    /// let hits = db.query("select Entity n where n.num == 8").unwrap();
    /// assert_eq!(hits, [&"8".to_string()]);
    /// ```
    pub fn define<F>(&mut self, name: impl Into<String>, getter: F) -> &mut Self
    where
        F: Fn(&T) -> Value + Send + Sync + 'static,
    {
        self.getters.insert(name.into(), Arc::new(getter));
        self
    }

    pub fn getter(&self, name: &str) -> Option<&Getter<T>> {
        self.getters.get(name)
    }

    /// Names of all defined getters, sorted.
    pub fn getter_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.getters.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl<T> fmt::Debug for Table<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Table")
            .field("name", &self.name)
            .field("fields", &self.fields)
            .field("records", &self.records.len())
            .field("getters", &self.getter_names())
            .finish()
    }
}
