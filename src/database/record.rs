/// One row of a table.
///
/// A record only knows the identity of its entity (its index in the
/// database's entity collection) and the pool indices of any attribute
/// strings produced when its table was derived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    id: usize,
    values: Vec<usize>,
}

impl Record {
    pub(crate) fn new(id: usize, values: Vec<usize>) -> Self {
        Record { id, values }
    }

    /// Entity identity, stable for the lifetime of the table.
    pub fn id(&self) -> usize {
        self.id
    }

    /// String-pool indices of the inline attribute values.
    pub fn values(&self) -> &[usize] {
        &self.values
    }
}
