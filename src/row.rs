use crate::value::Value;

/// One row image: column names and values in the order they were appended.
///
/// Duplicate names are kept as separate entries. Nothing is ever reordered,
/// so the serialized object lists members exactly as the caller appended them.
///
/// Encode rows only through [`crate::serializer`] or a streaming writer such as
/// `serde_json::to_vec`. `serde_json::to_value` collects members into a
/// key-sorted map and loses the column order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    names: Vec<String>,
    values: Vec<Value>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            names: Vec::with_capacity(capacity),
            values: Vec::with_capacity(capacity),
        }
    }

    /// Appends one column at the end of the row.
    pub fn append(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.names.push(column.into());
        self.values.push(value.into());
    }

    /// Chaining form of [`Row::append`].
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.append(column, value);
        self
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterates `(name, value)` pairs in append order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.names.iter().map(String::as_str).zip(self.values.iter())
    }

    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = Row::new();
        for (name, value) in iter {
            row.append(name, value);
        }
        row
    }
}
