use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One row of a table: flat column name to scalar or nested value.
///
/// Missing columns are not stored; reading one yields null.
pub type Row = Map<String, Value>;

static NULL: Value = Value::Null;

/// An ordered sequence of rows with an explicit column order.
///
/// Columns are the first-seen union across rows. This is the universal
/// in-memory representation the flattener consumes and produces; every
/// pipeline stage hands one of these to the next.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    pub fn new() -> Self {
        Table::default()
    }

    pub fn from_rows(rows: Vec<Row>) -> Self {
        let mut table = Table::new();
        for row in rows {
            table.push_row(row);
        }
        table
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Column names in order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Read one cell; a missing cell reads as null.
    pub fn value(&self, row: usize, column: &str) -> &Value {
        self.rows[row].get(column).unwrap_or(&NULL)
    }

    /// Values of one column across all rows, nulls included.
    pub fn column_values<'a>(&'a self, column: &'a str) -> impl Iterator<Item = &'a Value> {
        self.rows.iter().map(move |row| row.get(column).unwrap_or(&NULL))
    }

    /// Register a column at the end of the order without storing any values.
    pub fn ensure_column(&mut self, name: &str) {
        if !self.has_column(name) {
            self.columns.push(name.to_string());
        }
    }

    /// Append a row, registering unseen columns in the row's key order.
    /// Null cells are dropped; they read back as null either way.
    pub fn push_row(&mut self, row: Row) {
        let mut stored = Row::new();
        for (key, value) in row {
            self.ensure_column(&key);
            if !value.is_null() {
                stored.insert(key, value);
            }
        }
        self.rows.push(stored);
    }

    /// Row-wise concatenation. Columns become the union; the other table's
    /// new columns are registered after this table's.
    pub fn append(&mut self, other: Table) {
        for column in &other.columns {
            self.ensure_column(column);
        }
        self.rows.extend(other.rows);
    }

    /// Insert a column at position 0 holding the same value in every row.
    /// Used to stamp the grouping key onto a partial table.
    pub fn insert_key_column(&mut self, name: &str, value: &Value) {
        self.columns.retain(|c| c != name);
        self.columns.insert(0, name.to_string());
        for row in &mut self.rows {
            row.insert(name.to_string(), value.clone());
        }
    }

    /// Prefix every column name.
    pub fn add_prefix(&mut self, prefix: &str) {
        self.columns = self
            .columns
            .iter()
            .map(|c| format!("{prefix}{c}"))
            .collect();
        for row in &mut self.rows {
            let renamed = std::mem::take(row)
                .into_iter()
                .map(|(k, v)| (format!("{prefix}{k}"), v))
                .collect();
            *row = renamed;
        }
    }

    /// Rename a column. A missing source column is a no-op.
    pub fn rename_column(&mut self, from: &str, to: &str) {
        let Some(position) = self.columns.iter().position(|c| c == from) else {
            return;
        };
        self.columns[position] = to.to_string();
        for row in &mut self.rows {
            if let Some(value) = row.remove(from) {
                row.insert(to.to_string(), value);
            }
        }
    }

    /// Drop columns by name, ignoring ones that do not exist.
    pub fn drop_columns(&mut self, names: &[&str]) {
        self.columns.retain(|c| !names.contains(&c.as_str()));
        for row in &mut self.rows {
            for name in names {
                row.remove(*name);
            }
        }
    }

    /// Rewrite one column cell-by-cell, stopping at the first failure.
    /// Missing cells are presented to the closure as null.
    pub fn try_map_column<E>(
        &mut self,
        column: &str,
        f: impl Fn(&Value) -> Result<Value, E>,
    ) -> Result<(), E> {
        for row in &mut self.rows {
            let current = row.get(column).unwrap_or(&NULL);
            let replacement = f(current)?;
            if replacement.is_null() {
                row.remove(column);
            } else {
                row.insert(column.to_string(), replacement);
            }
        }
        Ok(())
    }

    /// Collapse every representation of "nothing here" to the missing
    /// sentinel: null, empty string, "None"/"none" markers, empty lists.
    /// Run before any grouping or joining so branch checks are a single
    /// null test.
    pub fn normalize_missing(&mut self) {
        for row in &mut self.rows {
            row.retain(|_, value| !is_missing(value));
        }
    }

    /// True when every row holds a non-missing value for the column.
    /// False for an unregistered column or an empty table.
    pub fn column_all_present(&self, column: &str) -> bool {
        if self.rows.is_empty() || !self.has_column(column) {
            return false;
        }
        self.rows
            .iter()
            .all(|row| row.get(column).is_some_and(|v| !is_missing(v)))
    }

    /// One output row per list element of the column, duplicating all other
    /// columns. A null or empty value yields a single row carrying null;
    /// a non-list value passes through unchanged.
    pub fn explode(&self, column: &str) -> Table {
        let mut out = self.clone_empty();
        for row in &self.rows {
            match row.get(column) {
                Some(Value::Array(items)) if !items.is_empty() => {
                    for item in items {
                        let mut exploded = row.clone();
                        exploded.insert(column.to_string(), item.clone());
                        out.push_row(exploded);
                    }
                }
                Some(Value::Array(_)) | None => {
                    let mut exploded = row.clone();
                    exploded.remove(column);
                    out.push_row(exploded);
                }
                Some(_) => out.push_row(row.clone()),
            }
        }
        out
    }

    /// Partition rows by the value of a key column, in first-appearance
    /// order. Rows with a missing key cannot be attributed to a parent and
    /// are skipped.
    pub fn group_by(&self, key: &str) -> Vec<(Value, Table)> {
        let mut groups: Vec<(Value, Table)> = Vec::new();
        for row in &self.rows {
            let Some(key_value) = row.get(key).filter(|v| !is_missing(v)) else {
                continue;
            };
            let index = match groups.iter().position(|(k, _)| k == key_value) {
                Some(index) => index,
                None => {
                    groups.push((key_value.clone(), self.clone_empty()));
                    groups.len() - 1
                }
            };
            groups[index].1.push_row(row.clone());
        }
        groups
    }

    /// Left outer join on explicit key columns. Every row of `self`
    /// survives; rows with no match carry null for the right table's
    /// columns, rows with several matches are duplicated per match.
    /// Null keys never match.
    pub fn left_join(&self, right: &Table, on: &[&str]) -> Table {
        let mut out = self.clone_empty();
        for column in &right.columns {
            if !on.contains(&column.as_str()) {
                out.ensure_column(column);
            }
        }
        for row in &self.rows {
            let matches: Vec<&Row> = right
                .rows
                .iter()
                .filter(|candidate| keys_match(row, candidate, on))
                .collect();
            if matches.is_empty() {
                out.push_row(row.clone());
                continue;
            }
            for matched in matches {
                let mut merged = row.clone();
                for (key, value) in matched {
                    if !on.contains(&key.as_str()) {
                        merged.insert(key.clone(), value.clone());
                    }
                }
                out.push_row(merged);
            }
        }
        out
    }

    /// Column names present in both tables, in this table's column order.
    pub fn shared_columns(&self, other: &Table) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| other.has_column(c.as_str()))
            .cloned()
            .collect()
    }

    fn clone_empty(&self) -> Table {
        Table {
            columns: self.columns.clone(),
            rows: Vec::new(),
        }
    }
}

fn keys_match(left: &Row, right: &Row, on: &[&str]) -> bool {
    on.iter().all(|key| match (left.get(*key), right.get(*key)) {
        (Some(a), Some(b)) => !is_missing(a) && a == b,
        _ => false,
    })
}

/// The representational variants of "no value" that must collapse to the
/// single missing sentinel before grouping or joining.
pub fn is_missing(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        Value::String(s) => s.is_empty() || s == "None" || s == "none",
        _ => false,
    }
}
