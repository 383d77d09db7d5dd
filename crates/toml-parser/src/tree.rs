use std::collections::HashSet;

use crate::value::{Table, Value};

/// The placeholder a literal `.` inside a quoted key is swapped for while a
/// dotted path is being assembled, so later splitting the path on `.` never
/// mistakes it for a path separator (§4.4).
const DOT_PLACEHOLDER: char = '\u{1}';

pub fn escape_key(name: &str) -> String {
    name.replace('.', &DOT_PLACEHOLDER.to_string())
}

pub fn unescape_key(name: &str) -> String {
    name.replace(DOT_PLACEHOLDER, ".")
}

#[derive(Debug, Clone)]
enum Step {
    /// Descend into this key, creating an empty table if absent.
    Table(String),
    /// Descend into this key's array of tables, then into its last element.
    ArrayTable(String),
}

/// A nested-map builder with a movable insertion cursor (§4.4).
///
/// The cursor is represented as a path of [`Step`]s from the root rather
/// than a literal mutable reference into the tree, which sidesteps
/// self-referential borrows entirely: every operation re-walks `root` from
/// the top following the recorded path. Tree depth in a TOML document is
/// small, so the re-walk is cheap.
#[derive(Debug, Default)]
pub struct DocumentTree {
    root: Table,
    cursor: Vec<Step>,
    saved: Vec<Vec<Step>>,
    /// Raw (escaped) dotted paths known to name an array of tables, used to
    /// decide when a traversal segment must drop into "the last element"
    /// rather than a plain sub-table.
    array_table_paths: HashSet<String>,
}

fn resolve_mut<'a>(root: &'a mut Table, steps: &[Step]) -> &'a mut Table {
    let mut current = root;
    for step in steps {
        current = match step {
            Step::Table(key) => current
                .entry(key.clone())
                .or_insert_with(|| Value::Table(Table::new()))
                .as_table_mut()
                .expect("cursor segment does not resolve to a table"),
            Step::ArrayTable(key) => {
                let array = current
                    .entry(key.clone())
                    .or_insert_with(|| Value::Array(Vec::new()))
                    .as_array_mut()
                    .expect("cursor segment does not resolve to an array");
                array
                    .last_mut()
                    .expect("array of tables has no elements yet")
                    .as_table_mut()
                    .expect("array of tables element is not a table")
            }
        };
    }
    current
}

impl DocumentTree {
    pub fn new() -> Self {
        Self::default()
    }

    fn build_steps(&self, segments: &[&str], last_descends_into_array: bool) -> Vec<Step> {
        let mut steps = Vec::with_capacity(segments.len());
        let mut accumulated = String::new();
        let last_index = segments.len().saturating_sub(1);
        for (index, segment) in segments.iter().enumerate() {
            if index > 0 {
                accumulated.push('.');
            }
            accumulated.push_str(segment);
            let real_key = unescape_key(segment);
            let is_last = index == last_index;
            if self.array_table_paths.contains(&accumulated) && (!is_last || last_descends_into_array) {
                steps.push(Step::ArrayTable(real_key));
            } else {
                steps.push(Step::Table(real_key));
            }
        }
        steps
    }

    /// Write `name -> value` under the current cursor.
    pub fn put_value(&mut self, name: &str, value: Value) {
        let table = resolve_mut(&mut self.root, &self.cursor);
        table.insert(name.to_string(), value);
    }

    /// Reset the cursor to root and descend along `path`'s segments,
    /// creating tables as needed.
    pub fn enter_table(&mut self, path: &str) {
        let segments: Vec<&str> = path.split('.').collect();
        self.cursor = self.build_steps(&segments, false);
        // Force creation of every segment along the way, including the last.
        resolve_mut(&mut self.root, &self.cursor);
    }

    /// Push the cursor, descend into (creating if absent) the table at
    /// `name` under the current cursor.
    pub fn begin_inline_table(&mut self, name: &str) {
        self.saved.push(self.cursor.clone());
        let mut steps = self.cursor.clone();
        steps.push(Step::Table(unescape_key(name)));
        resolve_mut(&mut self.root, &steps);
        self.cursor = steps;
    }

    /// Pop the cursor back to where it was before the matching
    /// [`begin_inline_table`](Self::begin_inline_table).
    pub fn end_inline_table(&mut self) {
        self.cursor = self
            .saved
            .pop()
            .expect("end_inline_table called without a matching begin_inline_table");
    }

    /// Like [`enter_table`](Self::enter_table), but append a new empty table
    /// to the array named by the final segment and descend into it.
    pub fn append_array_element(&mut self, path: &str) {
        let segments: Vec<&str> = path.split('.').collect();
        let (prefix, last) = segments.split_at(segments.len() - 1);
        let prefix_steps = self.build_steps(prefix, false);
        let last_key = unescape_key(last[0]);
        {
            let table = resolve_mut(&mut self.root, &prefix_steps);
            let array = table
                .entry(last_key.clone())
                .or_insert_with(|| Value::Array(Vec::new()))
                .as_array_mut()
                .expect("append_array_element: existing value at this path is not an array");
            array.push(Value::Table(Table::new()));
        }
        let mut steps = prefix_steps;
        steps.push(Step::ArrayTable(last_key));
        self.cursor = steps;
        self.array_table_paths.insert(path.to_string());
    }

    pub fn into_root(self) -> Table {
        self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_value_writes_at_root_by_default() {
        let mut tree = DocumentTree::new();
        tree.put_value("a", Value::Integer(1));
        assert_eq!(tree.into_root().get("a"), Some(&Value::Integer(1)));
    }

    #[test]
    fn enter_table_creates_nested_tables() {
        let mut tree = DocumentTree::new();
        tree.enter_table("a.b.c");
        tree.put_value("answer", Value::Integer(42));
        tree.enter_table("a");
        tree.put_value("better", Value::Integer(43));
        let root = tree.into_root();
        assert_eq!(root["a"].as_table().unwrap()["better"], Value::Integer(43));
        let b = root["a"].as_table().unwrap()["b"].as_table().unwrap();
        let c = b["c"].as_table().unwrap();
        assert_eq!(c["answer"], Value::Integer(42));
    }

    #[test]
    fn append_array_element_descends_into_the_new_element() {
        let mut tree = DocumentTree::new();
        tree.append_array_element("products");
        tree.put_value("name", Value::String("Hammer".into()));
        tree.append_array_element("products");
        tree.put_value("name", Value::String("Nail".into()));
        let root = tree.into_root();
        let products = match &root["products"] {
            Value::Array(a) => a,
            _ => panic!("expected array"),
        };
        assert_eq!(products.len(), 2);
        assert_eq!(
            products[0].as_table().unwrap()["name"],
            Value::String("Hammer".into())
        );
        assert_eq!(
            products[1].as_table().unwrap()["name"],
            Value::String("Nail".into())
        );
    }

    #[test]
    fn inline_table_scope_restores_cursor() {
        let mut tree = DocumentTree::new();
        tree.put_value("a", Value::Integer(1));
        tree.begin_inline_table("point");
        tree.put_value("x", Value::Integer(1));
        tree.put_value("y", Value::Integer(2));
        tree.end_inline_table();
        tree.put_value("b", Value::Integer(2));
        let root = tree.into_root();
        assert_eq!(root["a"], Value::Integer(1));
        assert_eq!(root["b"], Value::Integer(2));
        let point = root["point"].as_table().unwrap();
        assert_eq!(point["x"], Value::Integer(1));
    }

    #[test]
    fn quoted_key_with_literal_dot_is_not_split() {
        let mut tree = DocumentTree::new();
        let header = format!("dog.{}", escape_key("tater.man"));
        tree.enter_table(&header);
        tree.put_value("type", Value::String("pug".into()));
        let root = tree.into_root();
        let dog = root["dog"].as_table().unwrap();
        assert_eq!(
            dog["tater.man"].as_table().unwrap()["type"],
            Value::String("pug".into())
        );
    }
}
