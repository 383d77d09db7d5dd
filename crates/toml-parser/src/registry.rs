use std::collections::HashSet;

use indexmap::IndexMap;

/// The ledger [`Parser`](crate::parser::Parser) and
/// [`Builder`](https://docs.rs/toml-builder) both consult to enforce TOML's
/// global key-uniqueness, hierarchy, and array-of-tables rules (§4.3).
///
/// A registry is a plain value type, constructed fresh by whichever
/// consumer owns one for the lifetime of a single parse or build call; it is
/// never shared globally.
#[derive(Debug, Default, Clone)]
pub struct KeyRegistry {
    keys: HashSet<String>,
    tables: HashSet<String>,
    arrays_of_tables: IndexMap<String, usize>,
    implicit_from_array_table: HashSet<String>,
    current_table: String,
    current_array_of_table: String,
}

/// Why a registry operation was rejected. Callers translate this into their
/// own typed error (parse-side `ErrorKind`, build-side `ErrorKind`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryError {
    /// The composed path is already in `keys`.
    DuplicateKey,
    /// A `[table]` header tried to redeclare a path already defined as a table.
    DuplicateTable,
    /// A `[table]` header tried to redeclare a path already owned by `[[array]]`.
    TableRedeclaresArrayOfTable,
    /// A `[[array]]` header collides with a plain key or table of the same path.
    InvalidArrayTable,
    /// A `[[array]]` header's path was already implicitly claimed as a parent
    /// of another array of tables.
    ArrayTableImplicitlyClaimed,
}

impl KeyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The composition rule shared by every operation: join the enclosing
    /// array-of-tables element (with its numeric index suffix), the
    /// enclosing table, and `name`, dropping empty segments.
    fn composed(&self, name: &str) -> String {
        let mut array_part = String::new();
        if !self.current_array_of_table.is_empty() {
            array_part.push_str(&self.current_array_of_table);
            if let Some(&index) = self.arrays_of_tables.get(&self.current_array_of_table) {
                array_part.push_str(&index.to_string());
            }
        }
        [array_part.as_str(), self.current_table.as_str(), name]
            .iter()
            .filter(|segment| !segment.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(".")
    }

    pub fn is_valid_key(&self, name: &str) -> bool {
        !self.keys.contains(&self.composed(name))
    }

    pub fn add_key(&mut self, name: &str) -> Result<(), RegistryError> {
        let path = self.composed(name);
        if self.keys.contains(&path) {
            return Err(RegistryError::DuplicateKey);
        }
        self.keys.insert(path);
        Ok(())
    }

    pub fn is_valid_inline_table(&self, name: &str) -> bool {
        self.is_valid_key(name)
    }

    pub fn add_inline_table_key(&mut self, name: &str) -> Result<(), RegistryError> {
        self.add_key(name)
    }

    /// First strict-or-self ancestor (longest prefix first) of a dotted path
    /// that is a registered array of tables, or `""` if none.
    fn nearest_array_of_table_ancestor(&self, name: &str) -> String {
        let segments: Vec<&str> = name.split('.').collect();
        for end in (1..=segments.len()).rev() {
            let candidate = segments[..end].join(".");
            if self.arrays_of_tables.contains_key(&candidate) {
                return candidate;
            }
        }
        String::new()
    }

    pub fn is_valid_table_key(&self, name: &str) -> bool {
        let ancestor = self.nearest_array_of_table_ancestor(name);
        if ancestor == name {
            return false;
        }
        // `composed` only reads `current_table`/`current_array_of_table`, so
        // a scratch clone with the protocol's context substituted answers
        // the query without mutating `self`.
        let mut probe = self.clone();
        probe.current_table.clear();
        probe.current_array_of_table = ancestor;
        probe.is_valid_key(name)
    }

    /// Table-key protocol for `[name]` (§4.3).
    pub fn add_table_key(&mut self, name: &str) -> Result<(), RegistryError> {
        let ancestor = self.nearest_array_of_table_ancestor(name);
        if ancestor == name {
            return Err(RegistryError::TableRedeclaresArrayOfTable);
        }
        self.current_table.clear();
        self.current_array_of_table = ancestor;
        if !self.is_valid_key(name) {
            return Err(RegistryError::DuplicateTable);
        }
        self.add_key(name).expect("is_valid_key just confirmed this succeeds");
        self.current_table = name.to_string();
        self.tables.insert(name.to_string());
        Ok(())
    }

    pub fn is_valid_array_table_key(&self, name: &str) -> bool {
        let in_arrays = self.arrays_of_tables.contains_key(name);
        let in_keys = self.keys.contains(name);
        in_arrays == in_keys
    }

    pub fn is_table_implicit_from_array_table(&self, name: &str) -> bool {
        self.implicit_from_array_table.contains(name) && !self.arrays_of_tables.contains_key(name)
    }

    /// Array-of-tables protocol for `[[name]]` (§4.3).
    pub fn add_array_table_key(&mut self, name: &str) -> Result<(), RegistryError> {
        if !self.is_valid_array_table_key(name) {
            return Err(RegistryError::InvalidArrayTable);
        }
        self.current_table.clear();
        self.current_array_of_table.clear();
        if self.arrays_of_tables.contains_key(name) {
            *self.arrays_of_tables.get_mut(name).expect("checked above") += 1;
        } else {
            self.add_key(name).expect("is_valid_array_table_key confirmed `keys` has no collision");
            self.arrays_of_tables.insert(name.to_string(), 0);
        }
        self.current_array_of_table = name.to_string();

        let segments: Vec<&str> = name.split('.').collect();
        for end in 1..segments.len() {
            self.implicit_from_array_table
                .insert(segments[..end].join("."));
        }
        Ok(())
    }

    /// Enter the scope of an inline table named `name` under the current
    /// context, folding the enclosing array-of-tables index into the saved
    /// prefix so it isn't re-applied twice once inside. Returns the state to
    /// hand back to [`pop_inline_scope`](Self::pop_inline_scope).
    pub fn push_inline_scope(&mut self, name: &str) -> (String, String) {
        let folded = self.composed(name);
        let saved_table = std::mem::replace(&mut self.current_table, folded);
        let saved_array = std::mem::take(&mut self.current_array_of_table);
        (saved_table, saved_array)
    }

    pub fn pop_inline_scope(&mut self, saved: (String, String)) {
        self.current_table = saved.0;
        self.current_array_of_table = saved.1;
    }

    pub fn is_registered_as_table_key(&self, name: &str) -> bool {
        self.tables.contains(name)
    }

    pub fn is_registered_as_array_table_key(&self, name: &str) -> bool {
        self.arrays_of_tables.contains_key(name)
    }

    pub fn current_table(&self) -> &str {
        &self.current_table
    }

    pub fn current_array_of_table(&self) -> &str {
        &self.current_array_of_table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_keys_are_unique() {
        let mut reg = KeyRegistry::new();
        reg.add_key("a").unwrap();
        assert!(!reg.is_valid_key("a"));
        assert_eq!(reg.add_key("a"), Err(RegistryError::DuplicateKey));
    }

    #[test]
    fn redefining_a_table_is_forbidden() {
        let mut reg = KeyRegistry::new();
        reg.add_table_key("a").unwrap();
        assert_eq!(reg.add_table_key("a"), Err(RegistryError::DuplicateTable));
    }

    #[test]
    fn redeclaring_an_array_of_tables_appends_an_element() {
        let mut reg = KeyRegistry::new();
        reg.add_array_table_key("products").unwrap();
        assert_eq!(reg.arrays_of_tables.get("products"), Some(&0));
        reg.add_array_table_key("products").unwrap();
        assert_eq!(reg.arrays_of_tables.get("products"), Some(&1));
    }

    #[test]
    fn table_cannot_redeclare_array_of_tables() {
        let mut reg = KeyRegistry::new();
        reg.add_array_table_key("arr").unwrap();
        assert!(!reg.is_valid_table_key("arr"));
        assert_eq!(
            reg.add_table_key("arr"),
            Err(RegistryError::TableRedeclaresArrayOfTable)
        );
    }

    #[test]
    fn implicit_parent_of_array_of_tables_can_be_declared_as_table() {
        let mut reg = KeyRegistry::new();
        reg.add_array_table_key("a.b.c").unwrap();
        assert!(reg.is_table_implicit_from_array_table("a"));
        assert!(reg.is_table_implicit_from_array_table("a.b"));
        assert!(reg.is_valid_table_key("a"));
        reg.add_table_key("a").unwrap();
    }

    #[test]
    fn implicit_parent_of_array_of_tables_cannot_become_array_of_tables() {
        let mut reg = KeyRegistry::new();
        reg.add_array_table_key("albums.songs").unwrap();
        assert!(reg.is_table_implicit_from_array_table("albums"));
        assert!(reg.is_valid_array_table_key("albums"));
    }

    #[test]
    fn inline_table_scope_does_not_collide_with_sibling_keys() {
        let mut reg = KeyRegistry::new();
        reg.add_key("x").unwrap();
        reg.add_inline_table_key("point").unwrap();
        let scope = reg.push_inline_scope("point");
        // "x" inside the inline table is a distinct path from the outer "x".
        reg.add_key("x").unwrap();
        reg.pop_inline_scope(scope);
        assert!(!reg.is_valid_key("x"));
    }

    #[test]
    fn nested_keys_inside_array_element_are_scoped_by_index() {
        let mut reg = KeyRegistry::new();
        reg.add_array_table_key("products").unwrap();
        reg.add_key("name").unwrap();
        reg.add_array_table_key("products").unwrap();
        // Same bare key name, different element index: no collision.
        reg.add_key("name").unwrap();
    }
}
