//! A fluent builder that emits TOML v0.4.0 text while enforcing the same
//! key-uniqueness and hierarchy rules `toml-parser` enforces on the way in
//! (§4.6, §6). Every mutator validates eagerly and returns `&mut Self` for
//! chaining, in the style of `apollo-compiler`'s `ast::parse::Parser`
//! (`recursion_limit`/`token_limit`).

mod error;

pub use error::{Error, ErrorKind};
pub use toml_parser::{Datetime, DatetimeKind, KeyRegistry, Table, Value, ValueKind};

/// Accumulates emitted TOML text, alongside the [`KeyRegistry`] that vets
/// every value, table, and array-of-tables declaration before it is
/// written.
#[derive(Debug)]
pub struct Builder {
    indent_prefix: String,
    output: String,
    line: usize,
    last_key: String,
    registry: KeyRegistry,
}

impl Builder {
    /// `indent` spaces are prepended to every `addValue` line; `0` disables
    /// indentation entirely. Table/array-of-tables headers and comments are
    /// never indented.
    pub fn new(indent: usize) -> Self {
        Self {
            indent_prefix: " ".repeat(indent),
            output: String::new(),
            line: 0,
            last_key: String::new(),
            registry: KeyRegistry::new(),
        }
    }

    /// The number of lines written so far, for diagnostics.
    pub fn line(&self) -> usize {
        self.line
    }

    /// The most recently written key, for diagnostics.
    pub fn last_key(&self) -> &str {
        &self.last_key
    }

    /// `key = value [ # comment ]`. `value` must be a string, integer,
    /// float, boolean, datetime, or array of those (`UNSUPPORTED_DATA_TYPE`
    /// otherwise); `name` must be non-empty after trimming (`EMPTY_KEY`) and
    /// fresh in the current scope (`DUPLICATE_KEY`).
    pub fn add_value(&mut self, name: &str, value: Value, comment: &str) -> Result<&mut Self, Error> {
        if name.trim().is_empty() {
            return Err(ErrorKind::EmptyKey);
        }
        if !self.registry.is_valid_key(name) {
            return Err(ErrorKind::DuplicateKey(name.to_string()));
        }
        let dumped = dump_value(name, &value)?;
        self.registry
            .add_key(name)
            .expect("is_valid_key just confirmed this succeeds");

        self.output.push_str(&self.indent_prefix);
        self.output.push_str(&emit_key(name));
        self.output.push_str(" = ");
        self.output.push_str(&dumped);
        if !comment.is_empty() {
            self.output.push_str(" # ");
            self.output.push_str(comment);
        }
        self.output.push('\n');
        self.line += 1;
        self.last_key = name.to_string();
        Ok(self)
    }

    /// `[path]`. Every dot-separated segment must be non-empty and need no
    /// quoting (`UNQUOTED_KEY_REQUIRED`); `path` must not already name a
    /// table (`DUPLICATE_TABLE_KEY`) or an array of tables
    /// (`TABLE_ALREADY_DEFINED_AS_ARRAY`).
    pub fn add_table(&mut self, path: &str) -> Result<&mut Self, Error> {
        validate_path_segments(path)?;
        if self.registry.is_registered_as_array_table_key(path) {
            return Err(ErrorKind::TableAlreadyDefinedAsArray(path.to_string()));
        }
        if !self.registry.is_valid_table_key(path) {
            return Err(ErrorKind::DuplicateTableKey(path.to_string()));
        }
        self.registry
            .add_table_key(path)
            .map_err(|_| ErrorKind::DuplicateTableKey(path.to_string()))?;

        self.emit_separator();
        self.output.push('[');
        self.output.push_str(path);
        self.output.push_str("]\n");
        self.line += 1;
        Ok(self)
    }

    /// `[[path]]`. Same segment validation as [`add_table`](Self::add_table);
    /// `path` must not already be a non-array-of-tables key
    /// (`DUPLICATE_ARRAY_TABLE_KEY`) and must not have been implicitly
    /// materialized as a table by an earlier, deeper array of tables
    /// (`KEY_DEFINED_AS_IMPLICIT_TABLE`).
    pub fn add_array_of_table(&mut self, path: &str) -> Result<&mut Self, Error> {
        validate_path_segments(path)?;
        if !self.registry.is_valid_array_table_key(path) {
            return Err(ErrorKind::DuplicateArrayTableKey(path.to_string()));
        }
        if self.registry.is_table_implicit_from_array_table(path) {
            return Err(ErrorKind::KeyDefinedAsImplicitTable(path.to_string()));
        }
        self.registry
            .add_array_table_key(path)
            .map_err(|_| ErrorKind::DuplicateArrayTableKey(path.to_string()))?;

        self.emit_separator();
        self.output.push_str("[[");
        self.output.push_str(path);
        self.output.push_str("]]\n");
        self.line += 1;
        Ok(self)
    }

    /// `# text`, unconditionally — comments carry no uniqueness rule.
    pub fn add_comment(&mut self, text: &str) -> &mut Self {
        self.output.push('#');
        if !text.is_empty() {
            self.output.push(' ');
            self.output.push_str(text);
        }
        self.output.push('\n');
        self.line += 1;
        self
    }

    /// Consume the builder and return everything written so far.
    pub fn build(self) -> String {
        self.output
    }

    fn emit_separator(&mut self) {
        if !self.output.is_empty() {
            self.output.push('\n');
            self.line += 1;
        }
    }
}

fn validate_path_segments(path: &str) -> Result<(), ErrorKind> {
    if path.trim().is_empty() {
        return Err(ErrorKind::EmptyKey);
    }
    for segment in path.split('.') {
        if segment.is_empty() || !is_unquoted_key(segment) {
            return Err(ErrorKind::UnquotedKeyRequired(segment.to_string(), path.to_string()));
        }
    }
    Ok(())
}

fn is_unquoted_key(segment: &str) -> bool {
    !segment.is_empty()
        && segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn emit_key(name: &str) -> String {
    if is_unquoted_key(name) {
        name.to_string()
    } else {
        format!("\"{}\"", name.replace('\\', "\\\\").replace('"', "\\\""))
    }
}

fn dump_value(name: &str, value: &Value) -> Result<String, ErrorKind> {
    match value {
        Value::String(s) => dump_string(name, s),
        Value::Integer(i) => Ok(i.to_string()),
        Value::Float(f) => Ok(dump_float(*f)),
        Value::Boolean(b) => Ok(b.to_string()),
        // The stored literal already satisfies its own DatetimeKind's
        // grammar, so re-emitting it verbatim round-trips exactly without
        // needing the date/time components this crate deliberately doesn't
        // decompose (see DESIGN.md).
        Value::Datetime(dt) => Ok(dt.literal.clone()),
        Value::Array(items) => dump_array(name, items),
        Value::Table(_) => Err(ErrorKind::UnsupportedDataType(name.to_string())),
    }
}

fn dump_float(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 {
        format!("{f:.1}")
    } else {
        f.to_string()
    }
}

/// Double-quoted unless `s` starts with a literal `@`, in which case exactly
/// one leading `@` is dropped and the rest is emitted single-quoted
/// (literal-string) verbatim.
fn dump_string(name: &str, s: &str) -> Result<String, ErrorKind> {
    if let Some(literal) = s.strip_prefix('@') {
        return Ok(format!("'{literal}'"));
    }
    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(chars.len() + 2);
    out.push('"');
    let mut index = 0;
    while index < chars.len() {
        let c = chars[index];
        if c == '\\' {
            // The reference implementation's `\b` quirk: this two-character
            // sequence is already the desired output, so it passes through
            // unchanged instead of getting its backslash escaped again.
            if chars.get(index + 1) == Some(&'b') {
                out.push_str("\\b");
                index += 2;
                continue;
            }
            if let Some(run) = unicode_escape_run(&chars, index) {
                index += run.chars().count();
                out.push_str(&run);
                continue;
            }
            out.push_str("\\\\");
            index += 1;
            continue;
        }
        match c {
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\u{0C}' => out.push_str("\\f"),
            '\r' => out.push_str("\\r"),
            '"' => out.push_str("\\\""),
            other if (other as u32) < 0x20 => {
                return Err(ErrorKind::InvalidStringCharacters(name.to_string()));
            }
            other => out.push(other),
        }
        index += 1;
    }
    out.push('"');
    Ok(out)
}

/// `\uXXXX` / `\UXXXXXXXX`, recognized and left untouched. Returns `None`
/// when `chars[start]` isn't the start of a well-formed run of this shape.
fn unicode_escape_run(chars: &[char], start: usize) -> Option<String> {
    let (marker, width) = match chars.get(start + 1)? {
        'u' => ('u', 4),
        'U' => ('U', 8),
        _ => return None,
    };
    let digits: String = chars.get(start + 2..start + 2 + width)?.iter().collect();
    if digits.len() == width && digits.chars().all(|c| c.is_ascii_hexdigit()) {
        Some(format!("\\{marker}{digits}"))
    } else {
        None
    }
}

fn dump_array(name: &str, items: &[Value]) -> Result<String, ErrorKind> {
    let mut leader: Option<ValueKind> = None;
    let mut rendered = Vec::with_capacity(items.len());
    for item in items {
        match leader {
            None => leader = Some(item.kind()),
            Some(kind) if kind == item.kind() => {}
            Some(kind) => {
                return Err(ErrorKind::MixedArrayTypes {
                    name: name.to_string(),
                    leader: kind.to_string(),
                    offending: item.kind().to_string(),
                });
            }
        }
        rendered.push(dump_value(name, item)?);
    }
    Ok(format!("[{}]", rendered.join(", ")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_value_emits_a_key_value_line() {
        let mut builder = Builder::new(0);
        builder.add_value("name", Value::String("Tom".into()), "").unwrap();
        assert_eq!(builder.build(), "name = \"Tom\"\n");
    }

    #[test]
    fn add_value_applies_configured_indent() {
        let mut builder = Builder::new(2);
        builder.add_value("a", Value::Integer(1), "").unwrap();
        assert_eq!(builder.build(), "  a = 1\n");
    }

    #[test]
    fn add_value_rejects_a_duplicate_key() {
        let mut builder = Builder::new(0);
        builder.add_value("a", Value::Integer(1), "").unwrap();
        let err = builder.add_value("a", Value::Integer(2), "").unwrap_err();
        assert_eq!(err, ErrorKind::DuplicateKey("a".to_string()));
    }

    #[test]
    fn add_table_emits_a_blank_separator_after_existing_content() {
        let mut builder = Builder::new(0);
        builder.add_value("a", Value::Integer(1), "").unwrap();
        builder.add_table("b").unwrap();
        assert_eq!(builder.build(), "a = 1\n\n[b]\n");
    }

    #[test]
    fn add_table_rejects_a_key_needing_quotes() {
        let mut builder = Builder::new(0);
        let err = builder.add_table("a.b c").unwrap_err();
        assert!(matches!(err, ErrorKind::UnquotedKeyRequired(..)));
    }

    #[test]
    fn add_array_of_table_appends_on_redeclaration() {
        let mut builder = Builder::new(0);
        builder.add_array_of_table("products").unwrap();
        builder.add_value("name", Value::String("Hammer".into()), "").unwrap();
        builder.add_array_of_table("products").unwrap();
        builder.add_value("name", Value::String("Nail".into()), "").unwrap();
        assert_eq!(
            builder.build(),
            "[[products]]\nname = \"Hammer\"\n\n[[products]]\nname = \"Nail\"\n"
        );
    }

    #[test]
    fn add_array_of_table_rejects_an_implicitly_claimed_path() {
        let mut builder = Builder::new(0);
        builder.add_array_of_table("albums.songs").unwrap();
        let err = builder.add_array_of_table("albums").unwrap_err();
        assert!(matches!(err, ErrorKind::KeyDefinedAsImplicitTable(_)));
    }

    #[test]
    fn add_table_rejects_redefining_a_table() {
        let mut builder = Builder::new(0);
        builder.add_table("a").unwrap();
        let err = builder.add_table("a").unwrap_err();
        assert_eq!(err, ErrorKind::DuplicateTableKey("a".to_string()));
    }

    #[test]
    fn mixed_array_types_are_rejected() {
        let mut builder = Builder::new(0);
        let err = builder
            .add_value("a", Value::Array(vec![Value::Integer(1), Value::String("x".into())]), "")
            .unwrap_err();
        assert!(matches!(err, ErrorKind::MixedArrayTypes { .. }));
    }

    #[test]
    fn leading_at_sign_selects_a_literal_string() {
        let mut builder = Builder::new(0);
        builder.add_value("path", Value::String("@C:\\Users\\tom".into()), "").unwrap();
        assert_eq!(builder.build(), "path = 'C:\\Users\\tom'\n");
    }

    #[test]
    fn float_that_is_integral_gets_a_trailing_dot_zero() {
        let mut builder = Builder::new(0);
        builder.add_value("f", Value::Float(3.0), "").unwrap();
        assert_eq!(builder.build(), "f = 3.0\n");
    }

    #[test]
    fn add_comment_is_unconditional() {
        let mut builder = Builder::new(0);
        builder.add_comment("hello");
        assert_eq!(builder.build(), "# hello\n");
    }
}
