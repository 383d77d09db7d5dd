use indexmap::IndexMap;

/// A TOML table: an insertion-ordered mapping from string keys to [`Value`]s.
///
/// Order reflects the order keys were defined in the source document (or, for
/// the builder, the order `addValue`/`addTable` were called).
pub type Table = IndexMap<String, Value>;

/// A parsed or to-be-emitted TOML value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Datetime(Datetime),
    Array(Vec<Value>),
    Table(Table),
}

/// Which of TOML's four datetime shapes a literal represents.
///
/// The core only needs to round-trip the literal; this discriminant exists
/// so callers that care about the shape don't have to re-parse the string
/// themselves (spec open question, §9).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatetimeKind {
    /// `1979-05-27T07:32:00Z` or with a numeric offset.
    Offset,
    /// `1979-05-27T07:32:00` with no offset.
    Local,
    /// `1979-05-27`.
    Date,
    /// `07:32:00`.
    Time,
}

/// A datetime literal, retained verbatim alongside its shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Datetime {
    pub literal: String,
    pub kind: DatetimeKind,
}

impl Datetime {
    pub fn new(literal: impl Into<String>, kind: DatetimeKind) -> Self {
        Self {
            literal: literal.into(),
            kind,
        }
    }

    /// Classify a scanner DATETIME lexeme into its [`DatetimeKind`].
    pub fn classify(lexeme: &str) -> DatetimeKind {
        let has_date = lexeme
            .as_bytes()
            .get(4)
            .map(|&b| b == b'-')
            .unwrap_or(false);
        let has_time_sep = lexeme.contains('T') || lexeme.contains('t');
        if !has_date {
            DatetimeKind::Time
        } else if !has_time_sep {
            DatetimeKind::Date
        } else if lexeme.contains('Z') || lexeme.contains('z') || has_offset(lexeme) {
            DatetimeKind::Offset
        } else {
            DatetimeKind::Local
        }
    }
}

fn has_offset(lexeme: &str) -> bool {
    // Offsets only appear after the time portion, so look past the first 11
    // characters (`YYYY-MM-DDT`) for a `+HH:MM` / `-HH:MM` suffix.
    lexeme
        .get(11..)
        .map(|rest| rest.contains('+') || rest.contains('-'))
        .unwrap_or(false)
}

/// The coarse type tag used for array-homogeneity checks (§8: nested arrays
/// all count as the same "array" type regardless of their own element type).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    String,
    Integer,
    Float,
    Boolean,
    Datetime,
    Array,
    Table,
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::String(_) => ValueKind::String,
            Value::Integer(_) => ValueKind::Integer,
            Value::Float(_) => ValueKind::Float,
            Value::Boolean(_) => ValueKind::Boolean,
            Value::Datetime(_) => ValueKind::Datetime,
            Value::Array(_) => ValueKind::Array,
            Value::Table(_) => ValueKind::Table,
        }
    }

    pub fn as_table(&self) -> Option<&Table> {
        match self {
            Value::Table(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_table_mut(&mut self) -> Option<&mut Table> {
        match self {
            Value::Table(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_array_mut(&mut self) -> Option<&mut Vec<Value>> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ValueKind::String => "string",
            ValueKind::Integer => "integer",
            ValueKind::Float => "float",
            ValueKind::Boolean => "boolean",
            ValueKind::Datetime => "datetime",
            ValueKind::Array => "array",
            ValueKind::Table => "table",
        };
        f.write_str(s)
    }
}
