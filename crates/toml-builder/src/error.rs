/// The typed reasons a [`Builder`](crate::Builder) call can fail (§7).
///
/// These are distinct from `toml_parser::ErrorKind`: the builder only ever
/// fails on its own emission-time rules, never on a lexing or parsing
/// concern, so there is no file/line context to carry.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ErrorKind {
    #[error("key is empty or all whitespace")]
    EmptyKey,

    #[error("key `{0}` is already defined")]
    DuplicateKey(String),

    #[error("table `{0}` is already defined, or redeclares an array of tables")]
    DuplicateTableKey(String),

    #[error("array of tables `{0}` is not a valid declaration here")]
    DuplicateArrayTableKey(String),

    #[error("`{0}` is already defined as an array of tables")]
    TableAlreadyDefinedAsArray(String),

    #[error("`{0}` was implicitly defined as a table by an earlier array of tables")]
    KeyDefinedAsImplicitTable(String),

    #[error("segment `{0}` of `{1}` needs quoting to be a valid key")]
    UnquotedKeyRequired(String, String),

    #[error("string value for `{0}` has a bare backslash after escape substitution")]
    InvalidStringCharacters(String),

    #[error("array for `{name}` mixes {leader} and {offending} elements")]
    MixedArrayTypes {
        name: String,
        leader: String,
        offending: String,
    },

    #[error("value for `{0}` is not a string, integer, float, boolean, datetime, or array of those")]
    UnsupportedDataType(String),
}

/// The error returned by every [`Builder`](crate::Builder) mutator.
pub type Error = ErrorKind;
