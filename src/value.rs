use std::fmt;

/// A runtime value produced by getters and literals during where-clause evaluation.
///
/// The set of kinds is closed on purpose: there is no float, null or
/// collection kind, and values of different kinds never compare.
///
/// # Examples
///
/// ```
/// use ql_lang::Value;
///
/// let flag = Value::Bool(true);
/// let count = Value::Int(42);
/// let name = Value::Str("add".to_string());
///
/// assert_eq!(count.type_name(), "int");
/// assert!(flag.same_kind(&Value::Bool(false)));
/// assert!(!name.same_kind(&count));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    /// Boolean
    Bool(bool),

    /// Signed integer
    Int(i64),

    /// UTF-8 string
    Str(String),
}

impl Value {
    /// Human-readable name of the value's kind, used in fault messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Str(_) => "string",
        }
    }

    /// True when both values carry the same tag.
    pub fn same_kind(&self, other: &Value) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }

    /// The zero value of the same kind (`false`, `0`, `""`).
    pub fn zero_of(&self) -> Value {
        match self {
            Value::Bool(_) => Value::Bool(false),
            Value::Int(_) => Value::Int(0),
            Value::Str(_) => Value::Str(String::new()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Str(s) => write!(f, "'{}'", s.replace('\'', "\\'")),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

#[test]
fn test_display_quotes_strings() {
    assert_eq!(Value::Int(-3).to_string(), "-3");
    assert_eq!(Value::Bool(false).to_string(), "false");
    assert_eq!(Value::from("it's").to_string(), "'it\\'s'");
}

#[test]
fn test_zero_of_keeps_kind() {
    assert_eq!(Value::Int(7).zero_of(), Value::Int(0));
    assert_eq!(Value::from("x").zero_of(), Value::Str(String::new()));
    assert_eq!(Value::Bool(true).zero_of(), Value::Bool(false));
}
