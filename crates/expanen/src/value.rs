use std::fmt::{self, Write};

/// The raw payload declared for an enum member.
///
/// The constructor never inspects or transforms a value; it only compares values for
/// equality when checking a new declaration against the fields already in the hierarchy.
/// Interpretation of the payload (splitting a code out of a string, etc.) belongs to the
/// field type attached to the enum.
///
/// # Equality
///
/// Comparison follows Python's `==`, which is what "natural equality" of a declared value
/// means for an expandable enum: `Bool`, `Int` and `Float` compare numerically across
/// variants (so `True == 1 == 1.0`), `NaN` never equals anything (itself included), and
/// containers compare element-wise. Because of `NaN` there is no `Eq` impl.
///
/// # Display
///
/// `Display` renders like Python's `str()`: strings are written raw, everything else uses
/// its `repr` form. This is what field rendering (`(E.F1: 123)`) and conflict messages use.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub enum FieldValue {
    /// Python's `None` singleton.
    #[serde(alias = "none", alias = "NoneType")]
    None,
    /// Python boolean (`True` or `False`).
    #[serde(alias = "bool")]
    Bool(bool),
    /// Python integer (64-bit signed).
    #[serde(alias = "int")]
    Int(i64),
    /// Python float (64-bit IEEE 754).
    #[serde(alias = "float")]
    Float(f64),
    /// Python string (UTF-8).
    #[serde(alias = "str")]
    String(String),
    /// Python bytes object.
    #[serde(alias = "bytes")]
    Bytes(Vec<u8>),
    /// Python tuple (immutable sequence).
    #[serde(alias = "tuple")]
    Tuple(Vec<Self>),
    /// Python list.
    #[serde(alias = "list")]
    List(Vec<Self>),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            _ => self.repr_fmt(f),
        }
    }
}

impl FieldValue {
    /// Returns the Python type name of this value (`"int"`, `"str"`, ...).
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::None => "NoneType",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::String(_) => "str",
            Self::Bytes(_) => "bytes",
            Self::Tuple(_) => "tuple",
            Self::List(_) => "list",
        }
    }

    /// Returns the Python `repr()` of this value.
    #[must_use]
    pub fn py_repr(&self) -> String {
        let mut s = String::new();
        // Writing to a String never fails
        let _ = self.repr_fmt(&mut s);
        s
    }

    /// Returns the string payload, if this is a `String`.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric view used for cross-variant comparison. `Bool` counts as `0`/`1`.
    fn as_number(&self) -> Option<Number> {
        match self {
            Self::Bool(b) => Some(Number::Int(i64::from(*b))),
            Self::Int(i) => Some(Number::Int(*i)),
            Self::Float(f) => Some(Number::Float(*f)),
            _ => None,
        }
    }

    fn repr_fmt(&self, f: &mut impl Write) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Bool(true) => f.write_str("True"),
            Self::Bool(false) => f.write_str("False"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => f.write_str(&float_repr(*v)),
            Self::String(s) => string_repr_fmt(s, f),
            Self::Bytes(b) => bytes_repr_fmt(b, f),
            Self::List(items) => {
                f.write_char('[')?;
                sequence_repr_fmt(items, f)?;
                f.write_char(']')
            }
            Self::Tuple(items) => {
                f.write_char('(')?;
                sequence_repr_fmt(items, f)?;
                // single-element tuples keep their trailing comma
                if items.len() == 1 {
                    f.write_char(',')?;
                }
                f.write_char(')')
            }
        }
    }
}

#[derive(Clone, Copy)]
enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    #[expect(clippy::cast_precision_loss, reason = "mirrors Python int/float comparison")]
    #[expect(clippy::cast_possible_truncation, reason = "range is checked before the cast")]
    #[expect(clippy::float_cmp, reason = "value equality is exact by definition")]
    fn numeric_eq(self, other: Self) -> bool {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Int(i), Self::Float(x)) | (Self::Float(x), Self::Int(i)) => {
                // an integral float outside the i64 range can never equal an i64
                x.fract() == 0.0 && x >= i64::MIN as f64 && x < i64::MAX as f64 && (x as i64) == i
            }
        }
    }
}

impl PartialEq for FieldValue {
    fn eq(&self, other: &Self) -> bool {
        if let (Some(a), Some(b)) = (self.as_number(), other.as_number()) {
            return a.numeric_eq(b);
        }
        match (self, other) {
            (Self::None, Self::None) => true,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Bytes(a), Self::Bytes(b)) => a == b,
            (Self::Tuple(a), Self::Tuple(b)) | (Self::List(a), Self::List(b)) => a == b,
            _ => false,
        }
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u32> for FieldValue {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<Vec<u8>> for FieldValue {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(value)
    }
}

impl From<()> for FieldValue {
    fn from((): ()) -> Self {
        Self::None
    }
}

impl<T: Into<Self>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::None, Into::into)
    }
}

/// Error returned when a `FieldValue` cannot be converted to the requested Rust type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionError {
    /// The type name that was expected (e.g., "int", "str").
    pub expected: &'static str,
    /// The actual type name of the value (e.g., "list", "NoneType").
    pub actual: &'static str,
}

impl ConversionError {
    /// Creates a new `ConversionError` with the expected and actual type names.
    #[must_use]
    pub fn new(expected: &'static str, actual: &'static str) -> Self {
        Self { expected, actual }
    }
}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "expected {}, got {}", self.expected, self.actual)
    }
}

impl std::error::Error for ConversionError {}

impl TryFrom<&FieldValue> for i64 {
    type Error = ConversionError;

    fn try_from(value: &FieldValue) -> Result<Self, Self::Error> {
        match value {
            FieldValue::Int(i) => Ok(*i),
            _ => Err(ConversionError::new("int", value.type_name())),
        }
    }
}

/// Int values are widened to f64 to match Python.
impl TryFrom<&FieldValue> for f64 {
    type Error = ConversionError;

    #[expect(clippy::cast_precision_loss, reason = "int to float widening mirrors Python")]
    fn try_from(value: &FieldValue) -> Result<Self, Self::Error> {
        match value {
            FieldValue::Float(f) => Ok(*f),
            FieldValue::Int(i) => Ok(*i as Self),
            _ => Err(ConversionError::new("float", value.type_name())),
        }
    }
}

impl TryFrom<&FieldValue> for String {
    type Error = ConversionError;

    fn try_from(value: &FieldValue) -> Result<Self, Self::Error> {
        match value {
            FieldValue::String(s) => Ok(s.clone()),
            _ => Err(ConversionError::new("str", value.type_name())),
        }
    }
}

/// Does NOT apply Python truthiness; only `Bool` converts.
impl TryFrom<&FieldValue> for bool {
    type Error = ConversionError;

    fn try_from(value: &FieldValue) -> Result<Self, Self::Error> {
        match value {
            FieldValue::Bool(b) => Ok(*b),
            _ => Err(ConversionError::new("bool", value.type_name())),
        }
    }
}

fn sequence_repr_fmt(items: &[FieldValue], f: &mut impl Write) -> fmt::Result {
    let mut iter = items.iter();
    if let Some(first) = iter.next() {
        first.repr_fmt(f)?;
        for item in iter {
            f.write_str(", ")?;
            item.repr_fmt(f)?;
        }
    }
    Ok(())
}

/// Writes a Python-style quoted string, preferring single quotes.
fn string_repr_fmt(s: &str, f: &mut impl Write) -> fmt::Result {
    let quote = if s.contains('\'') && !s.contains('"') { '"' } else { '\'' };
    f.write_char(quote)?;
    for c in s.chars() {
        match c {
            '\\' => f.write_str("\\\\")?,
            '\t' => f.write_str("\\t")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            c if c == quote => {
                f.write_char('\\')?;
                f.write_char(c)?;
            }
            c => f.write_char(c)?,
        }
    }
    f.write_char(quote)
}

/// Writes `b'...'` with the same quote choice as strings; bytes outside printable ASCII are
/// written as `\xNN` escapes.
fn bytes_repr_fmt(bytes: &[u8], f: &mut impl Write) -> fmt::Result {
    let quote = if bytes.contains(&b'\'') && !bytes.contains(&b'"') { b'"' } else { b'\'' };
    f.write_char('b')?;
    f.write_char(char::from(quote))?;
    for &byte in bytes {
        match byte {
            b'\\' => f.write_str("\\\\")?,
            b'\t' => f.write_str("\\t")?,
            b'\n' => f.write_str("\\n")?,
            b'\r' => f.write_str("\\r")?,
            b if b == quote => {
                f.write_char('\\')?;
                f.write_char(char::from(b))?;
            }
            b' '..=b'~' => f.write_char(char::from(byte))?,
            b => write!(f, "\\x{b:02x}")?,
        }
    }
    f.write_char(char::from(quote))
}

/// Returns a float rendering matching CPython's `repr()`.
///
/// `ryu` gives the shortest round-tripping digits. CPython lays those digits out positionally
/// for decimal exponents in `-4..16` and in scientific notation otherwise, with a signed
/// exponent of at least two digits (`1e-05`, `1e+16`).
#[expect(clippy::cast_possible_wrap, reason = "ryu writes at most 17 significant digits")]
fn float_repr(f: f64) -> String {
    if f.is_nan() {
        return "nan".to_owned();
    }
    if f.is_infinite() {
        return if f.is_sign_negative() { "-inf" } else { "inf" }.to_owned();
    }

    let mut buffer = ryu::Buffer::new();
    let formatted = buffer.format_finite(f);
    let (sign, unsigned) = match formatted.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", formatted),
    };
    let (mantissa, exponent) = unsigned.split_once('e').unwrap_or((unsigned, "0"));
    let exponent: isize = exponent.parse().unwrap_or_default();
    let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));

    let all = format!("{int_part}{frac_part}");
    let trimmed = all.trim_start_matches('0');
    let digits = trimmed.trim_end_matches('0');
    if digits.is_empty() {
        return format!("{sign}0.0");
    }

    // decimal point position relative to the first significant digit
    let point = int_part.len() as isize - (all.len() - trimmed.len()) as isize + exponent;
    let scientific = point - 1;
    if !(-4..16).contains(&scientific) {
        let (first, rest) = digits.split_at(1);
        let dot = if rest.is_empty() { "" } else { "." };
        let exp_sign = if scientific < 0 { '-' } else { '+' };
        return format!("{sign}{first}{dot}{rest}e{exp_sign}{:02}", scientific.unsigned_abs());
    }

    let len = digits.len() as isize;
    if point <= 0 {
        format!("{sign}0.{}{digits}", "0".repeat(point.unsigned_abs()))
    } else if point >= len {
        format!("{sign}{digits}{}.0", "0".repeat((point - len).unsigned_abs()))
    } else {
        let (whole, frac) = digits.split_at(point.unsigned_abs());
        format!("{sign}{whole}.{frac}")
    }
}
