// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Stored attribute values and conversions from Rust scalars.
//!
//! Every scalar attribute of a record holds a [`Value`]. Generated code never
//! builds values by hand; it goes through two traits:
//!
//! | Trait | Implemented for | Used by |
//! |-------|-----------------|---------|
//! | [`FieldValue`] | `bool`, integers, `f32`, `f64`, `String`, `DateTime<Utc>` | predicate helpers, sort keys |
//! | [`AttributeValue`] | `T`, `Option<T>`, `Vec<T>`, `Option<Vec<T>>` | mappers and updaters |
//!
//! Types outside the scalar vocabulary are stored as strings through their
//! `Display`/`FromStr` implementations, see [`opaque`].

use std::{cmp::Ordering, fmt};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single stored attribute value.
///
/// `==` is storage identity: floats compare by bit pattern, so a NaN equals
/// itself and `0.0` differs from `-0.0`. Use [`compare`](Self::compare) for
/// numeric ordering.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
    /// Boolean flag.
    Bool(bool),

    /// Signed integer, every integer width is widened to `i64`.
    Integer(i64),

    /// Single precision float.
    Float(f32),

    /// Double precision float.
    Double(f64),

    /// UTF-8 text.
    String(String),

    /// Point in time.
    Timestamp(DateTime<Utc>),

    /// Scalar array attribute.
    List(Vec<Value>)
}

impl Value {
    /// Storage type of this value, `None` for lists.
    #[must_use]
    pub const fn attribute_type(&self) -> Option<AttributeType> {
        match self {
            Self::Bool(_) => Some(AttributeType::Boolean),
            Self::Integer(_) => Some(AttributeType::Integer),
            Self::Float(_) => Some(AttributeType::Float),
            Self::Double(_) => Some(AttributeType::Double),
            Self::String(_) => Some(AttributeType::String),
            Self::Timestamp(_) => Some(AttributeType::Timestamp),
            Self::List(_) => None
        }
    }

    /// Borrow the text of a string value.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(text) => Some(text),
            _ => None
        }
    }

    /// Compare two values of compatible types.
    ///
    /// Numeric variants compare across widths. Values of unrelated types are
    /// unordered.
    #[must_use]
    pub fn compare(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => Some(a.cmp(b)),
            (Self::String(a), Self::String(b)) => Some(a.cmp(b)),
            (Self::Timestamp(a), Self::Timestamp(b)) => Some(a.cmp(b)),
            (Self::Integer(a), Self::Integer(b)) => Some(a.cmp(b)),
            (Self::List(a), Self::List(b)) => {
                for (left, right) in a.iter().zip(b) {
                    match left.compare(right)? {
                        Ordering::Equal => continue,
                        unequal => return Some(unequal)
                    }
                }
                Some(a.len().cmp(&b.len()))
            }
            (left, right) => left.as_f64()?.partial_cmp(&right.as_f64()?)
        }
    }

    /// Equality that treats numeric widths as interchangeable.
    #[must_use]
    pub fn loosely_equals(&self, other: &Self) -> bool {
        self.compare(other) == Some(Ordering::Equal)
    }

    #[allow(clippy::cast_precision_loss)]
    fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(value) => Some(*value as f64),
            Self::Float(value) => Some(f64::from(*value)),
            Self::Double(value) => Some(*value),
            _ => None
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a.to_bits() == b.to_bits(),
            (Self::Double(a), Self::Double(b)) => a.to_bits() == b.to_bits(),
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Timestamp(a), Self::Timestamp(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            _ => false
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(value) => write!(f, "{value}"),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::Double(value) => write!(f, "{value}"),
            Self::String(value) => write!(f, "{value:?}"),
            Self::Timestamp(value) => write!(f, "{}", value.to_rfc3339()),
            Self::List(values) => {
                f.write_str("{")?;
                for (index, value) in values.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{value}")?;
                }
                f.write_str("}")
            }
        }
    }
}

/// Storage type of a schema attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeType {
    /// `bool`
    Boolean,
    /// Any integer width.
    Integer,
    /// `f32`
    Float,
    /// `f64`
    Double,
    /// `String` and opaque text-encoded types.
    String,
    /// `DateTime<Utc>`
    Timestamp
}

impl AttributeType {
    /// Lowercase storage type name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Double => "double",
            Self::String => "string",
            Self::Timestamp => "timestamp"
        }
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Conversion between a Rust scalar and its stored [`Value`].
pub trait FieldValue: Sized {
    /// Storage type the scalar maps to.
    const ATTRIBUTE_TYPE: AttributeType;

    /// Encode into a stored value.
    fn to_value(&self) -> Value;

    /// Decode from a stored value, `None` when the value has another type or
    /// does not fit.
    fn from_value(value: &Value) -> Option<Self>;
}

/// Scalars with a total order usable in range comparisons.
pub trait OrderedValue: FieldValue {}

impl FieldValue for bool {
    const ATTRIBUTE_TYPE: AttributeType = AttributeType::Boolean;

    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(flag) => Some(*flag),
            _ => None
        }
    }
}

macro_rules! integer_field_value {
    ($($ty:ty),*) => {
        $(
            impl FieldValue for $ty {
                const ATTRIBUTE_TYPE: AttributeType = AttributeType::Integer;

                fn to_value(&self) -> Value {
                    Value::Integer(i64::from(*self))
                }

                fn from_value(value: &Value) -> Option<Self> {
                    match value {
                        Value::Integer(number) => <$ty>::try_from(*number).ok(),
                        _ => None
                    }
                }
            }

            impl OrderedValue for $ty {}
        )*
    };
}

integer_field_value!(i8, i16, i32, i64, u8, u16, u32);

impl FieldValue for f32 {
    const ATTRIBUTE_TYPE: AttributeType = AttributeType::Float;

    fn to_value(&self) -> Value {
        Value::Float(*self)
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Float(number) => Some(*number),
            Value::Double(number) => Some(*number as f32),
            Value::Integer(number) => Some(*number as f32),
            _ => None
        }
    }
}

impl OrderedValue for f32 {}

impl FieldValue for f64 {
    const ATTRIBUTE_TYPE: AttributeType = AttributeType::Double;

    fn to_value(&self) -> Value {
        Value::Double(*self)
    }

    #[allow(clippy::cast_precision_loss)]
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Double(number) => Some(*number),
            Value::Float(number) => Some(f64::from(*number)),
            Value::Integer(number) => Some(*number as f64),
            _ => None
        }
    }
}

impl OrderedValue for f64 {}

impl FieldValue for String {
    const ATTRIBUTE_TYPE: AttributeType = AttributeType::String;

    fn to_value(&self) -> Value {
        Value::String(self.clone())
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_str().map(str::to_owned)
    }
}

impl FieldValue for DateTime<Utc> {
    const ATTRIBUTE_TYPE: AttributeType = AttributeType::Timestamp;

    fn to_value(&self) -> Value {
        Value::Timestamp(*self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Timestamp(instant) => Some(*instant),
            _ => None
        }
    }
}

impl OrderedValue for DateTime<Utc> {}

/// Conversion between a field (with its optional/array wrapping) and the
/// attribute slot of a record.
///
/// `to_attribute` returning `None` means the attribute is absent.
/// `from_attribute` returning `None` means the stored data does not coerce to
/// the field type.
pub trait AttributeValue: Sized {
    /// Encode the field, `None` clears the attribute.
    fn to_attribute(&self) -> Option<Value>;

    /// Decode the field from the attribute slot.
    fn from_attribute(value: Option<&Value>) -> Option<Self>;
}

impl<T: FieldValue> AttributeValue for T {
    fn to_attribute(&self) -> Option<Value> {
        Some(self.to_value())
    }

    fn from_attribute(value: Option<&Value>) -> Option<Self> {
        T::from_value(value?)
    }
}

impl<T: FieldValue> AttributeValue for Option<T> {
    fn to_attribute(&self) -> Option<Value> {
        self.as_ref().map(FieldValue::to_value)
    }

    fn from_attribute(value: Option<&Value>) -> Option<Self> {
        match value {
            None => Some(None),
            Some(value) => T::from_value(value).map(Some)
        }
    }
}

impl<T: FieldValue> AttributeValue for Vec<T> {
    fn to_attribute(&self) -> Option<Value> {
        Some(Value::List(self.iter().map(FieldValue::to_value).collect()))
    }

    fn from_attribute(value: Option<&Value>) -> Option<Self> {
        match value {
            None => Some(Vec::new()),
            Some(Value::List(items)) => items.iter().map(T::from_value).collect(),
            Some(_) => None
        }
    }
}

impl<T: FieldValue> AttributeValue for Option<Vec<T>> {
    fn to_attribute(&self) -> Option<Value> {
        self.as_ref().and_then(AttributeValue::to_attribute)
    }

    fn from_attribute(value: Option<&Value>) -> Option<Self> {
        match value {
            None => Some(None),
            Some(_) => Vec::<T>::from_attribute(value).map(Some)
        }
    }
}

/// Text encoding for field types outside the scalar vocabulary.
///
/// Such fields never appear in schemas, predicates or sorts, but mappers and
/// updaters still carry them as strings.
pub mod opaque {
    use std::{fmt::Display, str::FromStr};

    use super::Value;

    /// Encode a required field.
    pub fn encode<T: Display>(value: &T) -> Option<Value> {
        Some(Value::String(value.to_string()))
    }

    /// Decode a required field.
    pub fn decode<T: FromStr>(value: Option<&Value>) -> Option<T> {
        value?.as_str()?.parse().ok()
    }

    /// Encode an optional field.
    pub fn encode_optional<T: Display>(value: &Option<T>) -> Option<Value> {
        value.as_ref().and_then(encode)
    }

    /// Decode an optional field.
    pub fn decode_optional<T: FromStr>(value: Option<&Value>) -> Option<Option<T>> {
        match value {
            None => Some(None),
            Some(_) => decode(value).map(Some)
        }
    }

    /// Encode an array field.
    pub fn encode_list<T: Display>(values: &[T]) -> Option<Value> {
        Some(Value::List(
            values
                .iter()
                .map(|value| Value::String(value.to_string()))
                .collect()
        ))
    }

    /// Decode an array field.
    pub fn decode_list<T: FromStr>(value: Option<&Value>) -> Option<Vec<T>> {
        match value {
            None => Some(Vec::new()),
            Some(Value::List(items)) => items
                .iter()
                .map(|item| item.as_str()?.parse().ok())
                .collect(),
            Some(_) => None
        }
    }
}
