use std::fmt;

/// The kind of value held by a [`Value`], without the value itself.
///
/// The [`Display`][fmt::Display] form is the label used when printing a tree.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum Kind {
    /// No value.
    Null,
    /// A 64-bit signed integer.
    I64,
    /// A 64-bit unsigned integer.
    U64,
    /// A single-precision float.
    F32,
    /// A double-precision float.
    F64,
    /// A boolean.
    Bool,
    /// A text string.
    Text,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Null => "null",
            Self::I64 => "i64",
            Self::U64 => "u64",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::Bool => "bool",
            Self::Text => "text",
        })
    }
}

/// One dynamically typed value stored in a node of a [`ValueTree`][crate::ValueTree].
///
/// Values are usually created through the [`From`] conversions, which is what
/// [`NodeMut::add_child()`][crate::NodeMut::add_child] relies on:
///
/// ```rust
/// use value_tree::{Kind, Value};
///
/// assert_eq!(Value::from(7_u64).kind(), Kind::U64);
/// assert_eq!(Value::from("hi").kind(), Kind::Text);
/// assert_eq!(Value::from(None::<i64>).kind(), Kind::Null);
/// assert_eq!(Value::from(()).kind(), Kind::Null);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
#[non_exhaustive]
pub enum Value {
    /// No value. Printed as `null`.
    #[default]
    Null,
    /// A 64-bit signed integer.
    I64(i64),
    /// A 64-bit unsigned integer.
    U64(u64),
    /// A single-precision float.
    F32(f32),
    /// A double-precision float.
    F64(f64),
    /// A boolean.
    Bool(bool),
    /// A text string.
    Text(String),
}

impl Value {
    /// The kind of the value currently held.
    #[must_use]
    pub fn kind(&self) -> Kind {
        match self {
            Self::Null => Kind::Null,
            Self::I64(_) => Kind::I64,
            Self::U64(_) => Kind::U64,
            Self::F32(_) => Kind::F32,
            Self::F64(_) => Kind::F64,
            Self::Bool(_) => Kind::Bool,
            Self::Text(_) => Kind::Text,
        }
    }

    /// Whether this is [`Value::Null`].
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::I64(value) => write!(f, "{value}"),
            Self::U64(value) => write!(f, "{value}"),
            Self::F32(value) => write!(f, "{value}"),
            Self::F64(value) => write!(f, "{value}"),
            Self::Bool(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
        }
    }
}

/// A Rust type that corresponds to exactly one [`Kind`] of [`Value`].
///
/// This is what makes [`Node::get()`][crate::Node::get] and [`Node::is()`][crate::Node::is]
/// generic over the stored type. It is implemented for `i64`, `u64`, `f32`, `f64`, `bool` and
/// `String`. It cannot be implemented outside this crate, so a successful read always means the
/// stored kind matched exactly.
///
/// ```compile_fail
/// use value_tree::{Kind, Value, ValueKind};
///
/// struct Small(u8);
///
/// impl ValueKind for Small {
///     const KIND: Kind = Kind::U64;
///
///     fn from_value(_: &Value) -> Option<Self> {
///         Some(Small(5))
///     }
/// }
/// ```
#[expect(private_bounds, reason = "intentional - sealed trait")]
pub trait ValueKind: Sealed + Sized {
    /// The kind of value this type is stored as.
    const KIND: Kind;

    /// Extracts a copy of the value if it is of this kind.
    fn from_value(value: &Value) -> Option<Self>;
}

trait Sealed {}

macro_rules! value_kind {
    ($type:ty, $variant:ident, |$inner:ident| $extract:expr) => {
        impl Sealed for $type {}

        impl ValueKind for $type {
            const KIND: Kind = Kind::$variant;

            fn from_value(value: &Value) -> Option<Self> {
                match value {
                    Value::$variant($inner) => Some($extract),
                    _ => None,
                }
            }
        }

        impl From<$type> for Value {
            fn from(value: $type) -> Self {
                Self::$variant(value)
            }
        }
    };
}

value_kind!(i64, I64, |inner| *inner);
value_kind!(u64, U64, |inner| *inner);
value_kind!(f32, F32, |inner| *inner);
value_kind!(f64, F64, |inner| *inner);
value_kind!(bool, Bool, |inner| *inner);
value_kind!(String, Text, |inner| inner.clone());

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<()> for Value {
    fn from((): ()) -> Self {
        Self::Null
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Self>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use static_assertions::assert_impl_all;

    use super::*;

    assert_impl_all!(Value: Send, Sync, Clone);
    assert_impl_all!(Kind: Send, Sync, Copy);

    #[test]
    fn kinds_follow_variants() {
        assert_eq!(Value::Null.kind(), Kind::Null);
        assert_eq!(Value::from(-1_i64).kind(), Kind::I64);
        assert_eq!(Value::from(1_u64).kind(), Kind::U64);
        assert_eq!(Value::from(1.5_f32).kind(), Kind::F32);
        assert_eq!(Value::from(1.5_f64).kind(), Kind::F64);
        assert_eq!(Value::from(true).kind(), Kind::Bool);
        assert_eq!(Value::from("x").kind(), Kind::Text);
        assert_eq!(Value::from(String::from("x")).kind(), Kind::Text);
    }

    #[test]
    fn option_maps_none_to_null() {
        assert!(Value::from(None::<u64>).is_null());
        assert_eq!(Value::from(Some(5_u64)), Value::U64(5));
    }

    #[test]
    fn from_value_only_matches_own_kind() {
        let value = Value::from(42_u64);

        assert_eq!(u64::from_value(&value), Some(42));
        assert_eq!(i64::from_value(&value), None);
        assert_eq!(String::from_value(&value), None);
    }

    #[test]
    fn display_forms() {
        assert_eq!(Value::Null.to_string(), "null");
        assert_eq!(Value::from(-3_i64).to_string(), "-3");
        assert_eq!(Value::from(false).to_string(), "false");
        assert_eq!(Value::from("a@b.org").to_string(), "a@b.org");
        assert_eq!(Value::from(0.5_f64).to_string(), "0.5");

        assert_eq!(Kind::Text.to_string(), "text");
        assert_eq!(Kind::Null.to_string(), "null");
    }
}
