// Copyright 2024 Memris Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The closed storage type system: `TypeCode`, the tagged `Value`, and the
//! `TypeConverter` trait used to map user types onto it.

use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

/// The closed set of primitive storage types a `Column` can hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TypeCode {
    I8,
    I16,
    I32,
    I64,
    /// A single UTF-16 code unit, the storage analogue of Java's `char`.
    Char,
    F32,
    F64,
    Bool,
    Str,
}

/// A single tagged storage value. Only `Str` is a boxed/reference variant
/// that supports `Null`; every other variant is stored unboxed in its
/// column and falls back to a type-appropriate zero instead of `Null`.
#[derive(Clone, Debug)]
pub enum Value {
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    Char(u16),
    F32(f32),
    F64(f64),
    Bool(bool),
    Str(String),
    Null,
}

impl Value {
    pub fn type_code(&self) -> Option<TypeCode> {
        match self {
            Value::I8(_) => Some(TypeCode::I8),
            Value::I16(_) => Some(TypeCode::I16),
            Value::I32(_) => Some(TypeCode::I32),
            Value::I64(_) => Some(TypeCode::I64),
            Value::Char(_) => Some(TypeCode::Char),
            Value::F32(_) => Some(TypeCode::F32),
            Value::F64(_) => Some(TypeCode::F64),
            Value::Bool(_) => Some(TypeCode::Bool),
            Value::Str(_) => Some(TypeCode::Str),
            Value::Null => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The type-appropriate zero used by the materializer's write path when
    /// a record field is `None`/absent but the storage type is non-nullable.
    pub fn zero_for(code: TypeCode) -> Value {
        match code {
            TypeCode::I8 => Value::I8(0),
            TypeCode::I16 => Value::I16(0),
            TypeCode::I32 => Value::I32(0),
            TypeCode::I64 => Value::I64(0),
            TypeCode::Char => Value::Char(0),
            TypeCode::F32 => Value::F32(0.0),
            TypeCode::F64 => Value::F64(0.0),
            TypeCode::Bool => Value::Bool(false),
            TypeCode::Str => Value::Str(String::new()),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Value::I8(v) => Some(v as i64),
            Value::I16(v) => Some(v as i64),
            Value::I32(v) => Some(v as i64),
            Value::I64(v) => Some(v),
            Value::Char(v) => Some(v as i64),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::F32(v) => Some(v as f64),
            Value::F64(v) => Some(v),
            _ => self.as_i64().map(|v| v as f64),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Value::Bool(v) => Some(v),
            _ => None,
        }
    }

    fn discriminant(&self) -> u8 {
        match self {
            Value::I8(_) => 0,
            Value::I16(_) => 1,
            Value::I32(_) => 2,
            Value::I64(_) => 3,
            Value::Char(_) => 4,
            Value::F32(_) => 5,
            Value::F64(_) => 6,
            Value::Bool(_) => 7,
            Value::Str(_) => 8,
            Value::Null => 9,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        use Value::*;
        match (self, other) {
            (I8(a), I8(b)) => a == b,
            (I16(a), I16(b)) => a == b,
            (I32(a), I32(b)) => a == b,
            (I64(a), I64(b)) => a == b,
            (Char(a), Char(b)) => a == b,
            (F32(a), F32(b)) => a.to_bits() == b.to_bits(),
            (F64(a), F64(b)) => a.to_bits() == b.to_bits(),
            (Bool(a), Bool(b)) => a == b,
            (Str(a), Str(b)) => a == b,
            (Null, Null) => true,
            _ => false,
        }
    }
}

// Floats are compared bit-for-bit above, so equality is reflexive and `Eq`
// is sound even though NaN != NaN under IEEE-754 `PartialEq`.
impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.discriminant().hash(state);
        match self {
            Value::I8(v) => v.hash(state),
            Value::I16(v) => v.hash(state),
            Value::I32(v) => v.hash(state),
            Value::I64(v) => v.hash(state),
            Value::Char(v) => v.hash(state),
            Value::F32(v) => v.to_bits().hash(state),
            Value::F64(v) => v.to_bits().hash(state),
            Value::Bool(v) => v.hash(state),
            Value::Str(v) => v.hash(state),
            Value::Null => {}
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use Value::*;
        match (self, other) {
            (I8(a), I8(b)) => a.cmp(b),
            (I16(a), I16(b)) => a.cmp(b),
            (I32(a), I32(b)) => a.cmp(b),
            (I64(a), I64(b)) => a.cmp(b),
            (Char(a), Char(b)) => a.cmp(b),
            (F32(a), F32(b)) => a.total_cmp(b),
            (F64(a), F64(b)) => a.total_cmp(b),
            (Bool(a), Bool(b)) => a.cmp(b),
            (Str(a), Str(b)) => a.cmp(b),
            (Null, Null) => std::cmp::Ordering::Equal,
            _ => self.discriminant().cmp(&other.discriminant()),
        }
    }
}

/// Maps a user-level type `U` to and from its storage [`Value`].
///
/// Registered per field by whatever compiles a `RecordDescriptor` (out of
/// scope for the engine itself); the engine only ever calls these two
/// methods.
pub trait TypeConverter<U>: Send + Sync {
    fn storage_type(&self) -> TypeCode;
    fn to_storage(&self, value: &U) -> Value;
    fn from_storage(&self, value: &Value) -> U;
}

/// `uuid::Uuid <-> Value::Str`.
#[derive(Default)]
pub struct UuidConverter;

impl TypeConverter<Uuid> for UuidConverter {
    fn storage_type(&self) -> TypeCode {
        TypeCode::Str
    }

    fn to_storage(&self, value: &Uuid) -> Value {
        Value::Str(value.to_string())
    }

    fn from_storage(&self, value: &Value) -> Uuid {
        value
            .as_str()
            .and_then(|s| Uuid::parse_str(s).ok())
            .unwrap_or_else(Uuid::nil)
    }
}

/// `chrono::DateTime<Utc> <-> Value::I64` (epoch millis), the storage
/// analogue of `java.time.Instant`.
#[derive(Default)]
pub struct InstantMillisConverter;

impl TypeConverter<DateTime<Utc>> for InstantMillisConverter {
    fn storage_type(&self) -> TypeCode {
        TypeCode::I64
    }

    fn to_storage(&self, value: &DateTime<Utc>) -> Value {
        Value::I64(value.timestamp_millis())
    }

    fn from_storage(&self, value: &Value) -> DateTime<Utc> {
        let millis = value.as_i64().unwrap_or(0);
        Utc.timestamp_millis_opt(millis).single().unwrap_or_default()
    }
}

/// `rust_decimal::Decimal <-> Value::Str`, the storage analogue of
/// `java.math.BigDecimal`.
#[derive(Default)]
pub struct DecimalConverter;

impl TypeConverter<Decimal> for DecimalConverter {
    fn storage_type(&self) -> TypeCode {
        TypeCode::Str
    }

    fn to_storage(&self, value: &Decimal) -> Value {
        Value::Str(value.to_string())
    }

    fn from_storage(&self, value: &Value) -> Decimal {
        value
            .as_str()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }
}

/// Implemented by user enums that want to persist as a storage string.
pub trait EnumStorage: Sized {
    fn to_storage_str(&self) -> String;
    fn from_storage_str(s: &str) -> Self;
}

/// A generic `EnumStorage -> Value::Str` converter usable by any enum that
/// implements [`EnumStorage`].
pub struct EnumStringConverter<T>(PhantomData<fn() -> T>);

impl<T> Default for EnumStringConverter<T> {
    fn default() -> Self {
        Self(PhantomData)
    }
}

impl<T: EnumStorage + Send + Sync> TypeConverter<T> for EnumStringConverter<T> {
    fn storage_type(&self) -> TypeCode {
        TypeCode::Str
    }

    fn to_storage(&self, value: &T) -> Value {
        Value::Str(value.to_storage_str())
    }

    fn from_storage(&self, value: &Value) -> T {
        T::from_storage_str(value.as_str().unwrap_or_default())
    }
}

/// A generic `EnumStorage -> Value::I32` converter for enums that persist
/// as their ordinal rather than their name.
pub struct EnumOrdinalConverter<T> {
    to_ordinal: fn(&T) -> i32,
    from_ordinal: fn(i32) -> T,
}

impl<T> EnumOrdinalConverter<T> {
    pub fn new(to_ordinal: fn(&T) -> i32, from_ordinal: fn(i32) -> T) -> Self {
        Self {
            to_ordinal,
            from_ordinal,
        }
    }
}

impl<T: Send + Sync> TypeConverter<T> for EnumOrdinalConverter<T> {
    fn storage_type(&self) -> TypeCode {
        TypeCode::I32
    }

    fn to_storage(&self, value: &T) -> Value {
        Value::I32((self.to_ordinal)(value))
    }

    fn from_storage(&self, value: &Value) -> T {
        (self.from_ordinal)(value.as_i64().unwrap_or(0) as i32)
    }
}
