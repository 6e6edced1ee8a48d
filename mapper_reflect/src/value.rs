/* Untyped run-time values */

use mapper_types::{PrimitiveType, TypeDescriptor};
use serde::{Deserialize, Serialize};
use std::fmt;

/* Handle to an object on the heap */
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(pub(crate) u32);

/* Handle to a sequence on the heap. Two values holding the same id are the
 * same sequence */
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeqId(pub(crate) u32);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "object@{}", self.0)
    }
}

impl fmt::Display for SeqId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sequence@{}", self.0)
    }
}

/* Primitives are stored unboxed; a boxed primitive is the same variant and
 * only differs in that its slot may also hold Null */
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "kebab-case")]
pub enum Value {
    Null,
    Bool(bool),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Char(char),
    Float32(f32),
    Float64(f64),
    Str(String),
    Seq(SeqId),
    Object(ObjectId),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Str(_) => "string",
            Value::Seq(_) => "sequence",
            Value::Object(_) => "object",
            other => other.primitive_type().map(PrimitiveType::name).unwrap_or("value"),
        }
    }

    pub fn primitive_type(&self) -> Option<PrimitiveType> {
        Some(match self {
            Value::Bool(_) => PrimitiveType::Bool,
            Value::Int8(_) => PrimitiveType::Int8,
            Value::Int16(_) => PrimitiveType::Int16,
            Value::Int32(_) => PrimitiveType::Int32,
            Value::Int64(_) => PrimitiveType::Int64,
            Value::Char(_) => PrimitiveType::Char,
            Value::Float32(_) => PrimitiveType::Float32,
            Value::Float64(_) => PrimitiveType::Float64,
            _ => return None,
        })
    }

    /// Initial slot value for a field of type `ty`: zero for primitives,
    /// null for everything else.
    pub fn default_for(ty: &TypeDescriptor) -> Self {
        match ty {
            TypeDescriptor::Primitive(prim) => match prim {
                PrimitiveType::Bool => Value::Bool(false),
                PrimitiveType::Int8 => Value::Int8(0),
                PrimitiveType::Int16 => Value::Int16(0),
                PrimitiveType::Int32 => Value::Int32(0),
                PrimitiveType::Int64 => Value::Int64(0),
                PrimitiveType::Char => Value::Char('\0'),
                PrimitiveType::Float32 => Value::Float32(0.0),
                PrimitiveType::Float64 => Value::Float64(0.0),
            },
            _ => Value::Null,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_seq(&self) -> Option<SeqId> {
        match self {
            Value::Seq(id) => Some(*id),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<ObjectId> {
        match self {
            Value::Object(id) => Some(*id),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Int8(v) => write!(f, "{v}"),
            Value::Int16(v) => write!(f, "{v}"),
            Value::Int32(v) => write!(f, "{v}"),
            Value::Int64(v) => write!(f, "{v}"),
            Value::Char(v) => write!(f, "{v}"),
            Value::Float32(v) => write!(f, "{v}"),
            Value::Float64(v) => write!(f, "{v}"),
            Value::Str(v) => f.write_str(v),
            Value::Seq(id) => write!(f, "{id}"),
            Value::Object(id) => write!(f, "{id}"),
        }
    }
}

macro_rules! impl_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::$variant(value)
                }
            }
        )*
    };
}

impl_from!(
    bool => Bool,
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    char => Char,
    f32 => Float32,
    f64 => Float64,
    String => Str,
    SeqId => Seq,
    ObjectId => Object,
);

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}
