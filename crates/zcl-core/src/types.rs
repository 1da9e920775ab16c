//! ZCL primitive type tags and the values that carry them.
//!
//! `DataType` is the closed enumeration of ZCL type tags from the ZCL
//! type code table (see `codec` for the tag<->code mapping). `Value` is
//! the corresponding tagged variant: every `Value` that round-trips
//! through `codec::encode`/`codec::decode` for a given `DataType`
//! belongs to exactly one of its storage classes.

/// A ZCL primitive type tag.
///
/// Order here has no wire meaning — only `codec::type_code`/`codec::tag`
/// define the byte encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    NoData,
    Data8,
    Data16,
    Data24,
    Data32,
    Data40,
    Data48,
    Data56,
    Data64,
    Boolean,
    Bitmap8,
    Bitmap16,
    Bitmap24,
    Bitmap32,
    Bitmap40,
    Bitmap48,
    Bitmap56,
    Bitmap64,
    Int8u,
    Int16u,
    Int24u,
    Int32u,
    Int40u,
    Int48u,
    Int56u,
    Int64u,
    Int8s,
    Int16s,
    Int24s,
    Int32s,
    Int40s,
    Int48s,
    Int56s,
    Int64s,
    Enum8,
    Enum16,
    FloatSemi,
    FloatSingle,
    FloatDouble,
    OctetString,
    CharString,
    LongOctetString,
    LongCharString,
    Array,
    Struct,
    Set,
    Bag,
    TimeOfDay,
    Date,
    UtcTime,
    ClusterId,
    AttributeId,
    BacnetOid,
    IeeeAddress,
    SecurityKey,
    /// Fallback for any type code not in the table above. The codec
    /// treats values of this tag as `INT8U` for encode/decode, per
    /// spec.md §4.1.
    Unknown,
}

/// The storage class a `DataType` decodes into.
///
/// This is the invariant spec.md §3 names: "a Value's tag must
/// correspond to its DataType's storage class; encoders reject
/// mismatches." `StorageClass` is what `Value::storage_class` and
/// `DataType::storage_class` both compute, so a mismatch is a simple
/// equality check rather than a hand-maintained case list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageClass {
    Unsigned,
    Signed,
    Bytes,
    Text,
    Bool,
    Float,
}

impl DataType {
    /// The storage class values of this type decode into.
    pub fn storage_class(self) -> StorageClass {
        use DataType::*;
        match self {
            Boolean => StorageClass::Bool,
            OctetString | LongOctetString => StorageClass::Bytes,
            CharString | LongCharString => StorageClass::Text,
            FloatSingle | FloatDouble => StorageClass::Float,
            Int8s | Int16s | Int24s | Int32s | Int40s | Int48s | Int56s | Int64s => {
                StorageClass::Signed
            }
            NoData | Data8 | Data16 | Data24 | Data32 | Data40 | Data48 | Data56 | Data64
            | Bitmap8 | Bitmap16 | Bitmap24 | Bitmap32 | Bitmap40 | Bitmap48 | Bitmap56
            | Bitmap64 | Int8u | Int16u | Int24u | Int32u | Int40u | Int48u | Int56u | Int64u
            | Enum8 | Enum16 | FloatSemi | Array | Struct | Set
            | Bag | TimeOfDay | Date | UtcTime | ClusterId | AttributeId | BacnetOid
            | IeeeAddress | SecurityKey | Unknown => StorageClass::Unsigned,
        }
    }

    /// Fixed encoded width in bytes, or `None` for a length-prefixed
    /// (variable) type.
    pub fn fixed_width(self) -> Option<usize> {
        use DataType::*;
        match self {
            NoData => Some(0),
            Data8 | Bitmap8 | Int8u | Int8s | Enum8 | Boolean => Some(1),
            Data16 | Bitmap16 | Int16u | Int16s | Enum16 => Some(2),
            Data24 | Bitmap24 | Int24u | Int24s => Some(3),
            ClusterId | AttributeId => Some(2),
            Data32 | Bitmap32 | Int32u | Int32s | UtcTime | IeeeAddress | FloatSingle
            | TimeOfDay | Date | BacnetOid => Some(4),
            Data40 | Bitmap40 | Int40u | Int40s => Some(5),
            Data48 | Bitmap48 | Int48u | Int48s => Some(6),
            Data56 | Bitmap56 | Int56u | Int56s => Some(7),
            Data64 | Bitmap64 | Int64u | Int64s | FloatDouble | SecurityKey => Some(8),
            FloatSemi => Some(2),
            OctetString | CharString | LongOctetString | LongCharString | Array | Struct
            | Set | Bag => None,
            Unknown => Some(1),
        }
    }
}

/// A decoded or to-be-encoded ZCL value.
///
/// `Unsigned`/`Signed` store the full-width integer regardless of the
/// declared type's bit width; `codec::encode` is what enforces the
/// declared type's range, not the variant itself.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Unsigned(u64),
    Signed(i64),
    Bytes(Vec<u8>),
    Text(String),
    Bool(bool),
    Float(f64),
}

impl Value {
    pub fn storage_class(&self) -> StorageClass {
        match self {
            Value::Unsigned(_) => StorageClass::Unsigned,
            Value::Signed(_) => StorageClass::Signed,
            Value::Bytes(_) => StorageClass::Bytes,
            Value::Text(_) => StorageClass::Text,
            Value::Bool(_) => StorageClass::Bool,
            Value::Float(_) => StorageClass::Float,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::Unsigned(v) => Some(*v),
            Value::Bool(b) => Some(*b as u64),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Signed(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::Unsigned(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Unsigned(v as u64)
    }
}

impl From<u16> for Value {
    fn from(v: u16) -> Self {
        Value::Unsigned(v as u64)
    }
}

impl From<u8> for Value {
    fn from(v: u8) -> Self {
        Value::Unsigned(v as u64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Signed(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Signed(v as i64)
    }
}

impl From<i16> for Value {
    fn from(v: i16) -> Self {
        Value::Signed(v as i64)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cluster_and_attribute_ids_are_two_bytes() {
        assert_eq!(DataType::ClusterId.fixed_width(), Some(2));
        assert_eq!(DataType::AttributeId.fixed_width(), Some(2));
    }

    #[test]
    fn bacnet_oid_and_date_types_are_four_bytes() {
        assert_eq!(DataType::BacnetOid.fixed_width(), Some(4));
        assert_eq!(DataType::TimeOfDay.fixed_width(), Some(4));
        assert_eq!(DataType::Date.fixed_width(), Some(4));
    }

    #[test]
    fn wide_integer_widths_follow_their_bit_width_name() {
        assert_eq!(DataType::Int24u.fixed_width(), Some(3));
        assert_eq!(DataType::Int40s.fixed_width(), Some(5));
        assert_eq!(DataType::Int56u.fixed_width(), Some(7));
        assert_eq!(DataType::Int64s.fixed_width(), Some(8));
    }

    #[test]
    fn variable_length_types_have_no_fixed_width() {
        assert_eq!(DataType::CharString.fixed_width(), None);
        assert_eq!(DataType::OctetString.fixed_width(), None);
        assert_eq!(DataType::LongCharString.fixed_width(), None);
    }
}
