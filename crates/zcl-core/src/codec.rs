//! Encode/decode a single typed value to/from a little-endian byte
//! sequence (C1).
//!
//! Byte order is little-endian throughout. `decode` pops from the front
//! of a mutable cursor so a caller can walk a payload made of
//! heterogeneously-typed arguments one at a time, matching the
//! `_pop_argument` shape of the original source.

use byteorder::{ByteOrder, LittleEndian};

use crate::error::ZclError;
use crate::types::{DataType, StorageClass, Value};

/// A forward-only view over a byte payload. `decode` advances the
/// cursor past whatever it consumes; nothing is copied up front.
pub struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], ZclError> {
        if self.remaining() < n {
            return Err(ZclError::PayloadTooShort {
                need: n,
                have: self.remaining(),
            });
        }
        let slice = &self.bytes[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }
}

/// Bidirectional tag<->code table (ZCL type code table, spec.md §6).
/// Authoritative because the XML schema files never carry it.
pub fn type_code(ty: DataType) -> u8 {
    use DataType::*;
    match ty {
        NoData => 0x00,
        Data8 => 0x08,
        Data16 => 0x09,
        Data24 => 0x0A,
        Data32 => 0x0B,
        Data40 => 0x0C,
        Data48 => 0x0D,
        Data56 => 0x0E,
        Data64 => 0x0F,
        Boolean => 0x10,
        Bitmap8 => 0x18,
        Bitmap16 => 0x19,
        Bitmap24 => 0x1A,
        Bitmap32 => 0x1B,
        Bitmap40 => 0x1C,
        Bitmap48 => 0x1D,
        Bitmap56 => 0x1E,
        Bitmap64 => 0x1F,
        Int8u => 0x20,
        Int16u => 0x21,
        Int24u => 0x22,
        Int32u => 0x23,
        Int40u => 0x24,
        Int48u => 0x25,
        Int56u => 0x26,
        Int64u => 0x27,
        Int8s => 0x28,
        Int16s => 0x29,
        Int24s => 0x2A,
        Int32s => 0x2B,
        Int40s => 0x2C,
        Int48s => 0x2D,
        Int56s => 0x2E,
        Int64s => 0x2F,
        Enum8 => 0x30,
        Enum16 => 0x31,
        FloatSemi => 0x38,
        FloatSingle => 0x39,
        FloatDouble => 0x3A,
        OctetString => 0x41,
        CharString => 0x42,
        LongOctetString => 0x43,
        LongCharString => 0x44,
        Array => 0x48,
        Struct => 0x4C,
        Set => 0x50,
        Bag => 0x51,
        TimeOfDay => 0xE0,
        Date => 0xE1,
        UtcTime => 0xE2,
        ClusterId => 0xE8,
        AttributeId => 0xE9,
        BacnetOid => 0xEA,
        IeeeAddress => 0xF0,
        SecurityKey => 0xF1,
        Unknown => 0xFF,
    }
}

/// Inverse of `type_code`. Unknown codes map to `DataType::Unknown`.
pub fn tag(code: u8) -> DataType {
    use DataType::*;
    match code {
        0x00 => NoData,
        0x08 => Data8,
        0x09 => Data16,
        0x0A => Data24,
        0x0B => Data32,
        0x0C => Data40,
        0x0D => Data48,
        0x0E => Data56,
        0x0F => Data64,
        0x10 => Boolean,
        0x18 => Bitmap8,
        0x19 => Bitmap16,
        0x1A => Bitmap24,
        0x1B => Bitmap32,
        0x1C => Bitmap40,
        0x1D => Bitmap48,
        0x1E => Bitmap56,
        0x1F => Bitmap64,
        0x20 => Int8u,
        0x21 => Int16u,
        0x22 => Int24u,
        0x23 => Int32u,
        0x24 => Int40u,
        0x25 => Int48u,
        0x26 => Int56u,
        0x27 => Int64u,
        0x28 => Int8s,
        0x29 => Int16s,
        0x2A => Int24s,
        0x2B => Int32s,
        0x2C => Int40s,
        0x2D => Int48s,
        0x2E => Int56s,
        0x2F => Int64s,
        0x30 => Enum8,
        0x31 => Enum16,
        0x38 => FloatSemi,
        0x39 => FloatSingle,
        0x3A => FloatDouble,
        0x41 => OctetString,
        0x42 => CharString,
        0x43 => LongOctetString,
        0x44 => LongCharString,
        0x48 => Array,
        0x4C => Struct,
        0x50 => Set,
        0x51 => Bag,
        0xE0 => TimeOfDay,
        0xE1 => Date,
        0xE2 => UtcTime,
        0xE8 => ClusterId,
        0xE9 => AttributeId,
        0xEA => BacnetOid,
        0xF0 => IeeeAddress,
        0xF1 => SecurityKey,
        _ => Unknown,
    }
}

/// Encodes `value` under `ty`, appending bytes to `out`.
///
/// Unknown types fall back to `INT8U` with a logged warning, per
/// spec.md §4.1. Range violations for bounded fixed-width types raise
/// `RangeError`.
pub fn encode(ty: DataType, value: &Value, out: &mut Vec<u8>) -> Result<(), ZclError> {
    if matches!(ty, DataType::Unknown) || is_codec_unsupported(ty) {
        tracing::warn!(?ty, ?value, "unhandled type, assuming INT8U");
        return encode(DataType::Int8u, value, out);
    }

    let mismatch = || ZclError::TypeMismatch {
        ty,
        value: value.clone(),
    };

    match ty.storage_class() {
        StorageClass::Bool => {
            let v = value.as_u64().ok_or_else(mismatch)?;
            encode_unsigned_checked(ty, v, out)
        }
        StorageClass::Unsigned => {
            let v = value.as_u64().ok_or_else(mismatch)?;
            encode_unsigned_checked(ty, v, out)
        }
        StorageClass::Signed => {
            let v = value.as_i64().ok_or_else(mismatch)?;
            encode_signed_checked(ty, v, out)
        }
        StorageClass::Float => {
            let v = value.as_f64().ok_or_else(mismatch)?;
            encode_float(ty, v, out)
        }
        StorageClass::Text => {
            let Value::Text(s) = value else {
                return Err(mismatch());
            };
            encode_length_prefixed(s.as_bytes(), out)
        }
        StorageClass::Bytes => {
            let Value::Bytes(b) = value else {
                return Err(mismatch());
            };
            encode_length_prefixed(b, out)
        }
    }
}

/// Tags present in the type table but never given a dedicated wire
/// representation: aggregate/meta shapes and the half-precision float,
/// none of which the reference door-lock/XML flows ever exercise.
fn is_codec_unsupported(ty: DataType) -> bool {
    matches!(
        ty,
        DataType::FloatSemi | DataType::Array | DataType::Struct | DataType::Set | DataType::Bag
    )
}

fn encode_float(ty: DataType, value: f64, out: &mut Vec<u8>) -> Result<(), ZclError> {
    match ty {
        DataType::FloatSingle => {
            out.extend_from_slice(&(value as f32).to_le_bytes());
            Ok(())
        }
        DataType::FloatDouble => {
            out.extend_from_slice(&value.to_le_bytes());
            Ok(())
        }
        _ => unreachable!("encode_float called with non-float type {ty:?}"),
    }
}

/// Inclusive `(lo, hi)` for unsigned/bool fixed-width types, by byte width.
fn unsigned_range(ty: DataType) -> Option<(u64, u64)> {
    let width = ty.fixed_width()?;
    if width == 0 || width > 8 {
        return None;
    }
    let hi = if width == 8 { u64::MAX } else { (1u64 << (width * 8)) - 1 };
    Some((0, hi))
}

fn signed_range(ty: DataType) -> Option<(i64, i64)> {
    let width = ty.fixed_width()?;
    if width == 0 || width > 8 {
        return None;
    }
    if width == 8 {
        return Some((i64::MIN, i64::MAX));
    }
    let bits = (width * 8) as u32;
    let hi = (1i64 << (bits - 1)) - 1;
    let lo = -(1i64 << (bits - 1));
    Some((lo, hi))
}

fn encode_unsigned_checked(ty: DataType, value: u64, out: &mut Vec<u8>) -> Result<(), ZclError> {
    let width = ty.fixed_width().unwrap_or(1);
    if let Some((lo, hi)) = unsigned_range(ty) {
        if value < lo || value > hi {
            return Err(ZclError::RangeError {
                ty,
                value: value as i64,
                lo: lo as i64,
                hi: hi as i64,
            });
        }
    }
    let mut buf = [0u8; 8];
    LittleEndian::write_u64(&mut buf, value);
    out.extend_from_slice(&buf[..width]);
    Ok(())
}

fn encode_signed_checked(ty: DataType, value: i64, out: &mut Vec<u8>) -> Result<(), ZclError> {
    let width = ty.fixed_width().unwrap_or(1);
    if let Some((lo, hi)) = signed_range(ty) {
        if value < lo || value > hi {
            return Err(ZclError::RangeError { ty, value, lo, hi });
        }
    }
    let mut buf = [0u8; 8];
    LittleEndian::write_i64(&mut buf, value);
    out.extend_from_slice(&buf[..width]);
    Ok(())
}

fn encode_length_prefixed(bytes: &[u8], out: &mut Vec<u8>) -> Result<(), ZclError> {
    if bytes.len() > 0xFF {
        return Err(ZclError::StringTooLong(bytes.len()));
    }
    out.push(bytes.len() as u8);
    out.extend_from_slice(bytes);
    Ok(())
}

/// Decodes a value of type `ty` from the front of `cursor`.
pub fn decode(ty: DataType, cursor: &mut Cursor<'_>) -> Result<Value, ZclError> {
    if matches!(ty, DataType::Unknown) || is_codec_unsupported(ty) {
        tracing::warn!(?ty, "unhandled type, assuming INT8U");
        return decode(DataType::Int8u, cursor);
    }

    match ty.storage_class() {
        StorageClass::Bool => {
            let bytes = cursor.take(1)?;
            Ok(Value::Bool(bytes[0] != 0))
        }
        StorageClass::Float => match ty {
            DataType::FloatSingle => {
                let bytes = cursor.take(4)?;
                let mut buf = [0u8; 4];
                buf.copy_from_slice(bytes);
                Ok(Value::Float(f32::from_le_bytes(buf) as f64))
            }
            DataType::FloatDouble => {
                let bytes = cursor.take(8)?;
                let mut buf = [0u8; 8];
                buf.copy_from_slice(bytes);
                Ok(Value::Float(f64::from_le_bytes(buf)))
            }
            _ => unreachable!("decode Float storage class for non-float type {ty:?}"),
        },
        StorageClass::Unsigned => {
            let width = ty.fixed_width().unwrap_or(1);
            let bytes = cursor.take(width)?;
            let mut buf = [0u8; 8];
            buf[..width].copy_from_slice(bytes);
            Ok(Value::Unsigned(LittleEndian::read_u64(&buf)))
        }
        StorageClass::Signed => {
            let width = ty.fixed_width().unwrap_or(1);
            let bytes = cursor.take(width)?;
            let mut buf = [0u8; 8];
            buf[..width].copy_from_slice(bytes);
            let unsigned = LittleEndian::read_u64(&buf);
            Ok(Value::Signed(sign_extend(unsigned, width)))
        }
        StorageClass::Text => {
            let len = cursor.take(1)?[0] as usize;
            let bytes = cursor.take(len)?;
            Ok(Value::Text(String::from_utf8_lossy(bytes).into_owned()))
        }
        StorageClass::Bytes => {
            let len = cursor.take(1)?[0] as usize;
            let bytes = cursor.take(len)?;
            Ok(Value::Bytes(bytes.to_vec()))
        }
    }
}

fn sign_extend(unsigned: u64, width: usize) -> i64 {
    if width >= 8 {
        return unsigned as i64;
    }
    let bits = (width * 8) as u32;
    let sign_bit = 1u64 << (bits - 1);
    if unsigned & sign_bit != 0 {
        (unsigned as i64) - (1i64 << bits)
    } else {
        unsigned as i64
    }
}
