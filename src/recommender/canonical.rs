//! Canonical byte encoding of any `Serialize` value, the input to
//! [`WorkloadDigest`](super::WorkloadDigest).
//!
//! Every value is tagged and self-delimiting, so no two distinct values share
//! an encoding: `None`, `Some(())`, `()` and non-finite floats all stay
//! apart. Map and struct entries are sorted by their encoded key, which makes
//! the result independent of map iteration order and lets a struct hash the
//! same as an equivalent map.

use serde::ser::{self, Error as _, Serialize};

use super::DigestError;

const NONE: u8 = 0x00;
const SOME: u8 = 0x01;
const UNIT: u8 = 0x02;
const FALSE: u8 = 0x03;
const TRUE: u8 = 0x04;
const UINT: u8 = 0x05;
const NEG_INT: u8 = 0x06;
const FLOAT: u8 = 0x07;
const STR: u8 = 0x08;
const BYTES: u8 = 0x09;
const SEQ: u8 = 0x0a;
const MAP: u8 = 0x0b;
const END: u8 = 0x0c;

pub(super) struct CanonicalEncoder {
    out: Vec<u8>,
}

impl CanonicalEncoder {
    /// Encodes `value` into its canonical bytes.
    pub(super) fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, DigestError> {
        let mut encoder = Self { out: Vec::new() };
        value.serialize(&mut encoder)?;
        Ok(encoder.out)
    }

    fn tag(&mut self, tag: u8) {
        self.out.push(tag);
    }

    fn len_prefixed(&mut self, tag: u8, bytes: &[u8]) {
        self.out.push(tag);
        self.out.extend_from_slice(&(bytes.len() as u64).to_le_bytes());
        self.out.extend_from_slice(bytes);
    }

    // Integers are compared by value, not by width: 1u8 and 1i64 encode alike.
    fn uint(&mut self, v: u128) {
        self.out.push(UINT);
        self.out.extend_from_slice(&v.to_le_bytes());
    }

    fn int(&mut self, v: i128) {
        if v >= 0 {
            self.uint(v as u128);
        } else {
            self.out.push(NEG_INT);
            self.out.extend_from_slice(&v.to_le_bytes());
        }
    }

    fn float(&mut self, v: f64) {
        self.out.push(FLOAT);
        self.out.extend_from_slice(&v.to_bits().to_le_bytes());
    }
}

impl<'a> ser::Serializer for &'a mut CanonicalEncoder {
    type Ok = ();
    type Error = DigestError;

    type SerializeSeq = Self;
    type SerializeTuple = Self;
    type SerializeTupleStruct = Self;
    type SerializeTupleVariant = Self;
    type SerializeMap = MapEncoder<'a>;
    type SerializeStruct = MapEncoder<'a>;
    type SerializeStructVariant = MapEncoder<'a>;

    fn serialize_bool(self, v: bool) -> Result<(), DigestError> {
        self.tag(if v { TRUE } else { FALSE });
        Ok(())
    }

    fn serialize_i8(self, v: i8) -> Result<(), DigestError> {
        self.int(v.into());
        Ok(())
    }

    fn serialize_i16(self, v: i16) -> Result<(), DigestError> {
        self.int(v.into());
        Ok(())
    }

    fn serialize_i32(self, v: i32) -> Result<(), DigestError> {
        self.int(v.into());
        Ok(())
    }

    fn serialize_i64(self, v: i64) -> Result<(), DigestError> {
        self.int(v.into());
        Ok(())
    }

    fn serialize_i128(self, v: i128) -> Result<(), DigestError> {
        self.int(v);
        Ok(())
    }

    fn serialize_u8(self, v: u8) -> Result<(), DigestError> {
        self.uint(v.into());
        Ok(())
    }

    fn serialize_u16(self, v: u16) -> Result<(), DigestError> {
        self.uint(v.into());
        Ok(())
    }

    fn serialize_u32(self, v: u32) -> Result<(), DigestError> {
        self.uint(v.into());
        Ok(())
    }

    fn serialize_u64(self, v: u64) -> Result<(), DigestError> {
        self.uint(v.into());
        Ok(())
    }

    fn serialize_u128(self, v: u128) -> Result<(), DigestError> {
        self.uint(v);
        Ok(())
    }

    fn serialize_f32(self, v: f32) -> Result<(), DigestError> {
        self.float(v.into());
        Ok(())
    }

    fn serialize_f64(self, v: f64) -> Result<(), DigestError> {
        self.float(v);
        Ok(())
    }

    fn serialize_char(self, v: char) -> Result<(), DigestError> {
        let mut buf = [0u8; 4];
        self.len_prefixed(STR, v.encode_utf8(&mut buf).as_bytes());
        Ok(())
    }

    fn serialize_str(self, v: &str) -> Result<(), DigestError> {
        self.len_prefixed(STR, v.as_bytes());
        Ok(())
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<(), DigestError> {
        self.len_prefixed(BYTES, v);
        Ok(())
    }

    fn serialize_none(self) -> Result<(), DigestError> {
        self.tag(NONE);
        Ok(())
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<(), DigestError> {
        self.tag(SOME);
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<(), DigestError> {
        self.tag(UNIT);
        Ok(())
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<(), DigestError> {
        self.tag(UNIT);
        Ok(())
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
    ) -> Result<(), DigestError> {
        self.len_prefixed(STR, variant.as_bytes());
        Ok(())
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<(), DigestError> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<(), DigestError> {
        self.tag(MAP);
        self.len_prefixed(STR, variant.as_bytes());
        value.serialize(&mut *self)?;
        self.tag(END);
        Ok(())
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self, DigestError> {
        self.tag(SEQ);
        Ok(self)
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self, DigestError> {
        self.tag(SEQ);
        Ok(self)
    }

    fn serialize_tuple_struct(self, _name: &'static str, _len: usize) -> Result<Self, DigestError> {
        self.tag(SEQ);
        Ok(self)
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Self, DigestError> {
        self.tag(MAP);
        self.len_prefixed(STR, variant.as_bytes());
        self.tag(SEQ);
        Ok(self)
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<MapEncoder<'a>, DigestError> {
        Ok(MapEncoder::new(self, 0))
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<MapEncoder<'a>, DigestError> {
        Ok(MapEncoder::new(self, 0))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<MapEncoder<'a>, DigestError> {
        self.tag(MAP);
        self.len_prefixed(STR, variant.as_bytes());
        Ok(MapEncoder::new(self, 1))
    }
}

impl<'a> ser::SerializeSeq for &'a mut CanonicalEncoder {
    type Ok = ();
    type Error = DigestError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), DigestError> {
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<(), DigestError> {
        self.tag(END);
        Ok(())
    }
}

impl<'a> ser::SerializeTuple for &'a mut CanonicalEncoder {
    type Ok = ();
    type Error = DigestError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), DigestError> {
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<(), DigestError> {
        self.tag(END);
        Ok(())
    }
}

impl<'a> ser::SerializeTupleStruct for &'a mut CanonicalEncoder {
    type Ok = ();
    type Error = DigestError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), DigestError> {
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<(), DigestError> {
        self.tag(END);
        Ok(())
    }
}

impl<'a> ser::SerializeTupleVariant for &'a mut CanonicalEncoder {
    type Ok = ();
    type Error = DigestError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), DigestError> {
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<(), DigestError> {
        // Closes the sequence, then the single-entry variant map
        self.tag(END);
        self.tag(END);
        Ok(())
    }
}

/// Collects encoded entries so they can be written in sorted order.
pub(super) struct MapEncoder<'a> {
    parent: &'a mut CanonicalEncoder,
    entries: Vec<(Vec<u8>, Vec<u8>)>,
    pending_key: Option<Vec<u8>>,
    // Extra END tags owed to an enclosing variant map
    closers: usize,
}

impl<'a> MapEncoder<'a> {
    fn new(parent: &'a mut CanonicalEncoder, closers: usize) -> Self {
        Self {
            parent,
            entries: Vec::new(),
            pending_key: None,
            closers,
        }
    }

    fn push<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<(), DigestError> {
        let key = CanonicalEncoder::encode(key)?;
        let value = CanonicalEncoder::encode(value)?;
        self.entries.push((key, value));
        Ok(())
    }

    fn finish(self) -> Result<(), DigestError> {
        let MapEncoder {
            parent,
            mut entries,
            closers,
            ..
        } = self;

        entries.sort();
        parent.tag(MAP);
        for (key, value) in entries {
            parent.out.extend_from_slice(&key);
            parent.out.extend_from_slice(&value);
        }
        parent.tag(END);
        for _ in 0..closers {
            parent.tag(END);
        }
        Ok(())
    }
}

impl<'a> ser::SerializeMap for MapEncoder<'a> {
    type Ok = ();
    type Error = DigestError;

    fn serialize_key<T: Serialize + ?Sized>(&mut self, key: &T) -> Result<(), DigestError> {
        self.pending_key = Some(CanonicalEncoder::encode(key)?);
        Ok(())
    }

    fn serialize_value<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), DigestError> {
        let key = self
            .pending_key
            .take()
            .ok_or_else(|| DigestError::custom("map value serialized before its key"))?;
        let value = CanonicalEncoder::encode(value)?;
        self.entries.push((key, value));
        Ok(())
    }

    fn end(self) -> Result<(), DigestError> {
        self.finish()
    }
}

impl<'a> ser::SerializeStruct for MapEncoder<'a> {
    type Ok = ();
    type Error = DigestError;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), DigestError> {
        self.push(key, value)
    }

    fn end(self) -> Result<(), DigestError> {
        self.finish()
    }
}

impl<'a> ser::SerializeStructVariant for MapEncoder<'a> {
    type Ok = ();
    type Error = DigestError;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), DigestError> {
        self.push(key, value)
    }

    fn end(self) -> Result<(), DigestError> {
        self.finish()
    }
}
