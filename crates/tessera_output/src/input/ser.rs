//! `serde::Serializer` producing [`Input`] trees.

use indexmap::IndexMap;
use serde::Serialize;
use serde::ser::{self, Impossible};
use serde_json::{Number, Value};

use super::Input;
use crate::error::InputError;

/// Struct names serde uses for the standard range types.
const RANGE_TYPES: &[&str] = &[
    "Range",
    "RangeInclusive",
    "RangeFrom",
    "RangeTo",
    "RangeToInclusive",
];

pub(super) struct InputSerializer;

fn value(value: impl Into<Value>) -> Result<Input, InputError> {
    Ok(Input::Value(value.into()))
}

fn variant_name(name: &str, variant: &str) -> String {
    format!("{name}::{variant}")
}

impl ser::Serializer for InputSerializer {
    type Ok = Input;
    type Error = InputError;

    type SerializeSeq = SeqBuilder;
    type SerializeTuple = Impossible<Input, InputError>;
    type SerializeTupleStruct = Impossible<Input, InputError>;
    type SerializeTupleVariant = Impossible<Input, InputError>;
    type SerializeMap = MapBuilder;
    type SerializeStruct = Impossible<Input, InputError>;
    type SerializeStructVariant = Impossible<Input, InputError>;

    fn serialize_bool(self, v: bool) -> Result<Input, InputError> {
        value(v)
    }

    fn serialize_i8(self, v: i8) -> Result<Input, InputError> {
        value(v)
    }

    fn serialize_i16(self, v: i16) -> Result<Input, InputError> {
        value(v)
    }

    fn serialize_i32(self, v: i32) -> Result<Input, InputError> {
        value(v)
    }

    fn serialize_i64(self, v: i64) -> Result<Input, InputError> {
        value(v)
    }

    fn serialize_u8(self, v: u8) -> Result<Input, InputError> {
        value(v)
    }

    fn serialize_u16(self, v: u16) -> Result<Input, InputError> {
        value(v)
    }

    fn serialize_u32(self, v: u32) -> Result<Input, InputError> {
        value(v)
    }

    fn serialize_u64(self, v: u64) -> Result<Input, InputError> {
        value(v)
    }

    fn serialize_f32(self, v: f32) -> Result<Input, InputError> {
        self.serialize_f64(f64::from(v))
    }

    fn serialize_f64(self, v: f64) -> Result<Input, InputError> {
        Number::from_f64(v)
            .map(|n| Input::Value(Value::Number(n)))
            .ok_or_else(|| InputError::Custom(format!("non-finite number {v}")))
    }

    fn serialize_char(self, v: char) -> Result<Input, InputError> {
        value(v.to_string())
    }

    fn serialize_str(self, v: &str) -> Result<Input, InputError> {
        value(v)
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<Input, InputError> {
        Err(InputError::UnsupportedShape("byte buffer"))
    }

    fn serialize_none(self) -> Result<Input, InputError> {
        Ok(Input::null())
    }

    fn serialize_some<T: ?Sized + Serialize>(self, v: &T) -> Result<Input, InputError> {
        v.serialize(self)
    }

    fn serialize_unit(self) -> Result<Input, InputError> {
        Ok(Input::null())
    }

    fn serialize_unit_struct(self, name: &'static str) -> Result<Input, InputError> {
        Err(InputError::UnexpectedType(name.to_owned()))
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
    ) -> Result<Input, InputError> {
        value(variant)
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        v: &T,
    ) -> Result<Input, InputError> {
        v.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        name: &'static str,
        _index: u32,
        variant: &'static str,
        _v: &T,
    ) -> Result<Input, InputError> {
        Err(InputError::UnexpectedType(variant_name(name, variant)))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SeqBuilder, InputError> {
        Ok(SeqBuilder {
            items: Vec::with_capacity(len.unwrap_or(0)),
        })
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple, InputError> {
        Err(InputError::UnsupportedShape("tuple"))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct, InputError> {
        Err(InputError::UnsupportedShape("tuple struct"))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant, InputError> {
        Err(InputError::UnsupportedShape("tuple variant"))
    }

    fn serialize_map(self, len: Option<usize>) -> Result<MapBuilder, InputError> {
        Ok(MapBuilder {
            entries: IndexMap::with_capacity(len.unwrap_or(0)),
            pending: None,
        })
    }

    fn serialize_struct(
        self,
        name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStruct, InputError> {
        if RANGE_TYPES.contains(&name) {
            return Err(InputError::UnsupportedShape("range"));
        }
        Err(InputError::UnexpectedType(name.to_owned()))
    }

    fn serialize_struct_variant(
        self,
        name: &'static str,
        _index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant, InputError> {
        Err(InputError::UnexpectedType(variant_name(name, variant)))
    }
}

pub(super) struct SeqBuilder {
    items: Vec<Input>,
}

impl ser::SerializeSeq for SeqBuilder {
    type Ok = Input;
    type Error = InputError;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, v: &T) -> Result<(), InputError> {
        self.items.push(v.serialize(InputSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<Input, InputError> {
        Ok(Input::List(self.items))
    }
}

pub(super) struct MapBuilder {
    entries: IndexMap<String, Input>,
    pending: Option<String>,
}

impl ser::SerializeMap for MapBuilder {
    type Ok = Input;
    type Error = InputError;

    fn serialize_key<T: ?Sized + Serialize>(&mut self, key: &T) -> Result<(), InputError> {
        match key.serialize(InputSerializer)? {
            Input::Value(Value::String(key)) => {
                self.pending = Some(key);
                Ok(())
            }
            _ => Err(InputError::NonStringKey),
        }
    }

    fn serialize_value<T: ?Sized + Serialize>(&mut self, v: &T) -> Result<(), InputError> {
        let Some(key) = self.pending.take() else {
            return Err(InputError::Custom("map value without a key".to_owned()));
        };
        self.entries.insert(key, v.serialize(InputSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<Input, InputError> {
        Ok(Input::Map(self.entries))
    }
}
