//! Sample values: the dynamic description of a value handed to the builder.
//!
//! Any `serde::Serialize` value can be turned into a [`SampleValue`] by running it
//! through a serializer that records structure instead of emitting bytes. Struct
//! names, optional fields and timestamps survive the trip, which is everything the
//! schema inferencer needs.

use chrono::{DateTime, FixedOffset, SecondsFormat};
use log::warn;
use serde::ser::{self, Serialize};
use serde_json::{Number, Value};
use std::fmt;

/// Structural description of a sample value
#[derive(Debug, Clone, PartialEq)]
pub enum SampleValue {
    Null,
    Bool(bool),
    Integer(Number),
    Float(f64),
    Text(String),
    /// A timestamp, either from `chrono` or from any RFC 3339 string
    Time(DateTime<FixedOffset>),
    List(Vec<SampleValue>),
    /// Keyed collection without a type name (maps, enum variant payloads)
    Map(Vec<(String, SampleValue)>),
    /// A named struct
    Record(Record),
    Optional(Option<Box<SampleValue>>),
    /// A struct field that `skip_serializing_if` dropped from this sample
    Absent,
    /// Something that could not be described; carries its textual form
    Opaque(String),
}

/// A named struct and its fields in declaration order
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub type_name: String,
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub value: SampleValue,
    /// True when the field may be missing from a payload (`Option` or skipped)
    pub optional: bool,
}

impl SampleValue {
    /// Describe any serializable value
    pub fn of<T>(value: &T) -> SampleValue
    where
        T: ?Sized + Serialize,
    {
        match value.serialize(SampleSerializer) {
            Ok(sample) => sample,
            Err(err) => {
                warn!("Failed to describe sample value, treating it as opaque: {}", err);
                SampleValue::Opaque(err.to_string())
            }
        }
    }

    /// Render the sample as plain JSON, used for `example` fields
    pub fn to_json(&self) -> Value {
        match self {
            SampleValue::Null | SampleValue::Absent | SampleValue::Optional(None) => Value::Null,
            SampleValue::Bool(b) => Value::Bool(*b),
            SampleValue::Integer(n) => Value::Number(n.clone()),
            SampleValue::Float(f) => Number::from_f64(*f).map(Value::Number).unwrap_or(Value::Null),
            SampleValue::Text(s) | SampleValue::Opaque(s) => Value::String(s.clone()),
            SampleValue::Time(time) => Value::String(format_time(time)),
            SampleValue::List(items) => Value::Array(items.iter().map(SampleValue::to_json).collect()),
            SampleValue::Map(entries) => Value::Object(
                entries
                    .iter()
                    .map(|(key, value)| (key.clone(), value.to_json()))
                    .collect(),
            ),
            SampleValue::Record(record) => Value::Object(
                record
                    .fields
                    .iter()
                    .filter(|field| field.value != SampleValue::Absent)
                    .map(|field| (field.name.clone(), field.value.to_json()))
                    .collect(),
            ),
            SampleValue::Optional(Some(inner)) => inner.to_json(),
        }
    }
}

/// RFC 3339 with a `Z` suffix for UTC, the form used in examples
pub fn format_time(time: &DateTime<FixedOffset>) -> String {
    time.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

fn text_or_time(text: &str) -> SampleValue {
    match DateTime::parse_from_rfc3339(text) {
        Ok(time) => SampleValue::Time(time),
        Err(_) => SampleValue::Text(text.to_string()),
    }
}

fn key_string(key: SampleValue) -> String {
    match key {
        SampleValue::Text(s) | SampleValue::Opaque(s) => s,
        SampleValue::Time(time) => format_time(&time),
        other => match other.to_json() {
            Value::String(s) => s,
            value => value.to_string(),
        },
    }
}

/// Error raised by a `Serialize` impl while being described
#[derive(Debug)]
pub struct SampleError(String);

impl fmt::Display for SampleError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for SampleError {}

impl ser::Error for SampleError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        SampleError(msg.to_string())
    }
}

#[derive(Clone, Copy)]
struct SampleSerializer;

impl ser::Serializer for SampleSerializer {
    type Ok = SampleValue;
    type Error = SampleError;
    type SerializeSeq = SeqCollector;
    type SerializeTuple = SeqCollector;
    type SerializeTupleStruct = SeqCollector;
    type SerializeTupleVariant = TupleVariantCollector;
    type SerializeMap = MapCollector;
    type SerializeStruct = RecordCollector;
    type SerializeStructVariant = StructVariantCollector;

    fn serialize_bool(self, v: bool) -> Result<SampleValue, SampleError> {
        Ok(SampleValue::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<SampleValue, SampleError> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_i16(self, v: i16) -> Result<SampleValue, SampleError> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_i32(self, v: i32) -> Result<SampleValue, SampleError> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_i64(self, v: i64) -> Result<SampleValue, SampleError> {
        Ok(SampleValue::Integer(v.into()))
    }

    fn serialize_i128(self, v: i128) -> Result<SampleValue, SampleError> {
        match i64::try_from(v) {
            Ok(v) => self.serialize_i64(v),
            Err(_) => Ok(SampleValue::Opaque(v.to_string())),
        }
    }

    fn serialize_u8(self, v: u8) -> Result<SampleValue, SampleError> {
        self.serialize_u64(u64::from(v))
    }

    fn serialize_u16(self, v: u16) -> Result<SampleValue, SampleError> {
        self.serialize_u64(u64::from(v))
    }

    fn serialize_u32(self, v: u32) -> Result<SampleValue, SampleError> {
        self.serialize_u64(u64::from(v))
    }

    fn serialize_u64(self, v: u64) -> Result<SampleValue, SampleError> {
        Ok(SampleValue::Integer(v.into()))
    }

    fn serialize_u128(self, v: u128) -> Result<SampleValue, SampleError> {
        match u64::try_from(v) {
            Ok(v) => self.serialize_u64(v),
            Err(_) => Ok(SampleValue::Opaque(v.to_string())),
        }
    }

    fn serialize_f32(self, v: f32) -> Result<SampleValue, SampleError> {
        self.serialize_f64(f64::from(v))
    }

    fn serialize_f64(self, v: f64) -> Result<SampleValue, SampleError> {
        Ok(SampleValue::Float(v))
    }

    fn serialize_char(self, v: char) -> Result<SampleValue, SampleError> {
        Ok(SampleValue::Text(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<SampleValue, SampleError> {
        Ok(text_or_time(v))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<SampleValue, SampleError> {
        Ok(SampleValue::List(
            v.iter().map(|b| SampleValue::Integer((*b).into())).collect(),
        ))
    }

    fn serialize_none(self) -> Result<SampleValue, SampleError> {
        Ok(SampleValue::Optional(None))
    }

    fn serialize_some<T>(self, value: &T) -> Result<SampleValue, SampleError>
    where
        T: ?Sized + Serialize,
    {
        let inner = value.serialize(self)?;
        Ok(SampleValue::Optional(Some(Box::new(inner))))
    }

    fn serialize_unit(self) -> Result<SampleValue, SampleError> {
        Ok(SampleValue::Null)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<SampleValue, SampleError> {
        Ok(SampleValue::Null)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<SampleValue, SampleError> {
        Ok(SampleValue::Text(variant.to_string()))
    }

    fn serialize_newtype_struct<T>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<SampleValue, SampleError>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<SampleValue, SampleError>
    where
        T: ?Sized + Serialize,
    {
        let inner = value.serialize(self)?;
        Ok(SampleValue::Map(vec![(variant.to_string(), inner)]))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SeqCollector, SampleError> {
        Ok(SeqCollector {
            items: Vec::with_capacity(len.unwrap_or(0)),
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<SeqCollector, SampleError> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<SeqCollector, SampleError> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<TupleVariantCollector, SampleError> {
        Ok(TupleVariantCollector {
            variant,
            items: SeqCollector {
                items: Vec::with_capacity(len),
            },
        })
    }

    fn serialize_map(self, len: Option<usize>) -> Result<MapCollector, SampleError> {
        Ok(MapCollector {
            entries: Vec::with_capacity(len.unwrap_or(0)),
            pending_key: None,
        })
    }

    fn serialize_struct(
        self,
        name: &'static str,
        len: usize,
    ) -> Result<RecordCollector, SampleError> {
        Ok(RecordCollector {
            type_name: name,
            fields: Vec::with_capacity(len),
        })
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<StructVariantCollector, SampleError> {
        Ok(StructVariantCollector {
            variant,
            record: RecordCollector {
                type_name: variant,
                fields: Vec::with_capacity(len),
            },
        })
    }
}

struct SeqCollector {
    items: Vec<SampleValue>,
}

impl SeqCollector {
    fn push<T>(&mut self, value: &T) -> Result<(), SampleError>
    where
        T: ?Sized + Serialize,
    {
        self.items.push(value.serialize(SampleSerializer)?);
        Ok(())
    }
}

impl ser::SerializeSeq for SeqCollector {
    type Ok = SampleValue;
    type Error = SampleError;

    fn serialize_element<T>(&mut self, value: &T) -> Result<(), SampleError>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<SampleValue, SampleError> {
        Ok(SampleValue::List(self.items))
    }
}

impl ser::SerializeTuple for SeqCollector {
    type Ok = SampleValue;
    type Error = SampleError;

    fn serialize_element<T>(&mut self, value: &T) -> Result<(), SampleError>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<SampleValue, SampleError> {
        Ok(SampleValue::List(self.items))
    }
}

impl ser::SerializeTupleStruct for SeqCollector {
    type Ok = SampleValue;
    type Error = SampleError;

    fn serialize_field<T>(&mut self, value: &T) -> Result<(), SampleError>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<SampleValue, SampleError> {
        Ok(SampleValue::List(self.items))
    }
}

struct TupleVariantCollector {
    variant: &'static str,
    items: SeqCollector,
}

impl ser::SerializeTupleVariant for TupleVariantCollector {
    type Ok = SampleValue;
    type Error = SampleError;

    fn serialize_field<T>(&mut self, value: &T) -> Result<(), SampleError>
    where
        T: ?Sized + Serialize,
    {
        self.items.push(value)
    }

    fn end(self) -> Result<SampleValue, SampleError> {
        Ok(SampleValue::Map(vec![(
            self.variant.to_string(),
            SampleValue::List(self.items.items),
        )]))
    }
}

struct MapCollector {
    entries: Vec<(String, SampleValue)>,
    pending_key: Option<String>,
}

impl ser::SerializeMap for MapCollector {
    type Ok = SampleValue;
    type Error = SampleError;

    fn serialize_key<T>(&mut self, key: &T) -> Result<(), SampleError>
    where
        T: ?Sized + Serialize,
    {
        self.pending_key = Some(key_string(key.serialize(SampleSerializer)?));
        Ok(())
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<(), SampleError>
    where
        T: ?Sized + Serialize,
    {
        let key = self
            .pending_key
            .take()
            .ok_or_else(|| SampleError("map value serialized before its key".to_string()))?;
        self.entries.push((key, value.serialize(SampleSerializer)?));
        Ok(())
    }

    fn end(self) -> Result<SampleValue, SampleError> {
        Ok(SampleValue::Map(self.entries))
    }
}

struct RecordCollector {
    type_name: &'static str,
    fields: Vec<Field>,
}

impl RecordCollector {
    fn into_record(self) -> Record {
        Record {
            type_name: self.type_name.to_string(),
            fields: self.fields,
        }
    }
}

impl ser::SerializeStruct for RecordCollector {
    type Ok = SampleValue;
    type Error = SampleError;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<(), SampleError>
    where
        T: ?Sized + Serialize,
    {
        let value = value.serialize(SampleSerializer)?;
        let optional = matches!(value, SampleValue::Optional(_));
        self.fields.push(Field {
            name: key.to_string(),
            value,
            optional,
        });
        Ok(())
    }

    fn skip_field(&mut self, key: &'static str) -> Result<(), SampleError> {
        self.fields.push(Field {
            name: key.to_string(),
            value: SampleValue::Absent,
            optional: true,
        });
        Ok(())
    }

    fn end(self) -> Result<SampleValue, SampleError> {
        Ok(SampleValue::Record(self.into_record()))
    }
}

struct StructVariantCollector {
    variant: &'static str,
    record: RecordCollector,
}

impl ser::SerializeStructVariant for StructVariantCollector {
    type Ok = SampleValue;
    type Error = SampleError;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<(), SampleError>
    where
        T: ?Sized + Serialize,
    {
        ser::SerializeStruct::serialize_field(&mut self.record, key, value)
    }

    fn skip_field(&mut self, key: &'static str) -> Result<(), SampleError> {
        ser::SerializeStruct::skip_field(&mut self.record, key)
    }

    fn end(self) -> Result<SampleValue, SampleError> {
        Ok(SampleValue::Map(vec![(
            self.variant.to_string(),
            SampleValue::Record(self.record.into_record()),
        )]))
    }
}
