// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use serde::{Deserialize, Serialize};

pub mod r#type;

/// A single cell value as produced and consumed by the host engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Value {
	/// Value is not defined (think null in common programming languages)
	Undefined,
	/// A boolean: true or false.
	Boolean(bool),
	/// A 1-byte signed integer
	Int1(i8),
	/// A 2-byte signed integer
	Int2(i16),
	/// A 4-byte signed integer
	Int4(i32),
	/// An 8-byte signed integer
	Int8(i64),
	/// A 1-byte unsigned integer
	Uint1(u8),
	/// A 2-byte unsigned integer
	Uint2(u16),
	/// A 4-byte unsigned integer
	Uint4(u32),
	/// A 4-byte floating point
	Float4(f32),
	/// An 8-byte floating point
	Float8(f64),
	/// A UTF-8 encoded text.
	Utf8(String),
	/// A binary large object (BLOB)
	Blob(Vec<u8>),
	/// Days since 1970-01-01
	Date(i32),
	/// Microseconds since 1970-01-01T00:00:00Z
	DateTime(i64),
	/// Elements of a list column
	List(Vec<Value>),
	/// Entries of a map column, in the order the engine produced them
	Map(Vec<(Value, Value)>),
	/// Field values of a record column, matched to fields by position
	Record(Vec<Value>),
}

impl Value {
	pub fn undefined() -> Self {
		Value::Undefined
	}

	pub fn bool(v: impl Into<bool>) -> Self {
		Value::Boolean(v.into())
	}

	pub fn int4(v: impl Into<i32>) -> Self {
		Value::Int4(v.into())
	}

	pub fn int8(v: impl Into<i64>) -> Self {
		Value::Int8(v.into())
	}

	pub fn float8(v: impl Into<f64>) -> Self {
		Value::Float8(v.into())
	}

	pub fn utf8(v: impl Into<String>) -> Self {
		Value::Utf8(v.into())
	}

	pub fn blob(v: impl Into<Vec<u8>>) -> Self {
		Value::Blob(v.into())
	}

	pub fn is_undefined(&self) -> bool {
		matches!(self, Value::Undefined)
	}

	/// Short name of the variant, used in conversion errors.
	pub fn kind(&self) -> &'static str {
		match self {
			Value::Undefined => "Undefined",
			Value::Boolean(_) => "Boolean",
			Value::Int1(_) => "Int1",
			Value::Int2(_) => "Int2",
			Value::Int4(_) => "Int4",
			Value::Int8(_) => "Int8",
			Value::Uint1(_) => "Uint1",
			Value::Uint2(_) => "Uint2",
			Value::Uint4(_) => "Uint4",
			Value::Float4(_) => "Float4",
			Value::Float8(_) => "Float8",
			Value::Utf8(_) => "Utf8",
			Value::Blob(_) => "Blob",
			Value::Date(_) => "Date",
			Value::DateTime(_) => "DateTime",
			Value::List(_) => "List",
			Value::Map(_) => "Map",
			Value::Record(_) => "Record",
		}
	}
}

impl From<bool> for Value {
	fn from(v: bool) -> Self {
		Value::Boolean(v)
	}
}

impl From<i32> for Value {
	fn from(v: i32) -> Self {
		Value::Int4(v)
	}
}

impl From<i64> for Value {
	fn from(v: i64) -> Self {
		Value::Int8(v)
	}
}

impl From<f64> for Value {
	fn from(v: f64) -> Self {
		Value::Float8(v)
	}
}

impl From<&str> for Value {
	fn from(v: &str) -> Self {
		Value::Utf8(v.to_string())
	}
}

impl From<String> for Value {
	fn from(v: String) -> Self {
		Value::Utf8(v)
	}
}

impl<T: Into<Value>> From<Option<T>> for Value {
	fn from(v: Option<T>) -> Self {
		v.map(Into::into).unwrap_or(Value::Undefined)
	}
}
