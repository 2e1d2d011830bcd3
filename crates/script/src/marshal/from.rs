// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use luafn_type::{Type, TypeDescriptor, Value};

use crate::{BoundaryValue, error::MarshalError};

/// Converts a boundary value back into a native value of type `ty`.
///
/// Scripting runtimes blur some distinctions the engine keeps, so a few
/// shapes are accepted leniently:
/// - integral floats for integer kinds, integers for float kinds;
/// - text and bytes for one another when the bytes are valid UTF-8;
/// - an empty sequence or mapping for any container;
/// - a sequence for a map, keyed 1, 2, 3, ...;
/// - a sequence (positional) or a mapping (by field name) for a record.
pub fn from_boundary(value: BoundaryValue, ty: &TypeDescriptor) -> Result<Value, MarshalError> {
	if value.is_nil() {
		return Ok(Value::Undefined);
	}

	match ty {
		TypeDescriptor::Primitive(kind) => primitive(value, *kind, ty),
		TypeDescriptor::List(element) => match value {
			BoundaryValue::Sequence(items) => Ok(Value::List(
				items.into_iter().map(|item| from_boundary(item, element)).collect::<Result<_, _>>()?,
			)),
			BoundaryValue::Mapping(entries) if entries.is_empty() => Ok(Value::List(vec![])),
			other => Err(mismatch(ty, &other)),
		},
		TypeDescriptor::Map {
			key,
			value: value_ty,
		} => {
			let entries = match value {
				BoundaryValue::Mapping(entries) => entries,
				BoundaryValue::Sequence(items) => {
					items.into_iter().zip(1i64..).map(|(item, idx)| (BoundaryValue::Int(idx), item)).collect()
				}
				other => return Err(mismatch(ty, &other)),
			};
			let mut result = Vec::with_capacity(entries.len());
			for (k, v) in entries {
				result.push((from_boundary(k, key)?, from_boundary(v, value_ty)?));
			}
			Ok(Value::Map(result))
		}
		TypeDescriptor::Record(fields) => match value {
			BoundaryValue::Tuple(values) => {
				positional(values.into_iter().map(|(_, v)| v).collect(), fields.values(), ty)
			}
			BoundaryValue::Sequence(values) if values.is_empty() => {
				Ok(Value::Record(vec![Value::Undefined; fields.len()]))
			}
			BoundaryValue::Sequence(values) => positional(values, fields.values(), ty),
			BoundaryValue::Mapping(mut entries) => {
				let mut result = Vec::with_capacity(fields.len());
				for (name, field_ty) in fields {
					let found = entries
						.iter()
						.position(|(k, _)| matches!(k, BoundaryValue::Text(text) if text == name));
					match found {
						Some(idx) => {
							let (_, v) = entries.swap_remove(idx);
							result.push(from_boundary(v, field_ty)?);
						}
						None => result.push(Value::Undefined),
					}
				}
				Ok(Value::Record(result))
			}
			other => Err(mismatch(ty, &other)),
		},
	}
}

fn positional<'a>(
	values: Vec<BoundaryValue>,
	fields: impl ExactSizeIterator<Item = &'a TypeDescriptor>,
	ty: &TypeDescriptor,
) -> Result<Value, MarshalError> {
	if values.len() != fields.len() {
		return Err(MarshalError::FieldCount {
			expected: ty.clone(),
			actual: values.len(),
		});
	}
	Ok(Value::Record(
		values.into_iter().zip(fields).map(|(v, field_ty)| from_boundary(v, field_ty)).collect::<Result<_, _>>()?,
	))
}

fn primitive(value: BoundaryValue, kind: Type, ty: &TypeDescriptor) -> Result<Value, MarshalError> {
	let result = match (kind, value) {
		(Type::Boolean, BoundaryValue::Bool(v)) => Value::Boolean(v),
		(Type::Int1, v) => Value::Int1(narrow(integer(v, ty)?, kind)?),
		(Type::Int2, v) => Value::Int2(narrow(integer(v, ty)?, kind)?),
		(Type::Int4, v) => Value::Int4(narrow(integer(v, ty)?, kind)?),
		(Type::Int8, v) => Value::Int8(integer(v, ty)?),
		(Type::Uint1, v) => Value::Uint1(narrow(integer(v, ty)?, kind)?),
		(Type::Uint2, v) => Value::Uint2(narrow(integer(v, ty)?, kind)?),
		(Type::Uint4, v) => Value::Uint4(narrow(integer(v, ty)?, kind)?),
		(Type::Date, v) => Value::Date(narrow(integer(v, ty)?, kind)?),
		(Type::DateTime, v) => Value::DateTime(integer(v, ty)?),
		(Type::Float4, v) => Value::Float4(single(float(v, ty)?)?),
		(Type::Float8, v) => Value::Float8(float(v, ty)?),
		(Type::Utf8, BoundaryValue::Text(v)) => Value::Utf8(v),
		(Type::Utf8, BoundaryValue::Bytes(v)) => match String::from_utf8(v) {
			Ok(text) => Value::Utf8(text),
			Err(_) => {
				return Err(MarshalError::Mismatch {
					expected: ty.clone(),
					actual: "non UTF-8 bytes",
				});
			}
		},
		(Type::Blob, BoundaryValue::Bytes(v)) => Value::Blob(v),
		(Type::Blob, BoundaryValue::Text(v)) => Value::Blob(v.into_bytes()),
		(_, other) => return Err(mismatch(ty, &other)),
	};
	Ok(result)
}

fn integer(value: BoundaryValue, ty: &TypeDescriptor) -> Result<i64, MarshalError> {
	match value {
		BoundaryValue::Int(v) => Ok(v),
		BoundaryValue::Float(v) if v.fract() == 0.0 && v >= i64::MIN as f64 && v < i64::MAX as f64 => Ok(v as i64),
		other => Err(mismatch(ty, &other)),
	}
}

fn float(value: BoundaryValue, ty: &TypeDescriptor) -> Result<f64, MarshalError> {
	match value {
		BoundaryValue::Float(v) => Ok(v),
		BoundaryValue::Int(v) => Ok(v as f64),
		other => Err(mismatch(ty, &other)),
	}
}

fn single(value: f64) -> Result<f32, MarshalError> {
	if value.is_finite() && value.abs() > f32::MAX as f64 {
		return Err(MarshalError::OutOfRange {
			value: value.to_string(),
			target: Type::Float4,
		});
	}
	Ok(value as f32)
}

fn narrow<T: TryFrom<i64>>(value: i64, target: Type) -> Result<T, MarshalError> {
	T::try_from(value).map_err(|_| MarshalError::OutOfRange {
		value: value.to_string(),
		target,
	})
}

fn mismatch(ty: &TypeDescriptor, value: &BoundaryValue) -> MarshalError {
	MarshalError::Mismatch {
		expected: ty.clone(),
		actual: value.kind(),
	}
}
