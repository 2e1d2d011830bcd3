// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use luafn_type::{Type, TypeDescriptor, Value};

use crate::{BoundaryValue, error::MarshalError};

/// Converts a native value of type `ty` into its boundary form.
///
/// `Undefined` becomes `Nil` at any depth. Every integer kind, `Date` and
/// `DateTime` travel as `Int`; both float kinds travel as `Float`.
pub fn to_boundary(value: &Value, ty: &TypeDescriptor) -> Result<BoundaryValue, MarshalError> {
	if value.is_undefined() {
		return Ok(BoundaryValue::Nil);
	}

	match ty {
		TypeDescriptor::Primitive(kind) => primitive(value, *kind, ty),
		TypeDescriptor::List(element) => match value {
			Value::List(items) => Ok(BoundaryValue::Sequence(
				items.iter().map(|item| to_boundary(item, element)).collect::<Result<_, _>>()?,
			)),
			other => Err(mismatch(ty, other)),
		},
		TypeDescriptor::Map {
			key,
			value: value_ty,
		} => match value {
			Value::Map(entries) => {
				let mut result = Vec::with_capacity(entries.len());
				for (k, v) in entries {
					let k = to_boundary(k, key)?;
					if k.is_nil() {
						return Err(MarshalError::NilKey);
					}
					result.push((k, to_boundary(v, value_ty)?));
				}
				Ok(BoundaryValue::Mapping(result))
			}
			other => Err(mismatch(ty, other)),
		},
		TypeDescriptor::Record(fields) => match value {
			Value::Record(values) => {
				if values.len() != fields.len() {
					return Err(MarshalError::FieldCount {
						expected: ty.clone(),
						actual: values.len(),
					});
				}
				Ok(BoundaryValue::Tuple(
					fields.iter()
						.zip(values)
						.map(|((name, field_ty), v)| Ok((name.clone(), to_boundary(v, field_ty)?)))
						.collect::<Result<_, MarshalError>>()?,
				))
			}
			other => Err(mismatch(ty, other)),
		},
	}
}

fn primitive(value: &Value, kind: Type, ty: &TypeDescriptor) -> Result<BoundaryValue, MarshalError> {
	let result = match (kind, value) {
		(Type::Boolean, Value::Boolean(v)) => BoundaryValue::Bool(*v),
		(Type::Int1, Value::Int1(v)) => BoundaryValue::Int(i64::from(*v)),
		(Type::Int2, Value::Int2(v)) => BoundaryValue::Int(i64::from(*v)),
		(Type::Int4, Value::Int4(v)) => BoundaryValue::Int(i64::from(*v)),
		(Type::Int8, Value::Int8(v)) => BoundaryValue::Int(*v),
		(Type::Uint1, Value::Uint1(v)) => BoundaryValue::Int(i64::from(*v)),
		(Type::Uint2, Value::Uint2(v)) => BoundaryValue::Int(i64::from(*v)),
		(Type::Uint4, Value::Uint4(v)) => BoundaryValue::Int(i64::from(*v)),
		(Type::Float4, Value::Float4(v)) => BoundaryValue::Float(f64::from(*v)),
		(Type::Float8, Value::Float8(v)) => BoundaryValue::Float(*v),
		(Type::Utf8, Value::Utf8(v)) => BoundaryValue::Text(v.clone()),
		(Type::Blob, Value::Blob(v)) => BoundaryValue::Bytes(v.clone()),
		(Type::Date, Value::Date(v)) => BoundaryValue::Int(i64::from(*v)),
		(Type::DateTime, Value::DateTime(v)) => BoundaryValue::Int(*v),
		(_, other) => return Err(mismatch(ty, other)),
	};
	Ok(result)
}

fn mismatch(ty: &TypeDescriptor, value: &Value) -> MarshalError {
	MarshalError::Mismatch {
		expected: ty.clone(),
		actual: value.kind(),
	}
}
