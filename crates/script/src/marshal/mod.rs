// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Converts native values to boundary values and back.

use luafn_type::{Type, TypeDescriptor, Value};

use crate::{BoundaryValue, error::MarshalError};

mod from;
mod to;

pub use from::from_boundary;
pub use to::to_boundary;

/// Marshaller for one argument or result position.
///
/// Built once per operator instance from the position's declared descriptor
/// and applied to every row. Holds no per-row state.
#[derive(Debug, Clone)]
pub struct Marshaller {
	source: TypeDescriptor,
	target: TypeDescriptor,
}

impl Marshaller {
	/// Validates `source` and caches its normalized form.
	pub fn new(source: &TypeDescriptor) -> Result<Self, MarshalError> {
		validate(source)?;
		Ok(Self {
			source: source.clone(),
			target: source.normalize(),
		})
	}

	/// The descriptor native values arrive with.
	pub fn source(&self) -> &TypeDescriptor {
		&self.source
	}

	/// The normalized descriptor results are converted back to.
	pub fn target(&self) -> &TypeDescriptor {
		&self.target
	}

	pub fn marshal(&self, value: &Value) -> Result<BoundaryValue, MarshalError> {
		to_boundary(value, &self.source)
	}

	pub fn unmarshal(&self, value: BoundaryValue) -> Result<Value, MarshalError> {
		from_boundary(value, &self.target)
	}
}

/// Checks that every position of `ty` can cross the boundary.
///
/// The only shape that cannot is a map whose keys are not a defined
/// primitive: scripting runtimes key their tables by scalars and never by nil.
pub fn validate(ty: &TypeDescriptor) -> Result<(), MarshalError> {
	match ty {
		TypeDescriptor::Primitive(_) => Ok(()),
		TypeDescriptor::List(element) => validate(element),
		TypeDescriptor::Map {
			key,
			value,
		} => {
			match key.as_primitive() {
				Some(Type::Undefined) | None => {
					return Err(MarshalError::UnsupportedKey {
						key: (**key).clone(),
					});
				}
				Some(_) => {}
			}
			validate(value)
		}
		TypeDescriptor::Record(fields) => fields.values().try_for_each(validate),
	}
}
