// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use crate::TypeDescriptor;

impl TypeDescriptor {
	/// Maps a descriptor to the canonical form handed across the scripting
	/// boundary.
	///
	/// Narrow integer kinds widen to `Int8`, every other primitive is kept.
	/// Lists, maps and records are rebuilt with the same shape, field names and
	/// field order. The result is a fixed point: normalizing it again yields an
	/// equal descriptor.
	pub fn normalize(&self) -> TypeDescriptor {
		match self {
			TypeDescriptor::Primitive(ty) => TypeDescriptor::Primitive(ty.normalize()),
			TypeDescriptor::List(element) => TypeDescriptor::List(Box::new(element.normalize())),
			TypeDescriptor::Map {
				key,
				value,
			} => TypeDescriptor::Map {
				key: Box::new(key.normalize()),
				value: Box::new(value.normalize()),
			},
			TypeDescriptor::Record(fields) => {
				TypeDescriptor::Record(fields.iter().map(|(name, ty)| (name.clone(), ty.normalize())).collect())
			}
		}
	}

	pub fn is_normalized(&self) -> bool {
		self.normalize() == *self
	}
}
