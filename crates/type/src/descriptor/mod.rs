// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::fmt::{Display, Formatter};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::Type;

mod normalize;

/// Describes the shape of a column: a primitive kind or a nesting of lists,
/// maps and records over primitive kinds.
///
/// Record fields keep their declaration order. Values of a record are matched
/// to fields by position, the names only travel along for display and for
/// runtimes that address fields by name.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum TypeDescriptor {
	Primitive(Type),
	List(Box<TypeDescriptor>),
	Map {
		key: Box<TypeDescriptor>,
		value: Box<TypeDescriptor>,
	},
	Record(IndexMap<String, TypeDescriptor>),
}

impl TypeDescriptor {
	pub fn primitive(ty: Type) -> Self {
		TypeDescriptor::Primitive(ty)
	}

	pub fn list(element: TypeDescriptor) -> Self {
		TypeDescriptor::List(Box::new(element))
	}

	pub fn map(key: TypeDescriptor, value: TypeDescriptor) -> Self {
		TypeDescriptor::Map {
			key: Box::new(key),
			value: Box::new(value),
		}
	}

	pub fn record<N: Into<String>>(fields: impl IntoIterator<Item = (N, TypeDescriptor)>) -> Self {
		TypeDescriptor::Record(fields.into_iter().map(|(name, ty)| (name.into(), ty)).collect())
	}

	pub fn utf8() -> Self {
		TypeDescriptor::Primitive(Type::Utf8)
	}

	pub fn as_primitive(&self) -> Option<Type> {
		match self {
			TypeDescriptor::Primitive(ty) => Some(*ty),
			_ => None,
		}
	}

	pub fn is_primitive(&self) -> bool {
		matches!(self, TypeDescriptor::Primitive(_))
	}

	/// Looks up a record field by name, returning its position and type.
	pub fn field(&self, name: &str) -> Option<(usize, &TypeDescriptor)> {
		match self {
			TypeDescriptor::Record(fields) => fields.get_full(name).map(|(idx, _, ty)| (idx, ty)),
			_ => None,
		}
	}
}

// `IndexMap` equality ignores insertion order, records must not.
impl PartialEq for TypeDescriptor {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(TypeDescriptor::Primitive(l), TypeDescriptor::Primitive(r)) => l == r,
			(TypeDescriptor::List(l), TypeDescriptor::List(r)) => l == r,
			(
				TypeDescriptor::Map {
					key: lk,
					value: lv,
				},
				TypeDescriptor::Map {
					key: rk,
					value: rv,
				},
			) => lk == rk && lv == rv,
			(TypeDescriptor::Record(l), TypeDescriptor::Record(r)) => l.len() == r.len() && l.iter().eq(r.iter()),
			_ => false,
		}
	}
}

impl Eq for TypeDescriptor {}

impl From<Type> for TypeDescriptor {
	fn from(ty: Type) -> Self {
		TypeDescriptor::Primitive(ty)
	}
}

impl Display for TypeDescriptor {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			TypeDescriptor::Primitive(ty) => Display::fmt(ty, f),
			TypeDescriptor::List(element) => write!(f, "List<{element}>"),
			TypeDescriptor::Map {
				key,
				value,
			} => write!(f, "Map<{key}, {value}>"),
			TypeDescriptor::Record(fields) => {
				f.write_str("Record<")?;
				for (idx, (name, ty)) in fields.iter().enumerate() {
					if idx > 0 {
						f.write_str(", ")?;
					}
					write!(f, "{name}: {ty}")?;
				}
				f.write_str(">")
			}
		}
	}
}
