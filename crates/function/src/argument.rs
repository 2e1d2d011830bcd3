// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use luafn_type::TypeDescriptor;

/// One argument of a function call site, as seen at plan time.
#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
	/// A text literal whose value is known before any row is evaluated.
	Constant(String),
	/// A per-row input of the given type.
	Column(TypeDescriptor),
}

impl Argument {
	pub fn constant(text: impl Into<String>) -> Self {
		Argument::Constant(text.into())
	}

	pub fn column(ty: impl Into<TypeDescriptor>) -> Self {
		Argument::Column(ty.into())
	}

	pub fn as_constant(&self) -> Option<&str> {
		match self {
			Argument::Constant(text) => Some(text),
			Argument::Column(_) => None,
		}
	}

	/// Type of the values this argument yields; constants are text.
	pub fn descriptor(&self) -> TypeDescriptor {
		match self {
			Argument::Constant(_) => TypeDescriptor::utf8(),
			Argument::Column(ty) => ty.clone(),
		}
	}
}
