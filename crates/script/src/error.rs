// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use luafn_type::{Type, TypeDescriptor};

/// Conversion between native values and boundary values failed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MarshalError {
	#[error("expected a value of type {expected}, got {actual}")]
	Mismatch {
		expected: TypeDescriptor,
		actual: &'static str,
	},

	#[error("{value} is out of range for {target}")]
	OutOfRange {
		value: String,
		target: Type,
	},

	#[error("record {expected} has {} fields, got {actual}", field_count(.expected))]
	FieldCount {
		expected: TypeDescriptor,
		actual: usize,
	},

	#[error("map keys must be a defined primitive type, got {key}")]
	UnsupportedKey {
		key: TypeDescriptor,
	},

	#[error("map keys cannot be nil")]
	NilKey,
}

fn field_count(ty: &TypeDescriptor) -> usize {
	match ty {
		TypeDescriptor::Record(fields) => fields.len(),
		_ => 0,
	}
}

/// The scripting runtime rejected a call or produced an unusable result.
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
	#[error("lua error: {0}")]
	Lua(#[from] mlua::Error),

	#[error("function '{name}' is not defined by the environment script")]
	UnknownFunction {
		name: String,
	},

	#[error("cannot pass a {kind} value across the script boundary")]
	UnsupportedValue {
		kind: &'static str,
	},

	#[error("value nesting exceeds {max} levels")]
	NestingTooDeep {
		max: usize,
	},

	#[error(transparent)]
	Marshal(#[from] MarshalError),
}
