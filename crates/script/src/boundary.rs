// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::fmt::{self, Display, Formatter, Write};

use serde::{Deserialize, Serialize};

/// Runtime-agnostic value crossing into and out of a scripting runtime.
///
/// Built fresh for every call; it never borrows from engine-owned buffers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum BoundaryValue {
	Nil,
	Bool(bool),
	Int(i64),
	Float(f64),
	Text(String),
	Bytes(Vec<u8>),
	Sequence(Vec<BoundaryValue>),
	Mapping(Vec<(BoundaryValue, BoundaryValue)>),
	/// Ordered record fields
	Tuple(Vec<(String, BoundaryValue)>),
}

impl BoundaryValue {
	pub fn is_nil(&self) -> bool {
		matches!(self, BoundaryValue::Nil)
	}

	pub fn kind(&self) -> &'static str {
		match self {
			BoundaryValue::Nil => "nil",
			BoundaryValue::Bool(_) => "bool",
			BoundaryValue::Int(_) => "int",
			BoundaryValue::Float(_) => "float",
			BoundaryValue::Text(_) => "text",
			BoundaryValue::Bytes(_) => "bytes",
			BoundaryValue::Sequence(_) => "sequence",
			BoundaryValue::Mapping(_) => "mapping",
			BoundaryValue::Tuple(_) => "tuple",
		}
	}

	/// Textual rendering of a script result, `None` when the result is nil.
	pub fn to_text(&self) -> Option<String> {
		match self {
			BoundaryValue::Nil => None,
			other => Some(other.to_string()),
		}
	}
}

impl From<i64> for BoundaryValue {
	fn from(v: i64) -> Self {
		BoundaryValue::Int(v)
	}
}

impl From<f64> for BoundaryValue {
	fn from(v: f64) -> Self {
		BoundaryValue::Float(v)
	}
}

impl From<bool> for BoundaryValue {
	fn from(v: bool) -> Self {
		BoundaryValue::Bool(v)
	}
}

impl From<&str> for BoundaryValue {
	fn from(v: &str) -> Self {
		BoundaryValue::Text(v.to_string())
	}
}

impl From<String> for BoundaryValue {
	fn from(v: String) -> Self {
		BoundaryValue::Text(v)
	}
}

// Top-level text is written raw; nested text is quoted so that containers
// stay readable.
impl Display for BoundaryValue {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			BoundaryValue::Text(s) => f.write_str(s),
			BoundaryValue::Bytes(b) => f.write_str(&String::from_utf8_lossy(b)),
			other => write_nested(f, other),
		}
	}
}

fn write_nested(f: &mut Formatter<'_>, value: &BoundaryValue) -> fmt::Result {
	match value {
		BoundaryValue::Nil => f.write_str("nil"),
		BoundaryValue::Bool(b) => write!(f, "{b}"),
		BoundaryValue::Int(i) => write!(f, "{i}"),
		BoundaryValue::Float(v) => {
			if v.is_finite() && v.fract() == 0.0 {
				write!(f, "{v:.1}")
			} else {
				write!(f, "{v}")
			}
		}
		BoundaryValue::Text(s) => write!(f, "{s:?}"),
		BoundaryValue::Bytes(b) => write!(f, "{:?}", String::from_utf8_lossy(b)),
		BoundaryValue::Sequence(items) => {
			f.write_char('[')?;
			for (idx, item) in items.iter().enumerate() {
				if idx > 0 {
					f.write_str(", ")?;
				}
				write_nested(f, item)?;
			}
			f.write_char(']')
		}
		BoundaryValue::Mapping(entries) => {
			f.write_char('{')?;
			for (idx, (key, value)) in entries.iter().enumerate() {
				if idx > 0 {
					f.write_str(", ")?;
				}
				write_nested(f, key)?;
				f.write_str(": ")?;
				write_nested(f, value)?;
			}
			f.write_char('}')
		}
		BoundaryValue::Tuple(fields) => {
			f.write_char('{')?;
			for (idx, (name, value)) in fields.iter().enumerate() {
				if idx > 0 {
					f.write_str(", ")?;
				}
				write!(f, "{name}: ")?;
				write_nested(f, value)?;
			}
			f.write_char('}')
		}
	}
}
