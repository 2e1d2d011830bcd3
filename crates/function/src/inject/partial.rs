// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use luafn_script::BoundaryValue;
use luafn_type::{Type, TypeDescriptor};
use serde::{Deserialize, Serialize};

use crate::{FunctionError, Result};

/// Field naming the reducer inside a partial aggregation record.
pub const PARTIAL_OP: &str = "op";
/// Field carrying the accumulated value inside a partial aggregation record.
pub const PARTIAL_VAL: &str = "val";

/// The `Record<op: Utf8, val: T>` shape of a partial aggregation record whose
/// accumulated values have type `val`.
pub fn partial_descriptor(val: TypeDescriptor) -> TypeDescriptor {
	TypeDescriptor::record([(PARTIAL_OP, TypeDescriptor::primitive(Type::Utf8)), (PARTIAL_VAL, val)])
}

/// Intermediate state passed between aggregation stages.
///
/// `op` is None when the producing stage never learned its reducer, which
/// only happens for an intermediate stage that saw no partials. A nil `val`
/// means the producing group was empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartialRecord {
	pub op: Option<String>,
	pub val: BoundaryValue,
}

impl PartialRecord {
	pub fn new(op: Option<String>, val: BoundaryValue) -> Self {
		Self {
			op,
			val,
		}
	}

	pub fn encode(&self) -> Result<Vec<u8>> {
		Ok(postcard::to_allocvec(self)?)
	}

	pub fn decode(bytes: &[u8]) -> Result<Self> {
		Ok(postcard::from_bytes(bytes)?)
	}

	/// Field-named shape, so it lands in records of either field order.
	pub fn into_boundary(self) -> BoundaryValue {
		let op = self.op.map(BoundaryValue::Text).unwrap_or(BoundaryValue::Nil);
		BoundaryValue::Mapping(vec![
			(BoundaryValue::from(PARTIAL_OP), op),
			(BoundaryValue::from(PARTIAL_VAL), self.val),
		])
	}

	/// Reads the `op` and `val` fields of a marshalled partial record.
	pub fn from_boundary(value: BoundaryValue, position: usize) -> Result<Self> {
		let malformed = |actual: &str| FunctionError::PartialType {
			position,
			actual: actual.to_string(),
		};

		let fields = match value {
			BoundaryValue::Tuple(fields) => fields,
			BoundaryValue::Nil => return Ok(Self::new(None, BoundaryValue::Nil)),
			other => return Err(malformed(other.kind())),
		};

		let mut op = None;
		let mut val = BoundaryValue::Nil;
		for (name, field) in fields {
			match name.as_str() {
				PARTIAL_OP => {
					op = match field {
						BoundaryValue::Text(text) => Some(text),
						BoundaryValue::Nil => None,
						other => return Err(malformed(other.kind())),
					}
				}
				PARTIAL_VAL => val = field,
				_ => {}
			}
		}
		Ok(Self::new(op, val))
	}
}
