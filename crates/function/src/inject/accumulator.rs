// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use luafn_script::BoundaryValue;

/// Per-group running value of a `lua_inject` aggregation.
///
/// Absent until the group's first non-nil contribution, which is adopted as
/// is; the reducer only runs once there is something to fold into.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Accumulator {
	value: Option<BoundaryValue>,
}

impl Accumulator {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn reset(&mut self) {
		self.value = None;
	}

	pub fn is_absent(&self) -> bool {
		self.value.is_none()
	}

	pub fn value(&self) -> Option<&BoundaryValue> {
		self.value.as_ref()
	}

	pub fn into_value(self) -> Option<BoundaryValue> {
		self.value
	}

	pub(crate) fn take(&mut self) -> Option<BoundaryValue> {
		self.value.take()
	}

	pub(crate) fn set(&mut self, value: BoundaryValue) {
		self.value = Some(value);
	}
}
