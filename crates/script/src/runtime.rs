// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use crate::{BoundaryValue, Result};

/// The narrow interface an embedded scripting runtime is driven through.
///
/// One runtime instance belongs to exactly one operator instance and is only
/// ever called from the thread evaluating that operator.
pub trait ScriptRuntime {
	/// Object named functions are looked up on.
	type Receiver;
	/// A precompiled expression.
	type Compiled;

	/// Evaluates the environment script once and returns the receiver of
	/// later [`invoke`](ScriptRuntime::invoke) calls.
	fn run_environment(&mut self, source: &str) -> Result<Self::Receiver>;

	fn invoke(
		&mut self,
		receiver: &Self::Receiver,
		function: &str,
		args: &[BoundaryValue],
	) -> Result<BoundaryValue>;

	fn compile(&mut self, expression: &str) -> Result<Self::Compiled>;

	/// Binds `value` to a variable visible to compiled expressions.
	fn bind(&mut self, name: &str, value: &BoundaryValue) -> Result<()>;

	fn run(&mut self, compiled: &Self::Compiled) -> Result<BoundaryValue>;
}
