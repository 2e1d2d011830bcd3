// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Scalar and aggregate functions whose logic lives in a user script.
//!
//! - `lua_exec([type_hint, ]target, arg1, ...)` evaluates a named function of
//!   the environment script (`&name`) or an inline expression per row.
//! - `lua_inject(reducer, value)` folds a group with a binary reducer from the
//!   environment script, split across partial and final aggregation.

use luafn_type::{TypeDescriptor, Value};

pub mod argument;
pub mod error;
pub mod exec;
pub mod inject;
#[cfg(test)]
pub(crate) mod testing;

pub use argument::Argument;
pub use error::{ErrorKind, FunctionError};
pub use exec::LuaExec;
pub use inject::{Accumulator, AggregateMode, InjectEvaluator, PartialRecord};

pub type Result<T> = std::result::Result<T, FunctionError>;

pub trait ScalarFunction {
	/// Normalized type of every value returned by [`ScalarFunction::scalar`].
	fn return_type(&self) -> &TypeDescriptor;

	/// Evaluates one row. `args` holds the row's value arguments only, not the
	/// constant call-site arguments that configured the function.
	fn scalar(&mut self, args: &[Value]) -> Result<Value>;
}

pub trait AggregateFunction {
	fn new_accumulator(&self) -> Accumulator {
		Accumulator::new()
	}

	/// Returns the accumulator to its absent state so it can serve another
	/// group.
	fn reset(&self, acc: &mut Accumulator) {
		acc.reset()
	}

	/// Folds one raw input value into the group's accumulator.
	fn iterate(&mut self, acc: &mut Accumulator, value: &Value) -> Result<()>;

	/// Packages the accumulator for the next aggregation stage.
	fn terminate_partial(&self, acc: &Accumulator) -> Result<Value>;

	/// Folds a partial produced by another instance into the accumulator.
	fn merge(&mut self, acc: &mut Accumulator, partial: &Value) -> Result<()>;

	/// Extracts the group's result, consuming the accumulator.
	fn terminate(&self, acc: Accumulator) -> Result<Value>;
}
