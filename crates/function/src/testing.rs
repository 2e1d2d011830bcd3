// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! A scripting runtime double whose functions are Rust closures and which
//! records every invocation.

use std::{cell::RefCell, collections::HashMap, rc::Rc};

use luafn_script::{BoundaryValue, Result, ScriptError, ScriptRuntime};

type Handler = Box<dyn Fn(&[BoundaryValue]) -> Result<BoundaryValue>>;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Call {
	pub function: String,
	pub args: Vec<BoundaryValue>,
}

pub(crate) type CallLog = Rc<RefCell<Vec<Call>>>;

pub(crate) struct RecordingRuntime {
	functions: HashMap<String, Handler>,
	variables: HashMap<String, BoundaryValue>,
	calls: CallLog,
}

impl RecordingRuntime {
	pub fn new() -> Self {
		Self {
			functions: HashMap::new(),
			variables: HashMap::new(),
			calls: CallLog::default(),
		}
	}

	pub fn function(
		mut self,
		name: &str,
		handler: impl Fn(&[BoundaryValue]) -> Result<BoundaryValue> + 'static,
	) -> Self {
		self.functions.insert(name.to_string(), Box::new(handler));
		self
	}

	/// A runtime defining `sum(memo, arg) = memo + arg` over integers.
	pub fn with_sum() -> Self {
		Self::new().function("sum", |args| match args {
			[BoundaryValue::Int(memo), BoundaryValue::Int(arg)] => Ok(BoundaryValue::Int(memo + arg)),
			other => Err(ScriptError::UnsupportedValue {
				kind: other.first().map(BoundaryValue::kind).unwrap_or("nil"),
			}),
		})
	}

	/// Shared handle on the invocation log, usable after the runtime moved
	/// into an operator.
	pub fn calls(&self) -> CallLog {
		self.calls.clone()
	}
}

impl ScriptRuntime for RecordingRuntime {
	type Receiver = ();
	type Compiled = String;

	fn run_environment(&mut self, _source: &str) -> Result<()> {
		Ok(())
	}

	fn invoke(&mut self, _receiver: &(), function: &str, args: &[BoundaryValue]) -> Result<BoundaryValue> {
		self.calls.borrow_mut().push(Call {
			function: function.to_string(),
			args: args.to_vec(),
		});
		let handler = self.functions.get(function).ok_or_else(|| ScriptError::UnknownFunction {
			name: function.to_string(),
		})?;
		handler(args)
	}

	fn compile(&mut self, expression: &str) -> Result<String> {
		Ok(expression.to_string())
	}

	fn bind(&mut self, name: &str, value: &BoundaryValue) -> Result<()> {
		self.variables.insert(name.to_string(), value.clone());
		Ok(())
	}

	/// Evaluates a bare variable name; anything else yields nil.
	fn run(&mut self, compiled: &String) -> Result<BoundaryValue> {
		Ok(self.variables.get(compiled).cloned().unwrap_or(BoundaryValue::Nil))
	}
}
