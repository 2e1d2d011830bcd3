// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use luafn_script::{BoundaryValue, LuaRuntime, Marshaller, ScriptConfig, ScriptRuntime, config::CONF_SCRIPT};
use luafn_type::{TypeDescriptor, Value};
use tracing::{info, instrument};

use crate::{Argument, FunctionError, Result, ScalarFunction};

pub const NAME: &str = "lua_exec";

/// Prefix marking a call target as the name of an environment function.
pub const FUNCTION_MARK: char = '&';

enum CallTarget<R: ScriptRuntime> {
	Function {
		name: String,
		receiver: R::Receiver,
	},
	Expression {
		text: String,
		compiled: R::Compiled,
		/// `arg1`, `arg2`, ... one per value argument
		variables: Vec<String>,
	},
}

impl<R: ScriptRuntime> CallTarget<R> {
	fn describe(&self) -> &str {
		match self {
			CallTarget::Function {
				name,
				..
			} => name,
			CallTarget::Expression {
				text,
				..
			} => text,
		}
	}

	fn call(&self, runtime: &mut R, values: &[BoundaryValue]) -> luafn_script::Result<BoundaryValue> {
		match self {
			CallTarget::Function {
				name,
				receiver,
			} => runtime.invoke(receiver, name, values),
			CallTarget::Expression {
				compiled,
				variables,
				..
			} => {
				for (name, value) in variables.iter().zip(values) {
					runtime.bind(name, value)?;
				}
				runtime.run(compiled)
			}
		}
	}
}

/// `lua_exec([type_hint, ]target, arg1, arg2, ...)`
///
/// `target` is either `&name`, calling `name` from the environment script
/// with the row's arguments, or a Lua expression that sees the arguments as
/// `arg1`, `arg2`, ... When `type_hint` is given, its normalized type is the
/// return type. Without it the result is rendered as text, and a nil result
/// stays undefined.
///
/// Everything is resolved in [`LuaExec::bind`]; evaluating a row does no
/// call-site inspection.
pub struct LuaExec<R: ScriptRuntime = LuaRuntime> {
	runtime: R,
	target: CallTarget<R>,
	args: Vec<Marshaller>,
	/// Call-site position of the first value argument
	first_value: usize,
	return_type: TypeDescriptor,
	/// None renders results as text
	result: Option<Marshaller>,
}

impl LuaExec<LuaRuntime> {
	/// Binds against a fresh Lua runtime configured by `config`.
	pub fn new(config: &ScriptConfig, args: &[Argument]) -> Result<Self> {
		let runtime = LuaRuntime::new(config).map_err(|source| FunctionError::Environment {
			source,
		})?;
		Self::bind(runtime, config, args)
	}
}

impl<R: ScriptRuntime> LuaExec<R> {
	#[instrument(name = "function::lua_exec::bind", level = "debug", skip_all)]
	pub fn bind(mut runtime: R, config: &ScriptConfig, args: &[Argument]) -> Result<Self> {
		if args.is_empty() {
			return Err(FunctionError::ArgumentCount {
				function: NAME,
				expected: 1,
				actual: 0,
			});
		}

		let (position, hint) = match args {
			[Argument::Constant(_), ..] => (0, None),
			[hint, Argument::Constant(_), ..] => (1, Some(hint.descriptor())),
			_ => {
				return Err(FunctionError::MissingCallTarget {
					position: 0,
				});
			}
		};
		let Some(text) = args[position].as_constant() else {
			return Err(FunctionError::MissingCallTarget {
				position,
			});
		};

		let result = hint
			.map(|ty| {
				Marshaller::new(&ty).map_err(|source| FunctionError::ArgumentType {
					position: 0,
					source,
				})
			})
			.transpose()?;
		let return_type = result.as_ref().map(|m| m.target().clone()).unwrap_or_else(TypeDescriptor::utf8);

		let first_value = position + 1;
		let marshallers = args[first_value..]
			.iter()
			.enumerate()
			.map(|(idx, arg)| {
				Marshaller::new(&arg.descriptor()).map_err(|source| FunctionError::ArgumentType {
					position: first_value + idx,
					source,
				})
			})
			.collect::<Result<Vec<_>>>()?;

		let target = resolve_target(&mut runtime, config, position, text, marshallers.len())?;

		match &target {
			CallTarget::Function {
				name,
				..
			} => info!(
				"initialized {NAME}, return type is {return_type}, evaluating function '{name}' defined in {CONF_SCRIPT}"
			),
			CallTarget::Expression {
				text,
				..
			} => info!("initialized {NAME}, return type is {return_type}, evaluating expression: {text}"),
		}

		Ok(Self {
			runtime,
			target,
			args: marshallers,
			first_value,
			return_type,
			result,
		})
	}

	/// Renders the call for plan explanations.
	pub fn display(children: &[&str]) -> String {
		format!("{NAME}({})", children.join(", "))
	}
}

fn resolve_target<R: ScriptRuntime>(
	runtime: &mut R,
	config: &ScriptConfig,
	position: usize,
	text: &str,
	arity: usize,
) -> Result<CallTarget<R>> {
	let text = text.trim();
	let invalid = || FunctionError::InvalidCallTarget {
		position,
		target: text.to_string(),
	};

	if let Some(name) = text.strip_prefix(FUNCTION_MARK) {
		let name = name.trim();
		if name.is_empty() {
			return Err(invalid());
		}
		let script = config.script.as_deref().ok_or(FunctionError::MissingEnvironment {
			function: NAME,
			key: CONF_SCRIPT,
		})?;
		let receiver = runtime.run_environment(script).map_err(|source| FunctionError::Environment {
			source,
		})?;
		return Ok(CallTarget::Function {
			name: name.to_string(),
			receiver,
		});
	}

	if text.is_empty() {
		return Err(invalid());
	}
	let compiled = runtime.compile(text).map_err(|source| FunctionError::Compile {
		expression: text.to_string(),
		source,
	})?;
	Ok(CallTarget::Expression {
		text: text.to_string(),
		compiled,
		variables: (1..=arity).map(|idx| format!("arg{idx}")).collect(),
	})
}

impl<R: ScriptRuntime> ScalarFunction for LuaExec<R> {
	fn return_type(&self) -> &TypeDescriptor {
		&self.return_type
	}

	fn scalar(&mut self, args: &[Value]) -> Result<Value> {
		if args.len() != self.args.len() {
			return Err(FunctionError::RowArity {
				expected: self.args.len(),
				actual: args.len(),
			});
		}

		let values = self
			.args
			.iter()
			.zip(args)
			.enumerate()
			.map(|(idx, (marshaller, value))| {
				marshaller.marshal(value).map_err(|source| FunctionError::RowValue {
					position: self.first_value + idx,
					source,
				})
			})
			.collect::<Result<Vec<_>>>()?;

		let raw = self.target.call(&mut self.runtime, &values).map_err(|source| FunctionError::Invocation {
			target: self.target.describe().to_string(),
			source,
		})?;

		match &self.result {
			None => Ok(raw.to_text().map(Value::Utf8).unwrap_or(Value::Undefined)),
			Some(marshaller) => marshaller.unmarshal(raw).map_err(|source| FunctionError::ResultValue {
				target: self.target.describe().to_string(),
				source,
			}),
		}
	}
}
