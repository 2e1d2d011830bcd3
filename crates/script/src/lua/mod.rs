// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Embedded Lua 5.4 runtime.

use mlua::{Function, Lua, MultiValue, RegistryKey, Table, Value as LuaValue};
use tracing::{debug, instrument};

use crate::{BoundaryValue, Result, ScriptConfig, ScriptError, ScriptRuntime};

mod convert;

pub use convert::MAX_DEPTH;
use convert::{from_lua, into_lua};

/// A private Lua state per operator instance.
///
/// Receivers and compiled expressions are anchored in the Lua registry, so
/// they stay valid for as long as the runtime lives.
pub struct LuaRuntime {
	lua: Lua,
}

impl LuaRuntime {
	#[instrument(name = "script::lua::new", level = "debug", skip_all)]
	pub fn new(config: &ScriptConfig) -> Result<Self> {
		let lua = Lua::new();

		if let Some(dir) = &config.load_path {
			let package: Table = lua.globals().get("package")?;
			let current: String = package.get("path")?;
			package.set("path", format!("{}/?.lua;{}", dir.display(), current))?;
		}

		debug!("initialized lua runtime ({})", lua_version(&lua));
		Ok(Self {
			lua,
		})
	}
}

fn lua_version(lua: &Lua) -> String {
	lua.globals().get::<_, String>("_VERSION").unwrap_or_else(|_| "unknown".to_string())
}

impl ScriptRuntime for LuaRuntime {
	type Receiver = RegistryKey;
	type Compiled = RegistryKey;

	/// A chunk returning a table makes that table the receiver; otherwise the
	/// functions are looked up on the globals the chunk defined.
	fn run_environment(&mut self, source: &str) -> Result<RegistryKey> {
		let result: LuaValue = self.lua.load(source).set_name("environment").eval()?;
		let receiver = match result {
			LuaValue::Table(table) => table,
			_ => self.lua.globals(),
		};
		Ok(self.lua.create_registry_value(receiver)?)
	}

	fn invoke(&mut self, receiver: &RegistryKey, function: &str, args: &[BoundaryValue]) -> Result<BoundaryValue> {
		let receiver: Table = self.lua.registry_value(receiver)?;
		let func = match receiver.get::<_, LuaValue>(function)? {
			LuaValue::Function(func) => func,
			_ => {
				return Err(ScriptError::UnknownFunction {
					name: function.to_string(),
				});
			}
		};

		let args = args.iter().map(|arg| into_lua(&self.lua, arg, 0)).collect::<Result<Vec<_>>>()?;
		let result: LuaValue = func.call(MultiValue::from_vec(args))?;
		from_lua(result, 0)
	}

	/// Tries `text` as an expression first, then as a block of statements.
	fn compile(&mut self, expression: &str) -> Result<RegistryKey> {
		let func: Function = match self.lua.load(format!("return {expression}")).set_name("expression").into_function()
		{
			Ok(func) => func,
			Err(_) => self.lua.load(expression).set_name("expression").into_function()?,
		};
		Ok(self.lua.create_registry_value(func)?)
	}

	fn bind(&mut self, name: &str, value: &BoundaryValue) -> Result<()> {
		let value = into_lua(&self.lua, value, 0)?;
		self.lua.globals().set(name, value)?;
		Ok(())
	}

	fn run(&mut self, compiled: &RegistryKey) -> Result<BoundaryValue> {
		let func: Function = self.lua.registry_value(compiled)?;
		let result: LuaValue = func.call(())?;
		from_lua(result, 0)
	}
}
