// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use mlua::{Lua, Table, Value as LuaValue};

use crate::{BoundaryValue, Result, ScriptError, error::MarshalError};

/// Deepest nesting accepted in either direction. Lua tables may be cyclic.
pub const MAX_DEPTH: usize = 64;

pub(crate) fn into_lua<'lua>(lua: &'lua Lua, value: &BoundaryValue, depth: usize) -> Result<LuaValue<'lua>> {
	if depth > MAX_DEPTH {
		return Err(ScriptError::NestingTooDeep {
			max: MAX_DEPTH,
		});
	}

	let result = match value {
		BoundaryValue::Nil => LuaValue::Nil,
		BoundaryValue::Bool(v) => LuaValue::Boolean(*v),
		BoundaryValue::Int(v) => LuaValue::Integer(*v),
		BoundaryValue::Float(v) => LuaValue::Number(*v),
		BoundaryValue::Text(v) => LuaValue::String(lua.create_string(v)?),
		BoundaryValue::Bytes(v) => LuaValue::String(lua.create_string(v)?),
		BoundaryValue::Sequence(items) => {
			let table = lua.create_table()?;
			for (idx, item) in items.iter().enumerate() {
				table.raw_set(idx as i64 + 1, into_lua(lua, item, depth + 1)?)?;
			}
			LuaValue::Table(table)
		}
		BoundaryValue::Mapping(entries) => {
			let table = lua.create_table()?;
			for (key, value) in entries {
				let key = into_lua(lua, key, depth + 1)?;
				if key.is_nil() {
					return Err(MarshalError::NilKey.into());
				}
				table.raw_set(key, into_lua(lua, value, depth + 1)?)?;
			}
			LuaValue::Table(table)
		}
		BoundaryValue::Tuple(fields) => {
			let table = lua.create_table()?;
			for (name, value) in fields {
				table.raw_set(name.as_str(), into_lua(lua, value, depth + 1)?)?;
			}
			LuaValue::Table(table)
		}
	};
	Ok(result)
}

pub(crate) fn from_lua(value: LuaValue<'_>, depth: usize) -> Result<BoundaryValue> {
	if depth > MAX_DEPTH {
		return Err(ScriptError::NestingTooDeep {
			max: MAX_DEPTH,
		});
	}

	let result = match value {
		LuaValue::Nil => BoundaryValue::Nil,
		LuaValue::Boolean(v) => BoundaryValue::Bool(v),
		LuaValue::Integer(v) => BoundaryValue::Int(v),
		LuaValue::Number(v) => BoundaryValue::Float(v),
		LuaValue::String(s) => match std::str::from_utf8(s.as_bytes()) {
			Ok(text) => BoundaryValue::Text(text.to_string()),
			Err(_) => BoundaryValue::Bytes(s.as_bytes().to_vec()),
		},
		LuaValue::Table(table) => from_table(table, depth)?,
		other => {
			return Err(ScriptError::UnsupportedValue {
				kind: other.type_name(),
			});
		}
	};
	Ok(result)
}

// A table whose keys are exactly 1..=n is a sequence, any other table a
// mapping. The empty table counts as an empty sequence.
fn from_table(table: Table<'_>, depth: usize) -> Result<BoundaryValue> {
	let mut entries = Vec::new();
	for pair in table.pairs::<LuaValue, LuaValue>() {
		entries.push(pair?);
	}

	let len = entries.len();
	let is_sequence =
		entries.iter().all(|(key, _)| matches!(key, LuaValue::Integer(idx) if *idx >= 1 && *idx as usize <= len));

	if is_sequence {
		let mut items = vec![BoundaryValue::Nil; len];
		for (key, value) in entries {
			if let LuaValue::Integer(idx) = key {
				items[idx as usize - 1] = from_lua(value, depth + 1)?;
			}
		}
		return Ok(BoundaryValue::Sequence(items));
	}

	let mut mapping = Vec::with_capacity(len);
	for (key, value) in entries {
		mapping.push((from_lua(key, depth + 1)?, from_lua(value, depth + 1)?));
	}
	Ok(BoundaryValue::Mapping(mapping))
}
