// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{collections::HashMap, path::PathBuf};

/// Execution-context key holding the environment script source.
pub const CONF_SCRIPT: &str = "lua.script";
/// Execution-context key holding an extra directory for `require`.
pub const CONF_LOAD_PATH: &str = "lua.load_path";

/// Per-operator scripting configuration.
///
/// Resolved once when the operator instance is created, never per row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScriptConfig {
	/// Environment script defining the functions callable by name.
	///
	/// Default: None
	pub script: Option<String>,
	/// Directory prepended to the runtime's module search path.
	///
	/// Default: None
	pub load_path: Option<PathBuf>,
}

impl ScriptConfig {
	/// Create a new config with default values.
	pub fn new() -> Self {
		Self::default()
	}

	/// Reads [`CONF_SCRIPT`] and [`CONF_LOAD_PATH`] from the execution
	/// context properties. Blank values count as unset.
	pub fn from_properties(properties: &HashMap<String, String>) -> Self {
		let get = |key: &str| properties.get(key).filter(|v| !v.trim().is_empty());
		Self {
			script: get(CONF_SCRIPT).cloned(),
			load_path: get(CONF_LOAD_PATH).map(PathBuf::from),
		}
	}

	/// Set the environment script.
	pub fn script(mut self, script: impl Into<String>) -> Self {
		self.script = Some(script.into());
		self
	}

	/// Set the module search directory.
	pub fn load_path(mut self, path: impl Into<PathBuf>) -> Self {
		self.load_path = Some(path.into());
		self
	}
}
