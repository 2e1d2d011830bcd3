// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use luafn_script::{MarshalError, ScriptError};

use crate::inject::AggregateMode;

/// How an error is surfaced to the host engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
	/// The call site or operator configuration is unusable; raised at bind time.
	Configuration,
	/// An argument's declared type cannot cross the script boundary; raised at
	/// bind time.
	TypeMismatch,
	/// A row or group failed while the script was running.
	RuntimeInvocation,
}

#[derive(Debug, thiserror::Error)]
pub enum FunctionError {
	#[error("{function} expects at least {expected} arguments, got {actual}")]
	ArgumentCount {
		function: &'static str,
		expected: usize,
		actual: usize,
	},

	#[error("argument {position}: expected a constant text argument holding the lua function or expression")]
	MissingCallTarget {
		position: usize,
	},

	#[error("argument {position}: {target:?} names neither a function (&name) nor an expression")]
	InvalidCallTarget {
		position: usize,
		target: String,
	},

	#[error("'{key}' is not configured, {function} needs an environment script")]
	MissingEnvironment {
		function: &'static str,
		key: &'static str,
	},

	#[error("failed to load the environment script: {source}")]
	Environment {
		source: ScriptError,
	},

	#[error("failed to compile {expression:?}: {source}")]
	Compile {
		expression: String,
		source: ScriptError,
	},

	#[error("argument {position}: {source}")]
	ArgumentType {
		position: usize,
		source: MarshalError,
	},

	#[error("argument {position}: expected a partial aggregation record with fields 'op' and 'val', got {actual}")]
	PartialType {
		position: usize,
		actual: String,
	},

	#[error("{function} was used before being initialized with an aggregation mode")]
	NotInitialized {
		function: &'static str,
	},

	#[error("{operation} is not supported in {mode} mode")]
	InvalidMode {
		operation: &'static str,
		mode: AggregateMode,
	},

	#[error("row has {actual} value arguments, expected {expected}")]
	RowArity {
		expected: usize,
		actual: usize,
	},

	#[error("evaluating '{target}' failed: {source}")]
	Invocation {
		target: String,
		source: ScriptError,
	},

	#[error("argument {position}: {source}")]
	RowValue {
		position: usize,
		source: MarshalError,
	},

	#[error("result of '{target}' does not fit the declared return type: {source}")]
	ResultValue {
		target: String,
		source: MarshalError,
	},

	#[error("no reducer is known yet, merge a partial or iterate a row first")]
	UnresolvedReducer,

	#[error("partial carries reducer '{actual}' but this aggregation already reduces with '{expected}'")]
	ReducerMismatch {
		expected: String,
		actual: String,
	},

	#[error("malformed partial aggregation record: {0}")]
	Wire(#[from] postcard::Error),
}

impl FunctionError {
	pub fn kind(&self) -> ErrorKind {
		match self {
			FunctionError::ArgumentCount {
				..
			}
			| FunctionError::MissingCallTarget {
				..
			}
			| FunctionError::InvalidCallTarget {
				..
			}
			| FunctionError::MissingEnvironment {
				..
			}
			| FunctionError::Environment {
				..
			}
			| FunctionError::Compile {
				..
			}
			| FunctionError::NotInitialized {
				..
			}
			| FunctionError::InvalidMode {
				..
			}
			| FunctionError::UnresolvedReducer => ErrorKind::Configuration,
			FunctionError::ArgumentType {
				..
			}
			| FunctionError::PartialType {
				..
			} => ErrorKind::TypeMismatch,
			FunctionError::RowArity {
				..
			}
			| FunctionError::Invocation {
				..
			}
			| FunctionError::RowValue {
				..
			}
			| FunctionError::ResultValue {
				..
			}
			| FunctionError::ReducerMismatch {
				..
			}
			| FunctionError::Wire(_) => ErrorKind::RuntimeInvocation,
		}
	}
}
