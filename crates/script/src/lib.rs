// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! The boundary between the host engine and an embedded scripting runtime.
//!
//! Native [`Value`](luafn_type::Value)s are marshalled into [`BoundaryValue`]s
//! before they reach a [`ScriptRuntime`] and unmarshalled back afterwards. The
//! runtime itself is only reached through the five calls of that trait; the
//! bundled implementation is [`LuaRuntime`].

pub mod boundary;
pub mod config;
pub mod error;
pub mod lua;
pub mod marshal;
pub mod runtime;

pub use boundary::BoundaryValue;
pub use config::ScriptConfig;
pub use error::{MarshalError, ScriptError};
pub use lua::LuaRuntime;
pub use marshal::Marshaller;
pub use runtime::ScriptRuntime;

pub type Result<T> = std::result::Result<T, ScriptError>;
