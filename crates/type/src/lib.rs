// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Column types and native values as the host engine sees them.

pub mod descriptor;
pub mod value;

pub use descriptor::TypeDescriptor;
pub use value::{Value, r#type::Type};
