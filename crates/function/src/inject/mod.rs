// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::fmt::{self, Display, Formatter};

use luafn_script::{BoundaryValue, LuaRuntime, Marshaller, ScriptConfig, ScriptRuntime, config::CONF_SCRIPT};
use luafn_type::{Type, TypeDescriptor, Value};
use tracing::{debug, info, instrument};

use crate::{AggregateFunction, Argument, FunctionError, Result};

mod accumulator;
mod partial;

pub use accumulator::Accumulator;
pub use partial::{PARTIAL_OP, PARTIAL_VAL, PartialRecord, partial_descriptor};

pub const NAME: &str = "lua_inject";

/// Stage of a distributed aggregation an evaluator instance runs as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateMode {
	/// Raw rows in, partial record out.
	Partial1,
	/// Partial records in, partial record out.
	Partial2,
	/// Partial records in, final value out.
	Final,
	/// Raw rows in, final value out.
	Complete,
}

impl AggregateMode {
	pub fn consumes_raw(&self) -> bool {
		matches!(self, AggregateMode::Partial1 | AggregateMode::Complete)
	}

	pub fn produces_partial(&self) -> bool {
		matches!(self, AggregateMode::Partial1 | AggregateMode::Partial2)
	}
}

impl Display for AggregateMode {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		let name = match self {
			AggregateMode::Partial1 => "partial1",
			AggregateMode::Partial2 => "partial2",
			AggregateMode::Final => "final",
			AggregateMode::Complete => "complete",
		};
		f.write_str(name)
	}
}

/// Checks the call-site shape `lua_inject(reducer, value)` at plan time.
pub fn resolve(args: &[Argument]) -> Result<()> {
	if args.len() < 2 {
		return Err(FunctionError::ArgumentCount {
			function: NAME,
			expected: 2,
			actual: args.len(),
		});
	}
	Ok(())
}

struct Stage {
	mode: AggregateMode,
	/// Accumulated values: marshals raw rows, unmarshals final results
	value: Marshaller,
	/// Partial records: marshals incoming partials, unmarshals outgoing ones
	partial: Marshaller,
}

/// `lua_inject(reducer, value)` folds a group with `reducer(memo, value)`, a
/// function of the environment script.
///
/// The first non-nil value of a group becomes the memo without calling the
/// reducer. Raw-input stages learn the reducer from the call site; stages fed
/// with partial records adopt the one named by the first partial they merge.
pub struct InjectEvaluator<R: ScriptRuntime = LuaRuntime> {
	runtime: R,
	receiver: R::Receiver,
	stage: Option<Stage>,
	reducer: Option<String>,
}

impl InjectEvaluator<LuaRuntime> {
	pub fn with_lua(config: &ScriptConfig) -> Result<Self> {
		let runtime = LuaRuntime::new(config).map_err(|source| FunctionError::Environment {
			source,
		})?;
		Self::new(runtime, config)
	}
}

impl<R: ScriptRuntime> InjectEvaluator<R> {
	/// Evaluates the configured environment script once for this instance.
	#[instrument(name = "function::lua_inject::new", level = "debug", skip_all)]
	pub fn new(mut runtime: R, config: &ScriptConfig) -> Result<Self> {
		let script = config.script.as_deref().ok_or(FunctionError::MissingEnvironment {
			function: NAME,
			key: CONF_SCRIPT,
		})?;
		let receiver = runtime.run_environment(script).map_err(|source| FunctionError::Environment {
			source,
		})?;

		Ok(Self {
			runtime,
			receiver,
			stage: None,
			reducer: None,
		})
	}

	/// Prepares the evaluator for `mode` and returns the type of what it
	/// emits: the partial record descriptor for partial-producing modes, the
	/// normalized value type otherwise.
	#[instrument(name = "function::lua_inject::init", level = "debug", skip(self, params))]
	pub fn init(&mut self, mode: AggregateMode, params: &[Argument]) -> Result<TypeDescriptor> {
		let (stage, reducer) = if mode.consumes_raw() {
			resolve(params)?;
			let Some(reducer) = params[0].as_constant() else {
				return Err(FunctionError::MissingCallTarget {
					position: 0,
				});
			};
			let reducer = reducer.trim();
			if reducer.is_empty() {
				return Err(FunctionError::InvalidCallTarget {
					position: 0,
					target: reducer.to_string(),
				});
			}

			let value = Marshaller::new(&params[1].descriptor()).map_err(|source| FunctionError::ArgumentType {
				position: 1,
				source,
			})?;
			let partial = Marshaller::new(&partial_descriptor(value.target().clone())).map_err(|source| {
				FunctionError::ArgumentType {
					position: 1,
					source,
				}
			})?;
			(
				Stage {
					mode,
					value,
					partial,
				},
				Some(reducer.to_string()),
			)
		} else {
			let Some(first) = params.first() else {
				return Err(FunctionError::ArgumentCount {
					function: NAME,
					expected: 1,
					actual: 0,
				});
			};
			let ty = first.descriptor();
			let malformed = || FunctionError::PartialType {
				position: 0,
				actual: ty.to_string(),
			};
			let (Some((_, op)), Some((_, val))) = (ty.field(PARTIAL_OP), ty.field(PARTIAL_VAL)) else {
				return Err(malformed());
			};
			if op.as_primitive() != Some(Type::Utf8) {
				return Err(malformed());
			}

			let to_error = |source| FunctionError::ArgumentType {
				position: 0,
				source,
			};
			let value = Marshaller::new(val).map_err(to_error)?;
			let partial = Marshaller::new(&ty).map_err(to_error)?;
			(
				Stage {
					mode,
					value,
					partial,
				},
				None,
			)
		};

		let output = if mode.produces_partial() {
			stage.partial.target().clone()
		} else {
			stage.value.target().clone()
		};
		match &reducer {
			Some(reducer) => info!("initialized {NAME} in {mode} mode with reducer '{reducer}', emitting {output}"),
			None => info!("initialized {NAME} in {mode} mode, emitting {output}"),
		}

		self.stage = Some(stage);
		self.reducer = reducer;
		Ok(output)
	}

	/// The reducer in use, once known.
	pub fn reducer(&self) -> Option<&str> {
		self.reducer.as_deref()
	}

	fn stage(&self, operation: &'static str, accepts: fn(&AggregateMode) -> bool) -> Result<&Stage> {
		let stage = self.stage.as_ref().ok_or(FunctionError::NotInitialized {
			function: NAME,
		})?;
		if !accepts(&stage.mode) {
			return Err(FunctionError::InvalidMode {
				operation,
				mode: stage.mode,
			});
		}
		Ok(stage)
	}

	fn fold(&mut self, acc: &mut Accumulator, value: BoundaryValue) -> Result<()> {
		let Some(memo) = acc.take() else {
			if !value.is_nil() {
				acc.set(value);
			}
			return Ok(());
		};
		let Some(reducer) = self.reducer.as_deref() else {
			acc.set(memo);
			return Err(FunctionError::UnresolvedReducer);
		};

		let folded = self.runtime.invoke(&self.receiver, reducer, &[memo, value]).map_err(|source| {
			FunctionError::Invocation {
				target: reducer.to_string(),
				source,
			}
		})?;
		acc.set(folded);
		Ok(())
	}

	/// Folds a partial record into `acc`, adopting its reducer if none is
	/// known yet. Partials of empty groups contribute nothing: unlike a nil
	/// row in `iterate`, a nil `val` never reaches the reducer.
	pub fn merge_partial(&mut self, acc: &mut Accumulator, partial: PartialRecord) -> Result<()> {
		self.stage("merge", |mode| !mode.consumes_raw())?;

		if let Some(op) = partial.op {
			match self.reducer.as_deref() {
				None => {
					debug!("{NAME} adopted reducer '{op}' from a partial record");
					self.reducer = Some(op);
				}
				Some(current) if current != op => {
					return Err(FunctionError::ReducerMismatch {
						expected: current.to_string(),
						actual: op,
					});
				}
				Some(_) => {}
			}
		}

		if partial.val.is_nil() {
			return Ok(());
		}
		self.fold(acc, partial.val)
	}

	/// The accumulator as a partial record, ready for [`PartialRecord::encode`].
	pub fn partial_record(&self, acc: &Accumulator) -> Result<PartialRecord> {
		self.stage("terminate_partial", AggregateMode::produces_partial)?;
		Ok(PartialRecord::new(self.reducer.clone(), acc.value().cloned().unwrap_or(BoundaryValue::Nil)))
	}

	fn target(&self) -> String {
		self.reducer.clone().unwrap_or_else(|| NAME.to_string())
	}
}

impl<R: ScriptRuntime> AggregateFunction for InjectEvaluator<R> {
	fn iterate(&mut self, acc: &mut Accumulator, value: &Value) -> Result<()> {
		let value = self.stage("iterate", AggregateMode::consumes_raw)?.value.marshal(value).map_err(|source| {
			FunctionError::RowValue {
				position: 1,
				source,
			}
		})?;
		self.fold(acc, value)
	}

	fn terminate_partial(&self, acc: &Accumulator) -> Result<Value> {
		let record = self.partial_record(acc)?;
		let stage = self.stage("terminate_partial", AggregateMode::produces_partial)?;
		stage.partial.unmarshal(record.into_boundary()).map_err(|source| FunctionError::ResultValue {
			target: self.target(),
			source,
		})
	}

	fn merge(&mut self, acc: &mut Accumulator, partial: &Value) -> Result<()> {
		let stage = self.stage("merge", |mode| !mode.consumes_raw())?;
		let boundary = stage.partial.marshal(partial).map_err(|source| FunctionError::RowValue {
			position: 0,
			source,
		})?;
		let record = PartialRecord::from_boundary(boundary, 0)?;
		self.merge_partial(acc, record)
	}

	fn terminate(&self, acc: Accumulator) -> Result<Value> {
		let stage = self.stage("terminate", |mode| !mode.produces_partial())?;
		match acc.into_value() {
			None => Ok(Value::Undefined),
			Some(value) => stage.value.unmarshal(value).map_err(|source| FunctionError::ResultValue {
				target: self.target(),
				source,
			}),
		}
	}
}

#[cfg(test)]
mod tests {
	use luafn_script::{BoundaryValue, ScriptConfig};
	use luafn_type::{Type, TypeDescriptor, Value};

	use super::{AggregateMode, InjectEvaluator, PartialRecord, partial_descriptor, resolve};
	use crate::{AggregateFunction, Argument, ErrorKind, FunctionError, testing::RecordingRuntime};

	fn evaluator(runtime: RecordingRuntime) -> InjectEvaluator<RecordingRuntime> {
		InjectEvaluator::new(runtime, &ScriptConfig::new().script("")).unwrap()
	}

	fn raw_params() -> [Argument; 2] {
		[Argument::constant(" sum "), Argument::column(Type::Int4)]
	}

	fn partial_params() -> [Argument; 1] {
		[Argument::column(partial_descriptor(TypeDescriptor::primitive(Type::Int8)))]
	}

	fn partial(op: &str, val: i64) -> Value {
		Value::Record(vec![Value::utf8(op), Value::Int8(val)])
	}

	#[test]
	fn test_resolve_needs_two_arguments() {
		let err = resolve(&[Argument::constant("sum")]).unwrap_err();
		assert!(matches!(err, FunctionError::ArgumentCount { expected: 2, actual: 1, .. }));
		assert_eq!(err.kind(), ErrorKind::Configuration);

		assert!(resolve(&raw_params()).is_ok());
	}

	#[test]
	fn test_missing_environment() {
		let err = InjectEvaluator::new(RecordingRuntime::with_sum(), &ScriptConfig::new()).err().unwrap();
		assert!(matches!(err, FunctionError::MissingEnvironment { key: "lua.script", .. }));
	}

	#[test]
	fn test_init_output_types() {
		let mut inject = evaluator(RecordingRuntime::with_sum());

		let ty = inject.init(AggregateMode::Complete, &raw_params()).unwrap();
		assert_eq!(ty, TypeDescriptor::primitive(Type::Int8));
		assert_eq!(inject.reducer(), Some("sum"));

		let ty = inject.init(AggregateMode::Partial1, &raw_params()).unwrap();
		assert_eq!(ty.to_string(), "Record<op: Utf8, val: Int8>");

		let ty = inject.init(AggregateMode::Partial2, &partial_params()).unwrap();
		assert_eq!(ty.to_string(), "Record<op: Utf8, val: Int8>");
		assert_eq!(inject.reducer(), None);

		let ty = inject.init(AggregateMode::Final, &partial_params()).unwrap();
		assert_eq!(ty, TypeDescriptor::primitive(Type::Int8));
	}

	#[test]
	fn test_init_rejects_non_partial_input() {
		let mut inject = evaluator(RecordingRuntime::with_sum());
		let err = inject.init(AggregateMode::Final, &[Argument::column(Type::Int8)]).unwrap_err();
		assert!(matches!(err, FunctionError::PartialType { position: 0, .. }));
		assert_eq!(err.kind(), ErrorKind::TypeMismatch);

		let ty = TypeDescriptor::record([
			("op", TypeDescriptor::primitive(Type::Int8)),
			("val", TypeDescriptor::primitive(Type::Int8)),
		]);
		let err = inject.init(AggregateMode::Partial2, &[Argument::column(ty)]).unwrap_err();
		assert!(matches!(err, FunctionError::PartialType { position: 0, .. }));
	}

	#[test]
	fn test_init_needs_constant_reducer() {
		let mut inject = evaluator(RecordingRuntime::with_sum());
		let params = [Argument::column(Type::Utf8), Argument::column(Type::Int4)];
		let err = inject.init(AggregateMode::Complete, &params).unwrap_err();
		assert!(matches!(err, FunctionError::MissingCallTarget { position: 0 }));
	}

	#[test]
	fn test_uninitialized() {
		let mut inject = evaluator(RecordingRuntime::with_sum());
		let mut acc = inject.new_accumulator();
		let err = inject.iterate(&mut acc, &Value::Int4(1)).unwrap_err();
		assert!(matches!(err, FunctionError::NotInitialized { .. }));
	}

	#[test]
	fn test_first_value_is_adopted_without_reducer() {
		let runtime = RecordingRuntime::with_sum();
		let calls = runtime.calls();
		let mut inject = evaluator(runtime);
		inject.init(AggregateMode::Complete, &raw_params()).unwrap();

		let mut acc = inject.new_accumulator();
		inject.iterate(&mut acc, &Value::Int4(5)).unwrap();
		assert_eq!(calls.borrow().len(), 0);
		assert_eq!(acc.value(), Some(&BoundaryValue::Int(5)));

		inject.iterate(&mut acc, &Value::Int4(3)).unwrap();
		assert_eq!(calls.borrow().len(), 1);
		assert_eq!(calls.borrow()[0].function, "sum");
		assert_eq!(calls.borrow()[0].args, vec![BoundaryValue::Int(5), BoundaryValue::Int(3)]);

		assert_eq!(inject.terminate(acc).unwrap(), Value::Int8(8));
	}

	#[test]
	fn test_nil_keeps_accumulator_absent() {
		let runtime = RecordingRuntime::with_sum();
		let calls = runtime.calls();
		let mut inject = evaluator(runtime);
		inject.init(AggregateMode::Complete, &raw_params()).unwrap();

		let mut acc = inject.new_accumulator();
		inject.iterate(&mut acc, &Value::Undefined).unwrap();
		assert!(acc.is_absent());
		assert_eq!(calls.borrow().len(), 0);
		assert_eq!(inject.terminate(acc).unwrap(), Value::Undefined);
	}

	#[test]
	fn test_reset() {
		let mut inject = evaluator(RecordingRuntime::with_sum());
		inject.init(AggregateMode::Complete, &raw_params()).unwrap();

		let mut acc = inject.new_accumulator();
		inject.iterate(&mut acc, &Value::Int4(5)).unwrap();
		inject.reset(&mut acc);
		assert!(acc.is_absent());
	}

	#[test]
	fn test_partial1_packages_reducer() {
		let mut inject = evaluator(RecordingRuntime::with_sum());
		inject.init(AggregateMode::Partial1, &raw_params()).unwrap();

		let mut acc = inject.new_accumulator();
		assert_eq!(
			inject.terminate_partial(&acc).unwrap(),
			Value::Record(vec![Value::utf8("sum"), Value::Undefined])
		);

		inject.iterate(&mut acc, &Value::Int4(2)).unwrap();
		inject.iterate(&mut acc, &Value::Int4(9)).unwrap();
		assert_eq!(inject.terminate_partial(&acc).unwrap(), partial("sum", 11));
	}

	#[test]
	fn test_merge_adopts_reducer() {
		let runtime = RecordingRuntime::with_sum();
		let calls = runtime.calls();
		let mut inject = evaluator(runtime);
		inject.init(AggregateMode::Final, &partial_params()).unwrap();

		let mut acc = inject.new_accumulator();
		inject.merge(&mut acc, &partial("sum", 10)).unwrap();
		assert_eq!(inject.reducer(), Some("sum"));
		assert_eq!(calls.borrow().len(), 0);

		inject.merge(&mut acc, &partial("sum", 5)).unwrap();
		assert_eq!(calls.borrow().len(), 1);
		assert_eq!(inject.terminate(acc).unwrap(), Value::Int8(15));
	}

	#[test]
	fn test_merge_skips_empty_partials() {
		let runtime = RecordingRuntime::with_sum();
		let calls = runtime.calls();
		let mut inject = evaluator(runtime);
		inject.init(AggregateMode::Final, &partial_params()).unwrap();

		let mut acc = inject.new_accumulator();
		inject.merge(&mut acc, &partial("sum", 4)).unwrap();
		inject.merge(&mut acc, &Value::Record(vec![Value::utf8("sum"), Value::Undefined])).unwrap();
		assert_eq!(calls.borrow().len(), 0);
		assert_eq!(inject.terminate(acc).unwrap(), Value::Int8(4));
	}

	#[test]
	fn test_reducer_mismatch() {
		let mut inject = evaluator(RecordingRuntime::with_sum());
		inject.init(AggregateMode::Final, &partial_params()).unwrap();

		let mut acc = inject.new_accumulator();
		inject.merge(&mut acc, &partial("sum", 1)).unwrap();
		let err = inject.merge(&mut acc, &partial("max", 2)).unwrap_err();
		assert!(matches!(
			&err,
			FunctionError::ReducerMismatch { expected, actual } if expected == "sum" && actual == "max"
		));
		assert_eq!(err.kind(), ErrorKind::RuntimeInvocation);
	}

	#[test]
	fn test_partial2_without_partials() {
		let mut inject = evaluator(RecordingRuntime::with_sum());
		inject.init(AggregateMode::Partial2, &partial_params()).unwrap();

		let acc = inject.new_accumulator();
		assert_eq!(inject.terminate_partial(&acc).unwrap(), Value::Record(vec![Value::Undefined, Value::Undefined]));
	}

	#[test]
	fn test_merge_partial_from_wire() {
		let mut inject = evaluator(RecordingRuntime::with_sum());
		inject.init(AggregateMode::Partial2, &partial_params()).unwrap();

		let mut acc = inject.new_accumulator();
		for val in [3, 4] {
			let bytes = PartialRecord::new(Some("sum".to_string()), BoundaryValue::Int(val)).encode().unwrap();
			inject.merge_partial(&mut acc, PartialRecord::decode(&bytes).unwrap()).unwrap();
		}
		let record = inject.partial_record(&acc).unwrap();
		assert_eq!(record, PartialRecord::new(Some("sum".to_string()), BoundaryValue::Int(7)));
	}

	#[test]
	fn test_invalid_modes() {
		let mut inject = evaluator(RecordingRuntime::with_sum());
		inject.init(AggregateMode::Complete, &raw_params()).unwrap();
		let mut acc = inject.new_accumulator();

		let err = inject.merge(&mut acc, &partial("sum", 1)).unwrap_err();
		assert!(matches!(err, FunctionError::InvalidMode { operation: "merge", mode: AggregateMode::Complete }));
		assert_eq!(err.kind(), ErrorKind::Configuration);
		assert!(matches!(inject.terminate_partial(&acc), Err(FunctionError::InvalidMode { .. })));

		inject.init(AggregateMode::Final, &partial_params()).unwrap();
		let err = inject.iterate(&mut acc, &Value::Int4(1)).unwrap_err();
		assert!(matches!(err, FunctionError::InvalidMode { operation: "iterate", mode: AggregateMode::Final }));

		inject.init(AggregateMode::Partial1, &raw_params()).unwrap();
		assert!(matches!(inject.terminate(acc), Err(FunctionError::InvalidMode { operation: "terminate", .. })));
	}

	#[test]
	fn test_reducer_failure() {
		let mut inject = evaluator(RecordingRuntime::new());
		inject.init(AggregateMode::Complete, &raw_params()).unwrap();

		let mut acc = inject.new_accumulator();
		inject.iterate(&mut acc, &Value::Int4(1)).unwrap();
		let err = inject.iterate(&mut acc, &Value::Int4(2)).unwrap_err();
		assert!(matches!(&err, FunctionError::Invocation { target, .. } if target == "sum"));
		assert_eq!(err.kind(), ErrorKind::RuntimeInvocation);
	}

	#[test]
	fn test_mode_display() {
		assert_eq!(AggregateMode::Partial2.to_string(), "partial2");
	}
}
