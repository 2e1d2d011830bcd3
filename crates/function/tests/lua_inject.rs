// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use luafn_function::{
	AggregateFunction, AggregateMode, Argument, ErrorKind, FunctionError, InjectEvaluator, PartialRecord,
};
use luafn_script::ScriptConfig;
use luafn_type::{Type, TypeDescriptor, Value};

const ENVIRONMENT: &str = r#"
function sum(memo, arg)
	return memo + arg
end

function join(memo, arg)
	return memo .. "," .. arg
end

function clear(memo, arg)
	return {}
end
"#;

fn evaluator(mode: AggregateMode, params: &[Argument]) -> (InjectEvaluator, TypeDescriptor) {
	let mut inject = InjectEvaluator::with_lua(&ScriptConfig::new().script(ENVIRONMENT)).unwrap();
	let ty = inject.init(mode, params).unwrap();
	(inject, ty)
}

fn raw(reducer: &str, ty: Type) -> [Argument; 2] {
	[Argument::constant(reducer), Argument::column(ty)]
}

fn partial1(rows: &[i32]) -> (Value, TypeDescriptor) {
	let (mut inject, ty) = evaluator(AggregateMode::Partial1, &raw("sum", Type::Int4));
	let mut acc = inject.new_accumulator();
	for row in rows {
		inject.iterate(&mut acc, &Value::Int4(*row)).unwrap();
	}
	(inject.terminate_partial(&acc).unwrap(), ty)
}

#[test]
fn test_complete_sum() {
	let (mut inject, ty) = evaluator(AggregateMode::Complete, &raw("sum", Type::Int4));
	assert_eq!(ty, TypeDescriptor::primitive(Type::Int8));

	let mut acc = inject.new_accumulator();
	for row in [1, 2, 3, 4] {
		inject.iterate(&mut acc, &Value::Int4(row)).unwrap();
	}
	assert_eq!(inject.terminate(acc).unwrap(), Value::Int8(10));
}

#[test]
fn test_complete_join_skips_leading_nil() {
	let (mut inject, _) = evaluator(AggregateMode::Complete, &raw("join", Type::Utf8));

	let mut acc = inject.new_accumulator();
	for row in [Value::Undefined, Value::utf8("a"), Value::utf8("b"), Value::utf8("c")] {
		inject.iterate(&mut acc, &row).unwrap();
	}
	assert_eq!(inject.terminate(acc).unwrap(), Value::utf8("a,b,c"));
}

#[test]
fn test_reducer_returning_empty_table_for_record() {
	let ty = TypeDescriptor::record([("a", TypeDescriptor::from(Type::Int8)), ("b", TypeDescriptor::from(Type::Utf8))]);
	let params = [Argument::constant("clear"), Argument::column(ty)];
	let (mut inject, _) = evaluator(AggregateMode::Complete, &params);

	let mut acc = inject.new_accumulator();
	for _ in 0..2 {
		inject.iterate(&mut acc, &Value::Record(vec![Value::Int8(1), Value::utf8("x")])).unwrap();
	}
	assert_eq!(inject.terminate(acc).unwrap(), Value::Record(vec![Value::Undefined, Value::Undefined]));
}

#[test]
fn test_empty_group() {
	let (inject, _) = evaluator(AggregateMode::Complete, &raw("sum", Type::Int4));
	let acc = inject.new_accumulator();
	assert_eq!(inject.terminate(acc).unwrap(), Value::Undefined);
}

#[test]
fn test_partial_then_final() {
	let (left, partial_ty) = partial1(&[3, 5]);
	let (right, _) = partial1(&[2, 7]);
	assert_eq!(left, Value::Record(vec![Value::utf8("sum"), Value::Int8(8)]));

	let (mut inject, ty) = evaluator(AggregateMode::Final, &[Argument::column(partial_ty)]);
	assert_eq!(ty, TypeDescriptor::primitive(Type::Int8));

	let mut acc = inject.new_accumulator();
	inject.merge(&mut acc, &left).unwrap();
	inject.merge(&mut acc, &right).unwrap();
	assert_eq!(inject.reducer(), Some("sum"));
	assert_eq!(inject.terminate(acc).unwrap(), Value::Int8(17));
}

#[test]
fn test_partial2_chain_over_the_wire() {
	let (first, partial_ty) = partial1(&[1, 2]);
	let (second, _) = partial1(&[3]);
	let (empty, _) = partial1(&[]);

	let (mut combiner, ty) = evaluator(AggregateMode::Partial2, &[Argument::column(partial_ty.clone())]);
	assert_eq!(ty, partial_ty);
	let mut acc = combiner.new_accumulator();
	for partial in [&first, &empty, &second] {
		combiner.merge(&mut acc, partial).unwrap();
	}
	let bytes = combiner.partial_record(&acc).unwrap().encode().unwrap();

	let (mut last, _) = evaluator(AggregateMode::Final, &[Argument::column(partial_ty)]);
	let mut acc = last.new_accumulator();
	last.merge_partial(&mut acc, PartialRecord::decode(&bytes).unwrap()).unwrap();
	last.merge(&mut acc, &Value::Record(vec![Value::utf8("sum"), Value::Int8(4)])).unwrap();
	assert_eq!(last.terminate(acc).unwrap(), Value::Int8(10));
}

#[test]
fn test_reducer_error_propagates() {
	let (mut inject, _) = evaluator(AggregateMode::Complete, &raw("sum", Type::Utf8));
	let mut acc = inject.new_accumulator();
	inject.iterate(&mut acc, &Value::utf8("x")).unwrap();

	let err = inject.iterate(&mut acc, &Value::utf8("y")).unwrap_err();
	assert!(matches!(err, FunctionError::Invocation { .. }));
	assert_eq!(err.kind(), ErrorKind::RuntimeInvocation);
}

#[test]
fn test_reducer_without_value_argument() {
	let mut inject = InjectEvaluator::with_lua(&ScriptConfig::new().script(ENVIRONMENT)).unwrap();
	let err = inject.init(AggregateMode::Complete, &[Argument::constant("sum")]).unwrap_err();
	assert!(matches!(err, FunctionError::ArgumentCount { expected: 2, actual: 1, .. }));
	assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[test]
fn test_broken_environment() {
	let err = InjectEvaluator::with_lua(&ScriptConfig::new().script("function (")).err().unwrap();
	assert!(matches!(err, FunctionError::Environment { .. }));
	assert_eq!(err.kind(), ErrorKind::Configuration);
}
