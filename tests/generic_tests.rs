use chrono::{Duration, TimeZone, Utc};
use clove_udf::generic::{ParamShape, Shape, convert_generic, convert_generic_with_context};
use clove_udf::{
    Arity, ConversionError, Context, Rest, Tag, Udf, UdfError, Value, must_convert_generic,
};
use std::collections::HashMap;

fn call(udf: &dyn Udf, args: &[Value]) -> Result<Value, UdfError> {
    assert!(udf.accept(args.len()), "arity {} not accepted", args.len());
    udf.call(&Context::new(), args)
}

fn inc(v: i64) -> i64 {
    v + 1
}

fn join_parts(parts: Vec<String>, separator: String) -> String {
    parts.join(&separator)
}

fn scale(factor: f64, values: Rest<f64>) -> Vec<f64> {
    values.iter().map(|v| v * factor).collect()
}

fn checked_div(a: i64, b: i64) -> Result<i64, String> {
    if b == 0 {
        return Err("division by zero".to_string());
    }
    Ok(a / b)
}

fn or_default(v: Option<i64>) -> i64 {
    v.unwrap_or(-1)
}

fn shift(t: chrono::DateTime<Utc>, seconds: i64) -> chrono::DateTime<Utc> {
    t + Duration::seconds(seconds)
}

fn blob_len(b: Vec<u8>) -> usize {
    b.len()
}

fn sum_fields(fields: HashMap<String, i64>) -> i64 {
    fields.values().sum()
}

fn describe(v: Value) -> String {
    v.tag().to_string()
}

fn answer() -> i64 {
    42
}

fn invocation_id(ctx: &Context, offset: i64) -> i64 {
    ctx.id() as i64 + offset
}

fn narrow(v: i8) -> i8 {
    v
}

fn huge() -> u64 {
    u64::MAX
}

// ============================================================================
// Round trips against direct calls
// ============================================================================

#[test]
fn test_inc_matches_direct_call() {
    let udf = convert_generic(inc).unwrap();
    for n in [-5i64, 0, 41, 1 << 40] {
        assert_eq!(call(&udf, &[Value::Integer(n)]).unwrap(), Value::Integer(inc(n)));
    }
}

#[test]
fn test_join_parts_matches_direct_call() {
    let udf = convert_generic(join_parts).unwrap();
    let parts = Value::Array(vec![Value::from("a"), Value::from("b")]);
    let result = call(&udf, &[parts, Value::from("+")]).unwrap();
    assert_eq!(result, Value::from(join_parts(vec!["a".into(), "b".into()], "+".into())));
}

#[test]
fn test_integer_argument_widens_for_float_parameter() {
    let udf = convert_generic(scale).unwrap();
    let result = call(&udf, &[Value::Integer(2), Value::Float(1.5), Value::Integer(3)]).unwrap();
    assert_eq!(result, Value::Array(vec![Value::Float(3.0), Value::Float(6.0)]));
}

#[test]
fn test_zero_parameter_function() {
    let udf = convert_generic(answer).unwrap();
    assert_eq!(udf.arity(), Arity::Exact(0));
    assert_eq!(call(&udf, &[]).unwrap(), Value::Integer(42));
}

#[test]
fn test_closure_is_adapted() {
    let offset = 10;
    let udf = convert_generic(move |v: i64| v + offset).unwrap();
    assert_eq!(call(&udf, &[Value::Integer(1)]).unwrap(), Value::Integer(11));
}

#[test]
fn test_nullable_parameter() {
    let udf = convert_generic(or_default).unwrap();
    assert_eq!(call(&udf, &[Value::Null]).unwrap(), Value::Integer(-1));
    assert_eq!(call(&udf, &[Value::Integer(3)]).unwrap(), Value::Integer(3));
}

#[test]
fn test_timestamp_parameter_and_return() {
    let udf = convert_generic(shift).unwrap();
    let t = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let result = call(&udf, &[Value::Timestamp(t), Value::Integer(90)]).unwrap();
    assert_eq!(result, Value::Timestamp(Utc.with_ymd_and_hms(2024, 1, 1, 0, 1, 30).unwrap()));
}

#[test]
fn test_blob_and_object_parameters() {
    let udf = convert_generic(blob_len).unwrap();
    assert_eq!(call(&udf, &[Value::Blob(vec![1, 2, 3])]).unwrap(), Value::Integer(3));

    let udf = convert_generic(sum_fields).unwrap();
    let mut map = HashMap::new();
    map.insert("a".to_string(), Value::Integer(2));
    map.insert("b".to_string(), Value::Integer(5));
    assert_eq!(call(&udf, &[Value::Object(map)]).unwrap(), Value::Integer(7));
}

#[test]
fn test_any_parameter_passes_value_through() {
    let udf = convert_generic(describe).unwrap();
    assert_eq!(call(&udf, &[Value::Blob(vec![])]).unwrap(), Value::from("blob"));
}

#[test]
fn test_context_parameter_is_not_counted() {
    let udf = convert_generic_with_context(invocation_id).unwrap();
    assert_eq!(udf.arity(), Arity::Exact(1));

    let ctx = Context::new();
    let result = udf.call(&ctx, &[Value::Integer(1)]).unwrap();
    assert_eq!(result, Value::Integer(ctx.id() as i64 + 1));
}

// ============================================================================
// Accept and aggregation
// ============================================================================

#[test]
fn test_accept_fixed_arity() {
    let udf = convert_generic(join_parts).unwrap();
    assert!(!udf.accept(1));
    assert!(udf.accept(2));
    assert!(!udf.accept(3));
    // deterministic
    assert_eq!(udf.accept(2), udf.accept(2));
}

#[test]
fn test_accept_variadic_arity() {
    let udf = convert_generic(scale).unwrap();
    assert_eq!(udf.arity(), Arity::AtLeast(1));
    assert!(!udf.accept(0));
    for arity in 1..10 {
        assert!(udf.accept(arity));
    }
}

#[test]
fn test_adapted_functions_are_never_aggregates() {
    let udf = convert_generic(scale).unwrap();
    for k in 0..5 {
        assert!(!udf.is_aggregation_parameter(k));
    }
    assert!(!udf.is_aggregate(3));
}

#[test]
fn test_parameter_descriptors() {
    let udf = convert_generic(scale).unwrap();
    assert_eq!(
        udf.parameters(),
        &[ParamShape::Single(Shape::Float), ParamShape::Variadic(Shape::Float)]
    );
    assert_eq!(udf.returns(), &Shape::Array(Box::new(Shape::Float)));
}

// ============================================================================
// Call-time failures
// ============================================================================

#[test]
fn test_type_mismatch_reports_position() {
    let udf = convert_generic(join_parts).unwrap();
    let err = call(&udf, &[Value::Array(vec![]), Value::Integer(1)]).unwrap_err();
    match err {
        UdfError::TypeMismatch { position, source } => {
            assert_eq!(position, 1);
            assert_eq!(
                source,
                ConversionError::TypeMismatch {
                    expected: "string".to_string(),
                    actual: Tag::Integer,
                }
            );
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_first_failing_position_wins() {
    let udf = convert_generic(join_parts).unwrap();
    let err = call(&udf, &[Value::Integer(1), Value::Integer(2)]).unwrap_err();
    assert_eq!(err.position(), Some(0));
}

#[test]
fn test_array_element_mismatch() {
    let udf = convert_generic(join_parts).unwrap();
    let parts = Value::Array(vec![Value::from("a"), Value::Boolean(true)]);
    let err = call(&udf, &[parts, Value::from(",")]).unwrap_err();
    match err {
        UdfError::TypeMismatch { position: 0, source: ConversionError::Element { index, .. } } => {
            assert_eq!(index, 1)
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_array_shape_named_in_mismatch() {
    let udf = convert_generic(join_parts).unwrap();
    let err = call(&udf, &[Value::from("a"), Value::from(",")]).unwrap_err();
    assert!(err.to_string().contains("array of string"), "{err}");
}

#[test]
fn test_variadic_mismatch_position() {
    let udf = convert_generic(scale).unwrap();
    let err = call(&udf, &[Value::Float(1.0), Value::Float(1.0), Value::from("x")]).unwrap_err();
    assert_eq!(err.position(), Some(2));
}

#[test]
fn test_narrow_integer_out_of_range() {
    let udf = convert_generic(narrow).unwrap();
    assert_eq!(call(&udf, &[Value::Integer(-128)]).unwrap(), Value::Integer(-128));
    let err = call(&udf, &[Value::Integer(300)]).unwrap_err();
    assert!(matches!(
        err,
        UdfError::TypeMismatch { position: 0, source: ConversionError::Lossy { .. } }
    ));
}

#[test]
fn test_function_error_is_propagated() {
    let udf = convert_generic(checked_div).unwrap();
    assert_eq!(call(&udf, &[Value::Integer(9), Value::Integer(3)]).unwrap(), Value::Integer(3));

    let err = call(&udf, &[Value::Integer(1), Value::Integer(0)]).unwrap_err();
    assert!(matches!(err, UdfError::Failed(_)));
    assert_eq!(
        std::error::Error::source(&err).map(|e| e.to_string()),
        Some("division by zero".to_string())
    );
}

#[test]
fn test_unrepresentable_return_value() {
    let udf = convert_generic(huge).unwrap();
    assert!(matches!(call(&udf, &[]), Err(UdfError::Return(_))));
}

// ============================================================================
// Adaptation failures
// ============================================================================

fn nested_nullable(v: Option<Option<i64>>) -> i64 {
    v.flatten().unwrap_or(0)
}

fn nullable_any(v: Option<Value>) -> bool {
    v.is_some()
}

fn returns_nothing(_v: i64) {}

fn fallible_nothing(_v: i64) -> Result<(), String> {
    Ok(())
}

fn rest_first(_rest: Rest<i64>, _last: i64) -> i64 {
    0
}

fn nested_unit(_v: i64) -> Vec<()> {
    Vec::new()
}

#[test]
fn test_reject_nested_nullable() {
    let err = convert_generic(nested_nullable).unwrap_err();
    assert!(matches!(err, UdfError::Adaptation(_)));
    assert!(err.to_string().contains("parameter 0"), "{err}");
}

#[test]
fn test_reject_nullable_any() {
    assert!(matches!(convert_generic(nullable_any), Err(UdfError::Adaptation(_))));
}

#[test]
fn test_reject_unit_return() {
    assert!(matches!(convert_generic(returns_nothing), Err(UdfError::Adaptation(_))));
    assert!(matches!(convert_generic(fallible_nothing), Err(UdfError::Adaptation(_))));
    assert!(matches!(convert_generic(nested_unit), Err(UdfError::Adaptation(_))));
}

#[test]
fn test_reject_variadic_not_last() {
    let err = convert_generic(rest_first).unwrap_err();
    assert!(err.to_string().contains("must be the last parameter"), "{err}");
}

#[test]
fn test_must_convert_generic_succeeds() {
    let udf = must_convert_generic(inc);
    assert_eq!(call(&udf, &[Value::Integer(1)]).unwrap(), Value::Integer(2));
}

#[test]
#[should_panic(expected = "cannot adapt function")]
fn test_must_convert_generic_panics() {
    must_convert_generic(rest_first);
}
