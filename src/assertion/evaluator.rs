use regex::Regex;
use serde_json::Value;

use crate::assertion::types::{AssertionOperator, AssertionResults, BodyAssertion, ResponseAssertions};
use crate::chain::ChainResponse;
use crate::jsonpath::{display_value, get_raw};

/// 按声明的断言校验响应
///
/// 断言失败只记录在结果里，不影响请求链继续执行。
pub fn validate(response: &ChainResponse, assertions: &ResponseAssertions) -> AssertionResults {
    let mut results = AssertionResults::default();

    if let Some(expected) = assertions.status {
        let passed = response.status == expected;
        results.details.status = Some(passed);
        if !passed {
            results.fail(format!(
                "Expected status {}, but got {}",
                expected, response.status
            ));
        }
    }

    if let (Some(ceiling), Some(actual)) = (assertions.response_time, response.response_time) {
        let passed = actual <= ceiling;
        results.details.response_time = Some(passed);
        if !passed {
            results.fail(format!(
                "Expected response time <= {}s, but got {:.2}s",
                ceiling, actual
            ));
        }
    }

    for (key, expected) in &assertions.headers {
        let actual = response.header(key);
        let passed = actual == Some(expected.as_str());
        results.details.headers.insert(key.clone(), passed);
        if !passed {
            results.fail(format!(
                "Expected header \"{}\" to be \"{}\", but got \"{}\"",
                key,
                expected,
                actual.unwrap_or("undefined")
            ));
        }
    }

    for assertion in &assertions.body {
        let passed = evaluate_body(&response.data, assertion);
        results.details.body.insert(assertion.path.clone(), passed);
        if !passed {
            results.fail(format!(
                "Assertion failed for \"{}\": {} {}",
                assertion.path,
                assertion.operator,
                display_value(&assertion.value)
            ));
        }
    }

    results
}

fn evaluate_body(data: &Value, assertion: &BodyAssertion) -> bool {
    let actual = get_raw(data, &assertion.path);
    let expected = &assertion.value;

    match assertion.operator {
        AssertionOperator::Exists => actual.is_some(),
        AssertionOperator::NotExists => actual.is_none(),
        AssertionOperator::Equals => actual.is_some_and(|a| loosely_equal(a, expected)),
        AssertionOperator::NotEquals => !actual.is_some_and(|a| loosely_equal(a, expected)),
        AssertionOperator::Contains => actual.is_some_and(|a| contains(a, expected)),
        AssertionOperator::NotContains => !actual.is_some_and(|a| contains(a, expected)),
        AssertionOperator::GreaterThan => compare_numbers(actual, expected, |a, b| a > b),
        AssertionOperator::LessThan => compare_numbers(actual, expected, |a, b| a < b),
        AssertionOperator::Matches => match (actual, expected.as_str()) {
            (Some(a), Some(pattern)) => Regex::new(pattern)
                .map(|re| re.is_match(&display_value(a)))
                .unwrap_or(false),
            _ => false,
        },
    }
}

/// 类型相同时严格比较；期望值是字符串时按展示文本比较
fn loosely_equal(actual: &Value, expected: &Value) -> bool {
    if actual == expected {
        return true;
    }
    match (actual, expected) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        (Value::Array(_) | Value::Object(_), _) => false,
        (_, Value::String(e)) => display_value(actual) == *e,
        _ => false,
    }
}

fn contains(actual: &Value, expected: &Value) -> bool {
    match actual {
        Value::Array(items) => items.iter().any(|item| loosely_equal(item, expected)),
        other => display_value(other).contains(&display_value(expected)),
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

fn compare_numbers(actual: Option<&Value>, expected: &Value, cmp: fn(f64, f64) -> bool) -> bool {
    match (actual.and_then(as_number), as_number(expected)) {
        (Some(a), Some(b)) => cmp(a, b),
        _ => false,
    }
}
