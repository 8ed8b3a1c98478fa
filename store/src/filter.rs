//! `match(doc, filter)` — the predicate behind `Collection::where_`/`find`/`find_one`.
//! Recurses into nested objects; a filter value whose keys are all `$`-prefixed is treated
//! as a comparison operator set rather than a further nested match.

use regex::Regex;
use serde_json::{Map, Value};

fn is_operator_object(obj: &Map<String, Value>) -> bool { !obj.is_empty() && obj.keys().all(|k| k.starts_with('$')) }

fn as_f64(v: &Value) -> Option<f64> { v.as_f64() }

fn compare_operators(doc_value: &Value, ops: &Map<String, Value>) -> bool {
    for (op, operand) in ops {
        let ok = match op.as_str() {
            "$gte" => as_f64(doc_value).zip(as_f64(operand)).map(|(a, b)| a >= b).unwrap_or(false),
            "$lte" => as_f64(doc_value).zip(as_f64(operand)).map(|(a, b)| a <= b).unwrap_or(false),
            "$gt" => as_f64(doc_value).zip(as_f64(operand)).map(|(a, b)| a > b).unwrap_or(false),
            "$lt" => as_f64(doc_value).zip(as_f64(operand)).map(|(a, b)| a < b).unwrap_or(false),
            "$in" => operand.as_array().map(|arr| arr.contains(doc_value)).unwrap_or(false),
            "$regex" => match (doc_value.as_str(), operand.as_str()) {
                (Some(s), Some(pattern)) => Regex::new(pattern).map(|re| re.is_match(s)).unwrap_or(false),
                _ => false,
            },
            _ => false,
        };
        if !ok {
            return false;
        }
    }
    true
}

/// Recursively test each `(key, value)` in `filter` against `doc`. A `null` filter value is
/// ignored (treated as "don't care"). Non-object filter values are compared for strict
/// equality; object filter values whose keys are all operator keys (`$gte`, …) are applied
/// as comparisons; any other object filter value recurses into the matching document field.
pub fn matches(doc: &Value, filter: &Value) -> bool {
    let (Some(filter_obj), Some(doc_obj)) = (filter.as_object(), doc.as_object()) else {
        return doc == filter;
    };

    for (key, filter_value) in filter_obj {
        if filter_value.is_null() {
            continue;
        }
        let doc_value = doc_obj.get(key).cloned().unwrap_or(Value::Null);

        if let Some(op_obj) = filter_value.as_object() {
            if is_operator_object(op_obj) {
                if !compare_operators(&doc_value, op_obj) {
                    return false;
                }
                continue;
            }
            if !matches(&doc_value, filter_value) {
                return false;
            }
            continue;
        }

        if &doc_value != filter_value {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_strict_equality_on_plain_fields() {
        let doc = json!({"role": "admin", "age": 30});
        assert!(matches(&doc, &json!({"role": "admin"})));
        assert!(!matches(&doc, &json!({"role": "user"})));
    }

    #[test]
    fn test_null_filter_value_is_ignored() {
        let doc = json!({"role": "admin"});
        assert!(matches(&doc, &json!({"role": null})));
    }

    #[test]
    fn test_comparison_operators() {
        let doc = json!({"age": 30});
        assert!(matches(&doc, &json!({"age": {"$gte": 18, "$lt": 65}})));
        assert!(!matches(&doc, &json!({"age": {"$gt": 30}})));
        assert!(matches(&doc, &json!({"age": {"$in": [10, 20, 30]}})));
    }

    #[test]
    fn test_regex_operator() {
        let doc = json!({"email": "alice@example.com"});
        assert!(matches(&doc, &json!({"email": {"$regex": "^alice@"}})));
        assert!(!matches(&doc, &json!({"email": {"$regex": "^bob@"}})));
    }

    #[test]
    fn test_nested_object_recursion() {
        let doc = json!({"preferences": {"theme": "dark", "notifications": true}});
        assert!(matches(&doc, &json!({"preferences": {"theme": "dark"}})));
        assert!(!matches(&doc, &json!({"preferences": {"theme": "light"}})));
    }
}
