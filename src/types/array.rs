//! Hive `ARRAY` type.
//!
//! Dimensionality is a property of one `ArrayType`, never expressed by
//! nesting: `ArrayType::new(SqlType::Integer, Some(2), false)` is
//! `ARRAY<ARRAY<INT>>` on the wire, and wrapping an array type in another
//! array type is rejected.
//!
//! Indexed access is one-based by default. With `zero_indexes` set, the
//! [`index`](ArrayType::index) and [`slice`](ArrayType::slice) builders add
//! one to every index they are given, so callers can think zero-based.
use super::coercion::{BindProcessor, LiteralProcessor, ResultProcessor};
use super::sql_type::SqlType;
use super::value::Value;
use crate::ast::{BinaryOperator, Expression, Literal};
use crate::error::{DialectError, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayType {
    item_type: Box<SqlType>,
    dimensions: Option<usize>,
    zero_indexes: bool,
    as_tuple: bool,
}

impl ArrayType {
    pub fn new(item_type: SqlType, dimensions: Option<usize>, zero_indexes: bool) -> Result<Self> {
        if let SqlType::Array(_) = item_type {
            return Err(DialectError::Configuration(
                "Do not nest ARRAY types; ARRAY(basetype) handles multi-dimensional arrays of basetype"
                    .to_string(),
            ));
        }
        if dimensions == Some(0) {
            return Err(DialectError::Configuration(
                "ARRAY dimensions must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            item_type: Box::new(item_type),
            dimensions,
            zero_indexes,
            as_tuple: false,
        })
    }

    /// Array whose item type is not known yet.
    pub fn untyped() -> Self {
        Self {
            item_type: Box::new(SqlType::Null),
            dimensions: None,
            zero_indexes: false,
            as_tuple: false,
        }
    }

    /// Results come back as tuples instead of lists.
    pub fn with_as_tuple(mut self, as_tuple: bool) -> Self {
        self.as_tuple = as_tuple;
        self
    }

    pub fn item_type(&self) -> &SqlType {
        &self.item_type
    }

    pub fn dimensions(&self) -> Option<usize> {
        self.dimensions
    }

    pub fn zero_indexes(&self) -> bool {
        self.zero_indexes
    }

    pub fn as_tuple(&self) -> bool {
        self.as_tuple
    }

    pub fn literal_processor(&self) -> Option<LiteralProcessor> {
        let item_proc = self.item_type.literal_processor()?;
        let dimensions = self.dimensions;
        Some(Box::new(move |value: &Value| {
            if value.is_null() {
                return Ok("NULL".to_string());
            }
            let items = sequence(value)?;
            apply_item_processor(
                items,
                dimensions,
                &|v: &Value| item_proc(v),
                &|elements: Vec<String>| format!("[{}]", elements.join(", ")),
            )
        }))
    }

    pub fn bind_processor(&self) -> BindProcessor {
        let item_proc = self.item_type.bind_processor();
        let dimensions = self.dimensions;
        Box::new(move |value: Value| {
            if value.is_null() {
                return Ok(value);
            }
            let items = sequence(&value)?;
            apply_item_processor(
                items,
                dimensions,
                &|v: &Value| match &item_proc {
                    Some(process) => process(v.clone()),
                    None => Ok(v.clone()),
                },
                &Value::List,
            )
        })
    }

    /// Array results arrive either as sequences or as the engine's JSON text.
    pub fn result_processor(&self) -> ResultProcessor {
        let item_proc = self.item_type.result_processor();
        let dimensions = self.dimensions;
        let as_tuple = self.as_tuple;
        Box::new(move |value: Value| {
            let value = match value {
                Value::Null => return Ok(Value::Null),
                Value::String(text) => parse_array_text(&text)?,
                other => other,
            };
            let items = sequence(&value)?;
            let collect: fn(Vec<Value>) -> Value = if as_tuple {
                Value::Tuple
            } else {
                Value::List
            };
            apply_item_processor(
                items,
                dimensions,
                &|v: &Value| match &item_proc {
                    Some(process) => process(v.clone()),
                    None => Ok(v.clone()),
                },
                &collect,
            )
        })
    }

    /// `target[index]`, shifting the index when `zero_indexes` is set.
    pub fn index(&self, target: Expression, index: Expression) -> Expression {
        Expression::Subscript {
            expr: Box::new(target),
            index: Box::new(self.shift_index(index)),
        }
    }

    /// `target[start:end]`; both bounds are shifted when `zero_indexes` is set.
    pub fn slice(
        &self,
        target: Expression,
        start: Option<Expression>,
        end: Option<Expression>,
    ) -> Expression {
        Expression::Slice {
            expr: Box::new(target),
            start: start.map(|s| Box::new(self.shift_index(s))),
            end: end.map(|e| Box::new(self.shift_index(e))),
        }
    }

    fn shift_index(&self, index: Expression) -> Expression {
        if !self.zero_indexes {
            return index;
        }
        match index {
            Expression::Literal(Literal::Integer(i)) if i < i64::MAX => Expression::integer(i + 1),
            other => Expression::binary(other, BinaryOperator::Plus, Expression::integer(1)),
        }
    }
}

fn sequence(value: &Value) -> Result<&[Value]> {
    value
        .as_sequence()
        .ok_or_else(|| DialectError::format("array", value.display()))
}

/// Walk `dimensions` levels of nesting (or until the elements stop being
/// sequences when the dimension count is unset), applying `leaf` to every
/// element and `collect` to every level. A NULL sub-array is handed to
/// `leaf` as is.
fn apply_item_processor<T>(
    items: &[Value],
    dimensions: Option<usize>,
    leaf: &dyn Fn(&Value) -> Result<T>,
    collect: &dyn Fn(Vec<T>) -> T,
) -> Result<T> {
    let at_leaf = match dimensions {
        Some(d) => d <= 1,
        None => items
            .iter()
            .find(|item| !item.is_null())
            .map_or(true, |first| first.as_sequence().is_none()),
    };

    let processed = if at_leaf {
        items.iter().map(leaf).collect::<Result<Vec<T>>>()?
    } else {
        items
            .iter()
            .map(|item| {
                if item.is_null() {
                    return leaf(item);
                }
                let inner = sequence(item)?;
                apply_item_processor(inner, dimensions.map(|d| d - 1), leaf, collect)
            })
            .collect::<Result<Vec<T>>>()?
    };

    Ok(collect(processed))
}

fn parse_array_text(text: &str) -> Result<Value> {
    let json: serde_json::Value =
        serde_json::from_str(text).map_err(|_| DialectError::format("array", text))?;
    json_to_value(json).ok_or_else(|| DialectError::format("array", text))
}

fn json_to_value(json: serde_json::Value) -> Option<Value> {
    Some(match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::Int(i),
            None => Value::Float(n.as_f64()?),
        },
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(items) => Value::List(
            items
                .into_iter()
                .map(json_to_value)
                .collect::<Option<Vec<Value>>>()?,
        ),
        serde_json::Value::Object(_) => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ints(values: &[i64]) -> Value {
        Value::List(values.iter().map(|i| Value::Int(*i)).collect())
    }

    #[test]
    fn test_nested_array_type_rejected() {
        let inner = ArrayType::new(SqlType::Integer, None, false).unwrap();
        let err = ArrayType::new(SqlType::Array(inner), None, false).unwrap_err();
        assert!(matches!(err, DialectError::Configuration(_)));
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        assert!(ArrayType::new(SqlType::Integer, Some(0), false).is_err());
    }

    #[test]
    fn test_literal_one_dimension() {
        let array = ArrayType::new(SqlType::Integer, None, false).unwrap();
        let render = array.literal_processor().unwrap();
        assert_eq!(render(&ints(&[1, 2, 3])).unwrap(), "[1, 2, 3]");
    }

    #[test]
    fn test_literal_two_dimensions() {
        let array = ArrayType::new(SqlType::String, Some(2), false).unwrap();
        let render = array.literal_processor().unwrap();
        let value = Value::List(vec![
            Value::from(vec!["a", "b"]),
            Value::from(vec!["c"]),
        ]);
        assert_eq!(render(&value).unwrap(), "[['a', 'b'], ['c']]");
    }

    #[test]
    fn test_literal_unavailable_for_untyped_items() {
        assert!(ArrayType::untyped().literal_processor().is_none());
    }

    #[test]
    fn test_literal_of_read_only_items_fails() {
        let array = ArrayType::new(SqlType::Date, None, false).unwrap();
        let render = array.literal_processor().unwrap();
        assert!(matches!(
            render(&Value::from(vec!["2020-01-01"])),
            Err(DialectError::UnsupportedOperation(_))
        ));
    }

    #[test]
    fn test_bind_then_result_round_trip() {
        let array = ArrayType::new(SqlType::Integer, Some(2), false).unwrap();
        let value = Value::List(vec![ints(&[1, 2]), ints(&[3]), ints(&[])]);
        let bound = (array.bind_processor())(value.clone()).unwrap();
        assert_eq!(bound, value);
        let back = (array.result_processor())(bound).unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn test_unbounded_dimensions_follow_nesting() {
        let array = ArrayType::new(SqlType::Integer, None, false).unwrap();
        let value = Value::List(vec![Value::List(vec![ints(&[1]), ints(&[2, 3])])]);
        let back = (array.result_processor())(value.clone()).unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn test_result_as_tuple() {
        let array = ArrayType::new(SqlType::Integer, None, false)
            .unwrap()
            .with_as_tuple(true);
        let back = (array.result_processor())(ints(&[1, 2])).unwrap();
        assert_eq!(back, Value::Tuple(vec![Value::Int(1), Value::Int(2)]));
    }

    #[test]
    fn test_result_from_engine_text_coerces_items() {
        let array = ArrayType::new(SqlType::Date, None, false).unwrap();
        let back = (array.result_processor())(Value::from("[\"2020-01-02\",null]")).unwrap();
        assert_eq!(
            back,
            Value::List(vec![
                Value::Date(NaiveDate::from_ymd_opt(2020, 1, 2).unwrap()),
                Value::Null
            ])
        );
    }

    #[test]
    fn test_result_from_malformed_text_is_format_error() {
        let array = ArrayType::new(SqlType::Integer, None, false).unwrap();
        assert!(matches!(
            (array.result_processor())(Value::from("[1, 2")),
            Err(DialectError::Format { target: "array", .. })
        ));
    }

    #[test]
    fn test_null_sub_array_in_two_dimensions() {
        let array = ArrayType::new(SqlType::Integer, Some(2), false).unwrap();
        let expected = Value::List(vec![ints(&[1]), Value::Null]);

        let from_list = (array.result_processor())(expected.clone()).unwrap();
        assert_eq!(from_list, expected);
        let from_text = (array.result_processor())(Value::from("[[1], null]")).unwrap();
        assert_eq!(from_text, expected);

        let render = array.literal_processor().unwrap();
        assert_eq!(render(&expected).unwrap(), "[[1], NULL]");
    }

    #[test]
    fn test_leading_null_does_not_hide_nesting() {
        let array = ArrayType::new(SqlType::Date, None, false).unwrap();
        let back = (array.result_processor())(Value::from("[null, [\"2020-01-02\"]]")).unwrap();
        assert_eq!(
            back,
            Value::List(vec![
                Value::Null,
                Value::List(vec![Value::Date(NaiveDate::from_ymd_opt(2020, 1, 2).unwrap())]),
            ])
        );
    }

    #[test]
    fn test_null_passes_through() {
        let array = ArrayType::new(SqlType::Integer, None, false).unwrap();
        assert_eq!((array.bind_processor())(Value::Null).unwrap(), Value::Null);
        assert_eq!((array.result_processor())(Value::Null).unwrap(), Value::Null);
    }

    #[test]
    fn test_index_shift_when_zero_based() {
        let array = ArrayType::new(SqlType::Integer, None, true).unwrap();
        let expr = array.index(Expression::column("xs"), Expression::integer(0));
        assert_eq!(
            expr,
            Expression::Subscript {
                expr: Box::new(Expression::column("xs")),
                index: Box::new(Expression::integer(1)),
            }
        );
    }

    #[test]
    fn test_index_shift_wraps_non_literal() {
        let array = ArrayType::new(SqlType::Integer, None, true).unwrap();
        match array.index(Expression::column("xs"), Expression::column("i")) {
            Expression::Subscript { index, .. } => assert_eq!(
                *index,
                Expression::binary(
                    Expression::column("i"),
                    BinaryOperator::Plus,
                    Expression::integer(1)
                )
            ),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_index_shift_at_integer_limit() {
        let array = ArrayType::new(SqlType::Integer, None, true).unwrap();
        match array.index(Expression::column("xs"), Expression::integer(i64::MAX)) {
            Expression::Subscript { index, .. } => assert_eq!(
                *index,
                Expression::binary(
                    Expression::integer(i64::MAX),
                    BinaryOperator::Plus,
                    Expression::integer(1)
                )
            ),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_slice_shifts_both_bounds() {
        let array = ArrayType::new(SqlType::Integer, None, true).unwrap();
        let expr = array.slice(
            Expression::column("xs"),
            Some(Expression::integer(0)),
            Some(Expression::integer(2)),
        );
        assert_eq!(
            expr,
            Expression::Slice {
                expr: Box::new(Expression::column("xs")),
                start: Some(Box::new(Expression::integer(1))),
                end: Some(Box::new(Expression::integer(3))),
            }
        );
    }

    #[test]
    fn test_one_based_index_untouched() {
        let array = ArrayType::new(SqlType::Integer, None, false).unwrap();
        match array.index(Expression::column("xs"), Expression::integer(1)) {
            Expression::Subscript { index, .. } => assert_eq!(*index, Expression::integer(1)),
            other => panic!("unexpected {:?}", other),
        }
    }
}
