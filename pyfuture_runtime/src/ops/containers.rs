//! Container protocol: `in`, subscripting, `len()` and iteration.

use super::comparison::values_equal;
use crate::types::search::find_slice;
use crate::types::{NewInt, NewStr, normalize_index};
use crate::value::Value;
use pyfuture_core::{FutureError, FutureResult};

/// Resolve an integer subscript; huge values surface as `IndexError`.
fn int_index(key: &NewInt) -> FutureResult<i64> {
    key.to_i64().ok_or_else(|| {
        FutureError::index("cannot fit 'int' into an index-sized integer")
    })
}

fn bad_subscript(container: &str, key: &Value) -> FutureError {
    FutureError::type_error(format!(
        "{container} indices must be integers or slices, not {}",
        key.type_name()
    ))
}

/// `item in container`.
pub fn contains(container: &Value, item: &Value) -> FutureResult<bool> {
    match container {
        Value::Str(text) => text.contains(item),
        Value::Bytes(data) => data.contains(item),
        Value::LegacyBytes(raw) => match item {
            Value::Str(needle) => {
                let hay = NewStr::decode_legacy(raw)?;
                hay.contains(&Value::Str(needle.clone()))
            }
            Value::Bytes(needle) => Ok(find_slice(&raw[..], needle.as_bytes()).is_some()),
            Value::LegacyBytes(needle) => Ok(find_slice(&raw[..], &needle[..]).is_some()),
            other => Err(FutureError::type_error(format!(
                "'in <string>' requires string as left operand, not {}",
                other.type_name()
            ))),
        },
        Value::List(list) => Ok(list.contains(item)),
        Value::Tuple(items) => Ok(items.iter().any(|x| values_equal(x, item))),
        Value::Range(range) => Ok(range.contains(item)),
        Value::Dict(dict) => dict.contains_key(item),
        other => Err(FutureError::type_error(format!(
            "argument of type '{}' is not iterable",
            other.type_name()
        ))),
    }
}

/// `container[key]`.
pub fn get_item(container: &Value, key: &Value) -> FutureResult<Value> {
    if let Value::Dict(dict) = container {
        return dict.get_item(key).cloned();
    }
    if let Value::Range(range) = container {
        return match (key, key.as_int()) {
            (Value::Slice(slice), _) => range.slice(slice).map(Value::Range),
            (_, Some(n)) => range.get(&n).map(Value::Int),
            _ => Err(bad_subscript("range", key)),
        };
    }

    let index = match key {
        Value::Slice(_) => None,
        other => match other.as_int() {
            Some(n) => Some(int_index(&n)?),
            None => None,
        },
    };

    match (container, key, index) {
        (Value::Str(text), _, Some(i)) => text.get(i).map(Value::Str),
        (Value::Str(text), Value::Slice(slice), _) => text.slice(slice).map(Value::Str),
        (Value::Str(_), _, _) => Err(FutureError::type_error(format!(
            "string indices must be integers, not '{}'",
            key.type_name()
        ))),

        (Value::Bytes(data), _, Some(i)) => data.get(i).map(Value::from),
        (Value::Bytes(data), Value::Slice(slice), _) => data.slice(slice).map(Value::Bytes),
        (Value::Bytes(_), _, _) => Err(bad_subscript("byte", key)),

        // The host string indexes to one-character strings.
        (Value::LegacyBytes(raw), _, Some(i)) => normalize_index(i, raw.len())
            .map(|at| Value::legacy(&raw[at..=at]))
            .ok_or_else(|| FutureError::index("string index out of range")),
        (Value::LegacyBytes(raw), Value::Slice(slice), _) => {
            let indices = slice.indices(raw.len())?;
            Ok(Value::legacy(&indices.select(&raw[..])))
        }
        (Value::LegacyBytes(_), _, _) => Err(bad_subscript("string", key)),

        (Value::List(list), _, Some(i)) => list.get(i).cloned(),
        (Value::List(list), Value::Slice(slice), _) => list.slice(slice).map(Value::List),
        (Value::List(_), _, _) => Err(bad_subscript("list", key)),

        (Value::Tuple(items), _, Some(i)) => normalize_index(i, items.len())
            .map(|at| items[at].clone())
            .ok_or_else(|| FutureError::index("tuple index out of range")),
        (Value::Tuple(items), Value::Slice(slice), _) => {
            Ok(Value::Tuple(slice.indices(items.len())?.select(items)))
        }
        (Value::Tuple(_), _, _) => Err(bad_subscript("tuple", key)),

        (other, _, _) => Err(FutureError::type_error(format!(
            "'{}' object is not subscriptable",
            other.type_name()
        ))),
    }
}

/// `len(value)`.
pub fn len(value: &Value) -> FutureResult<usize> {
    match value {
        Value::Str(text) => Ok(text.len()),
        Value::Bytes(data) => Ok(data.len()),
        Value::LegacyBytes(raw) => Ok(raw.len()),
        Value::List(list) => Ok(list.len()),
        Value::Tuple(items) => Ok(items.len()),
        Value::Range(range) => range.len_usize(),
        Value::Dict(dict) => Ok(dict.len()),
        other => Err(FutureError::type_error(format!(
            "object of type '{}' has no len()",
            other.type_name()
        ))),
    }
}

/// Materialize the elements produced by iterating `value`.
///
/// Text yields one-character strings, binary data yields integers, and a
/// dictionary yields its keys.
pub fn iterate(value: &Value) -> FutureResult<Vec<Value>> {
    match value {
        Value::Str(text) => Ok(text
            .code_points()
            .iter()
            .map(|&cp| Value::Str(NewStr::from_code_points(vec![cp])))
            .collect()),
        Value::Bytes(data) => Ok(data.as_bytes().iter().map(|&b| Value::from(b)).collect()),
        Value::LegacyBytes(raw) => Ok(raw.chunks(1).map(Value::legacy).collect()),
        Value::List(list) => Ok(list.to_vec()),
        Value::Tuple(items) => Ok(items.clone()),
        Value::Range(range) => {
            range.len_usize()?;
            Ok(range.iter().map(Value::Int).collect())
        }
        Value::Dict(dict) => Ok(dict.keys().iter().cloned().collect()),
        other => Err(FutureError::type_error(format!(
            "'{}' object is not iterable",
            other.type_name()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{NewBytes, NewDict, NewList, NewRange, Slice};

    fn text(s: &str) -> Value {
        Value::from(s)
    }

    fn bytes(b: &[u8]) -> Value {
        Value::Bytes(NewBytes::from(b))
    }

    #[test]
    fn test_indexing_text_and_bytes() {
        assert_eq!(get_item(&text("ABCD"), &Value::from(0)).unwrap(), text("A"));
        assert_eq!(get_item(&bytes(b"ABCD"), &Value::from(0)).unwrap(), Value::from(65));
        assert_eq!(get_item(&Value::legacy(b"ABCD"), &Value::from(-1)).unwrap(), Value::legacy(b"D"));
    }

    #[test]
    fn test_slicing_keeps_type() {
        let slice = Value::Slice(Slice::range(1, 3));
        assert_eq!(get_item(&text("ABCD"), &slice).unwrap(), text("BC"));
        assert_eq!(get_item(&bytes(b"ABCD"), &slice).unwrap(), bytes(b"BC"));
        let tuple = Value::Tuple(vec![Value::from(1), Value::from(2), Value::from(3)]);
        assert_eq!(
            get_item(&tuple, &slice).unwrap(),
            Value::Tuple(vec![Value::from(2), Value::from(3)])
        );
        let range = Value::Range(NewRange::from_stop(10));
        assert_eq!(
            get_item(&range, &slice).unwrap(),
            Value::Range(NewRange::new(1, 3, 1).unwrap())
        );
    }

    #[test]
    fn test_bad_subscripts() {
        let err = get_item(&text("abc"), &text("a")).unwrap_err();
        assert_eq!(err.to_string(), "TypeError: string indices must be integers, not 'str'");
        let err = get_item(&Value::from(1), &Value::from(0)).unwrap_err();
        assert_eq!(err.to_string(), "TypeError: 'int' object is not subscriptable");
        let err = get_item(&Value::Tuple(vec![]), &Value::from(0)).unwrap_err();
        assert_eq!(err.to_string(), "IndexError: tuple index out of range");
    }

    #[test]
    fn test_contains_boundaries() {
        assert!(contains(&text("abc"), &text("b")).unwrap());
        assert!(contains(&text("abc"), &bytes(b"b")).unwrap_err().is_type_error());
        assert!(contains(&bytes(b"abc"), &text("b")).unwrap_err().is_type_error());
        assert!(contains(&Value::legacy(b"abc"), &text("b")).unwrap());
        assert!(contains(&Value::legacy(b"abc"), &bytes(b"bc")).unwrap());
        assert!(contains(&Value::from(1), &Value::from(1)).is_err());
    }

    #[test]
    fn test_dict_subscript() {
        let dict = NewDict::from_pairs([(text("k"), Value::from(1))]).unwrap();
        let value = Value::Dict(dict);
        assert_eq!(get_item(&value, &text("k")).unwrap(), Value::from(1));
        assert_eq!(get_item(&value, &text("x")).unwrap_err().exception_type(), "KeyError");
        assert!(contains(&value, &text("k")).unwrap());
    }

    #[test]
    fn test_len_and_iterate() {
        assert_eq!(len(&text("héllo")).unwrap(), 5);
        assert!(len(&Value::from(3)).unwrap_err().is_type_error());
        assert_eq!(iterate(&bytes(b"AB")).unwrap(), vec![Value::from(65), Value::from(66)]);
        assert_eq!(iterate(&text("ab")).unwrap(), vec![text("a"), text("b")]);
        let list = Value::List(NewList::from(vec![Value::None]));
        assert_eq!(iterate(&list).unwrap().len(), 1);
        assert_eq!(iterate(&Value::Range(NewRange::from_stop(3))).unwrap().len(), 3);
        assert!(iterate(&Value::from(1.0)).unwrap_err().is_type_error());
    }
}
