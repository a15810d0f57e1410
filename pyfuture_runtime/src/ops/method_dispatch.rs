//! By-name method calls on [`Value`]s.
//!
//! This is where the removed cross-type methods surface: `str.decode` and
//! `bytes.encode` raise `AttributeError`, exactly like any other unknown
//! name. Argument positions are type checked per receiver, so a text method
//! given binary data (or the reverse) raises `TypeError` before the typed
//! implementation runs.

use super::containers;
use crate::types::{ByteOrder, NewBytes, NewDict, NewInt, NewList, NewStr, TranslationTable};
use crate::value::Value;
use pyfuture_core::codec::STRICT;
use pyfuture_core::{FutureError, FutureResult};
use tracing::trace;

// =============================================================================
// Argument Helpers
// =============================================================================

struct Args<'a> {
    method: &'a str,
    values: &'a [Value],
}

impl<'a> Args<'a> {
    fn new(method: &'a str, values: &'a [Value], max: usize) -> FutureResult<Self> {
        if values.len() > max {
            return Err(FutureError::type_error(format!(
                "{method}() takes at most {max} arguments ({} given)",
                values.len()
            )));
        }
        Ok(Self { method, values })
    }

    /// Argument `i`, treating an explicit `None` as absent.
    fn get(&self, i: usize) -> Option<&'a Value> {
        self.values.get(i).filter(|v| !matches!(v, Value::None))
    }

    fn required(&self, i: usize) -> FutureResult<&'a Value> {
        self.values.get(i).ok_or_else(|| {
            FutureError::type_error(format!(
                "{}() missing required argument (pos {})",
                self.method,
                i + 1
            ))
        })
    }

    fn text(&self, i: usize) -> FutureResult<NewStr> {
        text_of(self.required(i)?)
    }

    fn opt_text(&self, i: usize) -> FutureResult<Option<NewStr>> {
        self.get(i).map(text_of).transpose()
    }

    fn binary(&self, i: usize) -> FutureResult<Vec<u8>> {
        binary_of(self.required(i)?)
    }

    fn opt_binary(&self, i: usize) -> FutureResult<Option<Vec<u8>>> {
        self.get(i).map(binary_of).transpose()
    }

    fn opt_int(&self, i: usize) -> FutureResult<Option<i64>> {
        self.get(i).map(int_of).transpose()
    }

    fn int_or(&self, i: usize, default: i64) -> FutureResult<i64> {
        Ok(self.opt_int(i)?.unwrap_or(default))
    }

    fn flag(&self, i: usize) -> bool {
        match self.get(i) {
            Some(Value::Bool(b)) => *b,
            Some(other) => other.as_int().is_some_and(|n| !n.is_zero()),
            None => false,
        }
    }

    fn name_or(&self, i: usize, default: &'a str) -> FutureResult<String> {
        match self.get(i) {
            Some(value) => text_of(value)?.to_native(),
            None => Ok(default.to_string()),
        }
    }

    fn iterable(&self, i: usize) -> FutureResult<Vec<Value>> {
        containers::iterate(self.required(i)?)
    }
}

fn text_of(value: &Value) -> FutureResult<NewStr> {
    match value {
        Value::Str(text) => Ok(text.clone()),
        Value::LegacyBytes(raw) => NewStr::decode_legacy(raw),
        other => Err(FutureError::type_error(format!(
            "must be str, not {}",
            other.type_name()
        ))),
    }
}

fn binary_of(value: &Value) -> FutureResult<Vec<u8>> {
    match value {
        Value::Bytes(data) => Ok(data.as_bytes().to_vec()),
        Value::LegacyBytes(raw) => Ok(raw.to_vec()),
        other => Err(FutureError::type_error(format!(
            "a bytes-like object is required, not '{}'",
            other.type_name()
        ))),
    }
}

fn int_of(value: &Value) -> FutureResult<i64> {
    value
        .as_int()
        .ok_or_else(|| {
            FutureError::type_error(format!(
                "'{}' object cannot be interpreted as an integer",
                value.type_name()
            ))
        })?
        .to_index()
}

fn str_list(items: Vec<NewStr>) -> Value {
    Value::List(items.into_iter().map(Value::Str).collect())
}

fn bytes_list(items: Vec<NewBytes>) -> Value {
    Value::List(items.into_iter().map(Value::Bytes).collect())
}

fn triple<T: Into<Value>>((a, b, c): (T, T, T)) -> Value {
    Value::Tuple(vec![a.into(), b.into(), c.into()])
}

fn index_value(position: usize) -> Value {
    Value::from(position)
}

// =============================================================================
// str
// =============================================================================

/// Convert a `str.maketrans` result into a dict of ordinals.
fn table_to_dict(table: &TranslationTable) -> FutureResult<NewDict> {
    let mut entries: Vec<_> = table.iter().collect();
    entries.sort_by_key(|(cp, _)| **cp);
    NewDict::from_pairs(entries.into_iter().map(|(&cp, &mapped)| {
        (Value::from(cp), mapped.map_or(Value::None, Value::from))
    }))
}

/// Read a translation table passed to `str.translate`.
fn dict_to_table(value: &Value) -> FutureResult<TranslationTable> {
    let Value::Dict(dict) = value else {
        return Err(FutureError::type_error(format!(
            "translate() argument must be a dict, not {}",
            value.type_name()
        )));
    };
    let mut table = TranslationTable::default();
    for (key, mapped) in dict.iter() {
        let Some(cp) = key.as_int().and_then(|n| n.to_i64()).and_then(|n| u32::try_from(n).ok()) else {
            continue;
        };
        let target = match mapped {
            Value::None => None,
            Value::Str(text) if text.len() == 1 => Some(text.code_points()[0]),
            other => {
                let n = int_of(other)?;
                Some(u32::try_from(n).map_err(|_| {
                    FutureError::value_error("character mapping must be in range(0x110000)")
                })?)
            }
        };
        table.insert(cp, target);
    }
    Ok(table)
}

fn call_str(text: &NewStr, name: &str, values: &[Value]) -> FutureResult<Value> {
    let args = |max| Args::new(name, values, max);
    Ok(match name {
        "encode" => {
            let a = args(2)?;
            let encoding = a.name_or(0, "utf-8")?;
            let errors = a.name_or(1, STRICT)?;
            Value::Bytes(text.encode(&encoding, &errors)?)
        }
        "startswith" | "endswith" => {
            let a = args(3)?;
            let affix = a.required(0)?;
            let (start, end) = (a.opt_int(1)?, a.opt_int(2)?);
            let hit = if name == "startswith" {
                text.startswith(affix, start, end)?
            } else {
                text.endswith(affix, start, end)?
            };
            Value::Bool(hit)
        }
        "find" | "rfind" | "index" | "rindex" | "count" => {
            let a = args(3)?;
            let sub = a.text(0)?;
            let (start, end) = (a.opt_int(1)?, a.opt_int(2)?);
            match name {
                "find" => Value::from(text.find(&sub, start, end)),
                "rfind" => Value::from(text.rfind(&sub, start, end)),
                "index" => index_value(text.index(&sub, start, end)?),
                "rindex" => index_value(text.rindex(&sub, start, end)?),
                _ => Value::from(text.count(&sub, start, end)),
            }
        }
        "replace" => {
            let a = args(3)?;
            Value::Str(text.replace(&a.text(0)?, &a.text(1)?, a.int_or(2, -1)?))
        }
        "split" | "rsplit" => {
            let a = args(2)?;
            let sep = a.opt_text(0)?;
            let maxsplit = a.int_or(1, -1)?;
            let parts = if name == "split" {
                text.split(sep.as_ref(), maxsplit)?
            } else {
                text.rsplit(sep.as_ref(), maxsplit)?
            };
            str_list(parts)
        }
        "partition" => triple(text.partition(&args(1)?.text(0)?)?),
        "rpartition" => triple(text.rpartition(&args(1)?.text(0)?)?),
        "splitlines" => str_list(text.splitlines(args(1)?.flag(0))),
        "strip" => Value::Str(text.strip(args(1)?.opt_text(0)?.as_ref())),
        "lstrip" => Value::Str(text.lstrip(args(1)?.opt_text(0)?.as_ref())),
        "rstrip" => Value::Str(text.rstrip(args(1)?.opt_text(0)?.as_ref())),
        "lower" => {
            args(0)?;
            Value::Str(text.lower())
        }
        "upper" => {
            args(0)?;
            Value::Str(text.upper())
        }
        "isidentifier" => {
            args(0)?;
            Value::Bool(text.isidentifier())
        }
        "join" => Value::Str(text.join(&args(1)?.iterable(0)?)?),
        "maketrans" => {
            let a = args(3)?;
            let table = NewStr::maketrans(&a.text(0)?, &a.text(1)?, a.opt_text(2)?.as_ref())?;
            Value::Dict(table_to_dict(&table)?)
        }
        "translate" => Value::Str(text.translate(&dict_to_table(args(1)?.required(0)?)?)),
        _ => return Err(FutureError::no_attribute("str", name)),
    })
}

// =============================================================================
// bytes
// =============================================================================

fn call_bytes(data: &NewBytes, name: &str, values: &[Value]) -> FutureResult<Value> {
    let args = |max| Args::new(name, values, max);
    Ok(match name {
        "decode" => {
            let a = args(2)?;
            let encoding = a.name_or(0, "utf-8")?;
            let errors = a.name_or(1, STRICT)?;
            Value::Str(data.decode(&encoding, &errors)?)
        }
        "startswith" | "endswith" => {
            let a = args(3)?;
            let affix = a.required(0)?;
            let (start, end) = (a.opt_int(1)?, a.opt_int(2)?);
            let hit = if name == "startswith" {
                data.startswith(affix, start, end)?
            } else {
                data.endswith(affix, start, end)?
            };
            Value::Bool(hit)
        }
        "find" | "rfind" | "index" | "rindex" | "count" => {
            let a = args(3)?;
            let sub = a.binary(0)?;
            let (start, end) = (a.opt_int(1)?, a.opt_int(2)?);
            match name {
                "find" => Value::from(data.find(&sub, start, end)),
                "rfind" => Value::from(data.rfind(&sub, start, end)),
                "index" => index_value(data.index(&sub, start, end)?),
                "rindex" => index_value(data.rindex(&sub, start, end)?),
                _ => Value::from(data.count(&sub, start, end)),
            }
        }
        "replace" => {
            let a = args(3)?;
            Value::Bytes(data.replace(&a.binary(0)?, &a.binary(1)?, a.int_or(2, -1)?))
        }
        "split" | "rsplit" => {
            let a = args(2)?;
            let sep = a.opt_binary(0)?;
            let maxsplit = a.int_or(1, -1)?;
            let parts = if name == "split" {
                data.split(sep.as_deref(), maxsplit)?
            } else {
                data.rsplit(sep.as_deref(), maxsplit)?
            };
            bytes_list(parts)
        }
        "partition" => triple(data.partition(&args(1)?.binary(0)?)?),
        "rpartition" => triple(data.rpartition(&args(1)?.binary(0)?)?),
        "splitlines" => bytes_list(data.splitlines(args(1)?.flag(0))),
        "strip" => Value::Bytes(data.strip(args(1)?.opt_binary(0)?.as_deref())),
        "lstrip" => Value::Bytes(data.lstrip(args(1)?.opt_binary(0)?.as_deref())),
        "rstrip" => Value::Bytes(data.rstrip(args(1)?.opt_binary(0)?.as_deref())),
        "lower" => {
            args(0)?;
            Value::Bytes(data.lower())
        }
        "upper" => {
            args(0)?;
            Value::Bytes(data.upper())
        }
        "join" => Value::Bytes(data.join(&args(1)?.iterable(0)?)?),
        "hex" => {
            args(0)?;
            Value::from(data.hex().as_str())
        }
        "fromhex" => Value::Bytes(NewBytes::fromhex(&args(1)?.text(0)?)?),
        "maketrans" => {
            let a = args(2)?;
            Value::Bytes(NewBytes::maketrans(&a.binary(0)?, &a.binary(1)?)?)
        }
        "translate" => {
            let a = args(2)?;
            let table = a.opt_binary(0)?;
            let delete = a.opt_binary(1)?.unwrap_or_default();
            Value::Bytes(data.translate(table.as_deref(), &delete)?)
        }
        _ => return Err(FutureError::no_attribute("bytes", name)),
    })
}

// =============================================================================
// int, range, list, dict
// =============================================================================

fn call_int(n: &NewInt, name: &str, values: &[Value]) -> FutureResult<Value> {
    let args = |max| Args::new(name, values, max);
    Ok(match name {
        "bit_length" => {
            args(0)?;
            Value::from(n.bit_length())
        }
        "to_bytes" => {
            let a = args(3)?;
            let length = usize::try_from(a.int_or(0, 1)?)
                .map_err(|_| FutureError::value_error("length argument must be non-negative"))?;
            let order = ByteOrder::parse(&a.name_or(1, "big")?)?;
            Value::Bytes(n.to_bytes(length, order, a.flag(2))?)
        }
        "from_bytes" => {
            let a = args(3)?;
            let raw = a.binary(0)?;
            let order = ByteOrder::parse(&a.name_or(1, "big")?)?;
            Value::Int(NewInt::from_bytes(&raw, order, a.flag(2)))
        }
        _ => return Err(FutureError::no_attribute("int", name)),
    })
}

fn call_list(list: &NewList, name: &str, values: &[Value]) -> FutureResult<Value> {
    let args = |max| Args::new(name, values, max);
    Ok(match name {
        "index" => index_value(list.index(args(1)?.required(0)?)?),
        "count" => Value::from(list.count(args(1)?.required(0)?)),
        "copy" => {
            args(0)?;
            Value::List(list.copy())
        }
        _ => return Err(FutureError::no_attribute("list", name)),
    })
}

fn call_list_mut(list: &mut NewList, name: &str, values: &[Value]) -> FutureResult<Value> {
    let args = |max| Args::new(name, values, max);
    match name {
        "append" => list.append(args(1)?.required(0)?.clone()),
        "extend" => list.extend(args(1)?.iterable(0)?),
        "insert" => {
            let a = args(2)?;
            list.insert(int_of(a.required(0)?)?, a.required(1)?.clone());
        }
        "pop" => return list.pop(args(1)?.opt_int(0)?),
        "remove" => list.remove(args(1)?.required(0)?)?,
        "reverse" => {
            args(0)?;
            list.reverse();
        }
        "clear" => {
            args(0)?;
            list.clear();
        }
        _ => return call_list(list, name, values),
    }
    Ok(Value::None)
}

fn call_dict(dict: &NewDict, name: &str, values: &[Value]) -> FutureResult<Value> {
    let args = |max| Args::new(name, values, max);
    Ok(match name {
        "get" => {
            let a = args(2)?;
            let default = a.values.get(1).cloned().unwrap_or(Value::None);
            dict.get(a.required(0)?)?.cloned().unwrap_or(default)
        }
        "copy" => {
            args(0)?;
            Value::Dict(dict.copy())
        }
        _ => return Err(FutureError::no_attribute("dict", name)),
    })
}

fn call_dict_mut(dict: &mut NewDict, name: &str, values: &[Value]) -> FutureResult<Value> {
    let args = |max| Args::new(name, values, max);
    match name {
        "pop" => {
            let a = args(2)?;
            let key = a.required(0)?;
            return match (dict.remove(key), a.values.get(1)) {
                (Ok(value), _) => Ok(value),
                (Err(err), Some(default)) if err.exception_type() == "KeyError" => Ok(default.clone()),
                (Err(err), _) => Err(err),
            };
        }
        "update" => match args(1)?.required(0)? {
            Value::Dict(other) => dict.update(other),
            other => {
                return Err(FutureError::type_error(format!(
                    "'{}' object is not a mapping",
                    other.type_name()
                )));
            }
        },
        "clear" => {
            args(0)?;
            dict.clear();
        }
        _ => return call_dict(dict, name, values),
    }
    Ok(Value::None)
}

// =============================================================================
// Entry Points
// =============================================================================

/// Call `receiver.name(*args)` for a method that does not mutate.
pub fn call_method(receiver: &Value, name: &str, args: &[Value]) -> FutureResult<Value> {
    trace!(receiver = receiver.type_name(), method = name, argc = args.len(), "call_method");
    match receiver {
        Value::Str(text) => call_str(text, name, args),
        Value::Bytes(data) => call_bytes(data, name, args),
        Value::LegacyBytes(raw) => call_bytes(&NewBytes::from(&raw[..]), name, args),
        Value::Int(n) => call_int(n, name, args),
        Value::Bool(b) => call_int(&NewInt::from(*b), name, args),
        Value::Range(range) => {
            let a = Args::new(name, args, 1)?;
            match name {
                "index" => range.index(a.required(0)?).map(Value::Int),
                "count" => Ok(Value::from(range.count(a.required(0)?))),
                _ => Err(FutureError::no_attribute("range", name)),
            }
        }
        Value::List(list) => call_list(list, name, args),
        Value::Dict(dict) => call_dict(dict, name, args),
        other => Err(FutureError::no_attribute(other.type_name(), name)),
    }
}

/// Call `receiver.name(*args)`, allowing list and dict mutation.
pub fn call_method_mut(receiver: &mut Value, name: &str, args: &[Value]) -> FutureResult<Value> {
    match receiver {
        Value::List(list) => call_list_mut(list, name, args),
        Value::Dict(dict) => call_dict_mut(dict, name, args),
        other => call_method(other, name, args),
    }
}
