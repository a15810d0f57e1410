//! Python 3 `list`.
//!
//! A mutable sequence of [`Value`]s with the Python 3 additions `copy()` and
//! `clear()`. User list types wrap a `NewList` and implement
//! [`ListSubtype`] so copying, slicing and concatenation keep their type.

use super::search;
use super::slice::{Slice, normalize_index};
use crate::ops::comparison::values_equal;
use crate::value::Value;
use pyfuture_core::{FutureError, FutureResult};
use std::fmt;

/// Python 3 list.
#[derive(Clone, Default)]
pub struct NewList {
    items: Vec<Value>,
}

impl NewList {
    /// Create an empty list.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty list with room for `capacity` items.
    #[inline]
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
        }
    }

    /// Number of items.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Borrow the items.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[Value] {
        &self.items
    }

    /// Iterate over the items.
    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.items.iter()
    }

    /// Native conversion: the items as a plain vector.
    #[must_use]
    pub fn to_vec(&self) -> Vec<Value> {
        self.items.clone()
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// `l.append(x)`.
    #[inline]
    pub fn append(&mut self, item: Value) {
        self.items.push(item);
    }

    /// `l.extend(items)`.
    pub fn extend(&mut self, items: impl IntoIterator<Item = Value>) {
        self.items.extend(items);
    }

    /// `l.insert(i, x)`; out-of-range indices clamp to the ends.
    pub fn insert(&mut self, index: i64, item: Value) {
        let len = i64::try_from(self.len()).unwrap_or(i64::MAX);
        let at = if index < 0 { index.saturating_add(len).max(0) } else { index.min(len) };
        self.items.insert(at as usize, item);
    }

    /// `l.pop(i)`; `None` pops the last item.
    pub fn pop(&mut self, index: Option<i64>) -> FutureResult<Value> {
        if self.items.is_empty() {
            return Err(FutureError::index("pop from empty list"));
        }
        let at = normalize_index(index.unwrap_or(-1), self.len())
            .ok_or_else(|| FutureError::index("pop index out of range"))?;
        Ok(self.items.remove(at))
    }

    /// `l.remove(x)`: drop the first item equal to `x`.
    pub fn remove(&mut self, item: &Value) -> FutureResult<()> {
        let at = self
            .position(item)
            .ok_or_else(|| FutureError::value_error("list.remove(x): x not in list"))?;
        self.items.remove(at);
        Ok(())
    }

    /// `l.reverse()`.
    pub fn reverse(&mut self) {
        self.items.reverse();
    }

    /// `l.clear()`.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// `l[index] = item`.
    pub fn set(&mut self, index: i64, item: Value) -> FutureResult<()> {
        let at = normalize_index(index, self.len())
            .ok_or_else(|| FutureError::index("list assignment index out of range"))?;
        self.items[at] = item;
        Ok(())
    }

    // =========================================================================
    // Queries
    // =========================================================================

    fn position(&self, item: &Value) -> Option<usize> {
        self.items.iter().position(|x| values_equal(x, item))
    }

    /// `l[index]`.
    pub fn get(&self, index: i64) -> FutureResult<&Value> {
        normalize_index(index, self.len())
            .map(|i| &self.items[i])
            .ok_or_else(|| FutureError::index("list index out of range"))
    }

    /// `x in l`.
    #[must_use]
    pub fn contains(&self, item: &Value) -> bool {
        self.position(item).is_some()
    }

    /// `l.index(x)`.
    pub fn index(&self, item: &Value) -> FutureResult<usize> {
        self.position(item)
            .ok_or_else(|| FutureError::value_error(format!("{} is not in list", item.repr())))
    }

    /// `l.count(x)`.
    #[must_use]
    pub fn count(&self, item: &Value) -> usize {
        self.items.iter().filter(|x| values_equal(x, item)).count()
    }

    /// `l.copy()`: a shallow copy.
    #[must_use]
    pub fn copy(&self) -> Self {
        self.clone()
    }

    /// `l[start:stop:step]`.
    pub fn slice(&self, slice: &Slice) -> FutureResult<Self> {
        let indices = slice.indices(self.len())?;
        Ok(Self::from(indices.select(&self.items)))
    }

    /// `l + other`.
    #[must_use]
    pub fn concat(&self, other: &Self) -> Self {
        let mut items = Vec::with_capacity(self.len() + other.len());
        items.extend_from_slice(&self.items);
        items.extend_from_slice(&other.items);
        Self { items }
    }

    /// `l * count`; non-positive counts give an empty list.
    pub fn repeat(&self, count: i64) -> FutureResult<Self> {
        let items = search::repeat_slice(&self.items, count, "repeated list is too long")?;
        Ok(Self { items })
    }

    /// `repr(l)`.
    #[must_use]
    pub fn repr(&self) -> String {
        let parts: Vec<String> = self.items.iter().map(Value::repr).collect();
        format!("[{}]", parts.join(", "))
    }
}

// =============================================================================
// Subtypes
// =============================================================================

/// A user list type built on [`NewList`].
///
/// Implementors supply the wrapping and unwrapping; copying, slicing,
/// concatenation and repetition then produce `Self` rather than a bare list.
pub trait ListSubtype: Sized {
    /// Borrow the underlying list.
    fn as_list(&self) -> &NewList;

    /// Mutably borrow the underlying list.
    fn as_list_mut(&mut self) -> &mut NewList;

    /// Wrap a list in this type.
    fn from_list(list: NewList) -> Self;

    /// Shallow copy preserving the subtype.
    fn copy(&self) -> Self {
        Self::from_list(self.as_list().copy())
    }

    /// Slice preserving the subtype.
    fn slice(&self, slice: &Slice) -> FutureResult<Self> {
        self.as_list().slice(slice).map(Self::from_list)
    }

    /// Concatenation preserving the subtype.
    fn concat(&self, other: &NewList) -> Self {
        Self::from_list(self.as_list().concat(other))
    }

    /// Repetition preserving the subtype.
    fn repeat(&self, count: i64) -> FutureResult<Self> {
        self.as_list().repeat(count).map(Self::from_list)
    }
}

impl ListSubtype for NewList {
    fn as_list(&self) -> &NewList {
        self
    }

    fn as_list_mut(&mut self) -> &mut NewList {
        self
    }

    fn from_list(list: NewList) -> Self {
        list
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

impl From<Vec<Value>> for NewList {
    fn from(items: Vec<Value>) -> Self {
        Self { items }
    }
}

impl FromIterator<Value> for NewList {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a NewList {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl PartialEq for NewList {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self.items.iter().zip(&other.items).all(|(a, b)| values_equal(a, b))
    }
}

impl fmt::Debug for NewList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NewList({})", self.repr())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(items: &[i64]) -> NewList {
        items.iter().map(|&i| Value::from(i)).collect()
    }

    /// A user subtype that tracks nothing extra.
    #[derive(Debug, Clone, PartialEq)]
    struct Stack(NewList);

    impl ListSubtype for Stack {
        fn as_list(&self) -> &NewList {
            &self.0
        }

        fn as_list_mut(&mut self) -> &mut NewList {
            &mut self.0
        }

        fn from_list(list: NewList) -> Self {
            Stack(list)
        }
    }

    #[test]
    fn test_copy_is_shallow_and_independent() {
        let original = list(&[1, 2, 3]);
        let mut copy = original.copy();
        copy.append(Value::from(4));
        assert_eq!(original.len(), 3);
        assert_eq!(copy.len(), 4);
    }

    #[test]
    fn test_clear() {
        let mut l = list(&[1, 2]);
        l.clear();
        assert!(l.is_empty());
    }

    #[test]
    fn test_subtype_preserved() {
        let stack = Stack(list(&[1, 2, 3]));
        let copied: Stack = stack.copy();
        assert_eq!(copied, stack);
        let sliced = stack.slice(&Slice::new(None, None, Some(-1))).unwrap();
        assert_eq!(sliced.0, list(&[3, 2, 1]));
        let joined = stack.concat(&list(&[4]));
        assert_eq!(joined.as_list().len(), 4);

        let mut grown = stack.repeat(2).unwrap();
        grown.as_list_mut().append(Value::from(7));
        assert_eq!(grown.as_list().len(), 7);
    }

    #[test]
    fn test_pop_and_insert() {
        let mut l = list(&[1, 2, 3]);
        assert_eq!(l.pop(None).unwrap(), Value::from(3));
        assert_eq!(l.pop(Some(0)).unwrap(), Value::from(1));
        l.insert(-10, Value::from(0));
        l.insert(99, Value::from(9));
        assert_eq!(l, list(&[0, 2, 9]));

        let err = l.pop(Some(5)).unwrap_err();
        assert_eq!(err.to_string(), "IndexError: pop index out of range");
        let err = NewList::new().pop(None).unwrap_err();
        assert_eq!(err.to_string(), "IndexError: pop from empty list");
    }

    #[test]
    fn test_remove_and_index() {
        let mut l = list(&[1, 2, 1]);
        assert_eq!(l.index(&Value::from(2)).unwrap(), 1);
        assert_eq!(l.count(&Value::from(1)), 2);
        l.remove(&Value::from(1)).unwrap();
        assert_eq!(l, list(&[2, 1]));

        let err = l.remove(&Value::from(5)).unwrap_err();
        assert_eq!(err.to_string(), "ValueError: list.remove(x): x not in list");
        let err = l.index(&Value::from("a")).unwrap_err();
        assert_eq!(err.to_string(), "ValueError: 'a' is not in list");
    }

    #[test]
    fn test_numeric_equality_in_lookup() {
        let l = list(&[1, 2]);
        assert!(l.contains(&Value::from(2.0)));
        assert!(l.contains(&Value::from(true)));
    }

    #[test]
    fn test_get_set_negative() {
        let mut l = list(&[1, 2, 3]);
        assert_eq!(l.get(-1).unwrap(), &Value::from(3));
        l.set(-3, Value::from(10)).unwrap();
        assert_eq!(l.get(0).unwrap(), &Value::from(10));
        assert!(l.get(3).is_err());
        let err = l.set(3, Value::None).unwrap_err();
        assert_eq!(err.to_string(), "IndexError: list assignment index out of range");
    }

    #[test]
    fn test_repeat_and_repr() {
        assert_eq!(list(&[1]).repeat(3).unwrap(), list(&[1, 1, 1]));
        assert!(list(&[1]).repeat(-1).unwrap().is_empty());
        assert!(NewList::new().repeat(i64::MAX).unwrap().is_empty());
        let err = list(&[1]).repeat(i64::MAX).unwrap_err();
        assert_eq!(err.to_string(), "OverflowError: repeated list is too long");
        assert_eq!(list(&[1, 2]).repr(), "[1, 2]");
        let mut l = list(&[1]);
        l.reverse();
        l.extend([Value::from(2)]);
        assert_eq!(l.to_vec().len(), 2);
    }
}
