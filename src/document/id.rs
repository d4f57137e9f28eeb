//! Index-based references between document elements.

use std::fmt;

/// An optional 32-bit index into a sibling element array.
///
/// glTF cross-references are plain array indices; `u32::MAX` is reserved as
/// the "absent" sentinel so element records stay `Copy`-dense. An
/// `ElementId` is only ever a lookup key - it is dereferenced into a direct
/// link during graph building, never treated as an owning reference.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementId(u32);

impl ElementId {
    /// The "absent" sentinel.
    pub const NONE: Self = Self(u32::MAX);

    /// Create an id from a concrete index.
    #[inline]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// True if this id is the absent sentinel.
    #[inline]
    pub const fn is_none(self) -> bool {
        self.0 == u32::MAX
    }

    /// True if this id holds a concrete index.
    #[inline]
    pub const fn is_some(self) -> bool {
        !self.is_none()
    }

    /// The index as a usize, or None for the absent sentinel.
    #[inline]
    pub const fn index(self) -> Option<usize> {
        if self.is_none() {
            None
        } else {
            Some(self.0 as usize)
        }
    }

    /// Look up the referenced element in its sibling array.
    /// Absent ids and out-of-range indices both yield None.
    #[inline]
    pub fn get<'a, T>(self, siblings: &'a [T]) -> Option<&'a T> {
        siblings.get(self.index()?)
    }
}

impl Default for ElementId {
    fn default() -> Self {
        Self::NONE
    }
}

impl From<Option<u32>> for ElementId {
    fn from(index: Option<u32>) -> Self {
        match index {
            Some(i) => Self::new(i),
            None => Self::NONE,
        }
    }
}

impl fmt::Debug for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            write!(f, "ElementId(none)")
        } else {
            write!(f, "ElementId({})", self.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel() {
        assert!(ElementId::NONE.is_none());
        assert_eq!(ElementId::NONE.index(), None);
        assert_eq!(ElementId::default(), ElementId::NONE);
    }

    #[test]
    fn test_lookup() {
        let items = ["a", "b", "c"];
        assert_eq!(ElementId::new(1).get(&items), Some(&"b"));
        assert_eq!(ElementId::new(9).get(&items), None);
        assert_eq!(ElementId::NONE.get(&items), None);
    }
}
