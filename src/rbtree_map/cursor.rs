use core::borrow::Borrow;
use core::fmt;

use super::RBTreeMap;
use crate::error::{Error, Result};
use crate::raw::{Handle, RawRBTreeMap};

/// A position inside a [`RBTreeMap`]: either on an entry or on the end sentinel.
///
/// The end sentinel sits both after the largest and before the smallest key, so
/// stepping off either edge lands on it and stepping from it wraps around:
/// [`move_next`](Cursor::move_next) from the end goes to the first entry and
/// [`move_prev`](Cursor::move_prev) from the end goes to the last one.
///
/// Two cursors compare equal when they point into the same map at the same position.
///
/// # Examples
///
/// ```
/// use rb_map::{Error, RBTreeMap};
///
/// let map = RBTreeMap::from([(10, "Aharon"), (6, "Baruch"), (3, "Sarah")]);
/// assert_eq!(map.find(&2), map.end());
///
/// let mut cursor = map.find(&6);
/// assert_eq!(cursor.get(), Ok((&6, &"Baruch")));
/// cursor.move_prev();
/// assert_eq!(cursor, map.begin());
/// cursor.move_prev();
/// assert_eq!(cursor.get(), Err(Error::CursorOutOfRange));
/// ```
pub struct Cursor<'a, K, V> {
    raw: &'a RawRBTreeMap<K, V>,
    current: Option<Handle>,
}

/// A position inside a [`RBTreeMap`] that can modify the value it points at, or
/// remove the entry.
///
/// Follows the same end-sentinel rules as [`Cursor`].
pub struct CursorMut<'a, K, V> {
    raw: &'a mut RawRBTreeMap<K, V>,
    current: Option<Handle>,
}

/// Where `current` lands after one step towards larger (`forward`) or smaller keys.
fn step<K, V>(raw: &RawRBTreeMap<K, V>, current: Option<Handle>, forward: bool) -> Option<Handle> {
    match (current, forward) {
        (Some(handle), true) => raw.next(handle),
        (Some(handle), false) => raw.prev(handle),
        (None, true) => raw.first(),
        (None, false) => raw.last(),
    }
}

impl<'a, K, V> Cursor<'a, K, V> {
    /// Returns `true` if the cursor is on the end sentinel.
    #[must_use]
    pub fn is_end(&self) -> bool {
        self.current.is_none()
    }

    /// The key under the cursor, or `None` at the end sentinel.
    #[must_use]
    pub fn key(&self) -> Option<&'a K> {
        self.current.map(|handle| self.raw.node(handle).key())
    }

    /// The value under the cursor, or `None` at the end sentinel.
    #[must_use]
    pub fn value(&self) -> Option<&'a V> {
        self.current.map(|handle| self.raw.node(handle).value())
    }

    /// Dereferences the cursor.
    ///
    /// # Errors
    ///
    /// [`Error::CursorOutOfRange`] when the cursor is on the end sentinel.
    pub fn get(&self) -> Result<(&'a K, &'a V)> {
        let handle = self.current.ok_or(Error::CursorOutOfRange)?;
        let node = self.raw.node(handle);
        Ok((node.key(), node.value()))
    }

    /// Steps to the next larger key; past the last entry this is the end sentinel.
    pub fn move_next(&mut self) {
        self.current = step(self.raw, self.current, true);
    }

    /// Steps to the next smaller key; before the first entry this is the end sentinel.
    pub fn move_prev(&mut self) {
        self.current = step(self.raw, self.current, false);
    }
}

impl<K, V> Clone for Cursor<'_, K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V> Copy for Cursor<'_, K, V> {}

impl<K, V> PartialEq for Cursor<'_, K, V> {
    fn eq(&self, other: &Self) -> bool {
        core::ptr::eq(self.raw, other.raw) && self.current == other.current
    }
}

impl<K, V> Eq for Cursor<'_, K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Cursor<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Cursor").field(&self.get().ok()).finish()
    }
}

impl<'a, K, V> CursorMut<'a, K, V> {
    /// Returns `true` if the cursor is on the end sentinel.
    #[must_use]
    pub fn is_end(&self) -> bool {
        self.current.is_none()
    }

    #[must_use]
    pub fn key(&self) -> Option<&K> {
        self.current.map(|handle| self.raw.node(handle).key())
    }

    /// Mutable access to the value under the cursor.
    pub fn value_mut(&mut self) -> Option<&mut V> {
        let handle = self.current?;
        Some(self.raw.node_mut(handle).value_mut())
    }

    /// Dereferences the cursor.
    ///
    /// # Errors
    ///
    /// [`Error::CursorOutOfRange`] when the cursor is on the end sentinel.
    pub fn get(&self) -> Result<(&K, &V)> {
        let handle = self.current.ok_or(Error::CursorOutOfRange)?;
        let node = self.raw.node(handle);
        Ok((node.key(), node.value()))
    }

    /// Dereferences the cursor with write access to the value.
    ///
    /// # Errors
    ///
    /// [`Error::CursorOutOfRange`] when the cursor is on the end sentinel.
    pub fn get_mut(&mut self) -> Result<(&K, &mut V)> {
        let handle = self.current.ok_or(Error::CursorOutOfRange)?;
        Ok(self.raw.node_mut(handle).key_value_mut())
    }

    pub fn move_next(&mut self) {
        self.current = step(self.raw, self.current, true);
    }

    pub fn move_prev(&mut self) {
        self.current = step(self.raw, self.current, false);
    }

    /// Removes the entry under the cursor and moves to the following one.
    ///
    /// Returns `None`, leaving the cursor in place, when on the end sentinel.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_map::RBTreeMap;
    ///
    /// let mut map = RBTreeMap::from([(1, "a"), (2, "b"), (3, "c")]);
    /// let mut cursor = map.find_mut(&2);
    /// assert_eq!(cursor.remove_current(), Some((2, "b")));
    /// assert_eq!(cursor.key(), Some(&3));
    /// assert_eq!(map.len(), 2);
    /// ```
    pub fn remove_current(&mut self) -> Option<(K, V)> {
        let handle = self.current?;
        // The successor keeps its handle through the rebalancing below.
        self.current = self.raw.next(handle);
        Some(self.raw.remove_node(handle))
    }

    /// A read-only view of the same position.
    #[must_use]
    pub fn as_cursor(&self) -> Cursor<'_, K, V> {
        Cursor {
            raw: &*self.raw,
            current: self.current,
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for CursorMut<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CursorMut").field(&self.get().ok()).finish()
    }
}

impl<K, V> RBTreeMap<K, V> {
    fn cursor(&self, current: Option<Handle>) -> Cursor<'_, K, V> {
        Cursor { raw: &self.raw, current }
    }

    fn cursor_mut(&mut self, current: Option<Handle>) -> CursorMut<'_, K, V> {
        CursorMut {
            raw: &mut self.raw,
            current,
        }
    }

    /// A cursor on the smallest key, or the end sentinel for an empty map.
    pub fn begin(&self) -> Cursor<'_, K, V> {
        self.cursor(self.raw.first())
    }

    /// The end sentinel.
    pub fn end(&self) -> Cursor<'_, K, V> {
        self.cursor(None)
    }

    /// A cursor on the largest key, for walking backwards with
    /// [`move_prev`](Cursor::move_prev) until [`rend`](RBTreeMap::rend).
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_map::RBTreeMap;
    ///
    /// let map = RBTreeMap::from([(10, "Aharon"), (3, "Sarah"), (5, "Mendel")]);
    /// let mut keys = Vec::new();
    /// let mut cursor = map.rbegin();
    /// while cursor != map.rend() {
    ///     keys.push(*cursor.key().unwrap());
    ///     cursor.move_prev();
    /// }
    /// assert_eq!(keys, [10, 5, 3]);
    /// ```
    pub fn rbegin(&self) -> Cursor<'_, K, V> {
        self.cursor(self.raw.last())
    }

    /// The end sentinel, reached by stepping backwards past the smallest key. Equal to
    /// [`end`](RBTreeMap::end).
    pub fn rend(&self) -> Cursor<'_, K, V> {
        self.cursor(None)
    }

    /// A mutable cursor on the smallest key.
    pub fn begin_mut(&mut self) -> CursorMut<'_, K, V> {
        let first = self.raw.first();
        self.cursor_mut(first)
    }

    /// A mutable cursor on the largest key.
    pub fn rbegin_mut(&mut self) -> CursorMut<'_, K, V> {
        let last = self.raw.last();
        self.cursor_mut(last)
    }
}

impl<K: Ord, V> RBTreeMap<K, V> {
    /// A cursor on `key`, or the end sentinel if the key is absent.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn find<Q>(&self, key: &Q) -> Cursor<'_, K, V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.cursor(self.raw.search(key))
    }

    /// A mutable cursor on `key`, or the end sentinel if the key is absent.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_map::RBTreeMap;
    ///
    /// let mut map = RBTreeMap::from([(6, String::from("Baruch"))]);
    /// if let Some(value) = map.find_mut(&6).value_mut() {
    ///     value.push_str(" ben Neriah");
    /// }
    /// assert_eq!(map[&6], "Baruch ben Neriah");
    /// ```
    pub fn find_mut<Q>(&mut self, key: &Q) -> CursorMut<'_, K, V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let found = self.raw.search(key);
        self.cursor_mut(found)
    }
}
