use core::borrow::Borrow;
use core::cmp::Ordering;
use core::fmt;
use core::ptr;

use smallvec::SmallVec;

use super::Iter;
use crate::raw::{Handle, RawLlrbMap};

/// How far the walk has progressed through one node.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Visit {
    /// Just pushed; the left subtree has not been entered.
    Fresh,
    /// Left subtree done; the node is next to be designated.
    Ready,
    /// Designated; the right subtree has not been entered.
    Emitted,
    /// Right subtree entered; pop when it comes back to the top.
    Exhausted,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct Frame {
    node: Handle,
    visit: Visit,
}

impl Frame {
    const fn new(node: Handle, visit: Visit) -> Self {
        Self { node, visit }
    }
}

/// An LLRB of n nodes is at most 2 * log2(n + 1) deep, so 32 inline frames cover
/// every map of up to 65535 entries without touching the heap.
type Frames = SmallVec<[Frame; 32]>;

/// A position in the in-order sequence of a [`LlrbMap`](crate::LlrbMap).
///
/// A cursor either designates one entry or is at *end*. It is driven by an explicit
/// stack of frames rather than recursion, so it can stop after every entry and
/// resume later. Cursors come from [`begin`], [`end`] and [`find`]; the last one
/// seeks to a key and resumes in key order from there.
///
/// The cursor borrows the map, so the map cannot be mutated while a cursor exists.
///
/// Two cursors compare equal when they come from the same map and designate the same
/// entry, or are both at end. How a cursor reached its entry does not matter: a
/// cursor from `find(&k)` equals a cursor advanced from `begin()` onto `k`.
///
/// # Examples
///
/// ```
/// use llrb_map::LlrbMap;
///
/// let map = LlrbMap::from([(1, "a"), (3, "c"), (5, "e")]);
///
/// let mut cursor = map.find(&3);
/// assert_eq!(cursor.key_value(), Some((&3, &"c")));
///
/// cursor.advance();
/// assert_eq!(cursor.key(), Some(&5));
///
/// cursor.advance();
/// assert!(cursor.is_end());
/// assert!(cursor == map.end());
/// ```
///
/// [`begin`]: crate::LlrbMap::begin
/// [`end`]: crate::LlrbMap::end
/// [`find`]: crate::LlrbMap::find
pub struct Cursor<'a, K, V> {
    tree: &'a RawLlrbMap<K, V>,
    current: Option<Handle>,
    frames: Frames,
}

impl<'a, K, V> Cursor<'a, K, V> {
    /// A cursor past the last entry.
    pub(crate) fn end(tree: &'a RawLlrbMap<K, V>) -> Self {
        Cursor {
            tree,
            current: None,
            frames: Frames::new(),
        }
    }

    /// A cursor on the smallest entry, or at end for an empty map.
    pub(crate) fn begin(tree: &'a RawLlrbMap<K, V>) -> Self {
        let mut cursor = Cursor::end(tree);
        if let Some(root) = tree.root() {
            cursor.frames.push(Frame::new(root, Visit::Fresh));
            cursor.advance();
        }
        cursor
    }

    /// A cursor on `key`, set up so that advancing continues with the next larger key.
    /// At end if `key` is absent.
    pub(crate) fn seek<Q>(tree: &'a RawLlrbMap<K, V>, key: &Q) -> Self
    where
        K: Borrow<Q> + Ord,
        Q: ?Sized + Ord,
    {
        let mut cursor = Cursor::end(tree);
        let mut link = tree.root();

        while let Some(handle) = link {
            let node = tree.node(handle);
            match key.cmp(node.key().borrow()) {
                Ordering::Equal => {
                    cursor.frames.push(Frame::new(handle, Visit::Emitted));
                    cursor.current = Some(handle);
                    return cursor;
                }
                Ordering::Less => {
                    // Everything left of here is smaller, so this node comes up as soon
                    // as the left subtree is done.
                    cursor.frames.push(Frame::new(handle, Visit::Ready));
                    link = node.left();
                }
                Ordering::Greater => link = node.right(),
            }
        }

        cursor.frames.clear();
        cursor
    }

    /// Returns true if the cursor does not designate an entry.
    #[must_use]
    pub fn is_end(&self) -> bool {
        self.current.is_none()
    }

    /// Returns the designated key, or `None` at end.
    #[must_use]
    pub fn key(&self) -> Option<&'a K> {
        self.current.map(|handle| self.tree.node(handle).key())
    }

    /// Returns the designated value, or `None` at end.
    #[must_use]
    pub fn value(&self) -> Option<&'a V> {
        self.current.map(|handle| self.tree.node(handle).value())
    }

    /// Returns the designated entry, or `None` at end.
    #[must_use]
    pub fn key_value(&self) -> Option<(&'a K, &'a V)> {
        self.current.map(|handle| self.tree.node(handle).entry())
    }

    /// Moves to the next entry in key order. A cursor at end stays at end.
    ///
    /// # Complexity
    ///
    /// O(log n) worst case, amortized O(1) over a full traversal.
    pub fn advance(&mut self) {
        let tree = self.tree;

        loop {
            let Some(frame) = self.frames.last_mut() else {
                self.current = None;
                return;
            };
            let node = tree.node(frame.node);

            match frame.visit {
                Visit::Fresh => {
                    frame.visit = Visit::Ready;
                    if let Some(left) = node.left() {
                        self.frames.push(Frame::new(left, Visit::Fresh));
                    }
                }
                Visit::Ready => {
                    frame.visit = Visit::Emitted;
                    self.current = Some(frame.node);
                    return;
                }
                Visit::Emitted => {
                    frame.visit = Visit::Exhausted;
                    if let Some(right) = node.right() {
                        self.frames.push(Frame::new(right, Visit::Fresh));
                    }
                }
                Visit::Exhausted => {
                    self.frames.pop();
                }
            }
        }
    }
}

impl<K, V> Clone for Cursor<'_, K, V> {
    fn clone(&self) -> Self {
        Cursor {
            tree: self.tree,
            current: self.current,
            frames: self.frames.clone(),
        }
    }
}

impl<K, V> PartialEq for Cursor<'_, K, V> {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.tree, other.tree) && self.current == other.current
    }
}

impl<K, V> Eq for Cursor<'_, K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Cursor<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("entry", &self.key_value())
            .field("depth", &self.frames.len())
            .finish()
    }
}

impl<'a, K, V> IntoIterator for Cursor<'a, K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    /// Iterates from the designated entry onward, in key order.
    ///
    /// ```
    /// use llrb_map::LlrbMap;
    ///
    /// let map: LlrbMap<i32, ()> = (0..10).map(|k| (k, ())).collect();
    /// let tail: Vec<i32> = map.find(&6).into_iter().map(|(k, _)| *k).collect();
    /// assert_eq!(tail, [6, 7, 8, 9]);
    /// ```
    fn into_iter(self) -> Iter<'a, K, V> {
        Iter {
            cursor: self,
            remaining: None,
        }
    }
}
