use alloc::vec::{self, Vec};
use core::borrow::Borrow;
use core::cmp::Ordering;

use log::trace;
use smallvec::SmallVec;

use super::arena::Arena;
use super::handle::Handle;
use super::node::{Color, Node};

/// The core Left-Leaning Red-Black tree backing `LlrbMap`.
///
/// Every recursive mutation takes a subtree root and returns the subtree root that
/// replaces it after rebalancing; the caller stores the result in its own child link
/// (or in `root`). Rotations relink nodes but never move entries between them, so a
/// handle keeps naming the same key until that key is removed.
#[derive(Clone)]
pub(crate) struct RawLlrbMap<K, V> {
    /// Arena storing all tree nodes.
    nodes: Arena<Node<K, V>>,
    /// Handle to the root node, if the tree is non-empty. The root is always black at rest.
    root: Option<Handle>,
}

/// Stack used to walk the tree without recursion.
type Spine = SmallVec<[Handle; 32]>;

impl<K, V> RawLlrbMap<K, V> {
    /// Creates a new, empty tree.
    pub(crate) const fn new() -> Self {
        Self {
            nodes: Arena::new(),
            root: None,
        }
    }

    /// Creates a new tree with room for `capacity` nodes.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Arena::with_capacity(capacity),
            root: None,
        }
    }

    /// Returns the number of key-value pairs in the tree.
    pub(crate) const fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the tree contains no elements.
    pub(crate) const fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub(crate) fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    /// Frees every node.
    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
    }

    pub(crate) fn root(&self) -> Option<Handle> {
        self.root
    }

    pub(crate) fn node(&self, handle: Handle) -> &Node<K, V> {
        self.nodes.get(handle)
    }

    pub(crate) fn node_mut(&mut self, handle: Handle) -> &mut Node<K, V> {
        self.nodes.get_mut(handle)
    }

    /// Drains all key-value pairs in key order, leaving the tree empty.
    pub(crate) fn drain_to_vec(&mut self) -> Vec<(K, V)> {
        let mut entries = Vec::with_capacity(self.len());
        let mut spine = Spine::new();
        let mut current = self.root.take();

        loop {
            while let Some(handle) = current {
                spine.push(handle);
                current = self.left_of(handle);
            }
            let Some(handle) = spine.pop() else {
                break;
            };
            // The left subtree is already drained; only the right link is still needed.
            current = self.right_of(handle);
            entries.push(self.nodes.take(handle).into_entry());
        }

        self.nodes.clear();
        entries
    }

    /// Returns the leftmost node.
    pub(crate) fn first(&self) -> Option<Handle> {
        let mut current = self.root?;
        while let Some(left) = self.left_of(current) {
            current = left;
        }
        Some(current)
    }

    /// Returns the rightmost node.
    pub(crate) fn last(&self) -> Option<Handle> {
        let mut current = self.root?;
        while let Some(right) = self.right_of(current) {
            current = right;
        }
        Some(current)
    }

    #[inline]
    fn left_of(&self, handle: Handle) -> Option<Handle> {
        self.nodes.get(handle).left()
    }

    #[inline]
    fn right_of(&self, handle: Handle) -> Option<Handle> {
        self.nodes.get(handle).right()
    }

    /// An empty link counts as black.
    #[inline]
    fn is_red(&self, link: Option<Handle>) -> bool {
        link.is_some_and(|handle| self.nodes.get(handle).is_red())
    }

    /// Stores the result of a root-level mutation, painting the new root black.
    fn replace_root(&mut self, root: Option<Handle>) {
        match root {
            Some(handle) => self.nodes.get_mut(handle).set_color(Color::Black),
            None => trace!("`RawLlrbMap::replace_root()` - last entry removed"),
        }
        self.root = root;
    }

    //              |                         |
    //              h                         x
    //             / \\                      // \
    //            a   x          =>          h   c
    //               / \                    / \
    //              b   c                  a   b
    //
    fn rotate_left(&mut self, handle: Handle) -> Handle {
        let pivot = self.right_of(handle).expect("`RawLlrbMap::rotate_left()` - right link is missing!");
        let color = self.nodes.get(handle).color();
        let inner = self.left_of(pivot);

        let node = self.nodes.get_mut(handle);
        node.set_right(inner);
        node.set_color(Color::Red);

        let pivot_node = self.nodes.get_mut(pivot);
        pivot_node.set_left(Some(handle));
        pivot_node.set_color(color);
        pivot
    }

    //              |                         |
    //              h                         x
    //            // \                       / \\
    //            x   c          =>         a   h
    //           / \                           / \
    //          a   b                         b   c
    //
    fn rotate_right(&mut self, handle: Handle) -> Handle {
        let pivot = self.left_of(handle).expect("`RawLlrbMap::rotate_right()` - left link is missing!");
        let color = self.nodes.get(handle).color();
        let inner = self.right_of(pivot);

        let node = self.nodes.get_mut(handle);
        node.set_left(inner);
        node.set_color(Color::Red);

        let pivot_node = self.nodes.get_mut(pivot);
        pivot_node.set_right(Some(handle));
        pivot_node.set_color(color);
        pivot
    }

    /// Toggles a node and both of its children: splits a temporary 4-node on the way
    /// up, or merges siblings into one on the way down.
    fn flip_colors(&mut self, handle: Handle) {
        let node = self.nodes.get_mut(handle);
        node.flip_color();
        let (left, right) = (node.left(), node.right());

        for child in [left, right] {
            let child = child.expect("`RawLlrbMap::flip_colors()` - child link is missing!");
            self.nodes.get_mut(child).flip_color();
        }
    }

    /// Restores the local LLRB shape after a child link was replaced.
    fn fix_up(&mut self, handle: Handle) -> Handle {
        let mut handle = handle;

        if self.is_red(self.right_of(handle)) {
            handle = self.rotate_left(handle);
        }

        if let Some(left) = self.left_of(handle)
            && self.is_red(Some(left))
            && self.is_red(self.left_of(left))
        {
            handle = self.rotate_right(handle);
        }

        if self.is_red(self.left_of(handle)) && self.is_red(self.right_of(handle)) {
            self.flip_colors(handle);
        }

        handle
    }

    /// Makes the left child (or one of its children) red before descending left,
    /// borrowing from the right sibling when it can spare a node.
    fn move_red_left(&mut self, handle: Handle) -> Handle {
        self.flip_colors(handle);

        let right = self.right_of(handle).expect("`RawLlrbMap::move_red_left()` - right link is missing!");
        if self.is_red(self.left_of(right)) {
            let right = self.rotate_right(right);
            self.nodes.get_mut(handle).set_right(Some(right));
            let handle = self.rotate_left(handle);
            self.flip_colors(handle);
            return handle;
        }

        handle
    }

    /// Mirror of [`Self::move_red_left`] for descending right.
    fn move_red_right(&mut self, handle: Handle) -> Handle {
        self.flip_colors(handle);

        let left = self.left_of(handle).expect("`RawLlrbMap::move_red_right()` - left link is missing!");
        if self.is_red(self.left_of(left)) {
            let handle = self.rotate_right(handle);
            self.flip_colors(handle);
            return handle;
        }

        handle
    }

    /// Removes the minimum of the subtree at `handle`.
    /// Returns the new subtree root and the removed entry.
    fn remove_min_at(&mut self, handle: Handle) -> (Option<Handle>, (K, V)) {
        let Some(left) = self.left_of(handle) else {
            let right = self.right_of(handle);
            return (right, self.nodes.take(handle).into_entry());
        };

        let mut handle = handle;
        if !self.is_red(Some(left)) && !self.is_red(self.left_of(left)) {
            handle = self.move_red_left(handle);
        }

        let left = self.left_of(handle).expect("`RawLlrbMap::remove_min_at()` - left link is missing!");
        let (left, entry) = self.remove_min_at(left);
        self.nodes.get_mut(handle).set_left(left);
        (Some(self.fix_up(handle)), entry)
    }

    /// Removes the maximum of the subtree at `handle`.
    /// Returns the new subtree root and the removed entry.
    fn remove_max_at(&mut self, handle: Handle) -> (Option<Handle>, (K, V)) {
        let mut handle = handle;
        if self.is_red(self.left_of(handle)) {
            handle = self.rotate_right(handle);
        }

        let Some(right) = self.right_of(handle) else {
            let left = self.left_of(handle);
            return (left, self.nodes.take(handle).into_entry());
        };

        if !self.is_red(Some(right)) && !self.is_red(self.left_of(right)) {
            handle = self.move_red_right(handle);
        }

        let right = self.right_of(handle).expect("`RawLlrbMap::remove_max_at()` - right link is missing!");
        let (right, entry) = self.remove_max_at(right);
        self.nodes.get_mut(handle).set_right(right);
        (Some(self.fix_up(handle)), entry)
    }

    /// Removes and returns the first key-value pair.
    pub(crate) fn pop_first(&mut self) -> Option<(K, V)> {
        let root = self.root?;
        let (root, entry) = self.remove_min_at(root);
        self.replace_root(root);
        Some(entry)
    }

    /// Removes and returns the last key-value pair.
    pub(crate) fn pop_last(&mut self) -> Option<(K, V)> {
        let root = self.root?;
        let (root, entry) = self.remove_max_at(root);
        self.replace_root(root);
        Some(entry)
    }
}

impl<K: Ord, V> RawLlrbMap<K, V> {
    #[inline]
    fn compare<Q>(&self, key: &Q, handle: Handle) -> Ordering
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        key.cmp(self.nodes.get(handle).key().borrow())
    }

    /// Searches for a key and returns the handle of the node holding it.
    pub(crate) fn search<Q>(&self, key: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut current = self.root;

        while let Some(handle) = current {
            current = match self.compare(key, handle) {
                Ordering::Equal => return Some(handle),
                Ordering::Less => self.left_of(handle),
                Ordering::Greater => self.right_of(handle),
            };
        }

        None
    }

    /// Returns a reference to the value corresponding to the key.
    pub(crate) fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let handle = self.search(key)?;
        Some(self.nodes.get(handle).value())
    }

    /// Returns a mutable reference to the value corresponding to the key.
    pub(crate) fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let handle = self.search(key)?;
        Some(self.nodes.get_mut(handle).value_mut())
    }

    /// Returns the key-value pair corresponding to the key.
    pub(crate) fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let handle = self.search(key)?;
        Some(self.nodes.get(handle).entry())
    }

    /// Inserts a key-value pair into the tree.
    /// Returns the old value if the key was already present; the stored key is kept.
    pub(crate) fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.insert_entry(key, value).1
    }

    /// Upserts like [`Self::insert`], additionally returning the handle of the node that
    /// now holds the key.
    pub(crate) fn insert_entry(&mut self, key: K, value: V) -> (Handle, Option<V>) {
        let (root, target, old_value) = self.insert_at(self.root, key, value);
        self.replace_root(Some(root));
        (target, old_value)
    }

    /// Returns (new subtree root, node holding `key`, displaced value).
    fn insert_at(&mut self, link: Option<Handle>, key: K, value: V) -> (Handle, Handle, Option<V>) {
        let Some(handle) = link else {
            let handle = self.nodes.alloc(Node::new(key, value));
            return (handle, handle, None);
        };

        let (target, old_value) = match key.cmp(self.nodes.get(handle).key()) {
            Ordering::Equal => (handle, Some(self.nodes.get_mut(handle).replace_value(value))),
            Ordering::Less => {
                let (left, target, old_value) = self.insert_at(self.left_of(handle), key, value);
                self.nodes.get_mut(handle).set_left(Some(left));
                (target, old_value)
            }
            Ordering::Greater => {
                let (right, target, old_value) = self.insert_at(self.right_of(handle), key, value);
                self.nodes.get_mut(handle).set_right(Some(right));
                (target, old_value)
            }
        };

        (self.fix_up(handle), target, old_value)
    }

    /// Removes a key from the tree and returns the value.
    pub(crate) fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.remove_entry(key).map(|(_, value)| value)
    }

    /// Removes a key from the tree and returns the key-value pair.
    /// A missing key leaves the contents unchanged.
    pub(crate) fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let root = self.root?;
        let (root, entry) = self.remove_at(root, key);
        self.replace_root(root);
        entry
    }

    /// Returns the new subtree root and the removed entry, if `key` was present.
    fn remove_at<Q>(&mut self, handle: Handle, key: &Q) -> (Option<Handle>, Option<(K, V)>)
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut handle = handle;
        let mut entry = None;

        if self.compare(key, handle) == Ordering::Less {
            if let Some(left) = self.left_of(handle) {
                if !self.is_red(Some(left)) && !self.is_red(self.left_of(left)) {
                    handle = self.move_red_left(handle);
                }

                let left = self.left_of(handle).expect("`RawLlrbMap::remove_at()` - left link is missing!");
                let (left, removed) = self.remove_at(left, key);
                self.nodes.get_mut(handle).set_left(left);
                entry = removed;
            }
        } else {
            if self.is_red(self.left_of(handle)) {
                handle = self.rotate_right(handle);
            }

            if self.compare(key, handle) == Ordering::Equal && self.right_of(handle).is_none() {
                // Black balance leaves no room for a left child here either.
                let left = self.left_of(handle);
                return (left, Some(self.nodes.take(handle).into_entry()));
            }

            if let Some(right) = self.right_of(handle)
                && !self.is_red(Some(right))
                && !self.is_red(self.left_of(right))
            {
                handle = self.move_red_right(handle);
            }

            if let Some(right) = self.right_of(handle) {
                if self.compare(key, handle) == Ordering::Equal {
                    let (right, (successor_key, successor_value)) = self.remove_min_at(right);
                    let node = self.nodes.get_mut(handle);
                    node.set_right(right);
                    entry = Some(node.replace_entry(successor_key, successor_value));
                } else {
                    let (right, removed) = self.remove_at(right, key);
                    self.nodes.get_mut(handle).set_right(right);
                    entry = removed;
                }
            }
        }

        (Some(self.fix_up(handle)), entry)
    }

    /// Keeps only the entries for which `keep` returns true, visiting them in key order
    /// and rebuilding the tree from the survivors.
    ///
    /// If `keep` panics, the entry it was called on and every entry after it are put
    /// back before the panic leaves this function.
    pub(crate) fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&K, &mut V) -> bool,
    {
        let pending = self.drain_to_vec().into_iter();
        let mut refill = Refill { tree: self, pending };

        while let Some((key, value)) = refill.pending.as_mut_slice().first_mut() {
            let kept = keep(key, value);
            if let Some((key, value)) = refill.pending.next()
                && kept
            {
                refill.tree.insert(key, value);
            }
        }
    }
}

/// Reinserts whatever `retain` has not visited yet when it is dropped.
struct Refill<'a, K: Ord, V> {
    tree: &'a mut RawLlrbMap<K, V>,
    pending: vec::IntoIter<(K, V)>,
}

impl<K: Ord, V> Drop for Refill<'_, K, V> {
    fn drop(&mut self) {
        for (key, value) in self.pending.by_ref() {
            self.tree.insert(key, value);
        }
    }
}
