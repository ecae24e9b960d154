use core::mem;

use super::handle::Handle;

/// Color of the link pointing down into a node from its parent.
///
/// A red link glues a node to its parent into a 2-3 tree 3-node; a black link is an
/// ordinary 2-3 tree edge.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Color {
    Red,
    Black,
}

impl Color {
    #[inline]
    pub(crate) const fn flipped(self) -> Self {
        match self {
            Color::Red => Color::Black,
            Color::Black => Color::Red,
        }
    }
}

// LLRB: every node carries one entry and two optional child links.
#[derive(Clone)]
pub(crate) struct Node<K, V> {
    key: K,
    value: V,
    left: Option<Handle>,
    right: Option<Handle>,
    color: Color,
}

impl<K, V> Node<K, V> {
    /// Creates a detached node. New nodes always hang off a red link.
    pub(crate) fn new(key: K, value: V) -> Self {
        Self {
            key,
            value,
            left: None,
            right: None,
            color: Color::Red,
        }
    }

    #[inline]
    pub(crate) fn key(&self) -> &K {
        &self.key
    }

    #[inline]
    pub(crate) fn value(&self) -> &V {
        &self.value
    }

    #[inline]
    pub(crate) fn value_mut(&mut self) -> &mut V {
        &mut self.value
    }

    /// Returns the key and value together.
    #[inline]
    pub(crate) fn entry(&self) -> (&K, &V) {
        (&self.key, &self.value)
    }

    #[inline]
    pub(crate) fn left(&self) -> Option<Handle> {
        self.left
    }

    #[inline]
    pub(crate) fn right(&self) -> Option<Handle> {
        self.right
    }

    pub(crate) fn set_left(&mut self, left: Option<Handle>) {
        self.left = left;
    }

    pub(crate) fn set_right(&mut self, right: Option<Handle>) {
        self.right = right;
    }

    #[inline]
    pub(crate) fn color(&self) -> Color {
        self.color
    }

    pub(crate) fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    #[inline]
    pub(crate) fn is_red(&self) -> bool {
        self.color == Color::Red
    }

    pub(crate) fn flip_color(&mut self) {
        self.color = self.color.flipped();
    }

    /// Overwrites the value, returning the previous one.
    pub(crate) fn replace_value(&mut self, value: V) -> V {
        mem::replace(&mut self.value, value)
    }

    /// Overwrites both key and value (successor substitution during erase),
    /// returning the previous pair.
    pub(crate) fn replace_entry(&mut self, key: K, value: V) -> (K, V) {
        (mem::replace(&mut self.key, key), mem::replace(&mut self.value, value))
    }

    /// Consumes the node, returning its entry. Links are discarded.
    pub(crate) fn into_entry(self) -> (K, V) {
        (self.key, self.value)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn new_node_is_red_and_detached() {
        let node = Node::new(1, "a");
        assert!(node.is_red());
        assert_eq!(node.left(), None);
        assert_eq!(node.right(), None);
        assert_eq!(node.entry(), (&1, &"a"));
    }

    #[test]
    fn flip_color_toggles() {
        let mut node = Node::new(1, ());
        node.flip_color();
        assert_eq!(node.color(), Color::Black);
        node.flip_color();
        assert_eq!(node.color(), Color::Red);
    }

    #[test]
    fn replace_entry_returns_previous_pair() {
        let mut node = Node::new(1, "a");
        assert_eq!(node.replace_entry(2, "b"), (1, "a"));
        assert_eq!(node.replace_value("c"), "b");
        assert_eq!(node.into_entry(), (2, "c"));
    }
}
