use core::borrow::Borrow;
use core::cmp::Ordering;

use alloc::vec::Vec;
use smallvec::SmallVec;

use super::arena::Arena;
use super::handle::Handle;
use super::node::{Color, Node, Side};

/// The red-black tree backing `RBTreeMap`.
///
/// Nodes never move between slots: rotations and the erase swap rewrite links only, so
/// a handle keeps naming the same key/value pair for as long as that pair is stored.
pub(crate) struct RawRBTreeMap<K, V> {
    /// Every live node, addressed by handle.
    nodes: Arena<Node<K, V>>,
    /// Root of the tree, if non-empty.
    root: Option<Handle>,
    /// Number of key-value pairs.
    len: usize,
}

/// Pending work for the stack-based deep copy: the source node and where its copy hangs.
struct CloneFrame {
    source: Handle,
    parent: Option<(Handle, Side)>,
}

impl<K, V> RawRBTreeMap<K, V> {
    pub(crate) const fn new() -> Self {
        Self {
            nodes: Arena::new(),
            root: None,
            len: 0,
        }
    }

    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    pub(crate) const fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
        self.len = 0;
    }

    pub(crate) fn root(&self) -> Option<Handle> {
        self.root
    }

    #[inline]
    pub(crate) fn node(&self, handle: Handle) -> &Node<K, V> {
        self.nodes.get(handle)
    }

    #[inline]
    pub(crate) fn node_mut(&mut self, handle: Handle) -> &mut Node<K, V> {
        self.nodes.get_mut(handle)
    }

    /// Absent children count as black.
    #[inline]
    fn is_red(&self, handle: Option<Handle>) -> bool {
        handle.is_some_and(|h| self.node(h).is_red())
    }

    /// The last node reached by walking from `handle` towards `side`.
    fn extreme(&self, mut handle: Handle, side: Side) -> Handle {
        while let Some(child) = self.node(handle).child(side) {
            handle = child;
        }
        handle
    }

    /// Smallest key.
    pub(crate) fn first(&self) -> Option<Handle> {
        self.root.map(|root| self.extreme(root, Side::Left))
    }

    /// Largest key.
    pub(crate) fn last(&self) -> Option<Handle> {
        self.root.map(|root| self.extreme(root, Side::Right))
    }

    /// In-order neighbour of `handle` in direction `side` (`Right` is the successor).
    ///
    /// Either the nearest node of the subtree on that side, or the first ancestor
    /// reached from the other side.
    pub(crate) fn step(&self, handle: Handle, side: Side) -> Option<Handle> {
        if let Some(child) = self.node(handle).child(side) {
            return Some(self.extreme(child, side.opposite()));
        }
        let mut current = handle;
        while let Some(parent) = self.node(current).parent() {
            if self.node(parent).child(side) != Some(current) {
                return Some(parent);
            }
            current = parent;
        }
        None
    }

    #[inline]
    pub(crate) fn next(&self, handle: Handle) -> Option<Handle> {
        self.step(handle, Side::Right)
    }

    #[inline]
    pub(crate) fn prev(&self, handle: Handle) -> Option<Handle> {
        self.step(handle, Side::Left)
    }

    /// Handles of every node in ascending key order.
    pub(crate) fn handles_in_order(&self) -> Vec<Handle> {
        let mut handles = Vec::with_capacity(self.len);
        let mut current = self.first();
        while let Some(handle) = current {
            handles.push(handle);
            current = self.next(handle);
        }
        handles
    }

    /// Which side of `parent` holds `child`.
    fn side_of(&self, parent: Handle, child: Handle) -> Side {
        let node = self.node(parent);
        if node.left() == Some(child) {
            Side::Left
        } else {
            debug_assert_eq!(node.right(), Some(child), "`RawRBTreeMap::side_of()` - not a child of `parent`");
            Side::Right
        }
    }

    /// Points whatever referenced `old` from above (a parent slot or the root) at `new`.
    fn replace_in_parent(&mut self, parent: Option<Handle>, old: Handle, new: Option<Handle>) {
        match parent {
            None => self.root = new,
            Some(parent) => {
                let side = self.side_of(parent, old);
                self.node_mut(parent).set_child(side, new);
            }
        }
    }

    /// Rotates the subtree rooted at `handle` towards `side`.
    ///
    /// The child on the opposite side becomes the subtree root and `handle` becomes its
    /// `side` child; that child's inner subtree crosses over to `handle`.
    fn rotate(&mut self, handle: Handle, side: Side) {
        let riser = self
            .node(handle)
            .child(side.opposite())
            .expect("`RawRBTreeMap::rotate()` - no child to rotate up!");
        let parent = self.node(handle).parent();
        let inner = self.node(riser).child(side);

        tracing::trace!(?side, "rotate");

        self.node_mut(handle).set_child(side.opposite(), inner);
        if let Some(inner) = inner {
            self.node_mut(inner).set_parent(Some(handle));
        }

        self.replace_in_parent(parent, handle, Some(riser));
        self.node_mut(riser).set_parent(parent);

        self.node_mut(riser).set_child(side, Some(handle));
        self.node_mut(handle).set_parent(Some(riser));
    }

    /// Exchanges the tree positions (links and color) of two nodes.
    ///
    /// Payloads stay with their handles. `a` and `b` may be adjacent, in which case the
    /// link between them is reversed.
    fn swap_positions(&mut self, a: Handle, b: Handle) {
        let a_links = self.node(a).links();
        let b_links = self.node(b).links();
        self.node_mut(a).set_links(b_links.exchange(a, b));
        self.node_mut(b).set_links(a_links.exchange(a, b));

        for (moved, displaced) in [(a, b), (b, a)] {
            let links = self.node(moved).links();
            match links.parent {
                None => self.root = Some(moved),
                // Links between the pair were already rewritten by `exchange`.
                Some(parent) if parent == a || parent == b => {}
                Some(parent) => {
                    let side = self.side_of(parent, displaced);
                    self.node_mut(parent).set_child(side, Some(moved));
                }
            }
            for child in links.children.into_iter().flatten() {
                self.node_mut(child).set_parent(Some(moved));
            }
        }
    }

    /// Restores the red-black properties after `handle` was attached as a red leaf.
    fn insert_fixup(&mut self, mut handle: Handle) {
        loop {
            let Some(parent) = self.node(handle).parent() else {
                tracing::trace!(case = 1, "insert fixup: reached root, paint black");
                self.node_mut(handle).set_color(Color::Black);
                return;
            };
            if self.node(parent).is_black() {
                tracing::trace!(case = 2, "insert fixup: parent is black");
                return;
            }

            // A red parent is never the root, so the grandparent exists and is black.
            let grandparent = self
                .node(parent)
                .parent()
                .expect("`RawRBTreeMap::insert_fixup()` - red node without a parent!");
            let parent_side = self.side_of(grandparent, parent);
            let uncle = self.node(grandparent).child(parent_side.opposite());

            if let Some(uncle) = uncle.filter(|&u| self.node(u).is_red()) {
                tracing::trace!(case = 3, "insert fixup: red uncle, push red up");
                self.node_mut(parent).set_color(Color::Black);
                self.node_mut(uncle).set_color(Color::Black);
                self.node_mut(grandparent).set_color(Color::Red);
                handle = grandparent;
                continue;
            }

            if self.side_of(parent, handle) != parent_side {
                tracing::trace!(case = 4, "insert fixup: inner grandchild, rotate at parent");
                self.rotate(parent, parent_side);
                handle = parent;
                continue;
            }

            tracing::trace!(case = 5, "insert fixup: outer grandchild, rotate at grandparent");
            self.rotate(grandparent, parent_side.opposite());
            self.node_mut(parent).set_color(Color::Black);
            self.node_mut(grandparent).set_color(Color::Red);
            return;
        }
    }

    /// Restores the black height lost by removing the childless black node `handle`.
    ///
    /// Runs while `handle` is still attached: every case is decided from its parent and
    /// sibling.
    fn delete_fixup(&mut self, mut handle: Handle) {
        loop {
            let Some(parent) = self.node(handle).parent() else {
                tracing::trace!(case = 1, "delete fixup: reached root");
                return;
            };
            let side = self.side_of(parent, handle);
            let mut sibling = self.sibling(parent, side);

            if self.node(sibling).is_red() {
                tracing::trace!(case = 2, "delete fixup: red sibling, rotate at parent");
                self.node_mut(parent).set_color(Color::Red);
                self.node_mut(sibling).set_color(Color::Black);
                self.rotate(parent, side);
                sibling = self.sibling(parent, side);
            }

            let near = self.node(sibling).child(side);
            let far = self.node(sibling).child(side.opposite());

            if !self.is_red(near) && !self.is_red(far) {
                if self.node(parent).is_black() {
                    tracing::trace!(case = 3, "delete fixup: black family, push deficit up");
                    self.node_mut(sibling).set_color(Color::Red);
                    handle = parent;
                    continue;
                }
                tracing::trace!(case = 4, "delete fixup: red parent, black family");
                self.node_mut(parent).set_color(Color::Black);
                self.node_mut(sibling).set_color(Color::Red);
                return;
            }

            if !self.is_red(far) {
                tracing::trace!(case = 5, "delete fixup: red near nephew, rotate at sibling");
                let near = near.expect("`RawRBTreeMap::delete_fixup()` - red near nephew is absent!");
                self.rotate(sibling, side.opposite());
                self.node_mut(sibling).set_color(Color::Red);
                self.node_mut(near).set_color(Color::Black);
                sibling = near;
            }

            tracing::trace!(case = 6, "delete fixup: red far nephew, rotate at parent");
            let far = self
                .node(sibling)
                .child(side.opposite())
                .expect("`RawRBTreeMap::delete_fixup()` - red far nephew is absent!");
            let parent_color = self.node(parent).color();
            self.node_mut(sibling).set_color(parent_color);
            self.node_mut(parent).set_color(Color::Black);
            self.node_mut(far).set_color(Color::Black);
            self.rotate(parent, side);
            return;
        }
    }

    /// The child of `parent` opposite `side`. A black non-root node always has one.
    fn sibling(&self, parent: Handle, side: Side) -> Handle {
        self.node(parent)
            .child(side.opposite())
            .expect("`RawRBTreeMap::sibling()` - black node without a sibling!")
    }

    /// Unlinks `handle` from the tree and returns its payload.
    pub(crate) fn remove_node(&mut self, handle: Handle) -> (K, V) {
        let node = self.node(handle);
        if let (Some(_), Some(right)) = (node.left(), node.right()) {
            let successor = self.extreme(right, Side::Left);
            self.swap_positions(handle, successor);
        }

        // At most one child remains. A lone child is red under a black node, so trading
        // places with it leaves `handle` as a red leaf.
        let node = self.node(handle);
        match node.left().or(node.right()) {
            Some(child) => {
                debug_assert!(node.is_black() && self.node(child).is_red());
                self.swap_positions(handle, child);
            }
            None if node.is_black() => self.delete_fixup(handle),
            None => {}
        }

        let parent = self.node(handle).parent();
        self.replace_in_parent(parent, handle, None);
        self.len -= 1;
        tracing::debug!(len = self.len, "removed node");
        self.nodes.take(handle).into_entry()
    }

    /// Takes every entry out in ascending key order, leaving the tree empty.
    pub(crate) fn drain_to_vec(&mut self) -> Vec<(K, V)> {
        let entries = self
            .handles_in_order()
            .into_iter()
            .map(|handle| self.nodes.take(handle).into_entry())
            .collect();
        self.clear();
        entries
    }
}

impl<K: Ord, V> RawRBTreeMap<K, V> {
    /// Finds the node holding `key`.
    pub(crate) fn search<Q>(&self, key: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut current = self.root;
        while let Some(handle) = current {
            let node = self.node(handle);
            current = match key.cmp(node.key().borrow()) {
                Ordering::Less => node.left(),
                Ordering::Greater => node.right(),
                Ordering::Equal => return Some(handle),
            };
        }
        None
    }

    /// Inserts or overwrites. Returns the previous value for an existing key.
    pub(crate) fn insert(&mut self, key: K, value: V) -> Option<V> {
        let mut attach: Option<(Handle, Side)> = None;
        let mut current = self.root;
        while let Some(handle) = current {
            let side = match key.cmp(self.node(handle).key()) {
                Ordering::Less => Side::Left,
                Ordering::Greater => Side::Right,
                Ordering::Equal => return Some(self.node_mut(handle).replace_value(value)),
            };
            attach = Some((handle, side));
            current = self.node(handle).child(side);
        }

        let handle = self.nodes.alloc(Node::new(key, value, attach.map(|(parent, _)| parent)));
        match attach {
            None => self.root = Some(handle),
            Some((parent, side)) => self.node_mut(parent).set_child(side, Some(handle)),
        }
        self.len += 1;
        tracing::debug!(len = self.len, "inserted node");

        self.insert_fixup(handle);
        None
    }

    pub(crate) fn remove<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let handle = self.search(key)?;
        Some(self.remove_node(handle))
    }
}

impl<K: Clone, V: Clone> Clone for RawRBTreeMap<K, V> {
    /// Copies node by node in pre-order, keeping shape and colors.
    fn clone(&self) -> Self {
        let mut nodes = Arena::with_capacity(self.len);
        let mut root = None;
        let mut stack: SmallVec<[CloneFrame; 64]> = SmallVec::new();
        if let Some(source) = self.root {
            stack.push(CloneFrame { source, parent: None });
        }

        while let Some(CloneFrame { source, parent }) = stack.pop() {
            let original = self.node(source);
            let mut copy = Node::new(
                original.key().clone(),
                original.value().clone(),
                parent.map(|(parent, _)| parent),
            );
            copy.set_color(original.color());
            let handle = nodes.alloc(copy);

            match parent {
                None => root = Some(handle),
                Some((parent, side)) => nodes.get_mut(parent).set_child(side, Some(handle)),
            }

            for side in [Side::Right, Side::Left] {
                if let Some(child) = original.child(side) {
                    stack.push(CloneFrame {
                        source: child,
                        parent: Some((handle, side)),
                    });
                }
            }
        }

        Self {
            nodes,
            root,
            len: self.len,
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
#[allow(clippy::uninlined_format_args, clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
mod tests {
    use super::*;
    use alloc::string::String;
    use alloc::vec;
    use proptest::prelude::*;

    impl<K: Ord + core::fmt::Debug, V> RawRBTreeMap<K, V> {
        /// Checks links, ordering, colors and black height. Panics listing every problem.
        pub(crate) fn validate_invariants(&self) {
            let mut errors: Vec<String> = Vec::new();

            if let Some(root) = self.root {
                if self.node(root).parent().is_some() {
                    errors.push(alloc::format!("root {:?} has a parent", self.node(root).key()));
                }
                if self.node(root).is_red() {
                    errors.push(alloc::format!("root {:?} is red", self.node(root).key()));
                }
            }

            let mut count = 0;
            self.validate_subtree(self.root, None, None, &mut count, &mut errors);
            if count != self.len {
                errors.push(alloc::format!("len mismatch: self.len={}, counted={}", self.len, count));
            }
            if self.nodes.len() != self.len {
                errors.push(alloc::format!("arena holds {} nodes, len is {}", self.nodes.len(), self.len));
            }

            assert!(errors.is_empty(), "Tree invariant violations:\n{}", errors.join("\n"));
        }

        /// Returns the black height of the subtree below `handle`, excluding absent leaves.
        fn validate_subtree(
            &self,
            handle: Option<Handle>,
            lower: Option<&K>,
            upper: Option<&K>,
            count: &mut usize,
            errors: &mut Vec<String>,
        ) -> usize {
            let Some(handle) = handle else {
                return 0;
            };
            *count += 1;
            let node = self.node(handle);
            let key = node.key();

            if lower.is_some_and(|lower| key <= lower) || upper.is_some_and(|upper| key >= upper) {
                errors.push(alloc::format!("key {:?} is outside its subtree bounds", key));
            }

            for side in [Side::Left, Side::Right] {
                if let Some(child) = node.child(side) {
                    if self.node(child).parent() != Some(handle) {
                        errors.push(alloc::format!("child of {:?} has a stale parent link", key));
                    }
                    if node.is_red() && self.node(child).is_red() {
                        errors.push(alloc::format!("red node {:?} has a red child", key));
                    }
                }
            }

            let left = self.validate_subtree(node.left(), lower, Some(key), count, errors);
            let right = self.validate_subtree(node.right(), Some(key), upper, count, errors);
            if left != right {
                errors.push(alloc::format!("black height differs below {:?}: {} vs {}", key, left, right));
            }
            left + usize::from(node.is_black())
        }

        fn keys_in_order(&self) -> Vec<&K> {
            self.handles_in_order().into_iter().map(|h| self.node(h).key()).collect()
        }
    }

    fn tree_from(keys: &[i32]) -> RawRBTreeMap<i32, i32> {
        let mut tree = RawRBTreeMap::new();
        for &key in keys {
            tree.insert(key, key * 10);
            tree.validate_invariants();
        }
        tree
    }

    #[test]
    fn ascending_inserts_stay_balanced() {
        let tree = tree_from(&(0..64).collect::<Vec<_>>());
        assert_eq!(tree.len(), 64);
        // A red-black tree of n nodes is at most 2*log2(n + 1) deep.
        let depth = |mut h: Handle| {
            let mut depth = 1;
            while let Some(parent) = tree.node(h).parent() {
                depth += 1;
                h = parent;
            }
            depth
        };
        let deepest = tree.handles_in_order().into_iter().map(depth).max().unwrap();
        assert!(deepest <= 12, "depth {} too large", deepest);
    }

    #[test]
    fn insert_overwrites_existing_key_in_place() {
        let mut tree = tree_from(&[5, 3, 8]);
        let before = tree.search(&3);
        assert_eq!(tree.insert(3, 99), Some(30));
        assert_eq!(tree.search(&3), before);
        assert_eq!(*tree.node(before.unwrap()).value(), 99);
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn rotate_preserves_order_and_links() {
        let mut tree = tree_from(&[2, 1, 4, 3, 5]);
        let root = tree.root().unwrap();
        tree.rotate(root, Side::Left);
        assert_eq!(*tree.node(tree.root().unwrap()).key(), 4);
        assert_eq!(tree.keys_in_order(), vec![&1, &2, &3, &4, &5]);

        let new_root = tree.root().unwrap();
        tree.rotate(new_root, Side::Right);
        assert_eq!(tree.root(), Some(root));
        assert_eq!(tree.keys_in_order(), vec![&1, &2, &3, &4, &5]);
        tree.validate_invariants();
    }

    #[test]
    fn swap_positions_handles_parent_and_child() {
        let mut tree = tree_from(&[2, 1, 3]);
        let root = tree.search(&2).unwrap();
        let right = tree.search(&3).unwrap();

        tree.swap_positions(root, right);
        assert_eq!(tree.root(), Some(right));
        assert_eq!(tree.node(right).right(), Some(root));
        assert_eq!(tree.node(root).parent(), Some(right));
        assert_eq!(tree.node(right).left(), tree.search(&1));
        assert!(tree.node(right).is_black());

        // Swapping back restores the original shape.
        tree.swap_positions(root, right);
        tree.validate_invariants();
        assert_eq!(tree.root(), Some(root));
    }

    #[test]
    fn swap_positions_handles_distant_nodes() {
        let mut tree = tree_from(&[4, 2, 6, 1, 3, 5, 7]);
        let a = tree.search(&2).unwrap();
        let b = tree.search(&5).unwrap();
        tree.swap_positions(a, b);
        tree.swap_positions(a, b);
        tree.validate_invariants();
        assert_eq!(tree.keys_in_order(), vec![&1, &2, &3, &4, &5, &6, &7]);
    }

    #[test]
    fn step_walks_both_directions() {
        let tree = tree_from(&[1, 8, 2, 4, 13, 6, 0, 3]);
        let first = tree.first().unwrap();
        let last = tree.last().unwrap();
        assert_eq!(*tree.node(first).key(), 0);
        assert_eq!(*tree.node(last).key(), 13);
        assert_eq!(tree.prev(first), None);
        assert_eq!(tree.next(last), None);

        let mut backwards = Vec::new();
        let mut current = Some(last);
        while let Some(h) = current {
            backwards.push(*tree.node(h).key());
            current = tree.prev(h);
        }
        assert_eq!(backwards, vec![13, 8, 6, 4, 3, 2, 1, 0]);
    }

    #[test]
    fn remove_every_shape() {
        // Leaf, one child, two children and root removals all appear in this sequence.
        let mut tree = tree_from(&[10, 5, 15, 3, 7, 12, 18, 1, 4, 6, 8, 11]);
        for key in [1, 5, 10, 18, 15, 4, 12, 7, 3, 11, 8, 6] {
            assert_eq!(tree.remove(&key), Some((key, key * 10)));
            tree.validate_invariants();
            assert_eq!(tree.search(&key), None);
        }
        assert!(tree.is_empty());
        assert_eq!(tree.root(), None);
    }

    #[test]
    fn handles_survive_removal_of_other_keys() {
        let mut tree = tree_from(&(0..32).collect::<Vec<_>>());
        let kept = tree.search(&17).unwrap();
        for key in (0..32).filter(|&k| k != 17) {
            tree.remove(&key);
            assert_eq!(*tree.node(kept).key(), 17);
        }
        assert_eq!(tree.root(), Some(kept));
    }

    #[test]
    fn clone_copies_shape_and_colors() {
        let tree = tree_from(&[1, 8, 2, 4, 13, 6, 0, 3]);
        let copy = tree.clone();
        copy.validate_invariants();

        let shape = |t: &RawRBTreeMap<i32, i32>| {
            t.handles_in_order()
                .into_iter()
                .map(|h| {
                    let node = t.node(h);
                    let key_of = |link: Option<Handle>| link.map(|l| *t.node(l).key());
                    (*node.key(), node.color(), key_of(node.parent()), key_of(node.left()), key_of(node.right()))
                })
                .collect::<Vec<_>>()
        };
        assert_eq!(shape(&tree), shape(&copy));
    }

    #[test]
    fn drain_returns_sorted_entries() {
        let mut tree = tree_from(&[3, 1, 2]);
        assert_eq!(tree.drain_to_vec(), vec![(1, 10), (2, 20), (3, 30)]);
        assert!(tree.is_empty());
        tree.validate_invariants();
    }

    #[derive(Clone, Debug)]
    enum Op {
        Insert(i32),
        Remove(i32),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            3 => (0i32..1000).prop_map(Op::Insert),
            2 => (0i32..1000).prop_map(Op::Remove),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        #[test]
        fn invariants_hold_after_every_operation(ops in prop::collection::vec(op_strategy(), 0..500)) {
            let mut tree: RawRBTreeMap<i32, i32> = RawRBTreeMap::new();
            let mut model = alloc::collections::BTreeMap::new();

            for op in ops {
                match op {
                    Op::Insert(key) => {
                        prop_assert_eq!(tree.insert(key, key * 2), model.insert(key, key * 2));
                    }
                    Op::Remove(key) => {
                        prop_assert_eq!(tree.remove(&key).map(|(_, v)| v), model.remove(&key));
                    }
                }
                tree.validate_invariants();
            }
            prop_assert_eq!(tree.keys_in_order(), model.keys().collect::<Vec<_>>());
        }

        #[test]
        fn clone_is_independent(keys in prop::collection::vec(0i32..200, 1..100)) {
            let mut tree: RawRBTreeMap<i32, i32> = RawRBTreeMap::new();
            for &key in &keys {
                tree.insert(key, key);
            }
            let copy = tree.clone();
            for key in &keys {
                tree.remove(key);
            }
            tree.validate_invariants();
            copy.validate_invariants();
            prop_assert!(tree.is_empty());
            for key in &keys {
                prop_assert!(copy.search(key).is_some());
            }
        }
    }
}
