use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;

use super::RBTreeMap;
use crate::raw::{Color, Handle};

/// A broken red-black or search-tree property found by
/// [`RBTreeMap::red_black_violations`].
///
/// Violations are diagnostics, not errors: a map built only through its public API
/// never produces one.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum Violation<K> {
    /// The root is red (property 2).
    RedRoot { root: K },
    /// A red node has a red child (property 4).
    RedChildOfRed { parent: K, child: K },
    /// The path from `node` up to the root crosses a different number of black nodes
    /// than the first such path found (property 5). Only nodes with an absent child are
    /// checked.
    BlackHeightMismatch { node: K, expected: usize, found: usize },
    /// In-order traversal is not strictly increasing.
    OutOfOrder { previous: K, next: K },
    /// `child` hangs under `parent` but its parent link points elsewhere.
    BrokenParentLink { parent: K, child: K },
}

impl<K: fmt::Display> fmt::Display for Violation<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::RedRoot { root } => write!(f, "Property 2 is violated: root {root} is not black."),
            Violation::RedChildOfRed { parent, child } => {
                write!(f, "Property 4 is violated: red node {parent} has red child {child}.")
            }
            Violation::BlackHeightMismatch { node, expected, found } => write!(
                f,
                "Property 5 is violated: path from {node} to the root has {found} black nodes, expected {expected}."
            ),
            Violation::OutOfOrder { previous, next } => {
                write!(f, "Search order is violated: {next} follows {previous}.")
            }
            Violation::BrokenParentLink { parent, child } => {
                write!(f, "Parent link is broken: {child} does not point back to {parent}.")
            }
        }
    }
}

impl<K, V> RBTreeMap<K, V> {
    /// Counts the black nodes on the leftmost path from the root, root included.
    ///
    /// Every root-to-leaf path has this many black nodes as long as the red-black
    /// properties hold. An empty map has black height 0.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_map::RBTreeMap;
    ///
    /// let map: RBTreeMap<i32, ()> = (1..=4).map(|k| (k, ())).collect();
    /// assert_eq!(map.black_height(), 2);
    /// ```
    #[must_use]
    pub fn black_height(&self) -> usize {
        core::iter::successors(self.raw.root(), |&handle| self.raw.node(handle).left())
            .filter(|&handle| self.raw.node(handle).is_black())
            .count()
    }

    /// Renders one line per entry in ascending key order:
    /// key, parent key, left and right child keys (`none` when absent), color and value.
    ///
    /// Meant for eyeballing the tree shape; the layout is not a stable format.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_map::RBTreeMap;
    ///
    /// let map = RBTreeMap::from([(1, "Aharon")]);
    /// assert_eq!(map.debug_output(), "K=1   PK=none LK=none RK=none C=B V=Aharon\n");
    /// ```
    #[must_use]
    pub fn debug_output(&self) -> String
    where
        K: fmt::Display,
        V: fmt::Display,
    {
        let key_of = |link: Option<Handle>| {
            link.map_or_else(|| String::from("none"), |handle| self.raw.node(handle).key().to_string())
        };

        let mut output = String::new();
        for handle in self.raw.handles_in_order() {
            let node = self.raw.node(handle);
            let color = match node.color() {
                Color::Black => 'B',
                Color::Red => 'R',
            };
            output.push_str(&alloc::format!(
                "K={:<3} PK={:<3} LK={:<3} RK={:<3} C={} V={}\n",
                node.key().to_string(),
                key_of(node.parent()),
                key_of(node.left()),
                key_of(node.right()),
                color,
                node.value(),
            ));
        }
        output
    }

    /// Checks the red-black properties and the search order, returning every
    /// violation found. The list is empty for a healthy tree.
    ///
    /// Property 5 is checked the slow, direct way: from every node with an absent
    /// child, black nodes are counted up to the root and all counts compared.
    #[must_use]
    pub fn red_black_violations(&self) -> Vec<Violation<K>>
    where
        K: Ord + Clone,
    {
        let raw = &self.raw;
        let key_of = |handle: Handle| raw.node(handle).key().clone();
        let mut violations = Vec::new();

        let Some(root) = raw.root() else {
            return violations;
        };
        if raw.node(root).is_red() {
            violations.push(Violation::RedRoot { root: key_of(root) });
        }

        let mut expected_height: Option<usize> = None;
        let mut previous: Option<Handle> = None;
        let mut stack: Vec<Handle> = Vec::new();
        let mut current = Some(root);

        // In-order walk over child links only, so broken parent links cannot derail it.
        loop {
            while let Some(handle) = current {
                stack.push(handle);
                current = raw.node(handle).left();
            }
            let Some(handle) = stack.pop() else {
                break;
            };
            let node = raw.node(handle);

            if let Some(previous) = previous
                && raw.node(previous).key() >= node.key()
            {
                violations.push(Violation::OutOfOrder {
                    previous: key_of(previous),
                    next: key_of(handle),
                });
            }

            for child in [node.left(), node.right()].into_iter().flatten() {
                if raw.node(child).parent() != Some(handle) {
                    violations.push(Violation::BrokenParentLink {
                        parent: key_of(handle),
                        child: key_of(child),
                    });
                }
                if node.is_red() && raw.node(child).is_red() {
                    violations.push(Violation::RedChildOfRed {
                        parent: key_of(handle),
                        child: key_of(child),
                    });
                }
            }

            if node.left().is_none() || node.right().is_none() {
                // Bounded so a parent-link cycle cannot hang the checker.
                let found = core::iter::successors(Some(handle), |&h| raw.node(h).parent())
                    .take(raw.len() + 1)
                    .filter(|&h| raw.node(h).is_black())
                    .count();
                match expected_height {
                    None => expected_height = Some(found),
                    Some(expected) if expected != found => violations.push(Violation::BlackHeightMismatch {
                        node: key_of(handle),
                        expected,
                        found,
                    }),
                    Some(_) => {}
                }
            }

            previous = Some(handle);
            current = node.right();
        }

        violations
    }

    /// Runs [`red_black_violations`](RBTreeMap::red_black_violations) and renders the
    /// result as text, one line per violation. Returns an empty string when every
    /// property holds.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_map::RBTreeMap;
    ///
    /// let mut map = RBTreeMap::new();
    /// for (key, name) in [(1, "Aharon"), (8, "Baruch"), (2, "Sarah"), (4, "Ichak")] {
    ///     map.insert(key, name);
    ///     assert_eq!(map.check_red_black_tree_properties(), "");
    /// }
    /// ```
    #[must_use]
    pub fn check_red_black_tree_properties(&self) -> String
    where
        K: Ord + Clone + fmt::Display,
    {
        self.red_black_violations()
            .iter()
            .map(|violation| alloc::format!("{violation}\n"))
            .collect()
    }
}
