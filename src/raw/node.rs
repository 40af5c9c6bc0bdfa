use super::handle::Handle;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Color {
    Red,
    Black,
}

/// Which child slot of a parent a node occupies.
///
/// Every rebalancing case exists in two mirrored orientations; writing the cases
/// against a `Side` keeps one copy of each.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Side {
    Left,
    Right,
}

impl Side {
    #[inline]
    pub(crate) const fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    #[inline]
    const fn slot(self) -> usize {
        match self {
            Side::Left => 0,
            Side::Right => 1,
        }
    }
}

/// The position of a node in the tree: everything the swap-based erase exchanges
/// between two nodes while their payloads stay put.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Links {
    pub(crate) parent: Option<Handle>,
    pub(crate) children: [Option<Handle>; 2],
    pub(crate) color: Color,
}

impl Links {
    /// Rewrites references to `a` as `b` and vice versa.
    pub(crate) fn exchange(self, a: Handle, b: Handle) -> Self {
        let swap = |link: Option<Handle>| match link {
            Some(h) if h == a => Some(b),
            Some(h) if h == b => Some(a),
            other => other,
        };
        Self {
            parent: swap(self.parent),
            children: self.children.map(swap),
            color: self.color,
        }
    }
}

pub(crate) struct Node<K, V> {
    key: K,
    value: V,
    links: Links,
}

impl<K, V> Node<K, V> {
    /// A freshly inserted node: red, childless, hanging off `parent`.
    pub(crate) fn new(key: K, value: V, parent: Option<Handle>) -> Self {
        Self {
            key,
            value,
            links: Links {
                parent,
                children: [None, None],
                color: Color::Red,
            },
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

    #[inline]
    pub(crate) fn key_value_mut(&mut self) -> (&K, &mut V) {
        (&self.key, &mut self.value)
    }

    pub(crate) fn replace_value(&mut self, value: V) -> V {
        core::mem::replace(&mut self.value, value)
    }

    pub(crate) fn into_entry(self) -> (K, V) {
        (self.key, self.value)
    }

    #[inline]
    pub(crate) fn color(&self) -> Color {
        self.links.color
    }

    #[inline]
    pub(crate) fn set_color(&mut self, color: Color) {
        self.links.color = color;
    }

    #[inline]
    pub(crate) fn is_red(&self) -> bool {
        self.links.color == Color::Red
    }

    #[inline]
    pub(crate) fn is_black(&self) -> bool {
        self.links.color == Color::Black
    }

    #[inline]
    pub(crate) fn parent(&self) -> Option<Handle> {
        self.links.parent
    }

    #[inline]
    pub(crate) fn set_parent(&mut self, parent: Option<Handle>) {
        self.links.parent = parent;
    }

    #[inline]
    pub(crate) fn child(&self, side: Side) -> Option<Handle> {
        self.links.children[side.slot()]
    }

    #[inline]
    pub(crate) fn set_child(&mut self, side: Side, child: Option<Handle>) {
        self.links.children[side.slot()] = child;
    }

    #[inline]
    pub(crate) fn left(&self) -> Option<Handle> {
        self.child(Side::Left)
    }

    #[inline]
    pub(crate) fn right(&self) -> Option<Handle> {
        self.child(Side::Right)
    }

    pub(crate) fn links(&self) -> Links {
        self.links
    }

    pub(crate) fn set_links(&mut self, links: Links) {
        self.links = links;
    }
}
