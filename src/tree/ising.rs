//! Arena-backed Ising tree

use std::collections::HashMap;
use std::fmt;

use tracing::warn;

use super::node::{Node, NodeId, Spin};
use super::TreeError;

/// A rooted, ordered tree of spins
///
/// Nodes live in an arena and refer to each other through [`NodeId`]
/// handles. Every positional operation (spin vectors, energy, the
/// minimizer's index scheme) uses the pre-order depth-first order produced
/// by [`IsingTree::walk`], children visited in insertion order.
#[derive(Debug, Clone, Default)]
pub struct IsingTree {
    nodes: Vec<Node>,
    root: Option<NodeId>,
    lookup: HashMap<usize, NodeId>,
}

impl IsingTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of inserted nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn root(&self) -> Option<&Node> {
        self.root.map(|id| self.node(id))
    }

    /// Resolve an arena handle handed out by this tree
    pub(crate) fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    /// Look up the node carrying `index`, if any
    pub fn get(&self, index: usize) -> Option<&Node> {
        self.id_of(index).map(|id| self.node(id))
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut Node> {
        let id = self.id_of(index)?;
        Some(self.node_mut(id))
    }

    pub fn id_of(&self, index: usize) -> Option<NodeId> {
        self.lookup.get(&index).copied()
    }

    /// Find the direct child of `parent` carrying `index`
    pub fn child(&self, parent: &Node, index: usize) -> Option<&Node> {
        parent
            .children()
            .iter()
            .map(|&id| self.node(id))
            .find(|child| child.index() == index)
    }

    /// Insert `node` as the last child of the node carrying `parent_index`
    ///
    /// When no such node exists and the tree is still empty, `node` becomes
    /// the root. Returns the arena handle of the inserted node.
    pub fn put(&mut self, parent_index: usize, mut node: Node) -> Result<NodeId, TreeError> {
        if self.lookup.contains_key(&node.index()) {
            return Err(TreeError::DuplicateIndex(node.index()));
        }

        let id = NodeId(self.nodes.len());
        node.id = Some(id);

        match self.id_of(parent_index) {
            Some(parent) => {
                node.parent = Some(parent);
                self.node_mut(parent).children.push(id);
            }
            None => {
                if let Some(root) = self.root() {
                    return Err(TreeError::RootAlreadySet {
                        root: root.index(),
                        index: node.index(),
                    });
                }
                node.parent = None;
                self.root = Some(id);
            }
        }

        self.lookup.insert(node.index(), id);
        self.nodes.push(node);
        Ok(id)
    }

    /// Pre-order depth-first walk of the subtree at `start` (root if `None`)
    ///
    /// A handle outside this tree's arena yields an empty walk.
    pub fn walk(&self, start: Option<NodeId>) -> Walk<'_> {
        let stack = start
            .or(self.root)
            .filter(|id| id.0 < self.nodes.len())
            .into_iter()
            .collect();
        Walk { tree: self, stack }
    }

    /// Number of nodes in the subtree at `start`
    pub fn num_of_nodes(&self, start: Option<NodeId>) -> usize {
        match start {
            None => self.len(),
            Some(_) => self.walk(start).count(),
        }
    }

    /// Assign `spins[i]` to the i-th node of the walk from `start`
    ///
    /// Leaves the tree untouched if the length does not match the subtree.
    pub fn set_spins(&mut self, spins: &[Spin], start: Option<NodeId>) -> Result<(), TreeError> {
        let ids: Vec<NodeId> = self.walk(start).filter_map(Node::id).collect();
        if ids.len() != spins.len() {
            warn!(
                expected = ids.len(),
                got = spins.len(),
                "wrong size of spin vector"
            );
            return Err(TreeError::SpinLengthMismatch {
                expected: ids.len(),
                got: spins.len(),
            });
        }

        for (id, &spin) in ids.into_iter().zip(spins) {
            self.node_mut(id).spin = spin;
        }
        Ok(())
    }

    /// Spins of the subtree at `start` in walk order
    pub fn spins(&self, start: Option<NodeId>) -> Vec<Spin> {
        self.walk(start).map(Node::spin).collect()
    }

    /// Energy of the subtree at `start`
    ///
    /// Each node contributes `s * (h + Σ J_c * s_c)` over its direct children.
    pub fn energy(&self, start: Option<NodeId>) -> f64 {
        self.walk(start)
            .map(|x| {
                let children: f64 = x
                    .children()
                    .iter()
                    .map(|&c| {
                        let child = self.node(c);
                        child.coupling() * child.spin().value()
                    })
                    .sum();
                x.spin().value() * (x.field() + children)
            })
            .sum()
    }

    /// Spins ordered by ascending node index rather than by walk position
    pub fn spins_by_index(&self) -> Vec<Spin> {
        let mut indexed: Vec<(usize, Spin)> =
            self.nodes.iter().map(|n| (n.index(), n.spin())).collect();
        indexed.sort_by_key(|&(index, _)| index);
        indexed.into_iter().map(|(_, spin)| spin).collect()
    }

    /// True when every node's index equals its rank in the walk
    pub fn is_depth_first_indexed(&self) -> bool {
        self.walk(None)
            .enumerate()
            .all(|(rank, node)| node.index() == rank)
    }
}

impl fmt::Display for IsingTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for x in self.walk(None) {
            let children: Vec<usize> = x
                .children()
                .iter()
                .map(|&c| self.node(c).index())
                .collect();
            let parent = x.parent().map(|p| self.node(p).index());
            writeln!(
                f,
                "node {}: spin {}, h {}, J {}, children {:?}, parent {:?}",
                x.index(),
                x.spin(),
                x.field(),
                x.coupling(),
                children,
                parent
            )?;
        }
        Ok(())
    }
}

/// Iterator over a subtree in pre-order
///
/// Uses an explicit stack, so arbitrarily deep trees are safe to walk.
pub struct Walk<'a> {
    tree: &'a IsingTree,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let node = self.tree.node(id);
        self.stack.extend(node.children().iter().rev());
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 0 -> (1 -> (3), 2)
    fn sample_tree() -> IsingTree {
        let mut tree = IsingTree::new();
        tree.put(0, Node::new(0).with_field(1.0)).unwrap();
        tree.put(0, Node::new(1).with_coupling(2.0)).unwrap();
        tree.put(0, Node::new(2).with_coupling(-1.0).with_field(0.5)).unwrap();
        tree.put(1, Node::new(3).with_coupling(3.0)).unwrap();
        tree
    }

    fn indices(tree: &IsingTree, start: Option<NodeId>) -> Vec<usize> {
        tree.walk(start).map(Node::index).collect()
    }

    #[test]
    fn test_put_bootstraps_root() {
        let tree = sample_tree();
        let root = tree.root().unwrap();
        assert_eq!(root.index(), 0);
        assert!(root.is_root());
        assert_eq!(tree.len(), 4);

        let three = tree.get(3).unwrap();
        assert!(three.is_leaf());
        assert_eq!(tree.node(three.parent().unwrap()).index(), 1);
    }

    #[test]
    fn test_put_rejects_second_root_and_duplicates() {
        let mut tree = sample_tree();
        let err = tree.put(9, Node::new(7)).unwrap_err();
        assert!(matches!(err, TreeError::RootAlreadySet { root: 0, index: 7 }));

        let err = tree.put(0, Node::new(2)).unwrap_err();
        assert!(matches!(err, TreeError::DuplicateIndex(2)));
        assert_eq!(tree.len(), 4);
    }

    #[test]
    fn test_get_and_child_misses() {
        let tree = sample_tree();
        assert!(tree.get(42).is_none());
        assert!(IsingTree::new().get(0).is_none());

        let root = tree.root().unwrap();
        assert_eq!(tree.child(root, 2).unwrap().index(), 2);
        assert!(tree.child(root, 3).is_none());
    }

    #[test]
    fn test_walk_is_preorder_and_repeatable() {
        let tree = sample_tree();
        assert_eq!(indices(&tree, None), vec![0, 1, 3, 2]);
        assert_eq!(indices(&tree, None), indices(&tree, None));

        let one = tree.id_of(1);
        assert_eq!(indices(&tree, one), vec![1, 3]);
        assert_eq!(tree.num_of_nodes(one), 2);
        assert_eq!(tree.num_of_nodes(None), tree.walk(None).count());
    }

    #[test]
    fn test_walk_from_foreign_handle_is_empty() {
        let tree = sample_tree();
        let detached = Node::new(9);
        assert_eq!(detached.id(), None);

        let mut big = IsingTree::new();
        big.put(0, Node::new(0)).unwrap();
        for i in 1..10 {
            big.put(0, Node::new(i)).unwrap();
        }
        let foreign = big.id_of(9);
        assert_eq!(tree.walk(foreign).count(), 0);
        assert_eq!(tree.num_of_nodes(foreign), 0);
        assert_eq!(tree.energy(foreign), 0.0);
        assert!(tree.spins(foreign).is_empty());

        let inserted = tree.get(3).unwrap();
        assert_eq!(inserted.id(), tree.id_of(3));
    }

    #[test]
    fn test_walk_handles_deep_chain() {
        let mut tree = IsingTree::new();
        tree.put(0, Node::new(0)).unwrap();
        for i in 1..100_000 {
            tree.put(i - 1, Node::new(i).with_coupling(1.0)).unwrap();
        }
        assert_eq!(tree.walk(None).count(), 100_000);
        assert!(tree.is_depth_first_indexed());
    }

    #[test]
    fn test_set_spins_round_trip() {
        let mut tree = sample_tree();
        let spins = vec![Spin::Up, Spin::Down, Spin::Up, Spin::Up];
        tree.set_spins(&spins, None).unwrap();
        assert_eq!(tree.spins(None), spins);

        let one = tree.id_of(1);
        tree.set_spins(&[Spin::Down, Spin::Down], one).unwrap();
        assert_eq!(tree.spins(one), vec![Spin::Down, Spin::Down]);
        assert_eq!(
            tree.spins(None),
            vec![Spin::Up, Spin::Down, Spin::Down, Spin::Up]
        );
    }

    #[test]
    fn test_set_spins_wrong_length_leaves_tree_untouched() {
        let mut tree = sample_tree();
        let before = tree.spins(None);
        let err = tree.set_spins(&[Spin::Up; 3], None).unwrap_err();
        assert!(matches!(
            err,
            TreeError::SpinLengthMismatch {
                expected: 4,
                got: 3
            }
        ));
        assert_eq!(tree.spins(None), before);
    }

    #[test]
    fn test_energy_all_up_without_fields_sums_couplings() {
        let mut tree = IsingTree::new();
        tree.put(0, Node::new(0)).unwrap();
        tree.put(0, Node::new(1).with_coupling(2.0)).unwrap();
        tree.put(0, Node::new(2).with_coupling(-5.0)).unwrap();
        tree.put(2, Node::new(3).with_coupling(4.0)).unwrap();
        tree.set_spins(&[Spin::Up; 4], None).unwrap();
        assert_eq!(tree.energy(None), 1.0);
    }

    #[test]
    fn test_energy_of_subtree() {
        let mut tree = sample_tree();
        // spins in walk order 0, 1, 3, 2
        tree.set_spins(&[Spin::Up, Spin::Down, Spin::Up, Spin::Down], None).unwrap();
        // node 0: +1 * (1 + 2*(-1) + (-1)*(-1)) = 0
        // node 1: -1 * (0 + 3*(+1)) = -3
        // node 3: +1 * 0 = 0
        // node 2: -1 * 0.5 = -0.5
        assert_eq!(tree.energy(None), -3.5);
        assert_eq!(tree.energy(tree.id_of(1)), -3.0);
        assert_eq!(tree.energy(tree.id_of(2)), -0.5);
    }

    #[test]
    fn test_spins_by_index_differs_from_walk_order() {
        let mut tree = sample_tree();
        tree.set_spins(&[Spin::Up, Spin::Down, Spin::Up, Spin::Down], None).unwrap();
        assert!(!tree.is_depth_first_indexed());
        assert_eq!(
            tree.spins_by_index(),
            vec![Spin::Up, Spin::Down, Spin::Down, Spin::Up]
        );
    }

    #[test]
    fn test_display_lists_nodes_in_walk_order() {
        let tree = sample_tree();
        let text = tree.to_string();
        let first: Vec<&str> = text.lines().map(|l| &l[..6]).collect();
        assert_eq!(first, vec!["node 0", "node 1", "node 3", "node 2"]);
        assert!(text.contains("children [1, 2], parent None"));
    }
}
