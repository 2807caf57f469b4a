//! Ising tree builder

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use super::ising::IsingTree;
use super::node::Node;
use super::TreeError;

/// Sparse description of a tree: node index -> `[(neighbor, coefficient)]`
///
/// A pair whose neighbor equals the key is that node's local field; any
/// other pair is an edge to a child with the given coupling.
pub type Adjacency = BTreeMap<usize, Vec<(usize, f64)>>;

/// Builds an [`IsingTree`] from an [`Adjacency`] mapping
pub struct TreeBuilder;

impl TreeBuilder {
    /// Build a tree in which every index referenced by `adjacency` appears
    /// exactly once
    ///
    /// The root is the only index never named as a child. Children keep the
    /// order of their parent's adjacency list.
    pub fn build(adjacency: &Adjacency) -> Result<IsingTree, TreeError> {
        let mut tree = IsingTree::new();

        let Some(root) = Self::find_root(adjacency)? else {
            return Ok(tree);
        };
        tree.put(root, Node::new(root))?;

        let mut pending = vec![root];
        while let Some(k) = pending.pop() {
            let Some(links) = adjacency.get(&k) else {
                continue;
            };

            let mut children = Vec::new();
            for &(j, coeff) in links {
                if j == k {
                    if let Some(node) = tree.get_mut(k) {
                        node.field = coeff;
                    }
                } else {
                    tree.put(k, Node::new(j).with_coupling(coeff))?;
                    children.push(j);
                }
            }
            pending.extend(children.into_iter().rev());
        }

        let referenced = Self::referenced(adjacency);
        if tree.len() != referenced.len() {
            let missing = referenced
                .into_iter()
                .filter(|&index| tree.get(index).is_none())
                .collect();
            return Err(TreeError::Unreachable(missing));
        }

        debug!(root, nodes = tree.len(), "built tree");
        Ok(tree)
    }

    fn referenced(adjacency: &Adjacency) -> BTreeSet<usize> {
        adjacency
            .iter()
            .flat_map(|(&k, links)| std::iter::once(k).chain(links.iter().map(|&(j, _)| j)))
            .collect()
    }

    fn find_root(adjacency: &Adjacency) -> Result<Option<usize>, TreeError> {
        let referenced = Self::referenced(adjacency);
        if referenced.is_empty() {
            return Ok(None);
        }

        let children: BTreeSet<usize> = adjacency
            .iter()
            .flat_map(|(&k, links)| {
                links
                    .iter()
                    .map(|&(j, _)| j)
                    .filter(move |&j| j != k)
            })
            .collect();

        let roots: Vec<usize> = referenced.difference(&children).copied().collect();
        match roots.as_slice() {
            [] => Err(TreeError::NoRoot),
            [root] => Ok(Some(*root)),
            _ => Err(TreeError::MultipleRoots(roots)),
        }
    }
}
