//! Flip-and-compare ground state search

use thiserror::Error;
use tracing::{debug, trace};

use crate::tree::{IsingTree, Node, NodeId, Spin, TreeError};

#[derive(Error, Debug)]
pub enum MinimizeError {
    #[error("spin vector has {got} entries but the tree has {expected} nodes")]
    LengthMismatch { expected: usize, got: usize },

    #[error(transparent)]
    Tree(#[from] TreeError),
}

/// Single-pass local search over an [`IsingTree`]
///
/// Nodes are visited in walk order. Each node's spin is flipped and the
/// search continues with the shifted energy; once the rest of the walk has
/// been decided, the flip is kept only if the energy it led to is strictly
/// lower than the energy before it. A rejected flip restores this node and
/// every node after it, so the live tree always carries the configuration
/// whose energy is returned.
///
/// Work is linear in the number of nodes and no recursion is involved.
pub struct Minimizer;

impl Minimizer {
    /// Minimize starting from `spins` with energy `energy`
    ///
    /// `spins` is in walk order and is written back with the retained
    /// configuration; the tree's node spins are left equal to it. The
    /// returned energy never exceeds `energy`.
    pub fn minimize(
        tree: &mut IsingTree,
        spins: &mut [Spin],
        energy: f64,
    ) -> Result<f64, MinimizeError> {
        if spins.len() != tree.len() {
            return Err(MinimizeError::LengthMismatch {
                expected: tree.len(),
                got: spins.len(),
            });
        }
        tree.set_spins(spins, None)?;

        let order: Vec<NodeId> = tree.walk(None).filter_map(Node::id).collect();

        // Forward: flip every node in turn, remembering the energy on entry
        let mut entry = Vec::with_capacity(order.len());
        let mut current = energy;
        for (i, &id) in order.iter().enumerate() {
            trace!(i, energy = current, spin = %tree.node(id).spin(), "flip");
            let delta = Self::flip_delta(tree, id);
            tree.node_mut(id).flip();
            entry.push(current);
            current += delta;
        }

        // Backward: accept or reject each flip against its entry energy
        let mut best = current;
        let mut restore_from = order.len();
        for i in (0..order.len()).rev() {
            if best >= entry[i] {
                best = entry[i];
                restore_from = i;
            }
        }

        for &id in &order[restore_from..] {
            tree.node_mut(id).flip();
        }
        for (slot, &id) in spins.iter_mut().zip(&order) {
            *slot = tree.node(id).spin();
        }

        debug!(
            initial = energy,
            minimum = best,
            flipped = restore_from,
            "minimization finished"
        );
        Ok(best)
    }

    /// Seed every spin with `initial` and minimize from there
    pub fn ground_state(
        tree: &mut IsingTree,
        initial: Spin,
    ) -> Result<(f64, Vec<Spin>), MinimizeError> {
        let mut spins = vec![initial; tree.len()];
        tree.set_spins(&spins, None)?;
        let energy = tree.energy(None);
        let minimum = Self::minimize(tree, &mut spins, energy)?;
        Ok((minimum, spins))
    }

    /// Energy change caused by flipping the spin at `id` alone
    fn flip_delta(tree: &IsingTree, id: NodeId) -> f64 {
        let node = tree.node(id);
        let s = node.spin().value();

        let parent = node
            .parent()
            .map_or(0.0, |p| tree.node(p).spin().value() * s * node.coupling());
        let field = node.field() * s;
        let children: f64 = node
            .children()
            .iter()
            .map(|&c| {
                let child = tree.node(c);
                child.coupling() * child.spin().value()
            })
            .sum();

        -2.0 * (parent + field + s * children)
    }
}
