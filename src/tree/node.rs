//! Spins and tree vertices

use std::fmt;

use super::TreeError;

/// Handle of a node inside the tree arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

/// State of a single spin variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Spin {
    /// +1
    Up,
    /// -1
    Down,
}

impl Spin {
    /// Numeric value of the spin, +1.0 or -1.0
    pub fn value(self) -> f64 {
        match self {
            Spin::Up => 1.0,
            Spin::Down => -1.0,
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            Spin::Up => Spin::Down,
            Spin::Down => Spin::Up,
        }
    }

    /// Single character used in result files
    pub fn symbol(self) -> char {
        match self {
            Spin::Up => '+',
            Spin::Down => '-',
        }
    }
}

impl TryFrom<i64> for Spin {
    type Error = TreeError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Spin::Up),
            -1 => Ok(Spin::Down),
            other => Err(TreeError::InvalidSpin(other)),
        }
    }
}

impl From<Spin> for i64 {
    fn from(spin: Spin) -> Self {
        match spin {
            Spin::Up => 1,
            Spin::Down => -1,
        }
    }
}

impl fmt::Display for Spin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Spin::Up => write!(f, "+1"),
            Spin::Down => write!(f, "-1"),
        }
    }
}

/// A vertex of an Ising tree
///
/// Links to the parent and children are arena handles owned by the tree;
/// a node never owns its neighbours.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    index: usize,
    /// Set when the node is inserted into a tree
    pub(crate) id: Option<NodeId>,
    pub(crate) spin: Spin,
    /// Local field `h`
    pub(crate) field: f64,
    /// Coupling `J` to the parent, unused for the root
    pub(crate) coupling: f64,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

impl Node {
    /// Create a detached node with `h = 0`, `J = 0` and spin -1
    pub fn new(index: usize) -> Self {
        Self {
            index,
            id: None,
            spin: Spin::Down,
            field: 0.0,
            coupling: 0.0,
            parent: None,
            children: Vec::new(),
        }
    }

    /// Create a node from a raw spin value, which must be +1 or -1
    pub fn with_spin_value(index: usize, spin: i64) -> Result<Self, TreeError> {
        let spin = Spin::try_from(spin)?;
        Ok(Self::new(index).with_spin(spin))
    }

    pub fn with_spin(mut self, spin: Spin) -> Self {
        self.spin = spin;
        self
    }

    pub fn with_field(mut self, field: f64) -> Self {
        self.field = field;
        self
    }

    pub fn with_coupling(mut self, coupling: f64) -> Self {
        self.coupling = coupling;
        self
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Arena handle, `None` while the node is detached
    pub fn id(&self) -> Option<NodeId> {
        self.id
    }

    pub fn spin(&self) -> Spin {
        self.spin
    }

    pub fn field(&self) -> f64 {
        self.field
    }

    pub fn coupling(&self) -> f64 {
        self.coupling
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub(crate) fn flip(&mut self) {
        self.spin = self.spin.flipped();
    }
}
