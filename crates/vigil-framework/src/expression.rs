//! Boolean expressions over condition groups.
//!
//! An [`Expression`] owns its condition groups in an arena and refers to
//! them by [`GroupId`] from an immutable [`Node`] tree. Mutation only ever
//! happens inside the groups, so the tree and the dispatch table built from
//! it can be shared freely.
//!
//! The tree is folded strictly left to right, with no precedence between
//! `and()` and `or()`:
//!
//! ```text
//! A.and().B.or().C      =>  (A && B) || C
//! A.or().B.and().C      =>  (A || B) && C
//! A.not().B             =>  A && !B
//! not().A               =>  !A
//! from(x).whenDone(1).from(y).whenDone(1)   =>  implicit AND
//! ```

use std::fmt;

use crate::group::ConditionGroup;

/// Index of a group inside its expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupId(usize);

impl GroupId {
    /// Returns the arena index.
    pub fn index(self) -> usize {
        self.0
    }
}

/// How a clause attaches to everything declared before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Joint {
    /// The first clause, with no combinator.
    Leading,
    /// A new scope after a condition, joined by an implicit AND.
    Implicit,
    /// `and()`
    And,
    /// `or()`
    Or,
    /// `not()`: AND with the negated clause, or plain negation when first.
    Not,
}

/// A node of the boolean tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// A condition group.
    Leaf(GroupId),
    /// Conjunction.
    And(Box<Node>, Box<Node>),
    /// Disjunction.
    Or(Box<Node>, Box<Node>),
    /// Negation.
    Not(Box<Node>),
}

impl Node {
    /// Evaluates the node against the current group values.
    pub fn evaluate(&self, groups: &[ConditionGroup]) -> bool {
        match self {
            Self::Leaf(id) => groups.get(id.0).is_some_and(ConditionGroup::value),
            Self::And(lhs, rhs) => lhs.evaluate(groups) && rhs.evaluate(groups),
            Self::Or(lhs, rhs) => lhs.evaluate(groups) || rhs.evaluate(groups),
            Self::Not(inner) => !inner.evaluate(groups),
        }
    }

    fn join(lhs: Option<Node>, joint: Joint, leaf: Node) -> Node {
        match (lhs, joint) {
            (None, Joint::Not) => Self::Not(Box::new(leaf)),
            (None, _) => leaf,
            (Some(lhs), Joint::Or) => Self::Or(Box::new(lhs), Box::new(leaf)),
            (Some(lhs), Joint::Not) => Self::And(Box::new(lhs), Box::new(Self::Not(Box::new(leaf)))),
            (Some(lhs), _) => Self::And(Box::new(lhs), Box::new(leaf)),
        }
    }
}

/// One group together with the joint that attached it.
#[derive(Debug)]
pub(crate) struct Clause {
    pub(crate) joint: Joint,
    pub(crate) group: ConditionGroup,
}

/// A compiled matcher expression.
#[derive(Debug)]
pub struct Expression {
    root: Node,
    groups: Vec<ConditionGroup>,
    joints: Vec<Joint>,
}

impl Expression {
    /// Folds clauses into a tree. Returns `None` when there are no clauses.
    pub(crate) fn fold(clauses: Vec<Clause>) -> Option<Self> {
        let mut root = None;
        let mut groups = Vec::with_capacity(clauses.len());
        let mut joints = Vec::with_capacity(clauses.len());

        for Clause { joint, group } in clauses {
            let leaf = Node::Leaf(GroupId(groups.len()));
            root = Some(Node::join(root, joint, leaf));
            groups.push(group);
            joints.push(joint);
        }

        root.map(|root| Self {
            root,
            groups,
            joints,
        })
    }

    /// Evaluates the whole expression.
    pub fn evaluate(&self) -> bool {
        self.root.evaluate(&self.groups)
    }

    /// The root of the tree.
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// All groups, indexed by [`GroupId`].
    pub fn groups(&self) -> &[ConditionGroup] {
        &self.groups
    }

    /// Returns the ids of all groups.
    pub fn group_ids(&self) -> impl Iterator<Item = GroupId> + '_ {
        (0..self.groups.len()).map(GroupId)
    }

    /// Mutable access to one group.
    pub fn group_mut(&mut self, id: GroupId) -> Option<&mut ConditionGroup> {
        self.groups.get_mut(id.0)
    }

    /// Resets every group.
    pub fn reset(&mut self) {
        self.groups.iter_mut().for_each(ConditionGroup::reset);
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (joint, group)) in self.joints.iter().zip(&self.groups).enumerate() {
            let prefix = match joint {
                Joint::Leading => "",
                Joint::Implicit => ".",
                Joint::And => ".and().",
                Joint::Or => ".or().",
                Joint::Not if i == 0 => "not().",
                Joint::Not => ".not().",
            };
            write!(f, "{prefix}{group}")?;
        }
        Ok(())
    }
}
