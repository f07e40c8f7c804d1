//! CSG tree: primitives combined with boolean operators.
//!
//! Each node owns its children outright. Besides its geometry every node
//! carries a `center`, the pivot its subtree rotates about:
//!
//! - leaf: starts at the origin and follows translations
//! - union / intersection: midpoint of the children's centers at construction
//! - difference: the left (kept) child's center at construction
//!
//! After construction the center is only ever moved by `translate`, never
//! recomputed, so after rotating subtrees it drifts from the true centroid.

use std::fmt;

use csg_math::{Mat3, Ray, Vec3};
use serde::{Deserialize, Serialize};

use crate::{Primitive, Sdf};

/// Boolean operator joining two subtrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CsgOp {
    Union,
    Intersection,
    /// Left minus right
    Difference,
}

impl CsgOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            CsgOp::Union => "union",
            CsgOp::Intersection => "intersection",
            CsgOp::Difference => "difference",
        }
    }

    /// Combine the children's distances.
    ///
    /// Union is exact outside both shapes but only a bound inside them.
    #[inline]
    pub fn combine(&self, left: f32, right: f32) -> f32 {
        match self {
            CsgOp::Union => left.min(right),
            CsgOp::Intersection => left.max(right),
            CsgOp::Difference => left.max(-right),
        }
    }
}

impl fmt::Display for CsgOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The shape of a node: a single primitive or an operator over two subtrees.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Leaf(Primitive),
    Union(Box<CsgNode>, Box<CsgNode>),
    Intersection(Box<CsgNode>, Box<CsgNode>),
    Difference(Box<CsgNode>, Box<CsgNode>),
}

/// A node in a CSG tree.
#[derive(Debug, Clone, PartialEq)]
pub struct CsgNode {
    kind: NodeKind,
    center: Vec3,
}

impl CsgNode {
    /// Wrap a primitive in a leaf node. The leaf center starts at the origin.
    pub fn leaf(primitive: Primitive) -> Self {
        Self {
            kind: NodeKind::Leaf(primitive),
            center: Vec3::ZERO,
        }
    }

    /// Join two subtrees, consuming them.
    pub fn combine(op: CsgOp, left: CsgNode, right: CsgNode) -> Self {
        let center = match op {
            CsgOp::Union | CsgOp::Intersection => (left.center + right.center) / 2.0,
            CsgOp::Difference => left.center,
        };
        let (left, right) = (Box::new(left), Box::new(right));
        let kind = match op {
            CsgOp::Union => NodeKind::Union(left, right),
            CsgOp::Intersection => NodeKind::Intersection(left, right),
            CsgOp::Difference => NodeKind::Difference(left, right),
        };
        Self { kind, center }
    }

    pub fn union(left: CsgNode, right: CsgNode) -> Self {
        Self::combine(CsgOp::Union, left, right)
    }

    pub fn intersection(left: CsgNode, right: CsgNode) -> Self {
        Self::combine(CsgOp::Intersection, left, right)
    }

    /// `left` minus `right`.
    pub fn difference(left: CsgNode, right: CsgNode) -> Self {
        Self::combine(CsgOp::Difference, left, right)
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Rotation pivot of this subtree.
    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf(_))
    }

    pub fn primitive(&self) -> Option<&Primitive> {
        match &self.kind {
            NodeKind::Leaf(primitive) => Some(primitive),
            _ => None,
        }
    }

    pub fn op(&self) -> Option<CsgOp> {
        match self.kind {
            NodeKind::Leaf(_) => None,
            NodeKind::Union(..) => Some(CsgOp::Union),
            NodeKind::Intersection(..) => Some(CsgOp::Intersection),
            NodeKind::Difference(..) => Some(CsgOp::Difference),
        }
    }

    pub fn children(&self) -> Option<(&CsgNode, &CsgNode)> {
        match &self.kind {
            NodeKind::Leaf(_) => None,
            NodeKind::Union(l, r) | NodeKind::Intersection(l, r) | NodeKind::Difference(l, r) => {
                Some((l, r))
            }
        }
    }

    /// Number of levels in the tree; a lone leaf has depth 1.
    pub fn depth(&self) -> usize {
        match self.children() {
            None => 1,
            Some((l, r)) => 1 + l.depth().max(r.depth()),
        }
    }

    pub fn leaf_count(&self) -> usize {
        match self.children() {
            None => 1,
            Some((l, r)) => l.leaf_count() + r.leaf_count(),
        }
    }

    /// All primitives in the tree, left to right.
    pub fn primitives(&self) -> Vec<&Primitive> {
        let mut out = Vec::with_capacity(self.leaf_count());
        self.collect_primitives(&mut out);
        out
    }

    fn collect_primitives<'a>(&'a self, out: &mut Vec<&'a Primitive>) {
        match &self.kind {
            NodeKind::Leaf(primitive) => out.push(primitive),
            NodeKind::Union(l, r) | NodeKind::Intersection(l, r) | NodeKind::Difference(l, r) => {
                l.collect_primitives(out);
                r.collect_primitives(out);
            }
        }
    }

    /// Move the whole subtree by `v`, including every stored center.
    pub fn translate(&mut self, v: Vec3) {
        match &mut self.kind {
            NodeKind::Leaf(primitive) => primitive.translate(v),
            NodeKind::Union(l, r) | NodeKind::Intersection(l, r) | NodeKind::Difference(l, r) => {
                l.translate(v);
                r.translate(v);
            }
        }
        self.center += v;
    }

    /// Rotate the subtree about its own center.
    ///
    /// `rotation` is the forward rotation and `inverse` its inverse. Leaves
    /// pre-compose `inverse` onto their world->local rotation; internal nodes
    /// rotate each child about this node's center. This node's own center is
    /// left where it is.
    pub fn rotate(&mut self, rotation: Mat3, inverse: Mat3) {
        let pivot = self.center;
        match &mut self.kind {
            NodeKind::Leaf(primitive) => primitive.apply_inverse_rotation(inverse),
            NodeKind::Union(l, r) | NodeKind::Intersection(l, r) | NodeKind::Difference(l, r) => {
                l.rotate_about(pivot, rotation, inverse);
                r.rotate_about(pivot, rotation, inverse);
            }
        }
    }

    /// Rotate about `pivot` by rotating about our own center and then moving
    /// that center to where `pivot`-relative rotation would have put it.
    ///
    /// `rotate` never moves a node's own center, so the offset may be taken
    /// before or after it.
    fn rotate_about(&mut self, pivot: Vec3, rotation: Mat3, inverse: Mat3) {
        let center_diff = pivot - self.center;
        self.rotate(rotation, inverse);
        self.translate(center_diff);
        self.translate(-(rotation * center_diff));
    }

    /// Whether the ray's line passes through any leaf's bounding sphere.
    ///
    /// The test is against the infinite line, so objects behind the origin
    /// also count. Advisory only: a `true` does not mean the surface is hit.
    pub fn bounding_sphere_intersects(&self, ray: &Ray) -> bool {
        match &self.kind {
            NodeKind::Leaf(primitive) => {
                let oc = ray.origin() - primitive.translation();
                let along = oc.dot(ray.direction());
                let perpendicular_sq = (oc.length_squared() - along * along).max(0.0);
                perpendicular_sq.sqrt() < primitive.bounding_radius()
            }
            NodeKind::Union(l, r) | NodeKind::Intersection(l, r) | NodeKind::Difference(l, r) => {
                l.bounding_sphere_intersects(ray) || r.bounding_sphere_intersects(ray)
            }
        }
    }
}

impl From<Primitive> for CsgNode {
    fn from(primitive: Primitive) -> Self {
        Self::leaf(primitive)
    }
}

impl Sdf for CsgNode {
    fn sdf(&self, point: Vec3) -> f32 {
        match &self.kind {
            NodeKind::Leaf(primitive) => primitive.sdf(point),
            NodeKind::Union(l, r) => CsgOp::Union.combine(l.sdf(point), r.sdf(point)),
            NodeKind::Intersection(l, r) => {
                CsgOp::Intersection.combine(l.sdf(point), r.sdf(point))
            }
            NodeKind::Difference(l, r) => CsgOp::Difference.combine(l.sdf(point), r.sdf(point)),
        }
    }
}
