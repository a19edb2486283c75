//! Fixed-depth quad subdivision over static level geometry
//!
//! The tree shape is decided once at construction: every internal node has
//! exactly four children produced by splitting its box at the center, and
//! leaves hold entries directly. Entries are added and removed by point, but
//! the topology never changes. Moving characters are never stored here.

use glam::{Vec2, Vec3};

use super::bbox::{BoundingBox, Ray};

/// A node of the region tree
#[derive(Debug, Clone)]
pub struct RegionNode<T> {
    pub bbox: BoundingBox,
    entries: Vec<T>,
    children: Option<Box<[RegionNode<T>; 4]>>,
}

impl<T> RegionNode<T> {
    fn build(bbox: BoundingBox, depth: u32) -> Self {
        let children = (depth > 0).then(|| Box::new(bbox.subdivide().map(|quad| Self::build(quad, depth - 1))));
        Self {
            bbox,
            entries: Vec::new(),
            children,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    pub fn entries(&self) -> &[T] {
        &self.entries
    }

    pub fn children(&self) -> Option<&[RegionNode<T>; 4]> {
        self.children.as_deref()
    }

    /// Visit every leaf whose box (and every ancestor's box) passes `check`
    fn walk<'a, F, V>(&'a self, check: &F, visit: &mut V)
    where
        F: Fn(&BoundingBox) -> bool,
        V: FnMut(&'a RegionNode<T>),
    {
        if !check(&self.bbox) {
            return;
        }
        match &self.children {
            None => visit(self),
            Some(children) => {
                for child in children.iter() {
                    child.walk(check, visit);
                }
            }
        }
    }

    /// Descend to the leaf containing `point`
    fn leaf_at_mut(&mut self, point: Vec2) -> Option<&mut RegionNode<T>> {
        if !self.bbox.contains_point(point) {
            return None;
        }
        if self.children.is_none() {
            return Some(self);
        }
        self.children
            .as_deref_mut()?
            .iter_mut()
            .find_map(|child| child.leaf_at_mut(point))
    }

    fn depth(&self) -> u32 {
        match &self.children {
            None => 0,
            Some(children) => 1 + children[0].depth(),
        }
    }

    fn count_leaves(&self) -> usize {
        match &self.children {
            None => 1,
            Some(children) => children.iter().map(Self::count_leaves).sum(),
        }
    }
}

/// Spatial index over static obstacles
#[derive(Debug, Clone)]
pub struct RegionTree<T> {
    root: RegionNode<T>,
}

impl<T> RegionTree<T> {
    /// Build a balanced tree over `[-half_size, half_size]²` whose leaves are `spacing` wide
    ///
    /// Depth is `floor(log2(2 * half_size / spacing))` levels of 4-way branching.
    pub fn build(world_half_size: f32, spacing: f32) -> Self {
        let ratio = 2.0 * world_half_size / spacing;
        let depth = if ratio.is_finite() && ratio >= 1.0 {
            ratio.log2().floor() as u32
        } else {
            0
        };
        let bbox = BoundingBox::new(
            Vec3::new(-world_half_size, -world_half_size, -1.0),
            Vec3::new(world_half_size, world_half_size, 1.0),
        );
        log::debug!("Region tree: half size {world_half_size}, spacing {spacing}, depth {depth}");
        Self {
            root: RegionNode::build(bbox, depth),
        }
    }

    pub fn root(&self) -> &RegionNode<T> {
        &self.root
    }

    pub fn bbox(&self) -> &BoundingBox {
        &self.root.bbox
    }

    /// Levels of 4-way branching below the root
    pub fn depth(&self) -> u32 {
        self.root.depth()
    }

    pub fn leaf_count(&self) -> usize {
        self.root.count_leaves()
    }

    /// Append `payload` to the leaf containing `point`
    ///
    /// Returns the leaf, or `None` when `point` lies outside the root box.
    pub fn insert(&mut self, point: Vec2, payload: T) -> Option<&RegionNode<T>> {
        let leaf = self.root.leaf_at_mut(point)?;
        leaf.entries.push(payload);
        Some(leaf)
    }

    /// Leaves whose boxes pass `check`, pruning whole subtrees that fail
    pub fn leaves_where<F>(&self, check: F) -> Vec<&RegionNode<T>>
    where
        F: Fn(&BoundingBox) -> bool,
    {
        let mut leaves = Vec::new();
        self.root.walk(&check, &mut |leaf| leaves.push(leaf));
        leaves
    }

    /// Union of the entries of every matching leaf (no de-duplication)
    pub fn find_where<F>(&self, check: F) -> Vec<&T>
    where
        F: Fn(&BoundingBox) -> bool,
    {
        let mut found = Vec::new();
        self.root.walk(&check, &mut |leaf| found.extend(leaf.entries.iter()));
        found
    }

    pub fn find_point(&self, point: Vec2) -> Vec<&T> {
        self.find_where(|bbox| bbox.contains_point(point))
    }

    pub fn find_ray(&self, ray: &Ray) -> Vec<&T> {
        self.find_where(|bbox| bbox.intersects_ray(ray))
    }

    pub fn find_box(&self, query: &BoundingBox) -> Vec<&T> {
        self.find_where(|bbox| bbox.intersects(query))
    }
}

impl<T: PartialEq> RegionTree<T> {
    /// Remove the first entry equal to `payload` from the leaf containing `point`
    pub fn remove(&mut self, point: Vec2, payload: &T) -> Option<T> {
        let leaf = self.root.leaf_at_mut(point)?;
        let index = leaf.entries.iter().position(|e| e == payload)?;
        Some(leaf.entries.remove(index))
    }
}
