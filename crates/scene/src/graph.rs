//! Hierarchical scene composition.
//!
//! A scene is a tree of [`SceneNode`]s. Leaves hold a [`Surface`]; groups
//! hold ordered children. Every node has a local [`Transform`] relative to its
//! parent, so a transform on a group moves all of its descendants. Colors are
//! different: a color or opacity set on a group is written into every leaf
//! below it right away, and a later write to a single leaf wins.
//!
//! Children are append-only, which keeps [`NodePath`]s stable for the life of
//! a scene.

use glam::{Mat4, Vec3};
use paramsurf_animation::TargetStore;
use paramsurf_core::{Error, Result};
use paramsurf_geometry::{Color, Fill, Surface, SurfaceVertex};

use crate::Transform;

/// Child indices from the root to a node.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct NodePath(Vec<usize>);

impl NodePath {
    /// Path of the root group.
    pub fn root() -> Self {
        Self::default()
    }

    /// Create a path from child indices, outermost first
    pub fn new(indices: impl Into<Vec<usize>>) -> Self {
        Self(indices.into())
    }

    /// Path of this node's `index`-th child.
    pub fn child(&self, index: usize) -> Self {
        let mut indices = self.0.clone();
        indices.push(index);
        Self(indices)
    }

    /// Get the child indices
    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    /// True for the empty path
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

/// What a node holds.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    Leaf(Surface),
    Group(Vec<SceneNode>),
}

/// A node of the scene tree.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneNode {
    name: Option<String>,
    transform: Transform,
    kind: NodeKind,
}

impl SceneNode {
    /// Create a leaf holding `surface`
    pub fn leaf(surface: Surface) -> Self {
        Self {
            name: None,
            transform: Transform::new(),
            kind: NodeKind::Leaf(surface),
        }
    }

    /// Create a group; children keep the given order
    pub fn group(children: impl IntoIterator<Item = SceneNode>) -> Self {
        Self {
            name: None,
            transform: Transform::new(),
            kind: NodeKind::Group(children.into_iter().collect()),
        }
    }

    /// Builder: name the node.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Builder: set the local transform.
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Get the node name, if set
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Get the node kind
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// True for a leaf node
    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf(_))
    }

    /// Get the surface of a leaf
    pub fn surface(&self) -> Option<&Surface> {
        match &self.kind {
            NodeKind::Leaf(surface) => Some(surface),
            NodeKind::Group(_) => None,
        }
    }

    /// Get the surface of a leaf for editing
    pub fn surface_mut(&mut self) -> Option<&mut Surface> {
        match &mut self.kind {
            NodeKind::Leaf(surface) => Some(surface),
            NodeKind::Group(_) => None,
        }
    }

    /// Children of a group; empty for a leaf.
    pub fn children(&self) -> &[SceneNode] {
        match &self.kind {
            NodeKind::Leaf(_) => &[],
            NodeKind::Group(children) => children,
        }
    }

    /// Get the child at `index`
    pub fn child(&self, index: usize) -> Option<&SceneNode> {
        self.children().get(index)
    }

    /// Get the child at `index` for editing
    pub fn child_mut(&mut self, index: usize) -> Option<&mut SceneNode> {
        match &mut self.kind {
            NodeKind::Leaf(_) => None,
            NodeKind::Group(children) => children.get_mut(index),
        }
    }

    /// Append a child and return its index.
    pub fn add(&mut self, child: SceneNode) -> Result<usize> {
        match &mut self.kind {
            NodeKind::Leaf(_) => Err(Error::Scene(format!(
                "cannot add a child to leaf {:?}",
                self.name.as_deref().unwrap_or("<unnamed>")
            ))),
            NodeKind::Group(children) => {
                children.push(child);
                Ok(children.len() - 1)
            }
        }
    }

    /// Descendant at `path`, relative to this node.
    pub fn node(&self, path: &NodePath) -> Option<&SceneNode> {
        path.indices()
            .iter()
            .try_fold(self, |node, &index| node.child(index))
    }

    /// Get a descendant by relative path for editing
    pub fn node_mut(&mut self, path: &NodePath) -> Option<&mut SceneNode> {
        let mut node = self;
        for &index in path.indices() {
            node = node.child_mut(index)?;
        }
        Some(node)
    }

    /// Get the local transform
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Replace the local transform
    pub fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
    }

    /// Move by `offset` in the parent frame.
    pub fn shift(&mut self, offset: Vec3) {
        self.transform.shift(offset);
    }

    /// Move by `offset` in the node's own frame.
    pub fn translate(&mut self, offset: Vec3) {
        self.transform.translate_local(offset);
    }

    /// Shift so that the bounding-box center lands on `point`.
    pub fn move_to(&mut self, point: Vec3) {
        let center = self.center().unwrap_or_else(|| self.transform.translation());
        self.shift(point - center);
    }

    /// Scale uniformly about the node's center.
    pub fn scale(&mut self, factor: f32) {
        let center = self.center().unwrap_or_else(|| self.transform.translation());
        self.transform.scale_about(factor, center);
    }

    /// Scale uniformly about `point` in the parent frame
    pub fn scale_about(&mut self, factor: f32, point: Vec3) {
        self.transform.scale_about(factor, point);
    }

    /// Rotate about `axis` through `about_point`, or through the node's
    /// center when no point is given.
    pub fn rotate_about_axis(&mut self, angle: f32, axis: Vec3, about_point: Option<Vec3>) {
        let point = about_point
            .or_else(|| self.center())
            .unwrap_or_else(|| self.transform.translation());
        self.transform.rotate_about(angle, axis, point);
    }

    /// Uniform color on every leaf below this node.
    pub fn set_color(&mut self, color: Color) {
        self.for_each_surface(&mut |surface: &mut Surface| surface.set_color(color));
    }

    /// Opacity on every leaf below this node.
    pub fn set_opacity(&mut self, opacity: f32) {
        self.for_each_surface(&mut |surface: &mut Surface| surface.set_opacity(opacity));
    }

    fn for_each_surface(&mut self, f: &mut dyn FnMut(&mut Surface)) {
        match &mut self.kind {
            NodeKind::Leaf(surface) => f(surface),
            NodeKind::Group(children) => {
                for child in children {
                    child.for_each_surface(f);
                }
            }
        }
    }

    /// Shift each listed child along its direction.
    ///
    /// `children[i]` moves by `directions[i] * distance` in this group's
    /// frame, so exploding by `-distance` puts everything back. Inputs are
    /// checked before anything moves.
    pub fn explode(&mut self, children: &[usize], directions: &[Vec3], distance: f32) -> Result<()> {
        if children.len() != directions.len() {
            return Err(Error::Scene(format!(
                "explode got {} children but {} directions",
                children.len(),
                directions.len()
            )));
        }
        if self.is_leaf() {
            return Err(Error::Scene("cannot explode a leaf".to_string()));
        }
        let count = self.children().len();
        if let Some(&bad) = children.iter().find(|&&i| i >= count) {
            return Err(Error::Scene(format!(
                "explode child {bad} out of range for group of {count}"
            )));
        }

        for (&index, &direction) in children.iter().zip(directions) {
            if let Some(child) = self.child_mut(index) {
                child.shift(direction * distance);
            }
        }
        Ok(())
    }

    /// Bounds in the node's own frame.
    pub fn local_bounds(&self) -> Option<(Vec3, Vec3)> {
        match &self.kind {
            NodeKind::Leaf(surface) => surface.mesh().bounds(),
            NodeKind::Group(children) => children
                .iter()
                .filter_map(SceneNode::bounds)
                .reduce(|(lo, hi), (min, max)| (lo.min(min), hi.max(max))),
        }
    }

    /// Axis-aligned bounds in the parent frame. `None` for an empty group.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        self.local_bounds()
            .map(|bounds| transform_bounds(self.transform.matrix(), bounds))
    }

    /// Center of [`SceneNode::bounds`].
    pub fn center(&self) -> Option<Vec3> {
        self.bounds().map(|(lo, hi)| (lo + hi) * 0.5)
    }

    /// Blend every leaf from its fill in `start` towards `color`.
    ///
    /// `start` is an earlier clone of this node. Leaves added since then are
    /// left alone. At `t >= 1` the color is set exactly.
    pub(crate) fn blend_color_from(&mut self, start: &SceneNode, color: Color, t: f32) {
        match (&mut self.kind, &start.kind) {
            (NodeKind::Leaf(surface), NodeKind::Leaf(from)) => {
                if t >= 1.0 {
                    surface.set_color(color);
                } else {
                    surface.blend_fill(from.fill(), color, t);
                }
            }
            (NodeKind::Group(children), NodeKind::Group(from)) => {
                for (child, from) in children.iter_mut().zip(from) {
                    child.blend_color_from(from, color, t);
                }
            }
            _ => {}
        }
    }

    /// Blend every leaf's opacity from its value in `start` towards `opacity`.
    pub(crate) fn fade_from(&mut self, start: &SceneNode, opacity: f32, t: f32) {
        match (&mut self.kind, &start.kind) {
            (NodeKind::Leaf(surface), NodeKind::Leaf(from)) => {
                let t = t.clamp(0.0, 1.0);
                surface.set_opacity(from.opacity() + (opacity - from.opacity()) * t);
            }
            (NodeKind::Group(children), NodeKind::Group(from)) => {
                for (child, from) in children.iter_mut().zip(from) {
                    child.fade_from(from, opacity, t);
                }
            }
            _ => {}
        }
    }

    fn collect_render_items(&self, parent: Mat4, path: NodePath, items: &mut Vec<RenderItem>) {
        let model = parent * self.transform.matrix();
        match &self.kind {
            NodeKind::Leaf(surface) => {
                items.push(RenderItem::new(path, self.name.clone(), model, surface));
            }
            NodeKind::Group(children) => {
                for (index, child) in children.iter().enumerate() {
                    child.collect_render_items(model, path.child(index), items);
                }
            }
        }
    }

    fn find(&self, name: &str, path: NodePath) -> Option<NodePath> {
        if self.name.as_deref() == Some(name) {
            return Some(path);
        }
        self.children()
            .iter()
            .enumerate()
            .find_map(|(index, child)| child.find(name, path.child(index)))
    }
}

fn transform_bounds(matrix: Mat4, (min, max): (Vec3, Vec3)) -> (Vec3, Vec3) {
    let mut lo = Vec3::splat(f32::INFINITY);
    let mut hi = Vec3::splat(f32::NEG_INFINITY);
    for corner in 0..8 {
        let p = Vec3::new(
            if corner & 1 == 0 { min.x } else { max.x },
            if corner & 2 == 0 { min.y } else { max.y },
            if corner & 4 == 0 { min.z } else { max.z },
        );
        let p = matrix.transform_point3(p);
        lo = lo.min(p);
        hi = hi.max(p);
    }
    (lo, hi)
}

/// One leaf ready for a rendering backend, in world space.
#[derive(Clone, Debug)]
pub struct RenderItem {
    pub path: NodePath,
    pub name: Option<String>,
    /// Local-to-world matrix the vertices were transformed with
    pub model: Mat4,
    pub vertices: Vec<SurfaceVertex>,
    pub indices: Vec<u32>,
    pub opacity: f32,
}

impl RenderItem {
    fn new(path: NodePath, name: Option<String>, model: Mat4, surface: &Surface) -> Self {
        let normal_matrix = Transform::normal_matrix(model);
        let vertices = surface
            .vertices()
            .into_iter()
            .map(|v| {
                SurfaceVertex::new(
                    model.transform_point3(v.position),
                    normal_matrix.transform_vector3(v.normal).normalize_or_zero(),
                    v.color,
                )
            })
            .collect();
        Self {
            path,
            name,
            model,
            vertices,
            indices: surface.mesh().triangle_indices(),
            opacity: surface.opacity(),
        }
    }

    /// Vertex data as raw bytes.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }
}

/// A scene: a root group and path-based access to its nodes.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneGraph {
    root: SceneNode,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self {
            root: SceneNode::group([]).with_name("root"),
        }
    }
}

impl SceneGraph {
    /// Create a scene with an empty root group
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the root group
    pub fn root(&self) -> &SceneNode {
        &self.root
    }

    /// Get the root group for editing
    pub fn root_mut(&mut self) -> &mut SceneNode {
        &mut self.root
    }

    /// Append `node` under the group at `parent`.
    pub fn add(&mut self, parent: &NodePath, node: SceneNode) -> Result<NodePath> {
        let group = self
            .root
            .node_mut(parent)
            .ok_or_else(|| Error::Scene(format!("no node at {parent:?}")))?;
        let index = group.add(node)?;
        Ok(parent.child(index))
    }

    /// Append `node` to the root group.
    pub fn add_to_root(&mut self, node: SceneNode) -> Result<NodePath> {
        self.add(&NodePath::root(), node)
    }

    /// Get a node by path
    pub fn node(&self, path: &NodePath) -> Option<&SceneNode> {
        self.root.node(path)
    }

    pub fn node_mut(&mut self, path: &NodePath) -> Option<&mut SceneNode> {
        self.root.node_mut(path)
    }

    /// Like [`SceneGraph::node_mut`] but fails with [`Error::Scene`].
    pub fn require_mut(&mut self, path: &NodePath) -> Result<&mut SceneNode> {
        self.root
            .node_mut(path)
            .ok_or_else(|| Error::Scene(format!("no node at {path:?}")))
    }

    /// Depth-first search for a node by name.
    pub fn find(&self, name: &str) -> Option<NodePath> {
        self.root.find(name, NodePath::root())
    }

    /// Local-to-world matrix of the node at `path`.
    pub fn world_matrix(&self, path: &NodePath) -> Option<Mat4> {
        let mut node = &self.root;
        let mut matrix = node.transform.matrix();
        for &index in path.indices() {
            node = node.child(index)?;
            matrix *= node.transform.matrix();
        }
        Some(matrix)
    }

    /// Every leaf in world space, in depth-first order.
    pub fn render_items(&self) -> Vec<RenderItem> {
        let mut items = Vec::new();
        self.root
            .collect_render_items(Mat4::IDENTITY, NodePath::root(), &mut items);
        items
    }
}

impl TargetStore<NodePath, SceneNode> for SceneGraph {
    fn target(&self, key: &NodePath) -> Option<&SceneNode> {
        self.node(key)
    }

    fn target_mut(&mut self, key: &NodePath) -> Option<&mut SceneNode> {
        self.node_mut(key)
    }
}
