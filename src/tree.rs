use crate::cursor::{CursorShape, CursorStack};
use crate::draw::DrawCtx;
use crate::error::TreeError;
use crate::frame::{FrameAnchor, FrameFlags, FrameState};
use crate::rect::{clamp_size, Point, Rect, Size};
use crate::request::{Update, UpdateRequest};
use crate::signal::{Signal, SubscriptionId};
use crate::view::{Response, RoundType, View, ViewId, ViewKind};
use cgmath::{EuclideanSpace, Zero};
use log::{trace, warn};
use std::collections::VecDeque;

/// What a node may do in the tree. Fixed when the node is created.
#[derive(Debug)]
pub(crate) enum NodeRole {
    Widget,
    Container,
    Frame(FrameState),
    Root,
}

impl NodeRole {
    fn from_kind(kind: ViewKind) -> NodeRole {
        match kind {
            ViewKind::Widget => NodeRole::Widget,
            ViewKind::Container => NodeRole::Container,
            ViewKind::Frame { flags, anchor } => NodeRole::Frame(FrameState::new(flags, anchor)),
        }
    }
}

/// A node in the view tree.
#[derive(Debug)]
struct TreeNode {
    /// The view object; `None` while one of its hooks is running.
    view: Option<Box<dyn View>>,
    role: NodeRole,
    /// Position in the parent’s coordinate system.
    position: Point,
    size: Size,
    round_type: RoundType,
    round_radius: f32,
    visible: bool,
    parent: Option<ViewId>,
    /// Sibling links, valid while attached.
    previous: Option<ViewId>,
    next: Option<ViewId>,
    first_child: Option<ViewId>,
    last_child: Option<ViewId>,
    child_count: usize,
    /// Fired right before the node is torn down.
    destroyed: Signal<ViewId>,
}

impl TreeNode {
    fn new(view: Box<dyn View>, role: NodeRole) -> TreeNode {
        TreeNode {
            view: Some(view),
            role,
            position: Point::origin(),
            size: Size::zero(),
            round_type: RoundType::empty(),
            round_radius: 0.,
            visible: true,
            parent: None,
            previous: None,
            next: None,
            first_child: None,
            last_child: None,
            child_count: 0,
            destroyed: Signal::new(),
        }
    }

    fn has_value(&self, update: Update) -> bool {
        match update {
            Update::Size(size) => self.size == size,
            Update::Position(position) => self.position == position,
            Update::RoundType(round_type) => self.round_type == round_type,
            Update::RoundRadius(radius) => self.round_radius == radius,
        }
    }
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    node: Option<TreeNode>,
}

/// Tree operations that need a view object, and may hence have to wait until it’s back in its
/// slot.
#[derive(Debug)]
enum Op {
    /// A public mutator: test, then perform with `source == target`.
    Request(ViewId, Update),
    Perform(UpdateRequest<Update>),
    /// `(receiver, request)`
    Report(ViewId, UpdateRequest<Update>),
    ChildAdded { parent: ViewId, child: ViewId },
    ChildRemoved { parent: ViewId, child: ViewId },
    Destroy(ViewId),
}

/// An arena of views forming a single tree under a root view.
///
/// The tree owns every view inserted into it, attached or not. A detached view belongs to
/// whoever holds its handle until it is attached again or destroyed; destroying a view destroys
/// its subviews too.
#[derive(Debug)]
pub struct ViewTree {
    slots: Vec<Slot>,
    free: Vec<u32>,
    root: ViewId,
    pending: VecDeque<Op>,
    /// Number of hooks currently running.
    depth: usize,
    flushing: bool,
    needs_redraw: bool,
    cursors: CursorStack,
}

impl ViewTree {
    pub(crate) fn new(root: Box<dyn View>) -> ViewTree {
        let mut tree = ViewTree {
            slots: Vec::new(),
            free: Vec::new(),
            root: ViewId::new(0, 0),
            pending: VecDeque::new(),
            depth: 0,
            flushing: false,
            needs_redraw: true,
            cursors: CursorStack::default(),
        };
        tree.root = tree.allocate(root, NodeRole::Root);
        tree
    }

    /// The root view.
    pub fn root(&self) -> ViewId {
        self.root
    }

    /// Adds a detached view to the tree.
    pub fn insert<V: View>(&mut self, view: V) -> ViewId {
        self.insert_boxed(Box::new(view))
    }

    pub fn insert_boxed(&mut self, view: Box<dyn View>) -> ViewId {
        let role = NodeRole::from_kind(view.kind());
        let id = self.allocate(view, role);
        trace!("inserted {:?}", id);
        id
    }

    fn allocate(&mut self, view: Box<dyn View>, role: NodeRole) -> ViewId {
        let node = TreeNode::new(view, role);
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(node);
            ViewId::new(index, slot.generation)
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                node: Some(node),
            });
            ViewId::new(index, 0)
        }
    }

    fn node(&self, id: ViewId) -> Option<&TreeNode> {
        let slot = self.slots.get(id.index())?;
        if slot.generation != id.generation() {
            return None;
        }
        slot.node.as_ref()
    }

    fn node_mut(&mut self, id: ViewId) -> Option<&mut TreeNode> {
        let slot = self.slots.get_mut(id.index())?;
        if slot.generation != id.generation() {
            return None;
        }
        slot.node.as_mut()
    }

    /// Returns true if the handle still refers to a view.
    pub fn is_alive(&self, id: ViewId) -> bool {
        self.node(id).is_some()
    }

    /// Number of live views, including the root.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.node.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Downcasts a view. Returns `None` while one of the view’s own hooks is running.
    pub fn view<T: View>(&self, id: ViewId) -> Option<&T> {
        self.node(id)?.view.as_ref()?.as_any().downcast_ref::<T>()
    }

    pub fn view_mut<T: View>(&mut self, id: ViewId) -> Option<&mut T> {
        self.node_mut(id)?.view.as_mut()?.as_any_mut().downcast_mut::<T>()
    }

    // ---- structure ----

    pub fn parent(&self, id: ViewId) -> Option<ViewId> {
        self.node(id)?.parent
    }

    pub fn first_child(&self, id: ViewId) -> Option<ViewId> {
        self.node(id)?.first_child
    }

    pub fn last_child(&self, id: ViewId) -> Option<ViewId> {
        self.node(id)?.last_child
    }

    pub fn next_sibling(&self, id: ViewId) -> Option<ViewId> {
        self.node(id)?.next
    }

    pub fn previous_sibling(&self, id: ViewId) -> Option<ViewId> {
        self.node(id)?.previous
    }

    pub fn child_count(&self, id: ViewId) -> usize {
        self.node(id).map_or(0, |node| node.child_count)
    }

    /// Iterates over the subviews in layout order (back to front).
    pub fn children(&self, id: ViewId) -> Children<'_> {
        let node = self.node(id);
        Children {
            tree: self,
            front: node.and_then(|node| node.first_child),
            back: node.and_then(|node| node.last_child),
        }
    }

    /// Returns true if `ancestor` is a strict ancestor of `id`.
    pub fn is_ancestor(&self, ancestor: ViewId, id: ViewId) -> bool {
        let mut current = self.parent(id);
        while let Some(view) = current {
            if view == ancestor {
                return true;
            }
            current = self.parent(view);
        }
        false
    }

    /// The frame a view belongs to: the ancestor-or-self that is attached to the root.
    pub fn frame_of(&self, id: ViewId) -> Option<ViewId> {
        let mut current = id;
        loop {
            let parent = self.parent(current)?;
            if parent == self.root {
                return Some(current);
            }
            current = parent;
        }
    }

    fn subtree(&self, id: ViewId) -> Vec<ViewId> {
        let mut views = Vec::new();
        self.collect_subtree(id, &mut views);
        views
    }

    fn collect_subtree(&self, id: ViewId, views: &mut Vec<ViewId>) {
        views.push(id);
        for child in self.children(id) {
            self.collect_subtree(child, views);
        }
    }

    /// Appends a view to a container’s subviews, detaching it from its current parent first.
    pub fn push_back_child(&mut self, parent: ViewId, child: ViewId) -> Result<(), TreeError> {
        self.adopt(parent, child, None)
    }

    /// Inserts a view at `index` in a container’s subviews, detaching it from its current parent
    /// first. Indices past the end append.
    pub fn insert_child(
        &mut self,
        parent: ViewId,
        index: usize,
        child: ViewId,
    ) -> Result<(), TreeError> {
        self.adopt(parent, child, Some(index))
    }

    fn adopt(
        &mut self,
        parent: ViewId,
        child: ViewId,
        index: Option<usize>,
    ) -> Result<(), TreeError> {
        if let Err(err) = self.check_adopt(parent, child) {
            warn!("cannot attach {:?} to {:?}: {}", child, parent, err);
            return Err(err);
        }

        let old_parent = self.parent(child);
        if let Some(old_parent) = old_parent {
            self.unlink(old_parent, child);
        }
        let before = index.and_then(|index| self.children(parent).nth(index));
        self.link(parent, child, before);
        trace!("attached {:?} to {:?}", child, parent);
        self.needs_redraw = true;

        if let Some(old_parent) = old_parent {
            if old_parent != parent {
                self.apply(Op::ChildRemoved {
                    parent: old_parent,
                    child,
                });
            }
        }
        self.apply(Op::ChildAdded { parent, child });
        Ok(())
    }

    fn check_adopt(&self, parent: ViewId, child: ViewId) -> Result<(), TreeError> {
        let parent_node = self.node(parent).ok_or(TreeError::NoSuchView(parent))?;
        let child_node = self.node(child).ok_or(TreeError::NoSuchView(child))?;
        if child == self.root {
            return Err(TreeError::Root);
        }
        match (&parent_node.role, &child_node.role) {
            (NodeRole::Widget, _) => return Err(TreeError::NotAContainer(parent)),
            (NodeRole::Root, NodeRole::Frame(_)) => (),
            (NodeRole::Root, _) => return Err(TreeError::NotAFrame(child)),
            (_, NodeRole::Frame(_)) => return Err(TreeError::MisplacedFrame(child)),
            _ => (),
        }
        if child == parent || self.is_ancestor(child, parent) {
            return Err(TreeError::Cycle(child));
        }
        Ok(())
    }

    /// Detaches a view without destroying it. The caller keeps the handle and may attach the
    /// view elsewhere or destroy it.
    pub fn remove_child(&mut self, parent: ViewId, child: ViewId) -> Result<(), TreeError> {
        if !self.is_alive(parent) {
            return Err(TreeError::NoSuchView(parent));
        }
        if !self.is_alive(child) {
            return Err(TreeError::NoSuchView(child));
        }
        if self.parent(child) != Some(parent) {
            let err = TreeError::NotAChild { parent, child };
            warn!("{}", err);
            return Err(err);
        }

        self.unlink(parent, child);
        trace!("detached {:?} from {:?}", child, parent);
        self.needs_redraw = true;
        self.apply(Op::ChildRemoved { parent, child });
        Ok(())
    }

    /// Inserts `child` into `parent`’s sibling chain right before `before` (or at the end).
    fn link(&mut self, parent: ViewId, child: ViewId, before: Option<ViewId>) {
        let previous = match before {
            Some(before) => self.node(before).and_then(|node| node.previous),
            None => self.node(parent).and_then(|node| node.last_child),
        };

        if let Some(node) = self.node_mut(child) {
            node.parent = Some(parent);
            node.previous = previous;
            node.next = before;
        }
        match previous.and_then(|previous| self.node_mut(previous)) {
            Some(node) => node.next = Some(child),
            None => {
                if let Some(node) = self.node_mut(parent) {
                    node.first_child = Some(child);
                }
            }
        }
        match before.and_then(|before| self.node_mut(before)) {
            Some(node) => node.previous = Some(child),
            None => {
                if let Some(node) = self.node_mut(parent) {
                    node.last_child = Some(child);
                }
            }
        }
        if let Some(node) = self.node_mut(parent) {
            node.child_count += 1;
        }
    }

    fn unlink(&mut self, parent: ViewId, child: ViewId) {
        let (previous, next) = match self.node_mut(child) {
            Some(node) => {
                let links = (node.previous, node.next);
                node.parent = None;
                node.previous = None;
                node.next = None;
                links
            }
            None => return,
        };

        match previous.and_then(|previous| self.node_mut(previous)) {
            Some(node) => node.next = next,
            None => {
                if let Some(node) = self.node_mut(parent) {
                    node.first_child = next;
                }
            }
        }
        match next.and_then(|next| self.node_mut(next)) {
            Some(node) => node.previous = previous,
            None => {
                if let Some(node) = self.node_mut(parent) {
                    node.last_child = previous;
                }
            }
        }
        if let Some(node) = self.node_mut(parent) {
            node.child_count = node.child_count.saturating_sub(1);
        }
    }

    /// Destroys a view and all of its subviews.
    ///
    /// `destroyed` subscribers are notified first (parent before subviews) while the subtree is
    /// still intact. If a hook of any view in the subtree is running, destruction happens right
    /// after it returns.
    pub fn destroy(&mut self, id: ViewId) -> Result<(), TreeError> {
        if id == self.root {
            return Err(TreeError::Root);
        }
        if !self.is_alive(id) {
            return Err(TreeError::NoSuchView(id));
        }
        self.apply(Op::Destroy(id));
        Ok(())
    }

    fn destroy_now(&mut self, id: ViewId) {
        if !self.is_alive(id) {
            trace!("{:?} was already destroyed", id);
            return;
        }

        let subtree = self.subtree(id);
        for view in &subtree {
            if let Some(node) = self.node(*view) {
                node.destroyed.emit(view);
            }
        }

        let parent = self.parent(id);
        if let Some(parent) = parent {
            self.unlink(parent, id);
        }
        for view in &subtree {
            self.release(*view);
        }
        trace!("destroyed {:?} and {} subviews", id, subtree.len() - 1);
        self.needs_redraw = true;

        if let Some(parent) = parent {
            self.apply(Op::ChildRemoved { parent, child: id });
        }
    }

    fn release(&mut self, id: ViewId) {
        let node = match self.slots.get_mut(id.index()) {
            Some(slot) if slot.generation == id.generation() => {
                slot.generation = slot.generation.wrapping_add(1);
                slot.node.take()
            }
            _ => None,
        };
        if node.is_some() {
            self.free.push(id.index() as u32);
        }
    }

    /// Subscribes to a view’s destruction. Returns `None` if the view doesn’t exist.
    pub fn on_destroyed<F: 'static + FnMut(&ViewId) + Send>(
        &mut self,
        id: ViewId,
        handler: F,
    ) -> Option<SubscriptionId> {
        Some(self.node_mut(id)?.destroyed.connect(handler))
    }

    pub fn disconnect_destroyed(&mut self, id: ViewId, subscription: SubscriptionId) -> bool {
        match self.node_mut(id) {
            Some(node) => node.destroyed.disconnect(subscription),
            None => false,
        }
    }

    // ---- geometry ----

    pub fn position(&self, id: ViewId) -> Option<Point> {
        self.node(id).map(|node| node.position)
    }

    pub fn size(&self, id: ViewId) -> Option<Size> {
        self.node(id).map(|node| node.size)
    }

    /// The view’s rectangle in its parent’s coordinate system.
    pub fn rect(&self, id: ViewId) -> Option<Rect> {
        self.node(id).map(|node| Rect::new(node.position, node.size))
    }

    pub fn round_type(&self, id: ViewId) -> Option<RoundType> {
        self.node(id).map(|node| node.round_type)
    }

    pub fn round_radius(&self, id: ViewId) -> Option<f32> {
        self.node(id).map(|node| node.round_radius)
    }

    /// The view’s origin in window coordinates.
    pub fn window_origin(&self, id: ViewId) -> Option<Point> {
        let mut origin = Point::origin();
        let mut current = Some(id);
        while let Some(view) = current {
            let node = self.node(view)?;
            origin = origin + node.position.to_vec();
            current = node.parent;
        }
        Some(origin)
    }

    pub fn is_visible(&self, id: ViewId) -> bool {
        self.node(id).map_or(false, |node| node.visible)
    }

    /// Hidden views are skipped by hit testing and drawing.
    pub fn set_visible(&mut self, id: ViewId, visible: bool) {
        if let Some(node) = self.node_mut(id) {
            if node.visible != visible {
                node.visible = visible;
                self.needs_redraw = true;
            }
        }
    }

    /// Resizes a view. Negative sizes are clamped to zero; the view’s size test may reject the
    /// request, in which case nothing happens.
    pub fn resize(&mut self, id: ViewId, size: Size) {
        self.apply(Op::Request(id, Update::Size(clamp_size(size))));
    }

    pub fn set_position(&mut self, id: ViewId, position: Point) {
        self.apply(Op::Request(id, Update::Position(position)));
    }

    pub fn set_round_type(&mut self, id: ViewId, round_type: RoundType) {
        self.apply(Op::Request(id, Update::RoundType(round_type)));
    }

    pub fn set_round_radius(&mut self, id: ViewId, radius: f32) {
        self.apply(Op::Request(id, Update::RoundRadius(radius.max(0.))));
    }

    /// Writes a value without running any hooks.
    fn store(&mut self, id: ViewId, update: Update) {
        if let Some(node) = self.node_mut(id) {
            match update {
                Update::Size(size) => node.size = clamp_size(size),
                Update::Position(position) => node.position = position,
                Update::RoundType(round_type) => node.round_type = round_type,
                Update::RoundRadius(radius) => node.round_radius = radius.max(0.),
            }
            self.needs_redraw = true;
        }
    }

    // ---- queries ----

    fn query_view<R>(&self, id: ViewId, f: impl FnOnce(&dyn View, &QueryCtx) -> R) -> Option<R> {
        let view = self.node(id)?.view.as_ref()?;
        Some(f(&**view, &QueryCtx::new(self, id)))
    }

    /// Falls back to the current size while the view is busy.
    pub fn preferred_size(&self, id: ViewId) -> Size {
        self.query_view(id, |view, cx| view.preferred_size(cx))
            .or_else(|| self.size(id))
            .unwrap_or_else(Size::zero)
    }

    pub fn minimum_size(&self, id: ViewId) -> Size {
        self.query_view(id, |view, cx| view.minimum_size(cx))
            .unwrap_or_else(Size::zero)
    }

    pub fn maximum_size(&self, id: ViewId) -> Size {
        self.query_view(id, |view, cx| view.maximum_size(cx))
            .unwrap_or_else(|| Size::new(i32::MAX, i32::MAX))
    }

    pub fn expand_x(&self, id: ViewId) -> bool {
        self.query_view(id, |view, cx| view.expand_x(cx))
            .unwrap_or(false)
    }

    pub fn expand_y(&self, id: ViewId) -> bool {
        self.query_view(id, |view, cx| view.expand_y(cx))
            .unwrap_or(false)
    }

    /// Runs the view’s hit test; `point` is in the parent’s coordinate system.
    pub fn contain(&self, id: ViewId, point: Point) -> bool {
        self.query_view(id, |view, cx| view.contain(point, cx))
            .unwrap_or_else(|| self.rect(id).map_or(false, |rect| rect.contains(point)))
    }

    /// Finds the innermost visible view under `point` (in `id`’s parent coordinate system),
    /// testing subviews front to back.
    pub fn hit_test(&self, id: ViewId, point: Point) -> Option<ViewId> {
        let node = self.node(id)?;
        if !node.visible || !self.contain(id, point) {
            return None;
        }
        let local = point - node.position.to_vec();
        for child in self.children(id).rev() {
            if let Some(hit) = self.hit_test(child, local) {
                return Some(hit);
            }
        }
        Some(id)
    }

    // ---- frames ----

    pub(crate) fn frame_state(&self, id: ViewId) -> Option<&FrameState> {
        match &self.node(id)?.role {
            NodeRole::Frame(state) => Some(state),
            _ => None,
        }
    }

    pub(crate) fn frame_state_mut(&mut self, id: ViewId) -> Option<&mut FrameState> {
        match &mut self.node_mut(id)?.role {
            NodeRole::Frame(state) => Some(state),
            _ => None,
        }
    }

    pub fn is_frame(&self, id: ViewId) -> bool {
        self.frame_state(id).is_some()
    }

    pub fn frame_flags(&self, id: ViewId) -> Option<FrameFlags> {
        self.frame_state(id).map(|state| state.flags)
    }

    pub fn frame_anchor(&self, id: ViewId) -> Option<FrameAnchor> {
        self.frame_state(id).map(|state| state.anchor)
    }

    // ---- redraw & cursor ----

    pub fn request_redraw(&mut self) {
        self.needs_redraw = true;
    }

    pub fn needs_redraw(&self) -> bool {
        self.needs_redraw
    }

    pub(crate) fn take_redraw(&mut self) -> bool {
        std::mem::replace(&mut self.needs_redraw, false)
    }

    pub fn push_cursor(&mut self, shape: CursorShape) {
        self.cursors.push(shape);
    }

    pub fn pop_cursor(&mut self) -> Option<CursorShape> {
        self.cursors.pop()
    }

    pub fn cursor(&self) -> CursorShape {
        self.cursors.current()
    }

    // ---- hooks ----

    /// Takes a view out of its slot, runs `f` on it and puts it back.
    ///
    /// Returns `None` if the view doesn’t exist or is already out of its slot. Pending operations
    /// run once the outermost hook has returned.
    pub(crate) fn with_view<R>(
        &mut self,
        id: ViewId,
        f: impl FnOnce(&mut dyn View, &mut ViewTree) -> R,
    ) -> Option<R> {
        let mut view = self.node_mut(id)?.view.take()?;
        self.depth += 1;
        let result = f(&mut *view, self);
        self.depth -= 1;
        if let Some(node) = self.node_mut(id) {
            node.view = Some(view);
        }
        if self.depth == 0 {
            self.flush();
        }
        Some(result)
    }

    fn is_busy(&self, id: ViewId) -> bool {
        self.node(id).map_or(false, |node| node.view.is_none())
    }

    fn is_path_busy(&self, from: ViewId, to: ViewId) -> bool {
        let mut current = Some(from);
        while let Some(view) = current {
            if view == to {
                break;
            }
            if self.is_busy(view) {
                return true;
            }
            current = self.parent(view);
        }
        false
    }

    fn is_blocked(&self, op: &Op) -> bool {
        match op {
            Op::Request(id, _) => self.is_busy(*id),
            Op::Perform(request) => self.is_busy(request.target()),
            // reports wait until every view between the receiver and the reporting view is back
            // in its slot, so size hint queries can reach them
            Op::Report(receiver, request) => {
                self.is_busy(*receiver) || self.is_path_busy(request.target(), *receiver)
            }
            Op::ChildAdded { parent, .. } | Op::ChildRemoved { parent, .. } => {
                self.is_busy(*parent)
            }
            Op::Destroy(id) => {
                self.is_alive(*id) && self.subtree(*id).into_iter().any(|view| self.is_busy(view))
            }
        }
    }

    fn apply(&mut self, op: Op) {
        if self.is_blocked(&op) {
            trace!("deferring {:?}", op);
            self.pending.push_back(op);
            return;
        }
        self.depth += 1;
        self.execute(op);
        self.depth -= 1;
        if self.depth == 0 {
            self.flush();
        }
    }

    fn flush(&mut self) {
        if self.flushing {
            return;
        }
        self.flushing = true;
        while let Some(op) = self.pending.pop_front() {
            self.depth += 1;
            self.execute(op);
            self.depth -= 1;
        }
        self.flushing = false;
    }

    fn execute(&mut self, op: Op) {
        match op {
            Op::Request(id, update) => self.run_request(id, update),
            Op::Perform(request) => self.run_perform(request),
            Op::Report(receiver, request) => self.run_report(receiver, request),
            Op::ChildAdded { parent, child } => {
                self.with_view(parent, |view, tree| {
                    view.child_added(child, &mut UpdateCtx::new(tree, parent))
                });
            }
            Op::ChildRemoved { parent, child } => {
                self.with_view(parent, |view, tree| {
                    view.child_removed(child, &mut UpdateCtx::new(tree, parent))
                });
            }
            Op::Destroy(id) => self.destroy_now(id),
        }
    }

    fn run_request(&mut self, id: ViewId, update: Update) {
        match self.node(id) {
            Some(node) if node.has_value(update) => return,
            Some(_) => (),
            None => {
                trace!("dropping {:?} for {:?}: no such view", update, id);
                return;
            }
        }

        self.with_view(id, |view, tree| {
            let mut cx = UpdateCtx::new(tree, id);
            let accepted = match update {
                Update::Size(size) => {
                    let request = UpdateRequest::new(id, id, size);
                    let accepted = view.size_update_test(&request);
                    if accepted {
                        view.perform_size_update(&request, &mut cx);
                    }
                    accepted
                }
                Update::Position(position) => {
                    let request = UpdateRequest::new(id, id, position);
                    let accepted = view.position_update_test(&request);
                    if accepted {
                        view.perform_position_update(&request, &mut cx);
                    }
                    accepted
                }
                Update::RoundType(round_type) => {
                    let request = UpdateRequest::new(id, id, round_type);
                    let accepted = view.round_type_update_test(&request);
                    if accepted {
                        view.perform_round_type_update(&request, &mut cx);
                    }
                    accepted
                }
                Update::RoundRadius(radius) => {
                    let request = UpdateRequest::new(id, id, radius);
                    let accepted = view.round_radius_update_test(&request);
                    if accepted {
                        view.perform_round_radius_update(&request, &mut cx);
                    }
                    accepted
                }
            };
            if !accepted {
                trace!("{:?} rejected {:?}", id, update);
            }
        });
    }

    fn run_perform(&mut self, request: UpdateRequest<Update>) {
        let (source, target) = (request.source(), request.target());
        self.with_view(target, |view, tree| {
            let mut cx = UpdateCtx::new(tree, target);
            match *request.value() {
                Update::Size(size) => {
                    view.perform_size_update(&UpdateRequest::new(source, target, size), &mut cx)
                }
                Update::Position(position) => view.perform_position_update(
                    &UpdateRequest::new(source, target, position),
                    &mut cx,
                ),
                Update::RoundType(round_type) => view.perform_round_type_update(
                    &UpdateRequest::new(source, target, round_type),
                    &mut cx,
                ),
                Update::RoundRadius(radius) => view.perform_round_radius_update(
                    &UpdateRequest::new(source, target, radius),
                    &mut cx,
                ),
            }
        });
    }

    fn run_report(&mut self, receiver: ViewId, request: UpdateRequest<Update>) {
        let (source, target) = (request.source(), request.target());
        self.with_view(receiver, |view, tree| {
            let mut cx = UpdateCtx::new(tree, receiver);
            match *request.value() {
                Update::Size(size) => {
                    view.report_size_update(&UpdateRequest::new(source, target, size), &mut cx)
                }
                Update::Position(position) => view.report_position_update(
                    &UpdateRequest::new(source, target, position),
                    &mut cx,
                ),
                Update::RoundType(round_type) => view.report_round_type_update(
                    &UpdateRequest::new(source, target, round_type),
                    &mut cx,
                ),
                Update::RoundRadius(radius) => view.report_round_radius_update(
                    &UpdateRequest::new(source, target, radius),
                    &mut cx,
                ),
            }
        });
    }

    /// Draws a view and (unless it finishes) its subviews, bracketed by transform push/pop.
    pub(crate) fn draw(&mut self, id: ViewId, cx: &mut DrawCtx) {
        let (position, size, round_type, round_radius) = match self.node(id) {
            Some(node) if node.visible => (
                node.position,
                node.size,
                node.round_type,
                node.round_radius,
            ),
            _ => return,
        };

        cx.pre_draw(id, position, size, round_type, round_radius);
        let response = self
            .with_view(id, |view, _| view.draw(cx))
            .unwrap_or(Response::Ignore);
        if response == Response::Ignore {
            let children: Vec<_> = self.children(id).collect();
            for child in children {
                self.draw(child, cx);
            }
        }
        cx.post_draw();
    }
}

/// Iterator over a view’s subviews; see [`ViewTree::children`].
pub struct Children<'a> {
    tree: &'a ViewTree,
    front: Option<ViewId>,
    back: Option<ViewId>,
}

impl<'a> Iterator for Children<'a> {
    type Item = ViewId;

    fn next(&mut self) -> Option<ViewId> {
        let id = self.front?;
        if self.back == Some(id) {
            self.front = None;
            self.back = None;
        } else {
            self.front = self.tree.next_sibling(id);
        }
        Some(id)
    }
}

impl<'a> DoubleEndedIterator for Children<'a> {
    fn next_back(&mut self) -> Option<ViewId> {
        let id = self.back?;
        if self.front == Some(id) {
            self.front = None;
            self.back = None;
        } else {
            self.back = self.tree.previous_sibling(id);
        }
        Some(id)
    }
}

/// Passed to update hooks.
///
/// Gives write access to the view’s own geometry and layout authority over its subviews.
pub struct UpdateCtx<'a> {
    tree: &'a mut ViewTree,
    id: ViewId,
}

impl<'a> UpdateCtx<'a> {
    pub(crate) fn new(tree: &'a mut ViewTree, id: ViewId) -> Self {
        UpdateCtx { tree, id }
    }

    pub fn id(&self) -> ViewId {
        self.id
    }

    pub fn tree(&self) -> &ViewTree {
        &*self.tree
    }

    /// Read-only access for size hint queries.
    pub fn query(&self) -> QueryCtx<'_> {
        QueryCtx::new(&*self.tree, self.id)
    }

    pub fn size(&self) -> Size {
        self.tree.size(self.id).unwrap_or_else(Size::zero)
    }

    pub fn position(&self) -> Point {
        self.tree.position(self.id).unwrap_or_else(Point::origin)
    }

    pub fn children(&self) -> Vec<ViewId> {
        self.tree.children(self.id).collect()
    }

    /// Stores a new size for this view and marks the context for redraw.
    pub fn set_size(&mut self, size: Size) {
        self.tree.store(self.id, Update::Size(size));
    }

    pub fn set_position(&mut self, position: Point) {
        self.tree.store(self.id, Update::Position(position));
    }

    pub fn set_round_type(&mut self, round_type: RoundType) {
        self.tree.store(self.id, Update::RoundType(round_type));
    }

    pub fn set_round_radius(&mut self, radius: f32) {
        self.tree.store(self.id, Update::RoundRadius(radius));
    }

    pub fn request_redraw(&mut self) {
        self.tree.request_redraw();
    }

    /// Forces a subview’s size. The subview’s size test is skipped.
    pub fn resize_child(&mut self, child: ViewId, size: Size) {
        self.update_child(child, Update::Size(clamp_size(size)));
    }

    pub fn move_child(&mut self, child: ViewId, position: Point) {
        self.update_child(child, Update::Position(position));
    }

    pub fn set_child_round_type(&mut self, child: ViewId, round_type: RoundType) {
        self.update_child(child, Update::RoundType(round_type));
    }

    pub fn set_child_round_radius(&mut self, child: ViewId, radius: f32) {
        self.update_child(child, Update::RoundRadius(radius.max(0.)));
    }

    fn update_child(&mut self, child: ViewId, update: Update) {
        match self.tree.node(child) {
            Some(node) if node.parent == Some(self.id) => {
                if node.has_value(update) {
                    return;
                }
            }
            _ => {
                warn!("{:?} is not a subview of {:?}; ignoring {:?}", child, self.id, update);
                return;
            }
        }
        self.tree
            .apply(Op::Perform(UpdateRequest::new(self.id, child, update)));
    }

    /// Hands a request to this view’s parent’s report hook.
    pub fn report<T: Into<Update> + Copy>(&mut self, request: &UpdateRequest<T>) {
        if let Some(parent) = self.tree.parent(self.id) {
            self.tree.apply(Op::Report(parent, request.erase()));
        }
    }
}

/// Passed to size hint queries and hit tests.
pub struct QueryCtx<'a> {
    tree: &'a ViewTree,
    id: ViewId,
}

impl<'a> QueryCtx<'a> {
    pub(crate) fn new(tree: &'a ViewTree, id: ViewId) -> Self {
        QueryCtx { tree, id }
    }

    pub fn id(&self) -> ViewId {
        self.id
    }

    pub fn tree(&self) -> &'a ViewTree {
        self.tree
    }

    pub fn size(&self) -> Size {
        self.tree.size(self.id).unwrap_or_else(Size::zero)
    }

    pub fn position(&self) -> Point {
        self.tree.position(self.id).unwrap_or_else(Point::origin)
    }

    /// The view’s rectangle in its parent’s coordinate system.
    pub fn rect(&self) -> Rect {
        Rect::new(self.position(), self.size())
    }

    pub fn children(&self) -> Children<'a> {
        self.tree.children(self.id)
    }
}

/// Passed to input, hover and focus hooks.
pub struct EventCtx<'a> {
    tree: &'a mut ViewTree,
    id: ViewId,
}

impl<'a> EventCtx<'a> {
    pub(crate) fn new(tree: &'a mut ViewTree, id: ViewId) -> Self {
        EventCtx { tree, id }
    }

    pub fn id(&self) -> ViewId {
        self.id
    }

    pub fn tree(&self) -> &ViewTree {
        &*self.tree
    }

    /// Full tree access; operations on this view are queued until the hook returns.
    pub fn tree_mut(&mut self) -> &mut ViewTree {
        &mut *self.tree
    }

    pub fn size(&self) -> Size {
        self.tree.size(self.id).unwrap_or_else(Size::zero)
    }

    pub fn position(&self) -> Point {
        self.tree.position(self.id).unwrap_or_else(Point::origin)
    }

    pub fn request_redraw(&mut self) {
        self.tree.request_redraw();
    }

    /// Resizes this view once the hook returns.
    pub fn resize(&mut self, size: Size) {
        self.tree.resize(self.id, size);
    }

    pub fn set_position(&mut self, position: Point) {
        self.tree.set_position(self.id, position);
    }

    pub fn set_round_type(&mut self, round_type: RoundType) {
        self.tree.set_round_type(self.id, round_type);
    }

    pub fn set_round_radius(&mut self, radius: f32) {
        self.tree.set_round_radius(self.id, radius);
    }

    /// Destroys a view; if it’s this one (or an ancestor), that happens once the hook returns.
    pub fn destroy(&mut self, id: ViewId) -> Result<(), TreeError> {
        self.tree.destroy(id)
    }

    pub fn push_cursor(&mut self, shape: CursorShape) {
        self.tree.push_cursor(shape);
    }

    pub fn pop_cursor(&mut self) -> Option<CursorShape> {
        self.tree.pop_cursor()
    }
}

#[cfg(test)]
fn test_tree() -> ViewTree {
    use crate::testing::Probe;
    crate::testing::init_logging();
    ViewTree::new(Box::new(Probe::container("root")))
}

/// Checks that every child’s parent link and the sibling chain agree with the container.
#[cfg(test)]
pub(crate) fn assert_links(tree: &ViewTree, parent: ViewId) {
    let forward: Vec<_> = tree.children(parent).collect();
    let mut backward: Vec<_> = tree.children(parent).rev().collect();
    backward.reverse();
    assert_eq!(forward, backward, "sibling chain is not symmetric");
    assert_eq!(forward.len(), tree.child_count(parent), "child count is stale");
    for (i, child) in forward.iter().enumerate() {
        assert_eq!(tree.parent(*child), Some(parent), "parent link of {:?}", child);
        let previous = if i == 0 { None } else { Some(forward[i - 1]) };
        assert_eq!(tree.previous_sibling(*child), previous);
    }
    if let Some(first) = forward.first() {
        assert_eq!(tree.previous_sibling(*first), None);
    }
    if let Some(last) = forward.last() {
        assert_eq!(tree.next_sibling(*last), None);
    }
}

#[test]
fn test_adopt_insert_and_reparent() {
    use crate::testing::Probe;

    let mut tree = test_tree();
    let a = tree.insert(Probe::container("a"));
    let b = tree.insert(Probe::container("b"));
    let x = tree.insert(Probe::leaf("x"));
    let y = tree.insert(Probe::leaf("y"));
    let z = tree.insert(Probe::leaf("z"));

    tree.push_back_child(a, x).unwrap();
    tree.push_back_child(a, z).unwrap();
    tree.insert_child(a, 1, y).unwrap();
    assert_eq!(tree.children(a).collect::<Vec<_>>(), vec![x, y, z]);
    assert_links(&tree, a);

    // out of range inserts append
    tree.insert_child(a, 42, x).unwrap();
    assert_eq!(tree.children(a).collect::<Vec<_>>(), vec![y, z, x]);
    assert_links(&tree, a);

    // moving straight to another container
    tree.push_back_child(b, y).unwrap();
    assert_eq!(tree.children(a).collect::<Vec<_>>(), vec![z, x]);
    assert_eq!(tree.children(b).collect::<Vec<_>>(), vec![y]);
    assert_eq!(tree.parent(y), Some(b));
    assert_links(&tree, a);
    assert_links(&tree, b);

    assert_eq!(tree.children(a).rev().collect::<Vec<_>>(), vec![x, z]);
}

#[test]
fn test_rejects_corrupting_adoptions() {
    use crate::testing::Probe;

    let mut tree = test_tree();
    let a = tree.insert(Probe::container("a"));
    let b = tree.insert(Probe::container("b"));
    let leaf = tree.insert(Probe::leaf("leaf"));
    let frame = tree.insert(crate::frame::Frame::new());
    let root = tree.root();

    tree.push_back_child(a, b).unwrap();
    assert_eq!(tree.push_back_child(b, a), Err(TreeError::Cycle(a)));
    assert_eq!(tree.push_back_child(a, a), Err(TreeError::Cycle(a)));
    assert_eq!(tree.push_back_child(leaf, a), Err(TreeError::NotAContainer(leaf)));
    assert_eq!(tree.push_back_child(a, root), Err(TreeError::Root));
    assert_eq!(tree.push_back_child(root, a), Err(TreeError::NotAFrame(a)));
    assert_eq!(tree.push_back_child(a, frame), Err(TreeError::MisplacedFrame(frame)));
    assert_eq!(
        tree.remove_child(a, leaf),
        Err(TreeError::NotAChild {
            parent: a,
            child: leaf
        })
    );

    // nothing changed
    assert_eq!(tree.children(a).collect::<Vec<_>>(), vec![b]);
    assert_eq!(tree.parent(a), None);
    assert_links(&tree, a);
}

#[test]
fn test_detach_and_destroy() {
    use crate::testing::Probe;
    use parking_lot::Mutex;
    use std::sync::Arc;

    let mut tree = test_tree();
    let a = tree.insert(Probe::container("a"));
    let b = tree.insert(Probe::container("b"));
    let c = tree.insert(Probe::leaf("c"));
    let d = tree.insert(Probe::leaf("d"));
    tree.push_back_child(a, b).unwrap();
    tree.push_back_child(b, c).unwrap();
    tree.push_back_child(a, d).unwrap();

    tree.remove_child(a, d).unwrap();
    assert_eq!(tree.parent(d), None);
    assert!(tree.is_alive(d), "detaching must not destroy");
    assert_links(&tree, a);

    let order = Arc::new(Mutex::new(Vec::new()));
    for &(view, name) in &[(b, "b"), (c, "c")] {
        let order = Arc::clone(&order);
        tree.on_destroyed(view, move |_| order.lock().push(name));
    }

    let count = tree.len();
    tree.destroy(b).unwrap();
    assert_eq!(*order.lock(), vec!["b", "c"]);
    assert!(!tree.is_alive(b));
    assert!(!tree.is_alive(c));
    assert_eq!(tree.len(), count - 2);
    assert_eq!(tree.child_count(a), 0);
    assert_links(&tree, a);
    assert_eq!(tree.destroy(b), Err(TreeError::NoSuchView(b)));
    assert_eq!(tree.destroy(tree.root()), Err(TreeError::Root));

    // reused slots hand out fresh handles
    let e = tree.insert(Probe::leaf("e"));
    assert_ne!(e, b);
    assert_ne!(e, c);
    assert!(tree.view::<Probe>(b).is_none());
    assert!(tree.view::<Probe>(e).is_some());
}

#[test]
fn test_disconnected_destroy_handler_is_not_called() {
    use crate::testing::Probe;
    use parking_lot::Mutex;
    use std::sync::Arc;

    let mut tree = test_tree();
    let a = tree.insert(Probe::leaf("a"));
    let called = Arc::new(Mutex::new(false));
    let flag = Arc::clone(&called);
    let subscription = tree.on_destroyed(a, move |_| *flag.lock() = true).unwrap();
    assert!(tree.disconnect_destroyed(a, subscription));
    tree.destroy(a).unwrap();
    assert!(!*called.lock());
}

#[test]
fn test_propagation_directions() {
    use crate::testing::Probe;

    let mut tree = test_tree();
    let outer = tree.insert(Probe::container("outer").fills_children());
    let inner = tree.insert(Probe::container("inner"));
    let leaf = tree.insert(Probe::leaf("leaf"));
    tree.push_back_child(outer, inner).unwrap();
    tree.push_back_child(inner, leaf).unwrap();
    let log = crate::testing::shared_log(&mut tree, &[outer, inner, leaf]);
    log.clear();

    // top down: the container forces its child without reporting back
    tree.resize(outer, Size::new(40, 30));
    assert_eq!(tree.size(inner), Some(Size::new(40, 30)));
    assert_eq!(
        log.take(),
        vec![
            "outer: perform size local",
            "inner: perform size from parent",
        ]
    );

    // bottom up: a local change is reported to every ancestor, never performed on them
    tree.resize(leaf, Size::new(5, 5));
    assert_eq!(tree.size(leaf), Some(Size::new(5, 5)));
    assert_eq!(tree.size(inner), Some(Size::new(40, 30)));
    assert_eq!(
        log.take(),
        vec![
            "leaf: perform size local",
            "inner: report size of leaf",
            "outer: report size of leaf",
        ]
    );

    // unchanged values are a no-op
    tree.resize(leaf, Size::new(5, 5));
    assert!(log.take().is_empty());

    tree.set_round_type(leaf, RoundType::ALL);
    tree.set_round_radius(leaf, 4.);
    assert_eq!(tree.round_type(leaf), Some(RoundType::ALL));
    assert_eq!(tree.round_radius(leaf), Some(4.));
    assert_eq!(
        log.take(),
        vec![
            "leaf: perform round type local",
            "inner: report round type of leaf",
            "outer: report round type of leaf",
            "leaf: perform round radius local",
            "inner: report round radius of leaf",
            "outer: report round radius of leaf",
        ]
    );
}

#[test]
fn test_size_test_rejects_silently() {
    use crate::testing::Probe;

    let mut tree = test_tree();
    let leaf = tree.insert(Probe::leaf("leaf").with_minimum(Size::new(10, 10)));
    tree.resize(leaf, Size::new(20, 20));
    tree.resize(leaf, Size::new(5, 50));
    assert_eq!(tree.size(leaf), Some(Size::new(20, 20)));

    // zero and negative sizes are fine for views without constraints
    let other = tree.insert(Probe::leaf("other"));
    tree.resize(other, Size::new(-3, 0));
    assert_eq!(tree.size(other), Some(Size::new(0, 0)));
}

#[test]
fn test_hook_operations_on_self_are_deferred() {
    use crate::testing::{Probe, PressAction};

    let mut tree = test_tree();
    let leaf = tree.insert(Probe::leaf("leaf").on_press(PressAction::Resize(Size::new(7, 8))));

    tree.with_view(leaf, |view, tree| {
        let mut cx = EventCtx::new(tree, leaf);
        view.perform_mouse_press(
            &crate::events::MouseEvent::press(crate::events::MouseButton::Left, Point::origin()),
            &mut cx,
        );
        // still out of its slot here
        assert_eq!(cx.size(), Size::zero());
    });
    assert_eq!(tree.size(leaf), Some(Size::new(7, 8)));
}

#[test]
fn test_hit_test_front_to_back() {
    use crate::testing::Probe;

    let mut tree = test_tree();
    let container = tree.insert(Probe::container("container"));
    let back = tree.insert(Probe::leaf("back"));
    let front = tree.insert(Probe::leaf("front"));
    tree.push_back_child(container, back).unwrap();
    tree.push_back_child(container, front).unwrap();
    tree.resize(container, Size::new(100, 100));
    tree.set_position(container, Point::new(10, 10));
    tree.resize(back, Size::new(50, 50));
    tree.resize(front, Size::new(50, 50));
    tree.set_position(front, Point::new(25, 25));

    // points are in the container’s parent coordinates
    assert_eq!(tree.hit_test(container, Point::new(40, 40)), Some(front));
    assert_eq!(tree.hit_test(container, Point::new(15, 15)), Some(back));
    assert_eq!(tree.hit_test(container, Point::new(100, 15)), Some(container));
    assert_eq!(tree.hit_test(container, Point::new(5, 5)), None);

    tree.set_visible(front, false);
    assert_eq!(tree.hit_test(container, Point::new(40, 40)), Some(back));
    assert_eq!(tree.window_origin(front), Some(Point::new(35, 35)));
}
