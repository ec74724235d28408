//! Linear (box) layout.

use crate::rect::{Margin, Point, Rect, Size};
use crate::request::UpdateRequest;
use crate::tree::{QueryCtx, UpdateCtx};
use crate::view::{View, ViewId, ViewKind};
use cgmath::{EuclideanSpace, Vector2};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// Placement of subviews that don’t fill the available space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Alignment {
    Start,
    Center,
    End,
}

/// Size hints of one subview along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Hint {
    pub minimum: i32,
    pub preferred: i32,
    pub maximum: i32,
    pub expand: bool,
}

impl Hint {
    fn clamp(&self, length: i32) -> i32 {
        clamp(length, self.minimum, self.maximum)
    }
}

/// Clamps to `[minimum, maximum]`; the minimum wins if the two cross.
fn clamp(value: i32, minimum: i32, maximum: i32) -> i32 {
    value.min(maximum).max(minimum)
}

/// Distributes `available` length among items along one axis.
///
/// Items that don’t expand get their preferred length. Whatever is left is split among the
/// expanding ones in proportion to their preferred length (equally if those are all zero), with
/// any rounding remainder going to the last of them. An expanding item whose share would violate
/// its minimum or maximum is pinned there and the rest is split again among the others.
///
/// As long as no expanding item ends up pinned, the expanding items’ lengths add up exactly to
/// what the fixed items leave over.
pub fn distribute(available: i32, hints: &[Hint]) -> Vec<i32> {
    let mut lengths: Vec<i32> = hints
        .iter()
        .map(|hint| if hint.expand { 0 } else { hint.clamp(hint.preferred) })
        .collect();

    let mut active: Vec<usize> = (0..hints.len()).filter(|&i| hints[i].expand).collect();
    let mut remaining = available.max(0) as i64
        - lengths.iter().map(|&length| length as i64).sum::<i64>();
    remaining = remaining.max(0);

    while !active.is_empty() {
        let shares = split(remaining, &active.iter().map(|&i| hints[i]).collect::<Vec<_>>());

        let mut pinned = Vec::new();
        for (&i, &share) in active.iter().zip(&shares) {
            let clamped = hints[i].clamp(share);
            if clamped != share {
                lengths[i] = clamped;
                pinned.push(i);
            } else {
                lengths[i] = share;
            }
        }

        if pinned.is_empty() {
            break;
        }
        for i in pinned {
            remaining = (remaining - lengths[i] as i64).max(0);
            active.retain(|&j| j != i);
        }
    }

    lengths
}

/// Splits `total` by preferred-length weights; the last item takes the rounding remainder.
fn split(total: i64, hints: &[Hint]) -> Vec<i32> {
    let weights: Vec<i64> = hints.iter().map(|hint| hint.preferred.max(0) as i64).collect();
    let weight_sum: i64 = weights.iter().sum();
    let count = hints.len() as i64;

    let mut shares: Vec<i64> = if weight_sum == 0 {
        vec![total / count; hints.len()]
    } else {
        weights.iter().map(|weight| total * weight / weight_sum).collect()
    };
    let assigned: i64 = shares.iter().sum();
    if let Some(last) = shares.last_mut() {
        *last += total - assigned;
    }
    shares
        .into_iter()
        .map(|share| share.min(i32::MAX as i64) as i32)
        .collect()
}

fn align(alignment: Alignment, free: i32) -> i32 {
    if free <= 0 {
        return 0;
    }
    match alignment {
        Alignment::Start => 0,
        Alignment::Center => free / 2,
        Alignment::End => free,
    }
}

/// Lays out its subviews in a row or a column.
///
/// Along the main axis, lengths come from [`distribute`] with `space` between subviews. Across
/// it, expanding subviews fill the available extent and the others get their preferred extent,
/// placed according to the alignment.
#[derive(Debug, Clone)]
pub struct LinearLayout {
    orientation: Orientation,
    alignment: Alignment,
    margin: Margin,
    space: i32,
}

impl LinearLayout {
    pub fn new(orientation: Orientation) -> LinearLayout {
        LinearLayout {
            orientation,
            alignment: Alignment::Center,
            margin: Margin::default(),
            space: 0,
        }
    }

    pub fn horizontal() -> LinearLayout {
        LinearLayout::new(Orientation::Horizontal)
    }

    pub fn vertical() -> LinearLayout {
        LinearLayout::new(Orientation::Vertical)
    }

    pub fn with_alignment(mut self, alignment: Alignment) -> LinearLayout {
        self.alignment = alignment;
        self
    }

    pub fn with_margin(mut self, margin: Margin) -> LinearLayout {
        self.margin = margin;
        self
    }

    /// Sets the space between adjacent subviews. Negative values are treated as zero.
    pub fn with_space(mut self, space: i32) -> LinearLayout {
        self.space = space.max(0);
        self
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn alignment(&self) -> Alignment {
        self.alignment
    }

    pub fn margin(&self) -> Margin {
        self.margin
    }

    pub fn space(&self) -> i32 {
        self.space
    }

    fn main(&self, v: Size) -> i32 {
        match self.orientation {
            Orientation::Horizontal => v.x,
            Orientation::Vertical => v.y,
        }
    }

    fn cross(&self, v: Size) -> i32 {
        match self.orientation {
            Orientation::Horizontal => v.y,
            Orientation::Vertical => v.x,
        }
    }

    fn compose(&self, main: i32, cross: i32) -> Size {
        match self.orientation {
            Orientation::Horizontal => Vector2::new(main, cross),
            Orientation::Vertical => Vector2::new(cross, main),
        }
    }

    fn expands_main(&self, cx: &QueryCtx, child: ViewId) -> bool {
        match self.orientation {
            Orientation::Horizontal => cx.tree().expand_x(child),
            Orientation::Vertical => cx.tree().expand_y(child),
        }
    }

    fn expands_cross(&self, cx: &QueryCtx, child: ViewId) -> bool {
        match self.orientation {
            Orientation::Horizontal => cx.tree().expand_y(child),
            Orientation::Vertical => cx.tree().expand_x(child),
        }
    }

    fn main_hint(&self, cx: &QueryCtx, child: ViewId) -> Hint {
        let tree = cx.tree();
        Hint {
            minimum: self.main(tree.minimum_size(child)),
            preferred: self.main(tree.preferred_size(child)),
            maximum: self.main(tree.maximum_size(child)),
            expand: self.expands_main(cx, child),
        }
    }

    /// Returns the cross-axis length and offset of a subview.
    fn cross_placement(&self, cx: &QueryCtx, child: ViewId, available: i32) -> (i32, i32) {
        let tree = cx.tree();
        let minimum = self.cross(tree.minimum_size(child));
        let maximum = self.cross(tree.maximum_size(child));
        let length = if self.expands_cross(cx, child) {
            clamp(available, minimum, maximum)
        } else {
            let preferred = self.cross(tree.preferred_size(child));
            clamp(preferred.min(available), minimum, maximum)
        };
        (length, align(self.alignment, available - length))
    }

    fn layout(&self, cx: &mut UpdateCtx) {
        let children = cx.children();
        if children.is_empty() {
            return;
        }

        let area = Rect::new(Point::origin(), cx.size()).inset(self.margin);
        let spacing = self.space.saturating_mul(children.len() as i32 - 1);
        let available = (self.main(area.size) - spacing).max(0);
        let cross_available = self.cross(area.size);

        let (hints, cross): (Vec<_>, Vec<_>) = {
            let query = cx.query();
            children
                .iter()
                .map(|&child| {
                    (
                        self.main_hint(&query, child),
                        self.cross_placement(&query, child, cross_available),
                    )
                })
                .unzip()
        };
        let lengths = distribute(available, &hints);

        let used = lengths.iter().sum::<i32>() + spacing;
        let mut offset = self.main(area.origin.to_vec())
            + align(self.alignment, self.main(area.size) - used);
        let cross_origin = self.cross(area.origin.to_vec());

        for ((&child, &length), &(cross_length, cross_offset)) in
            children.iter().zip(&lengths).zip(&cross)
        {
            cx.resize_child(child, self.compose(length, cross_length));
            cx.move_child(
                child,
                Point::from_vec(self.compose(offset, cross_origin + cross_offset)),
            );
            offset += length + self.space;
        }
    }

    fn is_own_descendant(&self, cx: &UpdateCtx, id: ViewId) -> bool {
        cx.tree().is_ancestor(cx.id(), id)
    }

    fn content_size(&self, cx: &QueryCtx, size_of: impl Fn(ViewId) -> Size) -> Size {
        let mut main = 0;
        let mut cross = 0;
        let mut count = 0;
        for child in cx.children() {
            let size = size_of(child);
            main += self.main(size);
            cross = cross.max(self.cross(size));
            count += 1;
        }
        if count > 1 {
            main += self.space * (count - 1);
        }
        self.compose(main, cross) + Vector2::new(self.margin.horizontal(), self.margin.vertical())
    }
}

impl View for LinearLayout {
    crate::impl_any!();

    fn kind(&self) -> ViewKind {
        ViewKind::Container
    }

    fn perform_size_update(&mut self, request: &UpdateRequest<Size>, cx: &mut UpdateCtx) {
        cx.set_size(*request.value());
        self.layout(cx);
        if request.is_local() {
            cx.report(request);
        }
    }

    fn report_size_update(&mut self, request: &UpdateRequest<Size>, cx: &mut UpdateCtx) {
        if self.is_own_descendant(cx, request.target()) {
            self.layout(cx);
        }
        cx.report(request);
    }

    fn report_position_update(&mut self, request: &UpdateRequest<Point>, cx: &mut UpdateCtx) {
        if self.is_own_descendant(cx, request.target()) {
            self.layout(cx);
        }
        cx.report(request);
    }

    fn child_added(&mut self, _child: ViewId, cx: &mut UpdateCtx) {
        self.layout(cx);
    }

    fn child_removed(&mut self, _child: ViewId, cx: &mut UpdateCtx) {
        self.layout(cx);
    }

    fn preferred_size(&self, cx: &QueryCtx) -> Size {
        let tree = cx.tree();
        self.content_size(cx, |child| tree.preferred_size(child))
    }

    fn minimum_size(&self, cx: &QueryCtx) -> Size {
        let tree = cx.tree();
        self.content_size(cx, |child| tree.minimum_size(child))
    }

    fn expand_x(&self, cx: &QueryCtx) -> bool {
        cx.children().any(|child| cx.tree().expand_x(child))
    }

    fn expand_y(&self, cx: &QueryCtx) -> bool {
        cx.children().any(|child| cx.tree().expand_y(child))
    }
}
