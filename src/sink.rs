//! Segment sinks: where the turtle's strokes go.
//!
//! The turtle knows nothing about what happens to a stroke once it is drawn.
//! Anything implementing [`SegmentSink`] can receive them, which is how the same
//! interpretation pass is reused both to measure the path ([`BoundingBox`]) and
//! to draw it ([`crate::Rasterizer`]).

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// One pen stroke from `start` to `end`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: Vec2,
    pub end: Vec2,
}

impl Segment {
    pub fn new(start: Vec2, end: Vec2) -> Self {
        Self { start, end }
    }

    pub fn length(&self) -> f32 {
        self.start.distance(self.end)
    }
}

/// Receives every segment the turtle draws, in drawing order.
pub trait SegmentSink {
    fn line(&mut self, segment: Segment);
}

impl<S: SegmentSink + ?Sized> SegmentSink for &mut S {
    fn line(&mut self, segment: Segment) {
        (**self).line(segment);
    }
}

/// Records the segments verbatim.
impl SegmentSink for Vec<Segment> {
    fn line(&mut self, segment: Segment) {
        self.push(segment);
    }
}

/// Tracks the extent of every endpoint it receives.
///
/// Starts inverted (`min` at +inf, `max` at -inf) so the first endpoint seeds
/// both corners. Check [`is_empty`](Self::is_empty) before using the extent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub min: Vec2,
    pub max: Vec2,
    segments: usize,
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self {
            min: Vec2::splat(f32::INFINITY),
            max: Vec2::splat(f32::NEG_INFINITY),
            segments: 0,
        }
    }
}

impl BoundingBox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Widens the box to contain `point`, independently per axis.
    pub fn include(&mut self, point: Vec2) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    /// True when no segment has been observed yet.
    pub fn is_empty(&self) -> bool {
        self.segments == 0
    }

    pub fn segment_count(&self) -> usize {
        self.segments
    }

    /// Absolute extent along each axis.
    pub fn size(&self) -> Vec2 {
        (self.max - self.min).abs()
    }
}

impl SegmentSink for BoundingBox {
    fn line(&mut self, segment: Segment) {
        self.include(segment.start);
        self.include(segment.end);
        self.segments += 1;
    }
}
