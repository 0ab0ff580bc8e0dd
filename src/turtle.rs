//! Turtle state and operations for 2D path interpretation.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::sink::{Segment, SegmentSink};

/// Heading a fresh turtle starts with, in degrees: facing up the image.
pub const DEFAULT_HEADING: f32 = 90.0;

/// The drawable state of the turtle.
///
/// This is a plain value: the interpreter copies it onto the branch stack on
/// `[` and copies it back on `]`, so sibling branches never observe each
/// other's movement.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TurtleState {
    /// Current pen position in image space (y grows downward).
    pub position: Vec2,

    /// Heading in degrees. 0° faces +X and 90° faces up the image (-Y).
    /// Never normalized; the trigonometry handles any magnitude.
    pub heading: f32,
}

impl Default for TurtleState {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            heading: DEFAULT_HEADING,
        }
    }
}

impl TurtleState {
    /// Unit vector the turtle is facing, in image space.
    pub fn direction(&self) -> Vec2 {
        let (sin, cos) = self.heading.to_radians().sin_cos();
        Vec2::new(cos, -sin)
    }

    /// Position reached by moving `distance` along the current heading.
    pub fn advanced(&self, distance: f32) -> Vec2 {
        self.position + self.direction() * distance
    }
}

/// A turtle bound to the sink that receives its strokes.
///
/// The turtle borrows its sink for its whole lifetime but never owns it, so the
/// caller can read the sink back (bounds, pixels, recorded segments) once the
/// turtle is dropped.
pub struct Turtle<'s, S: SegmentSink + ?Sized> {
    pub state: TurtleState,
    sink: &'s mut S,
}

impl<'s, S: SegmentSink + ?Sized> Turtle<'s, S> {
    pub fn new(sink: &'s mut S) -> Self {
        Self::with_state(sink, TurtleState::default())
    }

    pub fn with_state(sink: &'s mut S, state: TurtleState) -> Self {
        Self { state, sink }
    }

    /// Moves `distance` along the heading and reports the traversed segment.
    pub fn forward(&mut self, distance: f32) {
        let start = self.state.position;
        let end = self.state.advanced(distance);
        self.sink.line(Segment::new(start, end));
        self.state.position = end;
    }

    /// Moves `distance` along the heading without drawing.
    pub fn jump(&mut self, distance: f32) {
        self.state.position = self.state.advanced(distance);
    }

    /// Adds `angle` degrees to the heading.
    pub fn right(&mut self, angle: f32) {
        self.state.heading += angle;
    }

    /// Subtracts `angle` degrees from the heading.
    pub fn left(&mut self, angle: f32) {
        self.state.heading -= angle;
    }

    pub fn turn_around(&mut self) {
        self.state.heading += 180.0;
    }
}

/// Operations a symbol can be bound to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurtleOp {
    /// Draw forward by the step length (`F`).
    Forward,
    /// Move forward by the step length without drawing.
    Move,
    /// Add the turn angle to the heading (`+`).
    TurnRight,
    /// Subtract the turn angle from the heading (`-`).
    TurnLeft,
    /// Turn 180 degrees.
    TurnAround,
    /// Save the turtle state onto the stack (`[`).
    Push,
    /// Restore the most recently pushed turtle state (`]`).
    Pop,
    /// No-op: symbol only matters to the grammar.
    Ignore,
}
