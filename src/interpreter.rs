//! Interpreter that walks an expanded symbol string with a [`Turtle`].
//!
//! The entry point is [`Interpreter`]. Configure it with a [`TurtleConfig`],
//! register symbol-to-operation mappings via [`Interpreter::set_op`] or
//! [`Interpreter::populate_standard_symbols`], then call
//! [`Interpreter::interpret`] with any [`SegmentSink`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{LsysError, Result};
use crate::sink::SegmentSink;
use crate::turtle::{DEFAULT_HEADING, Turtle, TurtleOp, TurtleState};

/// What to do when brackets do not balance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StackPolicy {
    /// A `]` with nothing to restore is ignored, and pushes beyond the depth
    /// limit are dropped together with their matching pops.
    #[default]
    Lenient,
    /// Any unbalanced bracket, or a push beyond the depth limit, is an error.
    Strict,
}

/// Configuration for turtle interpretation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TurtleConfig {
    /// Distance covered by each forward symbol.
    pub step_length: f32,
    /// Angle (degrees) applied by each turn symbol.
    pub turn_angle: f32,
    /// Heading (degrees) of the fresh turtle.
    pub initial_heading: f32,
    /// Maximum branch stack depth.
    pub max_stack_depth: usize,
    pub stack_policy: StackPolicy,
}

impl Default for TurtleConfig {
    fn default() -> Self {
        Self {
            step_length: 5.0,
            turn_angle: 22.5,
            initial_heading: DEFAULT_HEADING,
            max_stack_depth: 1024,
            stack_policy: StackPolicy::Lenient,
        }
    }
}

/// Interprets L-System symbols as turtle movements.
pub struct Interpreter {
    op_map: HashMap<char, TurtleOp>,
    config: TurtleConfig,
}

impl Interpreter {
    /// Creates a new interpreter with the given configuration and an empty symbol map.
    ///
    /// Register operations with [`set_op`](Self::set_op) or
    /// [`populate_standard_symbols`](Self::populate_standard_symbols) before
    /// interpreting anything; unmapped symbols are ignored.
    pub fn new(config: TurtleConfig) -> Self {
        Self {
            op_map: HashMap::new(),
            config,
        }
    }

    /// Creates an interpreter with the standard symbols already registered.
    pub fn standard(config: TurtleConfig) -> Self {
        let mut interpreter = Self::new(config);
        interpreter.populate_standard_symbols();
        interpreter
    }

    /// Replaces the entire symbol-to-operation map in one step (builder pattern).
    pub fn with_map(mut self, map: HashMap<char, TurtleOp>) -> Self {
        self.op_map = map;
        self
    }

    /// Assigns a single [`TurtleOp`] to a symbol.
    pub fn set_op(&mut self, symbol: char, op: TurtleOp) {
        self.op_map.insert(symbol, op);
    }

    /// The operation bound to `symbol`, [`TurtleOp::Ignore`] when unbound.
    pub fn op(&self, symbol: char) -> TurtleOp {
        self.op_map.get(&symbol).copied().unwrap_or(TurtleOp::Ignore)
    }

    /// Registers the conventional mappings: `F` forward, `+` right, `-` left,
    /// `[` push and `]` pop. Every other symbol stays inert.
    pub fn populate_standard_symbols(&mut self) {
        let mappings = [
            ('F', TurtleOp::Forward),
            ('+', TurtleOp::TurnRight),
            ('-', TurtleOp::TurnLeft),
            ('[', TurtleOp::Push),
            (']', TurtleOp::Pop),
        ];

        for (symbol, op) in mappings {
            self.set_op(symbol, op);
        }
    }

    pub fn config(&self) -> &TurtleConfig {
        &self.config
    }

    /// Interprets `symbols` with a fresh turtle at the origin, sending every
    /// drawn segment to `sink`.
    pub fn interpret<S: SegmentSink + ?Sized>(&self, symbols: &str, sink: &mut S) -> Result<()> {
        let state = TurtleState {
            heading: self.config.initial_heading,
            ..Default::default()
        };
        let mut turtle = Turtle::with_state(sink, state);
        self.run(symbols, &mut turtle)
    }

    /// Drives an existing turtle over `symbols`.
    ///
    /// # Push / Pop
    ///
    /// `[` copies the turtle state onto a stack and `]` copies it back. With
    /// [`StackPolicy::Strict`] a `]` on an empty stack, a `[` left open at the
    /// end, or a push past `max_stack_depth` fails with the index (in symbols)
    /// of the offending bracket. With [`StackPolicy::Lenient`] those are
    /// skipped and logged.
    pub fn run<S: SegmentSink + ?Sized>(&self, symbols: &str, turtle: &mut Turtle<'_, S>) -> Result<()> {
        let strict = self.config.stack_policy == StackPolicy::Strict;
        let max_depth = self.config.max_stack_depth;

        // (index of the '[', saved state)
        let mut stack: Vec<(usize, TurtleState)> = Vec::new();
        let mut dropped_pushes = 0usize;
        let mut ignored_pops = 0usize;

        for (index, symbol) in symbols.chars().enumerate() {
            match self.op(symbol) {
                TurtleOp::Forward => turtle.forward(self.config.step_length),
                TurtleOp::Move => turtle.jump(self.config.step_length),
                TurtleOp::TurnRight => turtle.right(self.config.turn_angle),
                TurtleOp::TurnLeft => turtle.left(self.config.turn_angle),
                TurtleOp::TurnAround => turtle.turn_around(),
                TurtleOp::Push => {
                    if stack.len() < max_depth {
                        stack.push((index, turtle.state));
                    } else if strict {
                        return Err(LsysError::StackOverflow { index, max_depth });
                    } else {
                        dropped_pushes += 1;
                    }
                }
                TurtleOp::Pop => {
                    if dropped_pushes > 0 {
                        // Closes a push that never made it onto the stack.
                        dropped_pushes -= 1;
                    } else if let Some((_, state)) = stack.pop() {
                        turtle.state = state;
                    } else if strict {
                        return Err(LsysError::UnbalancedBranchStack {
                            index,
                            reason: "']' with no saved state to restore".to_string(),
                        });
                    } else {
                        ignored_pops += 1;
                    }
                }
                TurtleOp::Ignore => {}
            }
        }

        if let Some(&(index, _)) = stack.last() {
            if strict {
                return Err(LsysError::UnbalancedBranchStack {
                    index,
                    reason: format!("{} '[' never closed", stack.len()),
                });
            }
            log::warn!("{} branch(es) left open at end of input", stack.len());
        }
        if ignored_pops > 0 {
            log::warn!("ignored {ignored_pops} ']' with an empty branch stack");
        }
        if dropped_pushes > 0 {
            log::warn!("dropped {dropped_pushes} '[' beyond max stack depth {max_depth}");
        }

        Ok(())
    }
}
