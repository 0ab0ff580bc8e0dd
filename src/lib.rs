//! # lsys-raster
//!
//! Expands bracketed L-System grammars, walks the result with a 2D turtle and
//! rasterizes the traced path into an RGB pixel buffer.
//!
//! The modules follow the data flow: [`grammar`] rewrites the axiom,
//! [`interpreter`] drives a [`Turtle`] over the expanded symbols, and every drawn
//! stroke lands in a [`SegmentSink`]. The [`render`](mod@render) module wires two passes together: a
//! [`BoundingBox`] pass sizes the canvas, then a [`Rasterizer`] pass draws into a
//! [`PixelBuffer`], which is finally handed to an [`ImageSink`].

pub mod cli;
pub mod error;
pub mod export;
pub mod grammar;
pub mod interpreter;
pub mod output;
pub mod raster;
pub mod render;
pub mod sink;
pub mod turtle;

pub use error::{LsysError, Result};
pub use export::*;
pub use grammar::*;
pub use interpreter::*;
pub use raster::*;
pub use render::*;
pub use sink::*;
pub use turtle::*;
