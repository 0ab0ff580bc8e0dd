//! Image file output for rendered pixel buffers.
//!
//! Rendering stops at a [`PixelBuffer`]; persisting it is the job of an
//! [`ImageSink`], which only ever sees dimensions, channel count and raw bytes.

use std::path::{Path, PathBuf};

use image::ExtendedColorType;

use crate::error::{LsysError, Result};
use crate::raster::{CHANNELS, PixelBuffer};

/// Accepts finished 8-bit raster data.
pub trait ImageSink {
    /// `pixels` is row-major, `width * height * channels` bytes long.
    fn encode(&mut self, width: u32, height: u32, channels: usize, pixels: &[u8]) -> Result<()>;
}

/// Writes an image file, format chosen from the path's extension.
#[derive(Clone, Debug)]
pub struct ImageFile {
    path: PathBuf,
}

impl ImageFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ImageSink for ImageFile {
    fn encode(&mut self, width: u32, height: u32, channels: usize, pixels: &[u8]) -> Result<()> {
        if channels != CHANNELS {
            return Err(LsysError::Io {
                path: self.path.clone(),
                message: format!("Expected {CHANNELS} channels, got {channels}"),
            });
        }

        image::save_buffer(&self.path, pixels, width, height, ExtendedColorType::Rgb8).map_err(
            |e| LsysError::Io {
                path: self.path.clone(),
                message: format!("Failed to write image: {}", e),
            },
        )
    }
}

impl PixelBuffer {
    /// Hand the buffer to an encoder.
    pub fn write_to<S: ImageSink + ?Sized>(&self, sink: &mut S) -> Result<()> {
        sink.encode(self.width(), self.height(), self.channels(), self.as_bytes())
    }
}
