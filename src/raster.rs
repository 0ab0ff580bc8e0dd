//! RGB pixel buffer and the segment sink that draws into it.

use std::fmt;
use std::str::FromStr;

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

use crate::error::{LsysError, Result};
use crate::sink::{Segment, SegmentSink};

/// Bytes per pixel in a [`PixelBuffer`].
pub const CHANNELS: usize = 3;

/// An 8-bit RGB colour.
///
/// Serializes as a `#RRGGBB` hex string.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const BLACK: Self = Self::new(0, 0, 0);

    pub const WHITE: Self = Self::new(255, 255, 255);

    /// Parse a hex colour string: `#RGB` or `#RRGGBB`, `#` optional.
    pub fn from_hex(s: &str) -> Result<Self> {
        let s = s.trim();
        let hex = s.strip_prefix('#').unwrap_or(s);
        let invalid = || LsysError::Config {
            message: format!("Invalid hex colour: {}", s),
            help: Some("Use #RGB or #RRGGBB format".to_string()),
        };

        if !hex.is_ascii() {
            return Err(invalid());
        }
        let byte = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|_| invalid())
        };

        match hex.len() {
            3 => {
                let r = byte(0..1)?;
                let g = byte(1..2)?;
                let b = byte(2..3)?;
                Ok(Self::new(r << 4 | r, g << 4 | g, b << 4 | b))
            }
            6 => Ok(Self::new(byte(0..2)?, byte(2..4)?, byte(4..6)?)),
            _ => Err(invalid()),
        }
    }

    pub fn to_array(self) -> [u8; CHANNELS] {
        [self.r, self.g, self.b]
    }
}

impl FromStr for Rgb {
    type Err = LsysError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

impl TryFrom<String> for Rgb {
    type Error = LsysError;

    fn try_from(s: String) -> Result<Self> {
        Self::from_hex(&s)
    }
}

impl From<Rgb> for String {
    fn from(colour: Rgb) -> Self {
        colour.to_string()
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// A zero-initialized RGB image, row-major with the origin at the top left.
///
/// Reads and writes outside the image are ignored rather than reported: the
/// rasterizer relies on this when rounding puts an endpoint one pixel past the
/// canvas edge.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl PixelBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        let len = width as usize * height as usize * CHANNELS;
        Self {
            width,
            height,
            pixels: vec![0; len],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> usize {
        CHANNELS
    }

    /// Raw row-major bytes, `width * height * 3` long.
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.pixels
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        let (x, y) = (u32::try_from(x).ok()?, u32::try_from(y).ok()?);
        if x >= self.width || y >= self.height {
            return None;
        }
        Some((y as usize * self.width as usize + x as usize) * CHANNELS)
    }

    pub fn get(&self, x: i32, y: i32) -> Option<Rgb> {
        let i = self.index(x, y)?;
        Some(Rgb::new(self.pixels[i], self.pixels[i + 1], self.pixels[i + 2]))
    }

    /// Writes one pixel; out-of-range coordinates are a no-op.
    pub fn set(&mut self, x: i32, y: i32, colour: Rgb) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i..i + CHANNELS].copy_from_slice(&colour.to_array());
        }
    }

    /// Number of pixels currently holding `colour`.
    pub fn count(&self, colour: Rgb) -> usize {
        let target = colour.to_array();
        self.pixels
            .chunks_exact(CHANNELS)
            .filter(|px| *px == target)
            .count()
    }

    /// Draws a line between two pixels, both endpoints included.
    ///
    /// Bresenham's algorithm: integer error accumulation only, stepping x
    /// and/or y each iteration until the current point equals `to`.
    pub fn line(&mut self, from: IVec2, to: IVec2, colour: Rgb) {
        let (mut x, mut y) = (i64::from(from.x), i64::from(from.y));
        let (x2, y2) = (i64::from(to.x), i64::from(to.y));

        let dx = (x2 - x).abs();
        let dy = (y2 - y).abs();
        let sx = if x < x2 { 1 } else { -1 };
        let sy = if y < y2 { 1 } else { -1 };
        let mut err = dx - dy;

        loop {
            // x and y stay between the two i32 endpoints.
            self.set(x as i32, y as i32, colour);

            if x == x2 && y == y2 {
                break;
            }

            let e2 = 2 * err;
            if e2 > -dy {
                err -= dy;
                x += sx;
            }
            if e2 < dx {
                err += dx;
                y += sy;
            }
        }
    }
}

/// Segment sink that strokes every segment into a [`PixelBuffer`].
pub struct Rasterizer<'b> {
    buffer: &'b mut PixelBuffer,
    colour: Rgb,
    offset: Vec2,
    flip: bool,
}

impl<'b> Rasterizer<'b> {
    pub fn new(buffer: &'b mut PixelBuffer, colour: Rgb, offset: Vec2) -> Self {
        Self {
            buffer,
            colour,
            offset,
            flip: false,
        }
    }

    /// Mirror x about the buffer width (`x' = width - x`).
    pub fn with_flip(mut self, flip: bool) -> Self {
        self.flip = flip;
        self
    }

    /// Maps a path point to a pixel: translate, optionally mirror, then
    /// truncate toward zero.
    pub fn project(&self, point: Vec2) -> IVec2 {
        let mut p = point + self.offset;
        if self.flip {
            p.x = self.buffer.width() as f32 - p.x;
        }
        p.as_ivec2()
    }
}

impl SegmentSink for Rasterizer<'_> {
    fn line(&mut self, segment: Segment) {
        let from = self.project(segment.start);
        let to = self.project(segment.end);
        self.buffer.line(from, to, self.colour);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(buffer: &PixelBuffer) -> Vec<(i32, i32)> {
        let mut points = Vec::new();
        for y in 0..buffer.height() as i32 {
            for x in 0..buffer.width() as i32 {
                if buffer.get(x, y) != Some(Rgb::BLACK) {
                    points.push((x, y));
                }
            }
        }
        points
    }

    #[test]
    fn test_new_buffer_is_black() {
        let buffer = PixelBuffer::new(4, 3);
        assert_eq!(buffer.as_bytes().len(), 4 * 3 * 3);
        assert_eq!(buffer.count(Rgb::BLACK), 12);
        assert_eq!(buffer.channels(), 3);
    }

    #[test]
    fn test_set_and_get() {
        let mut buffer = PixelBuffer::new(4, 3);
        let red = Rgb::new(255, 0, 0);
        buffer.set(3, 2, red);
        assert_eq!(buffer.get(3, 2), Some(red));
        // Row-major: last pixel of the last row.
        assert_eq!(&buffer.as_bytes()[33..36], &[255, 0, 0]);
    }

    #[test]
    fn test_out_of_range_is_noop() {
        let mut buffer = PixelBuffer::new(4, 3);
        buffer.set(4, 0, Rgb::WHITE);
        buffer.set(-1, 1, Rgb::WHITE);
        buffer.set(0, 3, Rgb::WHITE);
        buffer.set(i32::MAX, i32::MIN, Rgb::WHITE);

        assert_eq!(buffer.count(Rgb::WHITE), 0);
        assert_eq!(buffer.get(4, 0), None);
        assert_eq!(buffer.get(0, -1), None);
    }

    #[test]
    fn test_horizontal_segment_plots_eleven_pixels() {
        let mut buffer = PixelBuffer::new(12, 3);
        let mut rasterizer = Rasterizer::new(&mut buffer, Rgb::WHITE, Vec2::ZERO);
        rasterizer.line(Segment::new(Vec2::ZERO, Vec2::new(10.0, 0.0)));

        let expected: Vec<(i32, i32)> = (0..=10).map(|x| (x, 0)).collect();
        assert_eq!(lit(&buffer), expected);
        assert_eq!(buffer.count(Rgb::WHITE), 11);
    }

    #[test]
    fn test_diagonal_line() {
        let mut buffer = PixelBuffer::new(4, 4);
        buffer.line(IVec2::new(3, 3), IVec2::new(0, 0), Rgb::WHITE);
        assert_eq!(lit(&buffer), vec![(0, 0), (1, 1), (2, 2), (3, 3)]);
    }

    #[test]
    fn test_steep_line_includes_endpoints() {
        let mut buffer = PixelBuffer::new(2, 4);
        buffer.line(IVec2::new(0, 0), IVec2::new(1, 3), Rgb::WHITE);
        assert_eq!(lit(&buffer), vec![(0, 0), (0, 1), (1, 2), (1, 3)]);
    }

    #[test]
    fn test_single_point_line() {
        let mut buffer = PixelBuffer::new(2, 2);
        buffer.line(IVec2::ONE, IVec2::ONE, Rgb::WHITE);
        assert_eq!(lit(&buffer), vec![(1, 1)]);
    }

    #[test]
    fn test_line_partly_outside_is_clipped() {
        let mut buffer = PixelBuffer::new(3, 1);
        buffer.line(IVec2::new(-2, 0), IVec2::new(5, 0), Rgb::WHITE);
        assert_eq!(lit(&buffer), vec![(0, 0), (1, 0), (2, 0)]);
    }

    #[test]
    fn test_project_translates_and_truncates() {
        let mut buffer = PixelBuffer::new(10, 10);
        let rasterizer = Rasterizer::new(&mut buffer, Rgb::WHITE, Vec2::new(1.0, 2.0));
        assert_eq!(rasterizer.project(Vec2::new(-1.5, 0.9)), IVec2::new(0, 2));
        assert_eq!(rasterizer.project(Vec2::new(2.99, -1.2)), IVec2::new(3, 0));
    }

    #[test]
    fn test_project_flips_about_width() {
        let mut buffer = PixelBuffer::new(10, 10);
        let rasterizer = Rasterizer::new(&mut buffer, Rgb::WHITE, Vec2::ZERO).with_flip(true);
        assert_eq!(rasterizer.project(Vec2::new(3.0, 4.0)), IVec2::new(7, 4));
    }

    #[test]
    fn test_hex_colours() {
        assert_eq!(Rgb::from_hex("#ff8000").unwrap(), Rgb::new(255, 128, 0));
        assert_eq!(Rgb::from_hex("0F0").unwrap(), Rgb::new(0, 255, 0));
        assert_eq!(Rgb::new(1, 2, 255).to_string(), "#0102FF");
        assert!(Rgb::from_hex("#12345").is_err());
        assert!(Rgb::from_hex("#gg0000").is_err());
        assert!(Rgb::from_hex("#é0000").is_err());
    }

    #[test]
    fn test_colour_serializes_as_hex() {
        let json = serde_json::to_string(&Rgb::new(255, 0, 16)).unwrap();
        assert_eq!(json, r##""#FF0010""##);
        let back: Rgb = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Rgb::new(255, 0, 16));
    }
}
