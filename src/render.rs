//! Two-pass rendering: measure the path, then draw it.
//!
//! The expanded string is interpreted twice. The first pass feeds a
//! [`BoundingBox`] to find how large the canvas must be and where the path's
//! top-left corner sits; the second pass feeds a [`Rasterizer`] that draws into
//! a buffer of exactly that size, shifted so the corner lands on pixel (0, 0).

use std::fs;
use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::{LsysError, Result};
use crate::grammar::{LSystem, RuleSet};
use crate::interpreter::{Interpreter, StackPolicy, TurtleConfig};
use crate::raster::{PixelBuffer, Rasterizer, Rgb};
use crate::sink::BoundingBox;

/// Largest canvas (in pixels) a render will allocate.
pub const MAX_CANVAS_PIXELS: u64 = 1 << 28;

/// Every parameter of a render, with the classic fractal plant as default.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Initial symbol string. Default: `X`.
    pub axiom: String,
    /// Rewrite rules. Default: `F=FF`, `X=F-[[X]+X]+F[+FX]-X`.
    pub rules: RuleSet,
    /// Number of rewrite generations. Default: 6.
    pub generations: u32,
    /// Degrees turned by `+` and `-`. Default: 22.5.
    pub turn_angle: f32,
    /// Distance covered by `F`. Default: 5.0.
    pub step_length: f32,
    /// Stroke colour. Default: white on the black canvas.
    pub stroke: Rgb,
    /// Mirror the drawing horizontally.
    pub flip: bool,
    pub stack_policy: StackPolicy,
    /// Expansion stops with an error past this many symbols.
    pub max_symbols: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            axiom: "X".to_string(),
            rules: Self::default_rules(),
            generations: 6,
            turn_angle: 22.5,
            step_length: 5.0,
            stroke: Rgb::WHITE,
            flip: false,
            stack_policy: StackPolicy::Lenient,
            max_symbols: 50_000_000,
        }
    }
}

impl RenderConfig {
    pub fn default_rules() -> RuleSet {
        RuleSet::new()
            .with_rule('F', "FF")
            .with_rule('X', "F-[[X]+X]+F[+FX]-X")
    }

    /// Parse a JSON config. Missing fields keep their defaults.
    pub fn from_json(source: &str) -> Result<Self> {
        serde_json::from_str(source).map_err(|e| LsysError::Config {
            message: format!("Invalid config: {}", e),
            help: Some("Expected a JSON object such as {\"axiom\": \"F\", \"rules\": {\"F\": \"F+F-F\"}}".to_string()),
        })
    }

    /// Load a JSON config file.
    pub fn load(path: &Path) -> Result<Self> {
        let source = fs::read_to_string(path).map_err(|e| LsysError::Io {
            path: path.to_path_buf(),
            message: format!("Failed to read config: {}", e),
        })?;
        Self::from_json(&source)
    }

    pub fn lsystem(&self) -> LSystem {
        LSystem::new(self.axiom.clone(), self.rules.clone())
    }

    pub fn turtle_config(&self) -> TurtleConfig {
        TurtleConfig {
            step_length: self.step_length,
            turn_angle: self.turn_angle,
            stack_policy: self.stack_policy,
            ..Default::default()
        }
    }

    pub fn interpreter(&self) -> Interpreter {
        Interpreter::standard(self.turtle_config())
    }
}

/// Size of the image and the translation that maps the path onto it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
    /// Added to every path point so the path's minimum corner lands on (0, 0).
    pub offset: Vec2,
}

impl Canvas {
    /// Derive the canvas from a completed measuring pass.
    ///
    /// Each dimension is the ceiling of the path's extent, at least one pixel.
    pub fn from_bounds(bounds: &BoundingBox) -> Result<Self> {
        if bounds.is_empty() {
            return Err(LsysError::DegenerateEmptyPath);
        }

        let size = bounds.size();
        if !size.is_finite() {
            return Err(LsysError::InvalidCanvas {
                message: format!("path extent {} x {} is not finite", size.x, size.y),
            });
        }

        let width = (size.x.ceil() as u64).max(1);
        let height = (size.y.ceil() as u64).max(1);
        if width.saturating_mul(height) > MAX_CANVAS_PIXELS {
            return Err(LsysError::InvalidCanvas {
                message: format!(
                    "{width}x{height} exceeds the limit of {MAX_CANVAS_PIXELS} pixels"
                ),
            });
        }

        Ok(Self {
            width: width as u32,
            height: height as u32,
            offset: -bounds.min,
        })
    }
}

/// Expand and render `config` into a fresh pixel buffer.
pub fn render(config: &RenderConfig) -> Result<PixelBuffer> {
    let symbols = config
        .lsystem()
        .expand_bounded(config.generations, config.max_symbols)?;
    render_symbols(&symbols, &config.interpreter(), config.stroke, config.flip)
}

/// Render an already expanded symbol string.
pub fn render_symbols(
    symbols: &str,
    interpreter: &Interpreter,
    stroke: Rgb,
    flip: bool,
) -> Result<PixelBuffer> {
    let mut bounds = BoundingBox::new();
    interpreter.interpret(symbols, &mut bounds)?;
    log::debug!(
        "{} segments, min = {}, max = {}",
        bounds.segment_count(),
        bounds.min,
        bounds.max
    );

    let canvas = Canvas::from_bounds(&bounds)?;
    log::debug!("canvas {}x{}", canvas.width, canvas.height);

    let mut buffer = PixelBuffer::new(canvas.width, canvas.height);
    let mut rasterizer = Rasterizer::new(&mut buffer, stroke, canvas.offset).with_flip(flip);
    interpreter.interpret(symbols, &mut rasterizer)?;

    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::Segment;
    use crate::SegmentSink;
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;

    fn bounds_of(segments: &[(Vec2, Vec2)]) -> BoundingBox {
        let mut bounds = BoundingBox::new();
        for &(start, end) in segments {
            bounds.line(Segment::new(start, end));
        }
        bounds
    }

    #[test]
    fn test_canvas_rounds_up_and_offsets() {
        let bounds = bounds_of(&[(Vec2::new(-2.5, 1.0), Vec2::new(4.2, -3.0))]);
        let canvas = Canvas::from_bounds(&bounds).unwrap();
        assert_eq!((canvas.width, canvas.height), (7, 4));
        assert_eq!(canvas.offset, Vec2::new(2.5, 3.0));
    }

    #[test]
    fn test_canvas_rejects_empty_path() {
        assert!(matches!(
            Canvas::from_bounds(&BoundingBox::new()),
            Err(LsysError::DegenerateEmptyPath)
        ));
    }

    #[test]
    fn test_canvas_rejects_non_finite() {
        let bounds = bounds_of(&[(Vec2::ZERO, Vec2::new(f32::INFINITY, 1.0))]);
        assert!(matches!(
            Canvas::from_bounds(&bounds),
            Err(LsysError::InvalidCanvas { .. })
        ));
    }

    #[test]
    fn test_canvas_rejects_huge() {
        let bounds = bounds_of(&[(Vec2::ZERO, Vec2::splat(1.0e6))]);
        assert!(matches!(
            Canvas::from_bounds(&bounds),
            Err(LsysError::InvalidCanvas { .. })
        ));
    }

    #[test]
    fn test_straight_path_gets_one_pixel_width() {
        let bounds = bounds_of(&[(Vec2::ZERO, Vec2::new(0.0, -3.0))]);
        let canvas = Canvas::from_bounds(&bounds).unwrap();
        assert_eq!((canvas.width, canvas.height), (1, 3));
    }

    #[test]
    fn test_bounds_scale_with_step_length() {
        let config = RenderConfig {
            generations: 3,
            ..Default::default()
        };
        let symbols = config.lsystem().expand(config.generations);

        let measure = |step_length: f32| {
            let interpreter = RenderConfig {
                step_length,
                ..config.clone()
            }
            .interpreter();
            let mut bounds = BoundingBox::new();
            interpreter.interpret(&symbols, &mut bounds).unwrap();
            bounds.size()
        };

        let base = measure(5.0);
        let scaled = measure(15.0);
        assert_relative_eq!(scaled.x, base.x * 3.0, max_relative = 1e-4);
        assert_relative_eq!(scaled.y, base.y * 3.0, max_relative = 1e-4);
    }

    #[test]
    fn test_fixed_point_grammar_renders_single_pixel() {
        let config = RenderConfig {
            axiom: "F".to_string(),
            rules: RuleSet::new().with_rule('F', "F"),
            generations: 3,
            turn_angle: 90.0,
            step_length: 1.0,
            ..Default::default()
        };
        assert_eq!(config.lsystem().expand(config.generations), "F");

        let buffer = render(&config).unwrap();
        assert_eq!((buffer.width(), buffer.height()), (1, 1));
        assert_eq!(buffer.get(0, 0), Some(Rgb::WHITE));
    }

    #[test]
    fn test_command_free_string_is_degenerate() {
        let config = RenderConfig {
            axiom: "X".to_string(),
            rules: RuleSet::new().with_rule('X', "+X-"),
            generations: 2,
            ..Default::default()
        };
        assert!(matches!(render(&config), Err(LsysError::DegenerateEmptyPath)));
    }

    #[test]
    fn test_default_plant_draws_within_canvas() {
        let config = RenderConfig {
            generations: 3,
            stroke: Rgb::new(0, 200, 0),
            ..Default::default()
        };
        let buffer = render(&config).unwrap();

        let painted = buffer.count(config.stroke);
        assert!(painted > 0);
        assert_eq!(painted + buffer.count(Rgb::BLACK), (buffer.width() * buffer.height()) as usize);
    }

    #[test]
    fn test_flip_mirrors_drawing() {
        let config = RenderConfig {
            axiom: "F+F".to_string(),
            rules: RuleSet::new(),
            generations: 0,
            turn_angle: 90.0,
            step_length: 4.0,
            ..Default::default()
        };
        let plain = render(&config).unwrap();
        let flipped = render(&RenderConfig {
            flip: true,
            ..config.clone()
        })
        .unwrap();

        // Path: up 4 then left 4. The horizontal stroke runs along row 0 and
        // the vertical one hugs the right edge.
        assert_eq!((plain.width(), plain.height()), (4, 4));
        assert_eq!((flipped.width(), flipped.height()), (4, 4));
        assert_eq!(plain.get(0, 0), Some(Rgb::WHITE));
        assert_eq!(plain.get(3, 0), Some(Rgb::WHITE));
        assert_eq!(plain.get(0, 3), Some(Rgb::BLACK));
        // Mirrored, the vertical stroke moves to the left edge.
        assert_eq!(flipped.get(0, 0), Some(Rgb::WHITE));
        assert_eq!(flipped.get(3, 0), Some(Rgb::WHITE));
        assert_eq!(flipped.get(0, 3), Some(Rgb::WHITE));
        assert_eq!(flipped.get(3, 3), Some(Rgb::BLACK));
    }

    #[test]
    fn test_strict_policy_propagates() {
        let config = RenderConfig {
            axiom: "F]".to_string(),
            generations: 0,
            stack_policy: StackPolicy::Strict,
            ..Default::default()
        };
        assert!(matches!(
            render(&config),
            Err(LsysError::UnbalancedBranchStack { index: 1, .. })
        ));
    }

    #[test]
    fn test_config_json_defaults() {
        let config = RenderConfig::from_json(
            r##"{"axiom": "F", "rules": {"F": "F+F"}, "stroke": "#00FF00", "stack_policy": "strict"}"##,
        )
        .unwrap();
        assert_eq!(config.axiom, "F");
        assert_eq!(config.rules, RuleSet::new().with_rule('F', "F+F"));
        assert_eq!(config.stroke, Rgb::new(0, 255, 0));
        assert_eq!(config.stack_policy, StackPolicy::Strict);
        assert_eq!(config.generations, 6);
        assert_eq!(config.step_length, 5.0);
    }

    #[test]
    fn test_config_json_errors() {
        assert!(matches!(
            RenderConfig::from_json(r#"{"generations": "lots"}"#),
            Err(LsysError::Config { .. })
        ));
        assert!(matches!(
            RenderConfig::from_json(r#"{"rules": {"FF": "F"}}"#),
            Err(LsysError::Config { .. })
        ));
    }
}
