//! Command-line front end: flags → [`RenderConfig`] → image file.

use std::path::PathBuf;

use clap::Parser;

use crate::error::Result;
use crate::export::ImageFile;
use crate::grammar::RuleSet;
use crate::interpreter::StackPolicy;
use crate::output::{Printer, display_path, plural};
use crate::raster::Rgb;
use crate::render::{RenderConfig, render_symbols};

/// Render an L-System turtle drawing to an image
#[derive(Parser, Debug)]
#[command(name = "lsys-raster")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// JSON file with render settings; the flags below override it
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Initial symbol string
    #[arg(long)]
    pub axiom: Option<String>,

    /// Rewrite rules merged into the configured ones, e.g. "F=FF,X=F-[[X]+X]+F[+FX]-X"
    #[arg(long)]
    pub rules: Option<RuleSet>,

    /// Use only the rules given with --rules
    #[arg(long, requires = "rules")]
    pub replace_rules: bool,

    /// Number of rewrite generations
    #[arg(long, short = 'n', visible_alias = "generations")]
    pub iterations: Option<u32>,

    /// Turn angle in degrees
    #[arg(long, allow_negative_numbers = true)]
    pub angle: Option<f32>,

    /// Forward step length
    #[arg(long, allow_negative_numbers = true)]
    pub length: Option<f32>,

    /// Stroke colour (#RGB or #RRGGBB)
    #[arg(long)]
    pub color: Option<Rgb>,

    /// Mirror the drawing horizontally
    #[arg(long)]
    pub flip: bool,

    /// Fail on unbalanced brackets instead of ignoring them
    #[arg(long)]
    pub strict: bool,

    /// Abort once the expanded string grows past this many symbols
    #[arg(long)]
    pub max_symbols: Option<usize>,

    /// Print the expanded symbol string to stdout
    #[arg(long)]
    pub print_symbols: bool,

    /// Output image path (format from extension)
    #[arg(long, short, default_value = "result.png")]
    pub output: PathBuf,
}

impl Cli {
    /// Layer the flags over the config file, or over the defaults.
    pub fn resolve_config(&self) -> Result<RenderConfig> {
        let mut config = match &self.config {
            Some(path) => RenderConfig::load(path)?,
            None => RenderConfig::default(),
        };

        if let Some(axiom) = &self.axiom {
            config.axiom = axiom.clone();
        }
        if let Some(rules) = &self.rules {
            if self.replace_rules {
                config.rules = rules.clone();
            } else {
                config.rules.extend(rules.clone());
            }
        }
        if let Some(iterations) = self.iterations {
            config.generations = iterations;
        }
        if let Some(angle) = self.angle {
            config.turn_angle = angle;
        }
        if let Some(length) = self.length {
            config.step_length = length;
        }
        if let Some(color) = self.color {
            config.stroke = color;
        }
        if self.flip {
            config.flip = true;
        }
        if self.strict {
            config.stack_policy = StackPolicy::Strict;
        }
        if let Some(max_symbols) = self.max_symbols {
            config.max_symbols = max_symbols;
        }

        Ok(config)
    }
}

pub fn run(cli: Cli) -> Result<()> {
    let printer = Printer::new();
    let config = cli.resolve_config()?;

    printer.info("Rules", &config.rules.to_string());

    let symbols = config
        .lsystem()
        .expand_bounded(config.generations, config.max_symbols)?;
    printer.status(
        "Expanded",
        &format!(
            "{} in {} ({})",
            config.axiom,
            plural(config.generations as usize, "generation", "generations"),
            plural(symbols.chars().count(), "symbol", "symbols")
        ),
    );
    if cli.print_symbols {
        println!("{symbols}");
    }

    let buffer = render_symbols(&symbols, &config.interpreter(), config.stroke, config.flip)?;
    printer.status(
        "Rendered",
        &format!("{}x{} canvas", buffer.width(), buffer.height()),
    );

    buffer.write_to(&mut ImageFile::new(&cli.output))?;
    printer.status("Finished", &format!("wrote {}", display_path(&cli.output)));

    Ok(())
}
