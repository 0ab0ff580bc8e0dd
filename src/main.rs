use clap::Parser;
use lsys_raster::cli::Cli;
use miette::Result;

fn main() -> Result<()> {
    lsys_raster::cli::run(Cli::parse())?;
    Ok(())
}
