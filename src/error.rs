use miette::Diagnostic;
use thiserror::Error;

/// Main error type for expanding, interpreting and rendering L-Systems.
#[derive(Error, Diagnostic, Debug)]
pub enum LsysError {
    #[error("Malformed rule '{rule}': {reason}")]
    #[diagnostic(
        code(lsys::rule),
        help("Write rules as SYMBOL=REPLACEMENT pairs separated by commas, e.g. F=FF,X=F[+X]-X")
    )]
    MalformedRule { rule: String, reason: String },

    #[error("Unbalanced branch stack at symbol {index}: {reason}")]
    #[diagnostic(
        code(lsys::stack),
        help("Every '[' needs a matching ']'; use the lenient stack policy to ignore stray brackets")
    )]
    UnbalancedBranchStack { index: usize, reason: String },

    #[error("Branch stack exceeded the maximum depth of {max_depth} at symbol {index}")]
    #[diagnostic(code(lsys::stack))]
    StackOverflow { index: usize, max_depth: usize },

    #[error("The path is empty: no segments were drawn")]
    #[diagnostic(
        code(lsys::empty_path),
        help("The expanded string needs at least one forward symbol ('F') to produce an image")
    )]
    DegenerateEmptyPath,

    #[error("Invalid canvas: {message}")]
    #[diagnostic(code(lsys::canvas))]
    InvalidCanvas { message: String },

    #[error("Expansion exceeded {limit} symbols at generation {generation} ({len} symbols)")]
    #[diagnostic(
        code(lsys::expansion),
        help("Lower the generation count or raise the symbol limit")
    )]
    ExpansionTooLarge {
        generation: u32,
        len: usize,
        limit: usize,
    },

    #[error("IO error with {path}: {message}")]
    #[diagnostic(code(lsys::io))]
    Io {
        path: std::path::PathBuf,
        message: String,
    },

    #[error("Config error: {message}")]
    #[diagnostic(code(lsys::config))]
    Config {
        message: String,
        #[help]
        help: Option<String>,
    },
}

pub type Result<T> = std::result::Result<T, LsysError>;
