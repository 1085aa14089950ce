//! Code to configure and run the interpreter on a source program.

use std::fs;
use std::io::Read;

use clap::Parser;

use crate::box_tree_impl::box_tree_beta_conversion::{EvalConfig, DEFAULT_MAX_DEPTH, DEFAULT_MAX_STEPS};
use crate::box_tree_impl::box_tree_combinator_parsing::{parse_program, ParseError};
use crate::box_tree_impl::box_tree_execution::{
    execute_program, execution_result_to_string, execution_result_to_tree_string, LineError,
};

/// Config for the interpreter. Instantiate via `InterpreterConfig::parse()`.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct InterpreterConfig {
    /// The input filepath to run on. Reads standard input when omitted.
    #[arg(short, long)]
    pub src_filepath: Option<String>,

    /// Maximum number of reduction steps per statement. 0 means unlimited.
    #[arg(long, default_value_t = DEFAULT_MAX_STEPS)]
    pub max_steps: usize,

    /// Maximum recursion depth of a single reduction.
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    pub max_depth: usize,

    /// Print results as indented trees instead of inline expressions.
    #[arg(short, long)]
    pub tree: bool,

    /// Log parsing and reduction details.
    #[arg(short, long)]
    pub verbose: bool,
}

impl InterpreterConfig {
    pub fn eval_config(&self) -> EvalConfig {
        EvalConfig {
            max_steps: match self.max_steps {
                0 => None,
                limit => Some(limit),
            },
            max_depth: self.max_depth,
        }
    }
}

/// Errors that may be thrown when running the interpreter.
#[derive(Debug)]
pub enum RunError {
    InputFileError(std::io::Error),
    ProgramParseError(ParseError),
    ExecutionError(LineError),
}

/// Display trait implementation for RunError.
impl std::fmt::Display for RunError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InputFileError(io_err) => {
                return write!(f, "Input file error: {}", io_err);
            }

            Self::ProgramParseError(parse_error) => {
                return write!(f, "Parse error: {}", parse_error);
            }

            Self::ExecutionError(line_error) => {
                return write!(f, "Execution error: {}", line_error);
            }
        }
    }
}

impl std::error::Error for RunError {}

/// Type conversions for errors.
impl From<std::io::Error> for RunError {
    fn from(value: std::io::Error) -> Self {
        return Self::InputFileError(value);
    }
}

impl From<ParseError> for RunError {
    fn from(value: ParseError) -> Self {
        return Self::ProgramParseError(value);
    }
}

impl From<LineError> for RunError {
    fn from(value: LineError) -> Self {
        return Self::ExecutionError(value);
    }
}

/// Parse and execute `program_string`, rendering one result per executed line.
pub fn run_program_string(
    program_string: &str,
    eval_config: &EvalConfig,
    tree_output: bool,
) -> Result<String, RunError> {
    // Run parser.
    let program = parse_program(program_string)?;

    // Execute the program.
    let execution_result = execute_program(program, eval_config)?;

    // Return the result.
    match tree_output {
        true => Ok(execution_result_to_tree_string(&execution_result)),
        false => Ok(execution_result_to_string(&execution_result)),
    }
}

/// Run the interpreter (i.e. the parser and code execution) given an
/// interpreter config.
pub fn run_interpreter(config: &InterpreterConfig) -> Result<String, RunError> {
    // Read the input file, or standard input, into a string.
    let program_string = match &config.src_filepath {
        Some(src_filepath) => fs::read_to_string(src_filepath)?,
        None => {
            let mut program_string = String::new();
            std::io::stdin().read_to_string(&mut program_string)?;
            program_string
        }
    };

    log::debug!("Running {} bytes of source.", program_string.len());

    return run_program_string(&program_string, &config.eval_config(), config.tree);
}
