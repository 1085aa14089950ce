//! Run a given lambda calculus program and print the result to standard
//! output.
//!
//! Example usage:
//!
//!     cargo run -- --src-filepath test_programs/church_booleans.lc
//!
//! Without `--src-filepath` the program is read from standard input.

use clap::Parser;
use lambda_interp::end_to_end::{run_interpreter, InterpreterConfig};

fn main() {
    let interpreter_config = InterpreterConfig::parse();

    let default_filter = match interpreter_config.verbose {
        true => "debug",
        false => "warn",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    let interpreter_result = run_interpreter(&interpreter_config);

    match interpreter_result {
        Ok(execution_result) => {
            println!("{}", execution_result);
        }

        Err(run_error) => {
            eprintln!("{}", run_error);
            std::process::exit(1);
        }
    }
}
