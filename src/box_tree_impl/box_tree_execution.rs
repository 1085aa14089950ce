//! Executes lambda-calculus programs given in the box-tree program
//! representation.

use std::fmt::Display;

use crate::box_tree_impl::box_tree_ast::{ExprNode, Line, Program};
use crate::box_tree_impl::box_tree_beta_conversion::{reduce_in, EvalConfig, EvalError};
use crate::box_tree_impl::box_tree_environment::{Environment, Thunk};

/// Represents the result of box-tree program execution: one reduced
/// expression per executed line.
pub type ExecutionResult = Vec<ExprNode>;

/// Converts an ExecutionResult to a String, one expression per line.
pub fn execution_result_to_string(execution_result: &ExecutionResult) -> String {
    let mut out = vec![];

    for expr_node in execution_result {
        out.push(expr_node.to_string());
    }

    return out.join("\n");
}

/// Converts an ExecutionResult to a String using the indented tree form,
/// with a blank line between expressions.
pub fn execution_result_to_tree_string(execution_result: &ExecutionResult) -> String {
    let mut out = vec![];

    for expr_node in execution_result {
        out.push(expr_node.to_tree_string());
    }

    return out.join("\n\n");
}

/// A reduction that aborted, and the program line it belongs to.
#[derive(Debug, PartialEq, Eq)]
pub struct LineError {
    /// 0-based position of the line in the program.
    pub line_index: usize,
    pub eval_error: EvalError,
}

impl Display for LineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        return write!(f, "Statement {}: {}", self.line_index + 1, self.eval_error);
    }
}

impl std::error::Error for LineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.eval_error)
    }
}

/// Execute a lambda calculus program in box-tree representation.
///
/// Each `let` binding is reduced in the environment built by the lines before
/// it and then becomes visible to the lines after it. Each bare expression is
/// reduced the same way and contributes one entry to the result.
pub fn execute_program(program: Program, config: &EvalConfig) -> Result<ExecutionResult, LineError> {
    let mut env = Environment::new();
    let mut exec_result: ExecutionResult = Vec::new();

    for (line_index, line) in program.into_iter().enumerate() {
        let reduce_line = |expr: &ExprNode, env: &Environment| {
            reduce_in(expr, env, config).map_err(|eval_error| LineError {
                line_index,
                eval_error,
            })
        };

        match line {
            Line::Binding {
                binding_name,
                binding_body,
            } => {
                let binding_value = reduce_line(&binding_body, &env)?;

                log::debug!("Bound {} to {}.", binding_name, binding_value);

                // The value is already reduced against the earlier lines, so
                // its remaining free variables must stay free.
                env = env.with_resolved(&binding_name, Thunk::new(binding_value, Environment::new()));
            }

            Line::Execute { execute_body } => {
                exec_result.push(reduce_line(&execute_body, &env)?);
            }
        }
    }

    return Ok(exec_result);
}
