//! Parser and program execution code that represents programs as a tree where
//! each node references other nodes via `Box` smart pointers.

pub mod box_tree_alpha_conversion;
pub mod box_tree_ast;
pub mod box_tree_beta_conversion;
pub mod box_tree_combinator_parsing;
pub mod box_tree_environment;
pub mod box_tree_execution;
