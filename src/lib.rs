//! This crate contains code for a simple lambda calculus interpreter.

pub mod box_tree_impl;
pub mod end_to_end;
pub mod parser_combinators;
