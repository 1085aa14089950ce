//! Alpha conversion: renaming bound variables so that substitution never
//! captures a free variable.

use std::collections::HashSet;

use crate::box_tree_impl::box_tree_ast::{get_all_variables, ExprNode};
use crate::box_tree_impl::box_tree_beta_conversion::EvalError;

/// Derives the next candidate name from `var_name`: a trailing number is
/// incremented, otherwise `1` is appended (`x` -> `x1` -> `x2` ... `x10`).
pub fn fresh_name(var_name: &str) -> Result<String, EvalError> {
    if var_name.is_empty() {
        return Err(EvalError::EmptyIdentifier);
    }

    let stem = var_name.trim_end_matches(|next: char| next.is_ascii_digit());
    let suffix = &var_name[stem.len()..];

    match suffix.parse::<u64>() {
        Ok(number) => Ok(format!("{}{}", stem, number + 1)),
        // No numeric suffix, or one too long to increment.
        Err(_) => Ok(format!("{}1", var_name)),
    }
}

/// Renames free occurrences of `old_var_name` in `expr` to `new_var_name`.
/// An abstraction that rebinds `old_var_name` is left untouched, since the
/// name is local to it again.
pub fn rename_variable(old_var_name: &str, new_var_name: &str, expr: &ExprNode) -> ExprNode {
    match expr {
        ExprNode::Var { var_name } if var_name == old_var_name => ExprNode::var(new_var_name),
        ExprNode::Var { .. } | ExprNode::Constant { .. } => expr.clone(),
        ExprNode::FnApp {
            fn_body,
            actual_arg,
        } => ExprNode::fn_app(
            rename_variable(old_var_name, new_var_name, fn_body),
            rename_variable(old_var_name, new_var_name, actual_arg),
        ),
        ExprNode::FnDef { formal_param, .. } if formal_param == old_var_name => expr.clone(),
        ExprNode::FnDef {
            formal_param,
            fn_body,
        } => ExprNode::fn_def(
            formal_param,
            rename_variable(old_var_name, new_var_name, fn_body),
        ),
    }
}

/// Given the binder `formal_param` of an abstraction with body `fn_body`,
/// picks a fresh binder that collides neither with `vars_to_avoid` nor with
/// any variable of `fn_body`, and renames the body to match.
pub fn perform_alpha_conversion(
    formal_param: &str,
    fn_body: &ExprNode,
    vars_to_avoid: &HashSet<&str>,
) -> Result<(String, ExprNode), EvalError> {
    let all_fn_body_vars = get_all_variables(fn_body);

    let mut new_formal_param = fresh_name(formal_param)?;

    while vars_to_avoid.contains(new_formal_param.as_str())
        || all_fn_body_vars.contains(new_formal_param.as_str())
    {
        new_formal_param = fresh_name(new_formal_param.as_str())?;
    }

    log::trace!("Alpha conversion renames {} to {}.", formal_param, new_formal_param);

    let new_fn_body = rename_variable(formal_param, new_formal_param.as_str(), fn_body);

    return Ok((new_formal_param, new_fn_body));
}
