/// Data structures to represent lambda calculus expressions and programs, and
/// some utility functions to display and inspect them.
use std::collections::HashSet;

/// Represents a `let` binding or a bare expression to execute.
#[derive(Debug, PartialEq, Clone)]
pub enum Line {
    Binding {
        binding_name: String,
        binding_body: Box<ExprNode>,
    },
    Execute {
        execute_body: Box<ExprNode>,
    },
}

/// Represents a program: the lines in source order.
pub type Program = Vec<Line>;

/// Represents a lambda-calculus expression.
///
/// Equality is structural: `\x.x` and `\y.y` are different trees.
#[derive(Debug, PartialEq, Clone)]
pub enum ExprNode {
    FnDef {
        formal_param: String,
        fn_body: Box<ExprNode>,
    },
    FnApp {
        fn_body: Box<ExprNode>,
        actual_arg: Box<ExprNode>,
    },
    Var {
        var_name: String,
    },
    Constant {
        value: f64,
    },
}

impl ExprNode {
    pub fn var(var_name: &str) -> Self {
        ExprNode::Var {
            var_name: String::from(var_name),
        }
    }

    pub fn fn_def(formal_param: &str, fn_body: ExprNode) -> Self {
        ExprNode::FnDef {
            formal_param: String::from(formal_param),
            fn_body: Box::new(fn_body),
        }
    }

    pub fn fn_app(fn_body: ExprNode, actual_arg: ExprNode) -> Self {
        ExprNode::FnApp {
            fn_body: Box::new(fn_body),
            actual_arg: Box::new(actual_arg),
        }
    }

    pub fn constant(value: f64) -> Self {
        ExprNode::Constant { value }
    }

    /// Renders the expression one node per line, indenting children by two
    /// spaces. Applications show as `β`, abstractions as `λname.`.
    pub fn to_tree_string(&self) -> String {
        let mut lines = Vec::new();
        expr_node_to_tree_lines(self, 0, &mut lines);
        return lines.join("\n");
    }
}

// Helper function to produce the inline string representation of an ExprNode.
fn expr_node_to_string_helper(expr_node: &ExprNode, string_so_far: &mut String) {
    match expr_node {
        ExprNode::Var { var_name } => {
            string_so_far.push_str(var_name.as_str());
        }
        ExprNode::FnApp {
            fn_body,
            actual_arg,
        } => {
            string_so_far.push('(');
            expr_node_to_string_helper(fn_body, string_so_far);
            string_so_far.push(' ');
            expr_node_to_string_helper(actual_arg, string_so_far);
            string_so_far.push(')');
        }
        ExprNode::FnDef {
            formal_param,
            fn_body,
        } => {
            string_so_far.push('λ');
            string_so_far.push_str(formal_param.as_str());
            string_so_far.push('.');
            expr_node_to_string_helper(fn_body, string_so_far);
        }
        ExprNode::Constant { value } => {
            string_so_far.push_str(format!("{:?}", value).as_str());
        }
    };
}

// Helper function to produce the indented tree representation of an ExprNode.
fn expr_node_to_tree_lines(expr_node: &ExprNode, depth: usize, lines: &mut Vec<String>) {
    let indent = "  ".repeat(depth);

    match expr_node {
        ExprNode::Var { var_name } => {
            lines.push(format!("{}{}", indent, var_name));
        }
        ExprNode::FnApp {
            fn_body,
            actual_arg,
        } => {
            lines.push(format!("{}β", indent));
            expr_node_to_tree_lines(fn_body, depth + 1, lines);
            expr_node_to_tree_lines(actual_arg, depth + 1, lines);
        }
        ExprNode::FnDef {
            formal_param,
            fn_body,
        } => {
            lines.push(format!("{}λ{}.", indent, formal_param));
            expr_node_to_tree_lines(fn_body, depth + 1, lines);
        }
        ExprNode::Constant { value } => {
            lines.push(format!("{}{:?}", indent, value));
        }
    }
}

// Converts an expr node to a string.
pub fn expr_node_to_string(expr_node: &ExprNode) -> String {
    let mut out_string = String::new();
    expr_node_to_string_helper(expr_node, &mut out_string);
    return out_string;
}

// Display trait implementation for ExprNode using expr_node_to_string function.
impl std::fmt::Display for ExprNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        return write!(f, "{}", expr_node_to_string(self).as_str());
    }
}

impl std::fmt::Display for Line {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Line::Binding {
                binding_name,
                binding_body,
            } => {
                return write!(f, "let {} = {}", binding_name, binding_body);
            }
            Line::Execute { execute_body } => {
                return write!(f, "{}", execute_body);
            }
        }
    }
}

/// Computes the free variables in the given lambda calculus expression.
pub fn get_all_free_variables(expr_body: &ExprNode) -> HashSet<&str> {
    match expr_body {
        ExprNode::Var { var_name } => {
            return HashSet::from([var_name.as_ref()]);
        }
        ExprNode::FnApp {
            fn_body,
            actual_arg,
        } => {
            let fn_body_free_vars = get_all_free_variables(fn_body);
            let actual_arg_free_vars = get_all_free_variables(actual_arg);

            return fn_body_free_vars
                .union(&actual_arg_free_vars)
                .copied()
                .collect();
        }
        ExprNode::FnDef {
            formal_param,
            fn_body,
        } => {
            let mut fn_body_free_vars = get_all_free_variables(fn_body);
            fn_body_free_vars.remove(formal_param.as_str());
            return fn_body_free_vars;
        }
        ExprNode::Constant { .. } => {
            return HashSet::new();
        }
    };
}

/// Finds all variables used in the given lambda calculus expression, bound
/// names included.
pub fn get_all_variables(expr_body: &ExprNode) -> HashSet<&str> {
    match expr_body {
        ExprNode::Var { var_name } => {
            return HashSet::from([var_name.as_ref()]);
        }
        ExprNode::FnApp {
            fn_body,
            actual_arg,
        } => {
            let fn_body_vars = get_all_variables(fn_body);
            let actual_arg_vars = get_all_variables(actual_arg);

            return fn_body_vars.union(&actual_arg_vars).copied().collect();
        }
        ExprNode::FnDef {
            formal_param,
            fn_body,
        } => {
            let mut fn_body_vars = get_all_variables(fn_body);
            fn_body_vars.insert(formal_param.as_str());
            return fn_body_vars;
        }
        ExprNode::Constant { .. } => {
            return HashSet::new();
        }
    };
}

/// The Church-encoded boolean: `λ1.λ2.1` for true, `λ1.λ2.2` for false.
pub fn church_boolean(value: bool) -> ExprNode {
    let selected = if value { "1" } else { "2" };

    ExprNode::fn_def("1", ExprNode::fn_def("2", ExprNode::var(selected)))
}

/// Enumerates every expression at most `max_depth` levels deep over the
/// variables `var_names`. Level one holds the variables. Each further level
/// adds an abstraction over every name and an application of every pair of
/// expressions from the level below. Constants are never generated.
pub fn generate_expressions(max_depth: usize, var_names: &[&str]) -> Vec<ExprNode> {
    if max_depth == 0 {
        return Vec::new();
    }

    let mut out: Vec<ExprNode> = var_names.iter().map(|var_name| ExprNode::var(var_name)).collect();
    if max_depth == 1 {
        return out;
    }

    let smaller = generate_expressions(max_depth - 1, var_names);

    for var_name in var_names {
        for fn_body in &smaller {
            out.push(ExprNode::fn_def(var_name, fn_body.clone()));
        }
    }

    for fn_body in &smaller {
        for actual_arg in &smaller {
            out.push(ExprNode::fn_app(fn_body.clone(), actual_arg.clone()));
        }
    }

    return out;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn church_successor() -> ExprNode {
        // \n.\f.\x.(f ((n f) x))
        ExprNode::fn_def(
            "n",
            ExprNode::fn_def(
                "f",
                ExprNode::fn_def(
                    "x",
                    ExprNode::fn_app(
                        ExprNode::var("f"),
                        ExprNode::fn_app(
                            ExprNode::fn_app(ExprNode::var("n"), ExprNode::var("f")),
                            ExprNode::var("x"),
                        ),
                    ),
                ),
            ),
        )
    }

    #[test]
    fn test_expr_node_to_string() {
        assert_eq!(
            church_successor().to_string(),
            "λn.λf.λx.(f ((n f) x))"
        );
        assert_eq!(
            ExprNode::fn_app(
                ExprNode::fn_app(ExprNode::var("+"), ExprNode::constant(2.0)),
                ExprNode::constant(3.5)
            )
            .to_string(),
            "((+ 2.0) 3.5)"
        );
    }

    #[test]
    fn test_expr_node_to_tree_string() {
        let expected_output = "β\n  λx.\n    x\n  y";
        let test_input = ExprNode::fn_app(
            ExprNode::fn_def("x", ExprNode::var("x")),
            ExprNode::var("y"),
        );

        assert_eq!(test_input.to_tree_string(), expected_output);
    }

    #[test]
    fn test_structural_equality() {
        let identity_x = ExprNode::fn_def("x", ExprNode::var("x"));
        let identity_y = ExprNode::fn_def("y", ExprNode::var("y"));

        assert_eq!(identity_x, identity_x.clone());
        // Alpha-equivalent trees are still different trees.
        assert_ne!(identity_x, identity_y);
        assert_ne!(ExprNode::var("1"), ExprNode::constant(1.0));
    }

    #[test]
    fn test_free_and_all_variables() {
        // \x.((x y) \y.z)
        let expr = ExprNode::fn_def(
            "x",
            ExprNode::fn_app(
                ExprNode::fn_app(ExprNode::var("x"), ExprNode::var("y")),
                ExprNode::fn_def("y", ExprNode::var("z")),
            ),
        );

        assert_eq!(get_all_free_variables(&expr), HashSet::from(["y", "z"]));
        assert_eq!(get_all_variables(&expr), HashSet::from(["x", "y", "z"]));
    }

    #[test]
    fn test_church_boolean() {
        assert_eq!(church_boolean(true).to_string(), "λ1.λ2.1");
        assert_eq!(church_boolean(false).to_string(), "λ1.λ2.2");
    }

    #[test]
    fn test_generate_expressions() {
        assert!(generate_expressions(0, &["x"]).is_empty());
        assert_eq!(generate_expressions(1, &["x", "y"]), vec![ExprNode::var("x"), ExprNode::var("y")]);

        // x, λx.x, (x x)
        let depth_two = generate_expressions(2, &["x"]);
        assert_eq!(
            depth_two,
            vec![
                ExprNode::var("x"),
                ExprNode::fn_def("x", ExprNode::var("x")),
                ExprNode::fn_app(ExprNode::var("x"), ExprNode::var("x")),
            ]
        );

        // 2 variables, 2 * 10 abstractions and 10 * 10 applications.
        assert_eq!(generate_expressions(3, &["x", "y"]).len(), 122);
    }

    #[test]
    fn test_line_display() {
        let binding = Line::Binding {
            binding_name: String::from("id"),
            binding_body: Box::new(ExprNode::fn_def("x", ExprNode::var("x"))),
        };

        assert_eq!(binding.to_string(), "let id = λx.x");
    }
}
