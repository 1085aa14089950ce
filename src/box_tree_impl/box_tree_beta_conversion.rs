//! Beta conversion: reduces box-tree expressions to normal form.
//!
//! Reduction is normal order. The function of an application is only reduced
//! until it is an abstraction (weak head normal form), never under its
//! binder. Applying `λx.body` then binds `x` to an unreduced thunk of the
//! argument and continues with `body`; the thunk is only reduced where `x` is
//! actually used. Before an abstraction's body is reduced for the final
//! result, its binder is alpha-converted if it would capture a free variable
//! of a value substituted into that body.

use std::collections::HashSet;
use std::fmt::Display;

use crate::box_tree_impl::box_tree_alpha_conversion::perform_alpha_conversion;
use crate::box_tree_impl::box_tree_ast::{church_boolean, get_all_free_variables, ExprNode};
use crate::box_tree_impl::box_tree_environment::{Binding, Environment, Thunk};

pub const DEFAULT_MAX_STEPS: usize = 1_000_000;
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Limits on a single reduction. Reductions in the untyped calculus need not
/// terminate, so both the number of beta steps and the recursion depth are
/// capped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvalConfig {
    /// Maximum number of beta steps and primitive applications. `None` means
    /// unlimited.
    pub max_steps: Option<usize>,
    /// Maximum nesting of recursive reduction calls.
    pub max_depth: usize,
}

impl Default for EvalConfig {
    fn default() -> Self {
        EvalConfig {
            max_steps: Some(DEFAULT_MAX_STEPS),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Conditions that abort a reduction.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum EvalError {
    DivisionByZero,
    EmptyIdentifier,
    StepLimitExceeded { limit: usize },
    DepthLimitExceeded { limit: usize },
}

impl Display for EvalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DivisionByZero => {
                return write!(f, "Division by zero.");
            }

            Self::EmptyIdentifier => {
                return write!(f, "Attempted to rename an empty identifier.");
            }

            Self::StepLimitExceeded { limit } => {
                return write!(f, "Reduction did not converge within {} steps.", limit);
            }

            Self::DepthLimitExceeded { limit } => {
                return write!(
                    f,
                    "Reduction did not converge within a recursion depth of {}.",
                    limit
                );
            }
        }
    }
}

impl std::error::Error for EvalError {}

/// Reduces `expr` to normal form in an empty environment with the default
/// limits.
pub fn reduce(expr: &ExprNode) -> Result<ExprNode, EvalError> {
    reduce_in(expr, &Environment::new(), &EvalConfig::default())
}

/// Reduces `expr` to normal form. Free variables resolved in `env` are
/// replaced by their reduced values.
pub fn reduce_in(
    expr: &ExprNode,
    env: &Environment,
    config: &EvalConfig,
) -> Result<ExprNode, EvalError> {
    let mut reducer = Reducer {
        config,
        steps: 0,
        depth: 0,
    };

    let reduced = reducer.reduce(expr, env)?;

    log::debug!("Reduced {} to {} in {} steps.", expr, reduced, reducer.steps);

    return Ok(reduced);
}

struct Reducer<'c> {
    config: &'c EvalConfig,
    steps: usize,
    depth: usize,
}

/// An expression reduced just far enough to tell whether it can be applied.
enum Head {
    /// An abstraction and the environment its body must be reduced in.
    Closure {
        formal_param: String,
        fn_body: ExprNode,
        env: Environment,
    },
    /// Anything else. Already in normal form.
    Stuck(ExprNode),
}

impl Reducer<'_> {
    fn reduce(&mut self, expr: &ExprNode, env: &Environment) -> Result<ExprNode, EvalError> {
        match self.reduce_head(expr, env)? {
            Head::Closure {
                formal_param,
                fn_body,
                env,
            } => self.reduce_fn_def(&formal_param, &fn_body, &env),
            Head::Stuck(reduced) => Ok(reduced),
        }
    }

    fn reduce_head(&mut self, expr: &ExprNode, env: &Environment) -> Result<Head, EvalError> {
        if self.depth >= self.config.max_depth {
            return Err(EvalError::DepthLimitExceeded {
                limit: self.config.max_depth,
            });
        }

        self.depth += 1;
        let head = self.reduce_head_node(expr, env);
        self.depth -= 1;

        head
    }

    fn count_step(&mut self) -> Result<(), EvalError> {
        self.steps += 1;

        match self.config.max_steps {
            Some(limit) if self.steps > limit => Err(EvalError::StepLimitExceeded { limit }),
            _ => Ok(()),
        }
    }

    fn reduce_head_node(&mut self, expr: &ExprNode, env: &Environment) -> Result<Head, EvalError> {
        match expr {
            ExprNode::Var { var_name } => match env.lookup(var_name) {
                // Reduce the value where it was bound, not where it is used.
                Some(Binding::Resolved(thunk)) => self.reduce_head(&thunk.expr, &thunk.env),
                // Bound by an enclosing abstraction, or free.
                _ => Ok(Head::Stuck(expr.clone())),
            },

            ExprNode::Constant { .. } => Ok(Head::Stuck(expr.clone())),

            ExprNode::FnDef {
                formal_param,
                fn_body,
            } => Ok(Head::Closure {
                formal_param: formal_param.clone(),
                fn_body: (**fn_body).clone(),
                env: env.clone(),
            }),

            ExprNode::FnApp {
                fn_body,
                actual_arg,
            } => self.reduce_fn_app(fn_body, actual_arg, env),
        }
    }

    fn reduce_fn_def(
        &mut self,
        formal_param: &str,
        fn_body: &ExprNode,
        env: &Environment,
    ) -> Result<ExprNode, EvalError> {
        let substituted_free_vars = substituted_free_variables(formal_param, fn_body, env);

        // To prevent variable capture, perform alpha conversion if a value
        // substituted into the body mentions formal_param as a free variable.
        if substituted_free_vars.contains(formal_param) {
            let vars_to_avoid: HashSet<&str> =
                substituted_free_vars.iter().map(String::as_str).collect();
            let (new_formal_param, new_fn_body) =
                perform_alpha_conversion(formal_param, fn_body, &vars_to_avoid)?;

            return self.reduce_fn_def_body(new_formal_param, &new_fn_body, env);
        }

        self.reduce_fn_def_body(String::from(formal_param), fn_body, env)
    }

    fn reduce_fn_def_body(
        &mut self,
        formal_param: String,
        fn_body: &ExprNode,
        env: &Environment,
    ) -> Result<ExprNode, EvalError> {
        let body_env = env.with_unresolved(&formal_param);
        let reduced_body = self.reduce(fn_body, &body_env)?;

        Ok(ExprNode::FnDef {
            formal_param,
            fn_body: Box::new(reduced_body),
        })
    }

    fn reduce_fn_app(
        &mut self,
        fn_body: &ExprNode,
        actual_arg: &ExprNode,
        env: &Environment,
    ) -> Result<Head, EvalError> {
        match self.reduce_head(fn_body, env)? {
            // The function is an abstraction, so we are at a redex.
            Head::Closure {
                formal_param,
                fn_body: defined_fn,
                env: fn_env,
            } => {
                self.count_step()?;

                log::trace!(
                    "Beta step {}: substituting {} for {} in {}.",
                    self.steps,
                    actual_arg,
                    formal_param,
                    defined_fn
                );

                let substitution_env =
                    fn_env.with_resolved(&formal_param, Thunk::new(actual_arg.clone(), env.clone()));

                self.reduce_head(&defined_fn, &substitution_env)
            }

            // The application is stuck on its head. Reduce the argument and
            // check for a built-in primitive.
            Head::Stuck(reduced_fn) => {
                let reduced_arg = self.reduce(actual_arg, env)?;

                match apply_builtin(&reduced_fn, &reduced_arg, env)? {
                    Some(result) => {
                        self.count_step()?;
                        // `=` yields an abstraction that may be applied next.
                        self.reduce_head(&result, &Environment::new())
                    }
                    None => Ok(Head::Stuck(ExprNode::FnApp {
                        fn_body: Box::new(reduced_fn),
                        actual_arg: Box::new(reduced_arg),
                    })),
                }
            }
        }
    }
}

/// Free variables that may appear in `fn_body` once resolved names are
/// substituted: for each free variable of the body (other than
/// `formal_param`) resolved in `env`, the free variables of its value.
fn substituted_free_variables(
    formal_param: &str,
    fn_body: &ExprNode,
    env: &Environment,
) -> HashSet<String> {
    let mut out = HashSet::new();

    for var_name in get_all_free_variables(fn_body) {
        if var_name == formal_param {
            continue;
        }

        if let Some(Binding::Resolved(thunk)) = env.lookup(var_name) {
            out.extend(thunk.free_variables().iter().cloned());
        }
    }

    out
}

/// Evaluates `((op left) right)` for `op` one of `+ - * / =` when both
/// operands are constants and `op` is not bound in `env`. Returns `None` for
/// any other shape.
fn apply_builtin(
    reduced_fn: &ExprNode,
    reduced_arg: &ExprNode,
    env: &Environment,
) -> Result<Option<ExprNode>, EvalError> {
    let ExprNode::Constant { value: right } = *reduced_arg else {
        return Ok(None);
    };
    let ExprNode::FnApp {
        fn_body,
        actual_arg,
    } = reduced_fn
    else {
        return Ok(None);
    };
    let (ExprNode::Var { var_name }, ExprNode::Constant { value: left }) = (&**fn_body, &**actual_arg)
    else {
        return Ok(None);
    };
    if env.lookup(var_name).is_some() {
        return Ok(None);
    }

    let value = match var_name.as_str() {
        "+" => left + right,
        "-" => left - right,
        "*" => left * right,
        "/" => {
            if right == 0.0 {
                return Err(EvalError::DivisionByZero);
            }
            left / right
        }
        "=" => return Ok(Some(church_boolean(*left == right))),
        _ => return Ok(None),
    };

    Ok(Some(ExprNode::Constant { value }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::box_tree_impl::box_tree_combinator_parsing::parse_expression;

    fn parse(text: &str) -> ExprNode {
        parse_expression(text).expect("parse_expression returned unexpected parse error")
    }

    // Reduces each input and compares the inline rendering of the result.
    fn run_reduction_test(cases: &[(&str, &str)]) {
        for (input_str, expected_output) in cases {
            let reduced = reduce(&parse(input_str)).expect("reduction returned unexpected error");
            assert_eq!(reduced.to_string(), *expected_output, "input: {input_str}");
        }
    }

    #[test_log::test]
    fn test_reduce_simple() {
        run_reduction_test(&[
            (r"((\x.x)a)", "a"),
            (r"(((\x.(\y.x))a)b)", "a"),
            (r"(((\x.(\y.y))a)b)", "b"),
            (r"(((\x.(\y.x))(\x.(\y.x)))(\x.(\y.y)))", "λx.λy.x"),
            (r"(((\x.(\y.y))(\x.(\y.x)))(\x.(\y.y)))", "λx.λy.y"),
            (r"(xx)", "(x x)"),
            (r"(c(xx))", "(c (x x))"),
            (r"42", "42.0"),
        ]);
    }

    #[test_log::test]
    fn test_reduce_under_abstractions() {
        run_reduction_test(&[
            (r"((\x.(\y.(x(\z.(xx)))))a)", "λy.(a λz.(a a))"),
            (r"(((\x.(\y.(x(\z.(xx)))))a)b)", "(a λz.(a a))"),
            (r"(((\x.(\y.(x((\z.(xx))c))))a)b)", "(a (a a))"),
            (r"\y.((\x.x) y)", "λy.y"),
        ]);
    }

    #[test_log::test]
    fn test_reduce_avoids_capture() {
        // The free x of the argument must not be captured by the inner binder.
        let reduced = reduce(&parse(r"((\y.\x.y) x)")).expect("unexpected error");

        assert_eq!(reduced, ExprNode::fn_def("x1", ExprNode::var("x")));

        run_reduction_test(&[(r"((\f.\x.(fx))(\f.\x.(fx)))", "λx.λx1.(x x1)")]);
    }

    // Fresh names must skip past names already taken by the body or the
    // argument.
    #[test_log::test]
    fn test_reduce_avoids_capture_with_taken_names() {
        // ((\x.\y.\x1.(x y)) (y x1))
        let expr = ExprNode::fn_app(
            ExprNode::fn_def(
                "x",
                ExprNode::fn_def(
                    "y",
                    ExprNode::fn_def("x1", ExprNode::fn_app(ExprNode::var("x"), ExprNode::var("y"))),
                ),
            ),
            ExprNode::fn_app(ExprNode::var("y"), ExprNode::var("x1")),
        );

        let reduced = reduce(&expr).expect("unexpected error");

        assert_eq!(reduced.to_string(), "λy1.λx2.((y x1) y1)");
    }

    #[test_log::test]
    fn test_reduce_arithmetic() {
        run_reduction_test(&[
            (r"(((\x.\y.((+x)y))2)3)", "5.0"),
            (r"((-2)5)", "-3.0"),
            (r"((*4)((+1)2))", "12.0"),
            (r"((/9)2)", "4.5"),
            (r"((+ x) 2)", "((+ x) 2.0)"),
            (r"((% 4) 2)", "((% 4.0) 2.0)"),
        ]);
    }

    // An operator name bound by an abstraction is an ordinary variable.
    #[test_log::test]
    fn test_bound_operator_is_not_a_builtin() {
        run_reduction_test(&[
            (r"((\+.((+1)2)) g)", "((g 1.0) 2.0)"),
            (r"\+.((+1)2)", "λ+.((+ 1.0) 2.0)"),
            (r"((\y.\+.((y 1) 2)) +)", "λ+1.3.0"),
        ]);
    }

    #[test_log::test]
    fn test_reduce_equality_yields_church_booleans() {
        assert_eq!(reduce(&parse(r"((=2)2)")), Ok(church_boolean(true)));
        assert_eq!(reduce(&parse(r"((=2)3)")), Ok(church_boolean(false)));

        run_reduction_test(&[
            (r"((((=2)2)a)b)", "a"),
            (r"((((=2)3)a)b)", "b"),
        ]);
    }

    #[test_log::test]
    fn test_division_by_zero_is_fatal() {
        assert_eq!(reduce(&parse(r"((/2)0)")), Err(EvalError::DivisionByZero));
        assert_eq!(
            reduce(&parse(r"\x.((/x)((-1)1))")),
            Ok(parse(r"\x.((/x)0)"))
        );
    }

    // Arguments are only reduced where they are used.
    #[test_log::test]
    fn test_unused_argument_is_never_reduced() {
        run_reduction_test(&[
            (r"(((\x.\y.x) 5) ((/2)0))", "5.0"),
            (r"((\x.a) ((\x.(xx))(\x.(xx))))", "a"),
        ]);
    }

    // The function of an application is not reduced under its binder before
    // it is applied.
    #[test_log::test]
    fn test_function_is_applied_before_its_body_is_reduced() {
        run_reduction_test(&[
            (r"((\x.(x ((\y.(yy))(\y.(yy))))) (\z.a))", "a"),
            (r"(((\x.\y.(y ((\w.(ww))(\w.(ww))))) b) \v.c)", "c"),
        ]);
    }

    #[test_log::test]
    fn test_reduce_is_idempotent_on_normal_forms() {
        for input_str in [r"\x.\y.(x y)", r"(a \z.(a a))", r"((\y.\x.y) x)", "7"] {
            let reduced = reduce(&parse(input_str)).expect("unexpected error");
            assert_eq!(reduce(&reduced), Ok(reduced.clone()), "input: {input_str}");
        }
    }

    #[test_log::test]
    fn test_reduce_in_resolves_free_variables() {
        let env = Environment::new().with_resolved(
            "i",
            Thunk::new(parse(r"\x.x"), Environment::new()),
        );

        let reduced = reduce_in(&parse(r"(i z)"), &env, &EvalConfig::default());

        assert_eq!(reduced, Ok(ExprNode::var("z")));
    }

    #[test_log::test]
    fn test_non_terminating_reduction_hits_limits() {
        let omega = parse(r"((\x.(xx))(\x.(xx)))");

        let depth_config = EvalConfig {
            max_steps: None,
            max_depth: 64,
        };
        assert_eq!(
            reduce_in(&omega, &Environment::new(), &depth_config),
            Err(EvalError::DepthLimitExceeded { limit: 64 })
        );

        let step_config = EvalConfig {
            max_steps: Some(3),
            max_depth: 64,
        };
        assert_eq!(
            reduce_in(&omega, &Environment::new(), &step_config),
            Err(EvalError::StepLimitExceeded { limit: 3 })
        );
    }
}
