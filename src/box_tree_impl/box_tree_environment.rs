//! Persistent environment threaded through reduction.
//!
//! Every update returns a new `Environment` that shares all older entries with
//! its parent, so sibling reductions never see each other's bindings.

use std::cell::OnceCell;
use std::collections::HashSet;
use std::rc::Rc;

use crate::box_tree_impl::box_tree_ast::{get_all_free_variables, ExprNode};

/// An unreduced expression together with the environment it must be reduced
/// in.
#[derive(Debug, Clone)]
pub struct Thunk {
    pub expr: Rc<ExprNode>,
    pub env: Environment,
    free_vars: OnceCell<HashSet<String>>,
}

impl Thunk {
    pub fn new(expr: ExprNode, env: Environment) -> Self {
        Thunk {
            expr: Rc::new(expr),
            env,
            free_vars: OnceCell::new(),
        }
    }

    /// Free variables of the value this thunk stands for: free variables of
    /// the expression, with resolved ones replaced by the free variables of
    /// their own values.
    pub fn free_variables(&self) -> &HashSet<String> {
        self.free_vars.get_or_init(|| {
            let mut out = HashSet::new();

            for var_name in get_all_free_variables(&self.expr) {
                match self.env.lookup(var_name) {
                    Some(Binding::Resolved(thunk)) => {
                        out.extend(thunk.free_variables().iter().cloned());
                    }
                    _ => {
                        out.insert(String::from(var_name));
                    }
                }
            }

            out
        })
    }
}

/// The status of a name in scope.
#[derive(Debug, Clone)]
pub enum Binding {
    /// Bound by an enclosing abstraction, no value yet.
    Unresolved,
    Resolved(Thunk),
}

#[derive(Debug)]
struct Frame {
    var_name: String,
    binding: Binding,
    parent: Option<Rc<Frame>>,
}

#[derive(Debug, Clone, Default)]
pub struct Environment {
    head: Option<Rc<Frame>>,
}

impl Environment {
    pub fn new() -> Self {
        Environment { head: None }
    }

    fn with_binding(&self, var_name: &str, binding: Binding) -> Environment {
        Environment {
            head: Some(Rc::new(Frame {
                var_name: String::from(var_name),
                binding,
                parent: self.head.clone(),
            })),
        }
    }

    /// Marks `var_name` as bound without a value, shadowing any outer entry.
    pub fn with_unresolved(&self, var_name: &str) -> Environment {
        self.with_binding(var_name, Binding::Unresolved)
    }

    pub fn with_resolved(&self, var_name: &str, thunk: Thunk) -> Environment {
        self.with_binding(var_name, Binding::Resolved(thunk))
    }

    /// Finds the innermost entry for `var_name`.
    pub fn lookup(&self, var_name: &str) -> Option<&Binding> {
        let mut frame = self.head.as_deref();

        while let Some(current) = frame {
            if current.var_name == var_name {
                return Some(&current.binding);
            }
            frame = current.parent.as_deref();
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_finds_innermost_binding() {
        let outer = Environment::new().with_resolved("x", Thunk::new(ExprNode::var("a"), Environment::new()));
        let inner = outer.with_unresolved("x");

        assert!(matches!(inner.lookup("x"), Some(Binding::Unresolved)));
        assert!(matches!(outer.lookup("x"), Some(Binding::Resolved(_))));
        assert!(inner.lookup("y").is_none());
        assert!(Environment::new().lookup("x").is_none());
    }

    #[test]
    fn test_branches_do_not_see_each_other() {
        let base = Environment::new().with_unresolved("x");
        let left = base.with_unresolved("l");
        let right = base.with_unresolved("r");

        assert!(left.lookup("r").is_none());
        assert!(right.lookup("l").is_none());
        assert!(left.lookup("x").is_some() && right.lookup("x").is_some());
    }

    #[test]
    fn test_thunk_free_variables_follow_resolved_names() {
        // a -> (b c), where c is itself resolved to the free variable d.
        let env = Environment::new().with_resolved("c", Thunk::new(ExprNode::var("d"), Environment::new()));
        let thunk = Thunk::new(
            ExprNode::fn_app(ExprNode::var("b"), ExprNode::var("c")),
            env,
        );

        assert_eq!(
            thunk.free_variables(),
            &HashSet::from([String::from("b"), String::from("d")])
        );
    }
}
