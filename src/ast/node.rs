use crate::ast::Argument;

/// A named operator call.
///
/// # Example
/// ```text
/// eq(foo,bar)   // name: "eq", args: ["foo", "bar"]
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OperatorNode {
    /// Operator name, e.g. `eq`, `and`, `limit`
    pub name: String,

    /// Arguments in source order
    pub args: Vec<Argument>,
}

impl OperatorNode {
    pub fn new(name: impl Into<String>) -> Self {
        OperatorNode {
            name: name.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args(name: impl Into<String>, args: Vec<Argument>) -> Self {
        OperatorNode {
            name: name.into(),
            args,
        }
    }

    /// Builds an `and` aggregate over the given children.
    pub fn and(children: Vec<OperatorNode>) -> Self {
        Self::with_args("and", children.into_iter().map(Argument::Operator).collect())
    }

    /// Builds an `or` aggregate over the given children.
    pub fn or(children: Vec<OperatorNode>) -> Self {
        Self::with_args("or", children.into_iter().map(Argument::Operator).collect())
    }

    pub fn push(&mut self, arg: impl Into<Argument>) {
        self.args.push(arg.into());
    }

    /// True for a node that has collected neither a name nor arguments.
    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.args.is_empty()
    }

    /// True for the implicit `and`/`or` nodes built from joiners.
    pub fn is_aggregate(&self) -> bool {
        self.name == "and" || self.name == "or"
    }
}
