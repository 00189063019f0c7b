use crate::{ast::OperatorNode, value::Value};

/// One argument of an operator call.
#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    /// Nested call
    ///
    /// # Example
    /// ```text
    /// and(eq(a,1),eq(b,2))
    /// ```
    Operator(OperatorNode),

    /// Typed leaf
    ///
    /// # Examples
    /// ```text
    /// bar
    /// 10
    /// date:2020-01-01
    /// ```
    Value(Value),

    /// Literal array
    ///
    /// # Example
    /// ```text
    /// (bar,foo,moo)
    /// ```
    Array(Vec<Argument>),
}

impl Argument {
    pub fn as_operator(&self) -> Option<&OperatorNode> {
        match self {
            Argument::Operator(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Argument::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Argument]> {
        match self {
            Argument::Array(items) => Some(items),
            _ => None,
        }
    }
}

impl From<OperatorNode> for Argument {
    fn from(node: OperatorNode) -> Self {
        Argument::Operator(node)
    }
}

impl From<Value> for Argument {
    fn from(value: Value) -> Self {
        Argument::Value(value)
    }
}

impl From<Vec<Argument>> for Argument {
    fn from(items: Vec<Argument>) -> Self {
        Argument::Array(items)
    }
}

impl From<&str> for Argument {
    fn from(s: &str) -> Self {
        Argument::Value(Value::from(s))
    }
}

impl From<f64> for Argument {
    fn from(n: f64) -> Self {
        Argument::Value(Value::Number(n))
    }
}
