/// Infix comparison shorthands accepted by the normalizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOp {
    /// Equal (`=` or `==`)
    Equal,
    /// Not equal (`!=`)
    NotEqual,
    /// Less than (`<`)
    LessThan,
    /// Less than or equal (`<=`)
    LessEqual,
    /// Greater than (`>`)
    GreaterThan,
    /// Greater than or equal (`>=`)
    GreaterEqual,
}

impl ComparisonOp {
    /// Looks up a short (one or two character) infix symbol.
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "=" | "==" => Some(ComparisonOp::Equal),
            "!=" => Some(ComparisonOp::NotEqual),
            "<" => Some(ComparisonOp::LessThan),
            "<=" => Some(ComparisonOp::LessEqual),
            ">" => Some(ComparisonOp::GreaterThan),
            ">=" => Some(ComparisonOp::GreaterEqual),
            _ => None,
        }
    }

    /// The prefix call name this shorthand rewrites to.
    pub fn name(self) -> &'static str {
        match self {
            ComparisonOp::Equal => "eq",
            ComparisonOp::NotEqual => "ne",
            ComparisonOp::LessThan => "lt",
            ComparisonOp::LessEqual => "le",
            ComparisonOp::GreaterThan => "gt",
            ComparisonOp::GreaterEqual => "ge",
        }
    }
}
