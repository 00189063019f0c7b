//! # RQL - Operator Tree
//!
//! This module defines the tree produced by parsing an RQL query and consumed
//! by the serializer.
//!
//! ## Architecture Overview
//!
//! - **[node]** - Named operator calls (`eq(foo,bar)`)
//! - **[argument]** - What an operator can take: values, sub-calls, arrays
//! - **[operators]** - The infix comparison shorthands and their call names
//!
//! ## Quick Start
//!
//! ```text
//! eq(foo,bar)&limit(10)
//! ```
//!
//! parses to an `and` node with two children, `eq("foo","bar")` and
//! `limit(10)`.
//!
//! ## Core Concepts
//!
//! ### Calls
//!
//! Everything is a call: `name(arg,arg,...)`. Arguments keep their source
//! order, which matters for comparisons (`lt(price,10)` is not
//! `lt(10,price)`).
//!
//! ### Aggregates
//!
//! The joiners `&` / `,` (and) and `|` (or) build implicit `and` / `or`
//! nodes. The joiner seen first at a level owns that level; a run of the
//! other joiner is nested one level deeper.
//!
//! ```text
//! a()|b()&c()   =>   or(a(), and(b(), c()))
//! a()&b()|c()   =>   and(a(), or(b(), c()))
//! ```
//!
//! ### Arrays
//!
//! A parenthesised group in argument position is an array:
//!
//! ```text
//! in(foo,(bar,baz))
//! ```
pub mod argument;
pub mod node;
pub mod operators;

pub use argument::Argument;
pub use node::OperatorNode;
pub use operators::ComparisonOp;
