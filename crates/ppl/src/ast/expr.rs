//! Expression nodes
//!
//! Layered the way the grammar is: logical expressions combine comparisons,
//! comparisons combine value expressions, and value expressions are built from
//! arithmetic over function calls, field references and literals. There are no
//! parenthesis nodes; grouping is implied by tree shape.

use serde::Serialize;

use super::literal::{Literal, StringLiteral};
use super::{Ident, QualifiedName};
use crate::token::{Span, TokenKind};

/// `logicalExpression | comparisonExpression | valueExpression`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Expression {
    Logical(LogicalExpr),
    Comparison(ComparisonExpr),
    Value(ValueExpr),
}

// ============ Logical ============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LogicalOp {
    Or,
    Xor,
    And,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum LogicalExpr {
    Comparison(ComparisonExpr),
    Not(Box<LogicalExpr>),
    Binary(Box<LogicalExpr>, LogicalOp, Box<LogicalExpr>),
    /// `isnull(a)`, `like(name, 'A%')`
    Boolean(FunctionCall),
    Relevance(RelevanceExpr),
}

impl LogicalOp {
    /// Binding strength: `OR` 1, `XOR` 2, `AND` 3.
    pub fn precedence(self) -> u8 {
        match self {
            LogicalOp::Or => 1,
            LogicalOp::Xor => 2,
            LogicalOp::And => 3,
        }
    }
}

impl LogicalExpr {
    pub fn binary(self, op: LogicalOp, rhs: LogicalExpr) -> Self {
        LogicalExpr::Binary(Box::new(self), op, Box::new(rhs))
    }

    pub fn not(self) -> Self {
        LogicalExpr::Not(Box::new(self))
    }
}

// ============ Comparison ============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CompareOp {
    Eq,
    /// `!=` and `<>`
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Regexp,
}

impl CompareOp {
    pub fn from_token(kind: TokenKind) -> Option<Self> {
        Some(match kind {
            TokenKind::Equal => CompareOp::Eq,
            TokenKind::NotEqual => CompareOp::Ne,
            TokenKind::Less => CompareOp::Lt,
            TokenKind::NotGreater => CompareOp::Le,
            TokenKind::Greater => CompareOp::Gt,
            TokenKind::NotLess => CompareOp::Ge,
            TokenKind::Regexp => CompareOp::Regexp,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ComparisonExpr {
    Compare(ValueExpr, CompareOp, ValueExpr),
    /// `value IN (lit, lit, ...)`
    In(ValueExpr, Vec<Literal>),
}

// ============ Value ============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ArithOp {
    Mul,
    Div,
    Mod,
    Add,
    Sub,
}

impl ArithOp {
    pub fn from_token(kind: TokenKind) -> Option<Self> {
        Some(match kind {
            TokenKind::Star => ArithOp::Mul,
            TokenKind::Divide => ArithOp::Div,
            TokenKind::Module => ArithOp::Mod,
            TokenKind::Plus => ArithOp::Add,
            TokenKind::Minus => ArithOp::Sub,
            _ => return None,
        })
    }

    /// Binding strength: multiplicative 8, additive 7.
    pub fn precedence(self) -> u8 {
        match self {
            ArithOp::Mul | ArithOp::Div | ArithOp::Mod => 8,
            ArithOp::Add | ArithOp::Sub => 7,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ValueExpr {
    Binary(Box<ValueExpr>, ArithOp, Box<ValueExpr>),
    Function(FunctionCall),
    /// `CAST(expr AS type)`
    Cast(Box<CastExpr>),
    Field(QualifiedName),
    Literal(Literal),
    /// `POSITION(substr IN str)`
    Position(Box<FunctionArg>, Box<FunctionArg>),
    Extract(Box<ExtractExpr>),
    GetFormat(Box<GetFormatExpr>),
    Timestamp(Box<TimestampExpr>),
}

impl ValueExpr {
    pub fn binary(self, op: ArithOp, rhs: ValueExpr) -> Self {
        ValueExpr::Binary(Box::new(self), op, Box::new(rhs))
    }
}

/// Built-in function applied to positional or `name = value` arguments.
///
/// `name` is the function keyword; PPL has no user-defined functions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionCall {
    pub name: TokenKind,
    pub args: Vec<FunctionArg>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionArg {
    pub name: Option<Ident>,
    pub value: ValueExpr,
}

impl FunctionArg {
    pub fn positional(value: ValueExpr) -> Self {
        Self { name: None, value }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CastExpr {
    pub value: Expression,
    /// One of the converted data type keywords (`INT`, `STRING`, ...).
    pub target: TokenKind,
}

/// `EXTRACT(part FROM arg)`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractExpr {
    pub part: TokenKind,
    pub source: FunctionArg,
}

/// `GET_FORMAT(DATE, 'USA')`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GetFormatExpr {
    pub kind: TokenKind,
    pub format: FunctionArg,
}

/// `TIMESTAMPADD(unit, a, b)` / `TIMESTAMPDIFF(unit, a, b)`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimestampExpr {
    pub function: TokenKind,
    pub unit: TokenKind,
    pub first: FunctionArg,
    pub second: FunctionArg,
}

// ============ Relevance ============

/// Full-text predicate: `match(field, 'query', operator='AND')`.
///
/// Single-field functions carry exactly one field; multi-field functions list
/// theirs in brackets, optionally weighted (`['title' ^ 2, body]`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelevanceExpr {
    pub function: TokenKind,
    pub fields: Vec<RelevanceField>,
    pub query: RelevanceValue,
    pub args: Vec<RelevanceArg>,
    pub span: Span,
}

impl RelevanceExpr {
    pub fn is_multi_field(&self) -> bool {
        self.function.is_multi_field_relevance_function()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum RelevanceFieldName {
    Field(QualifiedName),
    String(StringLiteral),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelevanceField {
    pub name: RelevanceFieldName,
    /// Integer or decimal boost.
    pub weight: Option<Literal>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum RelevanceValue {
    Field(QualifiedName),
    Literal(Literal),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelevanceArg {
    pub name: TokenKind,
    pub value: RelevanceValue,
}
