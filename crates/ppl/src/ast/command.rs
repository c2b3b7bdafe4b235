//! Pipeline stages

use serde::Serialize;

use super::expr::{Expression, FunctionArg, LogicalExpr, ValueExpr};
use super::literal::{IntegerLiteral, Literal, StringLiteral};
use super::{ErrorNode, Ident, QualifiedName, TableSource};
use crate::token::TokenKind;

/// First stage of a query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum PplCommand {
    Search(SearchCommand),
    Describe(Vec<TableSource>),
    ShowDataSources,
    Error(ErrorNode),
}

/// The five shapes a `search` stage can take, in resolution order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SearchCommand {
    /// `search a=1 source=t`
    FilterFrom {
        filter: LogicalExpr,
        from: FromClause,
    },
    /// `search source=t a=1`
    FromFilter {
        from: FromClause,
        filter: LogicalExpr,
    },
    /// `search source=t`
    From(FromClause),
    /// `search a=1`
    Filter(LogicalExpr),
    /// `search`
    Empty,
}

impl SearchCommand {
    pub fn from_clause(&self) -> Option<&FromClause> {
        match self {
            SearchCommand::FilterFrom { from, .. }
            | SearchCommand::FromFilter { from, .. }
            | SearchCommand::From(from) => Some(from),
            SearchCommand::Filter(_) | SearchCommand::Empty => None,
        }
    }

    pub fn filter(&self) -> Option<&LogicalExpr> {
        match self {
            SearchCommand::FilterFrom { filter, .. }
            | SearchCommand::FromFilter { filter, .. }
            | SearchCommand::Filter(filter) => Some(filter),
            SearchCommand::From(_) | SearchCommand::Empty => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SourceKeyword {
    Source,
    Index,
}

/// `source=<tables>` or `index=<table function>`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FromClause {
    pub keyword: SourceKeyword,
    pub target: FromTarget,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum FromTarget {
    Tables(Vec<TableSource>),
    Function(TableFunction),
}

/// `source = catalog.query_range('up', 0, 10)`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableFunction {
    pub name: QualifiedName,
    pub args: Vec<FunctionArg>,
}

/// A pipe stage after the first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Command {
    Where(LogicalExpr),
    Fields(FieldsCommand),
    Rename(Vec<RenameClause>),
    Stats(StatsCommand),
    Dedup(DedupCommand),
    Sort(Vec<SortField>),
    Eval(Vec<EvalClause>),
    Head(HeadCommand),
    Top(TopCommand),
    Rare(RareCommand),
    Grok(ParseCommand),
    Parse(ParseCommand),
    Patterns(PatternsCommand),
    Kmeans(Vec<NamedParameter>),
    Ad(Vec<NamedParameter>),
    Ml(Vec<MlArg>),
    Error(ErrorNode),
}

impl Command {
    /// Keyword that introduces the stage, `None` for error placeholders.
    pub fn keyword(&self) -> Option<TokenKind> {
        Some(match self {
            Command::Where(_) => TokenKind::Where,
            Command::Fields(_) => TokenKind::Fields,
            Command::Rename(_) => TokenKind::Rename,
            Command::Stats(_) => TokenKind::Stats,
            Command::Dedup(_) => TokenKind::Dedup,
            Command::Sort(_) => TokenKind::Sort,
            Command::Eval(_) => TokenKind::Eval,
            Command::Head(_) => TokenKind::Head,
            Command::Top(_) => TokenKind::Top,
            Command::Rare(_) => TokenKind::Rare,
            Command::Grok(_) => TokenKind::Grok,
            Command::Parse(_) => TokenKind::Parse,
            Command::Patterns(_) => TokenKind::Patterns,
            Command::Kmeans(_) => TokenKind::Kmeans,
            Command::Ad(_) => TokenKind::Ad,
            Command::Ml(_) => TokenKind::Ml,
            Command::Error(_) => return None,
        })
    }
}

// ============ Field selection ============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FieldsMode {
    /// `fields + a`
    Include,
    /// `fields - a`
    Exclude,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldsCommand {
    pub mode: Option<FieldsMode>,
    pub fields: Vec<QualifiedName>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenameClause {
    pub from: QualifiedName,
    pub to: QualifiedName,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvalClause {
    pub field: QualifiedName,
    pub value: Expression,
}

// ============ Aggregation ============

/// Modifiers appear in this fixed order:
/// `stats partitions=1 allnum=false delim="," count() by a dedup_splitvalues=false`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsCommand {
    pub partitions: Option<IntegerLiteral>,
    pub allnum: Option<bool>,
    pub delim: Option<StringLiteral>,
    pub aggregations: Vec<StatsAggTerm>,
    pub by: Option<StatsByClause>,
    pub dedup_split_values: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsAggTerm {
    pub function: StatsFunction,
    pub alias: Option<QualifiedName>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum StatsFunction {
    /// `avg(x)`, `count(x)`, `stddev_pop(x)`, ...
    Call { name: TokenKind, arg: ValueExpr },
    /// `count()`
    CountAll,
    /// `dc(x)` / `distinct_count(x)`
    DistinctCount(ValueExpr),
    /// `percentile<95>(x)`
    Percentile {
        percent: IntegerLiteral,
        field: QualifiedName,
    },
    /// `take(x, 10)`
    Take {
        field: QualifiedName,
        size: Option<IntegerLiteral>,
    },
    /// Any other aggregation name applied to function arguments.
    Other { name: Ident, args: Vec<FunctionArg> },
}

/// `by a, b`, `by span(ts, 1h)`, `by span(ts, 1h) as bucket, a`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsByClause {
    pub span_clause: Option<BySpanClause>,
    pub fields: Vec<QualifiedName>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BySpanClause {
    pub span_clause: SpanClause,
    pub alias: Option<QualifiedName>,
}

/// `span(field, 1h)`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpanClause {
    pub field: QualifiedName,
    pub value: Literal,
    /// Time unit keyword (`H`, `MINUTE`, ...) when present.
    pub unit: Option<TokenKind>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DedupCommand {
    pub count: Option<IntegerLiteral>,
    pub fields: Vec<QualifiedName>,
    pub keep_empty: Option<bool>,
    pub consecutive: Option<bool>,
}

// ============ Ordering and limits ============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SortDirection {
    /// `+field`
    Ascending,
    /// `-field`
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SortCast {
    Auto,
    Str,
    Ip,
    Num,
}

impl SortCast {
    pub fn from_token(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::Auto => Some(SortCast::Auto),
            TokenKind::Str => Some(SortCast::Str),
            TokenKind::Ip => Some(SortCast::Ip),
            TokenKind::Num => Some(SortCast::Num),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SortField {
    pub direction: Option<SortDirection>,
    pub cast: Option<SortCast>,
    pub field: QualifiedName,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeadCommand {
    pub count: Option<IntegerLiteral>,
    pub from: Option<IntegerLiteral>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopCommand {
    pub count: Option<IntegerLiteral>,
    pub fields: Vec<QualifiedName>,
    pub by: Option<Vec<QualifiedName>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RareCommand {
    pub fields: Vec<QualifiedName>,
    pub by: Option<Vec<QualifiedName>>,
}

// ============ Text extraction ============

/// Shared by `grok` and `parse`: `parse email '.+@(?<host>.+)'`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParseCommand {
    pub source: Expression,
    pub pattern: StringLiteral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PatternsMethod {
    Punct,
    Regex,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatternsCommand {
    /// `new_field='..'` and `pattern='..'`, in source order.
    pub parameters: Vec<(TokenKind, StringLiteral)>,
    pub source: Expression,
    pub method: Option<PatternsMethod>,
}

// ============ Machine learning ============

/// `centroids=3`, `time_field='ts'`: keyword name with a typed literal value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedParameter {
    pub name: TokenKind,
    pub value: Literal,
}

/// `ml action='train' algorithm='rcf'`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MlArg {
    pub name: Ident,
    pub value: Literal,
}
