//! Canonical PPL text for syntax trees
//!
//! `Display` renders a single line that parses back to an equivalent tree:
//! keywords and function names in lowercase, logical operators in uppercase,
//! strings with their original quoting. [`pretty`] additionally breaks long
//! pipelines with one stage per line.

use std::fmt::{self, Display};

use crate::ast::literal::quote_double;
use crate::ast::{
    ArithOp, BySpanClause, CastExpr, Command, CompareOp, ComparisonExpr, DedupCommand,
    ErrorNode, EvalClause, Expression, FieldsCommand, FieldsMode, FromClause, FromTarget,
    FunctionArg, FunctionCall, HeadCommand, Ident, IdentStyle, IntegerLiteral, Literal,
    LiteralValue, LogicalExpr, LogicalOp, MlArg, NamedParameter, ParseCommand, PatternsCommand,
    PatternsMethod, PplCommand, PplStatement, QualifiedName, QueryStatement, RareCommand,
    RelevanceArg, RelevanceExpr, RelevanceField, RelevanceFieldName, RelevanceValue,
    RenameClause, Root, SearchCommand, Sign, SortCast, SortDirection, SortField, SourceKeyword,
    SpanClause, Spanned, StatsAggTerm, StatsByClause, StatsCommand, StatsFunction,
    TableQualifiedName, TableSource, TopCommand, ValueExpr,
};
use crate::token::TokenKind;

/// Lowercase keyword spelling: `DEDUP_SPLITVALUES` → `dedup_splitvalues`.
fn keyword(kind: TokenKind) -> String {
    kind.name().to_ascii_lowercase()
}

fn write_list<T: Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

// ============ Names ============

impl Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.style {
            IdentStyle::Bare | IdentStyle::Keyword => write!(f, "{}", self.text),
            IdentStyle::DotPrefixed => write!(f, ".{}", self.text),
            IdentStyle::Backtick => write!(f, "`{}`", self.text),
            IdentStyle::Quoted => write!(f, "{}", quote_double(&self.text)),
        }
    }
}

impl Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

impl Display for TableQualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(cluster) = &self.cluster {
            write!(f, "{cluster}:")?;
        }
        write!(f, "{}", self.name)
    }
}

impl Display for TableSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableSource::Name(name) => write!(f, "{name}"),
            TableSource::DateSuffix { text, .. } => write!(f, "{text}"),
        }
    }
}

// ============ Literals ============

impl Display for Sign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sign::Plus => write!(f, "+"),
            Sign::Minus => write!(f, "-"),
        }
    }
}

impl Display for IntegerLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(sign) = self.sign() {
            write!(f, "{sign}")?;
        }
        write!(f, "{}", self.digits())
    }
}

impl Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            LiteralValue::Interval(interval) => write!(
                f,
                "interval {} {}",
                interval.value,
                keyword(interval.unit)
            ),
            LiteralValue::String(s) => write!(f, "{}", s.raw()),
            LiteralValue::Integer(n) => write!(f, "{n}"),
            LiteralValue::Decimal(d) => {
                if let Some(sign) = d.sign() {
                    write!(f, "{sign}")?;
                }
                write!(f, "{}", d.lexeme())
            }
            LiteralValue::Boolean(b) => write!(f, "{b}"),
            LiteralValue::Datetime(kind, s) => {
                let kind = match kind {
                    crate::ast::DatetimeKind::Date => "date",
                    crate::ast::DatetimeKind::Time => "time",
                    crate::ast::DatetimeKind::Timestamp => "timestamp",
                };
                write!(f, "{kind} {}", s.raw())
            }
        }
    }
}

// ============ Expressions ============

impl Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Logical(e) => write!(f, "{e}"),
            Expression::Comparison(e) => write!(f, "{e}"),
            Expression::Value(e) => write!(f, "{e}"),
        }
    }
}

impl Display for LogicalOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogicalOp::Or => "OR",
            LogicalOp::Xor => "XOR",
            LogicalOp::And => "AND",
        };
        write!(f, "{s}")
    }
}

impl Display for LogicalExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicalExpr::Comparison(c) => write!(f, "{c}"),
            LogicalExpr::Not(inner) => {
                if matches!(inner.as_ref(), LogicalExpr::Binary(..)) {
                    write!(f, "NOT ({inner})")
                } else {
                    write!(f, "NOT {inner}")
                }
            }
            LogicalExpr::Binary(lhs, op, rhs) => {
                let wrap = |child: &LogicalExpr, right: bool| match child {
                    LogicalExpr::Binary(_, inner, _) => {
                        inner.precedence() < op.precedence()
                            || (right && inner.precedence() == op.precedence())
                    }
                    _ => false,
                };
                if wrap(lhs, false) {
                    write!(f, "({lhs})")?;
                } else {
                    write!(f, "{lhs}")?;
                }
                write!(f, " {op} ")?;
                if wrap(rhs, true) {
                    write!(f, "({rhs})")
                } else {
                    write!(f, "{rhs}")
                }
            }
            LogicalExpr::Boolean(call) => write!(f, "{call}"),
            LogicalExpr::Relevance(rel) => write!(f, "{rel}"),
        }
    }
}

impl Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "!=",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
            CompareOp::Regexp => "regexp",
        };
        write!(f, "{s}")
    }
}

impl Display for ComparisonExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComparisonExpr::Compare(lhs, op, rhs) => write!(f, "{lhs} {op} {rhs}"),
            ComparisonExpr::In(lhs, values) => {
                write!(f, "{lhs} in (")?;
                write_list(f, values)?;
                write!(f, ")")
            }
        }
    }
}

impl Display for ArithOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ArithOp::Mul => "*",
            ArithOp::Div => "/",
            ArithOp::Mod => "%",
            ArithOp::Add => "+",
            ArithOp::Sub => "-",
        };
        write!(f, "{s}")
    }
}

impl Display for ValueExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueExpr::Binary(lhs, op, rhs) => {
                let wrap = |child: &ValueExpr, right: bool| match child {
                    ValueExpr::Binary(_, inner, _) => {
                        inner.precedence() < op.precedence()
                            || (right && inner.precedence() == op.precedence())
                    }
                    _ => false,
                };
                if wrap(lhs, false) {
                    write!(f, "({lhs})")?;
                } else {
                    write!(f, "{lhs}")?;
                }
                write!(f, " {op} ")?;
                if wrap(rhs, true) {
                    write!(f, "({rhs})")
                } else {
                    write!(f, "{rhs}")
                }
            }
            ValueExpr::Function(call) => write!(f, "{call}"),
            ValueExpr::Cast(cast) => write!(f, "{cast}"),
            ValueExpr::Field(name) => write!(f, "{name}"),
            ValueExpr::Literal(lit) => write!(f, "{lit}"),
            ValueExpr::Position(needle, haystack) => {
                write!(f, "position({needle} in {haystack})")
            }
            ValueExpr::Extract(e) => {
                write!(f, "extract({} from {})", keyword(e.part), e.source)
            }
            ValueExpr::GetFormat(g) => {
                write!(f, "get_format({}, {})", keyword(g.kind), g.format)
            }
            ValueExpr::Timestamp(t) => write!(
                f,
                "{}({}, {}, {})",
                keyword(t.function),
                keyword(t.unit),
                t.first,
                t.second
            ),
        }
    }
}

impl Display for CastExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cast({} as {})", self.value, keyword(self.target))
    }
}

impl Display for FunctionCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", keyword(self.name))?;
        write_list(f, &self.args)?;
        write!(f, ")")
    }
}

impl Display for FunctionArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{name}={}", self.value),
            None => write!(f, "{}", self.value),
        }
    }
}

impl Display for RelevanceExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", keyword(self.function))?;
        if self.is_multi_field() {
            write!(f, "[")?;
            write_list(f, &self.fields)?;
            write!(f, "]")?;
        } else {
            write_list(f, &self.fields)?;
        }
        write!(f, ", {}", self.query)?;
        for arg in &self.args {
            write!(f, ", {arg}")?;
        }
        write!(f, ")")
    }
}

impl Display for RelevanceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            RelevanceFieldName::Field(name) => write!(f, "{name}")?,
            RelevanceFieldName::String(s) => write!(f, "{}", s.raw())?,
        }
        if let Some(weight) = &self.weight {
            write!(f, " ^ {weight}")?;
        }
        Ok(())
    }
}

impl Display for RelevanceValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelevanceValue::Field(name) => write!(f, "{name}"),
            RelevanceValue::Literal(lit) => write!(f, "{lit}"),
        }
    }
}

impl Display for RelevanceArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", keyword(self.name), self.value)
    }
}

// ============ Commands ============

impl Display for ErrorNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

impl<T: Display> Display for Spanned<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.node.fmt(f)
    }
}

impl Display for FromClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.keyword {
            SourceKeyword::Source => write!(f, "source=")?,
            SourceKeyword::Index => write!(f, "index=")?,
        }
        match &self.target {
            FromTarget::Tables(tables) => write_list(f, tables),
            FromTarget::Function(func) => {
                write!(f, "{}(", func.name)?;
                write_list(f, &func.args)?;
                write!(f, ")")
            }
        }
    }
}

impl Display for SearchCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchCommand::FilterFrom { filter, from } => write!(f, "search {filter} {from}"),
            SearchCommand::FromFilter { from, filter } => write!(f, "search {from} {filter}"),
            SearchCommand::From(from) => write!(f, "search {from}"),
            SearchCommand::Filter(filter) => write!(f, "search {filter}"),
            SearchCommand::Empty => write!(f, "search"),
        }
    }
}

impl Display for PplCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PplCommand::Search(search) => write!(f, "{search}"),
            PplCommand::Describe(tables) => {
                write!(f, "describe ")?;
                write_list(f, tables)
            }
            PplCommand::ShowDataSources => write!(f, "show datasources"),
            PplCommand::Error(err) => write!(f, "{err}"),
        }
    }
}

impl Display for FieldsCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fields ")?;
        match self.mode {
            Some(FieldsMode::Include) => write!(f, "+ ")?,
            Some(FieldsMode::Exclude) => write!(f, "- ")?,
            None => {}
        }
        write_list(f, &self.fields)
    }
}

impl Display for RenameClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} as {}", self.from, self.to)
    }
}

impl Display for StatsFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatsFunction::Call { name, arg } => write!(f, "{}({arg})", keyword(*name)),
            StatsFunction::CountAll => write!(f, "count()"),
            StatsFunction::DistinctCount(arg) => write!(f, "dc({arg})"),
            StatsFunction::Percentile { percent, field } => {
                write!(f, "percentile<{percent}>({field})")
            }
            StatsFunction::Take { field, size } => match size {
                Some(size) => write!(f, "take({field}, {size})"),
                None => write!(f, "take({field})"),
            },
            StatsFunction::Other { name, args } => {
                write!(f, "{name}(")?;
                write_list(f, args)?;
                write!(f, ")")
            }
        }
    }
}

impl Display for StatsAggTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.function)?;
        if let Some(alias) = &self.alias {
            write!(f, " as {alias}")?;
        }
        Ok(())
    }
}

impl Display for SpanClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "span({}, {}", self.field, self.value)?;
        if let Some(unit) = self.unit {
            match self.value.value {
                LiteralValue::Integer(_) | LiteralValue::Decimal(_) => {
                    write!(f, "{}", keyword(unit))?
                }
                _ => write!(f, " {}", keyword(unit))?,
            }
        }
        write!(f, ")")
    }
}

impl Display for BySpanClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.span_clause)?;
        if let Some(alias) = &self.alias {
            write!(f, " as {alias}")?;
        }
        Ok(())
    }
}

impl Display for StatsByClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "by ")?;
        match &self.span_clause {
            Some(span) if self.fields.is_empty() => write!(f, "{span}"),
            Some(span) => {
                write!(f, "{span}, ")?;
                write_list(f, &self.fields)
            }
            None => write_list(f, &self.fields),
        }
    }
}

impl Display for StatsCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "stats")?;
        if let Some(partitions) = &self.partitions {
            write!(f, " partitions={partitions}")?;
        }
        if let Some(allnum) = self.allnum {
            write!(f, " allnum={allnum}")?;
        }
        if let Some(delim) = &self.delim {
            write!(f, " delim={}", delim.raw())?;
        }
        write!(f, " ")?;
        write_list(f, &self.aggregations)?;
        if let Some(by) = &self.by {
            write!(f, " {by}")?;
        }
        if let Some(dedup) = self.dedup_split_values {
            write!(f, " dedup_splitvalues={dedup}")?;
        }
        Ok(())
    }
}

impl Display for DedupCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dedup ")?;
        if let Some(count) = &self.count {
            write!(f, "{count} ")?;
        }
        write_list(f, &self.fields)?;
        if let Some(keep_empty) = self.keep_empty {
            write!(f, " keepempty={keep_empty}")?;
        }
        if let Some(consecutive) = self.consecutive {
            write!(f, " consecutive={consecutive}")?;
        }
        Ok(())
    }
}

impl Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.direction {
            Some(SortDirection::Ascending) => write!(f, "+")?,
            Some(SortDirection::Descending) => write!(f, "-")?,
            None => {}
        }
        let cast = match self.cast {
            Some(SortCast::Auto) => "auto",
            Some(SortCast::Str) => "str",
            Some(SortCast::Ip) => "ip",
            Some(SortCast::Num) => "num",
            None => return write!(f, "{}", self.field),
        };
        write!(f, "{cast}({})", self.field)
    }
}

impl Display for EvalClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.field, self.value)
    }
}

impl Display for HeadCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "head")?;
        if let Some(count) = &self.count {
            write!(f, " {count}")?;
        }
        if let Some(from) = &self.from {
            write!(f, " from {from}")?;
        }
        Ok(())
    }
}

fn write_by(f: &mut fmt::Formatter<'_>, by: &Option<Vec<QualifiedName>>) -> fmt::Result {
    if let Some(fields) = by {
        write!(f, " by ")?;
        write_list(f, fields)?;
    }
    Ok(())
}

impl Display for TopCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "top ")?;
        if let Some(count) = &self.count {
            write!(f, "{count} ")?;
        }
        write_list(f, &self.fields)?;
        write_by(f, &self.by)
    }
}

impl Display for RareCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rare ")?;
        write_list(f, &self.fields)?;
        write_by(f, &self.by)
    }
}

impl Display for ParseCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.source, self.pattern.raw())
    }
}

impl Display for PatternsCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "patterns ")?;
        for (name, value) in &self.parameters {
            write!(f, "{}={} ", keyword(*name), value.raw())?;
        }
        write!(f, "{}", self.source)?;
        match self.method {
            Some(PatternsMethod::Punct) => write!(f, " punct"),
            Some(PatternsMethod::Regex) => write!(f, " regex"),
            None => Ok(()),
        }
    }
}

impl Display for NamedParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", keyword(self.name), self.value)
    }
}

impl Display for MlArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}

fn write_parameters<T: Display>(f: &mut fmt::Formatter<'_>, name: &str, items: &[T]) -> fmt::Result {
    write!(f, "{name}")?;
    for item in items {
        write!(f, " {item}")?;
    }
    Ok(())
}

impl Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Where(expr) => write!(f, "where {expr}"),
            Command::Fields(fields) => write!(f, "{fields}"),
            Command::Rename(clauses) => {
                write!(f, "rename ")?;
                write_list(f, clauses)
            }
            Command::Stats(stats) => write!(f, "{stats}"),
            Command::Dedup(dedup) => write!(f, "{dedup}"),
            Command::Sort(fields) => {
                write!(f, "sort ")?;
                write_list(f, fields)
            }
            Command::Eval(clauses) => {
                write!(f, "eval ")?;
                write_list(f, clauses)
            }
            Command::Head(head) => write!(f, "{head}"),
            Command::Top(top) => write!(f, "{top}"),
            Command::Rare(rare) => write!(f, "{rare}"),
            Command::Grok(cmd) => write!(f, "grok {cmd}"),
            Command::Parse(cmd) => write!(f, "parse {cmd}"),
            Command::Patterns(patterns) => write!(f, "{patterns}"),
            Command::Kmeans(params) => write_parameters(f, "kmeans", params),
            Command::Ad(params) => write_parameters(f, "ad", params),
            Command::Ml(args) => write_parameters(f, "ml", args),
            Command::Error(err) => write!(f, "{err}"),
        }
    }
}

// ============ Statements ============

impl Display for QueryStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.head)?;
        for command in &self.commands {
            write!(f, " | {command}")?;
        }
        Ok(())
    }
}

impl Display for Root {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.statement {
            Some(PplStatement::Query(query)) => write!(f, "{query}"),
            None => Ok(()),
        }
    }
}

// ============ Line breaking ============

/// Render a query, putting each pipe stage on its own line when the single
/// line form is wider than `width`.
pub fn pretty(root: &Root, width: usize) -> String {
    let one_line = root.to_string();
    if one_line.len() <= width {
        return one_line;
    }
    let Some(PplStatement::Query(query)) = &root.statement else {
        return one_line;
    };
    let mut out = query.head.to_string();
    for command in &query.commands {
        out.push_str("\n| ");
        out.push_str(&command.to_string());
    }
    out
}

impl Root {
    /// See [`pretty`].
    pub fn pretty(&self, width: usize) -> String {
        pretty(self, width)
    }
}
