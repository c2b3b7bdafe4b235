//! Pipeline stage rules

use super::name::is_ident_token;
use super::{PResult, Parser};
use crate::ast::{
    BySpanClause, Command, DedupCommand, EvalClause, FieldsCommand, FieldsMode, FromClause,
    FromTarget, HeadCommand, IntegerLiteral, Literal, LiteralValue, LogicalExpr, MlArg,
    NamedParameter, ParseCommand, PatternsCommand, PatternsMethod, PplCommand, QualifiedName,
    RareCommand, RenameClause, SearchCommand, SortCast, SortDirection, SortField, SourceKeyword,
    SpanClause, StatsAggTerm, StatsByClause, StatsCommand, StatsFunction, TableFunction,
    TableQualifiedName, TableSource, TopCommand,
};
use crate::token::TokenKind as K;

const COMMAND_KEYWORDS: &[K] = &[
    K::Where,
    K::Fields,
    K::Rename,
    K::Stats,
    K::Dedup,
    K::Sort,
    K::Eval,
    K::Head,
    K::Top,
    K::Rare,
    K::Grok,
    K::Parse,
    K::Patterns,
    K::Kmeans,
    K::Ad,
    K::Ml,
];

const STATS_FUNCTION_START: &[K] = &[
    K::Avg,
    K::Count,
    K::Sum,
    K::Min,
    K::Max,
    K::VarSamp,
    K::VarPop,
    K::StddevSamp,
    K::StddevPop,
    K::DistinctCount,
    K::Dc,
    K::Percentile,
    K::Take,
    K::Id,
];

const STRING_FOLLOW: &[K] = &[K::DquotaString, K::SquotaString];
const PATTERNS_FOLLOW: &[K] = &[K::Punct, K::Regex, K::Pipe, K::Eof];
const EVAL_FOLLOW: &[K] = &[K::Comma, K::Pipe, K::Eof];

/// Value type a named ML parameter accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParameterType {
    Integer,
    Decimal,
    String,
}

fn kmeans_parameter(kind: K) -> Option<ParameterType> {
    match kind {
        K::Centroids | K::Iterations => Some(ParameterType::Integer),
        K::DistanceType => Some(ParameterType::String),
        _ => None,
    }
}

fn ad_parameter(kind: K) -> Option<ParameterType> {
    match kind {
        K::NumberOfTrees
        | K::ShingleSize
        | K::SampleSize
        | K::OutputAfter
        | K::TrainingDataSize => Some(ParameterType::Integer),
        K::TimeDecay | K::AnomalyRate | K::AnomalyScoreThreshold => Some(ParameterType::Decimal),
        K::CategoryField | K::TimeField | K::DateFormat | K::TimeZone => {
            Some(ParameterType::String)
        }
        _ => None,
    }
}

impl Parser<'_> {
    // ============ First stage ============

    /// `pplCommands : searchCommand | describeCommand | showDataSourcesCommand`
    pub(super) fn ppl_command(&mut self) -> PResult<PplCommand> {
        match self.peek_kind() {
            K::Describe => {
                self.bump();
                Ok(PplCommand::Describe(self.table_source_clause()?))
            }
            K::Show if self.nth_kind(1) == K::Datasources => {
                self.bump();
                self.bump();
                Ok(PplCommand::ShowDataSources)
            }
            _ => self.search_command().map(PplCommand::Search),
        }
    }

    /// `searchCommand : SEARCH? (logical fromClause | fromClause logical
    ///   | fromClause | logical)?`
    ///
    /// The five shapes overlap, so each is tried in turn and must end the
    /// stage.
    fn search_command(&mut self) -> PResult<SearchCommand> {
        self.eat(K::Search);
        let mut decision = self.decision("search command");
        if let Some(cmd) = self.attempt(&mut decision, |p| {
            let filter = p.search_filter()?;
            let from = p.from_clause()?;
            p.expect_boundary()?;
            Ok(SearchCommand::FilterFrom { filter, from })
        })? {
            return Ok(cmd);
        }
        if let Some(cmd) = self.attempt(&mut decision, |p| {
            let from = p.from_clause()?;
            let filter = p.search_filter()?;
            p.expect_boundary()?;
            Ok(SearchCommand::FromFilter { from, filter })
        })? {
            return Ok(cmd);
        }
        if let Some(cmd) = self.attempt(&mut decision, |p| {
            let from = p.from_clause()?;
            p.expect_boundary()?;
            Ok(SearchCommand::From(from))
        })? {
            return Ok(cmd);
        }
        if let Some(cmd) = self.attempt(&mut decision, |p| {
            let filter = p.search_filter()?;
            p.expect_boundary()?;
            Ok(SearchCommand::Filter(filter))
        })? {
            return Ok(cmd);
        }
        if let Some(cmd) = self.attempt(&mut decision, |p| {
            p.expect_boundary()?;
            Ok(SearchCommand::Empty)
        })? {
            return Ok(cmd);
        }
        Err(decision.exhausted())
    }

    /// A logical expression that stops before `source=` / `index=`.
    fn search_filter(&mut self) -> PResult<LogicalExpr> {
        let outer = std::mem::replace(&mut self.in_search_filter, true);
        let result = self.logical_expression();
        self.in_search_filter = outer;
        result
    }

    /// `fromClause : (SOURCE | INDEX) EQUAL (tableSourceClause | tableFunction)`
    fn from_clause(&mut self) -> PResult<FromClause> {
        let keyword = match self.peek_kind() {
            K::Source => SourceKeyword::Source,
            K::Index => SourceKeyword::Index,
            _ => return Err(self.unexpected(&[K::Source, K::Index])),
        };
        self.bump();
        self.expect(K::Equal)?;

        let first = self.table_source()?;
        let first = match first {
            TableSource::Name(TableQualifiedName {
                cluster: None,
                name,
            }) if self.at(K::LtPrths) => {
                let args = self.function_args()?;
                return Ok(FromClause {
                    keyword,
                    target: FromTarget::Function(TableFunction { name, args }),
                });
            }
            other => other,
        };
        let mut tables = vec![first];
        while self.eat(K::Comma) {
            tables.push(self.table_source()?);
        }
        Ok(FromClause {
            keyword,
            target: FromTarget::Tables(tables),
        })
    }

    // ============ Pipe stages ============

    pub(super) fn command(&mut self) -> PResult<Command> {
        let kind = self.peek_kind();
        if !kind.is_command_keyword() {
            return Err(self.unexpected(COMMAND_KEYWORDS));
        }
        self.bump();
        match kind {
            K::Where => self.logical_expression().map(Command::Where),
            K::Fields => self.fields_command().map(Command::Fields),
            K::Rename => self.rename_command().map(Command::Rename),
            K::Stats => self.stats_command().map(Command::Stats),
            K::Dedup => self.dedup_command().map(Command::Dedup),
            K::Sort => self.sort_command().map(Command::Sort),
            K::Eval => self.eval_command().map(Command::Eval),
            K::Head => self.head_command().map(Command::Head),
            K::Top => self.top_command().map(Command::Top),
            K::Rare => self.rare_command().map(Command::Rare),
            K::Grok => self.parse_command().map(Command::Grok),
            K::Parse => self.parse_command().map(Command::Parse),
            K::Patterns => self.patterns_command().map(Command::Patterns),
            K::Kmeans => self.named_parameters(kmeans_parameter).map(Command::Kmeans),
            K::Ad => self.named_parameters(ad_parameter).map(Command::Ad),
            _ => self.ml_command().map(Command::Ml),
        }
    }

    /// `FIELDS (PLUS | MINUS)? wcFieldList`
    fn fields_command(&mut self) -> PResult<FieldsCommand> {
        let mode = if self.eat(K::Plus) {
            Some(FieldsMode::Include)
        } else if self.eat(K::Minus) {
            Some(FieldsMode::Exclude)
        } else {
            None
        };
        let fields = self.wc_field_list()?;
        Ok(FieldsCommand { mode, fields })
    }

    /// `RENAME wc AS wc (COMMA wc AS wc)*`
    fn rename_command(&mut self) -> PResult<Vec<RenameClause>> {
        self.with_sync(&[K::Comma], |p| {
            let mut clauses = vec![p.rename_clause()?];
            while p.eat(K::Comma) {
                clauses.push(p.rename_clause()?);
            }
            Ok(clauses)
        })
    }

    fn rename_clause(&mut self) -> PResult<RenameClause> {
        let from = self.wc_qualified_name()?;
        self.expect(K::As)?;
        let to = self.wc_qualified_name()?;
        Ok(RenameClause { from, to })
    }

    /// Consume `name =` when `name` is next and followed by `=`.
    fn eat_assignment(&mut self, name: K) -> bool {
        if self.at(name) && self.nth_kind(1) == K::Equal {
            self.bump();
            self.bump();
            true
        } else {
            false
        }
    }

    fn stats_command(&mut self) -> PResult<StatsCommand> {
        let partitions = if self.eat_assignment(K::Partitions) {
            Some(self.integer_literal()?)
        } else {
            None
        };
        let allnum = if self.eat_assignment(K::Allnum) {
            Some(self.boolean_literal()?)
        } else {
            None
        };
        let delim = if self.eat_assignment(K::Delim) {
            Some(self.string_literal()?)
        } else {
            None
        };
        let aggregations = self.with_sync(&[K::Comma, K::By, K::DedupSplitvalues], |p| {
            let mut terms = vec![p.stats_agg_term()?];
            while p.eat(K::Comma) {
                terms.push(p.stats_agg_term()?);
            }
            Ok(terms)
        })?;
        let by = if self.eat(K::By) {
            Some(self.stats_by_clause()?)
        } else {
            None
        };
        let dedup_split_values = if self.eat_assignment(K::DedupSplitvalues) {
            Some(self.boolean_literal()?)
        } else {
            None
        };
        Ok(StatsCommand {
            partitions,
            allnum,
            delim,
            aggregations,
            by,
            dedup_split_values,
        })
    }

    /// `statsFunction (AS wcFieldExpression)?`
    fn stats_agg_term(&mut self) -> PResult<StatsAggTerm> {
        let function = self.stats_function()?;
        let alias = if self.eat(K::As) {
            Some(self.wc_qualified_name()?)
        } else {
            None
        };
        Ok(StatsAggTerm { function, alias })
    }

    fn stats_function(&mut self) -> PResult<StatsFunction> {
        let kind = self.peek_kind();
        let next = self.nth_kind(1);
        match kind {
            K::Count if next == K::LtPrths => {
                let mut decision = self.decision("count");
                if let Some(call) = self.attempt(&mut decision, |p| p.stats_call())? {
                    return Ok(call);
                }
                if let Some(all) = self.attempt(&mut decision, |p| {
                    p.bump();
                    p.expect(K::LtPrths)?;
                    p.expect(K::RtPrths)?;
                    Ok(StatsFunction::CountAll)
                })? {
                    return Ok(all);
                }
                Err(decision.exhausted())
            }
            K::DistinctCount | K::Dc if next == K::LtPrths => {
                self.bump();
                let arg = self.parenthesized_value()?;
                Ok(StatsFunction::DistinctCount(arg))
            }
            K::Percentile if next == K::Less => {
                self.bump();
                self.bump();
                let percent = self.integer_literal()?;
                self.expect(K::Greater)?;
                self.expect(K::LtPrths)?;
                let field = self.nested(|p| p.qualified_name())?;
                self.expect(K::RtPrths)?;
                Ok(StatsFunction::Percentile { percent, field })
            }
            K::Take if next == K::LtPrths => {
                self.bump();
                self.bump();
                let (field, size) = self.nested(|p| {
                    let field = p.qualified_name()?;
                    let size = if p.eat(K::Comma) {
                        Some(p.integer_literal()?)
                    } else {
                        None
                    };
                    Ok((field, size))
                })?;
                self.expect(K::RtPrths)?;
                Ok(StatsFunction::Take { field, size })
            }
            _ if kind.is_stats_function_name() && next == K::LtPrths => self.stats_call(),
            _ if is_ident_token(kind) && next == K::LtPrths => {
                let name = self.ident()?;
                let args = self.function_args()?;
                Ok(StatsFunction::Other { name, args })
            }
            _ => Err(self.unexpected(STATS_FUNCTION_START)),
        }
    }

    /// `statsFunctionName ( valueExpression )`
    fn stats_call(&mut self) -> PResult<StatsFunction> {
        let name = self.bump().kind;
        let arg = self.parenthesized_value()?;
        Ok(StatsFunction::Call { name, arg })
    }

    fn parenthesized_value(&mut self) -> PResult<crate::ast::ValueExpr> {
        self.expect(K::LtPrths)?;
        let value = self.nested(|p| p.value_expression())?;
        self.expect(K::RtPrths)?;
        Ok(value)
    }

    /// `BY fieldList | BY bySpanClause (COMMA fieldList)?`
    fn stats_by_clause(&mut self) -> PResult<StatsByClause> {
        if !(self.at(K::Span) && self.nth_kind(1) == K::LtPrths) {
            return Ok(StatsByClause {
                span_clause: None,
                fields: self.field_list()?,
            });
        }
        let span_clause = self.span_clause()?;
        let alias = if self.eat(K::As) {
            Some(self.qualified_name()?)
        } else {
            None
        };
        let fields = if self.eat(K::Comma) {
            self.field_list()?
        } else {
            Vec::new()
        };
        Ok(StatsByClause {
            span_clause: Some(BySpanClause { span_clause, alias }),
            fields,
        })
    }

    /// `SPAN ( fieldExpression , literalValue timespanUnit? )`
    fn span_clause(&mut self) -> PResult<SpanClause> {
        self.bump();
        self.expect(K::LtPrths)?;
        let (field, value, unit) = self.nested(|p| {
            let field = p.qualified_name()?;
            p.expect(K::Comma)?;
            let value = p.literal_value()?;
            let unit = if p.peek_kind().is_timespan_unit() {
                Some(p.bump().kind)
            } else {
                None
            };
            Ok((field, value, unit))
        })?;
        self.expect(K::RtPrths)?;
        Ok(SpanClause { field, value, unit })
    }

    fn at_integer(&self) -> bool {
        self.at(K::IntegerLiteral)
            || (self.at_any(&[K::Plus, K::Minus]) && self.nth_kind(1) == K::IntegerLiteral)
    }

    fn optional_integer(&mut self) -> PResult<Option<IntegerLiteral>> {
        if self.at_integer() {
            self.integer_literal().map(Some)
        } else {
            Ok(None)
        }
    }

    /// `DEDUP integer? fieldList (KEEPEMPTY = bool)? (CONSECUTIVE = bool)?`
    fn dedup_command(&mut self) -> PResult<DedupCommand> {
        let count = self.optional_integer()?;
        let fields = self.field_list()?;
        let keep_empty = if self.eat_assignment(K::Keepempty) {
            Some(self.boolean_literal()?)
        } else {
            None
        };
        let consecutive = if self.eat_assignment(K::Consecutive) {
            Some(self.boolean_literal()?)
        } else {
            None
        };
        Ok(DedupCommand {
            count,
            fields,
            keep_empty,
            consecutive,
        })
    }

    fn sort_command(&mut self) -> PResult<Vec<SortField>> {
        self.with_sync(&[K::Comma], |p| {
            let mut fields = vec![p.sort_field()?];
            while p.eat(K::Comma) {
                fields.push(p.sort_field()?);
            }
            Ok(fields)
        })
    }

    /// `(PLUS | MINUS)? (field | (AUTO | STR | IP | NUM) ( field ))`
    fn sort_field(&mut self) -> PResult<SortField> {
        let direction = if self.eat(K::Plus) {
            Some(SortDirection::Ascending)
        } else if self.eat(K::Minus) {
            Some(SortDirection::Descending)
        } else {
            None
        };
        let cast = SortCast::from_token(self.peek_kind()).filter(|_| self.nth_kind(1) == K::LtPrths);
        let field = match cast {
            Some(_) => {
                self.bump();
                self.expect(K::LtPrths)?;
                let field = self.nested(|p| p.qualified_name())?;
                self.expect(K::RtPrths)?;
                field
            }
            None => self.qualified_name()?,
        };
        Ok(SortField {
            direction,
            cast,
            field,
        })
    }

    fn eval_command(&mut self) -> PResult<Vec<EvalClause>> {
        self.with_sync(&[K::Comma], |p| {
            let mut clauses = vec![p.eval_clause()?];
            while p.eat(K::Comma) {
                clauses.push(p.eval_clause()?);
            }
            Ok(clauses)
        })
    }

    /// `fieldExpression EQUAL expression`
    fn eval_clause(&mut self) -> PResult<EvalClause> {
        let field = self.qualified_name()?;
        self.expect(K::Equal)?;
        let value = self.expression(EVAL_FOLLOW)?;
        Ok(EvalClause { field, value })
    }

    /// `HEAD integer? (FROM integer)?`
    fn head_command(&mut self) -> PResult<HeadCommand> {
        let count = self.optional_integer()?;
        let from = if self.eat(K::From) {
            Some(self.integer_literal()?)
        } else {
            None
        };
        Ok(HeadCommand { count, from })
    }

    fn by_clause(&mut self) -> PResult<Option<Vec<QualifiedName>>> {
        if self.eat(K::By) {
            self.field_list().map(Some)
        } else {
            Ok(None)
        }
    }

    /// `TOP integer? fieldList byClause?`
    fn top_command(&mut self) -> PResult<TopCommand> {
        let count = self.optional_integer()?;
        let fields = self.field_list()?;
        let by = self.by_clause()?;
        Ok(TopCommand { count, fields, by })
    }

    /// `RARE fieldList byClause?`
    fn rare_command(&mut self) -> PResult<RareCommand> {
        let fields = self.field_list()?;
        let by = self.by_clause()?;
        Ok(RareCommand { fields, by })
    }

    /// `(GROK | PARSE) expression stringLiteral`
    fn parse_command(&mut self) -> PResult<ParseCommand> {
        let source = self.expression(STRING_FOLLOW)?;
        let pattern = self.string_literal()?;
        Ok(ParseCommand { source, pattern })
    }

    /// `PATTERNS ((NEW_FIELD | PATTERN) = string)* expression (PUNCT | REGEX)?`
    fn patterns_command(&mut self) -> PResult<PatternsCommand> {
        let mut parameters = Vec::new();
        while self.at_any(&[K::NewField, K::Pattern]) && self.nth_kind(1) == K::Equal {
            let name = self.bump().kind;
            self.bump();
            parameters.push((name, self.string_literal()?));
        }
        let source = self.expression(PATTERNS_FOLLOW)?;
        let method = if self.eat(K::Punct) {
            Some(PatternsMethod::Punct)
        } else if self.eat(K::Regex) {
            Some(PatternsMethod::Regex)
        } else {
            None
        };
        Ok(PatternsCommand {
            parameters,
            source,
            method,
        })
    }

    /// `name = value` pairs whose names and value types come from `lookup`.
    fn named_parameters(
        &mut self,
        lookup: fn(K) -> Option<ParameterType>,
    ) -> PResult<Vec<NamedParameter>> {
        let mut parameters = Vec::new();
        while let Some(ty) = lookup(self.peek_kind()) {
            let name = self.bump().kind;
            self.expect(K::Equal)?;
            let value = self.typed_literal(ty)?;
            parameters.push(NamedParameter { name, value });
        }
        Ok(parameters)
    }

    fn typed_literal(&mut self, ty: ParameterType) -> PResult<Literal> {
        let start = self.offset();
        let value = match ty {
            ParameterType::Integer => LiteralValue::Integer(self.integer_literal()?),
            ParameterType::Decimal => LiteralValue::Decimal(self.decimal_literal()?),
            ParameterType::String => LiteralValue::String(self.string_literal()?),
        };
        Ok(Literal::new(value, self.span_from(start)))
    }

    /// `ML (ident EQUAL literalValue)*`
    fn ml_command(&mut self) -> PResult<Vec<MlArg>> {
        let mut args = Vec::new();
        while self.at_ident() && self.nth_kind(1) == K::Equal {
            let name = self.ident()?;
            self.expect(K::Equal)?;
            let value = self.literal_value()?;
            args.push(MlArg { name, value });
        }
        Ok(args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ParseOptions;
    use crate::ast::{Expression, PplStatement, QueryStatement, ValueExpr};
    use crate::parse::{parse, parse_with};

    fn query(input: &str) -> QueryStatement {
        match parse(input) {
            Ok(root) => match root.statement {
                Some(PplStatement::Query(q)) => q,
                None => panic!("no statement for {input:?}"),
            },
            Err(err) => panic!("{input:?} failed to parse: {err}"),
        }
    }

    fn search(input: &str) -> SearchCommand {
        match query(input).head.node {
            PplCommand::Search(s) => s,
            other => panic!("expected search, got {other:?}"),
        }
    }

    fn stage(input: &str) -> Command {
        query(input).commands.remove(0).node
    }

    #[test]
    fn search_shapes() {
        assert!(matches!(search("search source=t a=1"), SearchCommand::FromFilter { .. }));
        assert!(matches!(search("search a=1 source=t"), SearchCommand::FilterFrom { .. }));
        assert!(matches!(search("source=t"), SearchCommand::From(_)));
        assert!(matches!(search("search a=1"), SearchCommand::Filter(_)));
        assert!(matches!(search("search"), SearchCommand::Empty));
    }

    #[test]
    fn search_filter_stops_at_source() {
        let SearchCommand::FilterFrom { filter, from } = search("search a=1 b=2 index=t") else {
            panic!("expected filter then from");
        };
        assert!(matches!(filter, LogicalExpr::Binary(..)));
        assert_eq!(from.keyword, SourceKeyword::Index);
    }

    #[test]
    fn table_function_source() {
        let SearchCommand::From(from) = search("source = prometheus.query_range('up', 0, 10)") else {
            panic!("expected from clause");
        };
        let FromTarget::Function(func) = from.target else {
            panic!("expected table function");
        };
        assert_eq!(func.name.joined(), "prometheus.query_range");
        assert_eq!(func.args.len(), 3);
    }

    #[test]
    fn multiple_sources() {
        let SearchCommand::From(from) = search("source=a, remote:b, logs-2021.01.*") else {
            panic!("expected from clause");
        };
        let FromTarget::Tables(tables) = from.target else {
            panic!("expected tables");
        };
        assert_eq!(tables.len(), 3);
    }

    #[test]
    fn describe_and_show() {
        let q = query("describe t1, t2");
        assert!(matches!(q.head.node, PplCommand::Describe(ref t) if t.len() == 2));
        let q = query("show datasources");
        assert!(matches!(q.head.node, PplCommand::ShowDataSources));
    }

    #[test]
    fn stats_with_modifiers() {
        let Command::Stats(stats) = stage(
            "source=t | stats partitions=2 allnum=true delim=',' count() as c, avg(x) \
             by span(ts, 1h) as bucket, host dedup_splitvalues=false",
        ) else {
            panic!("expected stats");
        };
        assert_eq!(stats.partitions.map(|p| p.to_i64()), Some(Ok(2)));
        assert_eq!(stats.allnum, Some(true));
        assert_eq!(stats.delim.as_ref().map(|d| d.value()), Some(","));
        assert_eq!(stats.aggregations.len(), 2);
        assert!(matches!(stats.aggregations[0].function, StatsFunction::CountAll));
        assert!(matches!(
            stats.aggregations[1].function,
            StatsFunction::Call { name: K::Avg, .. }
        ));
        let by = stats.by.unwrap();
        let span = by.span_clause.unwrap();
        assert_eq!(span.span_clause.unit, Some(K::H));
        assert_eq!(span.alias.unwrap().joined(), "bucket");
        assert_eq!(by.fields.len(), 1);
        assert_eq!(stats.dedup_split_values, Some(false));
    }

    #[test]
    fn stats_function_forms() {
        let Command::Stats(stats) =
            stage("source=t | stats count(a), dc(b), percentile<95>(c), take(d, 5), distinct_count(e)")
        else {
            panic!("expected stats");
        };
        let functions: Vec<_> = stats.aggregations.iter().map(|a| &a.function).collect();
        assert!(matches!(functions[0], StatsFunction::Call { name: K::Count, .. }));
        assert!(matches!(functions[1], StatsFunction::DistinctCount(_)));
        assert!(matches!(functions[2], StatsFunction::Percentile { percent, .. } if percent.digits() == "95"));
        assert!(matches!(functions[3], StatsFunction::Take { size: Some(_), .. }));
        assert!(matches!(functions[4], StatsFunction::DistinctCount(_)));
    }

    #[test]
    fn unknown_aggregation_is_kept() {
        let Command::Stats(stats) = stage("source=t | stats median(x)") else {
            panic!("expected stats");
        };
        assert!(matches!(
            stats.aggregations[0].function,
            StatsFunction::Other { ref name, .. } if name.text == "median"
        ));
    }

    #[test]
    fn dedup_options() {
        let Command::Dedup(dedup) = stage("source=t | dedup 2 a, b keepempty=true consecutive=false")
        else {
            panic!("expected dedup");
        };
        assert_eq!(dedup.count.map(|c| c.to_i64()), Some(Ok(2)));
        assert_eq!(dedup.fields.len(), 2);
        assert_eq!(dedup.keep_empty, Some(true));
        assert_eq!(dedup.consecutive, Some(false));
    }

    #[test]
    fn sort_fields() {
        let Command::Sort(fields) = stage("source=t | sort - a, + num(b), c") else {
            panic!("expected sort");
        };
        assert_eq!(fields[0].direction, Some(SortDirection::Descending));
        assert_eq!(fields[1].cast, Some(SortCast::Num));
        assert_eq!(fields[1].field.joined(), "b");
        assert_eq!(fields[2].direction, None);
    }

    #[test]
    fn eval_clauses() {
        let Command::Eval(clauses) = stage("source=t | eval x = a + 1, y = a > 1, z = abs(b)") else {
            panic!("expected eval");
        };
        assert_eq!(clauses.len(), 3);
        assert!(matches!(clauses[0].value, Expression::Value(ValueExpr::Binary(..))));
        assert!(matches!(clauses[1].value, Expression::Logical(_)));
        assert!(matches!(clauses[2].value, Expression::Value(ValueExpr::Function(_))));
    }

    #[test]
    fn head_top_rare() {
        let Command::Head(head) = stage("source=t | head 10 from 5") else {
            panic!("expected head");
        };
        assert!(head.count.is_some() && head.from.is_some());

        let Command::Head(head) = stage("source=t | head") else {
            panic!("expected head");
        };
        assert!(head.count.is_none());

        let Command::Top(top) = stage("source=t | top 3 a, b by c") else {
            panic!("expected top");
        };
        assert_eq!(top.fields.len(), 2);
        assert_eq!(top.by.map(|b| b.len()), Some(1));

        let Command::Rare(rare) = stage("source=t | rare a") else {
            panic!("expected rare");
        };
        assert!(rare.by.is_none());
    }

    #[test]
    fn text_extraction() {
        let Command::Parse(parse) = stage(r#"source=t | parse email '.+@(?<host>.+)'"#) else {
            panic!("expected parse");
        };
        assert!(matches!(parse.source, Expression::Value(ValueExpr::Field(_))));
        assert_eq!(parse.pattern.value(), ".+@(?<host>.+)");

        assert!(matches!(stage("source=t | grok m '%{IP:ip}'"), Command::Grok(_)));

        let Command::Patterns(patterns) =
            stage("source=t | patterns new_field='p' pattern='[0-9]' message regex")
        else {
            panic!("expected patterns");
        };
        assert_eq!(patterns.parameters.len(), 2);
        assert_eq!(patterns.method, Some(PatternsMethod::Regex));
    }

    #[test]
    fn ml_commands() {
        let Command::Kmeans(params) = stage("source=t | kmeans centroids=3 distance_type='L1'") else {
            panic!("expected kmeans");
        };
        assert_eq!(params.len(), 2);
        assert_eq!(params[0].name, K::Centroids);

        let Command::Ad(params) = stage("source=t | ad time_decay=0.5 time_field='ts'") else {
            panic!("expected ad");
        };
        assert!(matches!(params[0].value.value, LiteralValue::Decimal(_)));

        let Command::Ml(args) = stage("source=t | ml action='train' algorithm='rcf'") else {
            panic!("expected ml");
        };
        assert_eq!(args.len(), 2);
        assert_eq!(args[1].name.text, "algorithm");
    }

    #[test]
    fn typed_parameter_mismatch_fails() {
        assert!(parse("source=t | kmeans centroids='3'").is_err());
    }

    #[test]
    fn unknown_command_is_an_error() {
        let outcome = parse_with("source=t | frobnicate x | head", &ParseOptions::new()).unwrap();
        assert_eq!(outcome.diagnostics.len(), 1);
        assert_eq!(outcome.diagnostics[0].offset, 11);
        assert!(outcome.diagnostics[0].expected.contains(&K::Where));
    }

    #[test]
    fn missing_paren_is_inserted() {
        let input = "source=t | stats cnt(";
        let outcome = parse_with(input, &ParseOptions::new()).unwrap();
        assert_eq!(outcome.diagnostics.len(), 1);
        assert_eq!(outcome.diagnostics[0].offset, input.len());
        assert!(outcome.diagnostics[0].message.starts_with("missing ')'"));
        assert!(outcome.root.is_some());
    }

    #[test]
    fn extraneous_token_is_deleted() {
        let input = "source=t | stats avg(a)) by b";
        let outcome = parse_with(input, &ParseOptions::new()).unwrap();
        assert_eq!(outcome.diagnostics.len(), 1);
        assert!(outcome.diagnostics[0].message.starts_with("extraneous input ')'"));
    }
}
