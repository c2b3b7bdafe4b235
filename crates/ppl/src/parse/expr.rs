//! Expression rules
//!
//! Logical and arithmetic chains are folded with [`Climber`], an explicit
//! operator stack, so long `a + b + c + ...` or `x=1 OR y=2 OR ...` chains do
//! not recurse once per operator.

use super::name::is_ident_token;
use super::{ExprShape, PResult, Parser};
use crate::ast::{
    ArithOp, CastExpr, CompareOp, ComparisonExpr, Expression, ExtractExpr, FunctionArg,
    FunctionCall, GetFormatExpr, LogicalExpr, LogicalOp, RelevanceArg, RelevanceExpr,
    RelevanceField, RelevanceFieldName, RelevanceValue, TimestampExpr, ValueExpr,
};
use crate::token::TokenKind as K;

const COMPARISON_OPERATORS: &[K] = &[
    K::Equal,
    K::NotEqual,
    K::Less,
    K::NotGreater,
    K::Greater,
    K::NotLess,
    K::Regexp,
    K::In,
];

const OPERAND_START: &[K] = &[
    K::LtPrths,
    K::Id,
    K::IntegerLiteral,
    K::DecimalLiteral,
    K::DquotaString,
    K::SquotaString,
    K::True,
    K::False,
];

const CONVERTED_TYPES: &[K] = &[
    K::Int,
    K::Integer,
    K::Long,
    K::Float,
    K::Double,
    K::String,
    K::Boolean,
    K::Date,
    K::Time,
    K::Timestamp,
];

// ============ Operator climbing ============

pub(super) trait BinaryOperator: Copy {
    type Operand;

    /// Higher binds tighter. All operators are left-associative.
    fn precedence(self) -> u8;

    fn combine(self, lhs: Self::Operand, rhs: Self::Operand) -> Self::Operand;
}

impl BinaryOperator for ArithOp {
    type Operand = ValueExpr;

    fn precedence(self) -> u8 {
        ArithOp::precedence(self)
    }

    fn combine(self, lhs: ValueExpr, rhs: ValueExpr) -> ValueExpr {
        lhs.binary(self, rhs)
    }
}

impl BinaryOperator for LogicalOp {
    type Operand = LogicalExpr;

    fn precedence(self) -> u8 {
        LogicalOp::precedence(self)
    }

    fn combine(self, lhs: LogicalExpr, rhs: LogicalExpr) -> LogicalExpr {
        lhs.binary(self, rhs)
    }
}

/// Pending `(lhs, op)` pairs waiting for their right operand.
///
/// Invariant: precedences on `pending` strictly increase from bottom to top.
pub(super) struct Climber<O: BinaryOperator> {
    pending: Vec<(O::Operand, O)>,
    current: O::Operand,
}

impl<O: BinaryOperator> Climber<O> {
    pub(super) fn new(first: O::Operand) -> Self {
        Self {
            pending: Vec::new(),
            current: first,
        }
    }

    pub(super) fn push(self, op: O, operand: O::Operand) -> Self {
        let Climber {
            mut pending,
            mut current,
        } = self;
        while let Some((_, top)) = pending.last() {
            if top.precedence() < op.precedence() {
                break;
            }
            let Some((lhs, top)) = pending.pop() else {
                break;
            };
            current = top.combine(lhs, current);
        }
        pending.push((current, op));
        Climber {
            pending,
            current: operand,
        }
    }

    pub(super) fn finish(self) -> O::Operand {
        let Climber {
            mut pending,
            mut current,
        } = self;
        while let Some((lhs, op)) = pending.pop() {
            current = op.combine(lhs, current);
        }
        current
    }
}

/// Whether `kind` can begin a logical operand, for implicit `AND`.
fn starts_logical_operand(kind: K) -> bool {
    matches!(
        kind,
        K::Not
            | K::LtPrths
            | K::Plus
            | K::Minus
            | K::IntegerLiteral
            | K::DecimalLiteral
            | K::DquotaString
            | K::SquotaString
            | K::True
            | K::False
            | K::Interval
            | K::Cast
            | K::Extract
            | K::GetFormat
            | K::Timestampadd
            | K::Timestampdiff
    ) || is_ident_token(kind)
        || kind.is_single_field_relevance_function()
        || kind.is_multi_field_relevance_function()
}

/// Whether `kind` can begin a value expression.
fn starts_value_operand(kind: K) -> bool {
    matches!(
        kind,
        K::LtPrths
            | K::Plus
            | K::Minus
            | K::Dot
            | K::IntegerLiteral
            | K::DecimalLiteral
            | K::DquotaString
            | K::SquotaString
            | K::True
            | K::False
            | K::Interval
            | K::Cast
            | K::Extract
            | K::GetFormat
            | K::Timestampadd
            | K::Timestampdiff
    ) || is_ident_token(kind)
}

impl Parser<'_> {
    // ============ expression ============

    /// `expression : logicalExpression | comparisonExpression | valueExpression`
    ///
    /// Alternatives are tried in that order. One only wins if it stops at a
    /// token in `follow`, so `eval x = a + 1` is a value even though `a`
    /// starts a comparison.
    pub(super) fn expression(&mut self, follow: &[K]) -> PResult<Expression> {
        let mut decision = self.decision("expression");
        if let Some(expr) = self.attempt(&mut decision, |p| {
            let expr = p.memoized(ExprShape::Logical, |p| {
                p.logical_expression().map(Expression::Logical)
            })?;
            p.expect_follow(follow)?;
            Ok(expr)
        })? {
            return Ok(expr);
        }
        if let Some(expr) = self.attempt(&mut decision, |p| {
            let expr = p.memoized(ExprShape::Comparison, |p| {
                p.comparison_expression().map(Expression::Comparison)
            })?;
            p.expect_follow(follow)?;
            Ok(expr)
        })? {
            return Ok(expr);
        }
        if let Some(expr) = self.attempt(&mut decision, |p| {
            let expr = p.memoized(ExprShape::Value, |p| {
                p.value_expression().map(Expression::Value)
            })?;
            p.expect_follow(follow)?;
            Ok(expr)
        })? {
            return Ok(expr);
        }
        Err(decision.exhausted())
    }

    fn expect_follow(&self, follow: &[K]) -> PResult<()> {
        if self.at_any(follow) {
            Ok(())
        } else {
            Err(self.unexpected(follow))
        }
    }

    // ============ Logical ============

    /// `logicalExpression : NOT* primary ((OR | XOR | AND)? NOT* primary)*`
    ///
    /// Juxtaposed operands are joined with `AND`.
    pub(super) fn logical_expression(&mut self) -> PResult<LogicalExpr> {
        let mut climber = Climber::<LogicalOp>::new(self.logical_not()?);
        while let Some(op) = self.logical_operator() {
            let operand = self.logical_not()?;
            climber = climber.push(op, operand);
        }
        Ok(climber.finish())
    }

    fn logical_operator(&mut self) -> Option<LogicalOp> {
        let op = match self.peek_kind() {
            K::Or => LogicalOp::Or,
            K::Xor => LogicalOp::Xor,
            K::And => LogicalOp::And,
            _ if self.starts_implicit_operand() => return Some(LogicalOp::And),
            _ => return None,
        };
        self.bump();
        Some(op)
    }

    fn starts_implicit_operand(&self) -> bool {
        if self.in_search_filter
            && self.at_any(&[K::Source, K::Index])
            && self.nth_kind(1) == K::Equal
        {
            return false;
        }
        starts_logical_operand(self.peek_kind())
            || (self.at(K::Dot) && self.nth_kind(1) == K::Id)
    }

    fn logical_not(&mut self) -> PResult<LogicalExpr> {
        let mut negations = 0usize;
        while self.eat(K::Not) {
            negations += 1;
        }
        let mut expr = self.primary_logical()?;
        for _ in 0..negations {
            expr = expr.not();
        }
        Ok(expr)
    }

    fn primary_logical(&mut self) -> PResult<LogicalExpr> {
        let kind = self.peek_kind();
        let next = self.nth_kind(1);

        if (kind.is_single_field_relevance_function() || kind.is_multi_field_relevance_function())
            && next == K::LtPrths
        {
            return self.relevance_expression().map(LogicalExpr::Relevance);
        }

        if kind == K::LtPrths {
            let mut decision = self.decision("parenthesized expression");
            if let Some(cmp) = self.attempt(&mut decision, |p| p.comparison_expression())? {
                return Ok(LogicalExpr::Comparison(cmp));
            }
            if let Some(expr) = self.attempt(&mut decision, |p| p.parenthesized_logical())? {
                return Ok(expr);
            }
            return Err(decision.exhausted());
        }

        if kind.is_condition_function_name() && next == K::LtPrths {
            let mut decision = self.decision("boolean function");
            if let Some(cmp) = self.attempt(&mut decision, |p| p.comparison_expression())? {
                return Ok(LogicalExpr::Comparison(cmp));
            }
            if let Some(call) = self.attempt(&mut decision, |p| p.function_call())? {
                return Ok(LogicalExpr::Boolean(call));
            }
            return Err(decision.exhausted());
        }

        self.comparison_expression().map(LogicalExpr::Comparison)
    }

    fn parenthesized_logical(&mut self) -> PResult<LogicalExpr> {
        self.expect(K::LtPrths)?;
        let expr = self.nested(|p| p.logical_expression())?;
        self.expect(K::RtPrths)?;
        Ok(expr)
    }

    // ============ Comparison ============

    /// `comparisonExpression : value compareOp value | value IN valueList`
    pub(super) fn comparison_expression(&mut self) -> PResult<ComparisonExpr> {
        let lhs = self.value_expression()?;
        if self.eat(K::In) {
            let values = self.value_list()?;
            return Ok(ComparisonExpr::In(lhs, values));
        }
        let Some(op) = CompareOp::from_token(self.peek_kind()) else {
            return Err(self.unexpected(COMPARISON_OPERATORS));
        };
        self.bump();
        let rhs = self.value_expression()?;
        Ok(ComparisonExpr::Compare(lhs, op, rhs))
    }

    // ============ Value ============

    /// `valueExpression : operand ((* | / | %) operand | (+ | -) operand)*`
    pub(super) fn value_expression(&mut self) -> PResult<ValueExpr> {
        let mut climber = Climber::<ArithOp>::new(self.value_operand()?);
        while let Some(op) = ArithOp::from_token(self.peek_kind()) {
            self.bump();
            let operand = self.value_operand()?;
            climber = climber.push(op, operand);
        }
        Ok(climber.finish())
    }

    fn value_operand(&mut self) -> PResult<ValueExpr> {
        match self.peek_kind() {
            K::LtPrths => {
                self.bump();
                let inner = self.nested(|p| p.value_expression())?;
                self.expect(K::RtPrths)?;
                Ok(inner)
            }
            K::Position if self.nth_kind(1) == K::LtPrths => {
                if self.position_has_in() {
                    self.position_function()
                } else {
                    self.function_call().map(ValueExpr::Function)
                }
            }
            K::Extract => self.extract_function(),
            K::GetFormat => self.get_format_function(),
            K::Timestampadd | K::Timestampdiff => self.timestamp_function(),
            _ => self.primary_expression(),
        }
    }

    /// `primaryExpression : evalFunctionCall | dataTypeFunctionCall
    ///   | fieldExpression | literalValue`
    fn primary_expression(&mut self) -> PResult<ValueExpr> {
        let kind = self.peek_kind();
        let next = self.nth_kind(1);
        if kind.is_eval_function_name() && next == K::LtPrths {
            return self.function_call().map(ValueExpr::Function);
        }
        if kind == K::Cast && next == K::LtPrths {
            return self.cast_expression();
        }
        if self.at_literal_start() {
            return self.literal_value().map(ValueExpr::Literal);
        }
        if self.at_ident() {
            return self.qualified_name().map(ValueExpr::Field);
        }
        Err(self.unexpected(OPERAND_START))
    }

    // ============ Function calls ============

    /// `name ( functionArgs )`
    pub(super) fn function_call(&mut self) -> PResult<FunctionCall> {
        let start = self.offset();
        let name = self.bump().kind;
        let args = self.function_args()?;
        Ok(FunctionCall {
            name,
            args,
            span: self.span_from(start),
        })
    }

    /// `( (functionArg (COMMA functionArg)*)? )`
    pub(super) fn function_args(&mut self) -> PResult<Vec<FunctionArg>> {
        self.expect(K::LtPrths)?;
        let args = self.nested(|p| {
            let mut args = Vec::new();
            if !starts_value_operand(p.peek_kind()) {
                return Ok(args);
            }
            args.push(p.function_arg()?);
            while p.eat(K::Comma) {
                args.push(p.function_arg()?);
            }
            Ok(args)
        })?;
        self.expect(K::RtPrths)?;
        Ok(args)
    }

    /// `functionArg : (ident EQUAL)? valueExpression`
    pub(super) fn function_arg(&mut self) -> PResult<FunctionArg> {
        let name = if is_ident_token(self.peek_kind()) && self.nth_kind(1) == K::Equal {
            let name = self.ident()?;
            self.expect(K::Equal)?;
            Some(name)
        } else {
            None
        };
        let value = self.value_expression()?;
        Ok(FunctionArg { name, value })
    }

    /// `CAST ( expression AS convertedDataType )`
    fn cast_expression(&mut self) -> PResult<ValueExpr> {
        self.bump();
        self.expect(K::LtPrths)?;
        let value = self.nested(|p| p.expression(&[K::As]))?;
        self.expect(K::As)?;
        if !self.peek_kind().is_converted_data_type() {
            return Err(self.unexpected(CONVERTED_TYPES));
        }
        let target = self.bump().kind;
        self.expect(K::RtPrths)?;
        Ok(ValueExpr::Cast(Box::new(CastExpr { value, target })))
    }

    /// True when the parenthesized arguments after `POSITION` contain an
    /// `IN` at their own nesting level. Stops at the matching `)`.
    fn position_has_in(&self) -> bool {
        let mut depth = 0usize;
        for token in self.tokens.iter().skip(self.pos + 2) {
            match token.kind {
                K::LtPrths | K::LtSqrPrths => depth += 1,
                K::RtPrths | K::RtSqrPrths if depth == 0 => return false,
                K::RtPrths | K::RtSqrPrths => depth -= 1,
                K::In if depth == 0 => return true,
                K::Pipe | K::Eof => return false,
                _ => {}
            }
        }
        false
    }

    /// `POSITION ( functionArg IN functionArg )`
    fn position_function(&mut self) -> PResult<ValueExpr> {
        self.bump();
        self.expect(K::LtPrths)?;
        let (needle, haystack) = self.nested(|p| {
            let needle = p.function_arg()?;
            p.expect(K::In)?;
            let haystack = p.function_arg()?;
            Ok((needle, haystack))
        })?;
        self.expect(K::RtPrths)?;
        Ok(ValueExpr::Position(Box::new(needle), Box::new(haystack)))
    }

    /// `EXTRACT ( datetimePart FROM functionArg )`
    fn extract_function(&mut self) -> PResult<ValueExpr> {
        self.bump();
        self.expect(K::LtPrths)?;
        let kind = self.peek_kind();
        if !kind.is_simple_date_time_part() && !kind.is_complex_date_time_part() {
            return Err(self.unexpected(&[K::Microsecond, K::Second, K::Minute, K::Hour, K::Day]));
        }
        let part = self.bump().kind;
        self.expect(K::From)?;
        let source = self.nested(|p| p.function_arg())?;
        self.expect(K::RtPrths)?;
        Ok(ValueExpr::Extract(Box::new(ExtractExpr { part, source })))
    }

    /// `GET_FORMAT ( (DATE | TIME | TIMESTAMP | DATETIME) , functionArg )`
    fn get_format_function(&mut self) -> PResult<ValueExpr> {
        self.bump();
        self.expect(K::LtPrths)?;
        let formats = [K::Date, K::Time, K::Timestamp, K::Datetime];
        if !self.at_any(&formats) {
            return Err(self.unexpected(&formats));
        }
        let kind = self.bump().kind;
        self.expect(K::Comma)?;
        let format = self.nested(|p| p.function_arg())?;
        self.expect(K::RtPrths)?;
        Ok(ValueExpr::GetFormat(Box::new(GetFormatExpr { kind, format })))
    }

    /// `(TIMESTAMPADD | TIMESTAMPDIFF) ( simpleDateTimePart , functionArg , functionArg )`
    fn timestamp_function(&mut self) -> PResult<ValueExpr> {
        let function = self.bump().kind;
        self.expect(K::LtPrths)?;
        if !self.peek_kind().is_simple_date_time_part() {
            return Err(self.unexpected(&[K::Microsecond, K::Second, K::Minute, K::Hour, K::Day]));
        }
        let unit = self.bump().kind;
        self.expect(K::Comma)?;
        let (first, second) = self.nested(|p| {
            let first = p.function_arg()?;
            p.expect(K::Comma)?;
            let second = p.function_arg()?;
            Ok((first, second))
        })?;
        self.expect(K::RtPrths)?;
        Ok(ValueExpr::Timestamp(Box::new(TimestampExpr {
            function,
            unit,
            first,
            second,
        })))
    }

    // ============ Relevance ============

    /// `match(field, query, arg=value, ...)` and the multi-field
    /// `multi_match([f1 ^ 2, f2], query, ...)` forms.
    fn relevance_expression(&mut self) -> PResult<RelevanceExpr> {
        let start = self.offset();
        let function = self.bump().kind;
        self.expect(K::LtPrths)?;
        let (fields, query, args) = self.nested(|p| {
            let fields = if function.is_multi_field_relevance_function() {
                p.expect(K::LtSqrPrths)?;
                let mut fields = vec![p.relevance_field(true)?];
                while p.eat(K::Comma) {
                    fields.push(p.relevance_field(true)?);
                }
                p.expect(K::RtSqrPrths)?;
                fields
            } else {
                vec![p.relevance_field(false)?]
            };
            p.expect(K::Comma)?;
            let query = p.relevance_value()?;
            let mut args = Vec::new();
            while p.eat(K::Comma) {
                args.push(p.relevance_arg()?);
            }
            Ok((fields, query, args))
        })?;
        self.expect(K::RtPrths)?;
        Ok(RelevanceExpr {
            function,
            fields,
            query,
            args,
            span: self.span_from(start),
        })
    }

    /// `(qualifiedName | stringLiteral) (BIT_XOR_OP? weight)?`
    fn relevance_field(&mut self, weighted: bool) -> PResult<RelevanceField> {
        let name = if self.peek_kind().is_string() {
            RelevanceFieldName::String(self.string_literal()?)
        } else {
            RelevanceFieldName::Field(self.qualified_name()?)
        };
        let weight = if !weighted {
            None
        } else if self.eat(K::BitXorOp) || self.at_any(&[K::IntegerLiteral, K::DecimalLiteral]) {
            Some(self.number_literal()?)
        } else {
            None
        };
        Ok(RelevanceField { name, weight })
    }

    fn relevance_value(&mut self) -> PResult<RelevanceValue> {
        if self.at_literal_start() {
            self.literal_value().map(RelevanceValue::Literal)
        } else {
            self.qualified_name().map(RelevanceValue::Field)
        }
    }

    /// `relevanceArgName EQUAL relevanceArgValue`
    fn relevance_arg(&mut self) -> PResult<RelevanceArg> {
        if !self.peek_kind().is_relevance_arg_name() {
            return Err(self.unexpected(&[K::Analyzer, K::Boost, K::Operator, K::Type]));
        }
        let name = self.bump().kind;
        self.expect(K::Equal)?;
        let value = self.relevance_value()?;
        Ok(RelevanceArg { name, value })
    }
}
