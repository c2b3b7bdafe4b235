//! Names, field lists and literals

use super::{PResult, Parser};
use crate::ast::literal::unquote;
use crate::ast::{
    DatetimeKind, DecimalLiteral, Ident, IdentStyle, IntegerLiteral, IntervalLiteral, Literal,
    LiteralError, LiteralValue, QualifiedName, Sign, StringLiteral, TableQualifiedName,
    TableSource,
};
use crate::token::{Token, TokenKind as K};

/// Tokens that can open a literal value, for error messages.
pub(super) const LITERAL_START: &[K] = &[
    K::DquotaString,
    K::SquotaString,
    K::IntegerLiteral,
    K::DecimalLiteral,
    K::True,
    K::False,
    K::Interval,
];

fn starts_wildcard(kind: K) -> bool {
    is_ident_token(kind) || kind.is_string() || kind == K::IdDateSuffix
}

/// `ID`, `` `quoted` `` or a keyword allowed as an identifier.
pub(super) fn is_ident_token(kind: K) -> bool {
    matches!(kind, K::Id | K::BquotaString) || kind.can_be_identifier()
}

impl Parser<'_> {
    pub(super) fn at_ident(&self) -> bool {
        is_ident_token(self.peek_kind()) || (self.at(K::Dot) && self.nth_kind(1) == K::Id)
    }

    /// `ident : DOT? ID | BQUOTA_STRING | keywordsCanBeId`
    pub(super) fn ident(&mut self) -> PResult<Ident> {
        if self.at(K::Dot) && self.nth_kind(1) == K::Id {
            self.bump();
            let token = self.bump();
            return Ok(Ident::new(token.text, IdentStyle::DotPrefixed));
        }
        let kind = self.peek_kind();
        if kind == K::Id {
            return Ok(Ident::bare(self.bump().text));
        }
        if kind == K::BquotaString {
            let token = self.bump();
            return Ok(Ident::new(strip_quotes(&token.text), IdentStyle::Backtick));
        }
        if kind.can_be_identifier() {
            return Ok(Ident::new(self.bump().text, IdentStyle::Keyword));
        }
        Err(self.unexpected(&[K::Id, K::BquotaString]))
    }

    /// `qualifiedName : ident (DOT ident)*`
    pub(super) fn qualified_name(&mut self) -> PResult<QualifiedName> {
        let start = self.offset();
        let first = self.ident()?;
        let mut rest = Vec::new();
        while self.at(K::Dot) && is_ident_token(self.nth_kind(1)) {
            self.bump();
            rest.push(self.ident()?);
        }
        Ok(QualifiedName::new(first, rest, self.span_from(start)))
    }

    /// `wcQualifiedName : wildcard (DOT wildcard)*`
    pub(super) fn wc_qualified_name(&mut self) -> PResult<QualifiedName> {
        let start = self.offset();
        let mut segments = Vec::new();
        self.wildcard(&mut segments)?;
        while self.at(K::Dot) && starts_wildcard(self.nth_kind(1)) {
            self.bump();
            self.wildcard(&mut segments)?;
        }
        let mut segments = segments.into_iter();
        match segments.next() {
            Some(first) => Ok(QualifiedName::new(
                first,
                segments.collect(),
                self.span_from(start),
            )),
            None => Err(self.unexpected(&[K::Id, K::BquotaString])),
        }
    }

    /// `wildcard : ident (% ident)* %? | "quoted"`
    ///
    /// String tokens name a field verbatim, so `"a.b"` is a single segment.
    /// `request.*` lexes as one date-suffixed token and is split back into
    /// its dotted segments here.
    fn wildcard(&mut self, segments: &mut Vec<Ident>) -> PResult<()> {
        if self.peek_kind().is_string() {
            let token = self.bump();
            let body = strip_quotes(&token.text);
            let quote = token.text.chars().next().unwrap_or('"');
            let text = unquote(&body, quote).unwrap_or(body);
            segments.push(Ident::new(text, IdentStyle::Quoted));
            return Ok(());
        }
        if self.at(K::IdDateSuffix) {
            let token = self.bump();
            segments.extend(token.text.split('.').map(Ident::bare));
            return Ok(());
        }
        let mut ident = self.ident()?;
        while self.at(K::Module) {
            self.bump();
            ident.text.push('%');
            if is_ident_token(self.peek_kind()) {
                let next = self.ident()?;
                ident.text.push_str(&next.text);
            } else {
                break;
            }
        }
        segments.push(ident);
        Ok(())
    }

    /// `tableSource : tableQualifiedName | ID_DATE_SUFFIX`
    pub(super) fn table_source(&mut self) -> PResult<TableSource> {
        if self.at(K::IdDateSuffix) {
            let token = self.bump();
            return Ok(TableSource::DateSuffix {
                text: token.text,
                span: token.span,
            });
        }
        let cluster = if self.at(K::Cluster) {
            let token = self.bump();
            Some(token.text.trim_end_matches(':').to_string())
        } else {
            None
        };
        if !self.at_ident() {
            return Err(self.unexpected(&[K::Id, K::Cluster, K::IdDateSuffix, K::BquotaString]));
        }
        let name = self.qualified_name()?;
        Ok(TableSource::Name(TableQualifiedName { cluster, name }))
    }

    /// `tableSourceClause : tableSource (COMMA tableSource)*`
    pub(super) fn table_source_clause(&mut self) -> PResult<Vec<TableSource>> {
        let mut tables = vec![self.table_source()?];
        while self.eat(K::Comma) {
            tables.push(self.table_source()?);
        }
        Ok(tables)
    }

    /// `fieldList : fieldExpression (COMMA fieldExpression)*`
    pub(super) fn field_list(&mut self) -> PResult<Vec<QualifiedName>> {
        self.with_sync(&[K::Comma], |p| {
            let mut fields = vec![p.qualified_name()?];
            while p.eat(K::Comma) {
                fields.push(p.qualified_name()?);
            }
            Ok(fields)
        })
    }

    /// `wcFieldList : wcFieldExpression (COMMA wcFieldExpression)*`
    pub(super) fn wc_field_list(&mut self) -> PResult<Vec<QualifiedName>> {
        self.with_sync(&[K::Comma], |p| {
            let mut fields = vec![p.wc_qualified_name()?];
            while p.eat(K::Comma) {
                fields.push(p.wc_qualified_name()?);
            }
            Ok(fields)
        })
    }

    // ============ Literals ============

    fn literal_error(&self, token: &Token, err: LiteralError) -> super::SyntaxError {
        self.error_at(token.span.start, err.to_string(), &[])
    }

    pub(super) fn string_literal(&mut self) -> PResult<StringLiteral> {
        if !self.peek_kind().is_string() {
            return Err(self.unexpected(&[K::DquotaString, K::SquotaString]));
        }
        let token = self.bump();
        StringLiteral::from_raw(token.text.as_str()).map_err(|e| self.literal_error(&token, e))
    }

    /// Consume a `+`/`-` only when it directly precedes a number of `kind`.
    fn sign_before(&mut self, kind: K) -> Option<Sign> {
        let sign = Sign::from_token(self.peek_kind())?;
        if self.nth_kind(1) != kind {
            return None;
        }
        self.bump();
        Some(sign)
    }

    /// `integerLiteral : (PLUS | MINUS)? INTEGER_LITERAL`
    pub(super) fn integer_literal(&mut self) -> PResult<IntegerLiteral> {
        let sign = self.sign_before(K::IntegerLiteral);
        if !self.at(K::IntegerLiteral) {
            return Err(self.unexpected(&[K::IntegerLiteral]));
        }
        let token = self.bump();
        IntegerLiteral::new(sign, token.text.as_str()).map_err(|e| self.literal_error(&token, e))
    }

    /// `decimalLiteral : (PLUS | MINUS)? DECIMAL_LITERAL`
    pub(super) fn decimal_literal(&mut self) -> PResult<DecimalLiteral> {
        let sign = self.sign_before(K::DecimalLiteral);
        if !self.at(K::DecimalLiteral) {
            return Err(self.unexpected(&[K::DecimalLiteral]));
        }
        let token = self.bump();
        DecimalLiteral::new(sign, token.text.as_str()).map_err(|e| self.literal_error(&token, e))
    }

    pub(super) fn boolean_literal(&mut self) -> PResult<bool> {
        if self.eat(K::True) {
            Ok(true)
        } else if self.eat(K::False) {
            Ok(false)
        } else {
            Err(self.unexpected(&[K::True, K::False]))
        }
    }

    /// Signed integer or decimal, as a literal node.
    pub(super) fn number_literal(&mut self) -> PResult<Literal> {
        let start = self.offset();
        let is_decimal = self.at(K::DecimalLiteral)
            || (Sign::from_token(self.peek_kind()).is_some() && self.nth_kind(1) == K::DecimalLiteral);
        let value = if is_decimal {
            LiteralValue::Decimal(self.decimal_literal()?)
        } else {
            LiteralValue::Integer(self.integer_literal()?)
        };
        Ok(Literal::new(value, self.span_from(start)))
    }

    pub(super) fn at_literal_start(&self) -> bool {
        let kind = self.peek_kind();
        let next = self.nth_kind(1);
        match kind {
            K::Interval
            | K::DquotaString
            | K::SquotaString
            | K::IntegerLiteral
            | K::DecimalLiteral
            | K::True
            | K::False => true,
            K::Plus | K::Minus => matches!(next, K::IntegerLiteral | K::DecimalLiteral),
            K::Date | K::Time | K::Timestamp => next.is_string(),
            _ => false,
        }
    }

    /// `literalValue : intervalLiteral | stringLiteral | integerLiteral
    ///   | decimalLiteral | booleanLiteral | datetimeLiteral`
    pub(super) fn literal_value(&mut self) -> PResult<Literal> {
        let start = self.offset();
        let kind = self.peek_kind();
        let next = self.nth_kind(1);
        let value = match kind {
            K::Interval => {
                self.bump();
                let value = self.nested(|p| p.value_expression())?;
                if !self.peek_kind().is_interval_unit() {
                    return Err(self.unexpected(&[K::Day, K::Hour, K::Minute, K::Second]));
                }
                let unit = self.bump().kind;
                LiteralValue::Interval(IntervalLiteral {
                    value: Box::new(value),
                    unit,
                })
            }
            K::DquotaString | K::SquotaString => LiteralValue::String(self.string_literal()?),
            K::True | K::False => LiteralValue::Boolean(self.boolean_literal()?),
            K::Date | K::Time | K::Timestamp if next.is_string() => {
                self.bump();
                let datetime = DatetimeKind::from_token(kind).unwrap_or(DatetimeKind::Timestamp);
                LiteralValue::Datetime(datetime, self.string_literal()?)
            }
            K::IntegerLiteral | K::DecimalLiteral => return self.number_literal(),
            K::Plus | K::Minus if matches!(next, K::IntegerLiteral | K::DecimalLiteral) => {
                return self.number_literal();
            }
            _ => return Err(self.unexpected(LITERAL_START)),
        };
        Ok(Literal::new(value, self.span_from(start)))
    }

    /// `valueList : ( literalValue (COMMA literalValue)* )`
    pub(super) fn value_list(&mut self) -> PResult<Vec<Literal>> {
        self.expect(K::LtPrths)?;
        let values = self.nested(|p| {
            let mut values = vec![p.literal_value()?];
            while p.eat(K::Comma) {
                values.push(p.literal_value()?);
            }
            Ok(values)
        })?;
        self.expect(K::RtPrths)?;
        Ok(values)
    }
}

/// Drop the first and last character of a quoted token.
fn strip_quotes(text: &str) -> String {
    let mut chars = text.chars();
    chars.next();
    chars.next_back();
    chars.as_str().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lex::tokenize;
    use crate::options::ParseOptions;

    fn with_parser<T>(input: &str, f: impl FnOnce(&mut Parser<'_>) -> T) -> T {
        let options = ParseOptions::strict();
        let tokens = tokenize(input);
        let mut parser = Parser::new(input, tokens, &options);
        f(&mut parser)
    }

    #[test]
    fn dotted_and_quoted_names() {
        let name = with_parser("a.`b.c`.count", |p| p.qualified_name()).unwrap();
        let texts: Vec<_> = name.segments().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, ["a", "b.c", "count"]);
        let styles: Vec<_> = name.segments().map(|s| s.style).collect();
        assert_eq!(
            styles,
            [IdentStyle::Bare, IdentStyle::Backtick, IdentStyle::Keyword]
        );
    }

    #[test]
    fn dot_prefixed_first_segment() {
        let name = with_parser(".a.b", |p| p.qualified_name()).unwrap();
        assert_eq!(name.first().style, IdentStyle::DotPrefixed);
        assert_eq!(name.joined(), "a.b");
    }

    #[test]
    fn reserved_keyword_is_not_a_name() {
        assert!(with_parser("and", |p| p.qualified_name()).is_err());
    }

    #[test]
    fn wildcard_segments() {
        let name = with_parser("a%b%", |p| p.wc_qualified_name()).unwrap();
        assert_eq!(name.first().text, "a%b%");
        assert!(name.is_wildcard());

        let name = with_parser(r#""field.name""#, |p| p.wc_qualified_name()).unwrap();
        assert_eq!(name.len(), 1);
        assert_eq!(name.first().text, "field.name");
        assert_eq!(name.first().style, IdentStyle::Quoted);
    }

    #[test]
    fn star_suffix_splits_into_segments() {
        let name = with_parser("request.*", |p| p.wc_qualified_name()).unwrap();
        let texts: Vec<&str> = name.segments().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, ["request", "*"]);
        assert!(name.is_wildcard());

        let name = with_parser("a.headers.*", |p| p.wc_qualified_name()).unwrap();
        assert_eq!(name.joined(), "a.headers.*");
        assert_eq!(name.len(), 3);
    }

    #[test]
    fn cluster_and_date_suffix_sources() {
        let source = with_parser("remote:logs", |p| p.table_source()).unwrap();
        let TableSource::Name(table) = source else {
            panic!("expected table name");
        };
        assert_eq!(table.cluster.as_deref(), Some("remote"));
        assert_eq!(table.name.joined(), "logs");

        let source = with_parser("logs-2021.01.*", |p| p.table_source()).unwrap();
        assert!(matches!(source, TableSource::DateSuffix { ref text, .. } if text == "logs-2021.01.*"));
    }

    #[test]
    fn signed_numbers() {
        let lit = with_parser("-42", |p| p.literal_value()).unwrap();
        let LiteralValue::Integer(n) = lit.value else {
            panic!("expected integer");
        };
        assert_eq!(n.to_i64(), Ok(-42));

        let lit = with_parser("+.5", |p| p.literal_value()).unwrap();
        assert!(matches!(lit.value, LiteralValue::Decimal(ref d) if d.lexeme() == ".5"));
        assert_eq!(lit.span.len(), 3);
    }

    #[test]
    fn datetime_and_interval_literals() {
        let lit = with_parser("DATE '2020-01-01'", |p| p.literal_value()).unwrap();
        assert!(matches!(
            lit.value,
            LiteralValue::Datetime(DatetimeKind::Date, ref s) if s.value() == "2020-01-01"
        ));

        let lit = with_parser("interval 1 day", |p| p.literal_value()).unwrap();
        assert!(matches!(
            lit.value,
            LiteralValue::Interval(ref i) if i.unit == K::Day
        ));
    }
}
