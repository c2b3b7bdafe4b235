//! Token types for PPL
//!
//! Every token carries its kind, the raw source slice it was lexed from, and
//! its byte span plus 1-based line/column. Keywords are their own variants so
//! the parser can dispatch on them directly.

use serde::Serialize;
use std::fmt;

/// Byte range into the query text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Empty span at `offset`.
    pub fn at(offset: usize) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    /// Raw source text, quotes included for quoted tokens.
    pub text: String,
    pub span: Span,
    pub line: u32,
    pub column: u32,
}

impl Token {
    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

macro_rules! token_kinds {
    (
        keywords { $($kw:ident => $kw_text:literal,)* }
        symbols { $($sym:ident ($sym_name:literal) => $sym_text:literal,)* }
        classes { $($class:ident => $class_name:literal,)* }
    ) => {
        /// Token discriminant.
        ///
        /// Organized as keywords (matched case-insensitively), operator and
        /// punctuation symbols, then literal classes and the special kinds.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        #[serde(into = "&'static str")]
        pub enum TokenKind {
            $($kw,)*
            $($sym,)*
            $($class,)*
        }

        impl TokenKind {
            /// Case-insensitive keyword lookup.
            pub fn keyword(word: &str) -> Option<TokenKind> {
                match word.to_ascii_uppercase().as_str() {
                    $($kw_text => Some(TokenKind::$kw),)*
                    _ => None,
                }
            }

            /// Fixed symbol lookup (`"<="` → `NotGreater`).
            pub fn symbol(text: &str) -> Option<TokenKind> {
                match text {
                    $($sym_text => Some(TokenKind::$sym),)*
                    _ => None,
                }
            }

            /// Symbolic grammar name: `SEARCH`, `PIPE`, `DQUOTA_STRING`.
            pub fn name(self) -> &'static str {
                match self {
                    $(TokenKind::$kw => $kw_text,)*
                    $(TokenKind::$sym => $sym_name,)*
                    $(TokenKind::$class => $class_name,)*
                }
            }

            /// Spelling for diagnostics: `'search'`, `'|'`, `ID`, `<EOF>`.
            pub fn display(self) -> String {
                if self == TokenKind::Eof {
                    return "<EOF>".to_string();
                }
                match self {
                    $(TokenKind::$kw => format!("'{}'", $kw_text.to_ascii_lowercase()),)*
                    $(TokenKind::$sym => format!("'{}'", $sym_text),)*
                    $(TokenKind::$class => $class_name.to_string(),)*
                }
            }

            pub fn is_keyword(self) -> bool {
                matches!(self, $(TokenKind::$kw)|*)
            }

            pub fn is_symbol(self) -> bool {
                matches!(self, $(TokenKind::$sym)|*)
            }
        }
    };
}

token_kinds! {
    keywords {
        // commands
        Search => "SEARCH",
        Describe => "DESCRIBE",
        Show => "SHOW",
        From => "FROM",
        Where => "WHERE",
        Fields => "FIELDS",
        Rename => "RENAME",
        Stats => "STATS",
        Dedup => "DEDUP",
        Sort => "SORT",
        Eval => "EVAL",
        Head => "HEAD",
        Top => "TOP",
        Rare => "RARE",
        Parse => "PARSE",
        Method => "METHOD",
        Regex => "REGEX",
        Punct => "PUNCT",
        Grok => "GROK",
        Pattern => "PATTERN",
        Patterns => "PATTERNS",
        NewField => "NEW_FIELD",
        Kmeans => "KMEANS",
        Ad => "AD",
        Ml => "ML",

        // command assist
        As => "AS",
        By => "BY",
        Source => "SOURCE",
        Index => "INDEX",
        D => "D",
        Desc => "DESC",
        Datasources => "DATASOURCES",
        Sortby => "SORTBY",

        // sort field casts
        Auto => "AUTO",
        Str => "STR",
        Ip => "IP",
        Num => "NUM",

        // command arguments
        Keepempty => "KEEPEMPTY",
        Consecutive => "CONSECUTIVE",
        DedupSplitvalues => "DEDUP_SPLITVALUES",
        Partitions => "PARTITIONS",
        Allnum => "ALLNUM",
        Delim => "DELIM",
        Centroids => "CENTROIDS",
        Iterations => "ITERATIONS",
        DistanceType => "DISTANCE_TYPE",
        NumberOfTrees => "NUMBER_OF_TREES",
        ShingleSize => "SHINGLE_SIZE",
        SampleSize => "SAMPLE_SIZE",
        OutputAfter => "OUTPUT_AFTER",
        TimeDecay => "TIME_DECAY",
        AnomalyRate => "ANOMALY_RATE",
        CategoryField => "CATEGORY_FIELD",
        TimeField => "TIME_FIELD",
        TimeZone => "TIME_ZONE",
        TrainingDataSize => "TRAINING_DATA_SIZE",
        AnomalyScoreThreshold => "ANOMALY_SCORE_THRESHOLD",

        // comparison / logical
        Case => "CASE",
        In => "IN",
        Not => "NOT",
        Or => "OR",
        And => "AND",
        Xor => "XOR",
        True => "TRUE",
        False => "FALSE",
        Regexp => "REGEXP",

        // datetime parts and units
        ConvertTz => "CONVERT_TZ",
        Datetime => "DATETIME",
        Day => "DAY",
        DayHour => "DAY_HOUR",
        DayMicrosecond => "DAY_MICROSECOND",
        DayMinute => "DAY_MINUTE",
        DayOfYear => "DAY_OF_YEAR",
        DaySecond => "DAY_SECOND",
        Hour => "HOUR",
        HourMicrosecond => "HOUR_MICROSECOND",
        HourMinute => "HOUR_MINUTE",
        HourOfDay => "HOUR_OF_DAY",
        HourSecond => "HOUR_SECOND",
        Interval => "INTERVAL",
        Microsecond => "MICROSECOND",
        Millisecond => "MILLISECOND",
        Minute => "MINUTE",
        MinuteMicrosecond => "MINUTE_MICROSECOND",
        MinuteOfDay => "MINUTE_OF_DAY",
        MinuteOfHour => "MINUTE_OF_HOUR",
        MinuteSecond => "MINUTE_SECOND",
        Month => "MONTH",
        MonthOfYear => "MONTH_OF_YEAR",
        Quarter => "QUARTER",
        Second => "SECOND",
        SecondMicrosecond => "SECOND_MICROSECOND",
        SecondOfMinute => "SECOND_OF_MINUTE",
        Week => "WEEK",
        WeekOfYear => "WEEK_OF_YEAR",
        Year => "YEAR",
        YearMonth => "YEAR_MONTH",

        // dataset types
        Datamodel => "DATAMODEL",
        Lookup => "LOOKUP",
        Savedsearch => "SAVEDSEARCH",

        // cast targets
        Int => "INT",
        Integer => "INTEGER",
        Double => "DOUBLE",
        Long => "LONG",
        Float => "FLOAT",
        String => "STRING",
        Boolean => "BOOLEAN",

        // aggregations
        Avg => "AVG",
        Count => "COUNT",
        DistinctCount => "DISTINCT_COUNT",
        Estdc => "ESTDC",
        EstdcError => "ESTDC_ERROR",
        Max => "MAX",
        Mean => "MEAN",
        Median => "MEDIAN",
        Min => "MIN",
        Mode => "MODE",
        Range => "RANGE",
        Stdev => "STDEV",
        Stdevp => "STDEVP",
        Sum => "SUM",
        Sumsq => "SUMSQ",
        VarSamp => "VAR_SAMP",
        VarPop => "VAR_POP",
        StddevSamp => "STDDEV_SAMP",
        StddevPop => "STDDEV_POP",
        Percentile => "PERCENTILE",
        Take => "TAKE",
        First => "FIRST",
        Last => "LAST",
        List => "LIST",
        Values => "VALUES",
        Earliest => "EARLIEST",
        EarliestTime => "EARLIEST_TIME",
        Latest => "LATEST",
        LatestTime => "LATEST_TIME",
        PerDay => "PER_DAY",
        PerHour => "PER_HOUR",
        PerMinute => "PER_MINUTE",
        PerSecond => "PER_SECOND",
        Rate => "RATE",
        Sparkline => "SPARKLINE",
        C => "C",
        Dc => "DC",

        // math
        Abs => "ABS",
        Cbrt => "CBRT",
        Ceil => "CEIL",
        Ceiling => "CEILING",
        Conv => "CONV",
        Crc32 => "CRC32",
        E => "E",
        Exp => "EXP",
        Floor => "FLOOR",
        Ln => "LN",
        Log => "LOG",
        Log10 => "LOG10",
        Log2 => "LOG2",
        Mod => "MOD",
        Pi => "PI",
        Position => "POSITION",
        Pow => "POW",
        Power => "POWER",
        Rand => "RAND",
        Round => "ROUND",
        Sign => "SIGN",
        Sqrt => "SQRT",
        Truncate => "TRUNCATE",

        // trigonometry
        Acos => "ACOS",
        Asin => "ASIN",
        Atan => "ATAN",
        Atan2 => "ATAN2",
        Cos => "COS",
        Cot => "COT",
        Degrees => "DEGREES",
        Radians => "RADIANS",
        Sin => "SIN",
        Tan => "TAN",

        // date and time functions
        Adddate => "ADDDATE",
        Addtime => "ADDTIME",
        Curdate => "CURDATE",
        CurrentDate => "CURRENT_DATE",
        CurrentTime => "CURRENT_TIME",
        CurrentTimestamp => "CURRENT_TIMESTAMP",
        Curtime => "CURTIME",
        Date => "DATE",
        Datediff => "DATEDIFF",
        DateAdd => "DATE_ADD",
        DateFormat => "DATE_FORMAT",
        DateSub => "DATE_SUB",
        Dayname => "DAYNAME",
        Dayofmonth => "DAYOFMONTH",
        Dayofweek => "DAYOFWEEK",
        Dayofyear => "DAYOFYEAR",
        DayOfMonth => "DAY_OF_MONTH",
        DayOfWeek => "DAY_OF_WEEK",
        Extract => "EXTRACT",
        FromDays => "FROM_DAYS",
        FromUnixtime => "FROM_UNIXTIME",
        GetFormat => "GET_FORMAT",
        LastDay => "LAST_DAY",
        Localtime => "LOCALTIME",
        Localtimestamp => "LOCALTIMESTAMP",
        Makedate => "MAKEDATE",
        Maketime => "MAKETIME",
        Monthname => "MONTHNAME",
        Now => "NOW",
        PeriodAdd => "PERIOD_ADD",
        PeriodDiff => "PERIOD_DIFF",
        SecToTime => "SEC_TO_TIME",
        StrToDate => "STR_TO_DATE",
        Subdate => "SUBDATE",
        Subtime => "SUBTIME",
        Sysdate => "SYSDATE",
        Time => "TIME",
        Timediff => "TIMEDIFF",
        Timestamp => "TIMESTAMP",
        Timestampadd => "TIMESTAMPADD",
        Timestampdiff => "TIMESTAMPDIFF",
        TimeFormat => "TIME_FORMAT",
        TimeToSec => "TIME_TO_SEC",
        ToDays => "TO_DAYS",
        ToSeconds => "TO_SECONDS",
        UnixTimestamp => "UNIX_TIMESTAMP",
        UtcDate => "UTC_DATE",
        UtcTime => "UTC_TIME",
        UtcTimestamp => "UTC_TIMESTAMP",
        Weekday => "WEEKDAY",
        Yearweek => "YEARWEEK",

        // text
        Substr => "SUBSTR",
        Substring => "SUBSTRING",
        Ltrim => "LTRIM",
        Rtrim => "RTRIM",
        Trim => "TRIM",
        To => "TO",
        Lower => "LOWER",
        Upper => "UPPER",
        Concat => "CONCAT",
        ConcatWs => "CONCAT_WS",
        Length => "LENGTH",
        Strcmp => "STRCMP",
        Right => "RIGHT",
        Left => "LEFT",
        Ascii => "ASCII",
        Locate => "LOCATE",
        Replace => "REPLACE",
        Reverse => "REVERSE",
        Cast => "CAST",

        // conditions and flow control
        Like => "LIKE",
        Isnull => "ISNULL",
        Isnotnull => "ISNOTNULL",
        Ifnull => "IFNULL",
        Nullif => "NULLIF",
        If => "IF",
        Typeof => "TYPEOF",

        // relevance functions
        Match => "MATCH",
        MatchPhrase => "MATCH_PHRASE",
        MatchPhrasePrefix => "MATCH_PHRASE_PREFIX",
        MatchBoolPrefix => "MATCH_BOOL_PREFIX",
        SimpleQueryString => "SIMPLE_QUERY_STRING",
        MultiMatch => "MULTI_MATCH",
        QueryString => "QUERY_STRING",

        // relevance parameters
        AllowLeadingWildcard => "ALLOW_LEADING_WILDCARD",
        AnalyzeWildcard => "ANALYZE_WILDCARD",
        Analyzer => "ANALYZER",
        AutoGenerateSynonymsPhraseQuery => "AUTO_GENERATE_SYNONYMS_PHRASE_QUERY",
        Boost => "BOOST",
        CutoffFrequency => "CUTOFF_FREQUENCY",
        DefaultField => "DEFAULT_FIELD",
        DefaultOperator => "DEFAULT_OPERATOR",
        EnablePositionIncrements => "ENABLE_POSITION_INCREMENTS",
        Escape => "ESCAPE",
        Flags => "FLAGS",
        FuzzyMaxExpansions => "FUZZY_MAX_EXPANSIONS",
        FuzzyPrefixLength => "FUZZY_PREFIX_LENGTH",
        FuzzyTranspositions => "FUZZY_TRANSPOSITIONS",
        FuzzyRewrite => "FUZZY_REWRITE",
        Fuzziness => "FUZZINESS",
        Lenient => "LENIENT",
        LowFreqOperator => "LOW_FREQ_OPERATOR",
        MaxDeterminizedStates => "MAX_DETERMINIZED_STATES",
        MaxExpansions => "MAX_EXPANSIONS",
        MinimumShouldMatch => "MINIMUM_SHOULD_MATCH",
        Operator => "OPERATOR",
        PhraseSlop => "PHRASE_SLOP",
        PrefixLength => "PREFIX_LENGTH",
        QuoteAnalyzer => "QUOTE_ANALYZER",
        QuoteFieldSuffix => "QUOTE_FIELD_SUFFIX",
        Rewrite => "REWRITE",
        Slop => "SLOP",
        TieBreaker => "TIE_BREAKER",
        Type => "TYPE",
        ZeroTermsQuery => "ZERO_TERMS_QUERY",

        // span units
        Span => "SPAN",
        Ms => "MS",
        S => "S",
        M => "M",
        H => "H",
        W => "W",
        Q => "Q",
        Y => "Y",
    }
    symbols {
        NotGreater ("NOT_GREATER") => "<=",
        NotLess ("NOT_LESS") => ">=",
        NotEqual ("NOT_EQUAL") => "!=",
        Pipe ("PIPE") => "|",
        Comma ("COMMA") => ",",
        Dot ("DOT") => ".",
        Equal ("EQUAL") => "=",
        Greater ("GREATER") => ">",
        Less ("LESS") => "<",
        Plus ("PLUS") => "+",
        Minus ("MINUS") => "-",
        Star ("STAR") => "*",
        Divide ("DIVIDE") => "/",
        Module ("MODULE") => "%",
        ExclamationSymbol ("EXCLAMATION_SYMBOL") => "!",
        Colon ("COLON") => ":",
        LtPrths ("LT_PRTHS") => "(",
        RtPrths ("RT_PRTHS") => ")",
        LtSqrPrths ("LT_SQR_PRTHS") => "[",
        RtSqrPrths ("RT_SQR_PRTHS") => "]",
        SingleQuote ("SINGLE_QUOTE") => "'",
        DoubleQuote ("DOUBLE_QUOTE") => "\"",
        Backtick ("BACKTICK") => "`",
        BitNotOp ("BIT_NOT_OP") => "~",
        BitAndOp ("BIT_AND_OP") => "&",
        BitXorOp ("BIT_XOR_OP") => "^",
    }
    classes {
        Id => "ID",
        Cluster => "CLUSTER",
        IntegerLiteral => "INTEGER_LITERAL",
        DecimalLiteral => "DECIMAL_LITERAL",
        IdDateSuffix => "ID_DATE_SUFFIX",
        DquotaString => "DQUOTA_STRING",
        SquotaString => "SQUOTA_STRING",
        BquotaString => "BQUOTA_STRING",
        ErrorRecognition => "ERROR_RECOGNITION",
        Eof => "EOF",
    }
}

impl From<TokenKind> for &'static str {
    fn from(kind: TokenKind) -> Self {
        kind.name()
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

// ============ Keyword classes ============
//
// These mirror the grammar's name rules (statsFunctionName, evalFunctionName,
// keywordsCanBeId, ...). The parser consults them for O(1) dispatch.

impl TokenKind {
    pub fn is_string(self) -> bool {
        matches!(self, TokenKind::DquotaString | TokenKind::SquotaString)
    }

    pub fn is_stats_function_name(self) -> bool {
        use TokenKind as K;
        matches!(
            self,
            K::Avg
                | K::Count
                | K::Sum
                | K::Min
                | K::Max
                | K::VarSamp
                | K::VarPop
                | K::StddevSamp
                | K::StddevPop
        )
    }

    pub fn is_trigonometric_function_name(self) -> bool {
        use TokenKind as K;
        matches!(
            self,
            K::Acos
                | K::Asin
                | K::Atan
                | K::Atan2
                | K::Cos
                | K::Cot
                | K::Degrees
                | K::Radians
                | K::Sin
                | K::Tan
        )
    }

    pub fn is_mathematical_function_name(self) -> bool {
        use TokenKind as K;
        matches!(
            self,
            K::Abs
                | K::Cbrt
                | K::Ceil
                | K::Ceiling
                | K::Conv
                | K::Crc32
                | K::E
                | K::Exp
                | K::Floor
                | K::Ln
                | K::Log
                | K::Log10
                | K::Log2
                | K::Mod
                | K::Pi
                | K::Pow
                | K::Power
                | K::Rand
                | K::Round
                | K::Sign
                | K::Sqrt
                | K::Truncate
        ) || self.is_trigonometric_function_name()
    }

    pub fn is_date_time_function_name(self) -> bool {
        use TokenKind as K;
        matches!(
            self,
            K::Adddate
                | K::Addtime
                | K::ConvertTz
                | K::Curdate
                | K::CurrentDate
                | K::CurrentTime
                | K::CurrentTimestamp
                | K::Curtime
                | K::Date
                | K::Datediff
                | K::Datetime
                | K::DateAdd
                | K::DateFormat
                | K::DateSub
                | K::Day
                | K::Dayname
                | K::Dayofmonth
                | K::Dayofweek
                | K::Dayofyear
                | K::DayOfMonth
                | K::DayOfWeek
                | K::DayOfYear
                | K::FromDays
                | K::FromUnixtime
                | K::Hour
                | K::HourOfDay
                | K::LastDay
                | K::Localtime
                | K::Localtimestamp
                | K::Makedate
                | K::Maketime
                | K::Microsecond
                | K::Minute
                | K::MinuteOfDay
                | K::MinuteOfHour
                | K::Month
                | K::Monthname
                | K::MonthOfYear
                | K::Now
                | K::PeriodAdd
                | K::PeriodDiff
                | K::Quarter
                | K::Second
                | K::SecondOfMinute
                | K::SecToTime
                | K::StrToDate
                | K::Subdate
                | K::Subtime
                | K::Sysdate
                | K::Time
                | K::Timediff
                | K::Timestamp
                | K::TimeFormat
                | K::TimeToSec
                | K::ToDays
                | K::ToSeconds
                | K::UnixTimestamp
                | K::UtcDate
                | K::UtcTime
                | K::UtcTimestamp
                | K::Week
                | K::Weekday
                | K::WeekOfYear
                | K::Year
                | K::Yearweek
        )
    }

    pub fn is_text_function_name(self) -> bool {
        use TokenKind as K;
        matches!(
            self,
            K::Substr
                | K::Substring
                | K::Trim
                | K::Ltrim
                | K::Rtrim
                | K::Lower
                | K::Upper
                | K::Concat
                | K::ConcatWs
                | K::Length
                | K::Strcmp
                | K::Right
                | K::Left
                | K::Ascii
                | K::Locate
                | K::Replace
                | K::Reverse
        )
    }

    pub fn is_condition_function_name(self) -> bool {
        use TokenKind as K;
        matches!(
            self,
            K::Like | K::If | K::Isnull | K::Isnotnull | K::Ifnull | K::Nullif
        )
    }

    pub fn is_system_function_name(self) -> bool {
        self == TokenKind::Typeof
    }

    pub fn is_eval_function_name(self) -> bool {
        self.is_mathematical_function_name()
            || self.is_date_time_function_name()
            || self.is_text_function_name()
            || self.is_condition_function_name()
            || self.is_system_function_name()
            || self == TokenKind::Position
    }

    pub fn is_single_field_relevance_function(self) -> bool {
        use TokenKind as K;
        matches!(
            self,
            K::Match | K::MatchPhrase | K::MatchBoolPrefix | K::MatchPhrasePrefix
        )
    }

    pub fn is_multi_field_relevance_function(self) -> bool {
        use TokenKind as K;
        matches!(self, K::SimpleQueryString | K::MultiMatch | K::QueryString)
    }

    pub fn is_relevance_arg_name(self) -> bool {
        use TokenKind as K;
        matches!(
            self,
            K::AllowLeadingWildcard
                | K::AnalyzeWildcard
                | K::Analyzer
                | K::AutoGenerateSynonymsPhraseQuery
                | K::Boost
                | K::CutoffFrequency
                | K::DefaultField
                | K::DefaultOperator
                | K::EnablePositionIncrements
                | K::Escape
                | K::Flags
                | K::FuzzyMaxExpansions
                | K::FuzzyPrefixLength
                | K::FuzzyTranspositions
                | K::FuzzyRewrite
                | K::Fuzziness
                | K::Lenient
                | K::LowFreqOperator
                | K::MaxDeterminizedStates
                | K::MaxExpansions
                | K::MinimumShouldMatch
                | K::Operator
                | K::PhraseSlop
                | K::PrefixLength
                | K::QuoteAnalyzer
                | K::QuoteFieldSuffix
                | K::Rewrite
                | K::Slop
                | K::TieBreaker
                | K::TimeZone
                | K::Type
                | K::ZeroTermsQuery
        )
    }

    pub fn is_simple_date_time_part(self) -> bool {
        use TokenKind as K;
        matches!(
            self,
            K::Microsecond
                | K::Second
                | K::Minute
                | K::Hour
                | K::Day
                | K::Week
                | K::Month
                | K::Quarter
                | K::Year
        )
    }

    pub fn is_complex_date_time_part(self) -> bool {
        use TokenKind as K;
        matches!(
            self,
            K::SecondMicrosecond
                | K::MinuteMicrosecond
                | K::MinuteSecond
                | K::HourMicrosecond
                | K::HourSecond
                | K::HourMinute
                | K::DayMicrosecond
                | K::DaySecond
                | K::DayMinute
                | K::DayHour
                | K::YearMonth
        )
    }

    pub fn is_interval_unit(self) -> bool {
        self.is_simple_date_time_part() || self.is_complex_date_time_part()
    }

    pub fn is_timespan_unit(self) -> bool {
        use TokenKind as K;
        matches!(
            self,
            K::Ms
                | K::S
                | K::M
                | K::H
                | K::D
                | K::W
                | K::Q
                | K::Y
                | K::Millisecond
                | K::Second
                | K::Minute
                | K::Hour
                | K::Day
                | K::Week
                | K::Month
                | K::Quarter
                | K::Year
        )
    }

    pub fn is_converted_data_type(self) -> bool {
        use TokenKind as K;
        matches!(
            self,
            K::Date
                | K::Time
                | K::Timestamp
                | K::Int
                | K::Integer
                | K::Double
                | K::Long
                | K::Float
                | K::String
                | K::Boolean
        )
    }

    pub fn is_comparison_operator(self) -> bool {
        use TokenKind as K;
        matches!(
            self,
            K::Equal | K::NotEqual | K::Less | K::NotLess | K::Greater | K::NotGreater | K::Regexp
        )
    }

    /// Keywords that may stand in for an identifier (`keywordsCanBeId`).
    pub fn can_be_identifier(self) -> bool {
        use TokenKind as K;
        if !self.is_keyword() {
            return false;
        }
        !matches!(
            self,
            K::As
                | K::By
                | K::In
                | K::Not
                | K::Or
                | K::And
                | K::Xor
                | K::True
                | K::False
                | K::Regexp
                | K::Case
                | K::Interval
                | K::Cast
                | K::Int
                | K::Integer
                | K::Double
                | K::Long
                | K::Float
                | K::String
                | K::Boolean
                | K::Datamodel
                | K::Lookup
                | K::Savedsearch
                | K::Extract
                | K::GetFormat
                | K::Timestampadd
                | K::Timestampdiff
                | K::To
                | K::Match
                | K::MatchPhrase
                | K::MatchPhrasePrefix
                | K::MatchBoolPrefix
                | K::SimpleQueryString
                | K::MultiMatch
                | K::QueryString
        )
    }

    /// Pipe-command keywords (`commands` rule).
    pub fn is_command_keyword(self) -> bool {
        use TokenKind as K;
        matches!(
            self,
            K::Where
                | K::Fields
                | K::Rename
                | K::Stats
                | K::Dedup
                | K::Sort
                | K::Eval
                | K::Head
                | K::Top
                | K::Rare
                | K::Grok
                | K::Parse
                | K::Patterns
                | K::Kmeans
                | K::Ad
                | K::Ml
        )
    }
}
