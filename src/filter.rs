//! Per-column filter conditions and the predicate that evaluates them.
//!
//! A condition is an operator plus a free-form value string. The value is
//! parsed into a [`Literal`] matching the operator's family before any row
//! is tested, so malformed values never raise errors: numeric and date
//! predicates with an unusable literal exclude every row, and operators that
//! do not apply to the column's type let every row through.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

use crate::column::ColumnType;
use crate::temporal::{
    month_index, parse_date, parse_datetime, shift_months, week_start, FiscalCalendar,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterOperator {
    Equals,
    DoesNotEqual,
    Contains,
    DoesNotContain,
    BeginsWith,
    DoesNotBeginWith,
    EndsWith,
    DoesNotEndWith,
    ContainsData,
    DoesNotContainData,
    GreaterThan,
    GreaterThanOrEqualTo,
    LessThan,
    LessThanOrEqualTo,
    On,
    OnOrAfter,
    OnOrBefore,
    Today,
    Yesterday,
    Tomorrow,
    ThisWeek,
    LastWeek,
    NextWeek,
    Next7Days,
    Last7Days,
    ThisMonth,
    LastMonth,
    NextMonth,
    ThisYear,
    LastYear,
    NextYear,
    ThisFiscalPeriod,
    LastFiscalPeriod,
    NextFiscalPeriod,
    ThisFiscalYear,
    LastFiscalYear,
    NextFiscalYear,
    InFiscalYear,
    InFiscalPeriod,
    InFiscalPeriodAndYear,
    InOrAfterFiscalPeriodAndYear,
    InOrBeforeFiscalPeriodAndYear,
    NextXHours,
    NextXDays,
    NextXWeeks,
    NextXMonths,
    NextXYears,
    NextXFiscalPeriods,
    NextXFiscalYears,
    LastXHours,
    LastXDays,
    LastXWeeks,
    LastXMonths,
    LastXYears,
    LastXFiscalPeriods,
    LastXFiscalYears,
    OlderThanXMinutes,
    OlderThanXHours,
    OlderThanXDays,
    OlderThanXWeeks,
    OlderThanXMonths,
    OlderThanXYears,
    ContainsDataAnyTime,
    /// An operator name this build does not know, e.g. from a newer state file.
    Unrecognized,
}

/// Which column types an operator is meaningful for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorFamily {
    Text,
    Presence,
    Numeric,
    Date,
    Unrecognized,
}

/// The shape of the value an operator reads from the condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    None,
    Text,
    Number,
    Date,
    Count,
    FiscalYear,
    FiscalPeriod,
    FiscalPeriodAndYear,
}

impl FilterOperator {
    pub const ALL: [FilterOperator; 63] = [
        FilterOperator::Equals,
        FilterOperator::DoesNotEqual,
        FilterOperator::Contains,
        FilterOperator::DoesNotContain,
        FilterOperator::BeginsWith,
        FilterOperator::DoesNotBeginWith,
        FilterOperator::EndsWith,
        FilterOperator::DoesNotEndWith,
        FilterOperator::ContainsData,
        FilterOperator::DoesNotContainData,
        FilterOperator::GreaterThan,
        FilterOperator::GreaterThanOrEqualTo,
        FilterOperator::LessThan,
        FilterOperator::LessThanOrEqualTo,
        FilterOperator::On,
        FilterOperator::OnOrAfter,
        FilterOperator::OnOrBefore,
        FilterOperator::Today,
        FilterOperator::Yesterday,
        FilterOperator::Tomorrow,
        FilterOperator::ThisWeek,
        FilterOperator::LastWeek,
        FilterOperator::NextWeek,
        FilterOperator::Next7Days,
        FilterOperator::Last7Days,
        FilterOperator::ThisMonth,
        FilterOperator::LastMonth,
        FilterOperator::NextMonth,
        FilterOperator::ThisYear,
        FilterOperator::LastYear,
        FilterOperator::NextYear,
        FilterOperator::ThisFiscalPeriod,
        FilterOperator::LastFiscalPeriod,
        FilterOperator::NextFiscalPeriod,
        FilterOperator::ThisFiscalYear,
        FilterOperator::LastFiscalYear,
        FilterOperator::NextFiscalYear,
        FilterOperator::InFiscalYear,
        FilterOperator::InFiscalPeriod,
        FilterOperator::InFiscalPeriodAndYear,
        FilterOperator::InOrAfterFiscalPeriodAndYear,
        FilterOperator::InOrBeforeFiscalPeriodAndYear,
        FilterOperator::NextXHours,
        FilterOperator::NextXDays,
        FilterOperator::NextXWeeks,
        FilterOperator::NextXMonths,
        FilterOperator::NextXYears,
        FilterOperator::NextXFiscalPeriods,
        FilterOperator::NextXFiscalYears,
        FilterOperator::LastXHours,
        FilterOperator::LastXDays,
        FilterOperator::LastXWeeks,
        FilterOperator::LastXMonths,
        FilterOperator::LastXYears,
        FilterOperator::LastXFiscalPeriods,
        FilterOperator::LastXFiscalYears,
        FilterOperator::OlderThanXMinutes,
        FilterOperator::OlderThanXHours,
        FilterOperator::OlderThanXDays,
        FilterOperator::OlderThanXWeeks,
        FilterOperator::OlderThanXMonths,
        FilterOperator::OlderThanXYears,
        FilterOperator::ContainsDataAnyTime,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Equals => "equals",
            FilterOperator::DoesNotEqual => "does-not-equal",
            FilterOperator::Contains => "contains",
            FilterOperator::DoesNotContain => "does-not-contain",
            FilterOperator::BeginsWith => "begins-with",
            FilterOperator::DoesNotBeginWith => "does-not-begin-with",
            FilterOperator::EndsWith => "ends-with",
            FilterOperator::DoesNotEndWith => "does-not-end-with",
            FilterOperator::ContainsData => "contains-data",
            FilterOperator::DoesNotContainData => "does-not-contain-data",
            FilterOperator::GreaterThan => "greater-than",
            FilterOperator::GreaterThanOrEqualTo => "greater-than-or-equal-to",
            FilterOperator::LessThan => "less-than",
            FilterOperator::LessThanOrEqualTo => "less-than-or-equal-to",
            FilterOperator::On => "on",
            FilterOperator::OnOrAfter => "on-or-after",
            FilterOperator::OnOrBefore => "on-or-before",
            FilterOperator::Today => "today",
            FilterOperator::Yesterday => "yesterday",
            FilterOperator::Tomorrow => "tomorrow",
            FilterOperator::ThisWeek => "this-week",
            FilterOperator::LastWeek => "last-week",
            FilterOperator::NextWeek => "next-week",
            FilterOperator::Next7Days => "next-7-days",
            FilterOperator::Last7Days => "last-7-days",
            FilterOperator::ThisMonth => "this-month",
            FilterOperator::LastMonth => "last-month",
            FilterOperator::NextMonth => "next-month",
            FilterOperator::ThisYear => "this-year",
            FilterOperator::LastYear => "last-year",
            FilterOperator::NextYear => "next-year",
            FilterOperator::ThisFiscalPeriod => "this-fiscal-period",
            FilterOperator::LastFiscalPeriod => "last-fiscal-period",
            FilterOperator::NextFiscalPeriod => "next-fiscal-period",
            FilterOperator::ThisFiscalYear => "this-fiscal-year",
            FilterOperator::LastFiscalYear => "last-fiscal-year",
            FilterOperator::NextFiscalYear => "next-fiscal-year",
            FilterOperator::InFiscalYear => "in-fiscal-year",
            FilterOperator::InFiscalPeriod => "in-fiscal-period",
            FilterOperator::InFiscalPeriodAndYear => "in-fiscal-period-and-year",
            FilterOperator::InOrAfterFiscalPeriodAndYear => "in-or-after-fiscal-period-and-year",
            FilterOperator::InOrBeforeFiscalPeriodAndYear => "in-or-before-fiscal-period-and-year",
            FilterOperator::NextXHours => "next-x-hours",
            FilterOperator::NextXDays => "next-x-days",
            FilterOperator::NextXWeeks => "next-x-weeks",
            FilterOperator::NextXMonths => "next-x-months",
            FilterOperator::NextXYears => "next-x-years",
            FilterOperator::NextXFiscalPeriods => "next-x-fiscal-periods",
            FilterOperator::NextXFiscalYears => "next-x-fiscal-years",
            FilterOperator::LastXHours => "last-x-hours",
            FilterOperator::LastXDays => "last-x-days",
            FilterOperator::LastXWeeks => "last-x-weeks",
            FilterOperator::LastXMonths => "last-x-months",
            FilterOperator::LastXYears => "last-x-years",
            FilterOperator::LastXFiscalPeriods => "last-x-fiscal-periods",
            FilterOperator::LastXFiscalYears => "last-x-fiscal-years",
            FilterOperator::OlderThanXMinutes => "older-than-x-minutes",
            FilterOperator::OlderThanXHours => "older-than-x-hours",
            FilterOperator::OlderThanXDays => "older-than-x-days",
            FilterOperator::OlderThanXWeeks => "older-than-x-weeks",
            FilterOperator::OlderThanXMonths => "older-than-x-months",
            FilterOperator::OlderThanXYears => "older-than-x-years",
            FilterOperator::ContainsDataAnyTime => "contains-data-any-time",
            FilterOperator::Unrecognized => "unrecognized",
        }
    }

    /// Looks up an operator by its persisted name. Unknown names map to `Unrecognized`.
    pub fn parse(name: &str) -> Self {
        Self::iterator()
            .find(|op| op.as_str() == name)
            .unwrap_or(FilterOperator::Unrecognized)
    }

    pub fn iterator() -> impl Iterator<Item = FilterOperator> {
        Self::ALL.iter().copied()
    }

    /// Menu label, e.g. "Greater than or equal to".
    pub fn label(&self) -> String {
        match self {
            FilterOperator::ContainsDataAnyTime => "Contains data (any time)".to_string(),
            _ => {
                let words = self.as_str().replace('-', " ").replace(" x ", " X ");
                let mut chars = words.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => String::new(),
                }
            }
        }
    }

    pub fn family(&self) -> OperatorFamily {
        use FilterOperator::*;
        match self {
            Equals | DoesNotEqual | Contains | DoesNotContain | BeginsWith | DoesNotBeginWith
            | EndsWith | DoesNotEndWith => OperatorFamily::Text,
            ContainsData | DoesNotContainData => OperatorFamily::Presence,
            GreaterThan | GreaterThanOrEqualTo | LessThan | LessThanOrEqualTo => {
                OperatorFamily::Numeric
            }
            On | OnOrAfter | OnOrBefore | Today | Yesterday | Tomorrow | ThisWeek | LastWeek
            | NextWeek | Next7Days | Last7Days | ThisMonth | LastMonth | NextMonth | ThisYear
            | LastYear | NextYear | ThisFiscalPeriod | LastFiscalPeriod | NextFiscalPeriod
            | ThisFiscalYear | LastFiscalYear | NextFiscalYear | InFiscalYear | InFiscalPeriod
            | InFiscalPeriodAndYear | InOrAfterFiscalPeriodAndYear
            | InOrBeforeFiscalPeriodAndYear | NextXHours | NextXDays | NextXWeeks
            | NextXMonths | NextXYears | NextXFiscalPeriods | NextXFiscalYears | LastXHours
            | LastXDays | LastXWeeks | LastXMonths | LastXYears | LastXFiscalPeriods
            | LastXFiscalYears | OlderThanXMinutes | OlderThanXHours | OlderThanXDays
            | OlderThanXWeeks | OlderThanXMonths | OlderThanXYears | ContainsDataAnyTime => {
                OperatorFamily::Date
            }
            Unrecognized => OperatorFamily::Unrecognized,
        }
    }

    pub fn value_kind(&self) -> ValueKind {
        use FilterOperator::*;
        match self {
            Equals | DoesNotEqual | Contains | DoesNotContain | BeginsWith | DoesNotBeginWith
            | EndsWith | DoesNotEndWith => ValueKind::Text,
            GreaterThan | GreaterThanOrEqualTo | LessThan | LessThanOrEqualTo => ValueKind::Number,
            On | OnOrAfter | OnOrBefore => ValueKind::Date,
            InFiscalYear => ValueKind::FiscalYear,
            InFiscalPeriod => ValueKind::FiscalPeriod,
            InFiscalPeriodAndYear | InOrAfterFiscalPeriodAndYear | InOrBeforeFiscalPeriodAndYear => {
                ValueKind::FiscalPeriodAndYear
            }
            NextXHours | NextXDays | NextXWeeks | NextXMonths | NextXYears | NextXFiscalPeriods
            | NextXFiscalYears | LastXHours | LastXDays | LastXWeeks | LastXMonths | LastXYears
            | LastXFiscalPeriods | LastXFiscalYears | OlderThanXMinutes | OlderThanXHours
            | OlderThanXDays | OlderThanXWeeks | OlderThanXMonths | OlderThanXYears => {
                ValueKind::Count
            }
            ContainsData | DoesNotContainData | ContainsDataAnyTime | Today | Yesterday
            | Tomorrow | ThisWeek | LastWeek | NextWeek | Next7Days | Last7Days | ThisMonth
            | LastMonth | NextMonth | ThisYear | LastYear | NextYear | ThisFiscalPeriod
            | LastFiscalPeriod | NextFiscalPeriod | ThisFiscalYear | LastFiscalYear
            | NextFiscalYear | Unrecognized => ValueKind::None,
        }
    }

    /// Hour and minute windows, which move with the clock rather than the date.
    pub fn is_clock_window(&self) -> bool {
        matches!(
            self,
            FilterOperator::NextXHours
                | FilterOperator::LastXHours
                | FilterOperator::OlderThanXMinutes
                | FilterOperator::OlderThanXHours
        )
    }

    pub fn requires_value(&self) -> bool {
        self.value_kind() != ValueKind::None
    }

    /// Whether the evaluator tests rows of this column type with this operator.
    pub fn applies_to(&self, column_type: ColumnType) -> bool {
        match self.family() {
            OperatorFamily::Text | OperatorFamily::Presence => true,
            OperatorFamily::Numeric => column_type == ColumnType::Numeric,
            OperatorFamily::Date => column_type == ColumnType::Date,
            OperatorFamily::Unrecognized => false,
        }
    }

    /// Operators offered by the filter editor for a column type, in menu order.
    pub fn for_column_type(column_type: ColumnType) -> Vec<FilterOperator> {
        match column_type {
            ColumnType::Date => Self::iterator()
                .filter(|op| op.family() == OperatorFamily::Date)
                .filter(|op| *op != FilterOperator::ContainsDataAnyTime)
                .chain([
                    FilterOperator::ContainsData,
                    FilterOperator::DoesNotContainData,
                    FilterOperator::ContainsDataAnyTime,
                ])
                .collect(),
            ColumnType::Text | ColumnType::Numeric => Self::iterator()
                .filter(|op| op.family() != OperatorFamily::Date && op.applies_to(column_type))
                .collect(),
        }
    }

    /// Operator preselected when a column has no condition yet.
    pub fn default_for(column_type: ColumnType) -> Self {
        match column_type {
            ColumnType::Date => FilterOperator::On,
            ColumnType::Text | ColumnType::Numeric => FilterOperator::Equals,
        }
    }
}

impl Serialize for FilterOperator {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for FilterOperator {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(FilterOperator::parse(&name))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredCondition", into = "StoredCondition")]
pub struct FilterCondition {
    pub operator: FilterOperator,
    pub value: String,
    /// Name an `Unrecognized` operator was loaded under, written back out unchanged.
    unknown_operator: Option<String>,
}

/// Persisted shape of a condition.
#[derive(Serialize, Deserialize)]
struct StoredCondition {
    operator: String,
    #[serde(default)]
    value: String,
}

impl From<StoredCondition> for FilterCondition {
    fn from(stored: StoredCondition) -> Self {
        let operator = FilterOperator::parse(&stored.operator);
        Self {
            operator,
            value: stored.value,
            unknown_operator: (operator == FilterOperator::Unrecognized)
                .then_some(stored.operator),
        }
    }
}

impl From<FilterCondition> for StoredCondition {
    fn from(condition: FilterCondition) -> Self {
        let operator = match (condition.operator, condition.unknown_operator) {
            (FilterOperator::Unrecognized, Some(name)) => name,
            (operator, _) => operator.as_str().to_string(),
        };
        Self {
            operator,
            value: condition.value,
        }
    }
}

impl FilterCondition {
    pub fn new(operator: FilterOperator, value: impl Into<String>) -> Self {
        Self {
            operator,
            value: value.into(),
            unknown_operator: None,
        }
    }

    /// The operator name as stored, including names this build does not know.
    pub fn operator_name(&self) -> &str {
        match (&self.operator, &self.unknown_operator) {
            (FilterOperator::Unrecognized, Some(name)) => name,
            (operator, _) => operator.as_str(),
        }
    }

    pub fn without_value(operator: FilterOperator) -> Self {
        Self::new(operator, String::new())
    }

    /// One-line description for the status bar, e.g. "Greater than 10".
    pub fn summary(&self) -> String {
        if self.operator.requires_value() {
            format!("{} {}", self.operator.label(), self.value.trim())
        } else {
            self.operator.label()
        }
    }
}

/// Column id to optional condition. A `None` entry and a missing entry both mean unfiltered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnFilters {
    entries: BTreeMap<String, Option<FilterCondition>>,
}

impl ColumnFilters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces any existing condition on the column.
    pub fn set(&mut self, column: impl Into<String>, condition: FilterCondition) {
        self.entries.insert(column.into(), Some(condition));
    }

    /// Returns true if the column had an active condition.
    pub fn clear(&mut self, column: &str) -> bool {
        match self.entries.get_mut(column) {
            Some(slot) => slot.take().is_some(),
            None => false,
        }
    }

    pub fn get(&self, column: &str) -> Option<&FilterCondition> {
        self.entries.get(column).and_then(|c| c.as_ref())
    }

    pub fn is_filtered(&self, column: &str) -> bool {
        self.get(column).is_some()
    }

    pub fn active(&self) -> impl Iterator<Item = (&str, &FilterCondition)> {
        self.entries
            .iter()
            .filter_map(|(column, condition)| condition.as_ref().map(|c| (column.as_str(), c)))
    }

    pub fn active_count(&self) -> usize {
        self.active().count()
    }

    pub fn is_empty(&self) -> bool {
        self.active_count() == 0
    }
}

/// Evaluation instant and calendar for date predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterContext {
    pub now: NaiveDateTime,
    pub fiscal: FiscalCalendar,
}

impl FilterContext {
    pub fn now(fiscal: FiscalCalendar) -> Self {
        Self::at(chrono::Local::now().naive_local(), fiscal)
    }

    pub fn at(now: NaiveDateTime, fiscal: FiscalCalendar) -> Self {
        Self { now, fiscal }
    }

    pub fn today(&self) -> NaiveDate {
        self.now.date()
    }
}

/// A condition's value parsed for its operator family. `None` inside a
/// variant records a value that failed to parse.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    None,
    Text(String),
    Number(Option<f64>),
    Date(Option<NaiveDate>),
    Count(Option<u32>),
    FiscalYear(Option<i32>),
    FiscalPeriod(Option<u32>),
    FiscalPeriodAndYear(Option<(u32, i32)>),
}

impl Literal {
    pub fn parse(kind: ValueKind, value: &str) -> Self {
        let trimmed = value.trim();
        match kind {
            ValueKind::None => Literal::None,
            ValueKind::Text => Literal::Text(value.to_lowercase()),
            ValueKind::Number => Literal::Number(parse_number(trimmed)),
            ValueKind::Date => Literal::Date(parse_date(trimmed)),
            ValueKind::Count => Literal::Count(trimmed.parse::<u32>().ok()),
            ValueKind::FiscalYear => Literal::FiscalYear(parse_year(trimmed)),
            ValueKind::FiscalPeriod => Literal::FiscalPeriod(parse_period(trimmed)),
            ValueKind::FiscalPeriodAndYear => {
                Literal::FiscalPeriodAndYear(trimmed.split_once('/').and_then(|(p, y)| {
                    Some((parse_period(p.trim())?, parse_year(y.trim())?))
                }))
            }
        }
    }

    /// Whether the value parsed. Valueless operators always report true.
    pub fn is_valid(&self) -> bool {
        match self {
            Literal::None | Literal::Text(_) => true,
            Literal::Number(n) => n.is_some(),
            Literal::Date(d) => d.is_some(),
            Literal::Count(c) => c.is_some(),
            Literal::FiscalYear(y) => y.is_some(),
            Literal::FiscalPeriod(p) => p.is_some(),
            Literal::FiscalPeriodAndYear(py) => py.is_some(),
        }
    }
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|n| !n.is_nan())
}

fn parse_year(raw: &str) -> Option<i32> {
    raw.parse::<i32>().ok().filter(|y| (1..=9999).contains(y))
}

fn parse_period(raw: &str) -> Option<u32> {
    raw.parse::<u32>()
        .ok()
        .filter(|p| (1..=crate::temporal::FISCAL_PERIODS_PER_YEAR).contains(p))
}

/// A condition bound to a column type with its literal parsed once.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    column_type: ColumnType,
    operator: FilterOperator,
    literal: Literal,
}

impl Predicate {
    pub fn new(column_type: ColumnType, condition: &FilterCondition) -> Self {
        Self {
            column_type,
            operator: condition.operator,
            literal: Literal::parse(condition.operator.value_kind(), &condition.value),
        }
    }

    pub fn evaluate(&self, raw: &str, ctx: &FilterContext) -> bool {
        if !self.operator.applies_to(self.column_type) {
            return true;
        }
        match self.operator.family() {
            OperatorFamily::Text => match &self.literal {
                Literal::Text(literal) => eval_text(self.operator, &raw.to_lowercase(), literal),
                _ => true,
            },
            OperatorFamily::Presence => eval_presence(self.operator, raw),
            OperatorFamily::Numeric => match self.literal {
                Literal::Number(literal) => eval_numeric(self.operator, raw, literal),
                _ => true,
            },
            OperatorFamily::Date => eval_date(self.operator, &self.literal, raw, ctx),
            OperatorFamily::Unrecognized => true,
        }
    }
}

/// Whether `raw`, a value of a `column_type` column, satisfies `condition` at `ctx`.
pub fn matches(
    column_type: ColumnType,
    raw: &str,
    condition: &FilterCondition,
    ctx: &FilterContext,
) -> bool {
    Predicate::new(column_type, condition).evaluate(raw, ctx)
}

fn eval_text(operator: FilterOperator, value: &str, literal: &str) -> bool {
    match operator {
        FilterOperator::Equals => value == literal,
        FilterOperator::DoesNotEqual => value != literal,
        FilterOperator::Contains => value.contains(literal),
        FilterOperator::DoesNotContain => !value.contains(literal),
        FilterOperator::BeginsWith => value.starts_with(literal),
        FilterOperator::DoesNotBeginWith => !value.starts_with(literal),
        FilterOperator::EndsWith => value.ends_with(literal),
        FilterOperator::DoesNotEndWith => !value.ends_with(literal),
        _ => true,
    }
}

fn eval_presence(operator: FilterOperator, raw: &str) -> bool {
    match operator {
        FilterOperator::DoesNotContainData => raw.trim().is_empty(),
        _ => !raw.trim().is_empty(),
    }
}

fn eval_numeric(operator: FilterOperator, raw: &str, literal: Option<f64>) -> bool {
    let (Some(lhs), Some(rhs)) = (parse_number(raw), literal) else {
        return false;
    };
    match operator {
        FilterOperator::GreaterThan => lhs > rhs,
        FilterOperator::GreaterThanOrEqualTo => lhs >= rhs,
        FilterOperator::LessThan => lhs < rhs,
        FilterOperator::LessThanOrEqualTo => lhs <= rhs,
        _ => true,
    }
}

fn offset_days(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    date.checked_add_signed(Duration::try_days(days)?)
}

fn in_range(date: NaiveDate, start: Option<NaiveDate>, end: Option<NaiveDate>) -> bool {
    match (start, end) {
        (Some(start), Some(end)) => start <= date && date <= end,
        _ => false,
    }
}

fn eval_date(operator: FilterOperator, literal: &Literal, raw: &str, ctx: &FilterContext) -> bool {
    use FilterOperator::*;

    if operator == ContainsDataAnyTime {
        return !raw.trim().is_empty();
    }
    if operator.is_clock_window() {
        return eval_clock_window(operator, literal, raw, ctx);
    }

    let Some(date) = parse_date(raw) else {
        return false;
    };
    let today = ctx.today();
    let fiscal = &ctx.fiscal;

    match operator {
        On | OnOrAfter | OnOrBefore => match literal {
            Literal::Date(Some(target)) => match operator {
                On => date == *target,
                OnOrAfter => date >= *target,
                _ => date <= *target,
            },
            _ => false,
        },
        Today => date == today,
        Yesterday => Some(date) == offset_days(today, -1),
        Tomorrow => Some(date) == offset_days(today, 1),
        ThisWeek | LastWeek | NextWeek => {
            let shift = match operator {
                LastWeek => -7,
                NextWeek => 7,
                _ => 0,
            };
            let start = offset_days(week_start(today), shift);
            in_range(date, start, start.and_then(|s| offset_days(s, 6)))
        }
        Next7Days => in_range(date, offset_days(today, 1), offset_days(today, 7)),
        Last7Days => in_range(date, offset_days(today, -7), offset_days(today, -1)),
        ThisMonth => month_index(date) == month_index(today),
        LastMonth => month_index(date) == month_index(today) - 1,
        NextMonth => month_index(date) == month_index(today) + 1,
        ThisYear => date.year() == today.year(),
        LastYear => date.year() == today.year() - 1,
        NextYear => date.year() == today.year() + 1,
        ThisFiscalPeriod => fiscal.period_index(date) == fiscal.period_index(today),
        LastFiscalPeriod => fiscal.period_index(date) == fiscal.period_index(today) - 1,
        NextFiscalPeriod => fiscal.period_index(date) == fiscal.period_index(today) + 1,
        ThisFiscalYear => fiscal.fiscal_year(date) == fiscal.fiscal_year(today),
        LastFiscalYear => fiscal.fiscal_year(date) == fiscal.fiscal_year(today) - 1,
        NextFiscalYear => fiscal.fiscal_year(date) == fiscal.fiscal_year(today) + 1,
        InFiscalYear => match literal {
            Literal::FiscalYear(Some(year)) => fiscal.fiscal_year(date) == *year,
            _ => false,
        },
        InFiscalPeriod => match literal {
            Literal::FiscalPeriod(Some(period)) => fiscal.fiscal_period(date) == *period,
            _ => false,
        },
        InFiscalPeriodAndYear | InOrAfterFiscalPeriodAndYear | InOrBeforeFiscalPeriodAndYear => {
            match literal {
                Literal::FiscalPeriodAndYear(Some((period, year))) => {
                    let row = fiscal.period_index(date);
                    let target = FiscalCalendar::index_of(*period, *year);
                    match operator {
                        InFiscalPeriodAndYear => row == target,
                        InOrAfterFiscalPeriodAndYear => row >= target,
                        _ => row <= target,
                    }
                }
                _ => false,
            }
        }
        NextXDays | NextXWeeks | NextXMonths | NextXYears | NextXFiscalPeriods
        | NextXFiscalYears | LastXDays | LastXWeeks | LastXMonths | LastXYears
        | LastXFiscalPeriods | LastXFiscalYears | OlderThanXDays | OlderThanXWeeks
        | OlderThanXMonths | OlderThanXYears => match literal {
            Literal::Count(Some(count)) => eval_calendar_window(operator, *count, date, ctx),
            _ => false,
        },
        _ => true,
    }
}

/// Hour and minute windows compare full timestamps against `ctx.now`.
fn eval_clock_window(
    operator: FilterOperator,
    literal: &Literal,
    raw: &str,
    ctx: &FilterContext,
) -> bool {
    let Literal::Count(Some(count)) = literal else {
        return false;
    };
    let Some(at) = parse_datetime(raw) else {
        return false;
    };
    let count = i64::from(*count);
    let span = match operator {
        FilterOperator::OlderThanXMinutes => Duration::try_minutes(count),
        _ => Duration::try_hours(count),
    };
    let Some(span) = span else {
        return false;
    };
    let now = ctx.now;
    match operator {
        FilterOperator::NextXHours => match now.checked_add_signed(span) {
            Some(end) => now < at && at <= end,
            None => false,
        },
        FilterOperator::LastXHours => match now.checked_sub_signed(span) {
            Some(start) => start <= at && at < now,
            None => false,
        },
        _ => match now.checked_sub_signed(span) {
            Some(cutoff) => at < cutoff,
            None => false,
        },
    }
}

/// Day-and-larger windows: `next` covers (now, now + x], `last` covers
/// [now - x, now) and `older` everything before now - x. Fiscal units count
/// whole periods or years relative to the current one.
fn eval_calendar_window(
    operator: FilterOperator,
    count: u32,
    date: NaiveDate,
    ctx: &FilterContext,
) -> bool {
    use FilterOperator::*;

    let today = ctx.today();
    let x = i64::from(count);
    let fiscal = &ctx.fiscal;

    match operator {
        NextXFiscalPeriods => {
            let (row, now) = (fiscal.period_index(date), fiscal.period_index(today));
            now < row && row <= now + x
        }
        LastXFiscalPeriods => {
            let (row, now) = (fiscal.period_index(date), fiscal.period_index(today));
            now - x <= row && row < now
        }
        NextXFiscalYears => {
            let (row, now) = (fiscal.fiscal_year(date) as i64, fiscal.fiscal_year(today) as i64);
            now < row && row <= now + x
        }
        LastXFiscalYears => {
            let (row, now) = (fiscal.fiscal_year(date) as i64, fiscal.fiscal_year(today) as i64);
            now - x <= row && row < now
        }
        _ => {
            let shifted = |sign: i64| match operator {
                NextXDays | LastXDays | OlderThanXDays => offset_days(today, sign * x),
                NextXWeeks | LastXWeeks | OlderThanXWeeks => offset_days(today, sign * x * 7),
                NextXMonths | LastXMonths | OlderThanXMonths => shift_months(today, sign * x),
                _ => shift_months(today, sign * x * 12),
            };
            match operator {
                NextXDays | NextXWeeks | NextXMonths | NextXYears => match shifted(1) {
                    Some(end) => today < date && date <= end,
                    None => false,
                },
                LastXDays | LastXWeeks | LastXMonths | LastXYears => match shifted(-1) {
                    Some(start) => start <= date && date < today,
                    None => false,
                },
                _ => match shifted(-1) {
                    Some(cutoff) => date < cutoff,
                    None => false,
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Wednesday 2025-09-10 14:30
    fn ctx() -> FilterContext {
        let now = NaiveDate::from_ymd_opt(2025, 9, 10)
            .unwrap()
            .and_hms_opt(14, 30, 0)
            .unwrap();
        FilterContext::at(now, FiscalCalendar::default())
    }

    fn date_matches(op: FilterOperator, value: &str, raw: &str) -> bool {
        matches(ColumnType::Date, raw, &FilterCondition::new(op, value), &ctx())
    }

    #[test]
    fn test_operator_names_round_trip() {
        for op in FilterOperator::iterator() {
            assert_eq!(FilterOperator::parse(op.as_str()), op);
        }
        assert_eq!(FilterOperator::parse("between"), FilterOperator::Unrecognized);
    }

    #[test]
    fn test_operator_serde() {
        let json = serde_json::to_string(&FilterOperator::Next7Days).unwrap();
        assert_eq!(json, "\"next-7-days\"");
        let op: FilterOperator = serde_json::from_str("\"greater-than-or-equal-to\"").unwrap();
        assert_eq!(op, FilterOperator::GreaterThanOrEqualTo);
        let op: FilterOperator = serde_json::from_str("\"some-future-operator\"").unwrap();
        assert_eq!(op, FilterOperator::Unrecognized);
    }

    #[test]
    fn test_labels() {
        assert_eq!(FilterOperator::Equals.label(), "Equals");
        assert_eq!(
            FilterOperator::GreaterThanOrEqualTo.label(),
            "Greater than or equal to"
        );
        assert_eq!(FilterOperator::NextXDays.label(), "Next X days");
        assert_eq!(FilterOperator::Next7Days.label(), "Next 7 days");
        assert_eq!(
            FilterOperator::ContainsDataAnyTime.label(),
            "Contains data (any time)"
        );
    }

    #[test]
    fn test_operators_for_column_type() {
        let text = FilterOperator::for_column_type(ColumnType::Text);
        assert_eq!(text[0], FilterOperator::Equals);
        assert!(text.contains(&FilterOperator::ContainsData));
        assert!(!text.contains(&FilterOperator::GreaterThan));
        assert!(!text.contains(&FilterOperator::On));

        let numeric = FilterOperator::for_column_type(ColumnType::Numeric);
        assert!(numeric.contains(&FilterOperator::GreaterThan));
        assert!(numeric.contains(&FilterOperator::Equals));

        let date = FilterOperator::for_column_type(ColumnType::Date);
        assert_eq!(date[0], FilterOperator::On);
        assert!(date.contains(&FilterOperator::ContainsDataAnyTime));
        assert!(date.contains(&FilterOperator::OlderThanXYears));
        assert!(!date.contains(&FilterOperator::Equals));
    }

    #[test]
    fn test_equals_is_case_insensitive() {
        let cond = FilterCondition::new(FilterOperator::Equals, "BOILER 2000");
        for (raw, expected) in [("Boiler 2000", true), ("boiler 2000", true), ("Boiler 200", false)] {
            assert_eq!(
                matches(ColumnType::Text, raw, &cond, &ctx()),
                raw.to_lowercase() == "boiler 2000"
            );
            assert_eq!(matches(ColumnType::Text, raw, &cond, &ctx()), expected);
        }
    }

    #[test]
    fn test_text_operators() {
        let check = |op, value: &str, raw: &str| {
            matches(ColumnType::Text, raw, &FilterCondition::new(op, value), &ctx())
        };
        assert!(check(FilterOperator::Contains, "vac", "HVAC - Ceiling"));
        assert!(!check(FilterOperator::DoesNotContain, "vac", "HVAC - Ceiling"));
        assert!(check(FilterOperator::BeginsWith, "boil", "Boiler 2500"));
        assert!(check(FilterOperator::DoesNotBeginWith, "boil", "Damper"));
        assert!(check(FilterOperator::EndsWith, "2500", "Boiler 2500"));
        assert!(check(FilterOperator::DoesNotEndWith, "2500", "Boiler 2000"));
        assert!(check(FilterOperator::DoesNotEqual, "damper", "Boiler 2000"));
    }

    #[test]
    fn test_text_operators_apply_to_numeric_columns() {
        let cond = FilterCondition::new(FilterOperator::BeginsWith, "12");
        assert!(matches(ColumnType::Numeric, "125.5", &cond, &ctx()));
        assert!(!matches(ColumnType::Numeric, "5", &cond, &ctx()));
    }

    #[test]
    fn test_presence() {
        let has = FilterCondition::without_value(FilterOperator::ContainsData);
        let lacks = FilterCondition::without_value(FilterOperator::DoesNotContainData);
        assert!(matches(ColumnType::Numeric, " 4 ", &has, &ctx()));
        assert!(!matches(ColumnType::Text, "   ", &has, &ctx()));
        assert!(matches(ColumnType::Date, "", &lacks, &ctx()));
        assert!(date_matches(FilterOperator::ContainsDataAnyTime, "", "2020-01-01"));
        assert!(!date_matches(FilterOperator::ContainsDataAnyTime, "", " "));
    }

    #[test]
    fn test_numeric_operators() {
        let gte = FilterCondition::new(FilterOperator::GreaterThanOrEqualTo, "10");
        assert!(matches(ColumnType::Numeric, "10", &gte, &ctx()));
        assert!(matches(ColumnType::Numeric, "15.5", &gte, &ctx()));
        assert!(!matches(ColumnType::Numeric, "5", &gte, &ctx()));
        let lt = FilterCondition::new(FilterOperator::LessThan, "-1");
        assert!(matches(ColumnType::Numeric, "-2", &lt, &ctx()));
    }

    #[test]
    fn test_numeric_parse_failures_exclude() {
        let bad_literal = FilterCondition::new(FilterOperator::GreaterThan, "ten");
        assert!(!matches(ColumnType::Numeric, "100", &bad_literal, &ctx()));
        let gt = FilterCondition::new(FilterOperator::GreaterThan, "1");
        assert!(!matches(ColumnType::Numeric, "n/a", &gt, &ctx()));
        assert!(!matches(ColumnType::Numeric, "", &gt, &ctx()));
    }

    #[test]
    fn test_mismatched_family_fails_open() {
        let gt = FilterCondition::new(FilterOperator::GreaterThan, "10");
        assert!(matches(ColumnType::Text, "abc", &gt, &ctx()));
        let today = FilterCondition::without_value(FilterOperator::Today);
        assert!(matches(ColumnType::Numeric, "3", &today, &ctx()));
        let any_time = FilterCondition::without_value(FilterOperator::ContainsDataAnyTime);
        assert!(matches(ColumnType::Text, "", &any_time, &ctx()));
    }

    #[test]
    fn test_unrecognized_fails_open() {
        let cond = FilterCondition::new(FilterOperator::Unrecognized, "x");
        for column_type in [ColumnType::Text, ColumnType::Numeric, ColumnType::Date] {
            assert!(matches(column_type, "anything", &cond, &ctx()));
        }
    }

    #[test]
    fn test_on_family() {
        assert!(date_matches(FilterOperator::On, "2025-09-09", "2025-09-09 11:00:00 AM"));
        assert!(date_matches(FilterOperator::On, "2025-09-09T00:00:00", "2025-09-09 11:00:00 PM"));
        assert!(!date_matches(FilterOperator::On, "2025-09-09", "2025-09-10 12:00:00 AM"));
        assert!(date_matches(FilterOperator::OnOrAfter, "2025-09-09", "2025-09-09 01:00:00 AM"));
        assert!(!date_matches(FilterOperator::OnOrAfter, "2025-09-09", "2025-09-08 11:59:00 PM"));
        assert!(date_matches(FilterOperator::OnOrBefore, "2025-09-09", "2025-01-01"));
        assert!(!date_matches(FilterOperator::OnOrBefore, "not-a-date", "2025-01-01"));
        assert!(!date_matches(FilterOperator::On, "2025-09-09", "garbage"));
    }

    #[test]
    fn test_today_any_time_of_day() {
        assert!(date_matches(FilterOperator::Today, "", "2025-09-10 12:00:00 AM"));
        assert!(date_matches(FilterOperator::Today, "ignored", "2025-09-10 11:59:59 PM"));
        assert!(!date_matches(FilterOperator::Today, "", "2025-09-09 11:59:59 PM"));
        assert!(date_matches(FilterOperator::Yesterday, "", "2025-09-09"));
        assert!(date_matches(FilterOperator::Tomorrow, "", "2025-09-11"));
    }

    #[test]
    fn test_week_windows() {
        // week of Sunday 2025-09-07 through Saturday 2025-09-13
        assert!(date_matches(FilterOperator::ThisWeek, "", "2025-09-07"));
        assert!(date_matches(FilterOperator::ThisWeek, "", "2025-09-13"));
        assert!(!date_matches(FilterOperator::ThisWeek, "", "2025-09-14"));
        assert!(date_matches(FilterOperator::LastWeek, "", "2025-08-31"));
        assert!(date_matches(FilterOperator::LastWeek, "", "2025-09-06"));
        assert!(!date_matches(FilterOperator::LastWeek, "", "2025-09-07"));
        assert!(date_matches(FilterOperator::NextWeek, "", "2025-09-14"));
        assert!(date_matches(FilterOperator::NextWeek, "", "2025-09-20"));
        assert!(!date_matches(FilterOperator::NextWeek, "", "2025-09-21"));
    }

    #[test]
    fn test_seven_day_windows_exclude_today() {
        assert!(!date_matches(FilterOperator::Next7Days, "", "2025-09-10"));
        assert!(date_matches(FilterOperator::Next7Days, "", "2025-09-11"));
        assert!(date_matches(FilterOperator::Next7Days, "", "2025-09-17"));
        assert!(!date_matches(FilterOperator::Next7Days, "", "2025-09-18"));
        assert!(date_matches(FilterOperator::Last7Days, "", "2025-09-03"));
        assert!(date_matches(FilterOperator::Last7Days, "", "2025-09-09"));
        assert!(!date_matches(FilterOperator::Last7Days, "", "2025-09-10"));
    }

    #[test]
    fn test_month_and_year_windows() {
        assert!(date_matches(FilterOperator::ThisMonth, "", "2025-09-30"));
        assert!(!date_matches(FilterOperator::ThisMonth, "", "2024-09-10"));
        assert!(date_matches(FilterOperator::LastMonth, "", "2025-08-01"));
        assert!(date_matches(FilterOperator::NextMonth, "", "2025-10-31"));
        assert!(date_matches(FilterOperator::ThisYear, "", "2025-01-01"));
        assert!(date_matches(FilterOperator::LastYear, "", "2024-12-31"));
        assert!(date_matches(FilterOperator::NextYear, "", "2026-06-15"));
        assert!(!date_matches(FilterOperator::NextYear, "", "2025-12-31"));
    }

    #[test]
    fn test_month_window_across_year_boundary() {
        let now = NaiveDate::from_ymd_opt(2026, 1, 15)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let ctx = FilterContext::at(now, FiscalCalendar::default());
        let last_month = FilterCondition::without_value(FilterOperator::LastMonth);
        assert!(matches(ColumnType::Date, "2025-12-31", &last_month, &ctx));
        assert!(!matches(ColumnType::Date, "2026-12-01", &last_month, &ctx));
    }

    #[test]
    fn test_fiscal_relative_windows() {
        // January start: 2025-09-10 is fiscal period 3 of 2025
        assert!(date_matches(FilterOperator::ThisFiscalPeriod, "", "2025-07-01"));
        assert!(date_matches(FilterOperator::LastFiscalPeriod, "", "2025-06-30"));
        assert!(date_matches(FilterOperator::NextFiscalPeriod, "", "2025-10-01"));
        assert!(!date_matches(FilterOperator::NextFiscalPeriod, "", "2026-01-01"));
        assert!(date_matches(FilterOperator::ThisFiscalYear, "", "2025-12-31"));
        assert!(date_matches(FilterOperator::LastFiscalYear, "", "2024-02-02"));
        assert!(date_matches(FilterOperator::NextFiscalYear, "", "2026-02-02"));
    }

    #[test]
    fn test_fiscal_windows_with_july_start() {
        let ctx = FilterContext::at(ctx().now, FiscalCalendar::new(7));
        let this_year = FilterCondition::without_value(FilterOperator::ThisFiscalYear);
        assert!(matches(ColumnType::Date, "2026-06-30", &this_year, &ctx));
        assert!(!matches(ColumnType::Date, "2025-06-30", &this_year, &ctx));
        let this_period = FilterCondition::without_value(FilterOperator::ThisFiscalPeriod);
        assert!(matches(ColumnType::Date, "2025-07-01", &this_period, &ctx));
        assert!(!matches(ColumnType::Date, "2025-10-01", &this_period, &ctx));
    }

    #[test]
    fn test_fiscal_designators() {
        assert!(date_matches(FilterOperator::InFiscalYear, "2025", "2025-03-01"));
        assert!(!date_matches(FilterOperator::InFiscalYear, "2024", "2025-03-01"));
        assert!(!date_matches(FilterOperator::InFiscalYear, "", "2025-03-01"));
        assert!(date_matches(FilterOperator::InFiscalPeriod, "2", "2019-05-01"));
        assert!(!date_matches(FilterOperator::InFiscalPeriod, "5", "2019-05-01"));
        assert!(date_matches(FilterOperator::InFiscalPeriodAndYear, "2/2025", "2025-04-01"));
        assert!(!date_matches(FilterOperator::InFiscalPeriodAndYear, "2/2025", "2024-04-01"));
        assert!(date_matches(FilterOperator::InOrAfterFiscalPeriodAndYear, "4/2024", "2025-01-01"));
        assert!(!date_matches(FilterOperator::InOrAfterFiscalPeriodAndYear, "1/2025", "2024-12-31"));
        assert!(date_matches(FilterOperator::InOrBeforeFiscalPeriodAndYear, " 1 / 2025 ", "2024-12-31"));
        assert!(!date_matches(FilterOperator::InOrBeforeFiscalPeriodAndYear, "2025", "2024-12-31"));
    }

    #[test]
    fn test_counted_day_windows() {
        assert!(date_matches(FilterOperator::NextXDays, "3", "2025-09-13"));
        assert!(!date_matches(FilterOperator::NextXDays, "3", "2025-09-14"));
        assert!(!date_matches(FilterOperator::NextXDays, "3", "2025-09-10"));
        assert!(date_matches(FilterOperator::LastXDays, "3", "2025-09-07"));
        assert!(!date_matches(FilterOperator::LastXDays, "3", "2025-09-10"));
        assert!(date_matches(FilterOperator::OlderThanXDays, "3", "2025-09-06"));
        assert!(!date_matches(FilterOperator::OlderThanXDays, "3", "2025-09-07"));
        assert!(date_matches(FilterOperator::NextXWeeks, "2", "2025-09-24"));
        assert!(!date_matches(FilterOperator::NextXWeeks, "2", "2025-09-25"));
        assert!(date_matches(FilterOperator::LastXMonths, "1", "2025-08-10"));
        assert!(!date_matches(FilterOperator::LastXMonths, "1", "2025-08-09"));
        assert!(date_matches(FilterOperator::OlderThanXYears, "1", "2024-09-09"));
        assert!(date_matches(FilterOperator::NextXYears, "1", "2026-09-10"));
    }

    #[test]
    fn test_counted_clock_windows() {
        assert!(date_matches(FilterOperator::NextXHours, "2", "2025-09-10 04:00:00 PM"));
        assert!(!date_matches(FilterOperator::NextXHours, "2", "2025-09-10 04:31:00 PM"));
        assert!(!date_matches(FilterOperator::NextXHours, "2", "2025-09-10 02:30:00 PM"));
        assert!(date_matches(FilterOperator::LastXHours, "1", "2025-09-10 01:30:00 PM"));
        assert!(!date_matches(FilterOperator::LastXHours, "1", "2025-09-10 01:29:00 PM"));
        assert!(date_matches(FilterOperator::OlderThanXMinutes, "30", "2025-09-10 01:59:00 PM"));
        assert!(!date_matches(FilterOperator::OlderThanXMinutes, "30", "2025-09-10 02:00:00 PM"));
        // date-only rows count as midnight
        assert!(date_matches(FilterOperator::OlderThanXHours, "12", "2025-09-10"));
        // zoned values compare on their wall-clock time
        assert!(date_matches(FilterOperator::LastXHours, "1", "2025-09-10 13:30:00 UTC"));
        assert!(!date_matches(FilterOperator::LastXHours, "1", "2025-09-10 13:29:00 UTC"));
    }

    #[test]
    fn test_counted_fiscal_windows() {
        assert!(date_matches(FilterOperator::NextXFiscalPeriods, "2", "2026-01-15"));
        assert!(!date_matches(FilterOperator::NextXFiscalPeriods, "2", "2026-04-01"));
        assert!(!date_matches(FilterOperator::NextXFiscalPeriods, "2", "2025-09-30"));
        assert!(date_matches(FilterOperator::LastXFiscalPeriods, "1", "2025-04-01"));
        assert!(date_matches(FilterOperator::LastXFiscalYears, "2", "2023-05-05"));
        assert!(!date_matches(FilterOperator::LastXFiscalYears, "2", "2025-05-05"));
        assert!(date_matches(FilterOperator::NextXFiscalYears, "1", "2026-12-31"));
    }

    #[test]
    fn test_malformed_count_excludes() {
        assert!(!date_matches(FilterOperator::NextXDays, "three", "2025-09-11"));
        assert!(!date_matches(FilterOperator::LastXHours, "-1", "2025-09-10 02:00:00 PM"));
        assert!(!date_matches(FilterOperator::OlderThanXWeeks, "", "2000-01-01"));
    }

    #[test]
    fn test_column_filters_set_and_clear() {
        let mut filters = ColumnFilters::new();
        filters.set("name", FilterCondition::new(FilterOperator::Contains, "boiler"));
        assert!(filters.is_filtered("name"));
        assert_eq!(filters.active_count(), 1);
        assert!(filters.clear("name"));
        assert!(!filters.clear("name"));
        assert!(!filters.is_filtered("name"));
        assert!(filters.is_empty());
        let json = serde_json::to_string(&filters).unwrap();
        assert_eq!(json, r#"{"name":null}"#);
    }

    #[test]
    fn test_column_filters_deserialize_with_nulls() {
        let json = r#"{"name":{"operator":"equals","value":"Damper"},"lineStatus":null,"createdOn":{"operator":"today"}}"#;
        let filters: ColumnFilters = serde_json::from_str(json).unwrap();
        assert_eq!(filters.active_count(), 2);
        assert_eq!(
            filters.get("createdOn"),
            Some(&FilterCondition::without_value(FilterOperator::Today))
        );
        assert!(!filters.is_filtered("lineStatus"));
    }

    #[test]
    fn test_unknown_operator_name_survives_save() {
        let json = r#"{"name":{"operator":"between","value":"a..z"}}"#;
        let mut filters: ColumnFilters = serde_json::from_str(json).unwrap();
        let loaded = filters.get("name").unwrap();
        assert_eq!(loaded.operator, FilterOperator::Unrecognized);
        assert_eq!(loaded.operator_name(), "between");

        filters.set("qty", FilterCondition::new(FilterOperator::GreaterThan, "0"));
        let saved = serde_json::to_string(&filters).unwrap();
        assert!(saved.contains(r#""name":{"operator":"between","value":"a..z"}"#));
        assert!(saved.contains(r#""qty":{"operator":"greater-than","value":"0"}"#));
    }

    #[test]
    fn test_literal_validity() {
        assert!(Literal::parse(ValueKind::Count, "12").is_valid());
        assert!(!Literal::parse(ValueKind::Count, "1.5").is_valid());
        assert!(!Literal::parse(ValueKind::Date, "09/10/2025").is_valid());
        assert_eq!(
            Literal::parse(ValueKind::FiscalPeriodAndYear, "3/2024"),
            Literal::FiscalPeriodAndYear(Some((3, 2024)))
        );
        assert_eq!(Literal::parse(ValueKind::Text, "MiXed"), Literal::Text("mixed".into()));
    }

    #[test]
    fn test_condition_summary() {
        assert_eq!(
            FilterCondition::new(FilterOperator::GreaterThan, " 10 ").summary(),
            "Greater than 10"
        );
        assert_eq!(
            FilterCondition::new(FilterOperator::Today, "stale").summary(),
            "Today"
        );
    }
}
