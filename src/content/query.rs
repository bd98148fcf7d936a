//! Read queries over a collection.
//!
//! A `Query` renders to a PostgREST query string for the REST backend and is
//! evaluated directly against JSON rows by the memory backend, so both
//! backends agree on filter and ordering semantics.
//!
//! ```text
//! Query::new().eq("slug", "hello").order_desc("published_at").limit(1)
//!   -> select=*&slug=eq.hello&order=published_at.desc.nullslast&limit=1
//! ```

use std::cmp::Ordering;

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use serde_json::{Map, Value};

/// Characters escaped in query values. PostgREST reserves `,` `.` `:` `(`
/// `)` inside filter expressions, plus the usual query-string delimiters.
const QUERY_VALUE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'+')
    .add(b',')
    .add(b'(')
    .add(b')')
    .add(b'=')
    .add(b'?');

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    IsNull,
    NotNull,
}

impl FilterOp {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Neq => "neq",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::IsNull => "is",
            Self::NotNull => "not.is",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub column: String,
    pub op: FilterOp,
    pub value: Value,
}

impl Filter {
    /// Whether `row` passes. Comparisons against a null column are false.
    pub fn matches(&self, row: &Value) -> bool {
        let field = row.get(&self.column).unwrap_or(&Value::Null);
        match self.op {
            FilterOp::IsNull => field.is_null(),
            FilterOp::NotNull => !field.is_null(),
            _ if field.is_null() => false,
            FilterOp::Eq => loose_eq(field, &self.value),
            FilterOp::Neq => !loose_eq(field, &self.value),
            FilterOp::Gt => compare(field, &self.value) == Some(Ordering::Greater),
            FilterOp::Gte => matches!(
                compare(field, &self.value),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            FilterOp::Lt => compare(field, &self.value) == Some(Ordering::Less),
            FilterOp::Lte => matches!(
                compare(field, &self.value),
                Some(Ordering::Less | Ordering::Equal)
            ),
        }
    }

    fn render(&self) -> String {
        let value = match self.op {
            FilterOp::IsNull | FilterOp::NotNull => "null".to_string(),
            _ => utf8_percent_encode(&scalar_text(&self.value), QUERY_VALUE).to_string(),
        };
        format!("{}={}.{}", self.column, self.op.as_str(), value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub direction: Direction,
}

/// Column selection, filters, ordering and limit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    select: Option<String>,
    filters: Vec<Filter>,
    order: Vec<Order>,
    limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Comma-separated column list. Defaults to `*`.
    pub fn select(mut self, columns: impl Into<String>) -> Self {
        self.select = Some(columns.into());
        self
    }

    pub fn filter(mut self, column: impl Into<String>, op: FilterOp, value: impl Into<Value>) -> Self {
        self.filters.push(Filter {
            column: column.into(),
            op,
            value: value.into(),
        });
        self
    }

    pub fn eq(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter(column, FilterOp::Eq, value)
    }

    pub fn neq(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter(column, FilterOp::Neq, value)
    }

    pub fn gt(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter(column, FilterOp::Gt, value)
    }

    pub fn gte(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter(column, FilterOp::Gte, value)
    }

    pub fn lt(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter(column, FilterOp::Lt, value)
    }

    pub fn lte(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter(column, FilterOp::Lte, value)
    }

    pub fn is_null(self, column: impl Into<String>) -> Self {
        self.filter(column, FilterOp::IsNull, Value::Null)
    }

    pub fn not_null(self, column: impl Into<String>) -> Self {
        self.filter(column, FilterOp::NotNull, Value::Null)
    }

    /// Order by `column`; null values sort last in either direction.
    pub fn order(mut self, column: impl Into<String>, direction: Direction) -> Self {
        self.order.push(Order {
            column: column.into(),
            direction,
        });
        self
    }

    pub fn order_asc(self, column: impl Into<String>) -> Self {
        self.order(column, Direction::Asc)
    }

    pub fn order_desc(self, column: impl Into<String>) -> Self {
        self.order(column, Direction::Desc)
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn has_order(&self) -> bool {
        !self.order.is_empty()
    }

    pub fn get_limit(&self) -> Option<usize> {
        self.limit
    }

    /// PostgREST query string, also used as the cache key.
    pub fn to_query_string(&self) -> String {
        let mut parts = Vec::with_capacity(self.filters.len() + 3);
        parts.push(format!("select={}", self.select.as_deref().unwrap_or("*")));
        parts.extend(self.filters.iter().map(Filter::render));

        if !self.order.is_empty() {
            let order = self
                .order
                .iter()
                .map(|o| {
                    let dir = match o.direction {
                        Direction::Asc => "asc",
                        Direction::Desc => "desc",
                    };
                    format!("{}.{dir}.nullslast", o.column)
                })
                .collect::<Vec<_>>()
                .join(",");
            parts.push(format!("order={order}"));
        }

        if let Some(limit) = self.limit {
            parts.push(format!("limit={limit}"));
        }
        parts.join("&")
    }

    /// Query string carrying only the filters (for PATCH and DELETE).
    pub fn to_filter_string(&self) -> String {
        self.filters
            .iter()
            .map(Filter::render)
            .collect::<Vec<_>>()
            .join("&")
    }

    pub fn matches(&self, row: &Value) -> bool {
        self.filters.iter().all(|f| f.matches(row))
    }

    /// Evaluate against in-memory rows: filter, order, limit, project.
    pub fn apply<'a>(&self, rows: impl IntoIterator<Item = &'a Value>) -> Vec<Value> {
        let mut selected: Vec<&Value> = rows.into_iter().filter(|row| self.matches(row)).collect();

        if !self.order.is_empty() {
            selected.sort_by(|a, b| self.compare_rows(a, b));
        }
        if let Some(limit) = self.limit {
            selected.truncate(limit);
        }

        selected.into_iter().map(|row| self.project(row)).collect()
    }

    fn compare_rows(&self, a: &Value, b: &Value) -> Ordering {
        for order in &self.order {
            let left = a.get(&order.column).filter(|v| !v.is_null());
            let right = b.get(&order.column).filter(|v| !v.is_null());
            let ordering = match (left, right) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(l), Some(r)) => {
                    let ord = compare(l, r).unwrap_or(Ordering::Equal);
                    match order.direction {
                        Direction::Asc => ord,
                        Direction::Desc => ord.reverse(),
                    }
                }
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }

    /// Keep only selected columns. Embedded resources (`author(name)`) are
    /// not evaluated in memory, so such selections return whole rows.
    fn project(&self, row: &Value) -> Value {
        let Some(select) = self.select.as_deref() else {
            return row.clone();
        };
        if select.contains('*') || select.contains('(') {
            return row.clone();
        }
        let Value::Object(fields) = row else {
            return row.clone();
        };

        let projected: Map<String, Value> = select
            .split(',')
            .map(str::trim)
            .filter_map(|col| fields.get(col).map(|v| (col.to_string(), v.clone())))
            .collect();
        Value::Object(projected)
    }
}

/// Text form of a scalar, as PostgREST receives it.
fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// Equality treating `42` and `"42"` as the same id.
fn loose_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Number(_), _) | (_, Value::Number(_)) => {
            matches!((as_number(a), as_number(b)), (Some(x), Some(y)) if x == y)
        }
        _ => a == b,
    }
}

fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => as_number(a)?.partial_cmp(&as_number(b)?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rows() -> Vec<Value> {
        vec![
            json!({"id": 1, "title": "A", "published_at": "2024-01-02", "views": 10}),
            json!({"id": 2, "title": "B", "published_at": null, "views": 5}),
            json!({"id": "3", "title": "C", "published_at": "2024-03-01", "views": 7}),
        ]
    }

    #[test]
    fn test_query_string() {
        let query = Query::new()
            .select("id,title")
            .eq("slug", "hello world")
            .is_null("deleted_at")
            .order_desc("published_at")
            .limit(5);
        assert_eq!(
            query.to_query_string(),
            "select=id,title&slug=eq.hello%20world&deleted_at=is.null&order=published_at.desc.nullslast&limit=5"
        );
    }

    #[test]
    fn test_reserved_characters_escaped() {
        let query = Query::new().eq("title", "Q&A, (live)");
        assert_eq!(
            query.to_filter_string(),
            "title=eq.Q%26A%2C%20%28live%29"
        );
    }

    #[test]
    fn test_default_select() {
        assert_eq!(Query::new().to_query_string(), "select=*");
        assert_eq!(
            Query::new().not_null("image_url").to_query_string(),
            "select=*&image_url=not.is.null"
        );
    }

    #[test]
    fn test_eq_matches_string_and_number_ids() {
        let rows = rows();
        assert_eq!(Query::new().eq("id", "1").apply(&rows).len(), 1);
        assert_eq!(Query::new().eq("id", 3).apply(&rows).len(), 1);
        assert_eq!(Query::new().neq("id", 2).apply(&rows).len(), 2);
    }

    #[test]
    fn test_range_filters() {
        let rows = rows();
        assert_eq!(Query::new().gt("views", 5).apply(&rows).len(), 2);
        assert_eq!(Query::new().gte("views", 5).apply(&rows).len(), 3);
        assert_eq!(Query::new().lt("views", 7).apply(&rows).len(), 1);
        assert_eq!(Query::new().lte("published_at", "2024-01-31").apply(&rows).len(), 1);
    }

    #[test]
    fn test_null_filters() {
        let rows = rows();
        assert_eq!(Query::new().is_null("published_at").apply(&rows).len(), 1);
        assert_eq!(Query::new().not_null("published_at").apply(&rows).len(), 2);
        // comparisons never match a null column
        assert_eq!(Query::new().neq("published_at", "x").apply(&rows).len(), 2);
    }

    #[test]
    fn test_order_nulls_last() {
        let rows = rows();
        let titles = |q: Query| -> Vec<String> {
            q.apply(&rows)
                .iter()
                .map(|r| r["title"].as_str().unwrap().to_string())
                .collect()
        };
        assert_eq!(titles(Query::new().order_desc("published_at")), ["C", "A", "B"]);
        assert_eq!(titles(Query::new().order_asc("published_at")), ["A", "C", "B"]);
    }

    #[test]
    fn test_limit_and_projection() {
        let rows = rows();
        let result = Query::new().select("id, title").order_asc("views").limit(2).apply(&rows);
        assert_eq!(result, vec![json!({"id": 2, "title": "B"}), json!({"id": "3", "title": "C"})]);
    }
}
