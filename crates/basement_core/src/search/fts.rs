//! SQLite FTS5 listing and search over the inventory projection.
//!
//! # Responsibility
//! - Serve paged summary rows per entity kind, optionally per container.
//! - Provide keyword search across every kind.
//!
//! # Invariants
//! - Listing order is deterministic: label, then id.
//! - User text is always escaped before reaching `MATCH` unless the caller
//!   explicitly opts into raw FTS5 syntax.

use crate::db::DbError;
use crate::model::entity::{EntityId, EntityKind, ParentRef};
use crate::model::summary::{ParentSummary, SummaryRow};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Result type for search APIs.
pub type SearchResult<T> = Result<T, SearchError>;

const SUMMARY_COLUMNS: &str = "entity_id,
            kind,
            label,
            description,
            preview_picture,
            parent_kind,
            parent_id,
            parent_label";

/// Search-layer error for query parsing, DB interaction and result decoding.
#[derive(Debug)]
pub enum SearchError {
    /// User-provided query cannot be parsed by FTS5 syntax.
    InvalidQuery {
        query: String,
        message: String,
    },
    Db(DbError),
    InvalidData(String),
}

impl Display for SearchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidQuery { query, message } => {
                write!(f, "invalid full-text query `{query}`: {message}")
            }
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid search row: {message}"),
        }
    }
}

impl Error for SearchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidQuery { .. } => None,
            Self::Db(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for SearchError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for SearchError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Which projection rows a listing covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListFilter {
    pub kind: EntityKind,
    /// Restricts the listing to direct children of one container.
    pub parent: Option<ParentRef>,
    /// Label prefix text; blank lists everything.
    pub text: String,
}

impl ListFilter {
    pub fn new(kind: EntityKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            parent: None,
            text: text.into(),
        }
    }

    pub fn inside(parent: ParentRef, kind: EntityKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            parent: Some(parent),
            text: text.into(),
        }
    }
}

/// Search options for full-text query behavior.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    /// User query text.
    pub text: String,
    /// Optional kind filter.
    pub kind: Option<EntityKind>,
    /// Maximum number of hits to return.
    pub limit: u32,
    /// Whether to pass text directly as raw FTS5 expression.
    ///
    /// Default is `false` to protect type-as-you-search UX from syntax errors.
    pub raw_fts_syntax: bool,
}

impl SearchQuery {
    /// Creates a query with default limit and no kind filter.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: None,
            limit: 20,
            raw_fts_syntax: false,
        }
    }
}

/// Returns one page of summary rows matching `filter`.
///
/// `page` is 1-based; page 0 is treated as page 1. A zero `limit` yields an
/// empty page.
pub fn list_rows(
    conn: &Connection,
    filter: &ListFilter,
    limit: u32,
    page: u32,
) -> SearchResult<Vec<SummaryRow>> {
    if limit == 0 {
        return Ok(Vec::new());
    }

    let (where_sql, mut bind_values, match_expr) = filter_clause(filter);
    let offset = u64::from(page.max(1) - 1) * u64::from(limit);
    let sql = format!(
        "SELECT {SUMMARY_COLUMNS}
         FROM search_rows
         WHERE {where_sql}
         ORDER BY label ASC, entity_id ASC
         LIMIT ? OFFSET ?;"
    );
    bind_values.push(Value::Integer(i64::from(limit)));
    bind_values.push(Value::Integer(i64::try_from(offset).unwrap_or(i64::MAX)));

    query_summary_rows(conn, &sql, bind_values, match_expr.as_deref())
}

/// Counts projection rows matching `filter`.
pub fn count_rows(conn: &Connection, filter: &ListFilter) -> SearchResult<u64> {
    let (where_sql, bind_values, match_expr) = filter_clause(filter);
    let sql = format!("SELECT COUNT(*) FROM search_rows WHERE {where_sql};");
    let query_text = match_expr.as_deref().unwrap_or_default();
    let count: i64 = conn
        .query_row(&sql, params_from_iter(bind_values), |row| row.get(0))
        .map_err(|err| map_query_error(err, query_text))?;
    u64::try_from(count).map_err(|_| SearchError::InvalidData(format!("negative row count {count}")))
}

/// Returns the summary row of one entity, if projected.
pub fn list_row(
    conn: &Connection,
    kind: EntityKind,
    id: EntityId,
) -> SearchResult<Option<SummaryRow>> {
    let sql = format!(
        "SELECT {SUMMARY_COLUMNS}
         FROM search_rows
         WHERE kind = ? AND entity_id = ?;"
    );
    let bind_values = vec![
        Value::Text(kind.as_str().to_string()),
        Value::Text(id.to_string()),
    ];
    Ok(query_summary_rows(conn, &sql, bind_values, None)?
        .into_iter()
        .next())
}

/// Searches labels, descriptions and parent labels across every kind.
///
/// Returns an empty list for blank queries.
pub fn search_all(conn: &Connection, query: &SearchQuery) -> SearchResult<Vec<SummaryRow>> {
    let Some(match_expr) = build_match_expression(query) else {
        return Ok(Vec::new());
    };

    if query.limit == 0 {
        return Ok(Vec::new());
    }

    let mut sql = format!(
        "SELECT {SUMMARY_COLUMNS}
         FROM search_rows
         WHERE search_rows MATCH ?"
    );
    let mut bind_values: Vec<Value> = vec![Value::Text(match_expr.clone())];

    if let Some(kind) = query.kind {
        sql.push_str(" AND kind = ?");
        bind_values.push(Value::Text(kind.as_str().to_string()));
    }

    sql.push_str(" ORDER BY bm25(search_rows), label ASC, entity_id ASC LIMIT ?");
    bind_values.push(Value::Integer(i64::from(query.limit)));

    query_summary_rows(conn, &sql, bind_values, Some(&match_expr))
}

fn query_summary_rows(
    conn: &Connection,
    sql: &str,
    bind_values: Vec<Value>,
    match_expr: Option<&str>,
) -> SearchResult<Vec<SummaryRow>> {
    let query_text = match_expr.unwrap_or_default();
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt
        .query(params_from_iter(bind_values))
        .map_err(|err| map_query_error(err, query_text))?;
    let mut summaries = Vec::new();

    while let Some(row) = rows.next().map_err(|err| map_query_error(err, query_text))? {
        summaries.push(parse_summary_row(row)?);
    }

    Ok(summaries)
}

/// Builds the shared `WHERE` body for listing and counting.
fn filter_clause(filter: &ListFilter) -> (String, Vec<Value>, Option<String>) {
    let mut sql = String::from("kind = ?");
    let mut bind_values = vec![Value::Text(filter.kind.as_str().to_string())];

    if let Some(parent) = filter.parent {
        sql.push_str(" AND parent_kind = ? AND parent_id = ?");
        bind_values.push(Value::Text(parent.kind.as_str().to_string()));
        bind_values.push(Value::Text(parent.id.to_string()));
    }

    let match_expr = build_label_prefix_expression(&filter.text);
    if let Some(expr) = &match_expr {
        sql.push_str(" AND search_rows MATCH ?");
        bind_values.push(Value::Text(expr.clone()));
    }

    (sql, bind_values, match_expr)
}

fn parse_summary_row(row: &Row<'_>) -> SearchResult<SummaryRow> {
    let id_text: String = row.get("entity_id")?;
    let kind_text: String = row.get("kind")?;
    let kind = EntityKind::parse(&kind_text)
        .ok_or_else(|| SearchError::InvalidData(format!("invalid kind `{kind_text}`")))?;

    let parent_kind: Option<String> = row.get("parent_kind")?;
    let parent_id: Option<String> = row.get("parent_id")?;
    let parent = match (parent_kind, parent_id) {
        (Some(kind_text), Some(id_text)) => Some(ParentSummary {
            kind: EntityKind::parse(&kind_text).ok_or_else(|| {
                SearchError::InvalidData(format!("invalid parent kind `{kind_text}`"))
            })?,
            id: parse_uuid(&id_text)?,
            label: row.get::<_, Option<String>>("parent_label")?.unwrap_or_default(),
        }),
        _ => None,
    };

    Ok(SummaryRow {
        id: parse_uuid(&id_text)?,
        kind,
        label: row.get("label")?,
        description: row.get("description")?,
        preview_picture: row.get("preview_picture")?,
        parent,
    })
}

fn parse_uuid(value: &str) -> SearchResult<Uuid> {
    Uuid::parse_str(value).map_err(|_| SearchError::InvalidData(format!("invalid uuid `{value}`")))
}

/// Prefix match on the label column, one clause per whitespace term.
fn build_label_prefix_expression(text: &str) -> Option<String> {
    let terms = text
        .split_whitespace()
        .map(|term| format!("label : {}*", escape_fts_term(term)))
        .collect::<Vec<_>>();

    if terms.is_empty() {
        return None;
    }

    Some(terms.join(" AND "))
}

fn build_match_expression(query: &SearchQuery) -> Option<String> {
    let text = query.text.trim();
    if text.is_empty() {
        return None;
    }

    if query.raw_fts_syntax {
        return Some(text.to_string());
    }

    let terms = text
        .split_whitespace()
        .map(|term| format!("{}*", escape_fts_term(term)))
        .collect::<Vec<_>>();

    if terms.is_empty() {
        return None;
    }

    Some(terms.join(" AND "))
}

fn escape_fts_term(raw: &str) -> String {
    let escaped = raw.replace('"', "\"\"");
    format!("\"{escaped}\"")
}

fn map_query_error(err: rusqlite::Error, query: &str) -> SearchError {
    if is_match_syntax_error(&err) {
        return SearchError::InvalidQuery {
            query: query.to_string(),
            message: err.to_string(),
        };
    }

    SearchError::Db(DbError::Sqlite(err))
}

fn is_match_syntax_error(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(_, Some(message)) => {
            let msg = message.to_lowercase();
            (msg.contains("fts5") && msg.contains("syntax"))
                || msg.contains("malformed match expression")
                || msg.contains("unterminated")
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::{build_label_prefix_expression, build_match_expression, SearchQuery};

    #[test]
    fn label_prefix_expression_escapes_quotes() {
        assert_eq!(build_label_prefix_expression("   "), None);
        assert_eq!(
            build_label_prefix_expression("red \"box"),
            Some("label : \"red\"* AND label : \"\"\"box\"*".to_string())
        );
    }

    #[test]
    fn raw_syntax_passes_text_through() {
        let mut query = SearchQuery::new("  drill OR saw ");
        assert_eq!(
            build_match_expression(&query),
            Some("\"drill\"* AND \"OR\"* AND \"saw\"*".to_string())
        );

        query.raw_fts_syntax = true;
        assert_eq!(
            build_match_expression(&query),
            Some("drill OR saw".to_string())
        );
    }
}
