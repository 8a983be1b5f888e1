//! Notes from a SQL-over-HTTP endpoint (Datasette-style JSON API).

use readmegen_shared::{NoteRecord, ReadmeError, Result, day_of};
use reqwest::Client;
use serde::Deserialize;
use tracing::{info, instrument};
use url::Url;

use crate::read_body;

#[derive(Debug, Deserialize)]
struct NoteRow {
    title: String,
    url: String,
    created_utc: String,
}

/// Newest-first query against `table`. The row limit travels as the named
/// `:limit` parameter rather than being formatted into the statement.
fn notes_sql(table: &str) -> String {
    format!("select title, url, created_utc from {table} order by created_utc desc limit :limit")
}

/// Fetch the `limit` most recent notes from `table` at `url`.
///
/// `table` must already be validated as a plain identifier.
#[instrument(skip_all, fields(url = %url, table = %table))]
pub async fn fetch_sql_notes(
    http: &Client,
    url: &Url,
    table: &str,
    limit: usize,
) -> Result<Vec<NoteRecord>> {
    let sql = notes_sql(table);
    let limit = limit.to_string();

    let response = http
        .get(url.clone())
        .query(&[
            ("sql", sql.as_str()),
            ("_shape", "array"),
            ("limit", limit.as_str()),
        ])
        .send()
        .await
        .map_err(|e| ReadmeError::Network(format!("{url}: {e}")))?;

    let body = read_body(response, url.as_str()).await?;
    let rows: Vec<NoteRow> = serde_json::from_str(&body)
        .map_err(|e| ReadmeError::parse(format!("{url}: expected a JSON array of rows: {e}")))?;

    let notes = rows
        .into_iter()
        .map(|row| {
            Ok(NoteRecord {
                date: day_of(&row.created_utc)?,
                title: row.title,
                url: row.url,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    info!(notes = notes.len(), "notes fetched");
    Ok(notes)
}
