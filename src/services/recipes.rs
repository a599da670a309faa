//! Recipe fetch: one `values.get`, rows reshaped into `Recipe` records.

use serde::{Deserialize, Serialize};

use crate::config::SheetConfig;
use crate::google::{AccessToken, GoogleError, SheetsApi};

/// One spreadsheet row. Columns A–E map positionally onto the text fields;
/// cells missing from a short row stay `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contributor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingredients: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directions: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Loaded(Vec<Recipe>),
    /// The range held no rows; nothing to publish.
    Empty,
}

/// Map rows to recipes, ids by zero-based row position.
#[must_use]
pub fn rows_to_recipes(rows: &[Vec<String>]) -> Vec<Recipe> {
    rows.iter()
        .enumerate()
        .map(|(id, row)| {
            let cell = |i: usize| row.get(i).cloned();
            Recipe {
                id,
                title: cell(0),
                contributor: cell(1),
                category: cell(2),
                ingredients: cell(3),
                directions: cell(4),
            }
        })
        .collect()
}

/// Read the configured recipe range with `token`.
///
/// # Errors
///
/// Propagates the [`GoogleError`] from the Sheets call; callers leave the
/// published recipe list untouched on error.
pub async fn fetch_recipes(
    sheets: &dyn SheetsApi,
    token: &AccessToken,
    sheet: &SheetConfig,
) -> Result<FetchOutcome, GoogleError> {
    let range = sheet.range();
    let values = sheets
        .get_values(token, &sheet.spreadsheet_id, &range)
        .await?;

    let rows = values.rows();
    if rows.is_empty() {
        tracing::info!(spreadsheet_id = %sheet.spreadsheet_id, %range, "no values found");
        return Ok(FetchOutcome::Empty);
    }

    let short_rows = rows.iter().filter(|r| r.len() < 5).count();
    if short_rows > 0 {
        tracing::debug!(short_rows, "rows with fewer than five cells");
    }

    let recipes = rows_to_recipes(rows);
    tracing::info!(count = recipes.len(), %range, "recipes fetched");
    Ok(FetchOutcome::Loaded(recipes))
}

/// Post-login target: `base`, or `base/<path_name>` when a non-empty
/// `pathName` was captured. The value is appended verbatim.
#[must_use]
pub fn redirect_target(base: &str, path_name: Option<&str>) -> String {
    match path_name {
        Some(p) if !p.is_empty() => format!("{base}/{p}"),
        _ => base.to_owned(),
    }
}

#[cfg(test)]
#[path = "recipes_test.rs"]
mod tests;
