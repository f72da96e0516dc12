//! Currency list shown to the user: favorites, or search matches.

use super::rates::RateTable;
use super::settings::FavoritesList;

pub const MAX_SEARCH_RESULTS: usize = 50;

/// Favorites when `search` is blank; otherwise every code known to `table`
/// whose code or display name contains the term, ignoring case.
///
/// Matches follow the table's key order and are capped at
/// [`MAX_SEARCH_RESULTS`].
pub fn filter_currencies<F>(
    table: Option<&RateTable>,
    favorites: &FavoritesList,
    search: &str,
    name_of: F,
) -> Vec<String>
where
    F: Fn(&str) -> Option<&'static str>,
{
    let term = search.trim().to_lowercase();
    if term.is_empty() {
        return favorites.as_slice().to_vec();
    }

    let Some(table) = table else {
        return Vec::new();
    };

    table
        .codes()
        .into_iter()
        .filter(|code| {
            code.to_lowercase().contains(&term)
                || name_of(code).is_some_and(|name| name.to_lowercase().contains(&term))
        })
        .take(MAX_SEARCH_RESULTS)
        .map(str::to_string)
        .collect()
}
