//! Whitelisted sort and filter grammar for file listings.
//!
//! A sort is `<key> <asc|desc>` with key one of
//! `file|size0|size|sizeb|date0|date`. A filter is a whitelisted column
//! followed by a value expression, e.g. `file like '%report%'`, evaluated
//! against the `_statistics_` table. Anything else is rejected as
//! [`Error::InvalidQuery`] before reaching the database.

use crate::error::{Error, Result};

const SORT_KEYS: &[(&str, &str)] = &[
    ("file", "file"),
    ("size0", "size0"),
    ("size", "size"),
    ("sizeb", "sizeB"),
    ("date0", "date0"),
    ("date", "date"),
];

const FILTER_KEYS: &[(&str, &str)] = &[
    ("file", "file"),
    ("labels", "labels"),
    ("size0", "size0"),
    ("size", "size"),
    ("sizeb", "sizeB"),
    ("date0", "date0"),
    ("date", "date"),
    ("user0", "user0"),
    ("user", "user"),
];

fn invalid(query: &str) -> Error {
    Error::InvalidQuery(query.to_string())
}

/// Parse a sort argument into an `ORDER BY` fragment.
/// Keys and direction are case-insensitive.
pub fn order_clause(sort: &str) -> Result<String> {
    let mut parts = sort.split_whitespace();
    let key = parts.next().ok_or_else(|| invalid(sort))?.to_ascii_lowercase();
    let dir = parts.next().ok_or_else(|| invalid(sort))?.to_ascii_lowercase();
    if parts.next().is_some() {
        return Err(invalid(sort));
    }
    let column = SORT_KEYS
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, c)| *c)
        .ok_or_else(|| invalid(sort))?;
    let direction = match dir.as_str() {
        "asc" => "ASC",
        "desc" => "DESC",
        _ => return Err(invalid(sort)),
    };
    Ok(format!("{column} {direction}"))
}

/// Validate a filter and return the `WHERE` fragment.
pub fn filter_clause(filter: &str) -> Result<String> {
    let trimmed = filter.trim();
    let (key, rest) = trimmed
        .split_once(char::is_whitespace)
        .ok_or_else(|| invalid(filter))?;
    let column = FILTER_KEYS
        .iter()
        .find(|(k, _)| *k == key.to_ascii_lowercase())
        .map(|(_, c)| *c)
        .ok_or_else(|| invalid(filter))?;
    let expression = rest.trim();
    if expression.is_empty() {
        return Err(invalid(filter));
    }
    Ok(format!("{column} {expression}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_whitelisted_sorts() {
        assert_eq!(order_clause("file asc").unwrap(), "file ASC");
        assert_eq!(order_clause("File Desc").unwrap(), "file DESC");
        assert_eq!(order_clause("sizeb desc").unwrap(), "sizeB DESC");
    }

    #[test]
    fn rejects_unknown_sorts() {
        assert!(order_clause("").is_err());
        assert!(order_clause("file").is_err());
        assert!(order_clause("file sideways").is_err());
        assert!(order_clause("versions asc").is_err());
        assert!(order_clause("file asc extra").is_err());
    }

    #[test]
    fn accepts_whitelisted_filters() {
        assert_eq!(
            filter_clause("file like '%a%'").unwrap(),
            "file like '%a%'"
        );
        assert_eq!(filter_clause("sizeb > 1024").unwrap(), "sizeB > 1024");
        assert_eq!(
            filter_clause("labels like '%photo%'").unwrap(),
            "labels like '%photo%'"
        );
    }

    #[test]
    fn rejects_malformed_filters() {
        assert!(filter_clause("").is_err());
        assert!(filter_clause("file").is_err());
        assert!(filter_clause("versions > 2").is_err());
        assert!(filter_clause("raw like '%x%'").is_err());
    }
}
