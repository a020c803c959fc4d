//! Token substitution engine for content templates.
//!
//! Column tokens are delimited (`%NAME%`) and replaced column by column in
//! the order of the column list. Substituted text is never rescanned, so a
//! value containing `%OTHER%` survives as is, and `%NAME%` never matches
//! inside `%NAME2%`. When tokens share a delimiter the earlier column wins:
//! with columns `[B, A]`, `"%A%B%"` renders as `"%A" + b`.
//!
//! The kind and time markers are matched differently. After column tokens
//! are done, `%DMLTYPE%` and `%TIMESTAMP%` are replaced as whole tokens, and
//! then every remaining bare `DMLTYPE` or `TIMESTAMP` substring is replaced
//! too, anywhere in the text and including inside substituted values. So
//! `"at %TIMESTAMP%"` renders as `"at 1700000000000"` while
//! `"LAST_DMLTYPE"` renders as `"LAST_INSERT"`. A column named `DMLTYPE`
//! takes precedence over the marker since columns are substituted first.

use std::collections::HashSet;

use crate::event::{DmlType, RawValue};
use crate::format::FormatterRegistry;

use super::types::{RenderError, RenderResult};

pub const DML_TYPE_MARKER: &str = "DMLTYPE";
pub const TIMESTAMP_MARKER: &str = "TIMESTAMP";

/// Substitute `%column%` tokens with the formatted values.
///
/// Columns are processed in column order, whether or not the template
/// references them. A repeated column name keeps its first value. Tokens
/// naming no column are left as they are. Names are matched literally, so a
/// name containing `%` (`na%me`) is found through its token `%na%me%`.
pub fn substitute_tokens(
    template: &str,
    names: &[String],
    values: &[RawValue],
    formatters: &FormatterRegistry,
) -> RenderResult<String> {
    if names.len() != values.len() {
        tracing::warn!(
            names = names.len(),
            values = values.len(),
            "Column names and values differ in length, surplus entries ignored"
        );
    }

    let mut segments = vec![Segment::Template(template.to_string())];
    let mut seen: HashSet<&str> = HashSet::with_capacity(names.len());

    for (name, value) in names.iter().zip(values) {
        if !seen.insert(name.as_str()) {
            continue;
        }
        let text = formatters
            .format(name, value.as_deref())
            .map_err(|source| RenderError::Format {
                column: name.clone(),
                source,
            })?;
        segments = replace_token(segments, &format!("%{}%", name), &text);
    }

    Ok(segments
        .into_iter()
        .map(|segment| match segment {
            Segment::Template(text) | Segment::Value(text) => text,
        })
        .collect())
}

/// Template text still open to substitution, or an already substituted value
enum Segment {
    Template(String),
    Value(String),
}

/// Replace `token` in every template segment; values are never rescanned
fn replace_token(segments: Vec<Segment>, token: &str, text: &str) -> Vec<Segment> {
    let mut out = Vec::with_capacity(segments.len());

    for segment in segments {
        let template = match segment {
            Segment::Template(template) if template.contains(token) => template,
            other => {
                out.push(other);
                continue;
            }
        };

        let mut pieces = template.split(token);
        if let Some(first) = pieces.next() {
            out.push(Segment::Template(first.to_string()));
        }
        for piece in pieces {
            out.push(Segment::Value(text.to_string()));
            out.push(Segment::Template(piece.to_string()));
        }
    }

    out
}

/// Replace the `DMLTYPE` and `TIMESTAMP` markers, delimited or bare
pub fn apply_markers(text: &str, kind: DmlType, timestamp_millis: i64) -> String {
    let timestamp = timestamp_millis.to_string();
    text.replace(&format!("%{}%", DML_TYPE_MARKER), kind.as_str())
        .replace(&format!("%{}%", TIMESTAMP_MARKER), &timestamp)
        .replace(DML_TYPE_MARKER, kind.as_str())
        .replace(TIMESTAMP_MARKER, &timestamp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{DecimalFormatter, FormatError};

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn values(list: &[Option<&str>]) -> Vec<RawValue> {
        list.iter().map(|v| v.map(str::to_string)).collect()
    }

    #[test]
    fn test_substitute_simple() {
        let result = substitute_tokens(
            "Hello, %NAME%!",
            &names(&["NAME"]),
            &values(&[Some("World")]),
            &FormatterRegistry::new(),
        )
        .unwrap();
        assert_eq!(result, "Hello, World!");
    }

    #[test]
    fn test_substitute_every_occurrence() {
        let result = substitute_tokens(
            "%ID%-%ID%",
            &names(&["ID"]),
            &values(&[Some("7")]),
            &FormatterRegistry::new(),
        )
        .unwrap();
        assert_eq!(result, "7-7");
    }

    #[test]
    fn test_prefix_names_do_not_collide() {
        let result = substitute_tokens(
            "%NAME%|%NAME2%",
            &names(&["NAME", "NAME2"]),
            &values(&[Some("a"), Some("b")]),
            &FormatterRegistry::new(),
        )
        .unwrap();
        assert_eq!(result, "a|b");
    }

    #[test]
    fn test_substituted_text_is_not_rescanned() {
        let result = substitute_tokens(
            "%A% %B%",
            &names(&["A", "B"]),
            &values(&[Some("%B%"), Some("b")]),
            &FormatterRegistry::new(),
        )
        .unwrap();
        assert_eq!(result, "%B% b");
    }

    #[test]
    fn test_unknown_tokens_untouched() {
        let result = substitute_tokens(
            "%ID% %MISSING% 100%",
            &names(&["ID"]),
            &values(&[Some("1")]),
            &FormatterRegistry::new(),
        )
        .unwrap();
        assert_eq!(result, "1 %MISSING% 100%");
    }

    #[test]
    fn test_percent_before_token() {
        let result = substitute_tokens(
            "50%%RATE%",
            &names(&["RATE"]),
            &values(&[Some("x")]),
            &FormatterRegistry::new(),
        )
        .unwrap();
        assert_eq!(result, "50%x");
    }

    #[test]
    fn test_shared_delimiter_follows_column_order() {
        let result = substitute_tokens(
            "%A%B%",
            &names(&["B", "A"]),
            &values(&[Some("b"), Some("a")]),
            &FormatterRegistry::new(),
        )
        .unwrap();
        assert_eq!(result, "%Ab");

        let result = substitute_tokens(
            "%A%B%",
            &names(&["A", "B"]),
            &values(&[Some("a"), Some("b")]),
            &FormatterRegistry::new(),
        )
        .unwrap();
        assert_eq!(result, "aB%");
    }

    #[test]
    fn test_column_name_with_percent() {
        let result = substitute_tokens(
            "rate=%na%me%",
            &names(&["na%me"]),
            &values(&[Some("5")]),
            &FormatterRegistry::new(),
        )
        .unwrap();
        assert_eq!(result, "rate=5");
    }

    #[test]
    fn test_null_renders_empty() {
        let result = substitute_tokens(
            "[%NOTE%]",
            &names(&["NOTE"]),
            &values(&[None]),
            &FormatterRegistry::new(),
        )
        .unwrap();
        assert_eq!(result, "[]");
    }

    #[test]
    fn test_first_duplicate_wins() {
        let result = substitute_tokens(
            "%ID%",
            &names(&["ID", "ID"]),
            &values(&[Some("first"), Some("second")]),
            &FormatterRegistry::new(),
        )
        .unwrap();
        assert_eq!(result, "first");
    }

    #[test]
    fn test_length_mismatch_zips() {
        let result = substitute_tokens(
            "%A%%B%",
            &names(&["A", "B"]),
            &values(&[Some("1")]),
            &FormatterRegistry::new(),
        )
        .unwrap();
        assert_eq!(result, "1%B%");
    }

    #[test]
    fn test_formatter_failure_names_column() {
        let formatters = FormatterRegistry::new().register("AMOUNT", DecimalFormatter::new(2));
        let err = substitute_tokens(
            "no tokens",
            &names(&["ID", "AMOUNT"]),
            &values(&[Some("1"), Some("lots")]),
            &formatters,
        )
        .unwrap_err();
        assert_eq!(err.column(), "AMOUNT");
        let RenderError::Format { source, .. } = err;
        assert_eq!(source, FormatError::invalid("lots", "not a number"));
    }

    #[test]
    fn test_delimited_markers() {
        assert_eq!(
            apply_markers("Row: %DMLTYPE% at %TIMESTAMP%", DmlType::Insert, 1700000000000),
            "Row: INSERT at 1700000000000"
        );
    }

    #[test]
    fn test_bare_markers_match_anywhere() {
        assert_eq!(
            apply_markers("DMLTYPE/TIMESTAMP", DmlType::Delete, 5),
            "DELETE/5"
        );
        assert_eq!(
            apply_markers("LAST_DMLTYPE=%DMLTYPE%", DmlType::Update, 5),
            "LAST_UPDATE=UPDATE"
        );
    }

    #[test]
    fn test_markers_reach_into_substituted_values() {
        let text = substitute_tokens(
            "%NOTE%",
            &names(&["NOTE"]),
            &values(&[Some("see TIMESTAMP")]),
            &FormatterRegistry::new(),
        )
        .unwrap();
        assert_eq!(apply_markers(&text, DmlType::Insert, 9), "see 9");
    }
}
