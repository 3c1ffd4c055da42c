//! # scaffoldsrv Template Listing Parser
//!
//! File: cli/src/core/template_list.rs
//!
//! ## Overview
//!
//! The external tool prints its installed templates as a fixed-width table:
//!
//! ```text
//! These templates matched your input:
//!
//! Template Name        Short Name  Language    Tags
//! -------------------  ----------  ----------  --------------
//! Console Application  console     [C#],F#,VB  Common/Console
//! Class Library        classlib    [C#],F#,VB  Common/Library
//! ```
//!
//! Data cells may contain single spaces ("Console Application"), so rows cannot be
//! split on whitespace. Instead the column boundaries are recovered from the
//! heading row that sits directly above the dashed divider, and every data row is
//! sliced at those character offsets.
//!
//! ## Architecture
//!
//! - `TemplateInfo`: one parsed row (name, languages, tags)
//! - `TemplateListing`: short name → `TemplateInfo`, ordered by short name
//! - `parse_listing`: text → `TemplateListing`, or `ServiceError::FormatChanged`
//! - `installed_delta`: templates present after an install but not before
//!
use crate::core::error::ServiceError;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

/// Number of columns the listing is expected to have: name, short name, language, tags.
const EXPECTED_COLUMNS: usize = 4;

/// Columns are separated by at least this many spaces in the heading row.
const COLUMN_SEPARATOR: &str = "  ";

/// Metadata for a single template, as reported by the external tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateInfo {
    pub name: String,
    pub languages: String,
    pub tags: String,
}

impl fmt::Display for TemplateInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[name={},languages={},tags={}]",
            self.name, self.languages, self.tags
        )
    }
}

/// Parsed templates keyed by short name.
pub type TemplateListing = BTreeMap<String, TemplateInfo>;

/// Character range `[start, end)` of one column. `end` is `None` for the last
/// column, which runs to the end of the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Column {
    start: usize,
    end: Option<usize>,
}

impl Column {
    /// Slices `line` (as chars) to this column and trims the result.
    /// Lines shorter than the column yield a truncated or empty cell.
    fn cell(&self, line: &[char]) -> String {
        let start = self.start.min(line.len());
        let end = self.end.unwrap_or(line.len()).min(line.len());
        line[start..end.max(start)]
            .iter()
            .collect::<String>()
            .trim()
            .to_string()
    }
}

/// # Parse Template Listing (`parse_listing`)
///
/// Parses the raw stdout of a `new --list` invocation.
///
/// 1. Blank lines are dropped.
/// 2. The first line starting with `-` is the divider; the line before it is the
///    heading row.
/// 3. The heading row is split on runs of two or more spaces. Each title's
///    character offset marks where its column starts; a column ends where the
///    next one starts. The divider's dash groups must start at the same offsets.
/// 4. Every line after the divider is sliced at those offsets.
///
/// ## Errors
///
/// Returns `ServiceError::FormatChanged` if there is no divider, no heading row
/// above it, the heading row has fewer than four titles, or the divider's dash
/// groups do not line up with the titles.
pub fn parse_listing(listing: &str) -> Result<TemplateListing, ServiceError> {
    let lines: Vec<&str> = listing
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect();

    let divider_idx = lines
        .iter()
        .position(|line| line.starts_with('-'))
        .ok_or_else(|| ServiceError::FormatChanged("no divider row found".to_string()))?;

    if divider_idx == 0 {
        return Err(ServiceError::FormatChanged(
            "divider row has no heading row above it".to_string(),
        ));
    }

    let columns = heading_columns(lines[divider_idx - 1], lines[divider_idx])?;
    let (name_col, short_name_col, language_col, tags_col) =
        (columns[0], columns[1], columns[2], columns[3]);

    let mut templates = TemplateListing::new();
    for line in &lines[divider_idx + 1..] {
        let chars: Vec<char> = line.trim_end().chars().collect();
        let short_name = short_name_col.cell(&chars);
        if short_name.is_empty() {
            debug!("Skipping listing row without a short name: {:?}", line);
            continue;
        }
        if templates.contains_key(&short_name) {
            debug!("Duplicate short name '{}' in listing, keeping first", short_name);
            continue;
        }

        let info = TemplateInfo {
            name: name_col.cell(&chars),
            languages: language_col.cell(&chars),
            tags: tags_col.cell(&chars),
        };
        templates.insert(short_name, info);
    }

    Ok(templates)
}

/// Character offsets at which each cell of `line` starts: the first non-space
/// char, and every non-space char that follows a run of 2+ spaces.
fn cell_starts(line: &str) -> Vec<usize> {
    let mut starts = Vec::new();
    let mut spaces = 0usize;
    for (idx, ch) in line.trim_end().chars().enumerate() {
        if ch == ' ' {
            spaces += 1;
            continue;
        }
        if starts.is_empty() || spaces >= COLUMN_SEPARATOR.len() {
            starts.push(idx);
        }
        spaces = 0;
    }
    starts
}

/// Derives column boundaries from the heading row and checks them against the
/// dash groups of the divider below it.
fn heading_columns(heading: &str, divider: &str) -> Result<Vec<Column>, ServiceError> {
    let starts = cell_starts(heading);
    if starts.len() < EXPECTED_COLUMNS {
        return Err(ServiceError::FormatChanged(format!(
            "expected {} heading titles, found {} in {:?}",
            EXPECTED_COLUMNS,
            starts.len(),
            heading.trim()
        )));
    }

    let dashes = cell_starts(divider);
    if dashes.len() < EXPECTED_COLUMNS {
        return Err(ServiceError::FormatChanged(format!(
            "expected {} divider groups, found {} in {:?}",
            EXPECTED_COLUMNS,
            dashes.len(),
            divider.trim()
        )));
    }
    if dashes != starts {
        return Err(ServiceError::FormatChanged(format!(
            "divider groups start at {:?} but heading titles at {:?}",
            dashes, starts
        )));
    }

    let columns = starts
        .iter()
        .enumerate()
        .map(|(i, &start)| Column {
            start,
            end: starts.get(i + 1).copied(),
        })
        .collect();
    Ok(columns)
}

/// # Installed Delta (`installed_delta`)
///
/// Returns the templates present in `after` whose short names are absent from
/// `before`.
pub fn installed_delta(before: &TemplateListing, after: TemplateListing) -> TemplateListing {
    after
        .into_iter()
        .filter(|(short_name, _)| !before.contains_key(short_name))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOTNET_LISTING: &str = "\
These templates matched your input:

Template Name                                 Short Name           Language    Tags
--------------------------------------------  -------------------  ----------  --------------------------
ASP.NET Core Empty                            web                  [C#],F#     Web/Empty
ASP.NET Core gRPC Service                     grpc                 [C#]        Web/gRPC
Console App                                   console              [C#],F#,VB  Common/Console
Steeltoe Web API                              stwebapi             [C#]        Steeltoe/Web/WebAPI/Cloud
";

    #[test]
    fn test_parse_minimal_heading() {
        let listing = "\
Name  ShortName  Language  Tags
----  ---------  --------  ----
Foo   foo        C#        a/b
Bar   bar        F#        c
";
        let templates = parse_listing(listing).unwrap();
        assert_eq!(templates.len(), 2);
        assert_eq!(
            templates["foo"],
            TemplateInfo {
                name: "Foo".into(),
                languages: "C#".into(),
                tags: "a/b".into(),
            }
        );
        assert_eq!(templates["bar"].languages, "F#");
        assert_eq!(templates["bar"].tags, "c");
    }

    #[test]
    fn test_parse_padded_listing_with_spaces_in_cells() {
        let templates = parse_listing(DOTNET_LISTING).unwrap();
        assert_eq!(templates.len(), 4);

        let console = &templates["console"];
        assert_eq!(console.name, "Console App");
        assert_eq!(console.languages, "[C#],F#,VB");
        assert_eq!(console.tags, "Common/Console");

        let grpc = &templates["grpc"];
        assert_eq!(grpc.name, "ASP.NET Core gRPC Service");
        assert_eq!(grpc.tags, "Web/gRPC");

        // Last column is not truncated to the heading width.
        assert_eq!(templates["stwebapi"].tags, "Steeltoe/Web/WebAPI/Cloud");
    }

    #[test]
    fn test_short_row_does_not_panic() {
        let listing = "\
Name           ShortName  Language  Tags
-------------  ---------  --------  ----
Solution File  sln
Tiny
";
        let templates = parse_listing(listing).unwrap();
        let sln = &templates["sln"];
        assert_eq!(sln.name, "Solution File");
        assert_eq!(sln.languages, "");
        assert_eq!(sln.tags, "");
        // "Tiny" has no short-name cell at all and is skipped.
        assert_eq!(templates.len(), 1);
    }

    #[test]
    fn test_multibyte_cells() {
        let listing = "\
Name      ShortName  Language  Tags
--------  ---------  --------  ----
Café App  cafe       C#        Démo
";
        let templates = parse_listing(listing).unwrap();
        assert_eq!(templates["cafe"].name, "Café App");
        assert_eq!(templates["cafe"].tags, "Démo");
    }

    #[test]
    fn test_too_few_headings_is_format_changed() {
        let listing = "\
Name  ShortName  Language
----  ---------  --------
Foo   foo        C#
";
        let err = parse_listing(listing).unwrap_err();
        assert!(matches!(err, ServiceError::FormatChanged(_)));
    }

    #[test]
    fn test_missing_divider_is_format_changed() {
        let err = parse_listing("No templates found.\n").unwrap_err();
        assert!(matches!(err, ServiceError::FormatChanged(_)));

        let err = parse_listing("----\nfoo\n").unwrap_err();
        assert!(matches!(err, ServiceError::FormatChanged(_)));
    }

    #[test]
    fn test_divider_with_too_few_groups_is_format_changed() {
        let listing = "\
Name  ShortName  Language  Tags
----  ---------
Foo   foo        C#        a
";
        let err = parse_listing(listing).unwrap_err();
        assert!(matches!(err, ServiceError::FormatChanged(ref msg) if msg.contains("divider groups")));
    }

    #[test]
    fn test_divider_out_of_line_with_heading_is_format_changed() {
        let listing = "\
Name  ShortName  Language  Tags
----  ----  ----  ----
Foo   foo        C#        a
";
        let err = parse_listing(listing).unwrap_err();
        assert!(matches!(err, ServiceError::FormatChanged(ref msg) if msg.contains("divider groups start at")));

        // Indented heading over a flush divider.
        let listing = "\
  Name  ShortName  Language  Tags
------  ---------  --------  ----
Foo     foo        C#        a
";
        assert!(matches!(
            parse_listing(listing),
            Err(ServiceError::FormatChanged(_))
        ));
    }

    #[test]
    fn test_duplicate_short_name_keeps_first() {
        let listing = "\
Name    ShortName  Language  Tags
------  ---------  --------  ----
First   dup        C#        x
Second  dup        F#        y
";
        let templates = parse_listing(listing).unwrap();
        assert_eq!(templates.len(), 1);
        assert_eq!(templates["dup"].name, "First");
    }

    #[test]
    fn test_installed_delta() {
        let info = |name: &str| TemplateInfo {
            name: name.into(),
            languages: "C#".into(),
            tags: "t".into(),
        };
        let before: TemplateListing = [("a", "A"), ("b", "B")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), info(v)))
            .collect();
        let after: TemplateListing = [("a", "A"), ("b", "B"), ("c", "C")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), info(v)))
            .collect();

        let delta = installed_delta(&before, after);
        assert_eq!(delta.len(), 1);
        assert_eq!(delta["c"], info("C"));
    }

    #[test]
    fn test_template_info_display() {
        let info = TemplateInfo {
            name: "Console App".into(),
            languages: "[C#]".into(),
            tags: "Common/Console".into(),
        };
        assert_eq!(
            info.to_string(),
            "[name=Console App,languages=[C#],tags=Common/Console]"
        );
    }
}
