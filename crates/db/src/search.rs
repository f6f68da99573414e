//! Free-text search conditions.
//!
//! Teaser and description are stored HTML-escaped while the other text
//! columns are stored raw, so each term is kept in both forms and matched
//! against the column in the form that column is stored in.

use std::str::FromStr;

use sea_orm::sea_query::LikeExpr;
use sea_orm::{ColumnTrait, Condition};
use serde::{Deserialize, Serialize};

use crate::entities::{ContentType, content};

/// How search terms combine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchOperator {
    /// Every term must match.
    #[default]
    #[serde(alias = "AND", alias = "And")]
    And,
    /// Any term may match.
    #[serde(alias = "OR", alias = "Or")]
    Or,
    /// The whole query is matched as one phrase.
    #[serde(alias = "EXACT", alias = "Exact")]
    Exact,
}

impl FromStr for SearchOperator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "AND" => Ok(Self::And),
            "OR" => Ok(Self::Or),
            "EXACT" => Ok(Self::Exact),
            other => Err(format!("unknown search operator: {other}")),
        }
    }
}

/// Parsed search terms, raw and HTML-escaped side by side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTerms {
    raw: Vec<String>,
    escaped: Vec<String>,
    operator: SearchOperator,
}

impl SearchTerms {
    /// Split `query` into terms. Terms shorter than `min_length` characters
    /// are dropped.
    #[must_use]
    pub fn parse(query: &str, operator: SearchOperator, min_length: usize) -> Self {
        let candidates: Vec<&str> = match operator {
            SearchOperator::Exact => vec![query.trim()],
            SearchOperator::And | SearchOperator::Or => query.split_whitespace().collect(),
        };

        let raw: Vec<String> = candidates
            .into_iter()
            .filter(|term| !term.is_empty() && term.chars().count() >= min_length)
            .map(str::to_string)
            .collect();
        let escaped = raw.iter().map(|term| escape_stored_text(term)).collect();

        Self {
            raw,
            escaped,
            operator,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    #[must_use]
    pub fn raw(&self) -> &[String] {
        &self.raw
    }

    #[must_use]
    pub fn escaped(&self) -> &[String] {
        &self.escaped
    }

    #[must_use]
    pub const fn operator(&self) -> SearchOperator {
        self.operator
    }

    /// WHERE clause for the terms, restricted to online, non-block content.
    #[must_use]
    pub fn condition(&self) -> Condition {
        let mut terms = match self.operator {
            SearchOperator::Or => Condition::any(),
            SearchOperator::And | SearchOperator::Exact => Condition::all(),
        };

        for (raw, escaped) in self.raw.iter().zip(&self.escaped) {
            terms = terms.add(
                Condition::any()
                    .add(content::Column::Title.like(contains(raw)))
                    .add(content::Column::Teaser.like(contains(escaped)))
                    .add(content::Column::Description.like(contains(escaped)))
                    .add(content::Column::Caption.like(contains(raw)))
                    .add(content::Column::Creator.like(contains(raw)))
                    .add(content::Column::Publisher.like(contains(raw))),
            );
        }

        Condition::all()
            .add(content::Column::Online.eq(true))
            .add(content::Column::ContentType.ne(ContentType::Block.as_str()))
            .add(terms)
    }
}

fn contains(term: &str) -> LikeExpr {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    LikeExpr::new(format!("%{escaped}%")).escape('\\')
}

/// Escape text the way the HTML sanitizer serializes text nodes. Quotes are
/// left alone there, so they are left alone here.
#[must_use]
pub fn escape_stored_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape every HTML special character, quotes included, for output.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}
