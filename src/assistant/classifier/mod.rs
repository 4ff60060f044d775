
use fancy_regex::Regex;
use std::collections::HashSet;
use tracing::warn;

use crate::config::ScopeConfig;
use crate::{PartsError, Result};

const PART_NUMBER_PATTERN: &str = r"\bPS\d+\b";

/// Decides how a query is routed before any collaborator is called
#[derive(Debug, Clone)]
pub struct QueryClassifier {
    greetings: HashSet<String>,
    keywords: Vec<String>,
    part_number: Regex,
}

impl QueryClassifier {
    /// Build a classifier from explicit greeting and keyword sets.
    ///
    /// Both sets are compared in lower case.
    #[inline]
    pub fn new<G, K>(greetings: G, keywords: K) -> Result<Self>
    where
        G: IntoIterator,
        G::Item: AsRef<str>,
        K: IntoIterator,
        K::Item: AsRef<str>,
    {
        let part_number = Regex::new(PART_NUMBER_PATTERN)
            .map_err(|e| PartsError::Config(format!("Invalid part number pattern: {}", e)))?;

        Ok(Self {
            greetings: greetings
                .into_iter()
                .map(|g| g.as_ref().trim().to_lowercase())
                .filter(|g| !g.is_empty())
                .collect(),
            keywords: keywords
                .into_iter()
                .map(|k| k.as_ref().trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
            part_number,
        })
    }

    #[inline]
    pub fn from_scope(scope: &ScopeConfig) -> Result<Self> {
        Self::new(&scope.greetings, &scope.keywords)
    }

    /// First `PS<digits>` token in the query, uppercased
    #[inline]
    pub fn extract_part_number(&self, text: &str) -> Option<String> {
        let upper = text.to_uppercase();
        match self.part_number.find(&upper) {
            Ok(found) => found.map(|m| m.as_str().to_string()),
            Err(e) => {
                warn!("Part number scan failed: {}", e);
                None
            }
        }
    }

    /// Exact match against the greeting set, no fuzzy matching
    #[inline]
    pub fn is_greeting(&self, text: &str) -> bool {
        self.greetings.contains(&text.trim().to_lowercase())
    }

    /// True when the query mentions none of the scope keywords.
    ///
    /// Keywords match as substrings so plural and compound forms
    /// ("racks", "icemaker") are admitted.
    #[inline]
    pub fn is_out_of_scope(&self, text: &str) -> bool {
        let lower = text.to_lowercase();
        !self.keywords.iter().any(|keyword| lower.contains(keyword))
    }
}
