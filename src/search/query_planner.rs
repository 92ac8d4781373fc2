use std::fmt;

use serde::{Deserialize, Serialize};
use tantivy::Term;
use tantivy::query::{
    BooleanQuery, BoostQuery, EmptyQuery, FuzzyTermQuery, Occur, Query, RegexQuery, TermQuery,
};
use tantivy::schema::IndexRecordOption;

use super::common::{
    DEFAULT_FUZZY_DISTANCE, DEFAULT_MIN_QUERY_LEN, MAX_FUZZY_DISTANCE, MAX_TERM_LENGTH,
};
use super::normalizer::normalize;
use super::schema::{RecordSchema, SearchField};
use super::tokenizer::terms;

/// A raw query as received from the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub raw_term: String,
    pub requested_count: usize,
}

impl SearchQuery {
    pub fn new(raw_term: impl Into<String>, requested_count: usize) -> Self {
        Self {
            raw_term: raw_term.into(),
            requested_count,
        }
    }
}

/// How a single clause matches indexed terms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStrategy {
    /// Term equals the token
    Exact,
    /// Term is within the fuzzy edit distance of the token
    Fuzzy,
    /// Term contains the token (`*token*`)
    Wildcard,
}

impl MatchStrategy {
    pub const ALL: [MatchStrategy; 3] = [
        MatchStrategy::Exact,
        MatchStrategy::Fuzzy,
        MatchStrategy::Wildcard,
    ];

    const EXACT_ONLY: [MatchStrategy; 1] = [MatchStrategy::Exact];

    /// Strategies planned for `token`. Tokens at or over the term length
    /// limit are never indexed and only get the exact clause.
    fn for_token(token: &str) -> &'static [MatchStrategy] {
        if token.len() >= MAX_TERM_LENGTH {
            &Self::EXACT_ONLY
        } else {
            &Self::ALL
        }
    }
}

/// One SHOULD clause of a plan
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedClause {
    pub token: String,
    pub field: SearchField,
    pub strategy: MatchStrategy,
}

impl fmt::Display for PlannedClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.strategy {
            MatchStrategy::Exact => write!(f, "{}:{}", self.field.name(), self.token),
            MatchStrategy::Fuzzy => write!(f, "{}:{}~", self.field.name(), self.token),
            MatchStrategy::Wildcard => write!(f, "{}:*{}*", self.field.name(), self.token),
        }
    }
}

/// A disjunction of clauses; empty plans match nothing
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QueryPlan {
    clauses: Vec<PlannedClause>,
    fuzzy_distance: u8,
}

impl QueryPlan {
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn clauses(&self) -> &[PlannedClause] {
        &self.clauses
    }

    /// Build the tantivy query: every clause is a boosted SHOULD
    pub fn to_query(&self, schema: &RecordSchema) -> tantivy::Result<Box<dyn Query>> {
        if self.clauses.is_empty() {
            return Ok(Box::new(EmptyQuery));
        }

        let mut subqueries: Vec<(Occur, Box<dyn Query>)> = Vec::with_capacity(self.clauses.len());
        for clause in &self.clauses {
            let field = schema.field(clause.field);
            let term = Term::from_field_text(field, &clause.token);

            let query: Box<dyn Query> = match clause.strategy {
                MatchStrategy::Exact => Box::new(TermQuery::new(term, IndexRecordOption::WithFreqs)),
                MatchStrategy::Fuzzy => {
                    Box::new(FuzzyTermQuery::new(term, self.fuzzy_distance, true))
                }
                MatchStrategy::Wildcard => {
                    Box::new(RegexQuery::from_pattern(&wildcard_pattern(&clause.token), field)?)
                }
            };

            subqueries.push((Occur::Should, Box::new(BoostQuery::new(query, clause.field.boost()))));
        }

        Ok(Box::new(BooleanQuery::new(subqueries)))
    }
}

impl fmt::Display for QueryPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, clause) in self.clauses.iter().enumerate() {
            if i > 0 {
                write!(f, " OR ")?;
            }
            write!(f, "{clause}")?;
        }
        Ok(())
    }
}

/// Substring match over whole terms
fn wildcard_pattern(token: &str) -> String {
    format!(".*{}.*", regex::escape(token))
}

/// Expands a query into exact, fuzzy and wildcard clauses over every field
#[derive(Debug, Clone)]
pub struct QueryPlanner {
    min_query_len: usize,
    fuzzy_distance: u8,
}

impl QueryPlanner {
    pub fn new(min_query_len: usize, fuzzy_distance: u8) -> Self {
        Self {
            min_query_len,
            fuzzy_distance: fuzzy_distance.min(MAX_FUZZY_DISTANCE),
        }
    }

    /// Plan a query. Blank or too-short queries produce an empty plan.
    pub fn plan(&self, query: &SearchQuery) -> QueryPlan {
        let normalized = normalize(&query.raw_term);
        if normalized.chars().count() < self.min_query_len.max(1) {
            return QueryPlan::default();
        }

        let mut clauses = Vec::new();
        for token in terms(&normalized) {
            for field in SearchField::ALL {
                for &strategy in MatchStrategy::for_token(token) {
                    clauses.push(PlannedClause {
                        token: token.to_string(),
                        field,
                        strategy,
                    });
                }
            }
        }

        QueryPlan {
            clauses,
            fuzzy_distance: self.fuzzy_distance,
        }
    }
}

impl Default for QueryPlanner {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_QUERY_LEN, DEFAULT_FUZZY_DISTANCE)
    }
}
