//! Resolved intent types

use crate::calculator::EvaluationError;
use serde::Serialize;

/// A country fact a question can ask about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    Capital,
    Population,
    Area,
}

impl Topic {
    /// Detection priority when several keywords appear in one question
    const PRIORITY: [Topic; 3] = [Topic::Capital, Topic::Population, Topic::Area];

    pub fn keyword(self) -> &'static str {
        match self {
            Topic::Capital => "capital",
            Topic::Population => "population",
            Topic::Area => "area",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::PRIORITY.into_iter().find(|t| t.keyword() == keyword)
    }

    /// First topic keyword contained anywhere in `text`
    pub fn detect(text: &str) -> Option<Self> {
        Self::PRIORITY.into_iter().find(|t| text.contains(t.keyword()))
    }

    pub fn intent_kind(self) -> IntentKind {
        match self {
            Topic::Capital => IntentKind::Capital,
            Topic::Population => IntentKind::Population,
            Topic::Area => IntentKind::Area,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentKind {
    AreaMultiplied,
    Density,
    PronounFollowup,
    Capital,
    Population,
    Area,
    Arithmetic,
    Smalltalk,
    CountrySummary,
    Unresolved,
}

/// What the cascade understood the question to be
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedIntent {
    pub kind: IntentKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<Topic>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numeric_operand: Option<f64>,
}

impl ResolvedIntent {
    pub fn new(kind: IntentKind) -> Self {
        Self {
            kind,
            country: None,
            topic: None,
            numeric_operand: None,
        }
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    pub fn with_topic(mut self, topic: Topic) -> Self {
        self.topic = Some(topic);
        self
    }

    pub fn with_operand(mut self, operand: f64) -> Self {
        self.numeric_operand = Some(operand);
        self
    }
}

/// Expected, user-facing failure modes. None of these are errors at the
/// `resolve` boundary; each becomes an apology or a clarification.
#[derive(Debug, Clone, PartialEq)]
pub enum Failure {
    /// Country absent from the registry
    NotFound { country: String },
    /// The calculator rejected the expression
    Evaluation(EvaluationError),
    /// Arithmetic was implied but no expression could be extracted
    MissingExpression,
    /// A pronoun follow-up with no remembered country
    AmbiguousReference,
    /// No stage understood the question
    Unresolved,
    /// An internal fault was caught and masked
    Fault,
}

/// The final answer of one cascade run
#[derive(Debug, Clone, PartialEq)]
pub struct Answer {
    pub intent: ResolvedIntent,
    pub text: String,
    /// Country to store as the conversation's last reference
    pub remember: Option<String>,
    pub failure: Option<Failure>,
}

impl Answer {
    pub fn success(intent: ResolvedIntent, text: impl Into<String>) -> Self {
        Self {
            intent,
            text: text.into(),
            remember: None,
            failure: None,
        }
    }

    pub fn failed(intent: ResolvedIntent, failure: Failure, text: impl Into<String>) -> Self {
        Self {
            intent,
            text: text.into(),
            remember: None,
            failure: Some(failure),
        }
    }

    /// Mark `country` as the conversation's new last reference
    pub fn remembering(mut self, country: impl Into<String>) -> Self {
        self.remember = Some(country.into());
        self
    }

    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }
}
