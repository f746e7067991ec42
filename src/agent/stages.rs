//! Cascade stages
//!
//! Each stage is one matcher in the fixed-priority cascade run by
//! [`super::Agent`]. A stage returns `Ok(Some(answer))` to end the cascade
//! and `Ok(None)` to let the next stage try. Stages never write conversation
//! memory themselves; they mark the country to remember on the answer.

use super::extract::{self, clean_country_name, compile};
use super::format;
use super::intent::{Answer, Failure, IntentKind, ResolvedIntent, Topic};
use super::AgentError;
use crate::calculator;
use crate::countries::{CountryRecord, CountryRegistry};
use crate::memory::ConversationMemory;
use regex::{Captures, Regex};

/// A question as seen by the stages
#[derive(Debug, Clone)]
pub struct Question<'a> {
    /// Trimmed original text
    pub raw: &'a str,
    /// Trimmed, lowercased text
    pub lower: String,
}

impl<'a> Question<'a> {
    pub fn new(text: &'a str) -> Self {
        let raw = text.trim();
        Self {
            raw,
            lower: raw.to_lowercase(),
        }
    }
}

/// Shared inputs for one cascade run
pub struct StageContext<'a> {
    pub registry: &'a CountryRegistry,
    pub memory: &'a dyn ConversationMemory,
    first_miss: Option<String>,
}

impl<'a> StageContext<'a> {
    pub fn new(registry: &'a CountryRegistry, memory: &'a dyn ConversationMemory) -> Self {
        Self {
            registry,
            memory,
            first_miss: None,
        }
    }

    /// Look up a country, noting the first name that was not found
    fn lookup(&mut self, country: &str) -> Option<&'a CountryRecord> {
        let record = self.registry.lookup(country);
        if record.is_none() && !country.is_empty() {
            tracing::debug!(country = %country, "Country not in registry");
            if self.first_miss.is_none() {
                self.first_miss = Some(country.to_string());
            }
        }
        record
    }

    /// First country name any stage failed to find
    pub fn first_miss(&self) -> Option<&str> {
        self.first_miss.as_deref()
    }
}

/// One matcher in the cascade
pub trait Stage: Send + Sync {
    fn name(&self) -> &'static str;

    fn try_match(
        &self,
        question: &Question<'_>,
        cx: &mut StageContext<'_>,
    ) -> Result<Option<Answer>, AgentError>;
}

/// The cascade in priority order
pub fn default_stages(registry: &CountryRegistry) -> Vec<Box<dyn Stage>> {
    vec![
        Box::new(AreaMultipliedStage::new()),
        Box::new(DensityStage::new()),
        Box::new(PronounStage),
        Box::new(DirectTopicStage::new()),
        Box::new(ArithmeticStage),
        Box::new(SmalltalkStage),
        Box::new(KnownCountryStage::new(registry)),
    ]
}

fn group<'t>(caps: &Captures<'t>, name: &'static str) -> Result<&'t str, AgentError> {
    caps.name(name)
        .map(|m| m.as_str())
        .ok_or(AgentError::MissingGroup(name))
}

fn fact_answer(record: &CountryRecord, topic: Topic) -> Answer {
    let intent = ResolvedIntent::new(topic.intent_kind())
        .with_country(record.name)
        .with_topic(topic);
    Answer::success(intent, format::fact(record, topic))
}

// ============================================================
// 1. Area multiplied
// ============================================================

/// "area of X multiplied by N", "X's area times N", ...
pub struct AreaMultipliedStage {
    patterns: Vec<Regex>,
}

impl AreaMultipliedStage {
    pub fn new() -> Self {
        const COUNTRY: &str = r"(?P<country>[a-z\s]+?)";
        const FACTOR: &str = r"(?P<factor>\d+)";
        let patterns = [
            format!(r"area of {COUNTRY}\s+(?:multiplied|multiply|times)\s+(?:by\s+)?{FACTOR}"),
            format!(r"{COUNTRY}'s?\s+area\s+(?:multiplied|multiply|times)\s+(?:by\s+)?{FACTOR}"),
            format!(r"multiply the area of {COUNTRY}\s+(?:by\s+)?{FACTOR}"),
            format!(r"{COUNTRY}'s?\s+area\s+times\s+{FACTOR}"),
            format!(r"area of {COUNTRY}\s+times\s+{FACTOR}"),
        ];
        Self {
            patterns: patterns.iter().map(|p| compile(p)).collect(),
        }
    }
}

impl Stage for AreaMultipliedStage {
    fn name(&self) -> &'static str {
        "area_multiplied"
    }

    fn try_match(
        &self,
        question: &Question<'_>,
        cx: &mut StageContext<'_>,
    ) -> Result<Option<Answer>, AgentError> {
        for pattern in &self.patterns {
            let Some(caps) = pattern.captures(&question.lower) else {
                continue;
            };
            let country = clean_country_name(group(&caps, "country")?);
            let multiplier = group(&caps, "factor")?;
            let factor: f64 = multiplier
                .parse()
                .map_err(|_| AgentError::InvalidMultiplier(multiplier.to_string()))?;

            let Some(record) = cx.lookup(&country) else {
                continue;
            };

            let intent = ResolvedIntent::new(IntentKind::AreaMultiplied)
                .with_country(record.name)
                .with_topic(Topic::Area)
                .with_operand(factor);
            let product = record.area * factor;
            if !product.is_finite() {
                let error = calculator::EvaluationError::NonFinite;
                let text = format::calculation_error(&error);
                return Ok(Some(Answer::failed(intent, Failure::Evaluation(error), text)));
            }
            let text = format::area_multiplied(record, multiplier, product);
            return Ok(Some(Answer::success(intent, text).remembering(record.name)));
        }
        Ok(None)
    }
}

// ============================================================
// 2. Population density
// ============================================================

pub struct DensityStage {
    patterns: Vec<Regex>,
}

impl DensityStage {
    pub fn new() -> Self {
        let patterns = [
            r"population density of (?P<country>[a-z\s]+)",
            r"density of (?P<country>[a-z\s]+)",
            r"(?P<country>[a-z\s]+)'s population density",
            r"how dense is (?P<country>[a-z\s]+)'s population",
        ];
        Self {
            patterns: patterns.into_iter().map(compile).collect(),
        }
    }
}

impl Stage for DensityStage {
    fn name(&self) -> &'static str {
        "density"
    }

    fn try_match(
        &self,
        question: &Question<'_>,
        cx: &mut StageContext<'_>,
    ) -> Result<Option<Answer>, AgentError> {
        for pattern in &self.patterns {
            let Some(caps) = pattern.captures(&question.lower) else {
                continue;
            };
            let country = clean_country_name(group(&caps, "country")?);
            let Some(record) = cx.lookup(&country) else {
                continue;
            };

            let intent = ResolvedIntent::new(IntentKind::Density)
                .with_country(record.name)
                .with_operand(record.density());
            let text = format::population_density(record);
            return Ok(Some(Answer::success(intent, text).remembering(record.name)));
        }
        Ok(None)
    }
}

// ============================================================
// 3. Pronoun follow-up
// ============================================================

const PRONOUN_CUES: &[&str] = &[
    "its capital",
    "its population",
    "its area",
    "and its capital",
    "and its population",
    "and its area",
    "what about its",
    "and the area",
];

/// "And its capital?" answered from conversation memory. Always terminal
/// once a cue is present.
pub struct PronounStage;

impl Stage for PronounStage {
    fn name(&self) -> &'static str {
        "pronoun_followup"
    }

    fn try_match(
        &self,
        question: &Question<'_>,
        cx: &mut StageContext<'_>,
    ) -> Result<Option<Answer>, AgentError> {
        if !PRONOUN_CUES.iter().any(|cue| question.lower.contains(cue)) {
            return Ok(None);
        }

        let intent = ResolvedIntent::new(IntentKind::PronounFollowup);
        let Some(country) = cx.memory.last_country()? else {
            return Ok(Some(Answer::failed(
                intent,
                Failure::AmbiguousReference,
                format::AMBIGUOUS_REFERENCE,
            )));
        };

        let intent = intent.with_country(country.as_str());
        let Some(record) = cx.registry.lookup(&country) else {
            tracing::warn!(country = %country, "Remembered country no longer in registry");
            let text = format::not_found(&country);
            return Ok(Some(Answer::failed(
                intent,
                Failure::NotFound { country },
                text,
            )));
        };

        let answer = match Topic::detect(&question.lower) {
            Some(topic) => Answer::success(intent.with_topic(topic), format::fact(record, topic)),
            None => Answer::success(intent, format::which_fact(record.name)),
        };
        Ok(Some(answer))
    }
}

// ============================================================
// 4. Direct topic query
// ============================================================

enum TopicSource {
    /// Topic keyword captured by the `topic` group
    Captured,
    Fixed(Topic),
}

struct Template {
    pattern: Regex,
    topic: TopicSource,
}

/// "capital of X", "X's population", "how big is X", ...
///
/// Templates run in order; a template whose country is not found hands over
/// to the next template, not the next stage.
pub struct DirectTopicStage {
    templates: Vec<Template>,
}

impl DirectTopicStage {
    pub fn new() -> Self {
        const TOPIC: &str = "(?P<topic>capital|population|area)";
        let captured = |pattern: String| Template {
            pattern: compile(&pattern),
            topic: TopicSource::Captured,
        };
        let fixed = |pattern: &str, topic: Topic| Template {
            pattern: compile(pattern),
            topic: TopicSource::Fixed(topic),
        };

        let templates = vec![
            captured(format!(r"{TOPIC} of (?P<country>[a-z\s]+)")),
            captured(format!(r"(?P<country>[a-z\s]+?)'s {TOPIC}")),
            captured(format!(r"(?P<country>[a-z\s]+) {TOPIC}")),
            captured(format!(r"what is the {TOPIC} of (?P<country>[a-z\s]+)")),
            captured(format!(r"(?P<country>[a-z\s]+) (?:has )?(?:a )?{TOPIC}")),
            fixed(
                r"how many people live in (?P<country>[a-z\s]+)[?.!]*",
                Topic::Population,
            ),
            fixed(r"how big is (?P<country>[a-z\s]+)[?.!]*", Topic::Area),
            captured(format!(r"what is (?P<country>[a-z\s]+)'s {TOPIC}")),
        ];
        Self { templates }
    }
}

impl Stage for DirectTopicStage {
    fn name(&self) -> &'static str {
        "direct_topic"
    }

    fn try_match(
        &self,
        question: &Question<'_>,
        cx: &mut StageContext<'_>,
    ) -> Result<Option<Answer>, AgentError> {
        for template in &self.templates {
            let Some(caps) = template.pattern.captures(&question.lower) else {
                continue;
            };
            let topic = match template.topic {
                TopicSource::Fixed(topic) => topic,
                TopicSource::Captured => {
                    let keyword = group(&caps, "topic")?;
                    Topic::from_keyword(keyword)
                        .ok_or_else(|| AgentError::UnknownTopic(keyword.to_string()))?
                }
            };
            let country = clean_country_name(group(&caps, "country")?);
            let Some(record) = cx.lookup(&country) else {
                continue;
            };
            return Ok(Some(fact_answer(record, topic).remembering(record.name)));
        }
        Ok(None)
    }
}

// ============================================================
// 5. Inline arithmetic
// ============================================================

/// "What is 2 + 2?". Leaves conversation memory alone.
pub struct ArithmeticStage;

impl Stage for ArithmeticStage {
    fn name(&self) -> &'static str {
        "arithmetic"
    }

    fn try_match(
        &self,
        question: &Question<'_>,
        _cx: &mut StageContext<'_>,
    ) -> Result<Option<Answer>, AgentError> {
        let intent = ResolvedIntent::new(IntentKind::Arithmetic);

        if !extract::has_expression(question.raw) {
            return Ok(None);
        }

        let Some(expression) = extract::find_expression(question.raw) else {
            return Ok(Some(Answer::failed(
                intent,
                Failure::MissingExpression,
                format::MISSING_EXPRESSION,
            )));
        };

        let answer = match calculator::evaluate(&expression) {
            Ok(result) => Answer::success(
                intent.with_operand(result.value),
                format::calculation(&expression, &result),
            ),
            Err(e) => {
                tracing::info!(expression = %expression, error = %e, "Expression rejected");
                let text = format::calculation_error(&e);
                Answer::failed(intent, Failure::Evaluation(e), text)
            }
        };
        Ok(Some(answer))
    }
}

// ============================================================
// 6. Small talk
// ============================================================

const SMALLTALK: &[(&str, &str)] = &[
    (
        "who are you",
        "I am an AI assistant that can help you with information about countries, calculations, and general knowledge questions.",
    ),
    (
        "what can you do",
        "I can help you with: 1) Country information (capital, population, area), 2) Mathematical calculations, 3) General knowledge questions.",
    ),
    (
        "how are you",
        "I'm functioning well and ready to help you! What would you like to know?",
    ),
];

pub struct SmalltalkStage;

impl Stage for SmalltalkStage {
    fn name(&self) -> &'static str {
        "smalltalk"
    }

    fn try_match(
        &self,
        question: &Question<'_>,
        _cx: &mut StageContext<'_>,
    ) -> Result<Option<Answer>, AgentError> {
        Ok(SMALLTALK
            .iter()
            .find(|(trigger, _)| question.lower.contains(trigger))
            .map(|(_, reply)| Answer::success(ResolvedIntent::new(IntentKind::Smalltalk), *reply)))
    }
}

// ============================================================
// 7. Known-country fallback
// ============================================================

/// Any registry country mentioned as a whole word
pub struct KnownCountryStage {
    mentions: Vec<(&'static str, Regex)>,
}

impl KnownCountryStage {
    pub fn new(registry: &CountryRegistry) -> Self {
        let mentions = registry
            .iter()
            .map(|record| {
                let pattern = format!(r"\b{}\b", regex::escape(&record.name.to_lowercase()));
                (record.name, compile(&pattern))
            })
            .collect();
        Self { mentions }
    }
}

impl Stage for KnownCountryStage {
    fn name(&self) -> &'static str {
        "known_country"
    }

    fn try_match(
        &self,
        question: &Question<'_>,
        cx: &mut StageContext<'_>,
    ) -> Result<Option<Answer>, AgentError> {
        let Some((name, _)) = self
            .mentions
            .iter()
            .find(|(_, pattern)| pattern.is_match(&question.lower))
        else {
            return Ok(None);
        };
        let Some(record) = cx.lookup(name) else {
            return Ok(None);
        };

        let answer = match Topic::detect(&question.lower) {
            Some(topic) => fact_answer(record, topic),
            None => Answer::success(
                ResolvedIntent::new(IntentKind::CountrySummary).with_country(record.name),
                format::summary(record),
            ),
        };
        Ok(Some(answer.remembering(record.name)))
    }
}
