//! Question answering agent
//!
//! Runs a question through a fixed-priority cascade of stages (see
//! [`stages::default_stages`]) and turns the first terminal result into a
//! sentence. Expected failures such as unknown countries, bad expressions or
//! unresolved questions become apologies. Internal faults are logged and
//! masked behind a generic message, so `resolve` never fails.

mod extract;
mod format;
pub mod intent;
pub mod stages;

#[cfg(test)]
mod proptests;

pub use intent::{Answer, Failure, IntentKind, ResolvedIntent, Topic};

use crate::countries::CountryRegistry;
use crate::memory::{ConversationMemory, MemoryError};
use stages::{Question, Stage, StageContext};
use std::time::Instant;
use thiserror::Error;

/// Internal faults. Never shown to users verbatim.
#[derive(Error, Debug)]
pub enum AgentError {
    #[error(transparent)]
    Memory(#[from] MemoryError),
    #[error("multiplier '{0}' is out of range")]
    InvalidMultiplier(String),
    #[error("unknown topic keyword '{0}'")]
    UnknownTopic(String),
    #[error("pattern has no '{0}' group")]
    MissingGroup(&'static str),
}

/// The intent resolver
pub struct Agent {
    registry: CountryRegistry,
    stages: Vec<Box<dyn Stage>>,
}

impl Default for Agent {
    fn default() -> Self {
        Self::new(CountryRegistry::builtin())
    }
}

impl Agent {
    pub fn new(registry: CountryRegistry) -> Self {
        let stages = stages::default_stages(&registry);
        Self { registry, stages }
    }

    /// Answer a question, reading and updating `memory`.
    #[allow(dead_code)] // Used in tests
    pub fn resolve(&self, question: &str, memory: &dyn ConversationMemory) -> String {
        self.answer(question, memory).text
    }

    /// Like [`Agent::resolve`] but keeps the resolved intent and failure kind
    pub fn answer(&self, question: &str, memory: &dyn ConversationMemory) -> Answer {
        let start = Instant::now();
        tracing::info!(question = %question, "Processing question");

        let answer = match self.run_cascade(question, memory) {
            Ok(answer) => answer,
            Err(e) => {
                tracing::error!(question = %question, error = %e, "Error processing question");
                Answer::failed(
                    ResolvedIntent::new(IntentKind::Unresolved),
                    Failure::Fault,
                    format::FAULT,
                )
            }
        };

        tracing::debug!(
            kind = ?answer.intent.kind,
            country = ?answer.intent.country,
            duration_us = %start.elapsed().as_micros(),
            "Question resolved"
        );
        answer
    }

    fn run_cascade(
        &self,
        question: &str,
        memory: &dyn ConversationMemory,
    ) -> Result<Answer, AgentError> {
        let question = Question::new(question);
        let mut cx = StageContext::new(&self.registry, memory);

        for stage in &self.stages {
            if let Some(answer) = stage.try_match(&question, &mut cx)? {
                tracing::debug!(stage = stage.name(), "Stage answered");
                if let Some(country) = &answer.remember {
                    memory.remember_country(country)?;
                }
                return Ok(answer);
            }
        }

        if let Some(country) = cx.first_miss() {
            tracing::info!(country = %country, "Question named an unknown country");
            return Ok(Answer::failed(
                ResolvedIntent::new(IntentKind::Unresolved).with_country(country),
                Failure::NotFound {
                    country: country.to_string(),
                },
                format::not_found(country),
            ));
        }

        tracing::error!(question = %question.raw, "No response generated");
        Ok(Answer::failed(
            ResolvedIntent::new(IntentKind::Unresolved),
            Failure::Unresolved,
            format::UNRESOLVED,
        ))
    }

    /// Stage names in evaluation order
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }
}
