//! Property-based tests for the resolver
//!
//! These tests verify cascade invariants across arbitrary questions.

use super::*;
use crate::memory::SharedSlot;
use proptest::prelude::*;

fn arb_country() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("Brazil"),
        Just("France"),
        Just("Japan"),
        Just("Canada"),
        Just("Germany"),
    ]
}

fn arb_topic() -> impl Strategy<Value = Topic> {
    prop_oneof![Just(Topic::Capital), Just(Topic::Population), Just(Topic::Area)]
}

/// Direct-topic phrasings that name the country explicitly
fn arb_direct_question() -> impl Strategy<Value = (String, &'static str, Topic)> {
    (arb_country(), arb_topic(), 0..3usize).prop_map(|(country, topic, form)| {
        let keyword = topic.keyword();
        let text = match form {
            0 => format!("What is the {keyword} of {country}?"),
            1 => format!("{country}'s {keyword}"),
            _ => format!("{keyword} of {}", country.to_lowercase()),
        };
        (text, country, topic)
    })
}

fn arb_pronoun_cue() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("And its capital?"),
        Just("and its population"),
        Just("What about its area?"),
        Just("And the area?"),
    ]
}

proptest! {
    #[test]
    fn prop_never_empty(question in "\\PC{0,60}") {
        let agent = Agent::default();
        let memory = SharedSlot::new();
        let text = agent.resolve(&question, &memory);
        prop_assert!(!text.is_empty());
    }

    #[test]
    fn prop_memory_only_holds_registry_countries(questions in prop::collection::vec("[a-zA-Z' ?]{0,40}", 1..6)) {
        let agent = Agent::default();
        let registry = CountryRegistry::builtin();
        let memory = SharedSlot::new();
        for question in &questions {
            agent.resolve(question, &memory);
            if let Some(country) = memory.last_country().unwrap() {
                prop_assert!(registry.lookup(&country).is_some(), "remembered {:?}", country);
            }
        }
    }

    #[test]
    fn prop_resolve_is_idempotent(question in "[a-zA-Z0-9 +*/?']{0,40}") {
        let agent = Agent::default();
        let memory = SharedSlot::new();
        let first = agent.resolve(&question, &memory);
        let state = memory.last_country().unwrap();
        let second = agent.resolve(&question, &memory);
        prop_assert_eq!(first, second);
        prop_assert_eq!(memory.last_country().unwrap(), state);
    }

    #[test]
    fn prop_direct_questions_resolve((question, country, topic) in arb_direct_question()) {
        let agent = Agent::default();
        let memory = SharedSlot::new();
        let answer = agent.answer(&question, &memory);
        prop_assert_eq!(answer.intent.kind, topic.intent_kind());
        prop_assert_eq!(answer.intent.country.as_deref(), Some(country));
        let last = memory.last_country().unwrap();
        prop_assert_eq!(last.as_deref(), Some(country));
    }

    #[test]
    fn prop_pronoun_without_memory_stays_unset(cue in arb_pronoun_cue()) {
        let agent = Agent::default();
        let memory = SharedSlot::new();
        let answer = agent.answer(cue, &memory);
        prop_assert_eq!(answer.failure, Some(Failure::AmbiguousReference));
        prop_assert_eq!(memory.last_country().unwrap(), None);
    }

    #[test]
    fn prop_pronoun_follows_last_country(country in arb_country(), cue in arb_pronoun_cue()) {
        let agent = Agent::default();
        let memory = SharedSlot::new();
        agent.resolve(&format!("Tell me about {country}"), &memory);
        let answer = agent.answer(cue, &memory);
        prop_assert_eq!(answer.intent.kind, IntentKind::PronounFollowup);
        prop_assert_eq!(answer.intent.country.as_deref(), Some(country));
        prop_assert!(answer.text.contains(country));
    }
}
