//! Property-based tests for the arithmetic evaluator

use super::*;
use proptest::prelude::*;

proptest! {
    #[test]
    fn prop_never_panics(input in "\\PC{0,40}") {
        let _ = evaluate(&input);
    }

    #[test]
    fn prop_grammar_noise_never_panics(input in "[0-9.()+\\-*/^ ]{0,30}") {
        let _ = evaluate(&input);
    }

    #[test]
    fn prop_integer_ops_match_native(a in 0i64..10_000, b in 1i64..10_000) {
        prop_assert_eq!(evaluate(&format!("{a}+{b}")).unwrap().to_string(), (a + b).to_string());
        prop_assert_eq!(evaluate(&format!("{a}-{b}")).unwrap().to_string(), (a - b).to_string());
        prop_assert_eq!(evaluate(&format!("{a}*{b}")).unwrap().to_string(), (a * b).to_string());
        if a % b == 0 {
            prop_assert_eq!(evaluate(&format!("{a}/{b}")).unwrap().to_string(), (a / b).to_string());
        }
    }

    #[test]
    fn prop_parentheses_override_precedence(a in 0i64..1000, b in 0i64..1000, c in 0i64..1000) {
        prop_assert_eq!(
            evaluate(&format!("({a}+{b})*{c}")).unwrap().to_string(),
            ((a + b) * c).to_string()
        );
        prop_assert_eq!(
            evaluate(&format!("{a}+{b}*{c}")).unwrap().to_string(),
            (a + b * c).to_string()
        );
    }

    #[test]
    fn prop_letters_always_rejected(prefix in "[0-9]{1,4}", word in "[a-zA-Z_]{1,8}") {
        let result = evaluate(&format!("{prefix}+{word}"));
        prop_assert!(matches!(result, Err(EvaluationError::InvalidCharacter(_))));
    }

    #[test]
    fn prop_division_by_zero_is_an_error(a in 0i64..10_000) {
        prop_assert_eq!(evaluate(&format!("{a}/0")), Err(EvaluationError::DivisionByZero));
    }
}
