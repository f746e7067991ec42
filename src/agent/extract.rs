//! Entity extraction helpers shared by the cascade stages

use crate::countries::normalize_name;
use regex::Regex;
use std::sync::LazyLock;

static POSSESSIVE: LazyLock<Regex> = LazyLock::new(|| compile(r"'s$"));
static LEADING_FILLER: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"^(?:tell me about|what is|what's|how many|how big|how dense|does|do|is|the|a|an)\s+")
});
static TRAILING_FILLER: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"\s+(?:capital|population|area|times|multiplied|multiply|by|in|has|a|an)$")
});
static TRAILING_PUNCTUATION: LazyLock<Regex> = LazyLock::new(|| compile(r"[?.,!]+$"));

/// `digits operator digits`, the minimum that counts as inline arithmetic
static SIMPLE_EXPRESSION: LazyLock<Regex> =
    LazyLock::new(|| compile(r"\d+\s*[-+*/^]\s*\d+"));
/// A chain of numbers, operators and parentheses
static CHAINED_EXPRESSION: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"\(*\s*\d+(?:\.\d+)?\s*\)*(?:\s*[-+*/^]\s*\(*\s*\d+(?:\.\d+)?\s*\)*)+")
});

/// Compile a pattern that is known to be valid at build time
pub(crate) fn compile(pattern: &str) -> Regex {
    match Regex::new(pattern) {
        Ok(re) => re,
        Err(e) => panic!("invalid built-in pattern {pattern:?}: {e}"),
    }
}

/// Turn a raw captured span into a candidate country name.
///
/// Drops a possessive `'s`, leading question words and articles, trailing
/// topic and connector words ("canada has a" becomes "canada") and trailing
/// punctuation, then title-cases the rest.
pub fn clean_country_name(span: &str) -> String {
    let name = POSSESSIVE.replace(span.trim(), "");
    let name = strip_repeatedly(&LEADING_FILLER, &name);
    let name = strip_repeatedly(&TRAILING_FILLER, &name);
    let name = TRAILING_PUNCTUATION.replace(&name, "");
    normalize_name(name.trim_matches(|c: char| matches!(c, ' ' | '.' | '!' | '?')))
}

fn strip_repeatedly(re: &Regex, text: &str) -> String {
    let mut current = text.to_string();
    loop {
        let next = re.replace(&current, "").into_owned();
        if next == current {
            return current;
        }
        current = next;
    }
}

/// Whether the text contains inline arithmetic at all
pub fn has_expression(text: &str) -> bool {
    SIMPLE_EXPRESSION.is_match(text)
}

/// First arithmetic expression in the text, trimmed.
///
/// Prefers the whole chained expression; falls back to the first
/// `digits operator digits` span when the chain has stray parentheses.
pub fn find_expression(text: &str) -> Option<String> {
    let chained = CHAINED_EXPRESSION
        .find(text)
        .map(|m| m.as_str().trim().to_string())
        .filter(|expr| parentheses_balanced(expr));
    chained.or_else(|| {
        SIMPLE_EXPRESSION
            .find(text)
            .map(|m| m.as_str().trim().to_string())
    })
}

fn parentheses_balanced(text: &str) -> bool {
    let mut depth: i32 = 0;
    for c in text.chars() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0
}
