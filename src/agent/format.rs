//! Response formatting
//!
//! Fixed English sentence templates. Numbers use `,` thousands separators;
//! populations render as integers, areas with no decimals and densities
//! with two.

use super::intent::Topic;
use crate::calculator::{Calculation, EvaluationError};
use crate::countries::CountryRecord;

pub const AMBIGUOUS_REFERENCE: &str =
    "I don't know which country you're referring to. Please mention a country first.";
pub const MISSING_EXPRESSION: &str = "I couldn't find a valid mathematical expression.";
pub const UNRESOLVED: &str = "I'm sorry, I couldn't process your question. Please try again.";
pub const FAULT: &str =
    "I'm sorry, I encountered an error while processing your question. Please try again.";

/// Insert `,` every three digits of the integer part
pub fn group_thousands(number: &str) -> String {
    let (sign, unsigned) = match number.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", number),
    };
    let (int_part, frac_part) = match unsigned.find('.') {
        Some(dot) => unsigned.split_at(dot),
        None => (unsigned, ""),
    };

    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::with_capacity(number.len() + digits.len() / 3);
    for (i, digit) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*digit);
    }

    format!("{sign}{grouped}{frac_part}")
}

pub fn population(people: u64) -> String {
    group_thousands(&people.to_string())
}

pub fn area(km2: f64) -> String {
    group_thousands(&format!("{km2:.0}"))
}

pub fn density(per_km2: f64) -> String {
    group_thousands(&format!("{per_km2:.2}"))
}

/// One-fact sentence about a country
pub fn fact(record: &CountryRecord, topic: Topic) -> String {
    match topic {
        Topic::Capital => format!("The capital of {} is {}.", record.name, record.capital),
        Topic::Population => format!(
            "The population of {} is {} people.",
            record.name,
            population(record.population)
        ),
        Topic::Area => format!("The area of {} is {} km².", record.name, area(record.area)),
    }
}

/// `multiplier` is shown as the user wrote it
pub fn area_multiplied(record: &CountryRecord, multiplier: &str, product: f64) -> String {
    format!(
        "The area of {} is {} km². Multiplied by {multiplier}, that is {} km².",
        record.name,
        area(record.area),
        area(product)
    )
}

pub fn population_density(record: &CountryRecord) -> String {
    format!(
        "The population density of {} is {} people per km².",
        record.name,
        density(record.density())
    )
}

/// Capital, population and area in one sentence
pub fn summary(record: &CountryRecord) -> String {
    format!(
        "{}: Capital: {}, Population: {} people, Area: {} km².",
        record.name,
        record.capital,
        population(record.population),
        area(record.area)
    )
}

pub fn which_fact(country: &str) -> String {
    format!("What would you like to know about {country}? I can tell you its capital, population or area.")
}

pub fn not_found(country: &str) -> String {
    format!("I couldn't find information about {country}.")
}

pub fn calculation(expression: &str, result: &Calculation) -> String {
    format!("{expression} = {result}")
}

pub fn calculation_error(error: &EvaluationError) -> String {
    format!("Sorry, I couldn't calculate that: {error}")
}
