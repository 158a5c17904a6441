//! Formula parser
//!
//! Turns a free-text mixing formula such as `朱红10g 钛白 5 g` into an ordered
//! ingredient list. Parsing never fails: text that cannot be read as a
//! quantity becomes an ingredient marked invalid.

use serde::Serialize;

use super::units::{classify_token, is_unit, Amount, TokenShape};

/// Hash returned for an empty ingredient list
///
/// Never equal to a real hash, which is always 8 hex digits.
pub const EMPTY_HASH: &str = "empty";

/// One pigment or material in a formula
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ingredient {
    pub name: String,
    pub amount: Amount,
    /// Empty when no unit could be read
    pub unit: String,
    /// False when no amount and unit followed the name
    pub valid: bool,
}

impl Ingredient {
    fn measured(name: &str, amount: Amount, unit: &str) -> Self {
        Self {
            name: name.to_string(),
            amount,
            unit: unit.to_string(),
            valid: true,
        }
    }

    fn unmeasured(name: &str) -> Self {
        Self {
            name: name.to_string(),
            amount: Amount::ZERO,
            unit: String::new(),
            valid: false,
        }
    }
}

/// Parse a formula into ingredients, one per name token, in input order
///
/// Recognized forms, tried in order at each position:
/// - `朱红10g` (name, number and unit in one token), or `朱红10 g`
/// - `朱红 10g`
/// - `朱红 10 g`
/// - `朱红` alone, which yields an invalid ingredient
///
/// A quantity token found where a name is expected (for example the second
/// quantity in `朱红 10g 20g`) is kept as an invalid ingredient named after
/// the raw token.
pub fn parse(formula: &str) -> Vec<Ingredient> {
    let tokens: Vec<&str> = formula.split_whitespace().collect();
    let mut ingredients = Vec::new();

    let mut pos = 0;
    while pos < tokens.len() {
        let (ingredient, consumed) = read_ingredient(&tokens[pos..]);
        ingredients.push(ingredient);
        pos += consumed;
    }

    ingredients
}

/// Read one ingredient from the front of `tokens`, returning how many tokens it used
fn read_ingredient(tokens: &[&str]) -> (Ingredient, usize) {
    let head = tokens[0];

    match classify_token(head) {
        TokenShape::Named { name, amount, unit } => {
            if !unit.is_empty() {
                return (Ingredient::measured(name, amount, unit), 1);
            }
            match tokens.get(1) {
                Some(next) if is_unit(next) => (Ingredient::measured(name, amount, next), 2),
                _ => (Ingredient::unmeasured(name), 1),
            }
        }
        TokenShape::Quantity { .. } => (Ingredient::unmeasured(head), 1),
        TokenShape::Name(name) => match tokens.get(1).map(|t| classify_token(t)) {
            Some(TokenShape::Quantity { amount, unit }) if !unit.is_empty() => {
                (Ingredient::measured(name, amount, unit), 2)
            }
            Some(TokenShape::Quantity { amount, .. }) => match tokens.get(2) {
                Some(unit) if is_unit(unit) => (Ingredient::measured(name, amount, unit), 3),
                _ => (Ingredient::unmeasured(name), 1),
            },
            _ => (Ingredient::unmeasured(name), 1),
        },
    }
}

/// Cheap rolling hash of an ingredient list
///
/// A 32-bit `h * 31 + c` hash over `name|amount|unit` of each ingredient in
/// list order. It collides easily and only serves as a fast pre-check for
/// exact-text equality; duplicate detection must go through
/// [`build_ratio_signature`](crate::duplicates::build_ratio_signature).
pub fn hash(ingredients: &[Ingredient]) -> String {
    if ingredients.is_empty() {
        return EMPTY_HASH.to_string();
    }

    let mut h: u32 = 0;
    for ingredient in ingredients {
        let part = format!("{}|{}|{}", ingredient.name, ingredient.amount, ingredient.unit);
        for c in part.chars() {
            h = h.wrapping_mul(31).wrapping_add(c as u32);
        }
    }

    format!("{:08x}", h)
}

/// Distinct units of the valid ingredients, in first-seen order
pub fn unit_buckets(ingredients: &[Ingredient]) -> Vec<String> {
    let mut buckets: Vec<String> = Vec::new();
    for ingredient in ingredients.iter().filter(|i| i.valid) {
        if !buckets.contains(&ingredient.unit) {
            buckets.push(ingredient.unit.clone());
        }
    }
    buckets
}
