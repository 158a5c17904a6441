//! Formula MCP Tools
//!
//! Tools for inspecting single formulas: parsing, ratio signatures and
//! pairwise comparison.

use serde::Serialize;

use crate::duplicates::{build_ratio_signature, parse_ratio as split_signature, RatioBreakdown};
use crate::formula::{self, Ingredient};

/// Response for parse_formula
#[derive(Debug, Serialize)]
pub struct ParseFormulaResponse {
    pub formula: String,
    pub ingredients: Vec<Ingredient>,
    pub valid_count: usize,
    /// Names that had no readable amount and unit
    pub unparsed_names: Vec<String>,
    pub unit_buckets: Vec<String>,
    pub text_hash: String,
}

/// Response for ratio_signature
#[derive(Debug, Serialize)]
pub struct RatioSignatureResponse {
    pub formula: String,
    pub signature: String,
    /// False when the formula has no usable ingredients
    pub comparable: bool,
    pub ratio: String,
    pub breakdown: RatioBreakdown,
}

/// Response for parse_ratio
#[derive(Debug, Serialize)]
pub struct ParseRatioResponse {
    pub signature: String,
    pub ratio: String,
    pub breakdown: RatioBreakdown,
}

/// Response for compare_formulas
#[derive(Debug, Serialize)]
pub struct CompareFormulasResponse {
    /// Both formulas parse to the same ingredient list
    pub same_ingredients: bool,
    /// Both formulas mix the same proportions
    pub same_ratio: bool,
    pub signature_a: String,
    pub signature_b: String,
}

/// Parse a formula into ingredients
pub fn parse_formula(formula: &str) -> ParseFormulaResponse {
    let ingredients = formula::parse(formula);

    let valid_count = ingredients.iter().filter(|i| i.valid).count();
    let unparsed_names = ingredients
        .iter()
        .filter(|i| !i.valid)
        .map(|i| i.name.clone())
        .collect();

    ParseFormulaResponse {
        formula: formula.to_string(),
        unit_buckets: formula::unit_buckets(&ingredients),
        text_hash: formula::hash(&ingredients),
        valid_count,
        unparsed_names,
        ingredients,
    }
}

/// Compute the ratio signature of a formula
pub fn ratio_signature(formula: &str) -> RatioSignatureResponse {
    let signature = build_ratio_signature(formula);
    let breakdown = split_signature(&signature);

    RatioSignatureResponse {
        formula: formula.to_string(),
        comparable: !signature.is_empty(),
        ratio: breakdown.to_display_string(),
        signature,
        breakdown,
    }
}

/// Decode a signature for display
pub fn parse_ratio(signature: &str) -> ParseRatioResponse {
    let breakdown = split_signature(signature);

    ParseRatioResponse {
        signature: signature.to_string(),
        ratio: breakdown.to_display_string(),
        breakdown,
    }
}

/// Compare two formulas by ingredient list and by ratio
pub fn compare_formulas(formula_a: &str, formula_b: &str) -> CompareFormulasResponse {
    let ingredients_a = formula::parse(formula_a);
    let ingredients_b = formula::parse(formula_b);

    // Differing hashes settle it; equal hashes may collide, so confirm
    let same_ingredients = formula::hash(&ingredients_a) == formula::hash(&ingredients_b)
        && ingredients_a == ingredients_b;

    let signature_a = build_ratio_signature(formula_a);
    let signature_b = build_ratio_signature(formula_b);

    CompareFormulasResponse {
        same_ingredients,
        same_ratio: !signature_a.is_empty() && signature_a == signature_b,
        signature_a,
        signature_b,
    }
}
