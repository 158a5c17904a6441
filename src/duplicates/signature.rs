//! Ratio signatures
//!
//! A ratio signature is the canonical text form of a formula's proportions:
//! `name#unit#n` triples joined by `|`, sorted by name and unit, with the
//! amounts reduced to lowest integer terms. Two formulas that differ only in
//! ingredient order or by a uniform scale factor share a signature.
//!
//! `#`, `|` and `\` inside a name or unit are escaped with `\`, so a name can
//! never forge extra fields or segments.

use serde::Serialize;

use crate::formula::{parse, Amount};

/// Separator between ingredient segments
pub const SEGMENT_SEPARATOR: char = '|';

/// Separator between the fields of one segment
pub const FIELD_SEPARATOR: char = '#';

/// Escapes a separator or itself inside a name or unit
pub const ESCAPE: char = '\\';

/// Decimal places kept by the floating-point fallback
const FALLBACK_PRECISION: i32 = 6;

/// A valid ingredient reduced to the parts that take part in a signature
#[derive(Debug, Clone)]
struct Component {
    name: String,
    unit: String,
    amount: Amount,
}

/// Build the ratio signature of a formula
///
/// Invalid ingredients and zero amounts are ignored. Returns an empty string
/// when nothing comparable remains; callers must treat that as "exclude from
/// duplicate detection", never as a match.
pub fn build_ratio_signature(formula: &str) -> String {
    let mut components: Vec<Component> = parse(formula)
        .into_iter()
        .filter(|i| i.valid && !i.amount.is_zero())
        .map(|i| Component {
            name: normalize(&i.name),
            unit: normalize(&i.unit),
            amount: i.amount,
        })
        .collect();

    if components.is_empty() {
        return String::new();
    }

    // Amount breaks ties so repeated name/unit pairs stay order-invariant
    components.sort_by(|a, b| {
        a.name
            .cmp(&b.name)
            .then_with(|| a.unit.cmp(&b.unit))
            .then_with(|| a.amount.cmp(&b.amount))
    });

    match scale_to_integers(&components) {
        Some(scaled) if scaled.iter().any(|&v| v != 0) => integer_signature(&components, &scaled),
        _ => fallback_signature(&components),
    }
}

fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Multiply every amount by `10^max_scale` so all become integers
fn scale_to_integers(components: &[Component]) -> Option<Vec<u128>> {
    let max_scale = components.iter().map(|c| c.amount.scale()).max().unwrap_or(0);
    components
        .iter()
        .map(|c| c.amount.rescale(max_scale))
        .collect()
}

fn integer_signature(components: &[Component], scaled: &[u128]) -> String {
    let divisor = gcd_of(scaled);
    let segments: Vec<String> = components
        .iter()
        .zip(scaled)
        .map(|(c, &value)| segment(&c.name, &c.unit, &(value / divisor).to_string()))
        .collect();
    segments.join(&SEGMENT_SEPARATOR.to_string())
}

/// Ratios relative to the first component, rounded to six decimals
///
/// Only reached when exact integer scaling produced nothing usable.
fn fallback_signature(components: &[Component]) -> String {
    let base = components[0].amount.as_f64();
    if base == 0.0 {
        return String::new();
    }
    let segments: Vec<String> = components
        .iter()
        .map(|c| {
            let ratio = round_to(c.amount.as_f64() / base, FALLBACK_PRECISION);
            segment(&c.name, &c.unit, &format_ratio(ratio))
        })
        .collect();
    segments.join(&SEGMENT_SEPARATOR.to_string())
}

fn segment(name: &str, unit: &str, value: &str) -> String {
    format!(
        "{}{FIELD_SEPARATOR}{}{FIELD_SEPARATOR}{value}",
        escape_field(name),
        escape_field(unit)
    )
}

fn escape_field(field: &str) -> String {
    let mut escaped = String::with_capacity(field.len());
    for c in field.chars() {
        if c == ESCAPE || c == FIELD_SEPARATOR || c == SEGMENT_SEPARATOR {
            escaped.push(ESCAPE);
        }
        escaped.push(c);
    }
    escaped
}

fn unescape_field(field: &str) -> String {
    let mut unescaped = String::with_capacity(field.len());
    let mut chars = field.chars();
    while let Some(c) = chars.next() {
        if c == ESCAPE {
            unescaped.push(chars.next().unwrap_or(ESCAPE));
        } else {
            unescaped.push(c);
        }
    }
    unescaped
}

/// Split on `separator` wherever it is not preceded by an escape
fn split_unescaped(s: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut escaped = false;
    for (i, c) in s.char_indices() {
        if escaped {
            escaped = false;
        } else if c == ESCAPE {
            escaped = true;
        } else if c == separator {
            parts.push(&s[start..i]);
            start = i + c.len_utf8();
        }
    }
    parts.push(&s[start..]);
    parts
}

fn gcd(mut a: u128, mut b: u128) -> u128 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

/// GCD of all non-zero values, folded left to right; 1 when there are none
fn gcd_of(values: &[u128]) -> u128 {
    let g = values
        .iter()
        .filter(|&&v| v != 0)
        .fold(0, |acc, &v| gcd(acc, v));
    if g == 0 {
        1
    } else {
        g
    }
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Render a ratio without trailing zeros: `2`, `2.5`, `0.333333`
pub fn format_ratio(value: f64) -> String {
    let fixed = format!("{:.*}", FALLBACK_PRECISION as usize, value);
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() || trimmed == "-" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

// ============================================================================
// Signature Breakdown
// ============================================================================

/// One ingredient of a decoded signature
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatioItem {
    pub name: String,
    pub unit: String,
    pub ratio: f64,
}

/// A signature split back into its parts, for display
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RatioBreakdown {
    pub items: Vec<RatioItem>,
    pub ratios: Vec<f64>,
}

impl RatioBreakdown {
    /// Human-readable form such as `朱红 2 : 钛白 1`
    pub fn to_display_string(&self) -> String {
        self.items
            .iter()
            .map(|item| format!("{} {}", item.name, format_ratio(item.ratio)))
            .collect::<Vec<_>>()
            .join(" : ")
    }
}

/// Split a signature into `name`, `unit` and `ratio` parts
///
/// Segments that do not have exactly three `#`-separated fields, or whose
/// ratio is not a number, are skipped. Escaped separators in names and units
/// are restored.
pub fn parse_ratio(signature: &str) -> RatioBreakdown {
    let items: Vec<RatioItem> = split_unescaped(signature, SEGMENT_SEPARATOR)
        .into_iter()
        .filter_map(|segment| {
            let fields = split_unescaped(segment, FIELD_SEPARATOR);
            let [name, unit, ratio] = fields.as_slice() else {
                return None;
            };
            let ratio = ratio.trim().parse::<f64>().ok()?;
            Some(RatioItem {
                name: unescape_field(name),
                unit: unescape_field(unit),
                ratio,
            })
        })
        .collect();

    let ratios = items.iter().map(|item| item.ratio).collect();
    RatioBreakdown { items, ratios }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_reduces_to_lowest_terms() {
        assert_eq!(build_ratio_signature("朱红10g 钛白5g"), "朱红#g#2|钛白#g#1");
        assert_eq!(build_ratio_signature("朱红10g 钛白6g"), "朱红#g#5|钛白#g#3");
    }

    #[test]
    fn test_signature_scale_and_order_invariant() {
        let base = build_ratio_signature("朱红10g 钛白5g");
        assert_eq!(base, build_ratio_signature("钛白10g 朱红20g"));
        assert_eq!(base, build_ratio_signature("朱红 1 g 钛白 0.5 g"));
        assert_ne!(base, build_ratio_signature("朱红10g 钛白6g"));
    }

    #[test]
    fn test_signature_scale_invariance_over_scalars() {
        let formula = "群青3g 钛白1.5g 土黄0.25g";
        let expected = build_ratio_signature(formula);
        for k in ["2", "3", "10", "0.5", "1.2", "7.75", "100"] {
            let k = Amount::parse(k).unwrap().as_f64();
            let scaled = format!(
                "群青{}g 钛白{}g 土黄{}g",
                format_ratio(3.0 * k),
                format_ratio(1.5 * k),
                format_ratio(0.25 * k)
            );
            assert_eq!(build_ratio_signature(&scaled), expected, "scaled by {k}: {scaled}");
        }
    }

    #[test]
    fn test_signature_order_invariance_over_permutations() {
        let tokens = ["群青3g", "钛白2g", "土黄1g", "朱红5滴"];
        let expected = build_ratio_signature(&tokens.join(" "));
        let permutations = [[0, 1, 2, 3], [3, 2, 1, 0], [1, 3, 0, 2], [2, 0, 3, 1]];
        for order in permutations {
            let formula: Vec<&str> = order.iter().map(|&i| tokens[i]).collect();
            assert_eq!(build_ratio_signature(&formula.join(" ")), expected);
        }
    }

    #[test]
    fn test_signature_is_deterministic() {
        let formula = "Cadmium Red 3g 钛白 2 g";
        assert_eq!(build_ratio_signature(formula), build_ratio_signature(formula));
    }

    #[test]
    fn test_signature_case_folds_names_and_units() {
        assert_eq!(
            build_ratio_signature("White10G Blue5g"),
            build_ratio_signature("blue2g white4g")
        );
    }

    #[test]
    fn test_signature_keeps_units_apart() {
        assert_ne!(
            build_ratio_signature("朱红10g 钛白5g"),
            build_ratio_signature("朱红10g 钛白5ml")
        );
    }

    #[test]
    fn test_signature_repeated_ingredient_is_order_invariant() {
        assert_eq!(
            build_ratio_signature("白5g 白3g 蓝2g"),
            build_ratio_signature("蓝2g 白3g 白5g")
        );
    }

    #[test]
    fn test_signature_empty_for_unusable_formulas() {
        assert_eq!(build_ratio_signature(""), "");
        assert_eq!(build_ratio_signature("朱红 钛白"), "");
        assert_eq!(build_ratio_signature("朱红0g 钛白0.0g"), "");
    }

    #[test]
    fn test_signature_ignores_invalid_and_zero_ingredients() {
        assert_eq!(
            build_ratio_signature("朱红10g 钛白5g 群青 土黄0g"),
            build_ratio_signature("朱红2g 钛白1g")
        );
    }

    #[test]
    fn test_single_ingredient_signature() {
        assert_eq!(build_ratio_signature("朱红7.5g"), "朱红#g#1");
        assert_eq!(build_ratio_signature("朱红7.5g"), build_ratio_signature("朱红 100 g"));
    }

    #[test]
    fn test_fallback_signature_uses_first_component() {
        let components = vec![
            Component {
                name: "a".to_string(),
                unit: "g".to_string(),
                amount: Amount::parse("3").unwrap(),
            },
            Component {
                name: "b".to_string(),
                unit: "g".to_string(),
                amount: Amount::parse("1").unwrap(),
            },
        ];
        assert_eq!(fallback_signature(&components), "a#g#1|b#g#0.333333");
    }

    #[test]
    fn test_gcd_of() {
        assert_eq!(gcd_of(&[20, 10, 30]), 10);
        assert_eq!(gcd_of(&[7, 0, 21]), 7);
        assert_eq!(gcd_of(&[0, 0]), 1);
        assert_eq!(gcd_of(&[]), 1);
    }

    #[test]
    fn test_format_ratio() {
        assert_eq!(format_ratio(2.0), "2");
        assert_eq!(format_ratio(2.5), "2.5");
        assert_eq!(format_ratio(1.0 / 3.0), "0.333333");
        assert_eq!(format_ratio(0.0), "0");
    }

    #[test]
    fn test_parse_ratio_round_trip_for_display() {
        let breakdown = parse_ratio(&build_ratio_signature("朱红10g 钛白5g"));
        assert_eq!(breakdown.ratios, vec![2.0, 1.0]);
        assert_eq!(breakdown.items[0].name, "朱红");
        assert_eq!(breakdown.items[1].unit, "g");
        assert_eq!(breakdown.to_display_string(), "朱红 2 : 钛白 1");
    }

    #[test]
    fn test_parse_ratio_skips_malformed_segments() {
        let breakdown = parse_ratio("朱红#g#2|bad|钛白#g|群青#g#x|土黄#ml#0.5|a#b#c#d");
        assert_eq!(breakdown.items.len(), 2);
        assert_eq!(breakdown.items[0].name, "朱红");
        assert_eq!(breakdown.items[1].name, "土黄");
        assert_eq!(breakdown.ratios, vec![2.0, 0.5]);
    }

    #[test]
    fn test_separators_in_names_cannot_forge_segments() {
        let forged = build_ratio_signature("a#g#2|b 1g");
        let real = build_ratio_signature("a2g b1g");
        assert_eq!(real, "a#g#2|b#g#1");
        assert_eq!(forged, "a\\#g\\#2\\|b#g#1");
        assert_ne!(forged, real);
    }

    #[test]
    fn test_parse_ratio_restores_escaped_names() {
        let breakdown = parse_ratio(&build_ratio_signature("a#g#2|b 1g"));
        assert_eq!(breakdown.items.len(), 1);
        assert_eq!(breakdown.items[0].name, "a#g#2|b");
        assert_eq!(breakdown.ratios, vec![1.0]);

        let breakdown = parse_ratio(&build_ratio_signature("a\\b2g c1g"));
        assert_eq!(breakdown.items[0].name, "a\\b");
        assert_eq!(breakdown.items[1].name, "c");
    }

    #[test]
    fn test_split_unescaped() {
        assert_eq!(split_unescaped("a|b\\|c|d", '|'), vec!["a", "b\\|c", "d"]);
        assert_eq!(split_unescaped("a\\\\|b", '|'), vec!["a\\\\", "b"]);
        assert_eq!(split_unescaped("", '|'), vec![""]);
    }

    #[test]
    fn test_parse_ratio_empty_signature() {
        assert_eq!(parse_ratio(""), RatioBreakdown::default());
    }
}
