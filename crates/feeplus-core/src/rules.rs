//! Percentage fee rules evaluated by the cart transform.
//!
//! Rules are plain text, one `MIN-MAX=PERCENT%` range per line. The first
//! range containing the cart subtotal decides the percentage, and the fee
//! is that percentage of the subtotal rounded to cents.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeeRule {
    pub min: f64,
    pub max: f64,
    pub percent: f64,
}

impl FeeRule {
    fn contains(&self, subtotal: f64) -> bool {
        subtotal >= self.min && subtotal <= self.max
    }

    fn parse(line: &str) -> Option<Self> {
        let (range, percent) = line.split_once('=')?;
        let (min, max) = range.split_once('-')?;

        let min = min.trim().parse::<f64>().ok()?;
        let max = max.trim().parse::<f64>().ok()?;
        let percent = percent.trim_end_matches('%').trim().parse::<f64>().ok()?;

        (max >= min && percent >= 0.0).then_some(Self { min, max, percent })
    }
}

/// Parses rule text, silently dropping lines that do not form a valid range.
pub fn parse_rules(text: &str) -> Vec<FeeRule> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(FeeRule::parse)
        .collect()
}

pub fn find_percent(rules: &[FeeRule], subtotal: f64) -> Option<f64> {
    rules.iter().find(|r| r.contains(subtotal)).map(|r| r.percent)
}

/// Fee for `subtotal`, rounded to cents. No matching range means no fee.
pub fn fee_for_subtotal(rules: &[FeeRule], subtotal: f64) -> f64 {
    let percent = find_percent(rules, subtotal).unwrap_or(0.0);
    round_to_cents(subtotal * percent / 100.0)
}

fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
