use std::fs;
use std::io::{self, Read};

use anyhow::{Context, Result};
use feeplus_core::rules::{FeeRule, fee_for_subtotal, find_percent, parse_rules};
use serde::Serialize;

use crate::cli::{OutputFormat, RulesPreviewArgs};
use crate::output::{print_json, print_table, print_warning};

#[derive(Serialize)]
struct Preview {
    rules: Vec<FeeRule>,
    quotes: Vec<Quote>,
}

#[derive(Serialize)]
struct Quote {
    subtotal: f64,
    percent: Option<f64>,
    fee: f64,
}

fn read_rules(file: &Option<String>) -> Result<String> {
    match file {
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("Failed to read file: {path}"))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn build_preview(text: &str, subtotals: &[f64]) -> Preview {
    let rules = parse_rules(text);
    let quotes = subtotals
        .iter()
        .map(|&subtotal| Quote {
            subtotal,
            percent: find_percent(&rules, subtotal),
            fee: fee_for_subtotal(&rules, subtotal),
        })
        .collect();
    Preview { rules, quotes }
}

pub fn preview(args: &RulesPreviewArgs, format: OutputFormat) -> Result<bool> {
    let preview = build_preview(&read_rules(&args.file)?, &args.subtotals);
    let has_rules = !preview.rules.is_empty();

    match format {
        OutputFormat::Json => print_json(&preview)?,
        OutputFormat::Table => {
            let rule_rows = preview
                .rules
                .iter()
                .map(|r| [format!("{:.2}", r.min), format!("{:.2}", r.max), format!("{}%", r.percent)])
                .collect();
            print_table(["Min", "Max", "Percent"], rule_rows);

            let quote_rows = preview
                .quotes
                .iter()
                .map(|q| {
                    [
                        format!("{:.2}", q.subtotal),
                        q.percent.map_or("-".to_string(), |p| format!("{p}%")),
                        format!("{:.2}", q.fee),
                    ]
                })
                .collect();
            print_table(["Subtotal", "Percent", "Fee"], quote_rows);
            if !has_rules {
                print_warning("No valid rules found");
            }
        }
    }
    Ok(has_rules)
}
