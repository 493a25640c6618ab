//! Token usage and cost estimates per service call

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl TokenUsage {
    pub fn total(&self) -> u32 {
        self.prompt_tokens + self.completion_tokens
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageRecord {
    pub stage: String,
    pub model: String,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub cost_usd: f64,
}

/// Pricing in USD per million tokens (input, output)
const PRICING: &[(&str, f64, f64)] = &[
    // longest keys first so "gpt-4.1-mini" is not priced as "gpt-4.1"
    ("gpt-5-chat-latest", 1.25, 10.00),
    ("gpt-4.1-nano", 0.10, 0.40),
    ("gpt-4.1-mini", 0.40, 1.60),
    ("gpt-4o-mini", 0.15, 0.60),
    ("gpt-5-nano", 0.05, 0.40),
    ("gpt-5-mini", 0.25, 2.00),
    ("gpt-4.1", 2.00, 8.00),
    ("gpt-4o", 2.50, 10.00),
    ("gpt-5", 1.25, 10.00),
];

/// Unknown models are priced like the cheapest tier
const FALLBACK_PRICING: (f64, f64) = (0.05, 0.40);

pub fn price_per_million(model: &str) -> (f64, f64) {
    let model = model.to_lowercase();
    PRICING
        .iter()
        .find(|(key, _, _)| model.contains(key))
        .map(|(_, input, output)| (*input, *output))
        .unwrap_or(FALLBACK_PRICING)
}

pub fn estimate_cost(model: &str, usage: TokenUsage) -> f64 {
    let (input, output) = price_per_million(model);
    (usage.prompt_tokens as f64 / 1_000_000.0) * input
        + (usage.completion_tokens as f64 / 1_000_000.0) * output
}

#[derive(Debug, Clone, Default)]
pub struct UsageTracker {
    records: Vec<UsageRecord>,
}

impl UsageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, stage: &str, model: &str, usage: TokenUsage) -> &UsageRecord {
        self.records.push(UsageRecord {
            stage: stage.to_string(),
            model: model.to_string(),
            prompt_tokens: usage.prompt_tokens,
            completion_tokens: usage.completion_tokens,
            cost_usd: estimate_cost(model, usage),
        });
        &self.records[self.records.len() - 1]
    }

    pub fn summary(&self) -> UsageSummary {
        UsageSummary {
            calls: self.records.len(),
            total_tokens: self
                .records
                .iter()
                .map(|r| (r.prompt_tokens + r.completion_tokens) as u64)
                .sum(),
            total_cost_usd: self.records.iter().map(|r| r.cost_usd).sum(),
            records: self.records.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageSummary {
    pub calls: usize,
    pub total_tokens: u64,
    pub total_cost_usd: f64,
    pub records: Vec<UsageRecord>,
}

impl UsageSummary {
    pub fn is_empty(&self) -> bool {
        self.calls == 0
    }
}
