use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::amount::Amount;

/// One leg of a transaction. `amount == None` means the amount was elided
/// and is expected to be solved from the other legs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    pub account: String,
    #[serde(default)]
    pub amount: Option<Amount>,
    #[serde(default)]
    pub comment: Option<String>,
}

impl Posting {
    pub fn new(account: &str, amount: Option<Amount>) -> Self {
        Self {
            account: account.to_string(),
            amount,
            comment: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub date: NaiveDate,
    pub payee: String,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub cleared: bool,
    #[serde(default)]
    pub postings: Vec<Posting>,
}

/// Outcome of solving elided posting amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inference {
    /// Every posting already had an amount.
    Complete,
    /// The single elided posting at this index was filled in.
    Filled(usize),
    /// This many postings were elided; nothing was changed.
    Ambiguous(usize),
    /// The stated amounts add up past `Decimal`'s range, so the elided
    /// posting at this index was left without an amount.
    Overflow(usize),
}

impl Transaction {
    pub fn new(date: NaiveDate, payee: &str) -> Self {
        Self {
            date,
            payee: payee.to_string(),
            comment: None,
            cleared: false,
            postings: Vec::new(),
        }
    }

    pub fn with_posting(mut self, posting: Posting) -> Self {
        self.postings.push(posting);
        self
    }

    pub fn elided_count(&self) -> usize {
        self.postings.iter().filter(|p| p.amount.is_none()).count()
    }

    /// Posting amounts with a single elided amount solved from the rest.
    /// With two or more elisions the missing amounts stay `None`.
    /// An overflowing sum also leaves the elided amount `None`.
    pub fn resolved_amounts(&self) -> Vec<Option<Amount>> {
        let mut amounts: Vec<Option<Amount>> = self.postings.iter().map(|p| p.amount).collect();
        if self.elided_count() == 1 {
            let remainder = self.stated_total().map(|total| -total);
            if let Some(slot) = amounts.iter_mut().find(|a| a.is_none()) {
                *slot = remainder;
            }
        }
        amounts
    }

    /// Sum of the postings that carry an amount, `None` on overflow.
    pub fn stated_total(&self) -> Option<Amount> {
        Amount::checked_sum(self.postings.iter().filter_map(|p| p.amount.as_ref()))
    }

    pub fn infer_elided_amount(&mut self) -> Inference {
        let missing: Vec<usize> = self
            .postings
            .iter()
            .enumerate()
            .filter(|(_, p)| p.amount.is_none())
            .map(|(i, _)| i)
            .collect();
        match missing.as_slice() {
            [] => Inference::Complete,
            [index] => match self.stated_total() {
                Some(total) => {
                    self.postings[*index].amount = Some(-total);
                    Inference::Filled(*index)
                }
                None => Inference::Overflow(*index),
            },
            many => Inference::Ambiguous(many.len()),
        }
    }

    /// True when every posting has an amount and they sum to zero.
    pub fn is_balanced(&self) -> bool {
        self.elided_count() == 0 && self.stated_total().is_some_and(|total| total.is_zero())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    Parse,
    Index,
    Template,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Parse => "parse",
            Stage::Index => "index",
            Stage::Template => "template",
        };
        f.write_str(name)
    }
}

/// A non-fatal problem. Issues never stop processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub stage: Stage,
    pub line: Option<usize>,
    pub message: String,
}

impl Issue {
    pub fn at_line(stage: Stage, line: usize, message: impl Into<String>) -> Self {
        Self {
            stage,
            line: Some(line),
            message: message.into(),
        }
    }

    pub fn new(stage: Stage, message: impl Into<String>) -> Self {
        Self {
            stage,
            line: None,
            message: message.into(),
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "line {line}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Issue counts per stage, for a one-line load summary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssueSummary {
    pub by_stage: BTreeMap<Stage, usize>,
}

impl IssueSummary {
    pub fn from_issues<'a>(issues: impl IntoIterator<Item = &'a Issue>) -> Self {
        let mut by_stage = BTreeMap::new();
        for issue in issues {
            *by_stage.entry(issue.stage).or_insert(0) += 1;
        }
        Self { by_stage }
    }

    pub fn total(&self) -> usize {
        self.by_stage.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_stage.is_empty()
    }
}

impl fmt::Display for IssueSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .by_stage
            .iter()
            .map(|(stage, count)| format!("{stage}: {count}"))
            .collect();
        write!(f, "{} issue(s) ({})", self.total(), parts.join(", "))
    }
}
