use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use crate::models::{Issue, Stage, Transaction};

/// A recurring posting pattern for one payee and how often it was seen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateRecord {
    pub debit_accounts: Vec<String>,
    pub credit_accounts: Vec<String>,
    pub frequency: usize,
}

impl TemplateRecord {
    /// Canonical key for the shape: `debit|debit->credit|credit`.
    pub fn shape_key(&self) -> String {
        shape_key(&self.debit_accounts, &self.credit_accounts)
    }

    pub fn account_count(&self) -> usize {
        self.debit_accounts.len() + self.credit_accounts.len()
    }
}

fn shape_key(debit: &[String], credit: &[String]) -> String {
    format!("{}->{}", debit.join("|"), credit.join("|"))
}

/// Ranking: frequency descending, then more debit accounts first, then the
/// joined debit list, then the joined credit list.
pub fn compare(a: &TemplateRecord, b: &TemplateRecord) -> Ordering {
    b.frequency
        .cmp(&a.frequency)
        .then_with(|| b.debit_accounts.len().cmp(&a.debit_accounts.len()))
        .then_with(|| a.debit_accounts.join("|").cmp(&b.debit_accounts.join("|")))
        .then_with(|| a.credit_accounts.join("|").cmp(&b.credit_accounts.join("|")))
}

pub fn rank(records: &mut [TemplateRecord]) {
    records.sort_by(compare);
}

/// Combine record sets that may share shapes, summing the frequency of shared
/// shapes, and rank the result.
pub fn merge<'a>(sources: impl IntoIterator<Item = &'a [TemplateRecord]>) -> Vec<TemplateRecord> {
    let mut by_shape: HashMap<String, TemplateRecord> = HashMap::new();
    for records in sources {
        for record in records {
            by_shape
                .entry(record.shape_key())
                .and_modify(|existing| existing.frequency += record.frequency)
                .or_insert_with(|| record.clone());
        }
    }
    let mut merged: Vec<TemplateRecord> = by_shape.into_values().collect();
    rank(&mut merged);
    merged
}

/// Accumulates shape frequencies per payee across many transactions.
#[derive(Debug, Default)]
pub struct TemplateEngine {
    buckets: BTreeMap<String, BTreeMap<String, TemplateRecord>>,
    issues: Vec<Issue>,
}

impl TemplateEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one transaction toward its payee's shape. Transactions that yield
    /// no classifiable posting are recorded as issues and not counted.
    pub fn observe(&mut self, tx: &Transaction) {
        let date = tx.date.format("%Y-%m-%d");
        if tx.payee.is_empty() {
            self.issue(format!("transaction on {date} missing payee"));
            return;
        }
        if tx.postings.is_empty() {
            self.issue(format!("transaction on {date} for payee {:?} has no postings", tx.payee));
            return;
        }
        let elided = tx.elided_count();
        if elided > 1 {
            self.issue(format!(
                "payee {:?} transaction on {date} has {elided} postings without amounts",
                tx.payee
            ));
        }

        let mut debit = Vec::new();
        let mut credit = Vec::new();
        for (posting, amount) in tx.postings.iter().zip(tx.resolved_amounts()) {
            let account = posting.account.trim();
            if account.is_empty() {
                self.issue(format!("payee {:?} has posting with missing account", tx.payee));
                continue;
            }
            match amount {
                None => self.issue(format!(
                    "payee {:?} account {account:?} skipped due to missing amount",
                    tx.payee
                )),
                Some(amount) if amount.is_negative() => credit.push(account.to_string()),
                Some(_) => debit.push(account.to_string()),
            }
        }

        if debit.is_empty() && credit.is_empty() {
            self.issue(format!(
                "payee {:?} transaction on {date} produced empty template",
                tx.payee
            ));
            return;
        }

        debit.sort();
        credit.sort();
        let key = shape_key(&debit, &credit);
        self.buckets
            .entry(tx.payee.clone())
            .or_default()
            .entry(key)
            .or_insert_with(|| TemplateRecord {
                debit_accounts: debit,
                credit_accounts: credit,
                frequency: 0,
            })
            .frequency += 1;
    }

    /// Ranked templates per payee, plus the issues seen while observing.
    pub fn finish(self) -> (HashMap<String, Vec<TemplateRecord>>, Vec<Issue>) {
        let templates = self
            .buckets
            .into_iter()
            .map(|(payee, shapes)| {
                let mut records: Vec<TemplateRecord> = shapes.into_values().collect();
                rank(&mut records);
                (payee, records)
            })
            .collect();
        (templates, self.issues)
    }

    fn issue(&mut self, message: String) {
        self.issues.push(Issue::new(Stage::Template, message));
    }
}

/// Ranked templates for a single payee's transactions.
pub fn classify(transactions: &[Transaction]) -> (Vec<TemplateRecord>, Vec<Issue>) {
    let mut engine = TemplateEngine::new();
    for tx in transactions {
        engine.observe(tx);
    }
    let (templates, issues) = engine.finish();
    let mut records: Vec<TemplateRecord> = templates.into_values().flatten().collect();
    rank(&mut records);
    (records, issues)
}
