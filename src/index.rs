use std::collections::{BTreeSet, HashMap};

use tracing::debug;

use crate::models::{Issue, Stage, Transaction};
use crate::templates::{TemplateEngine, TemplateRecord};
use crate::trie::Trie;

/// Counts and issues from building an [`Index`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub unique_payees: usize,
    pub unique_templates: usize,
    pub issues: Vec<Issue>,
}

/// Payees, accounts and per-payee templates derived from a set of transactions.
///
/// An index is a snapshot: it is built in one pass and never edited. To reflect
/// new transactions, build a new one.
#[derive(Debug, Default)]
pub struct Index {
    payees: Vec<String>,
    accounts: Trie,
    templates: HashMap<String, Vec<TemplateRecord>>,
}

impl Index {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build never fails; anything odd in the input lands in the report.
    pub fn build(transactions: &[Transaction]) -> (Index, BuildReport) {
        let mut payees = BTreeSet::new();
        let mut accounts = Trie::new();
        let mut issues = Vec::new();
        let mut engine = TemplateEngine::new();

        for tx in transactions {
            if !tx.payee.is_empty() {
                payees.insert(tx.payee.clone());
            }
            for posting in &tx.postings {
                let account = posting.account.trim();
                if account.is_empty() {
                    issues.push(Issue::new(
                        Stage::Index,
                        format!(
                            "transaction on {} for payee {:?} has a posting without an account",
                            tx.date.format("%Y-%m-%d"),
                            tx.payee
                        ),
                    ));
                    continue;
                }
                accounts.insert(account);
            }
            engine.observe(tx);
        }

        let (templates, template_issues) = engine.finish();
        issues.extend(template_issues);

        let index = Index {
            payees: payees.into_iter().collect(),
            accounts,
            templates,
        };
        let report = BuildReport {
            unique_payees: index.payees.len(),
            unique_templates: index.templates.values().map(Vec::len).sum(),
            issues,
        };
        debug!(
            transactions = transactions.len(),
            payees = report.unique_payees,
            accounts = index.accounts.len(),
            templates = report.unique_templates,
            issues = report.issues.len(),
            "built index"
        );
        (index, report)
    }

    /// Sorted, unique payee names.
    pub fn payees(&self) -> &[String] {
        &self.payees
    }

    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }

    /// Payees starting with `prefix`, ignoring case, in sorted order.
    pub fn find_payees(&self, prefix: &str) -> Vec<String> {
        let prefix = prefix.to_lowercase();
        self.payees
            .iter()
            .filter(|p| p.to_lowercase().starts_with(&prefix))
            .cloned()
            .collect()
    }

    /// Accounts starting with `prefix`, ignoring case, in sorted order.
    pub fn find_accounts(&self, prefix: &str) -> Vec<String> {
        let mut matches = self.accounts.find_ignore_case(prefix);
        matches.sort();
        matches
    }

    /// Ranked templates for an exact payee name.
    pub fn templates(&self, payee: &str) -> &[TemplateRecord] {
        self.templates.get(payee).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.payees.is_empty() && self.accounts.is_empty() && self.templates.is_empty()
    }
}
