use std::collections::BTreeSet;

use tracing::debug;

use crate::index::{BuildReport, Index};
use crate::models::{Issue, Transaction};
use crate::templates::{self, TemplateRecord};

/// Index over the in-progress batch of transactions not yet in the ledger.
///
/// Every change to the batch rebuilds it from scratch, so edits and deletions
/// can never leave stale suggestions behind.
#[derive(Debug, Default)]
pub struct RuntimeIndex {
    index: Index,
    issues: Vec<Issue>,
}

impl RuntimeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Discard everything and rebuild from `batch`.
    pub fn rebuild_from(&mut self, batch: &[Transaction]) {
        let (index, report) = Index::build(batch);
        *self = RuntimeIndex {
            index,
            issues: report.issues,
        };
    }

    pub fn index(&self) -> &Index {
        &self.index
    }

    /// Issues from the most recent rebuild.
    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }
}

/// Query facade over the ledger index and the runtime batch index.
#[derive(Debug, Default)]
pub struct Intelligence {
    base: Index,
    runtime: RuntimeIndex,
}

impl Intelligence {
    pub fn load(transactions: &[Transaction]) -> (Intelligence, BuildReport) {
        let (base, report) = Index::build(transactions);
        let intelligence = Intelligence {
            base,
            runtime: RuntimeIndex::new(),
        };
        (intelligence, report)
    }

    pub fn rebuild_from_batch(&mut self, batch: &[Transaction]) {
        self.runtime.rebuild_from(batch);
        debug!(
            batch = batch.len(),
            payees = self.runtime.index().payees().len(),
            issues = self.runtime.issues().len(),
            "rebuilt runtime index"
        );
    }

    pub fn base(&self) -> &Index {
        &self.base
    }

    pub fn runtime(&self) -> &RuntimeIndex {
        &self.runtime
    }

    /// Payees from both indexes matching `prefix` (ignoring case), sorted.
    pub fn find_payees(&self, prefix: &str) -> Vec<String> {
        union_sorted(
            self.runtime.index().find_payees(prefix),
            self.base.find_payees(prefix),
        )
    }

    /// Accounts from both indexes matching `prefix` (ignoring case), sorted.
    pub fn find_accounts(&self, prefix: &str) -> Vec<String> {
        union_sorted(
            self.runtime.index().find_accounts(prefix),
            self.base.find_accounts(prefix),
        )
    }

    /// Templates for `payee` from both indexes. A shape present in both gets
    /// the sum of both frequencies.
    pub fn find_templates(&self, payee: &str) -> Vec<TemplateRecord> {
        templates::merge([self.base.templates(payee), self.runtime.index().templates(payee)])
    }
}

fn union_sorted(a: Vec<String>, b: Vec<String>) -> Vec<String> {
    a.into_iter().chain(b).collect::<BTreeSet<_>>().into_iter().collect()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::amount::Amount;
    use crate::models::Posting;

    fn tx(payee: &str, postings: &[(&str, Option<&str>)]) -> Transaction {
        let mut t = Transaction::new(NaiveDate::from_ymd_opt(2025, 4, 2).unwrap(), payee);
        for (account, amount) in postings {
            t.postings
                .push(Posting::new(account, amount.map(|a| a.parse::<Amount>().unwrap())));
        }
        t
    }

    fn food(payee: &str) -> Transaction {
        tx(payee, &[("Expenses:Food", Some("10")), ("Assets:Checking", None)])
    }

    #[test]
    fn test_merged_template_frequency_is_summed() {
        let (mut intel, _) = Intelligence::load(&[food("X"), food("X"), food("X")]);
        intel.rebuild_from_batch(&[food("X")]);
        let templates = intel.find_templates("X");
        assert_eq!(templates.len(), 1);
        assert_eq!(templates[0].frequency, 4);
        assert_eq!(templates[0].debit_accounts, vec!["Expenses:Food"]);
        assert_eq!(templates[0].credit_accounts, vec!["Assets:Checking"]);
    }

    #[test]
    fn test_runtime_only_shape_is_ranked_in() {
        let (mut intel, _) = Intelligence::load(&[food("X")]);
        let fuel = tx("X", &[("Expenses:Fuel", Some("30")), ("Liabilities:Visa", None)]);
        intel.rebuild_from_batch(&[fuel.clone(), fuel]);
        let templates = intel.find_templates("X");
        assert_eq!(templates.len(), 2);
        assert_eq!(templates[0].debit_accounts, vec!["Expenses:Fuel"]);
        assert_eq!(templates[0].frequency, 2);
        assert_eq!(templates[1].frequency, 1);
    }

    #[test]
    fn test_payees_and_accounts_union() {
        let (mut intel, _) = Intelligence::load(&[food("Market"), food("Bakery")]);
        intel.rebuild_from_batch(&[
            food("Market"),
            tx("Mechanic", &[("Expenses:Auto", Some("80")), ("Assets:Checking", None)]),
        ]);
        assert_eq!(intel.find_payees("m"), vec!["Market", "Mechanic"]);
        assert_eq!(intel.find_payees(""), vec!["Bakery", "Market", "Mechanic"]);
        assert_eq!(
            intel.find_accounts("e"),
            vec!["Expenses:Auto", "Expenses:Food"]
        );
    }

    #[test]
    fn test_rebuild_with_empty_batch_clears_runtime() {
        let (mut intel, _) = Intelligence::load(&[]);
        intel.rebuild_from_batch(&[
            food("Cafe"),
            tx("Cafe", &[("Expenses:Coffee", None), ("Assets:Cash", None)]),
        ]);
        assert_eq!(intel.find_payees("c"), vec!["Cafe"]);
        assert!(!intel.runtime().issues().is_empty());

        intel.rebuild_from_batch(&[]);
        assert!(intel.runtime().index().is_empty());
        assert!(intel.runtime().issues().is_empty());
        assert!(intel.find_payees("").is_empty());
        assert!(intel.find_accounts("").is_empty());
        assert!(intel.find_templates("Cafe").is_empty());
    }

    #[test]
    fn test_rebuild_drops_corrected_typos() {
        let (mut intel, _) = Intelligence::load(&[]);
        intel.rebuild_from_batch(&[food("Marekt")]);
        intel.rebuild_from_batch(&[food("Market")]);
        assert_eq!(intel.find_payees("mar"), vec!["Market"]);
    }
}
