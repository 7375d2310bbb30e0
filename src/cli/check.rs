use colored::Colorize;
use teller::error::Result;
use teller::models::IssueSummary;
use teller::settings::resolve_ledger;

use super::load_ledger;

pub fn run(ledger: Option<&str>) -> Result<()> {
    let path = resolve_ledger(ledger)?;
    let (parsed, intel, report) = load_ledger(&path)?;

    println!("Ledger:        {}", path.display());
    println!("Transactions:  {}", parsed.transactions.len());
    println!("Payees:        {}", report.unique_payees);
    println!("Accounts:      {}", intel.base().account_count());
    println!("Templates:     {}", report.unique_templates);

    let issues: Vec<_> = parsed.issues.iter().chain(&report.issues).collect();
    let summary = IssueSummary::from_issues(issues.iter().copied());
    println!();
    if summary.is_empty() {
        println!("{}", "No issues found.".green());
        return Ok(());
    }
    println!("{}", summary.to_string().yellow().bold());
    for issue in issues {
        println!("  [{}] {issue}", issue.stage);
    }
    Ok(())
}
