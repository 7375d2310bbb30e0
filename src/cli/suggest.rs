use comfy_table::{Cell, Table};
use teller::error::Result;

use super::{load_intelligence, SourceArgs};

pub fn payees(prefix: &str, source: &SourceArgs) -> Result<()> {
    let intel = load_intelligence(source)?;
    for payee in intel.find_payees(prefix) {
        println!("{payee}");
    }
    Ok(())
}

pub fn accounts(prefix: &str, source: &SourceArgs) -> Result<()> {
    let intel = load_intelligence(source)?;
    for account in intel.find_accounts(prefix) {
        println!("{account}");
    }
    Ok(())
}

pub fn templates(payee: &str, source: &SourceArgs) -> Result<()> {
    let intel = load_intelligence(source)?;
    let records = intel.find_templates(payee);
    if records.is_empty() {
        println!("No templates for {payee}.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["#", "Frequency", "Debit", "Credit"]);
    for (i, record) in records.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(record.frequency),
            Cell::new(record.debit_accounts.join("\n")),
            Cell::new(record.credit_accounts.join("\n")),
        ]);
    }
    println!("Templates for {payee}\n{table}");
    Ok(())
}
