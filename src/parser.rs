use std::path::Path;

use chrono::NaiveDate;
use tracing::debug;

use crate::amount::Amount;
use crate::error::{Result, TellerError};
use crate::models::{Inference, Issue, Posting, Stage, Transaction};

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

#[derive(Debug, Clone, Default)]
pub struct ParseResult {
    pub transactions: Vec<Transaction>,
    pub issues: Vec<Issue>,
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Read a ledger file and parse it. Failing to read the file is the only error;
/// everything wrong inside the file becomes an `Issue`.
pub fn parse_file(path: &Path) -> Result<ParseResult> {
    let text = std::fs::read_to_string(path).map_err(|source| TellerError::ReadLedger {
        path: path.display().to_string(),
        source,
    })?;
    let result = parse_str(&text);
    debug!(
        path = %path.display(),
        transactions = result.transactions.len(),
        issues = result.issues.len(),
        "parsed ledger"
    );
    Ok(result)
}

/// Where the parser stands relative to the most recent header line.
enum Cursor {
    /// No transaction open: before the first header or after a rejected one.
    Empty,
    /// A transaction is open; `usize` is its header line.
    Open(Transaction, usize),
}

pub fn parse_str(text: &str) -> ParseResult {
    let mut result = ParseResult::default();
    let mut cursor = Cursor::Empty;

    for (idx, line) in text.lines().enumerate() {
        let line_no = idx + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with(';') {
            continue;
        }

        if trimmed.starts_with(|c: char| c.is_ascii_digit()) {
            if let Cursor::Open(tx, header_line) = std::mem::replace(&mut cursor, Cursor::Empty) {
                finish_transaction(tx, header_line, &mut result);
            }
            cursor = match parse_header(trimmed) {
                Ok(tx) => Cursor::Open(tx, line_no),
                Err(message) => {
                    result.issues.push(Issue::at_line(Stage::Parse, line_no, message));
                    Cursor::Empty
                }
            };
            continue;
        }

        match &mut cursor {
            Cursor::Empty => result.issues.push(Issue::at_line(
                Stage::Parse,
                line_no,
                "encountered posting before any transaction date",
            )),
            Cursor::Open(tx, _) => match parse_posting(line) {
                Ok(posting) => tx.postings.push(posting),
                Err(message) => result.issues.push(Issue::at_line(Stage::Parse, line_no, message)),
            },
        }
    }

    if let Cursor::Open(tx, header_line) = cursor {
        finish_transaction(tx, header_line, &mut result);
    }
    result
}

fn finish_transaction(mut tx: Transaction, header_line: usize, result: &mut ParseResult) {
    let problem = match tx.infer_elided_amount() {
        Inference::Complete | Inference::Filled(_) => None,
        Inference::Ambiguous(count) => Some(format!("has {count} postings without amounts")),
        Inference::Overflow(_) => Some("has amounts whose total overflows".to_string()),
    };
    if let Some(problem) = problem {
        result.issues.push(Issue::at_line(
            Stage::Parse,
            header_line,
            format!(
                "transaction on {} for payee {:?} {problem}",
                tx.date.format("%Y-%m-%d"),
                tx.payee
            ),
        ));
    }
    result.transactions.push(tx);
}

// ---------------------------------------------------------------------------
// Header: DATE [*] PAYEE [; COMMENT]
// ---------------------------------------------------------------------------

fn parse_header(line: &str) -> std::result::Result<Transaction, String> {
    let (date, rest) = parse_date(line)?;
    let (cleared, rest) = match rest.trim_start().strip_prefix('*') {
        Some(after) => (true, after),
        None => (false, rest),
    };
    let (payee, comment) = split_comment(rest);
    Ok(Transaction {
        date,
        payee,
        comment,
        cleared,
        postings: Vec::new(),
    })
}

/// The date is always the first ten characters; whatever follows, even with
/// no space in between (`2025-01-15* Payee`), is the rest of the header.
fn parse_date(line: &str) -> std::result::Result<(NaiveDate, &str), String> {
    line.get(..10)
        .and_then(|token| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(token, fmt).ok())
        })
        .map(|date| (date, &line[10..]))
        .ok_or_else(|| {
            let token = line.split_whitespace().next().unwrap_or(line);
            format!("unrecognized date format '{token}'")
        })
}

// ---------------------------------------------------------------------------
// Posting: WHITESPACE ACCOUNT [SEP AMOUNT] [; COMMENT]
// ---------------------------------------------------------------------------

fn parse_posting(line: &str) -> std::result::Result<Posting, String> {
    if !line.starts_with(char::is_whitespace) {
        return Err("posting line must start with whitespace".to_string());
    }
    let (text, comment) = split_comment(line);
    let (account, amount) = split_account_and_amount(&text);
    if account.is_empty() {
        return Err("posting missing account name".to_string());
    }
    Ok(Posting {
        account,
        amount,
        comment,
    })
}

/// Split on the first tab or run of two spaces. The remainder only counts as
/// an amount if it parses as one; otherwise the whole text is the account.
fn split_account_and_amount(text: &str) -> (String, Option<Amount>) {
    let text = text.trim();
    let bytes = text.as_bytes();
    let split = (0..bytes.len())
        .find(|&i| bytes[i] == b'\t' || (bytes[i] == b' ' && bytes.get(i + 1) == Some(&b' ')));

    if let Some(i) = split {
        if let Some(amount) = Amount::parse_ledger(&text[i..]) {
            return (text[..i].trim().to_string(), Some(amount));
        }
    }
    (text.to_string(), None)
}

/// Split `text ; comment` on the first `;` not escaped as `\;`.
/// Both halves are trimmed; escaped semicolons are unescaped in the text.
fn split_comment(s: &str) -> (String, Option<String>) {
    let bytes = s.as_bytes();
    let idx = (0..bytes.len()).find(|&i| bytes[i] == b';' && (i == 0 || bytes[i - 1] != b'\\'));
    let (text, comment) = match idx {
        Some(i) => (&s[..i], Some(s[i + 1..].trim().to_string())),
        None => (s, None),
    };
    let text = text.trim().replace("\\;", ";");
    (text, comment.filter(|c| !c.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn amt(s: &str) -> Option<Amount> {
        Some(s.parse().unwrap())
    }

    #[test]
    fn test_parse_header_and_postings() {
        let text = "\
2025-01-15 * Super Grocery ; weekly shop
    Expenses:Food:Groceries    $ 42.10
    Assets:Checking
";
        let result = parse_str(text);
        assert!(result.issues.is_empty());
        assert_eq!(result.transactions.len(), 1);
        let tx = &result.transactions[0];
        assert_eq!(tx.date, NaiveDate::from_ymd_opt(2025, 1, 15).unwrap());
        assert!(tx.cleared);
        assert_eq!(tx.payee, "Super Grocery");
        assert_eq!(tx.comment.as_deref(), Some("weekly shop"));
        assert_eq!(tx.postings[0].account, "Expenses:Food:Groceries");
        assert_eq!(tx.postings[0].amount, amt("42.10"));
        assert_eq!(tx.postings[1].amount, amt("-42.10"));
    }

    #[test]
    fn test_slash_dates_and_uncleared() {
        let result = parse_str("2024/12/31 Landlord\n\tExpenses:Rent\t1200\n\tAssets:Checking\t-1200\n");
        let tx = &result.transactions[0];
        assert!(!tx.cleared);
        assert_eq!(tx.payee, "Landlord");
        assert_eq!(tx.comment, None);
        assert!(tx.is_balanced());
    }

    #[test]
    fn test_balance_inference_fills_elided_amount() {
        let text = "\
2025-02-01 Market
    A
    B    30.00
    C    -70.00
";
        let result = parse_str(text);
        assert!(result.issues.is_empty());
        assert_eq!(result.transactions[0].postings[0].amount, amt("40.00"));
    }

    #[test]
    fn test_two_elided_amounts_is_issue_but_emitted() {
        let text = "\
2025-02-01 Market
    A
    B
    C    -70.00
";
        let result = parse_str(text);
        assert_eq!(result.transactions.len(), 1);
        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.issues[0].line, Some(1));
        assert!(result.issues[0].message.contains("2 postings without amounts"));
        assert_eq!(result.transactions[0].postings[0].amount, None);
        assert_eq!(result.transactions[0].postings[1].amount, None);
    }

    #[test]
    fn test_invalid_date_is_single_issue() {
        let mut text = String::new();
        for day in 1..=9 {
            text.push_str(&format!(
                "2025-03-{day:02} Cafe\n    Expenses:Coffee    $4.00\n    Assets:Cash\n\n"
            ));
        }
        text.push_str("2025-13-45 Broken\n");
        let result = parse_str(&text);
        assert_eq!(result.transactions.len(), 9);
        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.issues[0].line, Some(37));
        assert!(result.issues[0].message.contains("2025-13-45"));
    }

    #[test]
    fn test_postings_under_invalid_date_are_each_reported() {
        let result = parse_str("2025-13-45 Broken\n    Expenses:Coffee    $4.00\n    Assets:Cash\n");
        assert!(result.transactions.is_empty());
        assert_eq!(result.issues.len(), 3);
        assert!(result.issues[0].message.contains("unrecognized date format '2025-13-45'"));
        for (issue, line) in result.issues[1..].iter().zip([2, 3]) {
            assert_eq!(issue.line, Some(line));
            assert!(issue.message.contains("before any transaction date"));
        }
    }

    #[test]
    fn test_date_needs_no_space_before_rest_of_header() {
        let result = parse_str("2025-01-15* Payee\n    A    1\n    B\n2025-01-16;note\n    A    2\n    B\n");
        assert!(result.issues.is_empty(), "{:?}", result.issues);
        let cleared = &result.transactions[0];
        assert!(cleared.cleared);
        assert_eq!(cleared.payee, "Payee");
        let commented = &result.transactions[1];
        assert_eq!(commented.date, NaiveDate::from_ymd_opt(2025, 1, 16).unwrap());
        assert_eq!(commented.payee, "");
        assert_eq!(commented.comment.as_deref(), Some("note"));
    }

    #[test]
    fn test_short_or_loose_dates_are_rejected() {
        for header in ["2025-1-5 Payee", "2025", "20250115 Payee"] {
            let result = parse_str(header);
            assert_eq!(result.issues.len(), 1, "{header}");
            assert!(result.issues[0].message.contains("unrecognized date format"));
        }
    }

    #[test]
    fn test_overflowing_total_is_issue_and_posting_left_empty() {
        let text = "\
2025-02-01 Vault
    A    79228162514264337593543950335
    B    79228162514264337593543950335
    C
";
        let result = parse_str(text);
        assert_eq!(result.transactions.len(), 1);
        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.issues[0].line, Some(1));
        assert!(result.issues[0].message.contains("overflows"));
        assert_eq!(result.transactions[0].postings[2].amount, None);
    }

    #[test]
    fn test_posting_before_any_date() {
        let result = parse_str("    Assets:Cash    5\n2025-01-01 X\n    A    1\n    B\n");
        assert_eq!(result.transactions.len(), 1);
        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.issues[0].line, Some(1));
        assert!(result.issues[0].message.contains("before any transaction"));
    }

    #[test]
    fn test_comments_and_blank_lines_skipped() {
        let text = "; header comment\n\n   ; indented comment\n2025-01-01 X\n  ; note\n    A    1\n    B\n";
        let result = parse_str(text);
        assert!(result.issues.is_empty());
        assert_eq!(result.transactions[0].postings.len(), 2);
    }

    #[test]
    fn test_invalid_amount_becomes_part_of_account() {
        let text = "2025-01-01 X\n    Expenses:Odd    $12 3.45\n    Assets:Cash    -5\n";
        let result = parse_str(text);
        let tx = &result.transactions[0];
        assert_eq!(tx.postings[0].account, "Expenses:Odd    $12 3.45");
        assert_eq!(tx.postings[0].amount, amt("5"));
    }

    #[test]
    fn test_account_with_single_spaces_and_comment() {
        let text = "2025-01-01 X\n    Expenses:Eating Out    $ -12.00 ; lunch\n    Assets:Cash\n";
        let result = parse_str(text);
        let posting = &result.transactions[0].postings[0];
        assert_eq!(posting.account, "Expenses:Eating Out");
        assert_eq!(posting.amount, amt("-12"));
        assert_eq!(posting.comment.as_deref(), Some("lunch"));
    }

    #[test]
    fn test_escaped_semicolon_stays_in_payee() {
        let result = parse_str("2025-01-01 Smith \\; Sons ; trip\n    A    1\n    B\n");
        let tx = &result.transactions[0];
        assert_eq!(tx.payee, "Smith ; Sons");
        assert_eq!(tx.comment.as_deref(), Some("trip"));
    }

    #[test]
    fn test_unindented_posting_is_issue() {
        let result = parse_str("2025-01-01 X\nAssets:Cash    5\n    B    -5\n");
        assert_eq!(result.issues.len(), 1);
        assert!(result.issues[0].message.contains("must start with whitespace"));
        assert_eq!(result.transactions[0].postings.len(), 1);
    }

    #[test]
    fn test_missing_account_name_is_rejected() {
        let err = parse_posting("   \t ").unwrap_err();
        assert!(err.contains("missing account"));
    }

    #[test]
    fn test_parse_file_missing_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let err = parse_file(&dir.path().join("nope.ledger")).unwrap_err();
        assert!(matches!(err, TellerError::ReadLedger { .. }));
    }

    #[test]
    fn test_parse_file_reads_whole_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("main.ledger");
        std::fs::write(&path, "2025-01-01 X\n    A    1\n    B\n").unwrap();
        let result = parse_file(&path).unwrap();
        assert_eq!(result.transactions.len(), 1);
    }
}
