use crate::amount::Amount;

const TAB_WIDTH: usize = 4;

/// Format an amount as dollars with thousands separators: $1,234.56
pub fn money(val: Amount) -> String {
    let negative = val.is_negative();
    let cents = (if negative { -val } else { val }).to_string();
    let (int_part, dec_part) = cents.split_once('.').unwrap_or((cents.as_str(), "00"));

    let mut with_commas = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            with_commas.push(',');
        }
        with_commas.push(c);
    }
    let with_commas: String = with_commas.chars().rev().collect();

    if negative {
        format!("-${with_commas}.{dec_part}")
    } else {
        format!("${with_commas}.{dec_part}")
    }
}

/// Display column reached by `s`, with tabs advancing to the next multiple of 4.
pub fn column_of(s: &str) -> usize {
    s.chars().fold(0, |col, c| {
        if c == '\t' {
            (col / TAB_WIDTH + 1) * TAB_WIDTH
        } else {
            col + 1
        }
    })
}

/// Append tabs until `s` reaches `target`; always appends at least one.
pub fn tab_to_column(s: &mut String, target: usize) {
    s.push('\t');
    while column_of(s) < target {
        s.push('\t');
    }
}
