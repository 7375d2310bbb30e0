use teller::error::Result;
use teller::settings::{expand_home, load_settings, save_settings};

pub fn run(ledger: Option<&str>, session: Option<&str>) -> Result<()> {
    let mut settings = load_settings();

    if ledger.is_none() && session.is_none() {
        println!("Ledger:   {}", settings.ledger_file.as_deref().unwrap_or("(not set)"));
        println!("Session:  {}", settings.session_file);
        return Ok(());
    }

    if let Some(path) = ledger {
        let expanded = expand_home(path);
        let stored = std::fs::canonicalize(&expanded).unwrap_or(expanded);
        settings.ledger_file = Some(stored.to_string_lossy().into_owned());
    }
    if let Some(path) = session {
        settings.session_file = path.to_string();
    }
    save_settings(&settings)?;

    println!("Ledger:   {}", settings.ledger_file.as_deref().unwrap_or("(not set)"));
    println!("Session:  {}", settings.session_file);
    Ok(())
}
