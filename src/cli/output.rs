//! Colored terminal output helpers.
//!
//! All user-facing output goes through these functions so we get
//! consistent styling across every command.

use comfy_table::{ContentArrangement, Table};
use console::style;

use crate::vault::Entry;

/// Shown in place of a password unless `--show` is passed.
const MASK: &str = "********";

/// Print a green success message: "check_mark {msg}"
pub fn success(msg: &str) {
    println!("{} {}", style("\u{2713}").green().bold(), msg);
}

/// Print a red error message: "x_mark {msg}"
pub fn error(msg: &str) {
    eprintln!("{} {}", style("\u{2717}").red().bold(), msg);
}

/// Print a yellow warning: "warning_sign {msg}"
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("\u{26a0}").yellow().bold(), msg);
}

/// Print a blue info message: "info_sign {msg}"
pub fn info(msg: &str) {
    println!("{} {}", style("\u{2139}").blue().bold(), msg);
}

/// Print a dim tip/hint: "arrow {msg}"
pub fn tip(msg: &str) {
    println!("{} {}", style("\u{2192}").dim(), style(msg).dim());
}

/// Print a table of entries (Website, Username, Password).
///
/// Rows are sorted by website; the server does not order them.
pub fn print_entries_table(entries: &[Entry], show_passwords: bool) {
    if entries.is_empty() {
        info("No passwords stored yet.");
        tip("Run `passvault add <USER> <WEBSITE> <SITE_USERNAME>` to add one.");
        return;
    }

    let mut rows: Vec<&Entry> = entries.iter().collect();
    rows.sort_by(|a, b| a.website.cmp(&b.website));

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Website", "Username", "Password"]);

    for e in rows {
        let password = if show_passwords {
            e.password.clone()
        } else {
            MASK.to_string()
        };
        table.add_row(vec![e.website.clone(), e.username.clone(), password]);
    }

    println!("{table}");
}
