//! `passvault list` — display stored site passwords in a table.

use crate::cli::output;
use crate::cli::{connect, Cli};
use crate::errors::Result;
use crate::vault::Entry;

/// Execute the `list` command.
pub async fn execute(cli: &Cli, username: &str, show: bool, search: Option<&str>) -> Result<()> {
    let client = connect(cli).await?;
    let entries = client.list_passwords(username).await?;

    let entries = match search {
        Some(term) => {
            let matched = filter_entries(entries, term);
            output::info(&format!(
                "{username} — {} password(s) matching '{term}'",
                matched.len()
            ));
            matched
        }
        None => {
            output::info(&format!("{username} — {} password(s)", entries.len()));
            entries
        }
    };
    output::print_entries_table(&entries, show);

    if !show && !entries.is_empty() {
        output::tip("Pass --show to reveal passwords.");
    }
    Ok(())
}

/// Keep the entries whose website or site username contains `term`,
/// ignoring case.  An empty term keeps everything.
pub fn filter_entries(entries: Vec<Entry>, term: &str) -> Vec<Entry> {
    let needle = term.to_lowercase();
    if needle.is_empty() {
        return entries;
    }

    entries
        .into_iter()
        .filter(|e| {
            e.website.to_lowercase().contains(&needle)
                || e.username.to_lowercase().contains(&needle)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Entry> {
        vec![
            Entry::new("google.com", "user1_google", "p1"),
            Entry::new("facebook.com", "user1_fb", "p2"),
            Entry::new("mail.example.org", "Postmaster", "p3"),
        ]
    }

    fn websites(entries: &[Entry]) -> Vec<&str> {
        entries.iter().map(|e| e.website.as_str()).collect()
    }

    #[test]
    fn search_matches_website_ignoring_case() {
        let found = filter_entries(sample(), "FACE");
        assert_eq!(websites(&found), vec!["facebook.com"]);
    }

    #[test]
    fn search_matches_site_username() {
        let found = filter_entries(sample(), "postmaster");
        assert_eq!(websites(&found), vec!["mail.example.org"]);

        let found = filter_entries(sample(), "user1_");
        assert_eq!(websites(&found), vec!["google.com", "facebook.com"]);
    }

    #[test]
    fn search_never_matches_password() {
        assert!(filter_entries(sample(), "p3").is_empty());
    }

    #[test]
    fn empty_search_keeps_everything() {
        assert_eq!(filter_entries(sample(), "").len(), 3);
    }

    #[test]
    fn search_without_match_is_empty() {
        assert!(filter_entries(sample(), "github").is_empty());
    }
}
