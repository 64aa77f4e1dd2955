//! Preview status codes and their reconciliation against detail pages.
//!
//! The PEP index shows a two-letter abbreviation per entry: a type letter
//! followed by an optional status letter. Only the status letter matters
//! here; it predicts which status phrase the PEP's own page will show.

/// Fixed mapping from a preview status letter to the phrases it stands for.
/// The empty code (no status letter) covers drafts and active process PEPs.
#[derive(Debug)]
pub struct StatusCodeTable {
    entries: &'static [(&'static str, &'static [&'static str])],
}

pub static STATUS_CODES: StatusCodeTable = StatusCodeTable {
    entries: &[
        ("", &["Draft", "Active"]),
        ("A", &["Active", "Accepted"]),
        ("D", &["Deferred"]),
        ("F", &["Final"]),
        ("P", &["Provisional"]),
        ("R", &["Rejected"]),
        ("S", &["Superseded"]),
        ("W", &["Withdrawn"]),
    ],
};

impl StatusCodeTable {
    /// Accepted phrases for `code`, or `None` for a code the table doesn't know.
    pub fn expected(&self, code: &str) -> Option<&'static [&'static str]> {
        self.entries
            .iter()
            .find(|(known, _)| *known == code)
            .map(|(_, phrases)| *phrases)
    }

    pub fn codes(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(code, _)| *code)
    }
}

/// The status letter of an abbreviation cell: its text minus the leading
/// type letter. A cell holding only the type letter yields `""`.
pub fn preview_code(cell_text: &str) -> &str {
    let text = cell_text.trim();
    match text.char_indices().nth(1) {
        Some((start, _)) => &text[start..],
        None => "",
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciliation {
    Consistent,
    Mismatch { expected: &'static [&'static str] },
    UnknownCode,
}

/// Compare a preview code with the status phrase found on the detail page.
pub fn reconcile(code: &str, status: &str) -> Reconciliation {
    match STATUS_CODES.expected(code) {
        None => Reconciliation::UnknownCode,
        Some(expected) if expected.iter().any(|phrase| *phrase == status) => {
            Reconciliation::Consistent
        }
        Some(expected) => Reconciliation::Mismatch { expected },
    }
}
