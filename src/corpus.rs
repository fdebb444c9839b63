//! Corpus text preparation helpers.
//!
//! Small utilities for turning raw, wiki-style text dumps into titled
//! document groups the retrievers can index. Dataset loading itself is the
//! caller's business; these helpers only normalize and group lines.

/// Normalize wiki-style tokenization artifacts in a line of text.
///
/// Collapses the `" @-@ "` hyphen placeholder and re-attaches `'s`
/// possessives.
pub fn normalize_wiki_text(text: &str) -> String {
    text.replace(" @-@ ", "-").replace(" 's", "'s")
}

/// A titled group of document paragraphs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentGroup {
    /// The heading this group was collected under.
    pub title: String,

    /// Normalized paragraph texts.
    pub documents: Vec<String>,
}

impl DocumentGroup {
    /// Join the group's paragraphs into one document text.
    pub fn joined(&self) -> String {
        self.documents.join(" ")
    }
}

/// Parse a wiki-style heading line: `N` equals signs, a space-padded
/// title, and the same `N` equals signs again.
pub fn parse_heading(line: &str) -> Option<String> {
    let trimmed = line.trim();
    let depth = trimmed.chars().take_while(|&c| c == '=').count();

    if depth == 0 || trimmed.len() < 2 * depth + 2 {
        return None;
    }
    if !trimmed.ends_with(&"=".repeat(depth)) {
        return None;
    }

    let inner = &trimmed[depth..trimmed.len() - depth];
    if !inner.starts_with(' ') || !inner.ends_with(' ') {
        return None;
    }

    let title = inner.trim();
    if title.is_empty() || title.contains('=') {
        return None;
    }

    Some(normalize_wiki_text(title))
}

/// Group lines into titled documents.
///
/// Heading lines start a new group; non-blank lines are normalized and
/// collected under the current heading. Content before the first heading
/// is dropped.
pub fn group_titled_lines<I, S>(lines: I) -> Vec<DocumentGroup>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut groups = Vec::new();
    let mut current: Option<DocumentGroup> = None;

    for line in lines {
        let text = line.as_ref().trim();
        if text.is_empty() {
            continue;
        }

        if let Some(title) = parse_heading(text) {
            if let Some(group) = current.take() {
                groups.push(group);
            }
            current = Some(DocumentGroup {
                title,
                documents: Vec::new(),
            });
        } else if let Some(group) = current.as_mut() {
            group.documents.push(normalize_wiki_text(text));
        }
    }

    if let Some(group) = current {
        groups.push(group);
    }

    groups
}
