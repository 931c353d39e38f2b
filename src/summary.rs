// src/summary.rs
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SectionKey {
    #[serde(rename = "highLevel")]
    HighLevel,
    #[serde(rename = "positives")]
    Positives,
    #[serde(rename = "negatives")]
    Negatives,
    #[serde(rename = "neutral")]
    Neutral,
    #[serde(rename = "suggestions")]
    Suggestions,
}

impl SectionKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SectionKey::HighLevel => "highLevel",
            SectionKey::Positives => "positives",
            SectionKey::Negatives => "negatives",
            SectionKey::Neutral => "neutral",
            SectionKey::Suggestions => "suggestions",
        }
    }

    /// Heading used when a section is rendered into the report.
    pub fn title(&self) -> &'static str {
        match self {
            SectionKey::HighLevel => "🧠 High-Level Summary",
            SectionKey::Positives => "⭐ Positive Themes",
            SectionKey::Negatives => "⚠️ Negative Themes",
            SectionKey::Neutral => "😐 Neutral Observations",
            SectionKey::Suggestions => "💡 Suggestions",
        }
    }
}

impl fmt::Display for SectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Header prefixes the backend writes into `summary`, matched against the trimmed line.
pub const DEFAULT_HEADERS: &[(&str, SectionKey)] = &[
    ("### 🧠", SectionKey::HighLevel),
    ("### ⭐", SectionKey::Positives),
    ("### ⚠️", SectionKey::Negatives),
    ("### 😐", SectionKey::Neutral),
    ("### 💡", SectionKey::Suggestions),
];

/// Sections in order of first appearance.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SummarySections {
    entries: Vec<(SectionKey, String)>,
}

impl SummarySections {
    #[cfg(test)]
    pub fn get(&self, key: SectionKey) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, body)| body.as_str())
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SectionKey, &str)> {
        self.entries.iter().map(|(k, body)| (*k, body.as_str()))
    }

    // Re-assigning a key keeps its first position.
    fn set(&mut self, key: SectionKey, body: String) {
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = body;
        } else {
            self.entries.push((key, body));
        }
    }
}

pub fn parse_summary(text: Option<&str>) -> SummarySections {
    parse_with_headers(text, DEFAULT_HEADERS)
}

/// Single pass: a recognized header commits the running buffer and opens a new section.
pub fn parse_with_headers(text: Option<&str>, headers: &[(&str, SectionKey)]) -> SummarySections {
    let mut sections = SummarySections::default();
    let text = match text {
        Some(t) if !t.is_empty() => t,
        _ => return sections,
    };

    let mut current: Option<SectionKey> = None;
    let mut buffer: Vec<&str> = Vec::new();

    for line in text.split('\n') {
        let trimmed = line.trim();
        match headers.iter().find(|(prefix, _)| trimmed.starts_with(prefix)) {
            Some((_, key)) => {
                commit(current, &mut buffer, &mut sections);
                current = Some(*key);
            }
            None => buffer.push(line),
        }
    }
    commit(current, &mut buffer, &mut sections);

    sections
}

fn commit(current: Option<SectionKey>, buffer: &mut Vec<&str>, sections: &mut SummarySections) {
    if let Some(key) = current {
        sections.set(key, buffer.join("\n").trim().to_string());
    }
    buffer.clear();
}
