// src/render.rs
use crate::explore::{highlight, ExplorerViews};
use crate::models::{AnalysisResult, Cluster, Comment, Sentiment, Stats};
use crate::summary::{parse_summary, SectionKey};

/// One piece of a report block.
#[derive(Debug, Clone, PartialEq)]
pub enum Line {
    Text(String),
    Bullet(String),
    Sub(String),
}

/// A titled report section; the unit of pagination on export.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportBlock {
    pub heading: String,
    pub lines: Vec<Line>,
}

impl ReportBlock {
    fn new(heading: impl Into<String>) -> Self {
        Self {
            heading: heading.into(),
            lines: Vec::new(),
        }
    }

    fn text(&mut self, s: impl Into<String>) {
        self.lines.push(Line::Text(s.into()));
    }

    fn bullet(&mut self, s: impl Into<String>) {
        self.lines.push(Line::Bullet(s.into()));
    }

    fn sub(&mut self, s: impl Into<String>) {
        self.lines.push(Line::Sub(s.into()));
    }
}

pub fn report_title(r: &AnalysisResult) -> String {
    format!("🎬 YouTube Sentiment Report: {}", r.video_url)
}

pub fn report_blocks(r: &AnalysisResult) -> Vec<ReportBlock> {
    let mut blocks = Vec::new();

    if !r.overview.trim().is_empty() {
        let mut b = ReportBlock::new("🧾 Simple Overview");
        b.text(r.overview.trim());
        blocks.push(b);
    }

    blocks.push(stats_block(&r.stats));

    if let Some(s) = &r.suggestions {
        let mut b = ReportBlock::new("💡 Viewer Suggestions & Improvement Ideas");
        if !s.overview.trim().is_empty() {
            b.text(s.overview.trim());
        }
        if !s.examples.is_empty() {
            b.sub("📌 Sample Viewer Comments");
            for ex in &s.examples {
                b.bullet(ex.as_str());
            }
        }
        blocks.push(b);
    }

    let sections = parse_summary(Some(&r.summary));
    for (key, body) in sections.iter() {
        // Stats already cover the high-level section.
        if key == SectionKey::HighLevel || body.is_empty() {
            continue;
        }
        let mut b = ReportBlock::new(key.title());
        b.text(body);
        blocks.push(b);
    }

    blocks.push(distribution_block(&r.stats));

    if !r.positive_clusters.is_empty() || !r.negative_clusters.is_empty() {
        let mut b = ReportBlock::new("Comment Themes");
        cluster_lines(&mut b, "⭐ Positive Clusters", &r.positive_clusters);
        cluster_lines(&mut b, "⚠️ Negative Clusters", &r.negative_clusters);
        blocks.push(b);
    }

    if !r.themes.is_empty() {
        let mut b = ReportBlock::new("🎯 Key Themes in the Comments");
        for t in &r.themes {
            b.sub(t.name.as_str());
            b.text(t.phrases.join(" · "));
        }
        blocks.push(b);
    }

    if let Some(t) = &r.theme_overview {
        let mut b = ReportBlock::new("🎯 Theme Overview");
        b.text(t.trim());
        blocks.push(b);
    }

    blocks
}

fn stats_block(s: &Stats) -> ReportBlock {
    let mut b = ReportBlock::new("🧠 High-Level Summary");
    b.bullet(format!("Total: {}", s.total));
    b.bullet(format!("Positive: {} ({}%)", s.positive, s.percent_label(s.positive)));
    b.bullet(format!("Negative: {} ({}%)", s.negative, s.percent_label(s.negative)));
    b.bullet(format!("Neutral: {} ({}%)", s.neutral, s.percent_label(s.neutral)));
    if let Some(n) = s.suggestions {
        b.bullet(format!("Suggestions: {}", n));
    }
    b
}

fn distribution_block(s: &Stats) -> ReportBlock {
    let mut b = ReportBlock::new("📊 Sentiment Distribution");
    let max = s.positive.max(s.negative).max(s.neutral);
    for (label, count) in [("Positive", s.positive), ("Negative", s.negative), ("Neutral", s.neutral)] {
        b.text(format!("{:<8} {} {}", label, bar(count, max, 30), count));
    }
    b
}

fn bar(count: u64, max: u64, width: usize) -> String {
    if max == 0 {
        return String::new();
    }
    let filled = ((count as f64 / max as f64) * width as f64).round() as usize;
    "█".repeat(filled.min(width))
}

fn cluster_lines(b: &mut ReportBlock, title: &str, clusters: &[Cluster]) {
    if clusters.is_empty() {
        return;
    }
    b.sub(title);
    for c in clusters {
        b.text(format!("Cluster #{}: {}", c.id, c.summary.trim()));
        for ex in &c.examples {
            b.bullet(ex.as_str());
        }
    }
}

pub fn render_report_markdown(r: &AnalysisResult) -> String {
    let mut md = String::new();
    md.push_str(&format!("# {}\n\n", report_title(r)));
    md.push_str(&format!("_Analyzed {}_\n\n", r.analyzed_at.format("%Y-%m-%d %H:%M UTC")));

    for block in report_blocks(r) {
        md.push_str(&format!("## {}\n", block.heading));
        for line in &block.lines {
            match line {
                Line::Text(t) => md.push_str(&format!("{}\n\n", t)),
                Line::Bullet(t) => md.push_str(&format!("- {}\n", t)),
                Line::Sub(t) => md.push_str(&format!("\n### {}\n", t)),
            }
        }
        md.push('\n');
    }

    md
}

fn sentiment_tag(s: Sentiment) -> &'static str {
    match s {
        Sentiment::Positive => "[+]",
        Sentiment::Negative => "[-]",
        Sentiment::Neutral => "[=]",
    }
}

fn comment_line(c: &Comment) -> String {
    format!("{} {}", sentiment_tag(c.sentiment), c.text)
}

/// Terminal rendering of the explorer views. Matches are wrapped in `**`.
pub fn render_explore_text(views: &ExplorerViews<'_>, search_term: &str) -> String {
    let mut out = String::new();

    out.push_str("🔍 Search Comments\n");
    let term = search_term.trim();
    if term.is_empty() {
        out.push_str("Start typing to search...\n");
    } else if views.search.is_empty() {
        out.push_str("No matches found.\n");
    } else {
        out.push_str(&format!("Found {} matching comments\n", views.search.len()));
        for c in &views.search {
            out.push_str(&format!(
                "{} {}\n",
                sentiment_tag(c.sentiment),
                highlight(&c.text, term, "**", "**")
            ));
        }
    }

    out.push_str("\n⭐ Top Positive\n");
    if views.top_positive.is_empty() {
        out.push_str("No positive comments found.\n");
    }
    for c in &views.top_positive {
        out.push_str(&format!("• {} ({:.2})\n", c.text, c.score));
    }

    out.push_str("\n⚠️ Top Negative\n");
    if views.top_negative.is_empty() {
        out.push_str("No negative comments found.\n");
    }
    for c in &views.top_negative {
        out.push_str(&format!("• {} ({:.2})\n", c.text, c.score));
    }

    let p = &views.page;
    out.push_str(&format!("\n📜 All Comments ({})\n", p.total));
    for c in &p.items {
        out.push_str(&comment_line(c));
        out.push('\n');
    }
    out.push_str(&format!("Page {} of {}\n", p.page, p.total_pages));

    out
}
