// src/export.rs
use anyhow::{Context, Result};
use html_escape::encode_text;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::models::AnalysisResult;
use crate::render::{render_report_markdown, report_blocks, report_title, Line, ReportBlock};

pub const REPORT_BASENAME: &str = "youtube-summary-report";
pub const BLOCKS_PER_PAGE: usize = 3;

#[derive(Debug, Clone)]
pub struct ExportedReport {
    pub markdown: PathBuf,
    pub html: PathBuf,
    pub pages: usize,
}

/// Writes `<dir>/youtube-summary-report.{md,html}`. The HTML is A4-paginated for printing.
pub fn export_report(r: &AnalysisResult, dir: &Path, blocks_per_page: usize) -> Result<ExportedReport> {
    let start = std::time::Instant::now();
    fs::create_dir_all(dir).with_context(|| format!("create {:?}", dir))?;

    let markdown = dir.join(format!("{}.md", REPORT_BASENAME));
    fs::write(&markdown, render_report_markdown(r).as_bytes())
        .with_context(|| format!("write {:?}", markdown))?;
    debug!("Wrote {}", markdown.display());

    let blocks = report_blocks(r);
    let pages = paginate_blocks(&blocks, blocks_per_page);
    let html = dir.join(format!("{}.html", REPORT_BASENAME));
    fs::write(&html, render_html(&report_title(r), &pages).as_bytes())
        .with_context(|| format!("write {:?}", html))?;
    debug!("Wrote {}", html.display());

    info!(
        "Report exported - duration={:.2}s, pages={}, directory={}",
        start.elapsed().as_secs_f32(),
        pages.len(),
        dir.display()
    );
    Ok(ExportedReport {
        markdown,
        html,
        pages: pages.len(),
    })
}

/// Groups blocks into pages; there is always at least one page.
pub fn paginate_blocks(blocks: &[ReportBlock], per_page: usize) -> Vec<&[ReportBlock]> {
    if blocks.is_empty() {
        return vec![blocks];
    }
    blocks.chunks(per_page.max(1)).collect()
}

const PRINT_CSS: &str = r#"
@page { size: A4; margin: 14mm; }
body { font-family: sans-serif; color: #222; }
section.page { page-break-after: always; }
section.page:last-child { page-break-after: auto; }
h1 { font-size: 20px; }
h2 { font-size: 16px; border-left: 6px solid #4b7bec; padding-left: 8px; }
h3 { font-size: 14px; margin-bottom: 4px; }
p { white-space: pre-line; line-height: 1.5; }
footer { color: #888; font-size: 11px; text-align: right; }
"#;

fn render_html(title: &str, pages: &[&[ReportBlock]]) -> String {
    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str(&format!("<title>{}</title>\n", encode_text(title)));
    html.push_str(&format!("<style>{}</style>\n</head>\n<body>\n", PRINT_CSS));

    let total = pages.len();
    for (i, page) in pages.iter().enumerate() {
        html.push_str("<section class=\"page\">\n");
        if i == 0 {
            html.push_str(&format!("<h1>{}</h1>\n", encode_text(title)));
        }
        for block in page.iter() {
            push_block(&mut html, block);
        }
        html.push_str(&format!("<footer>Page {} of {}</footer>\n</section>\n", i + 1, total));
    }

    html.push_str("</body>\n</html>\n");
    html
}

fn push_block(html: &mut String, block: &ReportBlock) {
    html.push_str(&format!("<h2>{}</h2>\n", encode_text(&block.heading)));
    let mut in_list = false;
    for line in &block.lines {
        let is_bullet = matches!(line, Line::Bullet(_));
        if in_list && !is_bullet {
            html.push_str("</ul>\n");
            in_list = false;
        }
        match line {
            Line::Bullet(t) => {
                if !in_list {
                    html.push_str("<ul>\n");
                    in_list = true;
                }
                html.push_str(&format!("<li>{}</li>\n", encode_text(t)));
            }
            Line::Text(t) => html.push_str(&format!("<p>{}</p>\n", encode_text(t))),
            Line::Sub(t) => html.push_str(&format!("<h3>{}</h3>\n", encode_text(t))),
        }
    }
    if in_list {
        html.push_str("</ul>\n");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::full_result;

    #[test]
    fn writes_markdown_and_paginated_html() {
        let dir = tempfile::tempdir().unwrap();
        let r = full_result();
        let out = export_report(&r, dir.path(), 2).unwrap();

        let md = fs::read_to_string(&out.markdown).unwrap();
        assert!(md.starts_with("# 🎬 YouTube Sentiment Report"));

        let html = fs::read_to_string(&out.html).unwrap();
        let blocks = report_blocks(&r).len();
        assert_eq!(out.pages, blocks.div_ceil(2));
        assert_eq!(html.matches("<section class=\"page\">").count(), out.pages);
        assert!(html.contains(&format!("Page {} of {}", out.pages, out.pages)));
        assert!(html.contains("Viewer Suggestions &amp; Improvement Ideas"));
    }

    #[test]
    fn empty_report_still_has_one_page() {
        assert_eq!(paginate_blocks(&[], 3).len(), 1);
    }

    #[test]
    fn bullets_are_grouped_into_lists() {
        let block = ReportBlock {
            heading: "H".into(),
            lines: vec![
                Line::Bullet("a".into()),
                Line::Bullet("b<c".into()),
                Line::Text("t".into()),
            ],
        };
        let mut html = String::new();
        push_block(&mut html, &block);
        assert_eq!(
            html,
            "<h2>H</h2>\n<ul>\n<li>a</li>\n<li>b&lt;c</li>\n</ul>\n<p>t</p>\n"
        );
    }
}
