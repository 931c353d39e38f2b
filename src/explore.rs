// src/explore.rs
use itertools::Itertools;
use regex::RegexBuilder;
use serde::Serialize;

use crate::models::{Comment, Sentiment};

pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Case-insensitive substring search; a blank term matches nothing.
pub fn search<'a>(comments: &'a [Comment], term: &str) -> Vec<&'a Comment> {
    let t = term.trim().to_lowercase();
    if t.is_empty() {
        return Vec::new();
    }
    comments
        .iter()
        .filter(|c| c.text.to_lowercase().contains(&t))
        .collect()
}

/// Highest-scoring positive comments first.
pub fn top_positive(comments: &[Comment], n: Option<usize>) -> Vec<&Comment> {
    top_by(comments, Sentiment::Positive, n, |a, b| b.score.total_cmp(&a.score))
}

/// Most negative (lowest score) first.
pub fn top_negative(comments: &[Comment], n: Option<usize>) -> Vec<&Comment> {
    top_by(comments, Sentiment::Negative, n, |a, b| a.score.total_cmp(&b.score))
}

fn top_by<F>(comments: &[Comment], sentiment: Sentiment, n: Option<usize>, cmp: F) -> Vec<&Comment>
where
    F: FnMut(&&Comment, &&Comment) -> std::cmp::Ordering,
{
    let n = n.unwrap_or(0);
    if n == 0 {
        return Vec::new();
    }
    comments
        .iter()
        .filter(|c| c.sentiment == sentiment)
        .sorted_by(cmp)
        .take(n)
        .collect()
}

/// Parses a "top N" control. Blank, non-numeric, NaN and infinite input mean "no selection";
/// any other number is clamped to at least 1 and fractions truncate.
pub fn parse_top_n(input: &str) -> Option<usize> {
    let raw = input.trim();
    if raw.is_empty() {
        return None;
    }
    let v: f64 = raw.parse().ok()?;
    if !v.is_finite() {
        return None;
    }
    Some(v.max(1.0).trunc() as usize)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<'a> {
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
    pub total: usize,
    pub items: Vec<&'a Comment>,
}

pub fn page_count(total: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(page_size)
}

/// 1-indexed window `[(page-1)*size, page*size)`; out-of-range pages are empty.
pub fn paginate(comments: &[Comment], page: usize, page_size: usize) -> Page<'_> {
    let total = comments.len();
    let total_pages = page_count(total, page_size);
    let items = if page == 0 || page_size == 0 {
        Vec::new()
    } else {
        let start = (page - 1).saturating_mul(page_size).min(total);
        let end = start.saturating_add(page_size).min(total);
        comments[start..end].iter().collect()
    };
    Page {
        page,
        page_size,
        total_pages,
        total,
        items,
    }
}

/// Wraps each case-insensitive occurrence of `term` in `open`/`close`.
pub fn highlight(text: &str, term: &str, open: &str, close: &str) -> String {
    let term = term.trim();
    if term.is_empty() {
        return text.to_string();
    }
    let re = match RegexBuilder::new(&regex::escape(term))
        .case_insensitive(true)
        .build()
    {
        Ok(re) => re,
        Err(_) => return text.to_string(),
    };
    re.replace_all(text, |caps: &regex::Captures| format!("{}{}{}", open, &caps[0], close))
        .into_owned()
}

/// The explorer's controls.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExplorerInputs {
    pub search_term: String,
    pub top_positive: Option<usize>,
    pub top_negative: Option<usize>,
    pub page: usize,
    pub page_size: usize,
}

impl ExplorerInputs {
    pub fn new() -> Self {
        Self {
            search_term: String::new(),
            top_positive: None,
            top_negative: None,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExplorerViews<'a> {
    pub search: Vec<&'a Comment>,
    pub top_positive: Vec<&'a Comment>,
    pub top_negative: Vec<&'a Comment>,
    pub page: Page<'a>,
}

impl<'a> ExplorerViews<'a> {
    pub fn compute(comments: &'a [Comment], inputs: &ExplorerInputs) -> Self {
        Self {
            search: search(comments, &inputs.search_term),
            top_positive: top_positive(comments, inputs.top_positive),
            top_negative: top_negative(comments, inputs.top_negative),
            page: paginate(comments, inputs.page, inputs.page_size),
        }
    }
}
