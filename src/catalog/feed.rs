//! Atom feed deserialization for catalog query responses.

use serde::Deserialize;
use std::cmp::Ordering;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::catalog::Paper;

#[derive(Debug, Deserialize)]
pub(crate) struct AtomFeed {
    #[serde(rename = "entry", default)]
    pub(crate) entries: Vec<AtomEntry>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AtomEntry {
    pub(crate) id: String,
    #[serde(default)]
    pub(crate) title: String,
    #[serde(default)]
    pub(crate) published: String,
    #[serde(rename = "link", default)]
    pub(crate) links: Vec<AtomLink>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AtomLink {
    #[serde(rename = "@href")]
    pub(crate) href: String,
    #[serde(rename = "@type")]
    pub(crate) content_type: Option<String>,
    #[serde(rename = "@title")]
    pub(crate) title: Option<String>,
}

/// Convert parsed feed entries into pipeline-ready papers, newest first.
pub(crate) fn into_papers(feed: AtomFeed) -> Vec<Paper> {
    let mut papers: Vec<Paper> = feed.entries.into_iter().filter_map(map_entry).collect();
    papers.sort_by(|left, right| match (&left.published, &right.published) {
        (Some(a), Some(b)) => b.cmp(a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => left.id.cmp(&right.id),
    });
    papers
}

fn map_entry(entry: AtomEntry) -> Option<Paper> {
    let title = normalize_title(&entry.title);
    let Some(pdf_url) = resolve_pdf_link(&entry.links) else {
        tracing::warn!(id = %entry.id, title = %title, "Catalog entry has no PDF rendition; dropping");
        return None;
    };
    let published = OffsetDateTime::parse(&entry.published, &Rfc3339).ok();
    Some(Paper {
        id: entry.id,
        title,
        pdf_url,
        published,
    })
}

/// Feed titles wrap across lines; collapse runs of whitespace to single spaces.
fn normalize_title(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// The catalog labels the PDF rendition with `title="pdf"`; the media type is
/// the fallback for entries that omit the label.
fn resolve_pdf_link(links: &[AtomLink]) -> Option<String> {
    links
        .iter()
        .find(|link| link.title.as_deref() == Some("pdf"))
        .or_else(|| {
            links
                .iter()
                .find(|link| link.content_type.as_deref() == Some("application/pdf"))
        })
        .map(|link| link.href.clone())
}
