// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::ids::*;

pub const UNKNOWN_AUTHOR: &str = "Unknown Author";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Article,
    Author,
    HistorySection,
    Work,
    Literature,
}

impl EntityKind {
    pub const ALL: [Self; 5] = [
        Self::Article,
        Self::Author,
        Self::HistorySection,
        Self::Work,
        Self::Literature,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Article => "article",
            Self::Author => "author",
            Self::HistorySection => "history section",
            Self::Work => "work",
            Self::Literature => "literature",
        }
    }

    pub const fn title(self) -> &'static str {
        match self {
            Self::Article => "Articles",
            Self::Author => "Authors",
            Self::HistorySection => "History Sections",
            Self::Work => "Works",
            Self::Literature => "Literatures",
        }
    }

    /// Collection segment under `/api`.
    pub const fn api_path(self) -> &'static str {
        match self {
            Self::Article => "articles",
            Self::Author => "authors",
            Self::HistorySection => "history-sections",
            Self::Work => "works",
            Self::Literature => "literatures",
        }
    }

    pub const fn list_route(self) -> &'static str {
        match self {
            Self::Article => "/articles",
            Self::Author => "/authors",
            Self::HistorySection => "/history-sections",
            Self::Work => "/works",
            Self::Literature => "/literatures",
        }
    }

    pub const fn detail_route_prefix(self) -> &'static str {
        match self {
            Self::Article => "/article-details",
            Self::Author => "/author-details",
            Self::HistorySection => "/history-sections",
            Self::Work => "/work-details",
            Self::Literature => "/literature",
        }
    }

    pub const fn empty_message(self) -> &'static str {
        match self {
            Self::Article => "No articles found",
            Self::Author => "No authors found",
            Self::HistorySection => "No history sections found",
            Self::Work => "No works found",
            Self::Literature => "No literatures found",
        }
    }

    pub const fn list_failure_message(self) -> &'static str {
        match self {
            Self::Article => "Failed to fetch articles",
            Self::Author => "Failed to fetch authors",
            Self::HistorySection => "Failed to fetch history sections",
            Self::Work => "Failed to fetch works",
            Self::Literature => "Failed to fetch literatures",
        }
    }

    pub const fn detail_failure_message(self) -> &'static str {
        match self {
            Self::Article => "Failed to fetch article details.",
            Self::Author => "Failed to fetch author details.",
            Self::HistorySection => "Failed to fetch history section details.",
            Self::Work => "Failed to fetch work details.",
            Self::Literature => "Failed to fetch literature details.",
        }
    }

    pub const fn not_found_message(self) -> &'static str {
        match self {
            Self::Article => "Article not found",
            Self::Author => "Author not found",
            Self::HistorySection => "History section not found",
            Self::Work => "Work not found",
            Self::Literature => "Literature not found",
        }
    }

    pub const fn search_hint(self) -> &'static str {
        match self {
            Self::Article => "Search articles by title or content...",
            Self::Author => "Search authors by name or biography...",
            Self::HistorySection => {
                "Search history sections by title, description, or historical period..."
            }
            Self::Work => "Search works by title, genre, or author...",
            Self::Literature => "Search literatures by author, work, or genre...",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub id: ArticleId,
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: AuthorId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub biography: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistorySection {
    pub id: HistorySectionId,
    pub title: String,
    pub description: String,
    pub historical_period: String,
}

/// Author as referenced from a work. List payloads carry only `authorId`;
/// detail payloads embed `author: { id, name }`. Both land here.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AuthorRef {
    pub id: Option<AuthorId>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "WorkWire", into = "WorkWire")]
pub struct Work {
    pub id: WorkId,
    pub title: String,
    pub genre: String,
    pub author: AuthorRef,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WorkWire {
    id: WorkId,
    title: String,
    genre: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    author_id: Option<AuthorId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    author: Option<AuthorSummary>,
}

impl From<WorkWire> for Work {
    fn from(wire: WorkWire) -> Self {
        let embedded_id = wire.author.as_ref().and_then(|author| author.id.clone());
        let name = wire
            .author
            .map(|author| author.name)
            .filter(|name| !name.trim().is_empty());
        Self {
            id: wire.id,
            title: wire.title,
            genre: wire.genre,
            author: AuthorRef {
                id: wire.author_id.or(embedded_id),
                name,
            },
        }
    }
}

impl From<Work> for WorkWire {
    fn from(work: Work) -> Self {
        let author = work.author.name.map(|name| AuthorSummary {
            id: work.author.id.clone(),
            name,
        });
        Self {
            id: work.id,
            title: work.title,
            genre: work.genre,
            author_id: work.author.id,
            author,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorSummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<AuthorId>,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkSummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<WorkId>,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Literature {
    pub id: LiteratureId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<AuthorSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work: Option<WorkSummary>,
}

/// Author id to display name, built from an already-loaded author list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AuthorDirectory {
    names: HashMap<AuthorId, String>,
}

impl AuthorDirectory {
    pub fn from_authors(authors: &[Author]) -> Self {
        Self {
            names: authors
                .iter()
                .map(|author| (author.id.clone(), author.name.clone()))
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn name_for(&self, id: &AuthorId) -> Option<&str> {
        self.names.get(id).map(String::as_str)
    }

    /// Directory lookup first, then the embedded name, then [`UNKNOWN_AUTHOR`].
    pub fn resolve<'a>(&'a self, author: &'a AuthorRef) -> &'a str {
        author
            .id
            .as_ref()
            .and_then(|id| self.name_for(id))
            .or(author.name.as_deref())
            .unwrap_or(UNKNOWN_AUTHOR)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    Article(Article),
    Author(Author),
    HistorySection(HistorySection),
    Work(Work),
    Literature(Literature),
}

impl Record {
    pub const fn kind(&self) -> EntityKind {
        match self {
            Self::Article(_) => EntityKind::Article,
            Self::Author(_) => EntityKind::Author,
            Self::HistorySection(_) => EntityKind::HistorySection,
            Self::Work(_) => EntityKind::Work,
            Self::Literature(_) => EntityKind::Literature,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Self::Article(article) => article.id.as_str(),
            Self::Author(author) => author.id.as_str(),
            Self::HistorySection(section) => section.id.as_str(),
            Self::Work(work) => work.id.as_str(),
            Self::Literature(literature) => literature.id.as_str(),
        }
    }

    pub fn headline(&self) -> &str {
        match self {
            Self::Article(article) => &article.title,
            Self::Author(author) => &author.name,
            Self::HistorySection(section) => &section.title,
            Self::Work(work) => &work.title,
            Self::Literature(literature) => literature
                .work
                .as_ref()
                .map(|work| work.title.as_str())
                .filter(|title| !title.is_empty())
                .or_else(|| {
                    literature
                        .author
                        .as_ref()
                        .map(|author| author.name.as_str())
                })
                .unwrap_or_else(|| literature.id.as_str()),
        }
    }
}

/// Truncates to `max_chars` characters, appending `...` only when cut.
pub fn preview(text: &str, max_chars: usize) -> String {
    let mut chars = text.char_indices();
    match chars.nth(max_chars) {
        Some((byte_index, _)) => format!("{}...", &text[..byte_index]),
        None => text.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::{
        Author, AuthorDirectory, AuthorRef, Literature, Record, UNKNOWN_AUTHOR, Work, preview,
    };
    use crate::{AuthorId, EntityKind};

    #[test]
    fn work_list_shape_decodes_author_id() {
        let work: Work = serde_json::from_str(
            r#"{"id":"w1","title":"Inferno","genre":"Epic","authorId":"a1"}"#,
        )
        .expect("list shape should decode");
        assert_eq!(work.author.id, Some(AuthorId::new("a1")));
        assert_eq!(work.author.name, None);
    }

    #[test]
    fn work_detail_shape_decodes_embedded_author() {
        let work: Work = serde_json::from_str(
            r#"{"id":"w1","title":"Inferno","genre":"Epic","author":{"id":"a1","name":"Dante"}}"#,
        )
        .expect("detail shape should decode");
        assert_eq!(work.author.id, Some(AuthorId::new("a1")));
        assert_eq!(work.author.name.as_deref(), Some("Dante"));
    }

    #[test]
    fn directory_resolution_prefers_loaded_authors_then_embedded_then_placeholder() {
        let directory = AuthorDirectory::from_authors(&[Author {
            id: AuthorId::new("a1"),
            name: "Dante Alighieri".to_owned(),
            biography: None,
        }]);

        let known = AuthorRef {
            id: Some(AuthorId::new("a1")),
            name: Some("Dante".to_owned()),
        };
        assert_eq!(directory.resolve(&known), "Dante Alighieri");

        let embedded = AuthorRef {
            id: Some(AuthorId::new("a9")),
            name: Some("Petrarca".to_owned()),
        };
        assert_eq!(directory.resolve(&embedded), "Petrarca");

        let dangling = AuthorRef {
            id: Some(AuthorId::new("a9")),
            name: None,
        };
        assert_eq!(directory.resolve(&dangling), UNKNOWN_AUTHOR);
    }

    #[test]
    fn literature_tolerates_missing_cross_references() {
        let literature: Literature =
            serde_json::from_str(r#"{"id":"l1"}"#).expect("bare literature should decode");
        assert!(literature.author.is_none());
        assert!(literature.work.is_none());
        assert_eq!(Record::Literature(literature).headline(), "l1");
    }

    #[test]
    fn history_section_uses_camel_case_period() {
        let record: super::HistorySection = serde_json::from_str(
            r#"{"id":"h1","title":"Rome","description":"Empire","historicalPeriod":"Antiquity"}"#,
        )
        .expect("history section should decode");
        assert_eq!(record.historical_period, "Antiquity");
    }

    #[test]
    fn preview_only_marks_truncated_text() {
        assert_eq!(preview("short", 100), "short");
        assert_eq!(preview("abcdef", 3), "abc...");
        assert_eq!(preview("àèìòù", 2), "àè...");
    }

    #[test]
    fn kind_messages_match_screen_copy() {
        assert_eq!(EntityKind::Article.empty_message(), "No articles found");
        assert_eq!(EntityKind::Work.not_found_message(), "Work not found");
        assert_eq!(EntityKind::HistorySection.api_path(), "history-sections");
    }
}
