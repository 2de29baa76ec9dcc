// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::fmt::Debug;

use crate::{Article, Author, AuthorDirectory, HistorySection, Literature, Record, Work};

/// An entity that can be matched against a free-text query.
///
/// `Context` carries whatever a field needs beyond the entity itself; works
/// resolve their author name through an [`AuthorDirectory`], everything else
/// uses `()`.
pub trait Searchable {
    type Context: Default + Debug;

    /// Searchable fields in display order. `None` marks an absent optional
    /// field, which never matches.
    fn search_fields<'a>(&'a self, context: &'a Self::Context) -> Vec<Option<&'a str>>;
}

pub fn matches<E: Searchable>(entity: &E, query: &str, context: &E::Context) -> bool {
    matches_normalized(entity, &query.to_lowercase(), context)
}

fn matches_normalized<E: Searchable>(entity: &E, needle: &str, context: &E::Context) -> bool {
    if needle.is_empty() {
        return true;
    }
    entity
        .search_fields(context)
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(needle))
}

/// Indices of matching items, in their original order.
pub fn filter_indices<E: Searchable>(items: &[E], query: &str, context: &E::Context) -> Vec<usize> {
    let needle = query.to_lowercase();
    items
        .iter()
        .enumerate()
        .filter(|(_, item)| matches_normalized(*item, &needle, context))
        .map(|(index, _)| index)
        .collect()
}

impl Searchable for Article {
    type Context = ();

    fn search_fields<'a>(&'a self, _context: &'a ()) -> Vec<Option<&'a str>> {
        vec![Some(self.title.as_str()), Some(self.content.as_str())]
    }
}

impl Searchable for Author {
    type Context = ();

    fn search_fields<'a>(&'a self, _context: &'a ()) -> Vec<Option<&'a str>> {
        vec![Some(self.name.as_str()), self.biography.as_deref()]
    }
}

impl Searchable for HistorySection {
    type Context = ();

    fn search_fields<'a>(&'a self, _context: &'a ()) -> Vec<Option<&'a str>> {
        vec![
            Some(self.title.as_str()),
            Some(self.description.as_str()),
            Some(self.historical_period.as_str()),
        ]
    }
}

impl Searchable for Work {
    type Context = AuthorDirectory;

    fn search_fields<'a>(&'a self, context: &'a AuthorDirectory) -> Vec<Option<&'a str>> {
        vec![
            Some(self.title.as_str()),
            Some(self.genre.as_str()),
            Some(context.resolve(&self.author)),
        ]
    }
}

impl Searchable for Literature {
    type Context = ();

    fn search_fields<'a>(&'a self, _context: &'a ()) -> Vec<Option<&'a str>> {
        vec![
            self.author.as_ref().map(|author| author.name.as_str()),
            self.work.as_ref().map(|work| work.title.as_str()),
            self.work.as_ref().and_then(|work| work.genre.as_deref()),
        ]
    }
}

impl Searchable for Record {
    type Context = AuthorDirectory;

    fn search_fields<'a>(&'a self, context: &'a AuthorDirectory) -> Vec<Option<&'a str>> {
        match self {
            Self::Article(article) => article.search_fields(&()),
            Self::Author(author) => author.search_fields(&()),
            Self::HistorySection(section) => section.search_fields(&()),
            Self::Work(work) => work.search_fields(context),
            Self::Literature(literature) => literature.search_fields(&()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Searchable, filter_indices, matches};
    use crate::{
        Article, ArticleId, Author, AuthorDirectory, AuthorId, AuthorRef, HistorySection,
        HistorySectionId, Literature, LiteratureId, Work, WorkId, WorkSummary,
    };

    fn article(id: &str, title: &str, content: &str) -> Article {
        Article {
            id: ArticleId::new(id),
            title: title.to_owned(),
            content: content.to_owned(),
        }
    }

    fn work(id: &str, title: &str, genre: &str, author_id: &str) -> Work {
        Work {
            id: WorkId::new(id),
            title: title.to_owned(),
            genre: genre.to_owned(),
            author: AuthorRef {
                id: Some(AuthorId::new(author_id)),
                name: None,
            },
        }
    }

    fn articles() -> Vec<Article> {
        vec![
            article("1", "Rome", "Ancient history..."),
            article("2", "Florence", "Renaissance banking"),
            article("3", "Romanticism", "Poetry of the 1800s"),
            article("4", "Venice", "Maritime republic; rivals of Rome"),
        ]
    }

    #[test]
    fn empty_query_matches_everything() {
        for item in articles() {
            assert!(matches(&item, "", &()));
        }
        let bare = Author {
            id: AuthorId::new("a"),
            name: String::new(),
            biography: None,
        };
        assert!(matches(&bare, "", &()));
    }

    #[test]
    fn query_is_case_insensitive_substring_of_any_field() {
        let rome = article("1", "Rome", "Ancient history...");
        assert!(matches(&rome, "rome", &()));
        assert!(matches(&rome, "ROME", &()));
        assert!(matches(&rome, "ent hist", &()));
        assert!(!matches(&rome, "xyz", &()));
    }

    #[test]
    fn absent_biography_is_skipped_without_failing() {
        let author = Author {
            id: AuthorId::new("a1"),
            name: "Dante".to_owned(),
            biography: None,
        };
        assert!(matches(&author, "dan", &()));
        assert!(!matches(&author, "florentine poet", &()));

        let with_bio = Author {
            biography: Some("Florentine poet".to_owned()),
            ..author
        };
        assert!(matches(&with_bio, "florentine poet", &()));
    }

    #[test]
    fn history_sections_match_on_period() {
        let section = HistorySection {
            id: HistorySectionId::new("h1"),
            title: "Late Empire".to_owned(),
            description: "Crisis and recovery".to_owned(),
            historical_period: "Antiquity".to_owned(),
        };
        assert!(matches(&section, "antiq", &()));
        assert!(!matches(&section, "baroque", &()));
    }

    #[test]
    fn works_match_on_resolved_author_name() {
        let directory = AuthorDirectory::from_authors(&[Author {
            id: AuthorId::new("a1"),
            name: "Dante Alighieri".to_owned(),
            biography: None,
        }]);
        let known = work("w1", "Inferno", "Epic", "a1");
        let orphan = work("w2", "Canzoniere", "Lyric", "a404");

        assert!(matches(&known, "alighieri", &directory));
        assert!(!matches(&orphan, "alighieri", &directory));
        assert!(matches(&orphan, "unknown author", &directory));
        assert_eq!(
            orphan.search_fields(&directory)[2],
            Some("Unknown Author")
        );
    }

    #[test]
    fn literature_skips_missing_cross_references() {
        let literature = Literature {
            id: LiteratureId::new("l1"),
            author: None,
            work: Some(WorkSummary {
                id: None,
                title: "Decameron".to_owned(),
                genre: None,
            }),
        };
        assert!(matches(&literature, "decam", &()));
        assert!(!matches(&literature, "boccaccio", &()));
    }

    #[test]
    fn filtering_preserves_relative_order() {
        let items = articles();
        let indices = filter_indices(&items, "rom", &());
        assert_eq!(indices, vec![0, 2, 3]);
    }

    #[test]
    fn filtering_is_idempotent() {
        let items = articles();
        let once: Vec<Article> = filter_indices(&items, "rom", &())
            .into_iter()
            .map(|index| items[index].clone())
            .collect();
        let twice: Vec<Article> = filter_indices(&once, "rom", &())
            .into_iter()
            .map(|index| once[index].clone())
            .collect();
        assert_eq!(once, twice);
    }
}
