// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Plain-text export of a single record.

use std::fmt::Write as _;

use time::OffsetDateTime;
use time::macros::format_description;

use crate::{AuthorDirectory, Record, UNKNOWN_AUTHOR, preview};

pub const CONTENT_PREVIEW_CHARS: usize = 100;
const NO_BIOGRAPHY: &str = "No biography available";

pub fn render(
    record: &Record,
    directory: &AuthorDirectory,
    exported_at: OffsetDateTime,
) -> Vec<u8> {
    let mut out = String::new();
    let fields: Vec<(&str, String)> = match record {
        Record::Article(article) => vec![
            ("Title", article.title.clone()),
            ("Content", preview(&article.content, CONTENT_PREVIEW_CHARS)),
        ],
        Record::Author(author) => vec![
            ("Name", author.name.clone()),
            (
                "Biography",
                author
                    .biography
                    .clone()
                    .filter(|bio| !bio.trim().is_empty())
                    .unwrap_or_else(|| NO_BIOGRAPHY.to_owned()),
            ),
        ],
        Record::HistorySection(section) => vec![
            ("Title", section.title.clone()),
            ("Description", section.description.clone()),
            ("Historical Period", section.historical_period.clone()),
        ],
        Record::Work(work) => vec![
            ("Title", work.title.clone()),
            ("Genre", work.genre.clone()),
            ("Author", directory.resolve(&work.author).to_owned()),
        ],
        Record::Literature(literature) => vec![
            (
                "Author",
                literature
                    .author
                    .as_ref()
                    .map(|author| author.name.clone())
                    .filter(|name| !name.is_empty())
                    .unwrap_or_else(|| UNKNOWN_AUTHOR.to_owned()),
            ),
            (
                "Work",
                literature
                    .work
                    .as_ref()
                    .map(|work| work.title.clone())
                    .unwrap_or_default(),
            ),
        ],
    };

    let _ = writeln!(out, "{} {}", capitalized(record.kind().label()), record.id());
    for (label, value) in fields {
        let _ = writeln!(out, "{label}: {value}");
    }
    let stamp = exported_at
        .format(format_description!(
            "[year]-[month]-[day] [hour]:[minute]:[second] UTC"
        ))
        .unwrap_or_else(|_| exported_at.unix_timestamp().to_string());
    let _ = writeln!(out);
    let _ = writeln!(out, "Exported {stamp}");
    out.into_bytes()
}

/// Headline reduced to characters safe in a file name, plus `.txt`. Falls
/// back to the kind and id, filtered the same way, when nothing is left.
pub fn file_name(record: &Record) -> String {
    let stem = sanitize(record.headline());
    if !stem.is_empty() {
        return format!("{stem}.txt");
    }
    let label = record.kind().label().replace(' ', "-");
    match sanitize(record.id()) {
        id if id.is_empty() => format!("{label}.txt"),
        id => format!("{label}-{id}.txt"),
    }
}

fn sanitize(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .map(|ch| {
            if ch.is_alphanumeric() || matches!(ch, '-' | '_' | '.' | ' ') {
                ch
            } else {
                '_'
            }
        })
        .collect();
    cleaned.trim().trim_matches('.').trim().to_owned()
}

fn capitalized(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::{file_name, render};
    use crate::{
        Article, ArticleId, Author, AuthorDirectory, AuthorId, AuthorRef, Record, Work, WorkId,
    };
    use time::macros::datetime;

    fn text(record: &Record, directory: &AuthorDirectory) -> String {
        let bytes = render(record, directory, datetime!(2026-03-01 09:30:00 UTC));
        String::from_utf8(bytes).expect("export is utf-8")
    }

    #[test]
    fn article_content_is_previewed_with_ellipsis_only_when_cut() {
        let long = Record::Article(Article {
            id: ArticleId::new("1"),
            title: "Rome".to_owned(),
            content: "x".repeat(150),
        });
        let rendered = text(&long, &AuthorDirectory::default());
        assert!(rendered.starts_with("Article 1\nTitle: Rome\n"));
        assert!(rendered.contains(&format!("Content: {}...\n", "x".repeat(100))));
        assert!(rendered.ends_with("Exported 2026-03-01 09:30:00 UTC\n"));

        let short = Record::Article(Article {
            id: ArticleId::new("2"),
            title: "Paris".to_owned(),
            content: "Lutetia".to_owned(),
        });
        assert!(text(&short, &AuthorDirectory::default()).contains("Content: Lutetia\n"));
    }

    #[test]
    fn author_without_biography_gets_placeholder() {
        let record = Record::Author(Author {
            id: AuthorId::new("a1"),
            name: "Dante".to_owned(),
            biography: None,
        });
        assert!(
            text(&record, &AuthorDirectory::default())
                .contains("Biography: No biography available")
        );
    }

    #[test]
    fn work_author_resolves_through_directory() {
        let directory = AuthorDirectory::from_authors(&[Author {
            id: AuthorId::new("a1"),
            name: "Boccaccio".to_owned(),
            biography: None,
        }]);
        let record = Record::Work(Work {
            id: WorkId::new("w1"),
            title: "Decameron".to_owned(),
            genre: "Novella".to_owned(),
            author: AuthorRef {
                id: Some(AuthorId::new("a1")),
                name: None,
            },
        });
        assert!(text(&record, &directory).contains("Author: Boccaccio\n"));
        assert!(
            text(&record, &AuthorDirectory::default()).contains("Author: Unknown Author\n")
        );
    }

    #[test]
    fn file_name_replaces_path_separators() {
        let record = Record::Article(Article {
            id: ArticleId::new("9"),
            title: "Rome/Byzantium: 330?".to_owned(),
            content: String::new(),
        });
        assert_eq!(file_name(&record), "Rome_Byzantium_ 330_.txt");

        let untitled = Record::Article(Article {
            id: ArticleId::new("9"),
            title: "..".to_owned(),
            content: String::new(),
        });
        assert_eq!(file_name(&untitled), "article-9.txt");
    }

    #[test]
    fn untitled_file_name_never_carries_separators_from_the_id() {
        for (id, expected) in [
            ("a/../b", "article-a_.._b.txt"),
            ("x/../../../tmp/evil", "article-x_.._.._.._tmp_evil.txt"),
            ("..", "article.txt"),
        ] {
            let record = Record::Article(Article {
                id: ArticleId::new(id),
                title: String::new(),
                content: String::new(),
            });
            let name = file_name(&record);
            assert_eq!(name, expected, "{id}");
            assert!(!name.contains('/') && !name.contains('\\'), "{name}");
        }
    }
}
