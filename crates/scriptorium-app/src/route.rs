// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::EntityKind;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    List(EntityKind),
    Detail(EntityKind, String),
}

impl Route {
    pub fn detail(kind: EntityKind, id: impl Into<String>) -> Self {
        Self::Detail(kind, id.into())
    }

    /// Parses a client route such as `/works` or `/work-details/42`.
    /// Trailing slashes and a `?query` / `#fragment` suffix are ignored.
    pub fn parse(path: &str) -> Option<Self> {
        let path = path
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .trim()
            .trim_end_matches('/');
        if path.is_empty() {
            return Some(Self::Home);
        }
        let rest = path.strip_prefix('/')?;
        let segments: Vec<&str> = rest.split('/').collect();

        match segments.as_slice() {
            [collection] => EntityKind::ALL
                .into_iter()
                .find(|kind| kind.list_route().trim_start_matches('/') == *collection)
                .map(Self::List),
            [prefix, id] if !id.is_empty() => EntityKind::ALL
                .into_iter()
                .find(|kind| kind.detail_route_prefix().trim_start_matches('/') == *prefix)
                .map(|kind| Self::Detail(kind, (*id).to_owned())),
            _ => None,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Self::Home => "/".to_owned(),
            Self::List(kind) => kind.list_route().to_owned(),
            Self::Detail(kind, id) => format!("{}/{id}", kind.detail_route_prefix()),
        }
    }

    pub fn kind(&self) -> Option<EntityKind> {
        match self {
            Self::Home => None,
            Self::List(kind) | Self::Detail(kind, _) => Some(*kind),
        }
    }

    pub fn title(&self) -> String {
        match self {
            Self::Home => "Home".to_owned(),
            Self::List(kind) => kind.title().to_owned(),
            Self::Detail(kind, id) => format!("{} {id}", kind.title()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Route;
    use crate::EntityKind;

    #[test]
    fn parses_every_route_in_the_surface() {
        let cases = [
            ("/", Route::Home),
            ("/articles", Route::List(EntityKind::Article)),
            ("/authors", Route::List(EntityKind::Author)),
            ("/history-sections", Route::List(EntityKind::HistorySection)),
            ("/works", Route::List(EntityKind::Work)),
            ("/literatures", Route::List(EntityKind::Literature)),
            ("/author-details/7", Route::detail(EntityKind::Author, "7")),
            ("/article-details/a1", Route::detail(EntityKind::Article, "a1")),
            (
                "/history-sections/h3",
                Route::detail(EntityKind::HistorySection, "h3"),
            ),
            ("/work-details/B", Route::detail(EntityKind::Work, "B")),
            ("/literature/l2", Route::detail(EntityKind::Literature, "l2")),
        ];
        for (path, expected) in cases {
            assert_eq!(Route::parse(path), Some(expected.clone()), "path {path}");
            assert_eq!(expected.path(), path);
        }
    }

    #[test]
    fn tolerates_trailing_slash_and_query() {
        assert_eq!(
            Route::parse("/works/?sort=title"),
            Some(Route::List(EntityKind::Work))
        );
        assert_eq!(Route::parse(""), Some(Route::Home));
    }

    #[test]
    fn rejects_unknown_or_malformed_paths() {
        assert_eq!(Route::parse("/nope"), None);
        assert_eq!(Route::parse("works"), None);
        assert_eq!(Route::parse("/work-details/a/b"), None);
        assert_eq!(Route::parse("/article-details//"), None);
    }
}
