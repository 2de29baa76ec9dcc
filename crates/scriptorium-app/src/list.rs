// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{EntityKind, FetchError, LoadOutcome, RequestId, Searchable, filter_indices};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListPhase {
    Idle,
    Loading,
    Loaded,
    Failed(String),
}

/// A fetched collection plus the join context its filter needs.
#[derive(Debug, Clone, PartialEq)]
pub struct ListPayload<E: Searchable> {
    pub items: Vec<E>,
    pub context: E::Context,
}

impl<E: Searchable> ListPayload<E> {
    pub fn new(items: Vec<E>) -> Self {
        Self {
            items,
            context: E::Context::default(),
        }
    }

    pub fn with_context(items: Vec<E>, context: E::Context) -> Self {
        Self { items, context }
    }
}

/// What a list screen should draw.
#[derive(Debug, PartialEq)]
pub enum ListView<'a, E> {
    Idle,
    Loading,
    Failed(&'a str),
    Empty(&'static str),
    Items(Vec<&'a E>),
}

/// Fetch lifecycle, search query and filtered view for one list screen.
///
/// The filtered view is stored as indices into the full collection and is
/// rebuilt on every query change and every successful load.
#[derive(Debug)]
pub struct ListController<E: Searchable> {
    kind: EntityKind,
    phase: ListPhase,
    pending: Option<RequestId>,
    items: Vec<E>,
    context: E::Context,
    query: String,
    visible: Vec<usize>,
    cursor: usize,
    failure_detail: Option<String>,
}

impl<E: Searchable> ListController<E> {
    pub fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            phase: ListPhase::Idle,
            pending: None,
            items: Vec::new(),
            context: E::Context::default(),
            query: String::new(),
            visible: Vec::new(),
            cursor: 0,
            failure_detail: None,
        }
    }

    pub const fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn phase(&self) -> &ListPhase {
        &self.phase
    }

    pub fn pending_request(&self) -> Option<RequestId> {
        self.pending
    }

    pub fn begin_load(&mut self, request: RequestId) {
        self.phase = ListPhase::Loading;
        self.pending = Some(request);
        self.failure_detail = None;
    }

    pub fn can_retry(&self) -> bool {
        matches!(self.phase, ListPhase::Failed(_))
    }

    /// Re-runs the fetch after a failure. Returns false outside `Failed`.
    pub fn retry(&mut self, request: RequestId) -> bool {
        if !self.can_retry() {
            return false;
        }
        self.begin_load(request);
        true
    }

    pub fn finish_load(
        &mut self,
        request: RequestId,
        result: Result<ListPayload<E>, FetchError>,
    ) -> LoadOutcome {
        if self.pending != Some(request) {
            return LoadOutcome::Stale;
        }
        self.pending = None;

        match result {
            Ok(payload) => {
                self.items = payload.items;
                self.context = payload.context;
                self.phase = ListPhase::Loaded;
                self.refilter();
            }
            Err(error) => {
                self.items.clear();
                self.visible.clear();
                self.cursor = 0;
                self.failure_detail = Some(error.to_string());
                self.phase = ListPhase::Failed(self.kind.list_failure_message().to_owned());
            }
        }
        LoadOutcome::Applied
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_query(&mut self, query: &str) {
        if self.query == query {
            return;
        }
        self.query = query.to_owned();
        self.refilter();
    }

    pub fn items(&self) -> &[E] {
        &self.items
    }

    pub fn context(&self) -> &E::Context {
        &self.context
    }

    /// Underlying error text of the last failure, for diagnostics.
    pub fn failure_detail(&self) -> Option<&str> {
        self.failure_detail.as_deref()
    }

    pub fn filtered(&self) -> impl Iterator<Item = &E> + '_ {
        self.visible.iter().map(|index| &self.items[*index])
    }

    pub fn filtered_len(&self) -> usize {
        self.visible.len()
    }

    pub fn view(&self) -> ListView<'_, E> {
        match &self.phase {
            ListPhase::Idle => ListView::Idle,
            ListPhase::Loading => ListView::Loading,
            ListPhase::Failed(message) => ListView::Failed(message),
            ListPhase::Loaded if self.visible.is_empty() => {
                ListView::Empty(self.kind.empty_message())
            }
            ListPhase::Loaded => ListView::Items(self.filtered().collect()),
        }
    }

    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn selected(&self) -> Option<&E> {
        self.visible
            .get(self.cursor)
            .map(|index| &self.items[*index])
    }

    pub fn select_next(&mut self) {
        if self.cursor + 1 < self.visible.len() {
            self.cursor += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn select_first(&mut self) {
        self.cursor = 0;
    }

    pub fn select_last(&mut self) {
        self.cursor = self.visible.len().saturating_sub(1);
    }

    fn refilter(&mut self) {
        self.visible = filter_indices(&self.items, &self.query, &self.context);
        self.cursor = self.cursor.min(self.visible.len().saturating_sub(1));
    }
}

#[cfg(test)]
mod tests {
    use super::{ListController, ListPayload, ListPhase, ListView};
    use crate::{
        Article, ArticleId, Author, AuthorDirectory, AuthorId, AuthorRef, EntityKind, FetchError,
        LoadOutcome, RequestCounter, Work, WorkId,
    };

    fn article(id: &str, title: &str, content: &str) -> Article {
        Article {
            id: ArticleId::new(id),
            title: title.to_owned(),
            content: content.to_owned(),
        }
    }

    fn loaded_articles(items: Vec<Article>) -> ListController<Article> {
        let mut counter = RequestCounter::default();
        let mut list = ListController::new(EntityKind::Article);
        let request = counter.issue();
        list.begin_load(request);
        assert_eq!(
            list.finish_load(request, Ok(ListPayload::new(items))),
            LoadOutcome::Applied
        );
        list
    }

    #[test]
    fn successful_fetch_walks_idle_loading_loaded() {
        let mut counter = RequestCounter::default();
        let mut list: ListController<Article> = ListController::new(EntityKind::Article);
        assert_eq!(list.phase(), &ListPhase::Idle);

        let request = counter.issue();
        list.begin_load(request);
        assert_eq!(list.phase(), &ListPhase::Loading);
        assert_eq!(list.view(), ListView::Loading);

        list.finish_load(
            request,
            Ok(ListPayload::new(vec![article("1", "Rome", "Ancient history...")])),
        );
        assert_eq!(list.phase(), &ListPhase::Loaded);
        assert_eq!(list.filtered_len(), 1);
    }

    #[test]
    fn transport_failure_walks_idle_loading_failed() {
        let mut counter = RequestCounter::default();
        let mut list: ListController<Article> = ListController::new(EntityKind::Article);
        let request = counter.issue();
        list.begin_load(request);
        list.finish_load(request, Err(FetchError::network("connection refused")));

        assert_eq!(
            list.phase(),
            &ListPhase::Failed("Failed to fetch articles".to_owned())
        );
        assert_eq!(list.view(), ListView::Failed("Failed to fetch articles"));
        assert!(
            list.failure_detail()
                .is_some_and(|detail| detail.contains("connection refused"))
        );
    }

    #[test]
    fn loaded_without_items_renders_empty_message_not_error() {
        let list = loaded_articles(Vec::new());
        assert_eq!(list.view(), ListView::Empty("No articles found"));
    }

    #[test]
    fn query_changes_refilter_synchronously() {
        let mut list = loaded_articles(vec![
            article("1", "Rome", "Ancient history..."),
            article("2", "Paris", "Lutetia"),
        ]);

        list.set_query("rome");
        let titles: Vec<&str> = list.filtered().map(|item| item.title.as_str()).collect();
        assert_eq!(titles, vec!["Rome"]);

        list.set_query("xyz");
        assert_eq!(list.view(), ListView::Empty("No articles found"));

        list.set_query("");
        assert_eq!(list.filtered_len(), 2);
    }

    #[test]
    fn query_set_before_load_applies_to_arriving_items() {
        let mut counter = RequestCounter::default();
        let mut list = ListController::new(EntityKind::Article);
        let request = counter.issue();
        list.begin_load(request);
        list.set_query("par");
        list.finish_load(
            request,
            Ok(ListPayload::new(vec![
                article("1", "Rome", "Ancient"),
                article("2", "Paris", "Lutetia"),
            ])),
        );
        assert_eq!(list.filtered_len(), 1);
        assert_eq!(list.selected().map(|item| item.id.as_str()), Some("2"));
    }

    #[test]
    fn stale_results_are_discarded() {
        let mut counter = RequestCounter::default();
        let mut list: ListController<Article> = ListController::new(EntityKind::Article);
        let first = counter.issue();
        list.begin_load(first);
        let second = counter.issue();
        list.begin_load(second);

        let outcome = list.finish_load(
            first,
            Ok(ListPayload::new(vec![article("1", "Old", "stale")])),
        );
        assert_eq!(outcome, LoadOutcome::Stale);
        assert_eq!(list.phase(), &ListPhase::Loading);

        list.finish_load(second, Ok(ListPayload::new(Vec::new())));
        assert_eq!(list.phase(), &ListPhase::Loaded);
        assert_eq!(
            list.finish_load(second, Ok(ListPayload::new(Vec::new()))),
            LoadOutcome::Stale
        );
    }

    #[test]
    fn retry_only_from_failed() {
        let mut counter = RequestCounter::default();
        let mut list = loaded_articles(Vec::new());
        assert!(!list.can_retry());
        assert!(!list.retry(counter.issue()));

        let request = counter.issue();
        list.begin_load(request);
        list.finish_load(request, Err(FetchError::network("boom")));
        assert!(list.can_retry());
        let retry = counter.issue();
        assert!(list.retry(retry));
        assert_eq!(list.phase(), &ListPhase::Loading);
        assert_eq!(list.pending_request(), Some(retry));
    }

    #[test]
    fn cursor_is_clamped_to_filtered_view() {
        let mut list = loaded_articles(vec![
            article("1", "Rome", "a"),
            article("2", "Romania", "b"),
            article("3", "Paris", "c"),
        ]);
        list.select_last();
        assert_eq!(list.cursor(), 2);

        list.set_query("rom");
        assert_eq!(list.cursor(), 1);
        list.select_next();
        assert_eq!(list.cursor(), 1);
        list.select_prev();
        list.select_prev();
        assert_eq!(list.cursor(), 0);
    }

    #[test]
    fn work_lists_filter_through_author_directory() {
        let mut counter = RequestCounter::default();
        let mut list = ListController::new(EntityKind::Work);
        let request = counter.issue();
        list.begin_load(request);
        let directory = AuthorDirectory::from_authors(&[Author {
            id: AuthorId::new("a1"),
            name: "Boccaccio".to_owned(),
            biography: None,
        }]);
        list.finish_load(
            request,
            Ok(ListPayload::with_context(
                vec![Work {
                    id: WorkId::new("w1"),
                    title: "Decameron".to_owned(),
                    genre: "Novella".to_owned(),
                    author: AuthorRef {
                        id: Some(AuthorId::new("a1")),
                        name: None,
                    },
                }],
                directory,
            )),
        );

        list.set_query("bocc");
        assert_eq!(list.filtered_len(), 1);
        assert_eq!(list.context().len(), 1);
    }
}
