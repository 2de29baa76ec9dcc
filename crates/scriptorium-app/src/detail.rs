// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{EntityKind, FetchError, LoadOutcome, RequestId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailPhase<E> {
    Idle,
    Loading,
    Found(E),
    NotFound,
    Failed(String),
}

#[derive(Debug, PartialEq, Eq)]
pub enum DetailView<'a, E> {
    Idle,
    Loading,
    Found(&'a E),
    NotFound(&'static str),
    Failed(&'a str),
}

/// Fetch lifecycle for a single entity, keyed by the id in the current route.
#[derive(Debug)]
pub struct DetailController<E> {
    kind: EntityKind,
    id: Option<String>,
    pending: Option<RequestId>,
    phase: DetailPhase<E>,
}

impl<E> DetailController<E> {
    pub fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            id: None,
            pending: None,
            phase: DetailPhase::Idle,
        }
    }

    pub const fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn phase(&self) -> &DetailPhase<E> {
        &self.phase
    }

    pub fn pending_request(&self) -> Option<RequestId> {
        self.pending
    }

    /// True when opening `id` would start a fetch: the controller is idle or
    /// points at another id.
    pub fn needs_fetch(&self, id: &str) -> bool {
        self.id.as_deref() != Some(id) || matches!(self.phase, DetailPhase::Idle)
    }

    pub fn can_retry(&self) -> bool {
        matches!(self.phase, DetailPhase::Failed(_)) && self.id.is_some()
    }

    /// Points the controller at `id`. Returns true when a fetch must be issued
    /// under `request`. Reopening the current id leaves state untouched.
    pub fn open(&mut self, id: &str, request: RequestId) -> bool {
        if !self.needs_fetch(id) {
            return false;
        }
        self.id = Some(id.to_owned());
        self.pending = Some(request);
        self.phase = DetailPhase::Loading;
        true
    }

    pub fn retry(&mut self, request: RequestId) -> bool {
        if !self.can_retry() {
            return false;
        }
        self.pending = Some(request);
        self.phase = DetailPhase::Loading;
        true
    }

    pub fn finish(&mut self, request: RequestId, result: Result<E, FetchError>) -> LoadOutcome {
        if self.pending != Some(request) {
            return LoadOutcome::Stale;
        }
        self.pending = None;
        self.phase = match result {
            Ok(entity) => DetailPhase::Found(entity),
            Err(error) if error.is_not_found() => DetailPhase::NotFound,
            Err(_) => DetailPhase::Failed(self.kind.detail_failure_message().to_owned()),
        };
        LoadOutcome::Applied
    }

    pub fn found(&self) -> Option<&E> {
        match &self.phase {
            DetailPhase::Found(entity) => Some(entity),
            _ => None,
        }
    }

    pub fn view(&self) -> DetailView<'_, E> {
        match &self.phase {
            DetailPhase::Idle => DetailView::Idle,
            DetailPhase::Loading => DetailView::Loading,
            DetailPhase::Found(entity) => DetailView::Found(entity),
            DetailPhase::NotFound => DetailView::NotFound(self.kind.not_found_message()),
            DetailPhase::Failed(message) => DetailView::Failed(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{DetailController, DetailPhase, DetailView};
    use crate::{
        AuthorRef, EntityKind, FetchError, LoadOutcome, RequestCounter, Route, Work, WorkId,
    };

    fn work(id: &str) -> Work {
        Work {
            id: WorkId::new(id),
            title: format!("Work {id}"),
            genre: "Epic".to_owned(),
            author: AuthorRef::default(),
        }
    }

    #[test]
    fn found_not_found_and_failed_are_distinct() {
        let mut counter = RequestCounter::default();
        let mut detail: DetailController<Work> = DetailController::new(EntityKind::Work);

        let request = counter.issue();
        assert!(detail.open("A", request));
        assert_eq!(detail.view(), DetailView::Loading);
        detail.finish(request, Ok(work("A")));
        assert_eq!(detail.found().map(|found| found.id.as_str()), Some("A"));

        let request = counter.issue();
        assert!(detail.open("missing", request));
        detail.finish(request, Err(FetchError::not_found(EntityKind::Work, "missing")));
        assert_eq!(detail.view(), DetailView::NotFound("Work not found"));

        let request = counter.issue();
        assert!(detail.open("broken", request));
        detail.finish(request, Err(FetchError::network("503")));
        assert_eq!(
            detail.view(),
            DetailView::Failed("Failed to fetch work details.")
        );
    }

    #[test]
    fn changing_route_id_refetches_without_remount() {
        let mut counter = RequestCounter::default();
        let mut detail: DetailController<Work> = DetailController::new(EntityKind::Work);

        let Some(Route::Detail(_, first_id)) = Route::parse("/work-details/A") else {
            panic!("route should parse");
        };
        let first = counter.issue();
        assert!(detail.open(&first_id, first));
        detail.finish(first, Ok(work("A")));

        let Some(Route::Detail(_, second_id)) = Route::parse("/work-details/B") else {
            panic!("route should parse");
        };
        let second = counter.issue();
        assert!(detail.open(&second_id, second));
        assert_eq!(detail.phase(), &DetailPhase::Loading);
        assert_eq!(detail.id(), Some("B"));

        detail.finish(second, Ok(work("B")));
        assert_eq!(detail.found().map(|found| found.id.as_str()), Some("B"));
    }

    #[test]
    fn reopening_same_id_is_a_noop() {
        let mut counter = RequestCounter::default();
        let mut detail: DetailController<Work> = DetailController::new(EntityKind::Work);
        let request = counter.issue();
        assert!(detail.open("A", request));
        assert!(!detail.needs_fetch("A"));
        assert!(detail.needs_fetch("B"));
        assert!(!detail.open("A", counter.issue()));
        assert_eq!(detail.pending_request(), Some(request));
    }

    #[test]
    fn superseded_fetch_cannot_overwrite_newer_id() {
        let mut counter = RequestCounter::default();
        let mut detail: DetailController<Work> = DetailController::new(EntityKind::Work);
        let first = counter.issue();
        detail.open("A", first);
        let second = counter.issue();
        detail.open("B", second);

        assert_eq!(detail.finish(first, Ok(work("A"))), LoadOutcome::Stale);
        assert_eq!(detail.phase(), &DetailPhase::Loading);
        assert_eq!(detail.finish(second, Ok(work("B"))), LoadOutcome::Applied);
        assert_eq!(detail.found().map(|found| found.id.as_str()), Some("B"));
    }

    #[test]
    fn retry_refetches_same_id_after_failure() {
        let mut counter = RequestCounter::default();
        let mut detail: DetailController<Work> = DetailController::new(EntityKind::Work);
        let request = counter.issue();
        detail.open("A", request);
        assert!(!detail.can_retry());
        assert!(!detail.retry(counter.issue()));

        detail.finish(request, Err(FetchError::network("timeout")));
        assert!(detail.can_retry());
        let retry = counter.issue();
        assert!(detail.retry(retry));
        assert_eq!(detail.id(), Some("A"));
        assert_eq!(detail.pending_request(), Some(retry));
    }
}
