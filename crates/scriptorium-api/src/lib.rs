// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, bail};
use log::{debug, warn};
use reqwest::StatusCode;
use reqwest::blocking::Client as HttpClient;
use scriptorium_app::{
    Article, Author, AuthorDirectory, EntityKind, FetchError, HistorySection, Literature, Record,
    Work,
};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::thread;
use std::time::Duration;
use url::Url;

/// An entity served by the catalog API under `/api/{KIND.api_path()}`.
pub trait Resource: DeserializeOwned {
    const KIND: EntityKind;

    fn into_record(self) -> Record;
}

impl Resource for Article {
    const KIND: EntityKind = EntityKind::Article;

    fn into_record(self) -> Record {
        Record::Article(self)
    }
}

impl Resource for Author {
    const KIND: EntityKind = EntityKind::Author;

    fn into_record(self) -> Record {
        Record::Author(self)
    }
}

impl Resource for HistorySection {
    const KIND: EntityKind = EntityKind::HistorySection;

    fn into_record(self) -> Record {
        Record::HistorySection(self)
    }
}

impl Resource for Work {
    const KIND: EntityKind = EntityKind::Work;

    fn into_record(self) -> Record {
        Record::Work(self)
    }
}

impl Resource for Literature {
    const KIND: EntityKind = EntityKind::Literature;

    fn into_record(self) -> Record {
        Record::Literature(self)
    }
}

/// Works plus the author directory needed to name them.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkListing {
    pub works: Vec<Work>,
    pub directory: AuthorDirectory,
    /// Why the directory is empty, when the author fetch failed.
    pub author_error: Option<FetchError>,
}

#[derive(Debug, Clone)]
pub struct Client {
    base: Url,
    base_url: String,
    timeout: Duration,
    http: HttpClient,
}

impl Client {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = base_url.trim().trim_end_matches('/').to_owned();
        if base_url.is_empty() {
            bail!("api.base_url must not be empty");
        }
        let base = Url::parse(&base_url)
            .with_context(|| format!("api.base_url {base_url:?} is not a valid URL"))?;
        if !matches!(base.scheme(), "http" | "https") {
            bail!(
                "api.base_url must use http or https, got {:?} -- e.g. http://localhost:8080",
                base.scheme()
            );
        }
        if timeout.is_zero() {
            bail!("api.timeout must be positive");
        }

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;

        Ok(Self {
            base,
            base_url,
            timeout,
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn list_all<E: Resource>(&self) -> Result<Vec<E>, FetchError> {
        let body = self.get_body(E::KIND, None)?;
        let items: Vec<E> =
            serde_json::from_str(&body).map_err(|error| decode_error(E::KIND, &error))?;
        debug!("event=api_list_ok kind={} count={}", E::KIND, items.len());
        Ok(items)
    }

    /// Fetches one entity. A 404, an empty body, or a JSON `null` all mean
    /// the entity does not exist.
    pub fn get_by_id<E: Resource>(&self, id: &str) -> Result<E, FetchError> {
        let body = self.get_body(E::KIND, Some(id))?;
        if body.trim().is_empty() {
            return Err(FetchError::not_found(E::KIND, id));
        }
        let entity: Option<E> =
            serde_json::from_str(&body).map_err(|error| decode_error(E::KIND, &error))?;
        entity.ok_or_else(|| {
            debug!("event=api_null_body kind={} id={id}", E::KIND);
            FetchError::not_found(E::KIND, id)
        })
    }

    pub fn list_records(&self, kind: EntityKind) -> Result<Vec<Record>, FetchError> {
        match kind {
            EntityKind::Article => self.records::<Article>(),
            EntityKind::Author => self.records::<Author>(),
            EntityKind::HistorySection => self.records::<HistorySection>(),
            EntityKind::Work => self.records::<Work>(),
            EntityKind::Literature => self.records::<Literature>(),
        }
    }

    pub fn get_record(&self, kind: EntityKind, id: &str) -> Result<Record, FetchError> {
        match kind {
            EntityKind::Article => self.get_by_id::<Article>(id).map(Resource::into_record),
            EntityKind::Author => self.get_by_id::<Author>(id).map(Resource::into_record),
            EntityKind::HistorySection => self
                .get_by_id::<HistorySection>(id)
                .map(Resource::into_record),
            EntityKind::Work => self.get_by_id::<Work>(id).map(Resource::into_record),
            EntityKind::Literature => self.get_by_id::<Literature>(id).map(Resource::into_record),
        }
    }

    pub fn list_authors_directory(&self) -> Result<AuthorDirectory, FetchError> {
        let authors = self.list_all::<Author>()?;
        Ok(AuthorDirectory::from_authors(&authors))
    }

    /// Fetches works and authors concurrently. Works are required; a failed
    /// author fetch leaves the directory empty and is reported in
    /// [`WorkListing::author_error`].
    pub fn list_works_with_authors(&self) -> Result<WorkListing, FetchError> {
        let (works, authors) = thread::scope(|scope| {
            let authors = scope.spawn(|| self.list_all::<Author>());
            let works = self.list_all::<Work>();
            let authors = authors
                .join()
                .unwrap_or_else(|_| Err(FetchError::network("author fetch panicked")));
            (works, authors)
        });

        let works = works?;
        Ok(match authors {
            Ok(authors) => WorkListing {
                works,
                directory: AuthorDirectory::from_authors(&authors),
                author_error: None,
            },
            Err(error) => {
                warn!("event=api_author_directory_unavailable error={error}");
                WorkListing {
                    works,
                    directory: AuthorDirectory::default(),
                    author_error: Some(error),
                }
            }
        })
    }

    /// Reachability check used by `--check`. Returns the article count.
    pub fn ping(&self) -> Result<usize> {
        let articles = self
            .list_all::<Article>()
            .with_context(|| format!("catalog API at {} is not usable", self.base_url))?;
        Ok(articles.len())
    }

    fn records<E: Resource>(&self) -> Result<Vec<Record>, FetchError> {
        Ok(self
            .list_all::<E>()?
            .into_iter()
            .map(Resource::into_record)
            .collect())
    }

    fn endpoint(&self, kind: EntityKind, id: Option<&str>) -> Result<Url, FetchError> {
        let mut url = self.base.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|()| {
                FetchError::network(format!("{} cannot be used as a base URL", self.base_url))
            })?;
            segments.pop_if_empty().push("api").push(kind.api_path());
            if let Some(id) = id {
                segments.push(id);
            }
        }
        Ok(url)
    }

    fn get_body(&self, kind: EntityKind, id: Option<&str>) -> Result<String, FetchError> {
        let url = self.endpoint(kind, id)?;
        debug!("event=api_request kind={kind} url={url}");

        let response = self.http.get(url.clone()).send().map_err(|error| {
            let error = connection_error(&self.base_url, &error);
            warn!("event=api_request_failed kind={kind} url={url} error={error}");
            error
        })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND
            && let Some(id) = id
        {
            debug!("event=api_not_found kind={kind} id={id}");
            return Err(FetchError::not_found(kind, id));
        }
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            let error = clean_error_response(status, &body);
            warn!("event=api_request_failed kind={kind} url={url} error={error}");
            return Err(error);
        }

        response.text().map_err(|error| {
            warn!("event=api_body_read_failed kind={kind} url={url} error={error}");
            FetchError::network(format!("read response from {url}: {error}"))
        })
    }
}

fn connection_error(base_url: &str, error: &reqwest::Error) -> FetchError {
    if error.is_timeout() {
        return FetchError::network(format!("request to {base_url} timed out"));
    }
    FetchError::network(format!(
        "cannot reach {base_url} -- is the catalog API running? ({error})"
    ))
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

fn clean_error_response(status: StatusCode, body: &str) -> FetchError {
    if let Ok(parsed) = serde_json::from_str::<ErrorEnvelope>(body)
        && let Some(message) = parsed.error.or(parsed.message)
        && !message.is_empty()
    {
        return FetchError::network(format!("server error ({}): {message}", status.as_u16()));
    }

    let body = body.trim();
    if !body.is_empty() && body.len() < 100 && !body.contains('{') {
        return FetchError::network(format!("server error ({}): {body}", status.as_u16()));
    }

    FetchError::network(format!("server returned {}", status.as_u16()))
}

fn decode_error(kind: EntityKind, error: &serde_json::Error) -> FetchError {
    warn!("event=api_decode_failed kind={kind} error={error}");
    FetchError::Decode {
        kind,
        message: error.to_string(),
    }
}
