// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow};
use log::{debug, warn};
use scriptorium_app::{
    Article, ArticleId, Author, AuthorId, AuthorRef, AuthorSummary, EntityKind, HistorySection,
    HistorySectionId, Literature, LiteratureId, Work, WorkId, WorkSummary,
};
use serde_json::{Value, json};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tiny_http::{Header, Response, Server};

const CITIES: [&str; 10] = [
    "Rome",
    "Florence",
    "Venice",
    "Ravenna",
    "Siena",
    "Naples",
    "Genoa",
    "Milan",
    "Padua",
    "Bologna",
];

const TOPICS: [&str; 8] = [
    "Ancient history",
    "Medieval guilds",
    "Renaissance banking",
    "Maritime trade",
    "Papal politics",
    "Civic humanism",
    "Byzantine mosaics",
    "University life",
];

const GENRES: [&str; 7] = [
    "Epic", "Novella", "Lyric", "Chronicle", "Treatise", "Comedy", "Dialogue",
];

const PERIODS: [&str; 5] = [
    "Antiquity",
    "Early Middle Ages",
    "High Middle Ages",
    "Renaissance",
    "Baroque",
];

const FIRST_NAMES: [&str; 10] = [
    "Giovanni", "Francesco", "Matteo", "Lucrezia", "Caterina", "Niccolo", "Beatrice", "Lorenzo",
    "Vittoria", "Baldassare",
];
const LAST_NAMES: [&str; 10] = [
    "Villani", "Bruni", "Colonna", "Strozzi", "Sforza", "Alberti", "Ficino", "Guicciardini",
    "Tornabuoni", "Castiglione",
];

const TITLE_NOUNS: [&str; 8] = [
    "Letters",
    "Chronicle",
    "Songs",
    "Lives",
    "Book",
    "Dialogues",
    "Histories",
    "Sonnets",
];

/// Everything the mock API serves.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Catalog {
    pub articles: Vec<Article>,
    pub authors: Vec<Author>,
    pub history_sections: Vec<HistorySection>,
    pub works: Vec<Work>,
    pub literatures: Vec<Literature>,
}

impl Catalog {
    /// Small hand-written catalog used by most tests.
    pub fn sample() -> Self {
        Self {
            articles: vec![
                article("1", "Rome", "Ancient history..."),
                article(
                    "2",
                    "Florence",
                    "Banking houses, wool guilds, and the long shadow of the Medici family over \
                     the city's politics and patronage of the arts throughout the fifteenth century.",
                ),
                article("3", "Venice", "A maritime republic built on lagoon trade."),
            ],
            authors: vec![
                author(
                    "a1",
                    "Dante Alighieri",
                    Some("Florentine poet, exiled in 1302."),
                ),
                author("a2", "Giovanni Boccaccio", Some("Author of the Decameron.")),
                author("a3", "Francesco Petrarca", None),
            ],
            history_sections: vec![
                history_section(
                    "h1",
                    "Late Empire",
                    "Crisis and recovery in the west.",
                    "Antiquity",
                ),
                history_section(
                    "h2",
                    "Communes",
                    "Self-governing cities of northern Italy.",
                    "High Middle Ages",
                ),
            ],
            works: vec![
                work("w1", "Inferno", "Epic", Some("a1")),
                work("w2", "Decameron", "Novella", Some("a2")),
                work("w3", "Canzoniere", "Lyric", Some("a3")),
                work("w4", "Anonymous Chronicle", "Chronicle", Some("a404")),
            ],
            literatures: vec![
                Literature {
                    id: LiteratureId::new("l1"),
                    author: Some(AuthorSummary {
                        id: Some(AuthorId::new("a2")),
                        name: "Giovanni Boccaccio".to_owned(),
                    }),
                    work: Some(WorkSummary {
                        id: Some(WorkId::new("w2")),
                        title: "Decameron".to_owned(),
                        genre: Some("Novella".to_owned()),
                    }),
                },
                Literature {
                    id: LiteratureId::new("l2"),
                    author: None,
                    work: Some(WorkSummary {
                        id: Some(WorkId::new("w4")),
                        title: "Anonymous Chronicle".to_owned(),
                        genre: None,
                    }),
                },
            ],
        }
    }

    pub fn count(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::Article => self.articles.len(),
            EntityKind::Author => self.authors.len(),
            EntityKind::HistorySection => self.history_sections.len(),
            EntityKind::Work => self.works.len(),
            EntityKind::Literature => self.literatures.len(),
        }
    }

    fn list_json(&self, kind: EntityKind) -> Value {
        match kind {
            EntityKind::Article => json!(self.articles),
            EntityKind::Author => json!(self.authors),
            EntityKind::HistorySection => json!(self.history_sections),
            // List payloads carry only the author id.
            EntityKind::Work => Value::Array(
                self.works
                    .iter()
                    .map(|work| {
                        json!({
                            "id": work.id.as_str(),
                            "title": work.title,
                            "genre": work.genre,
                            "authorId": work.author.id.as_ref().map(AuthorId::as_str),
                        })
                    })
                    .collect(),
            ),
            EntityKind::Literature => json!(self.literatures),
        }
    }

    fn detail_json(&self, kind: EntityKind, id: &str) -> Option<Value> {
        match kind {
            EntityKind::Article => self
                .articles
                .iter()
                .find(|item| item.id.as_str() == id)
                .map(|item| json!(item)),
            EntityKind::Author => self
                .authors
                .iter()
                .find(|item| item.id.as_str() == id)
                .map(|item| json!(item)),
            EntityKind::HistorySection => self
                .history_sections
                .iter()
                .find(|item| item.id.as_str() == id)
                .map(|item| json!(item)),
            // Detail payloads embed the author object instead.
            EntityKind::Work => self.works.iter().find(|item| item.id.as_str() == id).map(|work| {
                let author = work.author.id.as_ref().and_then(|author_id| {
                    self.authors
                        .iter()
                        .find(|candidate| &candidate.id == author_id)
                        .map(|found| json!({ "id": found.id.as_str(), "name": found.name }))
                });
                json!({
                    "id": work.id.as_str(),
                    "title": work.title,
                    "genre": work.genre,
                    "author": author,
                })
            }),
            EntityKind::Literature => self
                .literatures
                .iter()
                .find(|item| item.id.as_str() == id)
                .map(|item| json!(item)),
        }
    }
}

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }

    fn bool(&mut self) -> bool {
        (self.next_u64() & 1) == 1
    }
}

/// Seeded generator for larger demo catalogs. Same seed, same catalog.
#[derive(Debug, Clone)]
pub struct CatalogFaker {
    rng: DeterministicRng,
}

impl CatalogFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
        }
    }

    pub fn catalog(&mut self, size: usize) -> Catalog {
        let mut catalog = Catalog::sample();
        let base = catalog.articles.len();
        for index in 0..size {
            let number = base + index + 1;
            let city = self.pick(&CITIES);
            let topic = self.pick(&TOPICS);
            catalog.articles.push(article(
                &number.to_string(),
                &format!("{city}: {topic}"),
                &format!("{topic} in {city}, as recorded by contemporary observers."),
            ));
        }

        let mut names = BTreeSet::new();
        for author in &catalog.authors {
            names.insert(author.name.clone());
        }
        for index in 0..size {
            let name = self.unique_name(&mut names);
            let biography = self
                .rng
                .bool()
                .then(|| format!("Active in {}.", self.pick(&CITIES)));
            catalog.authors.push(author(
                &format!("g{}", index + 1),
                &name,
                biography.as_deref(),
            ));
        }

        for index in 0..size {
            let author_index = self.rng.int_n(catalog.authors.len());
            let author_id = catalog.authors[author_index].id.as_str().to_owned();
            let title = format!("{} of {}", self.pick(&TITLE_NOUNS), self.pick(&CITIES));
            let genre = self.pick(&GENRES);
            catalog.works.push(work(
                &format!("gw{}", index + 1),
                &title,
                genre,
                Some(&author_id),
            ));
        }

        for index in 0..size {
            let period = self.pick(&PERIODS);
            let city = self.pick(&CITIES);
            catalog.history_sections.push(history_section(
                &format!("gh{}", index + 1),
                &format!("{city} in the {period}"),
                &format!("{city} and its neighbours."),
                period,
            ));
        }
        catalog
    }

    fn unique_name(&mut self, taken: &mut BTreeSet<String>) -> String {
        loop {
            let name = format!("{} {}", self.pick(&FIRST_NAMES), self.pick(&LAST_NAMES));
            if taken.insert(name.clone()) {
                return name;
            }
            if taken.len() >= FIRST_NAMES.len() * LAST_NAMES.len() {
                return format!("{name} {}", taken.len());
            }
        }
    }

    fn pick(&mut self, values: &[&'static str]) -> &'static str {
        values[self.rng.int_n(values.len())]
    }
}

pub fn article(id: &str, title: &str, content: &str) -> Article {
    Article {
        id: ArticleId::new(id),
        title: title.to_owned(),
        content: content.to_owned(),
    }
}

pub fn author(id: &str, name: &str, biography: Option<&str>) -> Author {
    Author {
        id: AuthorId::new(id),
        name: name.to_owned(),
        biography: biography.map(str::to_owned),
    }
}

pub fn history_section(id: &str, title: &str, description: &str, period: &str) -> HistorySection {
    HistorySection {
        id: HistorySectionId::new(id),
        title: title.to_owned(),
        description: description.to_owned(),
        historical_period: period.to_owned(),
    }
}

pub fn work(id: &str, title: &str, genre: &str, author_id: Option<&str>) -> Work {
    Work {
        id: WorkId::new(id),
        title: title.to_owned(),
        genre: genre.to_owned(),
        author: AuthorRef {
            id: author_id.map(AuthorId::new),
            name: None,
        },
    }
}

pub fn temp_state_dir() -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let path = dir.path().join("scriptorium");
    Ok((dir, path))
}

/// Fault injection for [`MockApi`].
#[derive(Debug, Clone, Default)]
pub struct MockOptions {
    /// Collections (and their detail routes) that answer 500.
    pub failing: Vec<EntityKind>,
    /// Answer `200 null` for unknown ids instead of 404.
    pub missing_as_null: bool,
    /// Delay before every response.
    pub latency: Option<Duration>,
}

/// Routes one request against the catalog. Returns status and JSON body.
pub fn respond(
    catalog: &Catalog,
    options: &MockOptions,
    method: &str,
    url: &str,
) -> (u16, String) {
    if !method.eq_ignore_ascii_case("GET") {
        return (405, json!({ "error": "method not allowed" }).to_string());
    }
    let path = url.split(['?', '#']).next().unwrap_or_default();
    let segments: Vec<&str> = path
        .trim_matches('/')
        .split('/')
        .filter(|segment| !segment.is_empty())
        .collect();

    let (collection, id) = match segments.as_slice() {
        ["api", collection] => (*collection, None),
        ["api", collection, id] => (*collection, Some(*id)),
        _ => return (404, json!({ "error": "no such route" }).to_string()),
    };
    let Some(kind) = EntityKind::ALL
        .into_iter()
        .find(|kind| kind.api_path() == collection)
    else {
        return (404, json!({ "error": "no such collection" }).to_string());
    };
    if options.failing.contains(&kind) {
        return (
            500,
            json!({ "error": format!("{} backend unavailable", kind.label()) }).to_string(),
        );
    }

    match id {
        None => (200, catalog.list_json(kind).to_string()),
        Some(id) => match catalog.detail_json(kind, id) {
            Some(body) => (200, body.to_string()),
            None if options.missing_as_null => (200, "null".to_owned()),
            None => (404, json!({ "error": "not found" }).to_string()),
        },
    }
}

/// In-process HTTP server that serves a [`Catalog`] under `/api`.
/// Stops when dropped.
pub struct MockApi {
    base_url: String,
    server: Arc<Server>,
    handle: Option<JoinHandle<()>>,
}

impl MockApi {
    pub fn start(catalog: Catalog) -> Result<Self> {
        Self::start_with(catalog, MockOptions::default())
    }

    pub fn start_with(catalog: Catalog, options: MockOptions) -> Result<Self> {
        Self::bind("127.0.0.1:0", catalog, options)
    }

    pub fn bind(addr: &str, catalog: Catalog, options: MockOptions) -> Result<Self> {
        let server =
            Arc::new(Server::http(addr).map_err(|error| anyhow!("start mock api: {error}"))?);
        let base_url = format!("http://{}", server.server_addr());
        let worker = Arc::clone(&server);
        let handle = thread::Builder::new()
            .name("scriptorium-mock-api".to_owned())
            .spawn(move || serve(&worker, &catalog, &options))
            .context("spawn mock api thread")?;

        debug!("event=mock_api_started base_url={base_url}");
        Ok(Self {
            base_url,
            server,
            handle: Some(handle),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Drop for MockApi {
    fn drop(&mut self) {
        self.server.unblock();
        if let Some(handle) = self.handle.take()
            && handle.join().is_err()
        {
            warn!("event=mock_api_thread_panicked");
        }
    }
}

fn serve(server: &Server, catalog: &Catalog, options: &MockOptions) {
    for request in server.incoming_requests() {
        if let Some(latency) = options.latency {
            thread::sleep(latency);
        }
        let method = request.method().to_string();
        let (status, body) = respond(catalog, options, &method, request.url());
        let mut response = Response::from_string(body).with_status_code(status);
        if let Ok(header) = Header::from_bytes("Content-Type", "application/json") {
            response = response.with_header(header);
        }
        if let Err(error) = request.respond(response) {
            warn!("event=mock_api_respond_failed error={error}");
        }
    }
}
