// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use log::{debug, warn};
use scriptorium_api::Client;
use scriptorium_app::{AuthorDirectory, EntityKind, FetchError, Record, RequestId, Theme, export};
use scriptorium_tui::{CatalogRuntime, InternalEvent, ListLoad};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use std::thread;
use time::OffsetDateTime;

pub const STATE_FILE: &str = "state.toml";
const AUTHOR_WARNING: &str = "authors unavailable; names shown as Unknown Author";

#[derive(Debug, Serialize, Deserialize)]
struct PersistedState {
    theme: Theme,
}

/// Reads the persisted theme. A missing file is silent; an unreadable or
/// corrupt one is logged and ignored.
pub fn load_theme(path: &Path) -> Option<Theme> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(error) if error.kind() == ErrorKind::NotFound => return None,
        Err(error) => {
            warn!(
                "event=state_read_failed path={} error={error}",
                path.display()
            );
            return None;
        }
    };
    match toml::from_str::<PersistedState>(&raw) {
        Ok(state) => Some(state.theme),
        Err(error) => {
            warn!(
                "event=state_corrupt path={} error={}",
                path.display(),
                error.message()
            );
            None
        }
    }
}

pub fn save_theme(path: &Path, theme: Theme) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create state directory {}", parent.display()))?;
    }
    let body = toml::to_string(&PersistedState { theme }).context("encode UI state")?;
    fs::write(path, body).with_context(|| format!("write {}", path.display()))
}

fn fetch_list(client: &Client, kind: EntityKind) -> Result<ListLoad, FetchError> {
    if kind == EntityKind::Work {
        let listing = client.list_works_with_authors()?;
        return Ok(ListLoad {
            records: listing.works.into_iter().map(Record::Work).collect(),
            directory: listing.directory,
            warning: listing.author_error.map(|_| AUTHOR_WARNING.to_owned()),
        });
    }
    Ok(ListLoad {
        records: client.list_records(kind)?,
        ..ListLoad::default()
    })
}

/// Catalog access over HTTP, with theme and export files on local disk.
#[derive(Debug, Clone)]
pub struct HttpRuntime {
    client: Client,
    state_path: PathBuf,
    export_dir: PathBuf,
}

impl HttpRuntime {
    pub fn new(client: Client, state_path: PathBuf, export_dir: PathBuf) -> Self {
        Self {
            client,
            state_path,
            export_dir,
        }
    }
}

impl CatalogRuntime for HttpRuntime {
    fn load_list(&mut self, kind: EntityKind) -> Result<ListLoad, FetchError> {
        fetch_list(&self.client, kind)
    }

    fn load_detail(&mut self, kind: EntityKind, id: &str) -> Result<Record, FetchError> {
        self.client.get_record(kind, id)
    }

    fn save_theme(&mut self, theme: Theme) -> Result<()> {
        save_theme(&self.state_path, theme)?;
        debug!(
            "event=theme_saved theme={} path={}",
            theme.as_str(),
            self.state_path.display()
        );
        Ok(())
    }

    fn export(&mut self, record: &Record, directory: &AuthorDirectory) -> Result<PathBuf> {
        fs::create_dir_all(&self.export_dir)
            .with_context(|| format!("create export directory {}", self.export_dir.display()))?;
        let path = self.export_dir.join(export::file_name(record));
        let body = export::render(record, directory, OffsetDateTime::now_utc());
        fs::write(&path, body).with_context(|| format!("write {}", path.display()))?;
        Ok(path)
    }

    fn spawn_list(
        &mut self,
        request: RequestId,
        kind: EntityKind,
        tx: Sender<InternalEvent>,
    ) -> Result<()> {
        let client = self.client.clone();
        thread::Builder::new()
            .name(format!("list-{}", kind.api_path()))
            .spawn(move || {
                let result = fetch_list(&client, kind);
                let _ = tx.send(InternalEvent::ListLoaded {
                    request,
                    kind,
                    result,
                });
            })
            .with_context(|| format!("spawn {kind} list fetch"))?;
        Ok(())
    }

    fn spawn_detail(
        &mut self,
        request: RequestId,
        kind: EntityKind,
        id: &str,
        tx: Sender<InternalEvent>,
    ) -> Result<()> {
        let client = self.client.clone();
        let id = id.to_owned();
        thread::Builder::new()
            .name(format!("detail-{}", kind.api_path()))
            .spawn(move || {
                let result = client.get_record(kind, &id);
                let _ = tx.send(InternalEvent::DetailLoaded {
                    request,
                    kind,
                    result,
                });
            })
            .with_context(|| format!("spawn {kind} detail fetch"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{AUTHOR_WARNING, HttpRuntime, STATE_FILE, load_theme, save_theme};
    use anyhow::Result;
    use scriptorium_api::Client;
    use scriptorium_app::{
        AuthorDirectory, EntityKind, FetchError, Record, RequestId, Theme, UNKNOWN_AUTHOR,
    };
    use scriptorium_testkit::{Catalog, MockApi, MockOptions, temp_state_dir};
    use scriptorium_tui::{CatalogRuntime, InternalEvent};
    use std::sync::mpsc;
    use std::time::Duration;

    fn runtime_for(api: &MockApi, root: &std::path::Path) -> Result<HttpRuntime> {
        let client = Client::new(api.base_url(), Duration::from_secs(2))?;
        Ok(HttpRuntime::new(
            client,
            root.join(STATE_FILE),
            root.join("exports"),
        ))
    }

    #[test]
    fn list_loads_records_for_each_kind() -> Result<()> {
        let catalog = Catalog::sample();
        let api = MockApi::start(catalog.clone())?;
        let (_temp, root) = temp_state_dir()?;
        let mut runtime = runtime_for(&api, &root)?;

        for kind in EntityKind::ALL {
            let load = runtime.load_list(kind)?;
            assert_eq!(load.records.len(), catalog.count(kind), "{kind}");
            assert!(load.warning.is_none());
        }
        Ok(())
    }

    #[test]
    fn work_list_carries_author_directory_or_warning() -> Result<()> {
        let api = MockApi::start(Catalog::sample())?;
        let (_temp, root) = temp_state_dir()?;
        let mut runtime = runtime_for(&api, &root)?;
        let load = runtime.load_list(EntityKind::Work)?;
        assert_eq!(load.directory.len(), 3);

        let failing = MockApi::start_with(
            Catalog::sample(),
            MockOptions {
                failing: vec![EntityKind::Author],
                ..MockOptions::default()
            },
        )?;
        let mut runtime = runtime_for(&failing, &root)?;
        let load = runtime.load_list(EntityKind::Work)?;
        assert_eq!(load.records.len(), 4);
        assert!(load.directory.is_empty());
        assert_eq!(load.warning.as_deref(), Some(AUTHOR_WARNING));
        Ok(())
    }

    #[test]
    fn spawned_fetches_report_back_over_the_channel() -> Result<()> {
        let api = MockApi::start(Catalog::sample())?;
        let (_temp, root) = temp_state_dir()?;
        let mut runtime = runtime_for(&api, &root)?;
        let (tx, rx) = mpsc::channel();

        runtime.spawn_list(RequestId::new(7), EntityKind::Author, tx.clone())?;
        match rx.recv_timeout(Duration::from_secs(5))? {
            InternalEvent::ListLoaded {
                request, result, ..
            } => {
                assert_eq!(request, RequestId::new(7));
                assert_eq!(result?.records.len(), 3);
            }
            other => panic!("unexpected event {other:?}"),
        }

        runtime.spawn_detail(RequestId::new(8), EntityKind::Article, "missing", tx)?;
        match rx.recv_timeout(Duration::from_secs(5))? {
            InternalEvent::DetailLoaded { request, result, .. } => {
                assert_eq!(request, RequestId::new(8));
                assert_eq!(
                    result,
                    Err(FetchError::not_found(EntityKind::Article, "missing"))
                );
            }
            other => panic!("unexpected event {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn theme_state_round_trips_and_tolerates_corruption() -> Result<()> {
        let (_temp, root) = temp_state_dir()?;
        let path = root.join(STATE_FILE);
        assert_eq!(load_theme(&path), None);

        save_theme(&path, Theme::Dark)?;
        assert_eq!(load_theme(&path), Some(Theme::Dark));
        assert_eq!(std::fs::read_to_string(&path)?, "theme = \"dark\"\n");

        std::fs::write(&path, "theme = \"sepia\"\n")?;
        assert_eq!(load_theme(&path), None);
        Ok(())
    }

    #[test]
    fn export_writes_named_text_file() -> Result<()> {
        let api = MockApi::start(Catalog::sample())?;
        let (_temp, root) = temp_state_dir()?;
        let mut runtime = runtime_for(&api, &root)?;

        let record = runtime.load_detail(EntityKind::Work, "w4")?;
        let path = runtime.export(&record, &AuthorDirectory::default())?;
        assert_eq!(path, root.join("exports").join("Anonymous Chronicle.txt"));

        let text = std::fs::read_to_string(&path)?;
        assert!(text.starts_with("Work w4\nTitle: Anonymous Chronicle\n"));
        assert!(text.contains(&format!("Author: {UNKNOWN_AUTHOR}\n")));
        assert!(text.contains("\nExported "));
        assert!(matches!(record, Record::Work(_)));
        Ok(())
    }
}
