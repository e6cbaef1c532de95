// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use std::sync::mpsc::Sender;
use std::thread;
use time::OffsetDateTime;
use vendorhub_api::Client;
use vendorhub_app::{
    CapabilityOracle, DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_PAGE_SIZE, DocumentUpload, FetchRequest,
    MenuCache, MenuSource, Page, Record, ResolvedMenus, ResourceKind, Session, resolve_menus,
};
use vendorhub_store::Store;
use vendorhub_tui::InternalEvent;

pub struct ApiRuntime<'a> {
    client: Client,
    session: Session,
    store: &'a Store,
    menus: MenuCache,
    page_size: u32,
    max_upload_bytes: u64,
}

impl<'a> ApiRuntime<'a> {
    pub fn new(client: Client, session: Session, store: &'a Store, menus: MenuCache) -> Self {
        Self {
            client,
            session,
            store,
            menus,
            page_size: DEFAULT_PAGE_SIZE,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    pub fn with_limits(mut self, page_size: u32, max_upload_bytes: u64) -> Self {
        self.page_size = page_size.max(1);
        self.max_upload_bytes = max_upload_bytes;
        self
    }
}

impl vendorhub_tui::AppRuntime for ApiRuntime<'_> {
    fn oracle(&self) -> &dyn CapabilityOracle {
        &self.session
    }

    /// Server menus are cached per user until the TTL runs out. A fallback
    /// tree is never cached so the next load tries the server again.
    fn load_menus(&mut self) -> ResolvedMenus {
        let now = OffsetDateTime::now_utc();
        let user = &self.session.user;
        if let Some(cached) = self.menus.get(user.id, now) {
            tracing::debug!(user_id = %user.id, "menu cache hit");
            return cached.clone();
        }

        let resolved = resolve_menus(user.role, self.client.fetch_menus());
        if resolved.source == MenuSource::Server {
            self.menus.store(user.id, resolved.clone(), now);
        }
        resolved
    }

    fn fetch_list(&mut self, view: ResourceKind, request: &FetchRequest) -> Result<Page<Record>> {
        self.client.list_records(view, request)
    }

    fn spawn_list_fetch(
        &mut self,
        view: ResourceKind,
        request: FetchRequest,
        tx: Sender<InternalEvent>,
    ) -> Result<()> {
        let client = self.client.clone();
        thread::Builder::new()
            .name(format!("fetch-{}", view.as_str()))
            .spawn(move || {
                let result = client
                    .list_records(view, &request)
                    .map_err(|error| format!("{error:#}"));
                if tx
                    .send(InternalEvent::ListLoaded {
                        view,
                        seq: request.seq,
                        result,
                    })
                    .is_err()
                {
                    tracing::debug!(seq = request.seq, "ui gone before list response");
                }
            })
            .context("spawn list fetch worker")?;
        Ok(())
    }

    fn delete_record(&mut self, view: ResourceKind, id: i64) -> Result<()> {
        self.client.delete(view, id)
    }

    fn upload_document(
        &mut self,
        view: ResourceKind,
        id: i64,
        upload: &DocumentUpload,
    ) -> Result<()> {
        upload.validate(self.max_upload_bytes)?;
        self.client.upload_document(view, id, upload)
    }

    fn set_sidebar_collapsed(&mut self, collapsed: bool) -> Result<()> {
        self.store.put_sidebar_collapsed(collapsed)
    }

    fn logout(&mut self) -> Result<()> {
        self.menus.invalidate();
        self.client.set_token(None);
        Ok(())
    }

    fn page_size(&self) -> u32 {
        self.page_size
    }

    fn max_upload_bytes(&self) -> u64 {
        self.max_upload_bytes
    }
}

#[cfg(test)]
mod tests {
    use super::ApiRuntime;
    use anyhow::{Result, anyhow};
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;
    use tiny_http::{Header, Response, Server};
    use vendorhub_api::Client;
    use vendorhub_app::{
        DocumentUpload, FetchRequest, MenuCache, MenuSource, ResourceKind, Role,
    };
    use vendorhub_store::Store;
    use vendorhub_testkit::root_session;
    use vendorhub_tui::{AppRuntime, InternalEvent};

    fn unreachable_client() -> Result<Client> {
        Client::new("http://127.0.0.1:1/api", Duration::from_millis(50))
    }

    fn memory_store() -> Result<Store> {
        let store = Store::open_memory()?;
        store.bootstrap()?;
        Ok(store)
    }

    #[test]
    fn server_menus_are_cached_for_the_session() -> Result<()> {
        let server =
            Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
        let base_url = format!("http://{}/api", server.server_addr());
        let handle = thread::spawn(move || {
            let request = server.recv().expect("request expected");
            assert_eq!(request.url(), "/api/menus");
            let body = r#"{"status":true,"data":[{"id":1,"name":"events","path":"/events","order_index":1}]}"#;
            request
                .respond(Response::from_string(body).with_header(
                    Header::from_bytes("Content-Type", "application/json")
                        .expect("valid header"),
                ))
                .expect("response should succeed");
        });

        let store = memory_store()?;
        let client = Client::new(&base_url, Duration::from_secs(1))?;
        let mut runtime = ApiRuntime::new(
            client,
            root_session(Role::Admin),
            &store,
            MenuCache::new(time::Duration::minutes(5)),
        );

        let first = runtime.load_menus();
        handle.join().expect("server thread should join");
        assert_eq!(first.source, MenuSource::Server);

        let second = runtime.load_menus();
        assert_eq!(second, first);

        runtime.logout()?;
        assert!(runtime.menus.is_empty());
        assert_eq!(runtime.client.token(), None);
        Ok(())
    }

    #[test]
    fn fallback_menus_are_not_cached() -> Result<()> {
        let store = memory_store()?;
        let mut runtime = ApiRuntime::new(
            unreachable_client()?,
            root_session(Role::Vendor),
            &store,
            MenuCache::new(time::Duration::minutes(5)),
        );

        let menus = runtime.load_menus();
        assert_eq!(menus.source, MenuSource::Fallback);
        assert!(!menus.nodes.is_empty());
        assert!(runtime.menus.is_empty());
        Ok(())
    }

    #[test]
    fn worker_reports_fetch_failure_with_sequence() -> Result<()> {
        let store = memory_store()?;
        let mut runtime = ApiRuntime::new(
            unreachable_client()?,
            root_session(Role::Admin),
            &store,
            MenuCache::new(time::Duration::minutes(5)),
        );
        let (tx, rx) = mpsc::channel();
        runtime.spawn_list_fetch(
            ResourceKind::Vendors,
            FetchRequest {
                seq: 9,
                page: 1,
                page_size: 10,
                search: String::new(),
            },
            tx,
        )?;

        let event = rx.recv_timeout(Duration::from_secs(5))?;
        let InternalEvent::ListLoaded { view, seq, result } = event else {
            panic!("expected list event");
        };
        assert_eq!(view, ResourceKind::Vendors);
        assert_eq!(seq, 9);
        assert!(result.expect_err("fetch should fail").contains("cannot reach"));
        Ok(())
    }

    #[test]
    fn sidebar_preference_lands_in_the_store() -> Result<()> {
        let store = memory_store()?;
        let mut runtime = ApiRuntime::new(
            unreachable_client()?,
            root_session(Role::Client),
            &store,
            MenuCache::new(time::Duration::minutes(5)),
        );
        runtime.set_sidebar_collapsed(true)?;
        assert_eq!(store.sidebar_collapsed()?, Some(true));
        Ok(())
    }

    #[test]
    fn oversized_upload_is_rejected_before_sending() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("deck.pdf");
        std::fs::write(&path, vec![0_u8; 64])?;

        let store = memory_store()?;
        let mut runtime = ApiRuntime::new(
            unreachable_client()?,
            root_session(Role::Admin),
            &store,
            MenuCache::new(time::Duration::minutes(5)),
        )
        .with_limits(10, 16);

        let error = runtime
            .upload_document(
                ResourceKind::Submissions,
                3,
                &DocumentUpload::inspect(&path, "Deck"),
            )
            .expect_err("oversized upload should fail");
        assert!(error.to_string().contains("limit is 16 bytes"));
        assert_eq!(runtime.page_size(), 10);
        Ok(())
    }
}
