// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow};
use std::io::Read;
use std::thread;
use std::time::Duration;
use tiny_http::{Header, Method, Response, Server};
use vendorhub_api::{ApiError, Client};
use vendorhub_app::{
    CapabilityOracle, DocumentUpload, FetchRequest, PasswordChangeForm, Record, ResourceKind,
    Role, ValidationError,
};

fn json_response(body: &str, status: u16) -> Response<std::io::Cursor<Vec<u8>>> {
    Response::from_string(body)
        .with_status_code(status)
        .with_header(
            Header::from_bytes("Content-Type", "application/json")
                .expect("valid content type header"),
        )
}

fn header_value(request: &tiny_http::Request, name: &'static str) -> Option<String> {
    request
        .headers()
        .iter()
        .find(|header| header.field.equiv(name))
        .map(|header| header.value.as_str().to_owned())
}

fn start() -> Result<(Server, String)> {
    let server =
        Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
    let addr = format!("http://{}/api", server.server_addr());
    Ok((server, addr))
}

#[test]
fn unreachable_server_is_a_connection_error() {
    let client = Client::new("http://127.0.0.1:1", Duration::from_millis(50))
        .expect("client should initialize");

    let error = client
        .fetch_menus()
        .expect_err("fetch should fail for unreachable endpoint");
    let api_error = error
        .downcast_ref::<ApiError>()
        .expect("typed api error");
    assert!(matches!(api_error, ApiError::Connection { .. }));
    assert!(error.to_string().contains("[api].base_url"));
}

#[test]
fn login_builds_session_with_permissions() -> Result<()> {
    let (server, addr) = start()?;

    let handle = thread::spawn(move || {
        let mut request = server.recv().expect("request expected");
        assert_eq!(request.method(), &Method::Post);
        assert_eq!(request.url(), "/api/auth/login");
        let mut body = String::new();
        request
            .as_reader()
            .read_to_string(&mut body)
            .expect("read body");
        assert!(body.contains(r#""email":"ops@vendorhub.io""#));

        let reply = r#"{
            "status": true,
            "data": {
                "token": "tok-123",
                "user": {"id": 4, "name": "Ops", "email": "ops@vendorhub.io", "role": "admin"},
                "permissions": [
                    {"resource": "events", "action": "read"},
                    {"resource": "vendors", "action": "*"}
                ]
            }
        }"#;
        request
            .respond(json_response(reply, 200))
            .expect("response should succeed");
    });

    let client = Client::new(&addr, Duration::from_secs(1))?;
    let session = client.login("ops@vendorhub.io", "hunter22")?;
    assert_eq!(session.token, "tok-123");
    assert_eq!(session.user.role, Role::Admin);
    assert!(session.has_permission("events", "read"));
    assert!(session.has_permission("vendors", "delete"));
    assert!(!session.has_permission("payments", "read"));

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn login_rejects_unknown_role() -> Result<()> {
    let (server, addr) = start()?;

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        let reply = r#"{"status":true,"data":{"token":"t","user":{"id":1,"name":"X","role":"janitor"},"permissions":[]}}"#;
        request
            .respond(json_response(reply, 200))
            .expect("response should succeed");
    });

    let client = Client::new(&addr, Duration::from_secs(1))?;
    let error = client
        .login("x@example.com", "password")
        .expect_err("unknown role should fail");
    assert!(format!("{error:#}").contains("decode login response"));

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn list_sends_query_and_bearer_token() -> Result<()> {
    let (server, addr) = start()?;

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        assert_eq!(request.method(), &Method::Get);
        assert_eq!(
            request.url(),
            "/api/events?page=1&limit=10&search=conference"
        );
        assert_eq!(
            header_value(&request, "Authorization").as_deref(),
            Some("Bearer tok-123")
        );

        let rows: Vec<String> = (1..=7)
            .map(|id| {
                format!(
                    r#"{{"id":{id},"title":"Conference {id}","starts_on":"2026-05-0{id}","status":"open"}}"#
                )
            })
            .collect();
        let reply = format!(
            r#"{{"status":true,"data":[{}],"total_data":7,"total_pages":1}}"#,
            rows.join(",")
        );
        request
            .respond(json_response(&reply, 200))
            .expect("response should succeed");
    });

    let mut client = Client::new(&addr, Duration::from_secs(1))?;
    client.set_token(Some("tok-123".to_owned()));
    let page = client.list_records(
        ResourceKind::Events,
        &FetchRequest {
            seq: 1,
            page: 1,
            page_size: 10,
            search: "conference".to_owned(),
        },
    )?;
    assert_eq!(page.items.len(), 7);
    assert_eq!(page.total_pages, Some(1));
    assert_eq!(page.total_items, Some(7));
    assert!(matches!(&page.items[0], Record::Event(event) if event.title == "Conference 1"));

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn rejected_envelope_and_http_errors_are_typed() -> Result<()> {
    let (server, addr) = start()?;

    let handle = thread::spawn(move || {
        let first = server.recv().expect("request expected");
        first
            .respond(json_response(
                r#"{"status":false,"message":"search term too long"}"#,
                200,
            ))
            .expect("response should succeed");

        let second = server.recv().expect("request expected");
        second
            .respond(json_response(
                r#"{"status":false,"message":"token expired"}"#,
                401,
            ))
            .expect("response should succeed");
    });

    let client = Client::new(&addr, Duration::from_secs(1))?;
    let request = FetchRequest {
        seq: 1,
        page: 1,
        page_size: 10,
        search: String::new(),
    };

    let rejected = client
        .list_records(ResourceKind::Vendors, &request)
        .expect_err("status false should fail");
    assert_eq!(
        rejected.downcast_ref::<ApiError>(),
        Some(&ApiError::Rejected("search term too long".to_owned()))
    );

    let unauthorized = client
        .list_records(ResourceKind::Vendors, &request)
        .expect_err("401 should fail");
    let api_error = unauthorized
        .downcast_ref::<ApiError>()
        .expect("typed api error");
    assert!(api_error.is_unauthorized());
    assert_eq!(unauthorized.to_string(), "server error (401): token expired");

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn password_change_posts_current_and_new_password() -> Result<()> {
    let (server, addr) = start()?;

    let handle = thread::spawn(move || {
        let mut request = server.recv().expect("request expected");
        assert_eq!(request.method(), &Method::Post);
        assert_eq!(request.url(), "/api/auth/password");
        assert_eq!(
            header_value(&request, "Authorization").as_deref(),
            Some("Bearer tok-9")
        );
        let mut body = String::new();
        request
            .as_reader()
            .read_to_string(&mut body)
            .expect("read body");
        assert!(body.contains(r#""current_password":"old-secret""#));
        assert!(body.contains(r#""new_password":"new-secret-1""#));
        request
            .respond(json_response(r#"{"status":true}"#, 200))
            .expect("response should succeed");
    });

    let mut client = Client::new(&addr, Duration::from_secs(1))?;
    client.set_token(Some("tok-9".to_owned()));
    client.change_password(&PasswordChangeForm {
        current: "old-secret".to_owned(),
        new_password: "new-secret-1".to_owned(),
        confirmation: "new-secret-1".to_owned(),
    })?;

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn invalid_password_change_never_reaches_the_network() {
    let client = Client::new("http://127.0.0.1:1", Duration::from_millis(50))
        .expect("client should initialize");

    let error = client
        .change_password(&PasswordChangeForm {
            current: "old-secret".to_owned(),
            new_password: "short".to_owned(),
            confirmation: "short".to_owned(),
        })
        .expect_err("short password should fail");
    assert_eq!(
        error.downcast_ref::<ValidationError>(),
        Some(&ValidationError::PasswordTooShort)
    );

    let error = client
        .change_password(&PasswordChangeForm {
            current: "old-secret".to_owned(),
            new_password: "long-enough-1".to_owned(),
            confirmation: "long-enough-2".to_owned(),
        })
        .expect_err("mismatch should fail");
    assert_eq!(
        error.downcast_ref::<ValidationError>(),
        Some(&ValidationError::PasswordMismatch)
    );
}

#[test]
fn menus_and_delete() -> Result<()> {
    let (server, addr) = start()?;

    let handle = thread::spawn(move || {
        let menus = server.recv().expect("request expected");
        assert_eq!(menus.url(), "/api/menus");
        let reply = r#"{"status":true,"data":[
            {"id":1,"name":"dashboard","display_name":"Dashboard","path":"/dashboard","order_index":1},
            {"id":2,"name":"events","path":"/events","parent_id":99,"order_index":2}
        ]}"#;
        menus
            .respond(json_response(reply, 200))
            .expect("response should succeed");

        let delete = server.recv().expect("request expected");
        assert_eq!(delete.method(), &Method::Delete);
        assert_eq!(delete.url(), "/api/submissions/12");
        delete
            .respond(Response::empty(204))
            .expect("response should succeed");
    });

    let client = Client::new(&addr, Duration::from_secs(1))?;
    let menus = client.fetch_menus()?;
    assert_eq!(menus.len(), 2);
    assert_eq!(menus[0].title(), "Dashboard");
    assert_eq!(menus[1].title(), "events");
    assert_eq!(menus[1].parent_id.map(|id| id.get()), Some(99));

    client.delete(ResourceKind::Submissions, 12)?;

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn upload_sends_one_multipart_request() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("pitch.pdf");
    std::fs::write(&path, b"%PDF-1.7 fake")?;

    let (server, addr) = start()?;

    let handle = thread::spawn(move || {
        let mut request = server.recv().expect("request expected");
        assert_eq!(request.method(), &Method::Post);
        assert_eq!(request.url(), "/api/submissions/12/documents");
        let content_type = header_value(&request, "Content-Type").unwrap_or_default();
        assert!(content_type.starts_with("multipart/form-data"));

        let mut body = Vec::new();
        request
            .as_reader()
            .read_to_end(&mut body)
            .expect("read body");
        let body = String::from_utf8_lossy(&body);
        assert!(body.contains(r#"name="title""#));
        assert!(body.contains("Harbor menu"));
        assert!(body.contains(r#"filename="pitch.pdf""#));
        assert!(body.contains("%PDF-1.7 fake"));

        request
            .respond(json_response(r#"{"status":true,"message":"uploaded"}"#, 201))
            .expect("response should succeed");
    });

    let client = Client::new(&addr, Duration::from_secs(1))?;
    let upload = DocumentUpload::inspect(&path, "Harbor menu");
    client.upload_document(ResourceKind::Submissions, 12, &upload)?;

    handle.join().expect("server thread should join");
    Ok(())
}
