//! HTTP transport against a mock Sheets API.

use httpmock::prelude::*;
use serde_json::json;
use sheetbatch_client::SheetsClient;
use sheetbatch_core::address;
use sheetbatch_core::value::Value;
use sheetbatch_engine::{request, DispatchError, Dispatcher, Document, Tab, Transport, View, ViewError, WriteMode};
use sheetbatch_protocol::{Color, TabProperties, CELL_DATA_FIELDS, PROPERTIES_FIELDS};

fn client(server: &MockServer) -> SheetsClient {
    SheetsClient::with_base_url("tok", server.base_url()).unwrap()
}

// ── Dispatch ────────────────────────────────────────────────────────

#[test]
fn test_batch_update_body_and_bearer() {
    let server = MockServer::start();
    let rng = address::parse_rect("A1:B2", 0).unwrap();
    let batch = vec![
        request::set_background_color(&rng, Color::WHITE),
        request::update_cells(&rng, &[vec![Some(Value::from(1))]], Default::default()),
    ];
    let expected: Vec<serde_json::Value> = batch.iter().map(|r| r.to_wire()).collect();

    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/spreadsheets/doc1:batchUpdate")
            .header("authorization", "Bearer tok")
            .json_body(json!({ "requests": expected }));
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({ "spreadsheetId": "doc1", "replies": [{}, {}] }));
    });

    let resp = client(&server).dispatch("doc1", &batch).unwrap();
    mock.assert();
    assert_eq!(resp.spreadsheet_id, "doc1");
    assert_eq!(resp.replies.len(), 2);
}

#[test]
fn test_rejected_request() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/spreadsheets/doc1:batchUpdate");
        then.status(400).body("Invalid requests[0].repeatCell: range out of grid");
    });

    let err = client(&server).dispatch("doc1", &[]).unwrap_err();
    assert_eq!(err, DispatchError::Rejected("Invalid requests[0].repeatCell: range out of grid".into()));
}

#[test]
fn test_server_error_keeps_status() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/spreadsheets/doc1:batchUpdate");
        then.status(503).body("backend unavailable");
    });

    let err = client(&server).dispatch("doc1", &[]).unwrap_err();
    assert_eq!(err, DispatchError::Http(503, "backend unavailable".into()));
}

#[test]
fn test_undecodable_body() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/spreadsheets/doc1:batchUpdate");
        then.status(200).body("<html>not json</html>");
    });

    let err = client(&server).dispatch("doc1", &[]).unwrap_err();
    assert!(matches!(err, DispatchError::Parse(_)), "got {:?}", err);
}

#[test]
fn test_connection_failure_is_network_error() {
    // nothing listens on port 1
    let client = SheetsClient::with_base_url("tok", "http://127.0.0.1:1").unwrap();
    let err = client.fetch_properties("doc1").unwrap_err();
    assert!(matches!(err, DispatchError::Network(_)), "got {:?}", err);
}

// ── Fetch ───────────────────────────────────────────────────────────

#[test]
fn test_fetch_remote_query() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/spreadsheets/doc1")
            .query_param("ranges", "'Q1 Data'!A1:B2")
            .query_param("fields", CELL_DATA_FIELDS)
            .header("authorization", "Bearer tok");
        then.status(200).json_body(json!({ "sheets": [] }));
    });

    let body = client(&server).fetch_remote("doc1", "'Q1 Data'!A1:B2").unwrap();
    mock.assert();
    assert_eq!(body, json!({ "sheets": [] }));
}

#[test]
fn test_fetch_properties_query() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/spreadsheets/doc1").query_param("fields", PROPERTIES_FIELDS);
        then.status(200).json_body(json!({ "properties": { "title": "Budget" } }));
    });

    let body = client(&server).fetch_properties("doc1").unwrap();
    mock.assert();
    assert_eq!(body["properties"]["title"], json!("Budget"));
}

// ── Views over HTTP ─────────────────────────────────────────────────

#[test]
fn test_tab_fetch_write_commit() {
    let server = MockServer::start();
    let fetch = server.mock(|when, then| {
        when.method(GET).path("/spreadsheets/doc1").query_param("ranges", "Sheet1!A1:B3");
        then.status(200).json_body(json!({
            "sheets": [{ "data": [{ "rowData": [
                { "values": [
                    { "effectiveValue": { "stringValue": "name" } },
                    { "effectiveValue": { "stringValue": "qty" } },
                ] },
            ] }] }],
        }));
    });
    let commit = server.mock(|when, then| {
        when.method(POST).path("/spreadsheets/doc1:batchUpdate");
        then.status(200).json_body(json!({ "spreadsheetId": "doc1", "replies": [{}] }));
    });

    let client = client(&server);
    let mut tab = Tab::new(&client, "doc1", TabProperties::new(0, "Sheet1").with_grid(3, 2));
    tab.fetch()
        .unwrap()
        .write_values(vec![vec![Value::from("pear"), Value::from(4)]].into(), WriteMode::Append)
        .unwrap();
    let resp = tab.commit().unwrap();

    fetch.assert();
    commit.assert();
    assert_eq!(resp.replies.len(), 1);
    assert!(tab.requests().is_empty());
    assert_eq!(tab.values()[1][1], Some(Value::from(4)));
}

#[test]
fn test_failed_commit_over_http_keeps_queue() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/spreadsheets/doc1:batchUpdate");
        then.status(500).body("internal");
    });

    let client = client(&server);
    let mut tab = Tab::new(&client, "doc1", TabProperties::new(0, "Sheet1"));
    tab.format_grid().append_rows(10).unwrap();

    let err = tab.commit().unwrap_err();
    assert_eq!(err, ViewError::Dispatch(DispatchError::Http(500, "internal".into())));
    assert_eq!(tab.requests().len(), 1);
}

#[test]
fn test_document_open_over_http() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/spreadsheets/doc1").query_param("fields", PROPERTIES_FIELDS);
        then.status(200).json_body(json!({
            "properties": { "title": "Budget" },
            "sheets": [{ "properties": { "sheetId": 3, "title": "Totals", "index": 0,
                "gridProperties": { "rowCount": 5, "columnCount": 2 } } }],
        }));
    });
    let cells = server.mock(|when, then| {
        when.method(GET).path("/spreadsheets/doc1").query_param("ranges", "Totals!A1:B5");
        then.status(200).json_body(json!({ "sheets": [] }));
    });

    let client = client(&server);
    let doc = Document::open(&client, "doc1").unwrap();
    cells.assert();
    assert_eq!(doc.title(), "Budget");
    assert_eq!(doc.tab_title(), "Totals");
    assert_eq!(doc.range().tab_id(), 3);
    assert_eq!(doc.data_shape(), (0, 0));
}
