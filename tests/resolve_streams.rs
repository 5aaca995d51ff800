//! End-to-end stream resolution against a mock content site.
//!
//! Every test stands up a wiremock server playing the content site: title
//! page, landing pages, player scripts, backend manifests and redirect
//! bodies.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use owlstream::stream::Stage;
use owlstream::{Config, Diagnostic, DiagnosticKind, Diagnostics, StreamResolver};

// ─── Fixtures ────────────────────────────────────────────────────────────────

fn config(server: &MockServer, extra: &str) -> Config {
    Config::from_toml(&format!("base_url = \"{}\"\n{extra}", server.uri())).expect("valid config")
}

fn title_page(badge: &str, body: &str) -> String {
    format!(
        r#"<html><body>
             <div class="type d-flex"><a href="/type/x">{badge}</a></div>
             {body}
           </body></html>"#
    )
}

fn series_page(episode: &str) -> String {
    title_page(
        "TV",
        &format!(r#"<div id="anime-cover-sub-content"><a href="{episode}">Episode 1</a></div>"#),
    )
}

fn landing_page(data_source: &str) -> String {
    format!(
        r#"<html><body>
             <ul class="tabs"><li><a id="hot-anime-tab" data-source="{data_source}">Hot</a></li></ul>
           </body></html>"#
    )
}

const TOKEN_SCRIPT: &str = r#"(function(){ "use strict"; var cfg = { jwt: "a.b.c" }; })();"#;

async fn mount_html(server: &MockServer, at: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

async fn mount_json(server: &MockServer, at: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Mount a series title whose first episode resolves through `manifest`.
async fn mount_series(server: &MockServer, script: &str, manifest: serde_json::Value) {
    mount_html(server, "/anime/frieren", series_page("/episode/frieren-1")).await;
    mount_html(server, "/episode/frieren-1", landing_page("/api/watch/4821")).await;
    mount_html(server, "/players/4821.v2.js", script.to_string()).await;
    mount_json(server, "/api/watch/4821", manifest).await;
}

fn drain(rx: &mut tokio::sync::broadcast::Receiver<Diagnostic>) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    while let Ok(diag) = rx.try_recv() {
        out.push(diag);
    }
    out
}

// ─── Absence and failure ─────────────────────────────────────────────────────

#[tokio::test]
async fn landing_page_without_descriptor_yields_nothing() {
    let server = MockServer::start().await;
    mount_html(&server, "/anime/frieren", series_page("/episode/frieren-1")).await;
    mount_html(&server, "/episode/frieren-1", "<html><body><p>Coming soon</p></body></html>".into()).await;

    let diagnostics = Diagnostics::default();
    let mut rx = diagnostics.subscribe();
    let resolver = StreamResolver::new(&config(&server, ""), diagnostics).unwrap();

    assert!(resolver.resolve_streams("animeowl:frieren").await.is_empty());

    let diags = drain(&mut rx);
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].kind, DiagnosticKind::NotFound);
    assert_eq!(diags[0].stage, Stage::Fetched);
}

#[tokio::test]
async fn script_without_token_yields_nothing() {
    let server = MockServer::start().await;
    let script = "// legacy: \"x.y.z\"\nvar player = init(window.config);";
    mount_series(&server, script, json!({"kaido": [{"url": "https://k/m.m3u8?t="}]})).await;

    let diagnostics = Diagnostics::default();
    let mut rx = diagnostics.subscribe();
    let resolver = StreamResolver::new(&config(&server, ""), diagnostics).unwrap();

    assert!(resolver.resolve_streams("animeowl:frieren").await.is_empty());

    let diags = drain(&mut rx);
    assert_eq!(diags[0].kind, DiagnosticKind::NotFound);
    assert_eq!(diags[0].stage, Stage::ScriptFetched);
}

#[tokio::test]
async fn malformed_manifest_is_reported() {
    let server = MockServer::start().await;
    mount_series(&server, TOKEN_SCRIPT, json!(["not", "an", "object"])).await;

    let diagnostics = Diagnostics::default();
    let mut rx = diagnostics.subscribe();
    let resolver = StreamResolver::new(&config(&server, ""), diagnostics).unwrap();

    assert!(resolver.resolve_streams("animeowl:frieren").await.is_empty());
    let diags = drain(&mut rx);
    assert_eq!(diags[0].kind, DiagnosticKind::MalformedUpstream);
    assert_eq!(diags[0].stage, Stage::TokenExtracted);
}

#[tokio::test]
async fn missing_title_page_is_a_network_failure() {
    let server = MockServer::start().await;

    let diagnostics = Diagnostics::default();
    let mut rx = diagnostics.subscribe();
    let resolver = StreamResolver::new(&config(&server, ""), diagnostics).unwrap();

    assert!(resolver.resolve_streams("animeowl:nope").await.is_empty());
    let diags = drain(&mut rx);
    assert_eq!(diags[0].kind, DiagnosticKind::Network);
    assert!(diags[0].url.ends_with("/anime/nope"));
}

#[tokio::test]
async fn foreign_ids_never_touch_the_network() {
    let server = MockServer::start().await;
    let resolver = StreamResolver::new(&config(&server, ""), Diagnostics::default()).unwrap();

    assert!(resolver.resolve_streams("tt0111161").await.is_empty());
    let requests = server.received_requests().await.unwrap_or_default();
    assert!(requests.is_empty());
}

#[tokio::test]
async fn overall_deadline_abandons_resolution() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/anime/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(series_page("/episode/slow-1"))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let diagnostics = Diagnostics::default();
    let mut rx = diagnostics.subscribe();
    let resolver = StreamResolver::new(&config(&server, "deadline_secs = 1"), diagnostics).unwrap();

    assert!(resolver.resolve_streams("animeowl:slow").await.is_empty());
    let diags = drain(&mut rx);
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].kind, DiagnosticKind::DeadlineExceeded);
    assert_eq!(diags[0].stage, Stage::Start);
}

#[tokio::test]
async fn deadline_report_carries_the_stage_reached() {
    let server = MockServer::start().await;
    mount_html(&server, "/anime/frieren", series_page("/episode/frieren-1")).await;
    mount_html(&server, "/episode/frieren-1", landing_page("/api/watch/4821")).await;
    Mock::given(method("GET"))
        .and(path("/players/4821.v2.js"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(TOKEN_SCRIPT)
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let diagnostics = Diagnostics::default();
    let mut rx = diagnostics.subscribe();
    let resolver = StreamResolver::new(&config(&server, "deadline_secs = 1"), diagnostics).unwrap();

    assert!(resolver.resolve_streams("animeowl:frieren").await.is_empty());
    let diags = drain(&mut rx);
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].kind, DiagnosticKind::DeadlineExceeded);
    assert_eq!(diags[0].stage, Stage::DescriptorLocated);
    assert!(diags[0].url.ends_with("/anime/frieren"));
}

// ─── Backend shapes ──────────────────────────────────────────────────────────

#[tokio::test]
async fn multi_resolution_entry_gets_token_appended() {
    let server = MockServer::start().await;
    mount_series(
        &server,
        TOKEN_SCRIPT,
        json!({"luffy": [{"resolution": "720p", "url": "https://cdn/x?tok="}]}),
    )
    .await;

    let resolver = StreamResolver::new(&config(&server, ""), Diagnostics::default()).unwrap();
    let streams = resolver.resolve_streams("animeowl:frieren").await;

    assert_eq!(streams.len(), 1);
    assert_eq!(streams[0].url, "https://cdn/x?tok=a.b.c");
    assert!(streams[0].name.contains("720p"));
    assert_eq!(streams[0].group_key, "animeowl");
}

#[tokio::test]
async fn redirect_style_entry_resolves_with_subtitle() {
    let server = MockServer::start().await;
    mount_series(
        &server,
        TOKEN_SCRIPT,
        json!({"zoro": [{"url": format!("{}/zoro/resolve?t=", server.uri())}]}),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/zoro/resolve"))
        .and(query_param("t", "a.b.c"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "url": "https://cdn/final.m3u8",
            "subtitle": "https://cdn/sub.vtt"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let resolver = StreamResolver::new(&config(&server, ""), Diagnostics::default()).unwrap();
    let streams = resolver.resolve_streams("animeowl:frieren").await;

    assert_eq!(streams.len(), 1);
    assert_eq!(streams[0].name, "AnimeOwl Zoro");
    assert_eq!(streams[0].url, "https://cdn/final.m3u8");
    assert_eq!(streams[0].subtitles.len(), 1);
    assert_eq!(streams[0].subtitles[0].url, "https://cdn/sub.vtt");
    assert_eq!(streams[0].subtitles[0].lang, "eng");
}

#[tokio::test]
async fn failed_redirect_keeps_other_backends() {
    let server = MockServer::start().await;
    mount_series(
        &server,
        TOKEN_SCRIPT,
        json!({
            "zoro": [{"url": format!("{}/zoro/resolve?t=", server.uri())}],
            "kaido": [{"url": "https://k/master.m3u8?t="}]
        }),
    )
    .await;

    let diagnostics = Diagnostics::default();
    let mut rx = diagnostics.subscribe();
    let resolver = StreamResolver::new(&config(&server, ""), diagnostics).unwrap();
    let streams = resolver.resolve_streams("animeowl:frieren").await;

    assert_eq!(streams.len(), 1);
    assert_eq!(streams[0].url, "https://k/master.m3u8?t=a.b.c");
    let diags = drain(&mut rx);
    assert!(diags.iter().any(|d| d.kind == DiagnosticKind::BackendSkipped));
}

#[tokio::test]
async fn backends_come_out_in_preference_order() {
    let server = MockServer::start().await;
    mount_series(
        &server,
        TOKEN_SCRIPT,
        json!({
            "luffy": [
                {"resolution": "1080p", "url": "https://l/1080?t="},
                {"resolution": "720p", "url": "https://l/720?t="},
                {"resolution": "480p", "url": "https://l/480?t="}
            ],
            "kaido": [{"url": "https://k/master.m3u8?t="}]
        }),
    )
    .await;

    let resolver = StreamResolver::new(&config(&server, ""), Diagnostics::default()).unwrap();
    let names: Vec<_> = resolver
        .resolve_streams("animeowl:frieren")
        .await
        .into_iter()
        .map(|s| s.name)
        .collect();

    assert_eq!(
        names,
        ["AnimeOwl Kaido", "AnimeOwl Luffy 1080p", "AnimeOwl Luffy 720p"]
    );
}

// ─── Movies ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn movie_falls_back_to_second_release() {
    let server = MockServer::start().await;
    mount_html(
        &server,
        "/anime/your-name",
        title_page(
            "Movie",
            r#"<a class="episode-node" href="/episode/your-name-sub">Sub</a>
               <a class="episode-node" href="/episode/your-name-dub">Dub</a>
               <a class="episode-node" href="/episode/your-name-raw">Raw</a>"#,
        ),
    )
    .await;
    mount_html(&server, "/episode/your-name-sub", "<html><body></body></html>".into()).await;
    mount_html(&server, "/episode/your-name-dub", landing_page("/api/watch/77")).await;
    mount_html(&server, "/players/77.v2.js", TOKEN_SCRIPT.to_string()).await;
    mount_json(&server, "/api/watch/77", json!({"kaido": {"url": "https://k/movie.m3u8?t="}})).await;
    Mock::given(method("GET"))
        .and(path("/episode/your-name-raw"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let resolver = StreamResolver::new(&config(&server, ""), Diagnostics::default()).unwrap();
    let streams = resolver.resolve_streams("animeowl:your-name").await;

    assert_eq!(streams.len(), 1);
    assert_eq!(streams[0].url, "https://k/movie.m3u8?t=a.b.c");
}

#[tokio::test]
async fn movie_candidates_are_bounded() {
    let server = MockServer::start().await;
    mount_html(
        &server,
        "/anime/short",
        title_page(
            "Movie",
            r#"<a class="episode-node" href="/episode/a">A</a>
               <a class="episode-node" href="/episode/b">B</a>"#,
        ),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/episode/a"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/episode/b"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let resolver =
        StreamResolver::new(&config(&server, "max_candidates = 1"), Diagnostics::default()).unwrap();
    assert!(resolver.resolve_streams("animeowl:short").await.is_empty());
}
