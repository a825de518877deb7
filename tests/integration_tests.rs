//! Integration tests for the HTTP game server
//!
//! These tests drive the full axum application in-process: transport,
//! router, endpoints, the shared game and static file serving.

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use model::Game;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::{json, Value};
use server::api::{ApiContext, ApiRouter};
use server::config::GameConfig;
use server::http::{app, AppState};
use server::static_files::StaticFiles;
use server::SharedGame;
use std::path::PathBuf;
use tower::ServiceExt;

const CONFIG: &str = r#"{
    "defaultDogSpeed": 1.0,
    "maps": [
        {
            "id": "map1",
            "name": "Map 1",
            "roads": [{"x0": 0, "y0": 0, "x1": 10}],
            "buildings": [{"x": 2, "y": 2, "w": 3, "h": 1}],
            "offices": [{"id": "o0", "x": 5, "y": 1, "offsetX": 0, "offsetY": -1}]
        },
        {
            "id": "town",
            "name": "Town",
            "dogSpeed": 2.5,
            "roads": [{"x0": 0, "y0": 0, "y1": 20}],
            "buildings": [],
            "offices": []
        }
    ]
}"#;

/// Test server: the application plus a handle on its game.
struct TestServer {
    app: Router,
    game: SharedGame,
}

fn www_root() -> PathBuf {
    let root = std::env::temp_dir().join(format!("integration-www-{}", std::process::id()));
    std::fs::create_dir_all(root.join("js")).unwrap();
    std::fs::write(root.join("index.html"), "<html>game</html>").unwrap();
    std::fs::write(root.join("js").join("app.js"), "console.log(1)").unwrap();
    root
}

fn test_server(auto_tick: bool) -> TestServer {
    let mut game = Game::with_rng(StdRng::seed_from_u64(2024));
    GameConfig::from_json(CONFIG)
        .unwrap()
        .apply(&mut game)
        .unwrap();
    let maps = game.maps().clone();
    let game = server::shared(game);

    let router = ApiRouter::new(ApiContext::new(maps, game.clone(), auto_tick));
    let files = StaticFiles::new(www_root()).unwrap();
    TestServer {
        app: app(AppState::new(router, files)),
        game,
    }
}

struct Reply {
    status: StatusCode,
    content_type: Option<String>,
    allow: Option<String>,
    cache_control: Option<String>,
    body: Vec<u8>,
}

impl Reply {
    fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }

    fn error_code(&self) -> String {
        self.json()["code"].as_str().unwrap().to_string()
    }
}

impl TestServer {
    async fn send(&self, request: Request<Body>) -> Reply {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let header_value = |name: header::HeaderName| {
            response
                .headers()
                .get(name)
                .map(|v| v.to_str().unwrap().to_string())
        };
        let content_type = header_value(header::CONTENT_TYPE);
        let allow = header_value(header::ALLOW);
        let cache_control = header_value(header::CACHE_CONTROL);
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec();
        Reply {
            status,
            content_type,
            allow,
            cache_control,
            body,
        }
    }

    async fn get(&self, uri: &str) -> Reply {
        self.send(request(Method::GET, uri, None, None, "")).await
    }

    async fn join(&self, user_name: &str, map_id: &str) -> Reply {
        let body = json!({"userName": user_name, "mapId": map_id}).to_string();
        self.send(request(Method::POST, "/api/v1/game/join", None, None, &body))
            .await
    }

    async fn join_token(&self, user_name: &str, map_id: &str) -> String {
        let reply = self.join(user_name, map_id).await;
        assert_eq!(reply.status, StatusCode::OK);
        reply.json()["authToken"].as_str().unwrap().to_string()
    }

    async fn action(&self, token: &str, movement: &str) -> Reply {
        let body = json!({ "move": movement }).to_string();
        self.send(request(
            Method::POST,
            "/api/v1/game/player/action",
            Some(token),
            Some("application/json"),
            &body,
        ))
        .await
    }

    async fn tick(&self, ms: u64) -> Reply {
        let body = json!({ "timeDelta": ms }).to_string();
        self.send(request(Method::POST, "/api/v1/game/tick", None, None, &body))
            .await
    }

    async fn state(&self, token: &str) -> Value {
        let reply = self
            .send(request(Method::GET, "/api/v1/game/state", Some(token), None, ""))
            .await;
        assert_eq!(reply.status, StatusCode::OK);
        reply.json()
    }
}

fn request(
    method: Method,
    uri: &str,
    token: Option<&str>,
    content_type: Option<&str>,
    body: &str,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    if let Some(content_type) = content_type {
        builder = builder.header(header::CONTENT_TYPE, content_type);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// MAP CATALOG TESTS
mod map_tests {
    use super::*;

    #[tokio::test]
    async fn list_maps_in_config_order() {
        let server = test_server(false);
        let reply = server.get("/api/v1/maps").await;

        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(reply.content_type.as_deref(), Some("application/json"));
        assert_eq!(
            reply.json(),
            json!([{"id": "map1", "name": "Map 1"}, {"id": "town", "name": "Town"}])
        );
    }

    #[tokio::test]
    async fn get_full_map_without_speed() {
        let server = test_server(false);
        let reply = server.get("/api/v1/maps/town").await;

        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(
            reply.json(),
            json!({
                "id": "town",
                "name": "Town",
                "roads": [{"x0": 0, "y0": 0, "y1": 20}],
                "buildings": [],
                "offices": []
            })
        );

        let map1 = server.get("/api/v1/maps/map1").await.json();
        assert_eq!(map1["buildings"], json!([{"x": 2, "y": 2, "w": 3, "h": 1}]));
        assert_eq!(
            map1["offices"],
            json!([{"id": "o0", "x": 5, "y": 1, "offsetX": 0, "offsetY": -1}])
        );
    }

    #[tokio::test]
    async fn unknown_map_is_not_found() {
        let server = test_server(false);
        let reply = server.get("/api/v1/maps/atlantis").await;

        assert_eq!(reply.status, StatusCode::NOT_FOUND);
        assert_eq!(reply.error_code(), "mapNotFound");
        assert_eq!(reply.cache_control.as_deref(), Some("no-cache"));
    }

    #[tokio::test]
    async fn map_endpoints_reject_post() {
        let server = test_server(false);
        let reply = server
            .send(request(Method::POST, "/api/v1/maps", None, None, ""))
            .await;

        assert_eq!(reply.status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(reply.error_code(), "invalidMethod");
        assert_eq!(reply.allow.as_deref(), Some("GET, HEAD"));
    }
}

/// GAME FLOW TESTS
mod game_tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[tokio::test]
    async fn bob_walks_east_and_stops_at_road_end() {
        let server = test_server(false);
        let token = server.join_token("bob", "map1").await;

        let state = server.state(&token).await;
        assert_eq!(state["players"]["0"]["pos"], json!([0.0, 0.0]));

        assert_eq!(server.action(&token, "R").await.status, StatusCode::OK);
        assert_eq!(server.tick(5000).await.status, StatusCode::OK);

        let dog = &server.state(&token).await["players"]["0"];
        assert_approx_eq!(dog["pos"][0].as_f64().unwrap(), 5.0, 1e-9);
        assert_eq!(dog["pos"][1], json!(0.0));
        assert_eq!(dog["speed"], json!([1.0, 0.0]));
        assert_eq!(dog["dir"], "E");

        server.tick(6000).await;
        let dog = &server.state(&token).await["players"]["0"];
        assert_approx_eq!(dog["pos"][0].as_f64().unwrap(), 10.4, 1e-9);
        assert_eq!(dog["speed"], json!([0.0, 0.0]));

        server.tick(1000).await;
        let again = &server.state(&token).await["players"]["0"];
        assert_eq!(again["pos"], dog["pos"]);
    }

    #[tokio::test]
    async fn map_speed_overrides_default() {
        let server = test_server(false);
        let token = server.join_token("rex", "town").await;

        server.action(&token, "D").await;
        let dog = &server.state(&token).await["players"]["0"];
        assert_eq!(dog["speed"], json!([0.0, 2.5]));
        assert_eq!(dog["dir"], "S");

        server.action(&token, "").await;
        let dog = &server.state(&token).await["players"]["0"];
        assert_eq!(dog["speed"], json!([0.0, 0.0]));
        assert_eq!(dog["dir"], "S");
    }

    #[tokio::test]
    async fn players_are_scoped_to_their_map() {
        let server = test_server(false);
        let alice = server.join_token("alice", "map1").await;
        let rex = server.join_token("rex", "town").await;
        server.join_token("bob", "map1").await;

        let reply = server
            .send(request(Method::GET, "/api/v1/game/players", Some(&alice), None, ""))
            .await;
        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(reply.json(), json!({"0": {"name": "alice"}, "2": {"name": "bob"}}));

        let reply = server
            .send(request(Method::GET, "/api/v1/game/players", Some(&rex), None, ""))
            .await;
        assert_eq!(reply.json(), json!({"1": {"name": "rex"}}));
    }

    #[tokio::test]
    async fn empty_username_creates_nothing() {
        let server = test_server(false);
        let reply = server.join("", "map1").await;

        assert_eq!(reply.status, StatusCode::BAD_REQUEST);
        assert_eq!(reply.error_code(), "invalidArgument");

        let game = server.game.read().await;
        assert_eq!(game.session_count(), 0);
        assert_eq!(game.player_count(), 0);
    }

    #[tokio::test]
    async fn join_unknown_map_and_bad_method() {
        let server = test_server(false);

        let reply = server.join("bob", "atlantis").await;
        assert_eq!(reply.status, StatusCode::NOT_FOUND);
        assert_eq!(reply.error_code(), "mapNotFound");

        let reply = server.get("/api/v1/game/join").await;
        assert_eq!(reply.status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(reply.allow.as_deref(), Some("POST"));
    }

    #[tokio::test]
    async fn unknown_token_is_unauthorized_for_get_and_head() {
        let server = test_server(false);
        server.join_token("bob", "map1").await;

        for method in [Method::GET, Method::HEAD] {
            let reply = server
                .send(request(
                    method.clone(),
                    "/api/v1/game/players",
                    Some("ffffffffffffffffffffffffffffffff"),
                    None,
                    "",
                ))
                .await;
            assert_eq!(reply.status, StatusCode::UNAUTHORIZED, "{}", method);
        }

        let reply = server.get("/api/v1/game/players").await;
        assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
        assert_eq!(reply.error_code(), "invalidToken");
    }

    #[tokio::test]
    async fn action_requires_json_content_type() {
        let server = test_server(false);
        let token = server.join_token("bob", "map1").await;

        let reply = server
            .send(request(
                Method::POST,
                "/api/v1/game/player/action",
                Some(&token),
                Some("text/plain"),
                r#"{"move": "R"}"#,
            ))
            .await;
        assert_eq!(reply.status, StatusCode::BAD_REQUEST);
        assert_eq!(reply.error_code(), "invalidArgument");

        let reply = server
            .send(request(
                Method::POST,
                "/api/v1/game/player/action",
                Some(&token),
                Some("application/json; charset=utf-8"),
                r#"{"move": "U"}"#,
            ))
            .await;
        assert_eq!(reply.status, StatusCode::OK);
    }

    #[tokio::test]
    async fn tick_endpoint_disabled_under_background_ticker() {
        let server = test_server(true);
        let reply = server.tick(100).await;

        assert_eq!(reply.status, StatusCode::BAD_REQUEST);
        assert_eq!(reply.error_code(), "badRequest");
    }

    #[tokio::test]
    async fn unknown_api_paths_get_json_errors() {
        let server = test_server(false);

        for uri in ["/api/v1/nothing", "/api/v1/maps/", "/api/whatever?x=1"] {
            let reply = server.get(uri).await;
            assert_eq!(reply.status, StatusCode::BAD_REQUEST, "{}", uri);
            assert_eq!(reply.content_type.as_deref(), Some("application/json"));
            assert_eq!(reply.error_code(), "badRequest");
        }
    }
}

/// STATIC FILE TESTS
mod static_tests {
    use super::*;

    #[tokio::test]
    async fn root_serves_index() {
        let server = test_server(false);
        let reply = server.get("/").await;

        assert_eq!(reply.status, StatusCode::OK);
        assert!(reply.content_type.unwrap().starts_with("text/html"));
        assert_eq!(reply.body, b"<html>game</html>".to_vec());
    }

    #[tokio::test]
    async fn nested_file_with_mime_type() {
        let server = test_server(false);
        let reply = server.get("/js/app.js").await;

        assert_eq!(reply.status, StatusCode::OK);
        assert!(reply.content_type.unwrap().contains("javascript"));
    }

    #[tokio::test]
    async fn missing_file_and_traversal() {
        let server = test_server(false);

        let reply = server.get("/missing.css").await;
        assert_eq!(reply.status, StatusCode::NOT_FOUND);
        assert_eq!(reply.content_type.as_deref(), Some("text/plain"));

        let reply = server.get("/js/%2e%2e/%2e%2e/secret.txt").await;
        assert_eq!(reply.status, StatusCode::BAD_REQUEST);
        assert_eq!(reply.body, b"Invalid path".to_vec());
    }
}
