//! Routing behaviour of the composed server in split and combined mode.

use axum::{
    body::Body,
    http::{header, Method, StatusCode},
};

use onboard_backend::config::DeploymentMode;
use onboard_backend::http::{FallbackStatus, HttpServer, SpaFallback, Stage};
use onboard_backend::routing::{ServiceModule, ServiceRegistry};

mod common;
use common::*;

#[tokio::test]
async fn health_is_served_in_both_modes() {
    let assets = asset_root();
    let build = frontend_build();

    for config in [
        split_config(assets.path()),
        combined_config(assets.path(), build.path()),
    ] {
        let server = HttpServer::new(config, ServiceRegistry::new());
        let reply = get_path(&server.router(), "/health").await;

        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(reply.json()["status"], "OK");
        assert_eq!(reply.json()["message"], "Server is running");
    }
}

#[tokio::test]
async fn combined_mode_serves_entry_document_for_client_routes() {
    let assets = asset_root();
    let build = frontend_build();
    let server = HttpServer::new(combined_config(assets.path(), build.path()), ServiceRegistry::new());
    assert_eq!(server.mode(), DeploymentMode::Combined);

    let reply = get_path(&server.router(), "/some/client/route").await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.text(), INDEX_HTML);
    assert_eq!(reply.headers[header::CACHE_CONTROL], "no-cache");

    let root = get_path(&server.router(), "/").await;
    assert_eq!(root.status, StatusCode::OK);
    assert_eq!(root.text(), INDEX_HTML);
}

#[tokio::test]
async fn combined_mode_serves_build_files_with_cache_hint() {
    let assets = asset_root();
    let build = frontend_build();
    let mut config = combined_config(assets.path(), build.path());
    config.frontend.asset_max_age_secs = 600;
    let server = HttpServer::new(config, ServiceRegistry::new());

    let reply = get_path(&server.router(), "/static/js/main.js").await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.text(), "console.log('app');");
    assert_eq!(reply.headers[header::CACHE_CONTROL], "public, max-age=600");
}

#[tokio::test]
async fn unmatched_api_paths_get_json_not_found() {
    let assets = asset_root();
    let build = frontend_build();
    let server = HttpServer::new(combined_config(assets.path(), build.path()), ServiceRegistry::new());

    for path in ["/api/nonexistent", "/api", "/api/learning-paths/x"] {
        let reply = get_path(&server.router(), path).await;
        assert_eq!(reply.status, StatusCode::NOT_FOUND, "{path}");
        assert_eq!(reply.json()["success"], false);
        assert_eq!(reply.json()["message"], "API endpoint not found");
    }
}

#[tokio::test]
async fn unknown_path_inside_mounted_service_is_api_not_found() {
    let assets = asset_root();
    let build = frontend_build();
    let registry = ServiceRegistry::new().with(ServiceModule::Learning, failing_router());
    let server = HttpServer::new(combined_config(assets.path(), build.path()), registry);

    let reply = get_path(&server.router(), "/api/learning/does-not-exist").await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert_eq!(reply.json()["message"], "API endpoint not found");
}

#[tokio::test]
async fn api_routes_take_precedence_over_fallback() {
    let assets = asset_root();
    let build = frontend_build();
    let registry = ServiceRegistry::new().with(ServiceModule::Onboarding, failing_router());
    let server = HttpServer::new(combined_config(assets.path(), build.path()), registry);

    let reply = get_path(&server.router(), "/api/onboarding/ok").await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.json()["success"], true);
}

#[tokio::test]
async fn combined_mode_without_build_serves_plain_not_found() {
    let assets = asset_root();
    let missing = assets.path().join("no-such-build");
    let config = combined_config(assets.path(), &missing);

    let logs = CapturedLogs::default();
    let status = logs.scope(|| SpaFallback::detect(config.mode(), &config.frontend));
    assert!(matches!(status, FallbackStatus::Missing(ref dir) if *dir == missing));
    let output = logs.contents();
    assert!(output.contains("WARN"), "{output}");
    assert!(output.contains("Frontend build not found"), "{output}");

    let server = HttpServer::new(config, ServiceRegistry::new());
    assert!(!server.stages().contains(&Stage::SpaFallback));

    let reply = get_path(&server.router(), "/some/client/route").await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert!(reply.body.is_empty());

    let health = get_path(&server.router(), "/health").await;
    assert_eq!(health.status, StatusCode::OK);
}

#[tokio::test]
async fn split_mode_never_serves_the_frontend() {
    let assets = asset_root();
    let build = frontend_build();
    let mut config = split_config(assets.path());
    config.frontend.build_dir = build.path().to_path_buf();
    let server = HttpServer::new(config, ServiceRegistry::new());
    assert_eq!(server.mode(), DeploymentMode::Split);

    let reply = get_path(&server.router(), "/some/client/route").await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert!(reply.body.is_empty());
}

#[tokio::test]
async fn single_service_flag_selects_combined_mode() {
    let assets = asset_root();
    let build = frontend_build();
    let mut config = split_config(assets.path());
    config.server.single_service = true;
    config.frontend.build_dir = build.path().to_path_buf();

    let server = HttpServer::new(config, ServiceRegistry::new());
    assert_eq!(server.mode(), DeploymentMode::Combined);
    assert_eq!(get_path(&server.router(), "/dashboard").await.text(), INDEX_HTML);
}

#[tokio::test]
async fn static_mounts_serve_files_in_both_modes() {
    let assets = asset_root();
    let build = frontend_build();

    for config in [
        split_config(assets.path()),
        combined_config(assets.path(), build.path()),
    ] {
        let router = HttpServer::new(config, ServiceRegistry::new()).router();

        assert_eq!(get_path(&router, "/uploads/resume.txt").await.text(), "resume");
        assert_eq!(get_path(&router, "/documents/policy.txt").await.text(), "policy");
        assert_eq!(get_path(&router, "/assets/logo.svg").await.text(), "<svg/>");
    }
}

#[tokio::test]
async fn missing_static_file_never_falls_through_to_entry_document() {
    let assets = asset_root();
    let build = frontend_build();
    let server = HttpServer::new(combined_config(assets.path(), build.path()), ServiceRegistry::new());

    let reply = get_path(&server.router(), "/uploads/missing.pdf").await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert_ne!(reply.text(), INDEX_HTML);
}

#[tokio::test]
async fn non_get_client_route_is_not_found() {
    let assets = asset_root();
    let build = frontend_build();
    let server = HttpServer::new(combined_config(assets.path(), build.path()), ServiceRegistry::new());

    let reply = send(
        &server.router(),
        request(Method::POST, "/some/client/route").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unregistered_services_answer_unavailable() {
    let assets = asset_root();
    let server = HttpServer::new(split_config(assets.path()), ServiceRegistry::new());

    let reply = get_path(&server.router(), "/api/chatbot/message").await;
    assert_eq!(reply.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(reply.json()["success"], false);
    assert_eq!(reply.json()["message"], "Service 'chatbot' is not available");
}

#[tokio::test]
async fn pipeline_order_is_recorded() {
    let assets = asset_root();
    let build = frontend_build();
    let server = HttpServer::new(combined_config(assets.path(), build.path()), ServiceRegistry::new());

    assert_eq!(
        server.stages(),
        &[
            Stage::Cors,
            Stage::BodyLimit,
            Stage::StaticMounts,
            Stage::ApiRoutes,
            Stage::SpaFallback,
            Stage::ErrorHandler,
        ]
    );
}

#[test]
fn build_present_logs_no_warning() {
    let assets = asset_root();
    let build = frontend_build();
    let config = combined_config(assets.path(), build.path());

    let logs = CapturedLogs::default();
    let status = logs.scope(|| SpaFallback::detect(config.mode(), &config.frontend));
    assert!(matches!(status, FallbackStatus::Ready(_)));
    assert!(!logs.contents().contains("WARN"));
}

#[tokio::test]
async fn trailing_slash_reaches_service_root() {
    let assets = asset_root();
    let build = frontend_build();
    let registry = || ServiceRegistry::new().with(ServiceModule::Candidates, root_only_router("all candidates"));

    for config in [
        split_config(assets.path()),
        combined_config(assets.path(), build.path()),
    ] {
        let router = HttpServer::new(config, registry()).router();

        let bare = get_path(&router, "/api/candidates").await;
        assert_eq!(bare.status, StatusCode::OK);
        assert_eq!(bare.text(), "all candidates");

        let slashed = get_path(&router, "/api/candidates/").await;
        assert_eq!(slashed.status, StatusCode::OK);
        assert_eq!(slashed.text(), "all candidates");

        let unavailable = get_path(&router, "/api/chatbot/").await;
        assert_eq!(unavailable.status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(unavailable.json()["success"], false);
    }
}

#[tokio::test]
async fn health_with_trailing_slash_is_json_in_combined_mode() {
    let assets = asset_root();
    let build = frontend_build();
    let router = HttpServer::new(combined_config(assets.path(), build.path()), ServiceRegistry::new()).router();

    let reply = get_path(&router, "/health/").await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.headers[header::CONTENT_TYPE], "application/json");
    assert_eq!(reply.json()["status"], "OK");

    let client_route = get_path(&router, "/dashboard/").await;
    assert_eq!(client_route.text(), INDEX_HTML);
}
