use std::str::FromStr;
use std::sync::Arc;

use serde_json::json;

use ember::config::Config;
use ember::middleware::{BodyParser, CookieParser, Cors, ETag, ParsedBody, RequestLogger};
use ember::server::{App, ConnectionRegistry, listener};
use ember::static_files::FsResolver;
use ember::{Error, StatusCode};

fn build_app(cfg: &Config) -> App {
    let mut builder = App::builder()
        .wrap(RequestLogger)
        .wrap(Cors::new())
        .wrap(CookieParser)
        .wrap(BodyParser)
        .wrap(ETag);

    let router = builder.router();

    router.get("/", |_req, res| {
        res.text("Hello from Ember\n");
        Ok(())
    });

    router.get("/health", |_req, res| {
        res.json(&json!({ "status": "ok" }))
            .map_err(|e| Error::InternalServerError(e.to_string()))?;
        Ok(())
    });

    router.post("/echo", |req, res| {
        let echoed = match req.extensions().get::<ParsedBody>() {
            Some(ParsedBody::Json(value)) => value.clone(),
            Some(ParsedBody::Form(form)) => json!(form),
            Some(ParsedBody::Text(text)) => json!(text),
            None => json!(null),
        };
        res.json(&json!({ "body": echoed, "query": req.query }))
            .map_err(|e| Error::InternalServerError(e.to_string()))?;
        Ok(())
    });

    router.get("/users/{id}", |req, res| {
        res.json(&json!({ "id": req.param("id") }))
            .map_err(|e| Error::InternalServerError(e.to_string()))?;
        Ok(())
    });

    router.get("/users/{id}/posts/{post_id}", |req, res| {
        res.set_status(StatusCode::Ok);
        res.json(&json!({ "user": req.param("id"), "post": req.param("post_id") }))
            .map_err(|e| Error::InternalServerError(e.to_string()))?;
        Ok(())
    });

    if let Some(static_cfg) = &cfg.static_files {
        builder = builder
            .static_files(FsResolver::new(&static_cfg.root).with_index(&static_cfg.index));
        if let Some(page) = &static_cfg.not_found_page {
            builder = builder.not_found_page(page);
        }
    }

    builder.build()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = Config::load()?;

    let level = tracing::Level::from_str(&cfg.logging.level).unwrap_or(tracing::Level::INFO);
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_max_level(level)
        .init();

    let app = Arc::new(build_app(&cfg));
    let registry = ConnectionRegistry::new();

    tokio::select! {
        res = listener::run(&cfg, app, registry.clone()) => {
            res?;
        }

        _ = tokio::signal::ctrl_c() => {
            tracing::info!(open_connections = registry.len().await, "Shutdown signal received");
        }
    }

    Ok(())
}
