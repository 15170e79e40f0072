//! Local upstream servers for tests.

use std::time::Duration;

use axum::{
    http::{header, StatusCode},
    routing::get,
    Router,
};
use tokio::net::TcpListener;

/// Canned answer for one upstream path.
#[derive(Debug, Clone)]
pub struct Reply {
    status: u16,
    body: String,
    delay: Duration,
}

impl Reply {
    pub fn json(value: serde_json::Value) -> Self {
        Self::raw(&value.to_string())
    }

    pub fn raw(body: &str) -> Self {
        Self {
            status: 200,
            body: body.to_string(),
            delay: Duration::ZERO,
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            body: String::new(),
            delay: Duration::ZERO,
        }
    }

    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Serve `GET /<name>` for each route on an ephemeral port and return the
/// `host:port` authority.
pub async fn spawn_upstream(routes: Vec<(&str, Reply)>) -> String {
    let mut app = Router::new();
    for (name, reply) in routes {
        app = app.route(
            &format!("/{}", name),
            get(move || {
                let reply = reply.clone();
                async move {
                    tokio::time::sleep(reply.delay).await;
                    (
                        StatusCode::from_u16(reply.status).unwrap(),
                        [(header::CONTENT_TYPE, "application/json")],
                        reply.body,
                    )
                }
            }),
        );
    }

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr.to_string()
}
