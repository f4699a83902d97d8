//! Shared helpers for the HTTP integration tests.
#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use tempfile::TempDir;
use tower::ServiceExt;

use travel_blog::auth::session;
use travel_blog::config::Config;
use travel_blog::db::models::{Country, Post, User};
use travel_blog::db::{self, countries, posts, users};
use travel_blog::state::AppState;

pub const SMALL_GIF: &[u8] = b"GIF89a\x02\x00\x01\x00\x80\x00\x00\x00\x00\x00\xff\xff\xff!\xf9\x04\x00\x00\x00\x00\x00,\x00\x00\x00\x00\x02\x00\x01\x00\x00\x02\x02\x0c\x0a\x00;";

pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    _tmp: TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        let tmp = TempDir::new().unwrap();
        let pool = db::create_pool(&tmp.path().join("test.db")).expect("create pool");
        db::run_migrations(&pool).expect("run migrations");

        let mut config = Config::default();
        config.auth.bcrypt_cost = 4;
        config.resolve_paths(tmp.path());

        let state = AppState { db: pool, config };
        Self {
            app: travel_blog::app(state.clone()),
            state,
            _tmp: tmp,
        }
    }

    /// A user plus a `Cookie` header value logging them in.
    pub fn user(&self, username: &str) -> (User, String) {
        let conn = self.state.db.get().unwrap();
        let user = users::create(&conn, username, "not-a-real-hash").unwrap();
        let token = session::create_session(&conn, user.id, 1).unwrap();
        let cookie = format!("{}={}", self.state.config.auth.cookie_name, token);
        (user, cookie)
    }

    pub fn country(&self, title: &str, slug: &str) -> Country {
        let conn = self.state.db.get().unwrap();
        countries::create(&conn, title, slug, Some("Country description")).unwrap()
    }

    pub fn post(&self, author: &User, text: &str, country: Option<&Country>) -> Post {
        let conn = self.state.db.get().unwrap();
        posts::create(&conn, author.id, text, country.map(|c| c.id), None).unwrap()
    }

    pub fn posts(&self, author: &User, country: Option<&Country>, n: usize) {
        for i in 0..n {
            self.post(author, &format!("Post N{}", i), country);
        }
    }

    pub fn scalar(&self, sql: &str) -> i64 {
        let conn = self.state.db.get().unwrap();
        conn.query_row(sql, [], |row| row.get(0)).unwrap()
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.app.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Response {
        let mut builder = Request::builder().method(Method::GET).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn post_form(&self, uri: &str, cookie: Option<&str>, body: &str) -> Response {
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    pub async fn post_multipart(
        &self,
        uri: &str,
        cookie: Option<&str>,
        fields: &[(&str, &str)],
        image: Option<(&str, &[u8])>,
    ) -> Response {
        let (content_type, body) = multipart_body(fields, image);
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, content_type);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::from(body)).unwrap()).await
    }
}

pub fn generate_boundary() -> String {
    format!("----TravelBlogBoundary{}", uuid::Uuid::now_v7().simple())
}

/// `Content-Type` header value and body for a multipart form.
pub fn multipart_body(fields: &[(&str, &str)], image: Option<(&str, &[u8])>) -> (String, Vec<u8>) {
    let boundary = generate_boundary();
    let mut body = Vec::new();

    for (name, value) in fields {
        body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
        );
        body.extend_from_slice(value.as_bytes());
        body.extend_from_slice(b"\r\n");
    }

    if let Some((filename, data)) = image {
        body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"image\"; filename=\"{}\"\r\n",
                filename
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: image/gif\r\n\r\n");
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{}--\r\n", boundary).as_bytes());
    (format!("multipart/form-data; boundary={}", boundary), body)
}

pub async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Number of post cards rendered on a page.
pub async fn card_count(response: Response) -> usize {
    assert_eq!(response.status(), StatusCode::OK);
    body_text(response).await.matches("class=\"post-card\"").count()
}

pub fn location(response: &Response) -> &str {
    response.headers()[header::LOCATION].to_str().unwrap()
}
