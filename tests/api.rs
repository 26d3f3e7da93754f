// Copyright (c) Fizzgrid Team
// SPDX-License-Identifier: Apache-2.0

//! End-to-end handler tests against a real Postgres instance.
//!
//! These run only when `DATABASE_URL` is set; without it each test logs a
//! skip notice and returns. Migrations are applied on pool construction, and
//! every test registers its own uniquely-named users and drinks so runs do
//! not interfere with each other or with leftover rows.

use axum::body::HttpBody;
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::{body::Body, Router};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use serde_json::Value;
use std::io::Cursor;
use std::sync::Arc;
use std::sync::Once;
use tower::ServiceExt;

use fizzgrid_server::api::build_router;
use fizzgrid_server::db::Database;
use fizzgrid_server::schema::{drink_favorites, drinks, reviews, users};

const BOUNDARY: &str = "fizzgrid-test-boundary";
const PASSWORD: &str = "sturdy-passw0rd";

static MEDIA_SETUP: Once = Once::new();

struct TestApp {
    app: Router,
    db: Arc<Database>,
}

/// Build a router over the configured database, or `None` when no database
/// is available.
async fn setup() -> Option<TestApp> {
    if std::env::var("DATABASE_URL").is_err() {
        eprintln!("DATABASE_URL not set; skipping");
        return None;
    }

    MEDIA_SETUP.call_once(|| {
        if std::env::var("MEDIA_ROOT").is_err() {
            let root = std::env::temp_dir().join("fizzgrid-test-media");
            std::env::set_var("MEDIA_ROOT", root);
        }
    });

    let db = Arc::new(Database::new().await.expect("database setup failed"));
    Some(TestApp {
        app: build_router(db.clone()),
        db,
    })
}

fn unique(prefix: &str) -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("{prefix}{}", &suffix[..12])
}

fn multipart_body(fields: &[(&str, &str)], files: &[(&str, &str, &[u8])]) -> Body {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; \
                 name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    for (name, file_name, bytes) in files {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; \
                 name=\"{name}\"; filename=\"{file_name}\"\r\n\
                 Content-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    Body::from(body)
}

fn request(method: &str, path: &str, token: Option<&str>, body: Body) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(path).header(
        header::CONTENT_TYPE,
        format!("multipart/form-data; boundary={BOUNDARY}"),
    );
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(body).expect("request build failed")
}

async fn send(app: &Router, req: Request<Body>) -> Response {
    app.clone().oneshot(req).await.expect("request failed")
}

async fn body_json(res: Response) -> Value {
    let mut body = res.into_body();
    let mut bytes = Vec::new();
    while let Some(chunk) = body.data().await {
        bytes.extend_from_slice(&chunk.expect("body read failed"));
    }
    serde_json::from_slice(&bytes).expect("response was not JSON")
}

fn tiny_png() -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    image::RgbaImage::new(1, 1)
        .write_to(&mut buf, image::ImageOutputFormat::Png)
        .expect("png encode failed");
    buf.into_inner()
}

/// Register a new user and profile; returns the session token and profile id.
async fn register(app: &Router, username: &str) -> (String, i32) {
    let body = multipart_body(
        &[
            ("username", username),
            ("email", &format!("{username}@example.com")),
            ("password", PASSWORD),
        ],
        &[],
    );
    let res = send(app, request("POST", "/profiles/profile/", None, body)).await;
    assert_eq!(res.status(), StatusCode::OK);
    let json = body_json(res).await;
    let token = json["token"].as_str().expect("missing token").to_string();
    let profile_id = json["profile"]["id"].as_i64().expect("missing profile id") as i32;
    (token, profile_id)
}

async fn promote_to_admin(db: &Database, username: &str) {
    let mut conn = db.get_connection().await.expect("pool get failed");
    diesel::update(users::table.filter(users::username.eq(username)))
        .set(users::is_admin.eq(true))
        .execute(&mut conn)
        .await
        .expect("admin promotion failed");
}

/// Register an admin and create a drink with a unique name pair. Returns the
/// drink id and the name pair used.
async fn create_drink(ctx: &TestApp) -> (i32, String, String) {
    let admin = unique("admin_");
    let (token, _) = register(&ctx.app, &admin).await;
    promote_to_admin(&ctx.db, &admin).await;

    let product = unique("Cola ");
    let brand = unique("Brand ");
    let body = multipart_body(
        &[("product_name", &product), ("brand_name", &brand)],
        &[],
    );
    let res = send(
        &ctx.app,
        request("POST", "/drinks/drink/", Some(&token), body),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let json = body_json(res).await;
    let drink_id = json["id"].as_i64().expect("missing drink id") as i32;
    (drink_id, product, brand)
}

async fn review_count(db: &Database, drink_id: i32) -> i64 {
    let mut conn = db.get_connection().await.expect("pool get failed");
    reviews::table
        .filter(reviews::drink_id.eq(drink_id))
        .count()
        .get_result(&mut conn)
        .await
        .expect("count failed")
}

#[tokio::test]
async fn rejected_review_image_leaves_no_review_row() {
    let Some(ctx) = setup().await else { return };

    let (drink_id, _, _) = create_drink(&ctx).await;
    let (token, _) = register(&ctx.app, &unique("reviewer_")).await;
    assert_eq!(review_count(&ctx.db, drink_id).await, 0);

    let drink_id_text = drink_id.to_string();
    let body = multipart_body(
        &[
            ("rating", "4"),
            ("review_text", "crisp, a little too sweet"),
            ("drink_id", &drink_id_text),
        ],
        &[("image", "not_an_image.png", b"plainly not an image")],
    );
    let res = send(
        &ctx.app,
        request("POST", "/reviews/review/", Some(&token), body),
    )
    .await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let json = body_json(res).await;
    assert_eq!(json["detail"], "Files must be images");
    assert_eq!(review_count(&ctx.db, drink_id).await, 0);
}

#[tokio::test]
async fn duplicate_drink_conflict_leaves_store_unchanged() {
    let Some(ctx) = setup().await else { return };

    let (_, product, brand) = create_drink(&ctx).await;

    let admin = unique("admin_");
    let (token, _) = register(&ctx.app, &admin).await;
    promote_to_admin(&ctx.db, &admin).await;

    let body = multipart_body(
        &[("product_name", &product), ("brand_name", &brand)],
        &[],
    );
    let res = send(
        &ctx.app,
        request("POST", "/drinks/drink/", Some(&token), body),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let mut conn = ctx.db.get_connection().await.expect("pool get failed");
    let count: i64 = drinks::table
        .filter(drinks::product_name.eq(&product))
        .filter(drinks::brand_name.eq(&brand))
        .count()
        .get_result(&mut conn)
        .await
        .expect("count failed");
    assert_eq!(count, 1);
}

#[tokio::test]
async fn double_favorite_yields_one_row_and_conflict() {
    let Some(ctx) = setup().await else { return };

    let (drink_id, _, _) = create_drink(&ctx).await;
    let (token, profile_id) = register(&ctx.app, &unique("fan_")).await;

    let path = format!("/drinks/drink/{drink_id}/favorite/");
    let res = send(
        &ctx.app,
        request("POST", &path, Some(&token), Body::empty()),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = send(
        &ctx.app,
        request("POST", &path, Some(&token), Body::empty()),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let mut conn = ctx.db.get_connection().await.expect("pool get failed");
    let count: i64 = drink_favorites::table
        .filter(drink_favorites::profile_id.eq(profile_id))
        .filter(drink_favorites::drink_id.eq(drink_id))
        .count()
        .get_result(&mut conn)
        .await
        .expect("count failed");
    assert_eq!(count, 1);
}

#[tokio::test]
async fn only_the_author_may_delete_a_review() {
    let Some(ctx) = setup().await else { return };

    let (drink_id, _, _) = create_drink(&ctx).await;
    let (author_token, _) = register(&ctx.app, &unique("author_")).await;
    let (other_token, _) = register(&ctx.app, &unique("other_")).await;

    let drink_id_text = drink_id.to_string();
    let body = multipart_body(
        &[
            ("rating", "2"),
            ("review_text", "flat and watered down"),
            ("drink_id", &drink_id_text),
        ],
        &[],
    );
    let res = send(
        &ctx.app,
        request("POST", "/reviews/review/", Some(&author_token), body),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let review_id = body_json(res).await["id"].as_i64().expect("missing id");

    let res = send(
        &ctx.app,
        request(
            "DELETE",
            &format!("/reviews/review/{review_id}/"),
            Some(&other_token),
            Body::empty(),
        ),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    assert_eq!(review_count(&ctx.db, drink_id).await, 1);
}

#[tokio::test]
async fn review_with_image_round_trips() {
    let Some(ctx) = setup().await else { return };

    let (drink_id, _, _) = create_drink(&ctx).await;
    let (token, profile_id) = register(&ctx.app, &unique("taster_")).await;

    let drink_id_text = drink_id.to_string();
    let png = tiny_png();
    let body = multipart_body(
        &[
            ("rating", "5"),
            ("review_text", "bright citrus nose, clean finish"),
            ("drink_id", &drink_id_text),
        ],
        &[("image", "glass.png", &png)],
    );
    let res = send(
        &ctx.app,
        request("POST", "/reviews/review/", Some(&token), body),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let created = body_json(res).await;
    let review_id = created["id"].as_i64().expect("missing id");
    assert_eq!(created["rating"], 5);
    assert_eq!(created["profile_id"], profile_id);

    let res = send(
        &ctx.app,
        request(
            "GET",
            &format!("/reviews/review/{review_id}/"),
            None,
            Body::empty(),
        ),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let fetched = body_json(res).await;
    assert_eq!(fetched["review_text"], "bright citrus nose, clean finish");
    assert_eq!(fetched["drink_id"], drink_id);

    let res = send(
        &ctx.app,
        request(
            "GET",
            &format!("/reviews/images/?review={review_id}"),
            None,
            Body::empty(),
        ),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let images = body_json(res).await;
    assert_eq!(images["images"].as_array().expect("missing images").len(), 1);
}
