// Copyright (c) Fizzgrid Team
// SPDX-License-Identifier: Apache-2.0

pub mod form;
mod handlers;

use crate::config::Config;
use crate::db::Database;
use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Build the application router.
pub fn build_router(db: Arc<Database>) -> Router {
    let config = Config::get();

    Router::new()
        // General routes
        .route("/health", get(handlers::health::health_check))
        // Drink routes
        .route("/drinks/", get(handlers::drinks::list_drinks))
        .route("/drinks/drink/", post(handlers::drinks::create_drink))
        .route(
            "/drinks/drink/:drink_id/",
            get(handlers::drinks::get_drink).delete(handlers::drinks::delete_drink),
        )
        .route(
            "/drinks/drink/:drink_id/favorite/",
            post(handlers::favorites::create_favorite)
                .delete(handlers::favorites::delete_favorite),
        )
        .route("/drinks/images/", get(handlers::drinks::list_drink_images))
        .route("/drinks/favorites/", get(handlers::favorites::list_favorites))
        // Profile routes
        .route("/profiles/", get(handlers::profiles::list_profiles))
        .route("/profiles/login/", post(handlers::profiles::login))
        .route("/profiles/logout/", post(handlers::profiles::logout))
        .route(
            "/profiles/profile/",
            get(handlers::profiles::get_self)
                .post(handlers::profiles::register)
                .put(handlers::profiles::update_self)
                .delete(handlers::profiles::delete_self),
        )
        .route(
            "/profiles/profile/:profile_id/",
            get(handlers::profiles::get_profile),
        )
        .route(
            "/profiles/profile/:profile_id/follow/",
            post(handlers::follows::create_follow).delete(handlers::follows::delete_follow),
        )
        .route("/profiles/follows/", get(handlers::follows::list_follows))
        // Review routes
        .route("/reviews/", get(handlers::reviews::list_reviews))
        .route("/reviews/review/", post(handlers::reviews::create_review))
        .route(
            "/reviews/review/:review_id/",
            get(handlers::reviews::get_review).delete(handlers::reviews::delete_review),
        )
        .route(
            "/reviews/review/:review_id/like/",
            post(handlers::likes::create_review_like)
                .delete(handlers::likes::delete_review_like),
        )
        .route("/reviews/comment/", post(handlers::comments::create_comment))
        .route(
            "/reviews/comment/:comment_id/",
            get(handlers::comments::get_comment).delete(handlers::comments::delete_comment),
        )
        .route(
            "/reviews/comment/:comment_id/like/",
            post(handlers::likes::create_comment_like)
                .delete(handlers::likes::delete_comment_like),
        )
        .route("/reviews/images/", get(handlers::reviews::list_review_images))
        .route("/reviews/comments/", get(handlers::comments::list_comments))
        .route(
            "/reviews/review-likes/",
            get(handlers::likes::list_review_likes),
        )
        .route(
            "/reviews/comment-likes/",
            get(handlers::likes::list_comment_likes),
        )
        // Stored media files
        .nest_service(
            config.media.base_url.trim_end_matches('/'),
            ServeDir::new(&config.media.root),
        )
        .with_state(db)
}

/// Start the API server
pub async fn start_api_server(db: Arc<Database>) -> Result<()> {
    let config = Config::get();

    // Set up CORS
    let cors = if config.api.enable_cors {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        CorsLayer::permissive()
    };

    let app = build_router(db)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let addr = format!("{}:{}", config.api.host, config.api.port).parse::<SocketAddr>()?;

    info!("Starting API server on {}", addr);
    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await?;

    Ok(())
}
