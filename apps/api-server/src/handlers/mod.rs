//! HTTP handlers and route configuration.

mod auth;
mod buildings;
mod health;
mod posts;
mod users;

use actix_web::web;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            // Public routes
            .route("/health", web::get().to(health::health_check))
            .route("/buildings", web::get().to(buildings::list_buildings))
            // Auth routes
            .service(
                web::scope("/auth")
                    .route("/register", web::post().to(auth::register))
                    .route("/login", web::post().to(auth::login))
                    .route("/me", web::get().to(auth::me)),
            )
            // Account routes
            .service(
                web::scope("/users")
                    .route("", web::get().to(users::list_users))
                    .route("/profile", web::put().to(users::update_profile))
                    .route("/profile", web::delete().to(users::deactivate))
                    .route("/{id}", web::get().to(users::get_user)),
            )
            // Post routes
            .service(
                web::scope("/posts")
                    .route("", web::post().to(posts::create_post))
                    .route("", web::get().to(posts::list_posts))
                    .route("/user/{userId}", web::get().to(posts::list_by_user))
                    .route("/{id}", web::get().to(posts::get_post))
                    .route("/{id}", web::put().to(posts::update_post))
                    .route("/{id}", web::delete().to(posts::delete_post))
                    .route("/{id}/flag", web::put().to(posts::flag_post))
                    .route("/{id}/expire", web::put().to(posts::expire_post)),
            ),
    );
}
