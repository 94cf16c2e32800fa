use actix_web::{HttpResponse, web};

use crate::handlers;

pub fn scoped_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .service(web::resource("/register").route(web::post().to(handlers::auth::register)))
            .service(web::resource("/login").route(web::post().to(handlers::auth::login))),
    )
    .service(
        web::scope("/users")
            .service(
                web::resource("")
                    .route(web::get().to(handlers::users::index))
                    .route(web::head().to(HttpResponse::MethodNotAllowed)),
            )
            .service(
                web::resource("/{id}/toggle-active")
                    .route(web::patch().to(handlers::users::toggle_user_active)),
            ),
    )
    .service(
        web::scope("/projects")
            .service(
                web::resource("")
                    .route(web::get().to(handlers::projects::index))
                    .route(web::post().to(handlers::projects::create)),
            )
            .service(web::resource("/all").route(web::get().to(handlers::projects::all)))
            .service(
                web::resource("/{id}")
                    .route(web::get().to(handlers::projects::get_project))
                    .route(web::put().to(handlers::projects::update))
                    .route(web::delete().to(handlers::projects::delete)),
            ),
    )
    .service(
        web::scope("/donations")
            .service(
                web::resource("")
                    .route(web::get().to(handlers::donations::all))
                    .route(web::post().to(handlers::donations::create)),
            )
            .service(web::resource("/mine").route(web::get().to(handlers::donations::mine)))
            .service(
                web::resource("/{id}").route(web::get().to(handlers::donations::get_donation)),
            )
            .service(
                web::resource("/{id}/receipt")
                    .route(web::post().to(handlers::donations::submit_receipt)),
            )
            .service(
                web::resource("/{id}/verify").route(web::post().to(handlers::donations::verify)),
            ),
    )
    .service(
        web::scope("/payments").service(
            web::resource("/{donation_id}")
                .route(web::get().to(handlers::payments::get_by_donation)),
        ),
    )
    .service(
        web::scope("/config").service(
            web::resource("/{key}")
                .route(web::get().to(handlers::config::get_config))
                .route(web::put().to(handlers::config::set_config)),
        ),
    )
    .service(web::resource("/webhooks/whop").route(web::post().to(handlers::webhooks::whop)))
    .service(
        web::resource("/whatsapp-webhook").route(web::post().to(handlers::webhooks::whatsapp)),
    );
}
