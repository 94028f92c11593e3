pub mod db;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod order_number;
pub mod pricing;
pub mod schema;
pub mod validation;

use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use db::{create_pool, DbPool};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) {
    let mut conn = pool.get().expect("Failed to get DB connection for migrations");
    conn.run_pending_migrations(MIGRATIONS)
        .expect("Failed to run database migrations");
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::menu::list_menu,
        handlers::menu::menu_catalog,
        handlers::menu::list_categories,
        handlers::menu::list_all_menu,
        handlers::menu::get_menu_item,
        handlers::menu::create_menu_item,
        handlers::menu::update_menu_item,
        handlers::menu::delete_menu_item,
        handlers::orders::create_order,
        handlers::orders::list_orders,
        handlers::orders::get_order,
        handlers::orders::get_order_by_number,
        handlers::orders::get_orders_by_customer,
        handlers::orders::update_order_status,
        handlers::reservations::create_reservation,
        handlers::reservations::list_reservations,
        handlers::reservations::todays_reservations,
        handlers::reservations::upcoming_reservations,
        handlers::reservations::get_reservation,
        handlers::reservations::update_reservation,
        handlers::reservations::update_reservation_status,
        handlers::reservations::delete_reservation,
        handlers::site::get_settings,
        handlers::site::get_info,
        handlers::site::get_contact,
        handlers::site::get_social,
        handlers::site::get_all,
    ),
    components(schemas(
        handlers::menu::CreateMenuItemRequest,
        handlers::menu::MenuItemResponse,
        handlers::menu::MenuCatalogResponse,
        handlers::orders::CreateOrderRequest,
        handlers::orders::OrderItemRequest,
        handlers::orders::UpdateOrderStatusRequest,
        handlers::orders::OrderResponse,
        handlers::orders::OrderLineResponse,
        handlers::orders::ListOrdersResponse,
        handlers::reservations::CreateReservationRequest,
        handlers::reservations::UpdateReservationRequest,
        handlers::reservations::UpdateReservationStatusRequest,
        handlers::reservations::ReservationResponse,
        handlers::reservations::ListReservationsResponse,
    )),
    tags(
        (name = "menu", description = "Menu item management"),
        (name = "orders", description = "Order intake and tracking"),
        (name = "reservations", description = "Table reservations"),
        (name = "site", description = "Site settings and restaurant info"),
    )
)]
struct ApiDoc;

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    pool: DbPool,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    Ok(HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .wrap(Logger::default())
            .service(
                web::scope("/menu")
                    .route("", web::get().to(handlers::menu::list_menu))
                    .route("", web::post().to(handlers::menu::create_menu_item))
                    .route("/all", web::get().to(handlers::menu::menu_catalog))
                    .route("/categories", web::get().to(handlers::menu::list_categories))
                    .route("/admin/all", web::get().to(handlers::menu::list_all_menu))
                    .route("/{id}", web::get().to(handlers::menu::get_menu_item))
                    .route("/{id}", web::put().to(handlers::menu::update_menu_item))
                    .route("/{id}", web::delete().to(handlers::menu::delete_menu_item)),
            )
            .service(
                web::scope("/orders")
                    .route("", web::post().to(handlers::orders::create_order))
                    .route("", web::get().to(handlers::orders::list_orders))
                    .route(
                        "/number/{order_number}",
                        web::get().to(handlers::orders::get_order_by_number),
                    )
                    .route(
                        "/customer/{email}",
                        web::get().to(handlers::orders::get_orders_by_customer),
                    )
                    .route("/{id}", web::get().to(handlers::orders::get_order))
                    .route(
                        "/{id}/status",
                        web::patch().to(handlers::orders::update_order_status),
                    ),
            )
            .service(
                web::scope("/reservations")
                    .route("", web::post().to(handlers::reservations::create_reservation))
                    .route("", web::get().to(handlers::reservations::list_reservations))
                    .route(
                        "/today",
                        web::get().to(handlers::reservations::todays_reservations),
                    )
                    .route(
                        "/upcoming",
                        web::get().to(handlers::reservations::upcoming_reservations),
                    )
                    .route("/{id}", web::get().to(handlers::reservations::get_reservation))
                    .route(
                        "/{id}",
                        web::patch().to(handlers::reservations::update_reservation),
                    )
                    .route(
                        "/{id}",
                        web::delete().to(handlers::reservations::delete_reservation),
                    )
                    .route(
                        "/{id}/status",
                        web::patch().to(handlers::reservations::update_reservation_status),
                    ),
            )
            .service(
                web::scope("/site")
                    .route("/all", web::get().to(handlers::site::get_all))
                    .route("/info", web::get().to(handlers::site::get_info))
                    .route("/contact", web::get().to(handlers::site::get_contact))
                    .route("/social", web::get().to(handlers::site::get_social))
                    .route("/settings", web::get().to(handlers::site::get_settings)),
            )
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", ApiDoc::openapi()),
            )
    })
    .bind((host.to_string(), port))?
    .run())
}
