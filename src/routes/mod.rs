pub mod items;
pub mod todos;

use actix_cors::Cors;
use actix_web::{get, middleware::Logger, web, HttpResponse, Responder};
use serde_json::json;

use crate::error::{json_error_handler, path_error_handler, query_error_handler};
use crate::state::AppState;

#[get("/")]
async fn index() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "message": "Items and Todos CRUD API",
        "version": env!("CARGO_PKG_VERSION"),
        "database": "SQLite",
        "endpoints": {
            "items": {
                "Create": "POST /items",
                "Read All": "GET /items",
                "Read One": "GET /items/{id}",
                "Update": "PUT /items/{id}",
                "Delete": "DELETE /items/{id}",
                "Search": "GET /items/search",
                "Stats": "GET /items/stats/count"
            },
            "todos": {
                "Create": "POST /todos",
                "Read All": "GET /todos",
                "Read One": "GET /todos/{id}",
                "Update": "PUT /todos/{id}",
                "Delete": "DELETE /todos/{id}",
                "Toggle": "POST /todos/{id}/toggle",
                "Stats": "GET /todos/stats",
                "Search": "GET /todos/search",
                "By Priority": "GET /todos/priority/{n}",
                "Delete Completed": "DELETE /todos/completed"
            }
        }
    }))
}

/// Everything the service needs registered on an actix app: shared state,
/// extractor error mapping, middleware and both resources.
pub fn configure(
    state: web::Data<AppState>,
) -> impl FnOnce(&mut web::ServiceConfig) + Send + Clone + 'static {
    move |cfg: &mut web::ServiceConfig| {
        cfg.app_data(state)
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .app_data(web::QueryConfig::default().error_handler(query_error_handler))
            .app_data(web::PathConfig::default().error_handler(path_error_handler))
            .service(
                web::scope("")
                    .wrap(
                        Cors::default()
                            .allow_any_origin()
                            .allow_any_method()
                            .allow_any_header(),
                    )
                    .wrap(Logger::default())
                    .service(index)
                    .configure(items::configure)
                    .configure(todos::configure),
            );
    }
}
