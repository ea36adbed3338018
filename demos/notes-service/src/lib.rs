pub mod dtos;
pub mod handlers;

use api_kit::{MethodRouter, Result, RouteTable};

/// The service's full route table. Shared by the HTTP server and the schema
/// generator binary.
pub fn routes() -> Result<RouteTable> {
    let notes = RouteTable::new()
        .named_methods(
            "notes",
            "notes",
            MethodRouter::builder()
                .route(handlers::list_notes())
                .route(handlers::create_note())
                .build()?,
        )
        .named_methods(
            "notes/{id:int}",
            "note-detail",
            MethodRouter::builder()
                .route(handlers::get_note())
                .route(handlers::delete_note())
                .build()?,
        )
        .route("notes/{id:int}/publish", handlers::publish_note());

    Ok(RouteTable::new().include("api", notes))
}
