use axum::{
    routing::{delete, get, patch, post},
    Router,
};

use crate::handlers;

/// Конфигурация всех роутов приложения
pub fn configure_routes() -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        // ========================================
        // CUSTOMERS (HR)
        // ========================================
        .route(
            "/api/customers",
            get(handlers::customers::list_all).post(handlers::customers::create),
        )
        .route(
            "/api/customers/bulk-import",
            post(handlers::customers::bulk_import),
        )
        .route(
            "/api/customers/import-template",
            get(handlers::customers::import_template),
        )
        .route(
            "/api/customers/:id",
            patch(handlers::customers::update).delete(handlers::customers::delete),
        )
        // ========================================
        // OBJECTS & ZONES
        // ========================================
        .route(
            "/api/objects",
            get(handlers::objects::list_all).post(handlers::objects::create),
        )
        .route(
            "/api/zones",
            get(handlers::zones::list_all).post(handlers::zones::create),
        )
        .route("/api/zones/pin", patch(handlers::zones::pin))
        .route("/api/zones/:id", delete(handlers::zones::delete))
        // ========================================
        // INBOX: CHATS + TELEGRAM BRIDGE
        // ========================================
        .route(
            "/api/chats",
            get(handlers::chats::list_all).post(handlers::chats::create),
        )
        .route("/api/chats/:id", get(handlers::chats::get_by_id))
        .route("/api/chats/:id/messages", post(handlers::chats::post_message))
        .route("/api/telegram/webhook", post(handlers::telegram::webhook))
        // ========================================
        // DOCUMENTS
        // ========================================
        .route("/api/documents", get(handlers::documents::overview))
        .route("/api/documents/export", get(handlers::documents::export))
        .route("/api/documents/send", post(handlers::documents::send))
        .route(
            "/api/documents/templates",
            get(handlers::documents::list_templates).post(handlers::documents::create_template),
        )
        .route(
            "/api/documents/templates/:id",
            get(handlers::documents::get_template).put(handlers::documents::update_template),
        )
        .route(
            "/api/documents/:id",
            delete(handlers::documents::delete_template),
        )
        // ========================================
        // EXPENSES
        // ========================================
        .route(
            "/api/expenses",
            get(handlers::expenses::list_all).post(handlers::expenses::create),
        )
        .route("/api/expenses/:id", patch(handlers::expenses::update))
        // ========================================
        // RATES
        // ========================================
        .route("/api/rates/latest", get(handlers::rates::latest))
}
