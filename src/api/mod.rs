pub mod auth;
pub mod books;
pub mod equipment;
pub mod error;
pub mod extract;
pub mod health;
pub mod loan;
pub mod search;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::infrastructure::AppState;

pub fn api_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Auth
        .route("/auth/signup", post(auth::signup))
        .route("/auth/login", post(auth::login))
        // Inventory groups
        .route("/books", get(books::list_books).post(books::create_book))
        .route("/books/search", get(search::search_books))
        .route("/books/categories", get(books::list_categories))
        .route("/books/companies", get(books::list_companies))
        .route("/books/group/:group_id", get(books::get_group))
        .route(
            "/books/:id",
            get(books::get_book)
                .put(books::update_book)
                .delete(books::delete_book),
        )
        .route(
            "/books/:id/copy",
            post(books::add_copy).put(books::update_copy_info),
        )
        .route("/books/:id/decrease-copy", post(books::decrease_copy))
        // The segment is a group id on this route
        .route("/books/:id/general", put(books::update_general_info))
        // Lending (authenticated)
        .route("/borrow", post(loan::borrow_book))
        .route("/return/:id", post(loan::return_book))
        .route("/history", get(loan::history))
        .route("/active", get(loan::active_borrows))
        .route("/borrower-names", get(loan::borrower_names))
        // Equipment
        .route(
            "/equipment",
            get(equipment::list_equipment).post(equipment::create_equipment),
        )
        .route(
            "/equipment/:id",
            get(equipment::get_equipment)
                .put(equipment::update_equipment)
                .delete(equipment::delete_equipment),
        )
        .with_state(state)
}
