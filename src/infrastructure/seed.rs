//! Demo data for local development (`SEED_DEMO`)

use serde_json::json;

use crate::domain::{CopyFilter, CopyInput, DomainError, NewUser};
use crate::infrastructure::AppState;
use crate::infrastructure::auth::hash_password;
use crate::services::inventory_service;

pub const DEMO_COMPANY: &str = "demo";
pub const DEMO_EMAIL: &str = "admin@demo.local";

const DEMO_BOOKS: &[(&str, &str, &str, usize)] = &[
    ("Cien años de soledad", "Gabriel García Márquez", "novel", 3),
    ("Don Quijote de la Mancha", "Miguel de Cervantes", "classic", 2),
    ("Ficciones", "Jorge Luis Borges", "short stories", 1),
];

/// Create the demo account and a few groups. Runs once: an existing demo
/// account leaves the store untouched.
pub async fn seed_demo_data(state: &AppState) -> Result<(), DomainError> {
    if state.user_repo.exists("admin", DEMO_EMAIL).await? {
        tracing::debug!("Demo data already present, skipping seed");
        return Ok(());
    }

    let password_hash = hash_password("admin123").map_err(DomainError::Internal)?;
    state
        .user_repo
        .create(NewUser {
            username: "admin".to_string(),
            email: DEMO_EMAIL.to_string(),
            password_hash,
            company: DEMO_COMPANY.to_string(),
            role: "admin".to_string(),
        })
        .await?;

    let existing = state
        .copy_repo
        .find_matching(&CopyFilter {
            company: Some(DEMO_COMPANY.to_string()),
            ..Default::default()
        })
        .await?;

    if existing.is_empty() {
        for (title, author, category, copies) in DEMO_BOOKS {
            let input: CopyInput = serde_json::from_value(json!({
                "title": title,
                "author": author,
                "categories": [category],
                "cost": 15.5,
                "condition": "good",
                "coverType": "soft",
                "company": DEMO_COMPANY,
            }))
            .map_err(|e| DomainError::Internal(e.to_string()))?;

            let first = inventory_service::create_group(state.copy_repo.as_ref(), input).await?;
            for _ in 1..*copies {
                inventory_service::add_copy(
                    state.copy_repo.as_ref(),
                    first.id,
                    CopyInput::default(),
                )
                .await?;
            }
        }
    }

    tracing::info!("Seeded demo data for company '{}'", DEMO_COMPANY);
    Ok(())
}
