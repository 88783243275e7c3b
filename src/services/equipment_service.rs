//! Equipment Service - plain CRUD over loanable equipment

use crate::domain::{DomainError, Equipment, EquipmentInput, EquipmentRepository};
use crate::utils::codes::{MAX_CODE_ATTEMPTS, generate_code};

pub const DEFAULT_STATUS: &str = "available";

async fn unique_code(equipment: &dyn EquipmentRepository) -> Result<String, DomainError> {
    for _ in 0..MAX_CODE_ATTEMPTS {
        let code = generate_code("EQ");
        if !equipment.code_exists(&code).await? {
            return Ok(code);
        }
    }
    Err(DomainError::Internal(
        "could not generate a unique equipment code".to_string(),
    ))
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub async fn create(
    equipment: &dyn EquipmentRepository,
    input: EquipmentInput,
) -> Result<Equipment, DomainError> {
    let description = trimmed(input.description)
        .ok_or_else(|| DomainError::validation("description is required"))?;

    let code = match trimmed(input.code) {
        Some(code) => {
            if equipment.code_exists(&code).await? {
                return Err(DomainError::Conflict(format!(
                    "Equipment code {} already exists",
                    code
                )));
            }
            code
        }
        None => unique_code(equipment).await?,
    };

    let item = equipment
        .create(
            code,
            description,
            trimmed(input.status).unwrap_or_else(|| DEFAULT_STATUS.to_string()),
            input.observations.unwrap_or_default(),
        )
        .await?;
    tracing::info!("Registered equipment {}", item.code);
    Ok(item)
}

pub async fn get(equipment: &dyn EquipmentRepository, id: i32) -> Result<Equipment, DomainError> {
    equipment
        .find_by_id(id)
        .await?
        .ok_or_else(|| DomainError::not_found("Equipment"))
}

pub async fn list(equipment: &dyn EquipmentRepository) -> Result<Vec<Equipment>, DomainError> {
    equipment.find_all().await
}

pub async fn update(
    equipment: &dyn EquipmentRepository,
    id: i32,
    mut input: EquipmentInput,
) -> Result<Equipment, DomainError> {
    let existing = get(equipment, id).await?;

    if let Some(description) = &input.description
        && description.trim().is_empty()
    {
        return Err(DomainError::validation("description cannot be empty"));
    }

    input.code = trimmed(input.code);
    if let Some(code) = &input.code
        && *code != existing.code
        && equipment.code_exists(code).await?
    {
        return Err(DomainError::Conflict(format!(
            "Equipment code {} already exists",
            code
        )));
    }

    equipment.update(id, input).await
}

pub async fn delete(equipment: &dyn EquipmentRepository, id: i32) -> Result<(), DomainError> {
    equipment.delete(id).await?;
    tracing::info!("Deleted equipment {}", id);
    Ok(())
}
