//! Inventory Service - copy groups over denormalised copy documents
//!
//! A logical book is every copy sharing a `group_id`. Group metadata is
//! duplicated on each copy, so every write that touches it (general info,
//! cached copy count) goes through `CopyRepository::update_group`.

use std::collections::HashMap;

use uuid::Uuid;

use crate::domain::{
    AvailableCopy, BookCopy, CopyFilter, CopyInput, CopyPatch, CopyRepository, DomainError, GroupView, Page,
    PAGE_SIZE, Removal, SEARCH_LIMIT, SearchHit, group_copies, paginate,
};
use crate::utils::codes::{MAX_CODE_ATTEMPTS, generate_code};
use crate::utils::dates::now_timestamp;

async fn unique_code(copies: &dyn CopyRepository) -> Result<String, DomainError> {
    for _ in 0..MAX_CODE_ATTEMPTS {
        let code = generate_code("BOOK");
        if copies.find_by_code(&code).await?.is_none() {
            return Ok(code);
        }
        tracing::warn!("Copy code collision on {}, retrying", code);
    }
    Err(DomainError::Internal(
        "could not generate a unique copy code".to_string(),
    ))
}

/// Recount the group and write the count onto every member.
///
/// Read-then-write: a concurrent add/remove may leave a stale count behind
/// until the next recompute.
pub async fn refresh_copies_count(
    copies: &dyn CopyRepository,
    group_id: &str,
) -> Result<i64, DomainError> {
    let count = copies.count_group(group_id).await? as i64;
    copies
        .update_group(group_id, &CopyPatch::copies_count(count))
        .await?;
    Ok(count)
}

/// Create a new group with a single copy
pub async fn create_group(
    copies: &dyn CopyRepository,
    input: CopyInput,
) -> Result<BookCopy, DomainError> {
    let code = unique_code(copies).await?;
    let group_id = Uuid::new_v4().to_string();
    let new_copy = input.into_new_copy(code, group_id, &now_timestamp())?;

    let copy = copies.create(new_copy).await?;
    tracing::info!(
        "Created group {} ('{}') with copy {}",
        copy.group_id,
        copy.title,
        copy.code
    );
    Ok(copy)
}

/// Add a copy to the group of `source_id`
pub async fn add_copy(
    copies: &dyn CopyRepository,
    source_id: i32,
    input: CopyInput,
) -> Result<BookCopy, DomainError> {
    let source = copies
        .find_by_id(source_id)
        .await?
        .ok_or_else(|| DomainError::not_found("Book"))?;

    let code = unique_code(copies).await?;
    let new_copy = input.into_copy_of(&source, code, &now_timestamp())?;
    let created = copies.create(new_copy).await?;

    let count = refresh_copies_count(copies, &created.group_id).await?;
    tracing::info!(
        "Added copy {} to group {} ({} copies)",
        created.code,
        created.group_id,
        count
    );

    Ok(BookCopy {
        copies_count: count,
        ..created
    })
}

async fn remove_from_group(
    copies: &dyn CopyRepository,
    target: &BookCopy,
) -> Result<Removal, DomainError> {
    let group_size = copies.count_group(&target.group_id).await?;

    // Never leave a group behind with no copies
    if group_size <= 1 {
        let deleted = copies.delete_group(&target.group_id).await?;
        tracing::info!(
            "Removed last copy {}; group {} deleted ({} documents)",
            target.code,
            target.group_id,
            deleted
        );
        return Ok(Removal::GroupDeleted {
            group_id: target.group_id.clone(),
            deleted,
        });
    }

    copies.delete(target.id).await?;
    refresh_copies_count(copies, &target.group_id).await?;
    tracing::info!("Removed copy {} from group {}", target.code, target.group_id);

    let members = copies.find_group(&target.group_id).await?;
    match members.first().cloned() {
        Some(representative) => Ok(Removal::Decreased(GroupView::new(representative, members))),
        // Emptied concurrently by another request
        None => Ok(Removal::GroupDeleted {
            group_id: target.group_id.clone(),
            deleted: 1,
        }),
    }
}

/// Delete exactly one copy; the last copy takes its group with it
pub async fn remove_copy(copies: &dyn CopyRepository, id: i32) -> Result<Removal, DomainError> {
    let target = copies
        .find_by_id(id)
        .await?
        .ok_or_else(|| DomainError::not_found("Book"))?;
    remove_from_group(copies, &target).await
}

/// Remove one copy from the group represented by `representative_id`.
/// `copy_id` selects a specific member; without it the representative goes.
pub async fn decrease_copy(
    copies: &dyn CopyRepository,
    representative_id: i32,
    copy_id: Option<i32>,
) -> Result<Removal, DomainError> {
    let representative = copies
        .find_by_id(representative_id)
        .await?
        .ok_or_else(|| DomainError::not_found("Book"))?;

    let target = match copy_id {
        Some(copy_id) if copy_id != representative.id => {
            let copy = copies
                .find_by_id(copy_id)
                .await?
                .ok_or_else(|| DomainError::not_found("Book copy"))?;
            if copy.group_id != representative.group_id {
                return Err(DomainError::NotFound(
                    "Book copy not found in this group".to_string(),
                ));
            }
            copy
        }
        _ => representative,
    };

    remove_from_group(copies, &target).await
}

/// Group view anchored on a representative copy
pub async fn get_group(copies: &dyn CopyRepository, id: i32) -> Result<GroupView, DomainError> {
    let representative = copies
        .find_by_id(id)
        .await?
        .ok_or_else(|| DomainError::not_found("Book"))?;
    let members = copies.find_group(&representative.group_id).await?;
    Ok(GroupView::new(representative, members))
}

pub async fn get_group_by_group_id(
    copies: &dyn CopyRepository,
    group_id: &str,
) -> Result<GroupView, DomainError> {
    let members = copies.find_group(group_id).await?;
    let representative = members
        .first()
        .cloned()
        .ok_or_else(|| DomainError::not_found("Book group"))?;
    Ok(GroupView::new(representative, members))
}

/// Paginated, grouped listing for one tenant
pub async fn list_groups(
    copies: &dyn CopyRepository,
    company: Option<&str>,
    search: Option<&str>,
    categories: Vec<String>,
    page: u64,
) -> Result<Page<BookCopy>, DomainError> {
    let company = company
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .ok_or_else(|| DomainError::validation("company is required"))?;

    let filter = CopyFilter {
        company: Some(company.to_string()),
        search: search.map(str::to_string),
        categories,
    };

    let matched = copies.find_matching(&filter).await?;
    let groups = group_copies(matched);
    Ok(paginate(groups, page, PAGE_SIZE))
}

/// Up to ten groups matching `q`, each with its available copies
pub async fn search(
    copies: &dyn CopyRepository,
    q: Option<&str>,
    company: Option<&str>,
) -> Result<Vec<SearchHit>, DomainError> {
    let q = match q.map(str::trim) {
        Some(q) if !q.is_empty() => q,
        _ => return Ok(Vec::new()),
    };

    let filter = CopyFilter {
        company: company
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string),
        search: Some(q.to_string()),
        categories: Vec::new(),
    };

    let mut groups = group_copies(copies.find_matching(&filter).await?);
    groups.truncate(SEARCH_LIMIT);

    let group_ids: Vec<String> = groups.iter().map(|g| g.group_id.clone()).collect();
    let mut available: HashMap<String, Vec<AvailableCopy>> = HashMap::new();
    for copy in copies.find_available_in_groups(&group_ids).await? {
        available
            .entry(copy.group_id.clone())
            .or_default()
            .push(AvailableCopy {
                id: copy.id,
                code: copy.code,
                condition: copy.condition,
            });
    }

    Ok(groups
        .into_iter()
        .map(|representative| SearchHit {
            available_copies: available
                .remove(&representative.group_id)
                .unwrap_or_default(),
            representative,
        })
        .collect())
}

/// Patch the shared metadata of every copy in a group.
/// Returns the number of copies touched and the refreshed group.
pub async fn update_general_info(
    copies: &dyn CopyRepository,
    group_id: &str,
    input: CopyInput,
) -> Result<(u64, GroupView), DomainError> {
    let (mut shared, local) = input.into_patch()?.split();
    // The cover image is also accepted as group metadata
    shared.image_url = local.image_url;
    if shared.is_empty() {
        return Err(DomainError::validation(
            "Nothing to update: expected title, author, editorial, edition, categories, coverType or imageUrl",
        ));
    }

    if copies.count_group(group_id).await? == 0 {
        return Err(DomainError::not_found("Book group"));
    }

    let updated = copies.update_group(group_id, &shared).await?;
    tracing::info!("Updated general info of group {} ({} copies)", group_id, updated);

    let view = get_group_by_group_id(copies, group_id).await?;
    Ok((updated, view))
}

/// Patch the per-copy fields of a single copy
pub async fn update_copy_info(
    copies: &dyn CopyRepository,
    id: i32,
    input: CopyInput,
) -> Result<BookCopy, DomainError> {
    let (shared, local) = input.into_patch()?.split();
    if !shared.is_empty() {
        return Err(DomainError::validation(
            "Group fields must be changed through the general info endpoint",
        ));
    }
    if local.is_empty() {
        return Err(DomainError::validation("Nothing to update"));
    }

    copies.update(id, &local).await
}

/// Patch one copy; any group metadata in the patch is applied group-wide
pub async fn update_book(
    copies: &dyn CopyRepository,
    id: i32,
    input: CopyInput,
) -> Result<BookCopy, DomainError> {
    let patch = input.into_patch()?;
    if patch.is_empty() {
        return Err(DomainError::validation("Nothing to update"));
    }

    let existing = copies
        .find_by_id(id)
        .await?
        .ok_or_else(|| DomainError::not_found("Book"))?;

    let (shared, local) = patch.split();
    if !shared.is_empty() {
        copies.update_group(&existing.group_id, &shared).await?;
    }
    copies.update(id, &local).await
}

pub async fn categories(copies: &dyn CopyRepository) -> Result<Vec<String>, DomainError> {
    copies.distinct_categories().await
}

pub async fn companies(copies: &dyn CopyRepository) -> Result<Vec<String>, DomainError> {
    copies.distinct_companies().await
}
