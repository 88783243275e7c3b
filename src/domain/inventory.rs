//! Inventory value types: copies, copy groups and the inputs that create or
//! patch them.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use super::DomainError;
use crate::utils::text::contains_ignore_case;

/// Fixed page size of the grouped book listing
pub const PAGE_SIZE: u64 = 12;

/// Maximum number of groups returned by a search
pub const SEARCH_LIMIT: usize = 10;

/// Availability of one physical copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CopyStatus {
    Available,
    Borrowed,
}

impl CopyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CopyStatus::Available => "available",
            CopyStatus::Borrowed => "borrowed",
        }
    }
}

impl FromStr for CopyStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "available" => Ok(CopyStatus::Available),
            "borrowed" => Ok(CopyStatus::Borrowed),
            other => Err(DomainError::validation(format!(
                "Invalid copy status '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    Good,
    Regular,
    Bad,
    New,
}

impl Condition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::Good => "good",
            Condition::Regular => "regular",
            Condition::Bad => "bad",
            Condition::New => "new",
        }
    }
}

impl FromStr for Condition {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "good" => Ok(Condition::Good),
            "regular" => Ok(Condition::Regular),
            "bad" => Ok(Condition::Bad),
            "new" => Ok(Condition::New),
            other => Err(DomainError::validation(format!(
                "Invalid condition '{}' (expected good, regular, bad or new)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoverType {
    Hard,
    Soft,
}

impl CoverType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CoverType::Hard => "hard",
            CoverType::Soft => "soft",
        }
    }
}

impl FromStr for CoverType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hard" => Ok(CoverType::Hard),
            "soft" => Ok(CoverType::Soft),
            other => Err(DomainError::validation(format!(
                "Invalid cover type '{}' (expected hard or soft)",
                other
            ))),
        }
    }
}

impl fmt::Display for CopyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One physical copy, as returned by the API.
///
/// `copies_count` is the cached size of the group. Listings overwrite it with a
/// freshly computed value; treat the stored one as a hint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookCopy {
    pub id: i32,
    pub code: String,
    pub group_id: String,
    pub title: String,
    pub author: String,
    pub editorial: String,
    pub edition: String,
    pub categories: Vec<String>,
    pub cover_type: CoverType,
    pub location: String,
    pub cost: f64,
    pub date_acquired: String,
    pub condition: Condition,
    pub observations: String,
    pub invoice_code: String,
    pub image_url: String,
    pub status: CopyStatus,
    pub company: String,
    pub copies_count: i64,
}

/// Fully validated copy ready to be inserted.
#[derive(Debug, Clone)]
pub struct NewCopy {
    pub code: String,
    pub group_id: String,
    pub title: String,
    pub author: String,
    pub editorial: String,
    pub edition: String,
    pub categories: Vec<String>,
    pub cover_type: CoverType,
    pub location: String,
    pub cost: f64,
    pub date_acquired: String,
    pub condition: Condition,
    pub observations: String,
    pub invoice_code: String,
    pub image_url: String,
    pub status: CopyStatus,
    pub company: String,
    pub copies_count: i64,
}

/// Partial update of copy documents. `None` leaves a field untouched.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CopyPatch {
    // Group-wide metadata
    pub title: Option<String>,
    pub author: Option<String>,
    pub editorial: Option<String>,
    pub edition: Option<String>,
    pub categories: Option<Vec<String>>,
    pub cover_type: Option<CoverType>,
    // Per-copy fields
    pub location: Option<String>,
    pub cost: Option<f64>,
    pub date_acquired: Option<String>,
    pub condition: Option<Condition>,
    pub observations: Option<String>,
    pub invoice_code: Option<String>,
    pub image_url: Option<String>,
    // Maintained by the services, never taken from requests
    pub status: Option<CopyStatus>,
    pub copies_count: Option<i64>,
}

impl CopyPatch {
    pub fn is_empty(&self) -> bool {
        *self == CopyPatch::default()
    }

    /// Split into the part shared by the whole group and the part local to one copy.
    pub fn split(self) -> (CopyPatch, CopyPatch) {
        let shared = CopyPatch {
            title: self.title,
            author: self.author,
            editorial: self.editorial,
            edition: self.edition,
            categories: self.categories,
            cover_type: self.cover_type,
            ..Default::default()
        };
        let local = CopyPatch {
            location: self.location,
            cost: self.cost,
            date_acquired: self.date_acquired,
            condition: self.condition,
            observations: self.observations,
            invoice_code: self.invoice_code,
            image_url: self.image_url,
            status: self.status,
            copies_count: self.copies_count,
            ..Default::default()
        };
        (shared, local)
    }

    pub fn copies_count(count: i64) -> Self {
        CopyPatch {
            copies_count: Some(count),
            ..Default::default()
        }
    }
}

/// Categories arrive either as a JSON array or as a comma separated string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CategoriesInput {
    Many(Vec<String>),
    One(String),
}

impl CategoriesInput {
    pub fn normalize(self) -> Vec<String> {
        let raw = match self {
            CategoriesInput::Many(values) => values,
            CategoriesInput::One(value) => value.split(',').map(str::to_string).collect(),
        };
        normalize_categories(raw)
    }
}

/// Trim, drop empty entries and deduplicate while keeping the first occurrence order.
pub fn normalize_categories(raw: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(raw.len());
    for value in raw {
        let value = value.trim();
        if !value.is_empty() && !out.iter().any(|c| c == value) {
            out.push(value.to_string());
        }
    }
    out
}

/// Request body shared by create-group, add-copy and the update endpoints.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CopyInput {
    pub title: Option<String>,
    pub author: Option<String>,
    pub editorial: Option<String>,
    pub edition: Option<String>,
    #[serde(alias = "category")]
    pub categories: Option<CategoriesInput>,
    pub cover_type: Option<String>,
    pub location: Option<String>,
    pub cost: Option<Value>,
    pub date_acquired: Option<String>,
    pub condition: Option<String>,
    pub observations: Option<String>,
    pub invoice_code: Option<String>,
    pub image_url: Option<String>,
    pub company: Option<String>,
}

fn required(value: Option<String>, field: &str) -> Result<String, DomainError> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(DomainError::validation(format!("{} is required", field))),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Accept a JSON number or a numeric string; round to cents.
pub fn parse_cost(value: &Value) -> Result<f64, DomainError> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed {
        Some(cost) if cost.is_finite() && cost >= 0.0 => Ok((cost * 100.0).round() / 100.0),
        Some(_) => Err(DomainError::validation("cost must be a non-negative amount")),
        None => Err(DomainError::validation("cost must be numeric")),
    }
}

fn parse_date(value: &str) -> Result<String, DomainError> {
    crate::utils::dates::parse_timestamp(value)
        .map(crate::utils::dates::format_timestamp)
        .ok_or_else(|| DomainError::validation(format!("Invalid date '{}'", value)))
}

impl CopyInput {
    /// Validate a create-group request. Code and group id are assigned by the caller.
    pub fn into_new_copy(
        self,
        code: String,
        group_id: String,
        now: &str,
    ) -> Result<NewCopy, DomainError> {
        let title = required(self.title, "title")?;
        let author = required(self.author, "author")?;
        let company = required(self.company, "company")?;
        let cost = match &self.cost {
            Some(v) if !v.is_null() => parse_cost(v)?,
            _ => return Err(DomainError::validation("cost is required")),
        };
        let condition: Condition = required(self.condition, "condition")?.parse()?;
        let cover_type: CoverType = required(self.cover_type, "coverType")?.parse()?;
        let date_acquired = match non_blank(self.date_acquired) {
            Some(d) => parse_date(&d)?,
            None => now.to_string(),
        };

        Ok(NewCopy {
            code,
            group_id,
            title,
            author,
            editorial: self.editorial.unwrap_or_default().trim().to_string(),
            edition: self.edition.unwrap_or_default().trim().to_string(),
            categories: self.categories.map(CategoriesInput::normalize).unwrap_or_default(),
            cover_type,
            location: self.location.unwrap_or_default().trim().to_string(),
            cost,
            date_acquired,
            condition,
            observations: self.observations.unwrap_or_default(),
            invoice_code: self.invoice_code.unwrap_or_default().trim().to_string(),
            image_url: self.image_url.unwrap_or_default().trim().to_string(),
            status: CopyStatus::Available,
            company,
            copies_count: 1,
        })
    }

    /// Build a new copy of `source`'s group. Title, author, editorial and edition
    /// always come from the source; every other field may be overridden.
    pub fn into_copy_of(
        self,
        source: &BookCopy,
        code: String,
        now: &str,
    ) -> Result<NewCopy, DomainError> {
        let cost = match &self.cost {
            Some(v) if !v.is_null() => parse_cost(v)?,
            _ => source.cost,
        };
        let condition = match non_blank(self.condition) {
            Some(c) => c.parse()?,
            None => source.condition,
        };
        let cover_type = match non_blank(self.cover_type) {
            Some(c) => c.parse()?,
            None => source.cover_type,
        };

        Ok(NewCopy {
            code,
            group_id: source.group_id.clone(),
            title: source.title.clone(),
            author: source.author.clone(),
            editorial: source.editorial.clone(),
            edition: source.edition.clone(),
            categories: self
                .categories
                .map(CategoriesInput::normalize)
                .unwrap_or_else(|| source.categories.clone()),
            cover_type,
            location: non_blank(self.location).unwrap_or_else(|| source.location.clone()),
            cost,
            date_acquired: now.to_string(),
            condition,
            observations: self
                .observations
                .unwrap_or_else(|| source.observations.clone()),
            invoice_code: non_blank(self.invoice_code)
                .unwrap_or_else(|| source.invoice_code.clone()),
            image_url: non_blank(self.image_url).unwrap_or_else(|| source.image_url.clone()),
            status: CopyStatus::Available,
            company: non_blank(self.company).unwrap_or_else(|| source.company.clone()),
            copies_count: source.copies_count,
        })
    }

    /// Validate an update request into a patch. Required fields may not be blanked.
    pub fn into_patch(self) -> Result<CopyPatch, DomainError> {
        fn keep_required(value: Option<String>, field: &str) -> Result<Option<String>, DomainError> {
            match value {
                Some(v) if v.trim().is_empty() => {
                    Err(DomainError::validation(format!("{} cannot be empty", field)))
                }
                Some(v) => Ok(Some(v.trim().to_string())),
                None => Ok(None),
            }
        }

        Ok(CopyPatch {
            title: keep_required(self.title, "title")?,
            author: keep_required(self.author, "author")?,
            editorial: self.editorial.map(|v| v.trim().to_string()),
            edition: self.edition.map(|v| v.trim().to_string()),
            categories: self.categories.map(CategoriesInput::normalize),
            cover_type: non_blank(self.cover_type).map(|c| c.parse()).transpose()?,
            location: self.location.map(|v| v.trim().to_string()),
            cost: match &self.cost {
                Some(v) if !v.is_null() => Some(parse_cost(v)?),
                _ => None,
            },
            date_acquired: non_blank(self.date_acquired)
                .map(|d| parse_date(&d))
                .transpose()?,
            condition: non_blank(self.condition).map(|c| c.parse()).transpose()?,
            observations: self.observations,
            invoice_code: self.invoice_code.map(|v| v.trim().to_string()),
            image_url: self.image_url.map(|v| v.trim().to_string()),
            status: None,
            copies_count: None,
        })
    }
}

/// Filter applied to copies before grouping.
#[derive(Debug, Default, Clone)]
pub struct CopyFilter {
    pub company: Option<String>,
    /// Case-insensitive substring over title, author and code
    pub search: Option<String>,
    /// Any-of category membership
    pub categories: Vec<String>,
}

impl CopyFilter {
    /// Whether `copy` satisfies the free-text search, if any.
    pub fn matches_search(&self, copy: &BookCopy) -> bool {
        match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(q) => [&copy.title, &copy.author, &copy.code]
                .iter()
                .any(|field| contains_ignore_case(field, q)),
        }
    }
}

/// Group matched copies: the first copy seen for a group is its representative
/// and its `copies_count` becomes the number of matched copies in that group.
/// Groups come back sorted by title, ties broken by group id.
pub fn group_copies(copies: Vec<BookCopy>) -> Vec<BookCopy> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<BookCopy> = Vec::new();

    for copy in copies {
        match index.get(&copy.group_id) {
            Some(&i) => groups[i].copies_count += 1,
            None => {
                index.insert(copy.group_id.clone(), groups.len());
                groups.push(BookCopy {
                    copies_count: 1,
                    ..copy
                });
            }
        }
    }

    groups.sort_by(|a, b| {
        a.title
            .to_lowercase()
            .cmp(&b.title.to_lowercase())
            .then_with(|| a.group_id.cmp(&b.group_id))
    });
    groups
}

/// One page of a listing, 1-based.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub current_page: u64,
    pub total_pages: u64,
    pub total_items: u64,
}

pub fn paginate<T>(items: Vec<T>, page: u64, page_size: u64) -> Page<T> {
    let page = page.max(1);
    let total_items = items.len() as u64;
    let total_pages = total_items.div_ceil(page_size);
    let skip = usize::try_from((page - 1).saturating_mul(page_size)).unwrap_or(usize::MAX);
    let take = usize::try_from(page_size).unwrap_or(usize::MAX);

    Page {
        items: items
            .into_iter()
            .skip(skip)
            .take(take)
            .collect(),
        current_page: page,
        total_pages,
        total_items,
    }
}

/// A group with every member copy.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupView {
    #[serde(flatten)]
    pub representative: BookCopy,
    pub copies: Vec<BookCopy>,
}

impl GroupView {
    pub fn new(representative: BookCopy, copies: Vec<BookCopy>) -> Self {
        let mut representative = representative;
        representative.copies_count = copies.len() as i64;
        Self {
            representative,
            copies,
        }
    }
}

/// Copy reference exposed by search results.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableCopy {
    pub id: i32,
    pub code: String,
    pub condition: Condition,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    #[serde(flatten)]
    pub representative: BookCopy,
    pub available_copies: Vec<AvailableCopy>,
}

/// Outcome of removing one copy.
#[derive(Debug, Clone)]
pub enum Removal {
    /// The group still has copies; carries the refreshed group.
    Decreased(GroupView),
    /// The last copy was removed and the whole group deleted.
    GroupDeleted { group_id: String, deleted: u64 },
}
