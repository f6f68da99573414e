//! Content endpoints.

use axum::{
    Router,
    extract::{Path, Query, State},
    routing::get,
};
use chrono::{DateTime, Utc};
use folio_common::{AppError, AppResult, FileKind};
use folio_core::{
    ContentService,
    content::{Content, ContentError, ContentType, ContentTypeExt, Field},
    display::DisplayContext,
};
use folio_db::criteria::{Criteria, CriteriaItem};
use serde::{Deserialize, Serialize};
use tracing::warn;
use validator::Validate;

use crate::{
    middleware::AppState,
    response::{ApiResponse, PageMeta},
};

/// Published content object.
#[derive(Debug, Serialize)]
pub struct ContentResponse {
    pub id: i32,
    #[serde(rename = "type")]
    pub content_type: ContentType,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teaser: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media: Option<MediaResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub byline: Option<BylineResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<i32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counter: Option<i32>,
    pub submission_time: Option<DateTime<Utc>>,
    pub handler: &'static str,
    pub template: &'static str,
}

/// Attached media file.
#[derive(Debug, Serialize)]
pub struct MediaResponse {
    pub url: String,
    pub format: Option<String>,
    pub file_size: i64,
    /// File size in readable units.
    pub size: String,
}

/// Authorship and licensing.
#[derive(Debug, Serialize)]
pub struct BylineResponse {
    pub creator: Option<String>,
    pub date: Option<String>,
    pub language: Option<String>,
    pub rights: String,
    pub publisher: Option<String>,
}

fn non_empty(text: String) -> Option<String> {
    if text.is_empty() { None } else { Some(text) }
}

impl ContentResponse {
    /// Build the response with every text field escaped for display.
    #[must_use]
    pub fn from_content(content: &Content, state: &AppState) -> Self {
        let view = |field| non_empty(content.escape_for_xss(field, DisplayContext::View));
        let readable = |field| non_empty(content.human_readable(field));

        let media = content.media_file().and_then(|file| {
            file.media().map(|name| MediaResponse {
                url: state.storage.public_url(FileKind::Media, name),
                format: file.format().map(ToString::to_string),
                file_size: file.file_size(),
                size: content.human_readable(Field::FileSize),
            })
        });

        let byline = content.byline().map(|_| BylineResponse {
            creator: view(Field::Creator),
            date: readable(Field::Date),
            language: readable(Field::Language),
            rights: content.human_readable(Field::Rights),
            publisher: view(Field::Publisher),
        });

        let content_type = content.content_type();
        Self {
            id: content.id(),
            content_type,
            title: content.escape_for_xss(Field::Title, DisplayContext::View),
            teaser: view(Field::Teaser),
            description: view(Field::Description),
            image_url: content
                .image()
                .map(|name| state.storage.public_url(FileKind::Image, name)),
            caption: view(Field::Caption),
            media,
            byline,
            parent: content.parent().filter(|p| *p > 0),
            tags: content.tags().map(|tags| tags.iter().copied().collect()),
            counter: content.listing().map(|l| l.counter()),
            submission_time: content.submission_time(),
            handler: content_type.handler(),
            template: content_type.template(),
        }
    }
}

/// Listing request.
#[derive(Debug, Deserialize, Validate)]
pub struct ListQuery {
    /// Type name, e.g. `Article`.
    #[serde(rename = "type")]
    pub content_type: Option<String>,
    #[validate(range(min = 1))]
    pub tag: Option<i32>,
    #[validate(range(min = 1))]
    #[serde(default = "first_page")]
    pub page: u64,
}

const fn first_page() -> u64 {
    1
}

/// Type entry for `/types`.
#[derive(Debug, Serialize)]
pub struct TypeResponse {
    #[serde(rename = "type")]
    pub content_type: ContentType,
    pub name: &'static str,
    pub icon: &'static str,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/{id}", get(show))
}

/// Show one published object and count the view.
async fn show(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<ApiResponse<ContentResponse>> {
    let content = state
        .content_service
        .get_object(id)
        .await?
        .filter(|c| c.online() && c.content_type() != ContentType::Block)
        .ok_or(AppError::ContentNotFound(id))?;

    if let Err(err) = state.content_service.update_counter(id).await {
        warn!(id, error = %err, "Failed to count view");
    }

    Ok(ApiResponse::ok(ContentResponse::from_content(&content, &state)))
}

/// Page through published objects, newest first.
async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<ApiResponse<Vec<ContentResponse>>> {
    query.validate()?;

    let mut criteria = Criteria::new().add(CriteriaItem::online());
    criteria = match query.content_type.as_deref() {
        Some(name) => {
            let content_type: ContentType = name.parse().map_err(ContentError::from)?;
            criteria.add(CriteriaItem::of_type(content_type))
        }
        None => criteria.add(CriteriaItem::not_type(ContentType::Block)),
    };
    if let Some(tag) = query.tag {
        criteria = criteria.tags([tag]);
    }

    let page_size = state.site.page_size;
    let total = state.content_service.get_count(&criteria).await?;
    let criteria = criteria
        .offset((query.page - 1).saturating_mul(page_size))
        .limit(page_size);
    let items = state.content_service.get_objects(&criteria).await?;

    let data = items
        .iter()
        .map(|c| ContentResponse::from_content(c, &state))
        .collect();
    Ok(ApiResponse::page(data, PageMeta::new(total, query.page, page_size)))
}

/// Every content type with its display name.
pub async fn types() -> ApiResponse<Vec<TypeResponse>> {
    ApiResponse::ok(
        ContentService::get_types()
            .into_iter()
            .map(|(content_type, name)| TypeResponse {
                content_type,
                name,
                icon: content_type.icon(),
            })
            .collect(),
    )
}
