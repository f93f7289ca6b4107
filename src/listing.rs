use crate::domain::{CatalogFilter, CatalogStore};
use crate::errors::AppError;
use crate::models::{MemeListResponse, MemeRecord, TagMemesResponse};
use crate::pagination::{Page, PaginationInfo, Sort};

async fn sorted_page(
    store: &dyn CatalogStore,
    filter: &CatalogFilter,
    page: &Page,
    sort: Sort,
) -> Result<(Vec<MemeRecord>, PaginationInfo), AppError> {
    let total_items = store.count(filter).await? as usize;
    let mut memes = store.scan(filter).await?;
    sort.apply(&mut memes);
    let memes: Vec<MemeRecord> = memes.into_iter().skip(page.skip).take(page.limit).collect();
    let pagination = PaginationInfo::new(page, memes.len(), total_items);
    Ok((memes, pagination))
}

/// Whole catalog, newest first unless another sort is requested.
pub async fn list_memes(
    store: &dyn CatalogStore,
    page: &Page,
    sort: Sort,
) -> Result<MemeListResponse, AppError> {
    let (memes, pagination) = sorted_page(store, &CatalogFilter::all(), page, sort).await?;
    Ok(MemeListResponse { memes, pagination })
}

/// Records carrying exactly `tag`, newest first.
pub async fn memes_by_tag(
    store: &dyn CatalogStore,
    tag: &str,
    page: &Page,
) -> Result<TagMemesResponse, AppError> {
    let tag = tag.trim().to_lowercase();
    if tag.is_empty() {
        return Err(AppError::InvalidInput("tag cannot be empty".to_string()));
    }
    let filter = CatalogFilter::with_tag(tag.clone());
    let (memes, pagination) = sorted_page(store, &filter, page, Sort::default()).await?;
    Ok(TagMemesResponse {
        tag,
        memes,
        pagination,
    })
}
