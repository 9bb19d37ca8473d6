//! Workspace-wide listings: users, conversations, files and canvases.

use crate::domain::{Catalog, ExportConfig, Result, SlackFile};
use crate::infrastructure::{FileQuery, SlackApi};

use super::pagination::{Fetched, Paginator};

/// Builds the run's catalog from one user listing and one conversation listing.
///
/// # Errors
/// Returns error if either listing fails; the caller treats this as fatal.
pub async fn bootstrap_catalog(
    api: &dyn SlackApi,
    paginator: &Paginator,
    config: &ExportConfig,
) -> Result<Catalog> {
    let users = api.users_list().await?;
    tracing::info!("Found {} Users", users.len());
    paginator.pause().await;

    let conversations = api
        .conversations_list(config.api.conversation_list_limit)
        .await?;
    let catalog = Catalog::from_listing(users, conversations);

    tracing::info!("Found {} Public Channels", catalog.channels.len());
    tracing::info!("Found {} Private Channels or Group DMs", catalog.groups.len());
    tracing::info!("Found {} 1:1 DM conversations", catalog.dms.len());

    Ok(catalog)
}

/// Lists non-canvas files of the configured types.
pub async fn get_files(
    api: &dyn SlackApi,
    paginator: &Paginator,
    config: &ExportConfig,
) -> Fetched<SlackFile> {
    let query = FileQuery {
        types: config.files.types.clone(),
        count: config.api.catalog_page_size,
        show_hidden_by_limit: config.files.show_hidden_by_limit,
    };
    list_files(api, paginator, "files", &query).await
}

/// Lists canvases.
pub async fn get_canvases(
    api: &dyn SlackApi,
    paginator: &Paginator,
    config: &ExportConfig,
) -> Fetched<SlackFile> {
    let query = FileQuery {
        types: "canvas".to_string(),
        count: config.api.catalog_page_size,
        show_hidden_by_limit: false,
    };
    list_files(api, paginator, "canvases", &query).await
}

async fn list_files(
    api: &dyn SlackApi,
    paginator: &Paginator,
    label: &str,
    query: &FileQuery,
) -> Fetched<SlackFile> {
    paginator
        .by_page(label, move |page| api.files_list(query, page))
        .await
}
