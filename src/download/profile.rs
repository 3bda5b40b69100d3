//! Per-profile download: feed pagination and the worker pool.

use std::collections::HashSet;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use rand::Rng;
use tokio::time::sleep;

use crate::api::{PostsPage, PrivacyApi, POSTS_PAGE_SIZE};
use crate::config::{Config, MediaSelection};
use crate::download::media::{download_media_item, ItemOutcome};
use crate::download::state::DownloadState;
use crate::error::Result;
use crate::hls::VideoPipeline;
use crate::media::{parse_mosaic_item, MediaItem};
use crate::output::create_item_bar;

/// Selected media of one feed page, in feed order. Media already in `seen`
/// are dropped.
pub fn collect_page_items(
    page: &PostsPage,
    selection: MediaSelection,
    seen: &mut HashSet<String>,
) -> Vec<MediaItem> {
    page.mosaic_items
        .iter()
        .flat_map(parse_mosaic_item)
        .filter(|item| selection.includes(item.kind))
        .filter(|item| seen.insert(item.media_id.clone()))
        .collect()
}

/// Whether a page of `len` posts ends the feed.
pub fn is_last_page(len: usize) -> bool {
    len < POSTS_PAGE_SIZE
}

/// Walk the whole feed of `profile` and collect the selected items.
pub async fn collect_profile_items(
    api: &PrivacyApi,
    profile: &str,
    selection: MediaSelection,
) -> Result<Vec<MediaItem>> {
    let mut seen = HashSet::new();
    let mut items = Vec::new();
    let mut skip = 0;

    loop {
        let page = api.get_posts(profile, skip).await?;
        let posts = page.mosaic_items.len();
        let found = collect_page_items(&page, selection, &mut seen);

        tracing::debug!(
            "{}: page at {} has {} posts, {} selected items",
            profile,
            skip,
            posts,
            found.len()
        );
        items.extend(found);

        if is_last_page(posts) {
            break;
        }
        skip += POSTS_PAGE_SIZE;

        // Rate limiting delay between pages
        let delay_ms = rand::thread_rng().gen_range(500..1500);
        sleep(Duration::from_millis(delay_ms)).await;
    }

    Ok(items)
}

/// Download every selected item of `state.profile_name`.
pub async fn download_profile(
    api: &PrivacyApi,
    pipeline: &VideoPipeline,
    config: &Config,
    state: &mut DownloadState,
) -> Result<()> {
    let items = collect_profile_items(api, &state.profile_name, config.options.media).await?;
    state.total_items = items.len() as u64;

    tracing::info!(
        "{}: {} items to process with {} workers",
        state.profile_name,
        items.len(),
        config.options.workers
    );

    if items.is_empty() {
        return Ok(());
    }

    let bar = config
        .options
        .show_downloads
        .then(|| create_item_bar(items.len() as u64, &state.profile_name));

    let profile_dir = state.base_path.clone();
    let results: Vec<(&MediaItem, ItemOutcome)> = stream::iter(&items)
        .map(|item| {
            let bar = bar.clone();
            let profile_dir = &profile_dir;
            async move {
                let outcome = download_media_item(api, pipeline, profile_dir, item).await;
                if let Some(bar) = bar {
                    bar.inc(1);
                }
                (item, outcome)
            }
        })
        .buffer_unordered(config.options.workers.max(1))
        .collect()
        .await;

    if let Some(bar) = bar {
        bar.finish_and_clear();
    }

    for (item, outcome) in &results {
        match outcome {
            ItemOutcome::Downloaded(path) => {
                tracing::info!("Downloaded: {}", path.display());
            }
            ItemOutcome::Skipped(path) => {
                tracing::debug!("Already present: {}", path.display());
            }
            ItemOutcome::Failed(reason) => {
                tracing::warn!("Failed to download media {}: {}", item.media_id, reason);
            }
        }
        state.record(item.kind, outcome);
    }

    Ok(())
}
