use crate::client::WaterApi;
use crate::controller::DataSource;
use crate::fallback::FallbackData;
use crate::models::TagInfo;
use crate::stats::{TagTotals, tag_totals};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagsView {
    pub tags: Vec<TagInfo>,
    pub source: DataSource,
    pub totals: TagTotals,
}

/// Loaded once per visit; there is no periodic refresh on this screen.
pub async fn load_tags<A: WaterApi>(
    api: &A,
    fallback: &dyn FallbackData,
    now: DateTime<Utc>,
) -> TagsView {
    let (tags, source) = match api.tags().await {
        Ok(tags) => (tags, DataSource::Live),
        Err(err) => {
            warn!("tag list unavailable, using sample tags: {err}");
            (fallback.tags(now), DataSource::Fallback)
        }
    };

    TagsView {
        totals: tag_totals(&tags),
        tags,
        source,
    }
}
