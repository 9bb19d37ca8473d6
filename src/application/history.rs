//! Conversation history retrieval.

use crate::domain::Message;
use crate::infrastructure::SlackApi;

use super::pagination::{Fetched, Paginator};

/// Fetches a conversation's full history, sorted ascending by timestamp.
///
/// The sort is on the raw `ts` string. A walk that stopped early still
/// comes back ordered, since day partitioning relies on monotonic input.
pub async fn get_history(
    api: &dyn SlackApi,
    paginator: &Paginator,
    channel_id: &str,
    page_size: u32,
) -> Fetched<Message> {
    let mut fetched = paginator
        .by_cursor(channel_id, move |cursor| {
            api.conversations_history(channel_id, cursor, page_size)
        })
        .await;

    fetched.items.sort_by(|a, b| a.ts.cmp(&b.ts));
    tracing::debug!(
        channel = channel_id,
        messages = fetched.items.len(),
        requests = fetched.requests,
        complete = fetched.is_complete(),
        "Fetched history"
    );
    fetched
}
