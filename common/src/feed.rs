//! Feed assembly: ordering, snapshot merging and body formatting.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::message::{Message, MessageId};

/// Four non-breaking spaces stand in for one tab.
pub const TAB_INDENT: &str = "\u{00A0}\u{00A0}\u{00A0}\u{00A0}";

/// How the feed is ordered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortMode {
    /// Newest first.
    #[default]
    Latest,
    /// Most liked first; equal counts keep their incoming order.
    Likes,
}

impl SortMode {
    pub fn label(self) -> &'static str {
        match self {
            SortMode::Latest => "Latest",
            SortMode::Likes => "Most Liked",
        }
    }
}

/// Return the messages in display order.
///
/// `sort_by` is a stable sort, so ties keep their relative input order in
/// both modes.
pub fn sort_messages<'a, I>(messages: I, mode: SortMode) -> Vec<&'a Message>
where
    I: IntoIterator<Item = &'a Message>,
{
    let mut sorted: Vec<&Message> = messages.into_iter().collect();
    match mode {
        SortMode::Latest => sorted.sort_by(|a, b| b.timestamp.cmp(&a.timestamp)),
        SortMode::Likes => sorted.sort_by(|a, b| b.likes.cmp(&a.likes)),
    }
    sorted
}

/// Combine a fresh store snapshot with what is currently displayed.
///
/// The snapshot decides membership (evicted or deleted messages disappear).
/// For messages known on both sides the higher like count wins, since a like
/// acknowledged after the snapshot was taken must not be rolled back.
pub fn merge_snapshot(local: &[Message], remote: Vec<Message>) -> Vec<Message> {
    let local_likes: HashMap<&MessageId, u32> =
        local.iter().map(|m| (&m.id, m.likes)).collect();

    remote
        .into_iter()
        .map(|mut message| {
            if let Some(&likes) = local_likes.get(&message.id) {
                message.likes = message.likes.max(likes);
            }
            message
        })
        .collect()
}

/// Split a body into renderable lines.
///
/// Tabs become [`TAB_INDENT`]; the renderer places a line break between
/// consecutive lines. The substitution is applied once per render and never
/// stored back into the message.
pub fn format_body(text: &str) -> Vec<String> {
    text.split('\n')
        .map(|line| line.replace('\t', TAB_INDENT))
        .collect()
}
