//! Per-workspace aggregation: collapse duplicate ids, newest first.

use std::collections::HashMap;

use crate::chat::core::conversation::Conversation;

/// Keep one conversation per id and sort descending by `timestamp_ms`.
///
/// The copy with more messages wins; ties keep the first seen. The sort is
/// stable, so equal timestamps stay in first-seen order.
#[must_use]
pub fn dedupe_and_sort(conversations: Vec<Conversation>) -> Vec<Conversation> {
    let mut kept: Vec<Conversation> = Vec::with_capacity(conversations.len());
    let mut index: HashMap<String, usize> = HashMap::new();

    for conversation in conversations {
        match index.get(&conversation.id) {
            Some(&slot) => {
                if conversation.messages.len() > kept[slot].messages.len() {
                    kept[slot] = conversation;
                }
            }
            None => {
                index.insert(conversation.id.clone(), kept.len());
                kept.push(conversation);
            }
        }
    }

    kept.sort_by(|a, b| b.timestamp_ms.cmp(&a.timestamp_ms));
    kept
}
