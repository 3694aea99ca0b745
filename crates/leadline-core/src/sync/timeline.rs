//! Ordered, deduplicated message timeline for one session.
//!
//! Every message the engine sees, from the initial fetch, a backfill or the
//! push feed, goes through [`Timeline::insert`]. It is the only mutation path.

use leadline_types::message::{Message, MessageId};

/// Messages of one session, sorted by ascending server id, unique by id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Timeline {
    messages: Vec<Message>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a message at its sorted position.
    ///
    /// A no-op returning `false` if a message with the same id is already
    /// present. Late lower-id arrivals land in place, not at the tail.
    pub fn insert(&mut self, message: Message) -> bool {
        match self.messages.binary_search_by_key(&message.id, |m| m.id) {
            Ok(_) => false,
            Err(pos) => {
                self.messages.insert(pos, message);
                true
            }
        }
    }

    /// Insert many messages. Returns how many were new.
    pub fn merge(&mut self, messages: impl IntoIterator<Item = Message>) -> usize {
        messages
            .into_iter()
            .map(|m| self.insert(m))
            .filter(|inserted| *inserted)
            .count()
    }

    pub fn contains(&self, id: MessageId) -> bool {
        self.messages.binary_search_by_key(&id, |m| m.id).is_ok()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn as_slice(&self) -> &[Message] {
        &self.messages
    }

    pub fn to_vec(&self) -> Vec<Message> {
        self.messages.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use leadline_types::lead::LeadUid;
    use leadline_types::message::{NewMessage, SenderType};

    fn msg(id: i64) -> Message {
        NewMessage::new(
            LeadUid::from("lead_s1"),
            "lead_s1",
            SenderType::Client,
            format!("m{id}"),
        )
        .with_id(MessageId(id))
    }

    fn ids(timeline: &Timeline) -> Vec<i64> {
        timeline.as_slice().iter().map(|m| m.id.0).collect()
    }

    fn assert_sorted_unique(timeline: &Timeline) {
        for pair in timeline.as_slice().windows(2) {
            assert!(pair[0].id < pair[1].id, "{:?}", ids(timeline));
        }
    }

    #[test]
    fn duplicate_insert_is_noop() {
        let mut t = Timeline::new();
        assert!(t.insert(msg(1)));
        assert!(!t.insert(msg(1)));
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn push_then_backfill_of_same_id_yields_one_entry() {
        let mut t = Timeline::new();
        t.insert(msg(1));
        let added = t.merge(vec![msg(1)]);
        assert_eq!(added, 0);
        assert_eq!(ids(&t), vec![1]);
    }

    #[test]
    fn late_lower_id_lands_in_sorted_position() {
        let mut t = Timeline::new();
        t.merge(vec![msg(1), msg(2), msg(5)]);
        t.insert(msg(3));
        assert_eq!(ids(&t), vec![1, 2, 3, 5]);
        assert_eq!(t.last().map(|m| m.id), Some(MessageId(5)));
    }

    #[test]
    fn overlapping_sources_in_any_order_converge() {
        // Several interleavings of fetched and pushed batches with overlaps.
        let batches: Vec<Vec<i64>> = vec![
            vec![3, 1, 2],
            vec![2, 4, 4, 7],
            vec![7, 6, 5, 1],
            vec![10, 8, 9, 3, 10],
        ];
        let mut expected: Vec<i64> = batches.iter().flatten().copied().collect();
        expected.sort_unstable();
        expected.dedup();

        for rotation in 0..batches.len() {
            let mut order = batches.clone();
            order.rotate_left(rotation);
            if rotation % 2 == 1 {
                order.reverse();
            }

            let mut t = Timeline::new();
            for batch in order {
                t.merge(batch.into_iter().map(msg));
            }
            assert_sorted_unique(&t);
            assert_eq!(ids(&t), expected);
        }
    }

    #[test]
    fn contains_uses_id_identity() {
        let mut t = Timeline::new();
        t.insert(msg(4));
        assert!(t.contains(MessageId(4)));
        assert!(!t.contains(MessageId(3)));
        assert!(!t.is_empty());
    }
}
