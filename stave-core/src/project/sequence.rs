use stave_types::{
    compare_events, deserialize_events, serialize_events, SequenceEvent, SerializedTree,
};

/// Events kept sorted by beat then id, unique by id.
#[derive(Debug, Clone, PartialEq)]
pub struct EventSequence<E> {
    events: Vec<E>,
}

impl<E> Default for EventSequence<E> {
    fn default() -> Self {
        Self { events: Vec::new() }
    }
}

impl<E: SequenceEvent> EventSequence<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Later duplicates of an id are dropped.
    pub fn from_events(events: impl IntoIterator<Item = E>) -> Self {
        let mut sequence = Self::new();
        for event in events {
            sequence.insert(event);
        }
        sequence
    }

    pub fn events(&self) -> &[E] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn find(&self, id: &str) -> Option<&E> {
        self.events.iter().find(|e| e.id() == id)
    }

    /// Returns `false` if an event with the same id already exists.
    pub fn insert(&mut self, event: E) -> bool {
        if self.find(event.id()).is_some() {
            return false;
        }
        let at = self
            .events
            .partition_point(|e| compare_events(e, &event).is_lt());
        self.events.insert(at, event);
        true
    }

    pub fn remove(&mut self, id: &str) -> Option<E> {
        let index = self.events.iter().position(|e| e.id() == id)?;
        Some(self.events.remove(index))
    }

    /// Replace the event with the same id. Returns `false` if there is none.
    pub fn update(&mut self, event: E) -> bool {
        match self.remove(event.id()) {
            Some(_) => self.insert(event),
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn serialize(&self, tag: &str) -> SerializedTree {
        serialize_events(tag, &self.events)
    }

    pub fn reset_from(&mut self, tree: Option<&SerializedTree>) {
        self.events = tree.map(deserialize_events).unwrap_or_default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stave_types::Note;

    #[test]
    fn insert_keeps_order_and_rejects_duplicates() {
        let mut seq = EventSequence::new();
        assert!(seq.insert(Note::new("b", 2.0, 60, 1.0)));
        assert!(seq.insert(Note::new("a", 0.0, 62, 1.0)));
        assert!(seq.insert(Note::new("c", 2.0, 64, 1.0)));
        assert!(!seq.insert(Note::new("a", 9.0, 10, 1.0)));

        let ids: Vec<&str> = seq.events().iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn update_moves_event_to_new_position() {
        let mut seq = EventSequence::from_events([
            Note::new("a", 0.0, 60, 1.0),
            Note::new("b", 1.0, 60, 1.0),
        ]);
        assert!(seq.update(Note::new("a", 4.0, 60, 1.0)));
        assert!(!seq.update(Note::new("zz", 4.0, 60, 1.0)));
        assert_eq!(seq.events()[1].id, "a");
        assert_eq!(seq.len(), 2);
    }
}
