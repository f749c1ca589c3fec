//! Fixed-size sliding-window memory, keyed by conversation id.
//!
//! Locking is per conversation: the outer map lock is only write-held to
//! insert a new id, and every append/read/reset on an existing id happens
//! under that id's own mutex. Readers of one conversation never wait on a
//! writer of another. All locks are `std::sync` and held for a handful of
//! instructions, never across an `.await`.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, RwLock};

use chatgate_core::error::ValidationError;
use chatgate_core::memory::ChatMemory;
use chatgate_core::message::{ConversationId, Message};
use tracing::debug;

/// Turns kept per conversation unless configured otherwise.
pub const DEFAULT_WINDOW_SIZE: usize = 10;

type Window = Arc<Mutex<VecDeque<Message>>>;

/// Bounded FIFO history per conversation.
///
/// Constructed once at startup and shared by `Arc`; lives for the process.
pub struct WindowMemory {
    capacity: usize,
    windows: RwLock<HashMap<ConversationId, Window>>,
}

impl WindowMemory {
    /// Create a store that keeps at most `capacity` turns per conversation.
    ///
    /// A capacity of zero is raised to one; configuration validation rejects
    /// zero before it gets here.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            windows: RwLock::new(HashMap::new()),
        }
    }

    /// Maximum turns retained per conversation.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of turns currently held for `id`.
    pub fn len(&self, id: &ConversationId) -> usize {
        self.existing(id)
            .map(|w| w.lock().unwrap_or_else(|e| e.into_inner()).len())
            .unwrap_or(0)
    }

    /// Number of conversation ids ever seen (reset ones included).
    pub fn conversation_count(&self) -> usize {
        self.windows.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    fn existing(&self, id: &ConversationId) -> Option<Window> {
        self.windows
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(id)
            .cloned()
    }

    fn window_for(&self, id: &ConversationId) -> Window {
        if let Some(window) = self.existing(id) {
            return window;
        }
        let mut windows = self.windows.write().unwrap_or_else(|e| e.into_inner());
        windows
            .entry(id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(VecDeque::with_capacity(self.capacity))))
            .clone()
    }
}

impl Default for WindowMemory {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_SIZE)
    }
}

impl ChatMemory for WindowMemory {
    fn append(&self, id: &ConversationId, turn: Message) -> Result<(), ValidationError> {
        if turn.content.trim().is_empty() {
            return Err(ValidationError::EmptyField { field: "Turn content" });
        }

        let window = self.window_for(id);
        let mut turns = window.lock().unwrap_or_else(|e| e.into_inner());
        turns.push_back(turn);

        let mut evicted = 0;
        while turns.len() > self.capacity {
            turns.pop_front();
            evicted += 1;
        }
        if evicted > 0 {
            debug!(conversation_id = %id, evicted, "Evicted oldest turns");
        }
        Ok(())
    }

    fn read(&self, id: &ConversationId) -> Vec<Message> {
        match self.existing(id) {
            Some(window) => window
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .iter()
                .cloned()
                .collect(),
            None => Vec::new(),
        }
    }

    fn reset(&self, id: &ConversationId) {
        // Emptied in place: an appender already holding this window's handle
        // must still land in the map-visible window.
        if let Some(window) = self.existing(id) {
            window.lock().unwrap_or_else(|e| e.into_inner()).clear();
            debug!(conversation_id = %id, "Conversation memory reset");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatgate_core::message::Role;
    use std::thread;

    fn id(s: &str) -> ConversationId {
        ConversationId::parse(s).unwrap()
    }

    fn contents(turns: &[Message]) -> Vec<String> {
        turns.iter().map(|t| t.content.clone()).collect()
    }

    #[test]
    fn keeps_last_w_turns_in_order() {
        let mem = WindowMemory::new(3);
        let x = id("x");
        for text in ["A", "B", "C", "D"] {
            mem.append(&x, Message::user(text)).unwrap();
        }
        assert_eq!(contents(&mem.read(&x)), vec!["B", "C", "D"]);

        mem.reset(&x);
        assert!(mem.read(&x).is_empty());
    }

    #[test]
    fn w_plus_k_appends_leave_exactly_w() {
        let w = 10;
        let mem = WindowMemory::new(w);
        let c = id("conv");
        for k in 0..25 {
            mem.append(&c, Message::user(format!("turn {k}"))).unwrap();
            assert!(mem.len(&c) <= w);
        }
        let expected: Vec<String> = (15..25).map(|k| format!("turn {k}")).collect();
        assert_eq!(contents(&mem.read(&c)), expected);
    }

    #[test]
    fn fewer_than_w_appends_are_all_kept() {
        let mem = WindowMemory::default();
        let c = id("short");
        mem.append(&c, Message::user("q")).unwrap();
        mem.append(&c, Message::assistant("a")).unwrap();
        let turns = mem.read(&c);
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].role, Role::User);
        assert_eq!(turns[1].role, Role::Assistant);
    }

    #[test]
    fn unknown_conversation_reads_empty() {
        let mem = WindowMemory::default();
        assert!(mem.read(&id("never-used")).is_empty());
        assert_eq!(mem.len(&id("never-used")), 0);
        assert_eq!(mem.conversation_count(), 0);
    }

    #[test]
    fn reset_unknown_is_noop() {
        let mem = WindowMemory::default();
        mem.reset(&id("ghost"));
        assert_eq!(mem.conversation_count(), 0);
    }

    #[test]
    fn reset_then_append_starts_fresh() {
        let mem = WindowMemory::new(2);
        let c = id("c");
        mem.append(&c, Message::user("old")).unwrap();
        mem.reset(&c);
        mem.append(&c, Message::user("new")).unwrap();
        assert_eq!(contents(&mem.read(&c)), vec!["new"]);
    }

    #[test]
    fn conversations_are_independent() {
        let mem = WindowMemory::new(2);
        let a = id("a");
        let b = id("b");
        mem.append(&a, Message::user("a1")).unwrap();
        mem.append(&b, Message::user("b1")).unwrap();
        mem.append(&a, Message::user("a2")).unwrap();
        mem.append(&a, Message::user("a3")).unwrap();

        assert_eq!(contents(&mem.read(&a)), vec!["a2", "a3"]);
        assert_eq!(contents(&mem.read(&b)), vec!["b1"]);

        mem.reset(&a);
        assert_eq!(contents(&mem.read(&b)), vec!["b1"]);
    }

    #[test]
    fn blank_content_is_rejected_and_window_unchanged() {
        let mem = WindowMemory::new(3);
        let c = id("c");
        mem.append(&c, Message::user("keep me")).unwrap();

        let err = mem.append(&c, Message::user("")).unwrap_err();
        assert!(matches!(err, ValidationError::EmptyField { .. }));
        assert!(mem.append(&c, Message::assistant("  \n")).is_err());

        assert_eq!(contents(&mem.read(&c)), vec!["keep me"]);
    }

    #[test]
    fn rejected_first_append_creates_no_window() {
        let mem = WindowMemory::default();
        assert!(mem.append(&id("c"), Message::user("")).is_err());
        assert_eq!(mem.conversation_count(), 0);
    }

    #[test]
    fn zero_capacity_is_raised_to_one() {
        let mem = WindowMemory::new(0);
        assert_eq!(mem.capacity(), 1);
        let c = id("c");
        mem.append(&c, Message::user("1")).unwrap();
        mem.append(&c, Message::user("2")).unwrap();
        assert_eq!(contents(&mem.read(&c)), vec!["2"]);
    }

    #[test]
    fn media_survives_the_round_trip() {
        let mem = WindowMemory::default();
        let c = id("pics");
        let turn = Message::user("what is this?")
            .with_media(chatgate_core::message::Media::url("image/png", "https://x/y.png"));
        mem.append(&c, turn).unwrap();
        let stored = mem.read(&c);
        assert_eq!(stored[0].media.as_ref().unwrap().mime_type, "image/png");
    }

    #[test]
    fn concurrent_appends_respect_capacity_and_per_thread_order() {
        let w = 10;
        let mem = Arc::new(WindowMemory::new(w));
        let shared = id("shared");

        let handles: Vec<_> = (0..4)
            .map(|t| {
                let mem = mem.clone();
                let shared = shared.clone();
                thread::spawn(move || {
                    for i in 0..100 {
                        mem.append(&shared, Message::user(format!("{t}:{i}"))).unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let turns = mem.read(&shared);
        assert_eq!(turns.len(), w);

        // Within each thread, the surviving turns keep their append order.
        for t in 0..4 {
            let seq: Vec<u32> = turns
                .iter()
                .filter_map(|m| {
                    let (thread, i) = m.content.split_once(':')?;
                    (thread == t.to_string()).then(|| i.parse().unwrap())
                })
                .collect();
            assert!(seq.windows(2).all(|p| p[0] < p[1]));
        }
    }

    #[test]
    fn concurrent_distinct_ids_do_not_interfere() {
        let mem = Arc::new(WindowMemory::new(5));
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let mem = mem.clone();
                thread::spawn(move || {
                    let c = ConversationId::parse(format!("conv-{t}")).unwrap();
                    for i in 0..20 {
                        mem.append(&c, Message::user(format!("{i}"))).unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(mem.conversation_count(), 8);
        for t in 0..8 {
            let c = ConversationId::parse(format!("conv-{t}")).unwrap();
            assert_eq!(contents(&mem.read(&c)), vec!["15", "16", "17", "18", "19"]);
        }
    }
}
