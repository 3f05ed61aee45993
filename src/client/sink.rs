use std::io::Write;

use tracing::warn;

/// Handle to one response message inside a sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotId(pub u64);

/// Where conversation text ends up. Rendering is the sink's business; the
/// session only calls these in order.
pub trait DisplaySink {
    fn append_user_message(&mut self, text: &str);
    fn create_response_slot(&mut self) -> SlotId;
    fn append_to_slot(&mut self, slot: SlotId, text: &str);
    fn clear(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub text: String,
    slot: Option<SlotId>,
}

/// In-memory conversation, in display order.
#[derive(Debug, Default)]
pub struct Transcript {
    messages: Vec<Message>,
    next_slot: u64,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Text of a response slot, if it is still on screen.
    pub fn slot_text(&self, slot: SlotId) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.slot == Some(slot))
            .map(|m| m.text.as_str())
    }

    pub fn last_response(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::Assistant)
            .map(|m| m.text.as_str())
    }
}

impl DisplaySink for Transcript {
    fn append_user_message(&mut self, text: &str) {
        self.messages.push(Message {
            role: Role::User,
            text: text.to_owned(),
            slot: None,
        });
    }

    fn create_response_slot(&mut self) -> SlotId {
        let slot = SlotId(self.next_slot);
        self.next_slot += 1;
        self.messages.push(Message {
            role: Role::Assistant,
            text: String::new(),
            slot: Some(slot),
        });
        slot
    }

    fn append_to_slot(&mut self, slot: SlotId, text: &str) {
        // slots cleared away are silently dropped
        if let Some(message) = self
            .messages
            .iter_mut()
            .rev()
            .find(|m| m.slot == Some(slot))
        {
            message.text.push_str(text);
        }
    }

    fn clear(&mut self) {
        self.messages.clear();
    }
}

/// Writes the conversation to a terminal as it arrives.
pub struct TerminalSink<W: Write> {
    out: W,
    next_slot: u64,
    open_slot: Option<SlotId>,
}

impl<W: Write> TerminalSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            next_slot: 0,
            open_slot: None,
        }
    }

    fn write(&mut self, text: &str) {
        if let Err(e) = self.out.write_all(text.as_bytes()).and_then(|_| self.out.flush()) {
            warn!(error = %e, "Failed to write to terminal");
        }
    }

    fn close_slot(&mut self) {
        if self.open_slot.take().is_some() {
            self.write("\n");
        }
    }
}

impl<W: Write> DisplaySink for TerminalSink<W> {
    fn append_user_message(&mut self, text: &str) {
        self.close_slot();
        self.write(&format!("> {text}\n"));
    }

    fn create_response_slot(&mut self) -> SlotId {
        self.close_slot();
        let slot = SlotId(self.next_slot);
        self.next_slot += 1;
        self.open_slot = Some(slot);
        slot
    }

    fn append_to_slot(&mut self, slot: SlotId, text: &str) {
        if self.open_slot == Some(slot) {
            self.write(text);
        }
    }

    fn clear(&mut self) {
        self.open_slot = None;
        // ANSI: erase display, cursor home
        self.write("\x1b[2J\x1b[H");
    }
}
