/// One entry in the conversation log. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Bot,
    Error,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self { role: Role::User, text: text.into() }
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self { role: Role::Bot, text: text.into() }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self { role: Role::Error, text: text.into() }
    }
}

/// Owns the conversation log and the pending-request marker.
///
/// Messages are only ever appended; the log is reset as a whole by `clear`.
/// The marker is a single flag, so no amount of overlapping exchanges can
/// show more than one loading indicator.
pub struct ChatSession {
    greeting: String,
    messages: Vec<Message>,
    pending: bool,
}

impl ChatSession {
    pub fn new(greeting: impl Into<String>) -> Self {
        let greeting = greeting.into();
        let messages = vec![Message::bot(greeting.clone())];
        Self { greeting, messages, pending: false }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn push_user(&mut self, text: impl Into<String>) {
        self.messages.push(Message::user(text));
    }

    /// Raise the pending marker. Idempotent: a second in-flight exchange
    /// never produces a second indicator.
    pub fn begin_exchange(&mut self) {
        self.pending = true;
    }

    /// Lower the pending marker and append the exchange's single resulting
    /// message, in that order.
    pub fn settle_exchange(&mut self, message: Message) {
        self.pending = false;
        self.messages.push(message);
    }

    /// Reset the log to the seeded greeting.
    pub fn clear(&mut self) {
        self.messages.clear();
        self.messages.push(Message::bot(self.greeting.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_seeds_greeting() {
        let session = ChatSession::new("Hello!");
        assert_eq!(session.messages(), &[Message::bot("Hello!")]);
        assert!(!session.is_pending());
    }

    #[test]
    fn test_exchange_appends_exactly_one_message() {
        let mut session = ChatSession::new("Hello!");
        session.push_user("hi");
        session.begin_exchange();
        assert!(session.is_pending());

        session.settle_exchange(Message::bot("hi yourself"));
        assert!(!session.is_pending());
        assert_eq!(session.messages().len(), 3);
        assert_eq!(session.messages()[2], Message::bot("hi yourself"));
    }

    #[test]
    fn test_begin_exchange_is_idempotent() {
        let mut session = ChatSession::new("Hello!");
        session.begin_exchange();
        session.begin_exchange();
        assert!(session.is_pending());

        // The first completion lowers the marker; the second settles without
        // it ever having been duplicated.
        session.settle_exchange(Message::bot("first"));
        assert!(!session.is_pending());
        session.settle_exchange(Message::error("Error: second failed"));
        assert!(!session.is_pending());
        assert_eq!(session.messages().len(), 3);
    }

    #[test]
    fn test_clear_resets_to_single_greeting() {
        let mut session = ChatSession::new("Hello!");
        session.push_user("one");
        session.settle_exchange(Message::bot("two"));
        session.clear();
        assert_eq!(session.messages(), &[Message::bot("Hello!")]);
    }
}
