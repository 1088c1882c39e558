use crate::chatbot::{ChatClient, ReplyOutcome};
use crate::config::{Config, QuickReply};
use crate::session::{ChatSession, Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

/// Where a submission's text comes from. Only input-box submissions clear the
/// input box afterwards; quick replies leave it alone.
#[derive(Debug, Clone)]
pub enum Submission {
    FromInput,
    Fixed(String),
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub session: ChatSession,
    pub client: ChatClient,
    pub quick_replies: Vec<QuickReply>,

    // Input state
    pub input: String,
    pub cursor: usize, // cursor position in input, in chars

    // Chat viewport state
    pub chat_scroll: u16,
    pub chat_height: u16, // inner height of the chat area, set during render
    pub chat_width: u16,  // inner width, for wrap calculations

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // Clear confirmation popup
    pub show_clear_confirm: bool,
}

impl App {
    pub fn new(config: &Config, client: ChatClient) -> Self {
        Self {
            should_quit: false,
            input_mode: InputMode::Normal,
            session: ChatSession::new(config.greeting()),
            client,
            quick_replies: config.quick_replies.clone(),

            input: String::new(),
            cursor: 0,

            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,

            animation_frame: 0,

            show_clear_confirm: false,
        }
    }

    /// Start a submission: append the user message, raise the pending marker,
    /// and return the text to send. Returns None for a trimmed-empty
    /// submission, which appends nothing and sends nothing.
    pub fn begin_submit(&mut self, submission: Submission) -> Option<String> {
        let (text, from_input) = match submission {
            Submission::FromInput => (self.input.trim().to_string(), true),
            Submission::Fixed(text) => (text.trim().to_string(), false),
        };

        if text.is_empty() {
            return None;
        }

        self.session.push_user(text.clone());
        if from_input {
            self.input.clear();
            self.cursor = 0;
        }
        self.session.begin_exchange();
        self.scroll_chat_to_bottom();

        Some(text)
    }

    /// Finish a submission: lower the pending marker and append the single
    /// resulting message.
    pub fn finish_submit(&mut self, outcome: ReplyOutcome) {
        self.session.settle_exchange(outcome.into_message());
        self.scroll_chat_to_bottom();
    }

    pub fn request_clear(&mut self) {
        self.show_clear_confirm = true;
    }

    pub fn cancel_clear(&mut self) {
        self.show_clear_confirm = false;
    }

    pub fn confirm_clear(&mut self) {
        self.session.clear();
        self.show_clear_confirm = false;
        self.chat_scroll = 0;
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.session.is_pending() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    pub fn scroll_up(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_sub(1);
    }

    pub fn scroll_down(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_add(1);
    }

    /// Scroll the log so the newest message (or the pending indicator) is
    /// visible.
    pub fn scroll_chat_to_bottom(&mut self) {
        // Use actual chat width for wrap calculation, default to 50 if not set
        let wrap_width = if self.chat_width > 0 {
            self.chat_width as usize
        } else {
            50
        };

        let mut total_lines: u16 = 0;

        for msg in self.session.messages() {
            if msg.role != Role::Error {
                total_lines += 1; // Role line ("You:" or "Bot:")
            }
            // Calculate wrapped lines for each line of content
            for line in msg.text.lines() {
                // Use character count, not byte length, for proper UTF-8 handling
                let char_count = line.chars().count();
                if char_count == 0 {
                    total_lines += 1; // Empty line still takes one line
                } else {
                    total_lines += ((char_count / wrap_width) + 1) as u16;
                }
            }
            total_lines += 1; // Blank line after message
        }

        if self.session.is_pending() {
            total_lines += 2; // "Bot:" + "Thinking..."
        }

        let visible_height = if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        };

        if total_lines > visible_height {
            self.chat_scroll = total_lines.saturating_sub(visible_height);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Message;

    fn test_app() -> App {
        let mut config = Config::new();
        config.greeting = Some("Welcome!".to_string());
        let client = ChatClient::new("http://localhost:8069");
        App::new(&config, client)
    }

    #[test]
    fn test_submit_appends_user_message_and_raises_marker() {
        let mut app = test_app();
        app.input = "  hello there  ".to_string();

        let sent = app.begin_submit(Submission::FromInput);
        assert_eq!(sent.as_deref(), Some("hello there"));
        assert_eq!(app.session.messages().len(), 2);
        assert_eq!(app.session.messages()[1], Message::user("hello there"));
        assert!(app.session.is_pending());
        assert!(app.input.is_empty());
        assert_eq!(app.cursor, 0);
    }

    #[test]
    fn test_blank_input_is_a_no_op() {
        let mut app = test_app();
        app.input = "   \t ".to_string();

        assert!(app.begin_submit(Submission::FromInput).is_none());
        assert_eq!(app.session.messages().len(), 1);
        assert!(!app.session.is_pending());
    }

    #[test]
    fn test_quick_reply_leaves_input_untouched() {
        let mut app = test_app();
        app.input = "half-typed".to_string();
        app.cursor = 5;

        let sent = app.begin_submit(Submission::Fixed("How is your pricing structured?".to_string()));
        assert_eq!(sent.as_deref(), Some("How is your pricing structured?"));
        assert_eq!(app.input, "half-typed");
        assert_eq!(app.cursor, 5);
        assert!(app.session.is_pending());
    }

    #[test]
    fn test_finish_submit_appends_exactly_one_message() {
        let mut app = test_app();
        app.input = "hi".to_string();
        app.begin_submit(Submission::FromInput);

        app.finish_submit(ReplyOutcome::Reply("Hi".to_string()));
        assert!(!app.session.is_pending());
        assert_eq!(app.session.messages().len(), 3);
        assert_eq!(app.session.messages()[2], Message::bot("Hi"));
    }

    #[test]
    fn test_overlapping_submits_share_one_marker() {
        let mut app = test_app();
        app.begin_submit(Submission::Fixed("first".to_string()));
        app.begin_submit(Submission::Fixed("second".to_string()));
        assert!(app.session.is_pending());
        assert_eq!(app.session.messages().len(), 3);

        app.finish_submit(ReplyOutcome::Transport("timeout".to_string()));
        assert!(!app.session.is_pending());
        assert_eq!(app.session.messages()[3], Message::error("Error: timeout"));

        app.finish_submit(ReplyOutcome::Reply("second answer".to_string()));
        assert!(!app.session.is_pending());
        assert_eq!(app.session.messages().len(), 5);
    }

    #[test]
    fn test_clear_needs_confirmation() {
        let mut app = test_app();
        app.begin_submit(Submission::Fixed("hello".to_string()));
        app.finish_submit(ReplyOutcome::Reply("hi".to_string()));

        app.request_clear();
        app.cancel_clear();
        assert_eq!(app.session.messages().len(), 3);

        app.request_clear();
        app.confirm_clear();
        assert_eq!(app.session.messages(), &[Message::bot("Welcome!")]);
        assert!(!app.show_clear_confirm);
    }
}
