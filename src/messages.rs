//! An ordered collection of diagnostic messages.
//!
//! The collection is append-only: messages are never removed or mutated
//! after being added. Aggregate severity is the maximum over the contained
//! messages.

use crate::message::{Code, Message, MessageFormat};
use crate::severity::{Severity, SeverityMask};

/// An append-only ordered set of [`Message`]s with aggregate severity.
///
/// # Example
///
/// ```rust
/// use acumulus_api::{Code, Message, MessageCollection, Severity};
///
/// let mut messages = MessageCollection::new();
/// assert_eq!(messages.severity(), Severity::Unknown);
///
/// messages.add(Message::new(Severity::Warning, Code::Int(553), "N1", "incomplete"));
/// assert_eq!(messages.severity(), Severity::Warning);
/// assert!(!messages.has_error());
/// ```
#[derive(Debug, Default)]
pub struct MessageCollection {
    messages: Vec<Message>,
}

impl MessageCollection {
    /// Creates an empty collection.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            messages: Vec::new(),
        }
    }

    /// Appends a message.
    pub fn add(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Merges the messages of another collection into this one.
    ///
    /// With `severity_cap` set, any merged message more severe than the cap
    /// is re-created at the cap severity. This is used when a secondary API
    /// call (e.g. a lookup) fails but must not fail the primary operation:
    /// its errors are downgraded to warnings.
    pub fn add_messages(
        &mut self,
        messages: impl IntoIterator<Item = Message>,
        severity_cap: Option<Severity>,
    ) {
        for message in messages {
            let message = match severity_cap {
                Some(cap) if message.severity() > cap => message.with_severity(cap),
                _ => message,
            };
            self.messages.push(message);
        }
    }

    /// Returns the maximum severity over all messages, or
    /// [`Severity::Unknown`] when empty.
    #[must_use]
    pub fn severity(&self) -> Severity {
        self.severity_filtered(SeverityMask::ALL)
    }

    /// Returns the maximum severity over the messages whose severity is in
    /// `mask`, or [`Severity::Unknown`] if none match.
    #[must_use]
    pub fn severity_filtered(&self, mask: SeverityMask) -> Severity {
        self.messages
            .iter()
            .map(Message::severity)
            .filter(|severity| mask.contains(*severity))
            .max()
            .unwrap_or(Severity::Unknown)
    }

    /// Returns the maximum severity counting only messages of
    /// [`Severity::Info`] or worse.
    ///
    /// Log and success entries describe a healthy run and never raise the
    /// outcome of an operation.
    #[must_use]
    pub fn real_severity(&self) -> Severity {
        self.severity_filtered(SeverityMask::REAL_MESSAGES)
    }

    /// Returns `true` if any message is [`Severity::Error`] or worse.
    #[must_use]
    pub fn has_error(&self) -> bool {
        self.severity_filtered(SeverityMask::ERROR_OR_WORSE) != Severity::Unknown
    }

    /// Returns `true` if any message is [`Severity::Info`] or worse.
    #[must_use]
    pub fn has_real_messages(&self) -> bool {
        self.real_severity() != Severity::Unknown
    }

    /// Returns the first message with the given code, if any.
    #[must_use]
    pub fn by_code(&self, code: impl Into<Code>) -> Option<&Message> {
        let code = code.into();
        self.messages.iter().find(|message| *message.code() == code)
    }

    /// Returns the first message with the given code tag, if any.
    #[must_use]
    pub fn by_code_tag(&self, code_tag: &str) -> Option<&Message> {
        self.messages
            .iter()
            .find(|message| message.code_tag() == code_tag)
    }

    /// Returns the messages in insertion order.
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Returns `true` if the collection holds no messages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Returns the number of messages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Renders the messages whose severity is in `mask`.
    ///
    /// Messages are rendered per [`Message::format`] and joined with
    /// newlines. With both `html` and `list_item` set the result is wrapped
    /// in a `<ul>` element.
    #[must_use]
    pub fn format_messages(&self, format: MessageFormat, mask: SeverityMask) -> String {
        let rendered: Vec<String> = self
            .messages
            .iter()
            .filter(|message| mask.contains(message.severity()))
            .map(|message| message.format(format))
            .collect();
        if rendered.is_empty() {
            return String::new();
        }
        let joined = rendered.join("\n");
        if format.html && format.list_item {
            format!("<ul>\n{joined}\n</ul>")
        } else {
            joined
        }
    }
}

impl IntoIterator for MessageCollection {
    type Item = Message;
    type IntoIter = std::vec::IntoIter<Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.into_iter()
    }
}

impl<'a> IntoIterator for &'a MessageCollection {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}
