//! The text window scanned for keys.

use lorebook::{ChatMessage, WorldInfoSettings};
use std::borrow::Cow;

use super::KeyMatcher;

/// Chat window plus the content recursed from earlier passes.
#[derive(Debug, Clone)]
pub struct ScanBuffer {
    /// Scannable messages, most recent last.
    messages: Vec<String>,
    /// The window at the default depth, prebuilt.
    default_window: String,
    default_depth: usize,
    /// Content of entries activated on earlier passes.
    recursed: String,
}

impl ScanBuffer {
    /// Build the primary buffer from the chat.
    pub fn new(chat: &[ChatMessage], settings: &WorldInfoSettings) -> Self {
        let messages: Vec<String> = chat
            .iter()
            .filter(|m| !m.is_system)
            .map(|m| {
                if settings.include_names && !m.name.is_empty() {
                    format!("{}: {}", m.name, m.mes)
                } else {
                    m.mes.clone()
                }
            })
            .collect();

        let default_window = join_window(&messages, settings.depth);

        Self {
            messages,
            default_window,
            default_depth: settings.depth,
            recursed: String::new(),
        }
    }

    /// The chat window for a scan depth (the default depth when `None`).
    pub fn window(&self, depth: Option<usize>) -> Cow<'_, str> {
        match depth {
            Some(depth) if depth != self.default_depth => Cow::Owned(join_window(&self.messages, depth)),
            _ => Cow::Borrowed(&self.default_window),
        }
    }

    /// Content appended by recursion so far.
    pub fn recursed(&self) -> &str {
        &self.recursed
    }

    /// Append activated content for the next pass.
    pub fn extend<'a>(&mut self, contents: impl IntoIterator<Item = &'a str>) {
        for content in contents {
            if !self.recursed.is_empty() {
                self.recursed.push('\n');
            }
            self.recursed.push_str(content);
        }
    }

    /// Test a matcher against the window and the recursed content.
    pub fn matches(&self, matcher: &KeyMatcher, depth: Option<usize>) -> bool {
        let window = self.window(depth);
        matcher.matches(&[window.as_ref(), self.recursed.as_str()])
    }

    /// Depth (1 = most recent) of the newest message within the window that
    /// the matcher fires on.
    pub fn chat_depth_of_match(&self, matcher: &KeyMatcher, depth: Option<usize>) -> Option<usize> {
        let depth = depth.unwrap_or(self.default_depth);
        self.messages
            .iter()
            .rev()
            .take(depth)
            .position(|m| matcher.matches(&[m.as_str()]))
            .map(|i| i + 1)
    }

    /// Number of scannable messages.
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }
}

fn join_window(messages: &[String], depth: usize) -> String {
    let start = messages.len().saturating_sub(depth);
    messages[start..].join("\n")
}
