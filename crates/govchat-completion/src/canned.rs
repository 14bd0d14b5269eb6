// SPDX-FileCopyrightText: 2026 Govchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Canned reply table: keyword -> bucket -> uniformly-random canned string.
//!
//! The fallback bot when no completion endpoint is configured. Matching is
//! case-insensitive substring over the user message; the first bucket whose
//! keyword matches wins, in declaration order.

use async_trait::async_trait;
use rand::seq::SliceRandom;

use govchat_core::{GovchatError, ReplyGenerator};

/// A keyword bucket and its canned replies.
struct Bucket {
    keywords: &'static [&'static str],
    replies: &'static [&'static str],
}

const GREETINGS: &[&str] = &[
    "Hello! How can I help you today?",
    "Hi there! What can I do for you?",
    "Hey! Nice to hear from you.",
];

const WELLBEING: &[&str] = &[
    "I'm doing great, thanks for asking! How about you?",
    "All systems running smoothly. How are you?",
];

const FAREWELLS: &[&str] = &[
    "Goodbye! Have a great day.",
    "See you later!",
    "Bye! Come back any time.",
];

const THANKS: &[&str] = &[
    "You're welcome!",
    "Happy to help!",
];

const HELP: &[&str] = &[
    "You can just type a message and I'll reply.",
    "Ask me anything and I'll do my best.",
];

const DEFAULT: &[&str] = &[
    "Interesting! Tell me more.",
    "I see. What else is on your mind?",
    "Could you say a bit more about that?",
];

const BUCKETS: &[Bucket] = &[
    Bucket {
        keywords: &["hello", "hi", "hey"],
        replies: GREETINGS,
    },
    Bucket {
        keywords: &["how are you"],
        replies: WELLBEING,
    },
    Bucket {
        keywords: &["bye", "goodbye"],
        replies: FAREWELLS,
    },
    Bucket {
        keywords: &["thank"],
        replies: THANKS,
    },
    Bucket {
        keywords: &["help"],
        replies: HELP,
    },
];

/// Deterministic lookup table with uniformly-random choice within a bucket.
#[derive(Debug, Default, Clone, Copy)]
pub struct CannedResponder;

impl CannedResponder {
    pub fn new() -> Self {
        Self
    }

    /// Replies drawn for this message: the matching bucket, or the default.
    pub fn bucket_for(message: &str) -> &'static [&'static str] {
        let lowered = message.to_lowercase();
        BUCKETS
            .iter()
            .find(|b| b.keywords.iter().any(|k| lowered.contains(k)))
            .map(|b| b.replies)
            .unwrap_or(DEFAULT)
    }

    /// Picks a reply for the message.
    pub fn reply(message: &str) -> String {
        let replies = Self::bucket_for(message);
        replies
            .choose(&mut rand::thread_rng())
            .copied()
            // Buckets are compile-time non-empty.
            .unwrap_or("...")
            .to_string()
    }
}

#[async_trait]
impl ReplyGenerator for CannedResponder {
    async fn generate(&self, user_message: &str) -> Result<String, GovchatError> {
        Ok(Self::reply(user_message))
    }
}
