//! Rule-based farming assistant behind the chat and voice widgets.
//!
//! Replies are keyword matches that point the farmer at the right dashboard
//! page; there is no backend call.

use chrono::{DateTime, Utc};
use serde::Serialize;

pub const GREETING: &str = "How can I help you?";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Action {
    pub label: &'static str,
    pub href: &'static str,
}

const SOIL_HEALTH: Action = Action {
    label: "Open Soil Health",
    href: "/dashboard/soil-health",
};
const PEST_DETECTION: Action = Action {
    label: "Open Pest Detection",
    href: "/dashboard/pest-disease-detection",
};
const WEATHER_ALERTS: Action = Action {
    label: "Open Weather Alerts",
    href: "/dashboard/weather-alerts",
};
const MARKET_PRICES: Action = Action {
    label: "Open Market Prices",
    href: "/dashboard/market-prices",
};
const ELIGIBLE_SCHEMES: Action = Action {
    label: "Eligible Schemes",
    href: "/dashboard/eligible-schemes",
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reply {
    pub text: &'static str,
    pub actions: Vec<Action>,
}

/// Pick the reply for a user message. Rules are checked in order and the
/// first match wins.
pub fn reply(input: &str) -> Reply {
    let text = input.to_lowercase();
    let has = |word: &str| text.contains(word);

    if (has("soil") && (has("health") || has("test") || has("check"))) || has("analyze soil") {
        return Reply {
            text: "To check your soil health, go to Soil Health. You can enter values manually or upload a lab report for instant advisory.",
            actions: vec![SOIL_HEALTH],
        };
    }
    if has("pest") || has("disease") {
        return Reply {
            text: "To detect pests or diseases, open Pest & Disease Detection and upload a clear photo of the affected crop.",
            actions: vec![PEST_DETECTION],
        };
    }
    if has("weather") {
        return Reply {
            text: "Open Weather Alerts to view current conditions and forecasts.",
            actions: vec![WEATHER_ALERTS],
        };
    }
    if has("price") || has("market") {
        return Reply {
            text: "Open Market Prices to see latest mandi rates and trends.",
            actions: vec![MARKET_PRICES],
        };
    }
    if has("scheme") {
        return Reply {
            text: "Here are popular schemes you may be eligible for.",
            actions: vec![ELIGIBLE_SCHEMES],
        };
    }

    Reply {
        text: "I can help with soil health, pest detection, weather alerts, market prices, and schemes. What would you like to do?",
        actions: vec![
            Action {
                label: "Soil Health",
                href: "/dashboard/soil-health",
            },
            Action {
                label: "Pest Detection",
                href: "/dashboard/pest-disease-detection",
            },
        ],
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: u64,
    pub text: String,
    pub is_user: bool,
    pub timestamp: DateTime<Utc>,
    pub actions: Vec<Action>,
}

/// Chat history, opened with the assistant's greeting.
#[derive(Debug, Clone)]
pub struct Conversation {
    messages: Vec<Message>,
    next_id: u64,
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

impl Conversation {
    pub fn new() -> Self {
        let mut conversation = Self {
            messages: Vec::new(),
            next_id: 1,
        };
        conversation.push(GREETING.to_string(), false, Vec::new());
        conversation
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Record a typed or transcribed message and the assistant's answer.
    ///
    /// Blank input is ignored and returns `None`.
    pub fn send(&mut self, input: &str) -> Option<&Message> {
        let content = input.trim();
        if content.is_empty() {
            return None;
        }

        self.push(content.to_string(), true, Vec::new());
        let answer = reply(content);
        self.push(answer.text.to_string(), false, answer.actions);
        self.messages.last()
    }

    fn push(&mut self, text: String, is_user: bool, actions: Vec<Action>) {
        self.messages.push(Message {
            id: self.next_id,
            text,
            is_user,
            timestamp: Utc::now(),
            actions,
        });
        self.next_id += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Rule Tests ====================

    #[test]
    fn test_soil_needs_a_qualifier() {
        assert_eq!(reply("How do I test my SOIL?").actions, vec![SOIL_HEALTH]);
        assert_eq!(reply("analyze soil please").actions, vec![SOIL_HEALTH]);
        // "soil" alone falls through to the generic help.
        assert_eq!(reply("soil").actions.len(), 2);
    }

    #[test]
    fn test_rules_in_order() {
        assert_eq!(reply("my wheat has a disease").actions, vec![PEST_DETECTION]);
        assert_eq!(reply("Weather tomorrow?").actions, vec![WEATHER_ALERTS]);
        assert_eq!(reply("mandi price of onion").actions, vec![MARKET_PRICES]);
        assert_eq!(reply("any government scheme?").actions, vec![ELIGIBLE_SCHEMES]);
        // Pest wins over weather when both appear.
        assert_eq!(reply("pest risk in this weather").actions, vec![PEST_DETECTION]);
    }

    #[test]
    fn test_generic_reply() {
        let answer = reply("hello");
        assert!(answer.text.starts_with("I can help with soil health"));
        assert_eq!(answer.actions[0].label, "Soil Health");
        assert_eq!(answer.actions[1].href, "/dashboard/pest-disease-detection");
    }

    // ==================== Conversation Tests ====================

    #[test]
    fn test_conversation_starts_with_greeting() {
        let conversation = Conversation::new();
        assert_eq!(conversation.messages().len(), 1);
        assert_eq!(conversation.messages()[0].text, GREETING);
        assert!(!conversation.messages()[0].is_user);
    }

    #[test]
    fn test_send_appends_user_and_bot_messages() {
        let mut conversation = Conversation::new();
        let answer = conversation.send("  check soil health  ").unwrap();
        assert_eq!(answer.actions, vec![SOIL_HEALTH]);

        let messages = conversation.messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1].text, "check soil health");
        assert!(messages[1].is_user);
        assert!(messages[1].id < messages[2].id);
        assert!(messages[1].timestamp <= messages[2].timestamp);
    }

    #[test]
    fn test_blank_input_ignored() {
        let mut conversation = Conversation::new();
        assert!(conversation.send("   ").is_none());
        assert_eq!(conversation.messages().len(), 1);
    }
}
