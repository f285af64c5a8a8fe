//! Conversational ticket intake.
//!
//! The bot walks a fixed sequence of prompts, collecting one ticket field per
//! answer. Invalid answers repeat the current prompt with an error; the final
//! answer yields a [`CreateTicketRequest`] for the tickets service.

use serde::Serialize;
use validator::Validate;

use crate::db::enums::{Priority, TicketCategory};
use crate::db::models::CreateTicketRequest;
use crate::validation::ticket::MAX_ATTACHMENTS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BotState {
    Options,
    Title,
    Description,
    Attachments,
    Campus,
    Category,
    Priority,
    Submit,
    Closed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BotReply {
    Prompt {
        state: BotState,
        text: String,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        choices: Vec<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    Submit {
        #[serde(skip)]
        request: CreateTicketRequest,
    },
    Closed {
        text: String,
    },
}

const MENU: &[&str] = &["Raise a ticket", "Check my tickets", "Talk to a person"];

#[derive(Debug, Default, Clone)]
struct Draft {
    title: Option<String>,
    description: Option<String>,
    attachments: Vec<String>,
    campus: Option<String>,
    category: Option<TicketCategory>,
}

#[derive(Debug, Clone)]
pub struct SupportBot {
    state: BotState,
    draft: Draft,
}

impl Default for SupportBot {
    fn default() -> Self {
        Self::new()
    }
}

impl SupportBot {
    pub fn new() -> Self {
        Self {
            state: BotState::Options,
            draft: Draft::default(),
        }
    }

    pub fn state(&self) -> BotState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.state, BotState::Submit | BotState::Closed)
    }

    /// The prompt for the current state.
    pub fn prompt(&self) -> BotReply {
        self.prompt_with(None)
    }

    pub fn advance(&mut self, input: &str) -> BotReply {
        let input = input.trim();
        let outcome = match self.state {
            BotState::Options => self.choose_option(input),
            BotState::Title => self.take_title(input),
            BotState::Description => self.take_description(input),
            BotState::Attachments => self.take_attachments(input),
            BotState::Campus => self.take_campus(input),
            BotState::Category => self.take_category(input),
            BotState::Priority => return self.take_priority(input),
            BotState::Submit | BotState::Closed => {
                return BotReply::Closed {
                    text: "This conversation has ended. Start a new one to raise another ticket."
                        .to_string(),
                };
            }
        };

        match outcome {
            Ok(Some(closed)) => closed,
            Ok(None) => self.prompt(),
            Err(error) => self.prompt_with(Some(error)),
        }
    }

    fn prompt_with(&self, error: Option<String>) -> BotReply {
        let (text, choices): (&str, Vec<String>) = match self.state {
            BotState::Options => (
                "Hi! How can I help you today?",
                MENU.iter().map(|s| s.to_string()).collect(),
            ),
            BotState::Title => ("What is the issue? Give it a short title.", vec![]),
            BotState::Description => ("Describe the problem in a few sentences.", vec![]),
            BotState::Attachments => (
                "Paste links to any screenshots or files, separated by commas, or type \"skip\".",
                vec![],
            ),
            BotState::Campus => ("Which campus is this about?", vec![]),
            BotState::Category => (
                "Pick a category.",
                TicketCategory::ALL.iter().map(|c| c.to_string()).collect(),
            ),
            BotState::Priority => (
                "How urgent is it?",
                Priority::ALL.iter().map(|p| p.to_string()).collect(),
            ),
            BotState::Submit => ("Submitting your ticket...", vec![]),
            BotState::Closed => ("Goodbye!", vec![]),
        };
        BotReply::Prompt {
            state: self.state,
            text: text.to_string(),
            choices,
            error,
        }
    }

    fn choose_option(&mut self, input: &str) -> Result<Option<BotReply>, String> {
        let lowered = input.to_ascii_lowercase();
        match lowered.as_str() {
            "1" | "raise ticket" | "raise a ticket" => {
                self.state = BotState::Title;
                Ok(None)
            }
            "2" | "check my tickets" => {
                self.state = BotState::Closed;
                Ok(Some(BotReply::Closed {
                    text: "Your tickets and their status are listed on the Tickets page."
                        .to_string(),
                }))
            }
            "3" | "talk to a person" => {
                self.state = BotState::Closed;
                Ok(Some(BotReply::Closed {
                    text: "A support agent will reach out through chat shortly.".to_string(),
                }))
            }
            _ => Err("Please choose one of the options".to_string()),
        }
    }

    fn take_title(&mut self, input: &str) -> Result<Option<BotReply>, String> {
        if input.is_empty() || input.chars().count() > 255 {
            return Err("Title must be between 1 and 255 characters".to_string());
        }
        self.draft.title = Some(input.to_string());
        self.state = BotState::Description;
        Ok(None)
    }

    fn take_description(&mut self, input: &str) -> Result<Option<BotReply>, String> {
        if input.is_empty() || input.chars().count() > 10_000 {
            return Err("Description must be between 1 and 10000 characters".to_string());
        }
        self.draft.description = Some(input.to_string());
        self.state = BotState::Attachments;
        Ok(None)
    }

    fn take_attachments(&mut self, input: &str) -> Result<Option<BotReply>, String> {
        self.draft.attachments = parse_attachments(input)?;
        self.state = BotState::Campus;
        Ok(None)
    }

    fn take_campus(&mut self, input: &str) -> Result<Option<BotReply>, String> {
        if input.is_empty() || input.chars().count() > 100 {
            return Err("Campus is required".to_string());
        }
        self.draft.campus = Some(input.to_string());
        self.state = BotState::Category;
        Ok(None)
    }

    fn take_category(&mut self, input: &str) -> Result<Option<BotReply>, String> {
        let category = pick(TicketCategory::ALL, input)
            .ok_or_else(|| "Please choose one of the listed categories".to_string())?;
        self.draft.category = Some(category);
        self.state = BotState::Priority;
        Ok(None)
    }

    fn take_priority(&mut self, input: &str) -> BotReply {
        let Some(priority) = pick(Priority::ALL, input) else {
            return self.prompt_with(Some("Please choose one of the listed priorities".to_string()));
        };

        let draft = std::mem::take(&mut self.draft);
        let request = CreateTicketRequest {
            title: draft.title.unwrap_or_default(),
            description: draft.description.unwrap_or_default(),
            campus: draft.campus.unwrap_or_default(),
            category: draft.category.unwrap_or(TicketCategory::Other),
            priority,
            attachments: draft.attachments,
        };
        if let Err(errors) = request.validate() {
            self.state = BotState::Closed;
            return BotReply::Closed {
                text: format!("Could not build the ticket: {}", errors),
            };
        }
        self.state = BotState::Submit;
        BotReply::Submit { request }
    }
}

/// Accepts a 1-based index into `options` or the option's name.
fn pick<T>(options: &[T], input: &str) -> Option<T>
where
    T: Copy + std::str::FromStr,
{
    if let Ok(index) = input.parse::<usize>() {
        return index.checked_sub(1).and_then(|i| options.get(i)).copied();
    }
    input.parse::<T>().ok()
}

/// `skip` (or nothing) means no attachments; otherwise a comma-separated list
/// of http(s) links.
pub fn parse_attachments(input: &str) -> Result<Vec<String>, String> {
    let input = input.trim();
    if input.is_empty() || input.eq_ignore_ascii_case("skip") {
        return Ok(Vec::new());
    }
    let links: Vec<String> = input
        .split(',')
        .map(str::trim)
        .filter(|link| !link.is_empty())
        .map(str::to_string)
        .collect();
    if links.len() > MAX_ATTACHMENTS {
        return Err(format!("At most {} attachments are allowed", MAX_ATTACHMENTS));
    }
    if let Some(bad) = links
        .iter()
        .find(|link| !(link.starts_with("http://") || link.starts_with("https://")))
    {
        return Err(format!("\"{}\" is not a link", bad));
    }
    Ok(links)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(bot: &mut SupportBot, answers: &[&str]) -> BotReply {
        let mut last = bot.prompt();
        for answer in answers {
            last = bot.advance(answer);
        }
        last
    }

    #[test]
    fn full_walkthrough_yields_a_ticket() {
        let mut bot = SupportBot::new();
        let reply = run(
            &mut bot,
            &[
                "1",
                "Wifi down",
                "No connection in the library since 9am",
                "https://img.example.com/a.png, https://img.example.com/b.png",
                "North",
                "network",
                "2",
            ],
        );
        let BotReply::Submit { request } = reply else {
            panic!("expected a submission, got {:?}", reply);
        };
        assert_eq!(request.title, "Wifi down");
        assert_eq!(request.campus, "North");
        assert_eq!(request.category, TicketCategory::Network);
        assert_eq!(request.priority, Priority::Medium);
        assert_eq!(request.attachments.len(), 2);
        assert_eq!(bot.state(), BotState::Submit);
        assert!(bot.is_finished());
    }

    #[test]
    fn invalid_answer_keeps_the_state() {
        let mut bot = SupportBot::new();
        bot.advance("raise ticket");
        let reply = bot.advance("   ");
        match reply {
            BotReply::Prompt { state, error, .. } => {
                assert_eq!(state, BotState::Title);
                assert!(error.is_some());
            }
            other => panic!("unexpected reply {:?}", other),
        }
    }

    #[test]
    fn out_of_range_category_is_rejected() {
        let mut bot = SupportBot::new();
        run(&mut bot, &["1", "t", "d", "skip", "South"]);
        assert_eq!(bot.state(), BotState::Category);
        bot.advance("42");
        assert_eq!(bot.state(), BotState::Category);
        bot.advance("facilities");
        assert_eq!(bot.state(), BotState::Priority);
    }

    #[test]
    fn other_menu_options_close_the_dialog() {
        let mut bot = SupportBot::new();
        assert!(matches!(bot.advance("2"), BotReply::Closed { .. }));
        assert!(bot.is_finished());
        assert!(matches!(bot.advance("1"), BotReply::Closed { .. }));
    }

    #[test]
    fn attachments_accept_skip_and_reject_non_links() {
        assert_eq!(parse_attachments("skip"), Ok(vec![]));
        assert_eq!(parse_attachments("SKIP"), Ok(vec![]));
        assert!(parse_attachments("ftp://x, https://y").is_err());
        assert_eq!(
            parse_attachments(" https://a , ,https://b ").unwrap(),
            vec!["https://a".to_string(), "https://b".to_string()]
        );
    }
}
