use campus_desk::db::enums::{Priority, TicketCategory};
use campus_desk::support_bot::{BotReply, BotState, SupportBot, parse_attachments};
use campus_desk::validation::ticket::MAX_ATTACHMENTS;

fn walk(bot: &mut SupportBot, inputs: &[&str]) -> BotReply {
    let mut last = bot.prompt();
    for input in inputs {
        last = bot.advance(input);
    }
    last
}

#[test]
fn starts_at_the_menu() {
    let bot = SupportBot::new();
    assert_eq!(bot.state(), BotState::Options);
    match bot.prompt() {
        BotReply::Prompt { choices, .. } => assert_eq!(choices.len(), 3),
        other => panic!("unexpected reply: {:?}", other),
    }
}

#[test]
fn full_conversation_produces_a_ticket_request() {
    let mut bot = SupportBot::new();
    let reply = walk(
        &mut bot,
        &[
            "1",
            "Wi-Fi drops in the library",
            "Connection drops every few minutes on the second floor.",
            "https://files.example.com/trace.png",
            "North",
            "network",
            "high",
        ],
    );

    match reply {
        BotReply::Submit { request } => {
            assert_eq!(request.title, "Wi-Fi drops in the library");
            assert_eq!(request.campus, "North");
            assert_eq!(request.category, TicketCategory::Network);
            assert_eq!(request.priority, Priority::High);
            assert_eq!(request.attachments.len(), 1);
        }
        other => panic!("expected a submission, got {:?}", other),
    }
    assert!(bot.is_finished());
}

#[test]
fn invalid_input_repeats_the_step_with_an_error() {
    let mut bot = SupportBot::new();
    match bot.advance("order pizza") {
        BotReply::Prompt { state, error, .. } => {
            assert_eq!(state, BotState::Options);
            assert!(error.is_some());
        }
        other => panic!("unexpected reply: {:?}", other),
    }

    walk(&mut bot, &["1", "Printer jam"]);
    match bot.advance("   ") {
        BotReply::Prompt { state, error, .. } => {
            assert_eq!(state, BotState::Description);
            assert!(error.is_some());
        }
        other => panic!("unexpected reply: {:?}", other),
    }
}

#[test]
fn talking_to_a_person_closes_the_conversation() {
    let mut bot = SupportBot::new();
    assert!(matches!(bot.advance("3"), BotReply::Closed { .. }));
    assert_eq!(bot.state(), BotState::Closed);
    assert!(matches!(bot.advance("1"), BotReply::Closed { .. }));
}

#[test]
fn attachments_accept_skip_and_reject_bad_links() {
    assert!(parse_attachments("skip").unwrap().is_empty());
    assert_eq!(
        parse_attachments("https://a.example/1.png, https://a.example/2.png")
            .unwrap()
            .len(),
        2
    );
    assert!(parse_attachments("ftp://a.example/1.png").is_err());

    let too_many = vec!["https://a.example/x.png"; MAX_ATTACHMENTS + 1].join(",");
    assert!(parse_attachments(&too_many).is_err());
}
