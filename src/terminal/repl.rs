//! Interactive chat loop (`supermaya chat`)

use anyhow::Result;
use std::io::Write;
use std::path::PathBuf;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use super::render::{latest_tags, render_message};
use super::App;
use crate::api::{Attachment, ChatBackend};
use crate::chat::{self, ChatState, Sender, Vote};

const HELP: &str = "\
Type a question and press Enter.
  /attach <path>  attach an image to the next question
  /detach         drop the attached image
  /tag <N>        ask more about tag N of the last image answer
  /good, /bad     rate the last answer
  /history        load earlier exchanges
  /logout         log out and leave
  /quit           leave
";

/// One line of input
#[derive(Debug, Clone, PartialEq)]
pub enum ReplCommand {
    Send(String),
    Attach(PathBuf),
    Detach,
    Tag(usize),
    Rate(Vote),
    History,
    Logout,
    Quit,
    Help,
    Invalid(String),
}

impl ReplCommand {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        let Some(command) = line.strip_prefix('/') else {
            return ReplCommand::Send(line.to_string());
        };

        let (name, arg) = match command.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (command, ""),
        };

        match name {
            "attach" if !arg.is_empty() => ReplCommand::Attach(PathBuf::from(arg)),
            "attach" => ReplCommand::Invalid("Usage: /attach <path>".to_string()),
            "detach" => ReplCommand::Detach,
            "tag" => match arg.parse::<usize>() {
                Ok(n) if n > 0 => ReplCommand::Tag(n),
                _ => ReplCommand::Invalid("Usage: /tag <N> (N starts at 1)".to_string()),
            },
            "good" => ReplCommand::Rate(Vote::Good),
            "bad" => ReplCommand::Rate(Vote::Bad),
            "history" => ReplCommand::History,
            "logout" => ReplCommand::Logout,
            "quit" | "exit" => ReplCommand::Quit,
            "help" => ReplCommand::Help,
            other => ReplCommand::Invalid(format!("Unknown command /{}. Try /help.", other)),
        }
    }
}

/// Run the loop until `/quit`, `/logout` or end of input
pub async fn run<B, R, W>(app: &mut App<B>, input: R, out: &mut W) -> Result<()>
where
    B: ChatBackend,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    app.require_chat()?;

    let mut chat = ChatState::new();
    let mut history_page = 0u32;
    let mut lines = input.lines();

    writeln!(out, "SuperMaya Workspace. /help for commands.")?;
    prompt(&chat, out)?;

    while let Some(line) = lines.next_line().await? {
        match ReplCommand::parse(&line) {
            ReplCommand::Send(text) => {
                chat.set_input(text);
                send(app, &mut chat, None, out).await?;
            }
            ReplCommand::Attach(path) => match Attachment::from_path(&path).await {
                Ok(attachment) => {
                    writeln!(out, "Attached {}", attachment.file_name)?;
                    chat.attach(attachment);
                }
                Err(e) => writeln!(out, "{}", e)?,
            },
            ReplCommand::Detach => match chat.detach() {
                Some(attachment) => writeln!(out, "Removed {}", attachment.file_name)?,
                None => writeln!(out, "No image attached")?,
            },
            ReplCommand::Tag(n) => match latest_tags(chat.messages()).get(n - 1) {
                Some(tag) => {
                    let query = chat::tag_query(tag);
                    send(app, &mut chat, Some(&query), out).await?;
                }
                None => writeln!(out, "No tag {} on the last answer", n)?,
            },
            ReplCommand::Rate(vote) => {
                let target = chat
                    .messages()
                    .iter()
                    .rev()
                    .find(|m| m.sender == Sender::Ai)
                    .and_then(|m| m.interaction_id.clone());
                let outcome = chat::submit_feedback(&app.backend, target.as_ref(), vote).await;
                match outcome.message() {
                    Some(message) => writeln!(out, "{}", message)?,
                    None => writeln!(out, "Nothing to rate yet")?,
                }
            }
            ReplCommand::History => {
                let page = app.config.history.page(history_page);
                match app.backend.history(page).await {
                    Ok(records) => {
                        let before = chat.messages().len();
                        let count = chat.replay_history(&records)?;
                        for message in &chat.messages()[before..] {
                            write!(out, "{}", render_message(message))?;
                        }
                        writeln!(out, "Loaded {} earlier exchanges", count)?;
                        history_page += 1;
                    }
                    Err(e) => writeln!(out, "Could not load history: {}", e)?,
                }
            }
            ReplCommand::Logout => {
                chat.abandon();
                app.logout()?;
                writeln!(out, "Logged out")?;
                return Ok(());
            }
            ReplCommand::Quit => return Ok(()),
            ReplCommand::Help => write!(out, "{}", HELP)?,
            ReplCommand::Invalid(message) => writeln!(out, "{}", message)?,
        }
        prompt(&chat, out)?;
    }

    Ok(())
}

async fn send<B, W>(app: &App<B>, chat: &mut ChatState, query_override: Option<&str>, out: &mut W) -> Result<()>
where
    B: ChatBackend,
    W: Write,
{
    match chat.send(&app.backend, query_override).await {
        Ok(_) => {
            if let Some(reply) = chat.messages().last() {
                write!(out, "{}", render_message(reply))?;
            }
        }
        Err(chat::SendRejected::Empty) => {}
        Err(e) => writeln!(out, "{}", e)?,
    }
    Ok(())
}

fn prompt<W: Write>(chat: &ChatState, out: &mut W) -> Result<()> {
    write!(out, "{} > ", chat.input_placeholder())?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::session::{MemoryTokenStore, Screen, TokenStore};
    use crate::testing::{Call, FakeBackend};
    use std::sync::Arc;

    fn logged_in(backend: FakeBackend) -> App<FakeBackend> {
        App::new(
            Config::default(),
            Arc::new(MemoryTokenStore::with_token("t")),
            backend,
        )
    }

    async fn transcript(app: &mut App<FakeBackend>, input: &str) -> String {
        let mut out = Vec::new();
        run(app, input.as_bytes(), &mut out).await.unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(ReplCommand::parse("  hello  "), ReplCommand::Send("hello".to_string()));
        assert_eq!(
            ReplCommand::parse("/attach ~/pics/desk.png"),
            ReplCommand::Attach(PathBuf::from("~/pics/desk.png"))
        );
        assert_eq!(ReplCommand::parse("/tag 2"), ReplCommand::Tag(2));
        assert!(matches!(ReplCommand::parse("/tag 0"), ReplCommand::Invalid(_)));
        assert!(matches!(ReplCommand::parse("/attach"), ReplCommand::Invalid(_)));
        assert_eq!(ReplCommand::parse("/bad"), ReplCommand::Rate(Vote::Bad));
        assert_eq!(ReplCommand::parse("/exit"), ReplCommand::Quit);
        assert!(matches!(ReplCommand::parse("/dance"), ReplCommand::Invalid(_)));
    }

    #[tokio::test]
    async fn test_refuses_when_logged_out() {
        let mut app = App::new(
            Config::default(),
            Arc::new(MemoryTokenStore::new()),
            FakeBackend::default(),
        );
        let mut out = Vec::new();
        assert!(run(&mut app, "hello\n".as_bytes(), &mut out).await.is_err());
        assert!(app.backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_question_then_rating() {
        let mut app = logged_in(FakeBackend::replying("plain answer"));
        let output = transcript(&mut app, "Hello\n\n/good\n/quit\n").await;

        assert!(output.contains("maya> plain answer\n"));
        assert!(output.contains("Feedback submitted!"));
        assert_eq!(
            app.backend.calls(),
            vec![
                Call::TextQuery("Hello".to_string()),
                Call::Feedback {
                    id: "1".to_string(),
                    is_good: true
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_tag_follow_up() {
        let reply = r#"{"image_description": "A desk", "identified_objects": ["laptop", "mug"]}"#;
        let mut app = logged_in(FakeBackend::replying(reply));
        let output = transcript(&mut app, "what is on my desk\n/tag 2\n/tag 9\n").await;

        assert!(output.contains("No tag 9 on the last answer"));
        assert_eq!(
            app.backend.calls()[1],
            Call::TextQuery("Tell me more about mug".to_string())
        );
    }

    #[tokio::test]
    async fn test_history_pages_advance() {
        let backend = FakeBackend {
            history: serde_json::from_str(
                r#"[{"id": 4, "user_query": "earlier", "ai_response": "before", "feedback_score": 0}]"#,
            )
            .unwrap(),
            ..Default::default()
        };
        let mut app = logged_in(backend);
        let output = transcript(&mut app, "/history\n/history\n").await;

        assert!(output.contains("you> earlier\nmaya> before\n"));
        assert_eq!(
            app.backend.calls(),
            vec![
                Call::History(crate::api::HistoryPage { skip: 0, limit: 10 }),
                Call::History(crate::api::HistoryPage { skip: 10, limit: 10 }),
            ]
        );
    }

    #[tokio::test]
    async fn test_rating_before_any_answer() {
        let mut app = logged_in(FakeBackend::default());
        let output = transcript(&mut app, "/bad\n").await;
        assert!(output.contains("Nothing to rate yet"));
        assert!(app.backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_logout_clears_session() {
        let mut app = logged_in(FakeBackend::default());
        let output = transcript(&mut app, "/logout\nHello\n").await;

        assert!(output.contains("Logged out"));
        assert_eq!(app.session.screen(), Screen::Auth);
        assert!(app.session.store().load().is_none());
        assert!(app.backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_attach_missing_file() {
        let mut app = logged_in(FakeBackend::default());
        let output = transcript(&mut app, "/attach /no/such/dir/cat.png\n/detach\n").await;
        assert!(output.contains("Invalid attachment: cat.png"));
        assert!(output.contains("No image attached"));
    }
}
