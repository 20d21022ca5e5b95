use anyhow::Result;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use search_agent::config::CONFIG;
use search_agent::session::{Session, SessionState, SessionView};

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Search(String),
    Suggest(String),
    Accept,
    More,
    Quit,
    Help,
}

fn parse_command(line: &str) -> Option<Command> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    };

    let command = match head {
        "/search" => Command::Search(rest.to_string()),
        "/suggest" => Command::Suggest(rest.to_string()),
        "/yes" | "/accept" => Command::Accept,
        "/next" | "/no" | "/more" => Command::More,
        "/quit" | "/exit" => Command::Quit,
        _ if head.starts_with('/') => Command::Help,
        _ => Command::Search(line.to_string()),
    };
    Some(command)
}

fn print_help() {
    println!("commands:");
    println!("  <text> | /search <text>   search");
    println!("  /suggest <text>           autocomplete suggestions");
    println!("  /yes                      accept the results shown and finish");
    println!("  /next                     show the next results");
    println!("  /quit                     leave without accepting");
}

fn render(view: &SessionView) {
    println!();
    for (i, result) in view.current_page.iter().enumerate() {
        println!("{}. {}", i + 1, result.title);
        println!("   {}", result.summary);
        println!("   {}", result.link);
    }
    if !view.suggestions.is_empty() {
        println!("suggestions: {}", view.suggestions.join(" | "));
    }
    if view.loading {
        println!("loading...");
    } else if view.queued > 0 {
        println!("({} more queued)", view.queued);
    }
    if let Some(error) = &view.error {
        println!("connection problem: {error}");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Also picks up records from the log crate
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&CONFIG.log_filter))
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let (mut session, mut inbound) = Session::connect(&CONFIG).await?;
    tracing::info!(session = session.id(), url = %CONFIG.ws_url, "connected");
    print_help();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut inbound_open = true;

    loop {
        tokio::select! {
            event = inbound.recv(), if inbound_open => match event {
                Some(event) => {
                    session.handle_event(event);
                    render(&session.view());
                }
                None => inbound_open = false,
            },
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let Some(command) = parse_command(&line) else { continue };
                match command {
                    Command::Search(text) => {
                        if !session.submit_query(&text) {
                            println!("nothing to search for");
                        }
                    }
                    Command::Suggest(text) => {
                        session.request_suggestions(&text);
                    }
                    Command::More => {
                        session.more();
                    }
                    Command::Accept => match session.accept().await {
                        Ok(stored) => println!("stored {stored} results"),
                        Err(e) => println!("{:#}", e),
                    },
                    Command::Quit => break,
                    Command::Help => print_help(),
                }
                render(&session.view());
                if session.state() == SessionState::Closed {
                    break;
                }
            }
        }
    }

    // let the writer flush queued frames and finish the close handshake
    drop(session);
    if inbound_open {
        let _ = tokio::time::timeout(Duration::from_secs(2), async {
            while inbound.recv().await.is_some() {}
        })
        .await;
    }

    Ok(())
}

#[test]
fn test_parse_command() {
    assert_eq!(parse_command("   "), None);
    assert_eq!(
        parse_command("rust ownership"),
        Some(Command::Search("rust ownership".to_string()))
    );
    assert_eq!(
        parse_command("/suggest rus"),
        Some(Command::Suggest("rus".to_string()))
    );
    assert_eq!(parse_command("/no"), Some(Command::More));
    assert_eq!(parse_command("/yes"), Some(Command::Accept));
    assert_eq!(parse_command("/wat"), Some(Command::Help));
}
