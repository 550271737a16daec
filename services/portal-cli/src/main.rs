use std::io::Write as _;

use gp_chain_client::{GifProgram, InMemoryGifProgram};
use gp_chain_devnet::{GIF_PROGRAM_URL_ENV, HttpGifProgram};
use gp_portal_core::{Notice, PORTAL_TAGLINE, PORTAL_TITLE, PortalApp, View, social_link};
use gp_wallet_session::LocalKeyProvider;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

/// Marks the in-process wallet as previously approved so the silent
/// reconnect path runs on startup.
const WALLET_TRUSTED_ENV: &str = "GIF_WALLET_TRUSTED";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let trusted = std::env::var(WALLET_TRUSTED_ENV).is_ok_and(|value| value == "1");
    let provider = LocalKeyProvider::generate(trusted);

    let program: Box<dyn GifProgram> = if std::env::var(GIF_PROGRAM_URL_ENV).is_ok() {
        let http = HttpGifProgram::default();
        info!("using the gif program at {}", http.endpoint());
        Box::new(http)
    } else {
        info!("no {GIF_PROGRAM_URL_ENV} set; using the in-memory program with the starter list");
        Box::new(InMemoryGifProgram::with_fixture(&provider.wallet_address()))
    };

    let mut app = PortalApp::new(provider, program);
    app.on_load().await;

    print_header();
    print_view(&app.render());
    print_prompt();

    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        let (command, rest) = match line.split_once(' ') {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };

        match command {
            "" => {}
            "connect" => app.connect_wallet().await,
            "disconnect" => app.disconnect_wallet(),
            "init" => app.initialize_account().await,
            "draft" => app.set_draft(rest),
            "submit" => app.submit_gif().await,
            "add" => {
                app.set_draft(rest);
                app.submit_gif().await;
            }
            "list" => app.refresh_list().await,
            "help" => print_help(),
            "quit" | "exit" => break,
            other => println!("unknown command: {other} (try `help`)"),
        }

        print_view(&app.render());
        print_prompt();
    }

    Ok(())
}

fn print_header() {
    println!("🖼  {PORTAL_TITLE}");
    println!("{PORTAL_TAGLINE} ✨");
    println!("built on @{} — {}", gp_portal_core::SOCIAL_HANDLE, social_link());
    println!();
}

fn print_help() {
    println!("commands:");
    println!("  connect            request wallet approval");
    println!("  disconnect         clear the wallet session");
    println!("  init               create the gif account (one time)");
    println!("  draft <text>       set the pending gif link");
    println!("  submit             submit the pending draft");
    println!("  add <link>         draft and submit in one step");
    println!("  list               refresh the gif list");
    println!("  quit               leave the portal");
}

fn print_view(view: &View) {
    println!();
    match view {
        View::ConnectPrompt { notice } => {
            println!("No wallet connected. Type `connect` to get started.");
            print_notice(notice.as_ref());
        }
        View::InitializePrompt { address, notice } => {
            println!("Connected as {}.", short_address(&address.0));
            println!("One-time gif account setup needed. Type `init` to create it.");
            print_notice(notice.as_ref());
        }
        View::Gallery {
            address,
            entries,
            draft,
            submitting,
            notice,
        } => {
            println!("Connected as {}.", short_address(&address.0));
            if entries.is_empty() {
                println!("No gifs yet. Type `add <link>` to submit the first one.");
            } else {
                for (index, entry) in entries.iter().enumerate() {
                    match &entry.submitter {
                        Some(submitter) => println!(
                            "  {:>3}. {}  (by {})",
                            index + 1,
                            entry.link,
                            short_address(&submitter.0)
                        ),
                        None => println!("  {:>3}. {}", index + 1, entry.link),
                    }
                }
            }
            if !draft.is_empty() {
                println!("draft: {draft}");
            }
            if *submitting {
                println!("submitting…");
            }
            print_notice(notice.as_ref());
        }
    }
}

fn print_notice(notice: Option<&Notice>) {
    let Some(notice) = notice else {
        return;
    };

    let line = match notice {
        Notice::WalletMissing => "No wallet provider found. Install one and retry.".to_string(),
        Notice::ConnectionCancelled => "Connection cancelled.".to_string(),
        Notice::ConnectFailed(reason) => format!("Connection failed: {reason}"),
        Notice::ListUnavailable(reason) => {
            format!("Gif list unavailable: {reason}. Retry with `init` or `list`.")
        }
        Notice::EmptyDraft => "Empty gif link given, try again.".to_string(),
        Notice::SubmitFailed(reason) => {
            format!("Submission failed, your draft was kept: {reason}")
        }
    };

    println!("! {line}");
}

fn short_address(address: &str) -> String {
    if address.len() <= 12 {
        return address.to_string();
    }

    format!("{}…{}", &address[..6], &address[address.len() - 6..])
}

fn print_prompt() {
    print!("> ");
    let _ = std::io::stdout().flush();
}
