//! Presentation layer used for interactive runs.
use std::io::{self, IsTerminal, Write};

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use crate::{
    cli::{Arguments, EffectiveConfig},
    launcher::{channel, dispatch},
    packager::PackagerFactory,
};

/// Everything the launcher needs from a user-facing shell.
#[async_trait]
pub trait Presenter: Send + Sync {
    /// Take over an interactive run. Its outcome is not reported back.
    async fn run_interactive(&self, config: &EffectiveConfig, factory: &dyn PackagerFactory);

    /// Show a message the user has to acknowledge.
    fn show_blocking_message(&self, title: &str, body: &str);
}

/// Line-oriented terminal shell.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPresenter;

#[async_trait]
impl Presenter for TerminalPresenter {
    async fn run_interactive(&self, config: &EffectiveConfig, factory: &dyn PackagerFactory) {
        let product = config.product_name().unwrap_or_default();
        match config.application_name() {
            Some(application) => {
                eprintln!("Package diagnostic information for {product} ({application})")
            }
            None => eprintln!("Package diagnostic information for {product}"),
        }

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let Some(args) = prompt_channel_args(&mut lines).await else {
            eprintln!("No transmit mode selected; nothing was sent.");
            return;
        };
        let token = args.transmit_mode.clone().unwrap_or_default();

        let request = match channel::resolve(&token, &args) {
            Ok(request) => request,
            Err(err) => {
                eprintln!("{err}");
                return;
            }
        };

        match dispatch::transmit(factory, config, request).await {
            Ok(receipt) => eprintln!(
                "Sent {} session(s) to {}.",
                receipt.session_count, receipt.destination
            ),
            Err(fault) => eprintln!("The diagnostic package could not be sent: {fault}"),
        }
    }

    fn show_blocking_message(&self, title: &str, body: &str) {
        eprintln!("{title}");
        eprintln!("{body}");
        if io::stdin().is_terminal() {
            eprint!("Press Enter to close.");
            let _ = io::stderr().flush();
            let mut buffer = String::new();
            let _ = io::stdin().read_line(&mut buffer);
        }
    }
}

async fn prompt_channel_args(lines: &mut Lines<BufReader<Stdin>>) -> Option<Arguments> {
    let mode = prompt(lines, "Transmit mode [file/email/server]: ").await?;
    let mut args = Arguments {
        transmit_mode: Some(mode.clone()),
        ..Arguments::default()
    };
    match mode.to_ascii_lowercase().as_str() {
        "file" => {
            args.destination = prompt(lines, "Destination file: ").await;
        }
        "email" => {
            args.destination = prompt(lines, "Send to: ").await;
            args.from = prompt(lines, "From: ").await;
        }
        "server" => {
            args.customer = prompt(lines, "Customer: ").await;
        }
        _ => {}
    }
    Some(args)
}

async fn prompt(lines: &mut Lines<BufReader<Stdin>>, label: &str) -> Option<String> {
    eprint!("{label}");
    let _ = io::stderr().flush();
    match lines.next_line().await {
        Ok(Some(line)) => {
            let line = line.trim().to_string();
            (!line.is_empty()).then_some(line)
        }
        _ => None,
    }
}
