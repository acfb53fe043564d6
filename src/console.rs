//! Operator console on stdin/stdout.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

pub const PROMPT: &str = "[BOT CONSOLE] > ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleCommand {
    Status,
    Fix,
    Restart,
    Help,
    Unknown,
}

impl ConsoleCommand {
    pub fn parse(line: &str) -> Self {
        match line.trim().to_lowercase().as_str() {
            "status" => ConsoleCommand::Status,
            "fix" => ConsoleCommand::Fix,
            "restart" => ConsoleCommand::Restart,
            "help" => ConsoleCommand::Help,
            _ => ConsoleCommand::Unknown,
        }
    }

    pub fn reply(self) -> &'static str {
        match self {
            ConsoleCommand::Status => "📡 Bot is running and healthy.",
            ConsoleCommand::Fix => "🔧 Running fix script... (placeholder)",
            ConsoleCommand::Restart => {
                "♻️ Restart command issued (manual restart required if not using PM2)."
            }
            ConsoleCommand::Help => "Available commands: status, fix, restart, help",
            ConsoleCommand::Unknown => "Unknown command. Type \"help\" for options.",
        }
    }
}

/// Why the console loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleExit {
    Restart,
    InputClosed,
}

pub async fn run<R, W>(input: R, mut output: W) -> std::io::Result<ConsoleExit>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    loop {
        output.write_all(PROMPT.as_bytes()).await?;
        output.flush().await?;

        let Some(line) = lines.next_line().await? else {
            return Ok(ConsoleExit::InputClosed);
        };

        let command = ConsoleCommand::parse(&line);
        output.write_all(command.reply().as_bytes()).await?;
        output.write_all(b"\n").await?;

        if command == ConsoleCommand::Restart {
            output.flush().await?;
            return Ok(ConsoleExit::Restart);
        }
    }
}

/// Runs the console on the process stdio. `restart` exits the process with code 0.
pub async fn serve_stdio() {
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    match run(stdin, tokio::io::stdout()).await {
        Ok(ConsoleExit::Restart) => {
            tracing::warn!("restart requested from console; exiting");
            std::process::exit(0);
        }
        Ok(ConsoleExit::InputClosed) => tracing::info!("console input closed"),
        Err(e) => tracing::error!(error = %e, "console failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn session(input: &str) -> (ConsoleExit, String) {
        let mut out = Vec::new();
        let exit = run(input.as_bytes(), &mut out).await.unwrap();
        (exit, String::from_utf8(out).unwrap())
    }

    #[test]
    fn commands_are_trimmed_and_case_insensitive() {
        assert_eq!(ConsoleCommand::parse("  STATUS \n"), ConsoleCommand::Status);
        assert_eq!(ConsoleCommand::parse("Help"), ConsoleCommand::Help);
        assert_eq!(ConsoleCommand::parse(""), ConsoleCommand::Unknown);
    }

    #[tokio::test]
    async fn unknown_command_keeps_prompting() {
        let (exit, out) = session("bogus\nstatus\n").await;
        assert_eq!(exit, ConsoleExit::InputClosed);
        assert_eq!(
            out,
            format!(
                "{PROMPT}Unknown command. Type \"help\" for options.\n\
                 {PROMPT}📡 Bot is running and healthy.\n\
                 {PROMPT}"
            )
        );
    }

    #[tokio::test]
    async fn restart_stops_after_notice() {
        let (exit, out) = session("fix\nrestart\nstatus\n").await;
        assert_eq!(exit, ConsoleExit::Restart);
        assert!(out.contains("placeholder"));
        assert!(out.ends_with("(manual restart required if not using PM2).\n"));
        assert!(!out.contains("healthy"));
    }

    #[tokio::test]
    async fn help_lists_commands() {
        let (_, out) = session("help").await;
        assert!(out.contains("Available commands: status, fix, restart, help"));
    }
}
