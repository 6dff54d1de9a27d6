//! Line-oriented adapter: `<account> <conversation> <text>` in, one JSON
//! object per line out.

use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{error, info};

use super::{dispatch, Command, CommandContext, ErrorPayload, Reply};
use crate::domain::{AccountId, ConversationId};
use crate::errors::{DomainError, ValidationKind};
use crate::state::AppState;

#[derive(Serialize)]
#[serde(rename_all = "snake_case")]
enum Output<'a> {
    Ok(&'a Reply),
    Error(ErrorPayload),
}

fn parse_line(line: &str) -> Result<(CommandContext, &str), DomainError> {
    let mut parts = line.splitn(3, char::is_whitespace);
    let (Some(account), Some(conversation), Some(text)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(DomainError::validation(
            ValidationKind::InvalidInput,
            "expected <account> <conversation> <text>",
        ));
    };
    let ctx = CommandContext {
        account: AccountId::from(account),
        display_name: account.to_string(),
        conversation: ConversationId::from(conversation),
    };
    Ok((ctx, text))
}

/// Handle one input line and render the JSON answer.
pub fn handle_line(state: &AppState, line: &str) -> String {
    let result = parse_line(line).and_then(|(ctx, text)| {
        let command = Command::parse(text)?;
        dispatch(state, &ctx, command)
    });

    let rendered = match &result {
        Ok(reply) => serde_json::to_string(&Output::Ok(reply)),
        Err(err) => {
            if err.is_internal() {
                error!(error = %err, "command failed");
            }
            serde_json::to_string(&Output::Error(ErrorPayload::from(err)))
        }
    };
    rendered.unwrap_or_else(|e| {
        error!(error = %e, "reply encoding failed");
        r#"{"error":{"code":"INTERNAL","title":"Internal","detail":"internal error"}}"#.to_string()
    })
}

pub async fn run<R, W>(state: &AppState, reader: R, mut writer: W) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    info!("console transport ready");
    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let out = handle_line(state, line);
        writer.write_all(out.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
    }
    info!("console input closed");
    Ok(())
}
