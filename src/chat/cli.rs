//! CLI front end — stdin/stdout REPL over a single conversation.

use tokio::io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use crate::intake::{ConversationState, IntakeMachine, Reply};

/// Input that ends the REPL.
const QUIT_COMMAND: &str = "/quit";

/// Run the REPL on stdin/stdout until EOF or `/quit`.
pub async fn run(machine: &IntakeMachine) -> std::io::Result<()> {
    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();
    run_with(machine, stdin, &mut stdout).await
}

/// REPL over arbitrary reader/writer.
pub async fn run_with<R, W>(
    machine: &IntakeMachine,
    reader: R,
    writer: &mut W,
) -> std::io::Result<()>
where
    R: tokio::io::AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut state = ConversationState::default();
    let mut lines = reader.lines();

    write_reply(writer, &machine.welcome()).await?;

    loop {
        writer.write_all(b"> ").await?;
        writer.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break; // EOF
        };
        if line.trim() == QUIT_COMMAND {
            break;
        }

        let reply = machine.process(&mut state, &line).await;
        write_reply(writer, &reply).await?;
    }
    Ok(())
}

async fn write_reply<W: AsyncWrite + Unpin>(writer: &mut W, reply: &Reply) -> std::io::Result<()> {
    let mut out = format!("\n{}\n", reply.text);
    if let Some(ref id) = reply.chart_id {
        out.push_str(&format!("📈 Gráfico: {id}\n"));
    }
    out.push('\n');
    writer.write_all(out.as_bytes()).await
}
