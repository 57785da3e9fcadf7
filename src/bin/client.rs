//! Interactive line client for manual testing.
//!
//! Reads commands from stdin, sends each as one line, and prints the
//! server's reply up to the blank-line terminator.

use anyhow::Context;
use std::env;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let addr = env::args()
        .nth(1)
        .unwrap_or_else(|| "127.0.0.1:12345".to_string());
    let stream = TcpStream::connect(&addr)
        .await
        .with_context(|| format!("failed to connect to {}", addr))?;
    println!("Connected to {}", addr);
    println!("Type one command per line. An empty line quits.");

    let (reader, mut writer) = stream.into_split();
    let mut server_lines = BufReader::new(reader).lines();
    let mut stdin = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = stdin.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            break;
        }
        writer.write_all(line.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;

        while let Some(reply) = server_lines.next_line().await? {
            if reply.is_empty() {
                break;
            }
            println!("{}", reply);
        }
    }
    Ok(())
}
