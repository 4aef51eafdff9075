//! Sends one key to an agent and prints the response.
//!
//! ```text
//! hostmon-get 127.0.0.1:10050 'vfs.fs.size[/,pfree]'
//! ```

use anyhow::{bail, Context, Result};
use hostmon_agent::protocol::{encode, ZbxdProtocol};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::time::{timeout, Duration};

const TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let (Some(addr), Some(key)) = (args.next(), args.next()) else {
        bail!("usage: hostmon-get <host:port> <key>");
    };

    let value = timeout(TIMEOUT, query(&addr, &key))
        .await
        .with_context(|| format!("no response from {addr} within {}s", TIMEOUT.as_secs()))??;
    println!("{value}");
    Ok(())
}

async fn query(addr: &str, key: &str) -> Result<String> {
    let mut stream = TcpStream::connect(addr)
        .await
        .with_context(|| format!("connecting to {addr}"))?;
    stream.write_all(&encode(key)).await?;
    stream.flush().await?;
    let value = ZbxdProtocol.receive_response(&mut stream).await?;
    Ok(value)
}
