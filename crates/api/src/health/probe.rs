//! Dependency probes.

use async_trait::async_trait;
use store::Ping;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

/// A reachability check against one dependency.
///
/// Timing and timeouts are applied by the aggregator; a probe only reports
/// whether the dependency answered.
#[async_trait]
pub trait Probe: Send + Sync {
    fn name(&self) -> &'static str;

    async fn check(&self) -> Result<(), String>;
}

/// Pings the repository store.
#[derive(Clone)]
pub struct DatabaseProbe<S> {
    store: S,
}

impl<S: Ping> DatabaseProbe<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<S: Ping> Probe for DatabaseProbe<S> {
    fn name(&self) -> &'static str {
        "database"
    }

    async fn check(&self) -> Result<(), String> {
        self.store.ping().await.map_err(|e| e.to_string())
    }
}

/// Sends `PING` (after `AUTH` when a password is set) to a Redis server over
/// a fresh TCP connection.
#[derive(Debug, Clone)]
pub struct RedisProbe {
    addr: String,
    password: Option<String>,
}

impl RedisProbe {
    pub fn new(addr: impl Into<String>, password: Option<String>) -> Self {
        Self {
            addr: addr.into(),
            password,
        }
    }
}

/// Encodes a command as a RESP array of bulk strings.
fn resp_command(args: &[&str]) -> Vec<u8> {
    let mut out = format!("*{}\r\n", args.len()).into_bytes();
    for arg in args {
        out.extend_from_slice(format!("${}\r\n", arg.len()).as_bytes());
        out.extend_from_slice(arg.as_bytes());
        out.extend_from_slice(b"\r\n");
    }
    out
}

async fn roundtrip(
    reader: &mut BufReader<TcpStream>,
    args: &[&str],
    expected: &str,
) -> Result<(), String> {
    reader
        .get_mut()
        .write_all(&resp_command(args))
        .await
        .map_err(|e| e.to_string())?;

    let mut line = String::new();
    reader.read_line(&mut line).await.map_err(|e| e.to_string())?;
    let reply = line.trim_end();

    if reply == expected {
        Ok(())
    } else if let Some(err) = reply.strip_prefix('-') {
        Err(err.to_string())
    } else if reply.is_empty() {
        Err("connection closed".to_string())
    } else {
        Err(format!("unexpected reply: {reply}"))
    }
}

#[async_trait]
impl Probe for RedisProbe {
    fn name(&self) -> &'static str {
        "redis"
    }

    async fn check(&self) -> Result<(), String> {
        let stream = TcpStream::connect(&self.addr)
            .await
            .map_err(|e| format!("connect to {}: {e}", self.addr))?;
        let mut reader = BufReader::new(stream);

        if let Some(password) = &self.password {
            roundtrip(&mut reader, &["AUTH", password.as_str()], "+OK").await?;
        }
        roundtrip(&mut reader, &["PING"], "+PONG").await
    }
}
