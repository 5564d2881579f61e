//! Minimal Docker CLI wrapper for integration tests.
//!
//! Shells out to `docker` rather than talking to the daemon API. Containers
//! are started detached with `--rm`, publish their ports on an ephemeral
//! loopback port, and are force-removed when the [`Container`] is dropped.
//!
//! ```ignore
//! let container = Container::run(containers::postgres("16-alpine", "test"))?;
//! container.wait_for_log("database system is ready to accept connections", Duration::from_secs(30))?;
//! let port = container.wait_for_port(5432, Duration::from_secs(10))?;
//! ```

use std::fmt;
use std::net::{SocketAddr, TcpStream};
use std::process::{Command, Output};
use std::thread;
use std::time::{Duration, Instant};

const POLL: Duration = Duration::from_millis(200);

#[derive(Debug)]
pub enum Error {
    /// The `docker` binary could not be spawned.
    Spawn(std::io::Error),
    /// A docker command exited unsuccessfully.
    Command { args: String, stderr: String },
    /// A wait ran past its deadline.
    Timeout(String),
    /// `docker port` printed something unexpected.
    Port(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Spawn(e) => write!(f, "failed to run docker: {e}"),
            Error::Command { args, stderr } => write!(f, "docker {args} failed: {stderr}"),
            Error::Timeout(what) => write!(f, "timed out waiting for {what}"),
            Error::Port(out) => write!(f, "unexpected docker port output: {out:?}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Spawn(e) => Some(e),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

fn docker(args: &[&str]) -> Result<Output> {
    let output = Command::new("docker").args(args).output().map_err(Error::Spawn)?;
    if !output.status.success() {
        return Err(Error::Command {
            args: args.join(" "),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(output)
}

/// True when a docker daemon answers.
pub fn available() -> bool {
    docker(&["info", "--format", "{{.ServerVersion}}"]).is_ok()
}

/// What to run.
#[derive(Debug, Clone, Default)]
pub struct RunConfig {
    pub image: String,
    pub env: Vec<(String, String)>,
    /// Container ports published on an ephemeral `127.0.0.1` port.
    pub ports: Vec<u16>,
}

impl RunConfig {
    pub fn new(image: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            ..Default::default()
        }
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.ports.push(port);
        self
    }
}

/// Ready-made configurations.
pub mod containers {
    use super::RunConfig;

    /// `postgres:<tag>` with the given superuser password.
    pub fn postgres(tag: &str, password: &str) -> RunConfig {
        RunConfig::new(format!("postgres:{tag}"))
            .env("POSTGRES_PASSWORD", password)
            .port(5432)
    }
}

/// A running container, removed on drop.
#[derive(Debug)]
pub struct Container {
    id: String,
}

impl Container {
    /// `docker run -d --rm` the configuration.
    pub fn run(config: RunConfig) -> Result<Self> {
        let mut args: Vec<String> = vec!["run".into(), "-d".into(), "--rm".into()];
        for (key, value) in &config.env {
            args.push("-e".into());
            args.push(format!("{key}={value}"));
        }
        for port in &config.ports {
            args.push("-p".into());
            args.push(format!("127.0.0.1::{port}"));
        }
        args.push(config.image.clone());

        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        let output = docker(&args)?;
        let id = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok(Self { id })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Combined stdout and stderr logged so far.
    pub fn logs(&self) -> Result<String> {
        let output = docker(&["logs", &self.id])?;
        let mut logs = String::from_utf8_lossy(&output.stdout).into_owned();
        logs.push_str(&String::from_utf8_lossy(&output.stderr));
        Ok(logs)
    }

    /// Block until `needle` shows up in the logs.
    pub fn wait_for_log(&self, needle: &str, timeout: Duration) -> Result<()> {
        self.wait_for_log_count(needle, 1, timeout)
    }

    /// Block until `needle` has been logged at least `count` times.
    pub fn wait_for_log_count(&self, needle: &str, count: usize, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        loop {
            if self.logs()?.matches(needle).count() >= count {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(Error::Timeout(format!("{needle:?} x{count}")));
            }
            thread::sleep(POLL);
        }
    }

    /// The host port `container_port` is published on.
    pub fn host_port(&self, container_port: u16) -> Result<u16> {
        let output = docker(&["port", &self.id, &format!("{container_port}/tcp")])?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        // one "host:port" line per bound address
        stdout
            .lines()
            .next()
            .and_then(|line| line.rsplit(':').next())
            .and_then(|port| port.trim().parse().ok())
            .ok_or_else(|| Error::Port(stdout.to_string()))
    }

    /// Block until the published port accepts TCP connections, and return it.
    pub fn wait_for_port(&self, container_port: u16, timeout: Duration) -> Result<u16> {
        let port = self.host_port(container_port)?;
        let addr = SocketAddr::from(([127, 0, 0, 1], port));
        let deadline = Instant::now() + timeout;
        loop {
            if TcpStream::connect_timeout(&addr, POLL).is_ok() {
                return Ok(port);
            }
            if Instant::now() >= deadline {
                return Err(Error::Timeout(format!("port {port}")));
            }
            thread::sleep(POLL);
        }
    }
}

impl Drop for Container {
    fn drop(&mut self) {
        let _ = Command::new("docker").args(["rm", "-f", &self.id]).output();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_postgres_config() {
        let config = containers::postgres("16-alpine", "test");
        assert_eq!(config.image, "postgres:16-alpine");
        assert_eq!(config.env, [("POSTGRES_PASSWORD".to_string(), "test".to_string())]);
        assert_eq!(config.ports, [5432]);
    }

    #[test]
    fn test_error_display() {
        let err = Error::Command {
            args: "run -d nope".into(),
            stderr: "Unable to find image".into(),
        };
        assert_eq!(err.to_string(), "docker run -d nope failed: Unable to find image");
        assert_eq!(Error::Timeout("port 1".into()).to_string(), "timed out waiting for port 1");
    }
}
