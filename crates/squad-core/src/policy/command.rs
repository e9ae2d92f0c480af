//! External-command provider - runs the policy as a child process.
//!
//! Protocol, one exchange per tick: the observation is written to the child's
//! stdin as a JSON array on one line, the child answers with one line holding
//! an integer action code.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};

use super::{ActionCode, DecisionProvider, Observation, PolicyError};

struct Session {
    // Held so the child is killed when the session is dropped.
    _child: Child,
    stdin: ChildStdin,
    stdout: Lines<BufReader<ChildStdout>>,
}

pub struct CommandProvider {
    program: String,
    args: Vec<String>,
    timeout: Duration,
    session: Option<Session>,
    /// Set once spawning failed; the provider stays unavailable afterwards.
    broken: bool,
}

impl CommandProvider {
    /// `argv[0]` is the program, the rest its arguments.
    pub fn new(argv: &[String], timeout: Duration) -> Self {
        let (program, args) = match argv.split_first() {
            Some((program, args)) => (program.clone(), args.to_vec()),
            None => (String::new(), Vec::new()),
        };
        Self {
            broken: program.is_empty(),
            program,
            args,
            timeout,
            session: None,
        }
    }

    fn spawn(&self) -> Result<Session, PolicyError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| PolicyError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let stdin = child.stdin.take().ok_or(PolicyError::Unavailable)?;
        let stdout = child.stdout.take().ok_or(PolicyError::Unavailable)?;

        tracing::debug!(program = %self.program, "Decision provider started");
        Ok(Session {
            _child: child,
            stdin,
            stdout: BufReader::new(stdout).lines(),
        })
    }

    async fn exchange(session: &mut Session, line: &str) -> Result<String, PolicyError> {
        session.stdin.write_all(line.as_bytes()).await?;
        session.stdin.write_all(b"\n").await?;
        session.stdin.flush().await?;

        match session.stdout.next_line().await? {
            Some(reply) => Ok(reply),
            None => Err(PolicyError::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "decision provider closed its output",
            ))),
        }
    }
}

#[async_trait]
impl DecisionProvider for CommandProvider {
    async fn predict(&mut self, observation: &Observation) -> Result<ActionCode, PolicyError> {
        if self.broken {
            return Err(PolicyError::Unavailable);
        }

        if self.session.is_none() {
            match self.spawn() {
                Ok(session) => self.session = Some(session),
                Err(e) => {
                    self.broken = true;
                    return Err(e);
                }
            }
        }
        let Some(session) = self.session.as_mut() else {
            return Err(PolicyError::Unavailable);
        };

        let line = serde_json::to_string(observation)
            .map_err(|e| PolicyError::Malformed(e.to_string()))?;

        let result = tokio::time::timeout(self.timeout, Self::exchange(session, &line)).await;
        let reply = match result {
            Ok(Ok(reply)) => reply,
            Ok(Err(e)) => {
                // Restart on the next call rather than reading a half-finished stream.
                self.session = None;
                return Err(e);
            }
            Err(_) => {
                self.session = None;
                return Err(PolicyError::Timeout);
            }
        };

        let code: i64 = reply
            .trim()
            .parse()
            .map_err(|_| PolicyError::Malformed(reply.clone()))?;
        ActionCode::try_from(code)
    }

    fn is_available(&self) -> bool {
        !self.broken
    }
}
