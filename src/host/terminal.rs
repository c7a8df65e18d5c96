use anyhow::{Context, Result};
use std::io::Write;
use std::process::{Child, ChildStdin, Command, Stdio};

/// Executes resolved command strings in a shell session
pub trait TerminalDispatcher {
    fn send(&mut self, command: &str) -> Result<()>;
}

/// Where the shell session writes its output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellOutput {
    Inherit,
    /// Keeps stdout free, for the stdio host
    Stderr,
}

/// A long-lived shell fed through its stdin.
///
/// The shell is spawned on first use and reused while it is alive; a session
/// that has exited is replaced on the next send.
#[derive(Debug)]
pub struct ShellSession {
    shell: String,
    auto_run: bool,
    output: ShellOutput,
    child: Option<(Child, ChildStdin)>,
}

impl ShellSession {
    pub fn new(shell: impl Into<String>, auto_run: bool) -> Self {
        Self {
            shell: shell.into(),
            auto_run,
            output: ShellOutput::Inherit,
            child: None,
        }
    }

    pub fn with_output(mut self, output: ShellOutput) -> Self {
        self.output = output;
        self
    }

    fn is_active(&mut self) -> bool {
        match &mut self.child {
            Some((child, _)) => matches!(child.try_wait(), Ok(None)),
            None => false,
        }
    }

    fn session(&mut self) -> Result<&mut ChildStdin> {
        if !self.is_active() {
            let stdout = match self.output {
                ShellOutput::Inherit => Stdio::inherit(),
                ShellOutput::Stderr => Stdio::from(std::io::stderr()),
            };

            let mut child = Command::new(&self.shell)
                .stdin(Stdio::piped())
                .stdout(stdout)
                .spawn()
                .with_context(|| format!("Failed to start shell {}", self.shell))?;
            let stdin = child.stdin.take().context("Shell has no stdin")?;
            tracing::debug!("Started shell session: {}", self.shell);
            self.child = Some((child, stdin));
        }

        match &mut self.child {
            Some((_, stdin)) => Ok(stdin),
            None => anyhow::bail!("Shell session unavailable"),
        }
    }
}

impl TerminalDispatcher for ShellSession {
    fn send(&mut self, command: &str) -> Result<()> {
        let auto_run = self.auto_run;
        let stdin = self.session()?;

        stdin
            .write_all(command.as_bytes())
            .context("Failed to write to shell")?;
        if auto_run {
            stdin.write_all(b"\n").context("Failed to write to shell")?;
        }
        stdin.flush().context("Failed to flush shell input")
    }
}

impl Drop for ShellSession {
    // Closing stdin lets the shell finish queued commands before we exit.
    fn drop(&mut self) {
        if let Some((mut child, stdin)) = self.child.take() {
            drop(stdin);
            if let Err(e) = child.wait() {
                tracing::warn!("Shell session did not exit cleanly: {}", e);
            }
        }
    }
}

/// Prints commands instead of running them
#[derive(Debug, Default)]
pub struct PrintTerminal;

impl TerminalDispatcher for PrintTerminal {
    fn send(&mut self, command: &str) -> Result<()> {
        println!("{}", command);
        Ok(())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn session_runs_commands_and_is_reused() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("ran.txt");

        let mut session = ShellSession::new("sh", true);
        session
            .send(&format!("echo one >> {}", marker.display()))
            .unwrap();
        session
            .send(&format!("echo two >> {}", marker.display()))
            .unwrap();
        drop(session);

        let written = std::fs::read_to_string(&marker).unwrap();
        assert_eq!(written, "one\ntwo\n");
    }

    #[test]
    fn missing_shell_is_an_error() {
        let mut session = ShellSession::new("/definitely/not/a/shell", true);
        assert!(session.send("true").is_err());
    }
}
