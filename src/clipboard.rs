use std::io::Write;
use std::process::{Command, Stdio};

use eyre::{Result, bail};
use log::debug;

/// Somewhere copied text can be placed
pub trait Clipboard {
    fn write_text(&self, text: &str) -> Result<()>;
}

/// Platform copy tools, tried in order
const TOOLS: [(&str, &[&str]); 5] = [
    ("pbcopy", &[]),
    ("wl-copy", &[]),
    ("xclip", &["-selection", "clipboard"]),
    ("xsel", &["--clipboard", "--input"]),
    ("clip.exe", &[]),
];

/// A program that reads text on stdin and puts it on the clipboard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyTool {
    pub program: String,
    pub args: Vec<String>,
}

impl CopyTool {
    pub fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    fn copy(&self, text: &str) -> Result<()> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;

        // stdin is dropped at the end of the arm so the tool sees EOF before we wait
        let written = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(text.as_bytes()),
            None => Ok(()),
        };
        let status = child.wait()?;
        written?;

        if !status.success() {
            bail!("{} exited with status {status}", self.program);
        }
        Ok(())
    }
}

/// The system clipboard, reached through the first copy tool that works
#[derive(Debug, Clone)]
pub struct SystemClipboard {
    tools: Vec<CopyTool>,
}

impl Default for SystemClipboard {
    fn default() -> Self {
        Self::with_tools(TOOLS.iter().map(|(program, args)| CopyTool::new(program, args)).collect())
    }
}

impl SystemClipboard {
    pub fn with_tools(tools: Vec<CopyTool>) -> Self {
        Self { tools }
    }

    /// Name of the first copy tool found on `PATH`, if any
    pub fn available_tool(&self) -> Option<&str> {
        self.tools
            .iter()
            .map(|t| t.program.as_str())
            .find(|program| on_path(program))
    }
}

impl Clipboard for SystemClipboard {
    fn write_text(&self, text: &str) -> Result<()> {
        for tool in &self.tools {
            match tool.copy(text) {
                Ok(()) => {
                    debug!("Copied {} bytes via {}", text.len(), tool.program);
                    return Ok(());
                }
                Err(e) => debug!("Copy tool {} failed: {e}", tool.program),
            }
        }

        let names: Vec<&str> = self.tools.iter().map(|t| t.program.as_str()).collect();
        bail!("no clipboard tool succeeded (tried {})", names.join(", "));
    }
}

fn on_path(name: &str) -> bool {
    std::env::var_os("PATH")
        .map(|paths| std::env::split_paths(&paths).any(|dir| dir.join(name).is_file()))
        .unwrap_or(false)
}
