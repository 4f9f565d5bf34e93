use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

/// Permission set applied to the isolated frame. The token list is the exact
/// value of the iframe `sandbox` attribute, so getting a flag wrong changes
/// the security properties of every run; treat this as configuration under
/// test, not detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SandboxPolicy {
    pub allow_scripts: bool,
    pub allow_same_origin: bool,
    pub allow_forms: bool,
    pub allow_popups: bool,
    pub allow_top_navigation: bool,
}

impl Default for SandboxPolicy {
    /// Scripts run; everything else, including any ability to script or
    /// navigate the parent, is denied.
    fn default() -> Self {
        Self {
            allow_scripts: true,
            allow_same_origin: false,
            allow_forms: false,
            allow_popups: false,
            allow_top_navigation: false,
        }
    }
}

impl SandboxPolicy {
    pub fn tokens(&self) -> String {
        let mut tokens = Vec::new();
        if self.allow_scripts {
            tokens.push("allow-scripts");
        }
        if self.allow_same_origin {
            tokens.push("allow-same-origin");
        }
        if self.allow_forms {
            tokens.push("allow-forms");
        }
        if self.allow_popups {
            tokens.push("allow-popups");
        }
        if self.allow_top_navigation {
            tokens.push("allow-top-navigation");
        }
        tokens.join(" ")
    }
}

#[derive(Debug)]
pub enum SandboxError {
    Io { path: PathBuf, message: String },
    Spawn(String),
}

impl fmt::Display for SandboxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, message } => {
                write!(f, "sandbox mount io error at {}: {message}", path.display())
            }
            Self::Spawn(message) => write!(f, "failed to open sandbox viewer: {message}"),
        }
    }
}

impl std::error::Error for SandboxError {}

/// Wraps the assembled document in a host page whose only content is a
/// sandboxed iframe carrying the document via `srcdoc`. The host page itself
/// contains no script, so the frame has nothing of ours to reach even if the
/// policy were loosened.
pub fn host_page(document: &str, policy: &SandboxPolicy) -> String {
    let escaped = escape_attribute(document);
    let tokens = policy.tokens();
    format!(
        "<!DOCTYPE html>\n\
         <html>\n\
         <head>\n\
         <meta charset=\"utf-8\">\n\
         <title>Tinkerpad run</title>\n\
         <style>\n\
         html, body {{ margin: 0; height: 100%; }}\n\
         iframe {{ border: 0; width: 100%; height: 100%; }}\n\
         </style>\n\
         </head>\n\
         <body>\n\
         <iframe sandbox=\"{tokens}\" srcdoc=\"{escaped}\"></iframe>\n\
         </body>\n\
         </html>\n"
    )
}

fn escape_attribute(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Owns the lifecycle of mounted runs. Every render discards the previous
/// mount and starts from a fresh directory, so no state can leak in from an
/// earlier run. Once mounted, execution belongs to the viewer process; the
/// host neither blocks on it nor can cancel it mid-flight.
pub struct SandboxRunner {
    mount_root: PathBuf,
    policy: SandboxPolicy,
    current: Option<PathBuf>,
    run_counter: u64,
}

impl SandboxRunner {
    pub fn new(mount_root: impl Into<PathBuf>, policy: SandboxPolicy) -> Self {
        Self {
            mount_root: mount_root.into(),
            policy,
            current: None,
            run_counter: 0,
        }
    }

    pub fn policy(&self) -> &SandboxPolicy {
        &self.policy
    }

    pub fn mounted(&self) -> Option<&Path> {
        self.current.as_deref()
    }

    /// Writes the host page for `document` into a fresh mount directory,
    /// discarding any previous mount first. Returns the host page path.
    pub fn mount(&mut self, document: &str) -> Result<PathBuf, SandboxError> {
        self.discard();

        self.run_counter += 1;
        let run_dir = self.mount_root.join(format!(
            "run_{}_{}_{}",
            std::process::id(),
            now_nanos(),
            self.run_counter
        ));
        fs::create_dir_all(&run_dir).map_err(|err| SandboxError::Io {
            path: run_dir.clone(),
            message: err.to_string(),
        })?;

        let host_path = run_dir.join("host.html");
        fs::write(&host_path, host_page(document, &self.policy)).map_err(|err| {
            SandboxError::Io {
                path: host_path.clone(),
                message: err.to_string(),
            }
        })?;

        self.current = Some(run_dir);
        Ok(host_path)
    }

    /// Mounts `document` and opens it in the platform viewer. There is no
    /// return channel: whatever the sandboxed code prints or throws stays
    /// inside the frame.
    pub fn render(&mut self, document: &str) -> Result<PathBuf, SandboxError> {
        let host_path = self.mount(document)?;
        open_in_viewer(&host_path)?;
        Ok(host_path)
    }

    /// Removes the current mount, if any. Errors are ignored; the directory
    /// is throwaway.
    pub fn discard(&mut self) {
        if let Some(dir) = self.current.take() {
            let _ = fs::remove_dir_all(dir);
        }
    }
}

impl Drop for SandboxRunner {
    fn drop(&mut self) {
        self.discard();
    }
}

#[cfg(target_os = "macos")]
fn open_in_viewer(path: &Path) -> Result<(), SandboxError> {
    Command::new("open")
        .arg(path)
        .spawn()
        .map(|_| ())
        .map_err(|err| SandboxError::Spawn(err.to_string()))
}

#[cfg(target_os = "windows")]
fn open_in_viewer(path: &Path) -> Result<(), SandboxError> {
    Command::new("cmd")
        .args(["/C", "start", ""])
        .arg(path)
        .spawn()
        .map(|_| ())
        .map_err(|err| SandboxError::Spawn(err.to_string()))
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn open_in_viewer(path: &Path) -> Result<(), SandboxError> {
    Command::new("xdg-open")
        .arg(path)
        .spawn()
        .map(|_| ())
        .map_err(|err| SandboxError::Spawn(err.to_string()))
}

fn now_nanos() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_nanos())
        .unwrap_or(0)
}
