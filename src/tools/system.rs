use super::process::{output_with_timeout, spawn_detached};
use super::{optional_str, optional_u64, required_str, ToolError, ToolResult, ToolRunner};
use crate::host::HostSnapshot;
use crate::types::{StepArgs, ToolOutcome};
use chrono::{DateTime, Duration as ChronoDuration, Local, NaiveTime, TimeZone};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::{Read, Write};
use std::path::PathBuf;
use std::process::{Command, Output};
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, info, warn};

static TITLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title>").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static PHONE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\+?[0-9][0-9 \-]{6,}$").unwrap());

/// Largest page body `fetch_webpage` will read.
pub const MAX_PAGE_BYTES: usize = 5 * 1024 * 1024;
const PAGE_WIDTH: usize = 120;

const TOOL_NAMES: &[&str] = &[
    "open_url",
    "google_search",
    "youtube_search",
    "send_whatsapp_message",
    "gmail_send",
    "open_application",
    "close_application",
    "git_action",
    "power_action",
    "set_reminder",
    "list_reminders",
    "take_note",
    "remember_fact",
    "media_control",
    "get_system_info",
    "take_screenshot",
    "read_screen",
    "fetch_webpage",
];

#[derive(Debug, Clone)]
pub struct SystemToolConfig {
    pub data_dir: PathBuf,
    pub exclusive_tools: Vec<String>,
    pub command_timeout: Duration,
    pub fetch_max_chars: usize,
    pub git_repo: Option<PathBuf>,
    /// When false, URL tools compute their URL but do not launch a browser.
    pub launch_browser: bool,
}

impl Default for SystemToolConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./deskmind-data"),
            exclusive_tools: vec!["send_whatsapp_message".to_string(), "gmail_send".to_string()],
            command_timeout: Duration::from_secs(30),
            fetch_max_chars: 4000,
            git_repo: None,
            launch_browser: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reminder {
    pub id: u64,
    pub text: String,
    pub due: DateTime<Local>,
}

/// Tool registry backed by OS commands and the user's browser.
pub struct SystemToolRunner {
    config: SystemToolConfig,
    reminders: Mutex<Vec<Reminder>>,
    next_reminder: Mutex<u64>,
}

impl SystemToolRunner {
    pub fn new(config: SystemToolConfig) -> Self {
        Self {
            config,
            reminders: Mutex::new(Vec::new()),
            next_reminder: Mutex::new(1),
        }
    }

    pub fn config(&self) -> &SystemToolConfig {
        &self.config
    }

    pub fn pending_reminders(&self) -> Vec<Reminder> {
        match self.reminders.lock() {
            Ok(r) => r.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Removes and returns reminders that are due at `now`.
    pub fn take_due_reminders(&self, now: DateTime<Local>) -> Vec<Reminder> {
        let mut reminders = match self.reminders.lock() {
            Ok(r) => r,
            Err(poisoned) => poisoned.into_inner(),
        };
        let (due, pending): (Vec<_>, Vec<_>) = reminders.drain(..).partition(|r| r.due <= now);
        *reminders = pending;
        due
    }

    fn dispatch(&self, name: &str, args: &StepArgs) -> ToolResult {
        match name {
            "open_url" => self.open_url(args),
            "google_search" => self.web_search(name, args, "https://www.google.com/search", "q", "Google"),
            "youtube_search" => self.web_search(
                name,
                args,
                "https://www.youtube.com/results",
                "search_query",
                "YouTube",
            ),
            "send_whatsapp_message" => self.send_whatsapp(args),
            "gmail_send" => self.gmail_send(args),
            "open_application" => self.open_application(args),
            "close_application" => self.close_application(args),
            "git_action" => self.git_action(args),
            "power_action" => self.power_action(args),
            "set_reminder" => self.set_reminder(args),
            "list_reminders" => Ok(self.list_reminders()),
            "take_note" => self.append_line(name, args, "text", "notes.md", "Note saved"),
            "remember_fact" => self.append_line(name, args, "fact", "facts.md", "I'll remember that"),
            "media_control" => self.media_control(args),
            "get_system_info" => Ok(self.system_info(args)),
            "take_screenshot" => self.take_screenshot(),
            "read_screen" => self.read_screen(args),
            "fetch_webpage" => self.fetch_webpage(args),
            other => Err(ToolError::UnknownTool(other.to_string())),
        }
    }

    fn launch(&self, url: &str) -> Result<(), ToolError> {
        if !self.config.launch_browser {
            debug!("browser launch disabled, not opening {}", url);
            return Ok(());
        }

        webbrowser::open(url)?;
        Ok(())
    }

    fn run(&self, cmd: &mut Command) -> Result<Output, ToolError> {
        output_with_timeout(cmd, self.config.command_timeout)
    }

    fn open_url(&self, args: &StepArgs) -> ToolResult {
        let raw = required_str("open_url", args, "url")?;
        let url = Url::parse(raw).map_err(|e| ToolError::InvalidArgument {
            tool: "open_url".to_string(),
            arg: "url".to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ToolError::InvalidArgument {
                tool: "open_url".to_string(),
                arg: "url".to_string(),
                reason: format!("unsupported scheme '{}'", url.scheme()),
            });
        }

        self.launch(url.as_str())?;
        Ok(ToolOutcome::ok(format!("Opened {}", url)).with_field("url", url.as_str()))
    }

    fn web_search(
        &self,
        tool: &str,
        args: &StepArgs,
        base: &str,
        param: &str,
        site: &str,
    ) -> ToolResult {
        let query = required_str(tool, args, "query")?;
        let url = Url::parse_with_params(base, &[(param, query)]).map_err(|e| ToolError::Failed {
            tool: tool.to_string(),
            reason: e.to_string(),
        })?;

        self.launch(url.as_str())?;
        Ok(
            ToolOutcome::ok(format!("Searched {} for '{}'", site, query))
                .with_field("url", url.as_str())
                .with_field("query", query),
        )
    }

    fn send_whatsapp(&self, args: &StepArgs) -> ToolResult {
        let tool = "send_whatsapp_message";
        let contact = required_str(tool, args, "contact")?;
        let message = required_str(tool, args, "message")?;

        let mut params = vec![("text", message.to_string())];
        if PHONE.is_match(contact) {
            let digits: String = contact.chars().filter(|c| c.is_ascii_digit()).collect();
            params.push(("phone", digits));
        }
        let url = Url::parse_with_params("https://web.whatsapp.com/send", &params).map_err(|e| {
            ToolError::Failed {
                tool: tool.to_string(),
                reason: e.to_string(),
            }
        })?;

        self.launch(url.as_str())?;
        info!("whatsapp draft for {} opened", contact);
        Ok(
            ToolOutcome::ok(format!("Opened WhatsApp Web to send '{}' to {}", message, contact))
                .with_field("contact", contact)
                .with_field("message", message)
                .with_field("url", url.as_str()),
        )
    }

    fn gmail_send(&self, args: &StepArgs) -> ToolResult {
        let tool = "gmail_send";
        let to = required_str(tool, args, "to")?;
        if !to.contains('@') {
            return Err(ToolError::InvalidArgument {
                tool: tool.to_string(),
                arg: "to".to_string(),
                reason: format!("'{}' is not an email address", to),
            });
        }
        let subject = optional_str(args, "subject").unwrap_or("No Subject");
        let body = optional_str(args, "body").unwrap_or("");

        let url = Url::parse_with_params(
            "https://mail.google.com/mail/",
            &[
                ("view", "cm"),
                ("fs", "1"),
                ("to", to),
                ("su", subject),
                ("body", body),
            ],
        )
        .map_err(|e| ToolError::Failed {
            tool: tool.to_string(),
            reason: e.to_string(),
        })?;

        self.launch(url.as_str())?;
        Ok(ToolOutcome::ok(format!("Opened a Gmail draft to {}", to))
            .with_field("to", to)
            .with_field("subject", subject)
            .with_field("url", url.as_str()))
    }

    fn open_application(&self, args: &StepArgs) -> ToolResult {
        let tool = "open_application";
        let app = required_str(tool, args, "app_name")?;
        let binary = linux_binary(app);

        let spawned = if cfg!(target_os = "windows") {
            open::that(app).map_err(ToolError::from)
        } else if cfg!(target_os = "macos") {
            spawn_detached(Command::new("open").args(["-a", app]))
        } else {
            spawn_detached(&mut Command::new(&binary))
        };

        spawned.map_err(|e| ToolError::Failed {
            tool: tool.to_string(),
            reason: format!("could not launch {}: {}", app, e),
        })?;
        Ok(ToolOutcome::ok(format!("Opened {}", app)).with_field("app", app))
    }

    fn close_application(&self, args: &StepArgs) -> ToolResult {
        let tool = "close_application";
        let app = required_str(tool, args, "app_name")?;

        let output = if cfg!(target_os = "windows") {
            let image = if app.to_lowercase().ends_with(".exe") {
                app.to_string()
            } else {
                format!("{}.exe", app)
            };
            self.run(Command::new("taskkill").args(["/IM", image.as_str(), "/F"]))?
        } else if cfg!(target_os = "macos") {
            self.run(Command::new("osascript").args(["-e", format!("quit app \"{}\"", app).as_str()]))?
        } else {
            self.run(Command::new("pkill").args(["-i", "-f", linux_binary(app).as_str()]))?
        };

        if !output.status.success() {
            return Err(ToolError::Failed {
                tool: tool.to_string(),
                reason: format!("{} does not appear to be running", app),
            });
        }
        Ok(ToolOutcome::ok(format!("Closed {}", app)).with_field("app", app))
    }

    fn run_git(&self, args: &[&str]) -> Result<String, ToolError> {
        let mut cmd = Command::new("git");
        cmd.args(args);
        if let Some(ref repo) = self.config.git_repo {
            cmd.current_dir(repo);
        }
        let output = self.run(&mut cmd)?;
        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        if !output.status.success() {
            return Err(ToolError::Failed {
                tool: "git_action".to_string(),
                reason: stderr.lines().next().unwrap_or("git exited with an error").to_string(),
            });
        }
        Ok(if stdout.trim().is_empty() { stderr } else { stdout })
    }

    fn git_action(&self, args: &StepArgs) -> ToolResult {
        let tool = "git_action";
        let action = required_str(tool, args, "action")?.to_lowercase();

        let output = match action.as_str() {
            "status" => self.run_git(&["status", "--short", "--branch"])?,
            "pull" => self.run_git(&["pull"])?,
            "push" => self.run_git(&["push"])?,
            "log" => self.run_git(&["log", "--oneline", "-10"])?,
            "commit" => {
                let message = required_str(tool, args, "message")?;
                self.run_git(&["add", "-A"])?;
                self.run_git(&["commit", "-m", message])?
            }
            other => {
                return Err(ToolError::InvalidArgument {
                    tool: tool.to_string(),
                    arg: "action".to_string(),
                    reason: format!("unknown git action '{}'", other),
                })
            }
        };

        let summary: String = output.lines().take(20).collect::<Vec<_>>().join("\n");
        Ok(ToolOutcome::ok(format!("git {} done", action)).with_field("output", summary))
    }

    fn power_action(&self, args: &StepArgs) -> ToolResult {
        let tool = "power_action";
        let action = required_str(tool, args, "action")?.to_lowercase();

        let command: Vec<&str> = if cfg!(target_os = "windows") {
            match action.as_str() {
                "lock" => vec!["rundll32.exe", "user32.dll,LockWorkStation"],
                "shutdown" => vec!["shutdown", "/s", "/t", "60"],
                "restart" => vec!["shutdown", "/r", "/t", "60"],
                "sleep" => vec!["rundll32.exe", "powrprof.dll,SetSuspendState", "0,1,0"],
                "cancel" => vec!["shutdown", "/a"],
                _ => Vec::new(),
            }
        } else if cfg!(target_os = "linux") {
            match action.as_str() {
                "lock" => vec!["loginctl", "lock-session"],
                "shutdown" => vec!["shutdown", "-h", "+1"],
                "restart" => vec!["shutdown", "-r", "+1"],
                "sleep" => vec!["systemctl", "suspend"],
                "cancel" => vec!["shutdown", "-c"],
                _ => Vec::new(),
            }
        } else {
            return Err(ToolError::Unsupported(format!("power action '{}'", action)));
        };

        let Some((program, rest)) = command.split_first() else {
            return Err(ToolError::InvalidArgument {
                tool: tool.to_string(),
                arg: "action".to_string(),
                reason: format!("unknown power action '{}'", action),
            });
        };

        warn!("power action requested: {}", action);
        let output = self.run(Command::new(program).args(rest))?;
        if !output.status.success() {
            return Err(ToolError::Failed {
                tool: tool.to_string(),
                reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let message = match action.as_str() {
            "shutdown" | "restart" => format!("{} scheduled in one minute", action),
            _ => format!("{} done", action),
        };
        Ok(ToolOutcome::ok(message).with_field("action", action))
    }

    fn set_reminder(&self, args: &StepArgs) -> ToolResult {
        let tool = "set_reminder";
        let text = required_str(tool, args, "text")?;
        let now = Local::now();

        let due = if let Some(secs) = optional_u64(args, "delay_secs") {
            now + ChronoDuration::seconds(secs.min(i64::MAX as u64) as i64)
        } else if let Some(at) = optional_str(args, "at") {
            let time = NaiveTime::parse_from_str(at, "%H:%M").map_err(|e| {
                ToolError::InvalidArgument {
                    tool: tool.to_string(),
                    arg: "at".to_string(),
                    reason: e.to_string(),
                }
            })?;
            let today = now.date_naive().and_time(time);
            let candidate = Local
                .from_local_datetime(&today)
                .earliest()
                .ok_or_else(|| ToolError::InvalidArgument {
                    tool: tool.to_string(),
                    arg: "at".to_string(),
                    reason: format!("{} does not exist today", at),
                })?;
            if candidate <= now {
                candidate + ChronoDuration::days(1)
            } else {
                candidate
            }
        } else {
            return Err(ToolError::MissingArgument {
                tool: tool.to_string(),
                arg: "delay_secs".to_string(),
            });
        };

        let id = {
            let mut next = match self.next_reminder.lock() {
                Ok(n) => n,
                Err(poisoned) => poisoned.into_inner(),
            };
            let id = *next;
            *next += 1;
            id
        };

        let reminder = Reminder {
            id,
            text: text.to_string(),
            due,
        };
        match self.reminders.lock() {
            Ok(mut r) => r.push(reminder),
            Err(poisoned) => poisoned.into_inner().push(reminder),
        }

        let when = due.format("%H:%M").to_string();
        Ok(ToolOutcome::ok(format!("Reminder set for {}: {}", when, text))
            .with_field("due", due.to_rfc3339())
            .with_field("id", id.to_string()))
    }

    fn list_reminders(&self) -> ToolOutcome {
        let reminders = self.pending_reminders();
        if reminders.is_empty() {
            return ToolOutcome::ok("No pending reminders").with_field("count", "0");
        }
        let lines: Vec<String> = reminders
            .iter()
            .map(|r| format!("{} at {}", r.text, r.due.format("%H:%M")))
            .collect();
        ToolOutcome::ok(format!("Pending reminders: {}", lines.join("; ")))
            .with_field("count", reminders.len().to_string())
    }

    fn append_line(
        &self,
        tool: &str,
        args: &StepArgs,
        key: &str,
        file: &str,
        confirmation: &str,
    ) -> ToolResult {
        let text = required_str(tool, args, key)?;
        fs::create_dir_all(&self.config.data_dir)?;
        let path = self.config.data_dir.join(file);
        let mut handle = OpenOptions::new().create(true).append(true).open(&path)?;
        writeln!(handle, "- [{}] {}", Local::now().format("%Y-%m-%d %H:%M"), text)?;

        Ok(ToolOutcome::ok(format!("{}: {}", confirmation, text))
            .with_field("path", path.to_string_lossy()))
    }

    fn media_control(&self, args: &StepArgs) -> ToolResult {
        let tool = "media_control";
        let action = required_str(tool, args, "action")?.to_lowercase();

        if action == "spotify" {
            let query = required_str(tool, args, "query")?;
            let mut url = Url::parse("https://open.spotify.com/search/").map_err(|e| {
                ToolError::Failed {
                    tool: tool.to_string(),
                    reason: e.to_string(),
                }
            })?;
            url.path_segments_mut()
                .map_err(|_| ToolError::Failed {
                    tool: tool.to_string(),
                    reason: "invalid spotify base url".to_string(),
                })?
                .pop_if_empty()
                .push(query);
            self.launch(url.as_str())?;
            return Ok(ToolOutcome::ok(format!("Searching Spotify for '{}'", query))
                .with_field("url", url.as_str()));
        }

        if !cfg!(target_os = "linux") {
            return Err(ToolError::Unsupported(format!("media action '{}'", action)));
        }

        let (program, cmd_args): (&str, Vec<&str>) = match action.as_str() {
            "play" => ("playerctl", vec!["play"]),
            "pause" => ("playerctl", vec!["pause"]),
            "next" => ("playerctl", vec!["next"]),
            "previous" => ("playerctl", vec!["previous"]),
            "volume_up" => ("pactl", vec!["set-sink-volume", "@DEFAULT_SINK@", "+10%"]),
            "volume_down" => ("pactl", vec!["set-sink-volume", "@DEFAULT_SINK@", "-10%"]),
            "mute" => ("pactl", vec!["set-sink-mute", "@DEFAULT_SINK@", "toggle"]),
            other => {
                return Err(ToolError::InvalidArgument {
                    tool: tool.to_string(),
                    arg: "action".to_string(),
                    reason: format!("unknown media action '{}'", other),
                })
            }
        };

        let output = self.run(Command::new(program).args(&cmd_args))?;
        if !output.status.success() {
            return Err(ToolError::Failed {
                tool: tool.to_string(),
                reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(ToolOutcome::ok(format!("Media {}", action.replace('_', " "))).with_field("action", action))
    }

    fn system_info(&self, args: &StepArgs) -> ToolOutcome {
        let info_type = optional_str(args, "info_type").unwrap_or("all").to_lowercase();
        let snapshot = HostSnapshot::collect();

        let message = match info_type.as_str() {
            "memory" | "ram" => format!(
                "RAM: {:.1} GB used of {:.1} GB ({:.0}%)",
                snapshot.memory_used_gb, snapshot.memory_total_gb, snapshot.memory_percent
            ),
            "cpu" => format!(
                "CPU: {} cores, load {:.2} (1m) / {:.2} (5m)",
                snapshot.cores, snapshot.load_one, snapshot.load_five
            ),
            "disk" => format!("Disk: {:.0}% used", snapshot.disk_used_percent),
            _ => format!("{} ({}): {}", snapshot.hostname, snapshot.os, snapshot.summary()),
        };

        ToolOutcome::ok(message)
            .with_field("hostname", snapshot.hostname.clone())
            .with_field("memory_percent", format!("{:.0}", snapshot.memory_percent))
            .with_field("load_one", format!("{:.2}", snapshot.load_one))
            .with_field("cores", snapshot.cores.to_string())
    }

    fn capture_screen(&self) -> Result<PathBuf, ToolError> {
        let dir = self.config.data_dir.join("screenshots");
        fs::create_dir_all(&dir)?;
        let path = dir.join(format!("screen-{}.png", Local::now().format("%Y%m%d-%H%M%S")));
        let target = path.to_string_lossy().to_string();
        let target = target.as_str();

        let candidates: Vec<(&str, Vec<&str>)> = if cfg!(target_os = "macos") {
            vec![("screencapture", vec!["-x", target])]
        } else if cfg!(target_os = "linux") {
            vec![
                ("gnome-screenshot", vec!["-f", target]),
                ("scrot", vec![target]),
                ("grim", vec![target]),
            ]
        } else {
            return Err(ToolError::Unsupported("screen capture".to_string()));
        };

        for (program, args) in candidates {
            match self.run(Command::new(program).args(&args)) {
                Ok(out) if out.status.success() && path.exists() => return Ok(path),
                Ok(_) => debug!("{} did not produce a screenshot", program),
                Err(e) => debug!("{} unavailable: {}", program, e),
            }
        }

        Err(ToolError::Failed {
            tool: "take_screenshot".to_string(),
            reason: "no screenshot utility succeeded".to_string(),
        })
    }

    fn take_screenshot(&self) -> ToolResult {
        let path = self.capture_screen()?;
        Ok(ToolOutcome::ok(format!("Screenshot saved to {}", path.display()))
            .with_field("path", path.to_string_lossy()))
    }

    fn read_screen(&self, args: &StepArgs) -> ToolResult {
        let question = optional_str(args, "question").unwrap_or("What is on the screen?");
        let path = self.capture_screen()?;
        Ok(ToolOutcome::ok(format!(
            "Captured the screen to {} for the question '{}'",
            path.display(),
            question
        ))
        .with_field("path", path.to_string_lossy())
        .with_field("question", question))
    }

    fn fetch_webpage(&self, args: &StepArgs) -> ToolResult {
        let tool = "fetch_webpage";
        let raw = required_str(tool, args, "url")?;
        let url = Url::parse(raw).map_err(|e| ToolError::InvalidArgument {
            tool: tool.to_string(),
            arg: "url".to_string(),
            reason: e.to_string(),
        })?;

        // Runs on a blocking worker thread, so the blocking client is safe here.
        let client = reqwest::blocking::Client::builder()
            .timeout(self.config.command_timeout)
            .user_agent("deskmind/0.1")
            .build()
            .map_err(|e| ToolError::Failed {
                tool: tool.to_string(),
                reason: e.to_string(),
            })?;

        let resp = client.get(url.clone()).send().map_err(|e| ToolError::Failed {
            tool: tool.to_string(),
            reason: e.to_string(),
        })?;
        if !resp.status().is_success() {
            return Err(ToolError::Failed {
                tool: tool.to_string(),
                reason: format!("HTTP {}", resp.status()),
            });
        }
        let too_large = |size: u64| ToolError::Failed {
            tool: tool.to_string(),
            reason: format!("response too large: {} bytes (max {})", size, MAX_PAGE_BYTES),
        };
        if let Some(size) = resp.content_length() {
            if size > MAX_PAGE_BYTES as u64 {
                return Err(too_large(size));
            }
        }

        // Content-Length can be absent or wrong, so the read itself is bounded too.
        let mut body = Vec::new();
        resp.take(MAX_PAGE_BYTES as u64 + 1).read_to_end(&mut body)?;
        if body.len() > MAX_PAGE_BYTES {
            return Err(too_large(body.len() as u64));
        }

        let title = TITLE
            .captures(&String::from_utf8_lossy(&body))
            .map(|c| WHITESPACE.replace_all(c[1].trim(), " ").to_string())
            .unwrap_or_default();
        let text = page_text(&body, self.config.fetch_max_chars)?;

        Ok(ToolOutcome::ok(text)
            .with_field("url", url.as_str())
            .with_field("title", title))
    }
}

/// Renders an HTML body as plain text, collapsed to single spaces and cut
/// to `max_chars` characters.
pub fn page_text(body: &[u8], max_chars: usize) -> Result<String, ToolError> {
    let rendered = html2text::from_read(body, PAGE_WIDTH).map_err(|e| ToolError::Failed {
        tool: "fetch_webpage".to_string(),
        reason: format!("html2text error: {}", e),
    })?;
    let collapsed = WHITESPACE.replace_all(rendered.trim(), " ");
    Ok(collapsed.chars().take(max_chars).collect())
}

fn linux_binary(app: &str) -> String {
    let lower = app.trim().to_lowercase();
    match lower.as_str() {
        "chrome" | "google chrome" => "google-chrome".to_string(),
        "vscode" | "vs code" | "visual studio code" => "code".to_string(),
        "files" | "file manager" => "nautilus".to_string(),
        "terminal" => "x-terminal-emulator".to_string(),
        "calculator" => "gnome-calculator".to_string(),
        "browser" => "xdg-open".to_string(),
        _ => lower.replace(' ', "-"),
    }
}

impl ToolRunner for SystemToolRunner {
    fn has_tool(&self, name: &str) -> bool {
        TOOL_NAMES.contains(&name)
    }

    fn execute(&self, name: &str, args: &StepArgs) -> ToolOutcome {
        match self.dispatch(name, args) {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("tool {} failed: {}", name, e);
                ToolOutcome::failed(e.to_string())
            }
        }
    }

    fn has_exclusive_tools(&self) -> bool {
        self.config
            .exclusive_tools
            .iter()
            .any(|t| TOOL_NAMES.contains(&t.as_str()))
    }

    fn tool_names(&self) -> Vec<String> {
        TOOL_NAMES.iter().map(|s| s.to_string()).collect()
    }
}
