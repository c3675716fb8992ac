//! Saved default flags.
//!
//! Defaults live in flag files holding the same tokens the command line
//! accepts: a global file under the platform config directory and an
//! optional `.marksyncrc` in the working directory.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::sync::SyncConfig;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ConfigFlags {
    pub watch: bool,
    pub no_sync: bool,
    pub perf: bool,
    pub split: Option<u16>,
    pub min_sync_interval_ms: Option<u64>,
    pub suppression_ms: Option<u64>,
    pub settle_delay_ms: Option<u64>,
    pub fallback_line_height: Option<f64>,
    pub sync_debug_log: Option<PathBuf>,
}

impl ConfigFlags {
    /// Merge `other` over `self`: switches are OR-ed, valued options from
    /// `other` win when set.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            watch: self.watch || other.watch,
            no_sync: self.no_sync || other.no_sync,
            perf: self.perf || other.perf,
            split: other.split.or(self.split),
            min_sync_interval_ms: other.min_sync_interval_ms.or(self.min_sync_interval_ms),
            suppression_ms: other.suppression_ms.or(self.suppression_ms),
            settle_delay_ms: other.settle_delay_ms.or(self.settle_delay_ms),
            fallback_line_height: other.fallback_line_height.or(self.fallback_line_height),
            sync_debug_log: other
                .sync_debug_log
                .clone()
                .or_else(|| self.sync_debug_log.clone()),
        }
    }

    /// Controller timings, with defaults for anything unset.
    pub fn sync_config(&self) -> SyncConfig {
        let defaults = SyncConfig::default();
        SyncConfig {
            min_sync_interval_ms: self
                .min_sync_interval_ms
                .unwrap_or(defaults.min_sync_interval_ms),
            cross_direction_suppression_ms: self
                .suppression_ms
                .unwrap_or(defaults.cross_direction_suppression_ms),
            settle_delay_ms: self.settle_delay_ms.unwrap_or(defaults.settle_delay_ms),
            fallback_line_height: self
                .fallback_line_height
                .filter(|h| h.is_finite() && *h > 0.0)
                .unwrap_or(defaults.fallback_line_height),
        }
    }

    /// Source pane width percentage, clamped to the allowed range.
    pub fn split_percent(&self) -> u16 {
        crate::ui::clamp_split(self.split.unwrap_or(crate::ui::DEFAULT_SPLIT_PERCENT))
    }
}

pub fn global_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("marksync").join("config");
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("marksync")
                .join("config");
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join("marksync").join("config");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join(".config")
                .join("marksync")
                .join("config");
        }
    }

    local_override_path()
}

pub fn local_override_path() -> PathBuf {
    PathBuf::from(".marksyncrc")
}

/// Read flags from `path`. A missing file yields no flags.
///
/// # Errors
///
/// Returns an error if the file exists but can not be read.
pub fn load_config_flags(path: &Path) -> Result<ConfigFlags> {
    if !path.exists() {
        return Ok(ConfigFlags::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let tokens = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .flat_map(split_flag_line)
        .collect::<Vec<_>>();
    Ok(parse_flag_tokens(&tokens))
}

/// Write `flags` to `path` as flag tokens, one per line.
///
/// # Errors
///
/// Returns an error if the directory or file can not be written.
pub fn save_config_flags(path: &Path, flags: &ConfigFlags) -> Result<()> {
    let mut lines = vec!["# marksync defaults (saved with --save)".to_string()];
    if flags.watch {
        lines.push("--watch".to_string());
    }
    if flags.no_sync {
        lines.push("--no-sync".to_string());
    }
    if let Some(split) = flags.split {
        lines.push(format!("--split {split}"));
    }
    if let Some(ms) = flags.min_sync_interval_ms {
        lines.push(format!("--min-sync-interval-ms {ms}"));
    }
    if let Some(ms) = flags.suppression_ms {
        lines.push(format!("--suppression-ms {ms}"));
    }
    if let Some(ms) = flags.settle_delay_ms {
        lines.push(format!("--settle-delay-ms {ms}"));
    }
    if let Some(height) = flags.fallback_line_height {
        lines.push(format!("--fallback-line-height {height}"));
    }
    if flags.perf {
        lines.push("--perf".to_string());
    }
    if let Some(path) = &flags.sync_debug_log {
        lines.push(format!(
            "--sync-debug-log {}",
            quote_flag_value(&path.display().to_string())
        ));
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
    }
    fs::write(path, format!("{}\n", lines.join("\n")))
        .with_context(|| format!("Failed to write config {}", path.display()))
}

/// Split one flag-file line into tokens on whitespace. Double quotes group
/// a token and may appear anywhere in it. Inside quotes a backslash takes
/// the next character literally.
fn split_flag_line(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut in_quotes = false;
    let mut chars = line.chars();
    while let Some(ch) = chars.next() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                in_token = true;
            }
            '\\' if in_quotes => {
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            }
            c if c.is_whitespace() && !in_quotes => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            c => {
                current.push(c);
                in_token = true;
            }
        }
    }
    if in_token {
        tokens.push(current);
    }
    tokens
}

/// Quote `value` for a flag file unless it already reads back as one bare
/// token through [`split_flag_line`].
fn quote_flag_value(value: &str) -> String {
    let bare = !value.is_empty()
        && !value
            .chars()
            .any(|c| c.is_whitespace() || c == '"' || c == '\\');
    if bare {
        return value.to_string();
    }
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        if c == '"' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

/// Remove the flag file at `path` if there is one.
///
/// # Errors
///
/// Returns an error if the file exists and can not be removed.
pub fn clear_config_flags(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}

/// Pick known flags out of `tokens`. Unknown tokens and unparsable values
/// are skipped.
pub fn parse_flag_tokens(tokens: &[String]) -> ConfigFlags {
    let mut flags = ConfigFlags::default();
    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i].as_str();
        let (name, inline_value) = match token.split_once('=') {
            Some((name, value)) if name.starts_with("--") => (name, Some(value)),
            _ => (token, None),
        };
        let mut value = || {
            inline_value.map(ToOwned::to_owned).or_else(|| {
                let next = tokens.get(i + 1).cloned();
                if next.is_some() {
                    i += 1;
                }
                next
            })
        };
        match name {
            "--watch" | "-w" => flags.watch = true,
            "--no-sync" => flags.no_sync = true,
            "--perf" => flags.perf = true,
            "--split" => flags.split = value().and_then(|v| v.parse().ok()),
            "--min-sync-interval-ms" => {
                flags.min_sync_interval_ms = value().and_then(|v| v.parse().ok());
            }
            "--suppression-ms" => flags.suppression_ms = value().and_then(|v| v.parse().ok()),
            "--settle-delay-ms" => flags.settle_delay_ms = value().and_then(|v| v.parse().ok()),
            "--fallback-line-height" => {
                flags.fallback_line_height = value().and_then(|v| v.parse().ok());
            }
            "--sync-debug-log" => flags.sync_debug_log = value().map(PathBuf::from),
            _ => {}
        }
        i += 1;
    }
    flags
}
