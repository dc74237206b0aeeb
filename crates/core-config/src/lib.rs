//! Configuration loading and parsing.
//!
//! Parses `agentdeck.toml` (or an override path provided by the binary).
//! Every section and field is optional; absent values take their defaults.
//! A missing file or one that fails to parse yields the default
//! configuration and a log line on the `config` target, never an error.
//! Unknown fields are ignored so older binaries tolerate newer files.

use serde::Deserialize;
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::{info, warn};

pub const FILE_NAME: &str = "agentdeck.toml";

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct PathsConfig {
    /// Manifest JSON; `None` means `manifest.json` in the working directory.
    pub manifest: Option<PathBuf>,
    /// Project root that installs land under; `None` means the working directory.
    pub root: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[default]
    Http,
    Dir,
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct SourceConfig {
    pub kind: SourceKind,
    /// Local agent tree, required when `kind = "dir"`.
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct UiConfig {
    pub spinner_interval_ms: u64,
    pub flash_ms: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            spinner_interval_ms: 80,
            flash_ms: 2500,
        }
    }
}

impl UiConfig {
    /// Spinner period; zero is raised to one millisecond.
    pub fn spinner_interval(&self) -> Duration {
        Duration::from_millis(self.spinner_interval_ms.max(1))
    }

    pub fn flash_duration(&self) -> Duration {
        Duration::from_millis(self.flash_ms)
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct LogConfig {
    pub file: PathBuf,
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            file: PathBuf::from("agentdeck.log"),
            filter: "info".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ConfigFile {
    pub paths: PathsConfig,
    pub source: SourceConfig,
    pub ui: UiConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub path: Option<PathBuf>, // file the values came from, if any
    pub raw: Option<String>,   // original file string (optional)
    pub file: ConfigFile,      // parsed (or default) data
}

/// Best-effort config path following platform conventions (XDG / AppData Roaming).
pub fn discover() -> PathBuf {
    let local = PathBuf::from(FILE_NAME);
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("agentdeck").join(FILE_NAME);
    }
    PathBuf::from(FILE_NAME)
}

pub fn load_from(path: Option<PathBuf>) -> Config {
    let path = path.unwrap_or_else(discover);
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) => {
            info!(target: "config", path = %path.display(), error = %e, "config_defaults");
            return Config::default();
        }
    };
    match toml::from_str::<ConfigFile>(&content) {
        Ok(file) => {
            info!(target: "config", path = %path.display(), "config_loaded");
            Config {
                path: Some(path),
                raw: Some(content),
                file,
            }
        }
        Err(e) => {
            warn!(
                target: "config",
                path = %path.display(),
                error = %e.message(),
                "config_parse_failed"
            );
            Config::default()
        }
    }
}

impl Config {
    pub fn ui(&self) -> &UiConfig {
        &self.file.ui
    }

    pub fn log(&self) -> &LogConfig {
        &self.file.log
    }

    /// Directory for the local source, if the file selects one.
    pub fn source_dir(&self) -> Option<&PathBuf> {
        match self.file.source.kind {
            SourceKind::Dir => self.file.source.dir.as_ref(),
            SourceKind::Http => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex, MutexGuard};
    use tracing::Level;
    use tracing::subscriber::with_default;
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone)]
    struct BufferWriter {
        inner: Arc<Mutex<Vec<u8>>>,
    }

    impl BufferWriter {
        fn new() -> (Self, Arc<Mutex<Vec<u8>>>) {
            let buf = Arc::new(Mutex::new(Vec::new()));
            (Self { inner: buf.clone() }, buf)
        }
    }

    struct LockedWriter<'a> {
        guard: MutexGuard<'a, Vec<u8>>,
    }

    impl<'a> Write for LockedWriter<'a> {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.guard.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for BufferWriter {
        type Writer = LockedWriter<'a>;

        fn make_writer(&'a self) -> Self::Writer {
            LockedWriter {
                guard: self.inner.lock().expect("log buffer poisoned"),
            }
        }
    }

    fn write_config(body: &str) -> tempfile::NamedTempFile {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), body).unwrap();
        tmp
    }

    #[test]
    fn default_config_when_missing_file() {
        let cfg = load_from(Some(PathBuf::from("__nonexistent_hopefully__.toml")));
        assert!(cfg.path.is_none());
        assert_eq!(cfg.file, ConfigFile::default());
        assert_eq!(cfg.ui().spinner_interval_ms, 80);
        assert_eq!(cfg.ui().flash_ms, 2500);
        assert_eq!(cfg.log().file, PathBuf::from("agentdeck.log"));
        assert_eq!(cfg.log().filter, "info");
        assert_eq!(cfg.file.source.kind, SourceKind::Http);
    }

    #[test]
    fn parses_every_section() {
        let tmp = write_config(
            "[paths]\nmanifest = \"m.json\"\nroot = \"/proj\"\n\
             [source]\nkind = \"dir\"\ndir = \"/agents\"\n\
             [ui]\nspinner_interval_ms = 120\nflash_ms = 900\n\
             [log]\nfile = \"/tmp/deck.log\"\nfilter = \"debug\"\n",
        );
        let cfg = load_from(Some(tmp.path().to_path_buf()));
        assert_eq!(cfg.path.as_deref(), Some(tmp.path()));
        assert_eq!(cfg.file.paths.manifest, Some(PathBuf::from("m.json")));
        assert_eq!(cfg.file.paths.root, Some(PathBuf::from("/proj")));
        assert_eq!(cfg.source_dir(), Some(&PathBuf::from("/agents")));
        assert_eq!(cfg.ui().spinner_interval(), Duration::from_millis(120));
        assert_eq!(cfg.ui().flash_duration(), Duration::from_millis(900));
        assert_eq!(cfg.log().filter, "debug");
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let tmp = write_config("[ui]\nflash_ms = 10\n");
        let cfg = load_from(Some(tmp.path().to_path_buf()));
        assert_eq!(cfg.ui().flash_ms, 10);
        assert_eq!(cfg.ui().spinner_interval_ms, 80);
        assert_eq!(cfg.log(), &LogConfig::default());
    }

    #[test]
    fn http_source_ignores_dir() {
        let tmp = write_config("[source]\ndir = \"/agents\"\n");
        let cfg = load_from(Some(tmp.path().to_path_buf()));
        assert_eq!(cfg.source_dir(), None);
    }

    #[test]
    fn zero_spinner_interval_is_raised() {
        let tmp = write_config("[ui]\nspinner_interval_ms = 0\n");
        let cfg = load_from(Some(tmp.path().to_path_buf()));
        assert_eq!(cfg.ui().spinner_interval(), Duration::from_millis(1));
    }

    #[test]
    fn unknown_fields_are_tolerated() {
        let tmp = write_config("[ui]\ntheme = \"dark\"\n[future]\nx = 1\n");
        let cfg = load_from(Some(tmp.path().to_path_buf()));
        assert!(cfg.path.is_some());
        assert_eq!(cfg.file.ui, UiConfig::default());
    }

    #[test]
    fn parse_failure_falls_back_and_logs_on_config_target() {
        let tmp = write_config("[ui]\nflash_ms = \"soon\"\n");
        let (writer, buffer) = BufferWriter::new();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(Level::INFO)
            .with_target(true)
            .with_ansi(false)
            .without_time()
            .with_writer(writer)
            .finish();

        let cfg = with_default(subscriber, || load_from(Some(tmp.path().to_path_buf())));

        let log_output = String::from_utf8(buffer.lock().unwrap().clone()).unwrap();
        assert!(log_output.contains("WARN config:"));
        assert!(log_output.contains("config_parse_failed"));
        assert!(cfg.path.is_none());
        assert_eq!(cfg.ui().flash_ms, 2500);
    }
}
