use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::Level;

/// Runtime settings: defaults, then an optional JSON file, then CLI flags.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DemoConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub log_level: String,
    /// Pace frames to the display. Off means paint as fast as the GPU allows.
    pub vsync: bool,
    pub show_fps: bool,
    pub fps_log_secs: u64,
    /// Arguments `from_args` did not recognize, reported once logging is up.
    #[serde(skip)]
    pub ignored_args: Vec<String>,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            title: "touchquad".to_string(),
            width: 1024,
            height: 768,
            log_level: "info".to_string(),
            vsync: true,
            show_fps: true,
            fps_log_secs: 5,
            ignored_args: Vec::new(),
        }
    }
}

impl DemoConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Builds the config from command-line arguments (program name already
    /// stripped). `--config` is applied first regardless of its position.
    pub fn from_args<I>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let args: Vec<String> = args.into_iter().collect();
        let mut config = match args.iter().position(|a| a == "--config") {
            Some(i) => {
                let path = args.get(i + 1).context("--config needs a path")?;
                Self::from_file(Path::new(path))?
            }
            None => Self::default(),
        };

        let mut it = args.into_iter();
        while let Some(arg) = it.next() {
            match arg.as_str() {
                "--config" => {
                    it.next();
                }
                "--title" => config.title = it.next().context("--title needs a value")?,
                "--width" => config.width = parse_next(&mut it, "--width")?,
                "--height" => config.height = parse_next(&mut it, "--height")?,
                "--log-level" => config.log_level = it.next().context("--log-level needs a value")?,
                "--fps-log-secs" => config.fps_log_secs = parse_next(&mut it, "--fps-log-secs")?,
                "--no-vsync" => config.vsync = false,
                "--hide-fps" => config.show_fps = false,
                other => config.ignored_args.push(other.to_string()),
            }
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            anyhow::bail!("window size must be non-zero, got {}x{}", self.width, self.height);
        }
        if self.fps_log_secs == 0 {
            anyhow::bail!("fps_log_secs must be at least 1");
        }
        self.level()?;
        Ok(())
    }

    pub fn level(&self) -> Result<Level> {
        self.log_level
            .parse::<Level>()
            .map_err(|_| anyhow::anyhow!("unknown log level {:?}", self.log_level))
    }

    pub fn fps_log_interval(&self) -> Duration {
        Duration::from_secs(self.fps_log_secs)
    }
}

fn parse_next<T, I>(it: &mut I, flag: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    I: Iterator<Item = String>,
{
    let raw = it.next().with_context(|| format!("{} needs a value", flag))?;
    raw.parse::<T>().with_context(|| format!("invalid value {:?} for {}", raw, flag))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn defaults_without_flags() {
        let c = DemoConfig::from_args(Vec::new()).unwrap();
        assert_eq!(c, DemoConfig::default());
        assert_eq!(c.level().unwrap(), Level::INFO);
    }

    #[test]
    fn flags_override_defaults() {
        let c = DemoConfig::from_args(args(&["--width", "640", "--height", "480", "--no-vsync", "--hide-fps", "--log-level", "debug"])).unwrap();
        assert_eq!((c.width, c.height), (640, 480));
        assert!(!c.vsync);
        assert!(!c.show_fps);
        assert_eq!(c.level().unwrap(), Level::DEBUG);
    }

    #[test]
    fn bad_values_are_rejected() {
        assert!(DemoConfig::from_args(args(&["--width", "wide"])).is_err());
        assert!(DemoConfig::from_args(args(&["--width", "0"])).is_err());
        assert!(DemoConfig::from_args(args(&["--log-level", "loud"])).is_err());
        assert!(DemoConfig::from_args(args(&["--height"])).is_err());
    }

    #[test]
    fn unknown_flags_are_collected() {
        let c = DemoConfig::from_args(args(&["--frobnicate", "--width", "10"])).unwrap();
        assert_eq!(c.ignored_args, vec!["--frobnicate".to_string()]);
        assert_eq!(c.width, 10);
    }

    #[test]
    fn file_then_flags() {
        let path = std::env::temp_dir().join(format!("touchquad-config-{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "title": "from file", "width": 800, "show_fps": false }"#).unwrap();
        let p = path.to_string_lossy().to_string();
        let c = DemoConfig::from_args(args(&["--width", "320", "--config", &p])).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(c.title, "from file");
        assert_eq!(c.width, 320);
        assert_eq!(c.height, 768);
        assert!(!c.show_fps);
    }

    #[test]
    fn unknown_file_keys_fail() {
        let err = serde_json::from_str::<DemoConfig>(r#"{ "colour": "green" }"#);
        assert!(err.is_err());
    }

    proptest! {
        #[test]
        fn any_nonzero_size_is_accepted(w in 1u32.., h in 1u32..) {
            let c = DemoConfig::from_args(args(&["--width", &w.to_string(), "--height", &h.to_string()])).unwrap();
            prop_assert_eq!((c.width, c.height), (w, h));
        }
    }
}
