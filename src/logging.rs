use crate::config::LoggingConfig;
use crate::error::{ConnectorError, Result};
use chrono::{DateTime, Utc};
use std::fmt::Display;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Installs `env_logger` as the global logger.
///
/// `RUST_LOG` overrides the configured level. When a log file is configured,
/// it is rotated if it has grown past `max_bytes`, and lines are appended to
/// it as `timestamp LEVEL message`.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let env = env_logger::Env::default().default_filter_or(config.level.as_str());
    let mut builder = env_logger::Builder::from_env(env);

    if let Some(path) = &config.file {
        rotate_if_needed(path, config.max_bytes, config.backups)?;
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        builder
            .target(env_logger::Target::Pipe(Box::new(file)))
            .format(|buf, record| {
                writeln!(buf, "{}", file_line(Utc::now(), record.level(), record.args()))
            });
    }

    builder
        .try_init()
        .map_err(|e| ConnectorError::Logging(e.to_string()))
}

/// One log file line, without the trailing newline.
pub fn file_line(at: DateTime<Utc>, level: log::Level, message: impl Display) -> String {
    format!("{} {} {}", at.format("%Y-%m-%d %H:%M:%S%.3f"), level, message)
}

/// Shifts `path` to `path.1`, `path.1` to `path.2` and so on once `path`
/// reaches `max_bytes`. At most `backups` old files are kept; with zero
/// backups the file is truncated instead.
pub fn rotate_if_needed(path: &Path, max_bytes: u64, backups: usize) -> Result<bool> {
    let size = match fs::metadata(path) {
        Ok(meta) => meta.len(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e.into()),
    };
    if max_bytes == 0 || size < max_bytes {
        return Ok(false);
    }

    if backups == 0 {
        fs::File::create(path)?;
        return Ok(true);
    }

    let oldest = backup_path(path, backups);
    if oldest.exists() {
        fs::remove_file(&oldest)?;
    }
    for n in (1..backups).rev() {
        let from = backup_path(path, n);
        if from.exists() {
            fs::rename(&from, backup_path(path, n + 1))?;
        }
    }
    fs::rename(path, backup_path(path, 1))?;
    log::debug!("Rotated log file {}", path.display());
    Ok(true)
}

fn backup_path(path: &Path, n: usize) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(format!(".{}", n));
    PathBuf::from(name)
}
