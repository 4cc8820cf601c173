use anyhow::{Context, Result, bail};
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::thread;
use std::time::Duration;
use tempfile::TempDir;

/// Opens rendered figures in an external viewer.
///
/// Figures live in a temporary directory owned by the viewer session and are
/// removed when it is dropped. Openers such as `xdg-open` return before the
/// viewer has read the file, so without `wait` the session lingers on drop
/// to give it time.
pub struct Viewer {
    dir: TempDir,
    command: Option<String>,
    wait: bool,
    linger: Duration,
    shown: usize,
}

impl Viewer {
    /// `wait` blocks after each figure until Enter is pressed on stdin.
    pub fn new(command: Option<String>, wait: bool) -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("geiger-hist-")
            .tempdir()
            .context("failed to create temporary figure directory")?;
        Ok(Self {
            dir,
            command,
            wait,
            linger: Duration::ZERO,
            shown: 0,
        })
    }

    /// Time to keep figures on disk after the last one when not waiting.
    pub fn linger(mut self, linger: Duration) -> Self {
        self.linger = linger;
        self
    }

    pub fn show(&mut self, trial_id: &str, svg: &str) -> Result<PathBuf> {
        self.shown += 1;
        let path = self
            .dir
            .path()
            .join(figure_file_name(self.shown, trial_id));
        fs::write(&path, svg).with_context(|| format!("failed to write {}", path.display()))?;

        let mut cmd = open_command(self.command.as_deref(), &path)?;
        let status = cmd
            .status()
            .with_context(|| format!("failed to launch viewer for {}", path.display()))?;
        if !status.success() {
            bail!("viewer exited with {} for {}", status, path.display());
        }

        if self.wait {
            let mut stdout = io::stdout();
            write!(stdout, "Showing {}; press Enter to continue ", trial_id)?;
            stdout.flush()?;
            let mut line = String::new();
            io::stdin().lock().read_line(&mut line)?;
        }
        Ok(path)
    }
}

impl Drop for Viewer {
    fn drop(&mut self) {
        if !self.wait && self.shown > 0 && !self.linger.is_zero() {
            thread::sleep(self.linger);
        }
    }
}

fn open_command(custom: Option<&str>, path: &Path) -> Result<Command> {
    if let Some(custom) = custom {
        let mut parts = custom.split_whitespace();
        let Some(program) = parts.next() else {
            bail!("viewer command is empty");
        };
        let mut cmd = Command::new(program);
        cmd.args(parts).arg(path);
        return Ok(cmd);
    }
    let cmd = if cfg!(target_os = "macos") {
        let mut cmd = Command::new("open");
        cmd.arg(path);
        cmd
    } else if cfg!(target_os = "windows") {
        let mut cmd = Command::new("cmd");
        cmd.args(["/C", "start", ""]).arg(path);
        cmd
    } else {
        let mut cmd = Command::new("xdg-open");
        cmd.arg(path);
        cmd
    };
    Ok(cmd)
}

fn figure_file_name(index: usize, trial_id: &str) -> String {
    let stem: String = trial_id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("{:02}-{}.svg", index, stem)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsStr;

    #[test]
    fn file_names_are_ordered_and_safe() {
        assert_eq!(figure_file_name(1, "5Hz run/2"), "01-5Hz_run_2.svg");
        assert_eq!(figure_file_name(12, ""), "12-.svg");
    }

    #[test]
    fn custom_command_gets_path_last() {
        let path = Path::new("/tmp/fig.svg");
        let cmd = open_command(Some("inkview --fullscreen"), path).unwrap();
        assert_eq!(cmd.get_program(), OsStr::new("inkview"));
        let args: Vec<&OsStr> = cmd.get_args().collect();
        assert_eq!(args, vec![OsStr::new("--fullscreen"), OsStr::new("/tmp/fig.svg")]);
    }

    #[test]
    fn blank_custom_command_is_rejected() {
        assert!(open_command(Some("   "), Path::new("x.svg")).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn show_writes_figure_and_runs_viewer() {
        let mut viewer = Viewer::new(Some("true".to_string()), false).unwrap();
        let path = viewer.show("A", "<svg/>").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "<svg/>");
        let dir = viewer.dir.path().to_path_buf();
        drop(viewer);
        assert!(!dir.exists());
    }

    #[cfg(unix)]
    #[test]
    fn figures_outlive_the_opener_until_linger_ends() {
        let linger = Duration::from_millis(50);
        let mut viewer = Viewer::new(Some("true".to_string()), false)
            .unwrap()
            .linger(linger);
        let path = viewer.show("A", "<svg/>").unwrap();
        assert!(path.exists());
        let dir = viewer.dir.path().to_path_buf();
        let t = std::time::Instant::now();
        drop(viewer);
        assert!(t.elapsed() >= linger);
        assert!(!dir.exists());
    }

    #[test]
    fn nothing_shown_means_no_linger() {
        let viewer = Viewer::new(None, false)
            .unwrap()
            .linger(Duration::from_secs(30));
        let t = std::time::Instant::now();
        drop(viewer);
        assert!(t.elapsed() < Duration::from_secs(5));
    }

    #[cfg(unix)]
    #[test]
    fn failing_viewer_is_an_error() {
        let mut viewer = Viewer::new(Some("false".to_string()), false).unwrap();
        assert!(viewer.show("A", "<svg/>").is_err());
    }
}
