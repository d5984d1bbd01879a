//! External mpv process control over its JSON IPC socket.
//!
//! mpv runs as a child process with `--input-ipc-server`. Commands are
//! JSON lines written to the socket. A dedicated background task owns
//! the read half exclusively and publishes `PlayerStatus` snapshots over
//! a watch channel; nothing else ever touches that half, so playback
//! state flows through message passing rather than shared fields.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::unix::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::UnixStream;
use tokio::process::{Child, Command};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

/// Property observer ids registered with mpv on startup.
const OBSERVE_TIME_POS: u64 = 1;
const OBSERVE_DURATION: u64 = 2;
const OBSERVE_PAUSE: u64 = 3;
const OBSERVE_VOLUME: u64 = 4;

const DEFAULT_VOLUME: i64 = 50;

/// How long to wait for mpv to create its IPC socket.
const SOCKET_WAIT: Duration = Duration::from_secs(5);

/// Snapshot of playback state, published by the status read loop.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerStatus {
    pub position: f64,
    pub duration: f64,
    pub paused: bool,
    pub volume: i64,
}

impl Default for PlayerStatus {
    fn default() -> Self {
        Self {
            position: 0.0,
            duration: 0.0,
            paused: false,
            volume: DEFAULT_VOLUME,
        }
    }
}

#[derive(Debug, Deserialize)]
struct MpvEvent {
    event: Option<String>,
    id: Option<u64>,
    data: Option<Value>,
}

/// Handle to a running mpv process.
pub struct MpvPlayer {
    child: Child,
    socket_path: PathBuf,
    writer: OwnedWriteHalf,
    status: watch::Receiver<PlayerStatus>,
    reader_task: JoinHandle<()>,
}

impl MpvPlayer {
    /// Spawn mpv playing `url` and connect to its IPC socket.
    pub async fn spawn(url: &str, title: &str) -> Result<Self> {
        let socket_path =
            std::env::temp_dir().join(format!("audioshelf-mpv-{}.sock", std::process::id()));
        // A stale socket from a crashed run would block mpv
        let _ = std::fs::remove_file(&socket_path);

        let mut child = Command::new("mpv")
            .arg(url)
            .arg("--no-video")
            .arg(format!("--input-ipc-server={}", socket_path.display()))
            .arg(format!("--title={title}"))
            .arg("--idle=yes")
            .arg("--no-terminal")
            .arg(format!("--volume={DEFAULT_VOLUME}"))
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .context("could not start mpv; is it installed and on PATH?")?;

        let stream = wait_for_socket(&mut child, &socket_path).await?;
        let (read_half, writer) = stream.into_split();

        let (status_tx, status) = watch::channel(PlayerStatus::default());
        let reader_task = tokio::spawn(read_loop(read_half, status_tx));

        let mut player = Self {
            child,
            socket_path,
            writer,
            status,
            reader_task,
        };

        for (id, property) in [
            (OBSERVE_TIME_POS, "time-pos"),
            (OBSERVE_DURATION, "duration"),
            (OBSERVE_PAUSE, "pause"),
            (OBSERVE_VOLUME, "volume"),
        ] {
            player
                .send_command(json!(["observe_property", id, property]))
                .await?;
        }

        Ok(player)
    }

    /// Replace the playing file.
    pub async fn load(&mut self, url: &str, title: &str) -> Result<()> {
        self.send_command(json!(["loadfile", url])).await?;
        self.send_command(json!(["set", "title", title])).await
    }

    pub async fn toggle_pause(&mut self) -> Result<()> {
        self.send_command(json!(["cycle", "pause"])).await
    }

    pub async fn seek(&mut self, seconds: i64) -> Result<()> {
        self.send_command(json!(["seek", seconds])).await
    }

    pub async fn set_volume(&mut self, volume: i64) -> Result<()> {
        let volume = volume.clamp(0, 100);
        self.send_command(json!(["set", "volume", volume])).await
    }

    /// Latest status published by the read loop.
    pub fn status(&self) -> PlayerStatus {
        self.status.borrow().clone()
    }

    /// Stop playback, kill the child process and clean up the socket.
    pub async fn stop(mut self) -> Result<()> {
        self.reader_task.abort();
        let _ = self.child.kill().await;
        let _ = std::fs::remove_file(&self.socket_path);
        Ok(())
    }

    async fn send_command(&mut self, command: Value) -> Result<()> {
        let line = command_line(&command)?;
        self.writer
            .write_all(line.as_bytes())
            .await
            .context("writing to mpv socket")
    }
}

/// Serialize one command as an IPC line.
fn command_line(command: &Value) -> Result<String> {
    let mut line = serde_json::to_string(&json!({ "command": command }))?;
    line.push('\n');
    Ok(line)
}

async fn wait_for_socket(child: &mut Child, socket_path: &PathBuf) -> Result<UnixStream> {
    let deadline = tokio::time::Instant::now() + SOCKET_WAIT;
    loop {
        if let Some(status) = child.try_wait()? {
            bail!("mpv exited during startup with {status}");
        }
        match UnixStream::connect(socket_path).await {
            Ok(stream) => return Ok(stream),
            Err(err) => {
                if tokio::time::Instant::now() >= deadline {
                    return Err(err).with_context(|| {
                        format!("mpv IPC socket never appeared at {}", socket_path.display())
                    });
                }
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
        }
    }
}

/// Read mpv events until the socket closes, folding property changes
/// into the status channel.
async fn read_loop(read_half: OwnedReadHalf, status_tx: watch::Sender<PlayerStatus>) {
    let mut lines = BufReader::new(read_half).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                let Ok(event) = serde_json::from_str::<MpvEvent>(&line) else {
                    continue;
                };
                if event.event.as_deref() != Some("property-change") {
                    continue;
                }
                status_tx.send_modify(|status| apply_property_change(status, &event));
            }
            Ok(None) => break,
            Err(err) => {
                debug!(%err, "mpv status socket read failed");
                break;
            }
        }
    }
}

fn apply_property_change(status: &mut PlayerStatus, event: &MpvEvent) {
    let data = event.data.as_ref();
    match event.id {
        Some(OBSERVE_TIME_POS) => {
            status.position = data.and_then(Value::as_f64).unwrap_or(0.0);
        }
        Some(OBSERVE_DURATION) => {
            status.duration = data.and_then(Value::as_f64).unwrap_or(0.0);
        }
        Some(OBSERVE_PAUSE) => {
            status.paused = data.and_then(Value::as_bool).unwrap_or(false);
        }
        Some(OBSERVE_VOLUME) => {
            status.volume = data.and_then(Value::as_f64).unwrap_or(DEFAULT_VOLUME as f64) as i64;
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_line_shape() {
        let line = command_line(&json!(["cycle", "pause"])).unwrap();
        assert_eq!(line, "{\"command\":[\"cycle\",\"pause\"]}\n");
    }

    #[test]
    fn test_property_change_updates_position() {
        let event: MpvEvent =
            serde_json::from_str(r#"{"event":"property-change","id":1,"data":42.5}"#).unwrap();
        let mut status = PlayerStatus::default();

        apply_property_change(&mut status, &event);

        assert_eq!(status.position, 42.5);
    }

    #[test]
    fn test_property_change_updates_pause_and_volume() {
        let mut status = PlayerStatus::default();

        let pause: MpvEvent =
            serde_json::from_str(r#"{"event":"property-change","id":3,"data":true}"#).unwrap();
        apply_property_change(&mut status, &pause);

        let volume: MpvEvent =
            serde_json::from_str(r#"{"event":"property-change","id":4,"data":75.0}"#).unwrap();
        apply_property_change(&mut status, &volume);

        assert!(status.paused);
        assert_eq!(status.volume, 75);
    }

    #[test]
    fn test_unknown_observer_id_is_ignored() {
        let event: MpvEvent =
            serde_json::from_str(r#"{"event":"property-change","id":9,"data":1.0}"#).unwrap();
        let mut status = PlayerStatus::default();

        apply_property_change(&mut status, &event);

        assert_eq!(status, PlayerStatus::default());
    }
}
