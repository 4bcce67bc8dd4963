//! Terminal stand-in for a camera and barcode decoder
//!
//! Each line read while the camera is attached counts as one decoder
//! reading: a barcode, or nothing found when the line is blank. Lines typed
//! before the stream starts stay buffered until it does.

use crate::scanner::api::{CameraDevice, CameraError, DecodeAttempt, DecodeSender, PermissionState};
use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Camera whose "stream" is an input source feeding [`spawn_decoder`]
pub struct TerminalCamera {
    attached: watch::Sender<bool>,
}

impl TerminalCamera {
    pub fn new() -> Self {
        let (attached, _) = watch::channel(false);
        Self { attached }
    }

    /// Receiver the decoder waits on; `true` while the stream is attached
    pub fn stream_state(&self) -> watch::Receiver<bool> {
        self.attached.subscribe()
    }
}

impl Default for TerminalCamera {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CameraDevice for TerminalCamera {
    fn is_supported(&self) -> bool {
        true
    }

    async fn query_permission(&self) -> Result<PermissionState, CameraError> {
        Ok(PermissionState::Granted)
    }

    async fn request_access(&mut self) -> Result<(), CameraError> {
        Ok(())
    }

    async fn start_stream(&mut self) -> Result<(), CameraError> {
        if self.attached.is_closed() {
            return Err(CameraError::Unavailable(
                "terminal input is closed".to_string(),
            ));
        }
        self.attached.send_replace(true);
        Ok(())
    }

    fn release(&mut self) {
        self.attached.send_replace(false);
    }
}

/// Read lines from `reader` and forward them as decoder readings
///
/// Reading pauses while the camera is released. The task ends at end of
/// input, when the camera is dropped, or when the controller goes away.
pub fn spawn_decoder<R>(
    reader: R,
    decodes: DecodeSender,
    mut attached: watch::Receiver<bool>,
) -> JoinHandle<()>
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = reader.lines();

        loop {
            if attached.wait_for(|on| *on).await.is_err() {
                break;
            }

            let line = tokio::select! {
                line = lines.next_line() => line,
                detached = attached.wait_for(|on| !*on) => {
                    if detached.is_err() {
                        break;
                    }
                    continue;
                }
            };

            let (attempt, done) = match line {
                Ok(Some(text)) => (reading_from_line(&text), false),
                Ok(None) => {
                    log::debug!("Decoder input closed");
                    break;
                }
                Err(e) => (DecodeAttempt::Failure(e.to_string()), true),
            };

            if decodes.send(attempt).await.is_err() || done {
                break;
            }
        }
    })
}

fn reading_from_line(line: &str) -> DecodeAttempt {
    let code = line.trim();
    if code.is_empty() {
        DecodeAttempt::NotFound
    } else {
        DecodeAttempt::Decoded(code.to_string())
    }
}
