//! Shared-memory transport: a named region whose first byte is a status
//! flag (`0` idle, `1` writer in progress, `2` ready for reader). Polls up
//! to 10 x 10ms for the flag to reach `2`, reads the frame bytes, then
//! resets the flag to `0`. The writer side (the host process) is out of
//! scope; this module only implements the reader.

use std::time::Duration;

use shared_memory::{Shmem, ShmemConf};
use tokio::time::sleep;

use crate::error::ServerError;

const STATUS_IDLE: u8 = 0;
#[allow(dead_code)]
const STATUS_WRITING: u8 = 1;
const STATUS_READY: u8 = 2;

const POLL_ATTEMPTS: u32 = 10;
const POLL_INTERVAL: Duration = Duration::from_millis(10);

pub struct FrameShm {
    shmem: Shmem,
}

// SAFETY: the underlying os_id handle is only touched from the async task
// that owns `FrameShm`; we never hand out a second handle to the same
// region from this process.
unsafe impl Send for FrameShm {}

impl FrameShm {
    /// Opens (or creates, if absent) the named region sized for the
    /// largest frame this transport supports: `4000*2500*4 + 1` bytes, the
    /// extra byte being the status flag at offset 0.
    pub fn open_or_create(os_id: &str) -> Result<Self, ServerError> {
        const CAPACITY: usize = 4000 * 2500 * 4 + 1;

        let shmem = match ShmemConf::new().os_id(os_id).open() {
            Ok(s) => s,
            Err(_) => ShmemConf::new()
                .os_id(os_id)
                .size(CAPACITY)
                .create()
                .map_err(|e| ServerError::TransientInput(format!("shm create failed: {e}")))?,
        };
        Ok(Self { shmem })
    }

    fn flag(&self) -> u8 {
        unsafe { *self.shmem.as_ptr() }
    }

    fn set_flag(&self, value: u8) {
        unsafe {
            *self.shmem.as_ptr() = value;
        }
    }

    fn payload(&self, len: usize) -> &[u8] {
        unsafe { std::slice::from_raw_parts(self.shmem.as_ptr().add(1), len) }
    }

    /// Polls up to `POLL_ATTEMPTS * POLL_INTERVAL` (~100ms) for the status
    /// flag to reach `STATUS_READY`, then copies out exactly `w * h * 4`
    /// BGRA bytes and resets the flag to idle. Returns
    /// [`ServerError::TransientInput`] on timeout or a region too small
    /// for the requested dimensions. The writer must never see the flag
    /// stuck at `STATUS_WRITING` from a reader's perspective.
    pub async fn read_frame(&self, w: u32, h: u32) -> Result<Vec<u8>, ServerError> {
        let needed = w as usize * h as usize * 4;

        for _ in 0..POLL_ATTEMPTS {
            if self.flag() == STATUS_READY {
                if needed > self.shmem.len().saturating_sub(1) {
                    return Err(ServerError::TransientInput(
                        "frame dimensions exceed shared memory capacity".into(),
                    ));
                }
                let data = self.payload(needed).to_vec();
                self.set_flag(STATUS_IDLE);
                return Ok(data);
            }
            sleep(POLL_INTERVAL).await;
        }

        Err(ServerError::TransientInput(
            "timed out waiting for writer".into(),
        ))
    }
}
