//! Background logo loading
//!
//! The logo is decoded on a worker thread and handed to the render thread over
//! a channel, which polls for it between frames without blocking.

use image::RgbaImage;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use crate::error::{Error, Result};

/// Result of a finished load
pub enum LoadStatus {
    Pending,
    Ready(RgbaImage),
    Failed(String),
}

/// Loader for a single image, started on construction
pub struct AssetLoader {
    path: PathBuf,
    receiver: Option<Receiver<Result<RgbaImage>>>,
}

impl AssetLoader {
    /// Start loading `path` in the background
    pub fn spawn(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let (sender, receiver) = mpsc::channel();
        let worker_path = path.clone();

        thread::spawn(move || {
            // The receiver may be gone if the window closed first
            let _ = sender.send(load_rgba(&worker_path));
        });

        Self {
            path,
            receiver: Some(receiver),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check for completion (non-blocking)
    ///
    /// Reports `Ready`/`Failed` once; afterwards the loader stays `Pending`.
    pub fn poll(&mut self) -> LoadStatus {
        let Some(receiver) = &self.receiver else {
            return LoadStatus::Pending;
        };
        let status = match receiver.try_recv() {
            Ok(Ok(image)) => LoadStatus::Ready(image),
            Ok(Err(e)) => LoadStatus::Failed(e.to_string()),
            Err(TryRecvError::Empty) => return LoadStatus::Pending,
            Err(TryRecvError::Disconnected) => {
                LoadStatus::Failed("loader thread exited without a result".into())
            },
        };
        self.receiver = None;
        status
    }

    /// Block until the load finishes
    pub fn wait(mut self) -> Result<RgbaImage> {
        let receiver = self
            .receiver
            .take()
            .ok_or_else(|| Error::Io(std::io::Error::other("load result already taken")))?;
        receiver
            .recv()
            .map_err(|_| Error::Io(std::io::Error::other("loader thread exited")))?
    }
}

/// Decode any supported image format into RGBA8
pub fn load_rgba(path: &Path) -> Result<RgbaImage> {
    let image = image::open(path)?;
    Ok(image.to_rgba8())
}
