use std::path::Path;
use std::sync::{Arc, mpsc};
use std::time::{Duration, Instant};

use crate::assets::decode::{decode_image, load_image_file};
use crate::assets::raster::RasterImage;
use crate::foundation::error::{TbiError, TbiResult};
use crate::scene::state::{CutoutStatus, CutoutTicket, EditorState};
use crate::segment::segmenter::Segmenter;

type CutoutMsg = (CutoutTicket, TbiResult<RasterImage>);

/// Options controlling an [`Editor`].
#[derive(Clone, Debug)]
pub struct EditorOpts {
    /// Worker threads for segmentation requests.
    pub threads: usize,
}

impl Default for EditorOpts {
    fn default() -> Self {
        Self { threads: 1 }
    }
}

/// Drives an [`EditorState`] and its background segmentation.
///
/// All state transitions happen on the thread that owns the editor. Segmentation runs on a
/// dedicated rayon pool and reports back over a channel; results are folded in by
/// [`Editor::poll`] or [`Editor::wait_for_cutout`] and are dropped if the image they were computed
/// for has since been replaced.
pub struct Editor {
    state: EditorState,
    segmenter: Arc<dyn Segmenter>,
    pool: rayon::ThreadPool,
    tx: mpsc::Sender<CutoutMsg>,
    rx: mpsc::Receiver<CutoutMsg>,
}

impl Editor {
    /// Editor with an empty state.
    pub fn new(segmenter: Arc<dyn Segmenter>, opts: EditorOpts) -> TbiResult<Self> {
        let pool = build_thread_pool(opts.threads)?;
        let (tx, rx) = mpsc::channel();
        Ok(Self {
            state: EditorState::new(),
            segmenter,
            pool,
            tx,
            rx,
        })
    }

    /// Current state.
    pub fn state(&self) -> &EditorState {
        &self.state
    }

    /// Decode an uploaded PNG/JPEG and request its cutout.
    ///
    /// On a decode error the current state is left untouched.
    pub fn load_image_bytes(&mut self, bytes: &[u8]) -> TbiResult<CutoutTicket> {
        let image = decode_image(bytes)?;
        Ok(self.load_image(image))
    }

    /// Read and load an image file. Only `.png`, `.jpg` and `.jpeg` are accepted.
    pub fn load_image_file(&mut self, path: &Path) -> TbiResult<CutoutTicket> {
        let image = load_image_file(path)?;
        Ok(self.load_image(image))
    }

    /// Store an already decoded image and request its cutout.
    pub fn load_image(&mut self, image: RasterImage) -> CutoutTicket {
        let (state, ticket) = std::mem::take(&mut self.state).with_image(image.clone());
        self.state = state;

        let segmenter = Arc::clone(&self.segmenter);
        let tx = self.tx.clone();
        tracing::debug!(epoch = ticket.epoch(), segmenter = segmenter.name(), "requesting cutout");
        self.pool.spawn(move || {
            let result = segmenter.segment(&image);
            // The editor may be gone already; nothing left to deliver to.
            let _ = tx.send((ticket, result));
        });
        ticket
    }

    /// Apply every cutout result delivered so far without blocking. Returns how many were applied.
    pub fn poll(&mut self) -> usize {
        let mut applied = 0;
        while let Ok((ticket, result)) = self.rx.try_recv() {
            self.apply(ticket, result);
            applied += 1;
        }
        applied
    }

    /// Block until the current cutout request resolves or `timeout` elapses.
    pub fn wait_for_cutout(&mut self, timeout: Duration) -> CutoutStatus {
        self.poll();
        let deadline = Instant::now() + timeout;
        while self.state.cutout_status() == CutoutStatus::Pending {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                tracing::warn!(?timeout, "cutout still pending after timeout");
                break;
            }
            match self.rx.recv_timeout(remaining) {
                Ok((ticket, result)) => self.apply(ticket, result),
                Err(mpsc::RecvTimeoutError::Timeout) => {}
                Err(mpsc::RecvTimeoutError::Disconnected) => break,
            }
        }
        self.state.cutout_status()
    }

    /// Apply a pure state transition.
    pub fn update<F>(&mut self, f: F)
    where
        F: FnOnce(EditorState) -> EditorState,
    {
        self.state = f(std::mem::take(&mut self.state));
    }

    /// Apply a fallible state transition; on error the state is left unchanged.
    pub fn try_update<F>(&mut self, f: F) -> TbiResult<()>
    where
        F: FnOnce(EditorState) -> TbiResult<EditorState>,
    {
        self.state = f(self.state.clone())?;
        Ok(())
    }

    fn apply(&mut self, ticket: CutoutTicket, result: TbiResult<RasterImage>) {
        self.update(|s| s.with_cutout(ticket, result));
    }
}

fn build_thread_pool(threads: usize) -> TbiResult<rayon::ThreadPool> {
    if threads == 0 {
        return Err(TbiError::validation("editor 'threads' must be >= 1"));
    }
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|i| format!("textbehind-segment-{i}"))
        .build()
        .map_err(|e| TbiError::Other(anyhow::anyhow!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/session/editor.rs"]
mod tests;
