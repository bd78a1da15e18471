//! Static border obstacles and the background task that keeps relocating
//! obstacles on the Hard level.

use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::{debug, warn};

use crate::board::SharedBoard;
use crate::config::ObstacleSettings;
use crate::Position;

/// Every cell on the edge of a `width` x `height` grid, corners once.
pub fn border_obstacles(width: usize, height: usize) -> Vec<Position> {
    let (w, h) = (width as i32, height as i32);
    if w == 0 || h == 0 {
        return vec![];
    }

    let mut cells = Vec::with_capacity(2 * width + 2 * height);
    for x in 0..w {
        cells.push(Position::new(x, 0));
        if h > 1 {
            cells.push(Position::new(x, h - 1));
        }
    }
    for y in 1..h - 1 {
        cells.push(Position::new(0, y));
        if w > 1 {
            cells.push(Position::new(w - 1, y));
        }
    }
    cells
}

/// Handle to the relocation thread. Stopping (or dropping) it clears the
/// board's running flag, wakes the thread and joins it.
pub struct ObstacleMutator {
    board: Arc<SharedBoard>,
    handle: Option<JoinHandle<()>>,
}

impl ObstacleMutator {
    pub fn spawn(board: Arc<SharedBoard>, settings: ObstacleSettings) -> io::Result<Self> {
        let shared = Arc::clone(&board);
        let handle = thread::Builder::new()
            .name("obstacle-mutator".into())
            .spawn(move || relocate_until_stopped(&shared, &settings))?;

        Ok(ObstacleMutator { board, handle: Some(handle) })
    }

    pub fn is_stopped(&self) -> bool {
        self.handle.is_none()
    }

    pub fn stop(&mut self) {
        let handle = match self.handle.take() {
            Some(handle) => handle,
            None => return,
        };

        self.board.lock().running = false;
        self.board.notify();

        if handle.join().is_err() {
            warn!("obstacle mutator panicked");
        } else {
            debug!("obstacle mutator stopped");
        }
    }
}

impl Drop for ObstacleMutator {
    fn drop(&mut self) {
        self.stop();
    }
}

fn relocate_until_stopped(board: &SharedBoard, settings: &ObstacleSettings) {
    let mut guard = board.lock();

    while guard.running {
        guard = board.wait_while_running(guard, settings.period);
        if !guard.running {
            break;
        }

        let placed = guard.regenerate_obstacles(settings.min_count..=settings.max_count);
        if placed < settings.min_count {
            warn!(placed, "grid too crowded for the full obstacle set");
        }
        debug!(placed, "obstacles relocated");
    }
}
