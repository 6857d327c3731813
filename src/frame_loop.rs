//! Cooperative frame loop.
//!
//! A frame is never re-entered: a request that arrives while a frame is running
//! is dropped, not queued. [`FrameLoop::tick`] runs one iteration of the loop
//! (apply loaded assets, render, step the animations) and reports whether the
//! caller should schedule another one.

use std::cell::Cell;
use std::time::{Duration, Instant};

use crate::animation::Animator;
use crate::loader::AssetLoader;
use crate::render::{PresentSurface, Rasterizer};
use crate::scene::Scene;

pub const FPS: u32 = 60;

/// Clears the busy flag when the frame ends, also on unwinding.
struct BusyGuard<'a>(&'a Cell<bool>);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

#[derive(Debug, Default)]
pub struct FrameLoop {
    busy: Cell<bool>,
    run_animation: Cell<bool>,
    frames: Cell<u64>,
    dropped: Cell<u64>,
}

impl FrameLoop {
    pub fn new(run_animation: bool) -> Self {
        let frame_loop = Self::default();
        frame_loop.run_animation.set(run_animation);
        frame_loop
    }

    pub fn is_busy(&self) -> bool {
        self.busy.get()
    }

    pub fn run_animation(&self) -> bool {
        self.run_animation.get()
    }

    pub fn set_run_animation(&self, run: bool) {
        self.run_animation.set(run);
    }

    pub fn toggle_run_animation(&self) {
        self.run_animation.set(!self.run_animation.get());
    }

    /// Frames run to completion.
    pub fn frames(&self) -> u64 {
        self.frames.get()
    }

    /// Requests refused because a frame was already running.
    pub fn dropped_frames(&self) -> u64 {
        self.dropped.get()
    }

    /// Run `frame` unless another frame is in progress, in which case the
    /// request is dropped and `None` returned.
    pub fn run_frame<T>(&self, frame: impl FnOnce() -> T) -> Option<T> {
        if self.busy.replace(true) {
            self.dropped.set(self.dropped.get() + 1);
            log::debug!("frame dropped, previous frame still running");
            return None;
        }
        let _guard = BusyGuard(&self.busy);
        let result = frame();
        self.frames.set(self.frames.get() + 1);
        Some(result)
    }

    /// One loop iteration. Returns `Some(true)` while another frame is wanted:
    /// the scene is unsettled, assets are in flight or animation runs.
    pub fn tick(
        &self,
        scene: &mut Scene,
        rasterizer: &mut dyn Rasterizer,
        surface: &mut dyn PresentSurface,
        animator: &mut Animator,
        loader: &mut AssetLoader,
    ) -> Option<bool> {
        self.run_frame(|| {
            loader.poll(scene);
            let settled = scene.render_frame(rasterizer, surface);
            let animate = self.run_animation.get();
            if animate {
                animator.step(scene);
            }
            !settled || animate || !loader.is_idle()
        })
    }
}

/// Sleeps to hold a target frame rate.
pub struct FrameLimiter {
    previous_frame_time: Instant,
    frame_target_time: Duration,
}

impl FrameLimiter {
    pub fn new(fps: u32) -> Self {
        Self {
            previous_frame_time: Instant::now(),
            frame_target_time: Duration::from_secs(1) / fps.max(1),
        }
    }

    /// Waits if necessary to maintain frame rate and returns the time elapsed
    /// since the last call.
    pub fn wait_and_get_delta(&mut self) -> Duration {
        let mut delta_time = self.previous_frame_time.elapsed();
        if delta_time < self.frame_target_time {
            std::thread::sleep(self.frame_target_time - delta_time);
            delta_time = self.previous_frame_time.elapsed();
        }
        self.previous_frame_time = Instant::now();
        delta_time
    }
}
