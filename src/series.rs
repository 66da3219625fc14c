//! Ordered slices of one series, navigation and timed playback

use crate::dicom::DecodedImage;
use std::time::{Duration, Instant};
use tracing::debug;

pub const DEFAULT_FPS: u32 = 10;
pub const MIN_FPS: u32 = 1;
pub const MAX_FPS: u32 = 60;

/// One entry of a series: a decoded image, or the reason it failed
#[derive(Debug, Clone)]
pub enum Slice {
    Decoded { label: String, image: Box<DecodedImage> },
    Failed { label: String, message: String },
}

impl Slice {
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Decoded { label, .. } | Self::Failed { label, .. } => label,
        }
    }

    #[must_use]
    pub fn image(&self) -> Option<&DecodedImage> {
        match self {
            Self::Decoded { image, .. } => Some(image.as_ref()),
            Self::Failed { .. } => None,
        }
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Decoded { .. } => None,
            Self::Failed { message, .. } => Some(message),
        }
    }
}

#[derive(Debug)]
pub struct SeriesState {
    slices: Vec<Slice>,
    current_index: usize,
    playing: bool,
    fps: u32,
    last_advance: Option<Instant>,
}

impl SeriesState {
    #[must_use]
    pub fn new(slices: Vec<Slice>) -> Self {
        Self {
            slices,
            current_index: 0,
            playing: false,
            fps: DEFAULT_FPS,
            last_advance: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.slices.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn slices(&self) -> &[Slice] {
        &self.slices
    }

    #[inline]
    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    #[must_use]
    pub fn current(&self) -> Option<&Slice> {
        self.slices.get(self.current_index)
    }

    #[inline]
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    #[inline]
    #[must_use]
    pub fn fps(&self) -> u32 {
        self.fps
    }

    /// Move to the next slice; a no-op on the last one
    pub fn next(&mut self) -> bool {
        if self.current_index + 1 < self.slices.len() {
            self.current_index += 1;
            true
        } else {
            false
        }
    }

    /// Move to the previous slice; a no-op on the first one
    pub fn previous(&mut self) -> bool {
        if self.current_index > 0 {
            self.current_index -= 1;
            true
        } else {
            false
        }
    }

    /// Jump to `index`, clamped to the series
    pub fn jump_to(&mut self, index: usize) {
        self.current_index = index.min(self.slices.len().saturating_sub(1));
    }

    pub fn play(&mut self) {
        if !self.slices.is_empty() {
            self.playing = true;
            self.last_advance = None;
        }
    }

    pub fn pause(&mut self) {
        self.playing = false;
    }

    pub fn toggle_playback(&mut self) {
        if self.playing {
            self.pause();
        } else {
            self.play();
        }
    }

    pub fn set_fps(&mut self, fps: u32) {
        self.fps = fps.clamp(MIN_FPS, MAX_FPS);
    }

    /// Time between frames during playback, `1000 / fps` milliseconds
    #[must_use]
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(1000 / u64::from(self.fps))
    }

    /// One playback step. On the last slice playback wraps to the first
    /// slice and stops instead of looping.
    pub fn advance_playback(&mut self) {
        if self.slices.is_empty() {
            return;
        }
        if self.current_index + 1 >= self.slices.len() {
            self.current_index = 0;
            self.playing = false;
            debug!("playback reached the end of the series");
        } else {
            self.current_index += 1;
        }
    }

    /// Drive playback from the caller's clock. The first tick after `play`
    /// only sets the baseline. Returns whether the index changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        if !self.playing {
            return false;
        }
        let Some(last) = self.last_advance else {
            self.last_advance = Some(now);
            return false;
        };
        if now.duration_since(last) < self.frame_interval() {
            return false;
        }

        let before = self.current_index;
        self.advance_playback();
        self.last_advance = Some(now);
        before != self.current_index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(len: usize) -> SeriesState {
        let slices = (0..len)
            .map(|i| Slice::Failed {
                label: format!("slice{i}.dcm"),
                message: "not decoded".to_string(),
            })
            .collect();
        SeriesState::new(slices)
    }

    #[test]
    fn test_navigation_clamps() {
        let mut s = series(3);
        assert!(!s.previous());
        assert_eq!(s.current_index(), 0);

        assert!(s.next());
        assert!(s.next());
        assert!(!s.next());
        assert_eq!(s.current_index(), 2);

        s.jump_to(100);
        assert_eq!(s.current_index(), 2);
        s.jump_to(1);
        assert_eq!(s.current().map(Slice::label), Some("slice1.dcm"));
    }

    #[test]
    fn test_playback_wraps_and_stops_at_end() {
        let mut s = series(4);
        s.jump_to(3);
        s.play();
        s.advance_playback();
        assert_eq!(s.current_index(), 0);
        assert!(!s.is_playing());
    }

    #[test]
    fn test_fps_and_interval() {
        let mut s = series(2);
        assert_eq!(s.fps(), DEFAULT_FPS);
        assert_eq!(s.frame_interval(), Duration::from_millis(100));

        s.set_fps(0);
        assert_eq!(s.fps(), MIN_FPS);
        s.set_fps(500);
        assert_eq!(s.fps(), MAX_FPS);
        assert_eq!(s.frame_interval(), Duration::from_millis(16));
    }

    #[test]
    fn test_tick_follows_clock() {
        let mut s = series(3);
        let start = Instant::now();
        assert!(!s.tick(start), "paused series never advances");

        s.play();
        assert!(!s.tick(start));
        assert!(!s.tick(start + Duration::from_millis(50)));
        assert!(s.tick(start + Duration::from_millis(100)));
        assert_eq!(s.current_index(), 1);
        assert!(s.tick(start + Duration::from_millis(200)));
        assert_eq!(s.current_index(), 2);

        // last slice: wrap to the start and stop
        assert!(s.tick(start + Duration::from_millis(300)));
        assert_eq!(s.current_index(), 0);
        assert!(!s.is_playing());
        assert!(!s.tick(start + Duration::from_millis(400)));
    }

    #[test]
    fn test_empty_series() {
        let mut s = series(0);
        s.play();
        assert!(!s.is_playing());
        assert!(!s.next());
        s.jump_to(5);
        assert_eq!(s.current_index(), 0);
        assert!(s.current().is_none());
    }
}
