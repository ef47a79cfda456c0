// Animated clip playback for the overlay. Frames are decoded once on a
// background task and advanced against the frame clock here.

use std::io::Cursor;

use image::AnimationDecoder;
use image::codecs::gif::GifDecoder;

use crate::error::{ViewerError, ViewerResult};

pub struct ClipFrame {
    pub image: egui::ColorImage,
    /// Display time of this frame in seconds.
    pub delay: f32,
}

pub struct ClipFrames {
    pub size: [usize; 2],
    pub frames: Vec<ClipFrame>,
    pub duration: f32,
}

/// Decode an animated GIF into RGBA frames with their delays.
pub fn decode_clip(bytes: &[u8]) -> ViewerResult<ClipFrames> {
    let decoder = GifDecoder::new(Cursor::new(bytes))?;
    let frames = decoder.into_frames().collect_frames()?;
    if frames.is_empty() {
        return Err(ViewerError::Unsupported("clip has no frames".to_string()));
    }

    let mut out = Vec::with_capacity(frames.len());
    let mut duration = 0.0f32;
    let mut size = [0usize; 2];
    for frame in frames {
        let (numer, denom) = frame.delay().numer_denom_ms();
        let denom = denom.max(1);
        // GIF encoders write 0 delays for "as fast as possible"; hold those
        // frames for a tenth of a second like browsers do.
        let mut delay = numer as f32 / denom as f32 / 1000.0;
        if delay <= 0.0 {
            delay = 0.1;
        }

        let buffer = frame.into_buffer();
        size = [buffer.width() as usize, buffer.height() as usize];
        let image = egui::ColorImage::from_rgba_unmultiplied(size, buffer.as_raw());
        duration += delay;
        out.push(ClipFrame { image, delay });
    }

    Ok(ClipFrames {
        size,
        frames: out,
        duration,
    })
}

/// Playback state over a decoded clip. Plays through once and reports the
/// end exactly once; `rewind` rearms it.
pub struct ClipPlayer {
    frames: ClipFrames,
    position: f32,
    playing: bool,
    ended: bool,
}

impl ClipPlayer {
    pub fn new(frames: ClipFrames) -> Self {
        Self {
            frames,
            position: 0.0,
            playing: false,
            ended: false,
        }
    }

    pub fn play(&mut self) {
        self.playing = true;
    }

    pub fn pause(&mut self) {
        self.playing = false;
    }

    /// Back to position zero, ready to play through again.
    pub fn rewind(&mut self) {
        self.position = 0.0;
        self.ended = false;
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn position(&self) -> f32 {
        self.position
    }

    pub fn duration(&self) -> f32 {
        self.frames.duration
    }

    pub fn progress(&self) -> f32 {
        if self.frames.duration > 0.0 {
            self.position / self.frames.duration
        } else {
            0.0
        }
    }

    pub fn size(&self) -> [usize; 2] {
        self.frames.size
    }

    /// Advance playback. Returns true on the update that reaches the end.
    pub fn update(&mut self, dt: f32) -> bool {
        if !self.playing {
            return false;
        }

        self.position += dt;
        if self.position >= self.frames.duration {
            self.position = self.frames.duration;
            self.playing = false;
            let just_ended = !self.ended;
            self.ended = true;
            return just_ended;
        }
        false
    }

    pub fn frame_index(&self) -> usize {
        let mut elapsed = 0.0f32;
        for (index, frame) in self.frames.frames.iter().enumerate() {
            elapsed += frame.delay;
            if self.position < elapsed {
                return index;
            }
        }
        self.frames.frames.len().saturating_sub(1)
    }

    pub fn current_image(&self) -> Option<&egui::ColorImage> {
        self.frames.frames.get(self.frame_index()).map(|f| &f.image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frames(delays: &[f32]) -> ClipFrames {
        let size = [2, 2];
        let frames = delays
            .iter()
            .map(|&delay| ClipFrame {
                image: egui::ColorImage::from_rgba_unmultiplied(size, &[0u8; 16]),
                delay,
            })
            .collect();
        ClipFrames {
            size,
            frames,
            duration: delays.iter().sum(),
        }
    }

    #[test]
    fn frame_index_follows_the_delays() {
        let mut player = ClipPlayer::new(frames(&[0.1, 0.1, 0.3]));
        player.play();
        assert_eq!(player.frame_index(), 0);
        player.update(0.15);
        assert_eq!(player.frame_index(), 1);
        player.update(0.1);
        assert_eq!(player.frame_index(), 2);
    }

    #[test]
    fn playback_ends_exactly_once() {
        let mut player = ClipPlayer::new(frames(&[0.2, 0.2]));
        player.play();
        assert!(!player.update(0.3));
        assert!(player.update(0.2));
        assert!(!player.is_playing());
        assert!((player.progress() - 1.0).abs() < 1e-6);

        // Further updates stay silent, even if play is pressed again.
        player.play();
        assert!(!player.update(0.1));
    }

    #[test]
    fn rewind_rearms_the_end_event() {
        let mut player = ClipPlayer::new(frames(&[0.2]));
        player.play();
        assert!(player.update(0.5));

        player.rewind();
        assert!(player.position().abs() < 1e-6);
        player.play();
        assert!(player.update(0.5));
    }

    #[test]
    fn pause_holds_the_position() {
        let mut player = ClipPlayer::new(frames(&[0.5, 0.5]));
        player.play();
        player.update(0.3);
        player.pause();
        player.update(1.0);
        assert!((player.position() - 0.3).abs() < 1e-6);
        assert!(!player.is_playing());
    }
}
