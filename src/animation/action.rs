/// Playback controls exposed for one animation clip. Handles are borrowed
/// from the mixer and carry no ability to reach into other clips.
pub trait AnimationAction {
    /// Rewind to the start and clear any fade, leaving the action enabled.
    fn reset(&mut self);
    /// Ramp the action's influence from zero to full over `seconds`.
    fn fade_in(&mut self, seconds: f32);
    /// Start advancing the clip. The clip repeats until stopped.
    fn play(&mut self);
    /// Halt immediately: influence to zero, position back to the start.
    fn stop(&mut self);
    fn is_running(&self) -> bool;
}

#[derive(Debug, Clone, Copy)]
struct Fade {
    from: f32,
    to: f32,
    duration: f32,
    elapsed: f32,
}

/// Playback state for one clip.
#[derive(Debug, Clone)]
pub struct ActionState {
    pub clip: usize,
    duration: f32,
    time: f32,
    weight: f32,
    playing: bool,
    fade: Option<Fade>,
}

impl ActionState {
    pub fn new(clip: usize, duration: f32) -> Self {
        Self {
            clip,
            duration,
            time: 0.0,
            weight: 1.0,
            playing: false,
            fade: None,
        }
    }

    /// Clip position in seconds.
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Influence of this action on the pose, 0 when stopped.
    pub fn effective_weight(&self) -> f32 {
        if self.playing { self.weight } else { 0.0 }
    }

    pub fn update(&mut self, dt: f32) {
        if !self.playing {
            return;
        }

        if let Some(fade) = &mut self.fade {
            fade.elapsed += dt;
            if fade.elapsed >= fade.duration {
                self.weight = fade.to;
                self.fade = None;
            } else {
                let t = fade.elapsed / fade.duration;
                self.weight = fade.from + (fade.to - fade.from) * t;
            }
        }

        self.time += dt;
        if self.duration > 0.0 {
            while self.time >= self.duration {
                self.time -= self.duration;
            }
        }
    }
}

impl AnimationAction for ActionState {
    fn reset(&mut self) {
        self.time = 0.0;
        self.fade = None;
    }

    fn fade_in(&mut self, seconds: f32) {
        if seconds <= 0.0 {
            self.weight = 1.0;
            self.fade = None;
            return;
        }
        self.weight = 0.0;
        self.fade = Some(Fade {
            from: 0.0,
            to: 1.0,
            duration: seconds,
            elapsed: 0.0,
        });
    }

    fn play(&mut self) {
        self.playing = true;
    }

    fn stop(&mut self) {
        self.playing = false;
        self.time = 0.0;
        self.weight = 0.0;
        self.fade = None;
    }

    fn is_running(&self) -> bool {
        self.playing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started_action() -> ActionState {
        let mut action = ActionState::new(0, 2.0);
        action.reset();
        action.fade_in(0.5);
        action.play();
        action
    }

    #[test]
    fn fade_in_ramps_the_weight_to_full() {
        let mut action = started_action();
        assert!(action.effective_weight().abs() < 1e-6);

        action.update(0.25);
        assert!((action.effective_weight() - 0.5).abs() < 1e-6);

        action.update(0.25);
        assert!((action.effective_weight() - 1.0).abs() < 1e-6);

        action.update(1.0);
        assert!((action.effective_weight() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn playback_repeats_at_the_clip_duration() {
        let mut action = started_action();
        action.update(2.5);
        assert!(action.is_running());
        assert!((action.time() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn stop_rewinds_and_drops_influence() {
        let mut action = started_action();
        action.update(1.0);
        action.stop();
        assert!(!action.is_running());
        assert!(action.time().abs() < 1e-6);
        assert!(action.effective_weight().abs() < 1e-6);

        // A stopped action no longer advances.
        action.update(1.0);
        assert!(action.time().abs() < 1e-6);
    }

    #[test]
    fn weight_is_zero_until_played() {
        let mut action = ActionState::new(0, 1.0);
        action.fade_in(0.0);
        assert!(action.effective_weight().abs() < 1e-6);
        action.play();
        assert!((action.effective_weight() - 1.0).abs() < 1e-6);
    }
}
