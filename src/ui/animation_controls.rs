use crate::animation::Mixer;
use crate::timer::Delay;
use crate::video::ClipPlayer;
use log::info;
use std::time::{Duration, Instant};

/// The clip starts a beat after the overlay opens so the dialog is already
/// on screen when the first frame shows.
const CLIP_START_DELAY: Duration = Duration::from_millis(100);

/// Fade-in time for the animation blend, in seconds.
const FADE_SECONDS: f32 = 0.5;

const PLAY_COLOR: egui::Color32 = egui::Color32::from_rgb(76, 175, 80);
const STOP_COLOR: egui::Color32 = egui::Color32::from_rgb(244, 67, 54);

/// The play/stop trigger and the clip overlay it opens. One trigger drives
/// three things in lockstep: the model animation, the overlay dialog, and
/// the clip playback inside it.
pub struct AnimationControls {
    playing: bool,
    overlay_open: bool,
    clip_delay: Delay,
    clip_texture: Option<egui::TextureHandle>,
    texture_frame: Option<usize>,
}

impl AnimationControls {
    pub fn new() -> Self {
        Self {
            playing: false,
            overlay_open: false,
            clip_delay: Delay::default(),
            clip_texture: None,
            texture_frame: None,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_overlay_open(&self) -> bool {
        self.overlay_open
    }

    /// Starts the animation from the beginning, fading it in, and opens
    /// the clip overlay. The clip itself starts once the delay fires.
    pub fn activate(&mut self, now: Instant, mixer: &mut Mixer, player: &mut Option<ClipPlayer>) {
        if !mixer.has_actions() {
            return;
        }
        if let Some(name) = mixer.first_action_name() {
            info!("Playing animation '{name}'");
        }
        if let Some(action) = mixer.first_action_mut() {
            action.reset();
            action.fade_in(FADE_SECONDS);
            action.play();
        }
        self.playing = true;
        self.overlay_open = true;

        if let Some(player) = player {
            player.rewind();
            self.clip_delay.start(now, CLIP_START_DELAY);
        }
    }

    /// Stops everything, from whichever path got here: the stop button,
    /// the overlay closing, or the clip running out. The clip rewinds to
    /// the start so the next activation plays from zero.
    pub fn stop(&mut self, mixer: &mut Mixer, player: &mut Option<ClipPlayer>) {
        if let Some(action) = mixer.first_action_mut() {
            action.stop();
        }
        if self.playing {
            info!("Animation stopped");
        }
        self.playing = false;
        self.overlay_open = false;
        self.clip_delay.cancel();

        if let Some(player) = player {
            player.pause();
            player.rewind();
        }
    }

    /// Per-frame bookkeeping: fires the deferred clip start and advances
    /// clip playback, stopping the whole animation when the clip ends.
    pub fn update(
        &mut self,
        now: Instant,
        dt: f32,
        mixer: &mut Mixer,
        player: &mut Option<ClipPlayer>,
    ) {
        if self.clip_delay.poll(now) {
            if let Some(player) = player {
                player.play();
            }
        }

        let ended = match player {
            Some(player) => player.update(dt),
            None => false,
        };
        if ended && self.playing {
            self.stop(mixer, player);
        }
    }

    pub fn show(
        &mut self,
        ctx: &egui::Context,
        now: Instant,
        mixer: &mut Mixer,
        player: &mut Option<ClipPlayer>,
    ) {
        if !mixer.has_actions() {
            return;
        }

        egui::Area::new(egui::Id::new("animation_trigger"))
            .anchor(egui::Align2::CENTER_BOTTOM, egui::vec2(0.0, -24.0))
            .show(ctx, |ui| {
                let (label, color) = if self.playing {
                    ("⏹ Stop Animation", STOP_COLOR)
                } else {
                    ("▶ Play Animation", PLAY_COLOR)
                };
                let button = egui::Button::new(
                    egui::RichText::new(label)
                        .size(16.0)
                        .color(egui::Color32::WHITE),
                )
                .fill(color)
                .min_size(egui::vec2(180.0, 40.0));

                if ui.add(button).clicked() {
                    if self.playing {
                        self.stop(mixer, player);
                    } else {
                        self.activate(now, mixer, player);
                    }
                }
            });

        if self.overlay_open {
            self.show_clip_overlay(ctx, mixer, player);
        }
    }

    fn show_clip_overlay(
        &mut self,
        ctx: &egui::Context,
        mixer: &mut Mixer,
        player: &mut Option<ClipPlayer>,
    ) {
        let mut close_requested = false;

        let modal = egui::Modal::new(egui::Id::new("clip_overlay")).show(ctx, |ui| {
            ui.set_width(480.0);

            ui.horizontal(|ui| {
                ui.label(egui::RichText::new("🎬 Animation Preview").strong());
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("✕").clicked() {
                        close_requested = true;
                    }
                });
            });
            ui.separator();

            match player {
                Some(player) => {
                    let index = player.frame_index();
                    if self.texture_frame != Some(index) {
                        if let Some(image) = player.current_image().cloned() {
                            match &mut self.clip_texture {
                                Some(handle) => {
                                    handle.set(image, egui::TextureOptions::LINEAR);
                                }
                                None => {
                                    self.clip_texture = Some(ui.ctx().load_texture(
                                        "clip_frame",
                                        image,
                                        egui::TextureOptions::LINEAR,
                                    ));
                                }
                            }
                            self.texture_frame = Some(index);
                        }
                    }

                    if let Some(texture) = &self.clip_texture {
                        ui.vertical_centered(|ui| {
                            ui.add(egui::Image::new(texture).max_width(460.0));
                        });
                    }

                    ui.add(egui::ProgressBar::new(player.progress()));
                    ui.horizontal(|ui| {
                        if player.is_playing() {
                            if ui.button("⏸ Pause").clicked() {
                                player.pause();
                            }
                        } else if ui.button("▶ Resume").clicked() {
                            player.play();
                        }
                        ui.label(format!(
                            "{:.1}s / {:.1}s",
                            player.position(),
                            player.duration()
                        ));
                    });
                }
                None => {
                    ui.label("No animation clip loaded");
                }
            }
        });

        if close_requested || modal.should_close() {
            self.stop(mixer, player);
        }
    }
}

impl Default for AnimationControls {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{Channel, ChannelOutputs, Clip, Interpolation};
    use crate::model::{Model, Node};
    use crate::video::{ClipFrame, ClipFrames};
    use nalgebra_glm as glm;

    fn test_mixer() -> Mixer {
        let mut model = Model::default();
        model.nodes.push(Node {
            name: "root".to_string(),
            ..Default::default()
        });
        model.clips.push(Clip {
            name: "Take 001".to_string(),
            duration: 1.0,
            channels: vec![Channel {
                node: 0,
                interpolation: Interpolation::Linear,
                times: vec![0.0, 1.0],
                outputs: ChannelOutputs::Translations(vec![
                    glm::vec3(0.0, 0.0, 0.0),
                    glm::vec3(0.0, 2.0, 0.0),
                ]),
            }],
        });
        Mixer::from_model(&model)
    }

    fn test_player(duration: f32) -> ClipPlayer {
        let size = [2, 2];
        ClipPlayer::new(ClipFrames {
            size,
            frames: vec![ClipFrame {
                image: egui::ColorImage::from_rgba_unmultiplied(size, &[0u8; 16]),
                delay: duration,
            }],
            duration,
        })
    }

    #[test]
    fn activate_starts_the_action_and_defers_the_clip() {
        let t0 = Instant::now();
        let mut controls = AnimationControls::new();
        let mut mixer = test_mixer();
        let mut player = Some(test_player(5.0));

        controls.activate(t0, &mut mixer, &mut player);
        assert!(controls.is_playing());
        assert!(controls.is_overlay_open());
        assert!(mixer.any_running());
        assert!(!player.as_ref().unwrap().is_playing());

        controls.update(t0 + Duration::from_millis(150), 0.0, &mut mixer, &mut player);
        assert!(player.as_ref().unwrap().is_playing());
    }

    #[test]
    fn stop_rewinds_the_clip_and_halts_the_action() {
        let t0 = Instant::now();
        let mut controls = AnimationControls::new();
        let mut mixer = test_mixer();
        let mut player = Some(test_player(5.0));

        controls.activate(t0, &mut mixer, &mut player);
        controls.update(t0 + Duration::from_millis(150), 0.0, &mut mixer, &mut player);
        controls.update(t0 + Duration::from_millis(650), 0.5, &mut mixer, &mut player);
        assert!(player.as_ref().unwrap().position() > 0.0);

        controls.stop(&mut mixer, &mut player);
        assert!(!controls.is_playing());
        assert!(!controls.is_overlay_open());
        assert!(!mixer.any_running());
        let player = player.unwrap();
        assert!(!player.is_playing());
        assert!(player.position().abs() < 1e-6);
    }

    #[test]
    fn clip_running_out_stops_the_animation() {
        let t0 = Instant::now();
        let mut controls = AnimationControls::new();
        let mut mixer = test_mixer();
        let mut player = Some(test_player(0.3));

        controls.activate(t0, &mut mixer, &mut player);
        controls.update(t0 + Duration::from_millis(150), 0.0, &mut mixer, &mut player);
        controls.update(t0 + Duration::from_millis(650), 0.5, &mut mixer, &mut player);

        assert!(!controls.is_playing());
        assert!(!controls.is_overlay_open());
        assert!(!mixer.any_running());
        assert!(player.as_ref().unwrap().position().abs() < 1e-6);
    }

    #[test]
    fn works_without_a_clip_player() {
        let t0 = Instant::now();
        let mut controls = AnimationControls::new();
        let mut mixer = test_mixer();
        let mut player = None;

        controls.activate(t0, &mut mixer, &mut player);
        assert!(mixer.any_running());

        controls.update(t0 + Duration::from_secs(1), 0.5, &mut mixer, &mut player);
        assert!(controls.is_playing());

        controls.stop(&mut mixer, &mut player);
        assert!(!mixer.any_running());
    }

    #[test]
    fn reactivation_plays_from_the_start() {
        let t0 = Instant::now();
        let mut controls = AnimationControls::new();
        let mut mixer = test_mixer();
        let mut player = Some(test_player(0.3));

        controls.activate(t0, &mut mixer, &mut player);
        controls.update(t0 + Duration::from_millis(150), 0.0, &mut mixer, &mut player);
        controls.update(t0 + Duration::from_millis(650), 0.5, &mut mixer, &mut player);
        assert!(!controls.is_playing());

        let t1 = t0 + Duration::from_secs(2);
        controls.activate(t1, &mut mixer, &mut player);
        assert!(controls.is_playing());
        assert!(player.as_ref().unwrap().position().abs() < 1e-6);

        controls.update(t1 + Duration::from_millis(150), 0.0, &mut mixer, &mut player);
        assert!(player.as_ref().unwrap().is_playing());
    }
}
