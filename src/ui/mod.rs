mod animation_controls;
mod help_panel;
mod loading;

pub use animation_controls::AnimationControls;
pub use loading::LoadingOverlay;

use crate::animation::Mixer;
use crate::model::Model;
use crate::settings::Settings;
use crate::video::ClipPlayer;
use std::time::Instant;

/// What the user asked for this frame.
#[derive(Debug, Default)]
pub struct UiActions {
    pub reset_camera: bool,
    pub open_model: bool,
}

pub struct Ui {
    pub loading: LoadingOverlay,
    pub controls: AnimationControls,
}

impl Ui {
    pub fn new() -> Self {
        Self {
            loading: LoadingOverlay::new(),
            controls: AnimationControls::new(),
        }
    }

    /// Per-frame state upkeep. Runs before drawing so timers that fire
    /// this frame are already reflected in what gets drawn.
    pub fn update(
        &mut self,
        now: Instant,
        dt: f32,
        mixer: &mut Option<Mixer>,
        player: &mut Option<ClipPlayer>,
    ) {
        self.loading.update(now);
        if let Some(mixer) = mixer {
            self.controls.update(now, dt, mixer, player);
        }
    }

    pub fn show(
        &mut self,
        ctx: &egui::Context,
        now: Instant,
        model: Option<&Model>,
        mixer: &mut Option<Mixer>,
        player: &mut Option<ClipPlayer>,
        settings: &mut Settings,
    ) -> UiActions {
        let mut actions = UiActions::default();

        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            ui.horizontal_wrapped(|ui| {
                if ui.button("📁 Open Model").clicked() {
                    actions.open_model = true;
                }

                ui.separator();

                if ui
                    .button(if settings.ui.show_help {
                        "✅ Controls"
                    } else {
                        "⬜ Controls"
                    })
                    .clicked()
                {
                    settings.ui.show_help = !settings.ui.show_help;
                    settings.ui.save();
                }
            });
        });

        if !self.loading.is_visible() && help_panel::show(ctx, model, settings) {
            actions.reset_camera = true;
        }

        if let Some(mixer) = mixer {
            self.controls.show(ctx, now, mixer, player);
        }

        // Drawn last so it covers everything while a load is in flight
        self.loading.show(ctx);

        actions
    }
}

impl Default for Ui {
    fn default() -> Self {
        Self::new()
    }
}
