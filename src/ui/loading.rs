use crate::timer::Delay;
use std::time::{Duration, Instant};

/// Grace period between the model arriving and the overlay going away,
/// long enough for the first posed frame to hit the screen.
const HIDE_GRACE: Duration = Duration::from_millis(500);

/// Full-window "Loading 3D Model..." overlay. Visible from startup (or a
/// new load) until shortly after the model arrives. A failed load leaves
/// it up, the error itself goes to the log.
pub struct LoadingOverlay {
    visible: bool,
    hide_delay: Delay,
}

impl LoadingOverlay {
    pub fn new() -> Self {
        Self {
            visible: true,
            hide_delay: Delay::default(),
        }
    }

    /// Puts the overlay back up for a fresh load.
    pub fn arm(&mut self) {
        self.visible = true;
        self.hide_delay.cancel();
    }

    /// The model arrived. Keeps the overlay up for the grace period.
    pub fn finish(&mut self, now: Instant) {
        if self.visible && !self.hide_delay.is_pending() {
            self.hide_delay.start(now, HIDE_GRACE);
        }
    }

    pub fn update(&mut self, now: Instant) {
        if self.hide_delay.poll(now) {
            self.visible = false;
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn show(&self, ctx: &egui::Context) {
        if !self.visible {
            return;
        }

        // Dim the whole scene behind the message
        let screen = ctx.screen_rect();
        let painter = ctx.layer_painter(egui::LayerId::new(
            egui::Order::Background,
            egui::Id::new("loading_backdrop"),
        ));
        painter.rect_filled(
            screen,
            0.0,
            egui::Color32::from_rgba_premultiplied(0, 0, 0, 160),
        );

        egui::Area::new(egui::Id::new("loading_overlay"))
            .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .show(ctx, |ui| {
                ui.vertical_centered(|ui| {
                    ui.add(egui::Spinner::new().size(48.0));
                    ui.add_space(12.0);
                    ui.label(
                        egui::RichText::new("Loading 3D Model...")
                            .size(22.0)
                            .strong()
                            .color(egui::Color32::WHITE),
                    );
                    ui.label(
                        egui::RichText::new("Please wait while we render the scene")
                            .color(egui::Color32::from_gray(180)),
                    );
                });
            });
    }
}

impl Default for LoadingOverlay {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stays_visible_through_the_grace_period() {
        let start = Instant::now();
        let mut overlay = LoadingOverlay::new();
        assert!(overlay.is_visible());

        overlay.finish(start);
        overlay.update(start + Duration::from_millis(100));
        assert!(overlay.is_visible());

        overlay.update(start + Duration::from_millis(600));
        assert!(!overlay.is_visible());
    }

    #[test]
    fn failed_load_keeps_the_overlay_up() {
        let start = Instant::now();
        let mut overlay = LoadingOverlay::new();

        // No finish() call ever arrives
        overlay.update(start + Duration::from_secs(10));
        assert!(overlay.is_visible());
    }

    #[test]
    fn rearming_restarts_the_cycle() {
        let start = Instant::now();
        let mut overlay = LoadingOverlay::new();

        overlay.finish(start);
        overlay.update(start + Duration::from_secs(1));
        assert!(!overlay.is_visible());

        overlay.arm();
        assert!(overlay.is_visible());
        overlay.update(start + Duration::from_secs(2));
        assert!(overlay.is_visible());

        overlay.finish(start + Duration::from_secs(2));
        overlay.update(start + Duration::from_millis(2600));
        assert!(!overlay.is_visible());
    }
}
