use crate::model::Model;
use crate::settings::Settings;

/// Navigation help window with the camera reset button and a short model
/// summary. Returns true when the user asked for a camera reset.
pub fn show(ctx: &egui::Context, model: Option<&Model>, settings: &mut Settings) -> bool {
    let mut reset_camera = false;
    let mut show_help = settings.ui.show_help;

    egui::Window::new("🎮 Navigation Controls")
        .default_pos([16.0, 40.0])
        .default_width(240.0)
        .resizable(false)
        .open(&mut show_help)
        .show(ctx, |ui| {
            ui.label("🖱 Left drag: rotate");
            ui.label("🖱 Right drag: pan");
            ui.label("🖱 Scroll: zoom");
            ui.label("⌨ W / ↑ and S / ↓: forward, back");
            ui.label("⌨ A / ← and D / →: left, right");
            ui.label("⌨ Q and E: up, down");

            ui.separator();
            if ui.button("🎯 Reset Camera").clicked() {
                reset_camera = true;
            }

            if let Some(model) = model {
                ui.separator();
                ui.label(egui::RichText::new(&model.name).strong());
                ui.label(format!("Vertices: {}", model.vertex_count()));
                ui.label(format!("Triangles: {}", model.triangle_count()));
                let clips: Vec<&str> = model.clip_names().collect();
                if !clips.is_empty() {
                    ui.label(format!("Animations: {}", clips.join(", ")));
                }
            }
        });

    if show_help != settings.ui.show_help {
        settings.ui.show_help = show_help;
        settings.ui.save();
    }

    reset_camera
}
