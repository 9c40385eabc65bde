use egui::Context;

use crate::controller::KeyBindings;
use crate::model::{Mesh, ViewState};

/// Values shown in the overlay for one frame
pub struct OverlayStats<'a> {
    pub fps: f32,
    pub view: &'a ViewState,
    pub mesh: &'a Mesh,
    pub mesh_name: &'a str,
    pub wireframe_mode: bool,
    pub wireframe_available: bool,
}

pub fn build_ui(ctx: &Context, stats: &OverlayStats, bindings: &KeyBindings) {
    egui::Window::new("Viewer")
        .default_pos([8.0, 8.0])
        .default_size([160.0, 120.0])
        .show(ctx, |ui| {
            ui.label(egui::RichText::new(format!("FPS: {:.0}", stats.fps)).small());
            ui.label(egui::RichText::new(stats.mesh_name).small());
            ui.label(
                egui::RichText::new(format!(
                    "{} vertices, {} triangles",
                    stats.mesh.vertex_count(),
                    stats.mesh.triangle_count()
                ))
                .small(),
            );
            ui.label(egui::RichText::new(format!("Distance: {:.2}", stats.view.camera_distance)).small());
            ui.label(
                egui::RichText::new(format!(
                    "Y: {:.1}° Z: {:.1}°",
                    stats.view.angle_y.to_degrees(),
                    stats.view.angle_z.to_degrees()
                ))
                .small(),
            );
            if stats.wireframe_available {
                let mode = if stats.wireframe_mode { "wireframe" } else { "solid" };
                ui.label(egui::RichText::new(format!("Mode: {mode}")).small());
            }

            ui.separator();
            ui.label(egui::RichText::new("Controls:").small());
            for line in controls_help(bindings, stats.wireframe_available) {
                ui.label(egui::RichText::new(line).small());
            }
        });
}

fn controls_help(b: &KeyBindings, wireframe_available: bool) -> Vec<String> {
    let mut lines = vec![
        format!("{:?}/{:?} - Rotate about Y", b.rotate_left, b.rotate_right),
        format!("{:?}/{:?} - Rotate about Z", b.rotate_up, b.rotate_down),
        format!("{:?}/{:?} - Zoom in/out", b.zoom_in, b.zoom_out),
        format!("{:?} - Quit", b.quit),
    ];
    if wireframe_available {
        lines.push(format!("{:?} - Toggle wireframe", b.toggle_wireframe));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_controls_help_lists_bindings() {
        let lines = controls_help(&KeyBindings::default(), false);
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "KeyA/KeyD - Rotate about Y");
        assert_eq!(lines[2], "KeyQ/KeyE - Zoom in/out");
        assert_eq!(controls_help(&KeyBindings::default(), true).len(), 5);
    }
}
