/// Tessellated result of one egui frame, ready for whatever backend paints it.
pub struct EguiFrameOutput {
    pub clipped_primitives: Vec<egui::ClippedPrimitive>,
    pub textures_delta: egui::TexturesDelta,
    pub pixels_per_point: f32,
    pub wants_pointer_input: bool,
    pub wants_keyboard_input: bool,
}

/// Runs egui frames from caller-supplied input; no window or GPU is attached.
pub struct EguiHost {
    context: egui::Context,
}

impl Default for EguiHost {
    fn default() -> Self {
        Self::new()
    }
}

impl EguiHost {
    pub fn new() -> Self {
        Self {
            context: egui::Context::default(),
        }
    }

    pub fn run_ui<F>(&mut self, raw_input: egui::RawInput, run_ui: F) -> EguiFrameOutput
    where
        F: FnMut(&egui::Context),
    {
        let full_output = self.context.run(raw_input, run_ui);
        let pixels_per_point = full_output.pixels_per_point;
        let clipped_primitives = self
            .context
            .tessellate(full_output.shapes, pixels_per_point);

        EguiFrameOutput {
            clipped_primitives,
            textures_delta: full_output.textures_delta,
            pixels_per_point,
            wants_pointer_input: self.context.wants_pointer_input(),
            wants_keyboard_input: self.context.wants_keyboard_input(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_produces_primitives_for_visible_widgets() {
        let mut host = EguiHost::new();
        let output = host.run_ui(egui::RawInput::default(), |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| {
                ui.label("hello");
            });
        });
        assert!(!output.clipped_primitives.is_empty());
        assert!(output.pixels_per_point > 0.0);
        assert!(!output.wants_keyboard_input);
    }
}
