//! egui adapter: draws the JSON text panel and the object table, and turns
//! widget interaction into editor [`Command`]s. It never touches the scene.

use crate::app::{Command, CommandOutcome, Editor};
use crate::form::{format_number, FieldInput, Form, FormRow};
use crate::scene::Direction;

const NUMBER_FIELD_WIDTH: f32 = 64.0;

pub fn shape_icon(shape: &str) -> &'static str {
    match shape {
        "cuboid" => "◼",
        "sphere" => "●",
        "triangle" => "△",
        "plane" => "▭",
        "quadratic equation" => "QE",
        "four-order equation" => "FE",
        _ => "◆",
    }
}

pub struct EditorUi {
    json_buffer: String,
    form: Form,
    commands: Vec<Command>,
}

impl EditorUi {
    pub fn new(editor: &Editor) -> Self {
        Self {
            json_buffer: editor.text().to_string(),
            form: editor.form().clone(),
            commands: Vec::new(),
        }
    }

    pub fn json_buffer(&self) -> &str {
        &self.json_buffer
    }

    pub fn form(&self) -> &Form {
        &self.form
    }

    pub fn take_commands(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.commands)
    }

    /// Refreshes the widgets after a dispatched command. Value edits keep the
    /// form the user typed into; a failed load keeps the rejected text visible.
    pub fn sync(&mut self, editor: &Editor, outcome: CommandOutcome) {
        match outcome {
            CommandOutcome::Regenerate => {
                self.form = editor.form().clone();
                self.json_buffer = editor.text().to_string();
            }
            CommandOutcome::Rerender => self.json_buffer = editor.text().to_string(),
            CommandOutcome::Unchanged => {}
        }
    }

    pub fn show(&mut self, ctx: &egui::Context, editor: &Editor) {
        egui::SidePanel::left("scene_json")
            .resizable(true)
            .default_width(340.0)
            .show(ctx, |ui| self.show_json_panel(ui, editor));

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| self.show_object_table(ui, editor.selection()));
        });
    }

    fn show_json_panel(&mut self, ui: &mut egui::Ui, editor: &Editor) {
        ui.heading("Scene JSON");
        ui.add(
            egui::TextEdit::multiline(&mut self.json_buffer)
                .code_editor()
                .desired_rows(24)
                .desired_width(f32::INFINITY),
        );
        ui.horizontal(|ui| {
            if ui.button("Confirm").clicked() {
                self.commands.push(Command::LoadText(self.json_buffer.clone()));
            }
            if ui.button("Reset").clicked() {
                self.commands.push(Command::Reset);
            }
        });

        ui.separator();
        let stats = editor.stats();
        egui::Grid::new("scene_stats").num_columns(2).show(ui, |ui| {
            for (label, count) in [
                ("Cuboids", stats.cuboids),
                ("Spheres", stats.spheres),
                ("Total", stats.total()),
                ("Lights", stats.lights),
            ] {
                ui.label(label);
                ui.label(count.to_string());
                ui.end_row();
            }
        });

        ui.separator();
        ui.strong("Materials");
        egui::Grid::new("scene_materials")
            .striped(true)
            .num_columns(6)
            .show(ui, |ui| {
                for header in ["ID", "Diffuse", "Reflect", "Refract", "Index", "Light"] {
                    ui.label(header);
                }
                ui.end_row();
                for material in editor.scene().materials() {
                    ui.label(material.id());
                    for value in [
                        material.diffuse_loss(),
                        material.reflect_loss(),
                        material.refract_loss(),
                        material.refractivity(),
                    ] {
                        ui.label(value.map(format_number).unwrap_or_else(|| "-".to_string()));
                    }
                    ui.label(if material.radiates() { "yes" } else { "" });
                    ui.end_row();
                }
            });
    }

    fn show_object_table(&mut self, ui: &mut egui::Ui, selection: Option<usize>) {
        let Form {
            shape_options,
            rows,
        } = &mut self.form;
        let commands = &mut self.commands;
        let row_count = rows.len();

        egui::Grid::new("objects_table")
            .striped(true)
            .num_columns(6)
            .show(ui, |ui| {
                for header in ["", "ID", "Shape", "Geometry Parameters", "Material ID", ""] {
                    ui.strong(header);
                }
                ui.end_row();

                for row in rows.iter_mut() {
                    let index = row.index;
                    let selected = selection == Some(index);
                    if ui
                        .selectable_label(selected, format!("{} {}", shape_icon(&row.shape), index))
                        .clicked()
                    {
                        commands.push(Command::Select(if selected { None } else { Some(index) }));
                    }

                    ui.add(egui::TextEdit::singleline(&mut row.id).desired_width(110.0));

                    let mut shape = row.shape.clone();
                    egui::ComboBox::from_id_salt(("object_shape", index))
                        .selected_text(shape.as_str())
                        .show_ui(ui, |ui| {
                            for option in shape_options.iter() {
                                ui.selectable_value(&mut shape, option.clone(), option.as_str());
                            }
                        });
                    if shape != row.shape {
                        commands.push(Command::ChangeShape { index, shape });
                    }

                    ui.vertical(|ui| show_param_fields(ui, row));

                    ui.add(egui::TextEdit::singleline(&mut row.material_id).desired_width(90.0));

                    ui.horizontal(|ui| {
                        if ui.add_enabled(index > 0, egui::Button::new("↑")).clicked() {
                            commands.push(Command::Move {
                                index,
                                direction: Direction::Up,
                            });
                        }
                        if ui
                            .add_enabled(index + 1 < row_count, egui::Button::new("↓"))
                            .clicked()
                        {
                            commands.push(Command::Move {
                                index,
                                direction: Direction::Down,
                            });
                        }
                        if ui.button("✕").clicked() {
                            commands.push(Command::Delete { index });
                        }
                    });
                    ui.end_row();
                }
            });

        ui.add_space(8.0);
        if ui.button("Update All Objects").clicked() {
            self.commands.push(Command::ApplyForm(self.form.clone()));
        }
    }
}

fn show_param_fields(ui: &mut egui::Ui, row: &mut FormRow) {
    for field in &mut row.params {
        ui.horizontal(|ui| {
            ui.label(format!("{}:", field.name));
            match &mut field.input {
                FieldInput::Number(text) => {
                    ui.add(egui::TextEdit::singleline(text).desired_width(NUMBER_FIELD_WIDTH));
                }
                FieldInput::Vector(axes) => {
                    for axis in axes.iter_mut() {
                        ui.add(egui::TextEdit::singleline(axis).desired_width(NUMBER_FIELD_WIDTH));
                    }
                }
                FieldInput::Text(text) => {
                    ui.add(
                        egui::TextEdit::multiline(text)
                            .code_editor()
                            .desired_rows(3)
                            .desired_width(220.0),
                    );
                }
            }
        });
    }
}
