pub mod egui_host;

use crate::form::{self, Form};
use crate::render::{build_draw_list, DrawRequest, LogRenderer, SceneRenderer, Viewpoint};
use crate::scene::serialization::{self, ParseError};
use crate::scene::{Direction, Scene, SceneStats, DEFAULT_SCENE_JSON};
use crate::schema::ShapeSchema;
use crate::ui::EditorUi;
use egui_host::EguiHost;
use std::path::PathBuf;

/// User-triggered edits, decoupled from whichever widgets produced them.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    LoadText(String),
    Reset,
    ApplyForm(Form),
    ChangeShape { index: usize, shape: String },
    Move { index: usize, direction: Direction },
    Delete { index: usize },
    Select(Option<usize>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Unchanged,
    /// Values changed; only the draw list is rebuilt.
    Rerender,
    /// Structure changed; the form is regenerated as well.
    Regenerate,
}

#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error("JSON parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("JSON serialize error: {0}")]
    Serialize(#[source] ParseError),
}

/// Blocking notifications the UI layer shows on the editor's behalf.
pub trait Prompt {
    fn alert(&mut self, message: &str);
    fn confirm(&mut self, message: &str) -> bool;
}

/// Prompt for unattended runs: alerts go to the log, confirmations are declined.
#[derive(Debug, Default)]
pub struct LogPrompt;

impl Prompt for LogPrompt {
    fn alert(&mut self, message: &str) {
        log::warn!("{}", message);
    }

    fn confirm(&mut self, message: &str) -> bool {
        log::info!("{} (declined)", message);
        false
    }
}

#[derive(Debug, Clone)]
pub struct EditorConfig {
    pub schema_path: PathBuf,
    pub scene_path: Option<PathBuf>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            schema_path: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets/shapes.json"),
            scene_path: None,
        }
    }
}

impl EditorConfig {
    /// The first argument, when present, names a scene file to open.
    pub fn from_args(mut args: impl Iterator<Item = String>) -> Self {
        Self {
            scene_path: args.next().map(PathBuf::from),
            ..Self::default()
        }
    }
}

/// Owns the document and everything derived from it.
pub struct Editor {
    schema: ShapeSchema,
    scene: Scene,
    text: String,
    selection: Option<usize>,
    form: Form,
    draw_list: Vec<DrawRequest>,
}

impl Editor {
    pub fn new(schema: ShapeSchema) -> Self {
        let scene = Scene::new();
        let text = String::new();
        let form = form::generate(&scene, &schema);
        Self {
            schema,
            scene,
            text,
            selection: None,
            form,
            draw_list: Vec::new(),
        }
    }

    pub fn schema(&self) -> &ShapeSchema {
        &self.schema
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn selection(&self) -> Option<usize> {
        self.selection
    }

    pub fn form(&self) -> &Form {
        &self.form
    }

    pub fn draw_list(&self) -> &[DrawRequest] {
        &self.draw_list
    }

    pub fn viewpoint(&self) -> Viewpoint {
        Viewpoint::from_scene(&self.scene)
    }

    pub fn stats(&self) -> SceneStats {
        self.scene.stats()
    }

    /// Applies `command`, reporting any failure once through `prompt`.
    pub fn dispatch(&mut self, command: Command, prompt: &mut dyn Prompt) -> CommandOutcome {
        match self.apply(command, prompt) {
            Ok(outcome) => outcome,
            Err(err) => {
                log::error!("{}", err);
                prompt.alert(&err.to_string());
                CommandOutcome::Unchanged
            }
        }
    }

    /// A rejected load modifies nothing.
    pub fn apply(
        &mut self,
        command: Command,
        prompt: &mut dyn Prompt,
    ) -> Result<CommandOutcome, EditorError> {
        let outcome = match command {
            Command::LoadText(text) => {
                self.scene = serialization::parse(&text)?;
                self.text = text;
                if self
                    .selection
                    .is_some_and(|index| index >= self.scene.objects().len())
                {
                    self.selection = None;
                }
                log::info!("Loaded scene with {} objects", self.scene.objects().len());
                CommandOutcome::Regenerate
            }
            Command::Reset => {
                self.scene = serialization::parse(DEFAULT_SCENE_JSON)?;
                self.text = DEFAULT_SCENE_JSON.to_string();
                self.selection = None;
                log::info!("Scene reset to defaults");
                CommandOutcome::Regenerate
            }
            Command::ApplyForm(form) => {
                let reshaped = form::extract(&form, &mut self.scene);
                self.sync_text()?;
                if reshaped.is_empty() {
                    self.form = form;
                    CommandOutcome::Rerender
                } else {
                    log::debug!("Shapes changed for objects {:?}", reshaped);
                    CommandOutcome::Regenerate
                }
            }
            Command::ChangeShape { index, shape } => match self.scene.object_mut(index) {
                Some(object) if object.shape() != shape => {
                    log::debug!("Object {} shape '{}' -> '{}'", index, object.shape(), shape);
                    object.set_shape(&shape);
                    self.sync_text()?;
                    CommandOutcome::Regenerate
                }
                _ => CommandOutcome::Unchanged,
            },
            Command::Move { index, direction } => match self.scene.move_object(index, direction) {
                Some(target) => {
                    if self
                        .selection
                        .is_some_and(|selected| selected == index || selected == target)
                    {
                        self.selection = None;
                    }
                    self.sync_text()?;
                    CommandOutcome::Regenerate
                }
                None => CommandOutcome::Unchanged,
            },
            Command::Delete { index } => {
                let Some(object) = self.scene.objects().get(index) else {
                    return Ok(CommandOutcome::Unchanged);
                };
                let message = format!("Are you sure you want to delete object \"{}\"?", object.id());
                if !prompt.confirm(&message) {
                    return Ok(CommandOutcome::Unchanged);
                }
                if let Some(removed) = self.scene.remove_object(index) {
                    log::info!("Deleted object '{}'", removed.id());
                }
                self.selection = match self.selection {
                    Some(selected) if selected == index => None,
                    Some(selected) if selected > index => Some(selected - 1),
                    other => other,
                };
                self.sync_text()?;
                CommandOutcome::Regenerate
            }
            Command::Select(selection) => {
                if selection.is_some_and(|index| index >= self.scene.objects().len())
                    || selection == self.selection
                {
                    return Ok(CommandOutcome::Unchanged);
                }
                self.selection = selection;
                CommandOutcome::Rerender
            }
        };

        match outcome {
            CommandOutcome::Regenerate => {
                self.form = form::generate(&self.scene, &self.schema);
                self.rebuild_draw_list();
            }
            CommandOutcome::Rerender => self.rebuild_draw_list(),
            CommandOutcome::Unchanged => {}
        }
        Ok(outcome)
    }

    fn sync_text(&mut self) -> Result<(), EditorError> {
        self.text = serialization::serialize(&self.scene).map_err(EditorError::Serialize)?;
        Ok(())
    }

    fn rebuild_draw_list(&mut self) {
        self.draw_list = build_draw_list(&self.scene, self.selection);
    }
}

pub fn run() {
    run_with_config(EditorConfig::from_args(std::env::args().skip(1)));
}

pub fn run_with_config(config: EditorConfig) {
    log::info!("🚀 scenedit - headless scene editor");

    let schema = ShapeSchema::load(&config.schema_path);
    let mut editor = Editor::new(schema);
    let mut prompt = LogPrompt;

    editor.dispatch(Command::Reset, &mut prompt);
    if let Some(path) = &config.scene_path {
        match std::fs::read_to_string(path) {
            Ok(text) => {
                editor.dispatch(Command::LoadText(text), &mut prompt);
            }
            Err(err) => log::warn!("Failed to read scene {}: {}", path.display(), err),
        }
    }

    let mut renderer = LogRenderer::new();
    renderer.draw(&editor.viewpoint(), editor.draw_list());

    let stats = editor.stats();
    log::info!(
        "Cuboids: {}, spheres: {}, total: {}, lights: {}",
        stats.cuboids,
        stats.spheres,
        stats.total(),
        stats.lights
    );

    let mut host = EguiHost::new();
    let mut ui = EditorUi::new(&editor);
    let frame = host.run_ui(egui::RawInput::default(), |ctx| ui.show(ctx, &editor));
    log::info!(
        "Editor panels laid out: {} rows, {} primitives",
        editor.form().rows.len(),
        frame.clipped_primitives.len()
    );
    for command in ui.take_commands() {
        editor.dispatch(command, &mut prompt);
    }

    println!("{}", editor.text());
    log::info!("👋 Goodbye!");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::FieldInput;
    use crate::scene::SceneObject;

    const BUNDLED: &str = include_str!("../../assets/shapes.json");

    #[derive(Default)]
    struct RecordingPrompt {
        alerts: Vec<String>,
        confirms: Vec<String>,
        answer: bool,
    }

    impl Prompt for RecordingPrompt {
        fn alert(&mut self, message: &str) {
            self.alerts.push(message.to_string());
        }

        fn confirm(&mut self, message: &str) -> bool {
            self.confirms.push(message.to_string());
            self.answer
        }
    }

    fn editor() -> (Editor, RecordingPrompt) {
        let mut editor = Editor::new(ShapeSchema::from_json(BUNDLED).unwrap());
        let mut prompt = RecordingPrompt::default();
        assert_eq!(
            editor.dispatch(Command::Reset, &mut prompt),
            CommandOutcome::Regenerate
        );
        (editor, prompt)
    }

    fn ids(editor: &Editor) -> Vec<String> {
        editor.scene().objects().iter().map(SceneObject::id).collect()
    }

    #[test]
    fn reset_populates_form_and_draw_list() {
        let (editor, prompt) = editor();
        assert_eq!(editor.form().rows.len(), 5);
        assert_eq!(editor.form().shape_options.len(), 6);
        assert_eq!(editor.draw_list().len(), 5);
        assert_eq!(editor.selection(), None);
        assert_eq!(editor.text(), DEFAULT_SCENE_JSON);
        assert!(prompt.alerts.is_empty());
    }

    #[test]
    fn malformed_text_is_reported_once_and_changes_nothing() {
        let (mut editor, mut prompt) = editor();
        editor.dispatch(Command::Select(Some(4)), &mut prompt);
        let scene = editor.scene().clone();
        let text = editor.text().to_string();
        let draw_list = editor.draw_list().to_vec();

        let outcome = editor.dispatch(Command::LoadText("{not json".to_string()), &mut prompt);

        assert_eq!(outcome, CommandOutcome::Unchanged);
        assert_eq!(prompt.alerts.len(), 1);
        assert!(prompt.alerts[0].starts_with("JSON parse error"));
        assert_eq!(editor.scene(), &scene);
        assert_eq!(editor.text(), text);
        assert_eq!(editor.draw_list(), draw_list.as_slice());
        assert_eq!(editor.selection(), Some(4));
    }

    #[test]
    fn load_text_replaces_scene_and_clamps_selection() {
        let (mut editor, mut prompt) = editor();
        editor.dispatch(Command::Select(Some(3)), &mut prompt);
        let text = r#"{"materials": [], "objects": [{"id": "only", "shape": "sphere", "r": 5}]}"#;

        let outcome = editor.dispatch(Command::LoadText(text.to_string()), &mut prompt);

        assert_eq!(outcome, CommandOutcome::Regenerate);
        assert_eq!(ids(&editor), ["only"]);
        assert_eq!(editor.text(), text);
        assert_eq!(editor.selection(), None);
        assert_eq!(editor.form().rows.len(), 1);
    }

    #[test]
    fn value_edit_rerenders_without_regenerating() {
        let (mut editor, mut prompt) = editor();
        let mut form = editor.form().clone();
        *form.rows[4].param_mut("r").unwrap() = FieldInput::Number("250".to_string());
        form.rows[4].id = "sun".to_string();

        let outcome = editor.dispatch(Command::ApplyForm(form.clone()), &mut prompt);

        assert_eq!(outcome, CommandOutcome::Rerender);
        assert_eq!(editor.form(), &form);
        let sun = &editor.scene().objects()[4];
        assert_eq!(sun.id(), "sun");
        assert_eq!(sun.number_param("r"), Some(250.0));
        assert!(editor.text().contains("\"r\": 250"));
        assert_eq!(
            serialization::parse(editor.text()).unwrap(),
            editor.scene().clone()
        );
        assert_eq!(
            editor.draw_list()[4].geometry,
            crate::render::Geometry::Sphere { radius: 250.0 }
        );
    }

    #[test]
    fn untouched_form_keeps_user_document() {
        let (mut editor, mut prompt) = editor();
        let text = r#"{"objects": [
            {"material_id": "Glass", "shape": "sphere", "id": 7, "r": 400.0, "position": [1.0, 2.0, 3.0]},
            {"id": "b", "shape": "cuboid", "size": [1.5, 2, 3], "position": [0, 0, 0]}
        ], "materials": [{"id": "Glass", "color": [0.5, 0.5, 1.0]}]}"#;
        editor.dispatch(Command::LoadText(text.to_string()), &mut prompt);
        let scene = editor.scene().clone();

        let form = editor.form().clone();
        assert_eq!(form.rows[0].id, "7");
        let outcome = editor.dispatch(Command::ApplyForm(form), &mut prompt);

        assert_eq!(outcome, CommandOutcome::Rerender);
        assert_eq!(editor.scene(), &scene);
        let as_value: serde_json::Value = serde_json::from_str(text).unwrap();
        assert_eq!(editor.text(), serde_json::to_string_pretty(&as_value).unwrap());
        assert!(prompt.alerts.is_empty());
    }

    #[test]
    fn shape_edit_through_form_regenerates() {
        let (mut editor, mut prompt) = editor();
        let mut form = editor.form().clone();
        form.rows[4].shape = "triangle".to_string();

        let outcome = editor.dispatch(Command::ApplyForm(form), &mut prompt);

        assert_eq!(outcome, CommandOutcome::Regenerate);
        let row = &editor.form().rows[4];
        assert_eq!(row.shape, "triangle");
        let names: Vec<&str> = row.params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["p1", "p2", "p3"]);
    }

    #[test]
    fn change_shape_keeps_previous_params() {
        let (mut editor, mut prompt) = editor();
        let outcome = editor.dispatch(
            Command::ChangeShape {
                index: 0,
                shape: "sphere".to_string(),
            },
            &mut prompt,
        );
        assert_eq!(outcome, CommandOutcome::Regenerate);
        let object = &editor.scene().objects()[0];
        assert_eq!(object.shape(), "sphere");
        assert!(object.param("size").is_some());
        assert_eq!(editor.form().rows[0].params.len(), 2);

        let same = Command::ChangeShape {
            index: 0,
            shape: "sphere".to_string(),
        };
        assert_eq!(editor.dispatch(same, &mut prompt), CommandOutcome::Unchanged);
        let missing = Command::ChangeShape {
            index: 9,
            shape: "sphere".to_string(),
        };
        assert_eq!(editor.dispatch(missing, &mut prompt), CommandOutcome::Unchanged);
    }

    #[test]
    fn move_round_trip_and_bounds() {
        let (mut editor, mut prompt) = editor();
        let original = ids(&editor);

        let down = Command::Move {
            index: 1,
            direction: Direction::Down,
        };
        assert_eq!(editor.dispatch(down, &mut prompt), CommandOutcome::Regenerate);
        assert_eq!(ids(&editor)[2], "glass_panel1");
        assert_eq!(editor.form().rows[2].id, "glass_panel1");

        let up = Command::Move {
            index: 2,
            direction: Direction::Up,
        };
        editor.dispatch(up, &mut prompt);
        assert_eq!(ids(&editor), original);

        let first_up = Command::Move {
            index: 0,
            direction: Direction::Up,
        };
        let last_down = Command::Move {
            index: 4,
            direction: Direction::Down,
        };
        assert_eq!(editor.dispatch(first_up, &mut prompt), CommandOutcome::Unchanged);
        assert_eq!(editor.dispatch(last_down, &mut prompt), CommandOutcome::Unchanged);
        assert_eq!(ids(&editor), original);
    }

    #[test]
    fn move_clears_selection_of_swapped_object() {
        let (mut editor, mut prompt) = editor();
        editor.dispatch(Command::Select(Some(1)), &mut prompt);
        editor.dispatch(
            Command::Move {
                index: 3,
                direction: Direction::Up,
            },
            &mut prompt,
        );
        assert_eq!(editor.selection(), Some(1));
        editor.dispatch(
            Command::Move {
                index: 0,
                direction: Direction::Down,
            },
            &mut prompt,
        );
        assert_eq!(editor.selection(), None);
    }

    #[test]
    fn delete_requires_confirmation() {
        let (mut editor, mut prompt) = editor();
        let outcome = editor.dispatch(Command::Delete { index: 2 }, &mut prompt);
        assert_eq!(outcome, CommandOutcome::Unchanged);
        assert_eq!(
            prompt.confirms,
            ["Are you sure you want to delete object \"glass_panel2\"?"]
        );
        assert_eq!(editor.scene().objects().len(), 5);

        prompt.answer = true;
        let outcome = editor.dispatch(Command::Delete { index: 2 }, &mut prompt);
        assert_eq!(outcome, CommandOutcome::Regenerate);
        assert_eq!(
            ids(&editor),
            ["box1", "glass_panel1", "glass_panel3", "light_source"]
        );
        assert_eq!(editor.form().rows.len(), 4);
        assert_eq!(editor.form().rows[2].index, 2);
        assert!(!editor.text().contains("glass_panel2"));

        let outcome = editor.dispatch(Command::Delete { index: 10 }, &mut prompt);
        assert_eq!(outcome, CommandOutcome::Unchanged);
        assert_eq!(prompt.confirms.len(), 2);
    }

    #[test]
    fn delete_adjusts_selection() {
        let (mut editor, mut prompt) = editor();
        prompt.answer = true;
        editor.dispatch(Command::Select(Some(4)), &mut prompt);
        editor.dispatch(Command::Delete { index: 1 }, &mut prompt);
        assert_eq!(editor.selection(), Some(3));
        assert!(editor.draw_list()[3].highlighted);

        editor.dispatch(Command::Delete { index: 3 }, &mut prompt);
        assert_eq!(editor.selection(), None);
    }

    #[test]
    fn select_highlights_without_mutating_scene() {
        let (mut editor, mut prompt) = editor();
        let text = editor.text().to_string();

        assert_eq!(
            editor.dispatch(Command::Select(Some(0)), &mut prompt),
            CommandOutcome::Rerender
        );
        assert!(editor.draw_list()[0].highlighted);
        assert_eq!(editor.text(), text);

        assert_eq!(
            editor.dispatch(Command::Select(Some(42)), &mut prompt),
            CommandOutcome::Unchanged
        );
        assert_eq!(editor.selection(), Some(0));

        editor.dispatch(Command::Select(None), &mut prompt);
        assert!(editor.draw_list().iter().all(|request| !request.highlighted));
    }

    #[test]
    fn empty_schema_keeps_identity_editing() {
        let mut editor = Editor::new(ShapeSchema::empty());
        let mut prompt = RecordingPrompt::default();
        editor.dispatch(Command::Reset, &mut prompt);

        let mut form = editor.form().clone();
        assert!(form.rows.iter().all(|row| row.params.is_empty()));
        form.rows[0].material_id = "Metal".to_string();
        editor.dispatch(Command::ApplyForm(form), &mut prompt);

        let object = &editor.scene().objects()[0];
        assert_eq!(object.material_id(), Some("Metal"));
        assert!(object.param("size").is_some());
        assert_eq!(editor.draw_list()[0].appearance.color, 0xffff00);
    }

    #[test]
    fn config_reads_scene_path_argument() {
        let config = EditorConfig::from_args(vec!["scene.json".to_string()].into_iter());
        assert_eq!(config.scene_path, Some(PathBuf::from("scene.json")));
        assert!(config.schema_path.ends_with("assets/shapes.json"));
        assert!(EditorConfig::from_args(std::iter::empty()).scene_path.is_none());
    }
}
