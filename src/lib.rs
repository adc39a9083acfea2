//! scenedit - schema-driven scene document editor.
//!
//! A scene is a JSON document of materials, objects and cameras. The editor
//! keeps that text, the parsed [`scene::Scene`] and a schema-driven
//! [`form::Form`] consistent, and projects the scene into draw requests for
//! an external renderer:
//! - [`schema`] declares which parameters each shape exposes
//! - [`form`] generates editable fields and reads them back
//! - [`app::Editor`] applies [`app::Command`]s to the document
//! - [`ui`] is a thin egui adapter emitting those commands

pub mod app;
pub mod form;
pub mod render;
pub mod scene;
pub mod schema;
pub mod ui;

pub use app::{Command, CommandOutcome, Editor, EditorConfig, Prompt};
pub use scene::serialization::{parse, serialize, ParseError};
pub use schema::{ParamKind, ShapeSchema};
