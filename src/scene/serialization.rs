use crate::scene::Scene;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ParseError>;

/// Parses scene text. Fails when the text is not JSON or has no `objects` array.
pub fn parse(text: &str) -> Result<Scene> {
    let scene: Scene = serde_json::from_str(text)?;
    Ok(scene)
}

/// Pretty-printed with two-space indentation; keys keep their insertion order.
pub fn serialize(scene: &Scene) -> Result<String> {
    let text = serde_json::to_string_pretty(scene)?;
    Ok(text)
}

pub fn load_scene_from_file(path: &Path) -> Result<Scene> {
    let text = std::fs::read_to_string(path)?;
    parse(&text)
}
