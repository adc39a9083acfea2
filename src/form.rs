//! Editable field set generated from the scene and read back into it.

use crate::scene::{Scene, SceneObject};
use crate::schema::{ParamKind, ShapeSchema};
use serde_json::Value;

/// Raw field contents, as a text input would hold them.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldInput {
    Number(String),
    Vector([String; 3]),
    Text(String),
}

impl FieldInput {
    pub fn kind(&self) -> ParamKind {
        match self {
            Self::Number(_) => ParamKind::SingleNumber,
            Self::Vector(_) => ParamKind::Vector3,
            Self::Text(_) => ParamKind::FreeText,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParamField {
    pub name: String,
    pub input: FieldInput,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormRow {
    pub index: usize,
    pub id: String,
    pub shape: String,
    pub params: Vec<ParamField>,
    pub material_id: String,
}

impl FormRow {
    pub fn param(&self, name: &str) -> Option<&FieldInput> {
        self.params
            .iter()
            .find(|field| field.name == name)
            .map(|field| &field.input)
    }

    pub fn param_mut(&mut self, name: &str) -> Option<&mut FieldInput> {
        self.params
            .iter_mut()
            .find(|field| field.name == name)
            .map(|field| &mut field.input)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Form {
    /// Every shape the schema declares, offered by each row's shape selector.
    pub shape_options: Vec<String>,
    pub rows: Vec<FormRow>,
}

pub fn generate(scene: &Scene, schema: &ShapeSchema) -> Form {
    let shape_options = schema
        .shape_names()
        .into_iter()
        .map(str::to_string)
        .collect();
    let rows = scene
        .objects()
        .iter()
        .enumerate()
        .map(|(index, object)| generate_row(index, object, schema))
        .collect();
    Form {
        shape_options,
        rows,
    }
}

fn generate_row(index: usize, object: &SceneObject, schema: &ShapeSchema) -> FormRow {
    let params = schema
        .parameter_kinds_for(object.shape())
        .iter()
        .map(|(name, kind)| ParamField {
            name: name.clone(),
            input: generate_field(*kind, object.param(name)),
        })
        .collect();
    FormRow {
        index,
        id: object.id(),
        shape: object.shape().to_string(),
        params,
        material_id: object.material_ref().unwrap_or_default().to_string(),
    }
}

fn generate_field(kind: ParamKind, value: Option<&Value>) -> FieldInput {
    match kind {
        ParamKind::SingleNumber => FieldInput::Number(number_text(value)),
        ParamKind::Vector3 => {
            let items = value.and_then(Value::as_array);
            let axis = |i: usize| number_text(items.and_then(|items| items.get(i)));
            FieldInput::Vector([axis(0), axis(1), axis(2)])
        }
        ParamKind::FreeText => FieldInput::Text(free_text(value)),
    }
}

fn number_text(value: Option<&Value>) -> String {
    format_number(value.and_then(Value::as_f64).unwrap_or(0.0))
}

fn free_text(value: Option<&Value>) -> String {
    value
        .and_then(|value| serde_json::to_string(value).ok())
        .unwrap_or_default()
}

/// Writes every row back into the object at the row's index. Field parse
/// failures never propagate, and a field whose text still shows the stored
/// value keeps that value verbatim. Returns the indices whose shape changed.
pub fn extract(form: &Form, scene: &mut Scene) -> Vec<usize> {
    let mut reshaped = Vec::new();
    for row in &form.rows {
        let Some(object) = scene.object_mut(row.index) else {
            log::warn!("Form row {} has no matching object; skipped", row.index);
            continue;
        };
        if object.shape() != row.shape {
            reshaped.push(row.index);
        }
        extract_row(row, object);
    }
    reshaped
}

fn extract_row(row: &FormRow, object: &mut SceneObject) {
    if object.id() != row.id {
        object.set_id(&row.id);
    }
    if object.shape() != row.shape {
        object.set_shape(&row.shape);
    }
    for field in &row.params {
        let stored = object.param(&field.name);
        let value = match &field.input {
            FieldInput::Number(text) => merge_number(stored, text),
            FieldInput::Vector(axes) => {
                let mut items = stored
                    .and_then(Value::as_array)
                    .cloned()
                    .unwrap_or_default();
                items.resize(items.len().max(3), Value::Null);
                for (item, text) in items.iter_mut().zip(axes) {
                    let previous = Some(&*item).filter(|item| !item.is_null());
                    *item = merge_number(previous, text);
                }
                Value::Array(items)
            }
            FieldInput::Text(text) => match stored {
                Some(stored) if free_text(Some(stored)) == *text => stored.clone(),
                _ => serde_json::from_str(text).unwrap_or_else(|err| {
                    log::warn!(
                        "Object '{}' param '{}' is not valid JSON ({}); storing raw text",
                        row.id,
                        field.name,
                        err
                    );
                    Value::String(text.clone())
                }),
            },
        };
        object.set_param(&field.name, value);
    }
    if !(row.material_id.is_empty() && object.material_id().is_none())
        && object.material_id() != Some(row.material_id.as_str())
    {
        object.set_material_id(&row.material_id);
    }
}

/// Keeps `stored` when `text` still shows it; otherwise parses `text`, writing
/// a float when the stored number was one.
fn merge_number(stored: Option<&Value>, text: &str) -> Value {
    match stored {
        Some(stored) if number_text(Some(stored)) == text => stored.clone(),
        Some(Value::Number(previous)) if previous.is_f64() => {
            float_value(parse_number(text))
        }
        _ => number_value(parse_number(text)),
    }
}

/// Empty, malformed and non-finite input all read as 0.
pub fn parse_number(text: &str) -> f64 {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|number| number.is_finite())
        .unwrap_or(0.0)
}

/// Integral values are stored as JSON integers.
pub fn number_value(number: f64) -> Value {
    const MAX_EXACT: f64 = 9_007_199_254_740_992.0;
    if number.fract() == 0.0 && number.abs() < MAX_EXACT {
        Value::from(number as i64)
    } else {
        float_value(number)
    }
}

fn float_value(number: f64) -> Value {
    serde_json::Number::from_f64(number)
        .map(Value::Number)
        .unwrap_or_else(|| Value::from(0))
}

pub fn format_number(number: f64) -> String {
    match number_value(number) {
        Value::Number(number) => number.to_string(),
        _ => "0".to_string(),
    }
}
