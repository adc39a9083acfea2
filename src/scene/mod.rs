pub mod serialization;

use serde_json::{Map, Value};

/// Bundled scene restored by the reset action.
pub const DEFAULT_SCENE_JSON: &str = include_str!("../../assets/default_scene.json");

const MATERIALS: &str = "materials";
const OBJECTS: &str = "objects";
const CAMERAS: &str = "cameras";

/// Editable material entry. Only `id` is interpreted by the editor; physical
/// parameters are carried through untouched in their original order.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Material {
    properties: Map<String, Value>,
}

impl Material {
    pub fn id(&self) -> &str {
        self.properties
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    /// Color channels in `[0, 1]`, when the material declares at least three.
    pub fn color(&self) -> Option<[f64; 3]> {
        let channels = self.properties.get("color")?.as_array()?;
        if channels.len() < 3 {
            return None;
        }
        let mut color = [0.0; 3];
        for (slot, channel) in color.iter_mut().zip(channels) {
            *slot = channel.as_f64()?;
        }
        Some(color)
    }

    pub fn radiates(&self) -> bool {
        self.properties.get("radiate").is_some_and(is_truthy)
    }

    pub fn diffuse_loss(&self) -> Option<f64> {
        self.number("diffuse_loss")
    }

    pub fn reflect_loss(&self) -> Option<f64> {
        self.number("reflect_loss")
    }

    pub fn refract_loss(&self) -> Option<f64> {
        self.number("refract_loss")
    }

    pub fn refractivity(&self) -> Option<f64> {
        self.number("refractivity")
    }

    fn number(&self, key: &str) -> Option<f64> {
        self.properties.get(key).and_then(Value::as_f64)
    }
}

/// Serializable scene object. Every field, `id`, `shape` and `material_id`
/// included, lives in one map so the user's key order is written back as read.
/// Shape-specific fields are keyed by the names the shape schema declares.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct SceneObject {
    fields: Map<String, Value>,
}

impl SceneObject {
    pub fn new(id: &str, shape: &str) -> Self {
        let mut object = Self::default();
        object.set_id(id);
        object.set_shape(shape);
        object
    }

    /// Display form of `id`. A non-string id reads as its JSON text, a missing
    /// or null one as empty.
    pub fn id(&self) -> String {
        match self.fields.get("id") {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(id)) => id.clone(),
            Some(other) => other.to_string(),
        }
    }

    pub fn set_id(&mut self, id: &str) {
        self.set_param("id", Value::from(id));
    }

    pub fn shape(&self) -> &str {
        self.fields
            .get("shape")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    pub fn set_shape(&mut self, shape: &str) {
        self.set_param("shape", Value::from(shape));
    }

    pub fn material_id(&self) -> Option<&str> {
        self.fields.get("material_id").and_then(Value::as_str)
    }

    pub fn set_material_id(&mut self, material_id: &str) {
        self.set_param("material_id", Value::from(material_id));
    }

    pub fn param(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Replaces an existing field in place; new fields are appended.
    pub fn set_param(&mut self, name: &str, value: Value) {
        self.fields.insert(name.to_string(), value);
    }

    pub fn number_param(&self, name: &str) -> Option<f64> {
        self.param(name).and_then(Value::as_f64)
    }

    /// First three components of an array parameter; non-numeric entries read as 0.
    pub fn vector_param(&self, name: &str) -> Option<[f64; 3]> {
        let items = self.param(name)?.as_array()?;
        let mut vector = [0.0; 3];
        for (slot, item) in vector.iter_mut().zip(items) {
            *slot = item.as_f64().unwrap_or(0.0);
        }
        Some(vector)
    }

    /// Material reference as shown to the user, honouring the legacy `material` key.
    pub fn material_ref(&self) -> Option<&str> {
        self.material_id()
            .or_else(|| self.param("material").and_then(Value::as_str))
    }
}

/// Camera entries are forwarded verbatim; the accessors only read them.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Camera {
    properties: Map<String, Value>,
}

impl Camera {
    pub fn vector(&self, key: &str) -> Option<[f64; 3]> {
        let items = self.properties.get(key)?.as_array()?;
        if items.len() < 3 {
            return None;
        }
        Some([
            items[0].as_f64()?,
            items[1].as_f64()?,
            items[2].as_f64()?,
        ])
    }

    pub fn field_of_view(&self) -> Option<f64> {
        self.properties.get("field_of_view").and_then(Value::as_f64)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub fn from_offset(offset: i32) -> Option<Self> {
        match offset {
            -1 => Some(Self::Up),
            1 => Some(Self::Down),
            _ => None,
        }
    }

    fn neighbor(self, index: usize) -> Option<usize> {
        match self {
            Self::Up => index.checked_sub(1),
            Self::Down => index.checked_add(1),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SceneStats {
    pub cuboids: usize,
    pub spheres: usize,
    pub lights: usize,
}

impl SceneStats {
    /// Only cuboids and spheres are counted towards the total.
    pub fn total(&self) -> usize {
        self.cuboids + self.spheres
    }
}

/// The editable document. Object order is significant and survives round-trips,
/// as does the order of the top-level keys.
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct Scene {
    materials: Vec<Material>,
    objects: Vec<SceneObject>,
    cameras: Option<Vec<Camera>>,
    extra: Map<String, Value>,
    /// Top-level keys in document order. Always lists `materials` and `objects`.
    key_order: Vec<String>,
}

impl Default for Scene {
    fn default() -> Self {
        Self {
            materials: Vec::new(),
            objects: Vec::new(),
            cameras: None,
            extra: Map::new(),
            key_order: vec![MATERIALS.to_string(), OBJECTS.to_string()],
        }
    }
}

impl TryFrom<Map<String, Value>> for Scene {
    type Error = serde_json::Error;

    fn try_from(mut document: Map<String, Value>) -> Result<Self, Self::Error> {
        use serde::de::Error as _;

        let mut key_order: Vec<String> = document.keys().cloned().collect();
        let objects = match document.remove(OBJECTS) {
            Some(objects) => serde_json::from_value(objects)?,
            None => return Err(serde_json::Error::missing_field(OBJECTS)),
        };
        let materials = match document.remove(MATERIALS) {
            Some(materials) => serde_json::from_value(materials)?,
            None => {
                key_order.push(MATERIALS.to_string());
                Vec::new()
            }
        };
        let cameras = document
            .remove(CAMERAS)
            .map(serde_json::from_value)
            .transpose()?;

        Ok(Self {
            materials,
            objects,
            cameras,
            extra: document,
            key_order,
        })
    }
}

impl serde::Serialize for Scene {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(None)?;
        for key in &self.key_order {
            match key.as_str() {
                MATERIALS => map.serialize_entry(key, &self.materials)?,
                OBJECTS => map.serialize_entry(key, &self.objects)?,
                CAMERAS => {
                    if let Some(cameras) = &self.cameras {
                        map.serialize_entry(key, cameras)?;
                    }
                }
                _ => {
                    if let Some(value) = self.extra.get(key) {
                        map.serialize_entry(key, value)?;
                    }
                }
            }
        }
        map.end()
    }
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    pub fn cameras(&self) -> &[Camera] {
        self.cameras.as_deref().unwrap_or_default()
    }

    pub fn object_mut(&mut self, index: usize) -> Option<&mut SceneObject> {
        self.objects.get_mut(index)
    }

    pub fn add_object(&mut self, object: SceneObject) {
        self.objects.push(object);
    }

    pub fn add_material(&mut self, material: Material) {
        self.materials.push(material);
    }

    /// Dangling references resolve to `None`.
    pub fn material(&self, id: &str) -> Option<&Material> {
        self.materials.iter().find(|material| material.id() == id)
    }

    pub fn material_for(&self, object: &SceneObject) -> Option<&Material> {
        object.material_id().and_then(|id| self.material(id))
    }

    /// Swaps the object at `index` with its neighbour. Returns the neighbour's
    /// index, or `None` when it would fall outside the list.
    pub fn move_object(&mut self, index: usize, direction: Direction) -> Option<usize> {
        let target = direction.neighbor(index)?;
        if index >= self.objects.len() || target >= self.objects.len() {
            return None;
        }
        self.objects.swap(index, target);
        Some(target)
    }

    pub fn remove_object(&mut self, index: usize) -> Option<SceneObject> {
        if index < self.objects.len() {
            Some(self.objects.remove(index))
        } else {
            None
        }
    }

    pub fn stats(&self) -> SceneStats {
        let mut stats = SceneStats::default();
        for object in &self.objects {
            match object.shape() {
                "cuboid" => stats.cuboids += 1,
                "sphere" => stats.spheres += 1,
                _ => {}
            }
            if self.material_for(object).is_some_and(Material::radiates) {
                stats.lights += 1;
            }
        }
        stats
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
