//! Draw-request projection of the scene.
//!
//! The editor never talks to a graphics library. It hands the renderer a flat,
//! ordered list of [`DrawRequest`]s rebuilt from the current scene on every
//! change; the list is disposable and never read back into the document.

use crate::scene::{Camera, Scene, SceneObject};
use glam::Vec3;

pub const DEFAULT_COLOR: u32 = 0xffffff;
pub const HIGHLIGHT_COLOR: u32 = 0xffaa00;
pub const GLASS_MATERIAL_ID: &str = "Glass";
pub const GLASS_OPACITY: f32 = 0.7;
pub const WIREFRAME_OBJECT_ID: &str = "WorldBox";
pub const DEFAULT_CUBOID_SIZE: f32 = 100.0;
pub const DEFAULT_SPHERE_RADIUS: f32 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Geometry {
    Cuboid { size: Vec3 },
    Sphere { radius: f32 },
    Triangle { vertices: [Vec3; 3] },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Appearance {
    /// Packed `0xRRGGBB`.
    pub color: u32,
    pub material_id: Option<String>,
    pub transparent: bool,
    pub opacity: f32,
    pub wireframe: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrawRequest {
    pub object_index: usize,
    pub shape: String,
    pub geometry: Geometry,
    pub position: Vec3,
    pub appearance: Appearance,
    pub highlighted: bool,
}

/// Consumer of the projected scene. Implementations own all library-specific state.
pub trait SceneRenderer {
    fn draw(&mut self, viewpoint: &Viewpoint, requests: &[DrawRequest]);
}

/// Renderer that only reports what it was asked to draw.
#[derive(Debug, Default)]
pub struct LogRenderer {
    frames: usize,
}

impl LogRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> usize {
        self.frames
    }
}

impl SceneRenderer for LogRenderer {
    fn draw(&mut self, viewpoint: &Viewpoint, requests: &[DrawRequest]) {
        self.frames += 1;
        log::info!(
            "Frame {}: {} draw requests, eye {:?} fov {:.0}",
            self.frames,
            requests.len(),
            viewpoint.position,
            viewpoint.field_of_view_deg
        );
        for request in requests {
            log::debug!(
                "  #{} {} {:?} at {:?} color #{:06x}{}",
                request.object_index,
                request.shape,
                request.geometry,
                request.position,
                request.appearance.color,
                if request.highlighted { " (selected)" } else { "" }
            );
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewpoint {
    pub position: Vec3,
    pub direction: Vec3,
    pub up: Vec3,
    pub field_of_view_deg: f32,
}

impl Default for Viewpoint {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 3000.0),
            direction: Vec3::NEG_Z,
            up: Vec3::Y,
            field_of_view_deg: 75.0,
        }
    }
}

impl Viewpoint {
    /// Reads the first scene camera, keeping defaults for anything it omits.
    pub fn from_scene(scene: &Scene) -> Self {
        scene
            .cameras()
            .first()
            .map(Self::from_camera)
            .unwrap_or_default()
    }

    fn from_camera(camera: &Camera) -> Self {
        let defaults = Self::default();
        let direction = camera
            .vector("direction")
            .map(to_vec3)
            .and_then(Vec3::try_normalize)
            .unwrap_or(defaults.direction);
        Self {
            position: camera.vector("position").map(to_vec3).unwrap_or(defaults.position),
            direction,
            up: camera
                .vector("up")
                .map(to_vec3)
                .and_then(Vec3::try_normalize)
                .unwrap_or(defaults.up),
            field_of_view_deg: camera
                .field_of_view()
                .map(|fov| fov as f32)
                .unwrap_or(defaults.field_of_view_deg),
        }
    }
}

pub fn build_draw_list(scene: &Scene, selection: Option<usize>) -> Vec<DrawRequest> {
    scene
        .objects()
        .iter()
        .enumerate()
        .filter_map(|(index, object)| {
            let geometry = geometry_for(object)?;
            let highlighted = selection == Some(index);
            let mut appearance = appearance_for(scene, object);
            if highlighted {
                appearance.color = HIGHLIGHT_COLOR;
            }
            Some(DrawRequest {
                object_index: index,
                shape: object.shape().to_string(),
                geometry,
                position: object.vector_param("position").map(to_vec3).unwrap_or(Vec3::ZERO),
                appearance,
                highlighted,
            })
        })
        .collect()
}

fn geometry_for(object: &SceneObject) -> Option<Geometry> {
    match object.shape() {
        "cuboid" => Some(Geometry::Cuboid {
            size: object
                .vector_param("size")
                .map(to_vec3)
                .unwrap_or(Vec3::splat(DEFAULT_CUBOID_SIZE)),
        }),
        "sphere" => {
            let radius = object
                .number_param("r")
                .map(|r| r as f32)
                .filter(|r| *r != 0.0)
                .unwrap_or(DEFAULT_SPHERE_RADIUS);
            Some(Geometry::Sphere { radius })
        }
        "triangle" => {
            let vertex = |name: &str| object.vector_param(name).map(to_vec3).unwrap_or(Vec3::ZERO);
            Some(Geometry::Triangle {
                vertices: [vertex("p1"), vertex("p2"), vertex("p3")],
            })
        }
        _ => None,
    }
}

fn appearance_for(scene: &Scene, object: &SceneObject) -> Appearance {
    let color = scene
        .material_for(object)
        .and_then(|material| material.color())
        .map(pack_color)
        .unwrap_or(DEFAULT_COLOR);
    let transparent = object.material_id() == Some(GLASS_MATERIAL_ID);
    Appearance {
        color,
        material_id: object.material_id().map(str::to_string),
        transparent,
        opacity: if transparent { GLASS_OPACITY } else { 1.0 },
        wireframe: object.id() == WIREFRAME_OBJECT_ID,
    }
}

/// Channels in `[0, 1]` scale to bytes; brighter values saturate at 255.
pub fn pack_color(color: [f64; 3]) -> u32 {
    color.iter().fold(0u32, |packed, channel| {
        let byte = (channel * 255.0).floor().clamp(0.0, 255.0) as u32;
        (packed << 8) | byte
    })
}

fn to_vec3(v: [f64; 3]) -> Vec3 {
    Vec3::new(v[0] as f32, v[1] as f32, v[2] as f32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{serialization, DEFAULT_SCENE_JSON};
    use serde_json::json;

    fn scene_from(value: serde_json::Value) -> Scene {
        serialization::parse(&value.to_string()).unwrap()
    }

    #[test]
    fn pack_color_saturates() {
        assert_eq!(pack_color([1.0, 1.0, 1.0]), 0xffffff);
        assert_eq!(pack_color([1.0, 1.0, 0.0]), 0xffff00);
        assert_eq!(pack_color([10.0, 0.5, -1.0]), 0xff7f00);
    }

    #[test]
    fn default_scene_projects_boxes_and_sphere() {
        let scene = serialization::parse(DEFAULT_SCENE_JSON).unwrap();
        let list = build_draw_list(&scene, None);
        assert_eq!(list.len(), 5);

        assert_eq!(
            list[0].geometry,
            Geometry::Cuboid {
                size: Vec3::splat(2000.0)
            }
        );
        assert!(list[1].appearance.transparent);
        assert_eq!(list[1].appearance.opacity, GLASS_OPACITY);
        assert_eq!(list[4].geometry, Geometry::Sphere { radius: 400.0 });
        assert_eq!(list[4].position, Vec3::new(1000.0, 1000.0, 1600.0));
        assert_eq!(list[4].appearance.color, 0xffffff);
        assert!(list.iter().all(|request| !request.highlighted));
    }

    #[test]
    fn selection_overrides_color_without_touching_scene() {
        let scene = serialization::parse(DEFAULT_SCENE_JSON).unwrap();
        let before = scene.clone();
        let list = build_draw_list(&scene, Some(2));
        assert!(list[2].highlighted);
        assert_eq!(list[2].appearance.color, HIGHLIGHT_COLOR);
        assert_eq!(list[2].appearance.material_id.as_deref(), Some("Glass"));
        assert_eq!(scene, before);
    }

    #[test]
    fn dangling_material_and_unrendered_shapes() {
        let scene = scene_from(json!({
            "materials": [],
            "objects": [
                {"id": "WorldBox", "shape": "cuboid", "material_id": "Nowhere"},
                {"id": "plane", "shape": "plane", "A": [0, 1, 0], "b": 0},
                {"id": "tri", "shape": "triangle", "p1": [0, 0, 0], "p2": [1, 0, 0], "p3": [0, 1, 0]},
                {"id": "ball", "shape": "sphere", "r": 0}
            ]
        }));
        let list = build_draw_list(&scene, Some(1));

        assert_eq!(list.len(), 3);
        assert_eq!(list[0].appearance.color, DEFAULT_COLOR);
        assert!(list[0].appearance.wireframe);
        assert_eq!(
            list[0].geometry,
            Geometry::Cuboid {
                size: Vec3::splat(DEFAULT_CUBOID_SIZE)
            }
        );
        assert_eq!(list[1].object_index, 2);
        assert_eq!(
            list[1].geometry,
            Geometry::Triangle {
                vertices: [Vec3::ZERO, Vec3::X, Vec3::Y]
            }
        );
        assert_eq!(
            list[2].geometry,
            Geometry::Sphere {
                radius: DEFAULT_SPHERE_RADIUS
            }
        );
        assert!(list.iter().all(|request| !request.highlighted));
    }

    #[test]
    fn viewpoint_reads_first_camera() {
        let scene = serialization::parse(DEFAULT_SCENE_JSON).unwrap();
        let viewpoint = Viewpoint::from_scene(&scene);
        assert_eq!(viewpoint.position, Vec3::new(0.0, 0.0, 3000.0));
        assert_eq!(viewpoint.direction, Vec3::NEG_Z);
        assert_eq!(viewpoint.field_of_view_deg, 90.0);

        let bare = scene_from(json!({"objects": [], "cameras": [{"up": [0, 0, 0]}]}));
        assert_eq!(Viewpoint::from_scene(&bare), Viewpoint::default());
    }

    #[test]
    fn log_renderer_counts_frames() {
        let scene = serialization::parse(DEFAULT_SCENE_JSON).unwrap();
        let mut renderer = LogRenderer::new();
        renderer.draw(&Viewpoint::from_scene(&scene), &build_draw_list(&scene, None));
        renderer.draw(&Viewpoint::default(), &[]);
        assert_eq!(renderer.frames(), 2);
    }
}
