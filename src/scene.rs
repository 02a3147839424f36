use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use glam::Vec3;
use log::warn;
use roxmltree::{Document, Node};
use serde::{Deserialize, Serialize};

use crate::camera::{Camera, DEFAULT_FAR, DEFAULT_FOV_DEGREES, DEFAULT_NEAR};
use crate::error::ConfigError;
use crate::light::{
    AmbientLight, Attenuation, DirectionalLight, Light, LightKind, PointLight, SpotCone, SpotLight,
};
use crate::light_set::{LightCapacity, LightSet};
use crate::material::{ColorSource, DrawParams, Material, DEFAULT_SHININESS};
use crate::render::{FloorPlane, FrameSnapshot};
use crate::shading::AmbientModel;
use crate::texture::Texture2D;

/// Scene description loaded by the host before the first frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Scene {
    pub camera: CameraSettings,
    pub ambient: AmbientLight,
    pub lights: Vec<SceneLight>,
    pub capacity: LightCapacity,
    pub ambient_model: AmbientModel,
    /// Shared color applied to every dynamic light when a frame is built.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub light_color: Option<Vec3>,
    pub material: MaterialSettings,
    pub floor: FloorSettings,
}

impl Scene {
    /// Parses and validates the scene XML.
    ///
    /// Light parameters the evaluator cannot handle (for example a spot
    /// light whose cutoffs coincide) are rejected here.
    pub fn from_xml(xml: &str) -> Result<Self> {
        let document = Document::parse(xml).context("invalid scene XML")?;
        let root = document.root_element();
        let mut scene = Scene::default();

        if let Some(settings) = child(&root, "settings") {
            scene.capacity = match optional_text(&settings, "layout").as_deref() {
                None | Some("standard") => LightCapacity::STANDARD,
                Some("legacy") => LightCapacity::LEGACY,
                Some(other) => bail!("unknown light layout '{other}'"),
            };
            scene.ambient_model = match optional_text(&settings, "ambient-model").as_deref() {
                None | Some("separate") => AmbientModel::Separate,
                Some("per-light") => AmbientModel::PerLight {
                    strength: parse_f32(optional_text(&settings, "ambient-strength"), 0.1)?,
                },
                Some(other) => bail!("unknown ambient model '{other}'"),
            };
            scene.light_color = optional_text(&settings, "light-color")
                .map(|value| parse_color(Some(value), Vec3::ONE))
                .transpose()?;
        }

        if let Some(camera) = child(&root, "camera") {
            let settings = &mut scene.camera;
            settings.position = parse_vec3(optional_text(&camera, "position"), settings.position)?;
            settings.target = parse_vec3(optional_text(&camera, "target"), settings.target)?;
            settings.fov = parse_f32(optional_text(&camera, "fov"), settings.fov)?;
            settings.orbit_radius = optional_text(&camera, "orbit-radius")
                .map(|value| parse_f32(Some(value), 0.0))
                .transpose()?;
        }

        if let Some(ambient) = child(&root, "ambient") {
            scene.ambient.color =
                parse_color(optional_text(&ambient, "color"), scene.ambient.color)?;
            scene.ambient.intensity =
                parse_f32(optional_text(&ambient, "intensity"), scene.ambient.intensity)?;
        }

        for (index, node) in root
            .children()
            .filter(|n| n.has_tag_name("light"))
            .enumerate()
        {
            let light = parse_light(&node).with_context(|| format!("light #{index}"))?;
            scene.lights.push(light);
        }

        if let Some(material) = child(&root, "material") {
            let settings = &mut scene.material;
            settings.diffuse = optional_text(&material, "diffuse");
            settings.specular = optional_text(&material, "specular");
            settings.shininess =
                parse_f32(optional_text(&material, "shininess"), settings.shininess)?;
        }

        if let Some(floor) = child(&root, "floor") {
            let settings = &mut scene.floor;
            settings.color = parse_color(optional_text(&floor, "color"), settings.color)?;
            settings.height = parse_f32(optional_text(&floor, "height"), settings.height)?;
            settings.half_extent =
                parse_f32(optional_text(&floor, "half-extent"), settings.half_extent)?;
            settings.tile_size = parse_f32(optional_text(&floor, "tile-size"), settings.tile_size)?;
            settings.textured = parse_bool(&floor, "textured", settings.textured)?;
        }

        scene.validate()?;
        Ok(scene)
    }

    /// Checks everything the evaluator takes as a precondition.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.camera.orbit_radius.is_none() && self.camera.position == self.camera.target {
            return Err(ConfigError::CameraTargetsEye(self.camera.position));
        }
        self.light_set()?;
        if !(self.material.shininess > 0.0 && self.material.shininess.is_finite()) {
            return Err(ConfigError::NonPositiveShininess(self.material.shininess));
        }
        Ok(())
    }

    /// Packs the configured lights into a validated set.
    pub fn light_set(&self) -> Result<LightSet, ConfigError> {
        LightSet::from_lights(
            self.capacity,
            std::iter::once(Light::Ambient(self.ambient))
                .chain(self.lights.iter().map(|scene_light| scene_light.light)),
        )
    }

    pub fn count(&self, kind: LightKind) -> usize {
        self.lights
            .iter()
            .filter(|scene_light| scene_light.light.kind() == kind)
            .count()
    }

    /// Builds the frame at `seconds` for a viewport of the given aspect.
    ///
    /// Spot lights marked `follow-camera` take the eye position and view
    /// direction, like a flashlight. A configured `light-color` replaces the
    /// color of every directional, point and spot light.
    pub fn frame(&self, seconds: f32, aspect: f32) -> Result<FrameSnapshot, ConfigError> {
        let camera = self.camera.build(seconds, aspect);
        let mut lights = self.light_set()?;
        let followers = self
            .lights
            .iter()
            .filter(|scene_light| matches!(scene_light.light, Light::Spot(_)))
            .map(|scene_light| scene_light.follow_camera);
        if let Some(color) = self.light_color {
            lights.directional_mut().iter_mut().for_each(|light| light.color = color);
            lights.point_mut().iter_mut().for_each(|light| light.color = color);
            lights.spot_mut().iter_mut().for_each(|light| light.color = color);
        }
        for (spot, follow) in lights.spot_mut().iter_mut().zip(followers) {
            if follow {
                spot.position = camera.position();
                spot.direction = camera.direction();
            }
        }
        FrameSnapshot::new(camera, lights, self.ambient_model)
    }

    /// Loads the object material; texture paths are relative to `base_dir`.
    ///
    /// A missing texture entry leaves that sampler unbound.
    pub fn material(&self, base_dir: &Path) -> Result<Material> {
        let load = |path: &Option<String>| -> Result<ColorSource> {
            match path {
                Some(path) => Ok(ColorSource::Texture(Arc::new(Texture2D::open(
                    base_dir.join(path),
                )?))),
                None => Ok(ColorSource::Unbound),
            }
        };
        let material = Material {
            diffuse: load(&self.material.diffuse)?,
            specular: load(&self.material.specular)?,
            shininess: self.material.shininess,
        };
        material.validate()?;
        Ok(material)
    }

    /// Draw parameters for the floor; a textured floor samples the material.
    pub fn floor_draw(&self) -> DrawParams {
        DrawParams {
            is_flat_surface: !self.floor.textured,
            flat_color: self.floor.color,
        }
    }

    pub fn floor_plane(&self) -> FloorPlane {
        FloorPlane {
            height: self.floor.height,
            half_extent: self.floor.half_extent,
            tile_size: self.floor.tile_size,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraSettings {
    pub position: Vec3,
    pub target: Vec3,
    pub fov: f32,
    /// When set the eye circles the origin at this radius over time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orbit_radius: Option<f32>,
}

impl CameraSettings {
    pub fn build(&self, seconds: f32, aspect: f32) -> Camera {
        let mut camera = Camera::look_at(self.position, self.target, Vec3::Y).with_perspective(
            self.fov,
            aspect,
            DEFAULT_NEAR,
            DEFAULT_FAR,
        );
        if let Some(radius) = self.orbit_radius {
            camera.orbit(seconds, radius);
        }
        camera
    }
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 2.0, 6.0),
            target: Vec3::ZERO,
            fov: DEFAULT_FOV_DEGREES,
            orbit_radius: None,
        }
    }
}

/// Light as authored, plus host-side behaviour flags.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SceneLight {
    pub light: Light,
    #[serde(default)]
    pub follow_camera: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diffuse: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specular: Option<String>,
    pub shininess: f32,
}

impl Default for MaterialSettings {
    fn default() -> Self {
        Self {
            diffuse: None,
            specular: None,
            shininess: DEFAULT_SHININESS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloorSettings {
    pub color: Vec3,
    pub height: f32,
    pub half_extent: f32,
    pub tile_size: f32,
    /// Draw the floor with the material's textures instead of `color`.
    #[serde(default)]
    pub textured: bool,
}

impl Default for FloorSettings {
    fn default() -> Self {
        let plane = FloorPlane::default();
        Self {
            color: Vec3::splat(0.5),
            height: plane.height,
            half_extent: plane.half_extent,
            tile_size: plane.tile_size,
            textured: false,
        }
    }
}

fn parse_light(node: &Node<'_, '_>) -> Result<SceneLight> {
    let kind = required_text(node, "type")?;
    let color = parse_color(optional_text(node, "color"), Vec3::ONE)?;
    let intensity = parse_f32(optional_text(node, "intensity"), 1.0)?;
    let attenuation = parse_attenuation(optional_text(node, "attenuation"))?;

    let light = match kind.as_str() {
        "ambient" => Light::Ambient(AmbientLight { color, intensity }),
        "directional" => Light::Directional(DirectionalLight {
            color,
            intensity,
            direction: parse_vec3(optional_text(node, "direction"), Vec3::NEG_Z)?,
        }),
        "point" => Light::Point(PointLight {
            color,
            intensity,
            position: parse_vec3(optional_text(node, "position"), Vec3::ZERO)?,
            attenuation,
        }),
        "spot" => Light::Spot(SpotLight {
            color,
            intensity,
            position: parse_vec3(optional_text(node, "position"), Vec3::ZERO)?,
            direction: parse_vec3(optional_text(node, "direction"), Vec3::NEG_Z)?,
            attenuation,
            cone: parse_cutoff(optional_text(node, "cutoff"))?,
        }),
        other => bail!("unknown light type '{other}'"),
    };

    let follow_camera = parse_bool(node, "follow-camera", false)?;
    if follow_camera && light.kind() != LightKind::Spot {
        warn!("follow-camera ignored on {} light", light.kind());
    }
    Ok(SceneLight {
        light,
        follow_camera,
    })
}

fn parse_attenuation(value: Option<String>) -> Result<Attenuation> {
    let defaults = Attenuation::default();
    let terms = parse_vec3(
        value,
        Vec3::new(defaults.constant, defaults.linear, defaults.quadratic),
    )?;
    Ok(Attenuation::new(terms.x, terms.y, terms.z))
}

/// Inner and outer half-angles in degrees.
fn parse_cutoff(value: Option<String>) -> Result<SpotCone> {
    let Some(value) = value else {
        return Ok(SpotCone::default());
    };
    let angles: Vec<f32> = value
        .split_whitespace()
        .map(|component| component.parse::<f32>())
        .collect::<Result<_, _>>()
        .map_err(|err| anyhow!("failed to parse cutoff: {err}"))?;
    match angles.as_slice() {
        [inner, outer] => Ok(SpotCone::from_degrees(*inner, *outer)),
        _ => Err(anyhow!("cutoff needs inner and outer angles")),
    }
}

fn child<'a, 'input>(node: &Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|n| n.has_tag_name(tag))
}

fn required_text(node: &Node<'_, '_>, tag: &str) -> Result<String> {
    optional_text(node, tag).ok_or_else(|| anyhow!("<{tag}> tag is missing"))
}

fn optional_text(node: &Node<'_, '_>, tag: &str) -> Option<String> {
    node.children()
        .find(|child| child.has_tag_name(tag))
        .and_then(|child| child.text())
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(|text| text.to_string())
}

fn parse_vec3(value: Option<String>, default: Vec3) -> Result<Vec3> {
    let Some(value) = value else {
        return Ok(default);
    };
    let mut numbers = value
        .split_whitespace()
        .filter_map(|component| component.parse::<f32>().ok());
    let x = numbers
        .next()
        .ok_or_else(|| anyhow!("vector is missing components"))?;
    let y = numbers
        .next()
        .ok_or_else(|| anyhow!("vector is missing components"))?;
    let z = numbers
        .next()
        .ok_or_else(|| anyhow!("vector is missing components"))?;
    Ok(Vec3::new(x, y, z))
}

/// Colors are authored as 0-255 triples.
fn parse_color(value: Option<String>, default: Vec3) -> Result<Vec3> {
    let Some(value) = value else {
        return Ok(default);
    };
    Ok(parse_vec3(Some(value), default)
        .map_err(|_| anyhow!("color is missing components"))?
        / 255.0)
}

fn parse_bool(node: &Node<'_, '_>, tag: &str, default: bool) -> Result<bool> {
    match optional_text(node, tag).as_deref() {
        None => Ok(default),
        Some("true") => Ok(true),
        Some("false") => Ok(false),
        Some(other) => bail!("{tag} must be true or false, got '{other}'"),
    }
}

fn parse_f32(value: Option<String>, default: f32) -> Result<f32> {
    match value {
        Some(value) => value
            .parse::<f32>()
            .map_err(|err| anyhow!("failed to parse float: {err}")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
    <scene>
        <settings>
            <layout>standard</layout>
            <ambient-model>separate</ambient-model>
        </settings>
        <camera>
            <position>0 2 6</position>
            <fov>60</fov>
        </camera>
        <ambient>
            <color>255 255 255</color>
            <intensity>0.1</intensity>
        </ambient>
        <light>
            <type>directional</type>
            <direction>-0.2 -1 -0.3</direction>
            <intensity>0.4</intensity>
        </light>
        <light>
            <type>point</type>
            <position>0.7 0.2 2</position>
            <color>255 128 0</color>
            <attenuation>1 0.09 0.032</attenuation>
        </light>
        <light>
            <type>spot</type>
            <cutoff>12.5 17.5</cutoff>
            <follow-camera>true</follow-camera>
        </light>
        <floor>
            <color>128 128 128</color>
            <height>-3</height>
        </floor>
    </scene>
    "#;

    #[test]
    fn parse_scene_populates_lights() {
        let scene = Scene::from_xml(SAMPLE).unwrap();
        assert_eq!(scene.lights.len(), 3);
        assert_eq!(scene.count(LightKind::Point), 1);
        assert_eq!(scene.camera.fov, 60.0);
        assert!((scene.ambient.intensity - 0.1).abs() < f32::EPSILON);
        let Light::Point(point) = scene.lights[1].light else {
            panic!("expected a point light");
        };
        assert_eq!(point.color, Vec3::new(1.0, 128.0 / 255.0, 0.0));
        assert_eq!(point.attenuation, Attenuation::new(1.0, 0.09, 0.032));
        assert!(scene.lights[2].follow_camera);
        assert_eq!(scene.floor.height, -3.0);
    }

    #[test]
    fn degenerate_spot_cone_is_rejected_at_load() {
        let xml = "<scene><light><type>spot</type><cutoff>15 15</cutoff></light></scene>";
        let err = Scene::from_xml(xml).unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("spot light 0"), "{message}");
        assert!(message.contains("degenerate"), "{message}");
    }

    #[test]
    fn legacy_layout_limits_light_count() {
        let xml = r#"<scene>
            <settings><layout>legacy</layout></settings>
            <light><type>directional</type></light>
            <light><type>directional</type></light>
        </scene>"#;
        let err = Scene::from_xml(xml).unwrap_err();
        assert!(err.to_string().contains("capacity of 1"), "{err}");
    }

    #[test]
    fn per_light_ambient_model_reads_strength() {
        let xml = r#"<scene><settings>
            <ambient-model>per-light</ambient-model>
            <ambient-strength>0.2</ambient-strength>
        </settings></scene>"#;
        let scene = Scene::from_xml(xml).unwrap();
        assert_eq!(scene.ambient_model, AmbientModel::PerLight { strength: 0.2 });
    }

    #[test]
    fn unknown_light_type_is_an_error() {
        let xml = "<scene><light><type>area</type></light></scene>";
        let err = Scene::from_xml(xml).unwrap_err();
        assert!(format!("{err:#}").contains("unknown light type 'area'"));
    }

    #[test]
    fn missing_light_type_is_an_error() {
        assert!(Scene::from_xml("<scene><light/></scene>").is_err());
    }

    #[test]
    fn flashlight_follows_the_camera() {
        let scene = Scene::from_xml(SAMPLE).unwrap();
        let frame = scene.frame(0.0, 1.5).unwrap();
        let spot = frame.lights.spot()[0];
        assert_eq!(spot.position, frame.camera.position());
        assert_eq!(spot.direction, frame.camera.direction());
        assert_eq!(frame.lights.point().len(), 1);
    }

    #[test]
    fn orbiting_camera_moves_with_time() {
        let xml = "<scene><camera><orbit-radius>10</orbit-radius></camera></scene>";
        let scene = Scene::from_xml(xml).unwrap();
        let start = scene.frame(0.0, 1.0).unwrap().camera.position();
        let later = scene.frame(1.0, 1.0).unwrap().camera.position();
        assert!((start - Vec3::new(0.0, 0.0, 10.0)).length() < 1e-5);
        assert!((later - start).length() > 1.0);
    }

    #[test]
    fn straight_down_camera_renders_a_finite_view() {
        let xml = r#"<scene><camera>
            <position>0 5 0</position>
            <target>0 -3 0</target>
        </camera></scene>"#;
        let scene = Scene::from_xml(xml).unwrap();
        let frame = scene.frame(0.0, 1.0).unwrap();
        assert!(frame.camera.view_proj().is_finite());
        assert_eq!(frame.camera.direction(), Vec3::NEG_Y);
    }

    #[test]
    fn camera_looking_at_itself_is_rejected() {
        let xml = r#"<scene><camera>
            <position>1 2 3</position>
            <target>1 2 3</target>
        </camera></scene>"#;
        let err = Scene::from_xml(xml).unwrap_err();
        assert!(format!("{err:#}").contains("coincides"), "{err:#}");
    }

    #[test]
    fn light_color_setting_recolors_dynamic_lights() {
        let xml = SAMPLE.replace(
            "<layout>standard</layout>",
            "<layout>standard</layout><light-color>0 255 0</light-color>",
        );
        let scene = Scene::from_xml(&xml).unwrap();
        assert_eq!(scene.light_color, Some(Vec3::Y));
        let frame = scene.frame(0.0, 1.0).unwrap();
        assert_eq!(frame.lights.directional()[0].color, Vec3::Y);
        assert_eq!(frame.lights.point()[0].color, Vec3::Y);
        assert_eq!(frame.lights.spot()[0].color, Vec3::Y);
        assert_eq!(frame.lights.ambient.color, Vec3::ONE);
    }

    #[test]
    fn textured_floor_keeps_material_sources() {
        let flat = Scene::from_xml(SAMPLE).unwrap();
        assert!(flat.floor_draw().is_flat_surface);

        let xml = SAMPLE.replace(
            "<height>-3</height>",
            "<height>-3</height><textured>true</textured>",
        );
        let scene = Scene::from_xml(&xml).unwrap();
        assert!(scene.floor.textured);
        let draw = scene.floor_draw();
        assert!(!draw.is_flat_surface);
        let material = Material::flat(Vec3::X, 16.0);
        assert_eq!(material.bind(&draw), material);
    }

    #[test]
    fn bad_textured_flag_is_an_error() {
        let xml = "<scene><floor><textured>yes</textured></floor></scene>";
        let err = Scene::from_xml(xml).unwrap_err();
        assert!(format!("{err:#}").contains("textured must be true or false"));
    }

    #[test]
    fn material_without_textures_is_unbound() {
        let scene = Scene::from_xml("<scene><material><shininess>8</shininess></material></scene>")
            .unwrap();
        let material = scene.material(Path::new(".")).unwrap();
        assert_eq!(material.diffuse, ColorSource::Unbound);
        assert_eq!(material.shininess, 8.0);
    }

    #[test]
    fn zero_shininess_is_rejected() {
        let xml = "<scene><material><shininess>0</shininess></material></scene>";
        assert!(Scene::from_xml(xml).is_err());
    }
}
