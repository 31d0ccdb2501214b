// Copyright @yucwang 2026

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::core::bsdf::BSDF;
use crate::core::emitter::Emitter;
use crate::core::properties::{ConfigError, Properties, PropertyValue};
use crate::core::scene::{Scene, SceneObject};
use crate::core::sensor::Sensor;
use crate::core::shape::Shape;
use crate::emitters::area::AreaEmitter;
use crate::emitters::constant::ConstantEmitter;
use crate::emitters::point::PointEmitter;
use crate::materials::conductor::SmoothConductorBSDF;
use crate::materials::dielectric::SmoothDielectricBSDF;
use crate::materials::lambertian_diffuse::LambertianDiffuseBSDF;
use crate::materials::null::NullBSDF;
use crate::math::constants::{Float, Matrix4f, Vector3f};
use crate::math::spectrum::RGBSpectrum;
use crate::math::transform::Transform;
use crate::sensors::perspective::PerspectiveCamera;
use crate::shapes::rectangle::Rectangle;
use crate::shapes::sphere::Sphere;

const DEFAULT_FILM_WIDTH: usize = 768;
const DEFAULT_FILM_HEIGHT: usize = 576;
const DEFAULT_SAMPLE_COUNT: i64 = 4;

#[derive(Debug)]
pub enum SceneLoadError {
    Io(std::io::Error),
    Parse(String),
    MissingField(&'static str),
    Config(ConfigError),
}

impl From<std::io::Error> for SceneLoadError {
    fn from(err: std::io::Error) -> Self {
        SceneLoadError::Io(err)
    }
}

impl From<ConfigError> for SceneLoadError {
    fn from(err: ConfigError) -> Self {
        SceneLoadError::Config(err)
    }
}

impl fmt::Display for SceneLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SceneLoadError::Io(e) => write!(f, "failed to read scene file: {}", e),
            SceneLoadError::Parse(msg) => write!(f, "failed to parse scene: {}", msg),
            SceneLoadError::MissingField(field) => write!(f, "missing required field: {}", field),
            SceneLoadError::Config(e) => write!(f, "invalid scene parameter: {}", e),
        }
    }
}

impl std::error::Error for SceneLoadError {}

pub struct SceneLoadResult {
    pub scene: Scene<RGBSpectrum>,
    /// Parameters of the `<integrator>` element, empty `path` if absent.
    pub integrator: Properties,
    pub sample_count: u32,
    pub seed: u64,
}

pub fn load_scene<P: AsRef<Path>>(path: P) -> Result<SceneLoadResult, SceneLoadError> {
    let path = path.as_ref();
    log::info!("Loading scene from {}.", path.display());
    let xml = fs::read_to_string(path)?;
    parse_scene(&xml)
}

pub fn parse_scene(xml: &str) -> Result<SceneLoadResult, SceneLoadError> {
    let root = read_element_tree(xml)?;
    if root.tag != "scene" {
        return Err(SceneLoadError::Parse(format!("expected <scene> root, found <{}>", root.tag)));
    }
    build_scene(&root)
}

#[derive(Debug, Clone, Default)]
struct XmlElement {
    tag: String,
    attributes: Vec<(String, String)>,
    children: Vec<XmlElement>,
}

impl XmlElement {
    fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn required(&self, key: &str, field: &'static str) -> Result<&str, SceneLoadError> {
        self.attribute(key).ok_or(SceneLoadError::MissingField(field))
    }

    fn child(&self, tag: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.tag == tag)
    }
}

// `<default>` values are substituted into every attribute read after them.
fn read_element_tree(xml: &str) -> Result<XmlElement, SceneLoadError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    let mut buf = Vec::new();

    let mut defaults: HashMap<String, String> = HashMap::new();
    let mut stack: Vec<XmlElement> = vec![XmlElement::default()];

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Eof) => break,
            Ok(Event::Start(e)) => {
                let element = read_element(&e, &mut defaults)?;
                stack.push(element);
            }
            Ok(Event::Empty(e)) => {
                let element = read_element(&e, &mut defaults)?;
                attach(&mut stack, element)?;
            }
            Ok(Event::End(_)) => {
                if stack.len() < 2 {
                    return Err(SceneLoadError::Parse("unbalanced closing tag".to_string()));
                }
                if let Some(element) = stack.pop() {
                    attach(&mut stack, element)?;
                }
            }
            Err(e) => {
                return Err(SceneLoadError::Parse(e.to_string()));
            }
            _ => {}
        }

        buf.clear();
    }

    if stack.len() != 1 {
        return Err(SceneLoadError::Parse("unclosed element at end of file".to_string()));
    }
    stack.pop()
        .and_then(|document| document.children.into_iter().next())
        .ok_or(SceneLoadError::MissingField("scene"))
}

fn read_element(e: &BytesStart, defaults: &mut HashMap<String, String>) -> Result<XmlElement, SceneLoadError> {
    let tag = String::from_utf8_lossy(e.name().as_ref()).to_string();
    let mut attributes = Vec::new();
    for attr in e.attributes().flatten() {
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
        let value = attr.unescape_value()
            .map_err(|err| SceneLoadError::Parse(err.to_string()))?;
        attributes.push((key, resolve_value(&value, defaults)));
    }
    let element = XmlElement { tag, attributes, children: Vec::new() };

    if element.tag == "default" {
        let name = element.required("name", "default.name")?;
        let value = element.required("value", "default.value")?;
        defaults.insert(name.to_string(), value.to_string());
    }
    Ok(element)
}

fn attach(stack: &mut Vec<XmlElement>, element: XmlElement) -> Result<(), SceneLoadError> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(element);
            Ok(())
        }
        None => Err(SceneLoadError::Parse("element outside of document".to_string())),
    }
}

fn build_scene(root: &XmlElement) -> Result<SceneLoadResult, SceneLoadError> {
    let mut scene = Scene::new();
    let mut integrator = Properties::new("path");
    let mut bsdfs: HashMap<String, Arc<dyn BSDF<RGBSpectrum>>> = HashMap::new();
    let mut sample_count: u32 = DEFAULT_SAMPLE_COUNT as u32;
    let mut seed: u64 = 0;

    for element in &root.children {
        match element.tag.as_str() {
            "default" => {}
            "integrator" => {
                integrator = properties_of(element)?;
                if integrator.plugin_type() != "path" {
                    return Err(SceneLoadError::Parse(format!("unsupported integrator: {}", integrator.plugin_type())));
                }
            }
            "sensor" => {
                let (sensor, sampler) = load_sensor(element)?;
                scene.add_sensor(sensor);
                if let Some((count, s)) = sampler {
                    sample_count = count;
                    seed = s;
                }
            }
            "bsdf" => {
                let id = element.required("id", "bsdf.id")?.to_string();
                let bsdf = load_bsdf(element, &bsdfs)?;
                bsdfs.insert(id, bsdf);
            }
            "shape" => {
                if let Some(object) = load_shape(element, &bsdfs)? {
                    scene.add_object(object);
                }
            }
            "emitter" => {
                if let Some(emitter) = load_emitter(element)? {
                    scene.add_emitter(emitter);
                }
            }
            other => log::warn!("Skipping unsupported element <{}>.", other),
        }
    }

    log::info!("Scene loaded: {} objects, {} emitters, {} sensors, environment: {}.",
               scene.len(), scene.emitters().len(), scene.sensors().len(), scene.environment().is_some());

    Ok(SceneLoadResult { scene, integrator, sample_count, seed })
}

// Collects the typed property children of a plugin element. Nested plugins
// are left to the caller.
fn properties_of(element: &XmlElement) -> Result<Properties, SceneLoadError> {
    let mut props = Properties::new(element.attribute("type").unwrap_or(""));
    props.set_id(element.attribute("id").map(|s| s.to_string()));

    for child in &element.children {
        let value = match child.tag.as_str() {
            "integer" => PropertyValue::Integer(parse_i64(child.required("value", "integer.value")?)?),
            "float" => PropertyValue::Float(parse_float(child.required("value", "float.value")?)?),
            "boolean" => PropertyValue::Boolean(parse_bool(child.required("value", "boolean.value")?)?),
            "string" => PropertyValue::String(child.required("value", "string.value")?.to_string()),
            "rgb" | "color" => PropertyValue::Color(parse_color(child.required("value", "rgb.value")?)?),
            "point" | "vector" => PropertyValue::Vector(parse_point(child)?),
            _ => continue,
        };
        props.set(child.required("name", "property.name")?, value);
    }
    Ok(props)
}

fn load_sensor(element: &XmlElement) -> Result<(Box<dyn Sensor>, Option<(u32, u64)>), SceneLoadError> {
    let props = properties_of(element)?;
    if props.plugin_type() != "perspective" {
        return Err(SceneLoadError::Parse(format!("unsupported sensor: {}", props.plugin_type())));
    }

    let mut origin = Vector3f::zeros();
    let mut target = Vector3f::new(0.0, 0.0, 1.0);
    let mut up = Vector3f::new(0.0, 1.0, 0.0);
    if let Some(lookat) = element.child("transform").and_then(|t| t.child("lookat")) {
        origin = parse_vec3(lookat.required("origin", "lookat.origin")?)?;
        target = parse_vec3(lookat.required("target", "lookat.target")?)?;
        if let Some(value) = lookat.attribute("up") {
            up = parse_vec3(value)?;
        }
    }

    let (mut width, mut height) = (DEFAULT_FILM_WIDTH, DEFAULT_FILM_HEIGHT);
    if let Some(film) = element.child("film") {
        let film = properties_of(film)?;
        width = positive_integer(&film, "width", DEFAULT_FILM_WIDTH as i64)? as usize;
        height = positive_integer(&film, "height", DEFAULT_FILM_HEIGHT as i64)? as usize;
    }

    let mut sampler = None;
    if let Some(element) = element.child("sampler") {
        let props = properties_of(element)?;
        if props.plugin_type() != "independent" {
            log::warn!("Sampler type {} is not supported, using independent.", props.plugin_type());
        }
        let count = positive_integer(&props, "sample_count", DEFAULT_SAMPLE_COUNT)?;
        let seed = props.integer_or("seed", 0)?;
        if seed < 0 {
            return Err(ConfigError::InvalidValue { name: "seed".to_string(), reason: "must be non-negative".to_string() }.into());
        }
        sampler = Some((count as u32, seed as u64));
    }

    let fov = props.float_or("fov", 45.0)?;
    let fov_axis = props.string_or("fov_axis", "x")?;
    let fov_y = vertical_fov(fov.to_radians(), &fov_axis, width, height)?;
    let near_clip = props.float_or("near_clip", 1e-2)?;
    let far_clip = props.float_or("far_clip", 1e4)?;
    if !(near_clip >= 0.0 && far_clip > near_clip) {
        return Err(ConfigError::InvalidValue {
            name: "far_clip".to_string(),
            reason: format!("clip range [{}, {}] is empty", near_clip, far_clip),
        }.into());
    }

    let camera = PerspectiveCamera::new(origin, target, up, fov_y, width, height, near_clip, far_clip);
    Ok((Box::new(camera), sampler))
}

// Converts the field of view along `axis` into the vertical one.
fn vertical_fov(fov: Float, axis: &str, width: usize, height: usize) -> Result<Float, ConfigError> {
    let horizontal = match axis {
        "x" => true,
        "y" => false,
        "smaller" => width <= height,
        "larger" => width > height,
        other => {
            return Err(ConfigError::InvalidValue {
                name: "fov_axis".to_string(),
                reason: format!("unknown axis {}", other),
            })
        }
    };
    if !horizontal {
        return Ok(fov);
    }
    let aspect = width as Float / height as Float;
    Ok(2.0 * ((0.5 * fov).tan() / aspect).atan())
}

fn load_bsdf(element: &XmlElement,
             bsdfs: &HashMap<String, Arc<dyn BSDF<RGBSpectrum>>>) -> Result<Arc<dyn BSDF<RGBSpectrum>>, SceneLoadError> {
    let props = properties_of(element)?;
    let id = props.id().map(|s| s.to_string());

    let bsdf: Arc<dyn BSDF<RGBSpectrum>> = match props.plugin_type() {
        "diffuse" => {
            let reflectance = spectrum(props.color_or("reflectance", Vector3f::repeat(0.5))?);
            let bsdf = LambertianDiffuseBSDF::new(reflectance);
            Arc::new(match id { Some(id) => bsdf.with_id(id), None => bsdf })
        }
        "conductor" => {
            let reflectance = spectrum(props.color_or("specular_reflectance", Vector3f::repeat(1.0))?);
            let bsdf = SmoothConductorBSDF::new(reflectance);
            Arc::new(match id { Some(id) => bsdf.with_id(id), None => bsdf })
        }
        "dielectric" => {
            let int_ior = props.float_or("int_ior", 1.5046)?;
            let ext_ior = props.float_or("ext_ior", 1.000277)?;
            if !(int_ior > 0.0 && ext_ior > 0.0) {
                return Err(ConfigError::InvalidValue {
                    name: "int_ior".to_string(),
                    reason: format!("indices of refraction must be positive, got {} / {}", int_ior, ext_ior),
                }.into());
            }
            let bsdf = SmoothDielectricBSDF::new(int_ior, ext_ior)
                .with_tint(spectrum(props.color_or("specular_reflectance", Vector3f::repeat(1.0))?),
                           spectrum(props.color_or("specular_transmittance", Vector3f::repeat(1.0))?));
            Arc::new(match id { Some(id) => bsdf.with_id(id), None => bsdf })
        }
        "null" => Arc::new(NullBSDF::new(id)),
        // Diffuse surfaces are already two-sided, the wrapper is transparent.
        "twosided" => {
            let nested = element.child("bsdf").ok_or(SceneLoadError::MissingField("twosided.bsdf"))?;
            load_bsdf(nested, bsdfs)?
        }
        other => {
            log::warn!("Unsupported bsdf type {}, using a diffuse default.", other);
            Arc::new(LambertianDiffuseBSDF::new(RGBSpectrum::new(0.5, 0.5, 0.5)))
        }
    };
    Ok(bsdf)
}

fn load_shape(element: &XmlElement,
              bsdfs: &HashMap<String, Arc<dyn BSDF<RGBSpectrum>>>) -> Result<Option<SceneObject<RGBSpectrum>>, SceneLoadError> {
    let props = properties_of(element)?;
    let to_world = match element.children.iter().find(|c| c.tag == "transform" && c.attribute("name") == Some("to_world")) {
        Some(transform) => parse_transform(transform)?,
        None => Transform::default(),
    };

    let shape: Arc<dyn Shape> = match props.plugin_type() {
        "sphere" => {
            let center = to_world.apply_point(props.vector_or("center", Vector3f::zeros())?);
            let radius = props.float_or("radius", 1.0)? * to_world.apply_vector(Vector3f::new(1.0, 0.0, 0.0)).norm();
            if !(radius > 0.0) {
                return Err(ConfigError::InvalidValue {
                    name: "radius".to_string(),
                    reason: format!("must be positive, got {}", radius),
                }.into());
            }
            Arc::new(Sphere::new(center, radius))
        }
        "rectangle" => Arc::new(Rectangle::new(to_world)),
        other => {
            log::warn!("Skipping unsupported shape type {}.", other);
            return Ok(None);
        }
    };

    let mut bsdf: Option<Arc<dyn BSDF<RGBSpectrum>>> = None;
    let mut emitter: Option<Arc<dyn Emitter<RGBSpectrum>>> = None;
    for child in &element.children {
        match child.tag.as_str() {
            "bsdf" => bsdf = Some(load_bsdf(child, bsdfs)?),
            "ref" => {
                let id = child.required("id", "ref.id")?;
                let referenced = bsdfs.get(id)
                    .ok_or_else(|| SceneLoadError::Parse(format!("missing bsdf ref: {}", id)))?;
                bsdf = Some(referenced.clone());
            }
            "emitter" => {
                let props = properties_of(child)?;
                if props.plugin_type() != "area" {
                    return Err(SceneLoadError::Parse(format!("shapes only carry area emitters, found {}", props.plugin_type())));
                }
                let radiance = spectrum(props.color_or("radiance", Vector3f::repeat(1.0))?);
                emitter = Some(Arc::new(AreaEmitter::new(shape.clone(), radiance)));
            }
            _ => {}
        }
    }

    let bsdf = bsdf.unwrap_or_else(|| Arc::new(LambertianDiffuseBSDF::new(RGBSpectrum::new(0.5, 0.5, 0.5))));
    let mut object = SceneObject::new(shape, bsdf);
    if let Some(id) = props.id() {
        object = object.with_name(id.to_string());
    }
    if let Some(emitter) = emitter {
        object = object.with_emitter(emitter);
    }
    Ok(Some(object))
}

fn load_emitter(element: &XmlElement) -> Result<Option<Arc<dyn Emitter<RGBSpectrum>>>, SceneLoadError> {
    let props = properties_of(element)?;
    let id = props.id().map(|s| s.to_string());
    let emitter: Arc<dyn Emitter<RGBSpectrum>> = match props.plugin_type() {
        "constant" => {
            let emitter = ConstantEmitter::new(spectrum(props.color_or("radiance", Vector3f::repeat(1.0))?));
            Arc::new(match id { Some(id) => emitter.with_id(id), None => emitter })
        }
        "point" => {
            let position = match element.child("transform") {
                Some(transform) => parse_transform(transform)?.apply_point(Vector3f::zeros()),
                None => props.vector_or("position", Vector3f::zeros())?,
            };
            let emitter = PointEmitter::new(position, spectrum(props.color_or("intensity", Vector3f::repeat(1.0))?));
            Arc::new(match id { Some(id) => emitter.with_id(id), None => emitter })
        }
        "area" => return Err(SceneLoadError::Parse("area emitters must be nested in a shape".to_string())),
        other => {
            log::warn!("Skipping unsupported emitter type {}.", other);
            return Ok(None);
        }
    };
    Ok(Some(emitter))
}

// Operations compose in document order: each one is applied after the
// ones before it.
fn parse_transform(element: &XmlElement) -> Result<Transform, SceneLoadError> {
    let mut transform = Transform::default();
    for op in &element.children {
        let next = match op.tag.as_str() {
            "translate" => Transform::translate(&parse_components(op, 0.0)?),
            "scale" => Transform::scale(&parse_components(op, 1.0)?),
            "rotate" => {
                let axis = parse_components(op, 0.0)?;
                if axis.norm() <= 0.0 {
                    return Err(SceneLoadError::Parse("rotation axis is zero".to_string()));
                }
                Transform::rotate(&axis, parse_float(op.required("angle", "rotate.angle")?)?)
            }
            "matrix" => {
                let values = op.required("value", "matrix.value")?
                    .split(|c: char| c == ',' || c.is_whitespace())
                    .filter(|s| !s.is_empty())
                    .map(parse_float)
                    .collect::<Result<Vec<Float>, SceneLoadError>>()?;
                if values.len() != 16 {
                    return Err(SceneLoadError::Parse(format!("matrix needs 16 values, got {}", values.len())));
                }
                Transform::new(Matrix4f::from_row_slice(&values))
            }
            "lookat" => {
                log::warn!("<lookat> is only supported in sensor transforms.");
                continue;
            }
            other => return Err(SceneLoadError::Parse(format!("unknown transform operation: {}", other))),
        };
        transform = next * transform;
    }
    Ok(transform)
}

// `value="v"` (uniform) or `value="x, y, z"`, else per-axis attributes.
fn parse_components(element: &XmlElement, default: Float) -> Result<Vector3f, SceneLoadError> {
    if let Some(value) = element.attribute("value") {
        return parse_color(value);
    }
    let axis = |key: &str| -> Result<Float, SceneLoadError> {
        element.attribute(key).map(parse_float).unwrap_or(Ok(default))
    };
    Ok(Vector3f::new(axis("x")?, axis("y")?, axis("z")?))
}

fn parse_point(element: &XmlElement) -> Result<Vector3f, SceneLoadError> {
    match element.attribute("value") {
        Some(value) => parse_vec3(value),
        None => parse_components(element, 0.0),
    }
}

fn spectrum(rgb: Vector3f) -> RGBSpectrum {
    RGBSpectrum::from_vector(rgb)
}

fn positive_integer(props: &Properties, name: &str, default: i64) -> Result<i64, ConfigError> {
    let value = props.integer_or(name, default)?;
    if value <= 0 || value > u32::MAX as i64 {
        return Err(ConfigError::InvalidValue {
            name: name.to_string(),
            reason: format!("must be a positive 32-bit integer, got {}", value),
        });
    }
    Ok(value)
}

fn resolve_value(raw: &str, defaults: &HashMap<String, String>) -> String {
    let mut out = raw.to_string();
    for (k, v) in defaults {
        out = out.replace(&format!("${}", k), v);
    }
    out
}

fn parse_float(value: &str) -> Result<Float, SceneLoadError> {
    value.trim().parse::<Float>().map_err(|_| SceneLoadError::Parse(format!("invalid float: {}", value)))
}

fn parse_i64(value: &str) -> Result<i64, SceneLoadError> {
    value.trim().parse::<i64>().map_err(|_| SceneLoadError::Parse(format!("invalid integer: {}", value)))
}

fn parse_bool(value: &str) -> Result<bool, SceneLoadError> {
    match value.trim() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(SceneLoadError::Parse(format!("invalid boolean: {}", value))),
    }
}

fn parse_vec3(value: &str) -> Result<Vector3f, SceneLoadError> {
    let mut parts = value.split(',').map(|s| s.trim()).filter(|s| !s.is_empty());
    let x = parts.next().ok_or_else(|| SceneLoadError::Parse("invalid vec3".to_string()))?;
    let y = parts.next().ok_or_else(|| SceneLoadError::Parse("invalid vec3".to_string()))?;
    let z = parts.next().ok_or_else(|| SceneLoadError::Parse("invalid vec3".to_string()))?;
    Ok(Vector3f::new(parse_float(x)?, parse_float(y)?, parse_float(z)?))
}

// A single value is splatted over the three channels.
fn parse_color(value: &str) -> Result<Vector3f, SceneLoadError> {
    if value.contains(',') {
        parse_vec3(value)
    } else {
        Ok(Vector3f::repeat(parse_float(value)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::emitter::EmitterFlag;
    use crate::math::constants::Vector2f;

    const CORNELL_LIKE: &str = r#"
<scene version="3.0.0">
    <default name="spp" value="16"/>
    <default name="depth" value="7"/>

    <integrator type="path">
        <integer name="max_depth" value="$depth"/>
        <integer name="rr_depth" value="3"/>
        <boolean name="hide_emitters" value="true"/>
    </integrator>

    <sensor type="perspective">
        <float name="fov" value="40"/>
        <string name="fov_axis" value="y"/>
        <transform name="to_world">
            <lookat origin="0, 1, 4" target="0, 1, 0" up="0, 1, 0"/>
        </transform>
        <sampler type="independent">
            <integer name="sample_count" value="$spp"/>
            <integer name="seed" value="3"/>
        </sampler>
        <film type="hdrfilm">
            <integer name="width" value="64"/>
            <integer name="height" value="48"/>
        </film>
    </sensor>

    <bsdf type="diffuse" id="white">
        <rgb name="reflectance" value="0.8, 0.8, 0.8"/>
    </bsdf>
    <bsdf type="twosided" id="red">
        <bsdf type="diffuse">
            <rgb name="reflectance" value="0.6, 0.1, 0.1"/>
        </bsdf>
    </bsdf>

    <shape type="rectangle" id="floor">
        <transform name="to_world">
            <scale value="2"/>
            <rotate x="1" angle="-90"/>
        </transform>
        <ref id="white"/>
    </shape>

    <shape type="rectangle" id="light">
        <transform name="to_world">
            <scale x="0.3" y="0.3" z="1"/>
            <rotate x="1" angle="90"/>
            <translate y="1.99"/>
        </transform>
        <bsdf type="diffuse">
            <rgb name="reflectance" value="0"/>
        </bsdf>
        <emitter type="area">
            <rgb name="radiance" value="17, 12, 4"/>
        </emitter>
    </shape>

    <shape type="sphere">
        <point name="center" x="0.3" y="0.4" z="0.1"/>
        <float name="radius" value="0.4"/>
        <bsdf type="dielectric"/>
    </shape>

    <shape type="sphere">
        <point name="center" value="-0.4, 0.3, -0.3"/>
        <float name="radius" value="0.3"/>
        <bsdf type="conductor"/>
    </shape>

    <shape type="serialized">
        <string name="filename" value="teapot.serialized"/>
    </shape>

    <emitter type="constant">
        <rgb name="radiance" value="0.1"/>
    </emitter>
    <emitter type="point">
        <point name="position" value="0, 1.5, 1"/>
        <rgb name="intensity" value="2"/>
    </emitter>
</scene>
"#;

    #[test]
    fn test_parse_full_scene() {
        let result = parse_scene(CORNELL_LIKE).expect("scene parses");

        assert_eq!(result.integrator.plugin_type(), "path");
        assert_eq!(result.integrator.integer_or("max_depth", 0), Ok(7));
        assert_eq!(result.integrator.integer_or("rr_depth", 0), Ok(3));
        assert_eq!(result.integrator.bool_or("hide_emitters", false), Ok(true));
        assert_eq!(result.sample_count, 16);
        assert_eq!(result.seed, 3);

        let scene = &result.scene;
        assert_eq!(scene.len(), 4);
        assert_eq!(scene.emitters().len(), 3);
        assert!(scene.environment().is_some());
        assert!(scene.emitters().iter().any(|e| e.flags().contains(EmitterFlag::DELTA_POSITION)));

        let camera = scene.camera(0).expect("sensor present");
        assert_eq!(camera.resolution(), (64, 48));
        let center = camera.sample_ray(&Vector2f::new(0.5, 0.5));
        assert!((center.dir() - Vector3f::new(0.0, 0.0, -1.0)).norm() < 1e-5);
    }

    #[test]
    fn test_transforms_compose_in_document_order() {
        let result = parse_scene(CORNELL_LIKE).expect("scene parses");
        let scene = &result.scene;

        // The light is rotated to face down and lifted to y = 1.99.
        let down = crate::math::ray::Ray3f::new(Vector3f::new(0.0, 1.5, 0.0), Vector3f::new(0.0, 1.0, 0.0), None, None);
        let si = scene.ray_intersect(&down);
        assert!(si.is_valid());
        assert!((si.t() - 0.49).abs() < 1e-4);
        assert!(si.attached_emitter().is_some());

        // The floor spans [-2, 2] in x and z.
        let onto_floor = crate::math::ray::Ray3f::new(Vector3f::new(1.9, 0.5, -1.9), Vector3f::new(0.0, -1.0, 0.0), None, None);
        let si = scene.ray_intersect(&onto_floor);
        assert!(si.is_valid());
        assert!((si.t() - 0.5).abs() < 1e-4);
        assert!((si.n().y.abs() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_missing_pieces_are_reported() {
        let missing_ref = r#"<scene><shape type="sphere"><ref id="nope"/></shape></scene>"#;
        assert!(matches!(parse_scene(missing_ref), Err(SceneLoadError::Parse(_))));

        let unbalanced = r#"<scene><shape type="sphere"></scene>"#;
        assert!(matches!(parse_scene(unbalanced), Err(SceneLoadError::Parse(_))));

        let bad_lookat = r#"<scene><sensor type="perspective"><transform name="to_world">
            <lookat target="0,0,0"/></transform></sensor></scene>"#;
        assert!(matches!(parse_scene(bad_lookat), Err(SceneLoadError::MissingField("lookat.origin"))));

        let bad_spp = r#"<scene><sensor type="perspective"><sampler type="independent">
            <integer name="sample_count" value="-2"/></sampler></sensor></scene>"#;
        assert!(matches!(parse_scene(bad_spp), Err(SceneLoadError::Config(ConfigError::InvalidValue { .. }))));

        let bad_integrator = r#"<scene><integrator type="bdpt"/></scene>"#;
        assert!(matches!(parse_scene(bad_integrator), Err(SceneLoadError::Parse(_))));
    }

    #[test]
    fn test_defaults_without_sensor_settings() {
        let result = parse_scene(r#"<scene><sensor type="perspective"/></scene>"#).expect("scene parses");
        assert_eq!(result.sample_count, DEFAULT_SAMPLE_COUNT as u32);
        assert_eq!(result.seed, 0);
        assert_eq!(result.integrator.plugin_type(), "path");
        let camera = result.scene.camera(0).expect("sensor present");
        assert_eq!(camera.resolution(), (DEFAULT_FILM_WIDTH, DEFAULT_FILM_HEIGHT));
    }

    #[test]
    fn test_horizontal_fov_conversion() {
        let square = vertical_fov(1.0, "x", 10, 10).expect("valid axis");
        assert!((square - 1.0).abs() < 1e-6);
        let wide = vertical_fov(1.0, "x", 20, 10).expect("valid axis");
        assert!(wide < 1.0);
        assert_eq!(vertical_fov(1.0, "y", 20, 10), Ok(1.0));
        assert!(vertical_fov(1.0, "diagonal", 20, 10).is_err());
    }
}
