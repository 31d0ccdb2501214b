// Copyright @yucwang 2026

use crate::math::constants::{Float, Vector3f};

use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    TypeMismatch { name: String, expected: &'static str },
    InvalidValue { name: String, reason: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::TypeMismatch { name, expected } =>
                write!(f, "property '{}' is not of type {}", name, expected),
            ConfigError::InvalidValue { name, reason } =>
                write!(f, "invalid value for '{}': {}", name, reason),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Boolean(bool),
    Integer(i64),
    Float(Float),
    String(String),
    Color(Vector3f),
    Vector(Vector3f),
}

/// Named, typed parameters of one scene object (integrator, bsdf, ...).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Properties {
    plugin_type: String,
    id: Option<String>,
    values: BTreeMap<String, PropertyValue>,
}

impl Properties {
    pub fn new(plugin_type: &str) -> Self {
        Self { plugin_type: plugin_type.to_string(), id: None, values: BTreeMap::new() }
    }

    pub fn plugin_type(&self) -> &str {
        &self.plugin_type
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn set_id(&mut self, id: Option<String>) {
        self.id = id;
    }

    pub fn set(&mut self, name: &str, value: PropertyValue) {
        self.values.insert(name.to_string(), value);
    }

    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.values.get(name)
    }

    pub fn integer_or(&self, name: &str, default: i64) -> Result<i64, ConfigError> {
        match self.values.get(name) {
            None => Ok(default),
            Some(PropertyValue::Integer(v)) => Ok(*v),
            Some(PropertyValue::String(s)) => s.trim().parse::<i64>()
                .map_err(|_| mismatch(name, "integer")),
            Some(_) => Err(mismatch(name, "integer")),
        }
    }

    pub fn float_or(&self, name: &str, default: Float) -> Result<Float, ConfigError> {
        match self.values.get(name) {
            None => Ok(default),
            Some(PropertyValue::Float(v)) => Ok(*v),
            Some(PropertyValue::Integer(v)) => Ok(*v as Float),
            Some(PropertyValue::String(s)) => s.trim().parse::<Float>()
                .map_err(|_| mismatch(name, "float")),
            Some(_) => Err(mismatch(name, "float")),
        }
    }

    pub fn bool_or(&self, name: &str, default: bool) -> Result<bool, ConfigError> {
        match self.values.get(name) {
            None => Ok(default),
            Some(PropertyValue::Boolean(v)) => Ok(*v),
            Some(PropertyValue::String(s)) => match s.trim() {
                "true" => Ok(true),
                "false" => Ok(false),
                _ => Err(mismatch(name, "boolean")),
            },
            Some(_) => Err(mismatch(name, "boolean")),
        }
    }

    pub fn string_or(&self, name: &str, default: &str) -> Result<String, ConfigError> {
        match self.values.get(name) {
            None => Ok(default.to_string()),
            Some(PropertyValue::String(s)) => Ok(s.clone()),
            Some(_) => Err(mismatch(name, "string")),
        }
    }

    // A scalar is accepted where a color is expected and splatted.
    pub fn color_or(&self, name: &str, default: Vector3f) -> Result<Vector3f, ConfigError> {
        match self.values.get(name) {
            None => Ok(default),
            Some(PropertyValue::Color(c)) => Ok(*c),
            Some(PropertyValue::Float(v)) => Ok(Vector3f::new(*v, *v, *v)),
            Some(PropertyValue::Integer(v)) => Ok(Vector3f::new(*v as Float, *v as Float, *v as Float)),
            Some(_) => Err(mismatch(name, "color")),
        }
    }

    pub fn vector_or(&self, name: &str, default: Vector3f) -> Result<Vector3f, ConfigError> {
        match self.values.get(name) {
            None => Ok(default),
            Some(PropertyValue::Vector(v)) => Ok(*v),
            Some(_) => Err(mismatch(name, "vector")),
        }
    }
}

fn mismatch(name: &str, expected: &'static str) -> ConfigError {
    ConfigError::TypeMismatch { name: name.to_string(), expected }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_lookup_with_defaults() {
        let mut props = Properties::new("path");
        props.set("max_depth", PropertyValue::Integer(8));
        props.set("hide_emitters", PropertyValue::Boolean(true));

        assert_eq!(props.integer_or("max_depth", 5), Ok(8));
        assert_eq!(props.integer_or("rr_depth", 5), Ok(5));
        assert_eq!(props.bool_or("hide_emitters", false), Ok(true));
        assert_eq!(props.plugin_type(), "path");
    }

    #[test]
    fn test_type_mismatch_is_reported() {
        let mut props = Properties::new("path");
        props.set("max_depth", PropertyValue::Boolean(true));
        match props.integer_or("max_depth", 5) {
            Err(ConfigError::TypeMismatch { name, expected }) => {
                assert_eq!(name, "max_depth");
                assert_eq!(expected, "integer");
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_string_coercion_and_color_splat() {
        let mut props = Properties::new("diffuse");
        props.set("max_depth", PropertyValue::String("3".to_string()));
        props.set("reflectance", PropertyValue::Float(0.25));
        assert_eq!(props.integer_or("max_depth", 0), Ok(3));
        assert_eq!(props.color_or("reflectance", Vector3f::zeros()), Ok(Vector3f::new(0.25, 0.25, 0.25)));
    }
}
