//! Recipe model and JSON loading.
//!
//! Input is parsed into a [`serde_json::Value`] first and then walked by
//! hand, so every rejection can name the exact JSON path that is wrong
//! (`title`, `components[2].name`, `components[0].ingredients[3]`, ...).

use std::fs;
use std::path::Path;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{RecipeError, Result};

/// Rule length used when the record does not set `line_length`.
pub const DEFAULT_LINE_LENGTH: f32 = 420.0;

/// A complete recipe: title, version tag and ordered components.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recipe {
    pub title: String,
    pub version: String,
    /// Length in points of the rules drawn around each component heading.
    pub line_length: f32,
    pub components: Vec<Component>,
}

/// A named section of a recipe.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Component {
    pub name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub equipment: Vec<String>,
    pub ingredients: Vec<Ingredient>,
    pub instructions: Vec<String>,
}

/// One ingredient row. Both fields are display strings; quantities are never
/// interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "[String; 2]")]
pub struct Ingredient {
    pub label: String,
    pub quantity: String,
}

impl From<Ingredient> for [String; 2] {
    fn from(i: Ingredient) -> Self {
        [i.label, i.quantity]
    }
}

impl Ingredient {
    pub fn new(label: impl Into<String>, quantity: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            quantity: quantity.into(),
        }
    }
}

impl Component {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            equipment: Vec::new(),
            ingredients: Vec::new(),
            instructions: Vec::new(),
        }
    }

    pub fn with_ingredient(mut self, label: impl Into<String>, quantity: impl Into<String>) -> Self {
        self.ingredients.push(Ingredient::new(label, quantity));
        self
    }

    pub fn with_step(mut self, step: impl Into<String>) -> Self {
        self.instructions.push(step.into());
        self
    }

    pub fn with_equipment(mut self, item: impl Into<String>) -> Self {
        self.equipment.push(item.into());
        self
    }
}

impl Recipe {
    /// Build a recipe in code. Runs the same checks as JSON loading.
    pub fn new(
        title: impl Into<String>,
        version: impl Into<String>,
        components: Vec<Component>,
    ) -> Result<Self> {
        let recipe = Self {
            title: title.into(),
            version: version.into(),
            line_length: DEFAULT_LINE_LENGTH,
            components,
        };
        recipe.validate()?;
        Ok(recipe)
    }

    /// Check the invariants that hold for every renderable recipe.
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(RecipeError::validation("title", "must not be empty"));
        }
        if !(self.line_length.is_finite() && self.line_length > 0.0) {
            return Err(RecipeError::validation("line_length", "must be a positive number"));
        }
        for (i, c) in self.components.iter().enumerate() {
            if c.name.trim().is_empty() {
                return Err(RecipeError::validation(
                    format!("components[{i}].name"),
                    "must not be empty",
                ));
            }
        }
        Ok(())
    }

    /// Read and validate a recipe file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| RecipeError::io(path, e))?;
        log::debug!("read {} bytes from '{}'", text.len(), path.display());
        Self::from_json(&text)
    }

    /// Parse and validate a recipe from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(&value)
    }

    /// Validate an already-parsed JSON document.
    pub fn from_value(value: &Value) -> Result<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| RecipeError::validation("$", "top level must be an object"))?;

        let title = match obj.get("title") {
            None | Some(Value::Null) => {
                return Err(RecipeError::validation("title", "is required"));
            }
            Some(v) => expect_str(v, "title")?.to_string(),
        };

        let version = match obj.get("version") {
            None | Some(Value::Null) => {
                log::warn!("recipe has no `version`; footer will be blank");
                String::new()
            }
            Some(v) => expect_str(v, "version")?.to_string(),
        };

        let line_length = match obj.get("line_length") {
            None | Some(Value::Null) => DEFAULT_LINE_LENGTH,
            Some(v) => v
                .as_f64()
                .map(|n| n as f32)
                .ok_or_else(|| RecipeError::validation("line_length", "must be a number"))?,
        };

        let components = match obj.get("components") {
            Some(Value::Array(items)) => items
                .iter()
                .enumerate()
                .map(|(i, c)| parse_component(c, i))
                .collect::<Result<Vec<_>>>()?,
            Some(_) => return Err(RecipeError::validation("components", "must be an array")),
            None => return Err(RecipeError::validation("components", "is required")),
        };

        let recipe = Self {
            title,
            version,
            line_length,
            components,
        };
        recipe.validate()?;
        log::debug!(
            "loaded recipe '{}' with {} component(s)",
            recipe.title,
            recipe.components.len()
        );
        Ok(recipe)
    }

    /// Serialise back to the input JSON shape.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

fn parse_component(value: &Value, idx: usize) -> Result<Component> {
    let path = format!("components[{idx}]");
    let obj = value
        .as_object()
        .ok_or_else(|| RecipeError::validation(&path, "must be an object"))?;

    let name = match obj.get("name") {
        None | Some(Value::Null) => {
            return Err(RecipeError::validation(format!("{path}.name"), "is required"));
        }
        Some(v) => expect_str(v, &format!("{path}.name"))?.to_string(),
    };

    let ingredients = rows(obj, &path, "ingredients", 2)?
        .into_iter()
        .map(|mut row| {
            let quantity = row.pop().unwrap_or_default();
            let label = row.pop().unwrap_or_default();
            Ingredient { label, quantity }
        })
        .collect();

    let equipment = rows(obj, &path, "equipment", 1)?
        .into_iter()
        .flatten()
        .collect();

    let instructions = match obj.get("instructions") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(steps)) => steps
            .iter()
            .enumerate()
            .map(|(j, s)| expect_str(s, &format!("{path}.instructions[{j}]")).map(str::to_string))
            .collect::<Result<Vec<_>>>()?,
        Some(_) => {
            return Err(RecipeError::validation(
                format!("{path}.instructions"),
                "must be an array of strings",
            ));
        }
    };

    Ok(Component {
        name,
        equipment,
        ingredients,
        instructions,
    })
}

/// Read an optional array of fixed-width string rows. Absent means empty.
fn rows(obj: &Map<String, Value>, path: &str, key: &str, width: usize) -> Result<Vec<Vec<String>>> {
    let field = format!("{path}.{key}");
    let shape = if width == 1 {
        "must be a list of single-item rows, e.g. [[\"Quarter-sheet pan\"]]".to_string()
    } else {
        format!("must be a list of {width}-item string rows")
    };

    let items = match obj.get(key) {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(items)) => items,
        Some(_) => return Err(RecipeError::validation(field, shape)),
    };

    items
        .iter()
        .enumerate()
        .map(|(j, row)| {
            let cells = match row.as_array() {
                Some(cells) if cells.len() == width => cells,
                _ => return Err(RecipeError::validation(format!("{field}[{j}]"), shape.clone())),
            };
            cells
                .iter()
                .enumerate()
                .map(|(k, cell)| expect_str(cell, &format!("{field}[{j}][{k}]")).map(str::to_string))
                .collect::<Result<Vec<_>>>()
        })
        .collect()
}

fn expect_str<'a>(value: &'a Value, field: &str) -> Result<&'a str> {
    value
        .as_str()
        .ok_or_else(|| RecipeError::validation(field, "must be a string"))
}
