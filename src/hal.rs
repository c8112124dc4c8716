//! HAL `_links` lookup on API responses.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Result;
use crate::error::IbercheckError;

/// A link object from a HAL `_links` map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HalLink {
    pub href: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub templated: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
}

/// Returns `true` if `model` links `relation`.
pub fn has_link(model: &Value, relation: &str) -> bool {
    model
        .get("_links")
        .and_then(Value::as_object)
        .is_some_and(|links| links.contains_key(relation))
}

/// Returns the link for `relation`.
///
/// # Errors
///
/// Returns [`IbercheckError::MissingLink`] if the relation is absent (guard
/// with [`has_link`]), or [`IbercheckError::Json`] if it is not a link object.
pub fn get_link(model: &Value, relation: &str) -> Result<HalLink> {
    if !has_link(model, relation) {
        return Err(IbercheckError::MissingLink(relation.to_string()));
    }

    let link = HalLink::deserialize(&model["_links"][relation])?;
    Ok(link)
}
