//! Reference data kept on the backend: glass types, massifs, thresholds
//! and casing ranges. All four share the same REST shape.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::dimensions::CasingRange;

/// A reference entity with a uniform list/create/retrieve/update/delete
/// endpoint at `PATH`.
pub trait Resource: Serialize + DeserializeOwned {
    const PATH: &'static str;
    const LABEL: &'static str;

    fn id(&self) -> Option<u64>;
    fn display_name(&self) -> String;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlassType {
    #[serde(default, skip_serializing_if = "is_unsaved")]
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Massif {
    #[serde(default, skip_serializing_if = "is_unsaved")]
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Threshold {
    #[serde(default, skip_serializing_if = "is_unsaved")]
    pub id: u64,
    pub name: String,
}

fn is_unsaved(id: &u64) -> bool {
    *id == 0
}

impl Resource for GlassType {
    const PATH: &'static str = "glass-types";
    const LABEL: &'static str = "glass type";

    fn id(&self) -> Option<u64> {
        Some(self.id).filter(|id| *id != 0)
    }

    fn display_name(&self) -> String {
        self.name.clone()
    }
}

impl Resource for Massif {
    const PATH: &'static str = "massifs";
    const LABEL: &'static str = "massif";

    fn id(&self) -> Option<u64> {
        Some(self.id).filter(|id| *id != 0)
    }

    fn display_name(&self) -> String {
        self.name.clone()
    }
}

impl Resource for Threshold {
    const PATH: &'static str = "thresholds";
    const LABEL: &'static str = "threshold";

    fn id(&self) -> Option<u64> {
        Some(self.id).filter(|id| *id != 0)
    }

    fn display_name(&self) -> String {
        self.name.clone()
    }
}

impl Resource for CasingRange {
    const PATH: &'static str = "casing-ranges";
    const LABEL: &'static str = "casing range";

    fn id(&self) -> Option<u64> {
        Some(self.id).filter(|id| *id != 0)
    }

    fn display_name(&self) -> String {
        format!(
            "{}-{} -> {}",
            self.min_size, self.max_size, self.casing_size
        )
    }
}

/// List responses come either bare or wrapped in a paginated envelope.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Listing<T> {
    Page { results: Vec<T> },
    Plain(Vec<T>),
}

impl<T> Listing<T> {
    pub fn into_items(self) -> Vec<T> {
        match self {
            Listing::Page { results } => results,
            Listing::Plain(items) => items,
        }
    }
}
