//! Visual templates for missile models.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use skirmish_core::enums::MissileModel;

/// Shape data a renderer needs to draw one missile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissileTemplate {
    pub model: MissileModel,
    pub length: f32,
    pub radius: f32,
    /// True for the generated stand-in used when no template was provided.
    pub placeholder: bool,
}

impl MissileTemplate {
    pub fn placeholder(model: MissileModel) -> Self {
        let (length, radius) = match model {
            MissileModel::Standard => (0.9, 0.12),
            MissileModel::Swarm => (0.55, 0.08),
        };
        Self {
            model,
            length,
            radius,
            placeholder: true,
        }
    }
}

/// Optional template per model. Missing templates fall back to a
/// placeholder and are reported once per model.
#[derive(Debug, Clone, Default)]
pub struct TemplateSlots {
    templates: HashMap<MissileModel, MissileTemplate>,
    warned: HashSet<MissileModel>,
}

impl TemplateSlots {
    pub fn set(&mut self, model: MissileModel, template: Option<MissileTemplate>) {
        match template {
            Some(template) => {
                self.templates.insert(model, template);
                self.warned.remove(&model);
            }
            None => {
                self.templates.remove(&model);
            }
        }
    }

    pub fn resolve(&mut self, model: MissileModel) -> MissileTemplate {
        if let Some(template) = self.templates.get(&model) {
            return template.clone();
        }
        if self.warned.insert(model) {
            log::warn!("no template for {model:?} missiles, using placeholder");
        }
        MissileTemplate::placeholder(model)
    }

    pub fn clear(&mut self) {
        self.templates.clear();
        self.warned.clear();
    }
}
