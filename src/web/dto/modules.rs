use serde::{Deserialize, Serialize};

use crate::model::entity::{Course, Module, ModuleUpsert};

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct CourseModulesResponse {
    pub course: Course,
    pub modules: Vec<Module>,
}

/// The whole editable module set of one course, submitted as a unit.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct ModuleSetForm {
    pub modules: Vec<ModuleUpsert>,
}

impl ModuleSetForm {
    /// Validates every row before anything is persisted; any message here
    /// means the submission changes no state.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        for (idx, row) in self.modules.iter().enumerate() {
            if !row.delete && row.title.trim().is_empty() {
                errors.push(format!("modules[{idx}].title: this field is required"));
            }
        }
        errors
    }
}
