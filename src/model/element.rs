use serde::Serialize;

/// Handle to a single entity of the building model.
///
/// Carries identity plus the positional attributes the extractors read
/// directly from the entity (everything else comes from property sets).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Element {
    pub id: u64,
    pub ifc_type: String,
    pub global_id: String,
    pub name: Option<String>,
    pub long_name: Option<String>,
    pub predefined_type: Option<String>,
    pub overall_width: Option<f64>,
    pub overall_height: Option<f64>,
}

impl Element {
    #[must_use]
    pub fn new(id: u64, ifc_type: &str) -> Self {
        Self {
            id,
            ifc_type: ifc_type.to_ascii_uppercase(),
            global_id: String::new(),
            name: None,
            long_name: None,
            predefined_type: None,
            overall_width: None,
            overall_height: None,
        }
    }

    #[must_use]
    pub fn with_global_id(mut self, global_id: &str) -> Self {
        self.global_id = global_id.to_string();
        self
    }

    #[must_use]
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    #[must_use]
    pub fn with_long_name(mut self, long_name: &str) -> Self {
        self.long_name = Some(long_name.to_string());
        self
    }

    #[must_use]
    pub fn with_predefined_type(mut self, predefined_type: &str) -> Self {
        self.predefined_type = Some(predefined_type.to_string());
        self
    }

    #[must_use]
    pub fn with_overall_size(mut self, width: Option<f64>, height: Option<f64>) -> Self {
        self.overall_width = width;
        self.overall_height = height;
        self
    }

    /// Exact, case-insensitive entity type comparison (no subtypes).
    #[must_use]
    pub fn is_a(&self, ifc_type: &str) -> bool {
        self.ifc_type.eq_ignore_ascii_case(ifc_type)
    }
}
