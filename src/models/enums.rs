//! Shared domain enums with fixed wire labels
//!
//! The labels below are the exact strings written to and read from the record
//! store. Categorical buckets additionally carry a mandated display order
//! that is NOT alphabetical; aggregation relies on it.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ---------------------------------------------------------------------------
// Purpose
// ---------------------------------------------------------------------------

/// Why the equipment was used
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Purpose {
    Trial,
    Analysis,
    Measurement,
    Production,
    Education,
    Other,
}

impl Purpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            Purpose::Trial => "trial",
            Purpose::Analysis => "analysis",
            Purpose::Measurement => "measurement",
            Purpose::Production => "production",
            Purpose::Education => "education",
            Purpose::Other => "other",
        }
    }
}

impl std::fmt::Display for Purpose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ---------------------------------------------------------------------------
// UsageType
// ---------------------------------------------------------------------------

/// Who the usage session served
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum UsageType {
    Internal,
    InternalOtherDept,
    External,
    Indirect,
}

impl UsageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UsageType::Internal => "internal",
            UsageType::InternalOtherDept => "internal-other-dept",
            UsageType::External => "external",
            UsageType::Indirect => "indirect",
        }
    }
}

impl std::fmt::Display for UsageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ProcessCategory
// ---------------------------------------------------------------------------

/// Process classification of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum ProcessCategory {
    UnitProcess,
    ModuleProcess,
    MeasurementAnalysis,
}

impl ProcessCategory {
    /// Mandated display order for process breakdowns
    pub const DISPLAY_ORDER: [&'static str; 3] =
        ["unit-process", "module-process", "measurement-analysis"];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessCategory::UnitProcess => "unit-process",
            ProcessCategory::ModuleProcess => "module-process",
            ProcessCategory::MeasurementAnalysis => "measurement-analysis",
        }
    }
}

impl std::fmt::Display for ProcessCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ---------------------------------------------------------------------------
// CompanySize
// ---------------------------------------------------------------------------

/// Size bucket of the company using the equipment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum CompanySize {
    #[serde(rename = "large")]
    Large,
    #[serde(rename = "SME")]
    Sme,
    #[serde(rename = "school")]
    School,
    #[serde(rename = "research-institute")]
    ResearchInstitute,
    #[serde(rename = "other")]
    Other,
}

impl CompanySize {
    /// Mandated display order for company-size breakdowns
    pub const DISPLAY_ORDER: [&'static str; 5] =
        ["large", "SME", "school", "research-institute", "other"];

    pub fn as_str(&self) -> &'static str {
        match self {
            CompanySize::Large => "large",
            CompanySize::Sme => "SME",
            CompanySize::School => "school",
            CompanySize::ResearchInstitute => "research-institute",
            CompanySize::Other => "other",
        }
    }
}

impl std::fmt::Display for CompanySize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ---------------------------------------------------------------------------
// YesNo
// ---------------------------------------------------------------------------

/// Y/N flag stored as a single letter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum YesNo {
    Y,
    N,
}

impl YesNo {
    pub fn as_str(&self) -> &'static str {
        match self {
            YesNo::Y => "Y",
            YesNo::N => "N",
        }
    }
}

impl From<bool> for YesNo {
    fn from(v: bool) -> Self {
        if v {
            YesNo::Y
        } else {
            YesNo::N
        }
    }
}

impl std::fmt::Display for YesNo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
