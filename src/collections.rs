//! Registry of every document collection the API serves.
//!
//! Each collection knows its storage id, its route segment, the key that
//! ties it to a parent, and the field rules the observer pipeline enforces.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    CompanyProfiles,
    CompanyContacts,
    CompanyFinancials,
    CompanyOperations,
    Projects,
    ProjectCompliance,
    ProjectFinancials,
    ProjectProduction,
    ProjectVerification,
    Subsidies,
    InsurancePolicies,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
}

/// A field that must be present when a document is created.
/// Dotted names reach into nested objects (`incentiveDetails.amount`).
#[derive(Debug, Clone, Copy)]
pub struct RequiredField {
    pub name: &'static str,
    pub kind: FieldKind,
}

/// Inclusive numeric range checked whenever the field is present
#[derive(Debug, Clone, Copy)]
pub struct NumericBound {
    pub field: &'static str,
    pub min: f64,
    pub max: Option<f64>,
}

macro_rules! text {
    ($name:literal) => {
        RequiredField { name: $name, kind: FieldKind::Text }
    };
}

macro_rules! number {
    ($name:literal) => {
        RequiredField { name: $name, kind: FieldKind::Number }
    };
}

macro_rules! non_negative {
    ($field:literal) => {
        NumericBound { field: $field, min: 0.0, max: None }
    };
}

macro_rules! percentage {
    ($field:literal) => {
        NumericBound { field: $field, min: 0.0, max: Some(100.0) }
    };
}

impl Collection {
    pub const ALL: [Collection; 11] = [
        Collection::CompanyProfiles,
        Collection::CompanyContacts,
        Collection::CompanyFinancials,
        Collection::CompanyOperations,
        Collection::Projects,
        Collection::ProjectCompliance,
        Collection::ProjectFinancials,
        Collection::ProjectProduction,
        Collection::ProjectVerification,
        Collection::Subsidies,
        Collection::InsurancePolicies,
    ];

    /// Collection id in the document store
    pub fn id(&self) -> &'static str {
        match self {
            Collection::CompanyProfiles => "company_profiles",
            Collection::CompanyContacts => "company_contacts",
            Collection::CompanyFinancials => "company_financials",
            Collection::CompanyOperations => "company_operations",
            Collection::Projects => "projects",
            Collection::ProjectCompliance => "project_compliance",
            Collection::ProjectFinancials => "project_financials",
            Collection::ProjectProduction => "project_production",
            Collection::ProjectVerification => "project_verification",
            Collection::Subsidies => "subsidies",
            Collection::InsurancePolicies => "insurance_policies",
        }
    }

    /// Path segment under `/api`
    pub fn route(&self) -> &'static str {
        match self {
            Collection::CompanyProfiles => "company-profiles",
            Collection::CompanyContacts => "company-contacts",
            Collection::CompanyFinancials => "company-financials",
            Collection::CompanyOperations => "company-operations",
            Collection::Projects => "projects",
            Collection::ProjectCompliance => "project-compliance",
            Collection::ProjectFinancials => "project-financials",
            Collection::ProjectProduction => "project-production",
            Collection::ProjectVerification => "project-verification",
            Collection::Subsidies => "subsidies",
            Collection::InsurancePolicies => "insurance",
        }
    }

    /// Human label used in response messages
    pub fn label(&self) -> &'static str {
        match self {
            Collection::CompanyProfiles => "Company profile",
            Collection::CompanyContacts => "Company contacts",
            Collection::CompanyFinancials => "Company financials",
            Collection::CompanyOperations => "Company operations",
            Collection::Projects => "Project",
            Collection::ProjectCompliance => "Project compliance",
            Collection::ProjectFinancials => "Project financials",
            Collection::ProjectProduction => "Project production",
            Collection::ProjectVerification => "Project verification",
            Collection::Subsidies => "Subsidy",
            Collection::InsurancePolicies => "Insurance policy",
        }
    }

    pub fn from_route(route: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.route() == route)
    }

    /// Field holding the owning document's id
    pub fn parent_key(&self) -> Option<&'static str> {
        match self {
            Collection::CompanyContacts
            | Collection::CompanyFinancials
            | Collection::CompanyOperations
            | Collection::Projects => Some("companyId"),
            Collection::ProjectCompliance
            | Collection::ProjectFinancials
            | Collection::ProjectProduction
            | Collection::ProjectVerification => Some("projectId"),
            _ => None,
        }
    }

    /// Field children of this collection use to point back at it
    pub fn link_key(&self) -> Option<&'static str> {
        match self {
            Collection::CompanyProfiles => Some("companyId"),
            Collection::Projects => Some("projectId"),
            _ => None,
        }
    }

    /// Field whose value may appear on at most one document (checked, not constrained)
    pub fn unique_key(&self) -> Option<&'static str> {
        match self {
            Collection::CompanyProfiles => Some("userId"),
            Collection::Projects | Collection::Subsidies | Collection::InsurancePolicies => None,
            other => other.parent_key(),
        }
    }

    /// Collections removed together with a document of this collection
    pub fn children(&self) -> &'static [Collection] {
        match self {
            Collection::CompanyProfiles => &[
                Collection::CompanyContacts,
                Collection::CompanyFinancials,
                Collection::CompanyOperations,
                Collection::Projects,
            ],
            Collection::Projects => &[
                Collection::ProjectCompliance,
                Collection::ProjectFinancials,
                Collection::ProjectProduction,
                Collection::ProjectVerification,
            ],
            _ => &[],
        }
    }

    pub fn required_fields(&self) -> &'static [RequiredField] {
        match self {
            Collection::CompanyProfiles => &[text!("userId"), text!("company_name")],
            Collection::CompanyContacts
            | Collection::CompanyFinancials
            | Collection::CompanyOperations => &[text!("companyId")],
            Collection::Projects => &[text!("companyId"), text!("project_name")],
            Collection::ProjectCompliance
            | Collection::ProjectFinancials
            | Collection::ProjectProduction
            | Collection::ProjectVerification => &[text!("projectId")],
            Collection::Subsidies => &[
                text!("name"),
                text!("country"),
                text!("programType"),
                text!("status"),
                text!("incentiveDetails.type"),
                number!("incentiveDetails.amount"),
                text!("incentiveDetails.currency"),
            ],
            Collection::InsurancePolicies => &[text!("policy_name"), text!("policy_type")],
        }
    }

    pub fn numeric_bounds(&self) -> &'static [NumericBound] {
        match self {
            Collection::CompanyFinancials => &[
                non_negative!("annual_revenue"),
                non_negative!("net_worth"),
                non_negative!("total_assets"),
                non_negative!("total_liabilities"),
            ],
            Collection::CompanyOperations => &[
                non_negative!("employees"),
                non_negative!("years_in_operation"),
                non_negative!("completed_projects"),
                percentage!("past_project_success_rate"),
            ],
            Collection::Projects => &[non_negative!("start_year"), non_negative!("completion_year")],
            Collection::ProjectFinancials => &[
                non_negative!("capex"),
                non_negative!("opex"),
                non_negative!("expected_revenue"),
                non_negative!("funding_requested"),
            ],
            Collection::ProjectProduction => &[
                non_negative!("installed_capacity_mw"),
                non_negative!("hydrogen_output_tpy"),
                non_negative!("carbon_intensity"),
                percentage!("electrolyzer_efficiency"),
            ],
            Collection::ProjectVerification => &[percentage!("verification_score")],
            Collection::Subsidies => &[non_negative!("incentiveDetails.amount")],
            Collection::InsurancePolicies => &[non_negative!("coverage_amount"), non_negative!("premium")],
            _ => &[],
        }
    }

    /// Nested objects stored as JSON strings and parsed back on read
    pub fn encoded_fields(&self) -> &'static [&'static str] {
        match self {
            Collection::Subsidies => &[
                "incentiveDetails",
                "eligibility",
                "applicationProcess",
                "resourceLinks",
            ],
            _ => &[],
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Turn a field name into message text: `annual_revenue` -> `Annual revenue`,
/// `companyId` -> `Company ID`, `incentiveDetails.type` -> `Incentive details type`.
pub fn humanize(field: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    for part in field.split(|c| c == '_' || c == '.') {
        let mut current = String::new();
        for ch in part.chars() {
            if ch.is_uppercase() && !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            current.push(ch.to_ascii_lowercase());
        }
        if !current.is_empty() {
            words.push(current);
        }
    }

    let words: Vec<String> = words
        .into_iter()
        .map(|w| if w == "id" { "ID".to_string() } else { w })
        .collect();

    let mut text = words.join(" ");
    if let Some(first) = text.get(0..1) {
        let upper = first.to_uppercase();
        text.replace_range(0..1, &upper);
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes_round_trip() {
        for collection in Collection::ALL {
            assert_eq!(Collection::from_route(collection.route()), Some(collection));
        }
        assert_eq!(Collection::from_route("company-complete"), None);
    }

    #[test]
    fn one_child_per_parent_collections() {
        assert_eq!(Collection::CompanyFinancials.unique_key(), Some("companyId"));
        assert_eq!(Collection::ProjectVerification.unique_key(), Some("projectId"));
        assert_eq!(Collection::CompanyProfiles.unique_key(), Some("userId"));
        assert_eq!(Collection::Projects.unique_key(), None);
    }

    #[test]
    fn children_point_back_with_link_key() {
        for parent in [Collection::CompanyProfiles, Collection::Projects] {
            let link = parent.link_key().unwrap();
            for child in parent.children() {
                assert_eq!(child.parent_key(), Some(link), "{} -> {}", parent, child);
            }
        }
    }

    #[test]
    fn validation_tables_are_static() {
        let required: &'static [RequiredField] = Collection::Subsidies.required_fields();
        assert_eq!(required.len(), 7);
        assert!(required.iter().any(|f| f.name == "incentiveDetails.amount" && f.kind == FieldKind::Number));

        let bounds: &'static [NumericBound] = Collection::CompanyOperations.numeric_bounds();
        let rate = bounds.iter().find(|b| b.field == "past_project_success_rate").unwrap();
        assert_eq!(rate.max, Some(100.0));

        for collection in Collection::ALL {
            assert!(!collection.required_fields().is_empty(), "{}", collection);
        }
        assert!(Collection::CompanyProfiles.numeric_bounds().is_empty());
    }

    #[test]
    fn humanizes_field_names() {
        assert_eq!(humanize("annual_revenue"), "Annual revenue");
        assert_eq!(humanize("companyId"), "Company ID");
        assert_eq!(humanize("incentiveDetails.type"), "Incentive details type");
        assert_eq!(humanize("past_project_success_rate"), "Past project success rate");
    }
}
