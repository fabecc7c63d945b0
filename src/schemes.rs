//! Government schemes a farmer may be eligible for, with the search and
//! filter behind the eligible-schemes page.

use serde::Serialize;

/// Filter value that matches every category or state.
pub const ANY: &str = "all";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Category {
    Subsidy,
    Insurance,
    Credit,
    Support,
    Training,
}

impl Category {
    pub fn label(&self) -> &'static str {
        match self {
            Category::Subsidy => "Subsidy",
            Category::Insurance => "Insurance",
            Category::Credit => "Credit",
            Category::Support => "Support",
            Category::Training => "Training",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Target {
    #[serde(rename = "Small & Marginal")]
    SmallAndMarginal,
    #[serde(rename = "All Farmers")]
    AllFarmers,
    #[serde(rename = "Women Farmers")]
    WomenFarmers,
    Youth,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Scheme {
    pub id: &'static str,
    pub name: &'static str,
    pub ministry: &'static str,
    pub category: Category,
    pub target: Target,
    pub benefits: &'static [&'static str],
    pub eligibility: &'static [&'static str],
    /// Only set for state-run schemes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<&'static str>,
    pub link: &'static str,
}

pub const SCHEMES: &[Scheme] = &[
    Scheme {
        id: "pm-kisan",
        name: "PM-KISAN",
        ministry: "Ministry of Agriculture & Farmers Welfare",
        category: Category::Support,
        target: Target::AllFarmers,
        benefits: &[
            "Direct income support of ₹6,000/year in three installments",
            "DBT to farmer bank accounts",
        ],
        eligibility: &[
            "Valid landholding records",
            "Active bank account linked with Aadhaar",
        ],
        state: None,
        link: "https://pmkisan.gov.in/RegistrationFormNew.aspx",
    },
    Scheme {
        id: "pmfby",
        name: "Pradhan Mantri Fasal Bima Yojana (PMFBY)",
        ministry: "Ministry of Agriculture & Farmers Welfare",
        category: Category::Insurance,
        target: Target::AllFarmers,
        benefits: &[
            "Low premium crop insurance",
            "Coverage for prevented sowing, post-harvest losses",
        ],
        eligibility: &[
            "Cultivating notified crops in notified areas",
            "Insured within enrollment window",
        ],
        state: None,
        link: "https://pmfby.gov.in/",
    },
    Scheme {
        id: "kcc",
        name: "Kisan Credit Card (KCC)",
        ministry: "Department of Financial Services",
        category: Category::Credit,
        target: Target::AllFarmers,
        benefits: &[
            "Short-term credit for cultivation needs",
            "Interest subvention for timely repayment",
        ],
        eligibility: &["Active cultivator/tenant farmer", "KYC and land details"],
        state: None,
        link: "https://www.mygov.in/campaigns/kcc/",
    },
    Scheme {
        id: "smam",
        name: "Sub-Mission on Agricultural Mechanization (SMAM)",
        ministry: "Ministry of Agriculture & Farmers Welfare",
        category: Category::Subsidy,
        target: Target::SmallAndMarginal,
        benefits: &[
            "40%-80% subsidy on farm machinery",
            "Custom hiring center support",
        ],
        eligibility: &[
            "Small & marginal farmer status",
            "Purchase of eligible machinery",
        ],
        state: None,
        link: "https://agrimachinery.nic.in/",
    },
    Scheme {
        id: "pmksy",
        name: "Pradhan Mantri Krishi Sinchai Yojana (PMKSY) - Micro Irrigation",
        ministry: "Ministry of Jal Shakti & MoA&FW",
        category: Category::Subsidy,
        target: Target::SmallAndMarginal,
        benefits: &[
            "Subsidy for drip and sprinkler irrigation",
            "Improved water use efficiency",
        ],
        eligibility: &[
            "Farmers adopting micro-irrigation systems",
            "As per state guidelines",
        ],
        state: None,
        link: "https://pmksy.gov.in/",
    },
];

impl Scheme {
    /// Case-insensitive match of `query` against the name or any benefit.
    /// An empty query matches everything.
    pub fn matches_query(&self, query: &str) -> bool {
        if query.is_empty() {
            return true;
        }
        let query = query.to_lowercase();
        self.name.to_lowercase().contains(&query)
            || self.benefits.join(" ").to_lowercase().contains(&query)
    }

    pub fn matches_category(&self, category: &str) -> bool {
        category == ANY || self.category.label().eq_ignore_ascii_case(category)
    }

    /// A nationwide scheme has no state and only matches [`ANY`].
    pub fn matches_state(&self, state: &str) -> bool {
        state == ANY
            || self
                .state
                .is_some_and(|s| s.to_lowercase() == state.to_lowercase())
    }
}

/// Schemes from `schemes` passing all three filters, in catalogue order.
pub fn filter_schemes<'a>(
    schemes: &'a [Scheme],
    query: &str,
    category: &str,
    state: &str,
) -> Vec<&'a Scheme> {
    schemes
        .iter()
        .filter(|s| s.matches_query(query) && s.matches_category(category) && s.matches_state(state))
        .collect()
}

/// Filter the built-in catalogue.
pub fn filter(query: &str, category: &str, state: &str) -> Vec<&'static Scheme> {
    filter_schemes(SCHEMES, query, category, state)
}
