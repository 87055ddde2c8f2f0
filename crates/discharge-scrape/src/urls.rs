//! Per-category target URL lists. These are public-agency and provider
//! pages whose structure is known well enough to curate a record for, not
//! general-purpose scrape targets (§4.3).

pub const SHELTER_URLS: &[&str] = &[
    "https://www.sf.gov/departments--homelessness-and-supportive-housing",
    "https://hsh.sfgov.org/services/how-to-get-services/accessing-temporary-shelter/adult-temporary-shelter/",
    "https://www.sfhsa.org/services/housing",
    "https://www.sf.gov/get-help-department-homelessness-and-supportive-housing",
];

pub const TRANSPORT_URLS: &[&str] = &[
    "https://www.sfmta.com/getting-around/accessibility/paratransit",
    "https://www.lyft.com/rider/accessible-rides",
    "https://www.uber.com/us/en/ride/how-it-works/accessibility/",
    "https://www.sfmta.com/getting-around/accessibility/paratransit-ramp-taxi",
];

pub const BENEFIT_URLS: &[&str] = &[
    "https://www.coveredca.com/health/medi-cal/",
    "https://www.sfhsa.org/services/financial-assistance",
    "https://www.getcalfresh.org/en/apply",
    "https://www.ssa.gov/benefits/disability/",
];

pub const RESOURCE_URLS: &[&str] = &[
    "https://www.sfmfoodbank.org/find-food/",
    "https://zuckerbergsanfranciscogeneral.org/",
    "https://www.sfdph.org/dph/comupg/oprograms/MH/default.asp",
    "https://www.sfhsa.org/services",
];
