//! Deterministic Local/OTR/Unknown derivation. No LLM involved.

use jobtable_schema::{JobRow, RouteType};
use regex::Regex;
use std::sync::OnceLock;

const LOCAL_KEYWORDS: &[&str] = &[
    "home daily",
    "daily home time",
    "day cab",
    "local",
    "shuttle driver",
    "bus driver",
    "school bus",
    "paratransit",
    "dump truck",
    "yard driver",
    "yard hostler",
    "ready mix",
    "sanitation",
    "garbage collection",
    "waste",
    "port driver",
    "drayage",
    "container hauling",
    "roll-off",
    "belly dump",
    "student transport",
    "pupil transport",
    "isd",
    "airport shuttle",
    "airport",
    "construction",
    "concrete",
    "mixer",
    "home every night",
    "home nightly",
    "monday-friday",
    "monday through friday",
    "specific daily schedule",
];

const OTR_KEYWORDS: &[&str] = &[
    "otr",
    "over the road",
    "regional",
    "home weekly",
    "home bi-weekly",
    "home every week",
    "home every 2 weeks",
    "home time",
    "lower 48 states",
    "nationwide",
    "coast to coast",
    "mileage pay",
    "cpm",
    "per mile",
    "paid by the mile",
    "team driver",
    "rider policy",
    "pet policy",
    "pets allowed",
    "fridge",
    "inverter",
    "sleeper cab",
    "long haul",
    "cross country",
    "48 states",
    "weeks out",
    "away from home",
    "on the road",
];

const KNOWN_OTR_CARRIERS: &[&str] = &[
    "crst", "stevens", "swift", "prime inc", "jb hunt", "schneider", "werner", "covenant",
    "marten",
];

fn hourly_pay_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\$\d+\.?\d*\s*/\s*hour|\$\d+\.?\d*\s*per\s*hour|\$\d+\.?\d*\s*hr").unwrap()
    })
}

fn mileage_pay_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$\d+\.?\d*\s*cpm|per mile|\$/mile|\$\.\d+\s*per\s*mile").unwrap())
}

fn weekly_pay_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$\d+,?\d*\s*-?\s*\$?\d+,?\d*\s*/?\s*week").unwrap())
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

/// Classifies a job's route type from its (already-normalized) title,
/// description, and company. Priority order matches spec §4.7 exactly;
/// ties resolve to `Unknown`.
pub fn classify_route_type(title: &str, description: &str, company: &str) -> RouteType {
    let combined = format!("{} {}", title, description).to_lowercase();
    let company_lower = company.to_lowercase();
    let title_lower = title.to_lowercase();

    let local_matches = contains_any(&combined, LOCAL_KEYWORDS);
    let otr_matches = contains_any(&combined, OTR_KEYWORDS);

    let pet_rider_match = combined.contains("pet") && combined.contains("rider");
    let team_driver_match = combined.contains("team driver");
    let lower_48_match = combined.contains("lower 48 states");
    let regional_match = combined.contains("regional") && !combined.contains("home daily");
    let long_home_time_match =
        combined.contains("home every 12 days") || combined.contains("out 12 days");
    let known_otr_carrier = KNOWN_OTR_CARRIERS.iter().any(|c| company_lower.contains(c));
    let yard_driver_match = combined.contains("yard driver") || combined.contains("yard hostler");

    let hourly_pay_match = hourly_pay_re().is_match(&combined);
    let mileage_pay_match = mileage_pay_re().is_match(&combined);
    let weekly_pay_match = weekly_pay_re().is_match(&combined);

    let otr_title_match = title_lower.contains("otr") || title_lower.contains("over the road");
    let local_title_match = title_lower.contains("local") && !title_lower.contains("otr");
    let airport_title_match = title_lower.contains("airport") || title_lower.contains("shuttle");

    if otr_title_match {
        return RouteType::Otr;
    }
    if yard_driver_match {
        return RouteType::Local;
    }
    if local_title_match || airport_title_match {
        return RouteType::Local;
    }

    if hourly_pay_match && !otr_matches {
        return RouteType::Local;
    }

    if team_driver_match || lower_48_match || regional_match || long_home_time_match {
        return RouteType::Otr;
    }
    if (mileage_pay_match || weekly_pay_match) && !local_matches {
        return RouteType::Otr;
    }
    if known_otr_carrier && !local_matches {
        return RouteType::Otr;
    }

    if otr_matches || pet_rider_match {
        return if !local_matches {
            RouteType::Otr
        } else {
            RouteType::Unknown
        };
    }
    if local_matches {
        return RouteType::Local;
    }

    RouteType::Unknown
}

/// Sets `ai.route_type` for a single row from its normalized fields.
pub fn derive_route_type(row: &mut JobRow) {
    row.ai.route_type = classify_route_type(&row.norm.title, &row.norm.description, &row.norm.company);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn otr_title_overrides_everything() {
        let route = classify_route_type("OTR CDL Driver", "Home daily, local only", "Acme");
        assert_eq!(route, RouteType::Otr);
    }

    #[test]
    fn local_home_daily_title_is_local() {
        let route = classify_route_type(
            "Local CDL Driver - Home Daily",
            "Drive delivery trucks in the Dallas area. Home every night.",
            "Local Delivery Co",
        );
        assert_eq!(route, RouteType::Local);
    }

    #[test]
    fn lower_48_and_pet_policy_is_otr() {
        let route = classify_route_type(
            "CDL Driver",
            "Long haul driving across lower 48 states. Pet policy available.",
            "Swift Transportation",
        );
        assert_eq!(route, RouteType::Otr);
    }

    #[test]
    fn regional_home_weekly_is_otr() {
        let route = classify_route_type(
            "Regional Driver",
            "Home weekly. Cover 3 state area.",
            "ABC Trucking",
        );
        assert_eq!(route, RouteType::Otr);
    }

    #[test]
    fn yard_driver_is_local_even_with_otr_keywords() {
        let route = classify_route_type(
            "Yard Driver",
            "Shuttle trailers around the yard. Regional freight nearby.",
            "Acme",
        );
        assert_eq!(route, RouteType::Local);
    }

    #[test]
    fn hourly_pay_without_otr_signal_is_local() {
        let route = classify_route_type("CDL Driver", "Pay: $24.00 per hour.", "Acme");
        assert_eq!(route, RouteType::Local);
    }

    #[test]
    fn known_otr_carrier_without_local_signal_is_otr() {
        let route = classify_route_type("CDL Driver", "Join our fleet.", "Schneider National");
        assert_eq!(route, RouteType::Otr);
    }

    #[test]
    fn no_signals_is_unknown() {
        let route = classify_route_type("Driver", "Drive trucks for us.", "Acme");
        assert_eq!(route, RouteType::Unknown);
    }
}
