//! Destination-country normalization.
//!
//! Queries arrive with whatever the exporter typed ("USA", "United States",
//! "us"). Everything downstream keys on ISO 3166-1 alpha-2, so normalization
//! happens once, at query validation.

/// Map a user-supplied country name or code to ISO 3166-1 alpha-2.
///
/// Matching is case-insensitive and tolerant of the common long forms for
/// the markets the rule table covers. Returns `None` for anything
/// unrecognized; validation turns that into a rejection rather than letting
/// an unkeyed country silently fall through every rule.
pub fn normalize_country(input: &str) -> Option<&'static str> {
    let needle = input.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }

    let iso = match needle.as_str() {
        "us" | "usa" | "united states" | "united states of america" | "america" => "US",
        "gb" | "uk" | "united kingdom" | "great britain" | "england" => "GB",
        "de" | "germany" | "deutschland" => "DE",
        "fr" | "france" => "FR",
        "it" | "italy" => "IT",
        "es" | "spain" => "ES",
        "nl" | "netherlands" | "holland" => "NL",
        "ae" | "uae" | "united arab emirates" | "dubai" => "AE",
        "sa" | "saudi arabia" | "ksa" => "SA",
        "au" | "australia" => "AU",
        "ca" | "canada" => "CA",
        "jp" | "japan" => "JP",
        "sg" | "singapore" => "SG",
        "cn" | "china" => "CN",
        "bd" | "bangladesh" => "BD",
        "lk" | "sri lanka" => "LK",
        "np" | "nepal" => "NP",
        "ke" | "kenya" => "KE",
        "ng" | "nigeria" => "NG",
        "za" | "south africa" => "ZA",
        "br" | "brazil" => "BR",
        "mx" | "mexico" => "MX",
        "ru" | "russia" => "RU",
        "kr" | "south korea" | "korea" => "KR",
        "in" | "india" => "IN",
        _ => return None,
    };
    Some(iso)
}

/// Countries inside the EU single market, where CE marking applies.
pub fn is_eu_market(iso: &str) -> bool {
    matches!(iso, "DE" | "FR" | "IT" | "ES" | "NL")
}

/// Human-readable name for an ISO code, for rendering.
pub fn display_name(iso: &str) -> &str {
    match iso {
        "US" => "United States",
        "GB" => "United Kingdom",
        "DE" => "Germany",
        "FR" => "France",
        "IT" => "Italy",
        "ES" => "Spain",
        "NL" => "Netherlands",
        "AE" => "United Arab Emirates",
        "SA" => "Saudi Arabia",
        "AU" => "Australia",
        "CA" => "Canada",
        "JP" => "Japan",
        "SG" => "Singapore",
        "CN" => "China",
        "BD" => "Bangladesh",
        "LK" => "Sri Lanka",
        "NP" => "Nepal",
        "KE" => "Kenya",
        "NG" => "Nigeria",
        "ZA" => "South Africa",
        "BR" => "Brazil",
        "MX" => "Mexico",
        "RU" => "Russia",
        "KR" => "South Korea",
        "IN" => "India",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_forms_normalize() {
        assert_eq!(normalize_country("United States"), Some("US"));
        assert_eq!(normalize_country("united kingdom"), Some("GB"));
        assert_eq!(normalize_country("GERMANY"), Some("DE"));
    }

    #[test]
    fn iso_codes_pass_through() {
        assert_eq!(normalize_country("us"), Some("US"));
        assert_eq!(normalize_country("DE"), Some("DE"));
    }

    #[test]
    fn colloquial_names_normalize() {
        assert_eq!(normalize_country("UK"), Some("GB"));
        assert_eq!(normalize_country("Dubai"), Some("AE"));
        assert_eq!(normalize_country("Holland"), Some("NL"));
    }

    #[test]
    fn unknown_returns_none() {
        assert_eq!(normalize_country("Atlantis"), None);
        assert_eq!(normalize_country(""), None);
        assert_eq!(normalize_country("   "), None);
    }

    #[test]
    fn eu_membership() {
        assert!(is_eu_market("DE"));
        assert!(is_eu_market("FR"));
        assert!(!is_eu_market("GB"));
        assert!(!is_eu_market("US"));
    }

    #[test]
    fn display_names_round_trip() {
        assert_eq!(display_name("US"), "United States");
        assert_eq!(normalize_country(display_name("DE")), Some("DE"));
    }
}
