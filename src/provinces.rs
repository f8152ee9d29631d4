// Canonical province enumeration shared by every grouping function.
use once_cell::sync::Lazy;
use std::collections::HashSet;

pub const PROVINCES: [&str; 9] = [
    "Eastern Cape",
    "Free State",
    "Gauteng",
    "KwaZulu-Natal",
    "Limpopo",
    "Mpumalanga",
    "North West",
    "Northern Cape",
    "Western Cape",
];

static PROVINCE_SET: Lazy<HashSet<&'static str>> = Lazy::new(|| PROVINCES.iter().copied().collect());

pub const SPHERE_PROVINCIAL: &str = "provincial";
pub const SPHERE_NATIONAL: &str = "national";

pub fn is_canonical_province(name: &str) -> bool {
    PROVINCE_SET.contains(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_list_has_nine_unique_names() {
        assert_eq!(PROVINCE_SET.len(), 9);
        assert!(is_canonical_province("KwaZulu-Natal"));
        assert!(!is_canonical_province("kwazulu-natal"));
        assert!(!is_canonical_province("Gauteng "));
    }
}
