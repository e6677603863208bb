//! Fixed mapping from employee category to the positions it may hold.

use super::EmployeeCategory;

const SKILLED: &[&str] = &[
    "Electrician",
    "Plumber",
    "Carpenter",
    "Mason",
    "Welder",
    "Heavy Equipment Operator",
    "HVAC Technician",
    "Painter",
    "Roofer",
    "Steel Worker",
];

const UNSKILLED: &[&str] = &[
    "General Laborer",
    "Construction Helper",
    "Site Cleaner",
    "Material Handler",
    "Demolition Worker",
];

const SUPERVISOR: &[&str] = &[
    "Site Supervisor",
    "Project Manager",
    "Foreman",
    "Safety Officer",
    "Quality Control Inspector",
];

const SPECIALIST: &[&str] = &[
    "Architect",
    "Civil Engineer",
    "Structural Engineer",
    "Surveyor",
    "Environmental Specialist",
    "Safety Specialist",
];

#[must_use]
pub const fn positions_for(category: EmployeeCategory) -> &'static [&'static str] {
    match category {
        EmployeeCategory::Skilled => SKILLED,
        EmployeeCategory::Unskilled => UNSKILLED,
        EmployeeCategory::Supervisor => SUPERVISOR,
        EmployeeCategory::Specialist => SPECIALIST,
    }
}

#[must_use]
pub fn is_valid_position(category: EmployeeCategory, position: &str) -> bool {
    positions_for(category).contains(&position)
}

/// Returns the category a position belongs to, if any.
#[must_use]
pub fn category_of(position: &str) -> Option<EmployeeCategory> {
    EmployeeCategory::ALL
        .iter()
        .copied()
        .find(|category| is_valid_position(*category, position))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_must_belong_to_its_category() {
        assert!(is_valid_position(EmployeeCategory::Skilled, "Electrician"));
        assert!(!is_valid_position(EmployeeCategory::Unskilled, "Electrician"));
        assert!(!is_valid_position(EmployeeCategory::Skilled, "electrician"));
    }

    #[test]
    fn every_position_maps_to_exactly_one_category() {
        for category in EmployeeCategory::ALL {
            for position in positions_for(*category) {
                assert_eq!(category_of(position), Some(*category));
            }
        }
        assert_eq!(category_of("Astronaut"), None);
    }
}
