pub mod build_tree;
pub mod check_eligibility;
pub mod generate_fixtures;
pub mod validate_tree;
pub mod verify_proof;
