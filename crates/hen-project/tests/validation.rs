use hen_project::schema::*;
use hen_project::{
    ProjectError, ValidationError, case_study_from_def, load_case_yaml, save_case_yaml, validate_case,
};
use std::path::Path;

fn reference_def() -> CaseStudyDef {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../data/two_stream_retrofit.yaml");
    let content = std::fs::read_to_string(path).unwrap();
    serde_yaml::from_str(&content).unwrap()
}

#[test]
fn reference_definition_is_valid() {
    let def = reference_def();
    validate_case(&def).unwrap();
    let case = case_study_from_def(&def).unwrap();
    assert_eq!(case.hot_streams.len(), 2);
    assert_eq!(case.cold_streams.len(), 2);
    assert!(case.cold_streams[1].is_utility());
}

#[test]
fn duplicate_stream_ids_are_rejected() {
    let mut def = reference_def();
    def.streams[1].id = "H1".to_string();
    assert!(matches!(
        validate_case(&def),
        Err(ValidationError::DuplicateId { .. })
    ));
}

#[test]
fn unknown_stream_reference_is_rejected() {
    let mut def = reference_def();
    def.exchangers[0].cold = "C9".to_string();
    assert!(matches!(
        validate_case(&def),
        Err(ValidationError::MissingReference { .. })
    ));

    let mut def = reference_def();
    def.balance_utilities[0].stream = "nowhere".to_string();
    assert!(matches!(
        case_study_from_def(&def),
        Err(ProjectError::Validation(ValidationError::MissingReference { .. }))
    ));
}

#[test]
fn stream_of_wrong_kind_is_rejected() {
    let mut def = reference_def();
    // heating closes a cold stream
    def.balance_utilities[0].stream = "H1".to_string();
    assert!(matches!(
        validate_case(&def),
        Err(ValidationError::InvalidValue { .. })
    ));
}

#[test]
fn list_lengths_follow_operating_cases() {
    let mut def = reference_def();
    def.streams[2].mass_flow.pop();
    assert!(matches!(
        validate_case(&def),
        Err(ValidationError::InvalidValue { .. })
    ));

    let mut def = reference_def();
    def.exchangers[1].stage = 2;
    assert!(validate_case(&def).is_err());
}

#[test]
fn model_checks_run_after_schema_checks() {
    let mut def = reference_def();
    def.economics.depreciation_years = 0.0;
    assert!(matches!(case_study_from_def(&def), Err(ProjectError::Model(_))));
}

#[test]
fn roundtrip_yaml() {
    let def = reference_def();
    let path = std::env::temp_dir().join("hen_project_roundtrip.yaml");
    save_case_yaml(&path, &def).unwrap();
    let saved: CaseStudyDef = serde_yaml::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(saved, def);
    let case = load_case_yaml(&path).unwrap();
    assert_eq!(case.number_exchangers(), 2);
}
