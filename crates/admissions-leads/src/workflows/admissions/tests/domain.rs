use crate::workflows::admissions::counselors::Counselor;
use crate::workflows::admissions::domain::{
    AcademicScore, AttributeRecord, CurrentGrade, CurriculumType, LeadCategory, ScoreError,
    ScoreKind, TargetGeography,
};

#[test]
fn score_literals_are_kept_as_entered() {
    let score = AcademicScore::gpa(" 10.0 ").expect("valid gpa");
    assert_eq!(score.kind(), ScoreKind::Gpa);
    assert_eq!(score.literal().as_str(), "10.0");
    assert!(!score.is_spam_sentinel());
    assert!(AcademicScore::gpa("10").expect("valid gpa").is_spam_sentinel());
}

#[test]
fn rejects_non_decimal_and_out_of_range_scores() {
    assert!(matches!(
        AcademicScore::gpa("8,5"),
        Err(ScoreError::NotDecimal { .. })
    ));
    assert!(matches!(
        AcademicScore::percentage("1e2"),
        Err(ScoreError::NotDecimal { .. })
    ));
    assert!(matches!(
        AcademicScore::gpa("10.5"),
        Err(ScoreError::OutOfRange { .. })
    ));
    assert!(matches!(
        AcademicScore::percentage("0"),
        Err(ScoreError::OutOfRange { .. })
    ));
}

#[test]
fn column_resolution_handles_blank_and_ambiguous_scores() {
    assert_eq!(AcademicScore::from_columns(None, Some("  ")), Ok(None));
    assert_eq!(AcademicScore::from_columns(Some("10"), Some("100")), Ok(None));
    assert_eq!(
        AcademicScore::from_columns(None, Some("100"))
            .expect("valid")
            .map(|score| score.is_spam_sentinel()),
        Some(true)
    );
}

#[test]
fn attribute_record_json_accepts_text_or_numeric_scores() {
    let record: AttributeRecord = serde_json::from_value(serde_json::json!({
        "form_filler_type": "parent",
        "current_grade": "grade11",
        "curriculum_type": "State_Boards",
        "scholarship_requirement": "partial",
        "target_geographies": ["rest_of_world", "UK"],
        "academic_score": { "kind": "percentage", "value": 99 }
    }))
    .expect("record deserializes");

    assert_eq!(record.current_grade, CurrentGrade::Grade11);
    assert_eq!(record.curriculum_type, CurriculumType::StateBoards);
    assert!(record.targets(TargetGeography::RestOfWorld));
    assert!(!record.targets(TargetGeography::Us));
    assert!(record.targets_outside_us());
    assert!(!record.is_spam());
    assert_eq!(record.contact.full_name, "");
}

#[test]
fn labels_parse_case_insensitively() {
    assert_eq!("ib".parse::<CurriculumType>(), Ok(CurriculumType::Ib));
    assert_eq!("Grade7_Or_Below".parse::<CurrentGrade>(), Ok(CurrentGrade::Grade7OrBelow));
    let error = "grade13".parse::<CurrentGrade>().expect_err("unknown grade");
    assert_eq!(error.field, "current_grade");
}

#[test]
fn unknown_stored_category_degrades_to_nurture() {
    assert_eq!(LeadCategory::from_label("LUM_L2"), Some(LeadCategory::LumL2));
    assert_eq!(
        LeadCategory::from_label_or_nurture("gold", "status lookup"),
        LeadCategory::Nurture
    );
}

#[test]
fn counselor_aliases() {
    assert_eq!("a".parse::<Counselor>(), Ok(Counselor::Bch));
    assert_eq!("Counselor_B".parse::<Counselor>(), Ok(Counselor::Luminaire));
    assert!("c".parse::<Counselor>().is_err());
    assert_eq!(Counselor::for_category(LeadCategory::Bch), Counselor::Bch);
    assert_eq!(Counselor::for_category(LeadCategory::LumL2), Counselor::Luminaire);
}
