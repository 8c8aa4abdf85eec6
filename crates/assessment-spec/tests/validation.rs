use proptest::prelude::*;

use assessment_spec::{
    AssessmentSpec, ContactField, ContactInfo, Gender, QuestionnaireController, SpecError, Step,
    Transition, validate_contact,
};

fn valid_contact() -> ContactInfo {
    ContactInfo {
        name: "Ananya".into(),
        email: "ananya@example.com".into(),
        phone: "1234567890".into(),
        age: "18".into(),
        gender: Some(Gender::Female),
    }
}

fn error_for(contact: &ContactInfo, field: ContactField) -> Option<String> {
    validate_contact(contact).get(field).map(str::to_string)
}

#[test]
fn email_shapes() {
    let mut contact = valid_contact();
    for (email, ok) in [
        ("a@b.c", true),
        ("a@b", false),
        ("ab.c", false),
        ("", false),
        ("a b@c.d", false),
        ("a@@b.c", false),
    ] {
        contact.email = email.into();
        assert_eq!(
            error_for(&contact, ContactField::Email).is_none(),
            ok,
            "email {email:?}"
        );
    }
    contact.email = String::new();
    assert_eq!(
        error_for(&contact, ContactField::Email).as_deref(),
        Some("Valid email is required")
    );
}

#[test]
fn phone_requires_ten_digits() {
    let mut contact = valid_contact();
    for (phone, ok) in [
        ("1234567890", true),
        ("12345", false),
        ("12345678901", false),
        ("12a4567890", false),
        ("", false),
        ("١٢٣٤٥٦٧٨٩٠", false),
    ] {
        contact.phone = phone.into();
        assert_eq!(
            error_for(&contact, ContactField::Phone).is_none(),
            ok,
            "phone {phone:?}"
        );
    }
    assert_eq!(
        error_for(&contact, ContactField::Phone).as_deref(),
        Some("Valid phone number is required (10 digits)")
    );
}

#[test]
fn age_must_be_an_adult_integer() {
    let mut contact = valid_contact();
    for (age, ok) in [
        ("18", true),
        (" 65 ", true),
        ("17", false),
        ("", false),
        ("abc", false),
        ("20abc", false),
        ("-30", false),
        ("+20", false),
        ("4294967296", true),
    ] {
        contact.age = age.into();
        assert_eq!(
            error_for(&contact, ContactField::Age).is_none(),
            ok,
            "age {age:?}"
        );
    }
    assert_eq!(
        error_for(&contact, ContactField::Age).as_deref(),
        Some("Age must be 18 or older")
    );
}

#[test]
fn name_and_gender_are_required() {
    let mut contact = valid_contact();
    contact.name = "   ".into();
    contact.gender = None;
    let errors = validate_contact(&contact);
    assert_eq!(errors.len(), 2);
    assert_eq!(errors.get(ContactField::Name), Some("Name is required"));
    assert_eq!(errors.get(ContactField::Gender), Some("Gender is required"));
}

#[test]
fn spec_rejects_forward_condition_references() {
    let raw = r#"{
        "id": "broken",
        "title": "Broken",
        "version": "0.1.0",
        "banks": {
            "Male": [
                {
                    "text": "Stage?",
                    "key": "stage",
                    "options": ["Low"],
                    "display_if": { "op": "answer_equals", "key": "dandruff", "value": "Yes" }
                },
                { "text": "Dandruff?", "key": "dandruff", "options": ["Yes", "No"] }
            ]
        }
    }"#;
    let err = AssessmentSpec::from_json(raw).expect_err("forward reference");
    assert!(matches!(err, SpecError::UnknownConditionKey { ref reference, .. } if reference == "dandruff"));
}

#[test]
fn spec_rejects_duplicate_keys_and_empty_options() {
    let duplicate = r#"{
        "id": "dup", "title": "Dup", "version": "0.1.0",
        "banks": { "Female": [
            { "text": "One?", "key": "q", "options": ["a"] },
            { "text": "Two?", "key": "q", "options": ["b"] }
        ] }
    }"#;
    assert!(matches!(
        AssessmentSpec::from_json(duplicate),
        Err(SpecError::DuplicateKey { .. })
    ));

    let empty = r#"{
        "id": "empty", "title": "Empty", "version": "0.1.0",
        "banks": { "Female": [ { "text": "One?", "key": "q", "options": [] } ] }
    }"#;
    assert!(matches!(
        AssessmentSpec::from_json(empty),
        Err(SpecError::NoOptions { .. })
    ));

    assert!(matches!(
        AssessmentSpec::from_json("not json"),
        Err(SpecError::Parse(_))
    ));
}

#[test]
fn spec_rejects_templates_that_do_not_compile() {
    let broken = r#"{
        "id": "broken", "title": "Broken", "version": "0.1.0",
        "presentation": { "completion": "{{#if}}" },
        "banks": { "Female": [ { "text": "One?", "key": "q", "options": ["a"] } ] }
    }"#;
    let err = AssessmentSpec::from_json(broken).expect_err("unclosed block");
    assert!(matches!(err, SpecError::Template { name: "completion", .. }));

    let lenient = broken.replace("{{#if}}", "Thanks, {{contact.name}}.");
    assert!(AssessmentSpec::from_json(&lenient).is_ok());
}

fn contact_strategy() -> impl Strategy<Value = ContactInfo> {
    (
        "[A-Za-z][A-Za-z ]{0,20}",
        "[a-z0-9._]{1,10}@[a-z]{1,10}\\.[a-z]{2,4}",
        "[0-9]{10}",
        18u32..=120,
        prop_oneof![Just(Gender::Male), Just(Gender::Female)],
    )
        .prop_map(|(name, email, phone, age, gender)| ContactInfo {
            name,
            email,
            phone,
            age: age.to_string(),
            gender: Some(gender),
        })
}

proptest! {
    #[test]
    fn valid_contacts_always_advance(contact in contact_strategy()) {
        prop_assert!(validate_contact(&contact).is_empty());

        let mut controller = QuestionnaireController::new(
            AssessmentSpec::bundled().expect("bundled spec"),
        );
        for field in ContactField::ALL {
            controller.update_contact_field(field, contact.get(field));
        }
        let transition = controller.advance();
        prop_assert!(matches!(transition, Transition::Moved(_)));
        prop_assert_eq!(controller.step(), Step::Interstitial);
    }

    #[test]
    fn phone_lengths_other_than_ten_fail(phone in "[0-9]{0,9}|[0-9]{11,15}") {
        let contact = ContactInfo { phone, ..valid_contact() };
        prop_assert!(validate_contact(&contact).get(ContactField::Phone).is_some());
    }

    #[test]
    fn minors_are_rejected(age in 0u32..18) {
        let contact = ContactInfo { age: age.to_string(), ..valid_contact() };
        let errors = validate_contact(&contact);
        prop_assert_eq!(errors.get(ContactField::Age), Some("Age must be 18 or older"));
    }
}
