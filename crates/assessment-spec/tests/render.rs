use assessment_spec::{
    AssessmentSpec, ContactField, QuestionnaireController, RenderStatus, TemplateEngine,
    build_render_payload, render_card, render_json_ui, render_text,
};

fn controller() -> QuestionnaireController {
    QuestionnaireController::new(AssessmentSpec::bundled().expect("bundled spec"))
}

fn fill(controller: &mut QuestionnaireController) {
    for (field, value) in [
        (ContactField::Name, "Kiran"),
        (ContactField::Email, "kiran@example.org"),
        (ContactField::Phone, "9000000001"),
        (ContactField::Age, "40"),
        (ContactField::Gender, "Male"),
    ] {
        controller.update_contact_field(field, value);
    }
}

#[test]
fn contact_form_text_shows_greeting_and_errors() {
    let mut controller = controller();
    controller.advance();
    let payload = build_render_payload(&controller, &TemplateEngine::new()).expect("payload");

    assert_eq!(payload.status, RenderStatus::NeedInput);
    assert_eq!(payload.fields.len(), 5);
    assert!(!payload.can_go_back);

    let text = render_text(&payload);
    assert!(text.contains("Hi! I'm Noa"));
    assert!(text.contains("Name is required"));
    assert!(text.contains("[Next]"));
}

#[test]
fn interstitial_json_has_acknowledgement() {
    let mut controller = controller();
    fill(&mut controller);
    controller.advance();
    let payload = build_render_payload(&controller, &TemplateEngine::new()).expect("payload");

    let ui = render_json_ui(&payload);
    assert_eq!(ui["step"], "interstitial");
    assert_eq!(ui["can_go_back"], true);
    assert!(
        ui["message"]
            .as_str()
            .expect("message")
            .starts_with("Thank you for your details!")
    );
    assert!(ui["fields"].as_array().expect("fields").is_empty());
}

#[test]
fn question_json_exposes_options_and_progress() {
    let mut controller = controller();
    fill(&mut controller);
    controller.advance();
    controller.advance();
    controller.update_answer("health_concern", "Beard Growth");
    let payload = build_render_payload(&controller, &TemplateEngine::new()).expect("payload");

    let ui = render_json_ui(&payload);
    assert_eq!(ui["question"]["key"], "health_concern");
    assert_eq!(ui["question"]["selected"], "Beard Growth");
    assert_eq!(ui["question"]["position"], 1);
    assert_eq!(ui["question"]["total"], 4);
    assert_eq!(ui["progress"]["answered"], 1);
    assert_eq!(ui["next_label"], "Next");

    let text = render_text(&payload);
    assert!(text.contains("(x) 3. Beard Growth"));
}

#[test]
fn card_uses_choice_set_and_submit_on_last_question() {
    let mut controller = controller();
    fill(&mut controller);
    for _ in 0..5 {
        controller.advance();
    }
    let payload = build_render_payload(&controller, &TemplateEngine::new()).expect("payload");
    assert_eq!(payload.next_label, Some("Submit"));

    let card = render_card(&payload);
    assert_eq!(card["version"], "1.3");
    let body = card["body"].as_array().expect("body");
    let container = body
        .iter()
        .find(|item| item["type"] == "Container")
        .expect("question container");
    let items = container["items"].as_array().expect("items");
    assert!(
        items
            .iter()
            .any(|item| item["type"].as_str() == Some("Input.ChoiceSet"))
    );
    let actions = card["actions"].as_array().expect("actions");
    assert_eq!(actions.len(), 2);
    assert_eq!(actions[1]["title"], "Submit");
    assert_eq!(actions[1]["data"]["assessment"]["action"], "next");
}

#[test]
fn completion_renders_templated_message() {
    let mut controller = controller();
    fill(&mut controller);
    for _ in 0..6 {
        controller.advance();
    }
    assert!(controller.is_complete());
    let payload = build_render_payload(&controller, &TemplateEngine::new()).expect("payload");
    assert_eq!(payload.status, RenderStatus::Complete);
    assert_eq!(payload.next_label, None);
    assert_eq!(
        payload.message.as_deref(),
        Some("Form Submitted! Thank you, Kiran.")
    );
    assert!(render_card(&payload)["actions"]
        .as_array()
        .expect("actions")
        .is_empty());
}
