use super::*;
use futures::executor::block_on;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::feedback::{ClickTarget, ModalCloseReason};
use crate::form::{
    Dispatched, FieldKey, FieldKind, FieldSpec, FormEvent, SubmissionFuture, SubmissionResponse,
    SubmitContent, SubmitOutcome, SubmitState, ValidationResult, evaluate,
};

const NAME: FieldKey = FieldKey::new("name");
const EMAIL: FieldKey = FieldKey::new("email");
const SERVICE: FieldKey = FieldKey::new("service");
const MESSAGE: FieldKey = FieldKey::new("message");

fn spec(key: FieldKey) -> FieldSpec {
    ContactForm::field_specs()
        .into_iter()
        .find(|spec| spec.key == key)
        .expect("declared field")
}

fn fast_handle() -> ContactFormHandle {
    ContactFormHandle::new(&ContactFormConfig::default().submit_delay(Duration::ZERO))
}

fn fill(handle: &ContactFormHandle, name: &str, email: &str, service: &str, message: &str) {
    let values = [
        (NAME, name),
        (EMAIL, email),
        (SERVICE, service),
        (MESSAGE, message),
    ];
    for (field, value) in values {
        let dispatched = block_on(handle.events().dispatch(FormEvent::Input {
            field,
            value: SharedString::from(value.to_string()),
        }))
        .expect("input event");
        assert_eq!(dispatched, Dispatched::Handled);
    }
}

fn shown_error(handle: &ContactFormHandle, key: FieldKey) -> Option<String> {
    handle
        .controller()
        .field_display(key)
        .expect("field display")
        .error
        .map(|error| error.to_string())
}

#[test]
fn contact_form_declares_four_required_fields() {
    let specs = ContactForm::field_specs();
    let kinds = specs
        .iter()
        .map(|spec| (spec.key.as_str(), spec.kind, spec.required))
        .collect::<Vec<_>>();
    assert_eq!(
        kinds,
        vec![
            ("name", FieldKind::Text, true),
            ("email", FieldKind::Email, true),
            ("service", FieldKind::Select, true),
            ("message", FieldKind::MultilineText, true),
        ]
    );
    assert_eq!(spec(MESSAGE).min_len, Some(10));
    assert!(fast_handle().controller().is_required(SERVICE));
}

#[test]
fn empty_required_fields_fail_and_any_text_passes() {
    for key in [NAME, SERVICE] {
        let declared = spec(key);
        assert_eq!(
            evaluate(&declared, ""),
            ValidationResult::Invalid(FieldIssue::Required)
        );
        assert_eq!(
            evaluate(&declared, "   "),
            ValidationResult::Invalid(FieldIssue::Required)
        );
        for value in ["x", "Design", "Jo", "  padded  "] {
            assert_eq!(evaluate(&declared, value), ValidationResult::Valid);
        }
    }
}

#[test]
fn email_format_is_enforced() {
    let declared = spec(EMAIL);
    for value in [
        "not-an-email",
        "a@b",
        "@b.com",
        "a@.",
        "a b@c.com",
        "a@b .com",
        "a@@b.com",
        "a@b@c.com",
    ] {
        assert_eq!(
            evaluate(&declared, value),
            ValidationResult::Invalid(FieldIssue::InvalidEmail),
            "{value} should be rejected"
        );
    }
    for value in ["a@b.com", "jo@example.com", "x.y@sub.domain.org", " a@b.co "] {
        assert_eq!(
            evaluate(&declared, value),
            ValidationResult::Valid,
            "{value} should be accepted"
        );
    }
}

#[test]
fn empty_email_reports_required_before_format() {
    assert_eq!(
        evaluate(&spec(EMAIL), ""),
        ValidationResult::Invalid(FieldIssue::Required)
    );
}

#[test]
fn message_length_counts_trimmed_characters() {
    let declared = spec(MESSAGE);
    for value in ["short", "123456789", "   123456789   ", "héllo wör"] {
        assert_eq!(
            evaluate(&declared, value),
            ValidationResult::Invalid(FieldIssue::TooShort { min: 10 }),
            "{value:?} should be too short"
        );
    }
    for value in ["1234567890", "  1234567890  ", "héllo wörld"] {
        assert_eq!(evaluate(&declared, value), ValidationResult::Valid);
    }
}

#[test]
fn issue_messages_match_inline_copy() {
    assert_eq!(FieldIssue::Required.to_string(), "This field is required");
    assert_eq!(
        FieldIssue::InvalidEmail.to_string(),
        "Please enter a valid email address"
    );
    assert_eq!(
        FieldIssue::TooShort { min: 10 }.to_string(),
        "Message must be at least 10 characters long"
    );
}

#[test]
fn missing_name_is_the_only_error() {
    let handle = fast_handle();
    fill(&handle, "", "a@b.com", "Design", "Hello there, I need help");

    let outcome = block_on(handle.events().dispatch(FormEvent::Submit)).expect("submit");
    assert_eq!(outcome, Dispatched::Submitted(SubmitOutcome::Invalid));
    assert_eq!(
        shown_error(&handle, NAME).as_deref(),
        Some("This field is required")
    );
    for key in [EMAIL, SERVICE, MESSAGE] {
        assert_eq!(shown_error(&handle, key), None, "{key} should be clean");
    }
    assert_eq!(
        handle.controller().submit_state().expect("state"),
        SubmitState::Idle
    );
    assert!(!handle.modal().is_open());
}

#[test]
fn bad_email_and_short_message_are_reported_together() {
    let handle = fast_handle();
    fill(&handle, "Jo", "not-an-email", "Design", "short");

    let outcome = block_on(handle.controller().submit()).expect("submit");
    assert_eq!(outcome, SubmitOutcome::Invalid);
    assert_eq!(shown_error(&handle, NAME), None);
    assert_eq!(
        shown_error(&handle, EMAIL).as_deref(),
        Some("Please enter a valid email address")
    );
    assert_eq!(shown_error(&handle, SERVICE), None);
    assert_eq!(
        shown_error(&handle, MESSAGE).as_deref(),
        Some("Message must be at least 10 characters long")
    );
    assert!(
        handle
            .controller()
            .field_display(EMAIL)
            .expect("display")
            .highlighted
    );
}

#[test]
fn valid_form_submits_resets_and_shows_the_modal() {
    let handle = fast_handle();
    fill(
        &handle,
        "Jo",
        "jo@example.com",
        "Design",
        "This is a sufficiently long message",
    );

    let outcome = block_on(handle.events().dispatch(FormEvent::Submit)).expect("submit");
    assert_eq!(outcome, Dispatched::Submitted(SubmitOutcome::Succeeded));

    let snapshot = handle.controller().snapshot().expect("snapshot");
    assert_eq!(snapshot.model, ContactForm::default());
    assert_eq!(snapshot.submit_state, SubmitState::Succeeded);
    assert!(snapshot.is_valid);

    let control = handle.controller().submit_control().expect("control");
    assert!(!control.disabled);
    assert_eq!(control.content, SubmitContent::Label);

    let modal = handle.modal().snapshot();
    assert!(modal.opened);
    assert_eq!(modal.content.title.to_string(), "Message sent!");

    let closed = block_on(
        handle
            .events()
            .dispatch(FormEvent::CloseFeedback(ModalCloseReason::CloseButton)),
    )
    .expect("close");
    assert_eq!(closed, Dispatched::Handled);
    assert!(!handle.modal().is_open());
}

#[test]
fn overlay_click_dismisses_the_modal() {
    let handle = fast_handle();
    fill(
        &handle,
        "Jo",
        "jo@example.com",
        "Design",
        "This is a sufficiently long message",
    );
    block_on(handle.controller().submit()).expect("submit");

    let on_panel =
        block_on(handle.events().dispatch(FormEvent::Click(ClickTarget::Panel))).expect("click");
    assert_eq!(on_panel, Dispatched::Ignored);
    let on_overlay = block_on(handle.events().dispatch(FormEvent::Click(ClickTarget::Overlay)))
        .expect("click");
    assert_eq!(on_overlay, Dispatched::Handled);
    assert_eq!(
        handle.modal().snapshot().last_close,
        Some(ModalCloseReason::OverlayClick)
    );
}

#[test]
fn form_accepts_a_new_submission_after_success() {
    let handle = fast_handle();
    for round in 0..2 {
        fill(
            &handle,
            "Jo",
            "jo@example.com",
            "Design",
            "This is a sufficiently long message",
        );
        let outcome = block_on(handle.controller().submit()).expect("submit");
        assert_eq!(outcome, SubmitOutcome::Succeeded, "round {round}");
    }
    assert_eq!(handle.modal().snapshot().open_count, 2);
    assert_eq!(
        handle.controller().snapshot().expect("snapshot").submit_count,
        2
    );
}

#[test]
fn custom_port_sees_the_validated_values() {
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = calls.clone();
    let port = move |request: ContactForm| -> SubmissionFuture {
        assert_eq!(request.email.to_string(), "jo@example.com");
        assert_eq!(request.service.to_string(), "Design");
        seen.fetch_add(1, Ordering::SeqCst);
        Box::pin(async { Ok(SubmissionResponse::accepted()) })
    };
    let handle = ContactFormHandle::with_port(&ContactFormConfig::default(), port);
    fill(
        &handle,
        "Jo",
        "jo@example.com",
        "Design",
        "This is a sufficiently long message",
    );

    let outcome = block_on(handle.controller().submit()).expect("submit");
    assert_eq!(outcome, SubmitOutcome::Succeeded);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn blur_shows_error_and_typing_clears_it() {
    let handle = fast_handle();

    block_on(handle.events().dispatch(FormEvent::Blur { field: MESSAGE })).expect("blur");
    assert_eq!(
        shown_error(&handle, MESSAGE).as_deref(),
        Some("This field is required")
    );

    fill(&handle, "", "", "", "Hi");
    assert_eq!(shown_error(&handle, MESSAGE), None);

    block_on(handle.events().dispatch(FormEvent::Blur { field: MESSAGE })).expect("blur");
    assert_eq!(
        shown_error(&handle, MESSAGE).as_deref(),
        Some("Message must be at least 10 characters long")
    );
}

#[test]
fn service_options_cover_the_scenario_value() {
    assert!(SERVICE_OPTIONS.contains(&"Design"));
}
