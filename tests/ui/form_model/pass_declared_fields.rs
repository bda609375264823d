use contactform::form::{FieldKey, FieldKind, FormModel};

#[derive(Clone, contactform::form::FormModel)]
struct Enquiry {
    #[field(required, label = "Your name")]
    full_name: String,
    #[field(email)]
    reply_to: String,
    #[field(multiline, min_len = 5)]
    details: String,
    attachments: u32,
}

fn main() {
    let specs = Enquiry::field_specs();
    assert_eq!(specs.len(), 3);
    assert_eq!(specs[0].label, Some("Your name"));
    assert_eq!(specs[1].display_label().to_string(), "Reply to");
    assert!(specs[0].required);
    assert_eq!(specs[1].kind, FieldKind::Email);
    assert!(!specs[1].required);
    assert_eq!(specs[2].min_len, Some(5));

    let model = Enquiry {
        full_name: "Jo".to_string(),
        reply_to: String::new(),
        details: "hello world".to_string(),
        attachments: 0,
    };
    assert_eq!(model.field_text(FieldKey::new("full_name")), Some("Jo"));
    assert_eq!(model.field_text(FieldKey::new("attachments")), None);
}
