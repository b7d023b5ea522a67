use super::ChatError;
use super::ContentPart;
use super::ImageData;
use super::PersonaConfig;
use super::Role;
use super::Session;

fn image() -> ImageData {
    return ImageData {
        mime_type: "image/jpeg".to_string(),
        data: "/9j/4AAQ".to_string(),
    };
}

#[test]
fn it_initializes_with_the_greeting() {
    let session = Session::initialize(&PersonaConfig::with_greeting("Hello!"));

    assert_eq!(session.history().len(), 1);
    assert_eq!(session.history()[0].role, Role::Model);
    assert_eq!(
        session.history()[0].parts(),
        &[ContentPart::Text("Hello!".to_string())]
    );
    assert!(session.pending_attachment().is_none());
}

#[test]
fn it_rejects_empty_user_messages() {
    let mut session = Session::initialize(&PersonaConfig::with_greeting("Hello!"));

    for text in [None, Some(""), Some("   \n")] {
        let err = session.append_user_message(text, None).unwrap_err();
        assert_eq!(
            err.downcast_ref::<ChatError>(),
            Some(&ChatError::EmptyInput)
        );
    }

    assert_eq!(session.history().len(), 1);
}

#[test]
fn it_appends_text_only_messages() {
    let mut session = Session::initialize(&PersonaConfig::with_greeting("Hello!"));
    session
        .append_user_message(Some("  What should I plant?  "), None)
        .unwrap();

    let last = session.history().last().unwrap();
    assert_eq!(last.role, Role::User);
    assert_eq!(
        last.parts(),
        &[ContentPart::Text("What should I plant?".to_string())]
    );
}

#[test]
fn it_puts_the_attachment_before_the_text() {
    let mut session = Session::initialize(&PersonaConfig::with_greeting("Hello!"));
    session
        .append_user_message(Some("Is this sunny enough?"), Some(image()))
        .unwrap();

    let last = session.history().last().unwrap();
    assert_eq!(
        last.parts(),
        &[
            ContentPart::Image(image()),
            ContentPart::Text("Is this sunny enough?".to_string())
        ]
    );
}

#[test]
fn it_appends_attachment_only_messages() {
    let mut session = Session::initialize(&PersonaConfig::with_greeting("Hello!"));
    session.append_user_message(Some(""), Some(image())).unwrap();

    let last = session.history().last().unwrap();
    assert_eq!(last.parts(), &[ContentPart::Image(image())]);
}

#[test]
fn it_appends_model_messages() {
    let mut session = Session::initialize(&PersonaConfig::with_greeting("Hello!"));
    session.append_model_message("Try basil.");

    let last = session.history().last().unwrap();
    assert_eq!(last.role, Role::Model);
    assert_eq!(last.text(), "Try basil.");
}

#[test]
fn it_replaces_and_clears_the_pending_attachment() {
    let mut session = Session::initialize(&PersonaConfig::with_greeting("Hello!"));
    session.set_pending_attachment(ImageData {
        mime_type: "image/png".to_string(),
        data: "first".to_string(),
    });
    session.set_pending_attachment(image());
    assert_eq!(session.pending_attachment(), Some(&image()));

    session.clear_pending_attachment();
    assert!(session.pending_attachment().is_none());
    session.clear_pending_attachment();
    assert!(session.pending_attachment().is_none());
}

#[test]
fn it_greets_again_after_reset() {
    let persona = PersonaConfig::with_greeting("Hello!");
    let mut session = Session::initialize(&persona);
    session.append_user_message(Some("Hi"), None).unwrap();
    session.append_model_message("Hey");
    session.set_pending_attachment(image());

    session.reset(&persona);

    assert_eq!(session.history().len(), 1);
    assert_eq!(session.history()[0].text(), "Hello!");
    assert!(session.pending_attachment().is_none());
}
