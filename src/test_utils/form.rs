use scraper::{ElementRef, Html, Selector};

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("invalid test selector")
}

#[track_caller]
pub(crate) fn must_get_form(html: &Html) -> ElementRef<'_> {
    html.select(&selector("form"))
        .next()
        .expect("expected the document to contain a form")
}

#[track_caller]
pub(crate) fn assert_hx_endpoint(form: &ElementRef<'_>, endpoint: &str, attribute: &str) {
    match form.value().attr(attribute) {
        Some(value) => assert_eq!(
            value, endpoint,
            "form {attribute} should be \"{endpoint}\", was {value:?}"
        ),
        None => panic!("form is missing the {attribute} attribute"),
    }
}

#[track_caller]
pub(crate) fn assert_form_input(form: &ElementRef<'_>, name: &str, type_: &str) {
    let input = form
        .select(&selector("input"))
        .find(|input| input.value().attr("name") == Some(name))
        .unwrap_or_else(|| panic!("form has no input named \"{name}\""));

    let got_type = input.value().attr("type").unwrap_or_default();
    assert_eq!(
        got_type, type_,
        "input \"{name}\" should have type \"{type_}\", was {got_type:?}"
    );
    assert!(
        input.value().attr("required").is_some(),
        "input \"{name}\" should be marked required"
    );
}

#[track_caller]
pub(crate) fn assert_form_submit_button(form: &ElementRef<'_>) {
    let button = form
        .select(&selector("button"))
        .next()
        .expect("form has no button");

    assert_eq!(
        button.value().attr("type"),
        Some("submit"),
        "the form button should have type=\"submit\""
    );
}

#[track_caller]
pub(crate) fn assert_form_error_message(form: &ElementRef<'_>, want_error_message: &str) {
    let first_paragraph = form
        .select(&selector("p"))
        .next()
        .expect("form has no error message paragraph");

    let text = first_paragraph.text().collect::<String>();
    assert_eq!(want_error_message, text.trim());
}
