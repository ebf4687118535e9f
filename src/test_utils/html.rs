use axum::{body::Body, response::Response};
use scraper::Html;

/// Read a full response body and parse it as an HTML document.
pub(crate) async fn parse_html_document(response: Response<Body>) -> Html {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("could not read response body");

    Html::parse_document(&String::from_utf8_lossy(&bytes))
}

/// Parse an HTML fragment, e.g. a re-rendered form returned by an endpoint.
pub(crate) fn parse_fragment_text(text: &str) -> Html {
    Html::parse_fragment(text)
}

#[track_caller]
pub(crate) fn assert_valid_html(html: &Html) {
    assert!(
        html.errors.is_empty(),
        "HTML did not parse cleanly: {:?}",
        html.errors
    );
}
