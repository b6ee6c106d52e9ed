//! Contact page

use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use tera::Context as TeraContext;

use super::error::WebError;
use super::flash::push_flash;
use super::state::AppState;
use super::view::View;
use crate::forms::{ContactForm, FormErrors, FormView};
use crate::theme::Notice;

pub const MAIL_SENT: &str = "Message sent.";
pub const MAIL_FAILED: &str = "Failed to send message.";

/// GET /contact
pub async fn contact_form(view: View) -> Result<Response, WebError> {
    render_contact(view, ContactForm::empty_view(), Vec::new()).await
}

/// POST /contact
pub async fn contact(
    State(state): State<AppState>,
    view: View,
    Form(form): Form<ContactForm>,
) -> Result<Response, WebError> {
    let data = match form.validate() {
        Ok(data) => data,
        Err(errors) => return render_contact(view, form.view(&errors), Vec::new()).await,
    };

    let delivered = state
        .mail_service
        .send_contact(&data.subject, &data.content)
        .await;

    if delivered > 0 {
        let mut response = Redirect::to("/").into_response();
        push_flash(response.headers_mut(), &[Notice::success(MAIL_SENT)]);
        return Ok(response);
    }

    render_contact(
        view,
        form.view(&FormErrors::new()),
        vec![Notice::error(MAIL_FAILED)],
    )
    .await
}

async fn render_contact(
    view: View,
    form: FormView,
    notices: Vec<Notice>,
) -> Result<Response, WebError> {
    let mut context = TeraContext::new();
    context.insert("title", "Contact");
    context.insert("form", &form);
    view.render_with_notices("news/mail.html", context, notices)
        .await
}
