use crate::html::{escape, Page};
use crate::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Form;
use portal_core::constants::COMPLAINT_MESSAGE_MAX_CHARS;
use portal_core::forms::{
    remaining_chars, ComplaintField, ComplaintForm, ComplaintRejection, FormErrors,
};

const TITLE: &str = "تقديم شكوى";
const THANKS: &str = "تم إرسال الشكوى بنجاح. شكراً لتواصلك معنا.";

fn field_error(errors: &FormErrors, field: ComplaintField) -> String {
    errors
        .get(field)
        .map(|m| {
            format!(
                "<p class=\"field-error\" id=\"{}-error\">{}</p>",
                field.as_str(),
                escape(m)
            )
        })
        .unwrap_or_default()
}

fn render_form(form: &ComplaintForm, errors: &FormErrors, server_error: Option<&str>) -> String {
    let server_error = server_error
        .map(|m| format!("<div class=\"alert error\" role=\"alert\">{}</div>", escape(m)))
        .unwrap_or_default();
    format!(
        "<h1>{TITLE}</h1>\n{server_error}\n<form method=\"post\" action=\"/complaint\" novalidate>\n\
         <label>الاسم (اختياري)<input name=\"name\" value=\"{name}\" maxlength=\"120\"></label>\n{name_error}\n\
         <label>رقم الهاتف (اختياري)<input name=\"phone\" dir=\"ltr\" value=\"{phone}\" inputmode=\"tel\"></label>\n{phone_error}\n\
         <label>نص الشكوى<textarea name=\"message\" maxlength=\"{max}\" required>{message}</textarea></label>\n\
         <p class=\"remaining\">متبقٍ {remaining} حرف</p>\n{message_error}\n\
         <div class=\"hp\" aria-hidden=\"true\"><input name=\"hp_company\" tabindex=\"-1\" autocomplete=\"off\" value=\"\"></div>\n\
         <button type=\"submit\">إرسال</button>\n</form>",
        name = escape(&form.name),
        name_error = field_error(errors, ComplaintField::Name),
        phone = escape(&form.phone),
        phone_error = field_error(errors, ComplaintField::Phone),
        max = COMPLAINT_MESSAGE_MAX_CHARS,
        message = escape(&form.message),
        remaining = remaining_chars(&form.message),
        message_error = field_error(errors, ComplaintField::Message),
    )
}

fn thanks() -> Page {
    Page::new(
        TITLE,
        format!("<h1>{TITLE}</h1>\n<div class=\"alert success\" role=\"status\">{THANKS}</div>"),
    )
}

/// `GET /complaint`
pub async fn form() -> Page {
    Page::new(
        TITLE,
        render_form(&ComplaintForm::default(), &FormErrors::default(), None),
    )
}

/// `POST /complaint`
///
/// Invalid forms are re-rendered with every field error inline and nothing is sent. A filled
/// honeypot gets the normal success page without contacting the API.
pub async fn submit(State(state): State<AppState>, Form(form): Form<ComplaintForm>) -> Page {
    let payload = match form.validate() {
        Ok(payload) => payload,
        Err(ComplaintRejection::Suspicious) => {
            tracing::warn!("complaint dropped: honeypot field was filled");
            return thanks();
        }
        Err(ComplaintRejection::Invalid(errors)) => {
            return Page::new(TITLE, render_form(&form, &errors, None))
                .with_status(StatusCode::UNPROCESSABLE_ENTITY);
        }
    };

    match state.api.submit_complaint(&payload).await {
        Ok(()) => thanks(),
        Err(e) => {
            tracing::error!("Submit complaint error: {:?}", e);
            let message = e.user_message();
            Page::new(
                TITLE,
                render_form(&form, &FormErrors::default(), Some(&message)),
            )
            .with_status(StatusCode::BAD_GATEWAY)
        }
    }
}
