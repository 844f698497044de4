//! HTML pages. Every user supplied value goes through [`escape`].

use axum::http::StatusCode;
use time::macros::format_description;
use time::OffsetDateTime;
use uuid::Uuid;

use super::form::{FormErrors, PHOTO_CLEAR_FIELD, PHOTO_FIELD, TEXT_FIELD};
use super::model::Trix;

pub struct ListItem {
    pub trix: Trix,
    pub photo_url: Option<String>,
}

pub struct FormView<'a> {
    pub title: &'a str,
    pub text: &'a str,
    pub photo_url: Option<&'a str>,
    pub errors: &'a FormErrors,
}

pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n</head>\n<body>\n{}</body>\n</html>\n",
        escape(title),
        body
    )
}

fn format_created(at: OffsetDateTime) -> String {
    let format = format_description!("[year]-[month]-[day] [hour]:[minute]");
    at.format(&format).unwrap_or_else(|_| at.to_string())
}

fn field_errors(errors: &FormErrors, field: &str) -> String {
    let messages = errors.field(field);
    if messages.is_empty() {
        return String::new();
    }
    let items: String = messages
        .iter()
        .map(|m| format!("<li>{}</li>", escape(m)))
        .collect();
    format!("<ul class=\"errorlist\" id=\"{}-errors\">{}</ul>\n", field, items)
}

/// Every trix, edit and delete links only on the requester's own.
pub fn list_page(requester: Uuid, items: &[ListItem]) -> String {
    let mut body = String::from("<h1>Trix</h1>\n<p><a href=\"/create/\">New trix</a></p>\n");
    if items.is_empty() {
        body.push_str("<p class=\"empty\">No trix yet.</p>\n");
    }
    for item in items {
        let t = &item.trix;
        body.push_str(&format!("<article class=\"trix\" id=\"trix-{}\">\n", t.id));
        body.push_str(&format!("<p class=\"text\">{}</p>\n", escape(&t.text)));
        if let Some(url) = &item.photo_url {
            body.push_str(&format!(
                "<img class=\"photo\" src=\"{}\" alt=\"\">\n",
                escape(url)
            ));
        }
        body.push_str(&format!(
            "<p class=\"meta\">{} &middot; <time>{}</time></p>\n",
            t.user_id,
            format_created(t.created_at)
        ));
        if t.user_id == requester {
            body.push_str(&format!(
                "<p><a href=\"/{id}/edit/\">Edit</a> <a href=\"/{id}/del/\">Delete</a></p>\n",
                id = t.id
            ));
        }
        body.push_str("</article>\n");
    }
    layout("Trix", &body)
}

pub fn form_page(view: &FormView<'_>) -> String {
    let mut body = format!("<h1>{}</h1>\n", escape(view.title));
    body.push_str("<form method=\"post\" enctype=\"multipart/form-data\">\n");

    body.push_str(&field_errors(view.errors, TEXT_FIELD));
    body.push_str(&format!(
        "<p><label for=\"id_text\">Text:</label>\n<textarea name=\"{}\" id=\"id_text\" required>{}</textarea></p>\n",
        TEXT_FIELD,
        escape(view.text)
    ));

    body.push_str(&field_errors(view.errors, PHOTO_FIELD));
    body.push_str("<p><label for=\"id_photo\">Photo:</label>\n");
    if let Some(url) = view.photo_url {
        body.push_str(&format!(
            "Currently: <a href=\"{}\">photo</a>\n<input type=\"checkbox\" name=\"{}\" id=\"{}_id\">\n<label for=\"{}_id\">Clear</label><br>\nChange:\n",
            escape(url),
            PHOTO_CLEAR_FIELD,
            PHOTO_CLEAR_FIELD,
            PHOTO_CLEAR_FIELD
        ));
    }
    body.push_str(&format!(
        "<input type=\"file\" name=\"{}\" accept=\"image/*\" id=\"id_photo\"></p>\n",
        PHOTO_FIELD
    ));

    body.push_str("<button type=\"submit\">Save</button>\n</form>\n<p><a href=\"/\">Back</a></p>\n");
    layout(view.title, &body)
}

pub fn delete_confirm_page(trix: &Trix, photo_url: Option<&str>) -> String {
    let mut body = String::from("<h1>Delete trix?</h1>\n");
    body.push_str(&format!("<p class=\"text\">{}</p>\n", escape(&trix.text)));
    if let Some(url) = photo_url {
        body.push_str(&format!(
            "<img class=\"photo\" src=\"{}\" alt=\"\">\n",
            escape(url)
        ));
    }
    body.push_str(
        "<form method=\"post\">\n<button type=\"submit\">Delete</button>\n<a href=\"/\">Cancel</a>\n</form>\n",
    );
    layout("Delete trix", &body)
}

pub fn error_page(status: StatusCode, message: &str) -> String {
    let title = status.canonical_reason().unwrap_or("Error");
    let body = format!(
        "<h1>{}</h1>\n<p>{}</p>\n<p><a href=\"/\">Back</a></p>\n",
        escape(title),
        escape(message)
    );
    layout(title, &body)
}
