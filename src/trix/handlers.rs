use axum::{
    extract::{Multipart, Path, State},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{
    form::{self, FormErrors, PhotoChange, TrixSubmission},
    model::{Trix, TrixId},
    photos,
    views::{self, FormView, ListItem},
};
use crate::{
    auth::AuthUser,
    error::{AppError, AppResult},
    state::AppState,
};

const LIST_URL: &str = "/";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_trixs))
        .route("/create/", get(create_form).post(create_trix))
        .route("/:id/edit/", get(edit_form).post(edit_trix))
        .route("/:id/del/", get(delete_confirm).post(delete_trix))
}

/// Ids that don't parse are reported like ids that don't exist.
fn parse_id(raw: &str) -> AppResult<TrixId> {
    raw.parse::<TrixId>().map_err(|_| AppError::NotFound)
}

async fn owned_trix(state: &AppState, raw_id: &str, user_id: Uuid) -> AppResult<Trix> {
    let id = parse_id(raw_id)?;
    state.store.get(id, user_id).await?.ok_or_else(|| {
        warn!(%user_id, id, "trix not found for requester");
        AppError::NotFound
    })
}

async fn photo_url(state: &AppState, trix: &Trix) -> AppResult<Option<String>> {
    match &trix.photo {
        Some(key) => Ok(Some(
            photos::presign(state.storage.as_ref(), key, state.config.photo_url_ttl_secs).await?,
        )),
        None => Ok(None),
    }
}

fn render_form(title: &str, text: &str, photo_url: Option<&str>, errors: &FormErrors) -> Html<String> {
    Html(views::form_page(&FormView {
        title,
        text,
        photo_url,
        errors,
    }))
}

#[instrument(skip(state))]
pub async fn list_trixs(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Html<String>> {
    let trixs = state.store.list_all().await?;
    let urls = photos::presign_all(
        state.storage.as_ref(),
        &trixs,
        state.config.photo_url_ttl_secs,
    )
    .await?;
    let items: Vec<ListItem> = trixs
        .into_iter()
        .zip(urls)
        .map(|(trix, photo_url)| ListItem { trix, photo_url })
        .collect();
    Ok(Html(views::list_page(user_id, &items)))
}

#[instrument]
pub async fn create_form(AuthUser(user_id): AuthUser) -> Html<String> {
    render_form("New trix", "", None, &FormErrors::default())
}

#[instrument(skip(state, multipart))]
pub async fn create_trix(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    multipart: Multipart,
) -> AppResult<Response> {
    let submission = TrixSubmission::from_multipart(multipart).await?;
    let text = submission.text.clone().unwrap_or_default();

    let input = match form::validate(submission) {
        Ok(input) => input,
        Err(errors) => {
            warn!(%user_id, ?errors, "create rejected");
            return Ok(render_form("New trix", &text, None, &errors).into_response());
        }
    };

    let photo = match input.photo {
        PhotoChange::Replace(upload) => {
            Some(photos::store_photo(state.storage.as_ref(), user_id, upload).await?)
        }
        PhotoChange::Keep | PhotoChange::Clear => None,
    };

    let trix = match state.store.create(user_id, &input.text, photo.as_deref()).await {
        Ok(t) => t,
        Err(e) => {
            if let Some(key) = &photo {
                photos::discard_photo(state.storage.as_ref(), key).await;
            }
            return Err(e.into());
        }
    };

    info!(trix_id = trix.id, %user_id, has_photo = trix.photo.is_some(), "trix created");
    Ok(Redirect::to(LIST_URL).into_response())
}

#[instrument(skip(state))]
pub async fn edit_form(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> AppResult<Html<String>> {
    let trix = owned_trix(&state, &id, user_id).await?;
    let url = photo_url(&state, &trix).await?;
    Ok(render_form(
        "Edit trix",
        &trix.text,
        url.as_deref(),
        &FormErrors::default(),
    ))
}

#[instrument(skip(state, multipart))]
pub async fn edit_trix(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
    multipart: Multipart,
) -> AppResult<Response> {
    let current = owned_trix(&state, &id, user_id).await?;

    let submission = TrixSubmission::from_multipart(multipart).await?;
    let text = submission.text.clone().unwrap_or_default();

    let input = match form::validate(submission) {
        Ok(input) => input,
        Err(errors) => {
            warn!(trix_id = current.id, %user_id, ?errors, "edit rejected");
            let url = photo_url(&state, &current).await?;
            return Ok(render_form("Edit trix", &text, url.as_deref(), &errors).into_response());
        }
    };

    let (uploaded, photo) = match input.photo {
        PhotoChange::Keep => (None, current.photo.clone()),
        PhotoChange::Clear => (None, None),
        PhotoChange::Replace(upload) => {
            let key = photos::store_photo(state.storage.as_ref(), user_id, upload).await?;
            (Some(key.clone()), Some(key))
        }
    };

    // owner is stamped with the requester on every save
    let updated = match state
        .store
        .update(current.id, user_id, &input.text, photo.as_deref())
        .await
    {
        Ok(Some(t)) => t,
        result => {
            if let Some(key) = &uploaded {
                photos::discard_photo(state.storage.as_ref(), key).await;
            }
            return Err(match result {
                Err(e) => e.into(),
                _ => AppError::NotFound,
            });
        }
    };

    if let Some(old) = &current.photo {
        if updated.photo.as_ref() != Some(old) {
            photos::discard_photo(state.storage.as_ref(), old).await;
        }
    }

    info!(trix_id = updated.id, %user_id, has_photo = updated.photo.is_some(), "trix updated");
    Ok(Redirect::to(LIST_URL).into_response())
}

#[instrument(skip(state))]
pub async fn delete_confirm(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> AppResult<Html<String>> {
    let trix = owned_trix(&state, &id, user_id).await?;
    let url = photo_url(&state, &trix).await?;
    Ok(Html(views::delete_confirm_page(&trix, url.as_deref())))
}

#[instrument(skip(state))]
pub async fn delete_trix(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> AppResult<Redirect> {
    let trix = owned_trix(&state, &id, user_id).await?;

    if !state.store.delete(trix.id, user_id).await? {
        return Err(AppError::NotFound);
    }
    if let Some(key) = &trix.photo {
        photos::discard_photo(state.storage.as_ref(), key).await;
    }

    info!(trix_id = trix.id, %user_id, "trix deleted");
    Ok(Redirect::to(LIST_URL))
}
