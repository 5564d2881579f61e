//! Room image uploads.
//!
//! `POST /host/images/upload/:property_id` takes a multipart form with a
//! `user_id` field, an optional `room_id` field and one or more `images`
//! files. Each file is checked against the type allow-list and the size cap
//! while it streams in, written under the upload directory with a generated
//! name, and recorded as a room image row.

use axum::extract::multipart::{Field, MultipartError, MultipartRejection};
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use innkeep::model::{BasicInfo, Room, RoomImage, RoomImageFields};
use innkeep::{Entity, PooledConn, Store};
use thiserror::Error;
use uuid::Uuid;

use super::envelope::Envelope;
use super::error::ApiError;
use super::extract::Id;
use crate::{AppState, Uploads};

/// Accepted content types and the extension stored files get.
pub const ALLOWED_TYPES: [(&str, &str); 3] = [
    ("image/jpeg", "jpg"),
    ("image/png", "png"),
    ("image/gif", "gif"),
];

pub fn extension_for(content_type: &str) -> Option<&'static str> {
    ALLOWED_TYPES
        .iter()
        .find(|(allowed, _)| allowed.eq_ignore_ascii_case(content_type))
        .map(|(_, ext)| *ext)
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("{name} is larger than {limit} bytes")]
    TooLarge { name: String, limit: usize },

    #[error("unsupported file type {0:?}, expected image/jpeg, image/png or image/gif")]
    UnsupportedType(String),

    #[error("no image in the request")]
    MissingFile,

    #[error("at most {0} images per request")]
    TooMany(usize),

    #[error("missing form field {0}")]
    MissingField(&'static str),

    #[error("invalid {field}: {value:?}")]
    InvalidField { field: &'static str, value: String },

    #[error("malformed multipart body: {0}")]
    Multipart(#[from] MultipartError),

    #[error("failed to store image: {0}")]
    Io(#[from] std::io::Error),
}

/// A file read from the form, not yet written anywhere.
#[derive(Debug)]
struct Incoming {
    original_name: Option<String>,
    content_type: String,
    bytes: Vec<u8>,
}

#[derive(Debug)]
struct UploadForm {
    user_id: i64,
    room_id: Option<i64>,
    files: Vec<Incoming>,
}

fn parse_id(field: &'static str, value: String) -> Result<i64, UploadError> {
    match value.trim().parse() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(UploadError::InvalidField { field, value }),
    }
}

async fn read_file(mut field: Field<'_>, limit: usize) -> Result<Incoming, UploadError> {
    let content_type = field.content_type().unwrap_or_default().to_string();
    if extension_for(&content_type).is_none() {
        return Err(UploadError::UnsupportedType(content_type));
    }
    let original_name = field.file_name().map(str::to_string);

    let mut bytes = Vec::new();
    while let Some(chunk) = field.chunk().await? {
        if bytes.len() + chunk.len() > limit {
            return Err(UploadError::TooLarge {
                name: original_name.unwrap_or_else(|| "image".to_string()),
                limit,
            });
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(Incoming {
        original_name,
        content_type,
        bytes,
    })
}

async fn read_form(multipart: &mut Multipart, uploads: &Uploads) -> Result<UploadForm, UploadError> {
    let mut user_id = None;
    let mut room_id = None;
    let mut files = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "user_id" => user_id = Some(parse_id("user_id", field.text().await?)?),
            "room_id" => {
                let text = field.text().await?;
                if !text.trim().is_empty() {
                    room_id = Some(parse_id("room_id", text)?);
                }
            }
            "images" => {
                if files.len() == Uploads::MAX_FILES {
                    return Err(UploadError::TooMany(Uploads::MAX_FILES));
                }
                files.push(read_file(field, uploads.max_file_bytes).await?);
            }
            other => tracing::debug!(field = other, "ignoring unknown form field"),
        }
    }

    if files.is_empty() {
        return Err(UploadError::MissingFile);
    }
    Ok(UploadForm {
        user_id: user_id.ok_or(UploadError::MissingField("user_id"))?,
        room_id,
        files,
    })
}

/// Write every file into the upload directory with a fresh name and return the names.
/// On failure, files already written are removed again.
async fn write_files(uploads: &Uploads, files: &[Incoming]) -> Result<Vec<String>, UploadError> {
    tokio::fs::create_dir_all(&uploads.dir).await?;
    let mut written = Vec::with_capacity(files.len());
    for file in files {
        let ext = extension_for(&file.content_type).unwrap_or("bin");
        let name = format!("{}.{ext}", Uuid::new_v4());
        if let Err(e) = tokio::fs::write(uploads.resolve(&name), &file.bytes).await {
            remove_files(uploads, &written).await;
            return Err(e.into());
        }
        written.push(name);
    }
    Ok(written)
}

async fn remove_files(uploads: &Uploads, names: &[String]) {
    for name in names {
        let path = uploads.resolve(name);
        if let Err(e) = tokio::fs::remove_file(&path).await {
            tracing::warn!(path = %path.display(), error = %e, "failed to remove upload");
        }
    }
}

async fn insert_images(conn: &mut PooledConn, rows: &[RoomImageFields]) -> innkeep::Result<Vec<RoomImage>> {
    let tx = conn.transaction().await?;
    let store = Store::<RoomImage>::new();
    let mut images = Vec::with_capacity(rows.len());
    for fields in rows {
        let id = store.create(&tx, fields).await?;
        images.push(store.fetch(&tx, id).await?);
    }
    tx.commit().await?;
    Ok(images)
}

#[tracing::instrument(skip_all)]
pub async fn upload(
    State(state): State<AppState>,
    Id(property_id): Id,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Envelope<Vec<RoomImage>>), ApiError> {
    let mut multipart = multipart.map_err(|r| ApiError::BadRequest(r.body_text()))?;
    let form = read_form(&mut multipart, &state.uploads).await?;

    let mut conn = state.pool.get().await?;
    Store::<BasicInfo>::new().fetch(&conn, property_id).await?;
    if let Some(room_id) = form.room_id {
        let room = Store::<Room>::new().fetch(&conn, room_id).await?;
        if room.property_id != property_id {
            return Err(innkeep::Error::NotFound {
                entity: Room::LABEL,
                id: room_id,
            }
            .into());
        }
    }

    let written = write_files(&state.uploads, &form.files).await?;
    let rows: Vec<RoomImageFields> = form
        .files
        .iter()
        .zip(&written)
        .map(|(file, name)| RoomImageFields {
            user_id: form.user_id,
            property_id,
            room_id: form.room_id,
            image_path: name.clone(),
            original_name: file.original_name.clone(),
            content_type: file.content_type.clone(),
            size_bytes: file.bytes.len() as i64,
        })
        .collect();

    let saved = insert_images(&mut conn, &rows).await;

    match saved {
        Ok(images) => {
            tracing::info!(property_id, count = images.len(), "images uploaded");
            Ok((
                StatusCode::CREATED,
                Envelope::data(images).with_message("images uploaded"),
            ))
        }
        Err(e) => {
            remove_files(&state.uploads, &written).await;
            Err(e.into())
        }
    }
}
