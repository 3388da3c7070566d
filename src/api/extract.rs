//! Request extraction: caller identity headers and multipart form readers.

use crate::api::error::ApiError;
use crate::task::{
    domain::{Actor, Role, TaskId, UserId},
    services::{CheckInRequest, CheckOutRequest, FileUpload},
};
use axum::{
    async_trait,
    extract::{FromRequestParts, Multipart, multipart::Field},
    http::{StatusCode, request::Parts},
};
use uuid::Uuid;

const USER_HEADER: &str = "x-waymark-user";
const ROLE_HEADER: &str = "x-waymark-role";

/// The authenticated caller, read from gateway-injected headers.
///
/// Authentication itself lives at the edge; this service trusts the
/// `x-waymark-user` and `x-waymark-role` headers it receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallerIdentity(pub Actor);

#[async_trait]
impl<S> FromRequestParts<S> for CallerIdentity
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = header_value(parts, USER_HEADER)?;
        let user_id = Uuid::parse_str(user).map_err(|_| {
            ApiError::new(StatusCode::UNAUTHORIZED, format!("invalid {USER_HEADER} header"))
        })?;
        let role_raw = header_value(parts, ROLE_HEADER)?;
        let role = Role::try_from(role_raw).map_err(|_| {
            ApiError::new(StatusCode::UNAUTHORIZED, format!("invalid {ROLE_HEADER} header"))
        })?;
        Ok(Self(Actor::new(UserId::from_uuid(user_id), role)))
    }
}

fn header_value<'p>(parts: &'p Parts, name: &str) -> Result<&'p str, ApiError> {
    parts
        .headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| ApiError::new(StatusCode::UNAUTHORIZED, format!("missing {name} header")))
}

#[derive(Default)]
struct FieldEventForm {
    latitude: Option<String>,
    longitude: Option<String>,
    accuracy: Option<String>,
    notes: Option<String>,
    files: Vec<FileUpload>,
    payment_collected: Option<String>,
    payment_amount: Option<String>,
    payment_notes: Option<String>,
    invoice_file: Option<FileUpload>,
}

async fn read_file(field: Field<'_>) -> Result<FileUpload, ApiError> {
    let original_filename = field
        .file_name()
        .unwrap_or("upload")
        .to_owned();
    let mime_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_owned();
    let bytes = field
        .bytes()
        .await
        .map_err(|err| ApiError::bad_request(format!("unreadable file part: {err}")))?;
    Ok(FileUpload {
        original_filename,
        mime_type,
        bytes: bytes.to_vec(),
    })
}

async fn read_text(field: Field<'_>) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map_err(|err| ApiError::bad_request(format!("unreadable form field: {err}")))
}

async fn collect(multipart: &mut Multipart) -> Result<FieldEventForm, ApiError> {
    let mut form = FieldEventForm::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| ApiError::bad_request(format!("malformed multipart body: {err}")))?
    {
        let Some(name) = field.name().map(ToOwned::to_owned) else {
            continue;
        };
        match name.as_str() {
            "latitude" => form.latitude = Some(read_text(field).await?),
            "longitude" => form.longitude = Some(read_text(field).await?),
            "accuracy" => form.accuracy = Some(read_text(field).await?),
            "notes" => form.notes = Some(read_text(field).await?),
            "files" => form.files.push(read_file(field).await?),
            "paymentCollected" => form.payment_collected = Some(read_text(field).await?),
            "paymentAmount" => form.payment_amount = Some(read_text(field).await?),
            "paymentNotes" => form.payment_notes = Some(read_text(field).await?),
            "invoiceFile" => form.invoice_file = Some(read_file(field).await?),
            _ => {}
        }
    }
    Ok(form)
}

fn required(value: Option<String>, field: &str) -> Result<String, ApiError> {
    value.ok_or_else(|| ApiError::unprocessable(format!("{field} is required")))
}

fn parse_collected_flag(raw: &str) -> Result<bool, ApiError> {
    match raw.trim() {
        "true" | "1" => Ok(true),
        "false" | "0" | "" => Ok(false),
        other => Err(ApiError::unprocessable(format!(
            "invalid paymentCollected value '{other}'"
        ))),
    }
}

/// Reads a check-in form.
///
/// # Errors
///
/// Returns a 400 for an unreadable body and a 422 when required fields are
/// absent.
pub async fn read_check_in(
    task_id: TaskId,
    multipart: &mut Multipart,
) -> Result<CheckInRequest, ApiError> {
    let form = collect(multipart).await?;
    let latitude = required(form.latitude, "latitude")?;
    let longitude = required(form.longitude, "longitude")?;
    let mut request = CheckInRequest::new(task_id, latitude, longitude).with_files(form.files);
    if let Some(accuracy) = form.accuracy {
        request = request.with_accuracy(accuracy);
    }
    if let Some(notes) = form.notes {
        request = request.with_notes(notes);
    }
    Ok(request)
}

/// Reads a check-out form: the check-in fields plus the payment block.
///
/// # Errors
///
/// As for [`read_check_in`], plus a 422 for an unparseable
/// `paymentCollected` flag.
pub async fn read_check_out(
    task_id: TaskId,
    multipart: &mut Multipart,
) -> Result<CheckOutRequest, ApiError> {
    let form = collect(multipart).await?;
    let latitude = required(form.latitude, "latitude")?;
    let longitude = required(form.longitude, "longitude")?;
    let mut request = CheckOutRequest::new(task_id, latitude, longitude).with_files(form.files);
    if let Some(accuracy) = form.accuracy {
        request = request.with_accuracy(accuracy);
    }
    if let Some(notes) = form.notes {
        request = request.with_notes(notes);
    }
    if form
        .payment_collected
        .as_deref()
        .map(parse_collected_flag)
        .transpose()?
        .unwrap_or(false)
    {
        request = request.with_payment_collected();
    }
    if let Some(amount) = form.payment_amount {
        request = request.with_payment_amount(amount);
    }
    if let Some(notes) = form.payment_notes {
        request = request.with_payment_notes(notes);
    }
    if let Some(file) = form.invoice_file {
        request = request.with_invoice_file(file);
    }
    Ok(request)
}

/// Reads a bare attachment-upload form: one or more `files` parts.
///
/// # Errors
///
/// Returns a 400 for an unreadable body and a 422 when no file part is
/// present.
pub async fn read_uploads(multipart: &mut Multipart) -> Result<Vec<FileUpload>, ApiError> {
    let form = collect(multipart).await?;
    if form.files.is_empty() {
        return Err(ApiError::unprocessable("at least one file is required"));
    }
    Ok(form.files)
}
