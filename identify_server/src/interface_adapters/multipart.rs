use reqwest::multipart::{Form, Part};

use crate::domain::{IdentifyPayload, TransportError};

// A freshly encoded, single-use form and the content type it will be sent with.
pub struct MultipartBody {
    pub form: Form,
    pub content_type: String,
}

// Encodes the payload: text fields in order, then the binary image part.
pub fn build(payload: &IdentifyPayload) -> Result<MultipartBody, TransportError> {
    let mut form = Form::new();
    for (name, value) in &payload.fields {
        form = form.text(name.clone(), value.clone());
    }

    let image = Part::bytes(payload.image.to_vec())
        .file_name(payload.file.file_name.clone())
        .mime_str(&payload.file.mime)
        .map_err(|err| TransportError::Payload(format!("invalid file mime type: {err}")))?;
    let form = form.part(payload.file.field.clone(), image);

    let content_type = format!("multipart/form-data; boundary={}", form.boundary());
    Ok(MultipartBody { form, content_type })
}
