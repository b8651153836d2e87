use serde_json::{Map, Value};

use crate::{
    error::{Result, StoryError},
    models::story::{AgeGroup, Photo, PhotoMimeType, StoryRequest, StoryStyle},
};

const MIN_CHARACTER_LEN: usize = 2;
const MAX_CHARACTER_LEN: usize = 60;
const MIN_PHOTO_DATA_LEN: usize = 16;

/// Validate an untrusted request body into a [`StoryRequest`].
///
/// Fields are checked in order (ageGroup, favoriteCharacter, storyStyle,
/// childPhoto) and the first failure is returned.
pub fn validate_story_request(raw: &Value) -> Result<StoryRequest> {
    let object = raw
        .as_object()
        .ok_or_else(|| invalid("Request body must be a JSON object."))?;

    let age_group = object
        .get("ageGroup")
        .and_then(Value::as_str)
        .and_then(AgeGroup::from_str)
        .ok_or_else(|| invalid("Age group must be one of: 3-5, 6-8, 9-12."))?;

    let favorite_character = object
        .get("favoriteCharacter")
        .and_then(Value::as_str)
        .ok_or_else(|| invalid("Favorite character is required."))?
        .trim();

    let character_len = favorite_character.chars().count();
    if !(MIN_CHARACTER_LEN..=MAX_CHARACTER_LEN).contains(&character_len) {
        return Err(invalid(
            "Favorite character must be between 2 and 60 characters.",
        ));
    }

    let story_style = object
        .get("storyStyle")
        .and_then(Value::as_str)
        .and_then(StoryStyle::from_str)
        .ok_or_else(|| invalid("Story style is invalid."))?;

    let child_photo = validate_photo(object.get("childPhoto"))?;

    Ok(StoryRequest {
        age_group,
        favorite_character: favorite_character.to_string(),
        story_style,
        child_photo,
    })
}

fn validate_photo(raw: Option<&Value>) -> Result<Photo> {
    let photo: &Map<String, Value> = raw
        .and_then(Value::as_object)
        .ok_or_else(|| invalid("Photo payload is required."))?;

    let base64_data = photo
        .get("base64Data")
        .and_then(Value::as_str)
        .filter(|data| data.trim().chars().count() >= MIN_PHOTO_DATA_LEN)
        .ok_or_else(|| invalid("Photo data is invalid."))?;

    let mime_type = photo
        .get("mimeType")
        .and_then(Value::as_str)
        .and_then(PhotoMimeType::from_str)
        .ok_or_else(|| invalid("Photo type must be JPEG, PNG, or WebP."))?;

    // Absent is fine; present must be a string (null included)
    let file_name = match photo.get("fileName") {
        None => None,
        Some(Value::String(name)) => Some(name.clone()),
        Some(_) => return Err(invalid("Photo filename is invalid.")),
    };

    Ok(Photo {
        base64_data: base64_data.to_string(),
        mime_type,
        file_name,
    })
}

fn invalid(message: &str) -> StoryError {
    StoryError::Validation(message.to_string())
}
