//! Decoders for the remote API payloads.
//!
//! Each mapper either returns the whole payload or `MapperError::InvalidData`;
//! there are no partial results.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde::Deserialize;
use url::Url;
use uuid::Uuid;

use crate::error::MapperError;
use crate::feed::{FeedImage, ImageComment};

#[derive(Deserialize)]
struct Root<T> {
    items: Vec<T>,
}

#[derive(Deserialize)]
struct RemoteFeedItem {
    id: Uuid,
    description: Option<String>,
    location: Option<String>,
    image: Url,
}

#[derive(Deserialize)]
struct RemoteComment {
    id: Uuid,
    message: String,
    created_at: DateTime<Utc>,
    author: RemoteAuthor,
}

#[derive(Deserialize)]
struct RemoteAuthor {
    username: String,
}

/// Accepts only `200 OK`.
pub fn map_feed(data: &[u8], status: StatusCode) -> Result<Vec<FeedImage>, MapperError> {
    if status != StatusCode::OK {
        return Err(MapperError::InvalidData);
    }
    let root: Root<RemoteFeedItem> =
        serde_json::from_slice(data).map_err(|_| MapperError::InvalidData)?;
    Ok(root
        .items
        .into_iter()
        .map(|item| FeedImage {
            id: item.id,
            description: item.description,
            location: item.location,
            url: item.image,
        })
        .collect())
}

/// Accepts any `2xx` status.
pub fn map_comments(data: &[u8], status: StatusCode) -> Result<Vec<ImageComment>, MapperError> {
    if !status.is_success() {
        return Err(MapperError::InvalidData);
    }
    let root: Root<RemoteComment> =
        serde_json::from_slice(data).map_err(|_| MapperError::InvalidData)?;
    Ok(root
        .items
        .into_iter()
        .map(|item| ImageComment {
            id: item.id,
            message: item.message,
            created_at: item.created_at,
            username: item.author.username,
        })
        .collect())
}

pub fn map_image_data(data: Bytes, status: StatusCode) -> Result<Bytes, MapperError> {
    if status != StatusCode::OK || data.is_empty() {
        return Err(MapperError::InvalidData);
    }
    Ok(data)
}
