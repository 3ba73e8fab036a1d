use url::Url;
use uuid::Uuid;

use crate::feed::FeedImage;

pub const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedEndpoint {
    pub page_size: usize,
}

impl Default for FeedEndpoint {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl FeedEndpoint {
    /// `<base>/v1/feed?limit=N`, plus `after_id` when paging past an image.
    pub fn get(&self, base_url: &Url, after: Option<&FeedImage>) -> Result<Url, url::ParseError> {
        let mut url = as_directory(base_url).join("v1/feed")?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("limit", &self.page_size.to_string());
            if let Some(image) = after {
                query.append_pair("after_id", &image.id.to_string());
            }
        }
        Ok(url)
    }
}

pub struct ImageCommentsEndpoint;

impl ImageCommentsEndpoint {
    pub fn get(base_url: &Url, image_id: Uuid) -> Result<Url, url::ParseError> {
        as_directory(base_url).join(&format!("v1/image/{image_id}/comments"))
    }
}

// Url::join drops the last path segment unless the base ends with '/'.
fn as_directory(base_url: &Url) -> Url {
    let mut base = base_url.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base
}
