//! Upload-then-publish sequence shared by every front end

use crate::render::RenderedArticle;
use quill_domain::traits::Publisher;
use quill_domain::{GeneratedImage, MediaId, PostId};
use tracing::{info, warn};

/// Where a published article ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishOutcome {
    /// Created post
    pub post_id: PostId,
    /// Editor URL for the draft
    pub edit_url: String,
    /// Featured image, when its upload succeeded
    pub featured_media_id: Option<MediaId>,
}

/// File name for an article's featured image
pub fn featured_filename(slug: &str) -> String {
    let slug = slug.trim();
    if slug.is_empty() {
        "featured-image.png".to_string()
    } else {
        format!("{}.png", slug)
    }
}

/// Publish `rendered`, uploading `featured` first when given
///
/// A failed image upload is logged and the article is published without a
/// featured image; only the post creation itself can fail the call.
pub async fn publish_article<P: Publisher>(
    publisher: &P,
    mut rendered: RenderedArticle,
    featured: Option<&GeneratedImage>,
) -> Result<PublishOutcome, P::Error> {
    if let Some(image) = featured {
        let filename = featured_filename(&rendered.request.slug);
        match publisher.upload_media(image, &filename).await {
            Ok(media_id) => rendered.request.featured_media_id = Some(media_id),
            Err(e) => warn!("Featured image upload failed, publishing without it: {}", e),
        }
    }

    let post_id = publisher.publish(&rendered.request).await?;
    let edit_url = publisher.edit_url(post_id);
    info!(post_id = %post_id, edit_url = %edit_url, "Draft ready for review");

    Ok(PublishOutcome {
        post_id,
        edit_url,
        featured_media_id: rendered.request.featured_media_id,
    })
}
