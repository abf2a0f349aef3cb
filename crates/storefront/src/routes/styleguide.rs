//! Styleguide pages rendering UI components in fixed states.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use tracing::instrument;

use shopkeep_core::{ProductCardStory, ProductCardView};

use crate::error::{AppError, Result};
use crate::filters;
use crate::state::AppState;

/// One rendered story.
pub struct StoryView {
    pub slug: &'static str,
    pub name: &'static str,
    pub card: ProductCardView,
}

/// Product card styleguide template.
#[derive(Template, WebTemplate)]
#[template(path = "styleguide/product_card.html")]
pub struct ProductCardStylesTemplate {
    pub stories: Vec<StoryView>,
}

fn story_view(state: &AppState, story: ProductCardStory) -> StoryView {
    StoryView {
        slug: story.slug(),
        name: story.name(),
        card: story.card().view(state.config().currency),
    }
}

/// Every product card story.
#[instrument(skip(state))]
pub async fn product_card(State(state): State<AppState>) -> impl IntoResponse {
    ProductCardStylesTemplate {
        stories: ProductCardStory::ALL
            .into_iter()
            .map(|story| story_view(&state, story))
            .collect(),
    }
}

/// A single product card story.
#[instrument(skip(state))]
pub async fn product_card_story(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse> {
    let story = ProductCardStory::from_slug(&slug)
        .ok_or_else(|| AppError::NotFound(format!("story {slug}")))?;

    Ok(ProductCardStylesTemplate {
        stories: vec![story_view(&state, story)],
    })
}
