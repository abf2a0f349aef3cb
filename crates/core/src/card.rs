//! Product card view logic and its story fixtures.
//!
//! A product card shows one product with its price, an optional strike-through
//! original price, the first image and a truncated description, plus an
//! "add to cart" form. [`ProductCardStory`] enumerates the fixed states the
//! styleguide renders.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::catalog::Product;
use crate::types::{CurrencyCode, Price, ProductId, Sku};

/// Form target for the card's "add to cart" action.
pub const ADD_TO_CART_ACTION: &str = "/cart/add";

/// Base path for bare image filenames.
pub const IMAGE_BASE_PATH: &str = "/static/images/";

/// Inputs of a product card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductCard {
    pub product: Product,
    /// Whether the product already has a line in the visitor's cart.
    pub in_cart: bool,
    /// Price before a sale; shown struck through when above the current price.
    pub original_price: Option<Decimal>,
    /// Maximum description length in characters.
    pub description_length: usize,
}

/// Render-ready product card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductCardView {
    pub product_id: ProductId,
    pub title: String,
    pub sku: String,
    pub price: String,
    pub original_price: Option<String>,
    pub discount_percent: Option<u32>,
    pub image_url: Option<String>,
    pub description: Option<String>,
    pub in_cart: bool,
    pub add_to_cart_action: &'static str,
}

impl ProductCardView {
    /// Whether the card is showing a sale price.
    #[must_use]
    pub const fn on_sale(&self) -> bool {
        self.original_price.is_some()
    }
}

impl ProductCard {
    /// Default description length used by the product grid.
    pub const DEFAULT_DESCRIPTION_LENGTH: usize = 100;

    /// Card for `product` with default options.
    #[must_use]
    pub fn new(product: Product) -> Self {
        Self {
            product,
            in_cart: false,
            original_price: None,
            description_length: Self::DEFAULT_DESCRIPTION_LENGTH,
        }
    }

    /// Mark the product as already in the cart.
    #[must_use]
    pub fn in_cart(mut self, in_cart: bool) -> Self {
        self.in_cart = in_cart;
        self
    }

    /// Set the pre-sale price.
    #[must_use]
    pub fn original_price(mut self, price: Option<Decimal>) -> Self {
        self.original_price = price;
        self
    }

    /// Set the description truncation length.
    #[must_use]
    pub fn description_length(mut self, length: usize) -> Self {
        self.description_length = length;
        self
    }

    /// The original price, only when it is strictly above the current price.
    #[must_use]
    pub fn sale_price_from(&self) -> Option<Decimal> {
        self.original_price.filter(|orig| *orig > self.product.price)
    }

    /// Whole-percent discount, rounded half away from zero.
    #[must_use]
    pub fn discount_percent(&self) -> Option<u32> {
        let original = self.sale_price_from()?;
        let saved = (original - self.product.price) / original * Decimal::ONE_HUNDRED;
        saved
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_u32()
    }

    /// Build the view for `currency`.
    #[must_use]
    pub fn view(&self, currency: CurrencyCode) -> ProductCardView {
        let product = &self.product;
        ProductCardView {
            product_id: product.id,
            title: product.title.clone(),
            sku: product.sku.to_string(),
            price: Price::new(product.price, currency).display(),
            original_price: self
                .sale_price_from()
                .map(|p| Price::new(p, currency).display()),
            discount_percent: self.discount_percent(),
            image_url: product.images.first().map(|i| image_url(i)),
            description: product
                .description
                .as_deref()
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(|d| truncate(d, self.description_length)),
            in_cart: self.in_cart,
            add_to_cart_action: ADD_TO_CART_ACTION,
        }
    }
}

/// Public URL for an image reference.
///
/// Absolute paths and URLs are kept; bare filenames are served from
/// [`IMAGE_BASE_PATH`].
#[must_use]
pub fn image_url(image: &str) -> String {
    if image.starts_with('/') || image.starts_with("http://") || image.starts_with("https://") {
        image.to_owned()
    } else {
        format!("{IMAGE_BASE_PATH}{image}")
    }
}

/// Cut `text` to at most `max_chars` characters, appending `…` when cut.
///
/// Counts characters, not bytes, and trims trailing whitespace before the
/// ellipsis.
#[must_use]
pub fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        None => text.to_owned(),
        Some((byte_idx, _)) => {
            let mut cut = text
                .get(..byte_idx)
                .unwrap_or(text)
                .trim_end()
                .to_owned();
            cut.push('…');
            cut
        }
    }
}

/// Fixed product card states shown in the styleguide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProductCardStory {
    Default,
    OnSale,
    InCart,
    NoImage,
    ShortDescription,
    NoDescription,
}

impl ProductCardStory {
    /// Every story, in display order.
    pub const ALL: [Self; 6] = [
        Self::Default,
        Self::OnSale,
        Self::InCart,
        Self::NoImage,
        Self::ShortDescription,
        Self::NoDescription,
    ];

    /// URL segment for the story.
    #[must_use]
    pub const fn slug(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::OnSale => "on-sale",
            Self::InCart => "in-cart",
            Self::NoImage => "no-image",
            Self::ShortDescription => "short-description",
            Self::NoDescription => "no-description",
        }
    }

    /// Human-readable story name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Default => "Default",
            Self::OnSale => "On Sale",
            Self::InCart => "In Cart",
            Self::NoImage => "No Image",
            Self::ShortDescription => "Short Description",
            Self::NoDescription => "No Description",
        }
    }

    /// Look up a story by its slug.
    #[must_use]
    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.slug() == slug)
    }

    /// The card inputs for this story.
    #[must_use]
    pub fn card(&self) -> ProductCard {
        let product = story_product();
        match self {
            Self::Default => ProductCard::new(product),
            Self::OnSale => ProductCard::new(Product {
                price: Decimal::new(89999, 2),
                ..product
            })
            .original_price(Some(Decimal::new(99999, 2))),
            Self::InCart => ProductCard::new(product).in_cart(true),
            Self::NoImage => ProductCard::new(Product {
                images: Vec::new(),
                ..product
            }),
            Self::ShortDescription => ProductCard::new(product).description_length(50),
            Self::NoDescription => ProductCard::new(Product {
                description: None,
                ..product
            }),
        }
    }
}

/// The product every story starts from.
fn story_product() -> Product {
    Product {
        id: ProductId::new(1),
        title: "iPhone 16 5G 128GB".to_owned(),
        sku: Sku::new_unchecked("PHONE-X-001".to_owned()),
        images: vec![
            "iphone-green.avif".to_owned(),
            "iphone-black.avif".to_owned(),
        ],
        description: Some(
            "The Apple iPhone 16 5G 128GB represents the absolute pinnacle of the industry \
             in terms of design and features. The powerful A18 chip ensures unparalleled \
             speed and the 6.1-inch Super Retina XDR display reproduces everything with \
             incredible clarity. Thanks to the long battery life, you can use your phone \
             worry-free all day long."
                .to_owned(),
        ),
        price: Decimal::new(67599, 2),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_text_unchanged() {
        assert_eq!(truncate("Short", 10), "Short");
        assert_eq!(truncate("Exactly10!", 10), "Exactly10!");
    }

    #[test]
    fn test_truncate_appends_ellipsis() {
        assert_eq!(truncate("Hello wonderful world", 5), "Hello…");
        assert_eq!(truncate("Hello wonderful world", 6), "Hello…");
    }

    #[test]
    fn test_truncate_counts_characters_not_bytes() {
        assert_eq!(truncate("Größenänderung", 4), "Größ…");
    }

    #[test]
    fn test_image_url() {
        assert_eq!(image_url("laptop-pro.jpg"), "/static/images/laptop-pro.jpg");
        assert_eq!(image_url("/assets/a.avif"), "/assets/a.avif");
        assert_eq!(image_url("https://cdn.test/a.jpg"), "https://cdn.test/a.jpg");
    }

    #[test]
    fn test_default_story() {
        let view = ProductCardStory::Default.card().view(CurrencyCode::EUR);
        assert_eq!(view.title, "iPhone 16 5G 128GB");
        assert_eq!(view.price, "€675.99");
        assert!(!view.on_sale());
        assert!(!view.in_cart);
        assert_eq!(
            view.image_url.as_deref(),
            Some("/static/images/iphone-green.avif")
        );
        let description = view.description.unwrap();
        assert!(description.ends_with('…'));
        assert!(description.chars().count() <= 101);
        assert_eq!(view.add_to_cart_action, "/cart/add");
    }

    #[test]
    fn test_on_sale_story() {
        let view = ProductCardStory::OnSale.card().view(CurrencyCode::EUR);
        assert_eq!(view.price, "€899.99");
        assert_eq!(view.original_price.as_deref(), Some("€999.99"));
        assert_eq!(view.discount_percent, Some(10));
        assert!(view.on_sale());
    }

    #[test]
    fn test_original_price_not_above_current_is_ignored() {
        let card = ProductCardStory::Default
            .card()
            .original_price(Some(Decimal::new(67599, 2)));
        let view = card.view(CurrencyCode::EUR);
        assert!(!view.on_sale());
        assert_eq!(view.discount_percent, None);
    }

    #[test]
    fn test_in_cart_story() {
        assert!(ProductCardStory::InCart.card().view(CurrencyCode::EUR).in_cart);
    }

    #[test]
    fn test_no_image_story() {
        let view = ProductCardStory::NoImage.card().view(CurrencyCode::EUR);
        assert_eq!(view.image_url, None);
    }

    #[test]
    fn test_short_description_story() {
        let view = ProductCardStory::ShortDescription
            .card()
            .view(CurrencyCode::EUR);
        let description = view.description.unwrap();
        assert!(description.chars().count() <= 51);
        assert!(description.starts_with("The Apple iPhone 16 5G 128GB"));
    }

    #[test]
    fn test_no_description_story() {
        let view = ProductCardStory::NoDescription.card().view(CurrencyCode::EUR);
        assert_eq!(view.description, None);
    }

    #[test]
    fn test_story_slugs_roundtrip() {
        for story in ProductCardStory::ALL {
            assert_eq!(ProductCardStory::from_slug(story.slug()), Some(story));
        }
        assert_eq!(ProductCardStory::from_slug("missing"), None);
    }
}
