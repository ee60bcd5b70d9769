use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Category, Dimensions, Product, ProductImage};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    pub name: String,
    pub description: Option<String>,
    /// Unit price in centavos.
    pub price: i64,
    pub category_id: Option<Uuid>,
    #[serde(default)]
    pub featured: bool,
    pub dimensions: Option<Dimensions>,
    #[serde(default)]
    pub customizable: bool,
    #[serde(default)]
    pub color_options: Vec<String>,
    #[schema(value_type = Option<Object>)]
    pub details: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub category_id: Option<Uuid>,
    pub featured: Option<bool>,
    pub dimensions: Option<Dimensions>,
    pub customizable: Option<bool>,
    pub color_options: Option<Vec<String>>,
    #[schema(value_type = Option<Object>)]
    pub details: Option<serde_json::Value>,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct ProductList {
    #[schema(value_type = Vec<Product>)]
    pub items: Vec<Product>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub category: Option<Category>,
    pub images: Vec<ProductImage>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CategoryRequest {
    pub name: String,
    pub slug: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryList {
    pub items: Vec<Category>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ImageList {
    pub items: Vec<ProductImage>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ReorderImagesRequest {
    /// Image ids in their new display order.
    pub image_ids: Vec<Uuid>,
}

/// Multipart form accepted by the image upload route.
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct ImageUploadForm {
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
    pub alt_text: Option<String>,
}
