use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
    ActiveValue::NotSet,
    sea_query::{Expr, Func, LockType, extension::postgres::PgExpr},
};
use uuid::Uuid;

use crate::{
    audit,
    dto::products::{
        CategoryList, CategoryRequest, CreateProductRequest, ImageList, ProductDetail,
        ProductList, ReorderImagesRequest, UpdateProductRequest,
    },
    entity::{
        categories::{ActiveModel as CategoryActive, Column as CategoryCol, Entity as Categories},
        product_images::{ActiveModel as ImageActive, Column as ImageCol, Entity as ProductImages},
        products::{ActiveModel, Column, Entity as Products},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Category, Dimensions, Product, ProductImage},
    pricing::MAX_AMOUNT,
    response::{ApiResponse, Meta},
    routes::params::{ProductQuery, ProductSortBy, SortOrder},
    services::contains_pattern,
    slug::slugify,
    state::AppState,
};

fn check_price(price: i64) -> AppResult<()> {
    if price <= 0 {
        return Err(AppError::BadRequest("Price must be greater than zero".into()));
    }
    if price > MAX_AMOUNT {
        return Err(AppError::BadRequest("Price is too large".into()));
    }
    Ok(())
}

const DEFAULT_DIMENSIONS: Dimensions = Dimensions {
    weight_grams: 300,
    height_cm: 4,
    width_cm: 20,
    length_cm: 25,
};

pub const ALLOWED_IMAGE_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/webp", "image/gif"];

fn validate_dimensions(dims: &Dimensions) -> AppResult<()> {
    if dims.weight_grams <= 0 || dims.height_cm <= 0 || dims.width_cm <= 0 || dims.length_cm <= 0 {
        return Err(AppError::BadRequest(
            "Product dimensions must be positive".into(),
        ));
    }
    Ok(())
}

fn clean_colors(colors: Vec<String>) -> Vec<String> {
    let mut cleaned: Vec<String> = Vec::new();
    for color in colors {
        let color = color.trim().to_string();
        if !color.is_empty() && !cleaned.contains(&color) {
            cleaned.push(color);
        }
    }
    cleaned
}

async fn ensure_category_exists(state: &AppState, id: Uuid) -> AppResult<()> {
    if Categories::find_by_id(id).one(&state.orm).await?.is_none() {
        return Err(AppError::BadRequest("Category does not exist".into()));
    }
    Ok(())
}

async fn ensure_unique_name(state: &AppState, name: &str, except: Option<Uuid>) -> AppResult<()> {
    let mut condition = Condition::all()
        .add(Expr::expr(Func::lower(Expr::col(Column::Name))).eq(name.to_lowercase()));
    if let Some(id) = except {
        condition = condition.add(Column::Id.ne(id));
    }
    if Products::find().filter(condition).count(&state.orm).await? > 0 {
        return Err(AppError::Conflict(format!(
            "A product named {name} already exists"
        )));
    }
    Ok(())
}

pub async fn list_products(
    state: &AppState,
    query: ProductQuery,
) -> AppResult<ApiResponse<ProductList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let mut condition = Condition::all();

    if let Some(search) = query.q.as_ref().filter(|s| !s.is_empty()) {
        let pattern = contains_pattern(search);
        condition = condition.add(
            Condition::any()
                .add(Expr::col(Column::Name).ilike(pattern.clone()))
                .add(Expr::col(Column::Description).ilike(pattern)),
        );
    }

    if let Some(slug) = query.category.as_ref().filter(|s| !s.is_empty()) {
        let category = Categories::find()
            .filter(CategoryCol::Slug.eq(slug.as_str()))
            .one(&state.orm)
            .await?;
        match category {
            Some(category) => condition = condition.add(Column::CategoryId.eq(category.id)),
            None => {
                let meta = Meta::new(page, limit, 0);
                return Ok(ApiResponse::success(
                    "Products",
                    ProductList { items: Vec::new() },
                    Some(meta),
                ));
            }
        }
    }

    if let Some(featured) = query.featured {
        condition = condition.add(Column::Featured.eq(featured));
    }

    if let Some(min_price) = query.min_price {
        condition = condition.add(Column::Price.gte(min_price));
    }

    if let Some(max_price) = query.max_price {
        condition = condition.add(Column::Price.lte(max_price));
    }

    let sort_by = query.sort_by.unwrap_or(ProductSortBy::CreatedAt);
    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);
    let sort_col = match sort_by {
        ProductSortBy::CreatedAt => Column::CreatedAt,
        ProductSortBy::Price => Column::Price,
        ProductSortBy::Name => Column::Name,
    };

    let mut finder = Products::find().filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(sort_col),
        SortOrder::Desc => finder.order_by_desc(sort_col),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Product::from)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Products",
        ProductList { items },
        Some(meta),
    ))
}

pub async fn get_product(state: &AppState, id: Uuid) -> AppResult<ApiResponse<ProductDetail>> {
    let product = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let category = match product.category_id {
        Some(category_id) => Categories::find_by_id(category_id)
            .one(&state.orm)
            .await?
            .map(Category::from),
        None => None,
    };

    let images = ProductImages::find()
        .filter(ImageCol::ProductId.eq(product.id))
        .order_by_asc(ImageCol::DisplayOrder)
        .order_by_asc(ImageCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(ProductImage::from)
        .collect();

    Ok(ApiResponse::success(
        "Product",
        ProductDetail {
            product: Product::from(product),
            category,
            images,
        },
        None,
    ))
}

pub async fn create_product(
    state: &AppState,
    user: &AuthUser,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(user)?;
    let name = payload.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::BadRequest("Product name is required".into()));
    }
    check_price(payload.price)?;
    let dims = payload.dimensions.unwrap_or(DEFAULT_DIMENSIONS);
    validate_dimensions(&dims)?;
    if let Some(category_id) = payload.category_id {
        ensure_category_exists(state, category_id).await?;
    }
    ensure_unique_name(state, &name, None).await?;

    let now = Utc::now();
    let product = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name),
        description: Set(payload.description),
        price: Set(payload.price),
        category_id: Set(payload.category_id),
        featured: Set(payload.featured),
        weight_grams: Set(dims.weight_grams),
        height_cm: Set(dims.height_cm),
        width_cm: Set(dims.width_cm),
        length_cm: Set(dims.length_cm),
        customizable: Set(payload.customizable),
        color_options: Set(serde_json::json!(clean_colors(payload.color_options))),
        details: Set(payload.details.unwrap_or_else(|| serde_json::json!({}))),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "product_create",
        "products",
        serde_json::json!({ "product_id": product.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Product created",
        Product::from(product),
        Some(Meta::empty()),
    ))
}

pub async fn update_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(user)?;
    let existing = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut active: ActiveModel = existing.into();
    if let Some(name) = payload.name {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::BadRequest("Product name is required".into()));
        }
        ensure_unique_name(state, &name, Some(id)).await?;
        active.name = Set(name);
    }
    if let Some(description) = payload.description {
        active.description = Set(Some(description));
    }
    if let Some(price) = payload.price {
        check_price(price)?;
        active.price = Set(price);
    }
    if let Some(category_id) = payload.category_id {
        ensure_category_exists(state, category_id).await?;
        active.category_id = Set(Some(category_id));
    }
    if let Some(featured) = payload.featured {
        active.featured = Set(featured);
    }
    if let Some(dims) = payload.dimensions {
        validate_dimensions(&dims)?;
        active.weight_grams = Set(dims.weight_grams);
        active.height_cm = Set(dims.height_cm);
        active.width_cm = Set(dims.width_cm);
        active.length_cm = Set(dims.length_cm);
    }
    if let Some(customizable) = payload.customizable {
        active.customizable = Set(customizable);
    }
    if let Some(colors) = payload.color_options {
        active.color_options = Set(serde_json::json!(clean_colors(colors)));
    }
    if let Some(details) = payload.details {
        active.details = Set(details);
    }
    active.updated_at = Set(Utc::now().into());

    let product = active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "product_update",
        "products",
        serde_json::json!({ "product_id": product.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Updated",
        Product::from(product),
        Some(Meta::empty()),
    ))
}

pub async fn delete_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let images = ProductImages::find()
        .filter(ImageCol::ProductId.eq(id))
        .all(&state.orm)
        .await?;

    let result = Products::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    for image in images {
        if let Err(err) = state.blobs.delete(&image.url).await {
            tracing::warn!(error = %err, image_id = %image.id, "image cleanup failed");
        }
    }

    audit::record(
        &state.pool,
        Some(user.user_id),
        "product_delete",
        "products",
        serde_json::json!({ "product_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn list_categories(state: &AppState) -> AppResult<ApiResponse<CategoryList>> {
    let items = Categories::find()
        .order_by_asc(CategoryCol::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Category::from)
        .collect();
    Ok(ApiResponse::success("Categories", CategoryList { items }, None))
}

fn category_slug(payload: &CategoryRequest) -> AppResult<(String, String)> {
    let name = payload.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::BadRequest("Category name is required".into()));
    }
    let slug = slugify(payload.slug.as_deref().unwrap_or(&name));
    if slug.is_empty() {
        return Err(AppError::BadRequest("Category slug is empty".into()));
    }
    Ok((name, slug))
}

async fn ensure_unique_slug(state: &AppState, slug: &str, except: Option<Uuid>) -> AppResult<()> {
    let mut condition = Condition::all().add(CategoryCol::Slug.eq(slug));
    if let Some(id) = except {
        condition = condition.add(CategoryCol::Id.ne(id));
    }
    if Categories::find().filter(condition).count(&state.orm).await? > 0 {
        return Err(AppError::Conflict(format!("Category {slug} already exists")));
    }
    Ok(())
}

pub async fn create_category(
    state: &AppState,
    user: &AuthUser,
    payload: CategoryRequest,
) -> AppResult<ApiResponse<Category>> {
    ensure_admin(user)?;
    let (name, slug) = category_slug(&payload)?;
    ensure_unique_slug(state, &slug, None).await?;

    let category = CategoryActive {
        id: Set(Uuid::new_v4()),
        name: Set(name),
        slug: Set(slug),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "category_create",
        "categories",
        serde_json::json!({ "category_id": category.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Category created",
        Category::from(category),
        Some(Meta::empty()),
    ))
}

pub async fn update_category(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: CategoryRequest,
) -> AppResult<ApiResponse<Category>> {
    ensure_admin(user)?;
    let existing = Categories::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    let (name, slug) = category_slug(&payload)?;
    ensure_unique_slug(state, &slug, Some(id)).await?;

    let mut active: CategoryActive = existing.into();
    active.name = Set(name);
    active.slug = Set(slug);
    let category = active.update(&state.orm).await?;

    Ok(ApiResponse::success(
        "Updated",
        Category::from(category),
        Some(Meta::empty()),
    ))
}

pub async fn delete_category(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let in_use = Products::find()
        .filter(Column::CategoryId.eq(id))
        .count(&state.orm)
        .await?;
    if in_use > 0 {
        return Err(AppError::Conflict(format!(
            "Category still has {in_use} products"
        )));
    }

    let result = Categories::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.pool,
        Some(user.user_id),
        "category_delete",
        "categories",
        serde_json::json!({ "category_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

/// An uploaded image file as read from the multipart body.
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
    pub alt_text: Option<String>,
}

pub async fn upload_image(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
    upload: ImageUpload,
) -> AppResult<ApiResponse<ProductImage>> {
    ensure_admin(user)?;
    if !ALLOWED_IMAGE_TYPES.contains(&upload.content_type.as_str()) {
        return Err(AppError::BadRequest(format!(
            "Unsupported image type {}",
            upload.content_type
        )));
    }
    if upload.bytes.is_empty() {
        return Err(AppError::BadRequest("Image file is empty".into()));
    }
    Products::find_by_id(product_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let next_order = ProductImages::find()
        .filter(ImageCol::ProductId.eq(product_id))
        .count(&state.orm)
        .await? as i32;

    let pathname = format!("products/{product_id}/{}", slug_file_name(&upload.file_name));
    let url = state
        .blobs
        .put(&pathname, &upload.content_type, upload.bytes)
        .await?;

    let image = ImageActive {
        id: Set(Uuid::new_v4()),
        product_id: Set(product_id),
        url: Set(url),
        alt_text: Set(upload.alt_text.filter(|a| !a.trim().is_empty())),
        display_order: Set(next_order),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "product_image_upload",
        "product_images",
        serde_json::json!({ "product_id": product_id, "image_id": image.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Image uploaded",
        ProductImage::from(image),
        Some(Meta::empty()),
    ))
}

fn slug_file_name(file_name: &str) -> String {
    let (stem, ext) = match file_name.rsplit_once('.') {
        Some((stem, ext)) => (stem, Some(ext.to_ascii_lowercase())),
        None => (file_name, None),
    };
    let stem = match slugify(stem) {
        s if s.is_empty() => "image".to_string(),
        s => s,
    };
    match ext {
        Some(ext) if ext.chars().all(|c| c.is_ascii_alphanumeric()) => format!("{stem}.{ext}"),
        _ => stem,
    }
}

pub async fn delete_image(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
    image_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let image = ProductImages::find()
        .filter(
            Condition::all()
                .add(ImageCol::Id.eq(image_id))
                .add(ImageCol::ProductId.eq(product_id)),
        )
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    ProductImages::delete_by_id(image.id).exec(&state.orm).await?;

    if let Err(err) = state.blobs.delete(&image.url).await {
        tracing::warn!(error = %err, image_id = %image.id, "image cleanup failed");
    }

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn reorder_images(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
    payload: ReorderImagesRequest,
) -> AppResult<ApiResponse<ImageList>> {
    ensure_admin(user)?;
    let txn = state.orm.begin().await?;
    let images = ProductImages::find()
        .filter(ImageCol::ProductId.eq(product_id))
        .lock(LockType::Update)
        .all(&txn)
        .await?;

    let mut requested = payload.image_ids.clone();
    requested.sort();
    requested.dedup();
    let mut current: Vec<Uuid> = images.iter().map(|i| i.id).collect();
    current.sort();
    if requested != current || payload.image_ids.len() != current.len() {
        return Err(AppError::BadRequest(
            "image_ids must list every image of the product exactly once".into(),
        ));
    }

    for (position, image_id) in payload.image_ids.iter().enumerate() {
        ProductImages::update_many()
            .col_expr(ImageCol::DisplayOrder, Expr::value(position as i32))
            .filter(ImageCol::Id.eq(*image_id))
            .exec(&txn)
            .await?;
    }

    let items = ProductImages::find()
        .filter(ImageCol::ProductId.eq(product_id))
        .order_by_asc(ImageCol::DisplayOrder)
        .all(&txn)
        .await?
        .into_iter()
        .map(ProductImage::from)
        .collect();
    txn.commit().await?;

    Ok(ApiResponse::success(
        "Images reordered",
        ImageList { items },
        Some(Meta::empty()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_paths_are_slugged() {
        assert_eq!(slug_file_name("Foto Bebê 01.JPG"), "foto-bebe-01.jpg");
        assert_eq!(slug_file_name("???.png"), "image.png");
        assert_eq!(slug_file_name("noext"), "noext");
    }

    #[test]
    fn colors_are_trimmed_and_deduplicated() {
        let colors = clean_colors(vec![
            " Rosa ".into(),
            "Azul".into(),
            "Rosa".into(),
            "".into(),
        ]);
        assert_eq!(colors, ["Rosa", "Azul"]);
    }
}
