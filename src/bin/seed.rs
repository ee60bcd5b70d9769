use embroidery_store_api::{
    config::AppConfig,
    db::{create_pool, run_migrations},
    middleware::auth::ROLE_ADMIN,
    services::auth_service::hash_password,
    shipping::melhor_envio::LabelParty,
    slug::slugify,
};
use uuid::Uuid;

struct SeedProduct {
    name: &'static str,
    description: &'static str,
    price: i64,
    category: &'static str,
    featured: bool,
    customizable: bool,
    colors: &'static [&'static str],
    weight_grams: i32,
}

const CATEGORIES: &[&str] = &["Enxoval", "Toalhas", "Naninhas", "Saídas de maternidade"];

const PRODUCTS: &[SeedProduct] = &[
    SeedProduct {
        name: "Manta bordada com nome",
        description: "Manta de algodão com o nome do bebê bordado à mão",
        price: 18990,
        category: "Enxoval",
        featured: true,
        customizable: true,
        colors: &["Azul", "Rosa", "Verde", "Cru"],
        weight_grams: 450,
    },
    SeedProduct {
        name: "Toalha de banho com capuz",
        description: "Toalha felpuda com capuz e bordado de bichinho",
        price: 12990,
        category: "Toalhas",
        featured: true,
        customizable: true,
        colors: &["Azul", "Rosa", "Amarelo"],
        weight_grams: 500,
    },
    SeedProduct {
        name: "Kit fraldas de boca",
        description: "Três fraldas de boca com barrado bordado",
        price: 6990,
        category: "Enxoval",
        featured: false,
        customizable: false,
        colors: &[],
        weight_grams: 200,
    },
    SeedProduct {
        name: "Naninha coelho",
        description: "Naninha de tricoline com orelhas de coelho",
        price: 8990,
        category: "Naninhas",
        featured: false,
        customizable: true,
        colors: &["Rosa", "Cinza"],
        weight_grams: 150,
    },
    SeedProduct {
        name: "Saída de maternidade bordada",
        description: "Conjunto de três peças com monograma",
        price: 24990,
        category: "Saídas de maternidade",
        featured: true,
        customizable: true,
        colors: &["Branco", "Cru"],
        weight_grams: 400,
    },
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    run_migrations(&pool).await?;

    let admin_email = config
        .store
        .admin_email
        .clone()
        .unwrap_or_else(|| "admin@example.com".to_string());
    let admin_password =
        std::env::var("SEED_ADMIN_PASSWORD").unwrap_or_else(|_| "admin12345".to_string());
    let admin_id = ensure_admin(&pool, &admin_email, &admin_password).await?;

    seed_categories(&pool).await?;
    seed_products(&pool).await?;
    seed_coupon(&pool).await?;
    seed_store_address(&pool, &config, &admin_email).await?;

    println!("Seed completed. Admin ID: {admin_id}");
    Ok(())
}

async fn ensure_admin(pool: &sqlx::PgPool, email: &str, password: &str) -> anyhow::Result<Uuid> {
    let password_hash = hash_password(password).map_err(|e| anyhow::anyhow!(e.to_string()))?;

    let (user_id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO users (id, email, password_hash, role)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (email) DO UPDATE SET role = EXCLUDED.role
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(password_hash)
    .bind(ROLE_ADMIN)
    .fetch_one(pool)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO user_profiles (user_id, full_name)
        VALUES ($1, $2)
        ON CONFLICT (user_id) DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind("Administração")
    .execute(pool)
    .await?;

    println!("Ensured admin {email}");
    Ok(user_id)
}

async fn seed_categories(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    for &name in CATEGORIES {
        sqlx::query(
            r#"
            INSERT INTO categories (id, name, slug)
            VALUES ($1, $2, $3)
            ON CONFLICT (slug) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(slugify(name))
        .execute(pool)
        .await?;
    }

    println!("Seeded categories");
    Ok(())
}

async fn seed_products(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    for product in PRODUCTS {
        sqlx::query(
            r#"
            INSERT INTO products
                (id, name, description, price, category_id, featured, customizable, color_options, weight_grams)
            VALUES ($1, $2, $3, $4, (SELECT id FROM categories WHERE slug = $5), $6, $7, $8, $9)
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(product.name)
        .bind(product.description)
        .bind(product.price)
        .bind(slugify(product.category))
        .bind(product.featured)
        .bind(product.customizable)
        .bind(serde_json::json!(product.colors))
        .bind(product.weight_grams)
        .execute(pool)
        .await?;
    }

    println!("Seeded products");
    Ok(())
}

async fn seed_coupon(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO coupons (id, code, discount_type, discount_value, min_order_value, is_active)
        VALUES ($1, 'BEMVINDO10', 'percentage', 10, 10000, TRUE)
        ON CONFLICT (code) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4())
    .execute(pool)
    .await?;

    println!("Seeded coupon BEMVINDO10");
    Ok(())
}

/// Sender address printed on shipping labels; edit it later in the admin settings.
async fn seed_store_address(
    pool: &sqlx::PgPool,
    config: &AppConfig,
    email: &str,
) -> anyhow::Result<()> {
    let sender = LabelParty {
        name: config.store.name.clone(),
        phone: "22999999999".to_string(),
        email: email.to_string(),
        address: "Rua do Ateliê".to_string(),
        number: "1".to_string(),
        complement: None,
        district: "Centro".to_string(),
        city: "Cabo Frio".to_string(),
        state_abbr: "RJ".to_string(),
        postal_code: config.store.origin_postal_code.clone(),
    };

    sqlx::query(
        r#"
        INSERT INTO settings (key, value)
        VALUES ('store_address', $1)
        ON CONFLICT (key) DO NOTHING
        "#,
    )
    .bind(serde_json::to_value(&sender)?)
    .execute(pool)
    .await?;

    println!("Seeded store address");
    Ok(())
}
