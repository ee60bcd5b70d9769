pub mod categories;
pub mod coupons;
pub mod enums;
pub mod order_items;
pub mod orders;
pub mod product_images;
pub mod products;
pub mod settings;
pub mod user_addresses;
pub mod user_profiles;
pub mod users;

pub use categories::Entity as Categories;
pub use coupons::Entity as Coupons;
pub use order_items::Entity as OrderItems;
pub use orders::Entity as Orders;
pub use product_images::Entity as ProductImages;
pub use products::Entity as Products;
pub use settings::Entity as Settings;
pub use user_addresses::Entity as UserAddresses;
pub use user_profiles::Entity as UserProfiles;
pub use users::Entity as Users;
