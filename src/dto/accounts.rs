use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{UserAddress, UserProfile};

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub cpf: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddressRequest {
    pub label: Option<String>,
    pub recipient: String,
    pub street: String,
    pub number: String,
    pub complement: Option<String>,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    #[serde(default)]
    pub is_default: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AddressList {
    pub items: Vec<UserAddress>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Account {
    pub email: String,
    pub role: String,
    pub profile: Option<UserProfile>,
}
