use serde::Deserialize;
use validator::Validate;

use crate::domain::types::{PlainPassword, Username};
use crate::forms::{FieldResult, FormError};

#[derive(Debug, Deserialize, Validate)]
pub struct LoginForm {
    #[validate(length(min = 1))]
    pub username: String,
    #[validate(length(min = 1))]
    pub password: String,
}

impl LoginForm {
    pub fn username(&self) -> Result<Username, FormError> {
        Username::new(self.username.as_str()).field("username")
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct ChangePasswordForm {
    #[validate(length(min = 1))]
    pub old_password: String,
    #[validate(length(min = 8))]
    pub new_password: String,
}

impl ChangePasswordForm {
    pub fn new_password(&self) -> Result<PlainPassword, FormError> {
        PlainPassword::new(self.new_password.as_str()).field("new_password")
    }
}
