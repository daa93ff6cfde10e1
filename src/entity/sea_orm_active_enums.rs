use std::{fmt, str::FromStr};

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    #[sea_orm(string_value = "ADMIN")]
    Admin,
    #[sea_orm(string_value = "OWNER")]
    Owner,
    #[sea_orm(string_value = "CHEF")]
    Chef,
    #[sea_orm(string_value = "WAITER")]
    Waiter,
    #[sea_orm(string_value = "CUSTOMER")]
    Customer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Owner => "OWNER",
            Role::Chef => "CHEF",
            Role::Waiter => "WAITER",
            Role::Customer => "CUSTOMER",
        }
    }

    /// Roles whose self-registration requires the shared registration key.
    pub fn is_privileged(&self) -> bool {
        matches!(self, Role::Admin | Role::Chef | Role::Waiter)
    }

    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Chef | Role::Waiter)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownToken(pub String);

impl FromStr for Role {
    type Err = UnknownToken;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "ADMIN" => Ok(Role::Admin),
            "OWNER" => Ok(Role::Owner),
            "CHEF" => Ok(Role::Chef),
            "WAITER" => Ok(Role::Waiter),
            "CUSTOMER" => Ok(Role::Customer),
            other => Err(UnknownToken(other.to_string())),
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApprovalStatus {
    #[sea_orm(string_value = "PENDING")]
    Pending,
    #[sea_orm(string_value = "APPROVED")]
    Approved,
    #[sea_orm(string_value = "DENIED")]
    Denied,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FunctionType {
    #[sea_orm(string_value = "BIRTHDAY")]
    Birthday,
    #[sea_orm(string_value = "ANNIVERSARY")]
    Anniversary,
    #[sea_orm(string_value = "CORPORATE")]
    Corporate,
    #[sea_orm(string_value = "GET_TOGETHER")]
    GetTogether,
}

impl FromStr for FunctionType {
    type Err = UnknownToken;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "BIRTHDAY" => Ok(FunctionType::Birthday),
            "ANNIVERSARY" => Ok(FunctionType::Anniversary),
            "CORPORATE" => Ok(FunctionType::Corporate),
            "GET_TOGETHER" => Ok(FunctionType::GetTogether),
            other => Err(UnknownToken(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_tokens_are_exact() {
        assert_eq!("CHEF".parse::<Role>(), Ok(Role::Chef));
        assert_eq!(" OWNER ".parse::<Role>(), Ok(Role::Owner));
        assert!("chef".parse::<Role>().is_err());
        assert!("SUPERUSER".parse::<Role>().is_err());
    }

    #[test]
    fn privileged_roles() {
        assert!(Role::Admin.is_privileged());
        assert!(Role::Waiter.is_privileged());
        assert!(!Role::Owner.is_privileged());
        assert!(!Role::Customer.is_privileged());
    }

    #[test]
    fn function_type_tokens() {
        assert_eq!(
            "GET_TOGETHER".parse::<FunctionType>(),
            Ok(FunctionType::GetTogether)
        );
        assert!("WEDDING".parse::<FunctionType>().is_err());
    }
}
