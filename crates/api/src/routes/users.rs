//! Member administration routes: listing, profile updates and removal.

use axum::{Router, extract::State, routing::get};
use brokerdesk_core::auth::{hash_password, verify_password};
use brokerdesk_core::invoice::InvoiceService;
use brokerdesk_core::permission::{
    AccessLevel, InvoiceAccess, PermissionSet, TransactionAccess, UserAccess,
};
use brokerdesk_core::validation::{validate_password, validate_person_name};
use brokerdesk_db::entities::sea_orm_active_enums::UserStatus;
use brokerdesk_db::repositories::{MemberUpdate, MemberView, Removal};
use brokerdesk_db::{PermissionRepository, UserRepository};
use brokerdesk_shared::ObjectRef;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{Envelope, ok};
use crate::{
    AppState,
    error::{ApiError, ApiResult},
    extractors::{Caller, JsonBody, PathParam},
};

/// Creates the member routes, relative to `/user`.
pub fn routes() -> Router<AppState> {
    Router::new().route("/", get(list_users)).route(
        "/{user_id}",
        get(get_user).put(update_user).delete(delete_user),
    )
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// A member as shown to administrators.
///
/// Verified accounts have no role, fees or permissions yet and are shown
/// with the short shape.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum UserResponse {
    /// Approved or withdrawn member.
    Member {
        /// User id.
        id: i64,
        /// Login e-mail.
        email: String,
        /// Display name.
        name: String,
        /// Assigned role.
        role_id: Option<i64>,
        /// Name of the assigned role.
        role_name: Option<String>,
        /// `accepted` or `deleted`.
        status: UserStatus,
        /// Monthly plate fee in won.
        plate_fee: i64,
        /// Contract fee percentage.
        #[serde(with = "rust_decimal::serde::float")]
        contract_fee: Decimal,
        /// User and role access.
        permission_user: Option<UserAccess>,
        /// Transaction access.
        permission_transaction: Option<TransactionAccess>,
        /// Invoice access.
        permission_invoice: Option<InvoiceAccess>,
    },
    /// Verified account waiting for approval.
    Pending {
        /// User id.
        id: i64,
        /// Login e-mail.
        email: String,
        /// Display name.
        name: String,
        /// Always `verified`.
        status: UserStatus,
    },
}

impl From<MemberView> for UserResponse {
    fn from(view: MemberView) -> Self {
        let MemberView {
            user,
            role_name,
            permission,
        } = view;
        if user.status == UserStatus::Verified {
            return Self::Pending {
                id: user.id,
                email: user.email,
                name: user.name,
                status: user.status,
            };
        }
        let levels = permission.as_ref().map(PermissionSet::from);
        Self::Member {
            id: user.id,
            email: user.email,
            name: user.name,
            role_id: user.role_id,
            role_name,
            status: user.status,
            plate_fee: user.plate_fee,
            contract_fee: user.contract_fee,
            permission_user: levels.map(|p| p.user),
            permission_transaction: levels.map(|p| p.transaction),
            permission_invoice: levels.map(|p| p.invoice),
        }
    }
}

/// Body of `PUT /user/{id}`.
///
/// Callers editing themselves send the password fields; administrators
/// editing someone else send the remaining ones.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    /// Required with a new password.
    pub current_password: Option<String>,
    /// Replacement password.
    pub new_password: Option<String>,
    /// Repetition of `new_password`.
    pub new_password_check: Option<String>,
    /// New display name.
    pub name: Option<String>,
    /// Role to assign.
    pub role_id: Option<i64>,
    /// Monthly plate fee in won.
    pub plate_fee: Option<i64>,
    /// Contract fee percentage, 0 to 100.
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub contract_fee: Option<Decimal>,
    /// User and role access.
    pub permission_user: Option<UserAccess>,
    /// Transaction access.
    pub permission_transaction: Option<TransactionAccess>,
    /// Invoice access.
    pub permission_invoice: Option<InvoiceAccess>,
}

impl UpdateUserRequest {
    /// Merges the requested levels over the stored ones.
    ///
    /// Without a stored row every level must be given.
    fn permission_set(&self, current: Option<PermissionSet>) -> ApiResult<Option<PermissionSet>> {
        let requested = self.permission_user.is_some()
            || self.permission_transaction.is_some()
            || self.permission_invoice.is_some();
        match current {
            Some(current) if requested => Ok(Some(PermissionSet {
                user: self.permission_user.unwrap_or(current.user),
                transaction: self.permission_transaction.unwrap_or(current.transaction),
                invoice: self.permission_invoice.unwrap_or(current.invoice),
            })),
            Some(_) => Ok(None),
            None => match (
                self.permission_user,
                self.permission_transaction,
                self.permission_invoice,
            ) {
                (Some(user), Some(transaction), Some(invoice)) => Ok(Some(PermissionSet {
                    user,
                    transaction,
                    invoice,
                })),
                _ => Err(ApiError::validation(
                    "The member has no permissions yet; set all three levels",
                )),
            },
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /user - Every account past e-mail verification.
async fn list_users(
    State(state): State<AppState>,
    caller: Caller,
) -> ApiResult<Envelope<Vec<UserResponse>>> {
    if !caller.permissions.user.reads_all() {
        return Err(ApiError::forbidden());
    }

    let members = UserRepository::new((*state.db).clone())
        .list_members()
        .await?;
    Ok(ok(members.into_iter().map(UserResponse::from).collect()))
}

/// GET /user/{user_id}
async fn get_user(
    State(state): State<AppState>,
    caller: Caller,
    PathParam(user_id): PathParam<i64>,
) -> ApiResult<Envelope<UserResponse>> {
    if user_id != caller.user_id && !caller.permissions.user.reads_all() {
        return Err(ApiError::forbidden());
    }

    let member = UserRepository::new((*state.db).clone())
        .find_member(user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("The account does not exist or has been withdrawn"))?;
    Ok(ok(member.into()))
}

/// PUT /user/{user_id} - Change your password, or administer another member.
async fn update_user(
    State(state): State<AppState>,
    caller: Caller,
    PathParam(user_id): PathParam<i64>,
    JsonBody(payload): JsonBody<UpdateUserRequest>,
) -> ApiResult<Envelope<ObjectRef>> {
    let users = UserRepository::new((*state.db).clone());
    let target = users
        .find_with_status(
            user_id,
            &[UserStatus::Verified, UserStatus::Accepted, UserStatus::Deleted],
        )
        .await?
        .ok_or_else(|| ApiError::not_found("The account does not exist or has been withdrawn"))?;

    if user_id == caller.user_id {
        let (Some(current), Some(new), Some(check)) = (
            payload.current_password.as_deref(),
            payload.new_password.as_deref(),
            payload.new_password_check.as_deref(),
        ) else {
            return Err(ApiError::validation("Please fill in every password field"));
        };
        if new != check {
            return Err(ApiError::validation(
                "The password and its confirmation do not match",
            ));
        }
        validate_password(new)?;
        if !verify_password(current, &target.password_hash)? {
            return Err(ApiError::validation("The password is incorrect"));
        }

        let hash = hash_password(new)?;
        users.set_password(target, &hash, None).await?;
        info!(user_id = %user_id, "Password changed");
        return Ok(ok(ObjectRef::Updated(user_id)));
    }

    if !caller.permissions.user.writes_all() {
        return Err(ApiError::forbidden());
    }

    if let Some(name) = &payload.name {
        validate_person_name(name)?;
    }
    if payload.role_id.is_none() && target.role_id.is_none() {
        return Err(ApiError::validation("A role must be assigned"));
    }
    InvoiceService::validate_fees(payload.plate_fee, payload.contract_fee)?;

    let current = PermissionRepository::new((*state.db).clone())
        .find_by_user(target.id)
        .await?
        .as_ref()
        .map(PermissionSet::from);
    let permission = payload.permission_set(current)?;

    let update = MemberUpdate {
        name: payload.name,
        role_id: payload.role_id,
        accept: target.status == UserStatus::Verified,
        plate_fee: payload.plate_fee,
        contract_fee: payload.contract_fee,
        permission,
    };
    if update.name.is_none()
        && update.role_id.is_none()
        && !update.accept
        && update.plate_fee.is_none()
        && update.contract_fee.is_none()
        && update.permission.is_none()
    {
        return Err(ApiError::validation("Nothing to update"));
    }

    let updated = users.update_member(target, update).await?;
    info!(user_id = %updated.id, updated_by = %caller.user_id, "Member updated");
    Ok(ok(ObjectRef::Updated(updated.id)))
}

/// DELETE /user/{user_id}
async fn delete_user(
    State(state): State<AppState>,
    caller: Caller,
    PathParam(user_id): PathParam<i64>,
) -> ApiResult<Envelope<ObjectRef>> {
    if !caller.permissions.user.writes_all() {
        return Err(ApiError::forbidden());
    }
    if user_id == caller.user_id {
        return Err(ApiError::validation("You cannot delete your own account"));
    }

    let users = UserRepository::new((*state.db).clone());
    let target = users
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("The account does not exist or has been withdrawn"))?;
    if target.status == UserStatus::Deleted {
        return Err(ApiError::validation("The account has already been withdrawn"));
    }

    let reference = match users.remove(target).await? {
        Removal::Deleted => ObjectRef::Deleted(user_id),
        Removal::Withdrawn => ObjectRef::Withdrawn(user_id),
    };
    info!(user_id = %user_id, removed_by = %caller.user_id, ?reference, "Member removed");
    Ok(ok(reference))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn request(
        user: Option<UserAccess>,
        transaction: Option<TransactionAccess>,
        invoice: Option<InvoiceAccess>,
    ) -> UpdateUserRequest {
        UpdateUserRequest {
            permission_user: user,
            permission_transaction: transaction,
            permission_invoice: invoice,
            ..UpdateUserRequest::default()
        }
    }

    #[test]
    fn test_first_grant_needs_every_level() {
        let partial = request(Some(UserAccess::Sr), None, Some(InvoiceAccess::Sr));
        assert!(partial.permission_set(None).is_err());

        let full = request(
            Some(UserAccess::Sr),
            Some(TransactionAccess::Srw),
            Some(InvoiceAccess::Sr),
        );
        assert_eq!(
            full.permission_set(None).unwrap(),
            Some(PermissionSet::DEFAULT)
        );
    }

    #[rstest]
    #[case(request(None, None, None), None)]
    #[case(
        request(None, Some(TransactionAccess::Ar), None),
        Some(PermissionSet { transaction: TransactionAccess::Ar, ..PermissionSet::DEFAULT })
    )]
    fn test_partial_grant_merges_over_stored(
        #[case] payload: UpdateUserRequest,
        #[case] expected: Option<PermissionSet>,
    ) {
        assert_eq!(
            payload.permission_set(Some(PermissionSet::DEFAULT)).unwrap(),
            expected
        );
    }

    #[test]
    fn test_contract_fee_accepts_json_numbers() {
        let payload: UpdateUserRequest =
            serde_json::from_str(r#"{"contract_fee": 12.5, "permission_user": "ARW"}"#).unwrap();
        assert_eq!(payload.contract_fee, Some(Decimal::new(125, 1)));
        assert_eq!(payload.permission_user, Some(UserAccess::Arw));
    }

    #[test]
    fn test_unknown_level_is_rejected() {
        let result = serde_json::from_str::<UpdateUserRequest>(r#"{"permission_transaction": "SR"}"#);
        assert!(result.is_err());
    }
}
