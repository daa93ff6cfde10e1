mod common;

use cafe_hub_api::{
    credentials::hash_password,
    dto::{
        admin::{DenyRequest, UserListQuery},
        auth::{ChangePasswordRequest, LoginRequest},
        cafe::StaffCreateRequest,
    },
    entity::{
        CafeStaff, Cafes, Documents, Users,
        sea_orm_active_enums::{ApprovalStatus, Role},
    },
    media::MediaStore,
    middleware::auth::AuthUser,
    services::{
        admin_service, auth_service,
        identity::{NewAccount, StoredUpload, ValidProfile, create_account},
        owner_service,
    },
};
use common::{
    PASSWORD, REGISTRATION_KEY, Sent, TestContext, address, personal, registration, seed_admin,
    seed_open_cafe, seed_user, setup, upload,
};
use sea_orm::{EntityTrait, PaginatorTrait};

fn login(username: &str, password: &str) -> LoginRequest {
    LoginRequest {
        username: username.to_string(),
        password: password.to_string(),
    }
}

#[tokio::test]
async fn pending_customer_is_approved_and_logs_in_with_one_time_password() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let admin = seed_admin(&ctx).await?;

    let mut req = registration("CUSTOMER", "Asha.Rao@example.com", "9000000001");
    // non-privileged callers cannot pick credentials
    req.username = Some("chosen".to_string());
    req.password = Some("chosen-pass".to_string());
    let user = auth_service::register_user(&ctx.state, req, Vec::new())
        .await?
        .data
        .expect("user")
        .user;
    assert_eq!(user.username, "asharao");
    assert_eq!(user.approval_status, Some(ApprovalStatus::Pending));
    assert!(ctx.notifier.sent().is_empty());

    let err = auth_service::login_user(&ctx.state, login("asharao", "chosen-pass"))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "unauthorized");
    assert_eq!(err.to_string(), "Invalid credentials");

    let approved = admin_service::approve_user(&ctx.state, &admin, user.id)
        .await?
        .data
        .expect("approval");
    assert_eq!(approved.user.approval_status, Some(ApprovalStatus::Approved));
    assert!(approved.user.force_password_change);
    assert_eq!(
        ctx.notifier.sent(),
        vec![Sent::Credentials {
            to: "Asha.Rao@example.com".to_string(),
            username: "asharao".to_string(),
            password: approved.temp_password.clone(),
        }]
    );

    let session = auth_service::login_user(&ctx.state, login("asharao", &approved.temp_password))
        .await?
        .data
        .expect("session");
    assert!(session.token.starts_with("Bearer "));
    assert_eq!(session.role, Role::Customer);
    assert!(session.force_password_change);

    let changed = auth_service::change_password(
        &ctx.state,
        ChangePasswordRequest {
            username: Some("asharao".to_string()),
            old_password: Some(approved.temp_password.clone()),
            new_password: Some("brand-new".to_string()),
        },
    )
    .await?
    .data
    .expect("user");
    assert!(!changed.force_password_change);

    let session = auth_service::login_user(&ctx.state, login("asharao", "brand-new"))
        .await?
        .data
        .expect("session");
    assert!(!session.force_password_change);

    // approval is one-way
    let err = admin_service::approve_user(&ctx.state, &admin, user.id)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "invalid_state");
    Ok(())
}

#[tokio::test]
async fn denied_user_cannot_log_in_and_gets_the_reason() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let admin = seed_admin(&ctx).await?;

    let user = auth_service::register_user(
        &ctx.state,
        registration("OWNER", "owner@example.com", "9000000002"),
        Vec::new(),
    )
    .await?
    .data
    .expect("user")
    .user;

    let denied = admin_service::deny_user(
        &ctx.state,
        &admin,
        user.id,
        DenyRequest {
            reason: Some("  Incomplete KYC ".to_string()),
        },
    )
    .await?
    .data
    .expect("user");
    assert_eq!(denied.approval_status, Some(ApprovalStatus::Denied));
    assert_eq!(
        ctx.notifier.sent(),
        vec![Sent::Denied {
            to: "owner@example.com".to_string(),
            reason: Some("Incomplete KYC".to_string()),
        }]
    );

    // no way back to pending or approved
    let err = admin_service::approve_user(&ctx.state, &admin, user.id)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "User is not pending approval");

    let err = admin_service::deny_user(&ctx.state, &admin, user.id, DenyRequest::default())
        .await
        .unwrap_err();
    assert_eq!(err.code(), "invalid_state");
    Ok(())
}

#[tokio::test]
async fn denied_login_reports_denial_not_pending() -> anyhow::Result<()> {
    let ctx = setup().await?;
    common::seed_user(&ctx, "late", Role::Customer, Some(ApprovalStatus::Denied), None).await?;
    common::seed_user(&ctx, "early", Role::Customer, Some(ApprovalStatus::Pending), None).await?;

    let err = auth_service::login_user(&ctx.state, login("late", common::PASSWORD))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Account denied by admin");

    let err = auth_service::login_user(&ctx.state, login("early", common::PASSWORD))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Account pending admin approval");
    assert_eq!(err.code(), "unauthorized");
    Ok(())
}

#[tokio::test]
async fn admin_with_missing_status_is_healed_on_login() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let admin = common::seed_user(&ctx, "legacy-admin", Role::Admin, None, None).await?;

    auth_service::login_user(&ctx.state, login("legacy-admin", common::PASSWORD)).await?;

    let stored = Users::find_by_id(admin.id)
        .one(&ctx.state.orm)
        .await?
        .expect("admin");
    assert_eq!(stored.approval_status, Some(ApprovalStatus::Approved));
    Ok(())
}

#[tokio::test]
async fn uniqueness_checks_run_email_then_phone_then_username() -> anyhow::Result<()> {
    let ctx = setup().await?;

    let mut first = registration("ADMIN", "a@example.com", "9000000003");
    first.registration_key = Some(REGISTRATION_KEY.to_string());
    first.username = Some("boss".to_string());
    first.password = Some("boss-pass".to_string());
    auth_service::register_user(&ctx.state, first, Vec::new()).await?;

    // email and phone both clash: email is reported
    let err = auth_service::register_user(
        &ctx.state,
        registration("CUSTOMER", "a@example.com", "9000000003"),
        Vec::new(),
    )
    .await
    .unwrap_err();
    assert_eq!(err.code(), "conflict");
    assert_eq!(err.to_string(), "Email already exists");

    let err = auth_service::register_user(
        &ctx.state,
        registration("CUSTOMER", "b@example.com", "9000000003"),
        Vec::new(),
    )
    .await
    .unwrap_err();
    assert_eq!(err.to_string(), "Phone already exists");

    let mut clash = registration("WAITER", "c@example.com", "9000000004");
    clash.registration_key = Some(REGISTRATION_KEY.to_string());
    clash.username = Some("boss".to_string());
    let err = auth_service::register_user(&ctx.state, clash, Vec::new())
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Username already exists");

    assert_eq!(Users::find().count(&ctx.state.orm).await?, 1);
    Ok(())
}

#[tokio::test]
async fn privileged_roles_need_the_registration_key() -> anyhow::Result<()> {
    let ctx = setup().await?;

    let err = auth_service::register_user(
        &ctx.state,
        registration("ADMIN", "x@example.com", "9000000005"),
        Vec::new(),
    )
    .await
    .unwrap_err();
    assert_eq!(err.code(), "validation_failed");
    assert_eq!(err.to_string(), "Invalid role");

    let err = auth_service::register_user(
        &ctx.state,
        registration("JANITOR", "x@example.com", "9000000005"),
        Vec::new(),
    )
    .await
    .unwrap_err();
    assert_eq!(err.to_string(), "Invalid role");

    let mut keyed = registration("CHEF", "x@example.com", "9000000005");
    keyed.registration_key = Some(REGISTRATION_KEY.to_string());
    keyed.username = Some("chef-x".to_string());
    keyed.password = Some("kitchen".to_string());
    let user = auth_service::register_user(&ctx.state, keyed, Vec::new())
        .await?
        .data
        .expect("user")
        .user;
    assert_eq!(user.username, "chef-x");
    assert_eq!(user.approval_status, Some(ApprovalStatus::Approved));
    assert!(!user.force_password_change);
    // chosen password, nothing to mail
    assert!(ctx.notifier.sent().is_empty());

    let session = auth_service::login_user(&ctx.state, login("chef-x", "kitchen"))
        .await?
        .data
        .expect("session");
    assert_eq!(session.role, Role::Chef);
    Ok(())
}

#[tokio::test]
async fn privileged_registration_without_password_mails_a_generated_one() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let mut req = registration("ADMIN", "ops@example.com", "9000000006");
    req.registration_key = Some(REGISTRATION_KEY.to_string());

    let user = auth_service::register_user(&ctx.state, req, Vec::new())
        .await?
        .data
        .expect("user")
        .user;
    assert!(user.force_password_change);

    let sent = ctx.notifier.sent();
    assert_eq!(sent.len(), 1);
    let Sent::Credentials { username, password, .. } = &sent[0] else {
        panic!("expected credentials mail, got {sent:?}");
    };
    assert_eq!(username, &user.username);
    auth_service::login_user(&ctx.state, login(username, password)).await?;
    Ok(())
}

#[tokio::test]
async fn field_checks_run_before_the_document_requirement() -> anyhow::Result<()> {
    let ctx = setup().await?;

    let mut req = registration("OWNER", "d@example.com", "9000000007");
    req.documents_required = true;
    req.personal_details.as_mut().expect("details").first_name = Some("  ".to_string());
    let err = auth_service::register_user(&ctx.state, req, Vec::new())
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "First name is required");

    let mut req = registration("OWNER", "d@example.com", "9000000007");
    req.academic_records = None;
    let err = auth_service::register_user(&ctx.state, req, Vec::new())
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Academic records are required");

    // an empty part does not count as a document
    let mut req = registration("OWNER", "d@example.com", "9000000007");
    req.documents_required = true;
    let err = auth_service::register_user(&ctx.state, req, vec![upload("blank.pdf", b"")])
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Documents are required");
    assert_eq!(ctx.media.len(), 0);
    assert_eq!(Users::find().count(&ctx.state.orm).await?, 0);

    let mut req = registration("OWNER", "d@example.com", "9000000007");
    req.documents_required = true;
    auth_service::register_user(
        &ctx.state,
        req,
        vec![upload("blank.pdf", b""), upload("pan.pdf", b"%PDF-1.4")],
    )
    .await?;
    assert_eq!(Documents::find().count(&ctx.state.orm).await?, 1);
    assert_eq!(ctx.media.len(), 1);
    Ok(())
}

#[tokio::test]
async fn generated_usernames_never_collide() -> anyhow::Result<()> {
    let ctx = setup().await?;

    let first = auth_service::register_user(
        &ctx.state,
        registration("CUSTOMER", "sam@one.test", "9000000008"),
        Vec::new(),
    )
    .await?
    .data
    .expect("user")
    .user;
    let second = auth_service::register_user(
        &ctx.state,
        registration("CUSTOMER", "sam@two.test", "9000000009"),
        Vec::new(),
    )
    .await?
    .data
    .expect("user")
    .user;

    assert_eq!(first.username, "sam");
    assert_ne!(second.username, "sam");
    assert!(second.username.starts_with("sam"));
    Ok(())
}

#[tokio::test]
async fn change_password_validates_in_order() -> anyhow::Result<()> {
    let ctx = setup().await?;
    common::seed_user(&ctx, "pat", Role::Customer, Some(ApprovalStatus::Approved), None).await?;

    let cases = [
        (None, Some("x"), Some("longer"), "Username required"),
        (Some("pat"), None, Some("longer"), "Old password required"),
        (Some("pat"), Some("x"), Some("   "), "New password required"),
        (Some("pat"), Some("x"), Some("abc"), "Password too short"),
        (Some("pat"), Some("wrong"), Some("longer"), "Invalid credentials"),
        (Some("ghost"), Some("x"), Some("longer"), "Invalid credentials"),
    ];
    for (username, old, new, expected) in cases {
        let err = auth_service::change_password(
            &ctx.state,
            cafe_hub_api::dto::auth::ChangePasswordRequest {
                username: username.map(str::to_string),
                old_password: old.map(str::to_string),
                new_password: new.map(str::to_string),
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), expected);
    }
    Ok(())
}

#[tokio::test]
async fn deleting_a_user_removes_documents_and_respects_guards() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let admin = seed_admin(&ctx).await?;

    let mut req = registration("CUSTOMER", "e@example.com", "9000000010");
    req.documents_required = true;
    let user = auth_service::register_user(&ctx.state, req, vec![upload("id.pdf", b"id")])
        .await?
        .data
        .expect("user")
        .user;
    assert_eq!(ctx.media.len(), 1);

    admin_service::delete_user(&ctx.state, &admin, user.id).await?;
    assert!(Users::find_by_id(user.id).one(&ctx.state.orm).await?.is_none());
    assert_eq!(Documents::find().count(&ctx.state.orm).await?, 0);
    assert_eq!(ctx.media.len(), 0);

    let root = Users::find()
        .all(&ctx.state.orm)
        .await?
        .into_iter()
        .find(|u| u.role == Role::Admin)
        .expect("admin row");
    let err = admin_service::delete_user(&ctx.state, &admin, root.id)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Cannot delete admin user");

    let (_, cafe) = seed_open_cafe(&ctx, &admin, "olive", "Olive Bistro").await?;
    let err = admin_service::delete_user(&ctx.state, &admin, cafe.owner_id)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Cannot delete owner with a cafe");
    Ok(())
}

#[tokio::test]
async fn admin_operations_reject_other_roles() -> anyhow::Result<()> {
    let ctx = setup().await?;
    common::seed_user(&ctx, "cust", Role::Customer, Some(ApprovalStatus::Approved), None).await?;

    let err = admin_service::list_users(&ctx.state, &AuthUser::new("cust"), UserListQuery::default())
        .await
        .unwrap_err();
    assert_eq!(err.code(), "forbidden");

    let err = admin_service::list_owners(&ctx.state, &AuthUser::new("nobody"))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "forbidden");
    Ok(())
}

#[tokio::test]
async fn user_list_filters_by_role_and_status() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let admin = seed_admin(&ctx).await?;
    auth_service::register_user(
        &ctx.state,
        registration("OWNER", "f@example.com", "9000000011"),
        vec![upload("gst.pdf", b"gst")],
    )
    .await?;
    auth_service::register_user(
        &ctx.state,
        registration("CUSTOMER", "g@example.com", "9000000012"),
        Vec::new(),
    )
    .await?;

    let resp = admin_service::list_users(
        &ctx.state,
        &admin,
        UserListQuery {
            role: Some("OWNER".to_string()),
            status: Some("PENDING".to_string()),
            ..Default::default()
        },
    )
    .await?;
    let items = resp.data.expect("users").items;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].user.role, Role::Owner);
    assert_eq!(items[0].documents.len(), 1);
    assert_eq!(resp.meta.and_then(|m| m.total), Some(1));

    let err = admin_service::list_users(
        &ctx.state,
        &admin,
        UserListQuery {
            status: Some("MAYBE".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.code(), "validation_failed");
    Ok(())
}

#[tokio::test]
async fn concurrent_approvals_have_exactly_one_winner() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let admin = seed_admin(&ctx).await?;
    let pending = seed_user(&ctx, "twice", Role::Customer, Some(ApprovalStatus::Pending), None).await?;

    let (first, second) = tokio::join!(
        admin_service::approve_user(&ctx.state, &admin, pending.id),
        admin_service::approve_user(&ctx.state, &admin, pending.id),
    );
    let (winner, loser) = match (first, second) {
        (Ok(ok), Err(err)) | (Err(err), Ok(ok)) => (ok, err),
        (a, b) => panic!("expected one approval to win, got {:?} and {:?}", a.is_ok(), b.is_ok()),
    };
    assert_eq!(loser.code(), "invalid_state");
    assert_eq!(loser.to_string(), "User is not pending approval");

    // only the winning password was mailed, and it is the one that works
    let temp = winner.data.expect("approval").temp_password;
    assert_eq!(
        ctx.notifier.sent(),
        vec![Sent::Credentials {
            to: "twice@example.com".to_string(),
            username: "twice".to_string(),
            password: temp.clone(),
        }]
    );
    auth_service::login_user(&ctx.state, login("twice", &temp)).await?;
    Ok(())
}

#[tokio::test]
async fn racing_approve_and_deny_settle_on_one_decision() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let admin = seed_admin(&ctx).await?;
    let pending = seed_user(&ctx, "torn", Role::Owner, Some(ApprovalStatus::Pending), None).await?;

    let (approved, denied) = tokio::join!(
        admin_service::approve_user(&ctx.state, &admin, pending.id),
        admin_service::deny_user(
            &ctx.state,
            &admin,
            pending.id,
            DenyRequest {
                reason: Some("Incomplete".to_string()),
            },
        ),
    );
    assert!(approved.is_ok() != denied.is_ok());

    let stored = Users::find_by_id(pending.id)
        .one(&ctx.state.orm)
        .await?
        .expect("user");
    let expected = if approved.is_ok() {
        ApprovalStatus::Approved
    } else {
        ApprovalStatus::Denied
    };
    assert_eq!(stored.approval_status, Some(expected));
    assert_eq!(ctx.notifier.sent().len(), 1);
    Ok(())
}

fn new_account(username: &str, email: &str, phone: &str, documents: Vec<StoredUpload>) -> anyhow::Result<NewAccount> {
    Ok(NewAccount {
        username: username.to_string(),
        password_hash: hash_password(PASSWORD)?,
        role: Role::Customer,
        approval_status: ApprovalStatus::Pending,
        force_password_change: false,
        profile: ValidProfile {
            first_name: "Bob".to_string(),
            last_name: "Lee".to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
            gender: None,
            marital_status: None,
            street: "1 Main St".to_string(),
            city: "Pune".to_string(),
            state: "MH".to_string(),
            pincode: "411001".to_string(),
        },
        academic_records: Vec::new(),
        work_records: Vec::new(),
        documents,
        roster_cafe_id: None,
    })
}

async fn stored_blob(ctx: &TestContext) -> anyhow::Result<StoredUpload> {
    let key = ctx.media.put("id.pdf", b"id").await?;
    Ok(StoredUpload {
        filename: "id.pdf".to_string(),
        content_type: "application/pdf".to_string(),
        size: 2,
        key,
    })
}

#[tokio::test]
async fn schema_uniqueness_is_reported_with_the_ordered_reason() -> anyhow::Result<()> {
    let ctx = setup().await?;
    seed_user(&ctx, "bob", Role::Customer, Some(ApprovalStatus::Approved), Some("9700000000")).await?;
    let users_before = Users::find().count(&ctx.state.orm).await?;

    // each write skips the application checks and hits the schema constraint
    let cases = [
        ("fresh1", "bob@example.com", "9700000000", "Email already exists"),
        ("fresh2", "new@example.com", "9700000000", "Phone already exists"),
        ("bob", "other@example.com", "9700000001", "Username already exists"),
    ];
    for (username, email, phone, reason) in cases {
        let documents = vec![stored_blob(&ctx).await?];
        let err = create_account(&ctx.state, new_account(username, email, phone, documents)?)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "conflict");
        assert_eq!(err.to_string(), reason);
        // blobs written for the failed account are released
        assert_eq!(ctx.media.len(), 0);
    }
    assert_eq!(Users::find().count(&ctx.state.orm).await?, users_before);
    Ok(())
}

#[tokio::test]
async fn admin_deleting_rostered_staff_clears_the_roster_and_keeps_the_cafe() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let admin = seed_admin(&ctx).await?;
    let (owner, cafe) = seed_open_cafe(&ctx, &admin, "quinn", "Quinn's").await?;

    let staff = owner_service::create_staff(
        &ctx.state,
        &owner,
        StaffCreateRequest {
            role: "CHEF".to_string(),
            personal_details: Some(personal("cook@example.com", "9700000100")),
            address: Some(address()),
            ..Default::default()
        },
        vec![upload("fssai.pdf", b"cert")],
    )
    .await?
    .data
    .expect("staff");
    assert_eq!(CafeStaff::find().count(&ctx.state.orm).await?, 1);

    admin_service::delete_user(&ctx.state, &admin, staff.user.id).await?;

    assert!(Users::find_by_id(staff.user.id).one(&ctx.state.orm).await?.is_none());
    assert_eq!(CafeStaff::find().count(&ctx.state.orm).await?, 0);
    assert!(Cafes::find_by_id(cafe.id).one(&ctx.state.orm).await?.is_some());
    assert_eq!(ctx.media.len(), 0);
    Ok(())
}
