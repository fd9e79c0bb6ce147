//! User registration and login.

use tracing::{info, warn};

use storynest_db::{CreateUser, Database};
use storynest_types::api::{LoginForm, RegisterForm};
use storynest_types::models::User;

use crate::error::{AuthError, ServiceError, ValidationError};
use crate::password::CredentialStore;

pub const MIN_USERNAME_LEN: usize = 3;
pub const MIN_PASSWORD_LEN: usize = 6;

const USERNAME_TAKEN: &str = "Username already taken. Please choose another.";
const EMAIL_TAKEN: &str = "Email already registered. Please sign in.";

struct Registration<'a> {
    username: &'a str,
    email: &'a str,
    password: &'a str,
}

/// Field checks in reporting order; the first failure wins.
fn validate(form: &RegisterForm) -> Result<Registration<'_>, ValidationError> {
    let username = form.username.trim();
    let email = form.email.trim();
    let password = form.password.trim();
    let confirm = form.confirm_password.trim();

    if username.is_empty() || email.is_empty() || password.is_empty() {
        let field = if username.is_empty() {
            "username"
        } else if email.is_empty() {
            "email"
        } else {
            "password"
        };
        return Err(ValidationError::new(field, "Please fill in all fields."));
    }
    if username.chars().count() < MIN_USERNAME_LEN {
        return Err(ValidationError::new(
            "username",
            format!("Username must be at least {} characters.", MIN_USERNAME_LEN),
        ));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::new(
            "password",
            format!("Password must be at least {} characters.", MIN_PASSWORD_LEN),
        ));
    }
    if password != confirm {
        return Err(ValidationError::new("confirm_password", "Passwords do not match."));
    }

    Ok(Registration { username, email, password })
}

/// Creates a user. The returned identity is the one the caller logs in.
pub fn register(
    db: &Database,
    credentials: &CredentialStore,
    form: &RegisterForm,
) -> Result<User, ServiceError> {
    let reg = validate(form)?;

    if db.get_user_by_username(reg.username)?.is_some() {
        return Err(ValidationError::new("username", USERNAME_TAKEN).into());
    }
    if db.get_user_by_email(reg.email)?.is_some() {
        return Err(ValidationError::new("email", EMAIL_TAKEN).into());
    }

    let password_hash = credentials.hash(reg.password)?;

    let id = created_id(db.create_user(reg.username, reg.email, &password_hash)?)?;

    let user = db
        .get_user_by_id(id)?
        .ok_or(ServiceError::NotFound("user"))?
        .into_user();

    info!("Registered user {} ({})", user.username, user.id);
    Ok(user)
}

/// A concurrent registration can still win between the pre-checks and the
/// insert; the constraint outcome then reads exactly like the pre-check.
fn created_id(outcome: CreateUser) -> Result<i64, ValidationError> {
    match outcome {
        CreateUser::Created(id) => Ok(id),
        CreateUser::UsernameTaken => Err(ValidationError::new("username", USERNAME_TAKEN)),
        CreateUser::EmailTaken => Err(ValidationError::new("email", EMAIL_TAKEN)),
    }
}

pub fn authenticate(
    db: &Database,
    credentials: &CredentialStore,
    form: &LoginForm,
) -> Result<User, ServiceError> {
    let username = form.username.trim();
    let password = form.password.trim();

    let Some(row) = db.get_user_by_username(username)? else {
        credentials.verify_decoy(password);
        warn!("Rejected login for unknown username");
        return Err(AuthError::InvalidCredentials.into());
    };

    if !credentials.verify(password, &row.password) {
        warn!("Rejected login for user {}", row.id);
        return Err(AuthError::InvalidCredentials.into());
    }

    info!("User {} logged in", row.username);
    Ok(row.into_user())
}
