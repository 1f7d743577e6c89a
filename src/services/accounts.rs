use crate::{
    db::UserRepository,
    error::{AppError, AppResult},
    models::{NewUser, User, UserProfile},
};

/// Registers a new account
///
/// Rejects empty fields and any username or email that is already taken. The
/// repository enforces uniqueness again on insert, so a concurrent registration that
/// slips past the lookups still fails with [`AppError::UserExists`].
pub async fn register(repo: &dyn UserRepository, new_user: NewUser) -> AppResult<User> {
    if new_user.username.trim().is_empty()
        || new_user.email.trim().is_empty()
        || new_user.password_hash.is_empty()
    {
        return Err(AppError::InvalidInput("Missing fields".to_string()));
    }

    if repo.find_by_username(&new_user.username).await?.is_some()
        || repo.find_by_email(&new_user.email).await?.is_some()
    {
        return Err(AppError::UserExists);
    }

    let user = repo.insert(new_user).await?;
    tracing::info!(user_id = user.id, username = %user.username, "User registered");

    Ok(user)
}

/// Looks up the public profile for `username`
pub async fn profile(repo: &dyn UserRepository, username: &str) -> AppResult<UserProfile> {
    repo.find_by_username(username)
        .await?
        .map(|user| UserProfile::from(&user))
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}
