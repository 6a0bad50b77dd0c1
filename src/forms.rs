//! Submit handlers for the sign-in, sign-up and create-post forms.
//!
//! Each handler validates first and only then talks to the backend, one step
//! at a time, stopping at the first step that reports failure.

use crate::api::Api;
use crate::dto::{
    PostValidation, Screen, SigninValidation, SignupValidation, SubmitOutcome, field_errors,
};
use crate::models::{NewPost, NewUser};
use crate::session::SessionContext;
use tracing::{info, warn};
use validator::Validate;

pub const SIGNUP_FAILED: &str = "Signup failed. Please try again.";
pub const SIGNIN_FAILED: &str = "Signin failed, please try again";
pub const POST_FAILED: &str = "Please try again";

/// Account creation, then session creation, then current-user fetch.
///
/// If the session cannot be created the freshly created account stays behind
/// and the user is sent to sign in manually.
pub async fn submit_sign_up(
    values: SignupValidation,
    api: &Api,
    session: &SessionContext,
) -> SubmitOutcome {
    if let Err(errors) = values.validate() {
        return SubmitOutcome::invalid(field_errors(&errors));
    }

    let new_user = api
        .create_user_account(NewUser {
            name: values.name,
            username: values.username,
            email: values.email.clone(),
            password: values.password.clone(),
        })
        .await;
    if new_user.is_none() {
        return SubmitOutcome::toast(SIGNUP_FAILED);
    }

    if api.sign_in_account(&values.email, &values.password).await.is_none() {
        warn!(email = %values.email, "Account created but session could not be started");
        return SubmitOutcome::toast(SIGNIN_FAILED).then_navigate(Screen::SignIn);
    }

    finish_sign_in(api, session).await
}

/// Session creation, then current-user fetch.
pub async fn submit_sign_in(
    values: SigninValidation,
    api: &Api,
    session: &SessionContext,
) -> SubmitOutcome {
    if let Err(errors) = values.validate() {
        return SubmitOutcome::invalid(field_errors(&errors));
    }

    if api.sign_in_account(&values.email, &values.password).await.is_none() {
        return SubmitOutcome::toast(SIGNIN_FAILED);
    }

    finish_sign_in(api, session).await
}

async fn finish_sign_in(api: &Api, session: &SessionContext) -> SubmitOutcome {
    if session.check_auth_user(api).await {
        info!("Sign-in complete");
        SubmitOutcome::done(Screen::Home)
    } else {
        SubmitOutcome::toast(SIGNIN_FAILED)
    }
}

pub async fn submit_create_post(
    values: PostValidation,
    api: &Api,
    session: &SessionContext,
) -> SubmitOutcome {
    if let Err(errors) = values.validate() {
        return SubmitOutcome::invalid(field_errors(&errors));
    }

    let Some(user) = session.user().await else {
        return SubmitOutcome::toast(POST_FAILED).then_navigate(Screen::SignIn);
    };

    let tags = values.tag_list();
    let post = api
        .create_post(NewPost {
            creator: user.id,
            caption: values.caption,
            location: values.location,
            tags,
            image_url: values.image_url,
        })
        .await;

    match post {
        Some(_) => SubmitOutcome::done(Screen::Home),
        None => SubmitOutcome::toast(POST_FAILED),
    }
}
