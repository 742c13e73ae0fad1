//! Mutation hooks: one per write the app makes.
//!
//! Every hook returns a `Copy` handle so it can be moved into several event
//! handlers. `mutate` resolves to `Some(value)` on success; on failure the
//! translated message is left in [`Mutation::error`] and `None` is returned.

use std::future::Future;

use api::auth::{self, AuthRedirect, RedirectOutcome};
use api::models::UserInfo;
use api::tasks;
use api::validation::{RecoveryForm, ResetPasswordForm, SignInForm, SignUpForm};
use api::{ApiError, BackendConfig, Client, Session, SignUpOutcome, Task, TaskInsert, TaskUpdate};
use dioxus::prelude::*;
use store::QueryClient;

use crate::auth::use_client;
use crate::i18n::{use_i18n, Translator};
use crate::query::{use_queries, Queries};

/// Loading and error state shared by every typed mutation.
#[derive(Clone, Copy)]
pub struct Mutation {
    loading: Signal<bool>,
    error: Signal<Option<String>>,
    client: CopyValue<Client>,
    queries: Queries,
    i18n: Translator,
}

impl Mutation {
    pub fn is_loading(&self) -> bool {
        (self.loading)()
    }

    pub fn error(&self) -> Option<String> {
        (self.error)()
    }

    /// Show a message that did not come from a backend call.
    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error.set(Some(message.into()));
    }

    pub fn clear_error(&mut self) {
        self.error.set(None);
    }

    /// Run one write against the client and cache.
    ///
    /// `fallback_key` names the message shown when the error carries none of
    /// its own.
    pub async fn run<T, F, Fut>(mut self, fallback_key: &str, op: F) -> Option<T>
    where
        F: FnOnce(Client, QueryClient) -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        self.loading.set(true);
        self.error.set(None);

        let client = self.client.read().clone();
        let result = op(client, self.queries.cache()).await;

        self.loading.set(false);
        self.queries.sync();

        match result {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Mutation failed: {e}");
                let message = error_message(&self.i18n, &e, fallback_key);
                self.error.set(Some(message));
                None
            }
        }
    }
}

fn error_message(i18n: &Translator, error: &ApiError, fallback_key: &str) -> String {
    match error {
        ApiError::Validation(invalid) => i18n.t(invalid.translation_key()),
        ApiError::NotAuthenticated => i18n.t(fallback_key),
        other => other.user_message(&i18n.t(fallback_key)),
    }
}

pub fn use_mutation() -> Mutation {
    let client = use_client();
    let client = use_hook(|| CopyValue::new(client));
    Mutation {
        loading: use_signal(|| false),
        error: use_signal(|| None),
        client,
        queries: use_queries(),
        i18n: use_i18n(),
    }
}

fn use_app_config() -> CopyValue<BackendConfig> {
    let config = use_context::<BackendConfig>();
    use_hook(|| CopyValue::new(config))
}

#[derive(Clone, Copy)]
pub struct SignInMutation {
    pub state: Mutation,
}

impl SignInMutation {
    pub async fn mutate(self, form: SignInForm) -> Option<Session> {
        self.state
            .run("auth.errors.invalidCredentials", |client, queries| async move {
                auth::sign_in(&client, &queries, &form).await
            })
            .await
    }
}

pub fn use_sign_in_mutation() -> SignInMutation {
    SignInMutation {
        state: use_mutation(),
    }
}

#[derive(Clone, Copy)]
pub struct SignUpMutation {
    pub state: Mutation,
    config: CopyValue<BackendConfig>,
}

impl SignUpMutation {
    /// Confirmation links come back through `/auth/callback`.
    pub async fn mutate(self, form: SignUpForm) -> Option<SignUpOutcome> {
        let redirect = self.config.read().callback_url();
        self.state
            .run("auth.errors.signUpFailed", |client, _| async move {
                auth::sign_up(&client, &form, Some(&redirect)).await
            })
            .await
    }
}

pub fn use_sign_up_mutation() -> SignUpMutation {
    SignUpMutation {
        state: use_mutation(),
        config: use_app_config(),
    }
}

#[derive(Clone, Copy)]
pub struct SignOutMutation {
    pub state: Mutation,
}

impl SignOutMutation {
    pub async fn mutate(self) -> Option<()> {
        self.state
            .run("auth.errors.signOutFailed", |client, queries| async move {
                auth::sign_out(&client, &queries).await
            })
            .await
    }
}

pub fn use_sign_out_mutation() -> SignOutMutation {
    SignOutMutation {
        state: use_mutation(),
    }
}

#[derive(Clone, Copy)]
pub struct PasswordRecoveryMutation {
    pub state: Mutation,
    config: CopyValue<BackendConfig>,
}

impl PasswordRecoveryMutation {
    /// Recovery links land on `/reset-password`.
    pub async fn mutate(self, form: RecoveryForm) -> Option<()> {
        let redirect = self.config.read().reset_password_url();
        self.state
            .run("auth.errors.recoveryEmailFailed", |client, _| async move {
                auth::send_recovery_email(&client, &form, Some(&redirect)).await
            })
            .await
    }
}

pub fn use_password_recovery_mutation() -> PasswordRecoveryMutation {
    PasswordRecoveryMutation {
        state: use_mutation(),
        config: use_app_config(),
    }
}

#[derive(Clone, Copy)]
pub struct ResetPasswordMutation {
    pub state: Mutation,
}

impl ResetPasswordMutation {
    pub async fn mutate(self, form: ResetPasswordForm) -> Option<UserInfo> {
        self.state
            .run("auth.errors.noSession", |client, queries| async move {
                auth::reset_password(&client, &queries, &form).await
            })
            .await
    }
}

pub fn use_reset_password_mutation() -> ResetPasswordMutation {
    ResetPasswordMutation {
        state: use_mutation(),
    }
}

#[derive(Clone, Copy)]
pub struct GoogleOAuthMutation {
    pub state: Mutation,
    config: CopyValue<BackendConfig>,
}

impl GoogleOAuthMutation {
    /// The provider URL to navigate to.
    pub async fn mutate(self) -> Option<String> {
        let redirect = self.config.read().callback_url();
        self.state
            .run("auth.errors.googleSignInFailed", |client, _| async move {
                auth::sign_in_with_google(&client, &redirect)
            })
            .await
    }
}

pub fn use_google_mutation() -> GoogleOAuthMutation {
    GoogleOAuthMutation {
        state: use_mutation(),
        config: use_app_config(),
    }
}

#[derive(Clone, Copy)]
pub struct CompleteRedirectMutation {
    pub state: Mutation,
}

impl CompleteRedirectMutation {
    pub async fn mutate(self, redirect: AuthRedirect) -> Option<RedirectOutcome> {
        self.state
            .run("auth.errors.noSessionFound", |client, queries| async move {
                auth::complete_redirect(&client, &queries, &redirect).await
            })
            .await
    }
}

pub fn use_complete_redirect_mutation() -> CompleteRedirectMutation {
    CompleteRedirectMutation {
        state: use_mutation(),
    }
}

#[derive(Clone, Copy)]
pub struct CreateTaskMutation {
    pub state: Mutation,
}

impl CreateTaskMutation {
    pub async fn mutate(self, title: String) -> Option<Task> {
        self.state
            .run("tasks.errors.createFailed", |client, queries| async move {
                tasks::create_task(&client, &queries, TaskInsert::new(title)).await
            })
            .await
    }
}

pub fn use_create_task_mutation() -> CreateTaskMutation {
    CreateTaskMutation {
        state: use_mutation(),
    }
}

#[derive(Clone, Copy)]
pub struct UpdateTaskMutation {
    pub state: Mutation,
}

impl UpdateTaskMutation {
    pub async fn mutate(self, task: Task, update: TaskUpdate) -> Option<Task> {
        self.state
            .run("tasks.errors.updateFailed", |client, queries| async move {
                tasks::update_task(&client, &queries, task.id, &update).await
            })
            .await
    }

    pub async fn toggle(self, task: Task) -> Option<Task> {
        let update = TaskUpdate::completed(!task.completed);
        self.mutate(task, update).await
    }
}

pub fn use_update_task_mutation() -> UpdateTaskMutation {
    UpdateTaskMutation {
        state: use_mutation(),
    }
}
