use shared::{
    domain::{Gender, User, UserId},
    protocol::{Outcome, UpdateUserResult, UserResult},
};
use tracing::{info, warn};

use super::{ActionOutcome, Notice, PageContext};
use crate::{
    operations::{GetUser, Params, UpdateUser, UserIdVars, UserUpdate},
    routes::Route,
    FetchPolicy,
};

#[derive(Debug, Clone, PartialEq)]
pub struct ProfileForm {
    pub name: String,
    pub email: String,
    /// Kept as text; the API may hand back a number.
    pub phone_number: String,
    pub gender: Gender,
    pub username: String,
    pub password: String,
}

impl ProfileForm {
    pub fn from_user(user: &User) -> Self {
        Self {
            name: user.name.clone().unwrap_or_default(),
            email: user.email.clone().unwrap_or_default(),
            phone_number: user.phone_number.clone().unwrap_or_default(),
            gender: user.gender.unwrap_or(Gender::Other),
            username: user.username.clone().unwrap_or_default(),
            password: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProfileView {
    pub user: User,
    pub form: ProfileForm,
    pub editing: bool,
}

impl ProfileView {
    fn new(user: User) -> Self {
        Self {
            form: ProfileForm::from_user(&user),
            user,
            editing: false,
        }
    }

    /// Leaving edit mode discards unsaved changes.
    pub fn toggle_edit(&mut self) {
        if self.editing {
            self.form = ProfileForm::from_user(&self.user);
        }
        self.editing = !self.editing;
    }
}

pub struct ProfilePage {
    ctx: PageContext,
}

impl ProfilePage {
    pub fn new(ctx: PageContext) -> Self {
        Self { ctx }
    }

    async fn user_id(&self) -> Option<UserId> {
        self.ctx.session.user_id().await.unwrap_or_else(|err| {
            warn!(error = %err, "failed to read session");
            None
        })
    }

    pub async fn load(&self) -> Result<ProfileView, ActionOutcome> {
        let Some(user_id) = self.user_id().await else {
            return Err(
                ActionOutcome::notice(Notice::error("Please login to view profile")).then(Route::Login),
            );
        };
        let variables = UserIdVars { user_id };
        match self
            .ctx
            .client
            .query::<GetUser>(&variables, FetchPolicy::NetworkOnly)
            .await
        {
            Ok(UserResult::User(user)) => Ok(ProfileView::new(user)),
            Ok(_) => Err(ActionOutcome::notice(Notice::error("User not found"))),
            Err(err) => {
                warn!(user_id = %variables.user_id, error = %err, "profile load failed");
                Err(ActionOutcome::notice(Notice::error(format!("Error: {err}"))))
            }
        }
    }

    /// Saves the form; on success the view leaves edit mode with the
    /// server's copy of the user.
    pub async fn save(&self, view: &mut ProfileView) -> Notice {
        let form = &view.form;
        let variables = Params::new(UserUpdate {
            user_id: view.user.user_id.clone(),
            name: form.name.clone(),
            gender: form.gender,
            username: form.username.clone(),
            password: form.password.clone(),
            email: form.email.clone(),
            phone_number: form.phone_number.clone(),
        });
        match self.ctx.client.mutate::<UpdateUser>(&variables).await {
            Ok(UpdateUserResult::Updated(user)) => {
                info!(user_id = %user.user_id, "profile updated");
                *view = ProfileView::new(user);
                Notice::success("Profile updated successfully!")
            }
            Ok(other) => Notice::error(
                other
                    .api_error()
                    .map(|err| err.message)
                    .unwrap_or_else(|| "Failed to update profile".to_string()),
            ),
            Err(err) => {
                warn!(user_id = %view.user.user_id, error = %err, "profile update failed");
                Notice::error(err.to_string())
            }
        }
    }
}

#[cfg(test)]
#[path = "../tests/profile_tests.rs"]
mod tests;
