use shared::{domain::Gender, protocol::CreateUserResult};
use tracing::{info, warn};

use super::{ActionOutcome, Notice, PageContext};
use crate::{
    operations::{CreateUser, CreateUserVars, NewUser},
    routes::Route,
};

#[derive(Debug, Clone, PartialEq)]
pub struct SignupForm {
    pub name: String,
    pub username: String,
    pub password: String,
    pub gender: Gender,
    pub email: String,
    pub phone_number: String,
}

pub struct SignupPage {
    ctx: PageContext,
}

impl SignupPage {
    pub fn new(ctx: PageContext) -> Self {
        Self { ctx }
    }

    pub async fn submit(&self, form: SignupForm) -> ActionOutcome {
        let variables = CreateUserVars {
            user: NewUser {
                name: form.name,
                username: form.username,
                password: form.password,
                gender: form.gender,
                email: form.email,
                phone_number: form.phone_number,
            },
        };
        let result = match self.ctx.client.mutate::<CreateUser>(&variables).await {
            Ok(result) => result,
            Err(err) => {
                warn!(error = %err, "signup request failed");
                return ActionOutcome::notice(Notice::error(format!("Error: {err}")));
            }
        };

        match result {
            CreateUserResult::Created(user) => {
                info!(user_id = %user.user_id, "account created");
                ActionOutcome::notice(Notice::success("Account created successfully!"))
                    .then(Route::Login)
            }
            CreateUserResult::ExistingEmail { .. } => {
                ActionOutcome::notice(Notice::error("Email already exists"))
            }
            CreateUserResult::ExistingUsername { .. } => {
                ActionOutcome::notice(Notice::error("Username already exists"))
            }
            CreateUserResult::ExistingPhoneNumber { .. } => {
                ActionOutcome::notice(Notice::error("Phone number already exists"))
            }
            CreateUserResult::Unrecognized => {
                ActionOutcome::notice(Notice::error("Error: Something went wrong"))
            }
        }
    }
}

#[cfg(test)]
#[path = "../tests/signup_tests.rs"]
mod tests;
