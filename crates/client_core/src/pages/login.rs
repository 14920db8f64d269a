use shared::protocol::LoginResult;
use tracing::{info, warn};

use super::{ActionOutcome, Notice, PageContext};
use crate::{
    operations::{Credentials, Params, UserLogin},
    routes::Route,
    session::StoredSession,
};

pub struct LoginPage {
    ctx: PageContext,
}

impl LoginPage {
    pub fn new(ctx: PageContext) -> Self {
        Self { ctx }
    }

    pub async fn submit(&self, email: &str, password: &str) -> ActionOutcome {
        let variables = Params::new(Credentials {
            email: email.to_string(),
            password: password.to_string(),
        });
        let result = match self.ctx.client.mutate::<UserLogin>(&variables).await {
            Ok(result) => result,
            Err(err) => {
                warn!(error = %err, "login request failed");
                return ActionOutcome::notice(Notice::error(format!("Error: {err}")));
            }
        };

        let LoginResult::LoggedIn { token, user } = result else {
            return ActionOutcome::notice(Notice::error("Invalid email or password"));
        };

        let session = StoredSession {
            user_id: user.user_id,
            email: user.email,
            name: user.name,
            token: Some(token.clone()),
        };
        if let Err(err) = self.ctx.session.save(&session).await {
            warn!(error = %err, "failed to persist session");
            return ActionOutcome::notice(Notice::error(format!("Error: {err}")));
        }
        self.ctx.client.set_auth_token(Some(token)).await;
        info!(user_id = %session.user_id, "signed in");

        ActionOutcome::notice(Notice::success("Login successful!")).then(Route::Dashboard)
    }
}

#[cfg(test)]
#[path = "../tests/login_tests.rs"]
mod tests;
