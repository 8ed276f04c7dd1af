//! One struct per auth flow.
//!
//! Each action is generic over the repository traits it touches and owns
//! its collaborators (hasher, token issuer, policy objects). The HTTP
//! layer constructs them per request from [`crate::api::axum::AppState`];
//! they are equally usable without any HTTP layer at all.

mod change_password;
mod forgot_password;
mod login;
mod reset_password;
mod signup;

pub use change_password::ChangePasswordAction;
pub use forgot_password::ForgotPasswordAction;
pub use login::LoginAction;
pub use reset_password::ResetPasswordAction;
pub use signup::{SignupAction, SignupRequest};
