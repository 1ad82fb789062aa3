mod email;
mod log_in;
mod middleware;
mod password;
mod register_user;
mod token;
mod user;

pub use email::Email;
pub use log_in::{LogInState, post_log_in};
pub use middleware::{AuthState, Scope, auth_guard, authorize, resolve};
pub use password::{PasswordHash, RawPassword};
pub use register_user::register_user;
pub use token::{TokenResponse, TokenService};
pub use user::{
    NewUser, User, UserID, create_user, create_user_table, get_user_by_email, get_user_by_id,
};
