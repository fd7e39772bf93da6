pub mod forgot_password;
pub mod get_profile;
pub mod login;
pub mod logout;
pub mod refresh;
pub mod register;
pub mod reset_password;
