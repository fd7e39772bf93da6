pub mod domain;
pub mod ports;

// Re-export commonly used types for convenience
pub use domain::{
    email::{Email, EmailError},
    password::{Password, PasswordPolicyViolation},
    session::SessionRecord,
    user::{NewUser, Role, User, UserProfile, UserStatus},
};

pub use ports::{
    repositories::{KvStore, KvStoreError, UserStore, UserStoreError},
    services::{EmailClient, EmailClientError},
};
