//! # Usuarios
//!
//! Modelo y colaboradores externos que consume el núcleo:
//! almacenamiento, hashing de passwords y tokens.

pub mod auth;
pub mod model;
pub mod repository;

pub use auth::{DigestTokenIssuer, PasswordHasher, Sha256Hasher, TokenIssuer};
pub use model::{
    LoginRequest, NewUser, PaginatedUsers, RegisterRequest, UpdateUserRequest, User, UserId,
    UserUpdate,
};
pub use repository::{InMemoryRepository, UserRepository};
