//! # Modelo de Usuarios
//! src/users/model.rs

use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// Identificador de usuario. También es el payload de un job de analytics.
pub type UserId = i64;

/// Registro de usuario tal como lo guarda el repositorio
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,

    /// Nunca se serializa
    #[serde(skip)]
    pub password_hash: String,

    pub created_at: SystemTime,
    pub updated_at: SystemTime,
}

impl User {
    /// Copia sin el hash del password, para devolver al caller
    pub fn redacted(mut self) -> Self {
        self.password_hash.clear();
        self
    }
}

/// Datos para crear un usuario (password ya hasheado)
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// Cambios parciales sobre un usuario
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserUpdate {
    pub username: Option<String>,
    pub email: Option<String>,
}

impl UserUpdate {
    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.email.is_none()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Campos vacíos se tratan como "sin cambio"
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
}

impl UpdateUserRequest {
    pub fn into_update(self) -> UserUpdate {
        UserUpdate {
            username: Some(self.username).filter(|s| !s.is_empty()),
            email: Some(self.email).filter(|s| !s.is_empty()),
        }
    }
}

/// Página de usuarios
#[derive(Debug, Clone, Serialize)]
pub struct PaginatedUsers {
    pub users: Vec<User>,
    pub page: usize,
    pub limit: usize,
    pub total: usize,
    pub total_pages: usize,
}
