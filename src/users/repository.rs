//! # Repositorio de Usuarios
//! src/users/repository.rs
//!
//! El almacenamiento es un colaborador externo: el núcleo solo consume
//! este trait. `InMemoryRepository` sirve para el binario y los tests.

use crate::error::RepositoryError;
use crate::users::model::{NewUser, User, UserId, UserUpdate};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::SystemTime;

pub type RepoResult<T> = std::result::Result<T, RepositoryError>;

/// Operaciones CRUD sobre usuarios
pub trait UserRepository: Send + Sync {
    fn create_user(&self, user: NewUser) -> RepoResult<User>;

    fn get_user_by_id(&self, id: UserId) -> RepoResult<User>;

    fn get_user_by_email(&self, email: &str) -> RepoResult<User>;

    /// Más recientes primero
    fn get_users(&self, limit: usize, offset: usize) -> RepoResult<Vec<User>>;

    fn update_user(&self, id: UserId, update: UserUpdate) -> RepoResult<User>;

    fn delete_user(&self, id: UserId) -> RepoResult<()>;

    fn count_users(&self) -> RepoResult<usize>;

    /// Usuarios creados en o después de `since`
    fn count_users_since(&self, since: SystemTime) -> RepoResult<usize>;
}

struct Table {
    rows: BTreeMap<UserId, User>,
    next_id: UserId,
}

/// Repositorio en memoria. Los clones comparten la tabla.
#[derive(Clone)]
pub struct InMemoryRepository {
    table: Arc<Mutex<Table>>,

    /// Simula una caída de la base de datos
    unavailable: Arc<AtomicBool>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self {
            table: Arc::new(Mutex::new(Table {
                rows: BTreeMap::new(),
                next_id: 1,
            })),
            unavailable: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Activa o desactiva la caída simulada
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn lock(&self) -> RepoResult<MutexGuard<'_, Table>> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(RepositoryError::Unavailable("database is down".to_string()));
        }
        Ok(self.table.lock().unwrap_or_else(|poisoned| poisoned.into_inner()))
    }

    /// Inserta con una fecha de creación explícita (seeds y tests)
    pub fn insert_at(&self, user: NewUser, created_at: SystemTime) -> RepoResult<User> {
        let mut table = self.lock()?;

        if table.rows.values().any(|u| u.email == user.email) {
            return Err(RepositoryError::Conflict(format!(
                "email {} already exists",
                user.email
            )));
        }

        let id = table.next_id;
        table.next_id += 1;

        let row = User {
            id,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            created_at,
            updated_at: created_at,
        };
        table.rows.insert(id, row.clone());

        Ok(row)
    }
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl UserRepository for InMemoryRepository {
    fn create_user(&self, user: NewUser) -> RepoResult<User> {
        self.insert_at(user, SystemTime::now())
    }

    fn get_user_by_id(&self, id: UserId) -> RepoResult<User> {
        self.lock()?
            .rows
            .get(&id)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    fn get_user_by_email(&self, email: &str) -> RepoResult<User> {
        self.lock()?
            .rows
            .values()
            .find(|u| u.email == email)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    fn get_users(&self, limit: usize, offset: usize) -> RepoResult<Vec<User>> {
        let table = self.lock()?;

        let mut users: Vec<&User> = table.rows.values().collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        Ok(users.into_iter().skip(offset).take(limit).cloned().collect())
    }

    fn update_user(&self, id: UserId, update: UserUpdate) -> RepoResult<User> {
        let mut table = self.lock()?;

        if let Some(email) = &update.email {
            if table.rows.values().any(|u| u.id != id && &u.email == email) {
                return Err(RepositoryError::Conflict(format!(
                    "email {} already exists",
                    email
                )));
            }
        }

        let row = table.rows.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        if let Some(username) = update.username {
            row.username = username;
        }
        if let Some(email) = update.email {
            row.email = email;
        }
        row.updated_at = SystemTime::now();

        Ok(row.clone())
    }

    fn delete_user(&self, id: UserId) -> RepoResult<()> {
        self.lock()?
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }

    fn count_users(&self) -> RepoResult<usize> {
        Ok(self.lock()?.rows.len())
    }

    fn count_users_since(&self, since: SystemTime) -> RepoResult<usize> {
        Ok(self
            .lock()?
            .rows
            .values()
            .filter(|u| u.created_at >= since)
            .count())
    }
}
