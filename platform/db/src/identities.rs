use chrono::Utc;
use entity::{user_roles, users};
use platform_authz::Role;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
    TransactionTrait,
};
use uuid::Uuid;

use crate::{DbError, DbPool, DbResult, unique_email};

/// A stored identity together with its roles.
#[derive(Clone, Debug)]
pub struct Identity {
    pub user: users::Model,
    pub roles: Vec<Role>,
}

impl Identity {
    pub fn principal(&self) -> platform_authz::Principal {
        platform_authz::Principal::new(self.user.id, self.roles.iter().copied())
    }
}

fn to_authz(role: user_roles::Role) -> Role {
    match role {
        user_roles::Role::Admin => Role::Admin,
        user_roles::Role::Employee => Role::Employee,
    }
}

fn to_stored(role: Role) -> user_roles::Role {
    match role {
        Role::Admin => user_roles::Role::Admin,
        Role::Employee => user_roles::Role::Employee,
    }
}

/// Creates an identity holding a single role. Fails with `EmailTaken` when the
/// (already normalized) email exists.
pub async fn create_identity(
    db: &DbPool,
    email: &str,
    password_hash: &str,
    role: Role,
) -> DbResult<Identity> {
    let txn = db.begin().await?;
    let user = insert_identity(&txn, email, password_hash, role).await?;
    txn.commit().await?;
    Ok(Identity {
        user,
        roles: vec![role],
    })
}

pub(crate) async fn insert_identity<C: ConnectionTrait>(
    conn: &C,
    email: &str,
    password_hash: &str,
    role: Role,
) -> DbResult<users::Model> {
    let existing = users::Entity::find()
        .filter(users::Column::Email.eq(email))
        .one(conn)
        .await?;
    if existing.is_some() {
        return Err(DbError::EmailTaken(email.to_owned()));
    }

    let user = users::ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(email.to_owned()),
        password_hash: Set(password_hash.to_owned()),
        created_at: Set(Utc::now().into()),
    }
    .insert(conn)
    .await
    .map_err(|err| unique_email(err, email))?;

    user_roles::Entity::insert(user_roles::ActiveModel {
        user_id: Set(user.id),
        role: Set(to_stored(role)),
    })
    .exec_without_returning(conn)
    .await?;

    Ok(user)
}

pub async fn find_identity_by_email(db: &DbPool, email: &str) -> DbResult<Option<Identity>> {
    let Some(user) = users::Entity::find()
        .filter(users::Column::Email.eq(email))
        .one(db)
        .await?
    else {
        return Ok(None);
    };
    let roles = load_roles(db, user.id).await?;
    Ok(Some(Identity { user, roles }))
}

pub async fn find_identity(db: &DbPool, id: Uuid) -> DbResult<Option<Identity>> {
    let Some(user) = users::Entity::find_by_id(id).one(db).await? else {
        return Ok(None);
    };
    let roles = load_roles(db, user.id).await?;
    Ok(Some(Identity { user, roles }))
}

async fn load_roles<C: ConnectionTrait>(conn: &C, user_id: Uuid) -> DbResult<Vec<Role>> {
    let rows = user_roles::Entity::find()
        .filter(user_roles::Column::UserId.eq(user_id))
        .all(conn)
        .await?;
    let mut roles: Vec<Role> = rows.into_iter().map(|row| to_authz(row.role)).collect();
    roles.sort();
    Ok(roles)
}
