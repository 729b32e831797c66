use std::fmt;

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// SeaORM entity for the `posts` table. Listed latest first.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique, indexed)]
    pub pubkey: Uuid,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    pub author_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::AuthorId",
        to = "super::users::Column::Id"
    )]
    Author,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}

pub const TITLE_MAX_LEN: usize = 100;

fn check_title(title: &str) -> Result<(), String> {
    if title.trim().is_empty() {
        return Err("title must not be blank".to_string());
    }
    if title.chars().count() > TITLE_MAX_LEN {
        return Err(format!("title must be at most {TITLE_MAX_LEN} characters"));
    }
    Ok(())
}

// ── DTOs ──

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePost {
    pub title: String,
    pub content: String,
}

impl CreatePost {
    pub fn validate(&self) -> Result<(), String> {
        check_title(&self.title)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdatePost {
    pub title: Option<String>,
    pub content: Option<String>,
}

impl UpdatePost {
    pub fn validate(&self) -> Result<(), String> {
        match &self.title {
            Some(title) => check_title(title),
            None => Ok(()),
        }
    }
}

/// Post as returned by the API: every column except the row id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostResponse {
    pub pubkey: Uuid,
    pub title: String,
    pub content: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    pub author: i32,
}

impl From<Model> for PostResponse {
    fn from(m: Model) -> Self {
        Self {
            pubkey: m.pubkey,
            title: m.title,
            content: m.content,
            created_at: m.created_at,
            updated_at: m.updated_at,
            author: m.author_id,
        }
    }
}
