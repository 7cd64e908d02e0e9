//! SurrealDB implementation of [`RecipeRepository`].
//!
//! Likes and comments are embedded arrays on the recipe document.
//! Every interaction mutation is a single `UPDATE` statement that
//! transforms only the targeted element server-side, so concurrent
//! writers on the same recipe never overwrite each other's
//! interactions.

use chrono::{DateTime, Utc};
use popote_core::error::PopoteResult;
use popote_core::models::recipe::{
    Comment, CreateRecipe, ModerationStatus, Recipe, UpdateRecipe,
};
use popote_core::repository::{PaginatedResult, Pagination, RecipeFilter, RecipeRepository};
use serde::Deserialize;
use surrealdb::{Connection, Surreal};
use uuid::Uuid;

use crate::error::DbError;

#[derive(Debug, Deserialize)]
struct CommentRow {
    id: String,
    author: String,
    text: String,
    is_edited: bool,
    created_at: DateTime<Utc>,
}

impl CommentRow {
    fn into_comment(self) -> Result<Comment, DbError> {
        Ok(Comment {
            id: parse_uuid(&self.id, "comment id")?,
            author: parse_uuid(&self.author, "comment author")?,
            text: self.text,
            is_edited: self.is_edited,
            created_at: self.created_at,
        })
    }
}

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, Deserialize)]
struct RecipeRow {
    title: String,
    ingredients: Vec<String>,
    instructions: String,
    prep_time: Option<String>,
    cover_image: Option<String>,
    status: String,
    created_by: Option<String>,
    likes: Vec<String>,
    comments: Vec<CommentRow>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, Deserialize)]
struct RecipeRowWithId {
    record_id: String,
    title: String,
    ingredients: Vec<String>,
    instructions: String,
    prep_time: Option<String>,
    cover_image: Option<String>,
    status: String,
    created_by: Option<String>,
    likes: Vec<String>,
    comments: Vec<CommentRow>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Row struct for count queries.
#[derive(Debug, Deserialize)]
struct CountRow {
    total: u64,
}

fn parse_uuid(s: &str, what: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(s).map_err(|e| DbError::Corrupt(format!("invalid {what} UUID: {e}")))
}

fn parse_status(s: &str) -> Result<ModerationStatus, DbError> {
    match s {
        "Pending" => Ok(ModerationStatus::Pending),
        "Accepted" => Ok(ModerationStatus::Accepted),
        "Official" => Ok(ModerationStatus::Official),
        other => Err(DbError::Corrupt(format!("unknown recipe status: {other}"))),
    }
}

fn status_to_string(status: ModerationStatus) -> &'static str {
    match status {
        ModerationStatus::Pending => "Pending",
        ModerationStatus::Accepted => "Accepted",
        ModerationStatus::Official => "Official",
    }
}

fn assemble(
    id: Uuid,
    title: String,
    ingredients: Vec<String>,
    instructions: String,
    prep_time: Option<String>,
    cover_image: Option<String>,
    status: String,
    created_by: Option<String>,
    likes: Vec<String>,
    comments: Vec<CommentRow>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
) -> Result<Recipe, DbError> {
    Ok(Recipe {
        id,
        title,
        ingredients,
        instructions,
        prep_time,
        cover_image,
        status: parse_status(&status)?,
        created_by: created_by
            .map(|s| parse_uuid(&s, "recipe author"))
            .transpose()?,
        likes: likes
            .iter()
            .map(|s| parse_uuid(s, "like"))
            .collect::<Result<Vec<_>, _>>()?,
        comments: comments
            .into_iter()
            .map(CommentRow::into_comment)
            .collect::<Result<Vec<_>, _>>()?,
        created_at,
        updated_at,
    })
}

impl RecipeRow {
    fn into_recipe(self, id: Uuid) -> Result<Recipe, DbError> {
        assemble(
            id,
            self.title,
            self.ingredients,
            self.instructions,
            self.prep_time,
            self.cover_image,
            self.status,
            self.created_by,
            self.likes,
            self.comments,
            self.created_at,
            self.updated_at,
        )
    }
}

impl RecipeRowWithId {
    fn try_into_recipe(self) -> Result<Recipe, DbError> {
        let id = parse_uuid(&self.record_id, "recipe")?;
        assemble(
            id,
            self.title,
            self.ingredients,
            self.instructions,
            self.prep_time,
            self.cover_image,
            self.status,
            self.created_by,
            self.likes,
            self.comments,
            self.created_at,
            self.updated_at,
        )
    }
}

/// SurrealDB implementation of the Recipe repository.
#[derive(Clone)]
pub struct SurrealRecipeRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealRecipeRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    /// Check a single-record mutation and convert the post-update row.
    fn take_updated(
        &self,
        result: surrealdb::Response,
        id: Uuid,
        id_str: String,
    ) -> Result<Recipe, DbError> {
        let mut result = result.check()?;
        let rows: Vec<RecipeRow> = result.take(0)?;
        let row = rows.into_iter().next().ok_or(DbError::NotFound {
            entity: "recipe".into(),
            id: id_str,
        })?;
        row.into_recipe(id)
    }
}

impl<C: Connection> RecipeRepository for SurrealRecipeRepository<C> {
    async fn create(&self, input: CreateRecipe) -> PopoteResult<Recipe> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let mut sets = vec![
            "title = $title",
            "ingredients = $ingredients",
            "instructions = $instructions",
            "status = $status",
            "likes = []",
            "comments = []",
        ];
        if input.prep_time.is_some() {
            sets.push("prep_time = $prep_time");
        }
        if input.cover_image.is_some() {
            sets.push("cover_image = $cover_image");
        }
        if input.created_by.is_some() {
            sets.push("created_by = $created_by");
        }

        let query = format!("CREATE type::thing('recipe', $id) SET {}", sets.join(", "));

        let mut builder = self
            .db
            .query(&query)
            .bind(("id", id_str.clone()))
            .bind(("title", input.title))
            .bind(("ingredients", input.ingredients))
            .bind(("instructions", input.instructions))
            .bind(("status", status_to_string(input.status).to_string()));

        if let Some(prep_time) = input.prep_time {
            builder = builder.bind(("prep_time", prep_time));
        }
        if let Some(cover_image) = input.cover_image {
            builder = builder.bind(("cover_image", cover_image));
        }
        if let Some(created_by) = input.created_by {
            builder = builder.bind(("created_by", created_by.to_string()));
        }

        let result = builder.await.map_err(DbError::from)?;
        Ok(self.take_updated(result, id, id_str)?)
    }

    async fn get_by_id(&self, id: Uuid) -> PopoteResult<Recipe> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::thing('recipe', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<RecipeRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or(DbError::NotFound {
            entity: "recipe".into(),
            id: id_str,
        })?;

        Ok(row.into_recipe(id)?)
    }

    async fn update(&self, id: Uuid, input: UpdateRecipe) -> PopoteResult<Recipe> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.title.is_some() {
            sets.push("title = $title");
        }
        if input.ingredients.is_some() {
            sets.push("ingredients = $ingredients");
        }
        if input.instructions.is_some() {
            sets.push("instructions = $instructions");
        }
        if input.prep_time.is_some() {
            sets.push("prep_time = $prep_time");
        }
        if input.cover_image.is_some() {
            sets.push("cover_image = $cover_image");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::thing('recipe', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));

        if let Some(title) = input.title {
            builder = builder.bind(("title", title));
        }
        if let Some(ingredients) = input.ingredients {
            builder = builder.bind(("ingredients", ingredients));
        }
        if let Some(instructions) = input.instructions {
            builder = builder.bind(("instructions", instructions));
        }
        if let Some(prep_time) = input.prep_time {
            builder = builder.bind(("prep_time", prep_time));
        }
        if let Some(cover_image) = input.cover_image {
            builder = builder.bind(("cover_image", cover_image));
        }

        let result = builder.await.map_err(DbError::from)?;
        Ok(self.take_updated(result, id, id_str)?)
    }

    async fn delete(&self, id: Uuid) -> PopoteResult<()> {
        self.db
            .query("DELETE type::thing('recipe', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn set_status(&self, id: Uuid, status: ModerationStatus) -> PopoteResult<Recipe> {
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "UPDATE type::thing('recipe', $id) SET \
                 status = $status, updated_at = time::now()",
            )
            .bind(("id", id_str.clone()))
            .bind(("status", status_to_string(status).to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(self.take_updated(result, id, id_str)?)
    }

    async fn list(
        &self,
        filter: RecipeFilter,
        pagination: Pagination,
    ) -> PopoteResult<PaginatedResult<Recipe>> {
        let mut conditions = Vec::new();
        if filter.author.is_some() {
            conditions.push("created_by = $author");
        }
        if filter.status.is_some() {
            conditions.push("status = $filter_status");
        }
        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conditions.join(" AND "))
        };

        let count_query = format!("SELECT count() AS total FROM recipe{where_clause} GROUP ALL");
        let mut builder = self.db.query(&count_query);
        if let Some(author) = filter.author {
            builder = builder.bind(("author", author.to_string()));
        }
        if let Some(status) = filter.status {
            builder = builder.bind(("filter_status", status_to_string(status).to_string()));
        }
        let mut count_result = builder.await.map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        // Display precedence (official > accepted > pending) is the
        // primary sort key, recency the tiebreak.
        let list_query = format!(
            "SELECT meta::id(id) AS record_id, *, \
             (IF status = 'Official' {{ 2 }} ELSE IF status = 'Accepted' {{ 1 }} ELSE {{ 0 }}) \
             AS precedence \
             FROM recipe{where_clause} \
             ORDER BY precedence DESC, created_at DESC \
             LIMIT $limit START $offset"
        );
        let mut builder = self
            .db
            .query(&list_query)
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset));
        if let Some(author) = filter.author {
            builder = builder.bind(("author", author.to_string()));
        }
        if let Some(status) = filter.status {
            builder = builder.bind(("filter_status", status_to_string(status).to_string()));
        }

        let mut result = builder.await.map_err(DbError::from)?;
        let rows: Vec<RecipeRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_recipe())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }

    async fn toggle_like(&self, id: Uuid, user: Uuid) -> PopoteResult<Recipe> {
        let id_str = id.to_string();

        // Membership test and set mutation happen in one statement, so
        // toggles from different users cannot lose each other.
        let result = self
            .db
            .query(
                "UPDATE type::thing('recipe', $id) SET \
                 likes = (IF $user IN likes \
                     { array::complement(likes, [$user]) } \
                     ELSE { array::union(likes, [$user]) }), \
                 updated_at = time::now()",
            )
            .bind(("id", id_str.clone()))
            .bind(("user", user.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(self.take_updated(result, id, id_str)?)
    }

    async fn push_comment(
        &self,
        id: Uuid,
        comment_id: Uuid,
        author: Uuid,
        text: String,
    ) -> PopoteResult<Recipe> {
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "UPDATE type::thing('recipe', $id) SET \
                 comments += { \
                     id: $comment_id, \
                     author: $author, \
                     text: $text, \
                     is_edited: false, \
                     created_at: time::now() \
                 }, \
                 updated_at = time::now()",
            )
            .bind(("id", id_str.clone()))
            .bind(("comment_id", comment_id.to_string()))
            .bind(("author", author.to_string()))
            .bind(("text", text))
            .await
            .map_err(DbError::from)?;

        Ok(self.take_updated(result, id, id_str)?)
    }

    async fn update_comment(
        &self,
        id: Uuid,
        comment_id: Uuid,
        text: String,
    ) -> PopoteResult<Recipe> {
        let id_str = id.to_string();

        // Identity-addressed assignment: only the targeted element's
        // text and edit flag are written; author and created_at are
        // never part of the statement.
        let result = self
            .db
            .query(
                "UPDATE type::thing('recipe', $id) SET \
                 comments[WHERE id = $comment_id].text = $text, \
                 comments[WHERE id = $comment_id].is_edited = true, \
                 updated_at = time::now()",
            )
            .bind(("id", id_str.clone()))
            .bind(("comment_id", comment_id.to_string()))
            .bind(("text", text))
            .await
            .map_err(DbError::from)?;

        Ok(self.take_updated(result, id, id_str)?)
    }

    async fn remove_comment(&self, id: Uuid, comment_id: Uuid) -> PopoteResult<Recipe> {
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "UPDATE type::thing('recipe', $id) SET \
                 comments = comments[WHERE id != $comment_id], \
                 updated_at = time::now()",
            )
            .bind(("id", id_str.clone()))
            .bind(("comment_id", comment_id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(self.take_updated(result, id, id_str)?)
    }
}
