use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set, SqlErr, TransactionTrait, sea_query::Expr,
};
use tracing::debug;

use crate::{
    entities::movie,
    models::{Movie, NewMovie, is_valid_rating},
};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("movie {0} not found")]
    NotFound(i32),
    #[error("{0}")]
    ConstraintViolation(String),
    #[error("database error: {0}")]
    Db(#[from] DbErr),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Durable table of movies keyed by `id`, with titles kept unique.
#[async_trait]
pub trait MovieStore: Send + Sync {
    /// All movies, ordered by title.
    async fn list_all(&self) -> StoreResult<Vec<Movie>>;

    async fn get_by_id(&self, id: i32) -> StoreResult<Option<Movie>>;

    /// Stores a new movie and returns it with its generated id.
    async fn insert(&self, movie: NewMovie) -> StoreResult<Movie>;

    /// Writes every mutable field of an existing movie.
    async fn update(&self, movie: &Movie) -> StoreResult<()>;

    async fn delete_by_id(&self, id: i32) -> StoreResult<()>;

    /// Rewrites the ranking of each listed movie as one transaction.
    async fn save_rankings(&self, rankings: &[(i32, i32)]) -> StoreResult<()>;
}

#[derive(Clone)]
pub struct SqliteMovieStore {
    db: DatabaseConnection,
}

impl SqliteMovieStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl MovieStore for SqliteMovieStore {
    async fn list_all(&self) -> StoreResult<Vec<Movie>> {
        let rows = movie::Entity::find().order_by_asc(movie::Column::Title).all(&self.db).await?;
        Ok(rows.into_iter().map(Movie::from).collect())
    }

    async fn get_by_id(&self, id: i32) -> StoreResult<Option<Movie>> {
        let row = movie::Entity::find_by_id(id).one(&self.db).await?;
        Ok(row.map(Movie::from))
    }

    async fn insert(&self, new: NewMovie) -> StoreResult<Movie> {
        for (field, value) in [("title", &new.title), ("img_url", &new.img_url)] {
            if value.trim().is_empty() {
                return Err(StoreError::ConstraintViolation(format!("{field} is required")));
            }
        }

        let title = new.title.clone();
        let model = movie::ActiveModel {
            id: Default::default(),
            title: Set(new.title),
            year: Set(new.year),
            description: Set(new.description),
            rating: Set(None),
            ranking: Set(None),
            review: Set(None),
            img_url: Set(new.img_url),
        };

        let saved = model.insert(&self.db).await.map_err(|err| match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                StoreError::ConstraintViolation(format!("a movie titled \"{title}\" already exists"))
            },
            _ => StoreError::Db(err),
        })?;

        debug!(movie_id = saved.id, title = %saved.title, "inserted movie");
        Ok(saved.into())
    }

    async fn update(&self, movie: &Movie) -> StoreResult<()> {
        if let Some(rating) = movie.rating {
            if !is_valid_rating(rating) {
                return Err(StoreError::ConstraintViolation(format!(
                    "rating {rating} is outside 0-10"
                )));
            }
        }

        let txn = self.db.begin().await?;

        let Some(existing) = movie::Entity::find_by_id(movie.id).one(&txn).await? else {
            return Err(StoreError::NotFound(movie.id));
        };

        let mut model: movie::ActiveModel = existing.into();
        model.title = Set(movie.title.clone());
        model.year = Set(movie.year);
        model.description = Set(movie.description.clone());
        model.rating = Set(movie.rating);
        model.ranking = Set(movie.ranking);
        model.review = Set(movie.review.clone());
        model.img_url = Set(movie.img_url.clone());

        model.update(&txn).await.map_err(|err| match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => StoreError::ConstraintViolation(format!(
                "a movie titled \"{}\" already exists",
                movie.title
            )),
            _ => StoreError::Db(err),
        })?;

        txn.commit().await?;

        debug!(movie_id = movie.id, "updated movie");
        Ok(())
    }

    async fn delete_by_id(&self, id: i32) -> StoreResult<()> {
        let res = movie::Entity::delete_by_id(id).exec(&self.db).await?;
        if res.rows_affected == 0 {
            return Err(StoreError::NotFound(id));
        }

        debug!(movie_id = id, "deleted movie");
        Ok(())
    }

    async fn save_rankings(&self, rankings: &[(i32, i32)]) -> StoreResult<()> {
        let txn = self.db.begin().await?;

        for &(id, ranking) in rankings {
            movie::Entity::update_many()
                .col_expr(movie::Column::Ranking, Expr::value(ranking))
                .filter(movie::Column::Id.eq(id))
                .exec(&txn)
                .await?;
        }

        txn.commit().await?;

        debug!(count = rankings.len(), "saved rankings");
        Ok(())
    }
}
