use serde::Serialize;

use crate::entities::movie;

pub const MIN_RATING: f64 = 0.0;
pub const MAX_RATING: f64 = 10.0;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Movie {
    pub id: i32,
    pub title: String,
    pub year: i32,
    pub description: String,
    pub rating: Option<f64>,
    pub ranking: Option<i32>,
    pub review: Option<String>,
    pub img_url: String,
}

impl From<movie::Model> for Movie {
    fn from(m: movie::Model) -> Self {
        Self {
            id: m.id,
            title: m.title,
            year: m.year,
            description: m.description,
            rating: m.rating,
            ranking: m.ranking,
            review: m.review,
            img_url: m.img_url,
        }
    }
}

/// A movie about to be stored. Rating, review and ranking start unset.
#[derive(Clone, Debug, PartialEq)]
pub struct NewMovie {
    pub title: String,
    pub year: i32,
    pub description: String,
    pub img_url: String,
}

/// One search hit offered to the user before importing it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Candidate {
    pub external_id: i64,
    pub title: String,
    pub release_date_raw: String,
    pub poster_url: Option<String>,
}

impl Candidate {
    pub fn year(&self) -> Option<i32> {
        release_year(&self.release_date_raw)
    }
}

/// Full record for one external id, with image paths already resolved.
#[derive(Clone, Debug, PartialEq)]
pub struct MovieDetail {
    pub external_id: i64,
    pub title: String,
    pub release_date_raw: String,
    pub overview: String,
    pub backdrop_url: Option<String>,
    pub poster_url: Option<String>,
}

pub fn is_valid_rating(rating: f64) -> bool {
    rating.is_finite() && (MIN_RATING..=MAX_RATING).contains(&rating)
}

/// Year portion of a `YYYY-MM-DD` release date.
pub fn release_year(raw: &str) -> Option<i32> {
    let head = raw.split('-').next()?.trim();
    if head.is_empty() {
        return None;
    }
    head.parse().ok()
}

/// Orders movies by title and numbers them from 1. Returns the `(id, ranking)`
/// pairs to persist.
pub fn assign_rankings(movies: &mut [Movie]) -> Vec<(i32, i32)> {
    movies.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id)));

    movies
        .iter_mut()
        .zip(1..)
        .map(|(movie, rank)| {
            movie.ranking = Some(rank);
            (movie.id, rank)
        })
        .collect()
}
