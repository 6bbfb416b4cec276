//! Synthetic titles, ratings and viewing history for loading into a test database.
//!
//! Every generator takes the random source and the reference time explicitly,
//! so a seeded generator reproduces the same rows.

use crate::{
    csv_writer::{CsvRecord, write_csv_file},
    result::{Result, ScriptError},
};
use chrono::{Duration, NaiveDateTime};
use rand::Rng;
use std::path::{Path, PathBuf};

const TITLE_TYPES: [&str; 2] = ["Movie", "TV Show"];
const CONTENT_RATINGS: [&str; 11] = [
    "TV-Y", "TV-Y7", "TV-G", "TV-PG", "TV-14", "TV-MA", "G", "PG", "PG-13", "R", "NC-17",
];
const COUNTRIES: [&str; 8] = [
    "United States",
    "India",
    "United Kingdom",
    "Canada",
    "France",
    "Germany",
    "Japan",
    "South Korea",
];
const GENRES: [&str; 16] = [
    "Action",
    "Adventure",
    "Anime",
    "Comedy",
    "Crime",
    "Documentary",
    "Drama",
    "Fantasy",
    "Horror",
    "International",
    "Kids",
    "Romance",
    "Sci-Fi",
    "Sports",
    "Thriller",
    "Western",
];
const DEVICES: [&str; 5] = ["Mobile", "Tablet", "TV", "Desktop", "Smart TV"];

pub const TITLES_FILE: &str = "netflix_titles.csv";
pub const RATINGS_FILE: &str = "netflix_ratings.csv";
pub const VIEWING_HISTORY_FILE: &str = "netflix_viewing_history.csv";

#[derive(Debug, Clone, PartialEq)]
pub struct TitleRecord {
    pub show_id: String,
    pub title_type: String,
    pub title: String,
    pub director: Option<String>,
    pub cast: String,
    pub country: String,
    pub date_added: String,
    pub release_year: i32,
    pub rating: String,
    pub duration: String,
    pub listed_in: String,
    pub description: String,
}

impl CsvRecord for TitleRecord {
    const HEADER: &'static [&'static str] = &[
        "show_id",
        "type",
        "title",
        "director",
        "cast",
        "country",
        "date_added",
        "release_year",
        "rating",
        "duration",
        "listed_in",
        "description",
    ];

    fn to_fields(&self) -> Vec<String> {
        vec![
            self.show_id.clone(),
            self.title_type.clone(),
            self.title.clone(),
            self.director.clone().unwrap_or_default(),
            self.cast.clone(),
            self.country.clone(),
            self.date_added.clone(),
            self.release_year.to_string(),
            self.rating.clone(),
            self.duration.clone(),
            self.listed_in.clone(),
            self.description.clone(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RatingRecord {
    pub rating_id: String,
    pub user_id: String,
    pub title_id: String,
    pub rating: f64,
    pub rating_date: String,
    pub review_text: Option<String>,
}

impl CsvRecord for RatingRecord {
    const HEADER: &'static [&'static str] = &[
        "rating_id",
        "user_id",
        "title_id",
        "rating",
        "rating_date",
        "review_text",
    ];

    fn to_fields(&self) -> Vec<String> {
        vec![
            self.rating_id.clone(),
            self.user_id.clone(),
            self.title_id.clone(),
            format!("{:.2}", self.rating),
            self.rating_date.clone(),
            self.review_text.clone().unwrap_or_default(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewingRecord {
    pub viewing_id: String,
    pub user_id: String,
    pub title_id: String,
    pub watch_date: String,
    pub watch_duration_minutes: u32,
    pub completion_percentage: f64,
    pub device_type: String,
}

impl CsvRecord for ViewingRecord {
    const HEADER: &'static [&'static str] = &[
        "viewing_id",
        "user_id",
        "title_id",
        "watch_date",
        "watch_duration_minutes",
        "completion_percentage",
        "device_type",
    ];

    fn to_fields(&self) -> Vec<String> {
        vec![
            self.viewing_id.clone(),
            self.user_id.clone(),
            self.title_id.clone(),
            self.watch_date.clone(),
            self.watch_duration_minutes.to_string(),
            format!("{:.2}", self.completion_percentage),
            self.device_type.clone(),
        ]
    }
}

fn pick<R: Rng + ?Sized>(rng: &mut R, items: &[&'static str]) -> &'static str {
    items[rng.random_range(0..items.len())]
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn random_uuid<R: Rng + ?Sized>(rng: &mut R) -> String {
    uuid::Builder::from_random_bytes(rng.random())
        .into_uuid()
        .to_string()
}

fn random_user_id<R: Rng + ?Sized>(rng: &mut R, num_users: usize) -> String {
    format!("user_{}", rng.random_range(1..=num_users))
}

fn random_title_id<R: Rng + ?Sized>(rng: &mut R, num_titles: usize) -> String {
    format!("s{}", rng.random_range(1..=num_titles))
}

fn check_id_range(name: &str, value: usize) -> Result<()> {
    if value == 0 {
        return Err(ScriptError::new_invalid_count(name, value));
    }
    Ok(())
}

/// Generate `n` catalog titles with ids `s1..=sn`
pub fn generate_titles<R: Rng + ?Sized>(
    rng: &mut R,
    now: NaiveDateTime,
    n: usize,
) -> Vec<TitleRecord> {
    (1..=n)
        .map(|id| {
            let title_type = pick(rng, &TITLE_TYPES);
            let title = format!("Sample {title_type} {id}");
            let director = if rng.random::<f64>() > 0.3 {
                Some(format!("Director {}", rng.random_range(1..=100)))
            } else {
                None
            };
            let cast = (0..rng.random_range(1..=5))
                .map(|j| format!("Actor {j}"))
                .collect::<Vec<_>>()
                .join(", ");
            let country = pick(rng, &COUNTRIES).to_string();
            let date_added = (now - Duration::days(rng.random_range(0..=365 * 3)))
                .format("%B %d, %Y")
                .to_string();
            let release_year = rng.random_range(1990..=2024);
            let rating = pick(rng, &CONTENT_RATINGS).to_string();
            let duration = if title_type == "Movie" {
                format!("{} min", rng.random_range(60..=180))
            } else {
                format!("{} Seasons", rng.random_range(1..=10))
            };
            let genre_count = rng.random_range(1..=3);
            let listed_in = rand::seq::index::sample(rng, GENRES.len(), genre_count)
                .iter()
                .map(|idx| GENRES[idx])
                .collect::<Vec<_>>()
                .join(", ");
            let description = format!("This is a sample description for {title}");

            TitleRecord {
                show_id: format!("s{id}"),
                title_type: title_type.to_string(),
                title,
                director,
                cast,
                country,
                date_added,
                release_year,
                rating,
                duration,
                listed_in,
                description,
            }
        })
        .collect()
}

/// Generate `n` user ratings referencing `num_users` users and `num_titles` titles
pub fn generate_ratings<R: Rng + ?Sized>(
    rng: &mut R,
    now: NaiveDateTime,
    n: usize,
    num_users: usize,
    num_titles: usize,
) -> Result<Vec<RatingRecord>> {
    check_id_range("num_users", num_users)?;
    check_id_range("num_titles", num_titles)?;

    Ok((0..n)
        .map(|i| {
            let rating_id = random_uuid(rng);
            let user_id = random_user_id(rng, num_users);
            let title_id = random_title_id(rng, num_titles);
            let rating = round2(rng.random_range(1.0..=5.0));
            let rating_date = (now - Duration::days(rng.random_range(0..=365)))
                .format("%Y-%m-%d")
                .to_string();
            let review_text = if rng.random::<f64>() > 0.5 {
                Some(format!("Sample review text {i}"))
            } else {
                None
            };

            RatingRecord {
                rating_id,
                user_id,
                title_id,
                rating,
                rating_date,
                review_text,
            }
        })
        .collect())
}

/// Generate `n` viewing sessions referencing `num_users` users and `num_titles` titles
pub fn generate_viewing_history<R: Rng + ?Sized>(
    rng: &mut R,
    now: NaiveDateTime,
    n: usize,
    num_users: usize,
    num_titles: usize,
) -> Result<Vec<ViewingRecord>> {
    check_id_range("num_users", num_users)?;
    check_id_range("num_titles", num_titles)?;

    Ok((0..n)
        .map(|_| {
            let viewing_id = random_uuid(rng);
            let user_id = random_user_id(rng, num_users);
            let title_id = random_title_id(rng, num_titles);
            let offset = Duration::days(rng.random_range(0..=365))
                + Duration::hours(rng.random_range(0..=23))
                + Duration::minutes(rng.random_range(0..=59));
            let watch_date = (now - offset).format("%Y-%m-%d %H:%M:%S").to_string();

            ViewingRecord {
                viewing_id,
                user_id,
                title_id,
                watch_date,
                watch_duration_minutes: rng.random_range(5..=180),
                completion_percentage: round2(rng.random_range(0.0..=100.0)),
                device_type: pick(rng, &DEVICES).to_string(),
            }
        })
        .collect())
}

/// Row counts and id ranges for a full sample dataset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleDataPlan {
    pub titles: usize,
    pub ratings: usize,
    pub viewing_records: usize,
    pub num_users: usize,
    pub num_titles: usize,
}

impl Default for SampleDataPlan {
    fn default() -> Self {
        Self {
            titles: 1000,
            ratings: 5000,
            viewing_records: 10000,
            num_users: 500,
            num_titles: 1000,
        }
    }
}

/// Generate all three tables and write them as CSV files into `output_dir`.
/// Returns the written paths in titles, ratings, viewing history order.
pub fn write_sample_data<R: Rng + ?Sized>(
    rng: &mut R,
    now: NaiveDateTime,
    plan: &SampleDataPlan,
    output_dir: &Path,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(output_dir)?;

    let titles = generate_titles(rng, now, plan.titles);
    let titles_path = output_dir.join(TITLES_FILE);
    write_csv_file(&titles_path, &titles)?;
    tracing::info!("Generated {} titles", titles.len());

    let ratings = generate_ratings(rng, now, plan.ratings, plan.num_users, plan.num_titles)?;
    let ratings_path = output_dir.join(RATINGS_FILE);
    write_csv_file(&ratings_path, &ratings)?;
    tracing::info!("Generated {} ratings", ratings.len());

    let viewing = generate_viewing_history(
        rng,
        now,
        plan.viewing_records,
        plan.num_users,
        plan.num_titles,
    )?;
    let viewing_path = output_dir.join(VIEWING_HISTORY_FILE);
    write_csv_file(&viewing_path, &viewing)?;
    tracing::info!("Generated {} viewing records", viewing.len());

    Ok(vec![titles_path, ratings_path, viewing_path])
}
