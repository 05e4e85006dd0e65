// TMDB v3 response and request shapes
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Missing and explicit `null` both decode to the type's default.
/// TMDB sends `null` for dates, departments and descriptions it does not know.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Which half of TMDB an id belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Movie,
    Tv,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Movie => "movie",
            MediaType::Tv => "tv",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "movie" | "movies" => Ok(MediaType::Movie),
            "tv" | "show" | "shows" => Ok(MediaType::Tv),
            other => Err(format!("Unknown media type: {}", other)),
        }
    }
}

/// Generic write acknowledgement (rate, favorite, watchlist, delete session)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseStatus {
    #[serde(default, deserialize_with = "null_as_default")]
    pub status_code: i32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CertificationResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub certifications: HashMap<String, Vec<Certification>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Certification {
    pub certification: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub meaning: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub order: i32,
}

// ---- Authentication ----

/// Guest sessions can only rate, and TMDB wants their id under its own key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionKind {
    User,
    Guest,
}

impl SessionKind {
    pub fn query_key(&self) -> &'static str {
        match self {
            SessionKind::User => "session_id",
            SessionKind::Guest => "guest_session_id",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestTokenResponse {
    pub success: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub expires_at: String,
    pub request_token: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionResponse {
    pub success: bool,
    pub session_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuestSessionResponse {
    pub success: bool,
    pub guest_session_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub expires_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestToken {
    pub request_token: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionBody {
    pub session_id: String,
}

// ---- Account ----

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountDetails {
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    pub username: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub include_adult: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub iso_639_1: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub iso_3166_1: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub avatar: Avatar,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Avatar {
    #[serde(default, deserialize_with = "null_as_default")]
    pub gravatar: Gravatar,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Gravatar {
    #[serde(default, deserialize_with = "null_as_default")]
    pub hash: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavoriteRequest {
    pub media_type: MediaType,
    pub media_id: i64,
    pub favorite: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchlistRequest {
    pub media_type: MediaType,
    pub media_id: i64,
    pub watchlist: bool,
}

// ---- Movies and TV ----

/// Every TMDB list endpoint pages the same way
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paged<T> {
    #[serde(default, deserialize_with = "null_as_default")]
    pub page: u32,
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_pages: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_results: u32,
}

impl<T> Default for Paged<T> {
    fn default() -> Self {
        Self {
            page: 1,
            results: Vec::new(),
            total_pages: 0,
            total_results: 0,
        }
    }
}

pub type MovieList = Paged<Movie>;
pub type TvList = Paged<TvShow>;
pub type PeopleList = Paged<Person>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: i64,
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub overview: String,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub genre_ids: Vec<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub popularity: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub release_date: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub vote_average: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub vote_count: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub original_language: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub original_title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub adult: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub video: bool,
    /// Only present on the rated lists
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieDetail {
    pub id: i64,
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub overview: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub genres: Vec<Genre>,
    pub runtime: Option<u32>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub release_date: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub vote_average: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub vote_count: u32,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub tagline: Option<String>,
    pub homepage: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TvShow {
    pub id: i64,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub overview: String,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub genre_ids: Vec<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub popularity: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub first_air_date: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub vote_average: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub vote_count: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub original_language: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub original_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TvDetail {
    pub id: i64,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub overview: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub genres: Vec<Genre>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub number_of_seasons: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub number_of_episodes: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub first_air_date: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub vote_average: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub vote_count: u32,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Genre {
    pub id: i64,
    pub name: String,
}

/// Mixed result from discover, `known_for` and list items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieOrTv {
    pub id: i64,
    pub title: Option<String>,
    pub name: Option<String>,
    /// "movie", "tv" and occasionally "person"
    #[serde(default)]
    pub media_type: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub overview: String,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub genre_ids: Vec<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub popularity: f64,
    pub release_date: Option<String>,
    pub first_air_date: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub vote_average: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub vote_count: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub original_language: String,
}

impl MovieOrTv {
    /// Movies carry `title`, shows carry `name`
    pub fn display_title(&self) -> &str {
        self.title
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or("Untitled")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub id: i64,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub popularity: f64,
    pub profile_path: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub known_for_department: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub known_for: Vec<MovieOrTv>,
}

/// Rating value. TMDB accepts 0.5 to 10.0 in half steps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingRequest {
    pub value: f64,
}

impl RatingRequest {
    pub const MIN: f64 = 0.5;
    pub const MAX: f64 = 10.0;

    /// Validate a rating before it goes on the wire
    pub fn new(value: f64) -> Result<Self, String> {
        if !(Self::MIN..=Self::MAX).contains(&value) {
            return Err(format!(
                "Rating must be between {} and {}, got {}",
                Self::MIN,
                Self::MAX,
                value
            ));
        }
        if (value * 2.0).fract() != 0.0 {
            return Err(format!("Rating must be a multiple of 0.5, got {}", value));
        }
        Ok(Self { value })
    }
}

// ---- Lists ----

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListDetail {
    pub id: serde_json::Value,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub items: Vec<MovieOrTv>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub item_count: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub iso_639_1: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateListRequest {
    pub name: String,
    pub description: String,
    pub language: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListCreateResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub status_code: i32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status_message: String,
    pub list_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaItemRequest {
    pub media_id: i64,
}

// ---- Upload ----

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub message: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub file_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_type_wire_names() {
        assert_eq!(serde_json::to_string(&MediaType::Movie).unwrap(), r#""movie""#);
        assert_eq!(serde_json::to_string(&MediaType::Tv).unwrap(), r#""tv""#);
        assert_eq!("TV".parse::<MediaType>().unwrap(), MediaType::Tv);
        assert!("book".parse::<MediaType>().is_err());
    }

    #[test]
    fn test_favorite_request_body() {
        let body = FavoriteRequest {
            media_type: MediaType::Movie,
            media_id: 550,
            favorite: true,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"media_type": "movie", "media_id": 550, "favorite": true})
        );
    }

    #[test]
    fn test_movie_list_decodes_partial_results() {
        let json = r#"{
            "page": 1,
            "results": [{"id": 550, "title": "Fight Club", "poster_path": null, "backdrop_path": null}],
            "total_pages": 10,
            "total_results": 200
        }"#;
        let list: MovieList = serde_json::from_str(json).unwrap();
        assert_eq!(list.results.len(), 1);
        assert_eq!(list.results[0].title, "Fight Club");
        assert_eq!(list.results[0].vote_count, 0);
        assert_eq!(list.total_pages, 10);
    }

    #[test]
    fn test_explicit_nulls_decode_to_defaults() {
        let tv: TvShow = serde_json::from_str(
            r#"{"id": 1, "name": "Pilot Only", "overview": null, "poster_path": null, "backdrop_path": null, "first_air_date": null, "vote_average": null, "original_name": null}"#,
        )
        .unwrap();
        assert_eq!(tv.first_air_date, "");
        assert_eq!(tv.overview, "");
        assert_eq!(tv.vote_average, 0.0);

        let movie: Movie = serde_json::from_str(
            r#"{"id": 2, "title": "Untitled Project", "release_date": null, "poster_path": null, "backdrop_path": null, "genre_ids": null}"#,
        )
        .unwrap();
        assert_eq!(movie.release_date, "");
        assert!(movie.genre_ids.is_empty());

        let detail: TvDetail = serde_json::from_str(
            r#"{"id": 3, "name": "Limbo", "first_air_date": null, "number_of_seasons": null, "poster_path": null, "backdrop_path": null}"#,
        )
        .unwrap();
        assert_eq!(detail.first_air_date, "");
        assert_eq!(detail.number_of_seasons, 0);

        let person: Person = serde_json::from_str(
            r#"{"id": 4, "name": "Someone", "profile_path": null, "known_for_department": null}"#,
        )
        .unwrap();
        assert_eq!(person.known_for_department, "");

        let list: ListDetail = serde_json::from_str(
            r#"{"id": "8", "name": "Watch later", "description": null, "iso_639_1": null, "items": []}"#,
        )
        .unwrap();
        assert_eq!(list.description, "");

        let account: AccountDetails = serde_json::from_str(
            r#"{"id": 5, "name": null, "username": "cinephile", "iso_639_1": null, "iso_3166_1": null, "avatar": {"gravatar": {"hash": null}}}"#,
        )
        .unwrap();
        assert_eq!(account.name, "");
        assert_eq!(account.avatar.gravatar.hash, "");
    }

    #[test]
    fn test_session_response_with_null_id() {
        let resp: SessionResponse =
            serde_json::from_str(r#"{"success": false, "session_id": null}"#).unwrap();
        assert!(resp.session_id.is_none());
    }

    #[test]
    fn test_rating_validation() {
        assert!(RatingRequest::new(8.5).is_ok());
        assert!(RatingRequest::new(0.5).is_ok());
        assert!(RatingRequest::new(10.0).is_ok());
        assert!(RatingRequest::new(0.0).is_err());
        assert!(RatingRequest::new(10.5).is_err());
        assert!(RatingRequest::new(7.3).is_err());
    }

    #[test]
    fn test_display_title_prefers_title_then_name() {
        let mut item: MovieOrTv = serde_json::from_str(
            r#"{"id": 1, "title": null, "name": "Severance", "poster_path": null, "backdrop_path": null, "release_date": null, "first_air_date": "2022-02-18"}"#,
        )
        .unwrap();
        assert_eq!(item.display_title(), "Severance");
        item.name = None;
        assert_eq!(item.display_title(), "Untitled");
    }
}
