// Printing: pretty JSON with --json, a short summary otherwise
use marquee_api::media::{
    AccountDetails, CertificationResponse, ListDetail, Movie, MovieDetail, Paged, Person,
    ResponseStatus, TvDetail, TvShow,
};
use marquee_api::{Article, UploadResponse, User, UserProfile};
use marquee_core::dates::format_published;
use serde::Serialize;

/// One or two lines a person would want to read
pub trait Summary {
    fn summary(&self) -> String;
}

pub fn emit<T: Serialize + Summary>(json: bool, value: &T) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{}", value.summary());
    }
    Ok(())
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

fn year(date: &str) -> &str {
    date.get(..4).unwrap_or("?")
}

impl<T: Summary> Summary for Vec<T> {
    fn summary(&self) -> String {
        if self.is_empty() {
            return "No results".to_string();
        }
        self.iter()
            .map(Summary::summary)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl<T: Summary> Summary for Paged<T> {
    fn summary(&self) -> String {
        format!(
            "{}\n\nPage {} of {} ({} results)",
            self.results.summary(),
            self.page,
            self.total_pages,
            self.total_results
        )
    }
}

impl Summary for Article {
    fn summary(&self) -> String {
        format!(
            "{}\n  {} | {}\n  {}",
            self.title,
            self.source.name,
            format_published(self.published_at.as_deref()),
            self.url
        )
    }
}

impl Summary for Movie {
    fn summary(&self) -> String {
        format!(
            "[{:>7}] {} ({})  ★ {:.1}",
            self.id,
            self.title,
            year(&self.release_date),
            self.vote_average
        )
    }
}

impl Summary for TvShow {
    fn summary(&self) -> String {
        format!(
            "[{:>7}] {} ({})  ★ {:.1}",
            self.id,
            self.name,
            year(&self.first_air_date),
            self.vote_average
        )
    }
}

impl Summary for Person {
    fn summary(&self) -> String {
        let known_for: Vec<&str> = self
            .known_for
            .iter()
            .filter_map(|m| m.title.as_deref().or(m.name.as_deref()))
            .collect();
        format!(
            "[{:>7}] {} ({})  {}",
            self.id,
            self.name,
            self.known_for_department,
            known_for.join(", ")
        )
    }
}

impl Summary for MovieDetail {
    fn summary(&self) -> String {
        let genres: Vec<&str> = self.genres.iter().map(|g| g.name.as_str()).collect();
        let mut out = format!("{} ({})", self.title, year(&self.release_date));
        if let Some(tagline) = self.tagline.as_ref().filter(|t| !t.is_empty()) {
            out.push_str(&format!("\n{}", tagline));
        }
        if let Some(runtime) = self.runtime {
            out.push_str(&format!("\nRuntime: {} min", runtime));
        }
        out.push_str(&format!(
            "\nGenres: {}\nRating: {:.1} ({} votes)\n\n{}",
            genres.join(", "),
            self.vote_average,
            self.vote_count,
            self.overview
        ));
        out
    }
}

impl Summary for TvDetail {
    fn summary(&self) -> String {
        let genres: Vec<&str> = self.genres.iter().map(|g| g.name.as_str()).collect();
        format!(
            "{} ({})\nSeasons: {} ({} episodes)\nGenres: {}\nRating: {:.1} ({} votes)\n\n{}",
            self.name,
            year(&self.first_air_date),
            self.number_of_seasons,
            self.number_of_episodes,
            genres.join(", "),
            self.vote_average,
            self.vote_count,
            self.overview
        )
    }
}

impl Summary for ResponseStatus {
    fn summary(&self) -> String {
        format!("{} (code {})", self.status_message, self.status_code)
    }
}

impl Summary for AccountDetails {
    fn summary(&self) -> String {
        format!(
            "{} (id {})\nName: {}\nLanguage: {}-{}",
            self.username, self.id, self.name, self.iso_639_1, self.iso_3166_1
        )
    }
}

impl Summary for CertificationResponse {
    fn summary(&self) -> String {
        let mut countries: Vec<_> = self.certifications.iter().collect();
        countries.sort_by(|a, b| a.0.cmp(b.0));
        countries
            .into_iter()
            .map(|(country, certs)| {
                let mut certs: Vec<_> = certs.iter().collect();
                certs.sort_by_key(|c| c.order);
                let names: Vec<&str> = certs.iter().map(|c| c.certification.as_str()).collect();
                format!("{}: {}", country, names.join(", "))
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Summary for ListDetail {
    fn summary(&self) -> String {
        let items: Vec<String> = self
            .items
            .iter()
            .map(|m| {
                format!(
                    "  [{:>7}] {}",
                    m.id,
                    m.title.as_deref().or(m.name.as_deref()).unwrap_or("?")
                )
            })
            .collect();
        format!(
            "{} ({} items)\n{}\n{}",
            self.name,
            self.item_count,
            truncate(&self.description, 120),
            items.join("\n")
        )
    }
}

impl Summary for marquee_api::media::ListCreateResponse {
    fn summary(&self) -> String {
        format!("Created list {}: {}", self.list_id, self.status_message)
    }
}

impl Summary for UploadResponse {
    fn summary(&self) -> String {
        format!("{}\n{}", self.message, self.file_url)
    }
}

impl Summary for User {
    fn summary(&self) -> String {
        let mut out = format!("[{}] {} <{}>", self.id, self.name, self.email);
        if let Some(job) = &self.job {
            out.push_str(&format!(", {}", job));
        }
        if let Some(city) = &self.city {
            out.push_str(&format!(", {}", city));
        }
        out
    }
}

impl Summary for UserProfile {
    fn summary(&self) -> String {
        let mut out = format!("[{}] {} <{}>", self.id, self.name, self.email);
        if let Some(bio) = &self.bio {
            out.push_str(&format!("\n{}", truncate(bio, 200)));
        }
        if let (Some(followers), Some(following)) = (self.followers_count, self.following_count) {
            out.push_str(&format!("\n{} followers, {} following", followers, following));
        }
        out
    }
}

/// Plain acknowledgement for calls that return nothing
#[derive(Serialize)]
pub struct Done {
    pub message: String,
}

impl Summary for Done {
    fn summary(&self) -> String {
        self.message.clone()
    }
}
