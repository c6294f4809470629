use std::future::Future;
use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::Error;

/// Default public directory of Bakaláři instances.
pub const DEFAULT_DIRECTORY_URL: &str = "https://sluzby.bakalari.cz";

const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// City entry from the municipality listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct City {
    pub name: String,
    /// `None` when the listing omits the count.
    #[serde(default)]
    pub school_count: Option<u32>,
}

impl City {
    #[must_use]
    pub fn new(name: impl Into<String>, school_count: u32) -> Self {
        Self {
            name: name.into(),
            school_count: Some(school_count),
        }
    }
}

/// Schools registered in one city.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[non_exhaustive]
pub struct CityDetails {
    pub name: String,
    #[serde(default)]
    pub schools: Vec<School>,
}

impl CityDetails {
    #[must_use]
    pub fn new(name: impl Into<String>, schools: Vec<School>) -> Self {
        Self {
            name: name.into(),
            schools,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct School {
    pub id: String,
    pub name: String,
    pub school_url: String,
}

impl School {
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        school_url: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            school_url: school_url.into(),
        }
    }
}

/// Reply of a school's `/api/3` info endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
#[non_exhaustive]
pub struct SchoolInfo {
    pub api_version: String,
    pub application_version: String,
    #[serde(default)]
    pub base_url: String,
}

impl SchoolInfo {
    #[must_use]
    pub fn new(api_version: impl Into<String>, application_version: impl Into<String>) -> Self {
        Self {
            api_version: api_version.into(),
            application_version: application_version.into(),
            base_url: "api/3".into(),
        }
    }
}

/// Source of the city → school → version hierarchy sampled by the version cache.
///
/// `school_url` is passed exactly as it appears in [`School::school_url`] with
/// trailing slashes removed.
pub trait Directory: Send + Sync + 'static {
    /// List every city together with its school count.
    fn cities(&self) -> impl Future<Output = Result<Vec<City>, Error>> + Send;

    /// List the schools of a single city.
    fn city(&self, name: &str) -> impl Future<Output = Result<CityDetails, Error>> + Send;

    /// Ask a school instance which versions it runs.
    fn school_info(
        &self,
        school_url: &str,
    ) -> impl Future<Output = Result<SchoolInfo, Error>> + Send;
}

/// [`Directory`] backed by the real municipality service over HTTP.
#[derive(Debug, Clone)]
pub struct HttpDirectory {
    base_url: Url,
    http: reqwest::Client,
}

impl HttpDirectory {
    /// Create a directory client for the given base URL.
    ///
    /// Every request is bounded by a 10 second timeout.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] if the HTTP client cannot be built.
    pub fn try_new(base_url: Url) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { base_url, http })
    }

    /// Like [`try_new`](Self::try_new), falling back to a default client
    /// without the request timeout if the configured one cannot be built.
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        match Self::try_new(base_url.clone()) {
            Ok(directory) => directory,
            Err(e) => {
                tracing::warn!(error = %e, "Building HTTP client failed, requests have no timeout");
                Self {
                    base_url,
                    http: reqwest::Client::new(),
                }
            }
        }
    }

    /// Use a custom HTTP client (for connection pool reuse or testing).
    #[must_use]
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http = client;
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn municipality_url(&self, city: Option<&str>) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| Error::Config(format!("{} cannot be a base URL", self.base_url)))?;
            segments.pop_if_empty().extend(["api", "v1", "municipality"]);
            if let Some(city) = city {
                segments.push(city);
            }
        }
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        operation: &'static str,
    ) -> Result<T, Error> {
        let response = self
            .http
            .get(url)
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
            .header(ACCEPT, JSON_CONTENT_TYPE)
            .send()
            .await?;

        let response = Self::ensure_success(response, operation).await?;
        response.json::<T>().await.map_err(Into::into)
    }

    /// Checks HTTP response status; returns the response on success or an error with details.
    async fn ensure_success(
        response: reqwest::Response,
        operation: &'static str,
    ) -> Result<reqwest::Response, Error> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let detail = response.text().await.unwrap_or_default();
        Err(Error::Upstream {
            operation,
            status,
            detail,
        })
    }
}

impl Default for HttpDirectory {
    fn default() -> Self {
        Self::new(DEFAULT_DIRECTORY_URL.parse().expect("valid default URL"))
    }
}

impl Directory for HttpDirectory {
    async fn cities(&self) -> Result<Vec<City>, Error> {
        let url = self.municipality_url(None)?;
        self.get_json(url, "municipality listing").await
    }

    async fn city(&self, name: &str) -> Result<CityDetails, Error> {
        let url = self.municipality_url(Some(name))?;
        self.get_json(url, "city listing").await
    }

    async fn school_info(&self, school_url: &str) -> Result<SchoolInfo, Error> {
        let url = Url::parse(&format!("{}/api/3", school_url.trim_end_matches('/')))?;
        self.get_json(url, "school info").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> HttpDirectory {
        HttpDirectory::new("https://directory.example.com".parse().unwrap())
    }

    #[test]
    fn test_try_new_builds_timeout_client() {
        let directory = HttpDirectory::try_new("https://directory.example.com".parse().unwrap())
            .unwrap();
        assert_eq!(directory.base_url().as_str(), "https://directory.example.com/");
    }

    #[test]
    fn test_municipality_url() {
        let url = directory().municipality_url(None).unwrap();
        assert_eq!(url.as_str(), "https://directory.example.com/api/v1/municipality");
    }

    #[test]
    fn test_city_url_is_percent_encoded() {
        let url = directory().municipality_url(Some("Nové Město/Morava")).unwrap();
        assert_eq!(
            url.as_str(),
            "https://directory.example.com/api/v1/municipality/Nov%C3%A9%20M%C4%9Bsto%2FMorava"
        );
    }

    #[test]
    fn test_base_url_with_trailing_slash() {
        let directory = HttpDirectory::new("https://directory.example.com/".parse().unwrap());
        let url = directory.municipality_url(Some("Brno")).unwrap();
        assert_eq!(
            url.as_str(),
            "https://directory.example.com/api/v1/municipality/Brno"
        );
    }

    #[test]
    fn test_default_base_url() {
        assert_eq!(
            HttpDirectory::default().base_url().as_str(),
            "https://sluzby.bakalari.cz/"
        );
    }

    #[test]
    fn test_decode_wire_shapes() {
        let cities: Vec<City> =
            serde_json::from_str(r#"[{"name":"Brno","schoolCount":3},{"name":"Aš"}]"#).unwrap();
        assert_eq!(cities[0], City::new("Brno", 3));
        assert_eq!(cities[1].name, "Aš");
        assert_eq!(cities[1].school_count, None);

        let details: CityDetails = serde_json::from_str(
            r#"{"name":"Brno","schools":[{"id":"X","name":"ZŠ","schoolUrl":"https://zs.example/bakaweb/"}]}"#,
        )
        .unwrap();
        assert_eq!(details.schools[0].school_url, "https://zs.example/bakaweb/");

        let info: SchoolInfo = serde_json::from_str(
            r#"{"ApiVersion":"3.23.0","ApplicationVersion":"1.52.1102.1","BaseUrl":"api/3"}"#,
        )
        .unwrap();
        assert_eq!(info, SchoolInfo::new("3.23.0", "1.52.1102.1"));
    }
}
