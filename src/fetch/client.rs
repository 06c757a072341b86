use crate::error::Result;
use crate::fetch::listing::{parse_archive_listing, StationArchive};
use crate::models::StationMetadata;
use crate::readers::StationReader;
use crate::utils::constants::DWD_STATIONS_FILE;
use reqwest::Client;
use tracing::debug;

/// HTTP access to one directory of the DWD open-data server
pub struct DwdClient {
    client: Client,
    base_url: String,
}

impl DwdClient {
    pub fn new(base_url: &str, user_agent: &str) -> Result<Self> {
        let client = Client::builder().user_agent(user_agent).build()?;
        Ok(Self {
            client,
            base_url: normalize_base_url(base_url),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url_for(&self, file_name: &str) -> String {
        format!("{}{}", self.base_url, file_name)
    }

    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        debug!("GET {}", url);
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.bytes().await?.to_vec())
    }

    async fn get_text(&self, url: &str) -> Result<String> {
        debug!("GET {}", url);
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.text().await?)
    }

    /// Download and parse the station description file
    pub async fn fetch_stations(&self) -> Result<Vec<StationMetadata>> {
        let bytes = self.get_bytes(&self.url_for(DWD_STATIONS_FILE)).await?;
        StationReader::new().parse_bytes(&bytes)
    }

    /// Download the directory listing and extract the per-station archives
    pub async fn fetch_archive_index(&self) -> Result<Vec<StationArchive>> {
        let html = self.get_text(&self.base_url).await?;
        Ok(parse_archive_listing(&html))
    }

    pub async fn fetch_archive(&self, archive: &StationArchive) -> Result<Vec<u8>> {
        self.get_bytes(&self.url_for(&archive.file_name)).await
    }
}

fn normalize_base_url(base_url: &str) -> String {
    if base_url.ends_with('/') {
        base_url.to_string()
    } else {
        format!("{}/", base_url)
    }
}
