//! Parsing of the provider's HTML directory listing.

use crate::utils::constants::DWD_ARCHIVE_PREFIX;

/// A per-station historical archive advertised by the listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationArchive {
    pub station_id: String,
    pub file_name: String,
}

/// Extract `tageswerte_KL_{id}_{from}_{to}_hist.zip` links from a listing page
pub fn parse_archive_listing(html: &str) -> Vec<StationArchive> {
    let mut archives = Vec::new();

    for chunk in html.split("href=\"").skip(1) {
        let Some(end) = chunk.find('"') else {
            continue;
        };
        let link = &chunk[..end];
        let file_name = link.rsplit('/').next().unwrap_or(link);

        if let Some(station_id) = archive_station_id(file_name) {
            archives.push(StationArchive {
                station_id,
                file_name: file_name.to_string(),
            });
        }
    }

    archives.sort_by(|a, b| {
        (&a.station_id, &a.file_name).cmp(&(&b.station_id, &b.file_name))
    });
    archives.dedup();
    archives
}

/// Station id of an archive name, or `None` if the name is not a station archive
pub fn archive_station_id(file_name: &str) -> Option<String> {
    let rest = file_name
        .strip_prefix(DWD_ARCHIVE_PREFIX)?
        .strip_suffix(".zip")?;

    let station_id = rest.split('_').next()?;
    if station_id.is_empty() || !station_id.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    Some(station_id.to_string())
}
