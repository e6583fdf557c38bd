use anyhow::{bail, Context, Result};
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use std::collections::BTreeMap;

use crate::azure::WebApps;

const ZIP_DEPLOY: &str = "ZipDeploy";

/// Attributes of one `<publishProfile>` element, keyed by bare attribute name
pub type ProfileRecord = BTreeMap<String, String>;

/// Endpoint and Basic-auth credentials for pushing artifacts to an app
#[derive(Clone, PartialEq, Eq)]
pub struct PublishProfile {
    pub publish_url: String,
    pub user_name: String,
    pub user_pwd: String,
    pub publish_method: String,
    /// Every attribute of the record, including the ones above
    pub attributes: ProfileRecord,
}

impl PublishProfile {
    fn from_record(record: ProfileRecord) -> Result<Self> {
        let get = |key: &str| {
            record.get(key).cloned().with_context(|| {
                format!(
                    "{} publish profile is missing attribute '{}'",
                    record
                        .get("publishMethod")
                        .map(String::as_str)
                        .unwrap_or("unknown"),
                    key
                )
            })
        };

        Ok(Self {
            publish_url: get("publishUrl")?,
            user_name: get("userName")?,
            user_pwd: get("userPWD")?,
            publish_method: get("publishMethod")?,
            attributes: record,
        })
    }
}

impl std::fmt::Debug for PublishProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PublishProfile")
            .field("publish_url", &self.publish_url)
            .field("user_name", &self.user_name)
            .field("publish_method", &self.publish_method)
            .finish_non_exhaustive()
    }
}

/// Parse a `<publishData>` document into one record per `<publishProfile>`.
///
/// A document with a single profile and one with many both yield a list.
pub fn parse_publish_profiles(xml: &str) -> Result<Vec<ProfileRecord>> {
    let xml = xml.trim_start_matches('\u{feff}');
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut in_publish_data = false;
    let mut records = Vec::new();

    loop {
        let event = reader.read_event().with_context(|| {
            format!(
                "Invalid publish profile XML at byte {}",
                reader.buffer_position()
            )
        })?;

        match event {
            Event::Start(e) if e.name().as_ref() == b"publishData" => in_publish_data = true,
            Event::End(e) if e.name().as_ref() == b"publishData" => in_publish_data = false,
            Event::Start(e) | Event::Empty(e)
                if in_publish_data && e.name().as_ref() == b"publishProfile" =>
            {
                let mut record = ProfileRecord::new();
                for attr in e.attributes() {
                    let attr = attr.context("Invalid attribute in publishProfile")?;
                    let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
                    let value = attr
                        .unescape_value()
                        .with_context(|| format!("Invalid value for attribute '{}'", key))?
                        .into_owned();
                    record.insert(key, value);
                }
                records.push(record);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if records.is_empty() && !xml.contains("publishData") {
        bail!("Document is not a publish profile: missing <publishData> root");
    }

    Ok(records)
}

/// Pick the first ZipDeploy record, if any
pub fn select_zip_deploy(records: Vec<ProfileRecord>) -> Result<Option<PublishProfile>> {
    records
        .into_iter()
        .find(|r| r.get("publishMethod").map(String::as_str) == Some(ZIP_DEPLOY))
        .map(PublishProfile::from_record)
        .transpose()
}

/// Download and parse a Function App's publish profiles, returning the ZipDeploy one.
///
/// `Ok(None)` means the app exposes no ZipDeploy profile; the caller decides how fatal that is.
pub async fn resolve_publish_profile(
    web: &dyn WebApps,
    resource_group: &str,
    function_app: &str,
) -> Result<Option<PublishProfile>> {
    let chunks = web
        .publishing_profile_xml(resource_group, function_app)
        .await
        .with_context(|| format!("Failed to fetch publish profile for '{}'", function_app))?;

    let mut raw = Vec::with_capacity(chunks.iter().map(|c| c.len()).sum());
    for chunk in &chunks {
        raw.extend_from_slice(chunk);
    }
    let xml = String::from_utf8(raw).context("Publish profile is not valid UTF-8")?;

    let records = parse_publish_profiles(&xml)?;
    tracing::debug!(profiles = records.len(), "parsed publish profiles");
    select_zip_deploy(records)
}
