use serde::{Deserialize, Deserializer};

use super::extract::refid_from_url;

/// Body of the listing index once the callback envelope is removed.
#[derive(Debug, Deserialize)]
pub struct IndexResponse {
    pub data: IndexData,
}

#[derive(Debug, Deserialize)]
pub struct IndexData {
    #[serde(rename = "objektlista@lagenheter")]
    pub listings: Vec<IndexEntry>,
}

/// One listing as it appears in the index.
///
/// The portal is not consistent about sending numbers as strings, so every
/// field is read as text and parsed later.
#[derive(Debug, Clone, Deserialize)]
pub struct IndexEntry {
    #[serde(rename = "adress", deserialize_with = "text")]
    pub address: String,
    #[serde(rename = "detaljUrl", deserialize_with = "text")]
    pub detail_url: String,
    #[serde(rename = "typ", deserialize_with = "text")]
    pub kind: String,
    #[serde(rename = "omrade", deserialize_with = "text")]
    pub area: String,
    #[serde(rename = "hyra", deserialize_with = "text")]
    pub rent: String,
    #[serde(rename = "hiss", deserialize_with = "text")]
    pub elevator: String,
    #[serde(rename = "yta", deserialize_with = "text")]
    pub size: String,
    #[serde(rename = "vaning", deserialize_with = "text")]
    pub floor: String,
}

impl IndexEntry {
    pub fn refid(&self) -> &str {
        refid_from_url(&self.detail_url)
    }
}

/// Body of the detail endpoint once the envelope is removed.
#[derive(Debug, Deserialize)]
pub struct DetailResponse {
    pub html: DetailHtml,
}

#[derive(Debug, Deserialize)]
pub struct DetailHtml {
    /// Applicant count followed by the top queue points.
    #[serde(rename = "objektintressestatus")]
    pub queue_status: String,
    /// Contains the application deadline, unless the listing is direct allocation.
    #[serde(rename = "objektintresse")]
    pub deadline_text: String,
}

fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn entry_accepts_numbers_and_strings() {
        let entry: IndexEntry = serde_json::from_value(json!({
            "adress": "Storgatan 4.3",
            "detaljUrl": "https://portal.test/objekt/1",
            "typ": "Lägenhet",
            "omrade": "Ryd",
            "hyra": "7 250",
            "hiss": true,
            "yta": 25.5,
            "vaning": 3,
            "extra": "ignored"
        }))
        .unwrap();

        assert_eq!(entry.rent, "7 250");
        assert_eq!(entry.elevator, "true");
        assert_eq!(entry.size, "25.5");
        assert_eq!(entry.floor, "3");
    }

    #[test]
    fn missing_listing_field_is_rejected() {
        let result = serde_json::from_value::<IndexEntry>(json!({ "adress": "Storgatan 1" }));
        assert!(result.is_err());
    }
}
