use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A stored object as seen by clients. `bytes` is only present on reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredFile {
    pub id: Uuid,
    pub name: String,
    pub size: i64,
    pub bucket: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "base64_bytes::option"
    )]
    pub bytes: Option<Vec<u8>>,
}

/// Body of `POST /storage`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadFileRequest {
    #[serde(default)]
    pub name: String,
    /// Declared length; must match the decoded content when given
    #[serde(default)]
    pub size: Option<i64>,
    #[serde(default, with = "base64_bytes")]
    pub bytes: Vec<u8>,
}

/// `?bucketName=` on every storage route
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BucketQuery {
    #[serde(rename = "bucketName", default)]
    pub bucket_name: Option<String>,
}

impl BucketQuery {
    pub fn requested(&self) -> Option<&str> {
        self.bucket_name.as_deref().filter(|b| !b.is_empty())
    }
}

/// Logical bucket names: 1 to 63 characters of `a-z`, `0-9`, `-`, `_`, `.`,
/// starting with a letter or digit.
pub fn is_valid_bucket_name(name: &str) -> bool {
    let allowed = |c: char| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '-' | '_' | '.');
    (1..=63).contains(&name.len())
        && name
            .chars()
            .next()
            .map_or(false, |c| c.is_ascii_lowercase() || c.is_ascii_digit())
        && name.chars().all(allowed)
}

/// Standard base64 for raw file content in JSON bodies
pub mod base64_bytes {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded).map_err(serde::de::Error::custom)
    }

    pub mod option {
        use base64::{engine::general_purpose::STANDARD, Engine as _};
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            bytes: &Option<Vec<u8>>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match bytes {
                Some(b) => serializer.serialize_str(&STANDARD.encode(b)),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<Vec<u8>>, D::Error> {
            match Option::<String>::deserialize(deserializer)? {
                Some(encoded) => STANDARD
                    .decode(encoded)
                    .map(Some)
                    .map_err(serde::de::Error::custom),
                None => Ok(None),
            }
        }
    }
}
