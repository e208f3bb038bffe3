//! Object storage for uploaded documents (resumes, cover letters).

use anyhow::Result;
use async_trait::async_trait;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use tracing::info;

use crate::config::Config;

#[async_trait]
pub trait DocumentStorage: Send + Sync {
    /// Stores `bytes` under `key` and returns the object's URL.
    async fn put(&self, key: &str, bytes: Bytes, content_type: &str) -> Result<String>;
}

pub struct S3DocumentStorage {
    client: aws_sdk_s3::Client,
    bucket: String,
    endpoint: String,
}

impl S3DocumentStorage {
    /// Builds a client configured for MinIO (local) or AWS (production).
    pub async fn from_config(config: &Config) -> Self {
        let credentials = Credentials::new(
            &config.aws_access_key_id,
            &config.aws_secret_access_key,
            None,
            None,
            "hirewise-static",
        );

        let s3_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new("us-east-1"))
            .credentials_provider(credentials)
            .endpoint_url(&config.s3_endpoint)
            .load()
            .await;

        Self {
            client: aws_sdk_s3::Client::new(&s3_config),
            bucket: config.s3_bucket.clone(),
            endpoint: config.s3_endpoint.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl DocumentStorage for S3DocumentStorage {
    async fn put(&self, key: &str, bytes: Bytes, content_type: &str) -> Result<String> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(bytes))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("S3 upload failed: {e}"))?;

        info!("Uploaded document to s3://{}/{}", self.bucket, key);
        Ok(object_url(&self.endpoint, &self.bucket, key))
    }
}

/// Path-style URL, which works for both MinIO and S3.
pub fn object_url(endpoint: &str, bucket: &str, key: &str) -> String {
    format!("{endpoint}/{bucket}/{key}")
}

/// File extension for an uploaded resume, from its content type.
pub fn extension_for(content_type: &str) -> &'static str {
    match content_type {
        "application/pdf" => "pdf",
        "text/plain" => "txt",
        _ => "bin",
    }
}

#[cfg(test)]
pub mod testing {
    use std::sync::Mutex;

    use super::*;

    /// Keeps uploads in memory.
    #[derive(Default)]
    pub struct MemoryStorage {
        pub objects: Mutex<Vec<(String, Bytes, String)>>,
    }

    #[async_trait]
    impl DocumentStorage for MemoryStorage {
        async fn put(&self, key: &str, bytes: Bytes, content_type: &str) -> Result<String> {
            self.objects
                .lock()
                .unwrap()
                .push((key.to_string(), bytes, content_type.to_string()));
            Ok(object_url("http://storage.test", "resumes", key))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_url_is_path_style() {
        assert_eq!(
            object_url("http://localhost:9000", "resumes", "resumes/a/b.pdf"),
            "http://localhost:9000/resumes/resumes/a/b.pdf"
        );
    }

    #[test]
    fn test_extension_for_known_types() {
        assert_eq!(extension_for("application/pdf"), "pdf");
        assert_eq!(extension_for("text/plain"), "txt");
        assert_eq!(extension_for("image/png"), "bin");
    }
}
