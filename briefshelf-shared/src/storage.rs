/// Supabase Storage client
///
/// Thin wrapper over the Storage REST API, authenticated with the
/// service role key. Uploads land in a single public bucket and the
/// returned URL is served directly by Supabase, so downloads never pass
/// through this service.
///
/// Storage API reference:
/// https://supabase.com/docs/reference/api/storage

use uuid::Uuid;

/// Storage connection settings, loaded from the environment
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Supabase project URL, e.g. `https://abc.supabase.co`
    pub project_url: String,

    /// Service role key; never a client-side anon key
    pub service_key: String,

    /// Target bucket name
    pub bucket: String,
}

/// Error type for storage operations
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Request failed before a response arrived
    #[error("Storage request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Storage service returned a non-success status
    #[error("Storage service returned {status}: {body}")]
    Service { status: u16, body: String },
}

/// Client for a single Supabase Storage bucket
#[derive(Debug, Clone)]
pub struct StorageClient {
    http: reqwest::Client,
    project_url: String,
    service_key: String,
    bucket: String,
}

impl StorageClient {
    pub fn new(config: StorageConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            project_url: config.project_url.trim_end_matches('/').to_string(),
            service_key: config.service_key,
            bucket: config.bucket,
        }
    }

    /// Builds a collision-free object path for an upload
    ///
    /// Keeps the original extension (lowercased) and replaces the stem
    /// with a UUID, e.g. `uploads/3f2b....png`.
    pub fn object_path(folder: &str, original_filename: &str) -> String {
        let extension = original_filename
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .filter(|ext| !ext.is_empty() && ext.len() <= 10);

        let folder = folder.trim_matches('/');
        let stem = Uuid::new_v4();

        match extension {
            Some(ext) => format!("{}/{}.{}", folder, stem, ext),
            None => format!("{}/{}", folder, stem),
        }
    }

    /// Public download URL for an object in this bucket
    pub fn public_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.project_url, self.bucket, path
        )
    }

    /// Uploads an object and returns its public URL
    pub async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StorageError> {
        let url = format!(
            "{}/storage/v1/object/{}/{}",
            self.project_url, self.bucket, path
        );

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.service_key)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::Service { status, body });
        }

        Ok(self.public_url(path))
    }

    /// Deletes an object. A missing object is treated as success.
    pub async fn delete(&self, path: &str) -> Result<(), StorageError> {
        let url = format!(
            "{}/storage/v1/object/{}/{}",
            self.project_url, self.bucket, path
        );

        let response = self
            .http
            .delete(&url)
            .bearer_auth(&self.service_key)
            .send()
            .await?;

        if !response.status().is_success() && response.status().as_u16() != 404 {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::Service { status, body });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_path_keeps_extension() {
        let path = StorageClient::object_path("covers", "My Book Cover.PNG");
        assert!(path.starts_with("covers/"));
        assert!(path.ends_with(".png"));
    }

    #[test]
    fn test_object_path_without_extension() {
        let path = StorageClient::object_path("uploads", "README");
        assert!(path.starts_with("uploads/"));
        assert!(!path.contains('.'));
    }

    #[test]
    fn test_object_path_rejects_oversized_extension() {
        // Dotted names with a long tail are treated as extension-less
        let path = StorageClient::object_path("uploads", "archive.tar.gz.backup-of-backup");
        assert!(!path.ends_with("backup-of-backup"));
    }

    #[test]
    fn test_public_url_shape() {
        let client = StorageClient::new(StorageConfig {
            project_url: "https://abc.supabase.co/".to_string(),
            service_key: "service-key".to_string(),
            bucket: "content".to_string(),
        });

        assert_eq!(
            client.public_url("covers/x.png"),
            "https://abc.supabase.co/storage/v1/object/public/content/covers/x.png"
        );
    }

    // Export SUPABASE_PROJECT_URL, SUPABASE_SERVICE_KEY, and
    // SUPABASE_BUCKET, then run with -- --ignored to exercise the live
    // service.
    #[tokio::test]
    #[ignore = "hits real Supabase Storage and needs credentials"]
    async fn upload_and_delete_roundtrip() {
        dotenvy::dotenv().ok();

        let client = StorageClient::new(StorageConfig {
            project_url: std::env::var("SUPABASE_PROJECT_URL")
                .expect("SUPABASE_PROJECT_URL is required"),
            service_key: std::env::var("SUPABASE_SERVICE_KEY")
                .expect("SUPABASE_SERVICE_KEY is required"),
            bucket: std::env::var("SUPABASE_BUCKET").unwrap_or_else(|_| "content".into()),
        });

        let path = StorageClient::object_path("test", "probe.txt");
        let url = client
            .upload(&path, b"probe".to_vec(), "text/plain")
            .await
            .expect("upload should succeed");
        assert!(url.contains(&path));

        client.delete(&path).await.expect("delete should succeed");
    }
}
