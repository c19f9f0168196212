//! AWS S3 storage backend

use async_trait::async_trait;
use aws_sdk_s3::{
    config::{Credentials, Region},
    error::{DisplayErrorContext, SdkError},
    primitives::ByteStream,
    Client,
};
use posort_common::{PosortError, Result};
use serde::{Deserialize, Serialize};
use std::env;
use tracing::{debug, info};

use crate::{compile_pattern, BlobStorage};

/// Connection settings for the S3 backend.
///
/// Constructed explicitly (from the environment or by hand) and passed into
/// [`S3BlobStorage::new`]; posort never mutates ambient process state to
/// configure storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub endpoint: Option<String>,
    pub region: String,
    pub access_key: String,
    pub secret_key: String,
    pub path_style: bool,
}

impl StorageConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            endpoint: env::var("S3_ENDPOINT").ok(),
            region: env::var("S3_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
            access_key: env::var("S3_ACCESS_KEY")
                .or_else(|_| env::var("AWS_ACCESS_KEY_ID"))
                .map_err(|_| {
                    PosortError::Config(
                        "S3_ACCESS_KEY or AWS_ACCESS_KEY_ID must be set".to_string(),
                    )
                })?,
            secret_key: env::var("S3_SECRET_KEY")
                .or_else(|_| env::var("AWS_SECRET_ACCESS_KEY"))
                .map_err(|_| {
                    PosortError::Config(
                        "S3_SECRET_KEY or AWS_SECRET_ACCESS_KEY must be set".to_string(),
                    )
                })?,
            path_style: env::var("S3_PATH_STYLE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
        })
    }

    /// Settings for a local minio endpoint, useful for development.
    pub fn for_minio(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: Some(endpoint.into()),
            region: "us-east-1".to_string(),
            access_key: "minioadmin".to_string(),
            secret_key: "minioadmin".to_string(),
            path_style: true,
        }
    }
}

/// S3 implementation of [`BlobStorage`].
#[derive(Clone)]
pub struct S3BlobStorage {
    client: Client,
}

impl S3BlobStorage {
    pub fn new(config: StorageConfig) -> Self {
        let credentials = Credentials::new(
            &config.access_key,
            &config.secret_key,
            None,
            None,
            "posort-storage",
        );

        let mut builder = aws_sdk_s3::Config::builder()
            .credentials_provider(credentials)
            .region(Region::new(config.region.clone()))
            .force_path_style(config.path_style);

        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint_url(endpoint);
        }

        let client = Client::from_conf(builder.build());

        info!(region = %config.region, endpoint = ?config.endpoint, "S3 storage client initialized");

        Self { client }
    }
}

#[async_trait]
impl BlobStorage for S3BlobStorage {
    async fn list(&self, container: &str, prefix: &str, pattern: &str) -> Result<Vec<String>> {
        debug!("Listing s3://{}/{} with pattern '{}'", container, prefix, pattern);

        let matcher = compile_pattern(pattern)?;

        let mut names = Vec::new();
        let mut pages = self
            .client
            .list_objects_v2()
            .bucket(container)
            .prefix(prefix)
            .into_paginator()
            .send();

        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| {
                PosortError::Storage(format!(
                    "failed to list s3://{container}/{prefix}: {}",
                    DisplayErrorContext(&e)
                ))
            })?;

            for object in page.contents() {
                if let Some(key) = object.key() {
                    if matcher.as_ref().is_none_or(|re| re.is_match(key)) {
                        names.push(key.to_string());
                    }
                }
            }
        }

        debug!("Listed {} objects in s3://{}/{}", names.len(), container, prefix);

        Ok(names)
    }

    async fn fetch(&self, container: &str, name: &str) -> Result<Option<Vec<u8>>> {
        debug!("Fetching s3://{}/{}", container, name);

        let response = match self
            .client
            .get_object()
            .bucket(container)
            .key(name)
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                let absent = err
                    .as_service_error()
                    .map(|e| e.is_no_such_key())
                    .unwrap_or(false);
                if absent {
                    return Ok(None);
                }
                return Err(PosortError::Storage(format!(
                    "failed to fetch s3://{container}/{name}: {}",
                    DisplayErrorContext(&err)
                )));
            },
        };

        let data = response
            .body
            .collect()
            .await
            .map_err(|e| {
                PosortError::Storage(format!(
                    "failed to read body of s3://{container}/{name}: {e}"
                ))
            })?
            .into_bytes()
            .to_vec();

        debug!("Fetched {} bytes from s3://{}/{}", data.len(), container, name);

        Ok(Some(data))
    }

    async fn store(
        &self,
        container: &str,
        name: &str,
        bytes: Vec<u8>,
        overwrite: bool,
    ) -> Result<()> {
        debug!("Storing {} bytes to s3://{}/{}", bytes.len(), container, name);

        let mut request = self
            .client
            .put_object()
            .bucket(container)
            .key(name)
            .body(ByteStream::from(bytes));

        if !overwrite {
            // Conditional write: S3 rejects the put with 412 when the key
            // already exists, which we treat as "already placed".
            request = request.if_none_match("*");
        }

        match request.send().await {
            Ok(_) => Ok(()),
            Err(err) => {
                if !overwrite && is_precondition_failed(&err) {
                    debug!("s3://{}/{} already exists, skipping", container, name);
                    return Ok(());
                }
                Err(PosortError::Storage(format!(
                    "failed to store s3://{container}/{name}: {}",
                    DisplayErrorContext(&err)
                )))
            },
        }
    }
}

fn is_precondition_failed<E>(err: &SdkError<E>) -> bool {
    match err {
        SdkError::ServiceError(service_err) => service_err.raw().status().as_u16() == 412,
        _ => false,
    }
}
