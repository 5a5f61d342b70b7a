use anyhow::{Result, anyhow};
use reqwest::{
    Client,
    header::{HeaderMap, HeaderValue, CONTENT_TYPE, AUTHORIZATION},
    Method,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error};

use shared_config::{AppConfig, MAX_PAGE_SIZE};

/// Thin REST client for the hosted table API (PostgREST dialect).
pub struct SupabaseClient {
    client: Client,
    base_url: String,
    anon_key: String,
    service_key: Option<String>,
}

impl SupabaseClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.supabase_url.trim_end_matches('/').to_string(),
            anon_key: config.supabase_anon_key.clone(),
            service_key: config.supabase_service_key.clone(),
        }
    }

    fn get_headers(&self, auth_token: Option<&str>) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();

        headers.insert("apikey", HeaderValue::from_str(&self.anon_key)?);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        // Explicit token first, then the service key; anon access otherwise.
        if let Some(token) = auth_token.or(self.service_key.as_deref()) {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {}", token))?,
            );
        }

        Ok(headers)
    }

    pub async fn request<T>(&self, method: Method, path: &str,
                            auth_token: Option<&str>, body: Option<Value>)
                            -> Result<T>
    where T: DeserializeOwned {
        self.request_with_headers(method, path, auth_token, body, None).await
    }

    pub async fn request_with_headers<T>(&self, method: Method, path: &str,
                                         auth_token: Option<&str>, body: Option<Value>,
                                         extra_headers: Option<HeaderMap>)
                                         -> Result<T>
    where T: DeserializeOwned {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making {} request to {}", method, url);

        let mut headers = self.get_headers(auth_token)?;
        if let Some(extra) = extra_headers {
            headers.extend(extra);
        }

        let mut req = self.client.request(method, &url)
            .headers(headers);

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            error!("API error ({}): {}", status, error_text);

            return Err(match status.as_u16() {
                401 | 403 => anyhow!("Authentication error: {}", error_text),
                404 => anyhow!("Resource not found: {}", error_text),
                _ => anyhow!("API error ({}): {}", status, error_text),
            });
        }

        let data = response.json::<T>().await?;
        Ok(data)
    }

    /// GET every row a filtered query matches, following `limit`/`offset`
    /// pages until a short page comes back. `order` must be a total order
    /// (e.g. `id.asc`) or pages may overlap.
    pub async fn fetch_all<T>(&self, table: &str, filters: &[(&str, String)],
                              order: &str, page_size: usize) -> Result<Vec<T>>
    where T: DeserializeOwned {
        let page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        let mut rows = Vec::new();
        let mut offset = 0usize;

        loop {
            let mut query = vec![("select".to_string(), "*".to_string())];
            query.extend(filters.iter().map(|(k, v)| (k.to_string(), v.clone())));
            query.push(("order".to_string(), order.to_string()));
            query.push(("limit".to_string(), page_size.to_string()));
            query.push(("offset".to_string(), offset.to_string()));

            let query_string = query
                .iter()
                .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
                .collect::<Vec<_>>()
                .join("&");
            let path = format!("/rest/v1/{}?{}", table, query_string);

            let page: Vec<T> = self.request(Method::GET, &path, None, None).await?;
            let fetched = page.len();
            rows.extend(page);

            if fetched < page_size {
                break;
            }
            offset += fetched;
        }

        debug!("Fetched {} rows from {}", rows.len(), table);
        Ok(rows)
    }
}
