/// 静态资源客户端
///
/// 负责从远程地址拉取打包的 JSON 数据
use crate::error::{AppError, Result, SourceError};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// 静态资源客户端
pub struct CatalogClient {
    base_url: String,
    http: reqwest::Client,
}

impl CatalogClient {
    /// 创建新的客户端
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs.max(1)))
            .build()
            .map_err(|source| SourceError::RequestFailed {
                url: base_url.clone(),
                source,
            })?;

        Ok(Self { base_url, http })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// 拼接资源地址
    pub fn url_for(&self, file_name: &str) -> String {
        format!("{}/{}", self.base_url, file_name.trim_start_matches('/'))
    }

    /// 拉取并解析 JSON 资源
    ///
    /// # 返回
    /// 资源不存在（404）时返回 `Ok(None)`
    pub async fn fetch_json<T: DeserializeOwned>(&self, file_name: &str) -> Result<Option<T>> {
        let url = self.url_for(file_name);
        debug!("拉取静态资源: {}", url);

        let response = self
            .http
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|source| SourceError::RequestFailed {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(SourceError::BadStatus {
                url,
                status: status.as_u16(),
            }
            .into());
        }

        let body = response
            .text()
            .await
            .map_err(|source| SourceError::RequestFailed {
                url: url.clone(),
                source,
            })?;

        debug!("资源 {} 大小: {} 字节", url, body.len());

        serde_json::from_str(&body)
            .map(Some)
            .map_err(|e| AppError::json_parse_failed(url, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// 本地 HTTP 服务桩：按请求路径返回固定的状态码和响应体，未登记的路径返回 404
    async fn serve(routes: &'static [(&'static str, u16, &'static str)]) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let mut buf = vec![0u8; 4096];
                let n = socket.read(&mut buf).await.unwrap_or(0);
                let request = String::from_utf8_lossy(&buf[..n]).to_string();
                let path = request.split_whitespace().nth(1).unwrap_or("/");

                let (status, body) = routes
                    .iter()
                    .find(|(route, _, _)| *route == path)
                    .map(|(_, status, body)| (*status, *body))
                    .unwrap_or((404, ""));
                let response = format!(
                    "HTTP/1.1 {} STUB\r\n\
                     Content-Type: application/json\r\n\
                     Content-Length: {}\r\n\
                     Connection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_fetch_json_found_and_missing() {
        let base = serve(&[("/categories.json", 200, r#"[{"id": 1, "name": "Banking"}]"#)]).await;
        let client = CatalogClient::new(&base, 5).unwrap();

        let found: Option<Vec<Category>> = client.fetch_json("categories.json").await.unwrap();
        assert_eq!(found.unwrap(), vec![Category::new("1", "Banking", "")]);

        let missing: Option<Vec<Category>> = client.fetch_json("exams.json").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_fetch_json_errors() {
        let base = serve(&[
            ("/down.json", 503, "service unavailable"),
            ("/broken.json", 200, r#"[{"id": 1,"#),
        ])
        .await;
        let client = CatalogClient::new(&base, 5).unwrap();

        let err = client.fetch_json::<Vec<Category>>("down.json").await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Source(SourceError::BadStatus { status: 503, .. })
        ));

        let err = client.fetch_json::<Vec<Category>>("broken.json").await.unwrap_err();
        match err {
            AppError::Source(SourceError::JsonParseFailed { location, .. }) => {
                assert!(location.ends_with("/broken.json"));
            }
            other => panic!("期望 JSON 解析错误，实际: {other}"),
        }
    }

    #[test]
    fn test_url_join_normalizes_slashes() {
        let client = CatalogClient::new("https://cdn.example.com/data/", 5).unwrap();
        assert_eq!(client.base_url(), "https://cdn.example.com/data");
        assert_eq!(
            client.url_for("/categories.json"),
            "https://cdn.example.com/data/categories.json"
        );
    }
}
