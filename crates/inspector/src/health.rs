//! 서비스 헬스 폴링
//!
//! 새로 시작한 검사 서비스가 요청을 받을 수 있을 때까지 고정 간격으로
//! 헬스 엔드포인트를 확인합니다. 최대 시도 횟수를 넘기면 포기합니다.

use std::time::Duration;

use tracing::{debug, info};

use crate::client::http::ImageInspectorApi;
use crate::error::InspectorError;

/// 서비스가 정상 응답할 때까지 대기합니다.
///
/// # Errors
///
/// `retries`번 확인해도 정상이 아니면 `InspectorError::RemoteInspectionFailed`.
pub async fn wait_until_healthy(
    api: &ImageInspectorApi,
    retries: u32,
    interval: Duration,
) -> Result<(), InspectorError> {
    for attempt in 1..=retries {
        if api.is_healthy().await {
            info!(url = api.base_url(), attempt, "image inspector service is healthy");
            return Ok(());
        }
        if attempt < retries {
            debug!(
                url = api.base_url(),
                attempt,
                retries,
                "service not healthy yet; waiting"
            );
            tokio::time::sleep(interval).await;
        }
    }

    Err(InspectorError::RemoteInspectionFailed {
        url: api.base_url().to_owned(),
        reason: format!("service did not become healthy after {retries} checks"),
    })
}
