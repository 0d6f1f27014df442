use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;
use log::{info, warn};
use tokio_util::sync::CancellationToken;

use crate::core::check_endpoints::check_endpoints;
use crate::core::executor::RequestExecutor;
use crate::core::ramp_up::RampUpScheduler;
use crate::core::session::UserSession;
use crate::models::api_definition::ApiDefinition;
use crate::models::error::EngineResult;
use crate::models::result::RequestResult;
use crate::models::test_config::TestConfiguration;

/// 运行一次压测，等所有虚拟用户执行完后返回扁平化的结果列表
///
/// 同一个用户的结果按接口列表顺序排列，不同用户之间不保证顺序。
pub async fn run_test(
    apis: &[ApiDefinition],
    config: &TestConfiguration,
) -> EngineResult<Vec<RequestResult>> {
    run_test_with_cancel(apis, config, CancellationToken::new()).await
}

/// 同`run_test`，但可以通过`cancel`提前终止；终止前拿到的结果照常返回
pub async fn run_test_with_cancel(
    apis: &[ApiDefinition],
    config: &TestConfiguration,
    cancel: CancellationToken,
) -> EngineResult<Vec<RequestResult>> {
    // 校验都在发请求之前完成
    config.validate()?;
    let named_apis = Arc::new(check_endpoints(apis)?);
    let scheduler = RampUpScheduler::from_config(config);
    // 每个虚拟用户一个独立的客户端
    let mut sessions = Vec::with_capacity(config.virtual_users);
    for (user_id, start_offset) in scheduler.offsets().into_iter().enumerate() {
        sessions.push(UserSession {
            user_id,
            start_offset,
            executor: RequestExecutor::new(config.request_timeout)?,
            apis: named_apis.clone(),
        });
    }

    info!(
        "开始压测: {}个虚拟用户, {}个接口, 爬坡{}s, 启动间隔{:.3}s",
        config.virtual_users,
        named_apis.len(),
        config.ramp_up_secs,
        scheduler.interval_secs()
    );
    let test_start = Instant::now();
    let run_token = cancel.child_token();
    let deadline_handle = config.deadline.map(|deadline| {
        let token = run_token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(deadline).await;
            warn!("到达整体截止时间{:?}, 取消剩余请求", deadline);
            token.cancel();
        })
    });

    let handles: Vec<_> = sessions
        .into_iter()
        .map(|session| tokio::spawn(session.run(run_token.clone())))
        .collect();
    let per_user = join_all(handles).await;
    if let Some(handle) = deadline_handle {
        handle.abort();
    }

    // 在这里统一合并，各个用户的结果在此之前互不共享
    let mut results = Vec::with_capacity(config.virtual_users * named_apis.len());
    for user_results in per_user {
        results.extend(user_results?);
    }

    let expected = config.virtual_users * named_apis.len();
    if results.len() < expected {
        warn!("压测被取消: 已完成{}/{}个请求", results.len(), expected);
    }
    info!(
        "压测完成: {}个请求, 耗时{:.2}s",
        results.len(),
        test_start.elapsed().as_secs_f64()
    );
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_empty_api_list_is_rejected() {
        let err = run_test(&[], &TestConfiguration::new(1, 1.0)).await.unwrap_err();
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn test_invalid_config_is_rejected() {
        let apis = vec![ApiDefinition::new("GET", "http://127.0.0.1:1/").unwrap()];
        let err = run_test(&apis, &TestConfiguration::new(0, 1.0)).await.unwrap_err();
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn test_oversized_ramp_up_is_rejected() {
        let apis = vec![ApiDefinition::new("GET", "http://127.0.0.1:1/").unwrap()];
        let err = run_test(&apis, &TestConfiguration::new(2, 1e30)).await.unwrap_err();
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn test_all_failures_still_complete() {
        let apis = vec![
            ApiDefinition::new("GET", "http://127.0.0.1:1/a").unwrap(),
            ApiDefinition::new("POST", "http://127.0.0.1:1/b").unwrap(),
        ];
        let config = TestConfiguration::new(3, 1.0).with_request_timeout(Duration::from_secs(2));
        let results = run_test(&apis, &config).await.unwrap();
        assert_eq!(results.len(), 6);
        assert!(results.iter().all(|r| r.is_error()));
    }

    #[tokio::test]
    async fn test_pre_cancelled_run_returns_partial_results() {
        let apis = vec![ApiDefinition::new("GET", "http://127.0.0.1:1/").unwrap()];
        let cancel = CancellationToken::new();
        cancel.cancel();
        let results = run_test_with_cancel(&apis, &TestConfiguration::new(4, 2.0), cancel)
            .await
            .unwrap();
        assert!(results.is_empty());
    }
}
