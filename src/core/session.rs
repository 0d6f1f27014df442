use std::sync::Arc;
use std::time::Duration;

use log::debug;
use tokio_util::sync::CancellationToken;

use crate::core::executor::RequestExecutor;
use crate::models::api_definition::ApiDefinition;
use crate::models::result::RequestResult;

/// 已校验、带展示名的接口
#[derive(Debug, Clone)]
pub struct NamedApi {
    pub name: String,
    pub api: ApiDefinition,
}

/// 一个虚拟用户的一次完整执行
pub struct UserSession {
    pub user_id: usize,
    pub start_offset: Duration,
    pub executor: RequestExecutor,
    pub apis: Arc<Vec<NamedApi>>,
}

impl UserSession {
    /// 先等到自己的启动偏移，再按顺序逐个请求所有接口
    ///
    /// 单个请求失败不会中断会话；取消后返回已经拿到的结果。
    pub async fn run(self, cancel: CancellationToken) -> Vec<RequestResult> {
        let mut results = Vec::with_capacity(self.apis.len());
        if !self.start_offset.is_zero() {
            tokio::select! {
                _ = tokio::time::sleep(self.start_offset) => {}
                _ = cancel.cancelled() => {
                    debug!("用户{}在启动前被取消", self.user_id);
                    return results;
                }
            }
        }
        debug!("用户{}开始执行, 偏移{:?}", self.user_id, self.start_offset);
        for named in self.apis.iter() {
            if cancel.is_cancelled() {
                break;
            }
            match self
                .executor
                .execute_until_cancelled(&named.api, &named.name, self.user_id, &cancel)
                .await
            {
                Some(result) => results.push(result),
                None => break,
            }
        }
        debug!("用户{}结束, 共{}个结果", self.user_id, results.len());
        results
    }
}
