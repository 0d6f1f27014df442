use thiserror::Error;

/// 引擎对外暴露的错误
///
/// 单个请求的失败(超时、连接失败、4xx/5xx)不会出现在这里，
/// 它们会被记录成 `RequestResult`。
#[derive(Debug, Error)]
pub enum EngineError {
    /// 输入校验失败，发生在任何网络请求之前
    #[error("参数校验失败: {0}")]
    Validation(String),

    /// 对空结果集做统计
    #[error("没有可统计的测试结果")]
    NoData,

    #[error("构建http客户端失败: {0}")]
    ClientBuild(#[from] reqwest::Error),

    #[error("虚拟用户任务异常退出: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

impl EngineError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        EngineError::Validation(message.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, EngineError::Validation(_))
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
