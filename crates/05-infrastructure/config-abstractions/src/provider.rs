//! 选项提供者抽象接口

use crate::options::RawOption;
use async_trait::async_trait;
use di_common::ConfigResult;

/// 选项提供者 trait
///
/// 从某个数据源读取原始选项，不做任何校验
#[async_trait]
pub trait OptionsProvider: Send + Sync {
    /// 读取全部选项
    async fn load(&self) -> ConfigResult<Vec<RawOption>>;

    /// 获取提供者名称
    fn name(&self) -> &str;

    /// 获取提供者优先级，数值大的后应用
    fn priority(&self) -> i32 {
        0
    }
}
