//! 声明查询接口
//!
//! 解析器只通过这个接口读取索引，索引在一次处理中以只读方式共享

use crate::binding::Binding;
use di_common::{AggregateKind, Key};
use std::sync::Arc;

/// 声明查询 trait
pub trait DeclarationLookup: Send + Sync {
    /// 组件本地对某个键的显式绑定，按声明顺序
    ///
    /// 多绑定贡献也以其带贡献标识的键出现在这里
    fn explicit_bindings(&self, component: &str, key: &Key) -> &[Arc<Binding>];

    /// 组件本地对某个聚合的贡献，按声明顺序
    fn contributions(&self, component: &str, aggregate: &Key) -> &[Arc<Binding>];

    /// 组件本地对某个聚合的声明
    fn multibinds(&self, component: &str, aggregate: &Key) -> &[AggregateKind];

    /// 可注入构造器
    fn injectable(&self, key: &Key) -> Option<&Arc<Binding>>;

    /// 组件本地的全部显式绑定，按声明顺序
    fn local_bindings(&self, component: &str) -> &[Arc<Binding>];

    /// 组件本地是否有对某个聚合的贡献或声明
    fn declares_aggregate(&self, component: &str, aggregate: &Key) -> bool {
        !self.contributions(component, aggregate).is_empty()
            || !self.multibinds(component, aggregate).is_empty()
    }
}
